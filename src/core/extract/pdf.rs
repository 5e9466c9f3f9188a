//! PDF text layer, with OCR for scans that have none.

use std::panic::{self, AssertUnwindSafe};
use std::path::Path;

use super::{ExtractionError, MIN_MEANINGFUL_CHARS, meaningful_len, ocr};

fn corrupt(message: String) -> ExtractionError {
    ExtractionError::Corrupt {
        kind: "PDF",
        message,
    }
}

/// `pdf_extract` panics on some malformed files; those become `Corrupt` errors.
fn text_layer(bytes: &[u8]) -> Result<String, ExtractionError> {
    match panic::catch_unwind(AssertUnwindSafe(|| {
        pdf_extract::extract_text_from_mem(bytes)
    })) {
        Ok(Ok(text)) => Ok(tidy(&text)),
        Ok(Err(e)) => Err(corrupt(e.to_string())),
        Err(_) => Err(corrupt("malformed document".to_string())),
    }
}

pub(super) fn extract(path: &Path, bytes: &[u8]) -> Result<String, ExtractionError> {
    let text = text_layer(bytes)?;

    if meaningful_len(&text) >= MIN_MEANINGFUL_CHARS {
        return Ok(text);
    }

    log::info!(
        "PDF text layer has {} characters, trying OCR on {}",
        meaningful_len(&text),
        path.display()
    );
    let scanned = tidy(&ocr::ocr_pdf(path)?);
    let chars = meaningful_len(&scanned);
    if chars < MIN_MEANINGFUL_CHARS {
        return Err(ExtractionError::OcrInsufficient { chars });
    }
    Ok(scanned)
}

/// Drop trailing spaces and collapse runs of blank lines left by page breaks.
fn tidy(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut blank_run = 0;
    for line in text.lines().map(str::trim_end) {
        if line.is_empty() {
            blank_run += 1;
            if blank_run > 1 {
                continue;
            }
        } else {
            blank_run = 0;
        }
        out.push_str(line);
        out.push('\n');
    }
    out.trim().to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tidy_collapses_blank_lines() {
        let raw = "Page 1  \n\n\n\n\u{c}Page 2\n \n";
        assert_eq!(tidy(raw), "Page 1\n\n\u{c}Page 2");
    }

    #[test]
    fn garbage_bytes_are_corrupt() {
        let err = extract(Path::new("broken.pdf"), b"%PDF-nonsense").unwrap_err();
        assert!(matches!(err, ExtractionError::Corrupt { kind: "PDF", .. }));
    }
}
