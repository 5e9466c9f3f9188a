//! Plain-text extraction from course material files (TXT, DOCX, PDF).
//!
//! Parsing itself is delegated: `zip` opens DOCX containers, `pdf-extract` reads
//! PDF text layers, and scanned PDFs go through the system `pdftoppm` and
//! `tesseract` binaries.

mod docx;
mod ocr;
mod pdf;

use std::fs;
use std::io;
use std::path::Path;

/// Below this many characters a PDF text layer (or OCR result) is treated as empty.
pub const MIN_MEANINGFUL_CHARS: usize = 50;

/// Supported input formats.
#[derive(Clone, Copy, Debug, PartialEq, Eq, clap::ValueEnum)]
pub enum DocumentKind {
    #[value(name = "txt")]
    Text,
    Docx,
    Pdf,
}

impl DocumentKind {
    /// Detect the format from the file extension (case-insensitive).
    pub fn from_path(path: &Path) -> Result<Self, ExtractionError> {
        let ext = path
            .extension()
            .and_then(|e| e.to_str())
            .map(|e| e.to_ascii_lowercase())
            .unwrap_or_default();
        match ext.as_str() {
            "txt" | "text" | "md" => Ok(DocumentKind::Text),
            "docx" => Ok(DocumentKind::Docx),
            "pdf" => Ok(DocumentKind::Pdf),
            _ => Err(ExtractionError::UnsupportedType(
                path.display().to_string(),
            )),
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            DocumentKind::Text => "TXT",
            DocumentKind::Docx => "DOCX",
            DocumentKind::Pdf => "PDF",
        }
    }
}

/// Errors while turning a file into text.
#[derive(Debug, thiserror::Error)]
pub enum ExtractionError {
    #[error("Unsupported file type: {0}. Use a DOCX, TXT or PDF file, or paste the text instead")]
    UnsupportedType(String),
    #[error("Failed to read file: {0}")]
    Io(#[from] io::Error),
    #[error("Failed to extract text from {kind}: {message}")]
    Corrupt { kind: &'static str, message: String },
    #[error("{0} not found; install it to read scanned PDFs")]
    ToolMissing(&'static str),
    #[error("OCR failed: {0}")]
    OcrFailed(String),
    #[error("OCR recovered only {chars} characters; the scan may be unreadable")]
    OcrInsufficient { chars: usize },
    #[error("No text was extracted from the file. Try pasting the text directly")]
    Empty,
}

/// Number of characters that count toward the meaningful-text threshold.
pub(crate) fn meaningful_len(text: &str) -> usize {
    text.trim().chars().count()
}

/// Extract plain text from the file at `path`.
pub fn extract_text(path: &Path) -> Result<String, ExtractionError> {
    let kind = DocumentKind::from_path(path)?;
    extract_as(path, kind)
}

/// Extract plain text, trusting `kind` instead of the extension.
pub fn extract_as(path: &Path, kind: DocumentKind) -> Result<String, ExtractionError> {
    let bytes = fs::read(path)?;
    log::debug!(
        "Extracting {} ({} bytes) as {}",
        path.display(),
        bytes.len(),
        kind.label()
    );
    let text = match kind {
        DocumentKind::Text => String::from_utf8_lossy(&bytes).trim().to_string(),
        DocumentKind::Docx => docx::extract(&bytes)?,
        DocumentKind::Pdf => pdf::extract(path, &bytes)?,
    };
    if text.is_empty() {
        return Err(ExtractionError::Empty);
    }
    Ok(text)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn kind_from_extension() {
        assert_eq!(
            DocumentKind::from_path(Path::new("notes.TXT")).unwrap(),
            DocumentKind::Text
        );
        assert_eq!(
            DocumentKind::from_path(Path::new("a/b/outline.docx")).unwrap(),
            DocumentKind::Docx
        );
        assert_eq!(
            DocumentKind::from_path(Path::new("scan.Pdf")).unwrap(),
            DocumentKind::Pdf
        );
        assert!(matches!(
            DocumentKind::from_path(Path::new("slides.pptx")),
            Err(ExtractionError::UnsupportedType(_))
        ));
        assert!(DocumentKind::from_path(Path::new("README")).is_err());
    }

    #[test]
    fn declared_kind_overrides_extension() {
        let tmp = tempfile::TempDir::new().expect("temp dir");
        let path = tmp.path().join("upload.bin");
        std::fs::write(&path, "Kinematics").unwrap();
        assert!(extract_text(&path).is_err());
        assert_eq!(extract_as(&path, DocumentKind::Text).unwrap(), "Kinematics");
    }

    #[test]
    fn text_file_is_trimmed() {
        let tmp = tempfile::TempDir::new().expect("temp dir");
        let path = tmp.path().join("course.txt");
        let mut f = std::fs::File::create(&path).unwrap();
        writeln!(f, "\n  Thermodynamics: heat and work.  \n").unwrap();
        assert_eq!(extract_text(&path).unwrap(), "Thermodynamics: heat and work.");
    }

    #[test]
    fn empty_text_file_is_error() {
        let tmp = tempfile::TempDir::new().expect("temp dir");
        let path = tmp.path().join("empty.txt");
        std::fs::write(&path, "   \n").unwrap();
        assert!(matches!(extract_text(&path), Err(ExtractionError::Empty)));
    }

    #[test]
    fn missing_file_is_io_error() {
        let tmp = tempfile::TempDir::new().expect("temp dir");
        let err = extract_text(&tmp.path().join("missing.txt")).unwrap_err();
        assert!(matches!(err, ExtractionError::Io(_)));
    }

    #[test]
    fn docx_file_roundtrip() {
        let tmp = tempfile::TempDir::new().expect("temp dir");
        let path = tmp.path().join("outline.docx");
        std::fs::write(
            &path,
            docx::tests::build_docx(
                r#"<w:document><w:body><w:p><w:r><w:t>Week 1: Statics</w:t></w:r></w:p></w:body></w:document>"#,
            ),
        )
        .unwrap();
        assert_eq!(extract_text(&path).unwrap(), "Week 1: Statics");
    }

    #[test]
    fn meaningful_len_ignores_outer_whitespace() {
        assert_eq!(meaningful_len("  abc \n"), 3);
        assert_eq!(meaningful_len("ΔT"), 2);
    }
}
