//! DOCX text: the `<w:t>` runs of `word/document.xml`.

use std::io::{Cursor, Read};
use std::sync::OnceLock;

use regex::Regex;

use super::ExtractionError;

static RUNS: OnceLock<Regex> = OnceLock::new();

fn runs() -> &'static Regex {
    RUNS.get_or_init(|| {
        Regex::new(r"<w:t(?:\s[^>]*)?>([^<]*)</w:t>|(</w:p>)|<w:(tab|br|cr)\s*/>")
            .expect("docx run pattern")
    })
}

fn corrupt(e: impl std::fmt::Display) -> ExtractionError {
    ExtractionError::Corrupt {
        kind: "DOCX",
        message: e.to_string(),
    }
}

pub(super) fn extract(bytes: &[u8]) -> Result<String, ExtractionError> {
    let mut archive = zip::ZipArchive::new(Cursor::new(bytes)).map_err(corrupt)?;
    let mut xml = String::new();
    archive
        .by_name("word/document.xml")
        .map_err(corrupt)?
        .read_to_string(&mut xml)?;
    Ok(document_text(&xml))
}

fn decode_entities(s: &str) -> String {
    s.replace("&lt;", "<")
        .replace("&gt;", ">")
        .replace("&quot;", "\"")
        .replace("&apos;", "'")
        .replace("&amp;", "&")
}

/// Concatenate text runs; paragraphs become lines.
fn document_text(xml: &str) -> String {
    let mut out = String::new();
    for caps in runs().captures_iter(xml) {
        if let Some(text) = caps.get(1) {
            out.push_str(&decode_entities(text.as_str()));
        } else if caps.get(2).is_some() {
            out.push('\n');
        } else if let Some(tag) = caps.get(3) {
            out.push(if tag.as_str() == "tab" { '\t' } else { '\n' });
        }
    }
    out.lines()
        .map(str::trim_end)
        .collect::<Vec<_>>()
        .join("\n")
        .trim()
        .to_string()
}
