//! Tolerant extraction of JSON objects from free-form model output.
//!
//! Completions rarely contain *only* the JSON that was asked for: they open with
//! a sentence of prose, wrap the payload in a markdown fence or an array, or get
//! cut off mid-object. [`parse_records`] bounds the region between the first `{`
//! and the last `}`, splits it into brace-balanced candidates and keeps every
//! candidate that decodes. A single corrupt candidate is dropped; a response with
//! no decodable candidate at all is an error so the caller can fall back.

use serde_json::Value;

/// Errors from [`parse_records`].
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ParseError {
    #[error("No JSON object found in content")]
    NoJsonObject,
    #[error("Invalid JSON structure in content")]
    InvalidStructure,
    #[error("No valid JSON objects found")]
    NoValidObjects,
}

/// Extract every well-formed JSON object from `raw`, in source order.
pub fn parse_records(raw: &str) -> Result<Vec<Value>, ParseError> {
    let start = raw.find('{').ok_or(ParseError::NoJsonObject)?;
    let end = match raw.rfind('}') {
        Some(i) if i > start => i + 1,
        _ => return Err(ParseError::InvalidStructure),
    };

    let mut records = Vec::new();
    let mut candidates = Candidates::new(&raw[start..end]);
    while let Some(candidate) = candidates.next() {
        match serde_json::from_str::<Value>(candidate) {
            Ok(value) => records.push(value),
            Err(e) => {
                log::warn!(
                    "Failed to parse JSON candidate ({} bytes): {}",
                    candidate.len(),
                    e
                );
                candidates.resync();
            }
        }
    }

    if records.is_empty() {
        return Err(ParseError::NoValidObjects);
    }
    log::debug!("Parsed {} JSON object(s) from response", records.len());
    Ok(records)
}

/// Iterator over brace-balanced `{...}` spans of a region.
///
/// Braces inside JSON string literals (with `\"` escapes honoured) do not count
/// toward the depth. A span that never closes runs to the end of the region.
pub struct Candidates<'a> {
    region: &'a str,
    cursor: usize,
    last_open: Option<usize>,
}

impl<'a> Candidates<'a> {
    pub fn new(region: &'a str) -> Self {
        Self {
            region,
            cursor: 0,
            last_open: None,
        }
    }

    /// Restart after the last span using a plain brace count.
    ///
    /// A stray `"` in a broken span makes the string-aware scan swallow every
    /// object after it; counting every brace bounds the span again.
    pub fn resync(&mut self) {
        if let Some(open) = self.last_open.take() {
            let plain = object_end(self.region.as_bytes(), open, false);
            self.cursor = self.cursor.min(plain);
        }
    }
}

impl<'a> Iterator for Candidates<'a> {
    type Item = &'a str;

    fn next(&mut self) -> Option<&'a str> {
        let rest = self.region.get(self.cursor..)?;
        let open = self.cursor + rest.find('{')?;
        let close = object_end(self.region.as_bytes(), open, true);
        self.cursor = close;
        self.last_open = Some(open);
        Some(&self.region[open..close])
    }
}

/// Exclusive end of the object opened at `open`. With `strings` set, braces
/// inside string literals are skipped.
// Only ASCII bytes are compared, so every returned offset is a char boundary.
fn object_end(bytes: &[u8], open: usize, strings: bool) -> usize {
    let mut depth = 0usize;
    let mut in_string = false;
    let mut escaped = false;

    for (i, &b) in bytes.iter().enumerate().skip(open) {
        if in_string {
            if escaped {
                escaped = false;
            } else if b == b'\\' {
                escaped = true;
            } else if b == b'"' {
                in_string = false;
            }
            continue;
        }
        match b {
            b'"' if strings => in_string = true,
            b'{' => depth += 1,
            b'}' => {
                depth = depth.saturating_sub(1);
                if depth == 0 {
                    return i + 1;
                }
            }
            _ => {}
        }
    }
    bytes.len()
}
