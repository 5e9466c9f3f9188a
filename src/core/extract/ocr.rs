//! OCR for scanned PDFs via the `pdftoppm` and `tesseract` command-line tools.

use std::io;
use std::path::{Path, PathBuf};
use std::process::Command;

use tempfile::TempDir;

use super::ExtractionError;

const RENDER_DPI: &str = "300";
const LANGUAGE: &str = "eng";

fn spawn_error(tool: &'static str, e: io::Error) -> ExtractionError {
    if e.kind() == io::ErrorKind::NotFound {
        ExtractionError::ToolMissing(tool)
    } else {
        ExtractionError::Io(e)
    }
}

/// Render every page to PNG, then OCR each page in order.
pub(super) fn ocr_pdf(pdf_path: &Path) -> Result<String, ExtractionError> {
    let dir = TempDir::new()?;
    let pages = render_pages(pdf_path, dir.path())?;
    if pages.is_empty() {
        return Err(ExtractionError::OcrFailed(
            "no page images were produced".to_string(),
        ));
    }

    let mut text = String::new();
    for (i, page) in pages.iter().enumerate() {
        log::debug!("OCR page {}/{}", i + 1, pages.len());
        text.push_str(&run_tesseract(page)?);
        text.push('\n');
    }
    Ok(text)
}

fn render_pages(pdf_path: &Path, out_dir: &Path) -> Result<Vec<PathBuf>, ExtractionError> {
    let output = Command::new("pdftoppm")
        .args(["-png", "-r", RENDER_DPI])
        .arg(pdf_path)
        .arg(out_dir.join("page"))
        .output()
        .map_err(|e| spawn_error("pdftoppm", e))?;
    if !output.status.success() {
        return Err(ExtractionError::OcrFailed(format!(
            "pdftoppm failed: {}",
            String::from_utf8_lossy(&output.stderr).trim()
        )));
    }

    // pdftoppm zero-pads page numbers to a common width, so name order is page order.
    let mut pages: Vec<PathBuf> = std::fs::read_dir(out_dir)?
        .filter_map(|entry| entry.ok().map(|e| e.path()))
        .filter(|p| p.extension().is_some_and(|ext| ext == "png"))
        .collect();
    pages.sort();
    Ok(pages)
}

fn run_tesseract(image: &Path) -> Result<String, ExtractionError> {
    let output = Command::new("tesseract")
        .arg(image)
        .arg("stdout")
        .args(["-l", LANGUAGE])
        .output()
        .map_err(|e| spawn_error("tesseract", e))?;
    if !output.status.success() {
        return Err(ExtractionError::OcrFailed(format!(
            "tesseract failed: {}",
            String::from_utf8_lossy(&output.stderr).trim()
        )));
    }
    Ok(String::from_utf8_lossy(&output.stdout).into_owned())
}
