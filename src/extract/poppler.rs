//! Poppler (`pdfinfo` / `pdftotext`) backend.

use std::path::Path;
use std::process::Command;

use tracing::debug;

use super::extractor::{ExtractionError, PdfBackend};

const PDF_MIME: &str = "application/pdf";

/// Handle command output, extracting stdout on success or returning appropriate error.
fn handle_cmd_output(
    result: std::io::Result<std::process::Output>,
    tool_name: &str,
    error_prefix: &str,
) -> Result<String, ExtractionError> {
    match result {
        Ok(output) => {
            if output.status.success() {
                Ok(String::from_utf8_lossy(&output.stdout).to_string())
            } else {
                let stderr = String::from_utf8_lossy(&output.stderr);
                Err(ExtractionError::ExtractionFailed(format!(
                    "{}: {}",
                    error_prefix,
                    stderr.trim()
                )))
            }
        }
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
            Err(ExtractionError::ToolNotFound(tool_name.to_string()))
        }
        Err(e) => Err(ExtractionError::Io(e)),
    }
}

/// Strip pdftotext's page terminator and trailing line breaks.
///
/// Returns `None` when nothing but whitespace remains.
pub fn normalize_page_text(raw: &str) -> Option<String> {
    let text = raw.trim_end_matches(['\x0c', '\n', '\r']);
    if text.trim().is_empty() {
        None
    } else {
        Some(text.to_string())
    }
}

/// Parse the `Pages:` line of `pdfinfo` output.
fn parse_page_count(info: &str) -> Option<u32> {
    info.lines()
        .find(|line| line.starts_with("Pages:"))
        .and_then(|line| line.split_whitespace().nth(1))
        .and_then(|s| s.parse().ok())
}

/// Backend that runs the Poppler command-line tools.
#[derive(Debug, Clone)]
pub struct PopplerBackend {
    /// Pass `-layout` to pdftotext.
    layout: bool,
}

impl Default for PopplerBackend {
    fn default() -> Self {
        Self { layout: true }
    }
}

impl PopplerBackend {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_layout(mut self, layout: bool) -> Self {
        self.layout = layout;
        self
    }

    /// Refuse anything that is not a readable PDF before spawning tools.
    fn check_document(&self, path: &Path) -> Result<(), ExtractionError> {
        if !path.exists() {
            return Err(ExtractionError::NotFound(path.display().to_string()));
        }
        if !path.is_file() {
            return Err(ExtractionError::UnsupportedFileType(format!(
                "{} is not a file",
                path.display()
            )));
        }
        match infer::get_from_path(path)? {
            Some(kind) if kind.mime_type() == PDF_MIME => Ok(()),
            Some(kind) => Err(ExtractionError::UnsupportedFileType(
                kind.mime_type().to_string(),
            )),
            None => Err(ExtractionError::UnsupportedFileType(format!(
                "{} is not a PDF",
                path.display()
            ))),
        }
    }
}

impl PdfBackend for PopplerBackend {
    fn page_count(&self, path: &Path) -> Result<u32, ExtractionError> {
        self.check_document(path)?;

        let output = Command::new("pdfinfo").arg(path).output();
        let info = handle_cmd_output(output, "pdfinfo (install poppler-utils)", "pdfinfo failed")?;

        parse_page_count(&info).ok_or_else(|| {
            ExtractionError::ExtractionFailed(format!(
                "pdfinfo reported no page count for {}",
                path.display()
            ))
        })
    }

    fn page_text(&self, path: &Path, page: u32) -> Result<Option<String>, ExtractionError> {
        let page_str = page.to_string();
        let mut cmd = Command::new("pdftotext");
        if self.layout {
            cmd.arg("-layout");
        }
        let output = cmd
            .args(["-enc", "UTF-8", "-f", &page_str, "-l", &page_str])
            .arg(path)
            .arg("-") // Output to stdout
            .output();

        let raw = handle_cmd_output(
            output,
            "pdftotext (install poppler-utils)",
            &format!("pdftotext failed on page {}", page),
        )?;

        let text = normalize_page_text(&raw);
        if text.is_none() {
            debug!("Page {} has no text layer", page);
        }
        Ok(text)
    }
}
