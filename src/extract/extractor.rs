//! Page-ordered text extraction.

use std::path::Path;

use thiserror::Error;
use tracing::{debug, info};

use super::poppler::PopplerBackend;

/// Errors that can occur during text extraction.
#[derive(Debug, Error)]
pub enum ExtractionError {
    #[error("File not found: {0}")]
    NotFound(String),

    #[error("Unsupported file type: {0}")]
    UnsupportedFileType(String),

    #[error("External tool not found: {0}")]
    ToolNotFound(String),

    #[error("Extraction failed: {0}")]
    ExtractionFailed(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Source of per-page text for a paginated document.
pub trait PdfBackend {
    /// Number of pages in the document. Failure here is fatal for the run.
    fn page_count(&self, path: &Path) -> Result<u32, ExtractionError>;

    /// Text of a single 1-based page, or `None` when the page has no text layer.
    /// Return `ExtractionFailed` for a page that cannot be read but can be skipped.
    fn page_text(&self, path: &Path, page: u32) -> Result<Option<String>, ExtractionError>;
}

/// Result of text extraction.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExtractedText {
    /// Page texts in page order, each followed by a line break.
    pub text: String,
    /// Total pages in the document.
    pub page_count: u32,
    /// Pages that contributed text.
    pub pages_with_text: u32,
}

impl ExtractedText {
    /// Character count (not bytes).
    pub fn char_count(&self) -> usize {
        self.text.chars().count()
    }
}

/// Text extractor over a [`PdfBackend`].
pub struct TextExtractor<B = PopplerBackend> {
    backend: B,
}

impl Default for TextExtractor<PopplerBackend> {
    fn default() -> Self {
        Self::new(PopplerBackend::default())
    }
}

impl<B: PdfBackend> TextExtractor<B> {
    pub fn new(backend: B) -> Self {
        Self { backend }
    }

    pub fn backend(&self) -> &B {
        &self.backend
    }

    /// Extract the text of every page that has one, in page order.
    ///
    /// Pages without text, and pages the backend reports as
    /// [`ExtractionError::ExtractionFailed`], contribute nothing. Any other
    /// error, including a missing tool, is returned.
    pub fn extract(&self, path: &Path) -> Result<ExtractedText, ExtractionError> {
        info!("Extracting text from {}", path.display());

        let page_count = self.backend.page_count(path)?;
        let mut fragments = Vec::with_capacity(page_count as usize);

        for page in 1..=page_count {
            // Only a page the tool could not read is skipped; a missing tool
            // or an I/O fault stops the run.
            match self.backend.page_text(path, page) {
                Ok(fragment) => fragments.push(fragment),
                Err(ExtractionError::ExtractionFailed(msg)) => {
                    debug!("No text from page {}: {}", page, msg);
                    fragments.push(None);
                }
                Err(e) => return Err(e),
            }
        }

        let pages_with_text = fragments
            .iter()
            .filter(|f| f.as_deref().is_some_and(|t| !t.is_empty()))
            .count() as u32;
        let text = join_pages(fragments);

        debug!(
            "Extracted {} of {} pages ({} bytes)",
            pages_with_text,
            page_count,
            text.len()
        );

        Ok(ExtractedText {
            text,
            page_count,
            pages_with_text,
        })
    }

    /// Check if required tools are available.
    pub fn check_tools() -> Vec<(String, bool)> {
        ["pdfinfo", "pdftotext"]
            .iter()
            .map(|tool| (tool.to_string(), which::which(tool).is_ok()))
            .collect()
    }
}

/// Concatenate page fragments, each followed by `\n`, skipping absent and
/// empty ones.
pub(crate) fn join_pages<I>(fragments: I) -> String
where
    I: IntoIterator<Item = Option<String>>,
{
    let mut text = String::new();
    for fragment in fragments.into_iter().flatten() {
        if fragment.is_empty() {
            continue;
        }
        text.push_str(&fragment);
        text.push('\n');
    }
    text
}
