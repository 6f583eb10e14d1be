//! Text extraction from agenda PDFs.
//!
//! Pages are read one at a time through a [`PdfBackend`]. The default backend
//! shells out to Poppler (`pdfinfo`, `pdftotext`); tests substitute their own.

mod extractor;
mod poppler;

pub use extractor::{ExtractedText, ExtractionError, PdfBackend, TextExtractor};
pub use poppler::{normalize_page_text, PopplerBackend};
