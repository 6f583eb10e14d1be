//! Extract, structure, write.

use std::io::Write;
use std::path::{Path, PathBuf};

use thiserror::Error;
use tracing::info;

use crate::extract::{ExtractedText, ExtractionError, PdfBackend, PopplerBackend, TextExtractor};
use crate::llm::{LlmClient, LlmError, ModelInvoker, StructuringClient};
use crate::record::StructuredRecord;

/// Errors that abort a run.
#[derive(Debug, Error)]
pub enum PipelineError {
    #[error(transparent)]
    Extraction(#[from] ExtractionError),

    #[error(transparent)]
    Structuring(#[from] LlmError),

    #[error("Failed to serialize record: {0}")]
    Serialize(#[from] serde_json::Error),

    #[error("Failed to write {path}: {source}")]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// Outcome of a successful run.
#[derive(Debug, Clone, PartialEq)]
pub struct RunSummary {
    pub output: PathBuf,
    pub extracted_chars: usize,
    pub page_count: u32,
    pub pages_with_text: u32,
    pub record: StructuredRecord,
}

/// Progress hooks for [`Pipeline::run_with`]. Every hook defaults to a no-op.
pub trait RunObserver {
    fn extracting(&self, _input: &Path) {}

    fn extracted(&self, _text: &ExtractedText) {}

    fn structuring(&self) {}

    /// Called once the model call returns, whether or not it succeeded.
    fn structuring_done(&self) {}

    fn written(&self, _record: &StructuredRecord, _output: &Path) {}
}

impl RunObserver for () {}

/// Document-to-record pipeline.
pub struct Pipeline<B = PopplerBackend, I = LlmClient> {
    extractor: TextExtractor<B>,
    structurer: StructuringClient<I>,
}

impl<B: PdfBackend, I: ModelInvoker> Pipeline<B, I> {
    pub fn new(extractor: TextExtractor<B>, structurer: StructuringClient<I>) -> Self {
        Self {
            extractor,
            structurer,
        }
    }

    pub fn extract(&self, input: &Path) -> Result<ExtractedText, PipelineError> {
        Ok(self.extractor.extract(input)?)
    }

    pub async fn structure(&self, text: &str) -> Result<StructuredRecord, PipelineError> {
        Ok(self.structurer.structure(text).await?)
    }

    /// Write the record as pretty JSON.
    ///
    /// The file only appears at `output` once it is completely written.
    pub fn write_record(
        &self,
        record: &StructuredRecord,
        output: &Path,
    ) -> Result<(), PipelineError> {
        let json = record.to_pretty_json()?;
        let write_err = |source| PipelineError::Write {
            path: output.to_path_buf(),
            source,
        };

        let dir = match output.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent,
            _ => Path::new("."),
        };
        let mut builder = tempfile::Builder::new();
        // Same mode a plain create would give: 0666 less the umask
        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            builder.permissions(std::fs::Permissions::from_mode(0o666));
        }
        let mut tmp = builder.tempfile_in(dir).map_err(write_err)?;
        // A file being replaced keeps its mode
        if let Ok(existing) = std::fs::metadata(output) {
            tmp.as_file()
                .set_permissions(existing.permissions())
                .map_err(write_err)?;
        }
        tmp.write_all(json.as_bytes()).map_err(write_err)?;
        tmp.persist(output).map_err(|e| write_err(e.error))?;

        info!("Wrote {} bytes to {}", json.len(), output.display());
        Ok(())
    }

    /// Run all three stages. Nothing is written unless every stage succeeds.
    pub async fn run(&self, input: &Path, output: &Path) -> Result<RunSummary, PipelineError> {
        self.run_with(input, output, &()).await
    }

    /// [`Pipeline::run`], reporting progress to `observer`.
    pub async fn run_with<O: RunObserver + ?Sized>(
        &self,
        input: &Path,
        output: &Path,
        observer: &O,
    ) -> Result<RunSummary, PipelineError> {
        observer.extracting(input);
        let extracted = self.extract(input)?;
        observer.extracted(&extracted);

        observer.structuring();
        let structured = self.structure(&extracted.text).await;
        observer.structuring_done();
        let record = structured?;

        self.write_record(&record, output)?;
        observer.written(&record, output);

        Ok(RunSummary {
            output: output.to_path_buf(),
            extracted_chars: extracted.char_count(),
            page_count: extracted.page_count,
            pages_with_text: extracted.pages_with_text,
            record,
        })
    }
}
