//! Agendex - meeting agenda PDF to structured JSON.
//!
//! Extracts the text layer of an agenda PDF page by page and asks a hosted
//! Claude model to turn it into a JSON record of the meeting, its sections
//! and its social services items.

pub mod config;
pub mod extract;
pub mod llm;
pub mod pipeline;
pub mod record;

pub use pipeline::{Pipeline, PipelineError, RunObserver, RunSummary};
pub use record::{StructuredRecord, RAW_RESPONSE_KEY};
