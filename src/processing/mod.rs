//! Summarization pipeline: extraction, chunking, and per-chunk summarization.

pub mod chunking;
pub mod extract;
mod service;
pub mod types;

pub use extract::{ExtractionError, FileKind};
pub use service::{ProcessingApi, ProcessingService, ServiceSettings};
pub use types::{
    ChunkingError, SummarizeError, SummaryOutcome, TextField, UploadField, UploadedFile,
};
