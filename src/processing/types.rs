//! Core data types and error definitions for the summarization pipeline.

use crate::processing::extract::ExtractionError;
use crate::summarization::SummarizationClientError;
use anyhow::Error as TokenizerError;
use thiserror::Error;

/// Errors produced while preparing the chunk length measure.
#[derive(Debug, Error)]
pub enum ChunkingError {
    /// Tokenizer resources were unavailable for the configured encoding.
    #[error("failed to initialize tokenizer '{tokenizer}': {source}")]
    Tokenizer {
        /// Encoding or model name we attempted to load.
        tokenizer: String,
        /// Underlying error raised by the tokenizer library.
        #[source]
        source: TokenizerError,
    },
}

/// Errors emitted by the summarization pipeline.
///
/// Every variant is surfaced to API callers; [`SummarizeError::is_client_error`] decides whether
/// the caller or the server is at fault.
#[derive(Debug, Error)]
pub enum SummarizeError {
    /// The summarization model has not finished loading.
    #[error("Model is not loaded.")]
    ModelNotLoaded,
    /// Request body did not carry a `text` field.
    #[error("No text provided.")]
    MissingText,
    /// `text` was null, empty, or whitespace only.
    #[error("Text cannot be empty.")]
    EmptyText,
    /// `text` was present but not a string.
    #[error("Text must be a string.")]
    InvalidText,
    /// Request did not carry a `file` part.
    #[error("No file provided.")]
    NoFile,
    /// The `file` part had an empty filename.
    #[error("No selected file.")]
    NoSelectedFile,
    /// Multipart stream could not be read.
    #[error("{0}")]
    InvalidUpload(String),
    /// Request body exceeded the configured size limit.
    #[error("Request body is too large.")]
    PayloadTooLarge,
    /// Uploaded file extension is not pdf, docx, or txt.
    #[error("Unsupported file type. Please upload a PDF, DOCX, or TXT file.")]
    UnsupportedType {
        /// Filename as supplied by the client.
        filename: String,
    },
    /// Extraction succeeded but produced no text.
    #[error("Unable to extract text from the file.")]
    EmptyExtraction,
    /// The document could not be parsed.
    #[error(transparent)]
    Extraction(#[from] ExtractionError),
    /// The summarization provider failed on a chunk.
    #[error(transparent)]
    Summarization(#[from] SummarizationClientError),
}

impl SummarizeError {
    /// Whether the failure was caused by the request rather than the server.
    pub fn is_client_error(&self) -> bool {
        matches!(
            self,
            Self::MissingText
                | Self::EmptyText
                | Self::InvalidText
                | Self::NoFile
                | Self::NoSelectedFile
                | Self::InvalidUpload(_)
                | Self::PayloadTooLarge
                | Self::UnsupportedType { .. }
                | Self::EmptyExtraction
        )
    }
}

/// The `text` field of a summarize request, as found in the request body.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TextField {
    /// Body was not a JSON object or had no `text` key.
    Missing,
    /// `text` was JSON `null`.
    Null,
    /// `text` was a string.
    Text(String),
    /// `text` held a non-string JSON value.
    NotText,
    /// Body exceeded the size limit before it could be inspected.
    TooLarge,
}

impl TextField {
    /// Inspect a raw request body for the `text` field.
    pub fn from_json_body(body: &[u8]) -> Self {
        let Ok(serde_json::Value::Object(mut object)) =
            serde_json::from_slice::<serde_json::Value>(body)
        else {
            return Self::Missing;
        };
        match object.remove("text") {
            None => Self::Missing,
            Some(serde_json::Value::Null) => Self::Null,
            Some(serde_json::Value::String(text)) => Self::Text(text),
            Some(_) => Self::NotText,
        }
    }
}

impl From<&str> for TextField {
    fn from(text: &str) -> Self {
        Self::Text(text.to_string())
    }
}

/// A document uploaded for summarization.
#[derive(Debug, Clone)]
pub struct UploadedFile {
    /// Client-supplied filename; its extension selects the extractor.
    pub filename: String,
    /// Raw file bytes.
    pub content: Vec<u8>,
}

/// The `file` part of a summarize-file request.
#[derive(Debug, Clone)]
pub enum UploadField {
    /// No `file` part was present.
    Missing,
    /// The multipart stream was malformed.
    Malformed(String),
    /// The multipart stream exceeded the size limit.
    TooLarge,
    /// A `file` part was read.
    File(UploadedFile),
}

/// Result of a completed summarization.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SummaryOutcome {
    /// Per-chunk summaries joined with single spaces, in chunk order.
    pub summary: String,
    /// Number of chunks the source text was split into.
    pub chunk_count: usize,
}
