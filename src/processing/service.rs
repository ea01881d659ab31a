//! Processing service coordinating validation, extraction, chunking, and summarization.

use crate::{
    config::{ChunkMeasure, Config},
    metrics::{MetricsSnapshot, SummaryMetrics},
    processing::{
        chunking::{
            DEFAULT_CHUNK_MAX_SIZE, TokenCounter, build_length_counter, chunk_text_with_counter,
        },
        extract::{FileKind, extract_upload},
        types::{
            ChunkingError, SummarizeError, SummaryOutcome, TextField, UploadField, UploadedFile,
        },
    },
    summarization::{SummarizationClient, SummarizationModel},
};
use async_trait::async_trait;
use std::path::PathBuf;
use std::sync::Arc;
use tracing::Instrument;
use uuid::Uuid;

/// Tunables for the processing pipeline.
#[derive(Debug, Clone)]
pub struct ServiceSettings {
    /// Upper bound for a single chunk, in `chunk_measure` units.
    pub chunk_max_size: usize,
    /// Unit used to measure chunks.
    pub chunk_measure: ChunkMeasure,
    /// Tokenizer used when `chunk_measure` is tokens.
    pub chunk_tokenizer: String,
    /// Directory for scoped upload files; the system temp dir when `None`.
    pub upload_dir: Option<PathBuf>,
}

impl Default for ServiceSettings {
    fn default() -> Self {
        Self {
            chunk_max_size: DEFAULT_CHUNK_MAX_SIZE,
            chunk_measure: ChunkMeasure::Characters,
            chunk_tokenizer: "cl100k_base".into(),
            upload_dir: None,
        }
    }
}

impl ServiceSettings {
    /// Derive settings from the loaded configuration.
    pub fn from_config(config: &Config) -> Self {
        Self {
            chunk_max_size: config.chunk_max_size,
            chunk_measure: config.chunk_measure,
            chunk_tokenizer: config.chunk_tokenizer.clone(),
            upload_dir: config.upload_tmp_dir.clone(),
        }
    }
}

/// Runs the summarization pipeline for raw text and uploaded documents.
///
/// The service receives the [`SummarizationModel`] handle at construction; it never loads the
/// model itself. Construct it once near process start and share it through an `Arc`.
pub struct ProcessingService {
    model: Arc<SummarizationModel>,
    chunk_max_size: usize,
    counter: TokenCounter,
    upload_dir: Option<PathBuf>,
    metrics: Arc<SummaryMetrics>,
}

/// Abstraction over the processing pipeline used by the HTTP surface.
#[async_trait]
pub trait ProcessingApi: Send + Sync {
    /// Summarize the `text` field of a request.
    async fn summarize_text(&self, text: TextField) -> Result<SummaryOutcome, SummarizeError>;

    /// Extract and summarize an uploaded document.
    async fn summarize_file(&self, upload: UploadField) -> Result<SummaryOutcome, SummarizeError>;

    /// Retrieve the current metrics snapshot for diagnostics.
    fn metrics_snapshot(&self) -> MetricsSnapshot;
}

impl ProcessingService {
    /// Build a processing service around an injected model handle.
    pub fn new(
        model: Arc<SummarizationModel>,
        settings: ServiceSettings,
    ) -> Result<Self, ChunkingError> {
        let counter = build_length_counter(settings.chunk_measure, &settings.chunk_tokenizer)?;
        tracing::debug!(
            chunk_max_size = settings.chunk_max_size,
            chunk_measure = ?settings.chunk_measure,
            upload_dir = ?settings.upload_dir,
            "Processing service configured"
        );
        Ok(Self {
            model,
            chunk_max_size: settings.chunk_max_size,
            counter,
            upload_dir: settings.upload_dir,
            metrics: Arc::new(SummaryMetrics::new()),
        })
    }

    /// Summarize the `text` field of a request.
    pub async fn summarize_text(&self, text: TextField) -> Result<SummaryOutcome, SummarizeError> {
        let request_id = Uuid::new_v4();
        let span = tracing::info_span!("summarize_text", %request_id);
        async move {
            let client = self.loaded_client()?;
            let text = match text {
                TextField::Missing => return Err(SummarizeError::MissingText),
                TextField::NotText => return Err(SummarizeError::InvalidText),
                TextField::TooLarge => return Err(SummarizeError::PayloadTooLarge),
                TextField::Null => return Err(SummarizeError::EmptyText),
                TextField::Text(text) if text.trim().is_empty() => {
                    return Err(SummarizeError::EmptyText);
                }
                TextField::Text(text) => text,
            };
            tracing::info!(chars = text.chars().count(), "Summarizing text");
            self.summarize_chunks(client, &text).await
        }
        .instrument(span)
        .await
    }

    /// Extract and summarize an uploaded document.
    ///
    /// The upload is staged in a scoped temporary file that is removed once extraction
    /// finishes, whether it succeeded or not.
    pub async fn summarize_file(
        &self,
        upload: UploadField,
    ) -> Result<SummaryOutcome, SummarizeError> {
        let request_id = Uuid::new_v4();
        let span = tracing::info_span!("summarize_file", %request_id);
        async move {
            let client = self.loaded_client()?;
            let UploadedFile { filename, content } = match upload {
                UploadField::Missing => return Err(SummarizeError::NoFile),
                UploadField::Malformed(message) => {
                    return Err(SummarizeError::InvalidUpload(message));
                }
                UploadField::TooLarge => return Err(SummarizeError::PayloadTooLarge),
                UploadField::File(file) if file.filename.is_empty() => {
                    return Err(SummarizeError::NoSelectedFile);
                }
                UploadField::File(file) => file,
            };
            let Some(kind) = FileKind::from_filename(&filename) else {
                tracing::info!(filename = %filename, "Rejected unsupported upload");
                return Err(SummarizeError::UnsupportedType { filename });
            };
            tracing::info!(
                filename = %filename,
                %kind,
                bytes = content.len(),
                "Summarizing uploaded file"
            );

            let text = extract_upload(content, kind, self.upload_dir.clone()).await?;
            if text.trim().is_empty() {
                tracing::info!(filename = %filename, %kind, "Extraction produced no text");
                return Err(SummarizeError::EmptyExtraction);
            }
            self.summarize_chunks(client, &text).await
        }
        .instrument(span)
        .await
    }

    /// Return the current summarization metrics snapshot.
    pub fn metrics_snapshot(&self) -> MetricsSnapshot {
        self.metrics.snapshot()
    }

    fn loaded_client(&self) -> Result<&Arc<dyn SummarizationClient>, SummarizeError> {
        self.model.client().ok_or_else(|| {
            tracing::warn!("Rejected request: summarization model not loaded");
            SummarizeError::ModelNotLoaded
        })
    }

    async fn summarize_chunks(
        &self,
        client: &Arc<dyn SummarizationClient>,
        text: &str,
    ) -> Result<SummaryOutcome, SummarizeError> {
        let chunks = chunk_text_with_counter(text, self.chunk_max_size, &self.counter);
        let total = chunks.len();
        tracing::debug!(chunks = total, chunk_max_size = self.chunk_max_size, "Text chunked");

        let mut summaries = Vec::with_capacity(total);
        for (index, chunk) in chunks.iter().enumerate() {
            let summary = client.summarize(chunk).await.map_err(|error| {
                tracing::error!(
                    chunk = index + 1,
                    total,
                    error = %error,
                    "Chunk summarization failed"
                );
                error
            })?;
            tracing::debug!(chunk = index + 1, total, "Chunk summarized");
            summaries.push(summary);
        }

        self.metrics.record_document(total as u64);
        tracing::info!(chunks = total, model = %client.describe(), "Summary completed");

        Ok(SummaryOutcome {
            summary: summaries.join(" "),
            chunk_count: total,
        })
    }
}

#[async_trait]
impl ProcessingApi for ProcessingService {
    async fn summarize_text(&self, text: TextField) -> Result<SummaryOutcome, SummarizeError> {
        ProcessingService::summarize_text(self, text).await
    }

    async fn summarize_file(&self, upload: UploadField) -> Result<SummaryOutcome, SummarizeError> {
        ProcessingService::summarize_file(self, upload).await
    }

    fn metrics_snapshot(&self) -> MetricsSnapshot {
        ProcessingService::metrics_snapshot(self)
    }
}
