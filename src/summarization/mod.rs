//! Abstractions for generating abstractive summaries through a hosted model.
//!
//! The summarization model itself is an external capability reached over HTTP. Two adapters are
//! provided: the Hugging Face Inference API (default) and a local Ollama runtime. Both implement
//! [`SummarizationClient`], which is what the processing pipeline and tests depend on. The loaded
//! capability is represented by [`SummarizationModel`].

mod huggingface;
mod model;
mod ollama;

pub use huggingface::HuggingFaceSummarizationClient;
pub use model::{ModelLoadError, SummarizationModel};
pub use ollama::OllamaSummarizationClient;

use crate::config::{Config, SummarizerProvider};
use async_trait::async_trait;
use reqwest::Client;
use std::sync::Arc;
use thiserror::Error;

/// Errors surfaced while attempting abstractive summarization.
#[derive(Debug, Error)]
pub enum SummarizationClientError {
    /// Provider could not be reached or does not serve the requested model.
    #[error("Summarization provider unavailable: {0}")]
    ProviderUnavailable(String),
    /// Provider returned an error response.
    #[error("Failed to generate summary: {0}")]
    GenerationFailed(String),
    /// Provider response could not be parsed.
    #[error("Malformed provider response: {0}")]
    InvalidResponse(String),
}

/// Interface implemented by summarization providers.
#[async_trait]
pub trait SummarizationClient: Send + Sync {
    /// Produce a summary for a single chunk of text.
    async fn summarize(&self, text: &str) -> Result<String, SummarizationClientError>;

    /// Verify that the provider is able to serve requests.
    ///
    /// Called once while loading the model, before the server accepts traffic.
    async fn probe(&self) -> Result<(), SummarizationClientError> {
        Ok(())
    }

    /// Short `provider/model` label used in logs.
    fn describe(&self) -> String;
}

/// Build the summarization client selected by configuration.
pub fn build_summarization_client(
    config: &Config,
) -> Result<Arc<dyn SummarizationClient>, SummarizationClientError> {
    let http = http_client()?;
    let client: Arc<dyn SummarizationClient> = match config.summarizer_provider {
        SummarizerProvider::HuggingFace => Arc::new(HuggingFaceSummarizationClient::new(
            http,
            config.hf_api_url.clone(),
            config.summarizer_model.clone(),
            config.hf_api_token.clone(),
        )),
        SummarizerProvider::Ollama => Arc::new(OllamaSummarizationClient::new(
            http,
            config.ollama_url.clone(),
            config.summarizer_model.clone(),
        )),
    };
    tracing::debug!(client = %client.describe(), "Summarization client constructed");
    Ok(client)
}

fn http_client() -> Result<Client, SummarizationClientError> {
    Client::builder()
        .user_agent(concat!("rusty-summarizer/", env!("CARGO_PKG_VERSION")))
        .build()
        .map_err(|error| {
            SummarizationClientError::ProviderUnavailable(format!(
                "failed to construct HTTP client: {error}"
            ))
        })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ChunkMeasure;

    fn config_for(provider: SummarizerProvider) -> Config {
        Config {
            summarizer_provider: provider,
            summarizer_model: "facebook/bart-large-cnn".into(),
            hf_api_url: "http://127.0.0.1:9".into(),
            hf_api_token: None,
            ollama_url: "http://127.0.0.1:9".into(),
            chunk_max_size: 1024,
            chunk_measure: ChunkMeasure::Characters,
            chunk_tokenizer: "cl100k_base".into(),
            upload_max_bytes: 1024,
            upload_tmp_dir: None,
            server_port: None,
        }
    }

    #[test]
    fn builds_client_for_each_provider() {
        let hf = build_summarization_client(&config_for(SummarizerProvider::HuggingFace))
            .expect("hf client");
        assert_eq!(hf.describe(), "huggingface/facebook/bart-large-cnn");

        let ollama = build_summarization_client(&config_for(SummarizerProvider::Ollama))
            .expect("ollama client");
        assert_eq!(ollama.describe(), "ollama/facebook/bart-large-cnn");
    }
}
