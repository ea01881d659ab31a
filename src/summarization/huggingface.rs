use super::{SummarizationClient, SummarizationClientError};
use async_trait::async_trait;
use reqwest::{Client, RequestBuilder, StatusCode};
use serde::Deserialize;
use serde_json::json;

/// Client for the Hugging Face Inference API summarization task.
pub struct HuggingFaceSummarizationClient {
    http: Client,
    base_url: String,
    model: String,
    api_token: Option<String>,
}

impl HuggingFaceSummarizationClient {
    /// Create a client targeting `model` on the inference API rooted at `base_url`.
    pub fn new(http: Client, base_url: String, model: String, api_token: Option<String>) -> Self {
        Self {
            http,
            base_url,
            model,
            api_token,
        }
    }

    fn authorized(&self, request: RequestBuilder) -> RequestBuilder {
        match &self.api_token {
            Some(token) => request.bearer_auth(token),
            None => request,
        }
    }

    fn endpoint(&self) -> String {
        format!(
            "{}/models/{}",
            self.base_url.trim_end_matches('/'),
            self.model.trim_start_matches('/')
        )
    }
}

#[derive(Debug, Deserialize)]
struct SummaryOutput {
    summary_text: String,
}

#[async_trait]
impl SummarizationClient for HuggingFaceSummarizationClient {
    async fn summarize(&self, text: &str) -> Result<String, SummarizationClientError> {
        let payload = json!({
            "inputs": text,
            "options": {
                "wait_for_model": true,
            }
        });

        let response = self
            .authorized(self.http.post(self.endpoint()).json(&payload))
            .send()
            .await.map_err(|error| {
            SummarizationClientError::ProviderUnavailable(format!(
                "failed to reach Hugging Face at {}: {error}",
                self.base_url
            ))
        })?;

        if response.status() == StatusCode::NOT_FOUND {
            return Err(SummarizationClientError::ProviderUnavailable(format!(
                "model '{}' not found at {}",
                self.model,
                self.endpoint()
            )));
        }

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(SummarizationClientError::GenerationFailed(format!(
                "Hugging Face returned {status}: {body}"
            )));
        }

        let outputs: Vec<SummaryOutput> = response.json().await.map_err(|error| {
            SummarizationClientError::InvalidResponse(format!(
                "failed to decode Hugging Face response: {error}"
            ))
        })?;

        outputs
            .into_iter()
            .next()
            .map(|output| output.summary_text.trim().to_string())
            .ok_or_else(|| {
                SummarizationClientError::InvalidResponse(
                    "Hugging Face returned no summaries".into(),
                )
            })
    }

    /// Check that the inference endpoint answers for the configured model.
    ///
    /// A `503` means the model is still warming up on the provider side; requests will wait for it
    /// through `wait_for_model`, so it counts as reachable.
    async fn probe(&self) -> Result<(), SummarizationClientError> {
        let response = self
            .authorized(self.http.get(self.endpoint()))
            .send()
            .await
            .map_err(|error| {
                SummarizationClientError::ProviderUnavailable(format!(
                    "failed to reach Hugging Face at {}: {error}",
                    self.base_url
                ))
            })?;

        match response.status() {
            status if status.is_success() || status == StatusCode::SERVICE_UNAVAILABLE => {
                tracing::debug!(model = %self.model, %status, "Hugging Face model reachable");
                Ok(())
            }
            StatusCode::NOT_FOUND => Err(SummarizationClientError::ProviderUnavailable(format!(
                "model '{}' not found at {}",
                self.model,
                self.endpoint()
            ))),
            StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => {
                Err(SummarizationClientError::ProviderUnavailable(format!(
                    "Hugging Face rejected the API token for model '{}'; check HF_API_TOKEN",
                    self.model
                )))
            }
            status => Err(SummarizationClientError::ProviderUnavailable(format!(
                "Hugging Face returned {status} for model '{}'",
                self.model
            ))),
        }
    }

    fn describe(&self) -> String {
        format!("huggingface/{}", self.model)
    }
}
