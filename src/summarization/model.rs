use super::{SummarizationClient, SummarizationClientError};
use std::sync::{Arc, OnceLock};
use thiserror::Error;

/// Errors raised while loading the summarization model.
#[derive(Debug, Error)]
pub enum ModelLoadError {
    /// The provider failed its readiness probe.
    #[error("Summarization model failed to load: {0}")]
    Probe(#[source] SummarizationClientError),
    /// `load` was called on a model that is already loaded.
    #[error("Summarization model is already loaded")]
    AlreadyLoaded,
}

/// Handle to the loaded summarization capability.
///
/// Created empty, loaded exactly once by the process entry point before the server accepts
/// traffic, and shared read-only afterwards. The processing pipeline receives the handle at
/// construction and consults [`SummarizationModel::is_loaded`] before doing any work.
#[derive(Default)]
pub struct SummarizationModel {
    client: OnceLock<Arc<dyn SummarizationClient>>,
}

impl SummarizationModel {
    /// Create an unloaded model handle.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a handle that is already loaded with `client`, skipping the readiness probe.
    pub fn with_client(client: Arc<dyn SummarizationClient>) -> Self {
        let model = Self::new();
        let _ = model.client.set(client);
        model
    }

    /// Probe `client` and install it as the loaded model.
    pub async fn load(&self, client: Arc<dyn SummarizationClient>) -> Result<(), ModelLoadError> {
        if self.is_loaded() {
            return Err(ModelLoadError::AlreadyLoaded);
        }
        let label = client.describe();
        tracing::info!(model = %label, "Loading summarization model");
        client.probe().await.map_err(ModelLoadError::Probe)?;
        self.client
            .set(client)
            .map_err(|_| ModelLoadError::AlreadyLoaded)?;
        tracing::info!(model = %label, "Summarization model loaded");
        Ok(())
    }

    /// Whether the model finished loading.
    pub fn is_loaded(&self) -> bool {
        self.client.get().is_some()
    }

    /// Loaded client, if any.
    pub fn client(&self) -> Option<&Arc<dyn SummarizationClient>> {
        self.client.get()
    }
}
