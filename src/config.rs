use crate::processing::chunking::DEFAULT_CHUNK_MAX_SIZE;
use serde::Deserialize;
use std::env;
use std::path::PathBuf;
use std::sync::OnceLock;
use thiserror::Error;

const DEFAULT_SUMMARIZER_MODEL: &str = "sshleifer/distilbart-cnn-12-6";
const DEFAULT_HF_API_URL: &str = "https://api-inference.huggingface.co";
const DEFAULT_OLLAMA_URL: &str = "http://127.0.0.1:11434";
const DEFAULT_CHUNK_TOKENIZER: &str = "cl100k_base";
const DEFAULT_UPLOAD_MAX_BYTES: usize = 16 * 1024 * 1024;

/// Errors encountered while loading configuration from environment variables.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// Environment variable contained a value that could not be parsed.
    #[error("Invalid value for environment variable: {0}")]
    InvalidValue(String),
    /// Configuration was installed twice.
    #[error("Configuration already initialized")]
    AlreadyInitialized,
}

/// Runtime configuration for the summarization server.
#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    /// Backend hosting the summarization model.
    pub summarizer_provider: SummarizerProvider,
    /// Model identifier passed to the provider.
    pub summarizer_model: String,
    /// Base URL of the Hugging Face Inference API.
    pub hf_api_url: String,
    /// Optional bearer token for the Hugging Face Inference API.
    pub hf_api_token: Option<String>,
    /// Base URL of the local Ollama runtime.
    pub ollama_url: String,
    /// Upper bound for a single chunk, expressed in `chunk_measure` units.
    pub chunk_max_size: usize,
    /// Unit used to measure chunk length.
    pub chunk_measure: ChunkMeasure,
    /// Tokenizer encoding or model name used when `chunk_measure` is `tokens`.
    pub chunk_tokenizer: String,
    /// Maximum accepted request body size for uploads.
    pub upload_max_bytes: usize,
    /// Directory receiving scoped upload files (system temp dir when unset).
    pub upload_tmp_dir: Option<PathBuf>,
    /// Optional override for the HTTP server port.
    pub server_port: Option<u16>,
}

/// Supported summarization backends.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SummarizerProvider {
    /// Hosted Hugging Face Inference API.
    HuggingFace,
    /// Local Ollama runtime.
    Ollama,
}

/// Unit used when bounding chunk sizes.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ChunkMeasure {
    /// Unicode characters of the space-joined chunk.
    #[default]
    Characters,
    /// BPE tokens of the space-joined chunk.
    Tokens,
}

impl Config {
    /// Load configuration from environment variables, performing validation along the way.
    pub fn from_env() -> Result<Self, ConfigError> {
        let chunk_max_size = parse_optional::<usize>("CHUNK_MAX_SIZE")?
            .unwrap_or(DEFAULT_CHUNK_MAX_SIZE);
        if chunk_max_size == 0 {
            return Err(ConfigError::InvalidValue("CHUNK_MAX_SIZE".into()));
        }

        Ok(Self {
            summarizer_provider: load_env_optional("SUMMARIZER_PROVIDER")
                .map(|value| {
                    value
                        .parse()
                        .map_err(|()| ConfigError::InvalidValue("SUMMARIZER_PROVIDER".into()))
                })
                .transpose()?
                .unwrap_or(SummarizerProvider::HuggingFace),
            summarizer_model: load_env_optional("SUMMARIZER_MODEL")
                .unwrap_or_else(|| DEFAULT_SUMMARIZER_MODEL.to_string()),
            hf_api_url: load_env_optional("HF_API_URL")
                .unwrap_or_else(|| DEFAULT_HF_API_URL.to_string()),
            hf_api_token: load_env_optional("HF_API_TOKEN"),
            ollama_url: load_env_optional("OLLAMA_URL")
                .unwrap_or_else(|| DEFAULT_OLLAMA_URL.to_string()),
            chunk_max_size,
            chunk_measure: load_env_optional("CHUNK_MEASURE")
                .map(|value| {
                    value
                        .parse()
                        .map_err(|()| ConfigError::InvalidValue("CHUNK_MEASURE".into()))
                })
                .transpose()?
                .unwrap_or_default(),
            chunk_tokenizer: load_env_optional("CHUNK_TOKENIZER")
                .unwrap_or_else(|| DEFAULT_CHUNK_TOKENIZER.to_string()),
            upload_max_bytes: parse_optional("UPLOAD_MAX_BYTES")?
                .unwrap_or(DEFAULT_UPLOAD_MAX_BYTES),
            upload_tmp_dir: load_env_optional("UPLOAD_TMP_DIR").map(PathBuf::from),
            server_port: parse_optional("SERVER_PORT")?,
        })
    }
}

fn load_env_optional(key: &str) -> Option<String> {
    env::var(key).ok().filter(|value| !value.trim().is_empty())
}

fn parse_optional<T: std::str::FromStr>(key: &str) -> Result<Option<T>, ConfigError> {
    load_env_optional(key)
        .map(|value| {
            value
                .trim()
                .parse()
                .map_err(|_| ConfigError::InvalidValue(key.to_string()))
        })
        .transpose()
}

impl std::str::FromStr for SummarizerProvider {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "huggingface" | "hf" => Ok(Self::HuggingFace),
            "ollama" => Ok(Self::Ollama),
            _ => Err(()),
        }
    }
}

impl std::str::FromStr for ChunkMeasure {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "characters" | "chars" => Ok(Self::Characters),
            "tokens" => Ok(Self::Tokens),
            _ => Err(()),
        }
    }
}

/// Global configuration cache populated during process start.
pub static CONFIG: OnceLock<Config> = OnceLock::new();

/// Retrieve the loaded configuration, panicking if initialization has not occurred.
pub fn get_config() -> &'static Config {
    CONFIG.get().expect("Config not initialized")
}

/// Load configuration from the environment and install it in the global cache.
pub fn init_config() -> Result<&'static Config, ConfigError> {
    dotenvy::dotenv().ok();
    let config = Config::from_env()?;
    tracing::debug!(
        provider = ?config.summarizer_provider,
        model = %config.summarizer_model,
        chunk_max_size = config.chunk_max_size,
        chunk_measure = ?config.chunk_measure,
        server_port = ?config.server_port,
        "Loaded configuration"
    );
    CONFIG
        .set(config)
        .map_err(|_| ConfigError::AlreadyInitialized)?;
    Ok(get_config())
}
