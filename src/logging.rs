//! Tracing configuration and log routing.
//!
//! Logs always go to stdout with a compact formatter. A second, non-blocking file layer is added
//! according to `SUMMARIZER_LOG_FILE`:
//!
//! - unset: `logs/rusty-summarizer.log`
//! - `off` or `none`: no file layer
//! - anything else: appended to that path, parent directories created on demand
use std::path::{Path, PathBuf};
use std::sync::OnceLock;

use tracing_appender::non_blocking::{NonBlocking, WorkerGuard};
use tracing_subscriber::{EnvFilter, fmt, prelude::*};

use crate::config::{ChunkMeasure, Config, SummarizerProvider};

static LOG_GUARD: OnceLock<WorkerGuard> = OnceLock::new();

const LOG_FILE_ENV: &str = "SUMMARIZER_LOG_FILE";
const DEFAULT_LOG_DIR: &str = "logs";
const DEFAULT_LOG_FILE_NAME: &str = "rusty-summarizer.log";

/// Where the file layer writes.
#[derive(Debug, Clone, PartialEq, Eq)]
enum LogFile {
    Disabled,
    Path(PathBuf),
}

impl LogFile {
    fn from_setting(setting: Option<&str>) -> Self {
        match setting.map(str::trim) {
            None | Some("") => Self::Path(Path::new(DEFAULT_LOG_DIR).join(DEFAULT_LOG_FILE_NAME)),
            Some(value)
                if value.eq_ignore_ascii_case("off") || value.eq_ignore_ascii_case("none") =>
            {
                Self::Disabled
            }
            Some(value) => Self::Path(PathBuf::from(value)),
        }
    }
}

/// Configure tracing subscribers for stdout and optional file logging.
///
/// `RUST_LOG` filters both layers and defaults to `info`. The file writer's guard lives for the
/// rest of the process so buffered lines are flushed on exit.
pub fn init_tracing() {
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let stdout_layer = fmt::layer().with_target(false).compact();

    let log_file = LogFile::from_setting(std::env::var(LOG_FILE_ENV).ok().as_deref());
    let file_layer = open_file_writer(&log_file).map(|writer| {
        fmt::layer()
            .with_writer(writer)
            .with_target(true)
            .with_ansi(false)
            .compact()
    });

    tracing_subscriber::registry()
        .with(env_filter)
        .with(stdout_layer)
        .with(file_layer)
        .init();

    if let LogFile::Path(path) = &log_file {
        tracing::debug!(path = %path.display(), "File logging enabled");
    }
}

/// Record the settings the server is about to run with.
///
/// The Hugging Face token is reported only as present or absent.
pub fn log_startup(config: &Config) {
    let endpoint = match config.summarizer_provider {
        SummarizerProvider::HuggingFace => config.hf_api_url.as_str(),
        SummarizerProvider::Ollama => config.ollama_url.as_str(),
    };
    tracing::info!(
        provider = ?config.summarizer_provider,
        model = %config.summarizer_model,
        endpoint,
        hf_token = config.hf_api_token.is_some(),
        "Summarization provider selected"
    );

    let tokenizer = match config.chunk_measure {
        ChunkMeasure::Tokens => Some(config.chunk_tokenizer.as_str()),
        ChunkMeasure::Characters => None,
    };
    tracing::info!(
        chunk_max_size = config.chunk_max_size,
        chunk_measure = ?config.chunk_measure,
        tokenizer,
        upload_max_bytes = config.upload_max_bytes,
        upload_dir = ?config.upload_tmp_dir,
        "Processing limits"
    );
}

/// Open the file destination as a non-blocking writer.
///
/// Returns `None` when file logging is disabled or the file cannot be opened; stdout logging
/// continues either way.
fn open_file_writer(log_file: &LogFile) -> Option<NonBlocking> {
    let LogFile::Path(path) = log_file else {
        return None;
    };
    if let Some(parent) = path.parent().filter(|parent| !parent.as_os_str().is_empty()) {
        if let Err(err) = std::fs::create_dir_all(parent) {
            eprintln!("Failed to create log directory {}: {err}", parent.display());
            return None;
        }
    }
    match std::fs::OpenOptions::new()
        .create(true)
        .append(true)
        .open(path)
    {
        Ok(file) => {
            let (non_blocking, guard) = tracing_appender::non_blocking(file);
            let _ = LOG_GUARD.set(guard);
            Some(non_blocking)
        }
        Err(err) => {
            eprintln!("Failed to open log file {}: {err}", path.display());
            None
        }
    }
}
