#![deny(missing_docs)]

//! Core library for the Rusty Summarizer HTTP service.

/// HTTP routing and REST handlers.
pub mod api;
/// Environment-driven configuration management.
pub mod config;
/// Structured logging and tracing setup.
pub mod logging;
/// Summarization metrics helpers.
pub mod metrics;
/// Extraction, chunking, and summarization pipeline.
pub mod processing;
/// Summarization provider clients and the loaded model handle.
pub mod summarization;
