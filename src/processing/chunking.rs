//! Word-bounded chunking ahead of summarization.
//!
//! Summarization models accept a bounded input, so long documents are split into chunks that are
//! summarized independently. Highlights:
//!
//! - Greedy packing: words are appended to the current chunk (joined by single spaces) until the
//!   next word would push it past the bound, at which point a new chunk starts.
//! - Soft bound: a single word longer than the bound still gets its own chunk, unsplit.
//! - Measures: the bound is counted in characters by default; `CHUNK_MEASURE=tokens` counts BPE
//!   tokens with `tiktoken-rs` instead. The packing algorithm is the same for both.

use crate::config::ChunkMeasure;
use anyhow::Error as TokenizerError;
use std::sync::Arc;
use tiktoken_rs::{
    CoreBPE, cl100k_base, get_bpe_from_model, o200k_base, p50k_base, p50k_edit, r50k_base,
};

use super::types::ChunkingError;

/// Length measure applied to candidate chunks.
pub type TokenCounter = Arc<dyn Fn(&str) -> usize + Send + Sync>;

/// Default chunk bound, in characters.
pub const DEFAULT_CHUNK_MAX_SIZE: usize = 1024;

/// Split `text` into chunks of at most `max_size` characters.
///
/// Returns an empty vector when the input has no words.
pub fn chunk_text(text: &str, max_size: usize) -> Vec<String> {
    chunk_text_with_counter(text, max_size, &character_counter())
}

/// Split `text` into chunks whose length under `counter` does not exceed `max_size`.
///
/// The space-join of the returned chunks reproduces the whitespace-delimited words of `text` in
/// order. Chunks are never empty.
pub fn chunk_text_with_counter(text: &str, max_size: usize, counter: &TokenCounter) -> Vec<String> {
    let mut chunks = Vec::new();
    let mut current = String::new();

    for word in text.split_whitespace() {
        if current.is_empty() {
            current.push_str(word);
            continue;
        }

        let mark = current.len();
        current.push(' ');
        current.push_str(word);
        if counter.as_ref()(&current) > max_size {
            current.truncate(mark);
            chunks.push(std::mem::take(&mut current));
            current.push_str(word);
        }
    }

    if !current.is_empty() {
        chunks.push(current);
    }

    chunks
}

/// Build the length counter for a configured measure.
///
/// `tokenizer` names a tiktoken model or encoding and is only consulted for
/// [`ChunkMeasure::Tokens`].
pub fn build_length_counter(
    measure: ChunkMeasure,
    tokenizer: &str,
) -> Result<TokenCounter, ChunkingError> {
    match measure {
        ChunkMeasure::Characters => Ok(character_counter()),
        ChunkMeasure::Tokens => build_tiktoken_counter(tokenizer),
    }
}

/// Counter measuring Unicode scalar values.
pub fn character_counter() -> TokenCounter {
    Arc::new(|segment: &str| segment.chars().count())
}

fn build_tiktoken_counter(tokenizer: &str) -> Result<TokenCounter, ChunkingError> {
    let normalized = tokenizer.trim();
    let target = if normalized.is_empty() {
        "cl100k_base"
    } else {
        normalized
    };
    let encoding = resolve_encoding(target).map_err(|source| ChunkingError::Tokenizer {
        tokenizer: target.to_string(),
        source,
    })?;
    let encoding = Arc::new(encoding);

    Ok(Arc::new(move |segment: &str| {
        encoding.encode_ordinary(segment).len()
    }))
}

fn resolve_encoding(name: &str) -> Result<CoreBPE, TokenizerError> {
    if let Some(candidate) = encoding_from_name(name) {
        return candidate;
    }
    match get_bpe_from_model(name) {
        Ok(encoding) => Ok(encoding),
        Err(model_err) => {
            tracing::warn!(
                tokenizer = name,
                error = %model_err,
                "Unknown tokenizer; falling back to 'cl100k_base' encoding"
            );
            cl100k_base()
        }
    }
}

fn encoding_from_name(name: &str) -> Option<Result<CoreBPE, TokenizerError>> {
    match name {
        "cl100k_base" => Some(cl100k_base()),
        "o200k_base" => Some(o200k_base()),
        "p50k_base" => Some(p50k_base()),
        "p50k_edit" => Some(p50k_edit()),
        "r50k_base" | "gpt2" => Some(r50k_base()),
        _ => None,
    }
}
