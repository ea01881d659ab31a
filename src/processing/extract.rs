//! Text extraction for uploaded documents.
//!
//! Each supported [`FileKind`] maps to one extractor function. Staging an upload on disk and
//! parsing it are both synchronous, so [`extract_upload`] runs them together on Tokio's blocking
//! pool.

use std::io::Write;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Errors raised while turning a document into text.
#[derive(Debug, Error)]
pub enum ExtractionError {
    /// The upload could not be written to temporary storage.
    #[error("Failed to stage uploaded file: {0}")]
    Staging(#[source] std::io::Error),
    /// The file could not be read from disk.
    #[error("Failed to read uploaded file: {0}")]
    Io(#[from] std::io::Error),
    /// The PDF parser rejected the document.
    #[error("Failed to extract text from PDF: {0}")]
    Pdf(String),
    /// The DOCX parser rejected the document.
    #[error("Failed to extract text from DOCX: {0}")]
    Docx(String),
    /// The plain-text file was not valid UTF-8.
    #[error("Failed to decode text file as UTF-8: {0}")]
    Encoding(String),
    /// The extraction task panicked or was cancelled.
    #[error("Text extraction for {kind} failed: {message}")]
    Task {
        /// Kind being extracted when the task failed.
        kind: FileKind,
        /// Description of the task failure.
        message: String,
    },
}

/// Document formats accepted for upload.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FileKind {
    /// Portable Document Format.
    Pdf,
    /// Office Open XML word-processing document.
    Docx,
    /// UTF-8 plain text.
    Txt,
}

impl FileKind {
    /// Classify a filename by its extension, case-insensitively.
    pub fn from_filename(filename: &str) -> Option<Self> {
        let (_, extension) = filename.rsplit_once('.')?;
        match extension.to_ascii_lowercase().as_str() {
            "pdf" => Some(Self::Pdf),
            "docx" => Some(Self::Docx),
            "txt" => Some(Self::Txt),
            _ => None,
        }
    }

    /// Canonical file extension, without the dot.
    pub fn extension(self) -> &'static str {
        match self {
            Self::Pdf => "pdf",
            Self::Docx => "docx",
            Self::Txt => "txt",
        }
    }
}

impl std::fmt::Display for FileKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(match self {
            Self::Pdf => "PDF",
            Self::Docx => "DOCX",
            Self::Txt => "TXT",
        })
    }
}

/// Extract the textual content of the file at `path`.
pub fn extract_text(path: &Path, kind: FileKind) -> Result<String, ExtractionError> {
    let bytes = std::fs::read(path)?;
    match kind {
        FileKind::Pdf => extract_pdf(&bytes),
        FileKind::Docx => extract_docx(&bytes),
        FileKind::Txt => extract_plain(bytes),
    }
}

/// Stage `content` in a scoped temporary file and extract its text on the blocking pool.
///
/// The file is created in `upload_dir` (the system temp dir when `None`) and removed before this
/// returns, whatever the outcome. A panic inside a parser is reported as
/// [`ExtractionError::Task`]; the temporary file is still removed while the panic unwinds.
pub async fn extract_upload(
    content: Vec<u8>,
    kind: FileKind,
    upload_dir: Option<PathBuf>,
) -> Result<String, ExtractionError> {
    let span = tracing::Span::current();
    tokio::task::spawn_blocking(move || {
        span.in_scope(|| extract_staged(&content, kind, upload_dir.as_deref()))
    })
    .await
    .map_err(|error| ExtractionError::Task {
        kind,
        message: error.to_string(),
    })?
}

fn extract_staged(
    content: &[u8],
    kind: FileKind,
    upload_dir: Option<&Path>,
) -> Result<String, ExtractionError> {
    let staged = stage_upload(content, kind, upload_dir).map_err(ExtractionError::Staging)?;
    tracing::debug!(path = %staged.path().display(), bytes = content.len(), "Upload staged");

    let extracted = extract_text(staged.path(), kind);
    if let Err(error) = staged.close() {
        tracing::warn!(error = %error, "Failed to remove staged upload");
    }
    extracted
}

fn stage_upload(
    content: &[u8],
    kind: FileKind,
    upload_dir: Option<&Path>,
) -> std::io::Result<tempfile::NamedTempFile> {
    let suffix = format!(".{}", kind.extension());
    let mut builder = tempfile::Builder::new();
    builder.prefix("upload-").suffix(&suffix);
    let mut staged = match upload_dir {
        Some(dir) => builder.tempfile_in(dir)?,
        None => builder.tempfile()?,
    };
    staged.write_all(content)?;
    staged.flush()?;
    Ok(staged)
}

fn extract_pdf(bytes: &[u8]) -> Result<String, ExtractionError> {
    pdf_extract::extract_text_from_mem(bytes).map_err(|e| ExtractionError::Pdf(e.to_string()))
}

fn extract_docx(bytes: &[u8]) -> Result<String, ExtractionError> {
    let docx = docx_rs::read_docx(bytes).map_err(|e| ExtractionError::Docx(e.to_string()))?;

    let mut text = String::new();
    for child in &docx.document.children {
        if let docx_rs::DocumentChild::Paragraph(paragraph) = child {
            push_paragraph_text(&mut text, &paragraph.children);
            text.push('\n');
        }
    }
    Ok(text)
}

fn push_paragraph_text(text: &mut String, children: &[docx_rs::ParagraphChild]) {
    for child in children {
        match child {
            docx_rs::ParagraphChild::Run(run) => push_run_text(text, run),
            docx_rs::ParagraphChild::Hyperlink(link) => push_paragraph_text(text, &link.children),
            _ => {}
        }
    }
}

fn push_run_text(text: &mut String, run: &docx_rs::Run) {
    for child in &run.children {
        match child {
            docx_rs::RunChild::Text(t) => text.push_str(&t.text),
            docx_rs::RunChild::Tab(_) => text.push('\t'),
            docx_rs::RunChild::Break(_) => text.push('\n'),
            _ => {}
        }
    }
}

fn extract_plain(bytes: Vec<u8>) -> Result<String, ExtractionError> {
    String::from_utf8(bytes).map_err(|e| ExtractionError::Encoding(e.to_string()))
}
