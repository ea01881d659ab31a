//! HTTP surface for Rusty Summarizer.
//!
//! This module exposes a compact Axum router:
//!
//! - `GET /` – Plain-text welcome message.
//! - `POST /summarize` – Summarize `{"text": "..."}` and return `{"summary": "..."}`.
//! - `POST /summarize-file` – Summarize a PDF, DOCX, or TXT upload sent as the multipart field
//!   `file`.
//! - `GET /metrics` – Observe summarization counters.
//!
//! Every route except `/` answers with JSON. Failures carry `{"error": "..."}` with status 400
//! for request problems, 413 for bodies over the size limit, and 500 for server-side ones. CORS is
//! open to any origin.

use crate::metrics::MetricsSnapshot;
use crate::processing::{ProcessingApi, SummarizeError, TextField, UploadField, UploadedFile};
use axum::{
    Json, Router,
    body::Bytes,
    extract::{
        DefaultBodyLimit, Multipart, State,
        multipart::{MultipartError, MultipartRejection},
        rejection::BytesRejection,
    },
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
};
use serde::Serialize;
use serde_json::json;
use std::sync::Arc;
use tower_http::cors::CorsLayer;

const WELCOME_MESSAGE: &str = "Welcome to the Text Summarization API!";

/// Build the HTTP router exposing the summarization API surface.
///
/// `body_limit` caps request bodies, uploads included, in bytes.
pub fn create_router<S>(service: Arc<S>, body_limit: usize) -> Router
where
    S: ProcessingApi + 'static,
{
    Router::new()
        .route("/", get(home))
        .route("/summarize", post(summarize_text::<S>))
        .route("/summarize-file", post(summarize_file::<S>))
        .route("/metrics", get(get_metrics::<S>))
        .layer(DefaultBodyLimit::max(body_limit))
        .layer(CorsLayer::permissive())
        .with_state(service)
}

async fn home() -> &'static str {
    WELCOME_MESSAGE
}

/// Success response for both summarize endpoints.
#[derive(Serialize)]
struct SummaryResponse {
    summary: String,
}

/// Summarize raw text from a JSON body.
///
/// The body is inspected by hand rather than through `Json<T>` so that malformed, incomplete,
/// or oversized payloads still produce the JSON error contract.
async fn summarize_text<S>(
    State(service): State<Arc<S>>,
    body: Result<Bytes, BytesRejection>,
) -> Result<Json<SummaryResponse>, AppError>
where
    S: ProcessingApi,
{
    let text = match body {
        Ok(body) => TextField::from_json_body(&body),
        Err(rejection) if rejection.status() == StatusCode::PAYLOAD_TOO_LARGE => {
            tracing::debug!(error = %rejection, "Summarize body over limit");
            TextField::TooLarge
        }
        Err(rejection) => {
            tracing::debug!(error = %rejection, "Summarize body unreadable");
            TextField::Missing
        }
    };
    let outcome = service.summarize_text(text).await?;
    tracing::info!(chunks = outcome.chunk_count, "Summarize request completed");
    Ok(Json(SummaryResponse {
        summary: outcome.summary,
    }))
}

/// Summarize an uploaded document sent as multipart field `file`.
async fn summarize_file<S>(
    State(service): State<Arc<S>>,
    multipart: Result<Multipart, MultipartRejection>,
) -> Result<Json<SummaryResponse>, AppError>
where
    S: ProcessingApi,
{
    let upload = match multipart {
        Ok(multipart) => read_upload(multipart).await,
        Err(rejection) => {
            tracing::debug!(error = %rejection, "Request is not multipart");
            UploadField::Missing
        }
    };
    let outcome = service.summarize_file(upload).await?;
    tracing::info!(chunks = outcome.chunk_count, "Summarize-file request completed");
    Ok(Json(SummaryResponse {
        summary: outcome.summary,
    }))
}

/// Find the `file` part of a multipart stream.
///
/// Only a part named `file` that carries a `filename` attribute counts as an upload; a plain
/// form field named `file` is skipped like any other field.
async fn read_upload(mut multipart: Multipart) -> UploadField {
    loop {
        let field = match multipart.next_field().await {
            Ok(Some(field)) => field,
            Ok(None) => return UploadField::Missing,
            Err(error) => return upload_error(error),
        };
        if field.name() != Some("file") {
            continue;
        }
        let Some(filename) = field.file_name().map(str::to_string) else {
            continue;
        };
        return match field.bytes().await {
            Ok(content) => UploadField::File(UploadedFile {
                filename,
                content: content.to_vec(),
            }),
            Err(error) => upload_error(error),
        };
    }
}

fn upload_error(error: MultipartError) -> UploadField {
    if error.status() == StatusCode::PAYLOAD_TOO_LARGE {
        UploadField::TooLarge
    } else {
        UploadField::Malformed(error.body_text())
    }
}

/// Return the current summarization counters.
async fn get_metrics<S>(State(service): State<Arc<S>>) -> Json<MetricsSnapshot>
where
    S: ProcessingApi,
{
    Json(service.metrics_snapshot())
}

struct AppError(SummarizeError);

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = if matches!(self.0, SummarizeError::PayloadTooLarge) {
            StatusCode::PAYLOAD_TOO_LARGE
        } else if self.0.is_client_error() {
            StatusCode::BAD_REQUEST
        } else {
            tracing::error!(error = %self.0, "Request failed");
            StatusCode::INTERNAL_SERVER_ERROR
        };
        (status, Json(json!({ "error": self.0.to_string() }))).into_response()
    }
}

impl From<SummarizeError> for AppError {
    fn from(inner: SummarizeError) -> Self {
        Self(inner)
    }
}

#[cfg(test)]
mod tests {
    use super::create_router;
    use crate::metrics::MetricsSnapshot;
    use crate::processing::{
        ProcessingApi, SummarizeError, SummaryOutcome, TextField, UploadField,
    };
    use crate::summarization::SummarizationClientError;
    use async_trait::async_trait;
    use axum::{
        body::{Body, to_bytes},
        http::{Method, Request, StatusCode, header},
    };
    use std::sync::Arc;
    use tokio::sync::Mutex;
    use tower::ServiceExt;

    #[derive(Clone, Debug)]
    enum Call {
        Text(TextField),
        File(Option<(String, Vec<u8>)>),
    }

    #[derive(Default)]
    struct StubProcessingService {
        calls: Mutex<Vec<Call>>,
    }

    impl StubProcessingService {
        async fn recorded_calls(&self) -> Vec<Call> {
            self.calls.lock().await.clone()
        }
    }

    #[async_trait]
    impl ProcessingApi for StubProcessingService {
        async fn summarize_text(&self, text: TextField) -> Result<SummaryOutcome, SummarizeError> {
            self.calls.lock().await.push(Call::Text(text.clone()));
            match text {
                TextField::Text(text) if text == "explode" => Err(SummarizeError::Summarization(
                    SummarizationClientError::GenerationFailed("stub failure".into()),
                )),
                TextField::TooLarge => Err(SummarizeError::PayloadTooLarge),
                TextField::Text(_) => Ok(SummaryOutcome {
                    summary: "stub summary".into(),
                    chunk_count: 1,
                }),
                _ => Err(SummarizeError::MissingText),
            }
        }

        async fn summarize_file(
            &self,
            upload: UploadField,
        ) -> Result<SummaryOutcome, SummarizeError> {
            let recorded = match &upload {
                UploadField::File(file) => Some((file.filename.clone(), file.content.clone())),
                _ => None,
            };
            self.calls.lock().await.push(Call::File(recorded));
            match upload {
                UploadField::File(_) => Ok(SummaryOutcome {
                    summary: "file summary".into(),
                    chunk_count: 2,
                }),
                UploadField::Missing => Err(SummarizeError::NoFile),
                UploadField::Malformed(message) => Err(SummarizeError::InvalidUpload(message)),
                UploadField::TooLarge => Err(SummarizeError::PayloadTooLarge),
            }
        }

        fn metrics_snapshot(&self) -> MetricsSnapshot {
            MetricsSnapshot {
                documents_summarized: 4,
                chunks_summarized: 9,
                last_chunk_count: Some(2),
            }
        }
    }

    fn multipart_body(boundary: &str, name: &str, filename: &str, content: &str) -> String {
        format!(
            "--{boundary}\r\nContent-Disposition: form-data; name=\"note\"\r\n\r\nignored\r\n\
             --{boundary}\r\nContent-Disposition: form-data; name=\"{name}\"; filename=\"{filename}\"\r\n\
             Content-Type: application/octet-stream\r\n\r\n{content}\r\n--{boundary}--\r\n"
        )
    }

    async fn json_body(response: axum::response::Response) -> serde_json::Value {
        let body = to_bytes(response.into_body(), usize::MAX)
            .await
            .expect("body bytes");
        serde_json::from_slice(&body).expect("json body")
    }

    #[tokio::test]
    async fn root_returns_welcome_text() {
        let app = create_router(Arc::new(StubProcessingService::default()), 1024);
        let response = app
            .oneshot(Request::builder().uri("/").body(Body::empty()).expect("request"))
            .await
            .expect("router response");

        assert_eq!(response.status(), StatusCode::OK);
        let body = to_bytes(response.into_body(), usize::MAX)
            .await
            .expect("body bytes");
        assert_eq!(&body[..], b"Welcome to the Text Summarization API!");
    }

    #[tokio::test]
    async fn summarize_route_passes_text_field() {
        let service = Arc::new(StubProcessingService::default());
        let app = create_router(service.clone(), 1024);

        let response = app
            .oneshot(
                Request::builder()
                    .method(Method::POST)
                    .uri("/summarize")
                    .header(header::CONTENT_TYPE, "application/json")
                    .body(Body::from(r#"{"text": "Document body"}"#))
                    .expect("request"),
            )
            .await
            .expect("router response");

        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(json_body(response).await["summary"], "stub summary");

        let calls = service.recorded_calls().await;
        assert!(matches!(
            calls.as_slice(),
            [Call::Text(TextField::Text(text))] if text == "Document body"
        ));
    }

    #[tokio::test]
    async fn malformed_json_maps_to_missing_text() {
        let service = Arc::new(StubProcessingService::default());
        let app = create_router(service.clone(), 1024);

        let response = app
            .oneshot(
                Request::builder()
                    .method(Method::POST)
                    .uri("/summarize")
                    .body(Body::from("{not json"))
                    .expect("request"),
            )
            .await
            .expect("router response");

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        assert_eq!(json_body(response).await["error"], "No text provided.");
        assert!(matches!(
            service.recorded_calls().await.as_slice(),
            [Call::Text(TextField::Missing)]
        ));
    }

    #[tokio::test]
    async fn server_errors_use_500_with_json_message() {
        let app = create_router(Arc::new(StubProcessingService::default()), 1024);

        let response = app
            .oneshot(
                Request::builder()
                    .method(Method::POST)
                    .uri("/summarize")
                    .body(Body::from(r#"{"text": "explode"}"#))
                    .expect("request"),
            )
            .await
            .expect("router response");

        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(
            json_body(response).await["error"],
            "Failed to generate summary: stub failure"
        );
    }

    #[tokio::test]
    async fn summarize_file_reads_file_part() {
        let service = Arc::new(StubProcessingService::default());
        let app = create_router(service.clone(), 1024 * 1024);
        let boundary = "TEST_BOUNDARY";

        let response = app
            .oneshot(
                Request::builder()
                    .method(Method::POST)
                    .uri("/summarize-file")
                    .header(
                        header::CONTENT_TYPE,
                        format!("multipart/form-data; boundary={boundary}"),
                    )
                    .body(Body::from(multipart_body(
                        boundary,
                        "file",
                        "notes.txt",
                        "Hello world.",
                    )))
                    .expect("request"),
            )
            .await
            .expect("router response");

        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(json_body(response).await["summary"], "file summary");
        let calls = service.recorded_calls().await;
        assert!(matches!(
            calls.as_slice(),
            [Call::File(Some((filename, content)))]
                if filename == "notes.txt" && content.as_slice() == b"Hello world."
        ));
    }

    #[tokio::test]
    async fn summarize_file_without_file_part_is_missing() {
        let service = Arc::new(StubProcessingService::default());
        let app = create_router(service.clone(), 1024 * 1024);
        let boundary = "TEST_BOUNDARY";

        let response = app
            .oneshot(
                Request::builder()
                    .method(Method::POST)
                    .uri("/summarize-file")
                    .header(
                        header::CONTENT_TYPE,
                        format!("multipart/form-data; boundary={boundary}"),
                    )
                    .body(Body::from(multipart_body(
                        boundary,
                        "attachment",
                        "notes.txt",
                        "Hello world.",
                    )))
                    .expect("request"),
            )
            .await
            .expect("router response");

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        assert_eq!(json_body(response).await["error"], "No file provided.");
        assert!(matches!(
            service.recorded_calls().await.as_slice(),
            [Call::File(None)]
        ));
    }

    #[tokio::test]
    async fn file_field_without_filename_is_not_an_upload() {
        let service = Arc::new(StubProcessingService::default());
        let app = create_router(service.clone(), 1024 * 1024);
        let boundary = "TEST_BOUNDARY";
        let body = format!(
            "--{boundary}\r\nContent-Disposition: form-data; name=\"file\"\r\n\r\n\
             just a form value\r\n--{boundary}--\r\n"
        );

        let response = app
            .oneshot(
                Request::builder()
                    .method(Method::POST)
                    .uri("/summarize-file")
                    .header(
                        header::CONTENT_TYPE,
                        format!("multipart/form-data; boundary={boundary}"),
                    )
                    .body(Body::from(body))
                    .expect("request"),
            )
            .await
            .expect("router response");

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        assert_eq!(json_body(response).await["error"], "No file provided.");
        assert!(matches!(
            service.recorded_calls().await.as_slice(),
            [Call::File(None)]
        ));
    }

    #[tokio::test]
    async fn oversized_text_body_is_json_413() {
        let service = Arc::new(StubProcessingService::default());
        let app = create_router(service.clone(), 64);
        let text = "word ".repeat(80);

        let response = app
            .oneshot(
                Request::builder()
                    .method(Method::POST)
                    .uri("/summarize")
                    .header(header::CONTENT_TYPE, "application/json")
                    .body(Body::from(serde_json::json!({ "text": text }).to_string()))
                    .expect("request"),
            )
            .await
            .expect("router response");

        assert_eq!(response.status(), StatusCode::PAYLOAD_TOO_LARGE);
        assert_eq!(
            response.headers().get(header::CONTENT_TYPE).expect("content type"),
            "application/json"
        );
        assert_eq!(json_body(response).await["error"], "Request body is too large.");
        assert!(matches!(
            service.recorded_calls().await.as_slice(),
            [Call::Text(TextField::TooLarge)]
        ));
    }

    #[tokio::test]
    async fn non_multipart_upload_is_missing_file() {
        let app = create_router(Arc::new(StubProcessingService::default()), 1024);

        let response = app
            .oneshot(
                Request::builder()
                    .method(Method::POST)
                    .uri("/summarize-file")
                    .header(header::CONTENT_TYPE, "application/json")
                    .body(Body::from("{}"))
                    .expect("request"),
            )
            .await
            .expect("router response");

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        assert_eq!(json_body(response).await["error"], "No file provided.");
    }

    #[tokio::test]
    async fn metrics_route_serializes_snapshot() {
        let app = create_router(Arc::new(StubProcessingService::default()), 1024);

        let response = app
            .oneshot(
                Request::builder()
                    .uri("/metrics")
                    .body(Body::empty())
                    .expect("request"),
            )
            .await
            .expect("router response");

        assert_eq!(response.status(), StatusCode::OK);
        let json = json_body(response).await;
        assert_eq!(json["documents_summarized"], 4);
        assert_eq!(json["chunks_summarized"], 9);
        assert_eq!(json["last_chunk_count"], 2);
    }

    #[tokio::test]
    async fn cors_allows_any_origin() {
        let app = create_router(Arc::new(StubProcessingService::default()), 1024);

        let response = app
            .oneshot(
                Request::builder()
                    .uri("/")
                    .header(header::ORIGIN, "https://example.org")
                    .body(Body::empty())
                    .expect("request"),
            )
            .await
            .expect("router response");

        assert_eq!(
            response
                .headers()
                .get(header::ACCESS_CONTROL_ALLOW_ORIGIN)
                .expect("cors header"),
            "*"
        );
    }
}
