//! HTTP API
//!
//! JSON endpoints over the [`Pipeline`]. Successful pipeline calls answer
//! `{"success": true, "data": {...}}`; failures answer
//! `{"success": false, "error": "..."}` with a status chosen per endpoint.

use crate::error::{ErrorKind, FetchError};
use crate::pipeline::{parse_url, Pipeline};
use crate::transcript::{extract_video_id, TranscriptError, TranscriptProvider};
use crate::types::{ContentFormat, DocType, ExtractionRequest, FetchRequest};
use axum::extract::rejection::JsonRejection;
use axum::extract::{Json, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::Router;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use serde_json::json;
use std::future::Future;
use std::sync::Arc;
use tower_http::trace::TraceLayer;
use tracing::{error, info, warn};

/// Shared state handed to every handler
#[derive(Clone)]
pub struct AppState {
    pipeline: Arc<Pipeline>,
    transcripts: Option<Arc<dyn TranscriptProvider>>,
}

impl AppState {
    /// Create state around a pipeline
    pub fn new(pipeline: Arc<Pipeline>) -> Self {
        Self {
            pipeline,
            transcripts: None,
        }
    }

    /// Attach a transcript provider
    pub fn with_transcripts(mut self, provider: Arc<dyn TranscriptProvider>) -> Self {
        self.transcripts = Some(provider);
        self
    }
}

/// Body of the legacy PDF-only endpoint
#[derive(Debug, Clone, Default, Serialize, Deserialize, JsonSchema)]
#[serde(default)]
pub struct PdfTextRequest {
    /// The PDF URL
    pub url: String,
}

/// Body of the transcript endpoint
#[derive(Debug, Clone, Default, Serialize, Deserialize, JsonSchema)]
#[serde(default)]
pub struct TranscriptRequest {
    /// A YouTube watch or youtu.be URL
    pub url: String,
}

#[derive(Debug, Serialize)]
struct FetchUrlData {
    text: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    content_type: Option<String>,
}

#[derive(Debug, Serialize)]
struct TextData {
    text: String,
}

/// Error response for pipeline endpoints
#[derive(Debug)]
pub struct ApiError {
    status: StatusCode,
    message: String,
}

impl ApiError {
    fn new(status: StatusCode, err: &FetchError) -> Self {
        match err.kind() {
            ErrorKind::Internal => error!(error = %err, "Request failed"),
            _ => warn!(error = %err, status = status.as_u16(), "Request failed"),
        }
        Self {
            status,
            message: err.to_string(),
        }
    }

    /// Status mapping for `/fetch_url/`
    fn for_fetch(err: FetchError) -> Self {
        let status = match err.kind() {
            ErrorKind::InvalidInput | ErrorKind::UnsupportedType => StatusCode::BAD_REQUEST,
            ErrorKind::RobotsDenied => StatusCode::FORBIDDEN,
            ErrorKind::UpstreamFetch => err
                .upstream_status()
                .and_then(|s| StatusCode::from_u16(s).ok())
                .unwrap_or(StatusCode::INTERNAL_SERVER_ERROR),
            ErrorKind::Parse | ErrorKind::Internal => StatusCode::INTERNAL_SERVER_ERROR,
        };
        Self::new(status, &err)
    }

    /// Status mapping for `/extract_file_text/`
    fn for_extract(err: FetchError) -> Self {
        let status = match err.kind() {
            ErrorKind::InvalidInput | ErrorKind::UnsupportedType => StatusCode::BAD_REQUEST,
            ErrorKind::RobotsDenied => StatusCode::FORBIDDEN,
            ErrorKind::UpstreamFetch | ErrorKind::Parse | ErrorKind::Internal => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        };
        Self::new(status, &err)
    }

    /// Status mapping for the legacy `/extract_pdf_text/`
    fn for_legacy_pdf(err: FetchError) -> Self {
        let status = match err.kind() {
            ErrorKind::InvalidInput | ErrorKind::UnsupportedType | ErrorKind::UpstreamFetch => {
                StatusCode::BAD_REQUEST
            }
            ErrorKind::RobotsDenied => StatusCode::FORBIDDEN,
            ErrorKind::Parse | ErrorKind::Internal => StatusCode::INTERNAL_SERVER_ERROR,
        };
        Self::new(status, &err)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let body = json!({ "success": false, "error": self.message });
        (self.status, Json(body)).into_response()
    }
}

fn success<T: Serialize>(data: T) -> Response {
    Json(json!({ "success": true, "data": data })).into_response()
}

fn body_error(rejection: JsonRejection) -> FetchError {
    FetchError::InvalidBody(rejection.body_text())
}

/// Build the API router
pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health_handler))
        .route("/fetch_url", post(fetch_url_handler))
        .route("/fetch_url/", post(fetch_url_handler))
        .route("/extract_file_text", post(extract_file_text_handler))
        .route("/extract_file_text/", post(extract_file_text_handler))
        .route("/extract_pdf_text", post(extract_pdf_text_handler))
        .route("/extract_pdf_text/", post(extract_pdf_text_handler))
        .route("/transcript", post(transcript_handler))
        .route("/transcript/", post(transcript_handler))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Serve the API until `shutdown` resolves
pub async fn serve<F>(
    listener: tokio::net::TcpListener,
    state: AppState,
    shutdown: F,
) -> std::io::Result<()>
where
    F: Future<Output = ()> + Send + 'static,
{
    if let Ok(addr) = listener.local_addr() {
        info!("API server listening on {}", addr);
    }
    axum::serve(listener, router(state))
        .with_graceful_shutdown(shutdown)
        .await
}

async fn health_handler() -> impl IntoResponse {
    Json(json!({ "status": "ok" }))
}

async fn fetch_url_handler(
    State(state): State<AppState>,
    body: Result<Json<FetchRequest>, JsonRejection>,
) -> Response {
    let Json(request) = match body {
        Ok(body) => body,
        Err(rejection) => return ApiError::for_fetch(body_error(rejection)).into_response(),
    };

    match state.pipeline.fetch_url(&request).await {
        Ok(result) => {
            let content_type = match result.format {
                ContentFormat::Raw if !result.content_type.is_empty() => Some(result.content_type),
                _ => None,
            };
            success(FetchUrlData {
                text: result.text,
                content_type,
            })
        }
        Err(err) => ApiError::for_fetch(err).into_response(),
    }
}

async fn extract_file_text_handler(
    State(state): State<AppState>,
    body: Result<Json<ExtractionRequest>, JsonRejection>,
) -> Response {
    let Json(request) = match body {
        Ok(body) => body,
        Err(rejection) => return ApiError::for_extract(body_error(rejection)).into_response(),
    };

    match state.pipeline.extract_file_text(&request).await {
        Ok(doc) => success(TextData { text: doc.text }),
        Err(err) => ApiError::for_extract(err).into_response(),
    }
}

async fn extract_pdf_text_handler(
    State(state): State<AppState>,
    body: Result<Json<PdfTextRequest>, JsonRejection>,
) -> Response {
    let Json(request) = match body {
        Ok(body) => body,
        Err(rejection) => return ApiError::for_legacy_pdf(body_error(rejection)).into_response(),
    };

    let url = match parse_url(&request.url) {
        Ok(url) => url,
        Err(err) => return ApiError::for_legacy_pdf(err).into_response(),
    };

    match state.pipeline.extract_document(&url, DocType::Pdf).await {
        Ok(doc) => success(TextData { text: doc.text }),
        Err(err) => ApiError::for_legacy_pdf(err).into_response(),
    }
}

fn transcript_error(status: StatusCode, message: impl Into<String>) -> Response {
    (status, Json(json!({ "error": message.into() }))).into_response()
}

async fn transcript_handler(
    State(state): State<AppState>,
    body: Result<Json<TranscriptRequest>, JsonRejection>,
) -> Response {
    let video_id = match &body {
        Ok(Json(request)) => extract_video_id(&request.url),
        Err(_) => None,
    };
    let Some(video_id) = video_id else {
        return transcript_error(StatusCode::BAD_REQUEST, "Invalid YouTube URL");
    };

    let Some(provider) = state.transcripts.as_ref() else {
        error!("Transcript request received but no provider is configured");
        return transcript_error(
            StatusCode::INTERNAL_SERVER_ERROR,
            "Transcript provider is not configured",
        );
    };

    match provider.transcript(video_id).await {
        Ok(segments) => Json(json!({ "transcript": segments })).into_response(),
        Err(err) => {
            let status = match err {
                TranscriptError::Disabled => StatusCode::FORBIDDEN,
                TranscriptError::Unavailable => StatusCode::NOT_FOUND,
                TranscriptError::RateLimited => StatusCode::TOO_MANY_REQUESTS,
                TranscriptError::Other(_) => StatusCode::INTERNAL_SERVER_ERROR,
            };
            warn!(provider = provider.name(), video_id, error = %err, "Transcript lookup failed");
            transcript_error(status, err.to_string())
        }
    }
}
