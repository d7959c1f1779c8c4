use std::sync::Arc;

use axum::extract::{DefaultBodyLimit, Multipart, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Json, Router};
use serde::Serialize;
use serde_json::json;
use thiserror::Error;
use tower_http::cors::CorsLayer;
use tower_http::limit::RequestBodyLimitLayer;
use tower_http::trace::TraceLayer;

use fayda_ocr::{assess_sharpness_bytes, IdRecord, SharpnessReport};

use crate::AppState;

/// Uploads larger than this are camera originals nobody downscaled.
const MAX_UPLOAD_BYTES: usize = 15 * 1024 * 1024;

const ACCEPTED_CONTENT_TYPES: &[&str] = &["image/jpeg", "image/png", "image/jpg"];

pub fn router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/api/v1/health", get(health))
        .route("/api/v1/extract-id", post(extract_id))
        .route("/api/v1/check-blur", post(check_blur))
        .layer(DefaultBodyLimit::disable())
        .layer(RequestBodyLimitLayer::new(MAX_UPLOAD_BYTES))
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

// ── Errors ───────────────────────────────────────────────────────────────────

#[derive(Debug, Error)]
pub enum ApiError {
    #[error("Invalid file type. Please upload JPEG or PNG.")]
    UnsupportedMediaType,
    #[error("Multipart upload must contain a `file` field")]
    MissingFile,
    #[error("Malformed upload: {0}")]
    BadUpload(String),
    #[error(transparent)]
    Pipeline(#[from] fayda_ocr::PipelineError),
}

impl ApiError {
    fn status(&self) -> StatusCode {
        match self {
            ApiError::UnsupportedMediaType => StatusCode::BAD_REQUEST,
            ApiError::MissingFile | ApiError::BadUpload(_) => StatusCode::UNPROCESSABLE_ENTITY,
            ApiError::Pipeline(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        if let ApiError::Pipeline(e) = &self {
            tracing::warn!("scan pipeline failed: {e}");
        }
        (self.status(), Json(json!({ "detail": self.to_string() }))).into_response()
    }
}

// ── Upload handling ──────────────────────────────────────────────────────────

struct Upload {
    filename: String,
    bytes: Vec<u8>,
}

fn is_accepted(content_type: &str) -> bool {
    ACCEPTED_CONTENT_TYPES.contains(&content_type)
}

/// Pull the `file` part out of a multipart body, enforcing the image
/// content-type whitelist.
async fn read_upload(mut multipart: Multipart) -> Result<Upload, ApiError> {
    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| ApiError::BadUpload(e.to_string()))?
    {
        if field.name() != Some("file") {
            continue;
        }
        let filename = field.file_name().unwrap_or("upload").to_string();
        let content_type = field.content_type().unwrap_or_default().to_string();
        if !is_accepted(&content_type) {
            return Err(ApiError::UnsupportedMediaType);
        }
        let bytes = field
            .bytes()
            .await
            .map_err(|e| ApiError::BadUpload(e.to_string()))?;
        return Ok(Upload {
            filename,
            bytes: bytes.to_vec(),
        });
    }
    Err(ApiError::MissingFile)
}

// ── Handlers ─────────────────────────────────────────────────────────────────

async fn health() -> Json<serde_json::Value> {
    Json(json!({ "status": "ok" }))
}

#[derive(Serialize)]
struct ExtractResponse {
    filename: String,
    status: &'static str,
    quality: SharpnessReport,
    data: Option<IdRecord>,
}

async fn extract_id(
    State(state): State<Arc<AppState>>,
    multipart: Multipart,
) -> Result<Json<ExtractResponse>, ApiError> {
    let upload = read_upload(multipart).await?;
    let report = state.pipeline.process_bytes(&upload.bytes)?;

    match &report.record {
        Some(record) => tracing::info!(
            filename = %upload.filename,
            fields = record.populated_len(),
            score = report.quality.score,
            "ID scan complete"
        ),
        None => tracing::info!(
            filename = %upload.filename,
            score = report.quality.score,
            "upload rejected by quality gate"
        ),
    }

    let status = if report.record.is_some() {
        "ok"
    } else {
        "not ready"
    };
    Ok(Json(ExtractResponse {
        filename: upload.filename,
        status,
        quality: report.quality,
        data: report.record,
    }))
}

#[derive(Serialize)]
struct BlurResponse {
    status: &'static str,
    message: &'static str,
    score: f64,
}

async fn check_blur(
    State(state): State<Arc<AppState>>,
    multipart: Multipart,
) -> Result<Json<BlurResponse>, ApiError> {
    let upload = read_upload(multipart).await?;
    let report = assess_sharpness_bytes(&upload.bytes, state.sharpness_threshold);

    let response = if report.is_clear {
        BlurResponse {
            status: "ready",
            message: "Image quality is optimal for extraction.",
            score: report.score,
        }
    } else {
        BlurResponse {
            status: "not ready",
            message: "Image is blurry. Please retake.",
            score: report.score,
        }
    };
    Ok(Json(response))
}
