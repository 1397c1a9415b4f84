use axum::{
    extract::{multipart::MultipartError, Multipart, State},
    http::StatusCode,
    Json,
};
use chrono::{DateTime, Utc};
use serde::Serialize;
use tracing::info;
use uuid::Uuid;

use crate::errors::AppError;
use crate::models::resume::NormalizedDocument;
use crate::normalize::{validate, DocumentFormat, RawDocument, ValidationReport};
use crate::state::AppState;

const FILE_FIELD: &str = "file";

#[derive(Debug, Serialize)]
pub struct NormalizeResponse {
    pub upload_id: Uuid,
    pub processed_at: DateTime<Utc>,
    pub source_format: DocumentFormat,
    pub document: NormalizedDocument,
    pub validation: ValidationReport,
}

/// POST /api/v1/resumes/normalize
pub async fn handle_normalize(
    State(state): State<AppState>,
    mut multipart: Multipart,
) -> Result<Json<NormalizeResponse>, AppError> {
    let upload_id = Uuid::new_v4();
    let raw = read_upload(&state, &mut multipart).await?;
    info!(%upload_id, file = %raw.file_name, bytes = raw.bytes.len(), "Received resume upload");

    // Extraction and parsing are CPU-bound — keep them off the async executor.
    let pipeline = state.pipeline.clone();
    let output = tokio::task::spawn_blocking(move || pipeline.run(&raw))
        .await
        .map_err(|e| AppError::Internal(anyhow::anyhow!("spawn_blocking failed in pipeline: {e}")))??;

    info!(
        %upload_id,
        format = %output.format,
        valid = output.validation.is_valid,
        "Resume normalized"
    );

    Ok(Json(NormalizeResponse {
        upload_id,
        processed_at: Utc::now(),
        source_format: output.format,
        document: output.document,
        validation: output.validation,
    }))
}

/// POST /api/v1/resumes/validate
pub async fn handle_validate(Json(doc): Json<NormalizedDocument>) -> Json<ValidationReport> {
    Json(validate(&doc))
}

/// Reads the `file` field; other fields are skipped.
async fn read_upload(state: &AppState, multipart: &mut Multipart) -> Result<RawDocument, AppError> {
    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| multipart_error(state, e))?
    {
        if field.name() != Some(FILE_FIELD) {
            continue;
        }

        let file_name = field.file_name().unwrap_or_default().to_string();
        let content_type = field.content_type().map(str::to_string);
        let bytes = field.bytes().await.map_err(|e| multipart_error(state, e))?;

        return Ok(RawDocument::new(file_name, content_type.as_deref(), bytes));
    }

    Err(AppError::Validation(format!(
        "Multipart field '{FILE_FIELD}' is required"
    )))
}

fn multipart_error(state: &AppState, err: MultipartError) -> AppError {
    if err.status() == StatusCode::PAYLOAD_TOO_LARGE {
        AppError::PayloadTooLarge(format!(
            "Upload exceeds the {} byte limit",
            state.config.max_upload_bytes
        ))
    } else {
        AppError::Validation(format!("Malformed multipart body: {}", err.body_text()))
    }
}
