use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;

use crate::normalize::PipelineError;

/// Application-level error type.
/// Implements `IntoResponse` so Axum handlers can return `Result<T, AppError>`.
#[derive(Debug, Error)]
pub enum AppError {
    #[error("Validation error: {0}")]
    Validation(String),

    #[error("{0}")]
    UnsupportedFormat(String),

    #[error("Extraction error: {0}")]
    Extraction(String),

    #[error("Payload too large: {0}")]
    PayloadTooLarge(String),

    #[error("Internal server error: {0}")]
    Internal(#[from] anyhow::Error),
}

impl From<PipelineError> for AppError {
    fn from(err: PipelineError) -> Self {
        match err {
            PipelineError::UnsupportedFormat { .. } => AppError::UnsupportedFormat(err.to_string()),
            PipelineError::Extraction { .. } | PipelineError::Parse(_) => {
                AppError::Extraction(err.to_string())
            }
            other => AppError::Internal(other.into()),
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, code, message) = match &self {
            AppError::Validation(msg) => (StatusCode::BAD_REQUEST, "VALIDATION_ERROR", msg.clone()),
            AppError::UnsupportedFormat(msg) => (
                StatusCode::UNSUPPORTED_MEDIA_TYPE,
                "UNSUPPORTED_FORMAT",
                msg.clone(),
            ),
            AppError::Extraction(cause) => {
                tracing::error!("Extraction error: {cause}");
                (
                    StatusCode::UNPROCESSABLE_ENTITY,
                    "EXTRACTION_ERROR",
                    "The document could not be read. Please try a different file.".to_string(),
                )
            }
            AppError::PayloadTooLarge(msg) => {
                (StatusCode::PAYLOAD_TOO_LARGE, "PAYLOAD_TOO_LARGE", msg.clone())
            }
            AppError::Internal(e) => {
                tracing::error!("Internal error: {e:?}");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "INTERNAL_ERROR",
                    "An internal server error occurred".to_string(),
                )
            }
        };

        let body = Json(json!({
            "error": {
                "code": code,
                "message": message
            }
        }));

        (status, body).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::normalize::DocumentFormat;

    #[test]
    fn test_pipeline_errors_map_to_statuses() {
        let unsupported: AppError = PipelineError::UnsupportedFormat {
            accepted: "DOCX, PDF, or TXT".into(),
        }
        .into();
        assert_eq!(
            unsupported.into_response().status(),
            StatusCode::UNSUPPORTED_MEDIA_TYPE
        );

        let corrupt: AppError = PipelineError::extraction(DocumentFormat::Docx, "bad zip").into();
        assert_eq!(
            corrupt.into_response().status(),
            StatusCode::UNPROCESSABLE_ENTITY
        );

        let parse: AppError = PipelineError::Parse("boom".into()).into();
        assert_eq!(
            parse.into_response().status(),
            StatusCode::UNPROCESSABLE_ENTITY
        );

        let io: AppError = PipelineError::Io(std::io::Error::other("disk")).into();
        assert_eq!(io.into_response().status(), StatusCode::INTERNAL_SERVER_ERROR);
    }

    #[tokio::test]
    async fn test_extraction_cause_not_exposed() {
        let err: AppError = PipelineError::extraction(DocumentFormat::Docx, "invalid Zip archive").into();
        let body = axum::body::to_bytes(err.into_response().into_body(), usize::MAX)
            .await
            .unwrap();
        let json: serde_json::Value = serde_json::from_slice(&body).unwrap();
        assert_eq!(json["error"]["code"], "EXTRACTION_ERROR");
        assert!(!json["error"]["message"]
            .as_str()
            .unwrap()
            .contains("Zip"));
    }
}
