use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use serde_json::json;
use thiserror::Error;

/// One field-level problem reported inside a validation failure.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FieldError {
    pub field: String,
    pub message: String,
}

impl FieldError {
    pub fn new(field: &str, message: impl Into<String>) -> Self {
        Self {
            field: field.to_string(),
            message: message.into(),
        }
    }
}

/// The step of the upload pipeline that failed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum PipelineStage {
    Storage,
    Extraction,
    Analysis,
    Persistence,
}

impl PipelineStage {
    fn message(self) -> &'static str {
        match self {
            PipelineStage::Storage => "Failed to store uploaded document",
            PipelineStage::Extraction => "Text extraction failed",
            PipelineStage::Analysis => "AI analysis failed",
            PipelineStage::Persistence => "Failed to save assessment",
        }
    }
}

/// Application-level error type.
/// Implements `IntoResponse` so Axum handlers can return `Result<T, AppError>`.
#[derive(Debug, Error)]
pub enum AppError {
    #[error("Bad request: {0}")]
    BadRequest(String),

    #[error("Validation failed")]
    Validation(Vec<FieldError>),

    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("{stage:?} stage failed: {detail}")]
    Stage { stage: PipelineStage, detail: String },

    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("Internal server error: {0}")]
    Internal(#[from] anyhow::Error),
}

impl AppError {
    pub fn stage(stage: PipelineStage, err: impl std::fmt::Display) -> Self {
        AppError::Stage {
            stage,
            detail: err.to_string(),
        }
    }

    pub fn status(&self) -> StatusCode {
        match self {
            AppError::BadRequest(_) | AppError::Validation(_) => StatusCode::BAD_REQUEST,
            AppError::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            AppError::NotFound(_) => StatusCode::NOT_FOUND,
            AppError::Stage { .. } | AppError::Database(_) | AppError::Internal(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status();
        let (message, errors) = match &self {
            AppError::BadRequest(msg) | AppError::Unauthorized(msg) | AppError::NotFound(msg) => {
                (msg.clone(), None)
            }
            AppError::Validation(fields) => (
                "Validation failed".to_string(),
                Some(serde_json::to_value(fields).unwrap_or_default()),
            ),
            AppError::Stage { stage, detail } => {
                tracing::error!("Upload pipeline failed at {stage:?}: {detail}");
                (
                    stage.message().to_string(),
                    Some(json!([{ "stage": stage, "message": detail }])),
                )
            }
            AppError::Database(e) => {
                tracing::error!("Database error: {e}");
                ("A database error occurred".to_string(), None)
            }
            AppError::Internal(e) => {
                tracing::error!("Internal error: {e:?}");
                ("Internal server error".to_string(), None)
            }
        };

        let mut body = json!({
            "status": "error",
            "message": message,
        });
        if let Some(errors) = errors {
            body["errors"] = errors;
        }

        (status, Json(body)).into_response()
    }
}
