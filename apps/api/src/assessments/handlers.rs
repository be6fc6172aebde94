use axum::{extract::State, Json};
use serde_json::{json, Value};
use tracing::info;

use crate::errors::AppError;
use crate::models::assessment::{Assessment, AssessmentPatch};
use crate::routes::extract::{success, ApiJson, ApiPath, Data, Success};
use crate::state::AppState;

fn not_found() -> AppError {
    AppError::NotFound("Not found".to_string())
}

/// GET /api/assessments
pub async fn handle_list(
    State(state): State<AppState>,
) -> Result<Json<Success<Data<Vec<Assessment>>>>, AppError> {
    let assessments = state.assessments.list().await?;
    Ok(success(Data { data: assessments }))
}

/// GET /api/assessments/:id
pub async fn handle_get(
    State(state): State<AppState>,
    ApiPath(id): ApiPath<i32>,
) -> Result<Json<Success<Data<Assessment>>>, AppError> {
    let assessment = state.assessments.get(id).await?.ok_or_else(not_found)?;
    Ok(success(Data { data: assessment }))
}

/// PUT /api/assessments/:id
///
/// Only the fields present in the body are overwritten.
pub async fn handle_update(
    State(state): State<AppState>,
    ApiPath(id): ApiPath<i32>,
    ApiJson(patch): ApiJson<AssessmentPatch>,
) -> Result<Json<Success<Data<Assessment>>>, AppError> {
    let assessment = state
        .assessments
        .update(id, patch)
        .await?
        .ok_or_else(not_found)?;
    info!("Updated assessment {id}");
    Ok(success(Data { data: assessment }))
}

/// DELETE /api/assessments/:id
pub async fn handle_delete(
    State(state): State<AppState>,
    ApiPath(id): ApiPath<i32>,
) -> Result<Json<Value>, AppError> {
    if !state.assessments.delete(id).await? {
        return Err(not_found());
    }
    info!("Deleted assessment {id}");
    Ok(Json(json!({ "status": "success" })))
}
