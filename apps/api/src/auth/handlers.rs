use axum::{extract::State, http::StatusCode, Json};
use serde::Serialize;

use crate::auth::service::{LoginRequest, LoginResponse, RegisterRequest};
use crate::errors::AppError;
use crate::models::account::PublicProfile;
use crate::routes::extract::{success, ApiJson, Data, Success};
use crate::state::AppState;

#[derive(Debug, Serialize)]
pub struct RegisteredUser {
    pub user: PublicProfile,
}

/// POST /api/auth/register
pub async fn handle_register(
    State(state): State<AppState>,
    ApiJson(request): ApiJson<RegisterRequest>,
) -> Result<(StatusCode, Json<Success<Data<RegisteredUser>>>), AppError> {
    let user = state.accounts.register(request).await?;
    Ok((
        StatusCode::CREATED,
        success(Data {
            data: RegisteredUser { user },
        }),
    ))
}

/// POST /api/auth/login
pub async fn handle_login(
    State(state): State<AppState>,
    ApiJson(request): ApiJson<LoginRequest>,
) -> Result<Json<Success<Data<LoginResponse>>>, AppError> {
    let response = state.accounts.login(request).await?;
    Ok(success(Data { data: response }))
}
