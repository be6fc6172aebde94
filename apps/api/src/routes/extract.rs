//! Extractor wrappers and the success envelope shared by every handler.
//!
//! Axum's own `Json` and `Path` rejections answer in plain text; these map
//! them onto `AppError` so clients always get the `{status, message}` shape.

use axum::{
    async_trait,
    extract::{
        rejection::JsonRejection, FromRequest, FromRequestParts, Path, Request,
    },
    http::request::Parts,
    Json,
};
use serde::{de::DeserializeOwned, Serialize};

use crate::errors::AppError;

pub struct ApiJson<T>(pub T);

#[async_trait]
impl<S, T> FromRequest<S> for ApiJson<T>
where
    T: DeserializeOwned,
    Json<T>: FromRequest<S, Rejection = JsonRejection>,
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        match Json::<T>::from_request(req, state).await {
            Ok(Json(value)) => Ok(ApiJson(value)),
            Err(rejection) => Err(AppError::BadRequest(rejection.body_text())),
        }
    }
}

pub struct ApiPath<T>(pub T);

#[async_trait]
impl<S, T> FromRequestParts<S> for ApiPath<T>
where
    T: DeserializeOwned + Send,
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        match Path::<T>::from_request_parts(parts, state).await {
            Ok(Path(value)) => Ok(ApiPath(value)),
            Err(rejection) => Err(AppError::BadRequest(rejection.body_text())),
        }
    }
}

/// `{"status": "success", ...body}`.
#[derive(Debug, Serialize)]
pub struct Success<T: Serialize> {
    status: &'static str,
    #[serde(flatten)]
    body: T,
}

pub fn success<T: Serialize>(body: T) -> Json<Success<T>> {
    Json(Success {
        status: "success",
        body,
    })
}

#[derive(Debug, Serialize)]
pub struct Data<T: Serialize> {
    pub data: T,
}
