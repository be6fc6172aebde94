use axum::{
    extract::{Multipart, State},
    http::StatusCode,
    Json,
};

use crate::documents::pipeline::{UploadOutcome, UploadedDocument};
use crate::errors::AppError;
use crate::routes::extract::{success, Success};
use crate::state::AppState;

const FILE_FIELD: &str = "document";
const PRODUCT_FIELD: &str = "product";

/// POST /api/documents/upload
///
/// Multipart body with a `document` file part and an optional `product` text part.
pub async fn handle_upload(
    State(state): State<AppState>,
    mut multipart: Multipart,
) -> Result<(StatusCode, Json<Success<UploadOutcome>>), AppError> {
    let mut document = None;
    let mut product = None;

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| AppError::BadRequest(e.body_text()))?
    {
        let name = field.name().map(str::to_string);
        match name.as_deref() {
            Some(FILE_FIELD) => {
                let original_name = field.file_name().unwrap_or("document").to_string();
                let mime_type = field
                    .content_type()
                    .unwrap_or("application/octet-stream")
                    .to_string();
                let bytes = field
                    .bytes()
                    .await
                    .map_err(|e| AppError::BadRequest(e.body_text()))?;
                document = Some(UploadedDocument {
                    original_name,
                    mime_type,
                    bytes,
                });
            }
            Some(PRODUCT_FIELD) => {
                product = Some(
                    field
                        .text()
                        .await
                        .map_err(|e| AppError::BadRequest(e.body_text()))?,
                );
            }
            _ => {}
        }
    }

    let document = document.ok_or_else(|| AppError::BadRequest("No file uploaded".to_string()))?;
    let outcome = state.pipeline.handle_upload(document, product).await?;

    Ok((StatusCode::CREATED, success(outcome)))
}
