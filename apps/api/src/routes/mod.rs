pub mod extract;
pub mod health;

use axum::{
    extract::DefaultBodyLimit,
    routing::{get, post},
    Router,
};

use crate::assessments::handlers as assessments;
use crate::auth::handlers as auth;
use crate::documents::handlers as documents;
use crate::state::AppState;

pub fn build_router(state: AppState) -> Router {
    let upload_limit = state.upload_limit;

    Router::new()
        .route("/health", get(health::health_handler))
        // Accounts
        .route("/api/auth/register", post(auth::handle_register))
        .route("/api/auth/login", post(auth::handle_login))
        // Document intake
        .route(
            "/api/documents/upload",
            post(documents::handle_upload).layer(DefaultBodyLimit::max(upload_limit)),
        )
        // Assessments
        .route("/api/assessments", get(assessments::handle_list))
        .route(
            "/api/assessments/:id",
            get(assessments::handle_get)
                .put(assessments::handle_update)
                .delete(assessments::handle_delete),
        )
        .with_state(state)
}
