use std::sync::Arc;

use crate::assessments::store::AssessmentStore;
use crate::auth::service::AccountService;
use crate::documents::pipeline::UploadPipeline;

/// Shared application state injected into all route handlers via Axum extractors.
#[derive(Clone)]
pub struct AppState {
    pub assessments: Arc<dyn AssessmentStore>,
    pub accounts: AccountService,
    pub pipeline: UploadPipeline,
    /// Request body ceiling for the upload route, in bytes.
    pub upload_limit: usize,
}
