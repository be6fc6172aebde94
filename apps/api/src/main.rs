mod assessments;
mod auth;
mod config;
mod db;
mod documents;
mod errors;
mod llm_client;
mod models;
mod routes;
mod state;
#[cfg(test)]
mod test_support;

use anyhow::Result;
use std::net::SocketAddr;
use std::sync::Arc;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::assessments::store::PgAssessmentStore;
use crate::auth::service::AccountService;
use crate::auth::store::PgAccountStore;
use crate::auth::token::TokenIssuer;
use crate::config::Config;
use crate::db::create_pool;
use crate::documents::extractor::TextExtractor;
use crate::documents::pipeline::UploadPipeline;
use crate::documents::storage::UploadDir;
use crate::llm_client::LlmClient;
use crate::routes::build_router;
use crate::state::AppState;

#[tokio::main]
async fn main() -> Result<()> {
    // Fails fast on a missing JWT_SECRET or malformed numeric settings
    let config = Config::from_env()?;

    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| {
            EnvFilter::new(format!(
                "{}={},tower_http=info",
                env!("CARGO_CRATE_NAME"),
                &config.rust_log
            ))
        }))
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Starting compliance API v{}", env!("CARGO_PKG_VERSION"));

    // PostgreSQL (migrations run on connect)
    let db = create_pool(config.database.connect_options()?).await?;

    let llm = LlmClient::new(&config.llm)?;
    if llm.has_primary() {
        info!(
            "LLM client initialized (primary: {}, fallback: {})",
            llm_client::PRIMARY_MODEL,
            llm.fallback_model()
        );
    } else {
        info!(
            "LLM client initialized without OPENAI_API_KEY (fallback only: {})",
            llm.fallback_model()
        );
    }

    tokio::fs::create_dir_all(&config.upload_dir).await?;
    info!("Uploads stored in {}", config.upload_dir.display());

    let assessments = Arc::new(PgAssessmentStore::new(db.clone()));
    let accounts = AccountService::new(
        Arc::new(PgAccountStore::new(db)),
        TokenIssuer::new(&config.auth),
    );
    let pipeline = UploadPipeline::new(
        UploadDir::new(config.upload_dir.clone()),
        TextExtractor::new(config.doc_extractor.clone()),
        Arc::new(llm),
        assessments.clone(),
    );

    let state = AppState {
        assessments,
        accounts,
        pipeline,
        upload_limit: config.max_upload_bytes,
    };

    let app = build_router(state)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive());

    let addr: SocketAddr = format!("0.0.0.0:{}", config.port).parse()?;
    info!("Listening on {addr}");

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
