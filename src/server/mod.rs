//! HTTP API surface
//!
//! Routes, shared request state and the serve loop.

pub mod handlers;

use crate::data::Database;
use crate::model::ModelSet;
use crate::{Config, Result};
use axum::routing::{get, post};
use axum::Router;
use std::sync::Arc;
use tracing::info;

/// Immutable per-process state shared by all request handlers.
///
/// Built once at startup and never mutated afterwards, so concurrent reads
/// need no locking.
#[derive(Debug, Clone)]
pub struct AppContext {
    pub config: Config,
    pub db: Database,
    pub models: ModelSet,
}

impl AppContext {
    pub fn new(config: Config) -> Result<Self> {
        let db = Database::open(&config.data.database_path)?;
        let models = ModelSet::load(&config.models);
        Ok(AppContext { config, db, models })
    }
}

/// Build the application router.
pub fn router(ctx: Arc<AppContext>) -> Router {
    Router::new()
        .route("/api/predict", post(handlers::predict))
        .route("/api/predict-corners", post(handlers::predict_corners))
        .route("/api/historical-data", post(handlers::historical_data))
        .route("/api/health", get(handlers::health))
        .route("/", get(handlers::index))
        .fallback(handlers::static_file)
        .with_state(ctx)
}

/// Bind and serve until the process is stopped.
pub async fn run(ctx: AppContext) -> Result<()> {
    let addr = format!("{}:{}", ctx.config.server.host, ctx.config.server.port);
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    info!(%addr, models_loaded = ctx.models.loaded(), "serving API");
    axum::serve(listener, router(Arc::new(ctx))).await?;
    Ok(())
}
