//! Stroke lookup API
//!
//! Serves `GET /stroke?ids=...` over a dataset loaded once at startup. The
//! dataset store is immutable, so handlers share it through `Arc<AppState>`
//! without any locking.

use std::sync::Arc;
use std::time::Duration;

use anyhow::Context;
use axum::{Router, routing::get};
use chrono::{DateTime, Utc};
use stroke_store::{DatasetStore, LoadError};
use tower::ServiceBuilder;
use tower_http::trace::TraceLayer;
use tracing::info;

pub mod config;
pub mod error;
pub mod handlers;
pub mod lookup;
pub mod tracing_setup;

use config::StrokeConfig;

/// Application state shared by every request handler
#[derive(Debug)]
pub struct AppState {
    pub start_time: DateTime<Utc>,
    pub config: StrokeConfig,
    pub store: Arc<DatasetStore>,
}

impl AppState {
    /// Validate the configuration and load the dataset it points at.
    pub fn new(config: StrokeConfig) -> anyhow::Result<Self> {
        config.validate()?;
        let options = config.load_options()?;

        info!(path = %config.dataset.path.display(), "Loading dataset");
        let store = DatasetStore::load(&config.dataset.path, &options)
            .with_context(|| format!("failed to load dataset {}", config.dataset.path.display()))?;

        Ok(Self::with_store(config, Arc::new(store)))
    }

    /// Build state around an already loaded store.
    pub fn with_store(config: StrokeConfig, store: Arc<DatasetStore>) -> Self {
        Self { start_time: Utc::now(), config, store }
    }

    pub fn elapsed(&self) -> Duration {
        (Utc::now() - self.start_time).to_std().unwrap_or_default()
    }
}

/// Machine-readable code for a fatal startup error caused by the dataset load.
pub fn startup_error_code(err: &anyhow::Error) -> Option<&'static str> {
    err.downcast_ref::<LoadError>().map(LoadError::error_code)
}

/// Build the HTTP router.
pub fn create_app(state: AppState) -> Router {
    Router::new()
        .route("/stroke", get(handlers::stroke_lookup))
        .route("/health", get(handlers::health))
        .method_not_allowed_fallback(handlers::method_not_allowed)
        .fallback(handlers::fallback)
        .layer(ServiceBuilder::new().layer(TraceLayer::new_for_http()))
        .with_state(Arc::new(state))
}
