use crate::AppState;
use crate::error::{ApiError, ApiResult};
use crate::lookup::{resolve, validate_query};
use axum::{
    extract::{Query, State},
    http::{Method, Uri},
    response::{IntoResponse, Json, Response},
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{debug, info, instrument};

/// `GET /stroke?ids=1,2,3`
#[instrument(skip_all, fields(ids = tracing::field::Empty))]
pub async fn stroke_lookup(
    State(state): State<Arc<AppState>>,
    Query(params): Query<Vec<(String, String)>>,
) -> ApiResult<Response> {
    let lookup = &state.config.lookup;
    let ids = validate_query(&params, lookup.max_ids_per_request).map_err(|errors| {
        debug!(%errors, "Rejected lookup request");
        ApiError::validation(errors, lookup.validation_status)
    })?;
    tracing::Span::current().record("ids", ids.len());

    let response = resolve(&state.store, &ids);
    info!(found = response.found(), missing = response.missing(), "Lookup served");

    Ok(Json(response).into_response())
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
    pub uptime_seconds: u64,
    pub started_at: DateTime<Utc>,
    pub records: usize,
    pub unique_ids: usize,
    pub fields: usize,
}

/// `GET /health`
pub async fn health(State(state): State<Arc<AppState>>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "healthy".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        uptime_seconds: state.elapsed().as_secs(),
        started_at: state.start_time,
        records: state.store.len(),
        unique_ids: state.store.unique_ids(),
        fields: state.store.schema().field_count(),
    })
}

/// Known route, unsupported method.
pub async fn method_not_allowed(method: Method, uri: Uri) -> ApiError {
    debug!(%method, path = %uri.path(), "Method not allowed");
    ApiError::MethodNotAllowed { method: method.to_string(), path: uri.path().to_string() }
}

pub async fn fallback(uri: Uri) -> ApiError {
    debug!(path = %uri.path(), "No route matched");
    ApiError::RouteNotFound { path: uri.path().to_string() }
}
