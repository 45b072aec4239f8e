//! Error handling for the lookup API
//!
//! Every error renders as a JSON body of the form `{"message": ...}` with a
//! status code chosen per variant.

use crate::config::ValidationStatus;
use crate::lookup::ValidationErrors;
use axum::{
    http::StatusCode,
    response::{IntoResponse, Json, Response},
};
use serde::Serialize;
use thiserror::Error;

/// Message returned for routes that do not exist
pub const ROUTE_NOT_FOUND_MESSAGE: &str = "The requested URL was not found on the server.";
/// Message returned when a route exists but not for the request method
pub const METHOD_NOT_ALLOWED_MESSAGE: &str = "The method is not allowed for the requested URL.";

#[derive(Error, Debug)]
pub enum ApiError {
    /// Request failed input validation; no lookups were performed
    #[error("Validation error: {errors}")]
    Validation { errors: ValidationErrors, status: ValidationStatus },

    /// No route matches the request path
    #[error("Route not found: {path}")]
    RouteNotFound { path: String },

    /// The route exists but does not accept the request method
    #[error("Method {method} not allowed for {path}")]
    MethodNotAllowed { method: String, path: String },
}

/// JSON error envelope
#[derive(Debug, Serialize)]
pub struct ErrorBody<T: Serialize> {
    pub message: T,
}

impl ApiError {
    pub fn validation(errors: ValidationErrors, status: ValidationStatus) -> Self {
        Self::Validation { errors, status }
    }

    pub fn status_code(&self) -> StatusCode {
        match self {
            ApiError::Validation { status, .. } => status.status_code(),
            ApiError::RouteNotFound { .. } => StatusCode::NOT_FOUND,
            ApiError::MethodNotAllowed { .. } => StatusCode::METHOD_NOT_ALLOWED,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        match self {
            ApiError::Validation { errors, .. } => {
                (status, Json(ErrorBody { message: errors })).into_response()
            }
            ApiError::RouteNotFound { .. } => {
                (status, Json(ErrorBody { message: ROUTE_NOT_FOUND_MESSAGE })).into_response()
            }
            ApiError::MethodNotAllowed { .. } => {
                (status, Json(ErrorBody { message: METHOD_NOT_ALLOWED_MESSAGE })).into_response()
            }
        }
    }
}

/// Result type alias for API operations
pub type ApiResult<T> = Result<T, ApiError>;
