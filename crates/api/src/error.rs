//! JSON error responses.
//!
//! Every error is rendered as `{"error": CODE, "message": text}` with the
//! status its domain type assigns.

use axum::{
    Json,
    extract::rejection::{JsonRejection, QueryRejection},
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde_json::json;
use stockroom_core::StockError;
use stockroom_core::reports::ReportError;
use stockroom_shared::AppError;
use tracing::error;

/// Error returned by route handlers.
#[derive(Debug)]
pub enum ApiError {
    /// Inventory operation failed.
    Stock(StockError),
    /// Report request failed.
    Report(ReportError),
    /// Request-level failure.
    App(AppError),
}

impl From<StockError> for ApiError {
    fn from(err: StockError) -> Self {
        Self::Stock(err)
    }
}

impl From<ReportError> for ApiError {
    fn from(err: ReportError) -> Self {
        Self::Report(err)
    }
}

impl From<AppError> for ApiError {
    fn from(err: AppError) -> Self {
        Self::App(err)
    }
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        Self::App(AppError::Validation(rejection.body_text()))
    }
}

impl From<QueryRejection> for ApiError {
    fn from(rejection: QueryRejection) -> Self {
        Self::App(AppError::Validation(rejection.body_text()))
    }
}

impl ApiError {
    fn parts(&self) -> (u16, &'static str, String) {
        match self {
            Self::Stock(err) => (err.http_status_code(), err.error_code(), err.to_string()),
            Self::Report(err) => (err.http_status_code(), err.error_code(), err.to_string()),
            Self::App(err) => (err.status_code(), err.error_code(), err.to_string()),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, code, message) = self.parts();
        let status = StatusCode::from_u16(status).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);

        // Storage details stay in the logs.
        let message = if status.is_server_error() {
            error!(error = %message, code, "Request failed");
            "An internal error occurred".to_string()
        } else {
            message
        };

        (status, Json(json!({ "error": code, "message": message }))).into_response()
    }
}

/// Result type for route handlers.
pub type ApiResult<T> = Result<T, ApiError>;
