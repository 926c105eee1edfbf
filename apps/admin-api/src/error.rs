//! # API Error Types
//!
//! Maps storage and domain errors onto HTTP responses.
//!
//! ## Error Flow
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────┐
//! │  DbError / CoreError                                                │
//! │       │ From impls                                                  │
//! │       ▼                                                             │
//! │  ApiError { code, message }                                         │
//! │       │ IntoResponse                                                │
//! │       ▼                                                             │
//! │  { "error": { "code": "NO_PRICE_AVAILABLE", "message": "..." } }    │
//! │                                                                     │
//! │  Status mapping:                                                    │
//! │    NotFound            → 404                                        │
//! │    Validation          → 400                                        │
//! │    NoPriceAvailable    → 404                                        │
//! │    InvalidLotState     → 409                                        │
//! │    Conflict            → 409                                        │
//! │    everything else     → 500                                        │
//! └─────────────────────────────────────────────────────────────────────┘
//! ```

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::Serialize;

use tarifa_core::CoreError;
use tarifa_db::DbError;

/// Machine-readable error codes for the admin UI.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ErrorCode {
    NotFound,
    ValidationFailed,
    NoPriceAvailable,
    InvalidLotState,
    Conflict,
    Internal,
}

/// An error ready for serialization to the admin UI.
#[derive(Debug)]
pub struct ApiError {
    pub status: StatusCode,
    pub code: ErrorCode,
    pub message: String,
}

impl ApiError {
    pub fn not_found(message: impl Into<String>) -> Self {
        ApiError { status: StatusCode::NOT_FOUND, code: ErrorCode::NotFound, message: message.into() }
    }

    pub fn validation(message: impl Into<String>) -> Self {
        ApiError {
            status: StatusCode::BAD_REQUEST,
            code: ErrorCode::ValidationFailed,
            message: message.into(),
        }
    }
}

impl From<DbError> for ApiError {
    fn from(err: DbError) -> Self {
        let (status, code) = match &err {
            DbError::NotFound { .. } => (StatusCode::NOT_FOUND, ErrorCode::NotFound),
            DbError::UniqueViolation { .. } => (StatusCode::CONFLICT, ErrorCode::Conflict),
            DbError::Conflict { .. } => (StatusCode::CONFLICT, ErrorCode::Conflict),
            DbError::ForeignKeyViolation { .. } => {
                (StatusCode::BAD_REQUEST, ErrorCode::ValidationFailed)
            }
            DbError::Domain(core) => return ApiError::from_core(core, err.to_string()),
            _ => (StatusCode::INTERNAL_SERVER_ERROR, ErrorCode::Internal),
        };

        ApiError { status, code, message: err.to_string() }
    }
}

impl ApiError {
    fn from_core(core: &CoreError, message: String) -> Self {
        let (status, code) = match core {
            CoreError::NoPriceAvailable { .. } => {
                (StatusCode::NOT_FOUND, ErrorCode::NoPriceAvailable)
            }
            CoreError::InvalidLotState { .. } => (StatusCode::CONFLICT, ErrorCode::InvalidLotState),
            CoreError::Validation(_) => (StatusCode::BAD_REQUEST, ErrorCode::ValidationFailed),
        };
        ApiError { status, code, message }
    }
}

impl From<CoreError> for ApiError {
    fn from(err: CoreError) -> Self {
        let message = err.to_string();
        ApiError::from_core(&err, message)
    }
}

#[derive(Serialize)]
struct ErrorBody {
    error: ErrorDetail,
}

#[derive(Serialize)]
struct ErrorDetail {
    code: ErrorCode,
    message: String,
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        if self.status.is_server_error() {
            tracing::error!(code = ?self.code, message = %self.message, "Request failed");
        } else {
            tracing::debug!(code = ?self.code, message = %self.message, "Request rejected");
        }

        let body = ErrorBody {
            error: ErrorDetail { code: self.code, message: self.message },
        };
        (self.status, Json(body)).into_response()
    }
}

/// Result type for handlers.
pub type ApiResult<T> = Result<T, ApiError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn db_not_found_maps_to_404() {
        let api: ApiError = DbError::not_found("Item", "x").into();
        assert_eq!(api.status, StatusCode::NOT_FOUND);
        assert_eq!(api.code, ErrorCode::NotFound);
    }

    #[test]
    fn invalid_lot_state_maps_to_409() {
        let core = CoreError::InvalidLotState {
            lot_id: "l1".into(),
            current_state: "APPLIED".into(),
            operation: "apply",
        };
        let api: ApiError = DbError::Domain(core).into();
        assert_eq!(api.status, StatusCode::CONFLICT);
        assert_eq!(api.code, ErrorCode::InvalidLotState);
    }

    #[test]
    fn no_price_available_maps_to_404() {
        let core = CoreError::NoPriceAvailable { item_id: "i".into(), category: "MOTOR".into() };
        let api: ApiError = core.into();
        assert_eq!(api.status, StatusCode::NOT_FOUND);
        assert_eq!(api.code, ErrorCode::NoPriceAvailable);
    }
}
