//! # API Error Type
//!
//! Unified error type for commands and HTTP handlers.
//!
//! ## Error Flow
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    Error Flow in StockSence                             │
//! │                                                                         │
//! │  Command: Result<T, ApiError>                                          │
//! │      │                                                                  │
//! │      ├── ValidationError ──────────► VALIDATION_ERROR     400          │
//! │      ├── CoreError::InvalidQuantity ► INVALID_QUANTITY     400          │
//! │      ├── AuthError ────────────────► NOT_AUTHENTICATED    401          │
//! │      │                               INVALID_CREDENTIALS  401          │
//! │      │                               SESSION_EXPIRED      401          │
//! │      │                               ALREADY_REGISTERED   409          │
//! │      ├── DbError::NotFound ────────► NOT_FOUND            404          │
//! │      ├── DbError::InsufficientStock► INSUFFICIENT_STOCK   409          │
//! │      ├── DbError::UniqueViolation ─► CONFLICT             409          │
//! │      └── other DbError ────────────► STORE_ERROR          503 + retry  │
//! │                                                                         │
//! │  Client receives: { "code": "NOT_FOUND", "message": "..." }            │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Store failures are logged in full and reported with a generic message.

use axum::http::{HeaderValue, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::Serialize;
use stocksence_core::{AuthError, CoreError, ValidationError};
use stocksence_db::DbError;

/// Error body returned to clients.
///
/// ```json
/// {
///   "code": "INSUFFICIENT_STOCK",
///   "message": "Insufficient stock for Desk Lamp: available 3, requested 5"
/// }
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ApiError {
    /// Machine-readable error code for programmatic handling
    pub code: ErrorCode,

    /// Human-readable error message for display
    pub message: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ErrorCode {
    /// Resource not found (404)
    NotFound,

    /// Input validation failed (400)
    ValidationError,

    /// Quantity outside its domain (400)
    InvalidQuantity,

    /// Not enough units to sell (409)
    InsufficientStock,

    /// Unique constraint hit (409)
    Conflict,

    /// No session (401)
    NotAuthenticated,

    /// Wrong email or password (401)
    InvalidCredentials,

    /// Token expired or revoked (401)
    SessionExpired,

    /// Email already has an account (409)
    AlreadyRegistered,

    /// Persistent store failed; retry later (503)
    StoreError,

    /// Internal server error (500)
    Internal,
}

impl ErrorCode {
    pub fn status(self) -> StatusCode {
        match self {
            ErrorCode::ValidationError | ErrorCode::InvalidQuantity => StatusCode::BAD_REQUEST,
            ErrorCode::NotAuthenticated
            | ErrorCode::InvalidCredentials
            | ErrorCode::SessionExpired => StatusCode::UNAUTHORIZED,
            ErrorCode::NotFound => StatusCode::NOT_FOUND,
            ErrorCode::InsufficientStock | ErrorCode::Conflict | ErrorCode::AlreadyRegistered => {
                StatusCode::CONFLICT
            }
            ErrorCode::StoreError => StatusCode::SERVICE_UNAVAILABLE,
            ErrorCode::Internal => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl ApiError {
    pub fn new(code: ErrorCode, message: impl Into<String>) -> Self {
        ApiError {
            code,
            message: message.into(),
        }
    }

    pub fn not_found(resource: &str, id: &str) -> Self {
        ApiError::new(ErrorCode::NotFound, format!("{} not found: {}", resource, id))
    }

    pub fn validation(message: impl Into<String>) -> Self {
        ApiError::new(ErrorCode::ValidationError, message)
    }

    pub fn internal(message: impl Into<String>) -> Self {
        ApiError::new(ErrorCode::Internal, message)
    }

    pub fn not_authenticated() -> Self {
        AuthError::NotAuthenticated.into()
    }

    /// Whether the client may retry the same request unchanged.
    pub fn is_retryable(&self) -> bool {
        self.code == ErrorCode::StoreError
    }
}

impl From<DbError> for ApiError {
    fn from(err: DbError) -> Self {
        match err {
            DbError::NotFound { entity, id } => ApiError::not_found(&entity, &id),
            DbError::UniqueViolation { field, value } => ApiError::new(
                ErrorCode::Conflict,
                format!("{} '{}' already exists", field, value),
            ),
            DbError::InsufficientStock {
                product,
                available,
                requested,
            } => CoreError::InsufficientStock {
                product,
                available,
                requested,
            }
            .into(),
            DbError::Validation(e) => e.into(),
            DbError::ForeignKeyViolation { message } => {
                tracing::error!("Foreign key violation: {}", message);
                ApiError::validation("Invalid reference")
            }
            DbError::CheckViolation { message } => {
                tracing::error!("Check constraint violation: {}", message);
                ApiError::validation("Value violates a stored constraint")
            }
            DbError::ConnectionFailed(e) => {
                tracing::error!("Database connection failed: {}", e);
                ApiError::new(ErrorCode::StoreError, "Database connection failed")
            }
            DbError::MigrationFailed(e) => {
                tracing::error!("Database migration failed: {}", e);
                ApiError::new(ErrorCode::StoreError, "Database migration failed")
            }
            DbError::QueryFailed(e) => {
                tracing::error!("Database query failed: {}", e);
                ApiError::new(ErrorCode::StoreError, "Database operation failed")
            }
            DbError::TransactionFailed(e) => {
                tracing::error!("Transaction failed: {}", e);
                ApiError::new(ErrorCode::StoreError, "Database transaction failed")
            }
            DbError::PoolExhausted => {
                tracing::error!("Database pool exhausted");
                ApiError::new(ErrorCode::StoreError, "Database is busy")
            }
            DbError::Internal(e) => {
                tracing::error!("Internal database error: {}", e);
                ApiError::new(ErrorCode::StoreError, "Database operation failed")
            }
        }
    }
}

impl From<CoreError> for ApiError {
    fn from(err: CoreError) -> Self {
        match err {
            CoreError::ProductNotFound(id) => ApiError::not_found("Product", &id),
            CoreError::SaleNotFound(id) => ApiError::not_found("Sale", &id),
            err @ CoreError::InsufficientStock { .. } => {
                ApiError::new(ErrorCode::InsufficientStock, err.to_string())
            }
            err @ CoreError::InvalidQuantity { .. } => {
                ApiError::new(ErrorCode::InvalidQuantity, err.to_string())
            }
            CoreError::Validation(e) => e.into(),
            CoreError::Auth(e) => e.into(),
        }
    }
}

impl From<ValidationError> for ApiError {
    fn from(err: ValidationError) -> Self {
        ApiError::validation(err.to_string())
    }
}

impl From<AuthError> for ApiError {
    fn from(err: AuthError) -> Self {
        let code = match err {
            AuthError::NotAuthenticated => ErrorCode::NotAuthenticated,
            AuthError::InvalidCredentials => ErrorCode::InvalidCredentials,
            AuthError::AlreadyRegistered => ErrorCode::AlreadyRegistered,
            AuthError::SessionExpired => ErrorCode::SessionExpired,
        };
        ApiError::new(code, err.to_string())
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.code.status();
        let retryable = self.is_retryable();

        let mut resp = (status, Json(self)).into_response();
        if retryable {
            resp.headers_mut()
                .insert("retry-after", HeaderValue::from_static("3"));
        }
        resp
    }
}

impl std::fmt::Display for ApiError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "[{:?}] {}", self.code, self.message)
    }
}

impl std::error::Error for ApiError {}

pub type ApiResult<T> = Result<T, ApiError>;
