//! # Error Types
//!
//! Domain-specific error types for stocksence-core.
//!
//! ## Error Hierarchy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Error Types                                     │
//! │                                                                         │
//! │  stocksence-core errors (this file)                                    │
//! │  ├── CoreError        - Domain rule violations                         │
//! │  ├── ValidationError  - Input validation failures                      │
//! │  └── AuthError        - Session gate failures                          │
//! │                                                                         │
//! │  stocksence-db errors (separate crate)                                 │
//! │  └── DbError          - Store failures (the StoreError of the model)   │
//! │                                                                         │
//! │  HTTP errors (in apps/server)                                          │
//! │  └── ApiError         - What the client sees (serialized)              │
//! │                                                                         │
//! │  Flow: ValidationError → CoreError → DbError → ApiError → Client       │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Propagation Policy
//! Validation errors are raised before any store call. Every error is
//! terminal for the user action that triggered it: nothing here retries.

use thiserror::Error;

// =============================================================================
// Core Error
// =============================================================================

/// Domain errors raised by inventory and sale operations.
#[derive(Debug, Error)]
pub enum CoreError {
    /// Product cannot be found.
    ///
    /// ## When This Occurs
    /// - Product ID doesn't exist in the store
    /// - Product was hard-deleted after the client loaded it
    #[error("Product not found: {0}")]
    ProductNotFound(String),

    /// Sale cannot be found.
    #[error("Sale not found: {0}")]
    SaleNotFound(String),

    /// Insufficient stock to complete a sale.
    ///
    /// ## User Workflow
    /// ```text
    /// Record Sale (qty: 5)
    ///      │
    ///      ▼
    /// Check stock: available=3
    ///      │
    ///      ▼
    /// InsufficientStock { product: "USB Cable", available: 3, requested: 5 }
    ///      │
    ///      ▼
    /// Client shows: "Only 3 in stock"
    /// ```
    #[error("Insufficient stock for {product}: available {available}, requested {requested}")]
    InsufficientStock {
        product: String,
        available: i64,
        requested: i64,
    },

    /// Quantity argument is out of its domain.
    ///
    /// ## When This Occurs
    /// - Recording a sale with quantity <= 0
    /// - Adjusting stock to a negative level
    #[error("Invalid quantity: {quantity}")]
    InvalidQuantity { quantity: i64 },

    /// Validation error (wraps ValidationError).
    #[error("Validation error: {0}")]
    Validation(#[from] ValidationError),

    /// Session gate refused the operation.
    #[error(transparent)]
    Auth(#[from] AuthError),
}

// =============================================================================
// Validation Error
// =============================================================================

/// Input validation errors.
///
/// These errors occur when user input doesn't meet requirements.
/// Used for early validation before any store call.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    /// A required field is missing or empty.
    #[error("{field} is required")]
    Required { field: String },

    /// Field value is too short.
    #[error("{field} must be at least {min} characters")]
    TooShort { field: String, min: usize },

    /// Field value is too long.
    #[error("{field} must be at most {max} characters")]
    TooLong { field: String, max: usize },

    /// Numeric value is out of range.
    #[error("{field} must be between {min} and {max}")]
    OutOfRange { field: String, min: i64, max: i64 },

    /// Value must be positive.
    #[error("{field} must be positive")]
    MustBePositive { field: String },

    /// Invalid format (e.g., malformed email, bad URL).
    #[error("{field} has invalid format: {reason}")]
    InvalidFormat { field: String, reason: String },
}

// =============================================================================
// Auth Error
// =============================================================================

/// Failures reported by the session gate.
///
/// The messages for `InvalidCredentials` and `AlreadyRegistered` are shown
/// to the user verbatim on the sign-in form.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AuthError {
    /// A write was attempted without a signed-in user.
    #[error("Authentication required")]
    NotAuthenticated,

    /// Email/password pair did not match.
    #[error("Invalid login credentials")]
    InvalidCredentials,

    /// Sign-up with an email that already has an account.
    #[error("User already registered")]
    AlreadyRegistered,

    /// The session token was valid once but has expired or been revoked.
    #[error("Session expired")]
    SessionExpired,
}

// =============================================================================
// Result Type Alias
// =============================================================================

/// Convenience type alias for Results with CoreError.
pub type CoreResult<T> = Result<T, CoreError>;

// =============================================================================
// Unit Tests
// =============================================================================
