//! # stocksence-core: Pure Inventory Logic for StockSence
//!
//! Domain types, validation rules and every derived number the screens show
//! (stock bands, profit margins, revenue reports), as pure functions.
//!
//! ## Architecture Position
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                        StockSence Architecture                          │
//! │                                                                         │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │                    Web client                                   │   │
//! │  │   Dashboard ─ Products ─ Inventory ─ Sales ─ Reports           │   │
//! │  └─────────────────────────────┬───────────────────────────────────┘   │
//! │                                │ JSON over HTTP                         │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │                    apps/server                                  │   │
//! │  │   session gate, commands, alerts, axum routes                  │   │
//! │  └─────────────────────────────┬───────────────────────────────────┘   │
//! │                                │                                        │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │               ★ stocksence-core (THIS CRATE) ★                  │   │
//! │  │                                                                 │   │
//! │  │   types  money  validation  inventory  reporting               │   │
//! │  │   catalog  export  alert  error                                │   │
//! │  │                                                                 │   │
//! │  │   NO I/O • NO DATABASE • NO CLOCK READS                        │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! │                                │                                        │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │                    stocksence-db                                │   │
//! │  │              SQLite migrations and repositories                 │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Modules
//!
//! - [`types`] - Product, Sale, User and their inputs
//! - [`money`] - Integer-cent money
//! - [`validation`] - Form rules, checked before any store call
//! - [`inventory`] - Stock bands and the inventory summary
//! - [`reporting`] - Time windows, revenue, profit, top sellers, dashboard
//! - [`catalog`] - Search, filter and sort for list screens
//! - [`export`] - CSV sales report
//! - [`alert`] - Outcome messages and the sink they go to
//! - [`error`] - Domain error types
//!
//! ## Example Usage
//!
//! ```rust
//! use chrono::{TimeZone, Utc};
//! use stocksence_core::reporting::{window_start, TimeWindow};
//!
//! let now = Utc.with_ymd_and_hms(2024, 5, 15, 14, 30, 0).unwrap();
//! let start = window_start(TimeWindow::ThisMonth, &now).unwrap();
//! assert_eq!(start, Utc.with_ymd_and_hms(2024, 5, 1, 0, 0, 0).unwrap());
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod alert;
pub mod catalog;
pub mod error;
pub mod export;
pub mod inventory;
pub mod money;
pub mod reporting;
pub mod types;
pub mod validation;

// =============================================================================
// Re-exports for Convenience
// =============================================================================

pub use alert::{Alert, AlertKind, NotificationSink};
pub use error::{AuthError, CoreError, CoreResult, ValidationError};
pub use money::Money;
pub use reporting::TimeWindow;
pub use types::*;
