//! # HTTP Layer
//!
//! JSON API served by axum.
//!
//! ## Routes
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  /api                                                                   │
//! │  ├── POST   /auth/sign-up              create account + session        │
//! │  ├── POST   /auth/sign-in              session                         │
//! │  ├── POST   /auth/sign-out             revoke bearer token             │
//! │  ├── GET    /auth/session              { user | null }                 │
//! │  ├── GET    /products                  ?search&category&stock&sort&order│
//! │  ├── POST   /products                                                  │
//! │  ├── GET    /products/{id}                                             │
//! │  ├── PUT    /products/{id}             partial edit                    │
//! │  ├── DELETE /products/{id}                                             │
//! │  ├── GET    /inventory                 summary + filtered table        │
//! │  ├── PUT    /inventory/{id}/quantity   { quantity }                    │
//! │  ├── GET    /sales                     ?search&date                    │
//! │  ├── POST   /sales                     { productId, quantity }         │
//! │  ├── GET    /sales/export.csv          ?search&date   (204 when empty) │
//! │  ├── GET    /dashboard                                                 │
//! │  ├── GET    /reports                   ?window=thisMonth               │
//! │  ├── GET    /alerts                    caller's unexpired alerts       │
//! │  └── GET    /health                                                    │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Every route except auth and `/health` requires
//! `Authorization: Bearer <token>`.

pub mod handlers;

use axum::routing::{get, post, put};
use axum::Router;

use crate::state::AppState;

pub fn router(state: AppState) -> Router {
    Router::new().nest("/api", api_routes()).with_state(state)
}

fn api_routes() -> Router<AppState> {
    Router::new()
        .route("/auth/sign-up", post(handlers::sign_up))
        .route("/auth/sign-in", post(handlers::sign_in))
        .route("/auth/sign-out", post(handlers::sign_out))
        .route("/auth/session", get(handlers::current_session))
        .route(
            "/products",
            get(handlers::list_products).post(handlers::create_product),
        )
        .route(
            "/products/{id}",
            get(handlers::get_product)
                .put(handlers::update_product)
                .delete(handlers::delete_product),
        )
        .route("/inventory", get(handlers::inventory_overview))
        .route("/inventory/{id}/quantity", put(handlers::adjust_quantity))
        .route("/sales", get(handlers::list_sales).post(handlers::record_sale))
        .route("/sales/export.csv", get(handlers::export_sales_csv))
        .route("/dashboard", get(handlers::dashboard))
        .route("/reports", get(handlers::sales_report))
        .route("/alerts", get(handlers::alerts))
        .route("/health", get(handlers::health))
}
