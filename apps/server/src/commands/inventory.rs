//! # Inventory Commands
//!
//! Absolute stock adjustments and the inventory screen payload.

use chrono::Utc;
use serde::Serialize;
use tracing::{debug, info};

use super::product::normalized;
use super::{report, report_failure, require_session, warn_if_low};
use crate::error::ApiResult;
use stocksence_core::catalog::{categories_in_use, ProductQuery};
use stocksence_core::inventory::{summarize, StockSummary};
use stocksence_core::validation::validate_stock_quantity;
use stocksence_core::{CoreError, NotificationSink, Product, User};
use stocksence_db::Database;

/// Inventory screen: headline numbers over every product, plus the
/// filtered table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct InventoryOverview {
    pub summary: StockSummary,
    pub categories: Vec<String>,
    pub products: Vec<Product>,
}

/// Sets a product's stock to `quantity`.
///
/// ## Returns
/// * `Err(INVALID_QUANTITY)` - `quantity < 0`; nothing is written
/// * `Err(VALIDATION_ERROR)` - `quantity` above `MAX_QUANTITY`
/// * `Err(NOT_FOUND)` - No such product
pub async fn adjust_quantity(
    db: &Database,
    session: Option<&User>,
    sink: &dyn NotificationSink,
    id: &str,
    quantity: i64,
) -> ApiResult<Product> {
    let result = report(
        sink,
        set_quantity(db, session, id, quantity).await,
        "Inventory updated successfully",
    );
    if let Ok(product) = &result {
        warn_if_low(sink, product);
    }
    result
}

async fn set_quantity(
    db: &Database,
    session: Option<&User>,
    id: &str,
    quantity: i64,
) -> ApiResult<Product> {
    let user = require_session(session)?;
    if quantity < 0 {
        return Err(CoreError::InvalidQuantity { quantity }.into());
    }
    validate_stock_quantity(quantity)?;

    let product = db.products().set_quantity(id, quantity, Utc::now()).await?;

    info!(id = %id, quantity, user_id = %user.id, "Stock level set");
    Ok(product)
}

pub async fn inventory_overview(
    db: &Database,
    session: Option<&User>,
    sink: &dyn NotificationSink,
    query: &ProductQuery,
) -> ApiResult<InventoryOverview> {
    report_failure(sink, overview(db, session, query).await)
}

async fn overview(
    db: &Database,
    session: Option<&User>,
    query: &ProductQuery,
) -> ApiResult<InventoryOverview> {
    require_session(session)?;
    let query = normalized(query)?;
    debug!(?query, "inventory_overview command");

    let products = db.products().list().await?;

    Ok(InventoryOverview {
        summary: summarize(&products),
        categories: categories_in_use(&products),
        products: query.apply(&products),
    })
}
