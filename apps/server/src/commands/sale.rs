//! # Sale Commands
//!
//! ## Recording a Sale
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  record_sale(product_id, quantity)                                      │
//! │                                                                         │
//! │  session?          no  → NOT_AUTHENTICATED        (no store call)      │
//! │  quantity > 0?     no  → INVALID_QUANTITY         (no store call)      │
//! │         │                                                               │
//! │         ▼                                                               │
//! │  SaleRepository::record_sale   one transaction:                        │
//! │     product missing        → NOT_FOUND                                 │
//! │     quantity > stock       → INSUFFICIENT_STOCK                        │
//! │     insert sale + decrement stock, commit                              │
//! │         │                                                               │
//! │         ▼                                                               │
//! │  SaleReceipt { sale, remaining_quantity }                              │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! A failed commit rolls back both writes, so the client never needs a
//! compensating action and can simply retry.

use chrono::{FixedOffset, NaiveDate};
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use super::{report, report_failure, require_session, warn_if_low};
use crate::error::ApiResult;
use stocksence_core::catalog::{sale_dates, SalesQuery};
use stocksence_core::export::{report_file_name, sales_csv};
use stocksence_core::validation::{validate_sale_quantity, validate_search_query};
use stocksence_core::{Alert, CoreError, NotificationSink, Sale, SaleReceipt, User};
use stocksence_db::Database;

/// Record-sale form.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SaleRequest {
    pub product_id: String,
    pub quantity: i64,
}

/// Sales screen: filtered history and the days that have sales.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SalesList {
    pub sales: Vec<Sale>,
    pub dates: Vec<NaiveDate>,
}

/// A rendered CSV report.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CsvExport {
    pub file_name: String,
    pub content: String,
}

pub async fn record_sale(
    db: &Database,
    session: Option<&User>,
    sink: &dyn NotificationSink,
    request: SaleRequest,
) -> ApiResult<SaleReceipt> {
    let result = report(
        sink,
        sell(db, session, &request).await,
        "Sale recorded successfully",
    );

    if result.is_ok() {
        // Best effort: the sale is committed whatever this read returns
        if let Ok(Some(product)) = db.products().get_by_id(&request.product_id).await {
            warn_if_low(sink, &product);
        }
    }
    result
}

async fn sell(db: &Database, session: Option<&User>, request: &SaleRequest) -> ApiResult<SaleReceipt> {
    let user = require_session(session)?;
    if request.quantity <= 0 {
        return Err(CoreError::InvalidQuantity {
            quantity: request.quantity,
        }
        .into());
    }
    validate_sale_quantity(request.quantity)?;

    let receipt = db
        .sales()
        .record_sale(&request.product_id, request.quantity, chrono::Utc::now())
        .await?;

    info!(
        sale_id = %receipt.sale.id,
        total_cents = receipt.sale.total_price_cents,
        user_id = %user.id,
        "record_sale command"
    );
    Ok(receipt)
}

/// Sales matching `query`, newest first. Day filters use `tz`.
pub async fn list_sales(
    db: &Database,
    session: Option<&User>,
    sink: &dyn NotificationSink,
    query: &SalesQuery,
    tz: &FixedOffset,
) -> ApiResult<SalesList> {
    report_failure(sink, history(db, session, query, tz).await)
}

async fn history(
    db: &Database,
    session: Option<&User>,
    query: &SalesQuery,
    tz: &FixedOffset,
) -> ApiResult<SalesList> {
    require_session(session)?;
    let query = normalized(query)?;
    debug!(?query, "list_sales command");

    let sales = db.sales().list().await?;
    Ok(SalesList {
        dates: sale_dates(&sales, tz),
        sales: query.apply(&sales, tz),
    })
}

fn normalized(query: &SalesQuery) -> ApiResult<SalesQuery> {
    let mut query = query.clone();
    if let Some(search) = query.search.as_deref() {
        query.search = Some(validate_search_query(search)?);
    }
    Ok(query)
}

/// CSV of the sales matching `query`.
///
/// ## Returns
/// * `Ok(None)` - Nothing matched; no file is produced
pub async fn export_sales_csv(
    db: &Database,
    session: Option<&User>,
    sink: &dyn NotificationSink,
    query: &SalesQuery,
    tz: &FixedOffset,
    today: NaiveDate,
) -> ApiResult<Option<CsvExport>> {
    let result = report_failure(sink, history(db, session, query, tz).await)?;

    match sales_csv(&result.sales, tz) {
        Some(content) => {
            info!(rows = result.sales.len(), "Sales exported");
            Ok(Some(CsvExport {
                file_name: report_file_name(today),
                content,
            }))
        }
        None => {
            sink.notify(Alert::info("No sales to export"));
            Ok(None)
        }
    }
}
