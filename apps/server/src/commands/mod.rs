//! # Commands Module
//!
//! Every operation the API exposes, independent of HTTP.
//!
//! ## Context Passing
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  command(db, session: Option<&User>, sink: &dyn NotificationSink, ...) │
//! │                                                                         │
//! │   1. require_session(session)     None → NOT_AUTHENTICATED             │
//! │   2. validate input               before any store call                │
//! │   3. store call(s)                                                     │
//! │   4. report(sink, result, ...)    success or error alert               │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! The caller owns both the session and the sink; commands never look them
//! up on their own.
//!
//! ## Available Commands
//!
//! ### Products
//! - `list_products`, `get_product`, `create_product`, `update_product`,
//!   `delete_product`
//!
//! ### Inventory
//! - `adjust_quantity`, `inventory_overview`
//!
//! ### Sales
//! - `record_sale`, `list_sales`, `export_sales_csv`
//!
//! ### Dashboard & Reports
//! - `dashboard`, `sales_report`

pub mod dashboard;
pub mod inventory;
pub mod product;
pub mod report;
pub mod sale;

use stocksence_core::{Alert, AuthError, NotificationSink, Product, User};

use crate::error::ApiResult;

/// The signed-in user, or `NOT_AUTHENTICATED`.
pub fn require_session(session: Option<&User>) -> ApiResult<&User> {
    session.ok_or_else(|| AuthError::NotAuthenticated.into())
}

/// Posts the outcome of a write: `success` on `Ok`, the error message on `Err`.
pub(crate) fn report<T>(
    sink: &dyn NotificationSink,
    result: ApiResult<T>,
    success: &str,
) -> ApiResult<T> {
    match &result {
        Ok(_) => sink.notify(Alert::success(success)),
        Err(e) => sink.notify(Alert::error(e.message.clone())),
    }
    result
}

/// Reads only report failures.
pub(crate) fn report_failure<T>(sink: &dyn NotificationSink, result: ApiResult<T>) -> ApiResult<T> {
    if let Err(e) = &result {
        sink.notify(Alert::error(e.message.clone()));
    }
    result
}

/// Warns when a write left `product` at or below its threshold.
pub(crate) fn warn_if_low(sink: &dyn NotificationSink, product: &Product) {
    if product.is_out_of_stock() {
        sink.notify(Alert::warning(format!("{} is out of stock", product.name)));
    } else if product.is_low_stock() {
        sink.notify(Alert::warning(format!(
            "{} is low on stock ({} left)",
            product.name, product.quantity
        )));
    }
}


#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::{ApiError, ErrorCode};
    use stocksence_core::alert::RecordingSink;
    use stocksence_core::AlertKind;

    #[test]
    fn test_require_session() {
        let user = fixtures::user();
        assert_eq!(require_session(Some(&user)).unwrap().id, "u1");
        assert_eq!(require_session(None).unwrap_err().code, ErrorCode::NotAuthenticated);
    }

    #[test]
    fn test_report_outcomes() {
        let sink = RecordingSink::new();

        report(&sink, Ok(()), "Saved").unwrap();
        assert_eq!(sink.last(), Some(Alert::success("Saved")));

        let _ = report::<()>(&sink, Err(ApiError::validation("name is required")), "Saved");
        assert_eq!(sink.last(), Some(Alert::error("name is required")));

        report_failure(&sink, Ok(1)).unwrap();
        assert_eq!(sink.alerts().len(), 2);
        assert_eq!(sink.alerts()[0].kind, AlertKind::Success);
    }
}
