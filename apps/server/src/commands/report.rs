//! # Report Command
//!
//! Revenue, items sold, profit and top products for one time window.
//! Window boundaries are local midnights in the configured offset.

use chrono::{DateTime, FixedOffset};
use tracing::debug;

use super::{report_failure, require_session};
use crate::error::ApiResult;
use stocksence_core::reporting::{build_report, window_start, SalesReport};
use stocksence_core::{NotificationSink, TimeWindow, User};
use stocksence_db::Database;

pub async fn sales_report(
    db: &Database,
    session: Option<&User>,
    sink: &dyn NotificationSink,
    window: TimeWindow,
    now: DateTime<FixedOffset>,
) -> ApiResult<SalesReport> {
    report_failure(sink, load(db, session, window, now).await)
}

async fn load(
    db: &Database,
    session: Option<&User>,
    window: TimeWindow,
    now: DateTime<FixedOffset>,
) -> ApiResult<SalesReport> {
    require_session(session)?;
    debug!(%window, "sales_report command");

    let sales = match window_start(window, &now) {
        Some(start) => db.sales().since(start).await?,
        None => db.sales().list().await?,
    };
    let products = db.products().list().await?;

    Ok(build_report(&sales, &products, window, &now))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::commands::fixtures::{database, new_product, user};
    use crate::commands::product::create_product;
    use crate::error::ErrorCode;
    use chrono::{TimeZone, Utc};
    use stocksence_core::alert::RecordingSink;
    use stocksence_core::reporting::UNKNOWN_PRODUCT;
    use stocksence_core::Money;

    fn now() -> DateTime<FixedOffset> {
        FixedOffset::east_opt(0)
            .unwrap()
            .with_ymd_and_hms(2024, 5, 15, 12, 0, 0)
            .unwrap()
    }

    #[tokio::test]
    async fn test_this_month_excludes_last_year() {
        let db = database().await;
        let sink = RecordingSink::new();
        let user = user();
        let product = create_product(&db, Some(&user), &sink, new_product("Kettle", 100, 1000, 400))
            .await
            .unwrap();

        let d1 = Utc.with_ymd_and_hms(2024, 5, 3, 10, 0, 0).unwrap();
        let d2 = Utc.with_ymd_and_hms(2023, 5, 15, 10, 0, 0).unwrap();
        db.sales().record_sale(&product.id, 5, d1).await.unwrap();
        db.sales().record_sale(&product.id, 3, d2).await.unwrap();

        let report = sales_report(&db, Some(&user), &sink, TimeWindow::ThisMonth, now())
            .await
            .unwrap();
        assert_eq!(report.sale_count, 1);
        assert_eq!(report.revenue, Money::from_cents(5000));
        assert_eq!(report.items_sold, 5);
        assert_eq!(report.profit, Money::from_cents(3000));
        assert_eq!(report.profit_margin, 60.0);
        assert_eq!(report.window_start, Some(Utc.with_ymd_and_hms(2024, 5, 1, 0, 0, 0).unwrap()));

        let all = sales_report(&db, Some(&user), &sink, TimeWindow::AllTime, now())
            .await
            .unwrap();
        assert_eq!(all.sale_count, 2);
        assert_eq!(all.revenue, Money::from_cents(8000));
        assert!(all.window_start.is_none());
    }

    #[tokio::test]
    async fn test_deleted_product_reported_as_unknown() {
        let db = database().await;
        let sink = RecordingSink::new();
        let user = user();
        let product = create_product(&db, Some(&user), &sink, new_product("Kettle", 10, 1000, 400))
            .await
            .unwrap();
        db.sales()
            .record_sale(&product.id, 2, Utc.with_ymd_and_hms(2024, 5, 15, 9, 0, 0).unwrap())
            .await
            .unwrap();
        db.products().delete(&product.id).await.unwrap();

        let report = sales_report(&db, Some(&user), &sink, TimeWindow::Today, now())
            .await
            .unwrap();
        assert_eq!(report.top_products.len(), 1);
        assert_eq!(report.top_products[0].name, UNKNOWN_PRODUCT);
        // No current cost to subtract
        assert_eq!(report.profit, Money::from_cents(2000));
    }

    #[tokio::test]
    async fn test_empty_report() {
        let db = database().await;
        let sink = RecordingSink::new();
        let report = sales_report(&db, Some(&user()), &sink, TimeWindow::ThisYear, now())
            .await
            .unwrap();
        assert_eq!(report.sale_count, 0);
        assert_eq!(report.profit_margin, 0.0);
        assert!(report.top_products.is_empty());

        let err = sales_report(&db, None, &sink, TimeWindow::ThisYear, now())
            .await
            .unwrap_err();
        assert_eq!(err.code, ErrorCode::NotAuthenticated);
    }
}
