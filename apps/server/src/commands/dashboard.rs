//! # Dashboard Command

use tracing::debug;

use super::{report_failure, require_session};
use crate::error::ApiResult;
use stocksence_core::reporting::{self, Dashboard};
use stocksence_core::{NotificationSink, User};
use stocksence_db::Database;

/// Headline counters, the low-stock list and the five latest sales.
pub async fn dashboard(
    db: &Database,
    session: Option<&User>,
    sink: &dyn NotificationSink,
) -> ApiResult<Dashboard> {
    report_failure(sink, load(db, session).await)
}

async fn load(db: &Database, session: Option<&User>) -> ApiResult<Dashboard> {
    require_session(session)?;
    debug!("dashboard command");

    let products = db.products().list().await?;
    let sales = db.sales().list().await?;
    Ok(reporting::dashboard(&products, &sales))
}
