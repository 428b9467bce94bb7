//! # Product Commands
//!
//! Catalog CRUD. Deletion is a hard delete; sales keep their product name
//! snapshot and a dangling `product_id`.

use chrono::Utc;
use tracing::{debug, info};

use super::{report, report_failure, require_session};
use crate::error::{ApiError, ApiResult};
use stocksence_core::catalog::ProductQuery;
use stocksence_core::validation::{validate_new_product, validate_product_update, validate_search_query};
use stocksence_core::{NewProduct, NotificationSink, Product, ProductUpdate, User};
use stocksence_db::repository::product::generate_product_id;
use stocksence_db::Database;

/// Products matching `query`, in the requested order.
pub async fn list_products(
    db: &Database,
    session: Option<&User>,
    sink: &dyn NotificationSink,
    query: &ProductQuery,
) -> ApiResult<Vec<Product>> {
    report_failure(sink, list(db, session, query).await)
}

async fn list(db: &Database, session: Option<&User>, query: &ProductQuery) -> ApiResult<Vec<Product>> {
    require_session(session)?;
    let query = normalized(query)?;
    debug!(?query, "list_products command");

    let products = db.products().list().await?;
    Ok(query.apply(&products))
}

/// Trims the search term and enforces its length limit.
pub(crate) fn normalized(query: &ProductQuery) -> ApiResult<ProductQuery> {
    let mut query = query.clone();
    if let Some(search) = query.search.as_deref() {
        query.search = Some(validate_search_query(search)?);
    }
    Ok(query)
}

pub async fn get_product(
    db: &Database,
    session: Option<&User>,
    sink: &dyn NotificationSink,
    id: &str,
) -> ApiResult<Product> {
    report_failure(sink, get(db, session, id).await)
}

async fn get(db: &Database, session: Option<&User>, id: &str) -> ApiResult<Product> {
    require_session(session)?;
    debug!(id = %id, "get_product command");

    db.products()
        .get_by_id(id)
        .await?
        .ok_or_else(|| ApiError::not_found("Product", id))
}

pub async fn create_product(
    db: &Database,
    session: Option<&User>,
    sink: &dyn NotificationSink,
    input: NewProduct,
) -> ApiResult<Product> {
    report(sink, create(db, session, input).await, "Product added successfully")
}

async fn create(db: &Database, session: Option<&User>, input: NewProduct) -> ApiResult<Product> {
    let user = require_session(session)?;
    validate_new_product(&input)?;

    let product = input.into_product(generate_product_id(), Utc::now());
    let product = db.products().insert(&product).await?;

    info!(id = %product.id, name = %product.name, user_id = %user.id, "Product created");
    Ok(product)
}

pub async fn update_product(
    db: &Database,
    session: Option<&User>,
    sink: &dyn NotificationSink,
    id: &str,
    update: ProductUpdate,
) -> ApiResult<Product> {
    report(sink, edit(db, session, id, update).await, "Product updated successfully")
}

async fn edit(
    db: &Database,
    session: Option<&User>,
    id: &str,
    update: ProductUpdate,
) -> ApiResult<Product> {
    let user = require_session(session)?;
    validate_product_update(&update)?;

    let existing = db
        .products()
        .get_by_id(id)
        .await?
        .ok_or_else(|| ApiError::not_found("Product", id))?;

    let updated = existing.apply(&update, Utc::now());
    db.products().update(&updated).await?;

    info!(id = %id, user_id = %user.id, "Product updated");
    Ok(updated)
}

pub async fn delete_product(
    db: &Database,
    session: Option<&User>,
    sink: &dyn NotificationSink,
    id: &str,
) -> ApiResult<()> {
    report(sink, remove(db, session, id).await, "Product deleted successfully")
}

async fn remove(db: &Database, session: Option<&User>, id: &str) -> ApiResult<()> {
    let user = require_session(session)?;
    db.products().delete(id).await?;

    info!(id = %id, user_id = %user.id, "Product deleted");
    Ok(())
}
