//! # Sale Repository
//!
//! Sale history queries and the one multi-record write in the system.
//!
//! ## Recording a Sale
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  record_sale(product_id, qty, now)          ONE SQLite TRANSACTION      │
//! │                                                                         │
//! │  1. SELECT product                 missing?      → NotFound            │
//! │  2. quantity < qty?                              → InsufficientStock   │
//! │  3. price × qty overflows?                       → Validation          │
//! │     INSERT sale (name + price snapshot)                                │
//! │  4. UPDATE products SET quantity = quantity - qty                      │
//! │        WHERE id = ? AND quantity >= qty                                │
//! │                                    0 rows?       → InsufficientStock   │
//! │  5. COMMIT                                                             │
//! │                                                                         │
//! │  Any early return drops the transaction, which rolls back steps 3-4:   │
//! │  a sale row exists iff the stock was decremented.                      │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! The guard in step 4 keeps two concurrent sales from driving stock
//! negative even if both passed step 2.

use chrono::{DateTime, Utc};
use sqlx::SqlitePool;
use tracing::{debug, info};
use uuid::Uuid;

use crate::error::{DbError, DbResult};
use stocksence_core::{Product, Sale, SaleReceipt, ValidationError};

#[derive(Debug, Clone)]
pub struct SaleRepository {
    pool: SqlitePool,
}

impl SaleRepository {
    pub fn new(pool: SqlitePool) -> Self {
        SaleRepository { pool }
    }

    /// Full history, newest first.
    pub async fn list(&self) -> DbResult<Vec<Sale>> {
        let sales = sqlx::query_as::<_, Sale>("SELECT * FROM sales ORDER BY date DESC, id ASC")
            .fetch_all(&self.pool)
            .await?;

        Ok(sales)
    }

    /// The `limit` most recent sales.
    pub async fn recent(&self, limit: u32) -> DbResult<Vec<Sale>> {
        let sales = sqlx::query_as::<_, Sale>(
            "SELECT * FROM sales ORDER BY date DESC, id ASC LIMIT ?1",
        )
        .bind(limit)
        .fetch_all(&self.pool)
        .await?;

        Ok(sales)
    }

    /// Sales dated at or after `start`, newest first.
    pub async fn since(&self, start: DateTime<Utc>) -> DbResult<Vec<Sale>> {
        let sales = sqlx::query_as::<_, Sale>(
            "SELECT * FROM sales WHERE date >= ?1 ORDER BY date DESC, id ASC",
        )
        .bind(start)
        .fetch_all(&self.pool)
        .await?;

        Ok(sales)
    }

    pub async fn get_by_id(&self, id: &str) -> DbResult<Option<Sale>> {
        let sale = sqlx::query_as::<_, Sale>("SELECT * FROM sales WHERE id = ?1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;

        Ok(sale)
    }

    pub async fn count(&self) -> DbResult<i64> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM sales")
            .fetch_one(&self.pool)
            .await?;

        Ok(count)
    }

    /// Σ total price over all sales, in cents.
    pub async fn total_revenue(&self) -> DbResult<i64> {
        let total: i64 = sqlx::query_scalar("SELECT COALESCE(SUM(total_price_cents), 0) FROM sales")
            .fetch_one(&self.pool)
            .await?;

        Ok(total)
    }

    /// Records a sale and decrements stock atomically.
    ///
    /// `quantity` must already be validated as positive; the CHECK
    /// constraint on `sales.quantity` rejects anything else.
    ///
    /// ## Returns
    /// * `Ok(SaleReceipt)` - Sale stored, stock decremented
    /// * `Err(DbError::NotFound)` - No such product
    /// * `Err(DbError::InsufficientStock)` - Not enough units; nothing written
    /// * `Err(DbError::Validation)` - `price × quantity` overflows; nothing written
    pub async fn record_sale(
        &self,
        product_id: &str,
        quantity: i64,
        now: DateTime<Utc>,
    ) -> DbResult<SaleReceipt> {
        debug!(product_id = %product_id, quantity, "Recording sale");

        let mut tx = self
            .pool
            .begin()
            .await
            .map_err(|e| DbError::TransactionFailed(e.to_string()))?;

        let product = sqlx::query_as::<_, Product>("SELECT * FROM products WHERE id = ?1")
            .bind(product_id)
            .fetch_optional(&mut *tx)
            .await?
            .ok_or_else(|| DbError::not_found("Product", product_id))?;

        if product.quantity < quantity {
            return Err(DbError::InsufficientStock {
                product: product.name,
                available: product.quantity,
                requested: quantity,
            });
        }

        let total_price = product
            .price()
            .checked_multiply_quantity(quantity)
            .ok_or_else(|| ValidationError::OutOfRange {
                field: "totalPrice".to_string(),
                min: 0,
                max: i64::MAX,
            })?;

        let sale = Sale {
            id: generate_sale_id(),
            product_id: product.id.clone(),
            product_name: product.name.clone(),
            quantity,
            total_price_cents: total_price.cents(),
            date: now,
        };

        sqlx::query(
            r#"
            INSERT INTO sales (id, product_id, product_name, quantity, total_price_cents, date)
            VALUES (?1, ?2, ?3, ?4, ?5, ?6)
            "#,
        )
        .bind(&sale.id)
        .bind(&sale.product_id)
        .bind(&sale.product_name)
        .bind(sale.quantity)
        .bind(sale.total_price_cents)
        .bind(sale.date)
        .execute(&mut *tx)
        .await?;

        let remaining: Option<i64> = sqlx::query_scalar(
            r#"
            UPDATE products
            SET quantity = quantity - ?2, updated_at = ?3
            WHERE id = ?1 AND quantity >= ?2
            RETURNING quantity
            "#,
        )
        .bind(&product.id)
        .bind(quantity)
        .bind(now)
        .fetch_optional(&mut *tx)
        .await?;

        let Some(remaining_quantity) = remaining else {
            return Err(DbError::InsufficientStock {
                product: product.name,
                available: product.quantity,
                requested: quantity,
            });
        };

        tx.commit()
            .await
            .map_err(|e| DbError::TransactionFailed(e.to_string()))?;

        info!(
            sale_id = %sale.id,
            product_id = %sale.product_id,
            quantity,
            remaining_quantity,
            "Sale recorded"
        );

        Ok(SaleReceipt {
            sale,
            remaining_quantity,
        })
    }
}

/// Generates a new sale ID.
pub fn generate_sale_id() -> String {
    Uuid::new_v4().to_string()
}

// =============================================================================
// Unit Tests
// =============================================================================
