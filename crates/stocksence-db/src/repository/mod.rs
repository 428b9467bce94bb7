//! # Repository Module
//!
//! One repository per table family, each a thin handle over the shared pool.
//!
//! ```text
//! Database
//! ├── products()  → ProductRepository   CRUD, stock level, low-stock list
//! ├── sales()     → SaleRepository      history, aggregates, record_sale (tx)
//! ├── users()     → UserRepository      profiles + password hashes
//! └── sessions()  → SessionRepository   server-side session rows
//! ```
//!
//! Queries are runtime-checked (`sqlx::query_as::<_, T>`), so the crate builds
//! without a live database or offline query data.

pub mod product;
pub mod sale;
pub mod session;
pub mod user;

#[cfg(test)]
pub(crate) mod fixtures {
    use chrono::{DateTime, TimeZone, Utc};
    use stocksence_core::Product;

    use crate::pool::{Database, DbConfig};

    pub async fn database() -> Database {
        Database::new(DbConfig::in_memory()).await.unwrap()
    }

    pub fn at(day: u32, hour: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 5, day, hour, 0, 0).unwrap()
    }

    pub fn product(id: &str, name: &str, quantity: i64, price_cents: i64) -> Product {
        Product {
            id: id.to_string(),
            name: name.to_string(),
            description: String::new(),
            price_cents,
            cost_cents: price_cents / 2,
            quantity,
            min_quantity: 5,
            category: "Other".to_string(),
            image_url: None,
            created_at: at(1, 8),
            updated_at: at(1, 8),
        }
    }
}
