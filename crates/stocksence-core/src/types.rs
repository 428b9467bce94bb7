//! # Domain Types
//!
//! Core domain types used throughout StockSence.
//!
//! ## Type Overview
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Domain Types                                    │
//! │                                                                         │
//! │  ┌─────────────────┐   ┌─────────────────┐   ┌─────────────────┐       │
//! │  │    Product      │   │      Sale       │   │      User       │       │
//! │  │  ─────────────  │   │  ─────────────  │   │  ─────────────  │       │
//! │  │  id (UUID)      │◄ ─│  product_id     │   │  id (UUID)      │       │
//! │  │  name           │   │  product_name   │   │  email          │       │
//! │  │  price_cents    │   │   (snapshot)    │   │  full_name      │       │
//! │  │  cost_cents     │   │  quantity       │   └─────────────────┘       │
//! │  │  quantity       │   │  total_price    │                             │
//! │  │  min_quantity   │   │  date           │                             │
//! │  └─────────────────┘   └─────────────────┘                             │
//! │                                                                         │
//! │  Sale.product_id is a WEAK reference: the product may be deleted       │
//! │  later and the sale keeps its product_name snapshot.                   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::money::{percentage_of, Money};

/// Low-stock threshold applied when a product is created without one.
pub const DEFAULT_MIN_QUANTITY: i64 = 5;

/// Categories offered by the product form. Free text is also accepted.
pub const SUGGESTED_CATEGORIES: &[&str] = &[
    "Electronics",
    "Clothing",
    "Food",
    "Beverages",
    "Home Goods",
    "Office Supplies",
    "Beauty",
    "Health",
    "Other",
];

// =============================================================================
// Product
// =============================================================================

/// A product held in inventory.
///
/// ## Invariants
/// - `quantity >= 0`, `price_cents >= 0`, `cost_cents >= 0`
/// - `min_quantity >= 0` (low-stock threshold, inclusive)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct Product {
    /// Unique identifier (UUID v4), assigned on creation.
    pub id: String,

    /// Display name.
    pub name: String,

    /// Free-form description, may be empty.
    pub description: String,

    /// Selling price in cents.
    pub price_cents: i64,

    /// Purchase cost in cents (for profit calculations).
    pub cost_cents: i64,

    /// Units currently in stock.
    pub quantity: i64,

    /// Low-stock threshold.
    pub min_quantity: i64,

    /// Category name (one of [`SUGGESTED_CATEGORIES`] or free text).
    pub category: String,

    /// Optional product image.
    pub image_url: Option<String>,

    #[ts(as = "String")]
    pub created_at: DateTime<Utc>,

    #[ts(as = "String")]
    pub updated_at: DateTime<Utc>,
}

impl Product {
    /// Returns the price as a Money type.
    #[inline]
    pub fn price(&self) -> Money {
        Money::from_cents(self.price_cents)
    }

    /// Returns the cost as a Money type.
    #[inline]
    pub fn cost(&self) -> Money {
        Money::from_cents(self.cost_cents)
    }

    /// `quantity <= min_quantity`. Zero stock counts as low stock.
    #[inline]
    pub fn is_low_stock(&self) -> bool {
        self.quantity <= self.min_quantity
    }

    /// `quantity == 0`.
    #[inline]
    pub fn is_out_of_stock(&self) -> bool {
        self.quantity == 0
    }

    /// Badge shown next to the product. Out of stock wins over low stock.
    pub fn stock_status(&self) -> StockStatus {
        if self.is_out_of_stock() {
            StockStatus::OutOfStock
        } else if self.is_low_stock() {
            StockStatus::Low
        } else {
            StockStatus::Normal
        }
    }

    /// Per-unit profit margin: `(price - cost) / price * 100`.
    ///
    /// Returns `None` for a zero-price product; callers decide how to
    /// display an undefined margin.
    ///
    /// ## Example
    /// ```text
    /// price $10.00, cost $4.00  →  Some(60.0)
    /// price $0.00               →  None
    /// ```
    pub fn profit_margin(&self) -> Option<f64> {
        percentage_of(self.price() - self.cost(), self.price())
    }

    /// Applies a partial edit, returning the edited product.
    ///
    /// `updated_at` is set to `now`; identity and `created_at` never change.
    /// An empty `image_url` clears the image.
    pub fn apply(&self, update: &ProductUpdate, now: DateTime<Utc>) -> Product {
        let mut edited = self.clone();
        if let Some(name) = &update.name {
            edited.name = name.trim().to_string();
        }
        if let Some(description) = &update.description {
            edited.description = description.clone();
        }
        if let Some(price) = update.price_cents {
            edited.price_cents = price;
        }
        if let Some(cost) = update.cost_cents {
            edited.cost_cents = cost;
        }
        if let Some(quantity) = update.quantity {
            edited.quantity = quantity;
        }
        if let Some(min_quantity) = update.min_quantity {
            edited.min_quantity = min_quantity;
        }
        if let Some(category) = &update.category {
            edited.category = category.trim().to_string();
        }
        if let Some(url) = &update.image_url {
            let url = url.trim();
            edited.image_url = if url.is_empty() {
                None
            } else {
                Some(url.to_string())
            };
        }
        edited.updated_at = now;
        edited
    }
}

/// Derived stock badge for a product.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub enum StockStatus {
    OutOfStock,
    Low,
    Normal,
}

// =============================================================================
// Product Inputs
// =============================================================================

fn default_min_quantity() -> i64 {
    DEFAULT_MIN_QUANTITY
}

/// Input for creating a product.
///
/// ## Wire Format
/// ```json
/// {
///   "name": "USB-C Cable",
///   "priceCents": 1299,
///   "costCents": 450,
///   "quantity": 40,
///   "category": "Electronics"
/// }
/// ```
/// `description` defaults to empty and `minQuantity` to 5.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct NewProduct {
    pub name: String,
    #[serde(default)]
    pub description: String,
    pub price_cents: i64,
    pub cost_cents: i64,
    pub quantity: i64,
    #[serde(default = "default_min_quantity")]
    pub min_quantity: i64,
    pub category: String,
    #[serde(default)]
    pub image_url: Option<String>,
}

impl NewProduct {
    /// Builds the stored product. `created_at == updated_at == now`.
    pub fn into_product(self, id: String, now: DateTime<Utc>) -> Product {
        let image_url = self
            .image_url
            .map(|url| url.trim().to_string())
            .filter(|url| !url.is_empty());

        Product {
            id,
            name: self.name.trim().to_string(),
            description: self.description,
            price_cents: self.price_cents,
            cost_cents: self.cost_cents,
            quantity: self.quantity,
            min_quantity: self.min_quantity,
            category: self.category.trim().to_string(),
            image_url,
            created_at: now,
            updated_at: now,
        }
    }
}

/// Partial edit of a product. Absent fields are left unchanged.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct ProductUpdate {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub price_cents: Option<i64>,
    #[serde(default)]
    pub cost_cents: Option<i64>,
    #[serde(default)]
    pub quantity: Option<i64>,
    #[serde(default)]
    pub min_quantity: Option<i64>,
    #[serde(default)]
    pub category: Option<String>,
    #[serde(default)]
    pub image_url: Option<String>,
}

// =============================================================================
// Sale
// =============================================================================

/// A recorded sale of one product.
///
/// Sales are immutable: there is no edit or reversal operation.
/// `total_price_cents` is the product price at sale time × `quantity`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct Sale {
    pub id: String,
    /// Weak reference; may dangle after the product is deleted.
    pub product_id: String,
    /// Product name at time of sale (frozen).
    pub product_name: String,
    /// Units sold, always > 0.
    pub quantity: i64,
    pub total_price_cents: i64,
    #[ts(as = "String")]
    pub date: DateTime<Utc>,
}

impl Sale {
    /// Returns the total price as Money.
    #[inline]
    pub fn total_price(&self) -> Money {
        Money::from_cents(self.total_price_cents)
    }
}

/// Result of recording a sale.
///
/// Carries the product's remaining stock so callers can reconcile their
/// local copy without re-fetching.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct SaleReceipt {
    pub sale: Sale,
    pub remaining_quantity: i64,
}

// =============================================================================
// User
// =============================================================================

/// A signed-up user profile.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct User {
    pub id: String,
    pub email: String,
    pub full_name: String,
    #[ts(as = "String")]
    pub created_at: DateTime<Utc>,
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn product(price: i64, cost: i64, quantity: i64, min: i64) -> Product {
        let now = Utc.with_ymd_and_hms(2024, 3, 1, 9, 0, 0).unwrap();
        Product {
            id: "p-1".to_string(),
            name: "Desk Lamp".to_string(),
            description: String::new(),
            price_cents: price,
            cost_cents: cost,
            quantity,
            min_quantity: min,
            category: "Home Goods".to_string(),
            image_url: None,
            created_at: now,
            updated_at: now,
        }
    }

    #[test]
    fn test_margin_and_stock_for_healthy_product() {
        let p = product(1000, 400, 20, 5);
        assert_eq!(p.profit_margin(), Some(60.0));
        assert!(!p.is_low_stock());
        assert!(!p.is_out_of_stock());
        assert_eq!(p.stock_status(), StockStatus::Normal);
    }

    #[test]
    fn test_low_stock_is_threshold_inclusive() {
        let p = product(1000, 400, 5, 5);
        assert!(p.is_low_stock());
        assert_eq!(p.stock_status(), StockStatus::Low);
    }

    #[test]
    fn test_zero_stock_is_both_out_and_low() {
        let p = product(1000, 400, 0, 5);
        assert!(p.is_out_of_stock());
        assert!(p.is_low_stock());
        assert_eq!(p.stock_status(), StockStatus::OutOfStock);
    }

    #[test]
    fn test_zero_price_has_no_margin() {
        let p = product(0, 400, 3, 5);
        assert_eq!(p.profit_margin(), None);
    }

    #[test]
    fn test_apply_update_touches_only_given_fields() {
        let p = product(1000, 400, 20, 5);
        let later = p.created_at + chrono::Duration::hours(1);
        let update = ProductUpdate {
            name: Some("  Reading Lamp ".to_string()),
            quantity: Some(7),
            image_url: Some(String::new()),
            ..Default::default()
        };

        let edited = p.apply(&update, later);
        assert_eq!(edited.name, "Reading Lamp");
        assert_eq!(edited.quantity, 7);
        assert_eq!(edited.price_cents, 1000);
        assert_eq!(edited.image_url, None);
        assert_eq!(edited.created_at, p.created_at);
        assert_eq!(edited.updated_at, later);
    }

    #[test]
    fn test_new_product_defaults_from_json() {
        let input: NewProduct = serde_json::from_str(
            r#"{"name":"Notebook","priceCents":250,"costCents":90,"quantity":12,"category":"Office Supplies"}"#,
        )
        .unwrap();
        assert_eq!(input.min_quantity, DEFAULT_MIN_QUANTITY);
        assert_eq!(input.description, "");

        let now = Utc.with_ymd_and_hms(2024, 3, 1, 9, 0, 0).unwrap();
        let stored = input.into_product("p-9".to_string(), now);
        assert_eq!(stored.created_at, stored.updated_at);
        assert_eq!(stored.image_url, None);
    }

    #[test]
    fn test_sale_serializes_camel_case() {
        let sale = Sale {
            id: "s-1".to_string(),
            product_id: "p-1".to_string(),
            product_name: "Desk Lamp".to_string(),
            quantity: 2,
            total_price_cents: 2000,
            date: Utc.with_ymd_and_hms(2024, 3, 1, 9, 0, 0).unwrap(),
        };
        let json = serde_json::to_value(&sale).unwrap();
        assert_eq!(json["productName"], "Desk Lamp");
        assert_eq!(json["totalPriceCents"], 2000);
        assert_eq!(sale.total_price(), Money::from_cents(2000));
    }
}
