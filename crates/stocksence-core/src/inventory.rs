//! # Inventory Derivation
//!
//! Pure stock-level derivations over an already-fetched product list.
//!
//! ## Stock Bands
//! ```text
//! quantity:   0        1 ..= min_quantity        > min_quantity
//!           ┌────┐   ┌──────────────────┐      ┌──────────────┐
//!           │OUT │   │       LOW        │      │    NORMAL    │
//!           └────┘   └──────────────────┘      └──────────────┘
//!           └──────────── low_stock() ───┘
//! ```
//! `low_stock` is threshold-inclusive and includes out-of-stock products.

use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::money::Money;
use crate::types::Product;

/// Products with `quantity <= min_quantity` (zero included).
pub fn low_stock(products: &[Product]) -> Vec<&Product> {
    products.iter().filter(|p| p.is_low_stock()).collect()
}

/// Products with `quantity == 0`.
pub fn out_of_stock(products: &[Product]) -> Vec<&Product> {
    products.iter().filter(|p| p.is_out_of_stock()).collect()
}

/// Products with `quantity > min_quantity`.
pub fn normal_stock(products: &[Product]) -> Vec<&Product> {
    products.iter().filter(|p| !p.is_low_stock()).collect()
}

/// Per-unit profit margin of a product; `None` when its price is zero.
pub fn profit_margin(product: &Product) -> Option<f64> {
    product.profit_margin()
}

/// Headline numbers for the inventory screen.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct StockSummary {
    pub total_products: usize,
    /// Sum of units on hand across all products.
    pub total_units: i64,
    /// Threshold-inclusive, out-of-stock products included.
    pub low_stock_count: usize,
    /// Low but still sellable (`0 < quantity <= min_quantity`).
    pub restock_count: usize,
    pub out_of_stock_count: usize,
    /// Σ cost × quantity.
    pub inventory_value: Money,
    /// Σ price × quantity.
    pub retail_value: Money,
}

/// Computes a [`StockSummary`] in one pass.
pub fn summarize(products: &[Product]) -> StockSummary {
    products
        .iter()
        .fold(StockSummary::default(), |mut acc, p| {
            acc.total_products += 1;
            acc.total_units = acc.total_units.saturating_add(p.quantity);
            if p.is_low_stock() {
                acc.low_stock_count += 1;
            }
            if p.is_out_of_stock() {
                acc.out_of_stock_count += 1;
            } else if p.is_low_stock() {
                acc.restock_count += 1;
            }
            acc.inventory_value += p.cost().multiply_quantity(p.quantity);
            acc.retail_value += p.price().multiply_quantity(p.quantity);
            acc
        })
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    fn product(id: &str, quantity: i64, min: i64) -> Product {
        let now = Utc::now();
        Product {
            id: id.to_string(),
            name: id.to_string(),
            description: String::new(),
            price_cents: 1000,
            cost_cents: 400,
            quantity,
            min_quantity: min,
            category: "Other".to_string(),
            image_url: None,
            created_at: now,
            updated_at: now,
        }
    }

    fn ids(products: Vec<&Product>) -> Vec<&str> {
        products.iter().map(|p| p.id.as_str()).collect()
    }

    #[test]
    fn test_bands_partition_products() {
        let products = vec![
            product("empty", 0, 5),
            product("edge", 5, 5),
            product("few", 2, 5),
            product("plenty", 20, 5),
        ];

        assert_eq!(ids(low_stock(&products)), vec!["empty", "edge", "few"]);
        assert_eq!(ids(out_of_stock(&products)), vec!["empty"]);
        assert_eq!(ids(normal_stock(&products)), vec!["plenty"]);

        // Low and normal never overlap and together cover everything
        assert_eq!(
            low_stock(&products).len() + normal_stock(&products).len(),
            products.len()
        );
    }

    #[test]
    fn test_zero_threshold_only_flags_empty_shelves() {
        let products = vec![product("a", 0, 0), product("b", 1, 0)];
        assert_eq!(ids(low_stock(&products)), vec!["a"]);
    }

    #[test]
    fn test_summarize() {
        let products = vec![
            product("empty", 0, 5),
            product("few", 2, 5),
            product("plenty", 20, 5),
        ];

        let summary = summarize(&products);
        assert_eq!(summary.total_products, 3);
        assert_eq!(summary.total_units, 22);
        assert_eq!(summary.low_stock_count, 2);
        assert_eq!(summary.restock_count, 1);
        assert_eq!(summary.out_of_stock_count, 1);
        assert_eq!(summary.inventory_value, Money::from_cents(22 * 400));
        assert_eq!(summary.retail_value, Money::from_cents(22 * 1000));
    }

    #[test]
    fn test_summarize_saturates_on_huge_stock() {
        let mut rich = product("rich", i64::MAX, 5);
        rich.price_cents = 4_000_000_000_000_000_000;
        let products = vec![rich, product("plenty", 20, 5)];

        let summary = summarize(&products);
        assert_eq!(summary.total_units, i64::MAX);
        assert_eq!(summary.retail_value, Money::from_cents(i64::MAX));
    }

    #[test]
    fn test_summarize_empty() {
        assert_eq!(summarize(&[]), StockSummary::default());
    }
}
