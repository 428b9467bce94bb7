//! # Catalog Queries
//!
//! Screen-level filtering and sorting for the products, inventory, sales and
//! record-sale screens. Everything here works on an in-memory list the caller
//! already fetched.

use chrono::{DateTime, NaiveDate, TimeZone, Utc};
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::collections::BTreeSet;
use ts_rs::TS;

use crate::types::{Product, Sale};

// =============================================================================
// Sorting
// =============================================================================

/// Column a product table can be sorted by.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize, TS)]
#[serde(rename_all = "lowercase")]
#[ts(export)]
pub enum SortField {
    #[default]
    Name,
    Category,
    Quantity,
    Price,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize, TS)]
#[serde(rename_all = "lowercase")]
#[ts(export)]
pub enum SortOrder {
    #[default]
    Asc,
    Desc,
}

impl SortOrder {
    pub fn toggle(self) -> Self {
        match self {
            SortOrder::Asc => SortOrder::Desc,
            SortOrder::Desc => SortOrder::Asc,
        }
    }

    fn apply(self, ordering: Ordering) -> Ordering {
        match self {
            SortOrder::Asc => ordering,
            SortOrder::Desc => ordering.reverse(),
        }
    }
}

/// Sort state behind a clickable table header.
///
/// ```text
/// select(Name)  on (Name, Asc)  → (Name, Desc)
/// select(Price) on (Name, Desc) → (Price, Asc)
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct SortState {
    pub field: SortField,
    pub order: SortOrder,
}

impl SortState {
    pub fn select(&mut self, field: SortField) {
        if self.field == field {
            self.order = self.order.toggle();
        } else {
            self.field = field;
            self.order = SortOrder::Asc;
        }
    }
}

fn compare_products(a: &Product, b: &Product, field: SortField) -> Ordering {
    match field {
        SortField::Name => a.name.to_lowercase().cmp(&b.name.to_lowercase()),
        SortField::Category => a.category.to_lowercase().cmp(&b.category.to_lowercase()),
        SortField::Quantity => a.quantity.cmp(&b.quantity),
        SortField::Price => a.price_cents.cmp(&b.price_cents),
    }
}

// =============================================================================
// Product Query
// =============================================================================

/// Stock band filter on the inventory screen.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize, TS)]
#[serde(rename_all = "lowercase")]
#[ts(export)]
pub enum StockFilter {
    #[default]
    All,
    /// `quantity <= min_quantity`, zero included.
    Low,
    Out,
    Normal,
}

impl StockFilter {
    pub fn matches(self, product: &Product) -> bool {
        match self {
            StockFilter::All => true,
            StockFilter::Low => product.is_low_stock(),
            StockFilter::Out => product.is_out_of_stock(),
            StockFilter::Normal => !product.is_low_stock(),
        }
    }
}

/// Filters and ordering for a product list.
///
/// Deserializes from a query string such as
/// `?search=lamp&stock=low&sort=price&order=desc`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, TS)]
#[serde(default, rename_all = "camelCase")]
#[ts(export)]
pub struct ProductQuery {
    /// Case-insensitive match on name or description.
    pub search: Option<String>,
    /// Exact category match.
    pub category: Option<String>,
    pub stock: StockFilter,
    pub sort: SortField,
    pub order: SortOrder,
}

impl ProductQuery {
    pub fn matches(&self, product: &Product) -> bool {
        let search_ok = match self.search.as_deref().map(str::trim) {
            None | Some("") => true,
            Some(term) => {
                let term = term.to_lowercase();
                product.name.to_lowercase().contains(&term)
                    || product.description.to_lowercase().contains(&term)
            }
        };

        let category_ok = match self.category.as_deref() {
            None | Some("") => true,
            Some(category) => product.category == category,
        };

        search_ok && category_ok && self.stock.matches(product)
    }

    /// Returns the matching products in the requested order.
    pub fn apply(&self, products: &[Product]) -> Vec<Product> {
        let mut matched: Vec<Product> = products.iter().filter(|p| self.matches(p)).cloned().collect();
        matched.sort_by(|a, b| self.order.apply(compare_products(a, b, self.sort)));
        matched
    }
}

/// Products offered by the record-sale picker: in stock and matching `search`.
pub fn sellable<'a>(products: &'a [Product], search: &str) -> Vec<&'a Product> {
    let term = search.trim().to_lowercase();
    products
        .iter()
        .filter(|p| p.quantity > 0)
        .filter(|p| term.is_empty() || p.name.to_lowercase().contains(&term))
        .collect()
}

/// Distinct categories currently used by products, sorted.
pub fn categories_in_use(products: &[Product]) -> Vec<String> {
    products
        .iter()
        .map(|p| p.category.clone())
        .collect::<BTreeSet<_>>()
        .into_iter()
        .collect()
}

// =============================================================================
// Sales Query
// =============================================================================

/// Filters for the sales history screen.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, TS)]
#[serde(default, rename_all = "camelCase")]
#[ts(export)]
pub struct SalesQuery {
    /// Case-insensitive match on the product name snapshot.
    pub search: Option<String>,
    /// Calendar day in the reporting time zone.
    #[ts(as = "Option<String>")]
    pub date: Option<NaiveDate>,
}

impl SalesQuery {
    /// Returns the matching sales, newest first.
    pub fn apply<Tz: TimeZone>(&self, sales: &[Sale], tz: &Tz) -> Vec<Sale> {
        let term = self
            .search
            .as_deref()
            .map(|s| s.trim().to_lowercase())
            .unwrap_or_default();

        let mut matched: Vec<Sale> = sales
            .iter()
            .filter(|s| term.is_empty() || s.product_name.to_lowercase().contains(&term))
            .filter(|s| self.date.map_or(true, |day| local_day(&s.date, tz) == day))
            .cloned()
            .collect();
        matched.sort_by(|a, b| b.date.cmp(&a.date));
        matched
    }
}

/// Distinct sale days in `tz`, newest first.
pub fn sale_dates<Tz: TimeZone>(sales: &[Sale], tz: &Tz) -> Vec<NaiveDate> {
    sales
        .iter()
        .map(|s| local_day(&s.date, tz))
        .collect::<BTreeSet<_>>()
        .into_iter()
        .rev()
        .collect()
}

fn local_day<Tz: TimeZone>(instant: &DateTime<Utc>, tz: &Tz) -> NaiveDate {
    instant.with_timezone(tz).date_naive()
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::FixedOffset;

    fn product(name: &str, category: &str, quantity: i64, price: i64) -> Product {
        let now = Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap();
        Product {
            id: name.to_lowercase(),
            name: name.to_string(),
            description: format!("{} for the shop floor", name),
            price_cents: price,
            cost_cents: 0,
            quantity,
            min_quantity: 5,
            category: category.to_string(),
            image_url: None,
            created_at: now,
            updated_at: now,
        }
    }

    fn shelf() -> Vec<Product> {
        vec![
            product("banana", "Food", 0, 50),
            product("Apple", "Food", 30, 80),
            product("Cable", "Electronics", 4, 1299),
        ]
    }

    fn names(products: &[Product]) -> Vec<&str> {
        products.iter().map(|p| p.name.as_str()).collect()
    }

    #[test]
    fn test_default_query_sorts_by_name_case_insensitive() {
        let sorted = ProductQuery::default().apply(&shelf());
        assert_eq!(names(&sorted), vec!["Apple", "banana", "Cable"]);
    }

    #[test]
    fn test_query_filters_combine() {
        let query = ProductQuery {
            category: Some("Food".to_string()),
            stock: StockFilter::Low,
            ..Default::default()
        };
        assert_eq!(names(&query.apply(&shelf())), vec!["banana"]);

        let query = ProductQuery {
            search: Some("SHOP FLOOR".to_string()),
            sort: SortField::Price,
            order: SortOrder::Desc,
            ..Default::default()
        };
        assert_eq!(names(&query.apply(&shelf())), vec!["Cable", "Apple", "banana"]);
    }

    #[test]
    fn test_stock_filter_out_and_normal() {
        let out = ProductQuery {
            stock: StockFilter::Out,
            ..Default::default()
        };
        assert_eq!(names(&out.apply(&shelf())), vec!["banana"]);

        let normal = ProductQuery {
            stock: StockFilter::Normal,
            ..Default::default()
        };
        assert_eq!(names(&normal.apply(&shelf())), vec!["Apple"]);
    }

    #[test]
    fn test_sort_state_select() {
        let mut state = SortState::default();
        state.select(SortField::Name);
        assert_eq!(state.order, SortOrder::Desc);

        state.select(SortField::Quantity);
        assert_eq!(state, SortState { field: SortField::Quantity, order: SortOrder::Asc });

        state.select(SortField::Quantity);
        state.select(SortField::Quantity);
        assert_eq!(state.order, SortOrder::Asc);
    }

    #[test]
    fn test_sellable_excludes_empty_shelves() {
        let products = shelf();
        let picks: Vec<&str> = sellable(&products, "").iter().map(|p| p.name.as_str()).collect();
        assert_eq!(picks, vec!["Apple", "Cable"]);
        assert_eq!(sellable(&products, "cab").len(), 1);
        assert!(sellable(&products, "banana").is_empty());
    }

    #[test]
    fn test_categories_in_use() {
        assert_eq!(categories_in_use(&shelf()), vec!["Electronics", "Food"]);
    }

    #[test]
    fn test_product_query_from_json() {
        let query: ProductQuery =
            serde_json::from_str(r#"{"stock":"low","sort":"quantity","order":"desc"}"#).unwrap();
        assert_eq!(query.stock, StockFilter::Low);
        assert_eq!(query.sort, SortField::Quantity);
        assert_eq!(query.search, None);
    }

    fn sale(id: &str, name: &str, date: DateTime<Utc>) -> Sale {
        Sale {
            id: id.to_string(),
            product_id: format!("p-{}", id),
            product_name: name.to_string(),
            quantity: 1,
            total_price_cents: 100,
            date,
        }
    }

    #[test]
    fn test_sales_query_and_dates() {
        let utc = Utc;
        let sales = vec![
            sale("s1", "Green Tea", Utc.with_ymd_and_hms(2024, 5, 1, 9, 0, 0).unwrap()),
            sale("s2", "Black Tea", Utc.with_ymd_and_hms(2024, 5, 2, 23, 30, 0).unwrap()),
            sale("s3", "Kettle", Utc.with_ymd_and_hms(2024, 5, 2, 8, 0, 0).unwrap()),
        ];

        let query = SalesQuery {
            search: Some("tea".to_string()),
            date: None,
        };
        let ids: Vec<String> = query.apply(&sales, &utc).into_iter().map(|s| s.id).collect();
        assert_eq!(ids, vec!["s2", "s1"]);

        let day = NaiveDate::from_ymd_opt(2024, 5, 2).unwrap();
        let query = SalesQuery {
            search: None,
            date: Some(day),
        };
        assert_eq!(query.apply(&sales, &utc).len(), 2);

        assert_eq!(
            sale_dates(&sales, &utc),
            vec![day, NaiveDate::from_ymd_opt(2024, 5, 1).unwrap()]
        );

        // 23:30 UTC on the 2nd is already the 3rd at UTC+2
        let plus_two = FixedOffset::east_opt(2 * 3600).unwrap();
        assert_eq!(sale_dates(&sales, &plus_two).len(), 3);
    }
}
