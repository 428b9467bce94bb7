//! # Sales Reporting
//!
//! Pure, time-windowed aggregates over already-fetched sales and products.
//!
//! ## Time Windows
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  now = Wed 2024-05-15 14:30 (in the reporting time zone)               │
//! │                                                                         │
//! │  today      ──► 2024-05-15 00:00                                       │
//! │  thisWeek   ──► 2024-05-12 00:00   (most recent Sunday)                │
//! │  thisMonth  ──► 2024-05-01 00:00                                       │
//! │  thisYear   ──► 2024-01-01 00:00                                       │
//! │  allTime    ──► no lower bound                                         │
//! │                                                                         │
//! │  A sale is included iff sale.date >= window start.                     │
//! │  today ⊆ thisWeek ⊆ thisMonth ⊆ thisYear ⊆ allTime for a fixed now    │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Historical Accuracy
//! Sales snapshot the product name but not its cost, so profit figures use
//! each product's CURRENT cost. Sales of deleted products contribute revenue
//! but no cost.

use chrono::{DateTime, Datelike, Duration, NaiveDate, NaiveTime, TimeZone, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;
use std::str::FromStr;
use ts_rs::TS;

use crate::error::ValidationError;
use crate::money::{percentage_of, Money};
use crate::types::{Product, Sale};

/// Display name used when a sale's product no longer exists.
pub const UNKNOWN_PRODUCT: &str = "Unknown Product";

/// Number of products in the top-sellers table.
pub const TOP_PRODUCTS: usize = 5;

/// Number of sales on the dashboard's recent list.
pub const RECENT_SALES: usize = 5;

// =============================================================================
// Time Window
// =============================================================================

/// Named, `now`-relative lower bound for reports.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub enum TimeWindow {
    Today,
    ThisWeek,
    #[default]
    ThisMonth,
    ThisYear,
    AllTime,
}

impl TimeWindow {
    /// All windows, narrowest first.
    pub const ALL: [TimeWindow; 5] = [
        TimeWindow::Today,
        TimeWindow::ThisWeek,
        TimeWindow::ThisMonth,
        TimeWindow::ThisYear,
        TimeWindow::AllTime,
    ];
}

impl fmt::Display for TimeWindow {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            TimeWindow::Today => "today",
            TimeWindow::ThisWeek => "thisWeek",
            TimeWindow::ThisMonth => "thisMonth",
            TimeWindow::ThisYear => "thisYear",
            TimeWindow::AllTime => "allTime",
        };
        f.write_str(name)
    }
}

impl FromStr for TimeWindow {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        TimeWindow::ALL
            .into_iter()
            .find(|w| w.to_string().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| ValidationError::InvalidFormat {
                field: "window".to_string(),
                reason: format!(
                    "unknown window '{}', expected today, thisWeek, thisMonth, thisYear or allTime",
                    s
                ),
            })
    }
}

/// Computes the inclusive lower bound of `window` relative to `now`.
///
/// Midnight is taken in `now`'s own time zone. Returns `None` for
/// [`TimeWindow::AllTime`].
pub fn window_start<Tz: TimeZone>(window: TimeWindow, now: &DateTime<Tz>) -> Option<DateTime<Utc>> {
    let today = now.date_naive();
    let start = match window {
        TimeWindow::Today => today,
        TimeWindow::ThisWeek => {
            today - Duration::days(i64::from(today.weekday().num_days_from_sunday()))
        }
        TimeWindow::ThisMonth => today.with_day(1).unwrap_or(today),
        TimeWindow::ThisYear => today.with_ordinal(1).unwrap_or(today),
        TimeWindow::AllTime => return None,
    };
    Some(local_midnight(&now.timezone(), start))
}

/// Midnight of `date` in `tz`, as UTC.
///
/// When a DST transition skips midnight the first existing instant of the
/// following hour is used.
fn local_midnight<Tz: TimeZone>(tz: &Tz, date: NaiveDate) -> DateTime<Utc> {
    let midnight = date.and_time(NaiveTime::MIN);
    tz.from_local_datetime(&midnight)
        .earliest()
        .or_else(|| tz.from_local_datetime(&(midnight + Duration::hours(1))).earliest())
        .map(|dt| dt.with_timezone(&Utc))
        .unwrap_or_else(|| Utc.from_utc_datetime(&midnight))
}

/// Keeps the sales dated on or after the window start.
///
/// `AllTime` returns the input unchanged.
pub fn filter_by_time_window<Tz: TimeZone>(
    sales: &[Sale],
    window: TimeWindow,
    now: &DateTime<Tz>,
) -> Vec<Sale> {
    match window_start(window, now) {
        None => sales.to_vec(),
        Some(start) => sales.iter().filter(|s| s.date >= start).cloned().collect(),
    }
}

// =============================================================================
// Aggregates
// =============================================================================

/// Σ total price.
pub fn aggregate_revenue(sales: &[Sale]) -> Money {
    sales.iter().map(Sale::total_price).sum()
}

/// Σ units sold.
pub fn aggregate_items(sales: &[Sale]) -> i64 {
    sales.iter().fold(0i64, |acc, s| acc.saturating_add(s.quantity))
}

/// Revenue attributed to one product.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct ProductRevenue {
    pub product_id: String,
    /// Current product name, or [`UNKNOWN_PRODUCT`].
    pub name: String,
    pub revenue: Money,
    pub units: i64,
}

/// Groups sales by product and ranks them by summed revenue.
///
/// Ties keep first-encounter order. Never returns more than `n` entries and
/// never invents entries for products without sales.
pub fn top_products_by_revenue(sales: &[Sale], products: &[Product], n: usize) -> Vec<ProductRevenue> {
    let names: HashMap<&str, &str> = products
        .iter()
        .map(|p| (p.id.as_str(), p.name.as_str()))
        .collect();

    let mut index: HashMap<&str, usize> = HashMap::new();
    let mut ranked: Vec<ProductRevenue> = Vec::new();

    for sale in sales {
        let slot = *index.entry(sale.product_id.as_str()).or_insert_with(|| {
            ranked.push(ProductRevenue {
                product_id: sale.product_id.clone(),
                name: names
                    .get(sale.product_id.as_str())
                    .copied()
                    .unwrap_or(UNKNOWN_PRODUCT)
                    .to_string(),
                revenue: Money::zero(),
                units: 0,
            });
            ranked.len() - 1
        });
        ranked[slot].revenue += sale.total_price();
        ranked[slot].units = ranked[slot].units.saturating_add(sale.quantity);
    }

    // sort_by is stable, so equal revenues keep encounter order
    ranked.sort_by(|a, b| b.revenue.cmp(&a.revenue));
    ranked.truncate(n);
    ranked
}

/// Revenue minus Σ(current cost × quantity).
///
/// Sales whose product no longer exists contribute no cost.
pub fn total_profit(sales: &[Sale], products: &[Product]) -> Money {
    let costs: HashMap<&str, Money> = products
        .iter()
        .map(|p| (p.id.as_str(), p.cost()))
        .collect();

    let cost: Money = sales
        .iter()
        .filter_map(|s| {
            costs
                .get(s.product_id.as_str())
                .map(|c| c.multiply_quantity(s.quantity))
        })
        .sum();

    aggregate_revenue(sales) - cost
}

/// `profit / revenue * 100`, or `0.0` when there is no revenue.
pub fn profit_margin_overall(profit: Money, revenue: Money) -> f64 {
    percentage_of(profit, revenue).unwrap_or(0.0)
}

// =============================================================================
// Report
// =============================================================================

/// Everything the reports screen shows for one window.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct SalesReport {
    pub window: TimeWindow,
    #[ts(as = "Option<String>")]
    pub window_start: Option<DateTime<Utc>>,
    pub sale_count: usize,
    pub revenue: Money,
    pub items_sold: i64,
    pub profit: Money,
    pub profit_margin: f64,
    pub top_products: Vec<ProductRevenue>,
}

/// Builds the report for `window` relative to `now`.
pub fn build_report<Tz: TimeZone>(
    sales: &[Sale],
    products: &[Product],
    window: TimeWindow,
    now: &DateTime<Tz>,
) -> SalesReport {
    let in_window = filter_by_time_window(sales, window, now);
    let revenue = aggregate_revenue(&in_window);
    let profit = total_profit(&in_window, products);

    SalesReport {
        window,
        window_start: window_start(window, now),
        sale_count: in_window.len(),
        revenue,
        items_sold: aggregate_items(&in_window),
        profit,
        profit_margin: profit_margin_overall(profit, revenue),
        top_products: top_products_by_revenue(&in_window, products, TOP_PRODUCTS),
    }
}

// =============================================================================
// Dashboard
// =============================================================================

/// Headline counters on the dashboard.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct DashboardStats {
    pub total_products: usize,
    pub low_stock_products: usize,
    pub total_sales: usize,
    pub revenue: Money,
}

/// Dashboard payload: counters, the low-stock list and the latest sales.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct Dashboard {
    pub stats: DashboardStats,
    pub low_stock: Vec<Product>,
    pub recent_sales: Vec<Sale>,
}

/// The `n` most recent sales, newest first.
pub fn recent_sales(sales: &[Sale], n: usize) -> Vec<Sale> {
    let mut sorted = sales.to_vec();
    sorted.sort_by(|a, b| b.date.cmp(&a.date));
    sorted.truncate(n);
    sorted
}

/// Builds the dashboard from the full product and sale lists.
pub fn dashboard(products: &[Product], sales: &[Sale]) -> Dashboard {
    let low_stock: Vec<Product> = products.iter().filter(|p| p.is_low_stock()).cloned().collect();

    Dashboard {
        stats: DashboardStats {
            total_products: products.len(),
            low_stock_products: low_stock.len(),
            total_sales: sales.len(),
            revenue: aggregate_revenue(sales),
        },
        low_stock,
        recent_sales: recent_sales(sales, RECENT_SALES),
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::FixedOffset;

    fn at(y: i32, m: u32, d: u32, h: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(y, m, d, h, 0, 0).unwrap()
    }

    fn sale(id: &str, product_id: &str, qty: i64, total: i64, date: DateTime<Utc>) -> Sale {
        Sale {
            id: id.to_string(),
            product_id: product_id.to_string(),
            product_name: format!("{} (at sale)", product_id),
            quantity: qty,
            total_price_cents: total,
            date,
        }
    }

    fn product(id: &str, name: &str, price: i64, cost: i64) -> Product {
        let now = at(2024, 1, 1, 0);
        Product {
            id: id.to_string(),
            name: name.to_string(),
            description: String::new(),
            price_cents: price,
            cost_cents: cost,
            quantity: 10,
            min_quantity: 5,
            category: "Other".to_string(),
            image_url: None,
            created_at: now,
            updated_at: now,
        }
    }

    #[test]
    fn test_window_starts() {
        // Wednesday
        let now = at(2024, 5, 15, 14);
        assert_eq!(window_start(TimeWindow::Today, &now), Some(at(2024, 5, 15, 0)));
        assert_eq!(window_start(TimeWindow::ThisWeek, &now), Some(at(2024, 5, 12, 0)));
        assert_eq!(window_start(TimeWindow::ThisMonth, &now), Some(at(2024, 5, 1, 0)));
        assert_eq!(window_start(TimeWindow::ThisYear, &now), Some(at(2024, 1, 1, 0)));
        assert_eq!(window_start(TimeWindow::AllTime, &now), None);
    }

    #[test]
    fn test_week_starts_on_sunday_itself() {
        let sunday = at(2024, 5, 12, 8);
        assert_eq!(window_start(TimeWindow::ThisWeek, &sunday), Some(at(2024, 5, 12, 0)));
    }

    #[test]
    fn test_window_uses_now_time_zone() {
        // 2024-05-15 01:00 at UTC+3 is 2024-05-14 22:00 UTC
        let tz = FixedOffset::east_opt(3 * 3600).unwrap();
        let now = tz.with_ymd_and_hms(2024, 5, 15, 1, 0, 0).unwrap();
        assert_eq!(window_start(TimeWindow::Today, &now), Some(at(2024, 5, 14, 21)));
    }

    #[test]
    fn test_this_month_keeps_only_recent_sale() {
        let now = at(2024, 5, 15, 14);
        let sales = vec![
            sale("s1", "p1", 1, 5000, at(2024, 5, 3, 10)),
            sale("s2", "p1", 1, 3000, at(2023, 5, 15, 10)),
        ];

        let filtered = filter_by_time_window(&sales, TimeWindow::ThisMonth, &now);
        assert_eq!(filtered.len(), 1);
        assert_eq!(filtered[0].id, "s1");
        assert_eq!(aggregate_revenue(&filtered), Money::from_cents(5000));
    }

    #[test]
    fn test_all_time_is_identity() {
        let now = at(2024, 5, 15, 14);
        let sales = vec![
            sale("s1", "p1", 1, 100, at(2001, 1, 1, 0)),
            sale("s2", "p2", 2, 200, at(2030, 1, 1, 0)),
        ];
        assert_eq!(filter_by_time_window(&sales, TimeWindow::AllTime, &now), sales);
    }

    #[test]
    fn test_windows_are_monotonic() {
        let now = at(2024, 5, 15, 14);
        let sales: Vec<Sale> = [
            at(2024, 5, 15, 9),
            at(2024, 5, 13, 9),
            at(2024, 5, 2, 9),
            at(2024, 2, 2, 9),
            at(2022, 2, 2, 9),
        ]
        .into_iter()
        .enumerate()
        .map(|(i, d)| sale(&format!("s{}", i), "p1", 1, 100, d))
        .collect();

        let sizes: Vec<usize> = TimeWindow::ALL
            .iter()
            .map(|w| filter_by_time_window(&sales, *w, &now).len())
            .collect();
        assert_eq!(sizes, vec![1, 2, 3, 4, 5]);

        for pair in TimeWindow::ALL.windows(2) {
            let narrow = filter_by_time_window(&sales, pair[0], &now);
            let wide = filter_by_time_window(&sales, pair[1], &now);
            assert!(narrow.iter().all(|s| wide.contains(s)));
        }
    }

    #[test]
    fn test_top_products_ranking_and_fallback() {
        let d = at(2024, 5, 1, 0);
        let products = vec![product("p1", "Kettle", 2500, 1000), product("p2", "Mug", 800, 200)];
        let sales = vec![
            sale("s1", "p2", 1, 800, d),
            sale("s2", "p1", 1, 2500, d),
            sale("s3", "gone", 3, 900, d),
            sale("s4", "p2", 2, 1600, d),
        ];

        let top = top_products_by_revenue(&sales, &products, 5);
        let names: Vec<&str> = top.iter().map(|t| t.name.as_str()).collect();
        assert_eq!(names, vec!["Kettle", "Mug", UNKNOWN_PRODUCT]);
        assert_eq!(top[1].revenue, Money::from_cents(2400));
        assert_eq!(top[1].units, 3);

        assert_eq!(top_products_by_revenue(&sales, &products, 1).len(), 1);
        assert!(top_products_by_revenue(&[], &products, 5).is_empty());
    }

    #[test]
    fn test_top_products_ties_keep_encounter_order() {
        let d = at(2024, 5, 1, 0);
        let sales = vec![sale("s1", "b", 1, 500, d), sale("s2", "a", 1, 500, d)];
        let top = top_products_by_revenue(&sales, &[], 5);
        assert_eq!(top[0].product_id, "b");
        assert_eq!(top[1].product_id, "a");
    }

    #[test]
    fn test_profit_uses_current_cost_and_skips_missing_products() {
        let d = at(2024, 5, 1, 0);
        let products = vec![product("p1", "Kettle", 2500, 1000)];
        let sales = vec![sale("s1", "p1", 2, 5000, d), sale("s2", "gone", 1, 700, d)];

        let profit = total_profit(&sales, &products);
        assert_eq!(profit, Money::from_cents(5700 - 2000));
        assert_eq!(profit_margin_overall(Money::zero(), Money::zero()), 0.0);
        assert_eq!(
            profit_margin_overall(Money::from_cents(250), Money::from_cents(1000)),
            25.0
        );
    }

    #[test]
    fn test_build_report() {
        let now = at(2024, 5, 15, 14);
        let products = vec![product("p1", "Kettle", 2500, 1000)];
        let sales = vec![
            sale("s1", "p1", 2, 5000, at(2024, 5, 15, 9)),
            sale("s2", "p1", 1, 2500, at(2024, 4, 1, 9)),
        ];

        let report = build_report(&sales, &products, TimeWindow::Today, &now);
        assert_eq!(report.sale_count, 1);
        assert_eq!(report.revenue, Money::from_cents(5000));
        assert_eq!(report.items_sold, 2);
        assert_eq!(report.profit, Money::from_cents(3000));
        assert_eq!(report.profit_margin, 60.0);
        assert_eq!(report.top_products.len(), 1);
    }

    #[test]
    fn test_dashboard() {
        let mut low = product("p2", "Mug", 800, 200);
        low.quantity = 5;
        let products = vec![product("p1", "Kettle", 2500, 1000), low];
        let sales: Vec<Sale> = (1..=7)
            .map(|day| sale(&format!("s{}", day), "p1", 1, 100, at(2024, 5, day, 9)))
            .collect();

        let board = dashboard(&products, &sales);
        assert_eq!(board.stats.total_products, 2);
        assert_eq!(board.stats.low_stock_products, 1);
        assert_eq!(board.stats.total_sales, 7);
        assert_eq!(board.stats.revenue, Money::from_cents(700));
        assert_eq!(board.low_stock[0].id, "p2");

        let recent: Vec<&str> = board.recent_sales.iter().map(|s| s.id.as_str()).collect();
        assert_eq!(recent, vec!["s7", "s6", "s5", "s4", "s3"]);
    }

    #[test]
    fn test_time_window_parsing() {
        assert_eq!("thisWeek".parse::<TimeWindow>().unwrap(), TimeWindow::ThisWeek);
        assert_eq!("ALLTIME".parse::<TimeWindow>().unwrap(), TimeWindow::AllTime);
        assert!("lastDecade".parse::<TimeWindow>().is_err());
        assert_eq!(TimeWindow::default(), TimeWindow::ThisMonth);
    }
}
