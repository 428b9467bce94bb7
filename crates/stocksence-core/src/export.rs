//! # CSV Export
//!
//! Renders a sale list as the downloadable sales report.
//!
//! ```text
//! Product,Quantity,Total Price,Date
//! "Green Tea",2,17.98,2024-05-01 09:15:00
//! "12"" Ruler",1,3.50,2024-05-01 10:02:41
//! ```

use chrono::{NaiveDate, TimeZone};
use std::fmt::{Display, Write};

use crate::types::Sale;

pub const CSV_HEADER: &str = "Product,Quantity,Total Price,Date";

const DATE_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// Renders `sales` as CSV, dates shown in `tz`.
///
/// Returns `None` for an empty list; there is nothing to export.
pub fn sales_csv<Tz>(sales: &[Sale], tz: &Tz) -> Option<String>
where
    Tz: TimeZone,
    Tz::Offset: Display,
{
    if sales.is_empty() {
        return None;
    }

    let mut out = String::with_capacity(CSV_HEADER.len() + sales.len() * 48);
    out.push_str(CSV_HEADER);
    out.push('\n');

    for sale in sales {
        // Writing to a String cannot fail
        let _ = writeln!(
            out,
            "{},{},{},{}",
            quote(&sale.product_name),
            sale.quantity,
            sale.total_price().to_decimal_string(),
            sale.date.with_timezone(tz).format(DATE_FORMAT)
        );
    }

    Some(out)
}

/// `sales_report_<YYYY-MM-DD>.csv`
pub fn report_file_name(today: NaiveDate) -> String {
    format!("sales_report_{}.csv", today.format("%Y-%m-%d"))
}

fn quote(field: &str) -> String {
    format!("\"{}\"", field.replace('"', "\"\""))
}
