//! # Reporting Aggregator
//!
//! Dashboard figures computed by scanning invoices. Quotations never count
//! as sales.
//!
//! ## Windows
//! ```text
//! now = 2026-03-14
//!
//! monthly_total ........ [2026-03-01, 2026-04-01)
//! monthly_sales(12) .... 2025-04 ... 2026-03   (calendar months, UTC)
//! yearly_sales(3) ...... 2024, 2025, 2026
//! ```
//!
//! Only periods with at least one invoice are returned, oldest first.
//! All functions are read-only and hold no state between calls.

use chrono::{DateTime, Datelike, Months, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap};
use ts_rs::TS;

use crate::money::Money;
use crate::types::{Document, DocumentKind};

/// Months shown in the dashboard sales chart.
pub const DASHBOARD_MONTHS: u32 = 12;
/// Years shown in the dashboard yearly chart.
pub const DASHBOARD_YEARS: u32 = 5;
/// Items shown in the dashboard top sellers list.
pub const DASHBOARD_TOP_ITEMS: usize = 5;

/// Sales for one calendar month.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct MonthlySales {
    /// `YYYY-MM`
    pub month: String,
    /// `Mar 2026`
    pub month_label: String,
    pub total_paise: i64,
}

/// Sales for one calendar year.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct YearlySales {
    pub year: i32,
    pub total_paise: i64,
}

/// A best-selling item, merged by name.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct TopItem {
    pub name: String,
    pub total_quantity: i64,
    pub total_revenue_paise: i64,
}

/// Everything the dashboard shows at once.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct DashboardSummary {
    pub monthly_total_paise: i64,
    pub monthly_sales: Vec<MonthlySales>,
    pub yearly_sales: Vec<YearlySales>,
    pub top_items: Vec<TopItem>,
}

impl DashboardSummary {
    pub fn build(invoices: &[Document], now: DateTime<Utc>) -> Self {
        DashboardSummary {
            monthly_total_paise: monthly_total(invoices, now).paise(),
            monthly_sales: monthly_sales(invoices, DASHBOARD_MONTHS, now),
            yearly_sales: yearly_sales(invoices, DASHBOARD_YEARS, now),
            top_items: top_items(invoices, DASHBOARD_TOP_ITEMS),
        }
    }
}

// =============================================================================
// Aggregations
// =============================================================================

/// Months since year 0, so consecutive months differ by one.
fn month_index(ts: &DateTime<Utc>) -> i64 {
    ts.year() as i64 * 12 + ts.month0() as i64
}

/// `[first instant of the month, first instant of the next month)` for `now`.
///
/// Lets a store fetch only the invoices [`monthly_total`] will count.
pub fn month_bounds(now: DateTime<Utc>) -> Option<(DateTime<Utc>, DateTime<Utc>)> {
    let first = now.date_naive().with_day(1)?;
    let next = first.checked_add_months(Months::new(1))?;
    Some((
        first.and_hms_opt(0, 0, 0)?.and_utc(),
        next.and_hms_opt(0, 0, 0)?.and_utc(),
    ))
}

fn invoices_only(docs: &[Document]) -> impl Iterator<Item = &Document> {
    docs.iter().filter(|d| d.kind == DocumentKind::Invoice)
}

/// Sum of invoice totals in the calendar month containing `now`.
pub fn monthly_total(invoices: &[Document], now: DateTime<Utc>) -> Money {
    let current = month_index(&now);
    invoices_only(invoices)
        .filter(|d| month_index(&d.created_at) == current)
        .map(Document::total)
        .sum()
}

/// Invoice totals per month over the `months` calendar months ending with
/// the month of `now`.
pub fn monthly_sales(invoices: &[Document], months: u32, now: DateTime<Utc>) -> Vec<MonthlySales> {
    if months == 0 {
        return Vec::new();
    }

    let end = month_index(&now);
    let start = end - (months as i64 - 1);

    let mut buckets: BTreeMap<i64, Money> = BTreeMap::new();
    for doc in invoices_only(invoices) {
        let idx = month_index(&doc.created_at);
        if (start..=end).contains(&idx) {
            *buckets.entry(idx).or_default() += doc.total();
        }
    }

    buckets
        .into_iter()
        .filter_map(|(idx, total)| {
            let year = idx.div_euclid(12) as i32;
            let month = idx.rem_euclid(12) as u32 + 1;
            let first = NaiveDate::from_ymd_opt(year, month, 1)?;
            Some(MonthlySales {
                month: first.format("%Y-%m").to_string(),
                month_label: first.format("%b %Y").to_string(),
                total_paise: total.paise(),
            })
        })
        .collect()
}

/// Invoice totals per year over the `years` calendar years ending with the
/// year of `now`.
pub fn yearly_sales(invoices: &[Document], years: u32, now: DateTime<Utc>) -> Vec<YearlySales> {
    if years == 0 {
        return Vec::new();
    }

    let end = now.year();
    let span = i32::try_from(years - 1).unwrap_or(i32::MAX);
    let start = end.saturating_sub(span);

    let mut buckets: BTreeMap<i32, Money> = BTreeMap::new();
    for doc in invoices_only(invoices) {
        let year = doc.created_at.year();
        if (start..=end).contains(&year) {
            *buckets.entry(year).or_default() += doc.total();
        }
    }

    buckets
        .into_iter()
        .map(|(year, total)| YearlySales {
            year,
            total_paise: total.paise(),
        })
        .collect()
}

/// Best sellers by quantity across all invoices.
///
/// Lines merge by item name, so a renamed item shows up twice and two items
/// sharing a name merge. Revenue is each line's inclusive total after the
/// per-unit discount.
pub fn top_items(invoices: &[Document], limit: usize) -> Vec<TopItem> {
    let mut by_name: HashMap<&str, (i64, Money)> = HashMap::new();

    for doc in invoices_only(invoices) {
        for line in &doc.lines {
            let entry = by_name.entry(line.name.as_str()).or_default();
            entry.0 += line.quantity;
            entry.1 += line.totals().inclusive_total;
        }
    }

    let mut items: Vec<TopItem> = by_name
        .into_iter()
        .map(|(name, (quantity, revenue))| TopItem {
            name: name.to_string(),
            total_quantity: quantity,
            total_revenue_paise: revenue.paise(),
        })
        .collect();

    items.sort_by(|a, b| {
        b.total_quantity
            .cmp(&a.total_quantity)
            .then_with(|| a.name.cmp(&b.name))
    });
    items.truncate(limit);
    items
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::LineItem;
    use chrono::TimeZone;

    fn at(y: i32, m: u32, d: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(y, m, d, 12, 0, 0).unwrap()
    }

    fn line(name: &str, price: i64, qty: i64, discount: Option<i64>) -> LineItem {
        LineItem {
            item_id: 1,
            name: name.to_string(),
            price_paise: price,
            gst_rate_bps: 1200,
            quantity: qty,
            discount_per_unit_paise: discount,
            mrp_paise: None,
            discount_bps: None,
        }
    }

    fn invoice(total: i64, created_at: DateTime<Utc>, lines: Vec<LineItem>) -> Document {
        Document {
            id: 1,
            kind: DocumentKind::Invoice,
            customer_name: "Alice".to_string(),
            customer_mobile: "9876543210".to_string(),
            customer_tax_id: None,
            customer_address: None,
            lines,
            subtotal_paise: 0,
            cgst_paise: 0,
            sgst_paise: 0,
            discount_paise: 0,
            total_paise: total,
            created_at,
        }
    }

    #[test]
    fn test_monthly_total_current_month_only() {
        let now = at(2026, 3, 14);
        let docs = vec![
            invoice(10_000, at(2026, 3, 1), vec![]),
            invoice(5_000, at(2026, 3, 31), vec![]),
            invoice(7_000, at(2026, 2, 28), vec![]),
            invoice(9_000, at(2025, 3, 10), vec![]),
        ];
        assert_eq!(monthly_total(&docs, now).paise(), 15_000);
    }

    #[test]
    fn test_month_bounds() {
        let (from, to) = month_bounds(at(2026, 12, 14)).unwrap();
        assert_eq!(from.to_rfc3339(), "2026-12-01T00:00:00+00:00");
        assert_eq!(to.to_rfc3339(), "2027-01-01T00:00:00+00:00");
    }

    #[test]
    fn test_quotations_are_not_sales() {
        let mut quote = invoice(10_000, at(2026, 3, 2), vec![line("Towel", 10_000, 1, None)]);
        quote.kind = DocumentKind::Quotation;
        let docs = vec![quote];

        let now = at(2026, 3, 14);
        assert_eq!(monthly_total(&docs, now), Money::zero());
        assert!(top_items(&docs, 5).is_empty());
    }

    #[test]
    fn test_monthly_sales_window_crosses_year() {
        let now = at(2026, 2, 10);
        let docs = vec![
            invoice(1_000, at(2025, 2, 28), vec![]), // outside 12-month window
            invoice(2_000, at(2025, 3, 1), vec![]),
            invoice(3_000, at(2025, 12, 5), vec![]),
            invoice(4_000, at(2026, 1, 5), vec![]),
            invoice(500, at(2026, 1, 20), vec![]),
            invoice(6_000, at(2026, 2, 1), vec![]),
        ];

        let series = monthly_sales(&docs, 12, now);
        let months: Vec<&str> = series.iter().map(|m| m.month.as_str()).collect();
        assert_eq!(months, vec!["2025-03", "2025-12", "2026-01", "2026-02"]);
        assert_eq!(series[0].month_label, "Mar 2025");
        assert_eq!(series[2].total_paise, 4_500);

        assert!(monthly_sales(&docs, 0, now).is_empty());
        assert_eq!(monthly_sales(&docs, 1, now).len(), 1);
    }

    #[test]
    fn test_yearly_sales() {
        let now = at(2026, 6, 1);
        let docs = vec![
            invoice(1_000, at(2022, 1, 1), vec![]),
            invoice(2_000, at(2024, 5, 1), vec![]),
            invoice(3_000, at(2026, 1, 1), vec![]),
            invoice(4_000, at(2026, 5, 1), vec![]),
        ];
        let series = yearly_sales(&docs, 3, now);
        assert_eq!(
            series,
            vec![
                YearlySales { year: 2024, total_paise: 2_000 },
                YearlySales { year: 2026, total_paise: 7_000 },
            ]
        );
    }

    #[test]
    fn test_unbounded_windows_cover_all_history() {
        let now = at(2026, 6, 1);
        let docs = vec![
            invoice(1_000, at(1999, 1, 1), vec![]),
            invoice(2_000, at(2026, 5, 1), vec![]),
        ];

        let years = yearly_sales(&docs, u32::MAX, now);
        assert_eq!(years.len(), 2);
        assert_eq!(years[0].year, 1999);

        assert_eq!(monthly_sales(&docs, u32::MAX, now).len(), 2);
    }

    #[test]
    fn test_top_items_merge_by_name_and_use_discounted_revenue() {
        let now = at(2026, 3, 1);
        let docs = vec![
            invoice(0, now, vec![line("Bath Towel Set", 150_000, 2, Some(10_000)), line("Bed Runner", 85_000, 1, None)]),
            invoice(0, now, vec![line("Bath Towel Set", 150_000, 1, None), line("Quilt", 210_000, 3, None)]),
            invoice(0, now, vec![line("Bed Runner", 85_000, 2, None)]),
        ];

        let top = top_items(&docs, 2);
        assert_eq!(top.len(), 2);
        // Three-way tie on quantity 3, ordered by name
        assert_eq!(top[0].name, "Bath Towel Set");
        assert_eq!(top[0].total_quantity, 3);
        assert_eq!(top[0].total_revenue_paise, 280_000 + 150_000);
        assert_eq!(top[1].name, "Bed Runner");
        assert_eq!(top[1].total_revenue_paise, 255_000);
    }

    #[test]
    fn test_dashboard_summary() {
        let now = at(2026, 3, 14);
        let docs = vec![invoice(12_000, at(2026, 3, 2), vec![line("Quilt", 12_000, 1, None)])];
        let summary = DashboardSummary::build(&docs, now);

        assert_eq!(summary.monthly_total_paise, 12_000);
        assert_eq!(summary.monthly_sales.len(), 1);
        assert_eq!(summary.yearly_sales[0].year, 2026);
        assert_eq!(summary.top_items[0].name, "Quilt");
    }
}
