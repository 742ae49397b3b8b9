//! # Domain Types
//!
//! Core domain types used throughout Billdesk.
//!
//! ## Type Hierarchy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Domain Types                                    │
//! │                                                                         │
//! │  ┌─────────────────┐   ┌─────────────────┐   ┌─────────────────┐       │
//! │  │      Item       │   │    LineItem     │   │    Document     │       │
//! │  │  ─────────────  │   │  ─────────────  │   │  ─────────────  │       │
//! │  │  id (i64)       │──►│  item_id        │──►│  id (i64)       │       │
//! │  │  name (unique)  │   │  name snapshot  │   │  kind           │       │
//! │  │  gst_rate_bps   │   │  price snapshot │   │  customer_*     │       │
//! │  │  mrp / discount │   │  quantity       │   │  lines (JSON)   │       │
//! │  │  price_paise    │   │  discount/unit  │   │  totals         │       │
//! │  └─────────────────┘   └─────────────────┘   └─────────────────┘       │
//! │                                                                         │
//! │  ┌─────────────────┐   ┌─────────────────┐                             │
//! │  │    TaxRate      │   │  DocumentKind   │                             │
//! │  │  bps (u32)      │   │  Invoice        │                             │
//! │  │  1800 = 18%     │   │  Quotation      │                             │
//! │  └─────────────────┘   └─────────────────┘                             │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Snapshot Pattern
//! Line items copy the item's name, price and GST rate at the time of sale.
//! Editing or deleting the catalog item never changes an existing document.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use ts_rs::TS;

use crate::customer::normalize_mobile;
use crate::money::Money;
use crate::tax::{self, DocumentTotals, LineTotals};

// =============================================================================
// Tax Rate
// =============================================================================

/// GST rate represented in basis points (bps).
///
/// 1 basis point = 0.01%, so 1800 bps = 18% and 250 bps = 2.5%.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct TaxRate(u32);

impl TaxRate {
    #[inline]
    pub const fn from_bps(bps: u32) -> Self {
        TaxRate(bps)
    }

    #[inline]
    pub const fn bps(&self) -> u32 {
        self.0
    }

    /// Returns the rate as a percentage (for display only).
    #[inline]
    pub fn percentage(&self) -> f64 {
        self.0 as f64 / 100.0
    }

    #[inline]
    pub const fn zero() -> Self {
        TaxRate(0)
    }

    #[inline]
    pub const fn is_zero(&self) -> bool {
        self.0 == 0
    }
}

impl Default for TaxRate {
    fn default() -> Self {
        TaxRate::zero()
    }
}

// =============================================================================
// Document Kind
// =============================================================================

/// Invoices and quotations share one shape but live in separate tables.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "snake_case")]
pub enum DocumentKind {
    Invoice,
    Quotation,
}

impl DocumentKind {
    pub const fn as_str(&self) -> &'static str {
        match self {
            DocumentKind::Invoice => "invoice",
            DocumentKind::Quotation => "quotation",
        }
    }
}

impl fmt::Display for DocumentKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DocumentKind::Invoice => write!(f, "Invoice"),
            DocumentKind::Quotation => write!(f, "Quotation"),
        }
    }
}

// =============================================================================
// Item
// =============================================================================

/// A catalog entry available for billing.
///
/// `price_paise` is the GST-inclusive selling price. When `mrp_paise` is
/// present the price was derived as `mrp × (1 − discount/100)`; legacy items
/// carry a price with no MRP.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct Item {
    pub id: i64,

    /// Display name, unique case-insensitively.
    pub name: String,

    /// GST rate in basis points (1800 = 18%).
    pub gst_rate_bps: u32,

    /// Maximum retail price in paise.
    pub mrp_paise: Option<i64>,

    /// Discount off MRP in basis points.
    pub discount_bps: Option<u32>,

    /// Inclusive selling price in paise.
    pub price_paise: i64,

    #[ts(as = "String")]
    pub created_at: DateTime<Utc>,
}

impl Item {
    #[inline]
    pub fn price(&self) -> Money {
        Money::from_paise(self.price_paise)
    }

    #[inline]
    pub fn gst_rate(&self) -> TaxRate {
        TaxRate::from_bps(self.gst_rate_bps)
    }

    /// Returns MRP, falling back to the price for legacy items.
    pub fn mrp_or_price(&self) -> Money {
        Money::from_paise(self.mrp_paise.unwrap_or(self.price_paise))
    }

    /// Discount percentage in basis points, 0 when unset.
    #[inline]
    pub fn discount_or_zero(&self) -> u32 {
        self.discount_bps.unwrap_or(0)
    }
}

/// Catalog create/update payload.
///
/// Either `mrp_paise` (price derived from MRP and discount) or a legacy
/// `price_paise` must be supplied. See
/// [`validate_item_input`](crate::validation::validate_item_input).
#[derive(Debug, Clone, Default, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct ItemInput {
    pub name: String,
    pub gst_rate_bps: u32,
    #[serde(default)]
    pub mrp_paise: Option<i64>,
    #[serde(default)]
    pub discount_bps: Option<u32>,
    #[serde(default)]
    pub price_paise: Option<i64>,
}

// =============================================================================
// Line Item
// =============================================================================

/// One catalog item entry embedded in a document.
///
/// Stored as part of the document's JSON `items` column, never as a row of
/// its own.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct LineItem {
    /// Catalog item id at time of sale.
    pub item_id: i64,

    /// Item name at time of sale (frozen).
    pub name: String,

    /// Inclusive unit price in paise at time of sale (frozen).
    pub price_paise: i64,

    /// GST rate at time of sale (frozen).
    pub gst_rate_bps: u32,

    pub quantity: i64,

    /// Per-unit discount override in paise.
    #[serde(default)]
    pub discount_per_unit_paise: Option<i64>,

    /// MRP snapshot for display.
    #[serde(default)]
    pub mrp_paise: Option<i64>,

    /// Catalog discount percentage snapshot for display.
    #[serde(default)]
    pub discount_bps: Option<u32>,
}

impl LineItem {
    /// Snapshots a catalog item into a line.
    pub fn from_item(item: &Item, quantity: i64) -> Self {
        LineItem {
            item_id: item.id,
            name: item.name.clone(),
            price_paise: item.price_paise,
            gst_rate_bps: item.gst_rate_bps,
            quantity,
            discount_per_unit_paise: None,
            mrp_paise: Some(item.mrp_or_price().paise()),
            discount_bps: item.discount_bps,
        }
    }

    #[inline]
    pub fn price(&self) -> Money {
        Money::from_paise(self.price_paise)
    }

    #[inline]
    pub fn gst_rate(&self) -> TaxRate {
        TaxRate::from_bps(self.gst_rate_bps)
    }

    /// Per-unit discount, zero when unset.
    #[inline]
    pub fn discount_per_unit(&self) -> Money {
        Money::from_paise(self.discount_per_unit_paise.unwrap_or(0))
    }

    /// `max(price − discount_per_unit, 0)`.
    pub fn effective_unit_price(&self) -> Money {
        (self.price() - self.discount_per_unit()).floor_zero()
    }

    /// Base / GST / inclusive amounts for this line.
    pub fn totals(&self) -> LineTotals {
        tax::aggregate_line(self)
    }
}

// =============================================================================
// Document
// =============================================================================

/// A persisted invoice or quotation.
///
/// Totals are stored as computed at creation and never edited afterwards.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct Document {
    pub id: i64,
    pub kind: DocumentKind,
    pub customer_name: String,
    /// Mobile as typed by the cashier (free-form).
    pub customer_mobile: String,
    /// Customer GSTIN.
    pub customer_tax_id: Option<String>,
    pub customer_address: Option<String>,
    pub lines: Vec<LineItem>,
    pub subtotal_paise: i64,
    pub cgst_paise: i64,
    pub sgst_paise: i64,
    pub discount_paise: i64,
    pub total_paise: i64,
    #[ts(as = "String")]
    pub created_at: DateTime<Utc>,
}

impl Document {
    /// Returns the stored totals.
    pub fn totals(&self) -> DocumentTotals {
        DocumentTotals {
            subtotal: Money::from_paise(self.subtotal_paise),
            cgst: Money::from_paise(self.cgst_paise),
            sgst: Money::from_paise(self.sgst_paise),
            discount: Money::from_paise(self.discount_paise),
            total: Money::from_paise(self.total_paise),
        }
    }

    /// Recomputes totals from the embedded lines and discount.
    ///
    /// Renderers must print these (or the stored totals, which are equal),
    /// never a figure of their own.
    pub fn recompute_totals(&self) -> DocumentTotals {
        tax::aggregate_document(&self.lines, Money::from_paise(self.discount_paise))
    }

    /// Normalized 10-digit customer key, if the stored mobile has one.
    pub fn mobile_key(&self) -> Option<String> {
        normalize_mobile(&self.customer_mobile)
    }

    #[inline]
    pub fn total(&self) -> Money {
        Money::from_paise(self.total_paise)
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn bedsheet() -> Item {
        Item {
            id: 3,
            name: "Cotton Bedsheet Set".to_string(),
            gst_rate_bps: 1800,
            mrp_paise: Some(100_000),
            discount_bps: Some(2000),
            price_paise: 80_000,
            created_at: Utc::now(),
        }
    }

    #[test]
    fn test_tax_rate_percentage() {
        assert_eq!(TaxRate::from_bps(250).percentage(), 2.5);
        assert!((TaxRate::from_bps(1200).percentage() - 12.0).abs() < 0.001);
    }

    #[test]
    fn test_line_snapshots_item() {
        let item = bedsheet();
        let line = LineItem::from_item(&item, 2);

        assert_eq!(line.item_id, 3);
        assert_eq!(line.name, "Cotton Bedsheet Set");
        assert_eq!(line.price_paise, 80_000);
        assert_eq!(line.mrp_paise, Some(100_000));
        assert_eq!(line.discount_bps, Some(2000));
        assert_eq!(line.discount_per_unit_paise, None);
    }

    #[test]
    fn test_effective_unit_price_never_negative() {
        let mut line = LineItem::from_item(&bedsheet(), 1);
        line.discount_per_unit_paise = Some(5_000);
        assert_eq!(line.effective_unit_price().paise(), 75_000);

        line.discount_per_unit_paise = Some(90_000);
        assert_eq!(line.effective_unit_price(), Money::zero());
    }

    #[test]
    fn test_legacy_item_mrp_falls_back_to_price() {
        let mut item = bedsheet();
        item.mrp_paise = None;
        item.discount_bps = None;
        assert_eq!(item.mrp_or_price().paise(), 80_000);
        assert_eq!(item.discount_or_zero(), 0);
    }

    #[test]
    fn test_line_item_json_uses_camel_case() {
        let line = LineItem::from_item(&bedsheet(), 2);
        let json = serde_json::to_value(&line).unwrap();
        assert_eq!(json["itemId"], 3);
        assert_eq!(json["pricePaise"], 80_000);

        // Older rows may lack the optional snapshot fields entirely.
        let legacy: LineItem = serde_json::from_str(
            r#"{"itemId":1,"name":"Bath Mat","pricePaise":75000,"gstRateBps":1200,"quantity":1}"#,
        )
        .unwrap();
        assert_eq!(legacy.discount_per_unit_paise, None);
        assert_eq!(legacy.mrp_paise, None);
    }

    #[test]
    fn test_document_kind_display() {
        assert_eq!(DocumentKind::Invoice.to_string(), "Invoice");
        assert_eq!(DocumentKind::Quotation.as_str(), "quotation");
    }
}
