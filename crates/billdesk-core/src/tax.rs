//! # Tax Engine
//!
//! The single implementation of inclusive-GST arithmetic. The billing and
//! quotation screens, stored documents, renderers and reports all call these
//! functions; nothing else computes a line or document total.
//!
//! ## Inclusive Convention
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  GST is a percentage of the INCLUSIVE price:                            │
//! │                                                                         │
//! │    ₹1000.00 at 18%  →  base ₹820.00 + GST ₹180.00                      │
//! │                                                                         │
//! │  (not ₹847.46 + ₹152.54 as a base-price convention would give)          │
//! │                                                                         │
//! │  Per line:                                                              │
//! │    effective  = max(price − discount_per_unit, 0)                       │
//! │    inclusive  = effective × qty                                         │
//! │    base       = round(inclusive × (100 − rate) / 100)   ← one rounding  │
//! │    gst        = inclusive − base                        ← exact         │
//! │                                                                         │
//! │  Per document:                                                          │
//! │    subtotal   = Σ base                                                  │
//! │    cgst       = round(Σ gst / 2),  sgst = Σ gst − cgst                  │
//! │    total      = max(0, Σ inclusive − discount)                          │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::money::{Money, BPS_SCALE};
use crate::types::{LineItem, TaxRate};

/// Amounts for one line.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct LineTotals {
    pub base_total: Money,
    pub gst_amount: Money,
    pub inclusive_total: Money,
}

/// Aggregated document amounts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct DocumentTotals {
    pub subtotal: Money,
    pub cgst: Money,
    pub sgst: Money,
    pub discount: Money,
    pub total: Money,
}

impl DocumentTotals {
    /// CGST + SGST, equal to the summed line GST.
    pub fn total_gst(&self) -> Money {
        self.cgst + self.sgst
    }
}

/// Removes the GST share from an inclusive amount.
///
/// `price × (100 − rate) / 100`, rounded half up to the paisa.
///
/// ## Example
/// ```rust
/// use billdesk_core::money::Money;
/// use billdesk_core::tax::split_inclusive;
/// use billdesk_core::types::TaxRate;
///
/// let base = split_inclusive(Money::from_paise(100_000), TaxRate::from_bps(1800));
/// assert_eq!(base.paise(), 82_000);
/// ```
pub fn split_inclusive(unit_price_inclusive: Money, rate: TaxRate) -> Money {
    let keep_bps = (BPS_SCALE as u32).saturating_sub(rate.bps());
    unit_price_inclusive.scale_bps(keep_bps)
}

/// GST contained in an inclusive amount. Always `price − split_inclusive`.
pub fn gst_amount(unit_price_inclusive: Money, rate: TaxRate) -> Money {
    unit_price_inclusive - split_inclusive(unit_price_inclusive, rate)
}

/// Computes base, GST and inclusive totals for a line.
pub fn aggregate_line(line: &LineItem) -> LineTotals {
    let inclusive_total = line.effective_unit_price().multiply_quantity(line.quantity);
    let base_total = split_inclusive(inclusive_total, line.gst_rate());

    LineTotals {
        base_total,
        gst_amount: inclusive_total - base_total,
        inclusive_total,
    }
}

/// Aggregates lines into document totals after the document-level discount.
///
/// An empty line list yields all-zero totals apart from the echoed discount.
pub fn aggregate_document(lines: &[LineItem], discount: Money) -> DocumentTotals {
    let mut subtotal = Money::zero();
    let mut total_gst = Money::zero();
    let mut total_inclusive = Money::zero();

    for line in lines {
        let t = aggregate_line(line);
        subtotal += t.base_total;
        total_gst += t.gst_amount;
        total_inclusive += t.inclusive_total;
    }

    // An odd paisa goes to CGST so the halves always sum to the line GST
    let cgst = total_gst.half();

    DocumentTotals {
        subtotal,
        cgst,
        sgst: total_gst - cgst,
        discount,
        total: (total_inclusive - discount).floor_zero(),
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
