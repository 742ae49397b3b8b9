//! # Document Submission
//!
//! Turns an untrusted submission into a document ready for insert.
//!
//! ## Trust Boundary
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  Billing screen                    prepare_document                    │
//! │  ──────────────                    ────────────────                    │
//! │  lines + discount  ──────────────► validate every field                │
//! │  claimed totals?   ──────────────► recompute with tax::aggregate       │
//! │                                    compare within tolerance            │
//! │                                    normalize mobile once               │
//! │                                          │                             │
//! │                                          ▼                             │
//! │                                    PreparedDocument                    │
//! │                                    (recomputed totals only)            │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Drafts clamp bad discounts with a warning. Submissions are never clamped:
//! anything out of range is rejected.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::customer::normalize_mobile;
use crate::error::ValidationError;
use crate::money::Money;
use crate::tax::{aggregate_document, DocumentTotals};
use crate::types::{Document, DocumentKind, LineItem};
use crate::validation::{
    optional_text, require_text, validate_amount_paise, validate_quantity,
    validate_tax_rate_bps, ValidationResult,
};
use crate::MAX_DRAFT_LINES;

/// An invoice or quotation as submitted by the billing screen.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct NewDocument {
    pub kind: DocumentKind,
    pub customer_name: String,
    pub customer_mobile: String,
    #[serde(default)]
    pub customer_tax_id: Option<String>,
    #[serde(default)]
    pub customer_address: Option<String>,
    pub lines: Vec<LineItem>,
    #[serde(default)]
    pub discount_paise: i64,
    /// Totals the client computed, checked against the server figures.
    #[serde(default)]
    pub claimed_totals: Option<DocumentTotals>,
}

/// A validated submission with server-computed totals.
#[derive(Debug, Clone, PartialEq)]
pub struct PreparedDocument {
    pub kind: DocumentKind,
    pub customer_name: String,
    pub customer_mobile: String,
    /// `None` when the mobile does not normalize to ten digits.
    pub mobile_key: Option<String>,
    pub customer_tax_id: Option<String>,
    pub customer_address: Option<String>,
    pub lines: Vec<LineItem>,
    pub totals: DocumentTotals,
}

impl PreparedDocument {
    /// Builds the stored record once the database has assigned id and
    /// timestamp.
    pub fn into_document(self, id: i64, created_at: DateTime<Utc>) -> Document {
        Document {
            id,
            kind: self.kind,
            customer_name: self.customer_name,
            customer_mobile: self.customer_mobile,
            customer_tax_id: self.customer_tax_id,
            customer_address: self.customer_address,
            lines: self.lines,
            subtotal_paise: self.totals.subtotal.paise(),
            cgst_paise: self.totals.cgst.paise(),
            sgst_paise: self.totals.sgst.paise(),
            discount_paise: self.totals.discount.paise(),
            total_paise: self.totals.total.paise(),
            created_at,
        }
    }
}

/// Validates a submission and recomputes its totals.
///
/// ## Errors
/// - `Required` for a blank customer name or mobile
/// - `EmptyLines` when no lines were sent
/// - `OutOfRange` for more than [`MAX_DRAFT_LINES`] lines, or an amount
///   above [`crate::MAX_AMOUNT_PAISE`]
/// - `DiscountTooLarge` for a per-unit discount not below the unit price
/// - `TotalsMismatch` when `claimed_totals` differ by more than `tolerance_paise`
///
/// ## Example
/// ```rust
/// use billdesk_core::document::{prepare_document, NewDocument};
/// use billdesk_core::types::{DocumentKind, LineItem};
///
/// let doc = NewDocument {
///     kind: DocumentKind::Invoice,
///     customer_name: " Alice ".to_string(),
///     customer_mobile: "+91 98765-43210".to_string(),
///     customer_tax_id: None,
///     customer_address: None,
///     lines: vec![LineItem {
///         item_id: 1,
///         name: "Cotton Bedsheet Set".to_string(),
///         price_paise: 80_000,
///         gst_rate_bps: 1800,
///         quantity: 2,
///         discount_per_unit_paise: None,
///         mrp_paise: Some(100_000),
///         discount_bps: Some(2000),
///     }],
///     discount_paise: 0,
///     claimed_totals: None,
/// };
///
/// let prepared = prepare_document(&doc, 1).unwrap();
/// assert_eq!(prepared.customer_name, "Alice");
/// assert_eq!(prepared.mobile_key.as_deref(), Some("9876543210"));
/// assert_eq!(prepared.totals.cgst.paise(), 14_400);
/// ```
pub fn prepare_document(doc: &NewDocument, tolerance_paise: i64) -> ValidationResult<PreparedDocument> {
    let customer_name = require_text("customer_name", &doc.customer_name)?;
    let customer_mobile = require_text("customer_mobile", &doc.customer_mobile)?;

    if doc.lines.is_empty() {
        return Err(ValidationError::EmptyLines);
    }
    if doc.lines.len() > MAX_DRAFT_LINES {
        return Err(ValidationError::OutOfRange {
            field: "lines".to_string(),
            min: 1,
            max: MAX_DRAFT_LINES as i64,
        });
    }

    let mut lines = Vec::with_capacity(doc.lines.len());
    for (idx, line) in doc.lines.iter().enumerate() {
        lines.push(validate_line(idx, line)?);
    }

    validate_amount_paise("discount", doc.discount_paise)?;

    let totals = aggregate_document(&lines, Money::from_paise(doc.discount_paise));

    if let Some(claimed) = &doc.claimed_totals {
        check_claimed_totals(claimed, &totals, tolerance_paise)?;
    }

    Ok(PreparedDocument {
        kind: doc.kind,
        mobile_key: normalize_mobile(&customer_mobile),
        customer_name,
        customer_mobile,
        customer_tax_id: optional_text(doc.customer_tax_id.as_deref()),
        customer_address: optional_text(doc.customer_address.as_deref()),
        lines,
        totals,
    })
}

fn validate_line(idx: usize, line: &LineItem) -> ValidationResult<LineItem> {
    let name = require_text("line name", &line.name)?;
    validate_quantity(line.quantity)?;
    validate_amount_paise("price", line.price_paise)?;
    validate_tax_rate_bps(line.gst_rate_bps)?;

    let discount = match line.discount_per_unit_paise {
        Some(d) if d < 0 => {
            return Err(ValidationError::OutOfRange {
                field: "discount_per_unit".to_string(),
                min: 0,
                max: line.price_paise,
            })
        }
        Some(0) | None => None,
        Some(d) if d >= line.price_paise => {
            return Err(ValidationError::DiscountTooLarge {
                line: idx,
                discount_paise: d,
                price_paise: line.price_paise,
            })
        }
        Some(d) => Some(d),
    };

    Ok(LineItem {
        name,
        discount_per_unit_paise: discount,
        ..line.clone()
    })
}

fn check_claimed_totals(
    claimed: &DocumentTotals,
    computed: &DocumentTotals,
    tolerance_paise: i64,
) -> ValidationResult<()> {
    let pairs = [
        ("subtotal", claimed.subtotal, computed.subtotal),
        ("cgst", claimed.cgst, computed.cgst),
        ("sgst", claimed.sgst, computed.sgst),
        ("total", claimed.total, computed.total),
    ];

    for (field, claimed, computed) in pairs {
        if (claimed - computed).abs().paise() > tolerance_paise {
            return Err(ValidationError::TotalsMismatch {
                field: field.to_string(),
                claimed_paise: claimed.paise(),
                computed_paise: computed.paise(),
            });
        }
    }

    Ok(())
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn line(price: i64, qty: i64, discount: Option<i64>) -> LineItem {
        LineItem {
            item_id: 1,
            name: "Cotton Bedsheet Set".to_string(),
            price_paise: price,
            gst_rate_bps: 1800,
            quantity: qty,
            discount_per_unit_paise: discount,
            mrp_paise: None,
            discount_bps: None,
        }
    }

    fn submission(lines: Vec<LineItem>) -> NewDocument {
        NewDocument {
            kind: DocumentKind::Invoice,
            customer_name: "Alice".to_string(),
            customer_mobile: "9876543210".to_string(),
            customer_tax_id: Some("   ".to_string()),
            customer_address: Some(" 12 MG Road ".to_string()),
            lines,
            discount_paise: 0,
            claimed_totals: None,
        }
    }

    #[test]
    fn test_empty_lines_rejected() {
        let doc = submission(vec![]);
        assert_eq!(prepare_document(&doc, 1), Err(ValidationError::EmptyLines));
    }

    #[test]
    fn test_empty_mobile_rejected_even_with_lines() {
        let mut doc = submission(vec![line(80_000, 2, None)]);
        doc.customer_mobile = "".to_string();
        assert_eq!(
            prepare_document(&doc, 1),
            Err(ValidationError::required("customer_mobile"))
        );

        doc.customer_mobile = "9876543210".to_string();
        doc.customer_name = "  ".to_string();
        assert_eq!(
            prepare_document(&doc, 1),
            Err(ValidationError::required("customer_name"))
        );
    }

    #[test]
    fn test_optional_fields_trimmed() {
        let prepared = prepare_document(&submission(vec![line(80_000, 2, None)]), 1).unwrap();
        assert_eq!(prepared.customer_tax_id, None);
        assert_eq!(prepared.customer_address.as_deref(), Some("12 MG Road"));
    }

    #[test]
    fn test_totals_are_recomputed() {
        let prepared = prepare_document(&submission(vec![line(80_000, 2, None)]), 1).unwrap();
        assert_eq!(prepared.totals.subtotal.paise(), 131_200);
        assert_eq!(prepared.totals.cgst.paise(), 14_400);
        assert_eq!(prepared.totals.total.paise(), 160_000);
    }

    #[test]
    fn test_stored_record_matches_fresh_aggregation() {
        let mut doc = submission(vec![line(80_000, 2, None), line(99, 3, Some(9))]);
        doc.discount_paise = 1_000;
        let prepared = prepare_document(&doc, 1).unwrap();

        let stored = prepared.into_document(42, chrono::Utc::now());
        assert_eq!(stored.id, 42);
        assert_eq!(stored.totals(), stored.recompute_totals());
        assert_eq!(stored.discount_paise, 1_000);
    }

    #[test]
    fn test_claimed_totals_within_tolerance_accepted() {
        let mut doc = submission(vec![line(80_000, 2, None)]);
        doc.claimed_totals = Some(DocumentTotals {
            subtotal: Money::from_paise(131_201),
            cgst: Money::from_paise(14_400),
            sgst: Money::from_paise(14_399),
            discount: Money::zero(),
            total: Money::from_paise(160_000),
        });
        assert!(prepare_document(&doc, 1).is_ok());
    }

    #[test]
    fn test_claimed_totals_mismatch_rejected() {
        let mut doc = submission(vec![line(80_000, 2, None)]);
        doc.claimed_totals = Some(DocumentTotals {
            subtotal: Money::from_paise(131_200),
            cgst: Money::from_paise(14_400),
            sgst: Money::from_paise(14_400),
            discount: Money::zero(),
            total: Money::from_paise(150_000),
        });

        assert_eq!(
            prepare_document(&doc, 1),
            Err(ValidationError::TotalsMismatch {
                field: "total".to_string(),
                claimed_paise: 150_000,
                computed_paise: 160_000,
            })
        );
    }

    #[test]
    fn test_discount_at_or_above_price_rejected() {
        let doc = submission(vec![line(10_000, 1, None), line(10_000, 1, Some(10_000))]);
        assert_eq!(
            prepare_document(&doc, 1),
            Err(ValidationError::DiscountTooLarge {
                line: 1,
                discount_paise: 10_000,
                price_paise: 10_000,
            })
        );

        let negative = submission(vec![line(10_000, 1, Some(-5))]);
        assert!(prepare_document(&negative, 1).is_err());
    }

    #[test]
    fn test_zero_discount_normalized_to_none() {
        let prepared = prepare_document(&submission(vec![line(10_000, 1, Some(0))]), 1).unwrap();
        assert_eq!(prepared.lines[0].discount_per_unit_paise, None);
    }

    #[test]
    fn test_bad_quantity_and_negative_discount_rejected() {
        assert!(prepare_document(&submission(vec![line(10_000, 0, None)]), 1).is_err());
        assert!(prepare_document(&submission(vec![line(10_000, 1000, None)]), 1).is_err());

        let mut doc = submission(vec![line(10_000, 1, None)]);
        doc.discount_paise = -1;
        assert!(prepare_document(&doc, 1).is_err());
    }

    #[test]
    fn test_oversized_price_rejected_before_totals() {
        let doc = submission(vec![line(100_000_000_000_000_000, 999, None)]);
        assert_eq!(
            prepare_document(&doc, 1),
            Err(ValidationError::OutOfRange {
                field: "price".to_string(),
                min: 0,
                max: crate::MAX_AMOUNT_PAISE,
            })
        );

        let mut discounted = submission(vec![line(10_000, 1, None)]);
        discounted.discount_paise = i64::MAX;
        assert!(prepare_document(&discounted, 1).is_err());
    }

    #[test]
    fn test_largest_prices_are_accepted() {
        let lines = vec![line(crate::MAX_AMOUNT_PAISE, 999, None); MAX_DRAFT_LINES];
        let prepared = prepare_document(&submission(lines), 1).unwrap();
        assert_eq!(
            prepared.totals.total.paise(),
            crate::MAX_AMOUNT_PAISE * 999 * MAX_DRAFT_LINES as i64
        );
    }

    #[test]
    fn test_line_count_capped() {
        let at_cap = submission(vec![line(10_000, 1, None); MAX_DRAFT_LINES]);
        assert!(prepare_document(&at_cap, 1).is_ok());

        let over = submission(vec![line(10_000, 1, None); MAX_DRAFT_LINES + 1]);
        assert_eq!(
            prepare_document(&over, 1),
            Err(ValidationError::OutOfRange {
                field: "lines".to_string(),
                min: 1,
                max: MAX_DRAFT_LINES as i64,
            })
        );
    }

    #[test]
    fn test_unindexable_mobile_is_kept_without_key() {
        let mut doc = submission(vec![line(10_000, 1, None)]);
        doc.customer_mobile = "walk-in".to_string();
        let prepared = prepare_document(&doc, 1).unwrap();
        assert_eq!(prepared.customer_mobile, "walk-in");
        assert_eq!(prepared.mobile_key, None);
    }
}
