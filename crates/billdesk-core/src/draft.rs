//! # Document Draft
//!
//! The unsaved bill or quotation being edited on the billing screen.
//!
//! ## Draft Operations Flow
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  Screen Action            Draft Method               Effect             │
//! │  ─────────────            ────────────               ──────             │
//! │                                                                         │
//! │  Pick item ─────────────► add_item() ──────────────► push or qty + 1   │
//! │  [+] / [−] ─────────────► increase/decrease ───────► qty ± 1 (min 1)   │
//! │  Type quantity ─────────► set_quantity() ──────────► 1..=999           │
//! │  Type discount ─────────► set_discount_per_unit() ─► clamped + warning │
//! │  Bill discount ─────────► set_discount() ──────────► floored at 0      │
//! │  Remove ────────────────► remove_line()                                 │
//! │                                                                         │
//! │  Every render ──────────► totals() ────────────────► tax engine        │
//! │  Submit ────────────────► into_submission() ───────► NewDocument       │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! The draft clamps bad input and reports it. The server side
//! ([`prepare_document`](crate::document::prepare_document)) rejects instead.

use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::document::NewDocument;
use crate::error::{CoreError, CoreResult};
use crate::money::Money;
use crate::tax::{aggregate_document, DocumentTotals};
use crate::types::{DocumentKind, Item, LineItem};
use crate::validation::validate_quantity;
use crate::{MAX_DRAFT_LINES, MAX_LINE_QUANTITY};

/// Smallest step below the unit price a per-unit discount may reach.
const DISCOUNT_EPSILON: Money = Money::from_paise(1);

/// Result of a per-unit discount edit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[serde(tag = "outcome", rename_all = "snake_case")]
#[ts(export)]
pub enum DiscountOutcome {
    /// Stored as requested.
    Applied { discount_paise: i64 },
    /// Negative request stored as zero.
    ClampedToZero,
    /// Request at or above the unit price stored as `price − 1 paisa`.
    ClampedBelowPrice { discount_paise: i64 },
}

impl DiscountOutcome {
    /// Message for the cashier when the request was changed.
    pub fn warning(&self) -> Option<String> {
        match self {
            DiscountOutcome::Applied { .. } => None,
            DiscountOutcome::ClampedToZero => Some("Discount cannot be negative".to_string()),
            DiscountOutcome::ClampedBelowPrice { discount_paise } => Some(format!(
                "Discount must be less than the item price; set to {}",
                Money::from_paise(*discount_paise)
            )),
        }
    }

    pub fn was_clamped(&self) -> bool {
        !matches!(self, DiscountOutcome::Applied { .. })
    }
}

/// Customer fields typed on the billing screen.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct CustomerDetails {
    pub name: String,
    pub mobile: String,
    #[serde(default)]
    pub tax_id: Option<String>,
    #[serde(default)]
    pub address: Option<String>,
}

/// Lines and discount of a document that has not been submitted yet.
///
/// ## Invariants
/// - Lines are unique by `item_id` (picking an item twice bumps its quantity)
/// - Quantity is 1..=999
/// - At most 100 lines
/// - `0 ≤ discount_per_unit < price` on every line with a positive price
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct DocumentDraft {
    pub lines: Vec<LineItem>,
    pub discount_paise: i64,
}

impl DocumentDraft {
    pub fn new() -> Self {
        DocumentDraft::default()
    }

    /// Adds `item` with quantity 1, or bumps the quantity of its line.
    ///
    /// Returns the index of the affected line.
    pub fn add_item(&mut self, item: &Item) -> CoreResult<usize> {
        if let Some(idx) = self.lines.iter().position(|l| l.item_id == item.id) {
            self.increase_quantity(idx)?;
            return Ok(idx);
        }

        if self.lines.len() >= MAX_DRAFT_LINES {
            return Err(CoreError::DraftTooLarge {
                max: MAX_DRAFT_LINES,
            });
        }

        self.lines.push(LineItem::from_item(item, 1));
        Ok(self.lines.len() - 1)
    }

    pub fn increase_quantity(&mut self, idx: usize) -> CoreResult<()> {
        let line = self.line_mut(idx)?;
        let requested = line.quantity + 1;
        if requested > MAX_LINE_QUANTITY {
            return Err(CoreError::QuantityTooLarge {
                requested,
                max: MAX_LINE_QUANTITY,
            });
        }
        line.quantity = requested;
        Ok(())
    }

    /// Decrements the quantity. Returns `false` when already at 1.
    pub fn decrease_quantity(&mut self, idx: usize) -> CoreResult<bool> {
        let line = self.line_mut(idx)?;
        if line.quantity <= 1 {
            return Ok(false);
        }
        line.quantity -= 1;
        Ok(true)
    }

    pub fn set_quantity(&mut self, idx: usize, quantity: i64) -> CoreResult<()> {
        if quantity > MAX_LINE_QUANTITY {
            return Err(CoreError::QuantityTooLarge {
                requested: quantity,
                max: MAX_LINE_QUANTITY,
            });
        }
        validate_quantity(quantity)?;
        self.line_mut(idx)?.quantity = quantity;
        Ok(())
    }

    /// Sets the per-unit discount on a line, clamping into `[0, price)`.
    ///
    /// ## Clamping
    /// ```text
    /// request < 0        → 0                  (ClampedToZero)
    /// request ≥ price    → price − ₹0.01      (ClampedBelowPrice)
    /// otherwise          → request            (Applied)
    /// ```
    /// A zero-priced line can only carry a zero discount.
    pub fn set_discount_per_unit(&mut self, idx: usize, paise: i64) -> CoreResult<DiscountOutcome> {
        let line = self.line_mut(idx)?;
        let price = line.price();

        let (stored, outcome) = if paise < 0 {
            (Money::zero(), DiscountOutcome::ClampedToZero)
        } else if paise >= price.paise() && paise > 0 {
            let capped = (price - DISCOUNT_EPSILON).floor_zero();
            (
                capped,
                DiscountOutcome::ClampedBelowPrice {
                    discount_paise: capped.paise(),
                },
            )
        } else {
            (
                Money::from_paise(paise),
                DiscountOutcome::Applied {
                    discount_paise: paise,
                },
            )
        };

        line.discount_per_unit_paise = if stored.is_zero() {
            None
        } else {
            Some(stored.paise())
        };
        Ok(outcome)
    }

    pub fn remove_line(&mut self, idx: usize) -> CoreResult<LineItem> {
        if idx >= self.lines.len() {
            return Err(CoreError::LineNotFound(idx));
        }
        Ok(self.lines.remove(idx))
    }

    /// Sets the bill-level discount. Negative values are stored as zero.
    pub fn set_discount(&mut self, paise: i64) {
        self.discount_paise = paise.max(0);
    }

    pub fn discount(&self) -> Money {
        Money::from_paise(self.discount_paise)
    }

    /// Totals as the screen shows them.
    pub fn totals(&self) -> DocumentTotals {
        aggregate_document(&self.lines, self.discount())
    }

    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }

    pub fn line_count(&self) -> usize {
        self.lines.len()
    }

    pub fn total_quantity(&self) -> i64 {
        self.lines.iter().map(|l| l.quantity).sum()
    }

    pub fn clear(&mut self) {
        self.lines.clear();
        self.discount_paise = 0;
    }

    /// Packs the draft for submission, sending the screen totals along so
    /// the server can cross-check them.
    pub fn into_submission(self, kind: DocumentKind, customer: CustomerDetails) -> NewDocument {
        let claimed = self.totals();
        NewDocument {
            kind,
            customer_name: customer.name,
            customer_mobile: customer.mobile,
            customer_tax_id: customer.tax_id,
            customer_address: customer.address,
            lines: self.lines,
            discount_paise: self.discount_paise,
            claimed_totals: Some(claimed),
        }
    }

    fn line_mut(&mut self, idx: usize) -> CoreResult<&mut LineItem> {
        self.lines.get_mut(idx).ok_or(CoreError::LineNotFound(idx))
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::document::prepare_document;
    use chrono::Utc;

    fn item(id: i64, price: i64) -> Item {
        Item {
            id,
            name: format!("Item {}", id),
            gst_rate_bps: 1200,
            mrp_paise: Some(price),
            discount_bps: None,
            price_paise: price,
            created_at: Utc::now(),
        }
    }

    #[test]
    fn test_add_same_item_increments_quantity() {
        let mut draft = DocumentDraft::new();
        let towel = item(1, 150_000);

        assert_eq!(draft.add_item(&towel).unwrap(), 0);
        assert_eq!(draft.add_item(&item(2, 75_000)).unwrap(), 1);
        assert_eq!(draft.add_item(&towel).unwrap(), 0);

        assert_eq!(draft.line_count(), 2);
        assert_eq!(draft.lines[0].quantity, 2);
        assert_eq!(draft.total_quantity(), 3);
    }

    #[test]
    fn test_decrease_blocked_at_one() {
        let mut draft = DocumentDraft::new();
        draft.add_item(&item(1, 1_000)).unwrap();

        assert!(!draft.decrease_quantity(0).unwrap());
        assert_eq!(draft.lines[0].quantity, 1);

        draft.increase_quantity(0).unwrap();
        assert!(draft.decrease_quantity(0).unwrap());
        assert_eq!(draft.lines[0].quantity, 1);
    }

    #[test]
    fn test_set_quantity_limits() {
        let mut draft = DocumentDraft::new();
        draft.add_item(&item(1, 1_000)).unwrap();

        draft.set_quantity(0, 999).unwrap();
        assert!(matches!(
            draft.increase_quantity(0),
            Err(CoreError::QuantityTooLarge { requested: 1000, .. })
        ));
        assert!(matches!(
            draft.set_quantity(0, 1000),
            Err(CoreError::QuantityTooLarge { .. })
        ));
        assert!(matches!(draft.set_quantity(0, 0), Err(CoreError::Validation(_))));
        assert!(matches!(draft.set_quantity(4, 2), Err(CoreError::LineNotFound(4))));
    }

    #[test]
    fn test_discount_clamping() {
        let mut draft = DocumentDraft::new();
        draft.add_item(&item(1, 10_000)).unwrap();

        let outcome = draft.set_discount_per_unit(0, 2_500).unwrap();
        assert_eq!(outcome, DiscountOutcome::Applied { discount_paise: 2_500 });
        assert_eq!(outcome.warning(), None);
        assert_eq!(draft.lines[0].discount_per_unit_paise, Some(2_500));

        let outcome = draft.set_discount_per_unit(0, -100).unwrap();
        assert_eq!(outcome, DiscountOutcome::ClampedToZero);
        assert!(outcome.warning().is_some());
        assert_eq!(draft.lines[0].discount_per_unit_paise, None);

        let outcome = draft.set_discount_per_unit(0, 10_000).unwrap();
        assert_eq!(outcome, DiscountOutcome::ClampedBelowPrice { discount_paise: 9_999 });
        assert!(outcome.was_clamped());
        assert_eq!(draft.lines[0].effective_unit_price().paise(), 1);
    }

    #[test]
    fn test_clamped_draft_passes_submission() {
        let mut draft = DocumentDraft::new();
        draft.add_item(&item(1, 10_000)).unwrap();
        draft.set_discount_per_unit(0, 50_000).unwrap();

        let doc = draft.into_submission(
            DocumentKind::Quotation,
            CustomerDetails {
                name: "Ravi".to_string(),
                mobile: "9988776655".to_string(),
                ..Default::default()
            },
        );
        assert!(prepare_document(&doc, 0).is_ok());
    }

    #[test]
    fn test_totals_follow_every_mutation() {
        let mut draft = DocumentDraft::new();
        assert_eq!(draft.totals(), DocumentTotals::default());

        draft.add_item(&item(1, 10_000)).unwrap();
        assert_eq!(draft.totals().total.paise(), 10_000);

        draft.increase_quantity(0).unwrap();
        assert_eq!(draft.totals().total.paise(), 20_000);

        draft.set_discount(-50);
        assert_eq!(draft.discount_paise, 0);
        draft.set_discount(5_000);
        assert_eq!(draft.totals().total.paise(), 15_000);

        draft.remove_line(0).unwrap();
        assert!(draft.is_empty());
        assert_eq!(draft.totals().total, Money::zero());
        assert!(draft.remove_line(0).is_err());
    }

    #[test]
    fn test_draft_line_limit() {
        let mut draft = DocumentDraft::new();
        for id in 0..MAX_DRAFT_LINES as i64 {
            draft.add_item(&item(id, 100)).unwrap();
        }
        assert!(matches!(
            draft.add_item(&item(999, 100)),
            Err(CoreError::DraftTooLarge { max: 100 })
        ));
        // Existing items can still be bumped
        assert!(draft.add_item(&item(0, 100)).is_ok());
    }

    #[test]
    fn test_submission_carries_claimed_totals() {
        let mut draft = DocumentDraft::new();
        draft.add_item(&item(1, 10_000)).unwrap();
        let expected = draft.totals();

        let doc = draft.into_submission(DocumentKind::Invoice, CustomerDetails::default());
        assert_eq!(doc.claimed_totals, Some(expected));
        assert_eq!(doc.lines.len(), 1);
    }
}
