//! # Validation Module
//!
//! Input validation for catalog items and document fields.
//!
//! ## Validation Layers
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  Layer 1: Billing screen - immediate feedback, draft clamping           │
//! │           │                                                             │
//! │           ▼                                                             │
//! │  Layer 2: THIS MODULE + document::prepare_document                     │
//! │           rejects anything the screen should not have let through      │
//! │           │                                                             │
//! │           ▼                                                             │
//! │  Layer 3: SQLite - NOT NULL, UNIQUE(name COLLATE NOCASE)               │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use crate::error::ValidationError;
use crate::money::Money;
use crate::types::{ItemInput, TaxRate};
use crate::{MAX_AMOUNT_PAISE, MAX_LINE_QUANTITY};

/// Result type for validation operations.
pub type ValidationResult<T> = Result<T, ValidationError>;

const MAX_NAME_LEN: usize = 200;
const MAX_QUERY_LEN: usize = 100;

// =============================================================================
// String Validators
// =============================================================================

/// Trims `value` and fails with `Required` when nothing is left.
pub fn require_text(field: &str, value: &str) -> ValidationResult<String> {
    let value = value.trim();
    if value.is_empty() {
        return Err(ValidationError::required(field));
    }
    Ok(value.to_string())
}

/// Trims an optional field, mapping blank values to `None`.
pub fn optional_text(value: Option<&str>) -> Option<String> {
    value
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .map(str::to_string)
}

/// Validates a catalog item name: non-empty, at most 200 characters.
///
/// ## Example
/// ```rust
/// use billdesk_core::validation::validate_item_name;
///
/// assert!(validate_item_name("Silk Pillow Covers (Pair)").is_ok());
/// assert!(validate_item_name("   ").is_err());
/// ```
pub fn validate_item_name(name: &str) -> ValidationResult<String> {
    let name = require_text("name", name)?;

    if name.chars().count() > MAX_NAME_LEN {
        return Err(ValidationError::TooLong {
            field: "name".to_string(),
            max: MAX_NAME_LEN,
        });
    }

    Ok(name)
}

/// Validates a catalog search query. Empty is allowed and lists everything.
///
/// Returns the trimmed query.
pub fn validate_search_query(query: &str) -> ValidationResult<String> {
    let query = query.trim();

    if query.chars().count() > MAX_QUERY_LEN {
        return Err(ValidationError::TooLong {
            field: "query".to_string(),
            max: MAX_QUERY_LEN,
        });
    }

    Ok(query.to_string())
}

// =============================================================================
// Numeric Validators
// =============================================================================

/// Validates a line quantity: 1..=999.
pub fn validate_quantity(qty: i64) -> ValidationResult<()> {
    if qty <= 0 {
        return Err(ValidationError::MustBePositive {
            field: "quantity".to_string(),
        });
    }

    if qty > MAX_LINE_QUANTITY {
        return Err(ValidationError::OutOfRange {
            field: "quantity".to_string(),
            min: 1,
            max: MAX_LINE_QUANTITY,
        });
    }

    Ok(())
}

/// Validates an amount in paise: 0..=[`MAX_AMOUNT_PAISE`].
pub fn validate_amount_paise(field: &str, paise: i64) -> ValidationResult<()> {
    if !(0..=MAX_AMOUNT_PAISE).contains(&paise) {
        return Err(ValidationError::OutOfRange {
            field: field.to_string(),
            min: 0,
            max: MAX_AMOUNT_PAISE,
        });
    }

    Ok(())
}

/// Validates a GST rate: 0% to 100%.
pub fn validate_tax_rate_bps(bps: u32) -> ValidationResult<()> {
    validate_bps("gst_rate", bps)
}

/// Validates a percentage discount: 0% to 100%.
pub fn validate_discount_bps(bps: u32) -> ValidationResult<()> {
    validate_bps("discount", bps)
}

fn validate_bps(field: &str, bps: u32) -> ValidationResult<()> {
    if bps > 10_000 {
        return Err(ValidationError::OutOfRange {
            field: field.to_string(),
            min: 0,
            max: 10_000,
        });
    }

    Ok(())
}

// =============================================================================
// Item Validation
// =============================================================================

/// A validated catalog item ready for insert or update.
#[derive(Debug, Clone, PartialEq)]
pub struct PreparedItem {
    pub name: String,
    pub gst_rate: TaxRate,
    pub mrp: Option<Money>,
    pub discount_bps: Option<u32>,
    pub price: Money,
}

/// Validates an [`ItemInput`] and derives the selling price.
///
/// ## Price Resolution
/// ```text
/// mrp present?  ── yes ──► price = mrp × (1 − discount/100)
///      │
///      no
///      ▼
/// price present? ── yes ──► legacy item, price kept as given
///      │
///      no ──► Required { field: "mrp" }
/// ```
///
/// A zero discount is stored as `None`.
pub fn validate_item_input(input: &ItemInput) -> ValidationResult<PreparedItem> {
    let name = validate_item_name(&input.name)?;
    validate_tax_rate_bps(input.gst_rate_bps)?;

    let discount_bps = match input.discount_bps {
        Some(bps) => {
            validate_discount_bps(bps)?;
            Some(bps).filter(|b| *b > 0)
        }
        None => None,
    };

    let (mrp, price) = match (input.mrp_paise, input.price_paise) {
        (Some(mrp), _) => {
            validate_amount_paise("mrp", mrp)?;
            let mrp = Money::from_paise(mrp);
            let price = mrp.apply_percentage_discount(discount_bps.unwrap_or(0));
            (Some(mrp), price)
        }
        (None, Some(price)) => {
            validate_amount_paise("price", price)?;
            (None, Money::from_paise(price))
        }
        (None, None) => return Err(ValidationError::required("mrp")),
    };

    Ok(PreparedItem {
        name,
        gst_rate: TaxRate::from_bps(input.gst_rate_bps),
        mrp,
        discount_bps: if mrp.is_some() { discount_bps } else { None },
        price,
    })
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_require_text_trims() {
        assert_eq!(require_text("customer_name", "  Alice ").unwrap(), "Alice");
        assert_eq!(
            require_text("customer_name", "   "),
            Err(ValidationError::required("customer_name"))
        );
    }

    #[test]
    fn test_optional_text() {
        assert_eq!(optional_text(Some(" 29ABCDE1234F1Z5 ")), Some("29ABCDE1234F1Z5".to_string()));
        assert_eq!(optional_text(Some("  ")), None);
        assert_eq!(optional_text(None), None);
    }

    #[test]
    fn test_validate_quantity() {
        assert!(validate_quantity(1).is_ok());
        assert!(validate_quantity(999).is_ok());
        assert!(validate_quantity(0).is_err());
        assert!(validate_quantity(-1).is_err());
        assert!(validate_quantity(1000).is_err());
    }

    #[test]
    fn test_validate_rates() {
        assert!(validate_tax_rate_bps(0).is_ok());
        assert!(validate_tax_rate_bps(1800).is_ok());
        assert!(validate_tax_rate_bps(10_000).is_ok());
        assert!(validate_tax_rate_bps(10_001).is_err());
        assert!(validate_discount_bps(10_001).is_err());
    }

    #[test]
    fn test_item_price_derived_from_mrp() {
        let input = ItemInput {
            name: "Premium Bedspread (King)".to_string(),
            gst_rate_bps: 1800,
            mrp_paise: Some(100_000),
            discount_bps: Some(2000),
            price_paise: Some(1),
        };
        let item = validate_item_input(&input).unwrap();
        assert_eq!(item.price.paise(), 80_000);
        assert_eq!(item.mrp, Some(Money::from_paise(100_000)));
        assert_eq!(item.discount_bps, Some(2000));
    }

    #[test]
    fn test_legacy_item_keeps_price() {
        let input = ItemInput {
            name: "Bed Runner".to_string(),
            gst_rate_bps: 1200,
            price_paise: Some(85_000),
            discount_bps: Some(1000),
            ..Default::default()
        };
        let item = validate_item_input(&input).unwrap();
        assert_eq!(item.price.paise(), 85_000);
        assert_eq!(item.mrp, None);
        assert_eq!(item.discount_bps, None);
    }

    #[test]
    fn test_item_requires_a_price() {
        let input = ItemInput {
            name: "Bath Mat".to_string(),
            gst_rate_bps: 1200,
            ..Default::default()
        };
        assert_eq!(
            validate_item_input(&input),
            Err(ValidationError::required("mrp"))
        );
    }

    #[test]
    fn test_item_rejects_negative_mrp_and_bad_rate() {
        let negative = ItemInput {
            name: "Quilt".to_string(),
            gst_rate_bps: 1200,
            mrp_paise: Some(-1),
            ..Default::default()
        };
        assert!(validate_item_input(&negative).is_err());

        let bad_rate = ItemInput {
            name: "Quilt".to_string(),
            gst_rate_bps: 12_000,
            mrp_paise: Some(100),
            ..Default::default()
        };
        assert!(validate_item_input(&bad_rate).is_err());
    }

    #[test]
    fn test_item_amounts_are_capped() {
        assert!(validate_amount_paise("price", MAX_AMOUNT_PAISE).is_ok());

        let huge_mrp = ItemInput {
            name: "Quilt".to_string(),
            gst_rate_bps: 1200,
            mrp_paise: Some(MAX_AMOUNT_PAISE + 1),
            ..Default::default()
        };
        assert_eq!(
            validate_item_input(&huge_mrp),
            Err(ValidationError::OutOfRange {
                field: "mrp".to_string(),
                min: 0,
                max: MAX_AMOUNT_PAISE,
            })
        );

        let huge_price = ItemInput {
            name: "Quilt".to_string(),
            gst_rate_bps: 1200,
            price_paise: Some(i64::MAX),
            ..Default::default()
        };
        assert!(validate_item_input(&huge_price).is_err());
    }

    #[test]
    fn test_zero_discount_is_unset() {
        let input = ItemInput {
            name: "Towel".to_string(),
            gst_rate_bps: 1200,
            mrp_paise: Some(15_000),
            discount_bps: Some(0),
            price_paise: None,
        };
        assert_eq!(validate_item_input(&input).unwrap().discount_bps, None);
    }

    #[test]
    fn test_search_query_limit() {
        assert_eq!(validate_search_query("  sheet ").unwrap(), "sheet");
        assert!(validate_search_query(&"a".repeat(101)).is_err());
    }
}
