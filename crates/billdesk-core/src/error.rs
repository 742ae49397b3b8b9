//! # Error Types
//!
//! Domain-specific error types for billdesk-core.
//!
//! ## Error Hierarchy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Error Types                                     │
//! │                                                                         │
//! │  billdesk-core errors (this file)                                      │
//! │  ├── CoreError        - Business rule failures (not found, conflict)   │
//! │  └── ValidationError  - Input validation failures                      │
//! │                                                                         │
//! │  billdesk-db errors (separate crate)                                   │
//! │  ├── DbError          - Database operation failures                    │
//! │  └── ServiceError     - CoreError | DbError                            │
//! │                                                                         │
//! │  CLI errors (in app)                                                   │
//! │  └── ApiError         - What the operator sees (serialized)            │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Caller Contract
//! - `ValidationError`: rejected input, never retried automatically
//! - `CoreError::CustomerConflict`: surfaced distinctly so the caller can
//!   re-submit under the existing name or abort
//! - `CoreError::*NotFound`: absence, not a transient failure

use thiserror::Error;

use crate::types::DocumentKind;

// =============================================================================
// Core Error
// =============================================================================

/// Core business logic errors.
#[derive(Debug, Error)]
pub enum CoreError {
    /// Invoice or quotation id does not exist.
    #[error("{kind} not found: {id}")]
    DocumentNotFound { kind: DocumentKind, id: i64 },

    /// Catalog item id does not exist.
    #[error("Item not found: {0}")]
    ItemNotFound(i64),

    /// The mobile number already belongs to a customer with another name.
    ///
    /// ## User Workflow
    /// ```text
    /// Existing invoice: 9876543210 → "Alice"
    ///      │
    ///      ▼
    /// New bill: "+91 98765-43210", name "Bob"
    ///      │
    ///      ▼
    /// CustomerConflict { existing_name: "Alice", .. }
    ///      │
    ///      ▼
    /// UI: "This number belongs to Alice" → bill as Alice, or abort
    /// ```
    #[error("Mobile {mobile} is already registered to '{existing_name}'")]
    CustomerConflict {
        existing_name: String,
        mobile: String,
    },

    /// Draft line index does not exist.
    #[error("No line at position {0}")]
    LineNotFound(usize),

    /// Draft has reached the maximum number of distinct lines.
    #[error("A bill cannot have more than {max} lines")]
    DraftTooLarge { max: usize },

    /// Line quantity would exceed the maximum allowed.
    #[error("Quantity {requested} exceeds maximum allowed ({max})")]
    QuantityTooLarge { requested: i64, max: i64 },

    /// Validation error (wraps ValidationError).
    #[error("Validation error: {0}")]
    Validation(#[from] ValidationError),
}

// =============================================================================
// Validation Error
// =============================================================================

/// Input validation errors.
///
/// Each variant names the offending field so the UI can highlight it.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ValidationError {
    /// A required field is missing or empty.
    #[error("{field} is required")]
    Required { field: String },

    /// Field value is too long.
    #[error("{field} must be at most {max} characters")]
    TooLong { field: String, max: usize },

    /// Numeric value is out of range.
    #[error("{field} must be between {min} and {max}")]
    OutOfRange { field: String, min: i64, max: i64 },

    /// Value must be positive.
    #[error("{field} must be positive")]
    MustBePositive { field: String },

    /// Duplicate value (e.g. an item name that already exists).
    #[error("{field} '{value}' already exists")]
    Duplicate { field: String, value: String },

    /// A document was submitted without line items.
    #[error("At least one line item is required")]
    EmptyLines,

    /// A per-unit discount is not below the unit price.
    #[error("Discount on line {line} ({discount_paise} paise) must be less than the unit price ({price_paise} paise)")]
    DiscountTooLarge {
        line: usize,
        discount_paise: i64,
        price_paise: i64,
    },

    /// Client-sent totals disagree with the server computation.
    #[error("{field} mismatch: submitted {claimed_paise} paise, computed {computed_paise} paise")]
    TotalsMismatch {
        field: String,
        claimed_paise: i64,
        computed_paise: i64,
    },
}

impl ValidationError {
    /// Shorthand for [`ValidationError::Required`].
    pub fn required(field: impl Into<String>) -> Self {
        ValidationError::Required {
            field: field.into(),
        }
    }
}

// =============================================================================
// Result Type Alias
// =============================================================================

/// Convenience type alias for Results with CoreError.
pub type CoreResult<T> = Result<T, CoreError>;

// =============================================================================
// Unit Tests
// =============================================================================
