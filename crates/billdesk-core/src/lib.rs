//! # billdesk-core: Pure Business Logic for Billdesk
//!
//! Tax arithmetic, document rules and customer matching for a single-shop
//! billing system. Every function here is pure: no database, no files, no
//! network.
//!
//! ## Architecture Position
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                        Billdesk Architecture                            │
//! │                                                                         │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │                    billdesk CLI (apps/billdesk-cli)             │   │
//! │  │     items, create, convert, customers, report, backup           │   │
//! │  └─────────────────────────────┬───────────────────────────────────┘   │
//! │                                │                                        │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │               billdesk-db (BillingService + SQLite)             │   │
//! │  └─────────────────────────────┬───────────────────────────────────┘   │
//! │                                │                                        │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │               ★ billdesk-core (THIS CRATE) ★                    │   │
//! │  │                                                                 │   │
//! │  │   money    ─► Money, TaxRate (integer paise, basis points)      │   │
//! │  │   tax      ─► split_inclusive, aggregate_line/document          │   │
//! │  │   draft    ─► DocumentDraft (screen-side clamping)              │   │
//! │  │   document ─► prepare_document (server-side recompute)          │   │
//! │  │   customer ─► normalize_mobile, directory                       │   │
//! │  │   reporting─► monthly / yearly / top items                      │   │
//! │  │                                                                 │   │
//! │  │   NO I/O • NO DATABASE • NO NETWORK • PURE FUNCTIONS            │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Modules
//!
//! - [`money`] - Money in integer paise
//! - [`tax`] - Inclusive GST split and document aggregation
//! - [`types`] - Item, LineItem, Document
//! - [`draft`] - Unsaved bill being edited
//! - [`document`] - Submission validation with server-side totals
//! - [`customer`] - Mobile normalization and the derived customer directory
//! - [`reporting`] - Dashboard aggregations
//! - [`validation`] - Field-level rules
//! - [`error`] - Domain error types
//!
//! ## Example Usage
//!
//! ```rust
//! use billdesk_core::money::Money;
//! use billdesk_core::tax::split_inclusive;
//! use billdesk_core::types::TaxRate;
//!
//! // ₹1600.00 inclusive of 18% GST
//! let inclusive = Money::from_paise(160_000);
//! let base = split_inclusive(inclusive, TaxRate::from_bps(1800));
//!
//! assert_eq!(base.paise(), 131_200);
//! assert_eq!((inclusive - base).paise(), 28_800);
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod customer;
pub mod document;
pub mod draft;
pub mod error;
pub mod money;
pub mod reporting;
pub mod tax;
pub mod types;
pub mod validation;

// =============================================================================
// Re-exports for Convenience
// =============================================================================

pub use customer::{normalize_mobile, CustomerLookup, CustomerView, MobileQuery};
pub use document::{prepare_document, NewDocument, PreparedDocument};
pub use draft::{CustomerDetails, DiscountOutcome, DocumentDraft};
pub use error::{CoreError, CoreResult, ValidationError};
pub use money::Money;
pub use tax::{DocumentTotals, LineTotals};
pub use types::*;

// =============================================================================
// Crate-Level Constants
// =============================================================================

/// Maximum distinct lines on one bill, for drafts and submitted documents.
pub const MAX_DRAFT_LINES: usize = 100;

/// Largest accepted price, MRP or discount (₹1,000 crore).
///
/// A full bill at this price, maximum quantity and maximum lines still fits
/// in an `i64` of paise.
pub const MAX_AMOUNT_PAISE: i64 = 1_000_000_000_000;

/// Maximum quantity on a single line.
///
/// Catches typing 1000 instead of 10.
pub const MAX_LINE_QUANTITY: i64 = 999;

/// Characters a cashier must type before a mobile lookup runs.
pub const MIN_MOBILE_SEARCH_LEN: usize = 6;

/// Allowed difference per total between client and server figures.
pub const DEFAULT_TOTALS_TOLERANCE_PAISE: i64 = 1;
