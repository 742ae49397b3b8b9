//! # Customer Directory
//!
//! Customers are not stored on their own. Identity is the normalized
//! 10-digit mobile key, and every view here is recomputed from invoice and
//! quotation history.
//!
//! The same [`normalize_mobile`] is used for the duplicate check on create,
//! for the stored `customer_mobile_key` column, for lookups and for the
//! directory build.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use ts_rs::TS;

use crate::types::Document;
use crate::MIN_MOBILE_SEARCH_LEN;

/// Length of a normalized mobile key.
pub const MOBILE_KEY_LEN: usize = 10;

const COUNTRY_CODE: &str = "91";

/// Normalizes a free-form mobile number to its 10-digit key.
///
/// Keeps digits only, drops leading zeros, drops a single `91` country code
/// when exactly ten digits follow it, then drops leading zeros again.
/// Stripping zeros first means an international `0091` prefix is handled
/// like `+91`.
/// Anything other than ten digits at the end yields `None`, meaning the
/// record is not indexed.
///
/// ## Example
/// ```rust
/// use billdesk_core::customer::normalize_mobile;
///
/// assert_eq!(normalize_mobile("+91 98765-43210").as_deref(), Some("9876543210"));
/// assert_eq!(normalize_mobile("098765 43210").as_deref(), Some("9876543210"));
/// assert_eq!(normalize_mobile("12345"), None);
/// ```
pub fn normalize_mobile(raw: &str) -> Option<String> {
    let digits: String = raw.chars().filter(|c| c.is_ascii_digit()).collect();
    let digits = digits.trim_start_matches('0');

    let digits = match digits.strip_prefix(COUNTRY_CODE) {
        Some(rest) if rest.len() == MOBILE_KEY_LEN => rest,
        _ => digits,
    };
    let digits = digits.trim_start_matches('0');

    (digits.len() == MOBILE_KEY_LEN).then(|| digits.to_string())
}

// =============================================================================
// Lookup
// =============================================================================

/// How a typed mobile should be matched against stored keys.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MobileQuery {
    /// The input normalizes to a full key: match it exactly.
    Exact(String),
    /// Partial digits: match as a substring of stored keys.
    Partial(String),
}

impl MobileQuery {
    /// Parses cashier input. Fewer than six characters never matches.
    pub fn parse(raw: &str) -> Option<MobileQuery> {
        let raw = raw.trim();
        if raw.chars().count() < MIN_MOBILE_SEARCH_LEN {
            return None;
        }

        if let Some(key) = normalize_mobile(raw) {
            return Some(MobileQuery::Exact(key));
        }

        let without_code = raw.strip_prefix("+91").unwrap_or(raw);
        let digits: String = without_code.chars().filter(|c| c.is_ascii_digit()).collect();
        let digits = digits.trim_start_matches('0');

        if digits.is_empty() || digits.len() > MOBILE_KEY_LEN {
            return None;
        }
        Some(MobileQuery::Partial(digits.to_string()))
    }

    /// SQL `LIKE` pattern against the key column. Keys are digits only, so
    /// no escaping is needed.
    pub fn like_pattern(&self) -> String {
        match self {
            MobileQuery::Exact(key) => key.clone(),
            MobileQuery::Partial(digits) => format!("%{}%", digits),
        }
    }
}

/// Profile fields used to auto-fill (and lock) the name on the billing
/// screen for a returning customer.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct CustomerLookup {
    pub found: bool,
    pub name: Option<String>,
    pub tax_id: Option<String>,
    pub address: Option<String>,
}

impl CustomerLookup {
    pub fn not_found() -> Self {
        CustomerLookup::default()
    }
}

// =============================================================================
// Directory
// =============================================================================

/// One customer derived from document history.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct CustomerView {
    /// Normalized 10-digit key.
    pub mobile_key: String,
    /// Name from the most recent document.
    pub name: String,
    /// Mobile as typed on the most recent document.
    pub mobile: String,
    #[ts(as = "String")]
    pub last_purchase_at: DateTime<Utc>,
}

/// Groups invoices and quotations by normalized mobile.
///
/// Invoices are scanned before quotations. A later-scanned record replaces
/// the display name/mobile only when strictly newer, so on equal timestamps
/// the invoice wins. Records whose mobile does not normalize are skipped.
/// Output is newest first, ties ordered by key.
pub fn build_customer_directory(invoices: &[Document], quotations: &[Document]) -> Vec<CustomerView> {
    let mut by_key: HashMap<String, CustomerView> = HashMap::new();

    for doc in invoices.iter().chain(quotations.iter()) {
        let Some(key) = doc.mobile_key() else {
            continue;
        };

        match by_key.get_mut(&key) {
            Some(existing) => {
                if doc.created_at > existing.last_purchase_at {
                    existing.name = doc.customer_name.clone();
                    existing.mobile = doc.customer_mobile.clone();
                    existing.last_purchase_at = doc.created_at;
                }
            }
            None => {
                by_key.insert(
                    key.clone(),
                    CustomerView {
                        mobile_key: key,
                        name: doc.customer_name.clone(),
                        mobile: doc.customer_mobile.clone(),
                        last_purchase_at: doc.created_at,
                    },
                );
            }
        }
    }

    let mut customers: Vec<CustomerView> = by_key.into_values().collect();
    customers.sort_by(|a, b| {
        b.last_purchase_at
            .cmp(&a.last_purchase_at)
            .then_with(|| a.mobile_key.cmp(&b.mobile_key))
    });
    customers
}

/// True when `a` and `b` name the same customer (trimmed, case-insensitive).
pub fn same_customer_name(a: &str, b: &str) -> bool {
    a.trim().to_lowercase() == b.trim().to_lowercase()
}

// =============================================================================
// Unit Tests
// =============================================================================
