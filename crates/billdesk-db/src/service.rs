//! # Billing Service
//!
//! Composes the pure rules from `billdesk-core` with storage.
//!
//! ## Document Creation
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  NewDocument (from the billing screen / CLI JSON)                      │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  prepare_document()  ← trims, validates, recomputes totals,            │
//! │       │                 rejects claimed totals outside tolerance       │
//! │       ▼                                                                 │
//! │  mobile_key present?                                                   │
//! │       │ yes                                                             │
//! │       ▼                                                                 │
//! │  names_for_key(key) across invoices + quotations                       │
//! │       │                                                                 │
//! │       ├── none stored, or one equals the name (any case) → continue    │
//! │       └── otherwise → CustomerConflict naming the newest stored name   │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  INSERT (id and created_at assigned here)                              │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Quotation Conversion
//! One transaction: read the quotation, insert an invoice carrying the same
//! customer, lines and stored totals with a fresh id and timestamp, and
//! delete the quotation when the policy says so. No duplicate check runs.

use chrono::{DateTime, Utc};
use thiserror::Error;
use tracing::{debug, info, warn};

use crate::backup::{BackupSnapshot, RestoreSummary};
use crate::error::DbError;
use crate::pool::Database;
use crate::repository::document;
use billdesk_core::customer::{build_customer_directory, same_customer_name};
use billdesk_core::reporting::{self, DashboardSummary, MonthlySales, TopItem, YearlySales};
use billdesk_core::validation::{validate_item_input, validate_search_query};
use billdesk_core::{
    prepare_document, CoreError, CustomerLookup, CustomerView, Document, DocumentKind, Item,
    ItemInput, MobileQuery, Money, NewDocument, ValidationError, DEFAULT_TOTALS_TOLERANCE_PAISE,
};

// =============================================================================
// Configuration
// =============================================================================

/// What happens to a quotation once it has been converted.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum ConversionPolicy {
    /// The quotation stays listed next to its invoice.
    #[default]
    KeepQuotation,
    /// The quotation is removed in the same transaction.
    DeleteQuotation,
}

/// Service behavior switches.
#[derive(Debug, Clone)]
pub struct ServiceConfig {
    pub conversion_policy: ConversionPolicy,

    /// Largest accepted difference, per total field, between client-sent
    /// and recomputed totals.
    /// Default: 1 paisa
    pub totals_tolerance_paise: i64,
}

impl Default for ServiceConfig {
    fn default() -> Self {
        ServiceConfig {
            conversion_policy: ConversionPolicy::default(),
            totals_tolerance_paise: DEFAULT_TOTALS_TOLERANCE_PAISE,
        }
    }
}

impl ServiceConfig {
    pub fn conversion_policy(mut self, policy: ConversionPolicy) -> Self {
        self.conversion_policy = policy;
        self
    }

    pub fn totals_tolerance_paise(mut self, paise: i64) -> Self {
        self.totals_tolerance_paise = paise;
        self
    }
}

// =============================================================================
// Errors
// =============================================================================

/// Either a business rule or storage failed.
#[derive(Debug, Error)]
pub enum ServiceError {
    #[error(transparent)]
    Core(#[from] CoreError),

    #[error(transparent)]
    Db(#[from] DbError),
}

impl From<ValidationError> for ServiceError {
    fn from(err: ValidationError) -> Self {
        ServiceError::Core(CoreError::Validation(err))
    }
}

impl ServiceError {
    pub fn is_conflict(&self) -> bool {
        matches!(self, ServiceError::Core(CoreError::CustomerConflict { .. }))
    }

    pub fn is_not_found(&self) -> bool {
        matches!(
            self,
            ServiceError::Core(CoreError::DocumentNotFound { .. })
                | ServiceError::Core(CoreError::ItemNotFound(_))
                | ServiceError::Db(DbError::NotFound { .. })
        )
    }

    pub fn is_validation(&self) -> bool {
        matches!(self, ServiceError::Core(CoreError::Validation(_)))
    }
}

pub type ServiceResult<T> = Result<T, ServiceError>;

/// Maps item repository failures onto catalog errors.
fn item_error(err: DbError, id: Option<i64>) -> ServiceError {
    match (err, id) {
        (DbError::UniqueViolation { value, .. }, _) => ValidationError::Duplicate {
            field: "name".to_string(),
            value,
        }
        .into(),
        (DbError::NotFound { .. }, Some(id)) => CoreError::ItemNotFound(id).into(),
        (other, _) => other.into(),
    }
}

// =============================================================================
// Service
// =============================================================================

/// Entry point for every billing operation.
///
/// ## Example
/// ```rust,ignore
/// let db = Database::new(DbConfig::new("./billdesk.db")).await?;
/// let service = BillingService::new(db, ServiceConfig::default());
///
/// let invoice = service.create_document(&submission).await?;
/// let summary = service.dashboard(Utc::now()).await?;
/// ```
#[derive(Debug, Clone)]
pub struct BillingService {
    db: Database,
    config: ServiceConfig,
}

impl BillingService {
    pub fn new(db: Database, config: ServiceConfig) -> Self {
        BillingService { db, config }
    }

    // -------------------------------------------------------------------------
    // Catalog
    // -------------------------------------------------------------------------

    pub async fn create_item(&self, input: &ItemInput) -> ServiceResult<Item> {
        let prepared = validate_item_input(input)?;
        let item = self
            .db
            .items()
            .insert(&prepared)
            .await
            .map_err(|e| item_error(e, None))?;

        info!(id = item.id, name = %item.name, "Item created");
        Ok(item)
    }

    pub async fn update_item(&self, id: i64, input: &ItemInput) -> ServiceResult<Item> {
        let prepared = validate_item_input(input)?;
        let item = self
            .db
            .items()
            .update(id, &prepared)
            .await
            .map_err(|e| item_error(e, Some(id)))?;

        info!(id = id, name = %item.name, "Item updated");
        Ok(item)
    }

    /// Hard delete. Documents keep their line snapshots.
    pub async fn delete_item(&self, id: i64) -> ServiceResult<()> {
        self.db
            .items()
            .delete(id)
            .await
            .map_err(|e| item_error(e, Some(id)))?;

        info!(id = id, "Item deleted");
        Ok(())
    }

    pub async fn get_item(&self, id: i64) -> ServiceResult<Item> {
        self.db
            .items()
            .get_by_id(id)
            .await?
            .ok_or_else(|| CoreError::ItemNotFound(id).into())
    }

    /// Case-insensitive substring search; an empty query lists everything.
    pub async fn search_items(&self, query: &str) -> ServiceResult<Vec<Item>> {
        let query = validate_search_query(query)?;
        Ok(self.db.items().search(&query).await?)
    }

    // -------------------------------------------------------------------------
    // Documents
    // -------------------------------------------------------------------------

    /// Validates, checks the customer and stores a new invoice or quotation.
    ///
    /// ## Errors
    /// - `Validation` for blank customer fields, no lines, bad lines or
    ///   totals that disagree with the recomputation
    /// - `CustomerConflict` when the mobile belongs to another name
    pub async fn create_document(&self, submission: &NewDocument) -> ServiceResult<Document> {
        let prepared = prepare_document(submission, self.config.totals_tolerance_paise)?;

        if let Some(key) = &prepared.mobile_key {
            let names = self.db.customers().names_for_key(key).await?;
            if let Some(existing) = names.first() {
                if !names
                    .iter()
                    .any(|name| same_customer_name(name, &prepared.customer_name))
                {
                    warn!(
                        mobile = %key,
                        existing = %existing,
                        submitted = %prepared.customer_name,
                        "Rejected document for a mobile registered to another customer"
                    );
                    return Err(CoreError::CustomerConflict {
                        existing_name: existing.clone(),
                        mobile: key.clone(),
                    }
                    .into());
                }
            }
        } else {
            debug!(mobile = %prepared.customer_mobile, "Mobile does not normalize, skipping customer check");
        }

        let doc = self.db.documents(prepared.kind).insert(prepared).await?;

        info!(
            kind = doc.kind.as_str(),
            id = doc.id,
            total = %doc.total(),
            "Document created"
        );
        Ok(doc)
    }

    pub async fn get_document(&self, kind: DocumentKind, id: i64) -> ServiceResult<Document> {
        self.db
            .documents(kind)
            .get(id)
            .await?
            .ok_or_else(|| CoreError::DocumentNotFound { kind, id }.into())
    }

    /// All documents of `kind`, newest first.
    pub async fn list_documents(&self, kind: DocumentKind) -> ServiceResult<Vec<Document>> {
        Ok(self.db.documents(kind).list().await?)
    }

    /// Converts a quotation using the configured policy.
    pub async fn convert_quotation(&self, id: i64) -> ServiceResult<Document> {
        self.convert_quotation_with(id, self.config.conversion_policy)
            .await
    }

    /// Converts a quotation into a new invoice.
    ///
    /// The invoice's subtotal, cgst, sgst, discount and total are the
    /// quotation's stored values, unchanged.
    pub async fn convert_quotation_with(
        &self,
        id: i64,
        policy: ConversionPolicy,
    ) -> ServiceResult<Document> {
        let mut tx = self
            .db
            .pool()
            .begin()
            .await
            .map_err(|e| DbError::TransactionFailed(e.to_string()))?;

        let quotation = document::fetch_document(&mut *tx, DocumentKind::Quotation, id)
            .await?
            .ok_or(CoreError::DocumentNotFound {
                kind: DocumentKind::Quotation,
                id,
            })?;

        let draft = Document {
            id: 0,
            kind: DocumentKind::Invoice,
            created_at: Utc::now(),
            ..quotation
        };
        let invoice = document::insert_document(&mut *tx, DocumentKind::Invoice, &draft, false).await?;

        if policy == ConversionPolicy::DeleteQuotation {
            document::delete_document(&mut *tx, DocumentKind::Quotation, id).await?;
        }

        tx.commit()
            .await
            .map_err(|e| DbError::TransactionFailed(e.to_string()))?;

        info!(
            quotation_id = id,
            invoice_id = invoice.id,
            policy = ?policy,
            "Quotation converted"
        );
        Ok(invoice)
    }

    /// Hard-deletes a quotation. Invoices cannot be deleted.
    pub async fn delete_quotation(&self, id: i64) -> ServiceResult<()> {
        match self.db.quotations().delete(id).await {
            Ok(()) => {
                info!(id = id, "Quotation deleted");
                Ok(())
            }
            Err(DbError::NotFound { .. }) => Err(CoreError::DocumentNotFound {
                kind: DocumentKind::Quotation,
                id,
            }
            .into()),
            Err(e) => Err(e.into()),
        }
    }

    // -------------------------------------------------------------------------
    // Customers
    // -------------------------------------------------------------------------

    /// Auto-fill lookup for the billing screen.
    ///
    /// Input shorter than six characters, or with no usable digits, is
    /// reported as not found without querying.
    pub async fn search_customer_by_mobile(&self, raw: &str) -> ServiceResult<CustomerLookup> {
        match MobileQuery::parse(raw) {
            Some(query) => Ok(self.db.customers().lookup(&query).await?),
            None => {
                debug!(input = %raw, "Mobile search input too short or not numeric");
                Ok(CustomerLookup::not_found())
            }
        }
    }

    /// Customers derived from every stored invoice and quotation.
    pub async fn customer_directory(&self) -> ServiceResult<Vec<CustomerView>> {
        let invoices = self.db.invoices().list().await?;
        let quotations = self.db.quotations().list().await?;
        Ok(build_customer_directory(&invoices, &quotations))
    }

    // -------------------------------------------------------------------------
    // Reporting (invoices only)
    // -------------------------------------------------------------------------

    /// Reads only the current month's invoices.
    pub async fn monthly_total(&self, now: DateTime<Utc>) -> ServiceResult<Money> {
        let repo = self.db.invoices();
        let invoices = match reporting::month_bounds(now) {
            Some((from, to)) => repo.list_between(from, to).await?,
            None => repo.list().await?,
        };
        Ok(reporting::monthly_total(&invoices, now))
    }

    pub async fn monthly_sales(&self, months: u32, now: DateTime<Utc>) -> ServiceResult<Vec<MonthlySales>> {
        let invoices = self.db.invoices().list().await?;
        Ok(reporting::monthly_sales(&invoices, months, now))
    }

    pub async fn yearly_sales(&self, years: u32, now: DateTime<Utc>) -> ServiceResult<Vec<YearlySales>> {
        let invoices = self.db.invoices().list().await?;
        Ok(reporting::yearly_sales(&invoices, years, now))
    }

    pub async fn top_items(&self, limit: usize) -> ServiceResult<Vec<TopItem>> {
        let invoices = self.db.invoices().list().await?;
        Ok(reporting::top_items(&invoices, limit))
    }

    /// Everything the `report` command prints, from one scan.
    pub async fn dashboard(&self, now: DateTime<Utc>) -> ServiceResult<DashboardSummary> {
        let invoices = self.db.invoices().list().await?;
        Ok(DashboardSummary::build(&invoices, now))
    }

    // -------------------------------------------------------------------------
    // Backup
    // -------------------------------------------------------------------------

    pub async fn export_backup(&self) -> ServiceResult<BackupSnapshot> {
        Ok(self.db.backups().export().await?)
    }

    /// Replaces all stored data with `snapshot`.
    pub async fn restore_backup(&self, snapshot: &BackupSnapshot) -> ServiceResult<RestoreSummary> {
        Ok(self.db.backups().restore(snapshot).await?)
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
