//! # billdesk-db: Database Layer for Billdesk
//!
//! SQLite storage for the catalog, invoices and quotations, plus the
//! `BillingService` that applies the `billdesk-core` rules on top of it.
//!
//! ## Architecture Position
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                        Billdesk Data Flow                               │
//! │                                                                         │
//! │  CLI command (billdesk create invoice.json)                            │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │                   billdesk-db (THIS CRATE)                      │   │
//! │  │                                                                 │   │
//! │  │   ┌───────────────┐    ┌───────────────┐    ┌──────────────┐  │   │
//! │  │   │BillingService │    │  Repositories │    │  Migrations  │  │   │
//! │  │   │ (service.rs)  │───►│ ItemRepo      │    │  (embedded)  │  │   │
//! │  │   │               │    │ DocumentRepo  │    │ 001_initial  │  │   │
//! │  │   │ core rules    │    │ CustomerRepo  │    │              │  │   │
//! │  │   │ + storage     │    │ BackupRepo    │    │              │  │   │
//! │  │   └───────────────┘    └───────┬───────┘    └──────────────┘  │   │
//! │  │                                │                               │   │
//! │  │                        Database (pool.rs)                       │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │  SQLite file (BILLDESK_DB_PATH, default ./billdesk.db)          │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Module Organization
//!
//! - [`pool`] - Connection pool creation and configuration
//! - [`migrations`] - Embedded database migrations
//! - [`error`] - Database error types
//! - [`repository`] - Item, document and customer queries
//! - [`backup`] - Whole-store snapshot export and restore
//! - [`service`] - Billing operations (validation, customer check, conversion)
//!
//! ## Usage
//!
//! ```rust,ignore
//! use billdesk_db::{BillingService, Database, DbConfig, ServiceConfig};
//!
//! let db = Database::new(DbConfig::new("./billdesk.db")).await?;
//! let service = BillingService::new(db, ServiceConfig::default());
//!
//! let towels = service.search_items("towel").await?;
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod backup;
pub mod error;
pub mod migrations;
pub mod pool;
pub mod repository;
pub mod service;

// =============================================================================
// Re-exports
// =============================================================================

pub use backup::{BackupRepository, BackupSnapshot, RestoreSummary, BACKUP_VERSION};
pub use error::{DbError, DbResult};
pub use pool::{Database, DbConfig};
pub use service::{BillingService, ConversionPolicy, ServiceConfig, ServiceError, ServiceResult};

// Repository re-exports for convenience
pub use repository::customer::CustomerRepository;
pub use repository::document::DocumentRepository;
pub use repository::item::ItemRepository;
