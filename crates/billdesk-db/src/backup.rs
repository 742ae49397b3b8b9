//! # Backup Snapshots
//!
//! Point-in-time export of the whole store, and a restore that replaces it.
//!
//! ## Restore Flow
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  BackupSnapshot (JSON file, written by the CLI)                        │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  version == "1.0" ?  ── no ──► IncompatibleBackup                      │
//! │       │ yes                                                             │
//! │       ▼                                                                 │
//! │  BEGIN                                                                 │
//! │  ├── DELETE items, invoices, quotations (+ their sqlite_sequence rows) │
//! │  ├── INSERT every record with its original id and created_at          │
//! │  └── customer_mobile_key recomputed from the stored mobile             │
//! │  COMMIT  (any failure rolls back, the old data stays)                  │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Where the snapshot is stored is up to the caller.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::SqlitePool;
use tracing::{debug, info};
use uuid::Uuid;

use crate::error::{DbError, DbResult};
use crate::repository::document::{self, DocumentRepository};
use crate::repository::item::{self, ItemRepository};
use billdesk_core::{Document, DocumentKind, Item};

/// Snapshot format written by this version.
pub const BACKUP_VERSION: &str = "1.0";

/// Everything needed to rebuild the store.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BackupSnapshot {
    pub backup_id: Uuid,
    pub taken_at: DateTime<Utc>,
    pub version: String,
    pub items: Vec<Item>,
    pub invoices: Vec<Document>,
    pub quotations: Vec<Document>,
}

impl BackupSnapshot {
    /// A snapshot with no records (restoring it empties the store).
    pub fn empty() -> Self {
        BackupSnapshot {
            backup_id: Uuid::new_v4(),
            taken_at: Utc::now(),
            version: BACKUP_VERSION.to_string(),
            items: Vec::new(),
            invoices: Vec::new(),
            quotations: Vec::new(),
        }
    }
}

/// Record counts written by a restore.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RestoreSummary {
    pub items: usize,
    pub invoices: usize,
    pub quotations: usize,
}

/// Export/restore over the whole database.
#[derive(Debug, Clone)]
pub struct BackupRepository {
    pool: SqlitePool,
}

impl BackupRepository {
    pub fn new(pool: SqlitePool) -> Self {
        BackupRepository { pool }
    }

    /// Reads all items, invoices and quotations.
    pub async fn export(&self) -> DbResult<BackupSnapshot> {
        let items = ItemRepository::new(self.pool.clone()).list_all().await?;
        let invoices = DocumentRepository::new(self.pool.clone(), DocumentKind::Invoice)
            .list()
            .await?;
        let quotations = DocumentRepository::new(self.pool.clone(), DocumentKind::Quotation)
            .list()
            .await?;

        let snapshot = BackupSnapshot {
            backup_id: Uuid::new_v4(),
            taken_at: Utc::now(),
            version: BACKUP_VERSION.to_string(),
            items,
            invoices,
            quotations,
        };

        info!(
            backup_id = %snapshot.backup_id,
            items = snapshot.items.len(),
            invoices = snapshot.invoices.len(),
            quotations = snapshot.quotations.len(),
            "Backup exported"
        );
        Ok(snapshot)
    }

    /// Replaces the store with `snapshot` in a single transaction.
    pub async fn restore(&self, snapshot: &BackupSnapshot) -> DbResult<RestoreSummary> {
        if snapshot.version != BACKUP_VERSION {
            return Err(DbError::IncompatibleBackup {
                found: snapshot.version.clone(),
                expected: BACKUP_VERSION.to_string(),
            });
        }

        info!(backup_id = %snapshot.backup_id, "Restoring backup");

        let mut tx = self
            .pool
            .begin()
            .await
            .map_err(|e| DbError::TransactionFailed(e.to_string()))?;

        for table in ["items", "invoices", "quotations"] {
            sqlx::query(&format!("DELETE FROM {}", table))
                .execute(&mut *tx)
                .await?;
        }
        sqlx::query("DELETE FROM sqlite_sequence WHERE name IN ('items', 'invoices', 'quotations')")
            .execute(&mut *tx)
            .await?;
        debug!("Existing records cleared");

        for record in &snapshot.items {
            item::insert_with_id(&mut *tx, record).await?;
        }
        for doc in &snapshot.invoices {
            document::insert_document(&mut *tx, DocumentKind::Invoice, doc, true).await?;
        }
        for doc in &snapshot.quotations {
            document::insert_document(&mut *tx, DocumentKind::Quotation, doc, true).await?;
        }

        tx.commit()
            .await
            .map_err(|e| DbError::TransactionFailed(e.to_string()))?;

        let summary = RestoreSummary {
            items: snapshot.items.len(),
            invoices: snapshot.invoices.len(),
            quotations: snapshot.quotations.len(),
        };
        info!(
            items = summary.items,
            invoices = summary.invoices,
            quotations = summary.quotations,
            "Backup restored"
        );
        Ok(summary)
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
