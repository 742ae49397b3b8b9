//! # Document Repository
//!
//! Database operations for invoices and quotations.
//!
//! ## Document Lifecycle
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                       Document Lifecycle                                │
//! │                                                                         │
//! │  1. CREATE                                                              │
//! │     └── insert() → id + created_at assigned here, never changed        │
//! │                                                                         │
//! │  2. READ                                                                │
//! │     └── get() / list()  (newest first)                                 │
//! │                                                                         │
//! │  3. QUOTATIONS ONLY                                                     │
//! │     ├── convert → copy into invoices (service, one transaction)        │
//! │     └── delete() → hard delete                                         │
//! │                                                                         │
//! │  Invoices are terminal: no update, no delete.                          │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Both tables share one column layout. Line items live in the `items`
//! column as a JSON array; `customer_mobile_key` is derived from the mobile
//! on every insert.

use chrono::{DateTime, Utc};
use sqlx::{FromRow, SqliteConnection, SqlitePool};
use tracing::debug;

use crate::error::{DbError, DbResult};
use billdesk_core::{Document, DocumentKind, LineItem, PreparedDocument};

const DOCUMENT_COLUMNS: &str = "id, customer_name, customer_mobile, customer_tax_id, \
     customer_address, items, subtotal_paise, cgst_paise, sgst_paise, discount_paise, \
     total_paise, created_at";

/// Table holding documents of `kind`.
pub(crate) const fn table(kind: DocumentKind) -> &'static str {
    match kind {
        DocumentKind::Invoice => "invoices",
        DocumentKind::Quotation => "quotations",
    }
}

/// One row of `invoices` or `quotations`.
#[derive(Debug, FromRow)]
struct DocumentRow {
    id: i64,
    customer_name: String,
    customer_mobile: String,
    customer_tax_id: Option<String>,
    customer_address: Option<String>,
    items: String,
    subtotal_paise: i64,
    cgst_paise: i64,
    sgst_paise: i64,
    discount_paise: i64,
    total_paise: i64,
    created_at: DateTime<Utc>,
}

impl DocumentRow {
    fn into_document(self, kind: DocumentKind) -> DbResult<Document> {
        let lines: Vec<LineItem> = serde_json::from_str(&self.items)
            .map_err(|e| DbError::corrupt(table(kind), self.id, e))?;

        Ok(Document {
            id: self.id,
            kind,
            customer_name: self.customer_name,
            customer_mobile: self.customer_mobile,
            customer_tax_id: self.customer_tax_id,
            customer_address: self.customer_address,
            lines,
            subtotal_paise: self.subtotal_paise,
            cgst_paise: self.cgst_paise,
            sgst_paise: self.sgst_paise,
            discount_paise: self.discount_paise,
            total_paise: self.total_paise,
            created_at: self.created_at,
        })
    }
}

/// Repository for one document table.
#[derive(Debug, Clone)]
pub struct DocumentRepository {
    pool: SqlitePool,
    kind: DocumentKind,
}

impl DocumentRepository {
    pub fn new(pool: SqlitePool, kind: DocumentKind) -> Self {
        DocumentRepository { pool, kind }
    }

    /// Inserts a validated document and returns the stored record.
    pub async fn insert(&self, prepared: PreparedDocument) -> DbResult<Document> {
        let doc = prepared.into_document(0, Utc::now());
        let mut conn = self.pool.acquire().await?;
        insert_document(&mut conn, self.kind, &doc, false).await
    }

    /// Gets a document by id.
    pub async fn get(&self, id: i64) -> DbResult<Option<Document>> {
        let mut conn = self.pool.acquire().await?;
        fetch_document(&mut conn, self.kind, id).await
    }

    /// All documents, newest first.
    pub async fn list(&self) -> DbResult<Vec<Document>> {
        let sql = format!(
            "SELECT {} FROM {} ORDER BY created_at DESC, id DESC",
            DOCUMENT_COLUMNS,
            table(self.kind)
        );

        let rows = sqlx::query_as::<_, DocumentRow>(&sql)
            .fetch_all(&self.pool)
            .await?;

        debug!(kind = self.kind.as_str(), count = rows.len(), "Listed documents");
        rows.into_iter().map(|r| r.into_document(self.kind)).collect()
    }

    /// Documents created in `[from, to)`, oldest first.
    pub async fn list_between(&self, from: DateTime<Utc>, to: DateTime<Utc>) -> DbResult<Vec<Document>> {
        let sql = format!(
            "SELECT {} FROM {} WHERE created_at >= ?1 AND created_at < ?2 ORDER BY created_at, id",
            DOCUMENT_COLUMNS,
            table(self.kind)
        );

        let rows = sqlx::query_as::<_, DocumentRow>(&sql)
            .bind(from)
            .bind(to)
            .fetch_all(&self.pool)
            .await?;

        rows.into_iter().map(|r| r.into_document(self.kind)).collect()
    }

    /// Hard-deletes a document.
    pub async fn delete(&self, id: i64) -> DbResult<()> {
        let mut conn = self.pool.acquire().await?;
        if !delete_document(&mut conn, self.kind, id).await? {
            return Err(DbError::not_found(self.kind.to_string(), id));
        }
        Ok(())
    }

    pub async fn count(&self) -> DbResult<i64> {
        let sql = format!("SELECT COUNT(*) FROM {}", table(self.kind));
        let count: i64 = sqlx::query_scalar(&sql).fetch_one(&self.pool).await?;
        Ok(count)
    }
}

// =============================================================================
// Connection-level helpers (used inside transactions)
// =============================================================================

/// Inserts `doc` into the table for `kind`.
///
/// With `keep_id` the record's own id is written (backup restore); otherwise
/// SQLite assigns one. Returns the record as stored.
pub(crate) async fn insert_document(
    conn: &mut SqliteConnection,
    kind: DocumentKind,
    doc: &Document,
    keep_id: bool,
) -> DbResult<Document> {
    let items = serde_json::to_string(&doc.lines).map_err(|e| DbError::Internal(e.to_string()))?;
    let mobile_key = doc.mobile_key();

    debug!(
        kind = kind.as_str(),
        customer = %doc.customer_name,
        lines = doc.lines.len(),
        "Inserting document"
    );

    let sql = format!(
        r#"
        INSERT INTO {} (
            id, customer_name, customer_mobile, customer_mobile_key,
            customer_tax_id, customer_address, items,
            subtotal_paise, cgst_paise, sgst_paise, discount_paise, total_paise,
            created_at
        ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13)
        "#,
        table(kind)
    );

    let id = sqlx::query(&sql)
        .bind(if keep_id { Some(doc.id) } else { None })
        .bind(&doc.customer_name)
        .bind(&doc.customer_mobile)
        .bind(mobile_key)
        .bind(&doc.customer_tax_id)
        .bind(&doc.customer_address)
        .bind(items)
        .bind(doc.subtotal_paise)
        .bind(doc.cgst_paise)
        .bind(doc.sgst_paise)
        .bind(doc.discount_paise)
        .bind(doc.total_paise)
        .bind(doc.created_at)
        .execute(&mut *conn)
        .await?
        .last_insert_rowid();

    Ok(Document {
        id,
        kind,
        ..doc.clone()
    })
}

pub(crate) async fn fetch_document(
    conn: &mut SqliteConnection,
    kind: DocumentKind,
    id: i64,
) -> DbResult<Option<Document>> {
    let sql = format!("SELECT {} FROM {} WHERE id = ?1", DOCUMENT_COLUMNS, table(kind));

    let row = sqlx::query_as::<_, DocumentRow>(&sql)
        .bind(id)
        .fetch_optional(&mut *conn)
        .await?;

    row.map(|r| r.into_document(kind)).transpose()
}

/// Returns whether a row was deleted.
pub(crate) async fn delete_document(
    conn: &mut SqliteConnection,
    kind: DocumentKind,
    id: i64,
) -> DbResult<bool> {
    let sql = format!("DELETE FROM {} WHERE id = ?1", table(kind));
    let result = sqlx::query(&sql).bind(id).execute(&mut *conn).await?;
    Ok(result.rows_affected() > 0)
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{Database, DbConfig};
    use billdesk_core::{prepare_document, NewDocument};

    fn submission(kind: DocumentKind, name: &str, mobile: &str) -> PreparedDocument {
        prepare_document(
            &NewDocument {
                kind,
                customer_name: name.to_string(),
                customer_mobile: mobile.to_string(),
                customer_tax_id: Some("29ABCDE1234F1Z5".to_string()),
                customer_address: None,
                lines: vec![LineItem {
                    item_id: 1,
                    name: "Cotton Bedsheet Set".to_string(),
                    price_paise: 80_000,
                    gst_rate_bps: 1800,
                    quantity: 2,
                    discount_per_unit_paise: None,
                    mrp_paise: Some(100_000),
                    discount_bps: Some(2000),
                }],
                discount_paise: 0,
                claimed_totals: None,
            },
            1,
        )
        .unwrap()
    }

    #[tokio::test]
    async fn test_insert_get_round_trip() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        let invoices = db.invoices();

        let created = invoices
            .insert(submission(DocumentKind::Invoice, "Alice", "+91 98765-43210"))
            .await
            .unwrap();
        let fetched = invoices.get(created.id).await.unwrap().unwrap();

        assert_eq!(fetched.kind, DocumentKind::Invoice);
        assert_eq!(fetched.customer_mobile, "+91 98765-43210");
        assert_eq!(fetched.customer_tax_id.as_deref(), Some("29ABCDE1234F1Z5"));
        assert_eq!(fetched.lines, created.lines);
        assert_eq!(fetched.totals(), fetched.recompute_totals());
        assert_eq!(fetched.cgst_paise, 14_400);

        let key: Option<String> =
            sqlx::query_scalar("SELECT customer_mobile_key FROM invoices WHERE id = ?1")
                .bind(created.id)
                .fetch_one(db.pool())
                .await
                .unwrap();
        assert_eq!(key.as_deref(), Some("9876543210"));
    }

    #[tokio::test]
    async fn test_tables_are_separate() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        let quote = db
            .quotations()
            .insert(submission(DocumentKind::Quotation, "Ravi", "9988776655"))
            .await
            .unwrap();

        assert!(db.invoices().get(quote.id).await.unwrap().is_none());
        assert_eq!(db.quotations().count().await.unwrap(), 1);
        assert_eq!(db.invoices().count().await.unwrap(), 0);
    }

    #[tokio::test]
    async fn test_list_newest_first() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        let invoices = db.invoices();

        let first = invoices.insert(submission(DocumentKind::Invoice, "A", "9000000001")).await.unwrap();
        let second = invoices.insert(submission(DocumentKind::Invoice, "B", "9000000002")).await.unwrap();

        let ids: Vec<i64> = invoices.list().await.unwrap().iter().map(|d| d.id).collect();
        assert_eq!(ids, vec![second.id, first.id]);
    }

    #[tokio::test]
    async fn test_list_between_is_half_open() {
        use chrono::TimeZone;

        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        let invoices = db.invoices();
        let at = |m: u32, d: u32| Utc.with_ymd_and_hms(2026, m, d, 0, 0, 0).unwrap();

        let mut conn = db.pool().acquire().await.unwrap();
        for (name, ts) in [("Feb", at(2, 28)), ("Mar1", at(3, 1)), ("Mar31", at(3, 31)), ("Apr", at(4, 1))] {
            let doc = submission(DocumentKind::Invoice, name, "9000000001").into_document(0, ts);
            insert_document(&mut conn, DocumentKind::Invoice, &doc, false).await.unwrap();
        }
        drop(conn);

        let march = invoices.list_between(at(3, 1), at(4, 1)).await.unwrap();
        let names: Vec<&str> = march.iter().map(|d| d.customer_name.as_str()).collect();
        assert_eq!(names, vec!["Mar1", "Mar31"]);
    }

    #[tokio::test]
    async fn test_delete_missing_is_not_found() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        let quotations = db.quotations();
        let quote = quotations
            .insert(submission(DocumentKind::Quotation, "Ravi", "9988776655"))
            .await
            .unwrap();

        quotations.delete(quote.id).await.unwrap();
        assert!(matches!(
            quotations.delete(quote.id).await,
            Err(DbError::NotFound { .. })
        ));
    }

    #[tokio::test]
    async fn test_malformed_items_reported_as_corrupt() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        sqlx::query(
            "INSERT INTO invoices (customer_name, customer_mobile, items, subtotal_paise, cgst_paise, sgst_paise, total_paise, created_at) \
             VALUES ('X', '1', 'not json', 0, 0, 0, 0, '2026-01-01T00:00:00+00:00')",
        )
        .execute(db.pool())
        .await
        .unwrap();

        assert!(matches!(
            db.invoices().list().await,
            Err(DbError::CorruptRecord { .. })
        ));
    }
}
