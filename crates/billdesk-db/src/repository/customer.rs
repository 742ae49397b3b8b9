//! # Customer Queries
//!
//! Customers have no table of their own. These queries read the
//! `customer_mobile_key` column of both document tables.
//!
//! ```text
//! invoices.customer_mobile_key ──┐
//!                                ├── UNION ALL ── newest first, invoices win ties
//! quotations.customer_mobile_key ┘
//! ```

use sqlx::{FromRow, SqlitePool};
use tracing::debug;

use crate::error::DbResult;
use billdesk_core::{CustomerLookup, MobileQuery};

/// Shared ordering for both tables: newest first, invoices before
/// quotations on equal timestamps.
const NEWEST_FIRST: &str = "ORDER BY created_at DESC, source_rank ASC, id DESC";

#[derive(Debug, FromRow)]
struct ProfileRow {
    customer_name: String,
    customer_tax_id: Option<String>,
    customer_address: Option<String>,
}

/// Cross-table customer queries.
#[derive(Debug, Clone)]
pub struct CustomerRepository {
    pool: SqlitePool,
}

impl CustomerRepository {
    pub fn new(pool: SqlitePool) -> Self {
        CustomerRepository { pool }
    }

    /// Every stored customer name for a mobile key, newest first.
    pub async fn names_for_key(&self, key: &str) -> DbResult<Vec<String>> {
        let sql = format!(
            r#"
            SELECT customer_name, created_at, 0 AS source_rank, id
            FROM invoices WHERE customer_mobile_key = ?1
            UNION ALL
            SELECT customer_name, created_at, 1 AS source_rank, id
            FROM quotations WHERE customer_mobile_key = ?1
            {}
            "#,
            NEWEST_FIRST
        );

        let names: Vec<String> = sqlx::query_scalar(&sql)
            .bind(key)
            .fetch_all(&self.pool)
            .await?;

        debug!(key = %key, count = names.len(), "Loaded names for mobile key");
        Ok(names)
    }

    /// Profile of the most recent invoice or quotation matching `query`.
    pub async fn lookup(&self, query: &MobileQuery) -> DbResult<CustomerLookup> {
        let (condition, value) = match query {
            MobileQuery::Exact(key) => ("customer_mobile_key = ?1", key.clone()),
            MobileQuery::Partial(_) => ("customer_mobile_key LIKE ?1", query.like_pattern()),
        };

        let sql = format!(
            r#"
            SELECT customer_name, customer_tax_id, customer_address,
                   created_at, 0 AS source_rank, id
            FROM invoices WHERE {cond}
            UNION ALL
            SELECT customer_name, customer_tax_id, customer_address,
                   created_at, 1 AS source_rank, id
            FROM quotations WHERE {cond}
            {order}
            LIMIT 1
            "#,
            cond = condition,
            order = NEWEST_FIRST
        );

        let row = sqlx::query_as::<_, ProfileRow>(&sql)
            .bind(value)
            .fetch_optional(&self.pool)
            .await?;

        Ok(match row {
            Some(row) => CustomerLookup {
                found: true,
                name: Some(row.customer_name),
                tax_id: row.customer_tax_id,
                address: row.customer_address,
            },
            None => CustomerLookup::not_found(),
        })
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
