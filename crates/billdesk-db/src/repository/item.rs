//! # Item Repository
//!
//! Database operations for catalog items.
//!
//! ## Catalog Search
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  Billing screen types: "sheet"                                          │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  name LIKE '%sheet%'   (SQLite LIKE is case-insensitive for ASCII)     │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  ┌─────────────────────────────────────────┐                           │
//! │  │ 1 | Cotton Bedsheet Set (King Size)     │ ← match                   │
//! │  │ 2 | Premium Duvet Cover (Queen)         │                           │
//! │  │ 7 | Bedsheet Combo                      │ ← match                   │
//! │  └─────────────────────────────────────────┘                           │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  Results ordered by id: [1, 7]                                         │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use chrono::{DateTime, Utc};
use sqlx::{SqliteConnection, SqlitePool};
use tracing::debug;

use crate::error::{DbError, DbResult};
use billdesk_core::validation::PreparedItem;
use billdesk_core::Item;

const ITEM_COLUMNS: &str = "id, name, gst_rate_bps, mrp_paise, discount_bps, price_paise, created_at";

/// Repository for catalog item operations.
#[derive(Debug, Clone)]
pub struct ItemRepository {
    pool: SqlitePool,
}

impl ItemRepository {
    pub fn new(pool: SqlitePool) -> Self {
        ItemRepository { pool }
    }

    /// Case-insensitive substring search over item names.
    ///
    /// An empty query lists the whole catalog. `%` and `_` in the query
    /// match literally.
    pub async fn search(&self, query: &str) -> DbResult<Vec<Item>> {
        let query = query.trim();
        debug!(query = %query, "Searching items");

        if query.is_empty() {
            return self.list_all().await;
        }

        let pattern = format!("%{}%", escape_like(query));
        let sql = format!(
            "SELECT {} FROM items WHERE name LIKE ?1 ESCAPE '\\' ORDER BY id",
            ITEM_COLUMNS
        );

        let items = sqlx::query_as::<_, Item>(&sql)
            .bind(pattern)
            .fetch_all(&self.pool)
            .await?;

        debug!(count = items.len(), "Search returned items");
        Ok(items)
    }

    /// Lists every item ordered by id.
    pub async fn list_all(&self) -> DbResult<Vec<Item>> {
        let sql = format!("SELECT {} FROM items ORDER BY id", ITEM_COLUMNS);
        let items = sqlx::query_as::<_, Item>(&sql)
            .fetch_all(&self.pool)
            .await?;
        Ok(items)
    }

    /// Gets an item by its ID.
    pub async fn get_by_id(&self, id: i64) -> DbResult<Option<Item>> {
        let sql = format!("SELECT {} FROM items WHERE id = ?1", ITEM_COLUMNS);
        let item = sqlx::query_as::<_, Item>(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(item)
    }

    /// Inserts a new item and returns it with its assigned id.
    ///
    /// ## Returns
    /// * `Err(DbError::UniqueViolation)` - name already exists (any case)
    pub async fn insert(&self, item: &PreparedItem) -> DbResult<Item> {
        debug!(name = %item.name, "Inserting item");

        let now = Utc::now();
        let id = sqlx::query(
            r#"
            INSERT INTO items (name, gst_rate_bps, mrp_paise, discount_bps, price_paise, created_at)
            VALUES (?1, ?2, ?3, ?4, ?5, ?6)
            "#,
        )
        .bind(&item.name)
        .bind(item.gst_rate.bps())
        .bind(item.mrp.map(|m| m.paise()))
        .bind(item.discount_bps)
        .bind(item.price.paise())
        .bind(now)
        .execute(&self.pool)
        .await
        .map_err(|e| name_clash(e, &item.name))?
        .last_insert_rowid();

        Ok(to_item(id, item, now))
    }

    /// Replaces an item's fields. `created_at` is kept.
    pub async fn update(&self, id: i64, item: &PreparedItem) -> DbResult<Item> {
        debug!(id = id, name = %item.name, "Updating item");

        let result = sqlx::query(
            r#"
            UPDATE items SET
                name = ?2,
                gst_rate_bps = ?3,
                mrp_paise = ?4,
                discount_bps = ?5,
                price_paise = ?6
            WHERE id = ?1
            "#,
        )
        .bind(id)
        .bind(&item.name)
        .bind(item.gst_rate.bps())
        .bind(item.mrp.map(|m| m.paise()))
        .bind(item.discount_bps)
        .bind(item.price.paise())
        .execute(&self.pool)
        .await
        .map_err(|e| name_clash(e, &item.name))?;

        if result.rows_affected() == 0 {
            return Err(DbError::not_found("Item", id));
        }

        self.get_by_id(id)
            .await?
            .ok_or_else(|| DbError::not_found("Item", id))
    }

    /// Hard-deletes an item.
    ///
    /// Existing documents keep their line snapshots.
    pub async fn delete(&self, id: i64) -> DbResult<()> {
        debug!(id = id, "Deleting item");

        let result = sqlx::query("DELETE FROM items WHERE id = ?1")
            .bind(id)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(DbError::not_found("Item", id));
        }

        Ok(())
    }

    /// Counts catalog items (for diagnostics).
    pub async fn count(&self) -> DbResult<i64> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM items")
            .fetch_one(&self.pool)
            .await?;
        Ok(count)
    }
}

// =============================================================================
// Connection-level helpers (used inside transactions)
// =============================================================================

/// Inserts an item keeping its id and timestamp (backup restore).
pub(crate) async fn insert_with_id(conn: &mut SqliteConnection, item: &Item) -> DbResult<()> {
    sqlx::query(
        r#"
        INSERT INTO items (id, name, gst_rate_bps, mrp_paise, discount_bps, price_paise, created_at)
        VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)
        "#,
    )
    .bind(item.id)
    .bind(&item.name)
    .bind(item.gst_rate_bps)
    .bind(item.mrp_paise)
    .bind(item.discount_bps)
    .bind(item.price_paise)
    .bind(item.created_at)
    .execute(&mut *conn)
    .await
    .map_err(|e| name_clash(e, &item.name))?;

    Ok(())
}

/// Escapes `\`, `%` and `_` for a `LIKE … ESCAPE '\'` pattern.
fn escape_like(input: &str) -> String {
    let mut out = String::with_capacity(input.len());
    for c in input.chars() {
        if matches!(c, '\\' | '%' | '_') {
            out.push('\\');
        }
        out.push(c);
    }
    out
}

fn name_clash(err: sqlx::Error, name: &str) -> DbError {
    match DbError::from(err) {
        DbError::UniqueViolation { field, .. } => DbError::duplicate(field, name),
        other => other,
    }
}

fn to_item(id: i64, item: &PreparedItem, created_at: DateTime<Utc>) -> Item {
    Item {
        id,
        name: item.name.clone(),
        gst_rate_bps: item.gst_rate.bps(),
        mrp_paise: item.mrp.map(|m| m.paise()),
        discount_bps: item.discount_bps,
        price_paise: item.price.paise(),
        created_at,
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{Database, DbConfig};
    use billdesk_core::validation::validate_item_input;
    use billdesk_core::ItemInput;

    fn prepared(name: &str, mrp: i64) -> PreparedItem {
        validate_item_input(&ItemInput {
            name: name.to_string(),
            gst_rate_bps: 1800,
            mrp_paise: Some(mrp),
            discount_bps: Some(1000),
            price_paise: None,
        })
        .unwrap()
    }

    async fn repo() -> ItemRepository {
        Database::new(DbConfig::in_memory()).await.unwrap().items()
    }

    #[tokio::test]
    async fn test_insert_and_get() {
        let items = repo().await;
        let created = items.insert(&prepared("Cotton Bedsheet Set", 250_000)).await.unwrap();

        assert!(created.id > 0);
        assert_eq!(created.price_paise, 225_000);

        let fetched = items.get_by_id(created.id).await.unwrap().unwrap();
        assert_eq!(fetched.name, "Cotton Bedsheet Set");
        assert_eq!(fetched.mrp_paise, Some(250_000));
        assert_eq!(fetched.discount_bps, Some(1000));
        assert_eq!(fetched.price_paise, 225_000);

        assert!(items.get_by_id(9_999).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_names_are_unique_case_insensitively() {
        let items = repo().await;
        items.insert(&prepared("Bath Mat Set", 75_000)).await.unwrap();

        let err = items.insert(&prepared("BATH MAT SET", 80_000)).await.unwrap_err();
        match err {
            DbError::UniqueViolation { value, .. } => assert_eq!(value, "BATH MAT SET"),
            other => panic!("expected unique violation, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_search_is_case_insensitive_substring_by_id() {
        let items = repo().await;
        items.insert(&prepared("Cotton Bedsheet Set (King Size)", 250_000)).await.unwrap();
        items.insert(&prepared("Premium Duvet Cover (Queen)", 180_000)).await.unwrap();
        items.insert(&prepared("Bedsheet Combo", 150_000)).await.unwrap();
        items.insert(&prepared("100% Cotton Towel", 50_000)).await.unwrap();

        let found = items.search("  SHEET ").await.unwrap();
        let names: Vec<&str> = found.iter().map(|i| i.name.as_str()).collect();
        assert_eq!(names, vec!["Cotton Bedsheet Set (King Size)", "Bedsheet Combo"]);

        assert_eq!(items.search("").await.unwrap().len(), 4);
        assert_eq!(items.search("%").await.unwrap().len(), 1);
        assert!(items.search("blanket").await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_update_and_delete() {
        let items = repo().await;
        let created = items.insert(&prepared("Bed Runner", 85_000)).await.unwrap();
        let created = items.get_by_id(created.id).await.unwrap().unwrap();

        let updated = items.update(created.id, &prepared("Bed Runner (Queen)", 90_000)).await.unwrap();
        assert_eq!(updated.name, "Bed Runner (Queen)");
        assert_eq!(updated.price_paise, 81_000);
        assert_eq!(updated.created_at, created.created_at);

        items.delete(created.id).await.unwrap();
        assert!(matches!(items.delete(created.id).await, Err(DbError::NotFound { .. })));
        assert!(matches!(
            items.update(created.id, &prepared("Ghost", 1)).await,
            Err(DbError::NotFound { .. })
        ));
        assert_eq!(items.count().await.unwrap(), 0);
    }

    #[test]
    fn test_escape_like() {
        assert_eq!(escape_like("100%_a\\b"), "100\\%\\_a\\\\b");
        assert_eq!(escape_like("sheet"), "sheet");
    }
}
