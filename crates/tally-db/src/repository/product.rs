//! # Product Repository
//!
//! Database operations for products.
//!
//! ## Key Operations
//! - CRUD keyed by product code
//! - Batch lookup by code (checkout snapshots)
//! - Discount rules attached on read, largest bundle first
//!
//! ## Read Path
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    Loading Products With Rules                          │
//! │                                                                         │
//! │  get_many_by_codes(["A", "B", "Z"])                                    │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  SELECT ... FROM products WHERE code IN (?, ?, ?)      → rows A, B     │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  SELECT ... FROM discount_rules WHERE product_id IN (..)               │
//! │            ORDER BY quantity DESC                       → rules by id  │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  [Product A {discounts: [3 for 130]}, Product B {discounts: [2 for 45]}]│
//! │                                                                         │
//! │  Two queries in one read transaction ("Z" simply has no row)           │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use std::collections::HashMap;

use chrono::{DateTime, Utc};
use sqlx::{FromRow, QueryBuilder, Sqlite, SqliteConnection, SqlitePool};
use tracing::debug;
use uuid::Uuid;

use crate::error::{DbError, DbResult};
use crate::repository::discount;
use tally_core::{DiscountRule, Money, Product, ProductDraft};

/// Codes bound per `IN (..)` query.
const LOOKUP_CHUNK: usize = 500;

/// Row shape of the `products` table.
#[derive(Debug, FromRow)]
struct ProductRow {
    id: String,
    code: String,
    name: String,
    unit_price_cents: i64,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl ProductRow {
    fn into_product(self, discounts: Vec<DiscountRule>) -> Product {
        Product {
            id: self.id,
            code: self.code,
            name: self.name,
            unit_price: Money::from_cents(self.unit_price_cents),
            discounts,
            created_at: self.created_at,
            updated_at: self.updated_at,
        }
    }
}

// =============================================================================
// Connection-level queries
// =============================================================================

/// Product rows whose code is in `codes`, chunked to stay under SQLite's
/// bind limit.
async fn fetch_rows_by_codes(
    conn: &mut SqliteConnection,
    codes: &[&str],
) -> DbResult<Vec<ProductRow>> {
    let mut rows: Vec<ProductRow> = Vec::new();

    for chunk in codes.chunks(LOOKUP_CHUNK) {
        let mut query: QueryBuilder<Sqlite> = QueryBuilder::new(
            "SELECT id, code, name, unit_price_cents, created_at, updated_at \
             FROM products WHERE code IN (",
        );
        let mut separated = query.separated(", ");
        for code in chunk {
            separated.push_bind(*code);
        }
        separated.push_unseparated(")");

        rows.extend(
            query
                .build_query_as::<ProductRow>()
                .fetch_all(&mut *conn)
                .await?,
        );
    }

    Ok(rows)
}

/// Pairs each row with its rules; rows without rules get an empty list.
fn attach_rules(
    rows: Vec<ProductRow>,
    mut rules: HashMap<String, Vec<DiscountRule>>,
) -> Vec<Product> {
    rows.into_iter()
        .map(|row| {
            let discounts = rules.remove(&row.id).unwrap_or_default();
            row.into_product(discounts)
        })
        .collect()
}

/// Inserts a product row.
pub(crate) async fn insert_product(
    conn: &mut SqliteConnection,
    draft: &ProductDraft,
) -> DbResult<Product> {
    let now = Utc::now();
    let id = generate_product_id();

    sqlx::query(
        r#"
        INSERT INTO products (id, code, name, unit_price_cents, created_at, updated_at)
        VALUES (?1, ?2, ?3, ?4, ?5, ?6)
        "#,
    )
    .bind(&id)
    .bind(&draft.code)
    .bind(&draft.name)
    .bind(draft.unit_price.cents())
    .bind(now)
    .bind(now)
    .execute(&mut *conn)
    .await
    .map_err(|e| duplicate_code(e, &draft.code))?;

    Ok(Product {
        id,
        code: draft.code.clone(),
        name: draft.name.clone(),
        unit_price: draft.unit_price,
        discounts: Vec::new(),
        created_at: now,
        updated_at: now,
    })
}

/// Deletes every product (rules cascade). Returns the number removed.
pub(crate) async fn clear_products(conn: &mut SqliteConnection) -> DbResult<u64> {
    let result = sqlx::query("DELETE FROM products")
        .execute(&mut *conn)
        .await?;

    Ok(result.rows_affected())
}

// =============================================================================
// Repository
// =============================================================================

/// Repository for product database operations.
///
/// Reads that touch both tables run inside one transaction, so a product
/// and its rules always come from the same committed state.
///
/// ## Usage
/// ```rust,ignore
/// let repo = ProductRepository::new(pool);
///
/// let a = repo.get_by_code("A").await?;
/// let all = repo.list().await?;
/// ```
#[derive(Debug, Clone)]
pub struct ProductRepository {
    pool: SqlitePool,
}

impl ProductRepository {
    /// Creates a new ProductRepository.
    pub fn new(pool: SqlitePool) -> Self {
        ProductRepository { pool }
    }

    /// Lists every product, ordered by code, with its discount rules.
    pub async fn list(&self) -> DbResult<Vec<Product>> {
        let mut tx = self.pool.begin().await?;

        let rows = sqlx::query_as::<_, ProductRow>(
            r#"
            SELECT id, code, name, unit_price_cents, created_at, updated_at
            FROM products
            ORDER BY code
            "#,
        )
        .fetch_all(&mut *tx)
        .await?;
        let rules = discount::fetch_all(&mut tx).await?;

        tx.commit().await?;

        let products = attach_rules(rows, rules);
        debug!(count = products.len(), "Listed products");
        Ok(products)
    }

    /// Gets a product by its code.
    ///
    /// ## Returns
    /// * `Ok(Some(Product))` - Product found
    /// * `Ok(None)` - No product has this code
    pub async fn get_by_code(&self, code: &str) -> DbResult<Option<Product>> {
        let mut tx = self.pool.begin().await?;

        let row = sqlx::query_as::<_, ProductRow>(
            r#"
            SELECT id, code, name, unit_price_cents, created_at, updated_at
            FROM products
            WHERE code = ?1
            "#,
        )
        .bind(code)
        .fetch_optional(&mut *tx)
        .await?;

        let product = match row {
            Some(row) => {
                let discounts = discount::fetch_for_product_id(&mut tx, &row.id).await?;
                Some(row.into_product(discounts))
            }
            None => None,
        };

        tx.commit().await?;
        Ok(product)
    }

    /// Loads all products whose code is in `codes`.
    ///
    /// Codes without a product are silently absent from the result; the
    /// caller decides what "unknown" means.
    pub async fn get_many_by_codes(&self, codes: &[&str]) -> DbResult<Vec<Product>> {
        let mut tx = self.pool.begin().await?;

        let rows = fetch_rows_by_codes(&mut tx, codes).await?;
        let ids: Vec<String> = rows.iter().map(|row| row.id.clone()).collect();
        let rules = discount::fetch_for_products(&mut tx, &ids).await?;

        tx.commit().await?;

        let products = attach_rules(rows, rules);
        debug!(
            requested = codes.len(),
            found = products.len(),
            "Batch product lookup"
        );
        Ok(products)
    }

    /// Inserts a new product.
    ///
    /// ## Returns
    /// * `Ok(Product)` - Inserted product (no discount rules yet)
    /// * `Err(DbError::UniqueViolation)` - Code already exists
    pub async fn insert(&self, draft: &ProductDraft) -> DbResult<Product> {
        debug!(code = %draft.code, "Inserting product");

        let mut conn = self.pool.acquire().await?;
        insert_product(&mut conn, draft).await
    }

    /// Replaces the code, name and unit price of the product at `code`.
    ///
    /// ## Returns
    /// * `Ok(Product)` - Updated product with its discount rules
    /// * `Err(DbError::NotFound)` - No product has `code`
    /// * `Err(DbError::UniqueViolation)` - `draft.code` belongs to another product
    pub async fn update(&self, code: &str, draft: &ProductDraft) -> DbResult<Product> {
        debug!(code = %code, new_code = %draft.code, "Updating product");

        let now = Utc::now();

        let result = sqlx::query(
            r#"
            UPDATE products SET
                code = ?2,
                name = ?3,
                unit_price_cents = ?4,
                updated_at = ?5
            WHERE code = ?1
            "#,
        )
        .bind(code)
        .bind(&draft.code)
        .bind(&draft.name)
        .bind(draft.unit_price.cents())
        .bind(now)
        .execute(&self.pool)
        .await
        .map_err(|e| duplicate_code(e, &draft.code))?;

        if result.rows_affected() == 0 {
            return Err(DbError::not_found("Product", code));
        }

        self.get_by_code(&draft.code)
            .await?
            .ok_or_else(|| DbError::not_found("Product", &draft.code))
    }

    /// Deletes a product; its discount rules go with it (ON DELETE CASCADE).
    pub async fn delete(&self, code: &str) -> DbResult<()> {
        debug!(code = %code, "Deleting product");

        let result = sqlx::query("DELETE FROM products WHERE code = ?1")
            .bind(code)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(DbError::not_found("Product", code));
        }

        Ok(())
    }

    /// Counts products (for diagnostics).
    pub async fn count(&self) -> DbResult<i64> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM products")
            .fetch_one(&self.pool)
            .await?;

        Ok(count)
    }
}

/// Maps a UNIQUE failure on insert/update to a duplicate-code error.
fn duplicate_code(err: sqlx::Error, code: &str) -> DbError {
    match DbError::from(err) {
        e if e.is_unique_violation() => DbError::duplicate("code", code),
        e => e,
    }
}

/// Generates a new product ID.
pub fn generate_product_id() -> String {
    Uuid::new_v4().to_string()
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pool::{Database, DbConfig};

    async fn db() -> Database {
        Database::new(DbConfig::in_memory()).await.unwrap()
    }

    fn draft(code: &str, units: i64) -> ProductDraft {
        ProductDraft {
            code: code.to_string(),
            name: format!("Product {}", code),
            unit_price: Money::from_units(units),
        }
    }

    /// A file-backed database, so two connections can be open at once.
    async fn file_db() -> (Database, std::path::PathBuf) {
        let path = std::env::temp_dir().join(format!("tally-test-{}.db", Uuid::new_v4()));
        let db = Database::new(DbConfig::new(path.clone()).max_connections(2))
            .await
            .unwrap();
        (db, path)
    }

    fn remove_db_files(path: &std::path::Path) {
        for suffix in ["", "-wal", "-shm"] {
            let _ = std::fs::remove_file(format!("{}{}", path.display(), suffix));
        }
    }

    #[tokio::test]
    async fn test_insert_and_get() {
        let db = db().await;
        let repo = db.products();

        let inserted = repo.insert(&draft("A", 50)).await.unwrap();
        assert_eq!(inserted.code, "A");
        assert!(inserted.discounts.is_empty());

        let fetched = repo.get_by_code("A").await.unwrap().unwrap();
        assert_eq!(fetched.id, inserted.id);
        assert_eq!(fetched.unit_price, Money::from_units(50));

        assert!(repo.get_by_code("Z").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_duplicate_code_rejected() {
        let db = db().await;
        let repo = db.products();

        repo.insert(&draft("A", 50)).await.unwrap();
        let err = repo.insert(&draft("A", 60)).await.unwrap_err();

        assert!(matches!(
            err,
            DbError::UniqueViolation { ref field, ref value } if field == "code" && value == "A"
        ));
    }

    #[tokio::test]
    async fn test_list_is_ordered_with_rules() {
        let db = db().await;
        let repo = db.products();

        repo.insert(&draft("C", 20)).await.unwrap();
        repo.insert(&draft("A", 50)).await.unwrap();
        db.discounts()
            .insert("A", &DiscountRule::new(2, Money::from_units(90)))
            .await
            .unwrap();
        db.discounts()
            .insert("A", &DiscountRule::new(3, Money::from_units(130)))
            .await
            .unwrap();

        let products = repo.list().await.unwrap();
        let codes: Vec<&str> = products.iter().map(|p| p.code.as_str()).collect();
        assert_eq!(codes, vec!["A", "C"]);

        let quantities: Vec<u32> = products[0].discounts.iter().map(|r| r.quantity).collect();
        assert_eq!(quantities, vec![3, 2]);
        assert!(products[1].discounts.is_empty());
    }

    #[tokio::test]
    async fn test_update_changes_fields_and_keeps_rules() {
        let db = db().await;
        let repo = db.products();

        repo.insert(&draft("A", 50)).await.unwrap();
        db.discounts()
            .insert("A", &DiscountRule::new(3, Money::from_units(130)))
            .await
            .unwrap();

        let mut changed = draft("AA", 55);
        changed.name = "Renamed".to_string();
        let updated = repo.update("A", &changed).await.unwrap();

        assert_eq!(updated.code, "AA");
        assert_eq!(updated.name, "Renamed");
        assert_eq!(updated.unit_price, Money::from_units(55));
        assert_eq!(updated.discounts.len(), 1);
        assert!(repo.get_by_code("A").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_update_missing_and_conflicting() {
        let db = db().await;
        let repo = db.products();

        assert!(matches!(
            repo.update("Z", &draft("Z", 1)).await.unwrap_err(),
            DbError::NotFound { .. }
        ));

        repo.insert(&draft("A", 50)).await.unwrap();
        repo.insert(&draft("B", 30)).await.unwrap();
        assert!(repo
            .update("B", &draft("A", 30))
            .await
            .unwrap_err()
            .is_unique_violation());
    }

    #[tokio::test]
    async fn test_delete_cascades_rules() {
        let db = db().await;
        let repo = db.products();

        repo.insert(&draft("A", 50)).await.unwrap();
        db.discounts()
            .insert("A", &DiscountRule::new(3, Money::from_units(130)))
            .await
            .unwrap();

        repo.delete("A").await.unwrap();
        assert_eq!(repo.count().await.unwrap(), 0);

        let rules: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM discount_rules")
            .fetch_one(db.pool())
            .await
            .unwrap();
        assert_eq!(rules, 0);

        assert!(matches!(
            repo.delete("A").await.unwrap_err(),
            DbError::NotFound { .. }
        ));
    }

    #[tokio::test]
    async fn test_get_many_by_codes_skips_unknown() {
        let db = db().await;
        let repo = db.products();

        repo.insert(&draft("A", 50)).await.unwrap();
        repo.insert(&draft("B", 30)).await.unwrap();

        let found = repo.get_many_by_codes(&["A", "Z", "B"]).await.unwrap();
        let mut codes: Vec<&str> = found.iter().map(|p| p.code.as_str()).collect();
        codes.sort();
        assert_eq!(codes, vec!["A", "B"]);

        assert!(repo.get_many_by_codes(&[]).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_rules_read_in_same_snapshot_as_products() {
        let (db, path) = file_db().await;
        let repo = db.products();

        repo.insert(&draft("A", 50)).await.unwrap();
        db.discounts()
            .insert("A", &DiscountRule::new(3, Money::from_units(130)))
            .await
            .unwrap();

        let mut tx = db.pool().begin().await.unwrap();
        let rows = fetch_rows_by_codes(&mut tx, &["A"]).await.unwrap();
        assert_eq!(rows.len(), 1);

        // Committed through the pool's second connection between the reads
        db.discounts().delete("A", 3).await.unwrap();

        let ids = vec![rows[0].id.clone()];
        let rules = discount::fetch_for_products(&mut tx, &ids).await.unwrap();
        assert_eq!(
            rules[&ids[0]],
            vec![DiscountRule::new(3, Money::from_units(130))]
        );
        tx.commit().await.unwrap();

        // A new read sees the delete
        let a = repo.get_by_code("A").await.unwrap().unwrap();
        assert!(a.discounts.is_empty());
        let batch = repo.get_many_by_codes(&["A"]).await.unwrap();
        assert!(batch[0].discounts.is_empty());

        db.close().await;
        remove_db_files(&path);
    }
}
