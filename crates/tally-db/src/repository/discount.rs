//! # Discount Rule Repository
//!
//! Database operations for bulk-discount rules.
//!
//! Rules are always read back ordered by quantity descending. The pricing
//! engine sorts again on its own, so nothing depends on this order except
//! display.

use std::collections::HashMap;

use chrono::Utc;
use sqlx::{FromRow, QueryBuilder, Sqlite, SqliteConnection, SqlitePool};
use tracing::debug;
use uuid::Uuid;

use crate::error::{DbError, DbResult};
use tally_core::{DiscountRule, Money};

/// Product ids bound per `IN (..)` query.
const LOOKUP_CHUNK: usize = 500;

#[derive(Debug, FromRow)]
struct DiscountRuleRow {
    product_id: String,
    quantity: i64,
    discount_price_cents: i64,
}

impl DiscountRuleRow {
    fn into_rule(self) -> DbResult<DiscountRule> {
        let quantity = u32::try_from(self.quantity).map_err(|_| {
            DbError::corrupt(
                "discount_rules",
                format!("quantity {} out of range", self.quantity),
            )
        })?;

        Ok(DiscountRule::new(
            quantity,
            Money::from_cents(self.discount_price_cents),
        ))
    }
}

/// Groups rows by product id, preserving row order within each group.
fn group_by_product(rows: Vec<DiscountRuleRow>) -> DbResult<HashMap<String, Vec<DiscountRule>>> {
    let mut grouped: HashMap<String, Vec<DiscountRule>> = HashMap::new();
    for row in rows {
        let product_id = row.product_id.clone();
        grouped.entry(product_id).or_default().push(row.into_rule()?);
    }
    Ok(grouped)
}

// =============================================================================
// Connection-level queries
// =============================================================================
//
// These run on whatever connection they are handed, so callers that need
// several reads to see the same data pass an open transaction.

/// Rules of one product, by product id.
pub(crate) async fn fetch_for_product_id(
    conn: &mut SqliteConnection,
    product_id: &str,
) -> DbResult<Vec<DiscountRule>> {
    let rows = sqlx::query_as::<_, DiscountRuleRow>(
        r#"
        SELECT product_id, quantity, discount_price_cents
        FROM discount_rules
        WHERE product_id = ?1
        ORDER BY quantity DESC
        "#,
    )
    .bind(product_id)
    .fetch_all(&mut *conn)
    .await?;

    rows.into_iter().map(DiscountRuleRow::into_rule).collect()
}

/// Rules of many products, keyed by product id.
pub(crate) async fn fetch_for_products(
    conn: &mut SqliteConnection,
    product_ids: &[String],
) -> DbResult<HashMap<String, Vec<DiscountRule>>> {
    let mut rows: Vec<DiscountRuleRow> = Vec::new();

    for chunk in product_ids.chunks(LOOKUP_CHUNK) {
        let mut query: QueryBuilder<Sqlite> = QueryBuilder::new(
            "SELECT product_id, quantity, discount_price_cents \
             FROM discount_rules WHERE product_id IN (",
        );
        let mut separated = query.separated(", ");
        for id in chunk {
            separated.push_bind(id.as_str());
        }
        separated.push_unseparated(") ORDER BY quantity DESC");

        rows.extend(
            query
                .build_query_as::<DiscountRuleRow>()
                .fetch_all(&mut *conn)
                .await?,
        );
    }

    group_by_product(rows)
}

/// Every rule in the catalog, keyed by product id.
pub(crate) async fn fetch_all(
    conn: &mut SqliteConnection,
) -> DbResult<HashMap<String, Vec<DiscountRule>>> {
    let rows = sqlx::query_as::<_, DiscountRuleRow>(
        r#"
        SELECT product_id, quantity, discount_price_cents
        FROM discount_rules
        ORDER BY product_id, quantity DESC
        "#,
    )
    .fetch_all(&mut *conn)
    .await?;

    group_by_product(rows)
}

/// Adds a rule to the product with `code`.
pub(crate) async fn insert_rule(
    conn: &mut SqliteConnection,
    code: &str,
    rule: &DiscountRule,
) -> DbResult<DiscountRule> {
    let product_id: String = sqlx::query_scalar("SELECT id FROM products WHERE code = ?1")
        .bind(code)
        .fetch_optional(&mut *conn)
        .await?
        .ok_or_else(|| DbError::not_found("Product", code))?;

    sqlx::query(
        r#"
        INSERT INTO discount_rules (id, product_id, quantity, discount_price_cents, created_at)
        VALUES (?1, ?2, ?3, ?4, ?5)
        "#,
    )
    .bind(Uuid::new_v4().to_string())
    .bind(&product_id)
    .bind(i64::from(rule.quantity))
    .bind(rule.discount_price.cents())
    .bind(Utc::now())
    .execute(&mut *conn)
    .await
    .map_err(|e| match DbError::from(e) {
        e if e.is_unique_violation() => DbError::duplicate("quantity", rule.quantity.to_string()),
        e => e,
    })?;

    Ok(*rule)
}

// =============================================================================
// Repository
// =============================================================================

/// Repository for discount rule database operations.
#[derive(Debug, Clone)]
pub struct DiscountRuleRepository {
    pool: SqlitePool,
}

impl DiscountRuleRepository {
    /// Creates a new DiscountRuleRepository.
    pub fn new(pool: SqlitePool) -> Self {
        DiscountRuleRepository { pool }
    }

    /// Rules of one product, by product code.
    pub async fn list_for_product(&self, code: &str) -> DbResult<Vec<DiscountRule>> {
        let rows = sqlx::query_as::<_, DiscountRuleRow>(
            r#"
            SELECT r.product_id, r.quantity, r.discount_price_cents
            FROM discount_rules r
            INNER JOIN products p ON p.id = r.product_id
            WHERE p.code = ?1
            ORDER BY r.quantity DESC
            "#,
        )
        .bind(code)
        .fetch_all(&self.pool)
        .await?;

        rows.into_iter().map(DiscountRuleRow::into_rule).collect()
    }

    /// Rules of many products, keyed by product id.
    ///
    /// Products without rules have no key in the map.
    pub async fn list_for_products(
        &self,
        product_ids: &[String],
    ) -> DbResult<HashMap<String, Vec<DiscountRule>>> {
        let mut conn = self.pool.acquire().await?;
        fetch_for_products(&mut conn, product_ids).await
    }

    /// Every rule in the catalog, keyed by product id.
    pub async fn all_rules(&self) -> DbResult<HashMap<String, Vec<DiscountRule>>> {
        let mut conn = self.pool.acquire().await?;
        fetch_all(&mut conn).await
    }

    /// Adds a rule to the product with `code`.
    ///
    /// ## Returns
    /// * `Err(DbError::NotFound)` - No product has `code`
    /// * `Err(DbError::UniqueViolation)` - The product already has a rule for this quantity
    pub async fn insert(&self, code: &str, rule: &DiscountRule) -> DbResult<DiscountRule> {
        debug!(code = %code, quantity = rule.quantity, "Inserting discount rule");

        let mut conn = self.pool.acquire().await?;
        insert_rule(&mut conn, code, rule).await
    }

    /// Removes the rule for `quantity` from the product with `code`.
    pub async fn delete(&self, code: &str, quantity: u32) -> DbResult<()> {
        debug!(code = %code, quantity, "Deleting discount rule");

        let result = sqlx::query(
            r#"
            DELETE FROM discount_rules
            WHERE quantity = ?2
            AND product_id = (SELECT id FROM products WHERE code = ?1)
            "#,
        )
        .bind(code)
        .bind(i64::from(quantity))
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(DbError::not_found(
                "DiscountRule",
                format!("{}/{}", code, quantity),
            ));
        }

        Ok(())
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
