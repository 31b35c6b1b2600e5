//! # Catalog Snapshots
//!
//! Bridges the SQLite store and the pricing engine.
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    Checkout Read Path                                   │
//! │                                                                         │
//! │  Basket {A: 4, B: 1, Z: 1}                                             │
//! │       │                                                                 │
//! │       ▼  distinct codes                                                 │
//! │  CatalogStore::snapshot  ──►  products + rules (2 queries)             │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  InMemoryCatalog {A, B}     (immutable, owned by the request)          │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  price_basket(&basket, &snapshot)   (sync, pure)                       │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! The engine never awaits: every row it could need is resolved up front.

use tracing::debug;

use crate::error::DbResult;
use crate::repository::product::ProductRepository;
use tally_core::{Basket, InMemoryCatalog};

/// Store-backed source of catalog snapshots.
#[derive(Debug, Clone)]
pub struct CatalogStore {
    products: ProductRepository,
}

impl CatalogStore {
    /// Creates a store over the given product repository.
    pub fn new(products: ProductRepository) -> Self {
        CatalogStore { products }
    }

    /// Loads every product named in `basket` into an in-memory catalog.
    ///
    /// Unknown codes are simply absent from the snapshot.
    pub async fn snapshot(&self, basket: &Basket) -> DbResult<InMemoryCatalog> {
        let codes: Vec<&str> = basket.codes().collect();
        self.snapshot_codes(&codes).await
    }

    /// Loads the products with the given codes into an in-memory catalog.
    pub async fn snapshot_codes(&self, codes: &[&str]) -> DbResult<InMemoryCatalog> {
        let products = self.products.get_many_by_codes(codes).await?;

        let catalog: InMemoryCatalog = products
            .iter()
            .map(|product| (product.code.clone(), product.catalog_entry()))
            .collect();

        debug!(
            requested = codes.len(),
            resolved = catalog.len(),
            "Catalog snapshot loaded"
        );
        Ok(catalog)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pool::{Database, DbConfig};
    use crate::seed::seed_reference_catalog;
    use tally_core::{price_basket, CatalogLookup, Money};

    async fn seeded() -> Database {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        seed_reference_catalog(&db).await.unwrap();
        db
    }

    #[tokio::test]
    async fn test_snapshot_holds_only_basket_codes() {
        let db = seeded().await;
        let basket = Basket::from_codes(["A", "A", "Z"]);

        let snapshot = db.catalog().snapshot(&basket).await.unwrap();

        assert_eq!(snapshot.len(), 1);
        let a = snapshot.get("A").unwrap();
        assert_eq!(a.unit_price, Money::from_units(50));
        assert_eq!(a.discount_rules.len(), 1);
        assert!(snapshot.get("B").is_none());
        assert!(snapshot.get("Z").is_none());
    }

    #[tokio::test]
    async fn test_reference_baskets_price_from_store() {
        let db = seeded().await;

        let cases: [(&[&str], i64); 5] = [
            (&["A", "A", "A"], 13_000),
            (&["A", "A", "A", "A"], 18_000),
            (&["B", "B"], 4_500),
            (&["A", "B", "C", "D"], 11_500),
            (&["Z"], 0),
        ];

        for (codes, cents) in cases {
            let basket = Basket::from_codes(codes.iter().copied());
            let snapshot = db.catalog().snapshot(&basket).await.unwrap();
            let result = price_basket(&basket, &snapshot).unwrap();
            assert_eq!(result.total.cents(), cents, "basket {:?}", codes);
        }
    }

    #[tokio::test]
    async fn test_empty_basket_snapshot() {
        let db = seeded().await;
        let snapshot = db.catalog().snapshot(&Basket::new()).await.unwrap();
        assert!(snapshot.is_empty());
    }
}
