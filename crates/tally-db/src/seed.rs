//! # Reference Catalog
//!
//! The four-product catalog used by the seed binary, `SEED_ON_START`, and
//! tests.
//!
//! | Code | Unit price | Bundle         |
//! |------|------------|----------------|
//! | A    | 50.00      | 3 for 130.00   |
//! | B    | 30.00      | 2 for 45.00    |
//! | C    | 20.00      | -              |
//! | D    | 15.00      | -              |

use tracing::info;

use crate::error::DbResult;
use crate::pool::Database;
use crate::repository::{discount, product};
use tally_core::{DiscountRule, Money, ProductDraft};

/// One reference product: code, name, unit price in cents, optional bundle.
struct SeedProduct {
    code: &'static str,
    name: &'static str,
    unit_price_cents: i64,
    bundle: Option<(u32, i64)>,
}

const REFERENCE_PRODUCTS: &[SeedProduct] = &[
    SeedProduct {
        code: "A",
        name: "Product A",
        unit_price_cents: 5_000,
        bundle: Some((3, 13_000)),
    },
    SeedProduct {
        code: "B",
        name: "Product B",
        unit_price_cents: 3_000,
        bundle: Some((2, 4_500)),
    },
    SeedProduct {
        code: "C",
        name: "Product C",
        unit_price_cents: 2_000,
        bundle: None,
    },
    SeedProduct {
        code: "D",
        name: "Product D",
        unit_price_cents: 1_500,
        bundle: None,
    },
];

/// Replaces the whole catalog with the reference products.
///
/// The clear and every insert share one transaction: on failure the
/// previous catalog is left untouched.
///
/// Returns the number of products inserted.
pub async fn seed_reference_catalog(db: &Database) -> DbResult<usize> {
    let mut tx = db.pool().begin().await?;

    let removed = product::clear_products(&mut tx).await?;

    for seed in REFERENCE_PRODUCTS {
        let draft = ProductDraft {
            code: seed.code.to_string(),
            name: seed.name.to_string(),
            unit_price: Money::from_cents(seed.unit_price_cents),
        };
        product::insert_product(&mut tx, &draft).await?;

        if let Some((quantity, cents)) = seed.bundle {
            discount::insert_rule(
                &mut tx,
                seed.code,
                &DiscountRule::new(quantity, Money::from_cents(cents)),
            )
            .await?;
        }
    }

    tx.commit().await?;

    if removed > 0 {
        info!(removed, "Cleared existing catalog");
    }
    info!(products = REFERENCE_PRODUCTS.len(), "Reference catalog seeded");
    Ok(REFERENCE_PRODUCTS.len())
}
