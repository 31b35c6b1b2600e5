//! Catalog edits flow through to checkout prices.

use tally_core::{price_basket, Basket, DiscountRule, Money, ProductDraft};
use tally_db::{seed_reference_catalog, Database, DbConfig};

async fn seeded() -> Database {
    let db = Database::new(DbConfig::in_memory()).await.unwrap();
    seed_reference_catalog(&db).await.unwrap();
    db
}

async fn total(db: &Database, codes: &[&str]) -> Money {
    let basket = Basket::from_codes(codes.iter().copied());
    let snapshot = db.catalog().snapshot(&basket).await.unwrap();
    price_basket(&basket, &snapshot).unwrap().total
}

#[tokio::test]
async fn adding_a_smaller_bundle_stacks_with_the_larger_one() {
    let db = seeded().await;

    // 5 x A: one 3-bundle (130) + 2 singles (100)
    assert_eq!(total(&db, &["A"; 5]).await, Money::from_units(230));

    db.discounts()
        .insert("A", &DiscountRule::new(2, Money::from_units(90)))
        .await
        .unwrap();

    // 5 x A: one 3-bundle (130) + one 2-bundle (90)
    assert_eq!(total(&db, &["A"; 5]).await, Money::from_units(220));
    // 4 x A: one 3-bundle (130) + 1 single (50)
    assert_eq!(total(&db, &["A"; 4]).await, Money::from_units(180));
}

#[tokio::test]
async fn deleted_product_becomes_unknown() {
    let db = seeded().await;
    db.products().delete("D").await.unwrap();

    let basket = Basket::from_codes(["C", "D"]);
    let snapshot = db.catalog().snapshot(&basket).await.unwrap();
    let result = price_basket(&basket, &snapshot).unwrap();

    assert_eq!(result.total, Money::from_units(20));
    assert_eq!(result.items_processed, 1);
    assert!(result.unknown_codes.contains("D"));
}

#[tokio::test]
async fn repricing_a_product_changes_the_total() {
    let db = seeded().await;

    db.products()
        .update(
            "C",
            &ProductDraft {
                code: "C".to_string(),
                name: "Product C".to_string(),
                unit_price: Money::parse_decimal("19.99").unwrap(),
            },
        )
        .await
        .unwrap();

    assert_eq!(total(&db, &["C", "C"]).await, Money::from_cents(3_998));
}
