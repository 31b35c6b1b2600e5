//! # Product Routes
//!
//! Catalog maintenance: products and their bulk-discount rules.
//!
//! | Method | Path                                    | Success |
//! |--------|-----------------------------------------|---------|
//! | GET    | `/products`                             | 200     |
//! | POST   | `/products`                             | 201     |
//! | GET    | `/products/{code}`                      | 200     |
//! | PUT    | `/products/{code}`                      | 200     |
//! | DELETE | `/products/{code}`                      | 204     |
//! | POST   | `/products/{code}/discounts`            | 201     |
//! | DELETE | `/products/{code}/discounts/{quantity}` | 204     |
//!
//! Every write is validated with tally-core's field rules before it reaches
//! the database.

use axum::extract::rejection::{JsonRejection, PathRejection};
use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::Json;
use serde::Serialize;
use tracing::info;

use crate::error::{ApiError, ApiResult};
use crate::state::SharedState;
use tally_core::{CoreError, DiscountRule, Money, Product, ProductDraft};
use tally_db::DbError;

/// Product as returned to clients.
#[derive(Debug, Clone, Serialize)]
pub struct ProductDto {
    pub code: String,
    pub name: String,
    pub unit_price: Money,
    /// Largest bundle first.
    pub discounts: Vec<DiscountRule>,
}

impl From<Product> for ProductDto {
    fn from(p: Product) -> Self {
        ProductDto {
            code: p.code,
            name: p.name,
            unit_price: p.unit_price,
            discounts: p.discounts,
        }
    }
}

/// `GET /products`
pub async fn list_products(State(state): State<SharedState>) -> ApiResult<Json<Vec<ProductDto>>> {
    let products = state.db.products().list().await?;
    Ok(Json(products.into_iter().map(ProductDto::from).collect()))
}

/// `GET /products/{code}`
pub async fn get_product(
    State(state): State<SharedState>,
    path: Result<Path<String>, PathRejection>,
) -> ApiResult<Json<ProductDto>> {
    let Path(code) = path?;

    let product = state
        .db
        .products()
        .get_by_code(&code)
        .await?
        .ok_or_else(|| ApiError::not_found("Product", &code))?;

    Ok(Json(product.into()))
}

/// `POST /products`
pub async fn create_product(
    State(state): State<SharedState>,
    body: Result<Json<ProductDraft>, JsonRejection>,
) -> ApiResult<(StatusCode, Json<ProductDto>)> {
    let Json(draft) = body?;
    draft.validate()?;

    let product = state.db.products().insert(&draft).await?;
    info!(code = %product.code, unit_price = %product.unit_price, "Product created");

    Ok((StatusCode::CREATED, Json(product.into())))
}

/// `PUT /products/{code}`
///
/// Replaces code, name and unit price. Discount rules stay attached.
pub async fn update_product(
    State(state): State<SharedState>,
    path: Result<Path<String>, PathRejection>,
    body: Result<Json<ProductDraft>, JsonRejection>,
) -> ApiResult<Json<ProductDto>> {
    let Path(code) = path?;
    let Json(draft) = body?;
    draft.validate()?;

    let product = state.db.products().update(&code, &draft).await?;
    info!(code = %code, new_code = %product.code, "Product updated");

    Ok(Json(product.into()))
}

/// `DELETE /products/{code}`
pub async fn delete_product(
    State(state): State<SharedState>,
    path: Result<Path<String>, PathRejection>,
) -> ApiResult<StatusCode> {
    let Path(code) = path?;

    state.db.products().delete(&code).await?;
    info!(code = %code, "Product deleted");

    Ok(StatusCode::NO_CONTENT)
}

/// `POST /products/{code}/discounts`
pub async fn add_discount(
    State(state): State<SharedState>,
    path: Result<Path<String>, PathRejection>,
    body: Result<Json<DiscountRule>, JsonRejection>,
) -> ApiResult<(StatusCode, Json<DiscountRule>)> {
    let Path(code) = path?;
    let Json(rule) = body?;
    rule.validate()?;

    let rule = match state.db.discounts().insert(&code, &rule).await {
        Ok(rule) => rule,
        Err(DbError::UniqueViolation { .. }) => {
            return Err(CoreError::DuplicateDiscountQuantity {
                code,
                quantity: rule.quantity,
            }
            .into());
        }
        Err(e) => return Err(e.into()),
    };

    info!(
        code = %code,
        quantity = rule.quantity,
        discount_price = %rule.discount_price,
        "Discount rule added"
    );

    Ok((StatusCode::CREATED, Json(rule)))
}

/// `DELETE /products/{code}/discounts/{quantity}`
pub async fn remove_discount(
    State(state): State<SharedState>,
    path: Result<Path<(String, u32)>, PathRejection>,
) -> ApiResult<StatusCode> {
    let Path((code, quantity)) = path?;

    state.db.discounts().delete(&code, quantity).await?;
    info!(code = %code, quantity, "Discount rule removed");

    Ok(StatusCode::NO_CONTENT)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::state::test_support::seeded_state;

    fn draft(code: &str, name: &str, cents: i64) -> ProductDraft {
        ProductDraft {
            code: code.to_string(),
            name: name.to_string(),
            unit_price: Money::from_cents(cents),
        }
    }

    #[tokio::test]
    async fn test_list_reference_catalog() {
        let state = seeded_state().await;
        let Json(products) = list_products(State(state)).await.unwrap();

        let codes: Vec<&str> = products.iter().map(|p| p.code.as_str()).collect();
        assert_eq!(codes, vec!["A", "B", "C", "D"]);
        assert_eq!(
            products[0].discounts,
            vec![DiscountRule::new(3, Money::from_units(130))]
        );
    }

    #[tokio::test]
    async fn test_get_product() {
        let state = seeded_state().await;

        let Json(b) = get_product(State(state.clone()), Ok(Path("B".to_string())))
            .await
            .unwrap();
        assert_eq!(b.unit_price, Money::from_units(30));

        let err = get_product(State(state), Ok(Path("Z".to_string())))
            .await
            .unwrap_err();
        assert_eq!(err.status(), StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_create_product() {
        let state = seeded_state().await;

        let (status, Json(created)) =
            create_product(State(state.clone()), Ok(Json(draft("E", "Product E", 1_250))))
                .await
                .unwrap();
        assert_eq!(status, StatusCode::CREATED);
        assert_eq!(created.code, "E");
        assert!(created.discounts.is_empty());

        let err = create_product(State(state.clone()), Ok(Json(draft("A", "Again", 100))))
            .await
            .unwrap_err();
        assert_eq!(err.status(), StatusCode::CONFLICT);

        for bad in [
            draft("", "Empty code", 100),
            draft("A-1", "Dash", 100),
            draft("F", "", 100),
            draft("G", "Negative", -1),
            draft("H", "Too dear", 1_000_000),
        ] {
            let err = create_product(State(state.clone()), Ok(Json(bad.clone())))
                .await
                .unwrap_err();
            assert_eq!(err.status(), StatusCode::BAD_REQUEST, "draft {:?}", bad);
        }
    }

    #[tokio::test]
    async fn test_update_and_delete_product() {
        let state = seeded_state().await;

        let Json(updated) = update_product(
            State(state.clone()),
            Ok(Path("C".to_string())),
            Ok(Json(draft("C", "Cheaper C", 1_800))),
        )
        .await
        .unwrap();
        assert_eq!(updated.unit_price, Money::from_cents(1_800));

        let err = update_product(
            State(state.clone()),
            Ok(Path("Z".to_string())),
            Ok(Json(draft("Z", "Ghost", 100))),
        )
        .await
        .unwrap_err();
        assert_eq!(err.status(), StatusCode::NOT_FOUND);

        let status = delete_product(State(state.clone()), Ok(Path("C".to_string())))
            .await
            .unwrap();
        assert_eq!(status, StatusCode::NO_CONTENT);

        let err = delete_product(State(state), Ok(Path("C".to_string())))
            .await
            .unwrap_err();
        assert_eq!(err.status(), StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_discount_lifecycle() {
        let state = seeded_state().await;
        let path = || Ok(Path("A".to_string()));

        let (status, Json(rule)) = add_discount(
            State(state.clone()),
            path(),
            Ok(Json(DiscountRule::new(2, Money::from_units(90)))),
        )
        .await
        .unwrap();
        assert_eq!(status, StatusCode::CREATED);
        assert_eq!(rule.quantity, 2);

        let Json(a) = get_product(State(state.clone()), path()).await.unwrap();
        let quantities: Vec<u32> = a.discounts.iter().map(|r| r.quantity).collect();
        assert_eq!(quantities, vec![3, 2]);

        let err = add_discount(
            State(state.clone()),
            path(),
            Ok(Json(DiscountRule::new(3, Money::from_units(120)))),
        )
        .await
        .unwrap_err();
        assert_eq!(err.status(), StatusCode::CONFLICT);
        assert_eq!(err.message, "Product A already has a discount rule for 3 units");

        let err = add_discount(
            State(state.clone()),
            path(),
            Ok(Json(DiscountRule::new(0, Money::from_units(10)))),
        )
        .await
        .unwrap_err();
        assert_eq!(err.status(), StatusCode::BAD_REQUEST);

        let status = remove_discount(State(state.clone()), Ok(Path(("A".to_string(), 2))))
            .await
            .unwrap();
        assert_eq!(status, StatusCode::NO_CONTENT);

        let err = remove_discount(State(state), Ok(Path(("A".to_string(), 2))))
            .await
            .unwrap_err();
        assert_eq!(err.status(), StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_discount_on_missing_product() {
        let state = seeded_state().await;

        let err = add_discount(
            State(state),
            Ok(Path("Z".to_string())),
            Ok(Json(DiscountRule::new(2, Money::from_units(10)))),
        )
        .await
        .unwrap_err();
        assert_eq!(err.status(), StatusCode::NOT_FOUND);
    }
}
