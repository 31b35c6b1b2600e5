//! # Checkout
//!
//! `POST /checkout` prices a basket of product codes.
//!
//! ## Request Flow
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    Checkout Flow                                        │
//! │                                                                         │
//! │  {"items": ["A", "B", "A", "Z"]}                                       │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  Basket::from_json        400 if items is missing / not a list         │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  catalog().snapshot()     products + rules for {A, B, Z}               │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  price_basket()           A×2, B×1 priced; Z reported as unknown       │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  200 {"total_price": 130.0, "items_processed": 2,                      │
//! │       "unknown_codes": ["Z"], "lines": [...]}                          │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use std::time::Instant;

use axum::extract::rejection::JsonRejection;
use axum::extract::State;
use axum::Json;
use serde::Serialize;
use serde_json::Value;
use tracing::{debug, warn};

use crate::error::ApiResult;
use crate::state::SharedState;
use tally_core::{price_basket, Basket, LineBreakdown, Money, PriceBreakdown};

/// Response body of `POST /checkout`.
#[derive(Debug, Clone, Serialize)]
pub struct CheckoutResponse {
    /// Serialized as a JSON number.
    pub total_price: Money,

    /// Distinct recognized product codes.
    pub items_processed: usize,

    /// Codes with no product, sorted.
    pub unknown_codes: Vec<String>,

    pub lines: Vec<LineBreakdown>,
}

impl From<PriceBreakdown> for CheckoutResponse {
    fn from(result: PriceBreakdown) -> Self {
        CheckoutResponse {
            total_price: result.total,
            items_processed: result.items_processed,
            unknown_codes: result.unknown_codes.into_iter().collect(),
            lines: result.lines,
        }
    }
}

/// Prices the basket in the request body.
///
/// Unknown codes never fail the request; they are logged and listed in
/// `unknown_codes`.
pub async fn checkout(
    State(state): State<SharedState>,
    body: Result<Json<Value>, JsonRejection>,
) -> ApiResult<Json<CheckoutResponse>> {
    let start = Instant::now();

    let Json(body) = body?;
    let basket = Basket::from_json(&body)?;

    let snapshot = state.db.catalog().snapshot(&basket).await?;
    let result = price_basket(&basket, &snapshot)?;

    if !result.unknown_codes.is_empty() {
        warn!(
            unknown_codes = ?result.unknown_codes,
            "Basket contains unknown product codes"
        );
    }

    debug!(
        items = basket.len(),
        items_processed = result.items_processed,
        total = %result.total,
        elapsed_us = start.elapsed().as_micros() as u64,
        "Checkout priced"
    );

    Ok(Json(result.into()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::state::test_support::seeded_state;
    use axum::http::StatusCode;
    use serde_json::json;

    async fn post(body: Value) -> ApiResult<CheckoutResponse> {
        let state = seeded_state().await;
        checkout(State(state), Ok(Json(body)))
            .await
            .map(|Json(response)| response)
    }

    #[tokio::test]
    async fn test_reference_totals() {
        let cases = [
            (json!([]), 0),
            (json!(["A", "A", "A"]), 13_000),
            (json!(["A", "A", "A", "A"]), 18_000),
            (json!(["B", "B"]), 4_500),
            (json!(["B"]), 3_000),
            (json!(["A", "B", "C", "D"]), 11_500),
            (json!(["B", "A", "B", "A", "A"]), 17_500),
        ];

        for (items, cents) in cases {
            let response = post(json!({ "items": items.clone() })).await.unwrap();
            assert_eq!(response.total_price.cents(), cents, "items {}", items);
        }
    }

    #[tokio::test]
    async fn test_unknown_code_is_not_an_error() {
        let response = post(json!({"items": ["Z"]})).await.unwrap();

        assert!(response.total_price.is_zero());
        assert_eq!(response.items_processed, 0);
        assert_eq!(response.unknown_codes, vec!["Z".to_string()]);
        assert!(response.lines.is_empty());
    }

    #[tokio::test]
    async fn test_invalid_items_are_client_errors() {
        for body in [
            json!({"items": "A"}),
            json!({"items": {"A": 3}}),
            json!({"items": ["A", 1]}),
            json!({}),
            json!(["A"]),
        ] {
            let err = post(body.clone()).await.unwrap_err();
            assert_eq!(err.status(), StatusCode::BAD_REQUEST, "body {}", body);
        }
    }

    #[tokio::test]
    async fn test_response_serializes_numbers() {
        let response = post(json!({"items": ["A", "A", "A", "C"]})).await.unwrap();
        let value = serde_json::to_value(&response).unwrap();

        assert_eq!(value["total_price"], json!(150.0));
        assert_eq!(value["items_processed"], json!(2));
        assert_eq!(value["unknown_codes"], json!([]));
        assert_eq!(value["lines"][0]["code"], json!("A"));
        assert_eq!(value["lines"][0]["bundles"][0]["times"], json!(1));
    }

    #[tokio::test]
    async fn test_unrepresentable_total_is_a_server_error() {
        let state = seeded_state().await;

        // A price no API write would accept, planted directly in the table
        sqlx::query("UPDATE products SET unit_price_cents = ?1 WHERE code = 'C'")
            .bind(i64::MAX / 2)
            .execute(state.db.pool())
            .await
            .unwrap();

        let err = checkout(State(state), Ok(Json(json!({"items": ["C", "C", "C"]}))))
            .await
            .unwrap_err();
        assert_eq!(err.status(), StatusCode::INTERNAL_SERVER_ERROR);
    }
}
