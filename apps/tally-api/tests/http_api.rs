//! End-to-end HTTP tests against a real listener on 127.0.0.1.

use serde_json::{json, Value};
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::{TcpListener, TcpStream};

use tally_api::{router, ApiConfig, AppState};
use tally_db::{seed_reference_catalog, Database, DbConfig};

async fn spawn_server() -> String {
    let db = Database::new(DbConfig::in_memory()).await.unwrap();
    seed_reference_catalog(&db).await.unwrap();
    let app = router(AppState::new(db, ApiConfig::default()));

    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap().to_string();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });
    addr
}

/// Sends one HTTP/1.1 request and returns (status, parsed JSON body or Null).
async fn request(addr: &str, method: &str, path: &str, body: Option<&str>) -> (u16, Value) {
    let mut stream = TcpStream::connect(addr).await.unwrap();

    let body = body.unwrap_or("");
    let head = format!(
        "{method} {path} HTTP/1.1\r\nHost: {addr}\r\nContent-Type: application/json\r\nContent-Length: {}\r\nConnection: close\r\n\r\n",
        body.len()
    );
    stream.write_all(head.as_bytes()).await.unwrap();
    stream.write_all(body.as_bytes()).await.unwrap();

    let mut raw = Vec::new();
    stream.read_to_end(&mut raw).await.unwrap();
    let text = String::from_utf8(raw).unwrap();

    let status: u16 = text
        .split_whitespace()
        .nth(1)
        .and_then(|s| s.parse().ok())
        .unwrap();
    let payload = text.split_once("\r\n\r\n").map(|(_, b)| b).unwrap_or("");
    let json = if payload.is_empty() {
        Value::Null
    } else {
        serde_json::from_str(payload).unwrap()
    };

    (status, json)
}

#[tokio::test]
async fn checkout_is_served_at_root_and_under_api() {
    let addr = spawn_server().await;
    let body = r#"{"items": ["A", "A", "A", "A"]}"#;

    for path in ["/checkout", "/api/checkout"] {
        let (status, json) = request(&addr, "POST", path, Some(body)).await;
        assert_eq!(status, 200, "path {}", path);
        assert_eq!(json["total_price"], json!(180.0));
        assert_eq!(json["items_processed"], json!(1));
    }
}

#[tokio::test]
async fn checkout_rejects_bad_bodies_with_json_errors() {
    let addr = spawn_server().await;

    for body in [r#"{"items": "A"}"#, r#"{"items": [1]}"#, "not json"] {
        let (status, json) = request(&addr, "POST", "/checkout", Some(body)).await;
        assert_eq!(status, 400, "body {}", body);
        assert_eq!(json["code"], json!("VALIDATION_ERROR"));
    }
}

#[tokio::test]
async fn unknown_codes_still_return_200() {
    let addr = spawn_server().await;

    let (status, json) =
        request(&addr, "POST", "/checkout", Some(r#"{"items": ["Z", "C"]}"#)).await;
    assert_eq!(status, 200);
    assert_eq!(json["total_price"], json!(20.0));
    assert_eq!(json["unknown_codes"], json!(["Z"]));
}

#[tokio::test]
async fn product_crud_round_trip() {
    let addr = spawn_server().await;

    let (status, _) = request(
        &addr,
        "POST",
        "/api/products",
        Some(r#"{"code": "E", "name": "Product E", "unit_price": "12.50"}"#),
    )
    .await;
    assert_eq!(status, 201);

    let (status, json) = request(
        &addr,
        "POST",
        "/api/products/E/discounts",
        Some(r#"{"quantity": 2, "discount_price": 20}"#),
    )
    .await;
    assert_eq!(status, 201);
    assert_eq!(json["discount_price"], json!(20.0));

    let (status, json) = request(&addr, "GET", "/api/products/E", None).await;
    assert_eq!(status, 200);
    assert_eq!(json["unit_price"], json!(12.5));
    assert_eq!(json["discounts"][0]["quantity"], json!(2));

    let (status, json) = request(
        &addr,
        "POST",
        "/checkout",
        Some(r#"{"items": ["E", "E", "E"]}"#),
    )
    .await;
    assert_eq!(status, 200);
    assert_eq!(json["total_price"], json!(32.5));

    let (status, _) = request(
        &addr,
        "POST",
        "/api/products",
        Some(r#"{"code": "F", "name": "Bad", "unit_price": 1.234}"#),
    )
    .await;
    assert_eq!(status, 400);

    let (status, _) = request(&addr, "DELETE", "/api/products/E/discounts/two", None).await;
    assert_eq!(status, 400);

    let (status, json) = request(&addr, "DELETE", "/api/products/E", None).await;
    assert_eq!(status, 204);
    assert_eq!(json, Value::Null);

    let (status, json) = request(&addr, "GET", "/api/products/E", None).await;
    assert_eq!(status, 404);
    assert_eq!(json["code"], json!("NOT_FOUND"));
}

#[tokio::test]
async fn health_reports_database() {
    let addr = spawn_server().await;

    let (status, json) = request(&addr, "GET", "/health", None).await;
    assert_eq!(status, 200);
    assert_eq!(json["status"], json!("ok"));
    assert_eq!(json["database"], json!(true));
}

#[tokio::test]
async fn frontend_trailing_slash_paths() {
    let addr = spawn_server().await;

    let (status, json) = request(
        &addr,
        "POST",
        "/api/checkout/",
        Some(r#"{"items": ["B", "B"]}"#),
    )
    .await;
    assert_eq!(status, 200);
    assert_eq!(json["total_price"], json!(45.0));

    let (status, json) = request(&addr, "GET", "/api/products/", None).await;
    assert_eq!(status, 200);
    assert_eq!(json.as_array().map(Vec::len), Some(4));
}
