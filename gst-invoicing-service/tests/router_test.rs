//! Router tests that are answered before any handler reaches MongoDB.

mod common;

use common::{invoice_body, offline_router, TEST_USER};
use http_body_util::BodyExt;
use serde_json::{json, Value};
use service_core::axum::{
    body::Body,
    http::{header, Method, Request, StatusCode},
    response::Response,
};
use tower::ServiceExt;

fn json_request(method: Method, uri: &str, user: Option<&str>, body: Value) -> Request<Body> {
    let mut builder = Request::builder()
        .method(method)
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/json");
    if let Some(user) = user {
        builder = builder.header("X-User-ID", user);
    }
    builder.body(Body::from(body.to_string())).unwrap()
}

async fn body_json(response: Response) -> Value {
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    serde_json::from_slice(&bytes).unwrap()
}

#[tokio::test]
async fn gst_rates_need_no_user() {
    let app = offline_router().await;

    let response = app
        .oneshot(
            Request::builder()
                .uri("/api/gst/rates")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let body = body_json(response).await;
    let labels: Vec<_> = body["rates"]
        .as_array()
        .unwrap()
        .iter()
        .map(|r| r["label"].as_str().unwrap().to_string())
        .collect();
    assert_eq!(labels, ["NIL", "5%", "12%", "18%", "28%"]);
    assert_eq!(body["defaultRate"], "18");
}

#[tokio::test]
async fn preview_computes_totals() {
    let app = offline_router().await;

    let response = app
        .oneshot(json_request(
            Method::POST,
            "/api/invoices/preview",
            Some(TEST_USER),
            json!({ "products": [{ "quantity": 10, "price": "100", "gstRate": 18 }] }),
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let body = body_json(response).await;
    assert_eq!(body["products"][0]["taxableValue"], "1000.00");
    assert_eq!(body["products"][0]["cgstAmount"], "90.00");
    assert_eq!(body["products"][0]["sgstAmount"], "90.00");
    assert_eq!(body["grandTotal"], "1180.00");
    assert_eq!(body["roundOff"], "0.00");
}

#[tokio::test]
async fn preview_uses_configured_default_rate() {
    let app = offline_router().await;

    let response = app
        .oneshot(json_request(
            Method::POST,
            "/api/invoices/preview",
            Some(TEST_USER),
            json!({ "products": [{ "quantity": "2", "unitPrice": "abc" }, { "quantity": 1, "price": 50 }] }),
        ))
        .await
        .unwrap();

    let body = body_json(response).await;
    assert_eq!(body["products"][0]["totalAmount"], "0.00");
    assert_eq!(body["products"][1]["gstRate"], "18.00");
    assert_eq!(body["products"][1]["gstAmount"], "9.00");
    assert_eq!(body["grandTotal"], "59.00");
}

#[tokio::test]
async fn missing_user_header_is_unauthorized() {
    let app = offline_router().await;

    let response = app
        .oneshot(json_request(
            Method::POST,
            "/api/invoices/preview",
            None,
            json!({ "products": [] }),
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    let body = body_json(response).await;
    assert_eq!(body["error"], "Missing X-User-ID header");
}

#[tokio::test]
async fn invalid_invoice_reports_fields() {
    let app = offline_router().await;
    let mut body = invoice_body();
    body["customer"]["name"] = json!("   ");
    body["products"][1]["quantity"] = json!("0");

    let response = app
        .oneshot(json_request(
            Method::POST,
            "/api/invoices",
            Some(TEST_USER),
            body,
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let body = body_json(response).await;
    assert_eq!(body["error"], "Validation error");
    assert_eq!(body["errors"][0]["field"], "customer.name");
    assert_eq!(body["errors"][0]["message"], "Customer name is required");
    assert_eq!(body["errors"][1]["field"], "products[1].quantity");
}

#[tokio::test]
async fn malformed_json_is_bad_request() {
    let app = offline_router().await;

    let request = Request::builder()
        .method(Method::POST)
        .uri("/api/invoices/preview")
        .header(header::CONTENT_TYPE, "application/json")
        .header("X-User-ID", TEST_USER)
        .body(Body::from("{ not json"))
        .unwrap();
    let response = app.oneshot(request).await.unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let body = body_json(response).await;
    assert!(body["error"]
        .as_str()
        .unwrap()
        .starts_with("Json parse error"));
}

#[tokio::test]
async fn unknown_sort_field_is_bad_request() {
    let app = offline_router().await;

    let response = app
        .oneshot(
            Request::builder()
                .uri("/api/invoices?sortBy=grandTotal")
                .header("X-User-ID", TEST_USER)
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn responses_carry_request_id_and_security_headers() {
    let app = offline_router().await;

    let response = app
        .oneshot(
            Request::builder()
                .uri("/api/gst/rates")
                .header("x-request-id", "req-42")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.headers()["x-request-id"], "req-42");
    assert!(response.headers().contains_key("x-content-type-options"));
}
