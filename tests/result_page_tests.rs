//! Result page and error contract tests that run without a database.

mod common;

use axum::body::Body;
use axum::http::{header, Request, StatusCode};
use http_body_util::BodyExt;
use tower::ServiceExt;

use common::test_app;

async fn send(request: Request<Body>) -> (StatusCode, String) {
    let response = test_app().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    (status, String::from_utf8(bytes.to_vec()).unwrap())
}

#[tokio::test]
async fn test_order_result_without_trade_no_shows_missing_page() {
    let request = Request::builder()
        .method("GET")
        .uri("/ecpay/order_result")
        .body(Body::empty())
        .unwrap();

    let (status, body) = send(request).await;
    assert_eq!(status, StatusCode::OK);
    assert!(body.contains("Order not specified"));
    // the back link falls back to the configured ClientBackURL
    assert!(body.contains("https://broker.test/"));
}

#[tokio::test]
async fn test_order_result_accepts_form_post() {
    // Gateway redirects arrive as POSTs; a blank trade number still
    // renders the missing page rather than an error.
    let request = Request::builder()
        .method("POST")
        .uri("/ecpay/order_result")
        .header(header::CONTENT_TYPE, "application/x-www-form-urlencoded")
        .body(Body::from("MerchantTradeNo="))
        .unwrap();

    let (status, body) = send(request).await;
    assert_eq!(status, StatusCode::OK);
    assert!(body.contains("Order not specified"));
}

#[tokio::test]
async fn test_download_with_unavailable_database_maps_to_database_error() {
    let request = Request::builder()
        .method("GET")
        .uri("/ecpay/download/sometoken")
        .body(Body::empty())
        .unwrap();

    let (status, body) = send(request).await;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert!(body.contains("DATABASE_ERROR"));
}

#[tokio::test]
async fn test_health_reports_unhealthy_database() {
    let request = Request::builder()
        .method("GET")
        .uri("/health")
        .body(Body::empty())
        .unwrap();

    let (status, body) = send(request).await;
    assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
    assert!(body.contains("\"unhealthy\""));
}
