//! Integration tests for the checkout preference endpoint: validation,
//! credential handling and gateway error surfacing.

mod common;

use axum::http::{Method, StatusCode};
use common::{assert_status, response_json, MockGateway, TestApp};
use serde_json::json;

#[tokio::test]
async fn valid_payload_returns_the_redirect_urls() {
    let app = TestApp::new().await;

    let response = app
        .request(
            Method::POST,
            "/api/v1/checkout/preferences",
            Some(json!({"title": "3 Tokens", "unit_price": 3})),
        )
        .await;

    assert_status(&response, StatusCode::OK);
    let body = response_json(response).await;
    assert!(!body["id"].as_str().unwrap().is_empty());
    assert!(!body["init_point"].as_str().unwrap().is_empty());
    assert!(body["sandbox_init_point"].is_string());
}

#[tokio::test]
async fn missing_unit_price_is_rejected() {
    let app = TestApp::new().await;

    let response = app
        .request(
            Method::POST,
            "/api/v1/checkout/preferences",
            Some(json!({"title": "3 Tokens"})),
        )
        .await;

    assert_status(&response, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn missing_title_is_rejected() {
    let app = TestApp::new().await;

    let response = app
        .request(
            Method::POST,
            "/api/v1/checkout/preferences",
            Some(json!({"unit_price": 3})),
        )
        .await;

    assert_status(&response, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn non_positive_price_is_rejected() {
    let app = TestApp::new().await;

    let response = app
        .request(
            Method::POST,
            "/api/v1/checkout/preferences",
            Some(json!({"title": "3 Tokens", "unit_price": 0})),
        )
        .await;

    assert_status(&response, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn missing_credential_surfaces_a_500() {
    let app = TestApp::with_gateway(MockGateway::without_credential()).await;

    let response = app
        .request(
            Method::POST,
            "/api/v1/checkout/preferences",
            Some(json!({"title": "3 Tokens", "unit_price": 3})),
        )
        .await;

    assert_status(&response, StatusCode::INTERNAL_SERVER_ERROR);
}

#[tokio::test]
async fn gateway_rejection_surfaces_a_502_with_the_upstream_body() {
    let app = TestApp::with_gateway(MockGateway::failing_preferences(
        400,
        r#"{"message":"invalid access token"}"#,
    ))
    .await;

    let response = app
        .request(
            Method::POST,
            "/api/v1/checkout/preferences",
            Some(json!({"title": "3 Tokens", "unit_price": 3})),
        )
        .await;

    assert_status(&response, StatusCode::BAD_GATEWAY);
    let body = response_json(response).await;
    assert!(body["details"]
        .as_str()
        .unwrap()
        .contains("invalid access token"));
}
