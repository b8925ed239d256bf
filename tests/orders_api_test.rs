//! Integration tests for the order API: pending-order creation and the
//! owner-fallback dashboard listing.

mod common;

use axum::http::{Method, StatusCode};
use chrono::{Duration, Utc};
use common::{assert_status, response_json, OrderSeed, TestApp};
use serde_json::json;

#[tokio::test]
async fn creating_an_order_writes_a_pending_record() {
    let app = TestApp::new().await;

    let response = app
        .request(
            Method::POST,
            "/api/v1/orders",
            Some(json!({
                "title": "5 Tokens XTreino",
                "amount": "5.00",
                "quantity": 5,
                "purchase_kind": "tokens",
                "external_reference": "ref-abc",
                "buyer_email": "a@x.com",
                "buyer_uid": "uid-1"
            })),
        )
        .await;

    assert_status(&response, StatusCode::CREATED);
    let body = response_json(response).await;
    assert_eq!(body["data"]["status"], json!("pending"));
    assert_eq!(body["data"]["external_reference"], json!("ref-abc"));
    assert_eq!(body["data"]["purchase_kind"], json!("tokens"));
}

#[tokio::test]
async fn duplicate_external_references_are_rejected() {
    let app = TestApp::new().await;
    app.seed_order(OrderSeed::tokens("ref-dup", 1, "a@x.com"))
        .await;

    let response = app
        .request(
            Method::POST,
            "/api/v1/orders",
            Some(json!({
                "title": "1 Token",
                "amount": "1.00",
                "purchase_kind": "tokens",
                "external_reference": "ref-dup"
            })),
        )
        .await;

    assert_status(&response, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn listing_requires_some_identity() {
    let app = TestApp::new().await;

    let response = app
        .request(Method::GET, "/api/v1/orders/mine", None)
        .await;

    assert_status(&response, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn listing_falls_back_to_the_legacy_owner_column() {
    let app = TestApp::new().await;

    // Historical order written with the legacy customer_email field only.
    let mut seed = OrderSeed::tokens("ref-legacy", 2, "x@y.com");
    seed.buyer_email = None;
    seed.customer_email = Some("legacy@y.com".to_string());
    app.seed_order(seed).await;

    let response = app
        .request(
            Method::GET,
            "/api/v1/orders/mine?email=legacy@y.com",
            None,
        )
        .await;

    assert_status(&response, StatusCode::OK);
    let body = response_json(response).await;
    assert_eq!(body["data"].as_array().unwrap().len(), 1);
}

#[tokio::test]
async fn first_matching_owner_field_wins_without_merging() {
    let app = TestApp::new().await;

    app.seed_order(OrderSeed::tokens("ref-canonical", 1, "both@y.com"))
        .await;
    let mut legacy = OrderSeed::tokens("ref-old", 1, "ignored@y.com");
    legacy.buyer_email = None;
    legacy.customer_email = Some("both@y.com".to_string());
    app.seed_order(legacy).await;

    let response = app
        .request(Method::GET, "/api/v1/orders/mine?email=both@y.com", None)
        .await;

    assert_status(&response, StatusCode::OK);
    let body = response_json(response).await;
    // Only the buyer_email hit is returned; the legacy row is not merged in.
    let rows = body["data"].as_array().unwrap();
    assert_eq!(rows.len(), 1);
    assert_eq!(rows[0]["external_reference"], json!("ref-canonical"));
}

#[tokio::test]
async fn uid_lookup_applies_when_no_email_matches() {
    let app = TestApp::new().await;

    let mut seed = OrderSeed::tokens("ref-uid", 1, "someone@y.com");
    seed.buyer_email = None;
    seed.buyer_uid = Some("uid-9".to_string());
    app.seed_order(seed).await;

    let response = app
        .request(
            Method::GET,
            "/api/v1/orders/mine?email=nobody@y.com&uid=uid-9",
            None,
        )
        .await;

    assert_status(&response, StatusCode::OK);
    let body = response_json(response).await;
    assert_eq!(body["data"].as_array().unwrap().len(), 1);
}

#[tokio::test]
async fn listing_is_newest_first_and_capped() {
    let app = TestApp::new().await;

    for age in 0..3 {
        let mut seed = OrderSeed::tokens(&format!("ref-{}", age), 1, "sorted@y.com");
        seed.created_at = Some(Utc::now() - Duration::hours(age));
        app.seed_order(seed).await;
    }

    let response = app
        .request(
            Method::GET,
            "/api/v1/orders/mine?email=sorted@y.com&limit=2",
            None,
        )
        .await;

    assert_status(&response, StatusCode::OK);
    let body = response_json(response).await;
    let rows = body["data"].as_array().unwrap();
    assert_eq!(rows.len(), 2);
    assert_eq!(rows[0]["external_reference"], json!("ref-0"));
    assert_eq!(rows[1]["external_reference"], json!("ref-1"));
}
