//! Integration tests for the download proxy: manifest listing and the
//! error contract. File streaming itself needs a live upstream and is
//! covered by the manifest/validation paths here.

mod common;

use axum::http::{Method, StatusCode};
use common::{assert_status, response_json, TestApp};
use serde_json::json;
use uuid::Uuid;

fn two_links() -> serde_json::Value {
    json!([
        {"name": "Bermuda Remix", "url": "https://xtreino.com.br/downloads/BERMUDA.zip", "description": "Pacote de imagens do mapa Bermuda Remix"},
        {"name": "Nova Arena", "url": "https://xtreino.com.br/downloads/imagens-nova-arena.zip"}
    ])
}

#[tokio::test]
async fn list_returns_a_manifest_without_urls() {
    let app = TestApp::new().await;
    let order_id = Uuid::new_v4();
    app.seed_delivery(order_id, two_links()).await;

    let response = app
        .request(
            Method::GET,
            &format!("/api/v1/downloads?orderId={}&list=1", order_id),
            None,
        )
        .await;

    assert_status(&response, StatusCode::OK);
    let body = response_json(response).await;
    let files = body["files"].as_array().unwrap();
    assert_eq!(files.len(), 2);
    for (index, file) in files.iter().enumerate() {
        assert_eq!(file["index"], json!(index));
        assert!(file["name"].is_string());
        assert!(file.get("url").is_none(), "manifest must omit urls");
    }
}

#[tokio::test]
async fn snake_case_order_id_is_accepted_too() {
    let app = TestApp::new().await;
    let order_id = Uuid::new_v4();
    app.seed_delivery(order_id, two_links()).await;

    let response = app
        .request(
            Method::GET,
            &format!("/api/v1/downloads?order_id={}&list=1", order_id),
            None,
        )
        .await;

    assert_status(&response, StatusCode::OK);
}

#[tokio::test]
async fn unknown_order_is_a_404() {
    let app = TestApp::new().await;

    let response = app
        .request(
            Method::GET,
            &format!("/api/v1/downloads?orderId={}&list=1", Uuid::new_v4()),
            None,
        )
        .await;

    assert_status(&response, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn out_of_range_index_is_a_400() {
    let app = TestApp::new().await;
    let order_id = Uuid::new_v4();
    app.seed_delivery(order_id, two_links()).await;

    let response = app
        .request(
            Method::GET,
            &format!("/api/v1/downloads?orderId={}&i=5", order_id),
            None,
        )
        .await;

    assert_status(&response, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn empty_file_url_is_a_500() {
    let app = TestApp::new().await;
    let order_id = Uuid::new_v4();
    app.seed_delivery(order_id, json!([{"name": "Quebrado", "url": ""}]))
        .await;

    let response = app
        .request(
            Method::GET,
            &format!("/api/v1/downloads?orderId={}", order_id),
            None,
        )
        .await;

    assert_status(&response, StatusCode::INTERNAL_SERVER_ERROR);
}
