//! Integration tests for profiles: lazy creation on first access and
//! contact-field edits that never touch the token balance.

mod common;

use axum::http::{Method, StatusCode};
use common::{assert_status, response_json, TestApp};
use serde_json::json;

#[tokio::test]
async fn first_access_creates_a_default_profile() {
    let app = TestApp::new().await;

    let response = app
        .request(
            Method::GET,
            "/api/v1/users/uid-new?email=new@x.com",
            None,
        )
        .await;

    assert_status(&response, StatusCode::OK);
    let body = response_json(response).await;
    assert_eq!(body["data"]["uid"], json!("uid-new"));
    assert_eq!(body["data"]["email"], json!("new@x.com"));
    assert_eq!(body["data"]["tokens"], json!(0));
    assert_eq!(body["data"]["role"], json!("user"));

    // The second access returns the same profile instead of a fresh one.
    let again = app
        .request(
            Method::GET,
            "/api/v1/users/uid-new?email=new@x.com",
            None,
        )
        .await;
    let again_body = response_json(again).await;
    assert_eq!(again_body["data"]["id"], body["data"]["id"]);
}

#[tokio::test]
async fn unknown_uid_without_email_is_a_404() {
    let app = TestApp::new().await;

    let response = app
        .request(Method::GET, "/api/v1/users/uid-ghost", None)
        .await;

    assert_status(&response, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn profile_edits_do_not_touch_the_token_balance() {
    let app = TestApp::new().await;
    app.seed_user("uid-1", "a@x.com", 7).await;

    let response = app
        .request(
            Method::PUT,
            "/api/v1/users/uid-1",
            Some(json!({"display_name": "Player One", "phone": "+55 11 99999-9999"})),
        )
        .await;

    assert_status(&response, StatusCode::OK);
    let body = response_json(response).await;
    assert_eq!(body["data"]["display_name"], json!("Player One"));
    assert_eq!(body["data"]["tokens"], json!(7));
}
