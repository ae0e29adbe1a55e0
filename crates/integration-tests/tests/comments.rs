//! Comment lifecycle through the HTTP surface.

#![allow(clippy::unwrap_used)]

use axum::http::{Method, StatusCode};
use serde_json::json;

use bionicle_core::ProductId;
use bionicle_integration_tests::TestApp;

#[tokio::test]
async fn test_mutations_without_session_are_rejected_and_write_nothing() {
    let app = TestApp::new();
    let owner = app.register("tahu").await;
    let product = ProductId::generate();
    let created = app
        .post(
            &format!("/api/comment/{product}"),
            Some(&owner),
            json!({ "formData": { "body": "Hot stuff" } }),
        )
        .await;
    let id = created.body["_id"].as_str().unwrap().to_owned();

    let create = app
        .post(
            &format!("/api/comment/{product}"),
            None,
            json!({ "formData": { "body": "anon" } }),
        )
        .await;
    let edit = app
        .post(
            &format!("/api/comment/edit/{id}"),
            None,
            json!({ "formData": { "body": "anon", "productID": product.to_string() } }),
        )
        .await;
    let remove = app
        .send(Method::POST, &format!("/api/comment/remove/{id}"), None, None)
        .await;

    for response in [&create, &edit, &remove] {
        assert_eq!(response.status, StatusCode::UNAUTHORIZED);
        assert_eq!(response.body["error"]["code"], "unauthorized");
    }

    let listed = app.get(&format!("/api/comments/{product}"), None).await;
    assert_eq!(listed.body.as_array().unwrap().len(), 1);
    assert_eq!(listed.body[0]["body"], "Hot stuff");
}

#[tokio::test]
async fn test_unauthorized_even_with_malformed_body() {
    let app = TestApp::new();
    let response = app
        .send(
            Method::POST,
            &format!("/api/comment/{}", ProductId::generate()),
            None,
            Some(json!("not a payload")),
        )
        .await;
    assert_eq!(response.status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_author_comes_from_session_not_body() {
    let app = TestApp::new();
    let cookie = app.register("gali").await;
    let product = ProductId::generate();

    let response = app
        .post(
            &format!("/api/comment/{product}"),
            Some(&cookie),
            json!({ "formData": { "body": "Water is nice", "name": "makuta" }, "name": "makuta" }),
        )
        .await;

    assert_eq!(response.status, StatusCode::OK);
    assert_eq!(response.body["name"], "gali");
    assert_eq!(response.body["product"], product.to_string());
    assert_eq!(response.body["body"], "Water is nice");
    assert!(response.body["created"].is_string());
}

#[tokio::test]
async fn test_non_owner_delete_is_silent_noop() {
    let app = TestApp::new();
    let owner = app.register("onua").await;
    let intruder = app.register("lewa").await;
    let product = ProductId::generate();

    let created = app
        .post(
            &format!("/api/comment/{product}"),
            Some(&owner),
            json!({ "formData": { "body": "Earth" } }),
        )
        .await;
    let id = created.body["_id"].as_str().unwrap().to_owned();

    let response = app
        .send(
            Method::POST,
            &format!("/api/comment/remove/{id}"),
            Some(&intruder),
            None,
        )
        .await;
    assert_eq!(response.status, StatusCode::OK);
    assert_eq!(response.body, serde_json::Value::Null);
    assert_eq!(app.store.comment_count().await, 1);

    let response = app
        .send(
            Method::POST,
            &format!("/api/comment/remove/{id}"),
            Some(&owner),
            None,
        )
        .await;
    assert_eq!(response.status, StatusCode::OK);
    assert_eq!(app.store.comment_count().await, 0);
}

#[tokio::test]
async fn test_edit_replaces_whole_document() {
    let app = TestApp::new();
    let cookie = app.register("pohatu").await;
    let first = ProductId::generate();
    let second = ProductId::generate();

    let created = app
        .post(
            &format!("/api/comment/{first}"),
            Some(&cookie),
            json!({ "formData": { "body": "Stone" } }),
        )
        .await;
    let id = created.body["_id"].as_str().unwrap().to_owned();

    let edited = app
        .post(
            &format!("/api/comment/edit/{id}"),
            Some(&cookie),
            json!({ "formData": { "body": "Stone kick", "productID": second.to_string() } }),
        )
        .await;
    assert_eq!(edited.status, StatusCode::OK);
    assert_eq!(edited.body["_id"], id);
    assert_eq!(edited.body["name"], "pohatu");
    assert_eq!(edited.body["body"], "Stone kick");
    assert_eq!(edited.body["product"], second.to_string());

    let old = app.get(&format!("/api/comments/{first}"), None).await;
    assert_eq!(old.body, json!([]));
    let new = app.get(&format!("/api/comments/{second}"), None).await;
    assert_eq!(new.body.as_array().unwrap().len(), 1);
}

#[tokio::test]
async fn test_edit_of_someone_elses_comment_is_not_found() {
    let app = TestApp::new();
    let owner = app.register("kopaka").await;
    let intruder = app.register("lewa").await;
    let product = ProductId::generate();

    let created = app
        .post(
            &format!("/api/comment/{product}"),
            Some(&owner),
            json!({ "formData": { "body": "Ice" } }),
        )
        .await;
    let id = created.body["_id"].as_str().unwrap().to_owned();

    let response = app
        .post(
            &format!("/api/comment/edit/{id}"),
            Some(&intruder),
            json!({ "formData": { "body": "Air", "productID": product.to_string() } }),
        )
        .await;
    assert_eq!(response.status, StatusCode::NOT_FOUND);
    assert_eq!(response.body["error"]["code"], "comment_not_found");

    let listed = app.get(&format!("/api/comments/{product}"), None).await;
    assert_eq!(listed.body[0]["body"], "Ice");
    assert_eq!(listed.body[0]["name"], "kopaka");
}

#[tokio::test]
async fn test_validation_errors() {
    let app = TestApp::new();
    let cookie = app.register("tahu").await;
    let product = ProductId::generate();

    let blank = app
        .post(
            &format!("/api/comment/{product}"),
            Some(&cookie),
            json!({ "formData": { "body": "  " } }),
        )
        .await;
    assert_eq!(blank.status, StatusCode::BAD_REQUEST);
    assert_eq!(blank.body["error"]["code"], "invalid_body");

    let bad_product = app
        .post(
            "/api/comment/not-a-product",
            Some(&cookie),
            json!({ "formData": { "body": "ok" } }),
        )
        .await;
    assert_eq!(bad_product.status, StatusCode::BAD_REQUEST);
    assert_eq!(bad_product.body["error"]["code"], "invalid_id");

    let bad_json = app
        .post(
            &format!("/api/comment/{product}"),
            Some(&cookie),
            json!({ "body": "missing formData" }),
        )
        .await;
    assert_eq!(bad_json.status, StatusCode::BAD_REQUEST);
    assert_eq!(bad_json.body["error"]["code"], "invalid_json");

    assert_eq!(app.store.comment_count().await, 0);
}

#[tokio::test]
async fn test_comments_for_product_without_any_is_empty() {
    let app = TestApp::new();
    let response = app
        .get(&format!("/api/comments/{}", ProductId::generate()), None)
        .await;
    assert_eq!(response.status, StatusCode::OK);
    assert_eq!(response.body, json!([]));
}
