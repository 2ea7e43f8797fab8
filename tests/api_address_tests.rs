// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Guest address book API tests.
//!
//! These tests verify that:
//! 1. Guest CRUD round-trips through the local store with generated ids
//! 2. Form validation errors surface per-field before any store write
//! 3. Selection falls back correctly when addresses are removed

use axum::{
    body::Body,
    http::{header, Request, StatusCode},
};
use tower::ServiceExt;

mod common;

fn valid_address() -> serde_json::Value {
    serde_json::json!({
        "full_name": "Asha Verma",
        "mobile": "9876543210",
        "pincode": "110001",
        "address_line": "14 Janpath Lane",
        "city": "New Delhi",
        "state": "Delhi",
        "address_type": "home",
        "is_default": false
    })
}

fn json_request(method: &str, uri: &str, body: serde_json::Value) -> Request<Body> {
    Request::builder()
        .method(method)
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

fn get(uri: &str) -> Request<Body> {
    Request::builder()
        .method("GET")
        .uri(uri)
        .body(Body::empty())
        .unwrap()
}

fn delete(uri: &str) -> Request<Body> {
    Request::builder()
        .method("DELETE")
        .uri(uri)
        .body(Body::empty())
        .unwrap()
}

#[tokio::test]
async fn test_create_then_list_shows_one_selected_address() {
    let app = common::create_test_app();

    let response = app
        .router
        .clone()
        .oneshot(json_request("POST", "/api/addresses", valid_address()))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::CREATED);

    let created = common::body_json(response).await;
    let id = created["id"].as_str().unwrap().to_string();
    assert!(id.starts_with("guest-"));
    assert!(created.get("user_id").is_none());

    let response = app.router.oneshot(get("/api/addresses")).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let selection = common::body_json(response).await;
    assert_eq!(selection["addresses"].as_array().unwrap().len(), 1);
    assert_eq!(selection["addresses"][0]["id"], id.as_str());
    assert_eq!(selection["selected_id"], id.as_str());
}

#[tokio::test]
async fn test_invalid_mobile_surfaces_field_error() {
    let app = common::create_test_app();

    let mut body = valid_address();
    body["mobile"] = serde_json::json!("12345");

    let response = app
        .router
        .clone()
        .oneshot(json_request("POST", "/api/addresses", body))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);

    let error = common::body_json(response).await;
    assert_eq!(error["error"], "validation_error");
    assert!(error["fields"].get("mobile").is_some());

    // Nothing was written.
    let response = app.router.oneshot(get("/api/addresses")).await.unwrap();
    let selection = common::body_json(response).await;
    assert!(selection["addresses"].as_array().unwrap().is_empty());
}

#[tokio::test]
async fn test_update_changes_fields_and_keeps_id() {
    let app = common::create_test_app();

    let response = app
        .router
        .clone()
        .oneshot(json_request("POST", "/api/addresses", valid_address()))
        .await
        .unwrap();
    let created = common::body_json(response).await;
    let id = created["id"].as_str().unwrap().to_string();

    let mut changed = valid_address();
    changed["full_name"] = serde_json::json!("Asha V.");
    changed["address_type"] = serde_json::json!("work");

    let response = app
        .router
        .clone()
        .oneshot(json_request(
            "PUT",
            &format!("/api/addresses/{}", id),
            changed,
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let updated = common::body_json(response).await;
    assert_eq!(updated["id"], id.as_str());
    assert_eq!(updated["full_name"], "Asha V.");
    assert_eq!(updated["address_type"], "work");
    assert_eq!(updated["created_at"], created["created_at"]);
}

#[tokio::test]
async fn test_update_unknown_address_is_404() {
    let app = common::create_test_app();

    let response = app
        .router
        .oneshot(json_request(
            "PUT",
            "/api/addresses/guest-0-0",
            valid_address(),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_delete_only_address_clears_selection() {
    let app = common::create_test_app();

    let response = app
        .router
        .clone()
        .oneshot(json_request("POST", "/api/addresses", valid_address()))
        .await
        .unwrap();
    let created = common::body_json(response).await;
    let id = created["id"].as_str().unwrap();

    let response = app
        .router
        .oneshot(delete(&format!("/api/addresses/{}", id)))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let selection = common::body_json(response).await;
    assert!(selection["addresses"].as_array().unwrap().is_empty());
    assert!(selection.get("selected_id").is_none());
}

#[tokio::test]
async fn test_default_address_is_auto_selected_on_open() {
    let app = common::create_test_app();

    // Two addresses; the second is the default.
    let response = app
        .router
        .clone()
        .oneshot(json_request("POST", "/api/addresses", valid_address()))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::CREATED);

    let mut favorite = valid_address();
    favorite["full_name"] = serde_json::json!("Bina Rao");
    favorite["is_default"] = serde_json::json!(true);
    let response = app
        .router
        .clone()
        .oneshot(json_request("POST", "/api/addresses", favorite))
        .await
        .unwrap();
    let fav = common::body_json(response).await;

    // Drop the selection, as a fresh page load with a cleared key would.
    app.state
        .local
        .remove(ogura_location::db::local::keys::SELECTED_ADDRESS);

    let response = app.router.oneshot(get("/api/addresses")).await.unwrap();
    let selection = common::body_json(response).await;
    assert_eq!(selection["selected_id"], fav["id"]);
}

#[tokio::test]
async fn test_explicit_select() {
    let app = common::create_test_app();

    let response = app
        .router
        .clone()
        .oneshot(json_request("POST", "/api/addresses", valid_address()))
        .await
        .unwrap();
    let first = common::body_json(response).await;

    let mut second_body = valid_address();
    second_body["full_name"] = serde_json::json!("Bina Rao");
    let response = app
        .router
        .clone()
        .oneshot(json_request("POST", "/api/addresses", second_body))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::CREATED);

    // The second add selected itself; switch back to the first.
    let response = app
        .router
        .clone()
        .oneshot(json_request(
            "POST",
            &format!("/api/addresses/{}/select", first["id"].as_str().unwrap()),
            serde_json::json!({}),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let response = app.router.oneshot(get("/api/addresses")).await.unwrap();
    let selection = common::body_json(response).await;
    assert_eq!(selection["selected_id"], first["id"]);
}

#[tokio::test]
async fn test_select_unknown_address_is_404() {
    let app = common::create_test_app();

    let response = app
        .router
        .oneshot(json_request(
            "POST",
            "/api/addresses/guest-0-0/select",
            serde_json::json!({}),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}
