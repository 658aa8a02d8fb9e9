//! HTTP-level integration tests for the `/villas` resource.

mod common;

use axum::http::StatusCode;
use common::{
    admin_token, body_json, build_app_with, delete, delete_auth, get, get_auth, patch_json,
    post_json, put_json, test_config, user_token,
};
use serde_json::json;
use villa_api::state::Stores;

fn villa_body(name: &str) -> serde_json::Value {
    json!({
        "name": name,
        "details": "Sea breeze",
        "rate": 250.0,
        "sqft": 120,
        "occupancy": 4,
        "image_url": "",
        "amenity": ""
    })
}

async fn create_villa(app: axum::Router, name: &str) -> serde_json::Value {
    let response = post_json(app, "/api/v1/villas", villa_body(name)).await;
    assert_eq!(response.status(), StatusCode::CREATED);
    body_json(response).await["data"].clone()
}

// ---------------------------------------------------------------------------
// Access control
// ---------------------------------------------------------------------------

#[tokio::test]
async fn test_list_requires_authentication() {
    let app = common::build_test_app();

    let anonymous = get(app.clone(), "/api/v1/villas").await;
    assert_eq!(anonymous.status(), StatusCode::UNAUTHORIZED);

    let garbage = get_auth(app.clone(), "/api/v1/villas", "not-a-token").await;
    assert_eq!(garbage.status(), StatusCode::UNAUTHORIZED);

    let authed = get_auth(app, "/api/v1/villas", &user_token()).await;
    assert_eq!(authed.status(), StatusCode::OK);
}

#[tokio::test]
async fn test_get_by_id_requires_admin() {
    let app = common::build_test_app();
    let villa = create_villa(app.clone(), "Pool View").await;
    let uri = format!("/api/v1/villas/{}", villa["id"]);

    let as_user = get_auth(app.clone(), &uri, &user_token()).await;
    assert_eq!(as_user.status(), StatusCode::FORBIDDEN);

    let as_admin = get_auth(app, &uri, &admin_token()).await;
    assert_eq!(as_admin.status(), StatusCode::OK);
    assert_eq!(body_json(as_admin).await["data"]["name"], "Pool View");
}

#[tokio::test]
async fn test_get_by_id_zero_and_missing() {
    let app = common::build_test_app();

    let zero = get_auth(app.clone(), "/api/v1/villas/0", &admin_token()).await;
    assert_eq!(zero.status(), StatusCode::BAD_REQUEST);

    let missing = get_auth(app, "/api/v1/villas/42", &admin_token()).await;
    assert_eq!(missing.status(), StatusCode::NOT_FOUND);
}

// ---------------------------------------------------------------------------
// Create
// ---------------------------------------------------------------------------

#[tokio::test]
async fn test_create_returns_location_and_rejects_duplicate_name() {
    let app = common::build_test_app();

    let response = post_json(app.clone(), "/api/v1/villas", villa_body("Pool View")).await;
    assert_eq!(response.status(), StatusCode::CREATED);
    let location = response
        .headers()
        .get("location")
        .expect("location header")
        .to_str()
        .unwrap()
        .to_string();
    let json = body_json(response).await;
    assert_eq!(location, format!("/api/v1/villas/{}", json["data"]["id"]));
    assert!(json["data"]["updated_date"].is_null());

    let duplicate = post_json(app, "/api/v1/villas", villa_body("pool view")).await;
    assert_eq!(duplicate.status(), StatusCode::CONFLICT);
}

#[tokio::test]
async fn test_seeded_store_lists_sample_villas() {
    let app = build_app_with(test_config(), Stores::seeded_memory().unwrap());

    let response = get_auth(app, "/api/v1/villas", &user_token()).await;
    let json = body_json(response).await;
    let names: Vec<_> = json["data"]
        .as_array()
        .unwrap()
        .iter()
        .map(|v| v["name"].as_str().unwrap().to_string())
        .collect();
    assert_eq!(names, vec!["Pool View", "Beach View"]);
}

// ---------------------------------------------------------------------------
// Replace / patch
// ---------------------------------------------------------------------------

#[tokio::test]
async fn test_put_replaces_and_stamps_updated_date() {
    let app = common::build_test_app();
    let villa = create_villa(app.clone(), "Pool View").await;
    let id = villa["id"].as_i64().unwrap();
    let uri = format!("/api/v1/villas/{id}");

    let mut body = villa_body("Pool View Deluxe");
    body["id"] = json!(id);
    body["occupancy"] = json!(6);
    let response = put_json(app.clone(), &uri, body).await;
    assert_eq!(response.status(), StatusCode::NO_CONTENT);

    let json = body_json(get_auth(app, &uri, &admin_token()).await).await;
    assert_eq!(json["data"]["name"], "Pool View Deluxe");
    assert_eq!(json["data"]["occupancy"], 6);
    assert_eq!(json["data"]["created_date"], villa["created_date"]);
    assert!(json["data"]["updated_date"].is_string());
}

#[tokio::test]
async fn test_put_with_mismatched_id_is_bad_request() {
    let app = common::build_test_app();
    let villa = create_villa(app.clone(), "Pool View").await;

    let mut body = villa_body("Other");
    body["id"] = json!(999);
    let response = put_json(app, &format!("/api/v1/villas/{}", villa["id"]), body).await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_put_missing_villa_is_not_found() {
    let app = common::build_test_app();
    let mut body = villa_body("Ghost");
    body["id"] = json!(5);

    let response = put_json(app, "/api/v1/villas/5", body).await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_patch_changes_only_supplied_fields() {
    let app = common::build_test_app();
    let villa = create_villa(app.clone(), "Pool View").await;
    let uri = format!("/api/v1/villas/{}", villa["id"]);

    let response = patch_json(app, &uri, json!({ "sqft": 180 })).await;
    assert_eq!(response.status(), StatusCode::OK);

    let json = body_json(response).await;
    assert_eq!(json["data"]["sqft"], 180);
    assert_eq!(json["data"]["name"], "Pool View");
    assert_eq!(json["data"]["occupancy"], 4);
    assert!(json["data"]["updated_date"].is_string());
}

#[tokio::test]
async fn test_patch_into_duplicate_name_is_conflict() {
    let app = common::build_test_app();
    create_villa(app.clone(), "Pool View").await;
    let beach = create_villa(app.clone(), "Beach View").await;

    let response = patch_json(
        app,
        &format!("/api/v1/villas/{}", beach["id"]),
        json!({ "name": "POOL VIEW" }),
    )
    .await;
    assert_eq!(response.status(), StatusCode::CONFLICT);
}

// ---------------------------------------------------------------------------
// Delete
// ---------------------------------------------------------------------------

#[tokio::test]
async fn test_delete_requires_admin_and_removes_row() {
    let app = common::build_test_app();
    let villa = create_villa(app.clone(), "Pool View").await;
    let uri = format!("/api/v1/villas/{}", villa["id"]);

    let anonymous = delete(app.clone(), &uri).await;
    assert_eq!(anonymous.status(), StatusCode::UNAUTHORIZED);

    let as_user = delete_auth(app.clone(), &uri, &user_token()).await;
    assert_eq!(as_user.status(), StatusCode::FORBIDDEN);

    let as_admin = delete_auth(app.clone(), &uri, &admin_token()).await;
    assert_eq!(as_admin.status(), StatusCode::NO_CONTENT);

    let again = delete_auth(app, &uri, &admin_token()).await;
    assert_eq!(again.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_oversized_villa_body_is_rejected() {
    let app = common::build_test_app();
    let mut body = villa_body("Pool View");
    body["details"] = json!("x".repeat(villa_api::router::API_BODY_LIMIT_BYTES));

    let response = post_json(app.clone(), "/api/v1/villas", body).await;
    assert_eq!(response.status(), StatusCode::PAYLOAD_TOO_LARGE);

    let listed = body_json(get_auth(app, "/api/v1/villas", &user_token()).await).await;
    assert!(listed["data"].as_array().unwrap().is_empty());
}
