//! HTTP-level integration tests for the `/villa-numbers` resource.

mod common;

use axum::http::StatusCode;
use common::{body_json, delete, get, patch_json, post_json, put_json};
use serde_json::json;

async fn create_villa(app: axum::Router, name: &str) -> i64 {
    let body = json!({ "name": name, "sqft": 100, "occupancy": 2 });
    let response = post_json(app, "/api/v1/villas", body).await;
    assert_eq!(response.status(), StatusCode::CREATED);
    body_json(response).await["data"]["id"].as_i64().unwrap()
}

#[tokio::test]
async fn test_create_and_fetch_by_number() {
    let app = common::build_test_app();
    let villa_id = create_villa(app.clone(), "Pool View").await;

    let response = post_json(
        app.clone(),
        "/api/v1/villa-numbers",
        json!({ "villa_no": 101, "villa_id": villa_id, "special_details": "Corner unit" }),
    )
    .await;
    assert_eq!(response.status(), StatusCode::CREATED);
    assert_eq!(
        response.headers().get("location").unwrap(),
        "/api/v1/villa-numbers/101"
    );

    let fetched = get(app, "/api/v1/villa-numbers/101").await;
    assert_eq!(fetched.status(), StatusCode::OK);
    let json = body_json(fetched).await;
    assert_eq!(json["data"]["villa_id"], villa_id);
    assert_eq!(json["data"]["special_details"], "Corner unit");
}

#[tokio::test]
async fn test_duplicate_number_is_conflict() {
    let app = common::build_test_app();
    let villa_id = create_villa(app.clone(), "Pool View").await;
    let body = json!({ "villa_no": 7, "villa_id": villa_id });

    assert_eq!(
        post_json(app.clone(), "/api/v1/villa-numbers", body.clone()).await.status(),
        StatusCode::CREATED
    );
    assert_eq!(
        post_json(app, "/api/v1/villa-numbers", body).await.status(),
        StatusCode::CONFLICT
    );
}

#[tokio::test]
async fn test_unknown_parent_villa_is_rejected() {
    let app = common::build_test_app();

    let response = post_json(
        app,
        "/api/v1/villa-numbers",
        json!({ "villa_no": 7, "villa_id": 404 }),
    )
    .await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(body_json(response).await["code"], "INVALID_REFERENCE");
}

#[tokio::test]
async fn test_zero_number_is_bad_request() {
    let app = common::build_test_app();
    assert_eq!(
        get(app, "/api/v1/villa-numbers/0").await.status(),
        StatusCode::BAD_REQUEST
    );
}

#[tokio::test]
async fn test_replace_patch_and_delete() {
    let app = common::build_test_app();
    let first = create_villa(app.clone(), "Pool View").await;
    let second = create_villa(app.clone(), "Beach View").await;
    post_json(
        app.clone(),
        "/api/v1/villa-numbers",
        json!({ "villa_no": 12, "villa_id": first }),
    )
    .await;

    let mismatch = put_json(
        app.clone(),
        "/api/v1/villa-numbers/12",
        json!({ "villa_no": 13, "villa_id": second }),
    )
    .await;
    assert_eq!(mismatch.status(), StatusCode::BAD_REQUEST);

    let replaced = put_json(
        app.clone(),
        "/api/v1/villa-numbers/12",
        json!({ "villa_no": 12, "villa_id": second, "special_details": "Moved" }),
    )
    .await;
    assert_eq!(replaced.status(), StatusCode::NO_CONTENT);

    let bad_patch = patch_json(
        app.clone(),
        "/api/v1/villa-numbers/12",
        json!({ "villa_id": 999 }),
    )
    .await;
    assert_eq!(bad_patch.status(), StatusCode::BAD_REQUEST);

    let patched = patch_json(
        app.clone(),
        "/api/v1/villa-numbers/12",
        json!({ "special_details": "Renovated" }),
    )
    .await;
    let json = body_json(patched).await;
    assert_eq!(json["data"]["villa_id"], second);
    assert_eq!(json["data"]["special_details"], "Renovated");
    assert!(json["data"]["updated_date"].is_string());

    assert_eq!(
        delete(app.clone(), "/api/v1/villa-numbers/12").await.status(),
        StatusCode::NO_CONTENT
    );
    assert_eq!(
        get(app, "/api/v1/villa-numbers/12").await.status(),
        StatusCode::NOT_FOUND
    );
}
