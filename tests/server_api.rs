use axum::body::Body;
use axum::http::{Request, StatusCode};
use http_body_util::BodyExt;
use serde_json::Value;
use std::sync::Arc;
use tower::ServiceExt;

use ezma::catalog::BuiltinCatalog;
use ezma::config::Settings;
use ezma::server::{build_router, AppState};

async fn get(uri: &str) -> (StatusCode, Value) {
    let state = AppState::new(Arc::new(BuiltinCatalog), Settings::default());
    let response = build_router(state)
        .oneshot(Request::builder().uri(uri).body(Body::empty()).unwrap())
        .await
        .unwrap();
    let status = response.status();
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    let body = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap_or(Value::Null)
    };
    (status, body)
}

fn ids(body: &Value) -> Vec<u64> {
    body["results"]
        .as_array()
        .unwrap()
        .iter()
        .map(|r| r["id"].as_u64().unwrap())
        .collect()
}

#[tokio::test]
async fn nearby_with_coordinates() {
    let (status, body) = get("/api/nearby?lat=41.311081&lon=69.280624&radius=5").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(ids(&body), vec![1, 4, 2]);
    assert_eq!(body["results"][2]["distanceKm"], 3.4);
    assert_eq!(body["radiusKm"], 5.0);
    assert_eq!(body["usedFallback"], false);
}

#[tokio::test]
async fn nearby_defaults_to_city_center() {
    let (status, body) = get("/api/nearby").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["usedFallback"], true);
    assert_eq!(body["radiusKm"], 10.0);
    assert_eq!(body["center"]["latitude"], 41.311081);
    assert_eq!(ids(&body), vec![1, 4, 2]);
}

#[tokio::test]
async fn nearby_all_includes_unlisted_libraries() {
    let (_, body) = get("/api/nearby?all=true").await;
    assert_eq!(ids(&body), vec![1, 4, 6, 5, 2, 3]);
}

#[tokio::test]
async fn nearby_rejects_bad_input() {
    let (status, body) = get("/api/nearby?lat=200&lon=69.28").await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["code"], 400);
    assert!(body["error"].as_str().unwrap().contains("latitude"));

    let (status, _) = get("/api/nearby?lat=41.3&lon=69.28&radius=-5").await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, _) = get("/api/nearby?lat=41.3").await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn library_search_and_detail() {
    let (status, body) = get("/api/libraries?search=akademiyasi").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(ids(&body), vec![4]);

    let (status, body) = get("/api/libraries/2").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["email"], "library@nuu.uz");
    assert_eq!(body["status"], "active");

    let (status, body) = get("/api/libraries/99").await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["code"], 404);
}

#[tokio::test]
async fn library_books() {
    let (status, body) = get("/api/libraries/4/books").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(ids(&body), vec![4, 10]);
}

#[tokio::test]
async fn book_search_and_nearest_holding() {
    let (status, body) = get("/api/books?query=shum").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(ids(&body), vec![4]);
    assert_eq!(body["results"][0]["libraries"].as_array().unwrap().len(), 2);

    let (status, body) = get("/api/books/4/nearest?lat=41.325876&lon=69.290123").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(ids(&body), vec![4, 1]);

    let (status, _) = get("/api/books/999/nearest").await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn malformed_query_string_gets_json_error() {
    let (status, body) = get("/api/nearby?lat=abc&lon=69.2").await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["code"], 400);
    assert!(body["error"].as_str().unwrap().contains("lat"));

    let (status, body) = get("/api/libraries?all=maybe").await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["code"], 400);
}

#[tokio::test]
async fn malformed_path_id_gets_json_error() {
    let (status, body) = get("/api/libraries/abc").await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["code"], 400);
    assert!(body["error"].is_string());
}
