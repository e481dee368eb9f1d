//! SmugMug client tests against an in-process fake API.
//!
//! Run with: cargo test -p encore-core --test smugmug_client

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use axum::{
    extract::{Path, Query, RawQuery},
    http::{HeaderMap, StatusCode, Uri},
    response::IntoResponse,
    routing::get,
    Json, Router,
};
use serde_json::json;
use tempfile::TempDir;

use encore_core::{
    resolve_folder, AggregatorConfig, CuratedIndexCache, CuratedIndexService, CuratedIndexer,
    EncoreError, PhotoSource, Region, SmugMugClient, SmugMugConfig,
};

const API_KEY: &str = "fake-key";

fn has_key(query: &Option<String>) -> bool {
    query
        .as_deref()
        .is_some_and(|q| q.split('&').any(|p| p == format!("APIKey={API_KEY}")))
}

async fn album(Path(key): Path<String>, RawQuery(query): RawQuery) -> impl IntoResponse {
    if !has_key(&query) {
        return (StatusCode::UNAUTHORIZED, "missing APIKey").into_response();
    }
    match key.as_str() {
        "alb" => Json(json!({
            "Response": {"Album": {"AlbumKey": "alb", "Keywords": "Soundcheck; Encore"}}
        }))
        .into_response(),
        "alb!images" => Json(json!({
            "Response": {"AlbumImage": [{"ImageKey": "i1"}, {"ImageKey": "i2"}]}
        }))
        .into_response(),
        "broken" => (StatusCode::OK, "<html>not json</html>").into_response(),
        _ => (StatusCode::NOT_FOUND, "x".repeat(1000)).into_response(),
    }
}

async fn image(
    Path(key): Path<String>,
    Query(params): Query<HashMap<String, String>>,
    headers: HeaderMap,
) -> impl IntoResponse {
    if headers.get("accept").and_then(|v| v.to_str().ok()) != Some("application/json") {
        return (StatusCode::NOT_ACCEPTABLE, "json only").into_response();
    }
    if params.get("_verbosity").map(String::as_str) != Some("1") {
        return (StatusCode::BAD_REQUEST, "verbosity").into_response();
    }
    match key.as_str() {
        "i1-0" => Json(json!({
            "Response": {"Image": {"ImageKey": "i1", "KeywordArray": [{"Name": "soundcheck"}]}}
        }))
        .into_response(),
        _ => (StatusCode::INTERNAL_SERVER_ERROR, "boom").into_response(),
    }
}

async fn folder(Path(path): Path<String>, uri: Uri) -> impl IntoResponse {
    Json(json!({"Response": {"Album": [{"Name": path, "RawPath": uri.path()}]}}))
}

/// Start the fake API and return a client pointed at it.
async fn spawn_fake_api() -> SmugMugClient {
    let app = Router::new()
        .route("/api/v2/album/{key}", get(album))
        .route("/api/v2/image/{key}", get(image))
        .route("/api/v2/folder/{*path}", get(folder));

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });

    let mut config = SmugMugConfig::new(API_KEY);
    config.api_url = format!("http://{addr}/api/v2");
    config.timeout = Duration::from_secs(5);
    SmugMugClient::new(config).unwrap()
}

#[tokio::test]
async fn test_album_meta_sends_api_key() {
    let client = spawn_fake_api().await;
    let meta = client.fetch_album_meta("alb").await.unwrap();
    assert_eq!(meta["Response"]["Album"]["AlbumKey"], "alb");
}

#[tokio::test]
async fn test_non_success_status_is_upstream_error_with_snippet() {
    let client = spawn_fake_api().await;
    let err = client.fetch_album_meta("missing").await.unwrap_err();
    match err {
        EncoreError::Upstream { status, body } => {
            assert_eq!(status, 404);
            assert!(body.chars().count() <= 301);
        }
        other => panic!("expected upstream error, got {other:?}"),
    }
}

#[tokio::test]
async fn test_invalid_json_is_invalid_response() {
    let client = spawn_fake_api().await;
    let err = client.fetch_album_meta("broken").await.unwrap_err();
    assert!(matches!(err, EncoreError::InvalidResponse(_)));
}

#[tokio::test]
async fn test_image_detail_query_and_headers() {
    let client = spawn_fake_api().await;
    let detail = client.fetch_image_detail("i1").await.unwrap();
    assert_eq!(detail["Response"]["Image"]["ImageKey"], "i1");
}

#[tokio::test]
async fn test_folder_path_is_encoded_per_segment() {
    let client = spawn_fake_api().await;
    let body = client
        .fetch_folder_albums("user/Bands/Local", "The Band")
        .await
        .unwrap();
    assert_eq!(
        body["Response"]["Album"][0]["Name"],
        "user/Bands/Local/The Band!albums"
    );
}

#[tokio::test]
async fn test_folder_name_with_slash_stays_one_segment() {
    let client = spawn_fake_api().await;
    let body = client
        .fetch_folder_albums("user/Bands/Local", "AC/DC")
        .await
        .unwrap();
    assert_eq!(
        body["Response"]["Album"][0]["RawPath"],
        "/api/v2/folder/user/Bands/Local/AC%2FDC!albums"
    );
}

#[tokio::test]
async fn test_resolver_keeps_sheet_folder_as_one_segment() {
    let client = spawn_fake_api().await;
    let resolution =
        resolve_folder(&client, "user/Bands", "ac-dc", Some("AC/DC"), Region::Local).await;

    assert_eq!(resolution.used_candidate.as_deref(), Some("AC/DC"));
    assert_eq!(
        resolution.albums["Response"]["Album"][0]["RawPath"],
        "/api/v2/folder/user/Bands/Local/AC%2FDC!albums"
    );
}

#[tokio::test]
async fn test_connection_refused_is_network_error() {
    let mut config = SmugMugConfig::new(API_KEY);
    config.api_url = "http://127.0.0.1:1/api/v2".into();
    config.timeout = Duration::from_secs(2);
    let client = SmugMugClient::new(config).unwrap();

    let err = client.fetch_album_meta("alb").await.unwrap_err();
    assert!(matches!(err, EncoreError::Network(_)));
}

#[tokio::test]
async fn test_curated_index_over_http() {
    let dir = TempDir::new().unwrap();
    let source = Arc::new(spawn_fake_api().await);
    let config = AggregatorConfig::default();
    let cache = Arc::new(CuratedIndexCache::new(dir.path(), config.ttl));
    let service = CuratedIndexService::new(CuratedIndexer::new(source, config), cache);

    let (index, _) = service.curated_index("alb", false).await.unwrap();
    assert_eq!(index.verified_keywords, vec!["Soundcheck"]);
    assert_eq!(index.missing_keywords, vec!["Encore"]);
    assert_eq!(index.summary.images_scanned, 2);
    assert_eq!(index.summary.images_failed, 1);
}
