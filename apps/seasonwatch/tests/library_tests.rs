//! Integration tests for the library ingest endpoints.

mod common;

use axum::http::StatusCode;
use common::{FakeCatalog, FakeLibrary, TestApp};

#[tokio::test]
async fn test_ingest_creates_shows_and_seasons() {
    let library = FakeLibrary::new().with_series("abc", "Show A", Some("42"), &[(1, 10), (2, 8)]);
    let app = TestApp::with_providers(FakeCatalog::new(), library).await;

    let response = app.server().post("/api/library/ingest").await;

    response.assert_status_ok();
    let body: serde_json::Value = response.json();
    assert_eq!(body["success"], true);
    assert_eq!(body["showsProcessed"], 1);
    assert_eq!(body["seasonsProcessed"], 2);
    assert_eq!(body["seriesSkipped"], 0);

    let list: serde_json::Value = app.server().get("/api/shows").await.json();
    assert_eq!(list[0]["catalog_id"], 42);
    assert_eq!(list[0]["title"], "Show A");
    assert_eq!(list[0]["latest_library_season"], 2);
    assert_eq!(list[0]["latest_library_episodes"], 8);
}

#[tokio::test]
async fn test_ingest_is_idempotent() {
    let library = FakeLibrary::new().with_series("abc", "Show A", Some("42"), &[(1, 10), (2, 8)]);
    let app = TestApp::with_providers(FakeCatalog::new(), library).await;

    app.server().post("/api/library/ingest").await.assert_status_ok();
    let response = app.server().post("/api/library/ingest").await;

    response.assert_status_ok();
    assert_eq!(app.count("shows").await, 1);
    assert_eq!(app.count("seasons").await, 2);
    assert_eq!(app.count("library_shows").await, 1);
}

#[tokio::test]
async fn test_ingest_keeps_existing_tracked_show() {
    let library = FakeLibrary::new().with_series("abc", "Renamed In Library", Some("42"), &[(1, 10)]);
    let app = TestApp::with_providers(FakeCatalog::new(), library).await;
    let id = app.seed_show(42, "Show A").await;

    app.server().post("/api/library/ingest").await.assert_status_ok();

    let list: serde_json::Value = app.server().get("/api/shows").await.json();
    assert_eq!(list.as_array().unwrap().len(), 1);
    assert_eq!(list[0]["id"], id);
    assert_eq!(list[0]["latest_library_season"], 1);
}

#[tokio::test]
async fn test_ingest_skips_unresolved_and_failing_series() {
    let library = FakeLibrary::new()
        .with_series("good", "Good Show", Some("42"), &[(1, 10)])
        .with_series("no-id", "Home Videos", None, &[(1, 3)])
        .with_series("bad-id", "Odd Show", Some("not-a-number"), &[(1, 3)])
        .with_series("broken", "Broken Show", Some("7"), &[(1, 3)])
        .failing("broken");
    let app = TestApp::with_providers(FakeCatalog::new(), library).await;

    let response = app.server().post("/api/library/ingest").await;

    response.assert_status_ok();
    let body: serde_json::Value = response.json();
    assert_eq!(body["showsProcessed"], 1);
    assert_eq!(body["seasonsProcessed"], 1);
    assert_eq!(body["seriesSkipped"], 3);
    assert_eq!(app.count("shows").await, 1);
}

#[tokio::test]
async fn test_list_library_after_ingest() {
    let library = FakeLibrary::new()
        .with_series("abc", "Show A", Some("42"), &[(1, 10)])
        .with_series("xyz", "Home Videos", None, &[]);
    let app = TestApp::with_providers(FakeCatalog::new(), library).await;

    app.server().post("/api/library/ingest").await.assert_status_ok();

    let response = app.server().get("/api/library").await;

    response.assert_status_ok();
    let body: serde_json::Value = response.json();
    let rows = body.as_array().unwrap();
    assert_eq!(rows.len(), 2);
    assert_eq!(rows[0]["title"], "Home Videos");
    assert!(rows[0]["catalog_id"].is_null());
    assert_eq!(rows[1]["library_id"], "abc");
    assert_eq!(rows[1]["catalog_id"], 42);
}

#[tokio::test]
async fn test_ingest_without_library_client() {
    let app = TestApp::new().await;

    let response = app.server().post("/api/library/ingest").await;

    response.assert_status(StatusCode::BAD_GATEWAY);
    let body: serde_json::Value = response.json();
    assert_eq!(body["error"], "upstream_error");
}
