//! HTTP API tests
//!
//! The router is driven in-process with `tower::ServiceExt::oneshot`.

use axum::body::Body;
use axum::http::{Request, StatusCode};
use serde_json::{json, Value};
use sheetmap::api::{build_router, AppState};
use std::path::PathBuf;
use std::sync::Arc;
use tempfile::TempDir;
use tower::ServiceExt;

async fn send(request: Request<Body>) -> (StatusCode, Value) {
    let app = build_router(Arc::new(AppState::default()));
    let response = app.oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    (status, serde_json::from_slice(&bytes).unwrap())
}

async fn get(uri: &str) -> (StatusCode, Value) {
    send(Request::get(uri).body(Body::empty()).unwrap()).await
}

async fn post(uri: &str, body: Value) -> (StatusCode, Value) {
    send(
        Request::post(uri)
            .header("content-type", "application/json")
            .body(Body::from(body.to_string()))
            .unwrap(),
    )
    .await
}

fn people_csv(dir: &TempDir) -> PathBuf {
    let path = dir.path().join("people.csv");
    std::fs::write(&path, "Name,AGE,Notes\nAnn,30,x\nBob,41,y\n").unwrap();
    path
}

// ═══════════════════════════════════════════════════════════════════════════
// INFO ENDPOINTS
// ═══════════════════════════════════════════════════════════════════════════

#[tokio::test]
async fn test_health() {
    let (status, body) = get("/health").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["success"], true);
    assert_eq!(body["data"]["status"], "healthy");
    assert_eq!(body["request_id"].as_str().unwrap().len(), 36);
}

#[tokio::test]
async fn test_version_and_root() {
    let (_, body) = get("/version").await;
    assert_eq!(body["data"]["version"], env!("CARGO_PKG_VERSION"));
    assert_eq!(body["data"]["features"], json!(["inspect", "import"]));
    assert_eq!(
        body["data"]["formats"],
        json!([".csv", ".xls", ".xlsx", ".xlsm", ".xlsb", ".ods"])
    );

    let (_, body) = get("/").await;
    assert_eq!(body["data"]["name"], "Sheetmap API Server");
    assert_eq!(body["data"]["endpoints"].as_array().unwrap().len(), 4);
}

// ═══════════════════════════════════════════════════════════════════════════
// INSPECT
// ═══════════════════════════════════════════════════════════════════════════

#[tokio::test]
async fn test_inspect_csv() {
    let dir = TempDir::new().unwrap();
    let path = people_csv(&dir);

    let (status, body) = post("/api/v1/inspect", json!({ "file_path": path })).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["success"], true);
    assert_eq!(
        body["data"]["sheets"],
        json!([{ "name": "Sheet1", "row_count": 2, "columns": ["Name", "AGE", "Notes"] }])
    );
}

#[tokio::test]
async fn test_inspect_missing_file() {
    let (status, body) =
        post("/api/v1/inspect", json!({ "file_path": "/no/such/file.csv" })).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["success"], false);
    assert!(body["error"].as_str().unwrap().starts_with("IO error"));
    assert!(body.get("data").is_none());
}

// ═══════════════════════════════════════════════════════════════════════════
// IMPORT
// ═══════════════════════════════════════════════════════════════════════════

#[tokio::test]
async fn test_import_with_preselection_and_mapping() {
    let dir = TempDir::new().unwrap();
    let path = people_csv(&dir);

    let (_, body) = post(
        "/api/v1/import",
        json!({
            "file_path": path,
            "attributes": [
                { "value_key": "name", "title": "Name" },
                { "value_key": "age", "title": "Age" },
                { "value_key": "email", "title": "Email" }
            ],
            "mapping": [{ "source_column": "AGE", "target_attribute": "age" }]
        }),
    )
    .await;

    assert_eq!(body["success"], true, "{body}");
    assert_eq!(body["data"]["record_count"], 2);
    assert_eq!(
        body["data"]["records"],
        json!([
            { "name": "Ann", "age": 30, "email": null },
            { "name": "Bob", "age": 41, "email": null }
        ])
    );
}

#[tokio::test]
async fn test_import_without_associations() {
    let dir = TempDir::new().unwrap();
    let path = people_csv(&dir);

    let (_, body) = post(
        "/api/v1/import",
        json!({
            "file_path": path,
            "attributes": [{ "value_key": "email", "title": "Email" }]
        }),
    )
    .await;

    assert_eq!(body["success"], false);
    assert_eq!(
        body["error"],
        "No attribute was associated to any column from the file"
    );
}

#[tokio::test]
async fn test_import_with_images() {
    let dir = TempDir::new().unwrap();
    let path = people_csv(&dir);
    let photo = dir.path().join("bob.png");
    std::fs::write(&photo, [1u8; 8]).unwrap();

    let (_, body) = post(
        "/api/v1/import",
        json!({
            "file_path": path,
            "attributes": [
                { "value_key": "name", "title": "Name" },
                { "value_key": "photo", "title": "Photo", "is_image": true }
            ],
            "images": [{ "row": 1, "attribute": "photo", "path": photo }]
        }),
    )
    .await;

    assert_eq!(body["success"], true, "{body}");
    let records = body["data"]["records"].as_array().unwrap();
    assert_eq!(records[0]["photo"], Value::Null);
    assert_eq!(records[1]["photo"]["name"], "bob.png");
    assert_eq!(records[1]["photo"]["size"], 8);
}

#[tokio::test]
async fn test_import_without_header() {
    let dir = TempDir::new().unwrap();
    let path = people_csv(&dir);

    let (_, body) = post(
        "/api/v1/import",
        json!({
            "file_path": path,
            "attributes": [{ "value_key": "name", "title": "Name" }],
            "has_header": false,
            "mapping": [{ "source_column": "1", "target_attribute": "name" }]
        }),
    )
    .await;

    assert_eq!(body["data"]["record_count"], 3);
    assert_eq!(body["data"]["records"][0], json!({ "name": "Name" }));
}

#[tokio::test]
async fn test_import_bad_sheet_index() {
    let dir = TempDir::new().unwrap();
    let path = people_csv(&dir);

    let (_, body) = post(
        "/api/v1/import",
        json!({
            "file_path": path,
            "attributes": [{ "value_key": "name", "title": "Name" }],
            "sheet": 3
        }),
    )
    .await;

    assert_eq!(body["success"], false);
    assert_eq!(body["error"], "Index 3 out of range (1 sheets)");
}

#[tokio::test]
async fn test_import_image_only_attributes() {
    let dir = TempDir::new().unwrap();
    let path = people_csv(&dir);
    let photo = dir.path().join("ann.png");
    std::fs::write(&photo, [1u8; 3]).unwrap();

    let (_, body) = post(
        "/api/v1/import",
        json!({
            "file_path": path,
            "attributes": [{ "value_key": "photo", "title": "Photo", "is_image": true }],
            "images": [{ "row": 0, "attribute": "photo", "path": photo }]
        }),
    )
    .await;

    assert_eq!(body["success"], true, "{body}");
    assert_eq!(body["data"]["record_count"], 2);
    assert_eq!(body["data"]["records"][0]["photo"]["name"], "ann.png");
    assert_eq!(body["data"]["records"][1], json!({ "photo": null }));
}
