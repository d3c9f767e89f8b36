#![allow(dead_code)]

use std::sync::Arc;

use axum::{
    body::{self, Body},
    http::{Method, Request},
    response::Response,
    Router,
};
use serde_json::Value;
use tempfile::TempDir;
use tower::ServiceExt;
use warehouse_inventory::{
    build_router,
    config::AppConfig,
    db::DbConfig,
    repositories::{InMemoryProductStore, ProductStore, SeaOrmProductStore},
    AppState,
};

const BOUNDARY: &str = "----warehouse-inventory-test-boundary";

/// Helper harness wiring the full router over a fresh product store.
pub struct TestApp {
    router: Router,
    pub state: AppState,
    pub upload_dir: TempDir,
}

impl TestApp {
    /// Application backed by the in-memory store.
    pub async fn new() -> Self {
        Self::with_store(Arc::new(InMemoryProductStore::new()))
    }

    /// Application backed by a migrated in-memory SQLite database.
    pub async fn with_sqlite() -> Self {
        let store = SeaOrmProductStore::connect(&DbConfig {
            url: "sqlite::memory:".to_string(),
            max_connections: 1,
            min_connections: 1,
            ..Default::default()
        })
        .await
        .expect("failed to create test database");
        store
            .migrate()
            .await
            .expect("failed to run migrations in tests");
        Self::with_store(Arc::new(store))
    }

    fn with_store(store: Arc<dyn ProductStore>) -> Self {
        let upload_dir = TempDir::new().expect("upload dir");
        let mut cfg = AppConfig::new(
            "sqlite::memory:".to_string(),
            "127.0.0.1".to_string(),
            18_080,
            "test".to_string(),
        );
        cfg.upload_dir = Some(upload_dir.path().display().to_string());

        let state = AppState::new(cfg, store);
        Self {
            router: build_router(state.clone()),
            state,
            upload_dir,
        }
    }

    pub async fn request(&self, method: Method, uri: &str, body: Option<Value>) -> Response {
        let mut builder = Request::builder().method(method).uri(uri);
        let body = if let Some(json) = body {
            builder = builder.header("content-type", "application/json");
            Body::from(serde_json::to_vec(&json).expect("failed to serialize json request body"))
        } else {
            Body::empty()
        };

        let request = builder.body(body).expect("failed to build request");
        self.router
            .clone()
            .oneshot(request)
            .await
            .expect("router error during test request")
    }

    /// Posts `contents` as a multipart file in the given form field.
    pub async fn upload(&self, field: &str, contents: &[u8]) -> Response {
        let request = Request::builder()
            .method(Method::POST)
            .uri("/api/v1/upload-csv")
            .header(
                "content-type",
                format!("multipart/form-data; boundary={BOUNDARY}"),
            )
            .body(Body::from(multipart_body(field, "inventory.csv", contents)))
            .expect("failed to build request");
        self.router
            .clone()
            .oneshot(request)
            .await
            .expect("router error during test request")
    }

    pub async fn upload_csv(&self, contents: &str) -> Response {
        self.upload("csvFile", contents.as_bytes()).await
    }

    /// Number of files left behind in the staging directory.
    pub fn staged_files(&self) -> usize {
        std::fs::read_dir(self.upload_dir.path())
            .expect("read upload dir")
            .count()
    }
}

pub fn multipart_body(field: &str, filename: &str, contents: &[u8]) -> Vec<u8> {
    let mut body = format!(
        "--{BOUNDARY}\r\n\
         Content-Disposition: form-data; name=\"{field}\"; filename=\"{filename}\"\r\n\
         Content-Type: text/csv\r\n\r\n"
    )
    .into_bytes();
    body.extend_from_slice(contents);
    body.extend_from_slice(format!("\r\n--{BOUNDARY}--\r\n").as_bytes());
    body
}

pub async fn response_json(response: Response) -> Value {
    let bytes = body::to_bytes(response.into_body(), usize::MAX)
        .await
        .expect("response body bytes");
    serde_json::from_slice(&bytes).expect("json response")
}
