//! Warehouse inventory service
//!
//! Product records keyed by barcode, with a CSV bulk import pipeline and a
//! small CRUD API on top of a pluggable product store.
#![forbid(unsafe_code)]
#![deny(rust_2018_idioms)]
#![allow(elided_lifetimes_in_paths)]
#![warn(clippy::all, clippy::perf, clippy::dbg_macro)]

pub mod config;
pub mod db;
pub mod entities;
pub mod errors;
pub mod handlers;
pub mod import;
pub mod migrator;
pub mod models;
pub mod openapi;
pub mod repositories;
pub mod services;
pub mod tracing;

use axum::{extract::DefaultBodyLimit, http::HeaderValue, Router};
use chrono::Utc;
use serde::Serialize;
use std::path::PathBuf;
use std::sync::Arc;
use tower_http::cors::{Any, CorsLayer};
use utoipa::ToSchema;

use crate::config::AppConfig;
use crate::errors::ServiceError;
use crate::import::ImportCoordinator;
use crate::repositories::{InMemoryProductStore, ProductStore, SeaOrmProductStore};
use crate::services::ProductService;

/// Shared state handed to every handler
#[derive(Clone)]
pub struct AppState {
    pub config: AppConfig,
    pub store: Arc<dyn ProductStore>,
    pub products: ProductService,
    pub importer: ImportCoordinator,
    pub upload_dir: PathBuf,
}

impl AppState {
    pub fn new(config: AppConfig, store: Arc<dyn ProductStore>) -> Self {
        Self {
            products: ProductService::new(Arc::clone(&store), config.search_limit),
            importer: ImportCoordinator::new(Arc::clone(&store)),
            upload_dir: config.upload_dir(),
            store,
            config,
        }
    }
}

/// Opens the product store selected by `storage_backend`, applying migrations
/// when configured to
pub async fn connect_store(cfg: &AppConfig) -> Result<Arc<dyn ProductStore>, ServiceError> {
    if cfg.uses_in_memory_store() {
        ::tracing::warn!("Using in-memory product store; data is lost on shutdown");
        return Ok(Arc::new(InMemoryProductStore::new()));
    }

    let store = SeaOrmProductStore::connect(&db::DbConfig::from(cfg)).await?;
    if cfg.auto_migrate {
        store.migrate().await?;
    }
    Ok(Arc::new(store))
}

// Common response wrapper
#[derive(Serialize, ToSchema)]
pub struct ApiResponse<T> {
    pub success: bool,
    pub data: Option<T>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub meta: Option<ResponseMeta>,
}

#[derive(Serialize, ToSchema)]
pub struct ResponseMeta {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub request_id: Option<String>,
    pub timestamp: String,
}

impl ResponseMeta {
    fn capture() -> Self {
        Self {
            request_id: crate::tracing::current_request_id().map(|rid| rid.as_str().to_string()),
            timestamp: Utc::now().to_rfc3339(),
        }
    }
}

impl<T> ApiResponse<T> {
    pub fn success(data: T) -> Self {
        Self {
            success: true,
            data: Some(data),
            message: None,
            meta: Some(ResponseMeta::capture()),
        }
    }

    pub fn with_message(mut self, message: impl Into<String>) -> Self {
        self.message = Some(message.into());
        self
    }
}

#[cfg(test)]
mod response_tests {
    use super::*;
    use chrono::DateTime;

    #[tokio::test]
    async fn success_response_includes_request_metadata() {
        let response =
            crate::tracing::scope_request_id(crate::tracing::RequestId::new("meta-123"), async {
                ApiResponse::success("ok")
            })
            .await;

        let meta = response.meta.expect("metadata expected");
        assert_eq!(meta.request_id.as_deref(), Some("meta-123"));
        DateTime::parse_from_rfc3339(&meta.timestamp).expect("timestamp should parse");
    }

    #[test]
    fn response_outside_request_has_no_request_id() {
        let response = ApiResponse::success(1);
        assert!(response.meta.expect("metadata expected").request_id.is_none());
    }
}

/// Versioned API routes, nested under `/api/v1`
pub fn api_v1_routes() -> Router<AppState> {
    Router::new()
        .merge(handlers::import::import_routes())
        .nest("/products", handlers::products::products_routes())
}

/// Builds the complete application router
pub fn build_router(state: AppState) -> Router {
    let cors_layer = match state.config.cors_origins() {
        Some(origins) => {
            let origins: Vec<HeaderValue> = origins
                .iter()
                .filter_map(|origin| HeaderValue::from_str(origin).ok())
                .collect();
            CorsLayer::new()
                .allow_origin(origins)
                .allow_methods(Any)
                .allow_headers(Any)
        }
        None => {
            if !state.config.is_development() {
                ::tracing::warn!(
                    "No CORS origins configured; allowing any origin. Set APP__CORS_ALLOWED_ORIGINS to restrict"
                );
            }
            CorsLayer::permissive()
        }
    };
    let body_limit = state.config.max_upload_bytes;

    Router::new()
        .nest("/api/v1", api_v1_routes())
        .merge(handlers::health::health_routes())
        .merge(openapi::openapi_routes())
        .layer(DefaultBodyLimit::max(body_limit))
        // HTTP tracing layer for consistent request/response telemetry
        .layer(crate::tracing::configure_http_tracing())
        .layer(cors_layer)
        // Ensure every request carries a request id for traceability
        .layer(axum::middleware::from_fn(
            crate::tracing::request_id_middleware,
        ))
        .with_state(state)
}
