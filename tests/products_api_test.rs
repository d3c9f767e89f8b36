mod common;

use axum::http::{Method, StatusCode};
use serde_json::json;

use common::{response_json, TestApp};

#[tokio::test]
async fn product_lifecycle() {
    let app = TestApp::with_sqlite().await;

    let response = app
        .request(
            Method::POST,
            "/api/v1/products",
            Some(json!({
                "barcode": " SKU-100 ",
                "name": "Pallet Jack",
                "quantity": 3,
                "warehouse": "North"
            })),
        )
        .await;
    assert_eq!(response.status(), StatusCode::CREATED);
    let body = response_json(response).await;
    assert_eq!(body["success"], true);
    assert_eq!(body["data"]["barcode"], "sku-100");
    assert_eq!(body["data"]["containerCode"], "Unassigned");

    let response = app
        .request(
            Method::POST,
            "/api/v1/products",
            Some(json!({ "barcode": "sku-100", "name": "Copy", "quantity": 1 })),
        )
        .await;
    assert_eq!(response.status(), StatusCode::CONFLICT);

    let response = app
        .request(Method::GET, "/api/v1/products/SKU-100", None)
        .await;
    assert_eq!(response.status(), StatusCode::OK);
    let fetched = response_json(response).await;
    assert_eq!(fetched["data"]["name"], "Pallet Jack");

    let response = app
        .request(
            Method::PUT,
            "/api/v1/products/sku-100",
            Some(json!({ "quantity": 7.5, "containerCode": "BIN-4" })),
        )
        .await;
    assert_eq!(response.status(), StatusCode::OK);
    let updated = response_json(response).await;
    assert_eq!(updated["data"]["quantity"].as_f64(), Some(7.5));
    assert_eq!(updated["data"]["containerCode"], "BIN-4");
    assert_eq!(updated["data"]["warehouse"], "North");

    let response = app
        .request(Method::DELETE, "/api/v1/products/sku-100", None)
        .await;
    assert_eq!(response.status(), StatusCode::OK);

    let response = app
        .request(Method::GET, "/api/v1/products/sku-100", None)
        .await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn create_rejects_invalid_quantity() {
    let app = TestApp::new().await;
    let response = app
        .request(
            Method::POST,
            "/api/v1/products",
            Some(json!({ "barcode": "a1", "name": "Widget", "quantity": 0 })),
        )
        .await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn update_requires_changes_and_existing_product() {
    let app = TestApp::new().await;
    app.upload_csv("barcode,name,quantity\nA1,Widget,1\n").await;

    let response = app
        .request(Method::PUT, "/api/v1/products/a1", Some(json!({})))
        .await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let response = app
        .request(
            Method::PUT,
            "/api/v1/products/missing",
            Some(json!({ "quantity": 2 })),
        )
        .await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn find_matches_barcode_fragment_up_to_limit() {
    let app = TestApp::new().await;
    let mut csv = String::from("barcode,name,quantity\n");
    for i in 0..8 {
        csv.push_str(&format!("CRATE-{i},Crate {i},1\n"));
    }
    csv.push_str("BOX-1,Box,1\n");
    assert_eq!(app.upload_csv(&csv).await.status(), StatusCode::OK);

    let response = app
        .request(Method::GET, "/api/v1/products/find?barcode=crate", None)
        .await;
    assert_eq!(response.status(), StatusCode::OK);
    let body = response_json(response).await;
    assert_eq!(body["data"].as_array().map(Vec::len), Some(5));

    let response = app
        .request(Method::GET, "/api/v1/products/find?barcode=BOX", None)
        .await;
    let body = response_json(response).await;
    assert_eq!(body["data"][0]["barcode"], "box-1");

    let response = app
        .request(Method::GET, "/api/v1/products/find", None)
        .await;
    assert_eq!(response.status(), StatusCode::OK);
    let body = response_json(response).await;
    assert_eq!(body["data"].as_array().map(Vec::len), Some(5));
}

#[tokio::test]
async fn delete_all_reports_removed_count() {
    let app = TestApp::with_sqlite().await;
    app.upload_csv("barcode,name,quantity\nA1,Widget,1\nB2,Gadget,2\n")
        .await;

    let response = app.request(Method::DELETE, "/api/v1/products", None).await;
    assert_eq!(response.status(), StatusCode::OK);
    let body = response_json(response).await;
    assert_eq!(body["data"]["deleted"], 2);
    assert_eq!(body["message"], "2 products deleted");

    let response = app.request(Method::GET, "/api/v1/products", None).await;
    let body = response_json(response).await;
    assert_eq!(body["data"].as_array().map(Vec::len), Some(0));
}

#[tokio::test]
async fn health_reflects_store_state() {
    let app = TestApp::new().await;

    let response = app.request(Method::GET, "/health", None).await;
    assert_eq!(response.status(), StatusCode::OK);
    let body = response_json(response).await;
    assert_eq!(body["status"], "up");

    app.state.store.close().await.expect("close store");
    let response = app.request(Method::GET, "/health", None).await;
    assert_eq!(response.status(), StatusCode::SERVICE_UNAVAILABLE);
    let body = response_json(response).await;
    assert_eq!(body["store"]["status"], "down");
}

#[tokio::test]
async fn openapi_document_is_served() {
    let app = TestApp::new().await;
    let response = app
        .request(Method::GET, "/api-docs/openapi.json", None)
        .await;
    assert_eq!(response.status(), StatusCode::OK);
    let body = response_json(response).await;
    assert!(body["paths"]["/api/v1/upload-csv"].is_object());
}
