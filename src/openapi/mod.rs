use axum::{routing::get, Json, Router};
use utoipa::OpenApi;

pub const OPENAPI_JSON_PATH: &str = "/api-docs/openapi.json";

#[derive(OpenApi)]
#[openapi(
    info(
        title = "Warehouse Inventory API",
        version = "0.1.0",
        description = r#"
# Warehouse Inventory API

Tracks products stored across warehouses and containers.

## Bulk import

`POST /api/v1/upload-csv` accepts a multipart upload with the CSV file in the
`csvFile` field. Recognised columns are `barcode`, `name`, `quantity`,
`warehouse` and `containerCode`. Rows with a missing barcode or name, a
non-positive quantity, or a barcode repeated within the file are skipped.
All remaining rows are inserted in one operation, or none are.
"#
    ),
    paths(
        crate::handlers::import::upload_csv,
        crate::handlers::products::create_product,
        crate::handlers::products::list_products,
        crate::handlers::products::find_products,
        crate::handlers::products::get_product,
        crate::handlers::products::update_product,
        crate::handlers::products::delete_product,
        crate::handlers::products::delete_all_products,
    ),
    components(
        schemas(
            crate::entities::product::Model,
            crate::models::NewProduct,
            crate::models::ProductChanges,
            crate::handlers::import::ImportResponse,
            crate::handlers::products::DeleteAllResponse,
            crate::import::RejectReason,
            crate::errors::ErrorResponse
        )
    ),
    tags(
        (name = "import", description = "CSV bulk import"),
        (name = "products", description = "Product records")
    )
)]
pub struct ApiDocV1;

pub fn openapi_routes<S>() -> Router<S>
where
    S: Clone + Send + Sync + 'static,
{
    Router::new().route(OPENAPI_JSON_PATH, get(openapi_json))
}

async fn openapi_json() -> Json<utoipa::openapi::OpenApi> {
    Json(ApiDocV1::openapi())
}
