use axum::{
    extract::{Json, Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
    routing::get,
    Router,
};
use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};

use super::ProductHandlerState;
use crate::entities::product::Model as Product;
use crate::errors::ServiceError;
use crate::models::{NewProduct, ProductChanges};
use crate::ApiResponse;

#[derive(Debug, Deserialize, IntoParams)]
pub struct FindProductsQuery {
    /// Case-insensitive barcode fragment
    pub barcode: Option<String>,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct DeleteAllResponse {
    pub deleted: u64,
}

pub fn products_routes<S>() -> Router<S>
where
    S: ProductHandlerState,
{
    Router::new()
        .route(
            "/",
            get(list_products::<S>)
                .post(create_product::<S>)
                .delete(delete_all_products::<S>),
        )
        .route("/find", get(find_products::<S>))
        .route(
            "/:barcode",
            get(get_product::<S>)
                .put(update_product::<S>)
                .delete(delete_product::<S>),
        )
}

/// Create a product
#[utoipa::path(
    post,
    path = "/api/v1/products",
    request_body = NewProduct,
    responses(
        (status = 201, description = "Product created", body = Product,
            headers(("X-Request-Id" = String, description = "Unique request id"))
        ),
        (status = 400, description = "Invalid product", body = crate::errors::ErrorResponse),
        (status = 409, description = "Barcode already exists", body = crate::errors::ErrorResponse),
        (status = 500, description = "Internal server error", body = crate::errors::ErrorResponse)
    ),
    tag = "products"
)]
pub async fn create_product<S>(
    State(state): State<S>,
    Json(payload): Json<NewProduct>,
) -> Result<impl IntoResponse, ServiceError>
where
    S: ProductHandlerState,
{
    let product = state.product_service().create(payload).await?;
    Ok((StatusCode::CREATED, Json(ApiResponse::success(product))))
}

/// List every product
#[utoipa::path(
    get,
    path = "/api/v1/products",
    responses(
        (status = 200, description = "Products returned", body = [Product]),
        (status = 500, description = "Internal server error", body = crate::errors::ErrorResponse)
    ),
    tag = "products"
)]
pub async fn list_products<S>(State(state): State<S>) -> Result<impl IntoResponse, ServiceError>
where
    S: ProductHandlerState,
{
    let products = state.product_service().list().await?;
    Ok(Json(ApiResponse::success(products)))
}

/// Search products by barcode fragment
#[utoipa::path(
    get,
    path = "/api/v1/products/find",
    params(FindProductsQuery),
    responses(
        (status = 200, description = "Matching products, capped at the search limit", body = [Product]),
        (status = 500, description = "Internal server error", body = crate::errors::ErrorResponse)
    ),
    tag = "products"
)]
pub async fn find_products<S>(
    State(state): State<S>,
    Query(query): Query<FindProductsQuery>,
) -> Result<impl IntoResponse, ServiceError>
where
    S: ProductHandlerState,
{
    let products = state
        .product_service()
        .search(query.barcode.as_deref())
        .await?;
    Ok(Json(ApiResponse::success(products)))
}

/// Get a product by barcode
#[utoipa::path(
    get,
    path = "/api/v1/products/{barcode}",
    params(("barcode" = String, Path, description = "Product barcode, case-insensitive")),
    responses(
        (status = 200, description = "Product returned", body = Product),
        (status = 404, description = "Not found", body = crate::errors::ErrorResponse),
        (status = 500, description = "Internal server error", body = crate::errors::ErrorResponse)
    ),
    tag = "products"
)]
pub async fn get_product<S>(
    State(state): State<S>,
    Path(barcode): Path<String>,
) -> Result<impl IntoResponse, ServiceError>
where
    S: ProductHandlerState,
{
    let product = state.product_service().find(&barcode).await?;
    Ok(Json(ApiResponse::success(product)))
}

/// Update a product's mutable fields
#[utoipa::path(
    put,
    path = "/api/v1/products/{barcode}",
    params(("barcode" = String, Path, description = "Product barcode, case-insensitive")),
    request_body = ProductChanges,
    responses(
        (status = 200, description = "Product updated", body = Product),
        (status = 400, description = "Invalid or empty change set", body = crate::errors::ErrorResponse),
        (status = 404, description = "Not found", body = crate::errors::ErrorResponse),
        (status = 500, description = "Internal server error", body = crate::errors::ErrorResponse)
    ),
    tag = "products"
)]
pub async fn update_product<S>(
    State(state): State<S>,
    Path(barcode): Path<String>,
    Json(changes): Json<ProductChanges>,
) -> Result<impl IntoResponse, ServiceError>
where
    S: ProductHandlerState,
{
    let product = state.product_service().update(&barcode, changes).await?;
    Ok(Json(ApiResponse::success(product)))
}

/// Delete a product
#[utoipa::path(
    delete,
    path = "/api/v1/products/{barcode}",
    params(("barcode" = String, Path, description = "Product barcode, case-insensitive")),
    responses(
        (status = 200, description = "Deleted product returned", body = Product),
        (status = 404, description = "Not found", body = crate::errors::ErrorResponse),
        (status = 500, description = "Internal server error", body = crate::errors::ErrorResponse)
    ),
    tag = "products"
)]
pub async fn delete_product<S>(
    State(state): State<S>,
    Path(barcode): Path<String>,
) -> Result<impl IntoResponse, ServiceError>
where
    S: ProductHandlerState,
{
    let product = state.product_service().delete(&barcode).await?;
    Ok(Json(ApiResponse::success(product)))
}

/// Delete every product
#[utoipa::path(
    delete,
    path = "/api/v1/products",
    responses(
        (status = 200, description = "Number of deleted products", body = DeleteAllResponse),
        (status = 500, description = "Internal server error", body = crate::errors::ErrorResponse)
    ),
    tag = "products"
)]
pub async fn delete_all_products<S>(
    State(state): State<S>,
) -> Result<impl IntoResponse, ServiceError>
where
    S: ProductHandlerState,
{
    let deleted = state.product_service().delete_all().await?;
    Ok(Json(
        ApiResponse::success(DeleteAllResponse { deleted })
            .with_message(format!("{} products deleted", deleted)),
    ))
}
