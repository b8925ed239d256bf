use crate::{entities::product, errors::ServiceError, handlers::AppState, ApiResponse};
use axum::{
    extract::{Path, State},
    routing::get,
    Json, Router,
};

/// List active catalog products.
#[utoipa::path(
    get,
    path = "/api/v1/products",
    responses((status = 200, description = "Active products")),
    tag = "Products"
)]
pub async fn list_products(
    State(state): State<AppState>,
) -> Result<Json<ApiResponse<Vec<product::Model>>>, ServiceError> {
    let products = state.services.products.list_active().await?;
    Ok(Json(ApiResponse::success(products)))
}

/// Fetch one catalog product.
#[utoipa::path(
    get,
    path = "/api/v1/products/{id}",
    params(("id" = String, Path, description = "Product slug id")),
    responses(
        (status = 200, description = "Product"),
        (status = 404, description = "Not found", body = crate::errors::ErrorResponse)
    ),
    tag = "Products"
)]
pub async fn get_product(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<ApiResponse<product::Model>>, ServiceError> {
    let found = state.services.products.get(&id).await?;
    Ok(Json(ApiResponse::success(found)))
}

pub fn product_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(list_products))
        .route("/:id", get(get_product))
}
