use crate::{
    entities::order,
    errors::ServiceError,
    handlers::AppState,
    services::{orders::CreateOrderRequest, SessionContext},
    ApiResponse,
};
use axum::{
    extract::{Json, Path, Query, State},
    http::StatusCode,
    routing::{get, post},
    Router,
};
use serde::Deserialize;
use utoipa::IntoParams;
use uuid::Uuid;

const DEFAULT_LIST_LIMIT: u64 = 20;
const MAX_LIST_LIMIT: u64 = 100;

/// Explicit session identity for owner-scoped listings. Authentication
/// itself happens upstream; these are the identity claims the front end
/// forwards.
#[derive(Debug, Deserialize, IntoParams)]
pub struct OwnerQuery {
    pub email: Option<String>,
    pub uid: Option<String>,
    pub limit: Option<u64>,
}

impl OwnerQuery {
    pub fn session(&self) -> SessionContext {
        SessionContext::new(self.email.clone(), self.uid.clone())
    }

    pub fn capped_limit(&self) -> u64 {
        self.limit
            .unwrap_or(DEFAULT_LIST_LIMIT)
            .min(MAX_LIST_LIMIT)
    }
}

/// Write the pending order record ahead of the gateway redirect.
#[utoipa::path(
    post,
    path = "/api/v1/orders",
    request_body = crate::services::orders::CreateOrderRequest,
    responses(
        (status = 201, description = "Order created"),
        (status = 400, description = "Validation failed", body = crate::errors::ErrorResponse)
    ),
    tag = "Orders"
)]
pub async fn create_order(
    State(state): State<AppState>,
    Json(request): Json<CreateOrderRequest>,
) -> Result<(StatusCode, Json<ApiResponse<order::Model>>), ServiceError> {
    let created = state.services.orders.create_order(request).await?;
    Ok((StatusCode::CREATED, Json(ApiResponse::success(created))))
}

/// List the caller's orders, newest first.
#[utoipa::path(
    get,
    path = "/api/v1/orders/mine",
    params(OwnerQuery),
    responses(
        (status = 200, description = "Orders for the caller"),
        (status = 400, description = "No identity supplied", body = crate::errors::ErrorResponse)
    ),
    tag = "Orders"
)]
pub async fn list_my_orders(
    State(state): State<AppState>,
    Query(query): Query<OwnerQuery>,
) -> Result<Json<ApiResponse<Vec<order::Model>>>, ServiceError> {
    let session = query.session();
    if session.is_empty() {
        return Err(ServiceError::BadRequest(
            "email or uid is required".to_string(),
        ));
    }

    let orders = state
        .services
        .orders
        .list_for_owner(&session, query.capped_limit())
        .await?;
    Ok(Json(ApiResponse::success(orders)))
}

/// Fetch one order by id.
#[utoipa::path(
    get,
    path = "/api/v1/orders/{id}",
    params(("id" = Uuid, Path, description = "Order ID")),
    responses(
        (status = 200, description = "Order details"),
        (status = 404, description = "Not found", body = crate::errors::ErrorResponse)
    ),
    tag = "Orders"
)]
pub async fn get_order(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<ApiResponse<order::Model>>, ServiceError> {
    let found = state.services.orders.get_order(id).await?;
    Ok(Json(ApiResponse::success(found)))
}

pub fn order_routes() -> Router<AppState> {
    Router::new()
        .route("/", post(create_order))
        .route("/mine", get(list_my_orders))
        .route("/:id", get(get_order))
}
