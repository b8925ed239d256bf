use crate::{
    entities::registration, errors::ServiceError, handlers::orders::OwnerQuery,
    handlers::AppState, ApiResponse,
};
use axum::{
    extract::{Query, State},
    routing::get,
    Json, Router,
};

/// List the caller's event registrations, newest first.
#[utoipa::path(
    get,
    path = "/api/v1/registrations/mine",
    params(OwnerQuery),
    responses(
        (status = 200, description = "Registrations for the caller"),
        (status = 400, description = "No identity supplied", body = crate::errors::ErrorResponse)
    ),
    tag = "Registrations"
)]
pub async fn list_my_registrations(
    State(state): State<AppState>,
    Query(query): Query<OwnerQuery>,
) -> Result<Json<ApiResponse<Vec<registration::Model>>>, ServiceError> {
    let session = query.session();
    if session.is_empty() {
        return Err(ServiceError::BadRequest(
            "email or uid is required".to_string(),
        ));
    }

    let registrations = state
        .services
        .registrations
        .list_for_owner(&session, query.capped_limit())
        .await?;
    Ok(Json(ApiResponse::success(registrations)))
}

pub fn registration_routes() -> Router<AppState> {
    Router::new().route("/mine", get(list_my_registrations))
}
