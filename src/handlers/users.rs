use crate::{
    entities::user_profile, errors::ServiceError, handlers::AppState,
    services::users::UpdateProfileRequest, ApiResponse,
};
use axum::{
    extract::{Json, Path, Query, State},
    routing::{get, put},
    Router,
};
use serde::Deserialize;
use utoipa::IntoParams;

#[derive(Debug, Deserialize, IntoParams)]
pub struct ProfileQuery {
    email: Option<String>,
}

/// Fetch the caller's profile, creating the default one on first access.
#[utoipa::path(
    get,
    path = "/api/v1/users/{uid}",
    params(("uid" = String, Path, description = "Auth subject"), ProfileQuery),
    responses(
        (status = 200, description = "Profile"),
        (status = 404, description = "Unknown subject and no email to create from", body = crate::errors::ErrorResponse)
    ),
    tag = "Users"
)]
pub async fn get_profile(
    State(state): State<AppState>,
    Path(uid): Path<String>,
    Query(query): Query<ProfileQuery>,
) -> Result<Json<ApiResponse<user_profile::Model>>, ServiceError> {
    let profile = match query.email {
        Some(email) => state.services.users.get_or_create(&uid, &email).await?,
        None => state
            .services
            .users
            .find_by_uid(&uid)
            .await?
            .ok_or_else(|| ServiceError::NotFound(format!("Profile {} not found", uid)))?,
    };
    Ok(Json(ApiResponse::success(profile)))
}

/// Edit profile contact fields. The token balance is never writable here.
#[utoipa::path(
    put,
    path = "/api/v1/users/{uid}",
    params(("uid" = String, Path, description = "Auth subject")),
    request_body = crate::services::users::UpdateProfileRequest,
    responses(
        (status = 200, description = "Updated profile"),
        (status = 404, description = "Not found", body = crate::errors::ErrorResponse)
    ),
    tag = "Users"
)]
pub async fn update_profile(
    State(state): State<AppState>,
    Path(uid): Path<String>,
    Json(request): Json<UpdateProfileRequest>,
) -> Result<Json<ApiResponse<user_profile::Model>>, ServiceError> {
    let updated = state.services.users.update_profile(&uid, request).await?;
    Ok(Json(ApiResponse::success(updated)))
}

pub fn user_routes() -> Router<AppState> {
    Router::new()
        .route("/:uid", get(get_profile))
        .route("/:uid", put(update_profile))
}
