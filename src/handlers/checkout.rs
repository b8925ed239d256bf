use crate::{
    errors::ServiceError, gateway::PreferenceResponse, handlers::AppState,
    services::checkout::CreatePreferenceRequest,
};
use axum::{
    extract::{Json, State},
    routing::post,
    Router,
};

/// Create a gateway payment preference and return the buyer redirect URLs.
///
/// No persistence side effect: the client writes the pending order record
/// separately before redirecting the buyer.
#[utoipa::path(
    post,
    path = "/api/v1/checkout/preferences",
    request_body = crate::services::checkout::CreatePreferenceRequest,
    responses(
        (status = 200, description = "Preference created"),
        (status = 400, description = "Missing or invalid fields", body = crate::errors::ErrorResponse),
        (status = 500, description = "Gateway credential not configured", body = crate::errors::ErrorResponse),
        (status = 502, description = "Gateway rejected the request", body = crate::errors::ErrorResponse)
    ),
    tag = "Checkout"
)]
pub async fn create_preference(
    State(state): State<AppState>,
    Json(request): Json<CreatePreferenceRequest>,
) -> Result<Json<PreferenceResponse>, ServiceError> {
    let response = state.services.checkout.create_preference(request).await?;
    Ok(Json(response))
}

pub fn checkout_routes() -> Router<AppState> {
    Router::new().route("/preferences", post(create_preference))
}
