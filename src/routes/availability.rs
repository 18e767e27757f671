use axum::{
    Json, Router,
    extract::{Path, State},
    routing::put,
};
use uuid::Uuid;

use crate::{
    dto::availability::UpdateAvailabilityRequest,
    error::AppResult,
    middleware::auth::AuthUser,
    models::Availability,
    response::ApiResponse,
    services::availability_service,
    state::AppState,
};

pub fn router() -> Router<AppState> {
    Router::new().route("/{id}", put(update_availability))
}

#[utoipa::path(
    put,
    path = "/api/availability/{id}",
    params(("id" = Uuid, Path, description = "Availability record ID")),
    request_body = UpdateAvailabilityRequest,
    responses(
        (status = 200, description = "Record updated", body = ApiResponse<Availability>),
        (status = 403, description = "Not the dress owner"),
        (status = 404, description = "Record not found"),
    ),
    security(("bearer_auth" = [])),
    tag = "Availability"
)]
pub async fn update_availability(
    State(state): State<AppState>,
    user: AuthUser,
    Path(id): Path<Uuid>,
    Json(payload): Json<UpdateAvailabilityRequest>,
) -> AppResult<Json<ApiResponse<Availability>>> {
    let resp = availability_service::update_availability(&state, &user, id, payload).await?;
    Ok(Json(resp))
}
