use axum::{Json, extract::State};

use crate::{catalog::Catalog, response::ApiResponse, state::AppState};

#[utoipa::path(
    get,
    path = "/api/catalog",
    responses(
        (status = 200, description = "Listing form options", body = ApiResponse<Catalog>),
    ),
    tag = "Catalog"
)]
pub async fn catalog(State(state): State<AppState>) -> Json<ApiResponse<Catalog>> {
    let config = &state.config;
    Json(ApiResponse::success(
        "Catalog",
        Catalog::new(config.min_rental_days, config.max_rental_days, config.max_image_bytes),
        None,
    ))
}
