use axum::{
    Json, Router,
    extract::{Multipart, State},
    routing::get,
};
use utoipa::ToSchema;

use crate::{
    dto::profiles::{ProfileForm, ProfileView},
    error::{AppError, AppResult},
    middleware::auth::AuthUser,
    models::Profile,
    response::ApiResponse,
    routes::form::read_form,
    services::profile_service,
    state::AppState,
};

pub const AVATAR_FIELD: &str = "avatar";

/// Multipart body of the profile update.
#[derive(ToSchema)]
#[allow(dead_code)]
pub struct ProfileUpload {
    /// JSON-encoded `ProfileForm`.
    payload: String,
    #[schema(value_type = Option<String>, format = Binary)]
    avatar: Option<Vec<u8>>,
}

pub fn router() -> Router<AppState> {
    Router::new().route("/", get(get_profile).put(update_profile))
}

#[utoipa::path(
    get,
    path = "/api/profile",
    responses(
        (status = 200, description = "Own profile and active listings", body = ApiResponse<ProfileView>)
    ),
    security(("bearer_auth" = [])),
    tag = "Profile"
)]
pub async fn get_profile(
    State(state): State<AppState>,
    user: AuthUser,
) -> AppResult<Json<ApiResponse<ProfileView>>> {
    let resp = profile_service::get_profile(&state, &user).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    put,
    path = "/api/profile",
    request_body(content = ProfileUpload, content_type = "multipart/form-data"),
    responses(
        (status = 200, description = "Profile saved", body = ApiResponse<Profile>),
        (status = 400, description = "Invalid form")
    ),
    security(("bearer_auth" = [])),
    tag = "Profile"
)]
pub async fn update_profile(
    State(state): State<AppState>,
    user: AuthUser,
    multipart: Multipart,
) -> AppResult<Json<ApiResponse<Profile>>> {
    let (form, mut avatars) = read_form::<ProfileForm>(multipart, AVATAR_FIELD).await?;
    if avatars.len() > 1 {
        return Err(AppError::BadRequest("Only one avatar image is allowed".into()));
    }
    let resp = profile_service::update_profile(&state, &user, form, avatars.pop()).await?;
    Ok(Json(resp))
}
