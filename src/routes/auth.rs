use axum::{
    Json, Router,
    extract::State,
    routing::{get, post},
};

use crate::{
    dto::auth::{LoginUrlResponse, SessionRequest, SessionResponse, SessionUser},
    error::AppResult,
    middleware::auth::AuthUser,
    response::ApiResponse,
    services::auth_service,
    state::AppState,
};

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/login", get(login))
        .route("/session", post(session))
        .route("/logout", post(logout))
        .route("/me", get(me))
}

#[utoipa::path(
    get,
    path = "/api/auth/login",
    responses(
        (status = 200, description = "OAuth authorize URL", body = ApiResponse<LoginUrlResponse>)
    ),
    tag = "Auth"
)]
pub async fn login(State(state): State<AppState>) -> AppResult<Json<ApiResponse<LoginUrlResponse>>> {
    let resp = auth_service::login_url(&state)?;
    Ok(Json(resp))
}

#[utoipa::path(
    post,
    path = "/api/auth/session",
    request_body = SessionRequest,
    responses(
        (status = 200, description = "Session established", body = ApiResponse<SessionResponse>),
        (status = 401, description = "Invalid token or email domain not allowed")
    ),
    tag = "Auth"
)]
pub async fn session(
    State(state): State<AppState>,
    Json(payload): Json<SessionRequest>,
) -> AppResult<Json<ApiResponse<SessionResponse>>> {
    let resp = auth_service::create_session(&state, payload).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    post,
    path = "/api/auth/logout",
    responses((status = 200, description = "Session revoked")),
    security(("bearer_auth" = [])),
    tag = "Auth"
)]
pub async fn logout(
    State(state): State<AppState>,
    user: AuthUser,
) -> AppResult<Json<ApiResponse<serde_json::Value>>> {
    let resp = auth_service::logout(&state, &user).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    get,
    path = "/api/auth/me",
    responses(
        (status = 200, description = "Current user", body = ApiResponse<SessionUser>),
        (status = 401, description = "Missing or invalid session")
    ),
    security(("bearer_auth" = [])),
    tag = "Auth"
)]
pub async fn me(
    State(state): State<AppState>,
    user: AuthUser,
) -> AppResult<Json<ApiResponse<SessionUser>>> {
    let resp = auth_service::me(&state, &user).await?;
    Ok(Json(resp))
}
