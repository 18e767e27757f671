use crate::{
    backend::HostedUser,
    db,
    dto::auth::{LoginUrlResponse, SessionRequest, SessionResponse, SessionUser},
    error::{AppError, AppResult},
    middleware::auth::AuthUser,
    models::Profile,
    response::{ApiResponse, Meta},
    state::AppState,
};

pub fn login_url(state: &AppState) -> AppResult<ApiResponse<LoginUrlResponse>> {
    let provider = state.config.oauth_provider.clone();
    let url = state
        .backend
        .authorize_url(&provider, &state.config.oauth_redirect_url)?;
    Ok(ApiResponse::success(
        "Login URL",
        LoginUrlResponse { provider, url },
        None,
    ))
}

fn domain_rejection(state: &AppState) -> AppError {
    let domains: Vec<String> = state
        .config
        .allowed_email_domains
        .iter()
        .map(|d| format!("@{d}"))
        .collect();
    AppError::Unauthorized(format!(
        "Only {} email addresses are allowed to sign in.",
        domains.join(" or ")
    ))
}

/// Exchanges the token from the OAuth redirect for a session. First-time
/// users get a profile seeded from their identity-provider metadata.
pub async fn create_session(
    state: &AppState,
    payload: SessionRequest,
) -> AppResult<ApiResponse<SessionResponse>> {
    let backend = state.backend.as_ref();
    let user = backend.get_user(&payload.access_token).await?;
    let email = user.email.clone().unwrap_or_default();

    if !state.config.email_allowed(&email) {
        tracing::warn!(user_id = %user.id, email = %email, "sign-in refused by email domain policy");
        if let Err(err) = backend.sign_out(&payload.access_token).await {
            tracing::warn!(error = %err, "failed to revoke refused session");
        }
        return Err(domain_rejection(state));
    }

    let token = Some(payload.access_token.as_str());
    let profile = match db::profiles::get(backend, user.id, token).await? {
        Some(profile) => profile,
        None => {
            let seeded = db::profiles::upsert(backend, &profile_from_user(&user, &email), token).await?;
            tracing::info!(user_id = %user.id, "profile created on first sign-in");
            seeded
        }
    };

    let session = SessionResponse {
        user: SessionUser {
            id: user.id,
            email,
            full_name: Some(profile.full_name).filter(|n| !n.is_empty()),
            avatar_url: profile.avatar_url.or_else(|| user.avatar_url()),
        },
        access_token: payload.access_token,
        refresh_token: payload.refresh_token,
    };
    Ok(ApiResponse::success("Signed in", session, Some(Meta::empty())))
}

fn profile_from_user(user: &HostedUser, email: &str) -> Profile {
    Profile {
        id: user.id,
        full_name: user.full_name().unwrap_or_else(|| email.to_string()),
        email: email.to_string(),
        phone: None,
        avatar_url: user.avatar_url(),
    }
}

pub async fn logout(state: &AppState, user: &AuthUser) -> AppResult<ApiResponse<serde_json::Value>> {
    state.backend.sign_out(&user.access_token).await?;
    tracing::info!(user_id = %user.user_id, "signed out");
    Ok(ApiResponse::success(
        "Signed out",
        serde_json::json!({}),
        Some(Meta::empty()),
    ))
}

pub async fn me(state: &AppState, user: &AuthUser) -> AppResult<ApiResponse<SessionUser>> {
    let profile = db::profiles::get(state.backend.as_ref(), user.user_id, user.token()).await?;
    let (full_name, avatar_url) = match profile {
        Some(p) => (Some(p.full_name).filter(|n| !n.is_empty()), p.avatar_url),
        None => (user.full_name.clone(), None),
    };
    Ok(ApiResponse::success(
        "Current user",
        SessionUser {
            id: user.user_id,
            email: user.email.clone(),
            full_name,
            avatar_url,
        },
        None,
    ))
}
