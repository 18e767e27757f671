use crate::{
    db,
    dto::profiles::{ProfileForm, ProfileView},
    error::{AppError, AppResult},
    middleware::auth::AuthUser,
    models::Profile,
    response::{ApiResponse, Meta},
    state::AppState,
    storage::{self, ImageUpload},
};

pub async fn get_profile(state: &AppState, user: &AuthUser) -> AppResult<ApiResponse<ProfileView>> {
    let backend = state.backend.as_ref();
    let profile = db::profiles::get(backend, user.user_id, user.token()).await?;
    let listings = db::dresses::list_by_owner(backend, user.user_id, user.token()).await?;
    let total = listings.len() as i64;

    Ok(ApiResponse::success(
        "Profile",
        ProfileView { profile, listings },
        Some(Meta::new(1, total, total)),
    ))
}

pub async fn update_profile(
    state: &AppState,
    user: &AuthUser,
    form: ProfileForm,
    avatar: Option<ImageUpload>,
) -> AppResult<ApiResponse<Profile>> {
    let full_name = form.full_name.trim();
    if full_name.is_empty() {
        return Err(AppError::BadRequest("Please enter your full name".into()));
    }

    let backend = state.backend.as_ref();
    let existing = db::profiles::get(backend, user.user_id, user.token()).await?;

    let avatar_url = match avatar {
        Some(image) => Some(
            storage::upload_avatar(
                backend,
                user.user_id,
                image,
                state.config.max_image_bytes,
                user.token(),
            )
            .await?,
        ),
        None => existing.and_then(|p| p.avatar_url),
    };

    let profile = Profile {
        id: user.user_id,
        full_name: full_name.to_string(),
        email: user.email.clone(),
        phone: form
            .phone
            .map(|p| p.trim().to_string())
            .filter(|p| !p.is_empty()),
        avatar_url,
    };
    let saved = db::profiles::upsert(backend, &profile, user.token()).await?;

    tracing::info!(user_id = %user.user_id, "profile saved");
    Ok(ApiResponse::success("Profile saved", saved, Some(Meta::empty())))
}
