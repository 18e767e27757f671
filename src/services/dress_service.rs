use uuid::Uuid;

use crate::{
    db::{self, dresses::filter_query},
    dto::dresses::{DressDetail, DressList, ListingForm},
    error::{AppError, AppResult},
    listing::{self, FormMode},
    middleware::auth::{AuthUser, ensure_owner},
    models::Dress,
    response::{ApiResponse, Meta},
    routes::params::{DressQuery, DressSortBy, SortOrder},
    services::availability_service::unavailable_dates,
    state::AppState,
    storage::{self, ImageUpload},
};

pub async fn list_dresses(
    state: &AppState,
    query: DressQuery,
) -> AppResult<ApiResponse<DressList>> {
    let (page, per_page, offset) = query.pagination().normalize();
    let backend = state.backend.as_ref();
    let mut finder = filter_query(&query.filters());

    if let Some((from, to)) = query.window() {
        if from > to {
            return Err(AppError::BadRequest(
                "available_from must be on or before available_to".into(),
            ));
        }
        let blocked = db::availability::blocked_dress_ids(backend, from, to, None).await?;
        tracing::debug!(%from, %to, blocked = blocked.len(), "excluding unavailable dresses");
        if !blocked.is_empty() {
            finder = finder.not_in("id", blocked.iter().map(Uuid::to_string));
        }
    }

    let sort_by = query.sort_by.unwrap_or(DressSortBy::CreatedAt);
    let sort_order = query.sort_order.unwrap_or(SortOrder::Desc);
    finder = finder.order_by(sort_by.column(), sort_order.is_ascending());

    let total = db::dresses::count(backend, &finder, None).await?;
    let items = db::dresses::list(backend, &finder.page(per_page as u64, offset as u64), None).await?;

    let meta = Meta::new(page, per_page, total);
    Ok(ApiResponse::success("Dresses", DressList { items }, Some(meta)))
}

async fn find_active(state: &AppState, id: Uuid, auth: Option<&str>) -> AppResult<Dress> {
    match db::dresses::get(state.backend.as_ref(), id, auth).await? {
        Some(dress) if dress.is_active => Ok(dress),
        _ => Err(AppError::NotFound),
    }
}

/// Loads a listing the caller owns.
pub(crate) async fn find_owned(state: &AppState, user: &AuthUser, id: Uuid) -> AppResult<Dress> {
    let dress = find_active(state, id, user.token()).await?;
    ensure_owner(user, dress.owner_id)?;
    Ok(dress)
}

pub async fn get_dress(state: &AppState, id: Uuid) -> AppResult<ApiResponse<DressDetail>> {
    let backend = state.backend.as_ref();
    let dress = find_active(state, id, None).await?;
    let owner = db::profiles::get(backend, dress.owner_id, None).await?;
    let availability = db::availability::list_for_dress(backend, id, None).await?;
    let unavailable_dates = unavailable_dates(&availability);

    let detail = DressDetail {
        dress,
        owner,
        availability,
        unavailable_dates,
        min_rental_days: state.config.min_rental_days,
        max_rental_days: state.config.max_rental_days,
    };
    Ok(ApiResponse::success("Dress", detail, None))
}

pub async fn create_dress(
    state: &AppState,
    user: &AuthUser,
    form: ListingForm,
    images: Vec<ImageUpload>,
) -> AppResult<ApiResponse<Dress>> {
    let valid = listing::validate(&form, FormMode::Create, images.len())?;
    let backend = state.backend.as_ref();

    let urls =
        storage::upload_dress_images(backend, images, state.config.max_image_bytes, user.token())
            .await?;
    let dress = db::dresses::create(backend, &valid.into_new_dress(user.user_id, urls), user.token())
        .await?;

    tracing::info!(dress_id = %dress.id, owner_id = %user.user_id, "listing created");
    Ok(ApiResponse::success("Dress created", dress, Some(Meta::empty())))
}

pub async fn edit_form(
    state: &AppState,
    user: &AuthUser,
    id: Uuid,
) -> AppResult<ApiResponse<ListingForm>> {
    let dress = find_owned(state, user, id).await?;
    Ok(ApiResponse::success("Dress form", listing::prefill(&dress), None))
}

pub async fn update_dress(
    state: &AppState,
    user: &AuthUser,
    id: Uuid,
    form: ListingForm,
    images: Vec<ImageUpload>,
) -> AppResult<ApiResponse<Dress>> {
    let existing = find_owned(state, user, id).await?;

    // Only URLs already on the listing can be retained.
    let retained: Vec<String> = form
        .existing_image_urls
        .iter()
        .filter(|url| existing.image_url.contains(url))
        .cloned()
        .collect();
    if retained.len() != form.existing_image_urls.len() {
        tracing::debug!(dress_id = %id, "dropping retained image urls not on the listing");
    }

    let valid = listing::validate(&form, FormMode::Edit, retained.len() + images.len())?;
    let backend = state.backend.as_ref();

    let uploaded =
        storage::upload_dress_images(backend, images, state.config.max_image_bytes, user.token())
            .await?;
    let image_url = retained.into_iter().chain(uploaded).collect();
    let dress = db::dresses::update(backend, id, &valid.into_changes(image_url), user.token()).await?;

    tracing::info!(dress_id = %id, "listing updated");
    Ok(ApiResponse::success("Dress updated", dress, Some(Meta::empty())))
}

pub async fn delete_dress(
    state: &AppState,
    user: &AuthUser,
    id: Uuid,
) -> AppResult<ApiResponse<serde_json::Value>> {
    find_owned(state, user, id).await?;
    db::dresses::soft_delete(state.backend.as_ref(), id, user.token()).await?;

    tracing::info!(dress_id = %id, "listing deactivated");
    Ok(ApiResponse::success(
        "Dress deleted",
        serde_json::json!({ "id": id }),
        Some(Meta::empty()),
    ))
}
