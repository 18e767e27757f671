use axum::{
    Json, Router,
    extract::{Multipart, Path, Query, State},
    http::StatusCode,
    routing::{get, post},
};
use utoipa::ToSchema;
use uuid::Uuid;

use crate::{
    dto::{
        availability::{
            AvailabilityCheck, AvailabilityCheckQuery, AvailabilityList, CreateAvailabilityRequest,
        },
        calendar::{CalendarQuery, CalendarView, SelectDateRequest, SelectDateResponse},
        dresses::{DressDetail, DressList, ListingForm},
    },
    error::AppResult,
    middleware::auth::AuthUser,
    models::{Availability, Dress},
    response::ApiResponse,
    routes::{form::read_form, params::DressQuery},
    services::{availability_service, dress_service},
    state::AppState,
};

pub const IMAGES_FIELD: &str = "images";

/// Multipart body of the listing create and update calls.
#[derive(ToSchema)]
#[allow(dead_code)]
pub struct ListingUpload {
    /// JSON-encoded `ListingForm`.
    payload: String,
    /// Photos, repeated once per file.
    #[schema(value_type = Vec<String>, format = Binary)]
    images: Vec<Vec<u8>>,
}

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(list_dresses).post(create_dress))
        .route(
            "/{id}",
            get(get_dress).put(update_dress).delete(delete_dress),
        )
        .route("/{id}/edit", get(edit_dress))
        .route("/{id}/calendar", get(calendar))
        .route("/{id}/calendar/select", post(select_date))
        .route(
            "/{id}/availability",
            get(list_availability).post(create_availability),
        )
        .route("/{id}/availability/check", get(check_availability))
}

#[utoipa::path(
    get,
    path = "/api/dresses",
    params(DressQuery),
    responses(
        (status = 200, description = "List active dresses", body = ApiResponse<DressList>)
    ),
    tag = "Dresses"
)]
pub async fn list_dresses(
    State(state): State<AppState>,
    Query(query): Query<DressQuery>,
) -> AppResult<Json<ApiResponse<DressList>>> {
    let resp = dress_service::list_dresses(&state, query).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    get,
    path = "/api/dresses/{id}",
    params(("id" = Uuid, Path, description = "Dress ID")),
    responses(
        (status = 200, description = "Dress detail", body = ApiResponse<DressDetail>),
        (status = 404, description = "Dress not found"),
    ),
    tag = "Dresses"
)]
pub async fn get_dress(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> AppResult<Json<ApiResponse<DressDetail>>> {
    let resp = dress_service::get_dress(&state, id).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    post,
    path = "/api/dresses",
    request_body(content = ListingUpload, content_type = "multipart/form-data"),
    responses(
        (status = 201, description = "Listing created", body = ApiResponse<Dress>),
        (status = 400, description = "Invalid form"),
        (status = 502, description = "Image upload failed"),
    ),
    security(("bearer_auth" = [])),
    tag = "Dresses"
)]
pub async fn create_dress(
    State(state): State<AppState>,
    user: AuthUser,
    multipart: Multipart,
) -> AppResult<(StatusCode, Json<ApiResponse<Dress>>)> {
    let (form, images) = read_form::<ListingForm>(multipart, IMAGES_FIELD).await?;
    let resp = dress_service::create_dress(&state, &user, form, images).await?;
    Ok((StatusCode::CREATED, Json(resp)))
}

#[utoipa::path(
    get,
    path = "/api/dresses/{id}/edit",
    params(("id" = Uuid, Path, description = "Dress ID")),
    responses(
        (status = 200, description = "Prefilled edit form", body = ApiResponse<ListingForm>),
        (status = 403, description = "Not the owner"),
    ),
    security(("bearer_auth" = [])),
    tag = "Dresses"
)]
pub async fn edit_dress(
    State(state): State<AppState>,
    user: AuthUser,
    Path(id): Path<Uuid>,
) -> AppResult<Json<ApiResponse<ListingForm>>> {
    let resp = dress_service::edit_form(&state, &user, id).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    put,
    path = "/api/dresses/{id}",
    params(("id" = Uuid, Path, description = "Dress ID")),
    request_body(content = ListingUpload, content_type = "multipart/form-data"),
    responses(
        (status = 200, description = "Listing updated", body = ApiResponse<Dress>),
        (status = 403, description = "Not the owner"),
    ),
    security(("bearer_auth" = [])),
    tag = "Dresses"
)]
pub async fn update_dress(
    State(state): State<AppState>,
    user: AuthUser,
    Path(id): Path<Uuid>,
    multipart: Multipart,
) -> AppResult<Json<ApiResponse<Dress>>> {
    let (form, images) = read_form::<ListingForm>(multipart, IMAGES_FIELD).await?;
    let resp = dress_service::update_dress(&state, &user, id, form, images).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    delete,
    path = "/api/dresses/{id}",
    params(("id" = Uuid, Path, description = "Dress ID")),
    responses(
        (status = 200, description = "Listing deactivated"),
        (status = 403, description = "Not the owner"),
    ),
    security(("bearer_auth" = [])),
    tag = "Dresses"
)]
pub async fn delete_dress(
    State(state): State<AppState>,
    user: AuthUser,
    Path(id): Path<Uuid>,
) -> AppResult<Json<ApiResponse<serde_json::Value>>> {
    let resp = dress_service::delete_dress(&state, &user, id).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    get,
    path = "/api/dresses/{id}/calendar",
    params(("id" = Uuid, Path, description = "Dress ID"), CalendarQuery),
    responses(
        (status = 200, description = "Month grid", body = ApiResponse<CalendarView>)
    ),
    tag = "Calendar"
)]
pub async fn calendar(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Query(query): Query<CalendarQuery>,
) -> AppResult<Json<ApiResponse<CalendarView>>> {
    let resp = availability_service::calendar_view(&state, id, query).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    post,
    path = "/api/dresses/{id}/calendar/select",
    params(("id" = Uuid, Path, description = "Dress ID")),
    request_body = SelectDateRequest,
    responses(
        (status = 200, description = "Next selection", body = ApiResponse<SelectDateResponse>)
    ),
    tag = "Calendar"
)]
pub async fn select_date(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(payload): Json<SelectDateRequest>,
) -> AppResult<Json<ApiResponse<SelectDateResponse>>> {
    let resp = availability_service::select_date(&state, id, payload).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    get,
    path = "/api/dresses/{id}/availability",
    params(("id" = Uuid, Path, description = "Dress ID")),
    responses(
        (status = 200, description = "Availability records", body = ApiResponse<AvailabilityList>)
    ),
    tag = "Availability"
)]
pub async fn list_availability(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> AppResult<Json<ApiResponse<AvailabilityList>>> {
    let resp = availability_service::list_availability(&state, id).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    post,
    path = "/api/dresses/{id}/availability",
    params(("id" = Uuid, Path, description = "Dress ID")),
    request_body = CreateAvailabilityRequest,
    responses(
        (status = 201, description = "Record created", body = ApiResponse<Availability>),
        (status = 403, description = "Not the owner"),
    ),
    security(("bearer_auth" = [])),
    tag = "Availability"
)]
pub async fn create_availability(
    State(state): State<AppState>,
    user: AuthUser,
    Path(id): Path<Uuid>,
    Json(payload): Json<CreateAvailabilityRequest>,
) -> AppResult<(StatusCode, Json<ApiResponse<Availability>>)> {
    let resp = availability_service::create_availability(&state, &user, id, payload).await?;
    Ok((StatusCode::CREATED, Json(resp)))
}

#[utoipa::path(
    get,
    path = "/api/dresses/{id}/availability/check",
    params(("id" = Uuid, Path, description = "Dress ID"), AvailabilityCheckQuery),
    responses(
        (status = 200, description = "Conflicts and price quote", body = ApiResponse<AvailabilityCheck>)
    ),
    tag = "Availability"
)]
pub async fn check_availability(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Query(query): Query<AvailabilityCheckQuery>,
) -> AppResult<Json<ApiResponse<AvailabilityCheck>>> {
    let resp = availability_service::check_availability(&state, id, query).await?;
    Ok(Json(resp))
}
