use utoipa::{
    Modify, OpenApi,
    openapi::{
        self,
        OpenApi as OpenApiSpec,
        security::{HttpAuthScheme, HttpBuilder, SecurityScheme},
    },
};
use utoipa_scalar::{Scalar, Servable};

use crate::{
    calendar::{DayCell, MonthGrid, RentalQuote},
    catalog::Catalog,
    dto::{
        auth::{LoginUrlResponse, SessionRequest, SessionResponse, SessionUser},
        availability::{
            AvailabilityCheck, AvailabilityList, CreateAvailabilityRequest,
            UpdateAvailabilityRequest,
        },
        calendar::{CalendarView, SelectDateRequest, SelectDateResponse},
        dresses::{DressDetail, DressList, ListingForm},
        profiles::{ProfileForm, ProfileView},
    },
    models::{Availability, AvailabilityStatus, Dress, Profile},
    response::{ApiResponse, Meta},
    routes::{auth, availability, catalog, dresses, health, params, profile},
};

struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut openapi::OpenApi) {
        let components = openapi.components.get_or_insert_with(Default::default);
        components.add_security_scheme(
            "bearer_auth",
            SecurityScheme::Http(
                HttpBuilder::new()
                    .scheme(HttpAuthScheme::Bearer)
                    .bearer_format("JWT")
                    .build(),
            ),
        );
    }
}

#[derive(OpenApi)]
#[openapi(
    paths(
        health::health_check,
        catalog::catalog,
        auth::login,
        auth::session,
        auth::logout,
        auth::me,
        dresses::list_dresses,
        dresses::create_dress,
        dresses::get_dress,
        dresses::edit_dress,
        dresses::update_dress,
        dresses::delete_dress,
        dresses::calendar,
        dresses::select_date,
        dresses::list_availability,
        dresses::create_availability,
        dresses::check_availability,
        availability::update_availability,
        profile::get_profile,
        profile::update_profile
    ),
    components(
        schemas(
            Dress,
            Profile,
            Availability,
            AvailabilityStatus,
            Catalog,
            DayCell,
            MonthGrid,
            RentalQuote,
            ListingForm,
            DressList,
            DressDetail,
            dresses::ListingUpload,
            CreateAvailabilityRequest,
            UpdateAvailabilityRequest,
            AvailabilityList,
            AvailabilityCheck,
            CalendarView,
            SelectDateRequest,
            SelectDateResponse,
            ProfileForm,
            ProfileView,
            profile::ProfileUpload,
            LoginUrlResponse,
            SessionRequest,
            SessionResponse,
            SessionUser,
            params::DressSortBy,
            params::SortOrder,
            health::HealthData,
            Meta,
            ApiResponse<Dress>,
            ApiResponse<DressList>,
            ApiResponse<DressDetail>,
            ApiResponse<Availability>,
            ApiResponse<Profile>
        )
    ),
    modifiers(&SecurityAddon),
    tags(
        (name = "Health", description = "Health check endpoint"),
        (name = "Catalog", description = "Listing form options"),
        (name = "Auth", description = "Hosted OAuth session endpoints"),
        (name = "Dresses", description = "Listing endpoints"),
        (name = "Calendar", description = "Rental date picker"),
        (name = "Availability", description = "Availability records"),
        (name = "Profile", description = "Profile endpoints"),
    )
)]
pub struct ApiDoc;

pub fn scalar_docs() -> Scalar<OpenApiSpec> {
    Scalar::with_url("/docs", ApiDoc::openapi())
}
