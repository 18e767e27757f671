use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};
use uuid::Uuid;

use crate::{
    calendar::RentalQuote,
    models::{Availability, AvailabilityStatus},
};

#[derive(Debug, Deserialize, ToSchema)]
pub struct CreateAvailabilityRequest {
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    pub status: Option<AvailabilityStatus>,
    pub is_available: Option<bool>,
    pub renter_id: Option<Uuid>,
}

/// Partial update; absent fields are left untouched.
#[derive(Debug, Default, Deserialize, Serialize, ToSchema)]
pub struct UpdateAvailabilityRequest {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub start_date: Option<NaiveDate>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub end_date: Option<NaiveDate>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<AvailabilityStatus>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub is_available: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub renter_id: Option<Uuid>,
}

#[derive(Serialize, ToSchema)]
#[serde(transparent)]
pub struct AvailabilityList {
    #[schema(value_type = Vec<Availability>)]
    pub items: Vec<Availability>,
}

#[derive(Debug, Deserialize, ToSchema, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct AvailabilityCheckQuery {
    pub start: NaiveDate,
    pub end: NaiveDate,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct AvailabilityCheck {
    pub available: bool,
    pub conflicts: Vec<Availability>,
    pub quote: RentalQuote,
}
