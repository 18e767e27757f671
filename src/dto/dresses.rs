use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::models::{Availability, Dress, Profile};

/// Price as typed into the form: a JSON number or numeric text.
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
#[serde(untagged)]
pub enum PriceInput {
    Number(f64),
    Text(String),
}

impl Default for PriceInput {
    fn default() -> Self {
        PriceInput::Text(String::new())
    }
}

impl PriceInput {
    pub fn parse(&self) -> Option<f64> {
        match self {
            PriceInput::Number(n) => Some(*n),
            PriceInput::Text(s) => s.trim().parse::<f64>().ok(),
        }
    }
}

/// Listing form fields, sent as the `payload` part of a multipart request
/// next to the `images` file parts.
#[derive(Debug, Clone, Default, Deserialize, Serialize, ToSchema, PartialEq)]
#[serde(default)]
pub struct ListingForm {
    pub title: String,
    pub types: Vec<String>,
    pub colors: Vec<String>,
    /// Used when `colors` contains "Other".
    pub custom_color: String,
    pub size: String,
    #[schema(value_type = String, example = "50")]
    pub price: PriceInput,
    pub description: String,
    pub pickup_location: String,
    /// Used when `pickup_location` is "Other (specify below)".
    pub custom_pickup_location: String,
    /// Edit only: already-uploaded image URLs to keep.
    pub existing_image_urls: Vec<String>,
}

#[derive(Serialize, ToSchema)]
#[serde(transparent)]
pub struct DressList {
    #[schema(value_type = Vec<Dress>)]
    pub items: Vec<Dress>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct DressDetail {
    pub dress: Dress,
    pub owner: Option<Profile>,
    pub availability: Vec<Availability>,
    pub unavailable_dates: Vec<NaiveDate>,
    pub min_rental_days: i64,
    pub max_rental_days: i64,
}
