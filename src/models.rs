use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Deserializer, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema, PartialEq)]
pub struct Dress {
    pub id: Uuid,
    pub created_at: DateTime<Utc>,
    pub owner_id: Uuid,
    pub title: String,
    #[serde(default)]
    pub types: Vec<String>,
    #[serde(default)]
    pub colors: Vec<String>,
    pub size: String,
    /// Daily rental price.
    pub price: f64,
    #[serde(default, deserialize_with = "null_as_default")]
    pub description: String,
    /// Older rows store a single URL string.
    #[serde(default, deserialize_with = "one_or_many")]
    pub image_url: Vec<String>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub pickup_location: String,
    pub custom_pickup_location: Option<String>,
    pub is_active: bool,
}

/// Row shape sent on insert; the backend assigns `id` and `created_at`.
#[derive(Debug, Clone, Serialize, ToSchema, PartialEq)]
pub struct NewDress {
    pub owner_id: Uuid,
    pub title: String,
    pub types: Vec<String>,
    pub colors: Vec<String>,
    pub size: String,
    pub price: f64,
    pub description: String,
    pub image_url: Vec<String>,
    pub pickup_location: String,
    pub custom_pickup_location: Option<String>,
    pub is_active: bool,
}

/// Fields an owner may change on an existing listing.
#[derive(Debug, Clone, Serialize, ToSchema, PartialEq)]
pub struct DressChanges {
    pub title: String,
    pub types: Vec<String>,
    pub colors: Vec<String>,
    pub size: String,
    pub price: f64,
    pub description: String,
    pub image_url: Vec<String>,
    pub pickup_location: String,
    pub custom_pickup_location: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema, PartialEq)]
pub struct Profile {
    pub id: Uuid,
    #[serde(default, deserialize_with = "null_as_default")]
    pub full_name: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub email: String,
    pub phone: Option<String>,
    pub avatar_url: Option<String>,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, ToSchema, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum AvailabilityStatus {
    #[default]
    Available,
    Reserved,
    Rented,
    Unavailable,
}

impl AvailabilityStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            AvailabilityStatus::Available => "available",
            AvailabilityStatus::Reserved => "reserved",
            AvailabilityStatus::Rented => "rented",
            AvailabilityStatus::Unavailable => "unavailable",
        }
    }

    pub const BLOCKING: [AvailabilityStatus; 3] = [
        AvailabilityStatus::Reserved,
        AvailabilityStatus::Rented,
        AvailabilityStatus::Unavailable,
    ];
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema, PartialEq)]
pub struct Availability {
    pub id: Uuid,
    pub created_at: DateTime<Utc>,
    pub dress_id: Uuid,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    pub is_available: bool,
    pub renter_id: Option<Uuid>,
    #[serde(default)]
    pub status: AvailabilityStatus,
}

impl Availability {
    /// Whether the record takes its date range off the rental calendar.
    pub fn blocks_rental(&self) -> bool {
        !self.is_available || self.status != AvailabilityStatus::Available
    }
}

#[derive(Debug, Clone, Serialize, ToSchema, PartialEq)]
pub struct NewAvailability {
    pub dress_id: Uuid,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    pub is_available: bool,
    pub renter_id: Option<Uuid>,
    pub status: AvailabilityStatus,
}

fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de> + Default,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

#[derive(Deserialize)]
#[serde(untagged)]
enum OneOrMany {
    One(String),
    Many(Vec<String>),
}

fn one_or_many<'de, D>(deserializer: D) -> Result<Vec<String>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match Option::<OneOrMany>::deserialize(deserializer)? {
        None => Vec::new(),
        Some(OneOrMany::One(url)) if url.is_empty() => Vec::new(),
        Some(OneOrMany::One(url)) => vec![url],
        Some(OneOrMany::Many(urls)) => urls,
    })
}
