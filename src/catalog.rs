use serde::Serialize;
use utoipa::ToSchema;

pub const DRESS_TYPES: [&str; 5] = ["Casual", "Semi-Formal", "Work", "Party", "Formal"];

pub const SIZES: [&str; 5] = ["XS", "S", "M", "L", "XL"];

/// Picking this color means the listing supplies its own color text.
pub const OTHER_COLOR: &str = "Other";

pub const COMMON_COLORS: [&str; 16] = [
    "Black", "White", "Red", "Blue", "Green", "Pink", "Purple", "Yellow", "Orange", "Navy", "Gray",
    "Silver", "Gold", "Beige", "Brown", OTHER_COLOR,
];

/// Picking this location means the listing supplies its own pickup text.
pub const OTHER_LOCATION: &str = "Other (specify below)";

pub const CAMPUS_LOCATIONS: [&str; 7] = [
    "Moffitt Library",
    "Sather Gate",
    "Sproul Plaza",
    "Memorial Glade",
    "RSF (Recreational Sports Facility)",
    "MLK Student Union",
    OTHER_LOCATION,
];

pub fn is_common_color(color: &str) -> bool {
    COMMON_COLORS.contains(&color)
}

pub fn is_campus_location(location: &str) -> bool {
    CAMPUS_LOCATIONS.contains(&location)
}

/// Option lists a listing form renders.
#[derive(Debug, Serialize, ToSchema)]
pub struct Catalog {
    pub dress_types: Vec<String>,
    pub sizes: Vec<String>,
    pub colors: Vec<String>,
    pub pickup_locations: Vec<String>,
    pub min_rental_days: i64,
    pub max_rental_days: i64,
    pub max_image_bytes: usize,
}

impl Catalog {
    pub fn new(min_rental_days: i64, max_rental_days: i64, max_image_bytes: usize) -> Self {
        fn owned(items: &[&str]) -> Vec<String> {
            items.iter().map(|s| s.to_string()).collect()
        }
        Self {
            dress_types: owned(&DRESS_TYPES),
            sizes: owned(&SIZES),
            colors: owned(&COMMON_COLORS),
            pickup_locations: owned(&CAMPUS_LOCATIONS),
            min_rental_days,
            max_rental_days,
            max_image_bytes,
        }
    }
}
