//! Listing form rules shared by the create and edit pages.

use std::collections::HashSet;

use uuid::Uuid;

use crate::{
    catalog::{DRESS_TYPES, OTHER_COLOR, OTHER_LOCATION, SIZES, is_campus_location, is_common_color},
    dto::dresses::{ListingForm, PriceInput},
    error::{AppError, AppResult},
    models::{Dress, DressChanges, NewDress},
};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FormMode {
    Create,
    Edit,
}

/// Form contents after validation, before images are attached.
#[derive(Debug, Clone, PartialEq)]
pub struct ValidListing {
    pub title: String,
    pub types: Vec<String>,
    pub colors: Vec<String>,
    pub size: String,
    pub price: f64,
    pub description: String,
    pub pickup_location: String,
    pub custom_pickup_location: Option<String>,
}

impl ValidListing {
    pub fn into_new_dress(self, owner_id: Uuid, image_url: Vec<String>) -> NewDress {
        NewDress {
            owner_id,
            title: self.title,
            types: self.types,
            colors: self.colors,
            size: self.size,
            price: self.price,
            description: self.description,
            image_url,
            pickup_location: self.pickup_location,
            custom_pickup_location: self.custom_pickup_location,
            is_active: true,
        }
    }

    pub fn into_changes(self, image_url: Vec<String>) -> DressChanges {
        DressChanges {
            title: self.title,
            types: self.types,
            colors: self.colors,
            size: self.size,
            price: self.price,
            description: self.description,
            image_url,
            pickup_location: self.pickup_location,
            custom_pickup_location: self.custom_pickup_location,
        }
    }
}

fn bad(message: &str) -> AppError {
    AppError::BadRequest(message.to_string())
}

/// Checks the form fields and resolves the "Other" color and pickup choices.
/// `image_count` is the number of images the listing would end up with.
pub fn validate(form: &ListingForm, mode: FormMode, image_count: usize) -> AppResult<ValidListing> {
    let title = form.title.trim();
    if title.is_empty() {
        return Err(bad("Please enter a title"));
    }

    if form.types.is_empty() {
        return Err(bad("Please select at least one dress type"));
    }
    if let Some(unknown) = form.types.iter().find(|t| !DRESS_TYPES.contains(&t.as_str())) {
        return Err(AppError::BadRequest(format!("Unknown dress type: {unknown}")));
    }

    let colors = resolve_colors(form, mode)?;

    if !SIZES.contains(&form.size.as_str()) {
        return Err(bad("Please select a valid size"));
    }

    let price = form
        .price
        .parse()
        .filter(|p| p.is_finite() && *p >= 0.0)
        .ok_or_else(|| bad("Please enter a valid price"))?;

    let description = form.description.trim();
    if description.is_empty() {
        return Err(bad("Please enter a description"));
    }

    let (pickup_location, custom_pickup_location) = resolve_pickup(form)?;

    if image_count == 0 {
        return Err(bad("Please upload at least one image"));
    }

    Ok(ValidListing {
        title: title.to_string(),
        types: form.types.clone(),
        colors,
        size: form.size.clone(),
        price,
        description: description.to_string(),
        pickup_location,
        custom_pickup_location,
    })
}

fn resolve_colors(form: &ListingForm, mode: FormMode) -> AppResult<Vec<String>> {
    let custom = form.custom_color.trim();
    let mut colors = Vec::with_capacity(form.colors.len());
    for color in &form.colors {
        if color != OTHER_COLOR {
            colors.push(color.clone());
        } else if !custom.is_empty() {
            colors.push(custom.to_string());
        } else if mode == FormMode::Create {
            return Err(bad("Please enter a custom color"));
        }
    }
    let mut seen = HashSet::new();
    colors.retain(|color| seen.insert(color.clone()));

    if colors.is_empty() {
        return Err(bad("Please select at least one color"));
    }
    Ok(colors)
}

fn resolve_pickup(form: &ListingForm) -> AppResult<(String, Option<String>)> {
    let location = form.pickup_location.trim();
    if location.is_empty() {
        return Err(bad("Please select a pickup location"));
    }
    if location != OTHER_LOCATION {
        return Ok((location.to_string(), None));
    }

    let custom = form.custom_pickup_location.trim();
    if custom.is_empty() {
        return Err(bad("Please enter a pickup location"));
    }
    Ok((custom.to_string(), Some(custom.to_string())))
}

/// Maps a stored listing back onto the edit form.
pub fn prefill(dress: &Dress) -> ListingForm {
    let mut colors: Vec<String> = Vec::new();
    let mut custom_colors: Vec<&str> = Vec::new();
    for color in &dress.colors {
        if is_common_color(color) {
            colors.push(color.clone());
        } else {
            custom_colors.push(color);
        }
    }
    if !custom_colors.is_empty() {
        colors.push(OTHER_COLOR.to_string());
    }

    let custom_pickup = dress
        .custom_pickup_location
        .clone()
        .filter(|c| !c.is_empty());
    let (pickup_location, custom_pickup_location) = match custom_pickup {
        Some(custom) => (OTHER_LOCATION.to_string(), custom),
        None if is_campus_location(&dress.pickup_location) => {
            (dress.pickup_location.clone(), String::new())
        }
        None if dress.pickup_location.is_empty() => (String::new(), String::new()),
        None => (OTHER_LOCATION.to_string(), dress.pickup_location.clone()),
    };

    ListingForm {
        title: dress.title.clone(),
        types: dress.types.clone(),
        colors,
        custom_color: custom_colors.join(", "),
        size: dress.size.clone(),
        price: PriceInput::Number(dress.price),
        description: dress.description.clone(),
        pickup_location,
        custom_pickup_location,
        existing_image_urls: dress.image_url.clone(),
    }
}
