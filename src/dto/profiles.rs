use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::models::{Dress, Profile};

/// Profile form, sent as the `payload` part next to an optional `avatar` file.
#[derive(Debug, Clone, Default, Deserialize, ToSchema)]
#[serde(default)]
pub struct ProfileForm {
    pub full_name: String,
    pub phone: Option<String>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct ProfileView {
    pub profile: Option<Profile>,
    pub listings: Vec<Dress>,
}
