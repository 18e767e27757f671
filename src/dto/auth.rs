use serde::{Deserialize, Serialize};
use serde_json::Value;
use utoipa::ToSchema;
use uuid::Uuid;

/// Claims carried by hosted-auth access tokens.
#[derive(Debug, Deserialize, Serialize, ToSchema)]
pub struct Claims {
    pub sub: String,
    pub aud: String,
    pub exp: usize,
    pub email: Option<String>,
    pub role: Option<String>,
    #[serde(default)]
    #[schema(value_type = Object)]
    pub user_metadata: Value,
}

impl Claims {
    pub fn full_name(&self) -> Option<String> {
        ["full_name", "name"]
            .iter()
            .find_map(|k| self.user_metadata.get(*k).and_then(Value::as_str))
            .map(str::to_string)
    }
}

#[derive(Debug, Serialize, ToSchema)]
pub struct LoginUrlResponse {
    pub provider: String,
    pub url: String,
}

#[derive(Deserialize, Debug, ToSchema)]
pub struct SessionRequest {
    pub access_token: String,
    pub refresh_token: Option<String>,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct SessionUser {
    pub id: Uuid,
    pub email: String,
    pub full_name: Option<String>,
    pub avatar_url: Option<String>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct SessionResponse {
    pub user: SessionUser,
    pub access_token: String,
    pub refresh_token: Option<String>,
}
