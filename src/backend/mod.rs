//! Client contract for the hosted backend (database, object storage, auth).

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use thiserror::Error;
use uuid::Uuid;

pub mod memory;
pub mod query;
pub mod supabase;

pub use memory::MemoryBackend;
pub use query::{Filter, Query};
pub use supabase::SupabaseClient;

#[derive(Debug, Error)]
pub enum BackendError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("URL error: {0}")]
    Url(#[from] url::ParseError),

    #[error("backend returned {status}: {message}")]
    Status { status: u16, message: String },

    #[error("row not found")]
    NotFound,

    #[error("object already exists: {0}")]
    Duplicate(String),

    #[error("invalid or expired session")]
    Unauthorized,
}

pub type BackendResult<T> = Result<T, BackendError>;

/// Bytes plus MIME type of an object headed for storage.
#[derive(Debug, Clone, PartialEq)]
pub struct StorageObject {
    pub bytes: Vec<u8>,
    pub content_type: String,
}

/// User record returned by the hosted auth service.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct HostedUser {
    pub id: Uuid,
    pub email: Option<String>,
    #[serde(default)]
    pub user_metadata: Value,
}

impl HostedUser {
    pub fn full_name(&self) -> Option<String> {
        metadata_str(&self.user_metadata, &["full_name", "name"])
    }

    pub fn avatar_url(&self) -> Option<String> {
        metadata_str(&self.user_metadata, &["avatar_url", "picture"])
    }
}

fn metadata_str(metadata: &Value, keys: &[&str]) -> Option<String> {
    keys.iter()
        .find_map(|k| metadata.get(*k).and_then(Value::as_str))
        .map(str::to_string)
}

/// Every call is one request/response round trip. `auth` is the caller's
/// access token; without it the call runs with the anonymous key.
#[async_trait]
pub trait HostedBackend: Send + Sync {
    async fn select(&self, table: &str, query: &Query, auth: Option<&str>)
    -> BackendResult<Vec<Value>>;

    /// Exact number of rows matching the query's filters.
    async fn count(&self, table: &str, query: &Query, auth: Option<&str>) -> BackendResult<i64>;

    /// Inserts one row and returns it as stored.
    async fn insert(&self, table: &str, row: Value, auth: Option<&str>) -> BackendResult<Value>;

    /// Patches every row matching the query and returns the updated rows.
    async fn update(
        &self,
        table: &str,
        query: &Query,
        changes: Value,
        auth: Option<&str>,
    ) -> BackendResult<Vec<Value>>;

    /// Inserts, or merges into the row with the same primary key.
    async fn upsert(&self, table: &str, row: Value, auth: Option<&str>) -> BackendResult<Value>;

    /// Stores an object and returns its path inside the bucket.
    async fn upload(
        &self,
        bucket: &str,
        path: &str,
        object: StorageObject,
        upsert: bool,
        auth: Option<&str>,
    ) -> BackendResult<String>;

    fn public_url(&self, bucket: &str, path: &str) -> String;

    fn authorize_url(&self, provider: &str, redirect_to: &str) -> BackendResult<String>;

    async fn get_user(&self, access_token: &str) -> BackendResult<HostedUser>;

    async fn sign_out(&self, access_token: &str) -> BackendResult<()>;
}

pub(crate) fn public_object_url(base_url: &str, bucket: &str, path: &str) -> String {
    format!("{base_url}/storage/v1/object/public/{bucket}/{path}")
}

pub(crate) fn oauth_authorize_url(
    base_url: &str,
    provider: &str,
    redirect_to: &str,
) -> BackendResult<String> {
    let mut url = url::Url::parse(&format!("{base_url}/auth/v1/authorize"))?;
    url.query_pairs_mut()
        .append_pair("provider", provider)
        .append_pair("redirect_to", redirect_to);
    Ok(url.into())
}
