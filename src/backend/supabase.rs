use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, RequestBuilder, Response, header::CONTENT_TYPE};
use serde::de::DeserializeOwned;
use serde_json::Value;

use super::{
    BackendError, BackendResult, HostedBackend, HostedUser, Query, StorageObject,
    oauth_authorize_url, public_object_url,
};
use crate::config::AppConfig;

/// HTTP client for a hosted Supabase project (PostgREST, storage and auth).
#[derive(Clone)]
pub struct SupabaseClient {
    http: Client,
    base_url: String,
    anon_key: String,
}

impl SupabaseClient {
    pub fn new(config: &AppConfig) -> BackendResult<Self> {
        let http = Client::builder()
            .timeout(Duration::from_secs(config.backend_timeout_secs))
            .build()?;
        Ok(Self {
            http,
            base_url: config.supabase_url.clone(),
            anon_key: config.supabase_anon_key.clone(),
        })
    }

    fn rest_url(&self, table: &str) -> String {
        format!("{}/rest/v1/{table}", self.base_url)
    }

    fn authorized(&self, request: RequestBuilder, auth: Option<&str>) -> RequestBuilder {
        request
            .header("apikey", &self.anon_key)
            .bearer_auth(auth.unwrap_or(self.anon_key.as_str()))
    }

    fn with_query(request: RequestBuilder, query: &Query) -> RequestBuilder {
        request.query(&[("select", "*")]).query(&query.to_params())
    }
}

async fn error_for(response: Response) -> BackendError {
    let status = response.status().as_u16();
    let body = response.text().await.unwrap_or_default();
    let message = serde_json::from_str::<Value>(&body)
        .ok()
        .and_then(|v| {
            ["message", "msg", "error_description", "error"]
                .iter()
                .find_map(|k| v.get(*k).and_then(Value::as_str).map(str::to_string))
        })
        .unwrap_or(body);
    BackendError::Status { status, message }
}

async fn read_json<T: DeserializeOwned>(response: Response) -> BackendResult<T> {
    if !response.status().is_success() {
        return Err(error_for(response).await);
    }
    Ok(response.json::<T>().await?)
}

fn first_row(rows: Vec<Value>) -> BackendResult<Value> {
    rows.into_iter().next().ok_or(BackendError::NotFound)
}

/// Total from a `Content-Range: 0-9/42` (or `*/42`) header.
fn parse_content_range_total(header: &str) -> Option<i64> {
    header.rsplit_once('/')?.1.trim().parse().ok()
}

#[async_trait]
impl HostedBackend for SupabaseClient {
    async fn select(
        &self,
        table: &str,
        query: &Query,
        auth: Option<&str>,
    ) -> BackendResult<Vec<Value>> {
        tracing::debug!(table, params = ?query.to_params(), "select");
        let request = Self::with_query(self.http.get(self.rest_url(table)), query);
        let response = self.authorized(request, auth).send().await?;
        read_json(response).await
    }

    async fn count(&self, table: &str, query: &Query, auth: Option<&str>) -> BackendResult<i64> {
        let request = Self::with_query(self.http.head(self.rest_url(table)), &query.unpaged())
            .header("Prefer", "count=exact");
        let response = self.authorized(request, auth).send().await?;
        if !response.status().is_success() {
            return Err(error_for(response).await);
        }
        response
            .headers()
            .get("content-range")
            .and_then(|v| v.to_str().ok())
            .and_then(parse_content_range_total)
            .ok_or_else(|| BackendError::Status {
                status: response.status().as_u16(),
                message: "missing Content-Range total".to_string(),
            })
    }

    async fn insert(&self, table: &str, row: Value, auth: Option<&str>) -> BackendResult<Value> {
        tracing::debug!(table, "insert");
        let request = self
            .http
            .post(self.rest_url(table))
            .header("Prefer", "return=representation")
            .json(&row);
        let response = self.authorized(request, auth).send().await?;
        first_row(read_json(response).await?)
    }

    async fn update(
        &self,
        table: &str,
        query: &Query,
        changes: Value,
        auth: Option<&str>,
    ) -> BackendResult<Vec<Value>> {
        tracing::debug!(table, params = ?query.to_params(), "update");
        let request = self
            .http
            .patch(self.rest_url(table))
            .query(&query.to_params())
            .header("Prefer", "return=representation")
            .json(&changes);
        let response = self.authorized(request, auth).send().await?;
        read_json(response).await
    }

    async fn upsert(&self, table: &str, row: Value, auth: Option<&str>) -> BackendResult<Value> {
        tracing::debug!(table, "upsert");
        let request = self
            .http
            .post(self.rest_url(table))
            .header("Prefer", "resolution=merge-duplicates,return=representation")
            .json(&row);
        let response = self.authorized(request, auth).send().await?;
        first_row(read_json(response).await?)
    }

    async fn upload(
        &self,
        bucket: &str,
        path: &str,
        object: StorageObject,
        upsert: bool,
        auth: Option<&str>,
    ) -> BackendResult<String> {
        let url = format!("{}/storage/v1/object/{bucket}/{path}", self.base_url);
        let size = object.bytes.len();
        let request = self
            .http
            .post(url)
            .header(CONTENT_TYPE, object.content_type)
            .header("cache-control", "max-age=3600")
            .header("x-upsert", if upsert { "true" } else { "false" })
            .body(object.bytes);
        let response = self.authorized(request, auth).send().await?;

        if !response.status().is_success() {
            return Err(match error_for(response).await {
                BackendError::Status { status: 409, .. } => BackendError::Duplicate(path.to_string()),
                BackendError::Status { message, .. } if message.contains("Duplicate") => {
                    BackendError::Duplicate(path.to_string())
                }
                other => other,
            });
        }

        tracing::debug!(bucket, path, size, "object stored");
        Ok(path.to_string())
    }

    fn public_url(&self, bucket: &str, path: &str) -> String {
        public_object_url(&self.base_url, bucket, path)
    }

    fn authorize_url(&self, provider: &str, redirect_to: &str) -> BackendResult<String> {
        oauth_authorize_url(&self.base_url, provider, redirect_to)
    }

    async fn get_user(&self, access_token: &str) -> BackendResult<HostedUser> {
        let request = self.http.get(format!("{}/auth/v1/user", self.base_url));
        let response = self.authorized(request, Some(access_token)).send().await?;
        if response.status() == reqwest::StatusCode::UNAUTHORIZED {
            return Err(BackendError::Unauthorized);
        }
        read_json(response).await
    }

    async fn sign_out(&self, access_token: &str) -> BackendResult<()> {
        let request = self.http.post(format!("{}/auth/v1/logout", self.base_url));
        let response = self.authorized(request, Some(access_token)).send().await?;
        if !response.status().is_success() {
            return Err(error_for(response).await);
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn content_range_total_is_parsed() {
        assert_eq!(parse_content_range_total("0-9/42"), Some(42));
        assert_eq!(parse_content_range_total("*/0"), Some(0));
        assert_eq!(parse_content_range_total("0-9/*"), None);
    }

    #[test]
    fn public_urls_point_at_public_bucket_path() {
        let client = SupabaseClient::new(&AppConfig::local("secret")).unwrap();
        assert_eq!(
            client.public_url("dresses", "dress-images/1-abc.jpg"),
            "http://localhost:54321/storage/v1/object/public/dresses/dress-images/1-abc.jpg"
        );
    }
}
