use std::collections::HashMap;

use async_trait::async_trait;
use chrono::Utc;
use serde_json::{Map, Value};
use tokio::sync::RwLock;
use uuid::Uuid;

use super::{
    BackendError, BackendResult, HostedBackend, HostedUser, Query, StorageObject,
    oauth_authorize_url, public_object_url,
};

/// In-process stand-in for the hosted backend. Rows are JSON objects keyed by
/// table name; row-level security is not modelled.
pub struct MemoryBackend {
    base_url: String,
    tables: RwLock<HashMap<String, Vec<Value>>>,
    objects: RwLock<HashMap<(String, String), StorageObject>>,
    sessions: RwLock<HashMap<String, HostedUser>>,
    /// Remaining uploads before storage starts failing; `None` is unlimited.
    upload_budget: RwLock<Option<usize>>,
}

impl Default for MemoryBackend {
    fn default() -> Self {
        Self::new("http://localhost:54321")
    }
}

impl MemoryBackend {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            tables: RwLock::default(),
            objects: RwLock::default(),
            sessions: RwLock::default(),
            upload_budget: RwLock::new(None),
        }
    }

    /// Makes `access_token` resolve to `user` in [`HostedBackend::get_user`].
    pub async fn register_session(&self, access_token: &str, user: HostedUser) {
        self.sessions
            .write()
            .await
            .insert(access_token.to_string(), user);
    }

    pub async fn object(&self, bucket: &str, path: &str) -> Option<StorageObject> {
        self.objects
            .read()
            .await
            .get(&(bucket.to_string(), path.to_string()))
            .cloned()
    }

    pub async fn object_count(&self) -> usize {
        self.objects.read().await.len()
    }

    /// Lets `remaining` more uploads succeed, then fails every later one.
    pub async fn fail_uploads_after(&self, remaining: usize) {
        *self.upload_budget.write().await = Some(remaining);
    }

    pub async fn rows(&self, table: &str) -> Vec<Value> {
        self.tables
            .read()
            .await
            .get(table)
            .cloned()
            .unwrap_or_default()
    }
}

fn as_object(row: Value) -> BackendResult<Map<String, Value>> {
    match row {
        Value::Object(map) => Ok(map),
        other => Err(BackendError::Status {
            status: 400,
            message: format!("expected a JSON object row, got {other}"),
        }),
    }
}

fn with_defaults(mut row: Map<String, Value>) -> Map<String, Value> {
    row.entry("id")
        .or_insert_with(|| Value::String(Uuid::new_v4().to_string()));
    row.entry("created_at")
        .or_insert_with(|| Value::String(Utc::now().to_rfc3339()));
    row
}

fn merge(target: &mut Value, changes: &Map<String, Value>) {
    if let Value::Object(existing) = target {
        for (k, v) in changes {
            existing.insert(k.clone(), v.clone());
        }
    }
}

#[async_trait]
impl HostedBackend for MemoryBackend {
    async fn select(
        &self,
        table: &str,
        query: &Query,
        _auth: Option<&str>,
    ) -> BackendResult<Vec<Value>> {
        let tables = self.tables.read().await;
        Ok(tables
            .get(table)
            .map(|rows| query.apply(rows))
            .unwrap_or_default())
    }

    async fn count(&self, table: &str, query: &Query, _auth: Option<&str>) -> BackendResult<i64> {
        let tables = self.tables.read().await;
        let total = tables
            .get(table)
            .map(|rows| rows.iter().filter(|r| query.matches(r)).count())
            .unwrap_or(0);
        Ok(total as i64)
    }

    async fn insert(&self, table: &str, row: Value, _auth: Option<&str>) -> BackendResult<Value> {
        let row = with_defaults(as_object(row)?);
        let mut tables = self.tables.write().await;
        let rows = tables.entry(table.to_string()).or_default();
        if rows.iter().any(|r| r.get("id") == row.get("id")) {
            return Err(BackendError::Status {
                status: 409,
                message: "duplicate key value violates unique constraint".to_string(),
            });
        }
        let row = Value::Object(row);
        rows.push(row.clone());
        Ok(row)
    }

    async fn update(
        &self,
        table: &str,
        query: &Query,
        changes: Value,
        _auth: Option<&str>,
    ) -> BackendResult<Vec<Value>> {
        let changes = as_object(changes)?;
        let mut tables = self.tables.write().await;
        let Some(rows) = tables.get_mut(table) else {
            return Ok(Vec::new());
        };
        let mut updated = Vec::new();
        for row in rows.iter_mut().filter(|r| query.matches(r)) {
            merge(row, &changes);
            updated.push(row.clone());
        }
        Ok(updated)
    }

    async fn upsert(&self, table: &str, row: Value, _auth: Option<&str>) -> BackendResult<Value> {
        let row = with_defaults(as_object(row)?);
        let mut tables = self.tables.write().await;
        let rows = tables.entry(table.to_string()).or_default();
        if let Some(existing) = rows.iter_mut().find(|r| r.get("id") == row.get("id")) {
            let created_at = existing.get("created_at").cloned();
            merge(existing, &row);
            if let (Some(created_at), Value::Object(map)) = (created_at, &mut *existing) {
                map.insert("created_at".to_string(), created_at);
            }
            return Ok(existing.clone());
        }
        let row = Value::Object(row);
        rows.push(row.clone());
        Ok(row)
    }

    async fn upload(
        &self,
        bucket: &str,
        path: &str,
        object: StorageObject,
        upsert: bool,
        _auth: Option<&str>,
    ) -> BackendResult<String> {
        {
            let mut budget = self.upload_budget.write().await;
            match budget.as_mut() {
                Some(0) => {
                    return Err(BackendError::Status {
                        status: 503,
                        message: "storage unavailable".to_string(),
                    });
                }
                Some(remaining) => *remaining -= 1,
                None => {}
            }
        }

        let key = (bucket.to_string(), path.to_string());
        let mut objects = self.objects.write().await;
        if !upsert && objects.contains_key(&key) {
            return Err(BackendError::Duplicate(path.to_string()));
        }
        objects.insert(key, object);
        Ok(path.to_string())
    }

    fn public_url(&self, bucket: &str, path: &str) -> String {
        public_object_url(&self.base_url, bucket, path)
    }

    fn authorize_url(&self, provider: &str, redirect_to: &str) -> BackendResult<String> {
        oauth_authorize_url(&self.base_url, provider, redirect_to)
    }

    async fn get_user(&self, access_token: &str) -> BackendResult<HostedUser> {
        self.sessions
            .read()
            .await
            .get(access_token)
            .cloned()
            .ok_or(BackendError::Unauthorized)
    }

    async fn sign_out(&self, access_token: &str) -> BackendResult<()> {
        self.sessions.write().await.remove(access_token);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[tokio::test]
    async fn insert_fills_id_and_timestamp() {
        let backend = MemoryBackend::default();
        let row = backend
            .insert("dresses", json!({"title": "Gown"}), None)
            .await
            .unwrap();
        assert!(row["id"].as_str().is_some());
        assert!(row["created_at"].as_str().is_some());
        assert_eq!(backend.rows("dresses").await.len(), 1);
    }

    #[tokio::test]
    async fn update_patches_matching_rows_only() {
        let backend = MemoryBackend::default();
        backend
            .insert("dresses", json!({"id": "a", "is_active": true}), None)
            .await
            .unwrap();
        backend
            .insert("dresses", json!({"id": "b", "is_active": true}), None)
            .await
            .unwrap();

        let updated = backend
            .update("dresses", &Query::new().eq("id", "a"), json!({"is_active": false}), None)
            .await
            .unwrap();
        assert_eq!(updated.len(), 1);

        let active = backend
            .count("dresses", &Query::new().eq("is_active", true), None)
            .await
            .unwrap();
        assert_eq!(active, 1);
    }

    #[tokio::test]
    async fn upsert_merges_and_keeps_creation_time() {
        let backend = MemoryBackend::default();
        let first = backend
            .upsert("profiles", json!({"id": "u1", "full_name": "A"}), None)
            .await
            .unwrap();
        let second = backend
            .upsert("profiles", json!({"id": "u1", "full_name": "B"}), None)
            .await
            .unwrap();
        assert_eq!(second["full_name"], "B");
        assert_eq!(second["created_at"], first["created_at"]);
        assert_eq!(backend.rows("profiles").await.len(), 1);
    }

    #[tokio::test]
    async fn upload_refuses_overwrite_without_upsert() {
        let backend = MemoryBackend::default();
        let object = StorageObject {
            bytes: vec![1, 2, 3],
            content_type: "image/png".into(),
        };
        backend
            .upload("dresses", "a.png", object.clone(), false, None)
            .await
            .unwrap();
        let err = backend
            .upload("dresses", "a.png", object.clone(), false, None)
            .await
            .unwrap_err();
        assert!(matches!(err, BackendError::Duplicate(_)));
        backend
            .upload("dresses", "a.png", object, true, None)
            .await
            .unwrap();
    }
}
