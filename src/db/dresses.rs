use uuid::Uuid;

use super::{DRESSES, decode, decode_rows, encode};
use crate::{
    backend::{BackendError, BackendResult, HostedBackend, Query},
    models::{Dress, DressChanges, NewDress},
};

/// Browse filters. Empty lists and `None` bounds do not filter.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DressFilters {
    pub types: Vec<String>,
    pub colors: Vec<String>,
    pub sizes: Vec<String>,
    pub min_price: Option<f64>,
    pub max_price: Option<f64>,
    pub search: Option<String>,
    pub owner_id: Option<Uuid>,
}

/// Active listings narrowed by `filters`. Types and colors must all be
/// present on a listing; size must be one of `sizes`.
pub fn filter_query(filters: &DressFilters) -> Query {
    let mut query = Query::new().eq("is_active", true);

    if !filters.types.is_empty() {
        query = query.contains("types", &filters.types);
    }
    if !filters.colors.is_empty() {
        query = query.contains("colors", &filters.colors);
    }
    if !filters.sizes.is_empty() {
        query = query.is_in("size", filters.sizes.iter().map(String::as_str));
    }
    if let Some(min_price) = filters.min_price {
        query = query.gte("price", min_price);
    }
    if let Some(max_price) = filters.max_price {
        query = query.lte("price", max_price);
    }
    if let Some(search) = filters.search.as_deref().map(str::trim).filter(|s| !s.is_empty()) {
        query = query.ilike("title", search);
    }
    if let Some(owner_id) = filters.owner_id {
        query = query.eq("owner_id", owner_id.to_string());
    }

    query
}

pub async fn create(
    backend: &dyn HostedBackend,
    dress: &NewDress,
    auth: Option<&str>,
) -> BackendResult<Dress> {
    let row = backend.insert(DRESSES, encode(dress)?, auth).await?;
    decode(row)
}

pub async fn get(
    backend: &dyn HostedBackend,
    id: Uuid,
    auth: Option<&str>,
) -> BackendResult<Option<Dress>> {
    let rows = backend
        .select(DRESSES, &Query::new().eq("id", id.to_string()), auth)
        .await?;
    rows.into_iter().next().map(decode).transpose()
}

pub async fn list(
    backend: &dyn HostedBackend,
    query: &Query,
    auth: Option<&str>,
) -> BackendResult<Vec<Dress>> {
    decode_rows(backend.select(DRESSES, query, auth).await?)
}

pub async fn count(
    backend: &dyn HostedBackend,
    query: &Query,
    auth: Option<&str>,
) -> BackendResult<i64> {
    backend.count(DRESSES, query, auth).await
}

pub async fn list_by_owner(
    backend: &dyn HostedBackend,
    owner_id: Uuid,
    auth: Option<&str>,
) -> BackendResult<Vec<Dress>> {
    let query = filter_query(&DressFilters {
        owner_id: Some(owner_id),
        ..Default::default()
    })
    .order_by("created_at", false);
    list(backend, &query, auth).await
}

pub async fn update(
    backend: &dyn HostedBackend,
    id: Uuid,
    changes: &DressChanges,
    auth: Option<&str>,
) -> BackendResult<Dress> {
    let rows = backend
        .update(DRESSES, &Query::new().eq("id", id.to_string()), encode(changes)?, auth)
        .await?;
    rows.into_iter()
        .next()
        .map(decode)
        .unwrap_or(Err(BackendError::NotFound))
}

/// Clears the active flag; the row stays in the table.
pub async fn soft_delete(
    backend: &dyn HostedBackend,
    id: Uuid,
    auth: Option<&str>,
) -> BackendResult<()> {
    let rows = backend
        .update(
            DRESSES,
            &Query::new().eq("id", id.to_string()),
            serde_json::json!({ "is_active": false }),
            auth,
        )
        .await?;
    if rows.is_empty() {
        return Err(BackendError::NotFound);
    }
    Ok(())
}
