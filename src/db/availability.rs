use chrono::NaiveDate;
use serde_json::Value;
use uuid::Uuid;

use super::{AVAILABILITY, decode, decode_rows, encode};
use crate::{
    backend::{BackendError, BackendResult, Filter, HostedBackend, Query},
    models::{Availability, AvailabilityStatus, NewAvailability},
};

/// Records that take dates off the calendar: flagged unavailable, or in a
/// non-available status.
pub fn blocking_filter() -> Filter {
    Filter::Or(vec![
        Filter::Eq("is_available".into(), Value::Bool(false)),
        Filter::In(
            "status".into(),
            AvailabilityStatus::BLOCKING
                .iter()
                .map(|s| Value::from(s.as_str()))
                .collect(),
        ),
    ])
}

/// Blocking records whose inclusive range overlaps `[from, to]`.
fn overlap_query(from: NaiveDate, to: NaiveDate) -> Query {
    Query::new()
        .lte("start_date", to.to_string())
        .gte("end_date", from.to_string())
        .filter(blocking_filter())
}

pub async fn create(
    backend: &dyn HostedBackend,
    record: &NewAvailability,
    auth: Option<&str>,
) -> BackendResult<Availability> {
    let row = backend.insert(AVAILABILITY, encode(record)?, auth).await?;
    decode(row)
}

pub async fn get(
    backend: &dyn HostedBackend,
    id: Uuid,
    auth: Option<&str>,
) -> BackendResult<Option<Availability>> {
    let rows = backend
        .select(AVAILABILITY, &Query::new().eq("id", id.to_string()), auth)
        .await?;
    rows.into_iter().next().map(decode).transpose()
}

pub async fn list_for_dress(
    backend: &dyn HostedBackend,
    dress_id: Uuid,
    auth: Option<&str>,
) -> BackendResult<Vec<Availability>> {
    let query = Query::new()
        .eq("dress_id", dress_id.to_string())
        .order_by("start_date", true);
    decode_rows(backend.select(AVAILABILITY, &query, auth).await?)
}

/// Applies a partial update (a JSON object of changed columns).
pub async fn update(
    backend: &dyn HostedBackend,
    id: Uuid,
    changes: Value,
    auth: Option<&str>,
) -> BackendResult<Availability> {
    let rows = backend
        .update(AVAILABILITY, &Query::new().eq("id", id.to_string()), changes, auth)
        .await?;
    rows.into_iter()
        .next()
        .map(decode)
        .unwrap_or(Err(BackendError::NotFound))
}

pub async fn conflicts(
    backend: &dyn HostedBackend,
    dress_id: Uuid,
    from: NaiveDate,
    to: NaiveDate,
    auth: Option<&str>,
) -> BackendResult<Vec<Availability>> {
    let query = overlap_query(from, to).eq("dress_id", dress_id.to_string());
    decode_rows(backend.select(AVAILABILITY, &query, auth).await?)
}

/// Dresses with a blocking record overlapping `[from, to]`.
pub async fn blocked_dress_ids(
    backend: &dyn HostedBackend,
    from: NaiveDate,
    to: NaiveDate,
    auth: Option<&str>,
) -> BackendResult<Vec<Uuid>> {
    let records: Vec<Availability> =
        decode_rows(backend.select(AVAILABILITY, &overlap_query(from, to), auth).await?)?;
    let mut ids: Vec<Uuid> = records.into_iter().map(|r| r.dress_id).collect();
    ids.sort();
    ids.dedup();
    Ok(ids)
}
