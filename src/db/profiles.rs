use uuid::Uuid;

use super::{PROFILES, decode, encode};
use crate::{
    backend::{BackendResult, HostedBackend, Query},
    models::Profile,
};

pub async fn get(
    backend: &dyn HostedBackend,
    id: Uuid,
    auth: Option<&str>,
) -> BackendResult<Option<Profile>> {
    let rows = backend
        .select(PROFILES, &Query::new().eq("id", id.to_string()), auth)
        .await?;
    rows.into_iter().next().map(decode).transpose()
}

pub async fn upsert(
    backend: &dyn HostedBackend,
    profile: &Profile,
    auth: Option<&str>,
) -> BackendResult<Profile> {
    let row = backend.upsert(PROFILES, encode(profile)?, auth).await?;
    decode(row)
}
