//! Data access: thin wrappers over the hosted backend's table API. Each
//! function is one round trip and returns backend errors unchanged.

use serde::{Serialize, de::DeserializeOwned};
use serde_json::Value;

use crate::backend::BackendResult;

pub mod availability;
pub mod dresses;
pub mod profiles;

pub const DRESSES: &str = "dresses";
pub const AVAILABILITY: &str = "dress_availability";
pub const PROFILES: &str = "profiles";

pub(crate) fn decode<T: DeserializeOwned>(row: Value) -> BackendResult<T> {
    Ok(serde_json::from_value(row)?)
}

pub(crate) fn decode_rows<T: DeserializeOwned>(rows: Vec<Value>) -> BackendResult<Vec<T>> {
    rows.into_iter().map(decode).collect()
}

pub(crate) fn encode<T: Serialize>(value: &T) -> BackendResult<Value> {
    Ok(serde_json::to_value(value)?)
}
