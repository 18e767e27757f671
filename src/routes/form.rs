use axum::extract::Multipart;
use serde::de::DeserializeOwned;

use crate::{
    error::{AppError, AppResult},
    storage::ImageUpload,
};

pub const PAYLOAD_FIELD: &str = "payload";

/// Splits a multipart form into its JSON `payload` part and the files sent
/// under `file_field`, in upload order. Other parts are ignored.
pub async fn read_form<T: DeserializeOwned>(
    mut multipart: Multipart,
    file_field: &str,
) -> AppResult<(T, Vec<ImageUpload>)> {
    let mut payload = None;
    let mut files = Vec::new();

    while let Some(field) = multipart.next_field().await? {
        let name = field.name().unwrap_or_default().to_string();
        if name == PAYLOAD_FIELD {
            let text = field.text().await?;
            let parsed = serde_json::from_str(&text)
                .map_err(|err| AppError::BadRequest(format!("Invalid form payload: {err}")))?;
            payload = Some(parsed);
        } else if name == file_field {
            let file_name = field.file_name().unwrap_or("upload").to_string();
            let content_type = field
                .content_type()
                .unwrap_or("application/octet-stream")
                .to_string();
            let bytes = field.bytes().await?.to_vec();
            if bytes.is_empty() {
                continue;
            }
            files.push(ImageUpload {
                file_name,
                content_type,
                bytes,
            });
        } else {
            tracing::debug!(field = %name, "ignoring unexpected form field");
        }
    }

    let payload =
        payload.ok_or_else(|| AppError::BadRequest("Missing form payload".to_string()))?;
    Ok((payload, files))
}
