//! Image uploads to hosted object storage.

use chrono::Utc;
use rand::Rng;
use uuid::Uuid;

use crate::{
    backend::{HostedBackend, StorageObject},
    error::{AppError, AppResult},
};

pub const DRESS_BUCKET: &str = "dresses";
pub const DRESS_IMAGE_DIR: &str = "dress-images";
pub const AVATAR_BUCKET: &str = "avatars";
pub const AVATAR_DIR: &str = "avatars";

const BASE36: &[u8] = b"0123456789abcdefghijklmnopqrstuvwxyz";

/// A file picked in a form, not yet uploaded.
#[derive(Debug, Clone, PartialEq)]
pub struct ImageUpload {
    pub file_name: String,
    pub content_type: String,
    pub bytes: Vec<u8>,
}

impl ImageUpload {
    /// Lowercased extension of the original file name, `jpg` when absent.
    pub fn extension(&self) -> String {
        self.file_name
            .rsplit_once('.')
            .map(|(_, ext)| ext.trim().to_ascii_lowercase())
            .filter(|ext| !ext.is_empty())
            .unwrap_or_else(|| "jpg".to_string())
    }

    pub fn validate(&self, max_bytes: usize) -> AppResult<()> {
        if self.bytes.len() > max_bytes {
            return Err(AppError::BadRequest(format!(
                "Image size must be less than {}MB",
                max_bytes / (1024 * 1024)
            )));
        }
        if !self.content_type.starts_with("image/") {
            return Err(AppError::BadRequest("File must be an image".into()));
        }
        Ok(())
    }

    fn into_object(self) -> StorageObject {
        StorageObject {
            bytes: self.bytes,
            content_type: self.content_type,
        }
    }
}

/// `{unix_millis}-{13 random base36 chars}.{ext}`
pub fn unique_file_name(extension: &str) -> String {
    let mut rng = rand::rng();
    let suffix: String = (0..13)
        .map(|_| BASE36[rng.random_range(0..BASE36.len())] as char)
        .collect();
    format!("{}-{suffix}.{extension}", Utc::now().timestamp_millis())
}

/// Uploads listing photos one at a time and returns their public URLs in
/// order. Every file is validated before the first upload; the first failed
/// upload aborts the batch (objects already stored stay in place).
pub async fn upload_dress_images(
    backend: &dyn HostedBackend,
    images: Vec<ImageUpload>,
    max_bytes: usize,
    auth: Option<&str>,
) -> AppResult<Vec<String>> {
    for image in &images {
        image.validate(max_bytes)?;
    }

    let mut urls = Vec::with_capacity(images.len());
    for image in images {
        let path = format!("{DRESS_IMAGE_DIR}/{}", unique_file_name(&image.extension()));
        tracing::debug!(
            path = %path,
            content_type = %image.content_type,
            size = image.bytes.len(),
            "uploading listing image"
        );

        let stored = backend
            .upload(DRESS_BUCKET, &path, image.into_object(), false, auth)
            .await
            .map_err(|err| {
                tracing::warn!(path = %path, error = %err, "listing image upload failed");
                AppError::Upload(err.to_string())
            })?;
        urls.push(backend.public_url(DRESS_BUCKET, &stored));
    }

    tracing::info!(count = urls.len(), "listing images uploaded");
    Ok(urls)
}

/// Stores a profile picture at `avatars/{user_id}.{ext}`, replacing any
/// earlier one.
pub async fn upload_avatar(
    backend: &dyn HostedBackend,
    user_id: Uuid,
    image: ImageUpload,
    max_bytes: usize,
    auth: Option<&str>,
) -> AppResult<String> {
    image.validate(max_bytes)?;
    let path = format!("{AVATAR_DIR}/{user_id}.{}", image.extension());
    let stored = backend
        .upload(AVATAR_BUCKET, &path, image.into_object(), true, auth)
        .await
        .map_err(|err| AppError::Upload(err.to_string()))?;
    Ok(backend.public_url(AVATAR_BUCKET, &stored))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn image(name: &str, content_type: &str, size: usize) -> ImageUpload {
        ImageUpload {
            file_name: name.into(),
            content_type: content_type.into(),
            bytes: vec![0; size],
        }
    }

    #[test]
    fn extension_defaults_to_jpg() {
        assert_eq!(image("Gown.PNG", "image/png", 1).extension(), "png");
        assert_eq!(image("photo", "image/jpeg", 1).extension(), "jpg");
        assert_eq!(image("photo.", "image/jpeg", 1).extension(), "jpg");
    }

    #[test]
    fn validation_checks_size_then_mime() {
        let max = 10 * 1024 * 1024;
        assert!(image("a.jpg", "image/jpeg", max).validate(max).is_ok());

        let too_big = image("a.jpg", "image/jpeg", max + 1).validate(max).unwrap_err();
        assert_eq!(too_big.to_string(), "Image size must be less than 10MB");

        let not_image = image("a.pdf", "application/pdf", 10).validate(max).unwrap_err();
        assert_eq!(not_image.to_string(), "File must be an image");
    }

    #[test]
    fn file_names_are_timestamp_and_base36_suffix() {
        let name = unique_file_name("webp");
        let (stamp, rest) = name.split_once('-').unwrap();
        assert!(stamp.parse::<i64>().is_ok());
        let (suffix, ext) = rest.split_once('.').unwrap();
        assert_eq!(suffix.len(), 13);
        assert!(suffix.bytes().all(|b| BASE36.contains(&b)));
        assert_eq!(ext, "webp");
        assert_ne!(unique_file_name("webp"), name);
    }
}
