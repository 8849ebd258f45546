//! # Photo Uploads
//!
//! Disk-backed storage for user profile photos: image content types
//! only, capped size, timestamped filenames.

pub mod errors;

use std::fs;
use std::path::{Path, PathBuf};

use chrono::Utc;
use uuid::Uuid;

pub use errors::{UploadError, UploadResult};

/// Maximum accepted upload size (5 MiB).
pub const MAX_UPLOAD_BYTES: usize = 5 * 1024 * 1024;

/// Saves uploaded photos under a root directory.
#[derive(Debug, Clone)]
pub struct UploadService {
    root: PathBuf,
}

impl UploadService {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// Store a user photo, returning the generated filename.
    ///
    /// Rejects non-image content types and oversized payloads before
    /// touching the filesystem.
    pub fn save_user_photo(
        &self,
        user_id: Uuid,
        content_type: &str,
        original_name: &str,
        data: &[u8],
    ) -> UploadResult<String> {
        if !content_type.starts_with("image/") {
            return Err(UploadError::NotAnImage);
        }
        if data.len() > MAX_UPLOAD_BYTES {
            return Err(UploadError::TooLarge(data.len()));
        }

        let ext = extension_of(original_name).unwrap_or("jpg");
        let filename = format!("user-{}-{}.{}", user_id, Utc::now().timestamp_millis(), ext);

        let dir = self.root.join("img").join("users");
        fs::create_dir_all(&dir).map_err(|e| UploadError::Io(e.to_string()))?;
        fs::write(dir.join(&filename), data).map_err(|e| UploadError::Io(e.to_string()))?;

        Ok(filename)
    }
}

fn extension_of(name: &str) -> Option<&str> {
    Path::new(name)
        .extension()
        .and_then(|ext| ext.to_str())
        .filter(|ext| !ext.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn saves_an_image_with_generated_name() {
        let temp = TempDir::new().unwrap();
        let service = UploadService::new(temp.path());
        let user_id = Uuid::new_v4();

        let filename = service
            .save_user_photo(user_id, "image/png", "avatar.png", b"png-bytes")
            .unwrap();

        assert!(filename.starts_with(&format!("user-{}-", user_id)));
        assert!(filename.ends_with(".png"));

        let stored = temp.path().join("img").join("users").join(&filename);
        assert_eq!(fs::read(stored).unwrap(), b"png-bytes");
    }

    #[test]
    fn rejects_non_image_content_types() {
        let temp = TempDir::new().unwrap();
        let service = UploadService::new(temp.path());

        let result =
            service.save_user_photo(Uuid::new_v4(), "application/pdf", "cv.pdf", b"%PDF");
        assert!(matches!(result, Err(UploadError::NotAnImage)));
    }

    #[test]
    fn rejects_oversized_payloads() {
        let temp = TempDir::new().unwrap();
        let service = UploadService::new(temp.path());

        let huge = vec![0u8; MAX_UPLOAD_BYTES + 1];
        let result = service.save_user_photo(Uuid::new_v4(), "image/jpeg", "big.jpg", &huge);
        assert!(matches!(result, Err(UploadError::TooLarge(_))));
    }

    #[test]
    fn missing_extension_defaults_to_jpg() {
        let temp = TempDir::new().unwrap();
        let service = UploadService::new(temp.path());

        let filename = service
            .save_user_photo(Uuid::new_v4(), "image/jpeg", "avatar", b"bytes")
            .unwrap();
        assert!(filename.ends_with(".jpg"));
    }
}
