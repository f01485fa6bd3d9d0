//! Upload service.
//!
//! Files are stored under `{fileType}_{userId}_{uuid}.{ext}` keys in the
//! configured storage backend.

use std::sync::Arc;

use biznetworq_common::{AppError, AppResult, StorageBackend, generate_storage_key};
use biznetworq_db::entities::user;
use serde::{Deserialize, Serialize};

/// Image formats served back as-is. SVG is excluded since it can carry script.
const RASTER_IMAGE_TYPES: &[&str] = &["image/png", "image/jpeg", "image/gif", "image/webp"];

/// What an uploaded file is for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum UploadKind {
    Image,
    Video,
    Pdf,
    Logo,
    Banner,
    Thumbnail,
    Avatar,
}

impl UploadKind {
    /// Key prefix.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Image => "image",
            Self::Video => "video",
            Self::Pdf => "pdf",
            Self::Logo => "logo",
            Self::Banner => "banner",
            Self::Thumbnail => "thumbnail",
            Self::Avatar => "avatar",
        }
    }

    /// Parse the `fileType` form field.
    pub fn parse(raw: &str) -> AppResult<Self> {
        match raw.trim().to_ascii_lowercase().as_str() {
            "image" => Ok(Self::Image),
            "video" => Ok(Self::Video),
            "pdf" => Ok(Self::Pdf),
            "logo" => Ok(Self::Logo),
            "banner" => Ok(Self::Banner),
            "thumbnail" => Ok(Self::Thumbnail),
            "avatar" => Ok(Self::Avatar),
            other => Err(AppError::BadRequest(format!("Unsupported file type: {other}"))),
        }
    }

    /// Whether `content_type` fits this kind of file.
    fn accepts(self, content_type: &str) -> bool {
        match self {
            Self::Video => content_type.starts_with("video/"),
            Self::Pdf => content_type == "application/pdf",
            Self::Image | Self::Logo | Self::Banner | Self::Thumbnail | Self::Avatar => {
                RASTER_IMAGE_TYPES.contains(&content_type)
            }
        }
    }
}

/// A file to upload.
#[derive(Debug)]
pub struct UploadRequest {
    pub kind: UploadKind,
    pub original_name: String,
    pub content_type: String,
    pub data: Vec<u8>,
}

/// Stored file.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UploadResponse {
    pub key: String,
    pub url: String,
    pub size: u64,
    pub content_type: String,
    pub file_type: UploadKind,
}

/// Service for storing uploaded files.
#[derive(Clone)]
pub struct UploadService {
    storage: Arc<dyn StorageBackend>,
    max_bytes: usize,
}

impl UploadService {
    /// Create a new upload service.
    #[must_use]
    pub fn new(storage: Arc<dyn StorageBackend>, max_bytes: usize) -> Self {
        Self { storage, max_bytes }
    }

    /// Largest accepted file, in bytes.
    #[must_use]
    pub const fn max_bytes(&self) -> usize {
        self.max_bytes
    }

    /// Validate and store a file.
    pub async fn upload(&self, user: &user::Model, request: UploadRequest) -> AppResult<UploadResponse> {
        if request.data.is_empty() {
            return Err(AppError::BadRequest("Uploaded file is empty".to_string()));
        }
        if request.data.len() > self.max_bytes {
            return Err(AppError::PayloadTooLarge(format!(
                "File exceeds {} bytes",
                self.max_bytes
            )));
        }

        let content_type = request
            .content_type
            .split(';')
            .next()
            .unwrap_or_default()
            .trim()
            .to_ascii_lowercase();
        if !request.kind.accepts(&content_type) {
            return Err(AppError::BadRequest(format!(
                "Content type {content_type} is not allowed for {} uploads",
                request.kind.as_str()
            )));
        }

        let key = generate_storage_key(request.kind.as_str(), &user.id, &request.original_name);
        let stored = self.storage.upload(&key, &request.data, &content_type).await?;

        tracing::info!(
            user_id = %user.id,
            key = %stored.key,
            size = stored.size,
            md5 = %stored.md5,
            "File uploaded"
        );

        Ok(UploadResponse {
            key: stored.key,
            url: stored.url,
            size: stored.size,
            content_type: stored.content_type,
            file_type: request.kind,
        })
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::sync::Mutex;

    use super::*;
    use crate::services::test_support;
    use biznetworq_common::UploadedFile;

    /// Keeps uploads in memory.
    #[derive(Default)]
    struct MemoryStorage {
        keys: Mutex<Vec<String>>,
    }

    #[async_trait::async_trait]
    impl StorageBackend for MemoryStorage {
        async fn upload(&self, key: &str, data: &[u8], content_type: &str) -> AppResult<UploadedFile> {
            self.keys.lock().unwrap().push(key.to_string());
            Ok(UploadedFile {
                key: key.to_string(),
                url: self.public_url(key),
                size: data.len() as u64,
                content_type: content_type.to_string(),
                md5: String::new(),
            })
        }

        async fn delete(&self, key: &str) -> AppResult<()> {
            self.keys.lock().unwrap().retain(|k| k != key);
            Ok(())
        }

        fn public_url(&self, key: &str) -> String {
            format!("https://cdn.example.com/{key}")
        }

        async fn exists(&self, key: &str) -> AppResult<bool> {
            Ok(self.keys.lock().unwrap().iter().any(|k| k == key))
        }
    }

    fn request(kind: UploadKind, name: &str, content_type: &str, data: &[u8]) -> UploadRequest {
        UploadRequest {
            kind,
            original_name: name.to_string(),
            content_type: content_type.to_string(),
            data: data.to_vec(),
        }
    }

    #[tokio::test]
    async fn test_upload_stores_under_typed_key() {
        let storage = Arc::new(MemoryStorage::default());
        let service = UploadService::new(storage.clone(), 1024);
        let user = test_support::user("u1", "alice");

        let response = service
            .upload(&user, request(UploadKind::Thumbnail, "cover.PNG", "image/png", b"png"))
            .await
            .unwrap();

        assert!(response.key.starts_with("thumbnail_u1_"));
        assert!(response.key.ends_with(".png"));
        assert_eq!(response.url, format!("https://cdn.example.com/{}", response.key));
        assert_eq!(response.size, 3);
        assert!(storage.exists(&response.key).await.unwrap());
    }

    #[tokio::test]
    async fn test_upload_strips_content_type_parameters() {
        let service = UploadService::new(Arc::new(MemoryStorage::default()), 1024);
        let user = test_support::user("u1", "alice");

        let response = service
            .upload(
                &user,
                request(UploadKind::Pdf, "paper.pdf", "Application/PDF; charset=binary", b"%PDF"),
            )
            .await
            .unwrap();

        assert_eq!(response.content_type, "application/pdf");
    }

    #[tokio::test]
    async fn test_upload_rejects_wrong_family() {
        let service = UploadService::new(Arc::new(MemoryStorage::default()), 1024);
        let user = test_support::user("u1", "alice");

        let result = service
            .upload(&user, request(UploadKind::Avatar, "me.mp4", "video/mp4", b"data"))
            .await;

        assert!(matches!(result, Err(AppError::BadRequest(_))));
    }

    #[tokio::test]
    async fn test_upload_rejects_svg_images() {
        let storage = Arc::new(MemoryStorage::default());
        let service = UploadService::new(storage.clone(), 1024);
        let user = test_support::user("u1", "alice");

        for kind in [UploadKind::Image, UploadKind::Avatar, UploadKind::Logo] {
            let result = service
                .upload(&user, request(kind, "x.svg", "image/svg+xml", b"<svg/>"))
                .await;
            assert!(matches!(result, Err(AppError::BadRequest(_))));
        }
        assert!(storage.keys.lock().unwrap().is_empty());

        let webp = service
            .upload(&user, request(UploadKind::Banner, "b.webp", "image/webp", b"RIFF"))
            .await;
        assert!(webp.is_ok());
    }

    #[tokio::test]
    async fn test_upload_rejects_empty_and_oversized() {
        let service = UploadService::new(Arc::new(MemoryStorage::default()), 4);
        let user = test_support::user("u1", "alice");

        let empty = service
            .upload(&user, request(UploadKind::Image, "a.png", "image/png", b""))
            .await;
        let large = service
            .upload(&user, request(UploadKind::Image, "a.png", "image/png", b"12345"))
            .await;

        assert!(matches!(empty, Err(AppError::BadRequest(_))));
        assert!(matches!(large, Err(AppError::PayloadTooLarge(_))));
    }

    #[test]
    fn test_parse_upload_kind() {
        assert_eq!(UploadKind::parse(" Banner ").unwrap(), UploadKind::Banner);
        assert!(matches!(
            UploadKind::parse("exe"),
            Err(AppError::BadRequest(_))
        ));
    }
}
