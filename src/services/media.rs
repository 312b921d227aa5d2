use std::{
    collections::HashMap,
    path::{Path, PathBuf},
    sync::Arc,
};

use anyhow::Result;
use async_trait::async_trait;
use base64::{Engine as _, engine::general_purpose::STANDARD};
use chrono::Utc;
use tokio::sync::RwLock;
use uuid::Uuid;

use crate::config::Config;
use crate::database::models::{MediaKind, MediaObject, MediaUpload};
use crate::error::AppError;

/// Blob storage addressed by slash-separated relative paths.
#[async_trait]
pub trait MediaStorage: Send + Sync {
    async fn put(&self, path: &str, content_type: &str, bytes: Vec<u8>) -> Result<()>;
    /// Content type and bytes, or `None` when nothing is stored at `path`.
    async fn get(&self, path: &str) -> Result<Option<(String, Vec<u8>)>>;
}

/// Files under a root directory. Content types live in a parallel `.meta`
/// tree, which `validate_path` keeps out of reach of callers.
pub struct LocalMediaStorage {
    root: PathBuf,
}

impl LocalMediaStorage {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    fn meta_path(&self, path: &str) -> PathBuf {
        self.root.join(".meta").join(path)
    }
}

async fn write_file(target: &Path, bytes: &[u8]) -> Result<()> {
    if let Some(parent) = target.parent() {
        tokio::fs::create_dir_all(parent).await?;
    }
    tokio::fs::write(target, bytes).await?;
    Ok(())
}

#[async_trait]
impl MediaStorage for LocalMediaStorage {
    async fn put(&self, path: &str, content_type: &str, bytes: Vec<u8>) -> Result<()> {
        write_file(&self.root.join(path), &bytes).await?;
        write_file(&self.meta_path(path), content_type.as_bytes()).await?;
        Ok(())
    }

    async fn get(&self, path: &str) -> Result<Option<(String, Vec<u8>)>> {
        let bytes = match tokio::fs::read(self.root.join(path)).await {
            Ok(bytes) => bytes,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(e.into()),
        };
        let content_type = tokio::fs::read_to_string(self.meta_path(path))
            .await
            .unwrap_or_else(|_| "application/octet-stream".to_string());

        Ok(Some((content_type, bytes)))
    }
}

#[derive(Default)]
pub struct MemoryMediaStorage {
    objects: RwLock<HashMap<String, (String, Vec<u8>)>>,
}

#[async_trait]
impl MediaStorage for MemoryMediaStorage {
    async fn put(&self, path: &str, content_type: &str, bytes: Vec<u8>) -> Result<()> {
        self.objects
            .write()
            .await
            .insert(path.to_string(), (content_type.to_string(), bytes));
        Ok(())
    }

    async fn get(&self, path: &str) -> Result<Option<(String, Vec<u8>)>> {
        Ok(self.objects.read().await.get(path).cloned())
    }
}

/// Rejects empty, absolute and hidden or parent segments.
pub fn validate_path(path: &str) -> Result<(), AppError> {
    let invalid = path.is_empty()
        || path.starts_with('/')
        || path
            .split('/')
            .any(|segment| segment.is_empty() || segment.starts_with('.') || segment.contains('\\'));

    if invalid {
        return Err(AppError::BadRequest(format!("Invalid media path: {}", path)));
    }
    Ok(())
}

/// Decoding, size limits and naming on top of a `MediaStorage`.
#[derive(Clone)]
pub struct MediaService {
    storage: Arc<dyn MediaStorage>,
    public_base_url: String,
    max_upload_bytes: usize,
}

impl MediaService {
    pub fn new(config: &Config, storage: Arc<dyn MediaStorage>) -> Self {
        Self {
            storage,
            public_base_url: config.public_base_url.trim_end_matches('/').to_string(),
            max_upload_bytes: config.max_upload_bytes,
        }
    }

    /// Accepts plain base64 or a `data:<type>;base64,` URL.
    pub fn decode(&self, data: &str) -> Result<Vec<u8>, AppError> {
        let encoded = match data.split_once(";base64,") {
            Some((prefix, rest)) if prefix.starts_with("data:") => rest,
            _ => data,
        };

        let bytes = STANDARD
            .decode(encoded.trim())
            .map_err(|_| AppError::BadRequest("Media data is not valid base64".into()))?;

        if bytes.is_empty() {
            return Err(AppError::BadRequest("Media data is empty".into()));
        }
        if bytes.len() > self.max_upload_bytes {
            return Err(AppError::BadRequest(format!(
                "Media exceeds the {} byte upload limit",
                self.max_upload_bytes
            )));
        }
        Ok(bytes)
    }

    pub fn url_for(&self, path: &str) -> String {
        format!("{}/api/v1/media/{}", self.public_base_url, path)
    }

    /// Stores at an explicit path, overwriting whatever was there.
    pub async fn store_at(
        &self,
        path: &str,
        kind: MediaKind,
        content_type: &str,
        data: &str,
    ) -> Result<MediaObject, AppError> {
        validate_path(path)?;
        let bytes = self.decode(data)?;
        let size = bytes.len();

        self.storage.put(path, content_type, bytes).await?;
        log::debug!("Stored {} bytes at {}", size, path);

        Ok(MediaObject {
            path: path.to_string(),
            url: self.url_for(path),
            kind,
            content_type: content_type.to_string(),
            size,
        })
    }

    /// Stores under `<kind folder>/<millis>-<owner id>-<nonce>`.
    pub async fn upload(&self, upload: &MediaUpload, owner: Uuid) -> Result<MediaObject, AppError> {
        let path = format!(
            "{}/{}-{}-{}",
            upload.kind.folder(),
            Utc::now().timestamp_millis(),
            owner,
            Uuid::new_v4().simple()
        );
        self.store_at(&path, upload.kind, &upload.content_type, &upload.data)
            .await
    }

    pub async fn upload_avatar(
        &self,
        user_id: Uuid,
        content_type: &str,
        data: &str,
    ) -> Result<MediaObject, AppError> {
        let path = format!("{}/{}", MediaKind::Avatar.folder(), user_id);
        self.store_at(&path, MediaKind::Avatar, content_type, data)
            .await
    }

    pub async fn fetch(&self, path: &str) -> Result<(String, Vec<u8>), AppError> {
        validate_path(path)?;
        self.storage
            .get(path)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("No media at {}", path)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn service() -> MediaService {
        MediaService::new(&Config::test_config(), Arc::new(MemoryMediaStorage::default()))
    }

    #[test]
    fn test_validate_path() {
        assert!(validate_path("images/1-abc").is_ok());
        assert!(validate_path("").is_err());
        assert!(validate_path("/etc/passwd").is_err());
        assert!(validate_path("images/../secret").is_err());
        assert!(validate_path(".meta/images/1").is_err());
        assert!(validate_path("images//1").is_err());
    }

    #[test]
    fn test_decode_accepts_data_urls_and_rejects_garbage() {
        let service = service();
        assert_eq!(service.decode("aGVsbG8=").unwrap(), b"hello");
        assert_eq!(
            service.decode("data:text/plain;base64,aGVsbG8=").unwrap(),
            b"hello"
        );
        assert!(service.decode("not base64!").is_err());
        assert!(service.decode("").is_err());
    }

    #[test]
    fn test_decode_enforces_upload_limit() {
        let service = service();
        let too_big = STANDARD.encode(vec![0u8; Config::test_config().max_upload_bytes + 1]);
        assert!(matches!(
            service.decode(&too_big),
            Err(AppError::BadRequest(_))
        ));
    }

    #[tokio::test]
    async fn test_upload_names_blob_by_kind_and_owner() {
        let service = service();
        let owner = Uuid::new_v4();
        let object = service
            .upload(
                &MediaUpload {
                    kind: MediaKind::Video,
                    content_type: "video/mp4".to_string(),
                    data: STANDARD.encode(b"frames"),
                    file_name: None,
                },
                owner,
            )
            .await
            .unwrap();

        assert!(object.path.starts_with("videos/"));
        assert!(object.path.contains(&format!("-{}-", owner)));
        assert_eq!(object.size, 6);
        assert_eq!(object.url, format!("http://localhost:8080/api/v1/media/{}", object.path));

        let (content_type, bytes) = service.fetch(&object.path).await.unwrap();
        assert_eq!(content_type, "video/mp4");
        assert_eq!(bytes, b"frames");
    }

    #[tokio::test]
    async fn test_back_to_back_uploads_keep_their_own_bytes() {
        let service = service();
        let owner = Uuid::new_v4();
        let upload = |body: &[u8]| MediaUpload {
            kind: MediaKind::Document,
            content_type: "text/plain".to_string(),
            data: STANDARD.encode(body),
            file_name: None,
        };

        for _ in 0..20 {
            let first = service.upload(&upload(b"first"), owner).await.unwrap();
            let second = service.upload(&upload(b"second"), owner).await.unwrap();
            assert_ne!(first.path, second.path);

            let (_, bytes) = service.fetch(&first.path).await.unwrap();
            assert_eq!(bytes, b"first");
            let (_, bytes) = service.fetch(&second.path).await.unwrap();
            assert_eq!(bytes, b"second");
        }
    }

    #[tokio::test]
    async fn test_local_storage_round_trips_through_disk() {
        let dir = tempfile::tempdir().unwrap();
        let storage = LocalMediaStorage::new(dir.path());

        storage
            .put("documents/1-x", "application/pdf", b"%PDF".to_vec())
            .await
            .unwrap();

        let (content_type, bytes) = storage.get("documents/1-x").await.unwrap().unwrap();
        assert_eq!(content_type, "application/pdf");
        assert_eq!(bytes, b"%PDF");
        assert!(storage.get("documents/missing").await.unwrap().is_none());
    }
}
