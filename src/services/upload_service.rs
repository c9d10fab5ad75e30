use axum::body::Bytes;
use chrono::Utc;
use std::collections::HashMap;
use std::ffi::OsStr;
use std::future::Future;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};
use uuid::Uuid;

use crate::config::UploadConfig;

const IMAGE_EXTENSIONS: &[&str] = &["jpeg", "jpg", "png", "gif", "webp"];
const IMAGE_TYPES: &[&str] = &["image/jpeg", "image/jpg", "image/png", "image/gif", "image/webp"];
const RECEIPT_EXTENSIONS: &[&str] = &["jpeg", "jpg", "png", "gif", "webp", "pdf"];
const RECEIPT_TYPES: &[&str] = &[
    "image/jpeg",
    "image/jpg",
    "image/png",
    "image/gif",
    "image/webp",
    "application/pdf",
];
const MEDIA_EXTENSIONS: &[&str] = &["jpeg", "jpg", "png", "gif", "webp", "mp4", "mov", "avi"];

#[derive(Debug, thiserror::Error)]
pub enum UploadError {
    #[error("Unexpected file field '{0}'")]
    UnexpectedField(String),
    #[error("Only one file may be sent for '{0}'")]
    DuplicateField(String),
    #[error("Unsupported file type for '{field}'; allowed: {allowed}")]
    UnsupportedType { field: String, allowed: String },
    #[error("File for '{field}' exceeds the {max_bytes} byte limit")]
    TooLarge { field: String, max_bytes: usize },
    #[error(transparent)]
    Io(#[from] std::io::Error),
}

/// Which attachment an endpoint accepts
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UploadKind {
    CoverImage,
    SpotImage,
    Receipt,
    Media,
}

impl UploadKind {
    /// Multipart field the file arrives in
    pub fn field(&self) -> &'static str {
        match self {
            UploadKind::CoverImage => "cover_image",
            UploadKind::SpotImage => "image",
            UploadKind::Receipt => "receipt",
            UploadKind::Media => "media",
        }
    }

    /// Key the stored URL is echoed under in create responses
    pub fn response_key(&self) -> &'static str {
        match self {
            UploadKind::CoverImage => "coverImage",
            UploadKind::SpotImage => "imageUrl",
            UploadKind::Receipt => "receiptImage",
            UploadKind::Media => "mediaUrl",
        }
    }

    fn prefix(&self) -> &'static str {
        match self {
            UploadKind::CoverImage => "trip",
            UploadKind::SpotImage => "spot",
            UploadKind::Receipt => "receipt",
            UploadKind::Media => "memory",
        }
    }

    fn extensions(&self) -> &'static [&'static str] {
        match self {
            UploadKind::CoverImage | UploadKind::SpotImage => IMAGE_EXTENSIONS,
            UploadKind::Receipt => RECEIPT_EXTENSIONS,
            UploadKind::Media => MEDIA_EXTENSIONS,
        }
    }

    fn accepts_content_type(&self, content_type: &str) -> bool {
        match self {
            UploadKind::CoverImage | UploadKind::SpotImage => IMAGE_TYPES.contains(&content_type),
            UploadKind::Receipt => RECEIPT_TYPES.contains(&content_type),
            UploadKind::Media => {
                IMAGE_TYPES.contains(&content_type) || content_type.starts_with("video/")
            }
        }
    }
}

/// File part as received, before any checks
#[derive(Debug, Clone)]
pub struct UploadedFile {
    pub file_name: String,
    pub content_type: String,
    pub bytes: Bytes,
}

/// Validated file with its generated name, not yet on disk
#[derive(Debug)]
pub struct PendingUpload {
    file_name: String,
    bytes: Bytes,
}

impl PendingUpload {
    pub fn file_name(&self) -> &str {
        &self.file_name
    }
}

#[derive(Debug, Clone)]
pub struct UploadService {
    directory: PathBuf,
    mount_path: String,
    image_max_bytes: usize,
    media_max_bytes: usize,
}

fn extension_of(file_name: &str) -> Option<String> {
    Path::new(file_name)
        .extension()
        .and_then(|ext| ext.to_str())
        .map(|ext| ext.to_ascii_lowercase())
}

impl UploadService {
    pub fn new(config: &UploadConfig) -> Self {
        Self {
            directory: config.directory.clone(),
            mount_path: config.mount_path.trim_end_matches('/').to_string(),
            image_max_bytes: config.image_max_bytes,
            media_max_bytes: config.media_max_bytes,
        }
    }

    pub fn directory(&self) -> &Path {
        &self.directory
    }

    pub fn max_bytes(&self, kind: UploadKind) -> usize {
        match kind {
            UploadKind::Media => self.media_max_bytes,
            _ => self.image_max_bytes,
        }
    }

    /// Check the files sent with a request. Only the field belonging to
    /// `kind` may carry a file.
    pub fn accept(
        &self,
        files: HashMap<String, UploadedFile>,
        kind: UploadKind,
    ) -> Result<Option<PendingUpload>, UploadError> {
        let mut pending = None;
        for (field, file) in files {
            if field != kind.field() {
                return Err(UploadError::UnexpectedField(field));
            }
            pending = Some(self.validate(kind, file)?);
        }
        Ok(pending)
    }

    /// Both the extension and the declared content type must be allowed.
    pub fn validate(&self, kind: UploadKind, file: UploadedFile) -> Result<PendingUpload, UploadError> {
        let unsupported = || UploadError::UnsupportedType {
            field: kind.field().to_string(),
            allowed: kind.extensions().join(", "),
        };

        let extension = extension_of(&file.file_name).ok_or_else(unsupported)?;
        if !kind.extensions().contains(&extension.as_str()) {
            return Err(unsupported());
        }
        if !kind.accepts_content_type(&file.content_type.to_ascii_lowercase()) {
            return Err(unsupported());
        }

        let max_bytes = self.max_bytes(kind);
        if file.bytes.len() > max_bytes {
            return Err(UploadError::TooLarge {
                field: kind.field().to_string(),
                max_bytes,
            });
        }

        let suffix = Uuid::new_v4().as_u128() % 1_000_000_000;
        let file_name = format!(
            "{}-{}-{}.{}",
            kind.prefix(),
            Utc::now().timestamp_millis(),
            suffix,
            extension
        );
        Ok(PendingUpload {
            file_name,
            bytes: file.bytes,
        })
    }

    pub fn url_for(&self, file_name: &str) -> String {
        format!("{}/{}", self.mount_path, file_name)
    }

    async fn store(&self, pending: &PendingUpload) -> Result<PathBuf, UploadError> {
        tokio::fs::create_dir_all(&self.directory).await?;
        let path = self.directory.join(&pending.file_name);
        tokio::fs::write(&path, &pending.bytes).await?;
        debug!("Stored upload {} ({} bytes)", path.display(), pending.bytes.len());
        Ok(path)
    }

    /// Write the file (if any), then run the record write with its URL.
    /// A failed record write removes the file again.
    pub async fn attach<T, E, F, Fut>(&self, pending: Option<PendingUpload>, write: F) -> Result<T, E>
    where
        F: FnOnce(Option<String>) -> Fut,
        Fut: Future<Output = Result<T, E>>,
        E: From<UploadError>,
    {
        let Some(pending) = pending else {
            return write(None).await;
        };

        let path = self.store(&pending).await?;
        let result = write(Some(self.url_for(&pending.file_name))).await;
        if result.is_err() {
            if let Err(e) = tokio::fs::remove_file(&path).await {
                warn!("Failed to remove orphaned upload {}: {}", path.display(), e);
            }
        }
        result
    }

    /// Remove a stored file by the URL it was served under. Only names
    /// directly inside the upload directory are touched.
    pub async fn discard(&self, url: Option<String>) {
        let Some(url) = url else { return };
        let Some(file_name) = url
            .strip_prefix(self.mount_path.as_str())
            .map(|rest| rest.trim_start_matches('/'))
            .filter(|name| !name.is_empty() && Path::new(name).file_name() == Some(OsStr::new(name)))
        else {
            warn!("Not removing {}: outside {}", url, self.mount_path);
            return;
        };

        let path = self.directory.join(file_name);
        match tokio::fs::remove_file(&path).await {
            Ok(()) => debug!("Removed replaced upload {}", path.display()),
            Err(e) => warn!("Failed to remove replaced upload {}: {}", path.display(), e),
        }
    }
}
