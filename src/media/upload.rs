//! Sequential bulk upload
//!
//! Files go up strictly one at a time. For each file: read it, store the
//! blob under a random name that keeps the original extension, resolve the
//! public URL and insert a media row after the existing ones. A failing file
//! is counted and the batch moves on.

use std::path::{Path, PathBuf};
use thiserror::Error;

use crate::api::{BackendClient, BackendError};
use crate::models::{MediaItem, MediaKind, NewMediaItem, UploadProgress, UploadSummary};

/// Errors for a single file of a batch
#[derive(Error, Debug)]
pub enum UploadError {
    #[error("Could not read {path}: {source}")]
    Read {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Storage upload failed: {0}")]
    Storage(#[source] BackendError),

    #[error("Could not create media row: {0}")]
    Insert(#[source] BackendError),

    #[error("No order index left after {0}")]
    OrderExhausted(i32),
}

/// Where uploaded media ends up. Implemented by [`BackendClient`]; tests
/// substitute their own.
#[allow(async_fn_in_trait)]
pub trait MediaSink {
    /// Store a blob and return its public URL
    async fn store_object(
        &self,
        path: &str,
        bytes: Vec<u8>,
        content_type: &str,
    ) -> Result<String, BackendError>;

    /// Insert a media row and return it as stored
    async fn create_media(&self, item: &NewMediaItem) -> Result<MediaItem, BackendError>;
}

impl MediaSink for BackendClient {
    async fn store_object(
        &self,
        path: &str,
        bytes: Vec<u8>,
        content_type: &str,
    ) -> Result<String, BackendError> {
        self.upload_object(path, bytes, content_type).await
    }

    async fn create_media(&self, item: &NewMediaItem) -> Result<MediaItem, BackendError> {
        self.insert_media(item).await
    }
}

/// A file queued for upload
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UploadFile {
    /// Read from disk when its turn comes
    Path(PathBuf),
    /// Already in memory
    Bytes { name: String, bytes: Vec<u8> },
}

impl UploadFile {
    pub fn name(&self) -> String {
        match self {
            UploadFile::Path(p) => p
                .file_name()
                .map(|n| n.to_string_lossy().into_owned())
                .unwrap_or_else(|| p.display().to_string()),
            UploadFile::Bytes { name, .. } => name.clone(),
        }
    }

    async fn read(&self) -> Result<Vec<u8>, UploadError> {
        match self {
            UploadFile::Path(p) => tokio::fs::read(p).await.map_err(|source| UploadError::Read {
                path: p.display().to_string(),
                source,
            }),
            UploadFile::Bytes { bytes, .. } => Ok(bytes.clone()),
        }
    }
}

impl From<PathBuf> for UploadFile {
    fn from(path: PathBuf) -> Self {
        UploadFile::Path(path)
    }
}

/// Lowercased extension of a file name, if any
pub fn extension(name: &str) -> Option<String> {
    Path::new(name)
        .extension()
        .map(|e| e.to_string_lossy().to_ascii_lowercase())
        .filter(|e| !e.is_empty())
}

/// MIME type from a file extension
pub fn mime_for(name: &str) -> &'static str {
    match extension(name).as_deref() {
        Some("jpg") | Some("jpeg") => "image/jpeg",
        Some("png") => "image/png",
        Some("gif") => "image/gif",
        Some("webp") => "image/webp",
        Some("avif") => "image/avif",
        Some("svg") => "image/svg+xml",
        Some("heic") => "image/heic",
        Some("mp4") | Some("m4v") => "video/mp4",
        Some("webm") => "video/webm",
        Some("mov") => "video/quicktime",
        Some("mkv") => "video/x-matroska",
        Some("avi") => "video/x-msvideo",
        _ => "application/octet-stream",
    }
}

/// Random storage name keeping the original extension (`<uuid>.jpg`)
pub fn storage_name(original: &str) -> String {
    let id = uuid::Uuid::new_v4();
    match extension(original) {
        Some(ext) => format!("{}.{}", id, ext),
        None => id.to_string(),
    }
}

/// Sequential uploader for one category
pub struct BulkUploader<'a, S: MediaSink> {
    sink: &'a S,
    category_id: String,
    max_order_index: i32,
}

impl<'a, S: MediaSink> BulkUploader<'a, S> {
    /// `max_order_index` is the highest existing index in the category
    /// (-1 for an empty one); new items are appended after it.
    pub fn new(sink: &'a S, category_id: impl Into<String>, max_order_index: i32) -> Self {
        Self {
            sink,
            category_id: category_id.into(),
            max_order_index,
        }
    }

    /// Upload every file in order, calling `on_progress` before each one
    pub async fn run(
        &self,
        files: Vec<UploadFile>,
        mut on_progress: impl FnMut(UploadProgress),
    ) -> UploadSummary {
        let total = files.len();
        let mut summary = UploadSummary::default();

        for (i, file) in files.iter().enumerate() {
            on_progress(UploadProgress {
                current: i + 1,
                total,
            });

            let result = match self.order_index(i) {
                Some(order_index) => self.upload_one(file, order_index).await,
                None => Err(UploadError::OrderExhausted(self.max_order_index)),
            };
            match result {
                Ok(item) => {
                    summary.success += 1;
                    summary.created.push(item);
                }
                Err(e) => {
                    tracing::warn!(file = %file.name(), error = %e, "upload failed");
                    summary.failed += 1;
                    summary.errors.push(format!("{}: {}", file.name(), e));
                }
            }
        }

        tracing::info!(
            category = %self.category_id,
            success = summary.success,
            failed = summary.failed,
            "bulk upload finished"
        );
        summary
    }

    /// `max + position + 1`, or `None` once past `i32::MAX`
    fn order_index(&self, position: usize) -> Option<i32> {
        i32::try_from(position)
            .ok()
            .and_then(|p| self.max_order_index.checked_add(p))
            .and_then(|n| n.checked_add(1))
    }

    async fn upload_one(&self, file: &UploadFile, order_index: i32) -> Result<MediaItem, UploadError> {
        let name = file.name();
        let bytes = file.read().await?;
        let content_type = mime_for(&name);
        let path = storage_name(&name);

        let url = self
            .sink
            .store_object(&path, bytes, content_type)
            .await
            .map_err(UploadError::Storage)?;

        let row = NewMediaItem::untitled(
            self.category_id.clone(),
            url,
            order_index,
            MediaKind::from_mime(content_type),
        );
        self.sink.create_media(&row).await.map_err(UploadError::Insert)
    }
}
