//! Media handling outside the gallery: bulk upload and external viewers

pub mod player;
pub mod upload;

pub use player::{open_external, ExternalViewer, PlayerError};
pub use upload::{BulkUploader, MediaSink, UploadError, UploadFile};
