//! artfolio - terminal client for an artist's portfolio
//!
//! Browse the portfolio's categories and works in a keyboard and mouse
//! driven gallery, read the site's text sections in Russian or English, and
//! manage content with an admin session.
//!
//! # Modules
//!
//! - `models` - Categories, media items, sections, upload results
//! - `api` - Backend (tables, storage) and auth clients
//! - `access` - Capability and edit mode
//! - `gallery` - Media store, viewer state machine, swipe detection
//! - `media` - Bulk upload and external players
//! - `ui` - TUI components
//! - `app` - Application state and navigation
//! - `cli` / `commands` - Scriptable command line

pub mod access;
pub mod api;
pub mod app;
pub mod cli;
pub mod commands;
pub mod config;
pub mod gallery;
pub mod media;
pub mod models;
pub mod tasks;
pub mod ui;

// Re-export commonly used types
pub use models::{
    Category, Locale, LocalizedText, MediaItem, MediaKind, NewMediaItem, Section, UploadProgress,
    UploadSummary,
};

pub use access::{Capability, EditMode, ViewMode};
pub use api::{AuthClient, BackendClient, BackendError};
pub use app::{App, AppState};
pub use config::Config;
pub use gallery::{GalleryViewer, MediaStore};
pub use media::BulkUploader;
