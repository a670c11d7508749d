//! Configuration management for artfolio
//!
//! Handles config file loading/saving and environment overrides.
//! Config is stored at ~/.config/artfolio/config.toml

use anyhow::Result;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::models::Locale;

/// Storage bucket holding uploaded portfolio media
pub const DEFAULT_BUCKET: &str = "portfolio-images";

/// Net horizontal drag (logical px) that counts as a swipe
pub const DEFAULT_SWIPE_THRESHOLD_PX: f32 = 50.0;

/// Logical pixels per terminal column when mapping mouse drags to swipes
pub const DEFAULT_CELL_WIDTH_PX: f32 = 8.0;

/// External program used for videos
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PlayerPreference {
    #[default]
    Mpv,
    Vlc,
}

/// Application configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Backend base URL (e.g. https://xyz.supabase.co)
    pub backend_url: Option<String>,
    /// Public (anon) API key
    pub anon_key: Option<String>,
    /// Session access token; admin operations need one
    pub access_token: Option<String>,
    /// Display language
    pub locale: Locale,
    /// Video player
    pub player: PlayerPreference,
    /// Logical pixel width of one terminal cell
    pub cell_width_px: f32,
    /// Swipe distance threshold in logical pixels
    pub swipe_threshold_px: f32,
    /// Storage bucket for uploads
    pub storage_bucket: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            backend_url: None,
            anon_key: None,
            access_token: None,
            locale: Locale::default(),
            player: PlayerPreference::default(),
            cell_width_px: DEFAULT_CELL_WIDTH_PX,
            swipe_threshold_px: DEFAULT_SWIPE_THRESHOLD_PX,
            storage_bucket: DEFAULT_BUCKET.to_string(),
        }
    }
}

impl Config {
    /// Get config file path (~/.config/artfolio/config.toml)
    pub fn path() -> Option<PathBuf> {
        dirs::config_dir().map(|p| p.join("artfolio").join("config.toml"))
    }

    /// Load config from the default path, or return defaults if not found.
    /// Environment overrides are applied either way.
    pub fn load() -> Self {
        let config = Self::path()
            .and_then(|p| Self::read_file(&p))
            .unwrap_or_default();
        config.with_env()
    }

    /// Load config from an explicit path (env overrides still apply)
    pub fn load_from(path: &Path) -> Result<Self> {
        let raw = std::fs::read_to_string(path)?;
        let config: Config = toml::from_str(&raw)?;
        Ok(config.with_env())
    }

    fn read_file(path: &Path) -> Option<Self> {
        let raw = std::fs::read_to_string(path).ok()?;
        match toml::from_str(&raw) {
            Ok(config) => Some(config),
            Err(e) => {
                tracing::warn!(path = %path.display(), error = %e, "ignoring unreadable config");
                None
            }
        }
    }

    /// Save config to the default path
    pub fn save(&self) -> Result<PathBuf> {
        let path = Self::path().ok_or_else(|| anyhow::anyhow!("Could not determine config path"))?;
        self.save_to(&path)?;
        Ok(path)
    }

    /// Save config to a specific path
    pub fn save_to(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let toml = toml::to_string_pretty(self)?;
        std::fs::write(path, toml)?;
        Ok(())
    }

    /// Apply ARTFOLIO_* environment overrides
    pub fn with_env(self) -> Self {
        self.with_overrides(|key| std::env::var(key).ok())
    }

    fn with_overrides(mut self, lookup: impl Fn(&str) -> Option<String>) -> Self {
        if let Some(url) = lookup("ARTFOLIO_URL") {
            self.backend_url = Some(url);
        }
        if let Some(key) = lookup("ARTFOLIO_ANON_KEY") {
            self.anon_key = Some(key);
        }
        if let Some(token) = lookup("ARTFOLIO_ACCESS_TOKEN") {
            self.access_token = Some(token);
        }
        if let Some(locale) = lookup("ARTFOLIO_LOCALE").and_then(|l| l.parse().ok()) {
            self.locale = locale;
        }
        self
    }

    /// Backend URL without trailing slash, or an error explaining how to set it
    pub fn require_backend_url(&self) -> Result<String> {
        self.backend_url
            .as_deref()
            .map(|u| u.trim_end_matches('/').to_string())
            .filter(|u| !u.is_empty())
            .ok_or_else(|| {
                anyhow::anyhow!("Backend URL not configured. Set ARTFOLIO_URL or run `artfolio config init`.")
            })
    }

    /// Anon key, or an error explaining how to set it
    pub fn require_anon_key(&self) -> Result<String> {
        self.anon_key
            .clone()
            .filter(|k| !k.is_empty())
            .ok_or_else(|| {
                anyhow::anyhow!("Anon key not configured. Set ARTFOLIO_ANON_KEY or run `artfolio config init`.")
            })
    }
}
