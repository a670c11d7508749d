//! Data structures and types for artfolio
//!
//! Shared models used across the application, organized by domain:
//! - **Locale**: the two site languages and localized text pairs
//! - **Portfolio**: categories and the media items inside them
//! - **Sections**: editable text blocks of the site (about, prices, ...)
//! - **Admin**: bulk upload progress and summaries

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

// =============================================================================
// Locale
// =============================================================================

/// Site language
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Locale {
    Ru,
    #[default]
    En,
}

impl Locale {
    /// The other locale (used as fallback)
    pub fn other(self) -> Self {
        match self {
            Locale::Ru => Locale::En,
            Locale::En => Locale::Ru,
        }
    }

    pub fn code(self) -> &'static str {
        match self {
            Locale::Ru => "ru",
            Locale::En => "en",
        }
    }
}

impl fmt::Display for Locale {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.code())
    }
}

impl FromStr for Locale {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "ru" => Ok(Locale::Ru),
            "en" => Ok(Locale::En),
            other => Err(format!("Unknown locale '{}' (expected ru or en)", other)),
        }
    }
}

/// A pair of translations
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LocalizedText {
    pub ru: Option<String>,
    pub en: Option<String>,
}

impl LocalizedText {
    pub fn new(ru: Option<String>, en: Option<String>) -> Self {
        Self { ru, en }
    }

    /// Value for `locale`, falling back to the other locale when blank
    pub fn get(&self, locale: Locale) -> Option<&str> {
        self.exact(locale).or_else(|| self.exact(locale.other()))
    }

    fn exact(&self, locale: Locale) -> Option<&str> {
        let value = match locale {
            Locale::Ru => self.ru.as_deref(),
            Locale::En => self.en.as_deref(),
        };
        value.filter(|v| !v.trim().is_empty())
    }

    pub fn set(&mut self, locale: Locale, value: Option<String>) {
        match locale {
            Locale::Ru => self.ru = value,
            Locale::En => self.en = value,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.get(Locale::En).is_none()
    }
}

// =============================================================================
// Portfolio Models
// =============================================================================

/// Kind of a media item
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MediaKind {
    #[default]
    Image,
    Video,
}

impl MediaKind {
    /// Derive the kind from a MIME type (`video/*` is video, anything else image)
    pub fn from_mime(mime: &str) -> Self {
        if mime.starts_with("video/") {
            MediaKind::Video
        } else {
            MediaKind::Image
        }
    }

    pub fn is_zoomable(self) -> bool {
        self == MediaKind::Image
    }
}

impl fmt::Display for MediaKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MediaKind::Image => write!(f, "image"),
            MediaKind::Video => write!(f, "video"),
        }
    }
}

/// Portfolio category (a themed group of works)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Category {
    pub id: String,
    pub name_ru: String,
    pub name_en: String,
    #[serde(default)]
    pub slug: String,
    #[serde(default)]
    pub main_image_url: Option<String>,
    #[serde(default)]
    pub order_index: i32,
}

impl Category {
    pub fn name(&self, locale: Locale) -> &str {
        let (primary, fallback) = match locale {
            Locale::Ru => (&self.name_ru, &self.name_en),
            Locale::En => (&self.name_en, &self.name_ru),
        };
        if primary.trim().is_empty() {
            fallback
        } else {
            primary
        }
    }

    pub fn has_cover(&self) -> bool {
        self.main_image_url
            .as_deref()
            .map(|u| !u.is_empty())
            .unwrap_or(false)
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} / {} [{}]", self.name_en, self.name_ru, self.slug)
    }
}

/// A single image or video belonging to a category
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MediaItem {
    pub id: String,
    pub category_id: String,
    pub image_url: String,
    #[serde(default)]
    pub title_ru: Option<String>,
    #[serde(default)]
    pub title_en: Option<String>,
    #[serde(default)]
    pub description_ru: Option<String>,
    #[serde(default)]
    pub description_en: Option<String>,
    #[serde(default)]
    pub order_index: i32,
    #[serde(default, deserialize_with = "deserialize_media_kind")]
    pub media_type: MediaKind,
}

impl MediaItem {
    pub fn title(&self) -> LocalizedText {
        LocalizedText::new(self.title_ru.clone(), self.title_en.clone())
    }

    pub fn description(&self) -> LocalizedText {
        LocalizedText::new(self.description_ru.clone(), self.description_en.clone())
    }

    pub fn is_video(&self) -> bool {
        self.media_type == MediaKind::Video
    }
}

impl fmt::Display for MediaItem {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let title = self.title();
        let label = title.get(Locale::En).unwrap_or("untitled");
        write!(f, "#{} {} ({})", self.order_index, label, self.media_type)
    }
}

// Rows written before videos existed carry `null` or unknown strings
fn deserialize_media_kind<'de, D>(deserializer: D) -> Result<MediaKind, D::Error>
where
    D: serde::Deserializer<'de>,
{
    let raw: Option<String> = Option::deserialize(deserializer)?;
    Ok(match raw.as_deref() {
        Some("video") => MediaKind::Video,
        _ => MediaKind::Image,
    })
}

/// New media row (insert payload, no id yet)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewMediaItem {
    pub category_id: String,
    pub image_url: String,
    pub title_ru: Option<String>,
    pub title_en: Option<String>,
    pub description_ru: Option<String>,
    pub description_en: Option<String>,
    pub order_index: i32,
    pub media_type: MediaKind,
}

impl NewMediaItem {
    /// Untitled item as produced by bulk upload
    pub fn untitled(
        category_id: impl Into<String>,
        image_url: impl Into<String>,
        order_index: i32,
        media_type: MediaKind,
    ) -> Self {
        Self {
            category_id: category_id.into(),
            image_url: image_url.into(),
            title_ru: None,
            title_en: None,
            description_ru: None,
            description_en: None,
            order_index,
            media_type,
        }
    }
}

/// Sort media ascending by `order_index`; ties keep their original order
pub fn sort_media(items: &mut [MediaItem]) {
    items.sort_by_key(|m| m.order_index);
}

// =============================================================================
// Sections
// =============================================================================

/// Editable text block of the site
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Section {
    pub id: String,
    pub key: String,
    #[serde(default)]
    pub title_ru: Option<String>,
    #[serde(default)]
    pub title_en: Option<String>,
    #[serde(default)]
    pub description_ru: Option<String>,
    #[serde(default)]
    pub description_en: Option<String>,
    #[serde(default)]
    pub image_url: Option<String>,
    #[serde(default)]
    pub order_index: i32,
}

impl Section {
    pub fn title(&self) -> LocalizedText {
        LocalizedText::new(self.title_ru.clone(), self.title_en.clone())
    }

    pub fn description(&self) -> LocalizedText {
        LocalizedText::new(self.description_ru.clone(), self.description_en.clone())
    }

    pub fn set_description(&mut self, locale: Locale, value: Option<String>) {
        match locale {
            Locale::Ru => self.description_ru = value,
            Locale::En => self.description_en = value,
        }
    }

    /// Human name for the section key
    pub fn display_name(&self) -> &str {
        section_display_name(&self.key)
    }
}

/// Known section keys and their names; unknown keys show as-is
pub fn section_display_name(key: &str) -> &str {
    match key {
        "about" => "About me",
        "formats" => "Formats",
        "prices" => "Prices",
        "why-me" => "Why me",
        "process" => "Process",
        "contacts" => "Contacts",
        other => other,
    }
}

// =============================================================================
// Admin Models
// =============================================================================

/// Progress of a running bulk upload (1-based `current`)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct UploadProgress {
    pub current: usize,
    pub total: usize,
}

impl fmt::Display for UploadProgress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} / {}", self.current, self.total)
    }
}

/// Final outcome of a bulk upload
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct UploadSummary {
    pub success: usize,
    pub failed: usize,
    /// Items created, in upload order
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub created: Vec<MediaItem>,
    /// `file: reason` for each failure
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub errors: Vec<String>,
}

impl UploadSummary {
    pub fn total(&self) -> usize {
        self.success + self.failed
    }
}

impl fmt::Display for UploadSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Uploaded: {}, failed: {}", self.success, self.failed)
    }
}
