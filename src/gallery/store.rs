//! Media item store
//!
//! Holds the media of the categories the user has looked at, keyed by
//! category id. Each fetch gets a ticket carrying a generation number; a
//! result is only written back when its ticket is still the newest one for
//! that category, and it is only *displayed* when that category is the
//! selected one. A slow response for an older selection can therefore never
//! overwrite what is on screen.

use std::collections::HashMap;
use std::fmt::Display;

use crate::models::{sort_media, MediaItem};

/// Load state of an async resource
#[derive(Debug, Clone, PartialEq, Default)]
pub enum LoadState<T> {
    #[default]
    Idle,
    Loading,
    Loaded(T),
    Failed(String),
}

impl<T> LoadState<T> {
    pub fn is_loading(&self) -> bool {
        matches!(self, LoadState::Loading)
    }

    pub fn loaded(&self) -> Option<&T> {
        match self {
            LoadState::Loaded(value) => Some(value),
            _ => None,
        }
    }

    pub fn error(&self) -> Option<&str> {
        match self {
            LoadState::Failed(msg) => Some(msg),
            _ => None,
        }
    }
}

/// Handle for one in-flight fetch
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FetchTicket {
    pub category_id: String,
    generation: u64,
}

impl FetchTicket {
    pub fn generation(&self) -> u64 {
        self.generation
    }
}

/// What happened to a completed fetch
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FetchOutcome {
    /// Stored and belongs to the selected category
    Applied,
    /// Stored for its category, which is no longer selected
    Cached,
    /// A newer fetch for the same category superseded it; dropped
    Discarded,
}

#[derive(Debug, Clone, Default)]
struct Entry {
    generation: u64,
    state: LoadState<Vec<MediaItem>>,
}

/// Per-category media cache with stale-response suppression
#[derive(Debug, Clone, Default)]
pub struct MediaStore {
    selected: Option<String>,
    entries: HashMap<String, Entry>,
    next_generation: u64,
}

impl MediaStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Select a category and start a fetch for it
    pub fn select(&mut self, category_id: impl Into<String>) -> FetchTicket {
        let category_id = category_id.into();
        self.selected = Some(category_id.clone());
        self.begin_fetch(category_id)
    }

    /// Start a (re)fetch for a category without changing the selection
    pub fn begin_fetch(&mut self, category_id: impl Into<String>) -> FetchTicket {
        let category_id = category_id.into();
        self.next_generation += 1;
        let generation = self.next_generation;

        let entry = self.entries.entry(category_id.clone()).or_default();
        entry.generation = generation;
        entry.state = LoadState::Loading;

        tracing::debug!(category = %category_id, generation, "media fetch started");
        FetchTicket {
            category_id,
            generation,
        }
    }

    /// Record the result of a fetch. Items are stored sorted by
    /// `order_index`; errors become [`LoadState::Failed`].
    pub fn complete<E: Display>(
        &mut self,
        ticket: &FetchTicket,
        result: Result<Vec<MediaItem>, E>,
    ) -> FetchOutcome {
        let Some(entry) = self.entries.get_mut(&ticket.category_id) else {
            return FetchOutcome::Discarded;
        };
        if entry.generation != ticket.generation {
            tracing::debug!(
                category = %ticket.category_id,
                generation = ticket.generation,
                "discarding superseded media response"
            );
            return FetchOutcome::Discarded;
        }

        entry.state = match result {
            Ok(mut items) => {
                sort_media(&mut items);
                LoadState::Loaded(items)
            }
            Err(e) => LoadState::Failed(e.to_string()),
        };

        if self.is_selected(&ticket.category_id) {
            FetchOutcome::Applied
        } else {
            FetchOutcome::Cached
        }
    }

    pub fn selected(&self) -> Option<&str> {
        self.selected.as_deref()
    }

    pub fn is_selected(&self, category_id: &str) -> bool {
        self.selected.as_deref() == Some(category_id)
    }

    pub fn clear_selection(&mut self) {
        self.selected = None;
    }

    /// State of the selected category (Idle when nothing is selected)
    pub fn current(&self) -> &LoadState<Vec<MediaItem>> {
        self.selected
            .as_deref()
            .map(|id| self.state_of(id))
            .unwrap_or(&LoadState::Idle)
    }

    /// Items of the selected category, empty unless loaded
    pub fn current_items(&self) -> &[MediaItem] {
        self.current().loaded().map(Vec::as_slice).unwrap_or(&[])
    }

    pub fn state_of(&self, category_id: &str) -> &LoadState<Vec<MediaItem>> {
        self.entries
            .get(category_id)
            .map(|e| &e.state)
            .unwrap_or(&LoadState::Idle)
    }

    /// Drop one item from a loaded category (after a delete)
    pub fn remove_item(&mut self, category_id: &str, media_id: &str) -> bool {
        match self.entries.get_mut(category_id).map(|e| &mut e.state) {
            Some(LoadState::Loaded(items)) => {
                let before = items.len();
                items.retain(|m| m.id != media_id);
                items.len() != before
            }
            _ => false,
        }
    }

    /// Forget a category so the next select refetches it
    pub fn invalidate(&mut self, category_id: &str) {
        self.entries.remove(category_id);
    }

    /// Highest `order_index` of a loaded category
    pub fn max_order_index(&self, category_id: &str) -> Option<i32> {
        self.state_of(category_id)
            .loaded()
            .and_then(|items| items.iter().map(|m| m.order_index).max())
    }
}
