//! Gallery viewer state machine
//!
//! `Closed` or `Open(index, zoomed)`. Every open starts from a clean state;
//! closing drops the items, the zoom flag and any swipe in progress.

use crossterm::event::KeyCode;

use super::swipe::{SwipeDirection, SwipeTracker};
use crate::config::DEFAULT_SWIPE_THRESHOLD_PX;
use crate::models::MediaItem;

/// Result of feeding an input to the viewer
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GalleryEvent {
    /// Current index changed (zoom was reset)
    Moved(usize),
    /// Zoom flag changed
    Zoom(bool),
    /// Viewer closed
    Closed,
    /// Input had no effect on the viewer
    Ignored,
}

/// State of an open viewer
#[derive(Debug, Clone, PartialEq)]
pub struct OpenGallery {
    items: Vec<MediaItem>,
    label: String,
    index: usize,
    zoomed: bool,
    swipe: SwipeTracker,
}

impl OpenGallery {
    pub fn items(&self) -> &[MediaItem] {
        &self.items
    }

    pub fn label(&self) -> &str {
        &self.label
    }

    pub fn index(&self) -> usize {
        self.index
    }

    pub fn is_zoomed(&self) -> bool {
        self.zoomed
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// The item on screen. Open galleries are never empty.
    pub fn current(&self) -> &MediaItem {
        &self.items[self.index]
    }

    /// `"3 / 12"`
    pub fn counter(&self) -> String {
        format!("{} / {}", self.index + 1, self.items.len())
    }

    fn go(&mut self, index: usize) -> GalleryEvent {
        self.index = index;
        self.zoomed = false;
        GalleryEvent::Moved(index)
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub enum GalleryState {
    #[default]
    Closed,
    Open(OpenGallery),
}

/// Modal media viewer
#[derive(Debug, Clone, PartialEq)]
pub struct GalleryViewer {
    state: GalleryState,
    swipe_threshold: f32,
}

impl Default for GalleryViewer {
    fn default() -> Self {
        Self::new(DEFAULT_SWIPE_THRESHOLD_PX)
    }
}

impl GalleryViewer {
    pub fn new(swipe_threshold: f32) -> Self {
        Self {
            state: GalleryState::Closed,
            swipe_threshold,
        }
    }

    /// Open on `items` at `start`. Empty input keeps the viewer closed and
    /// returns false; an out-of-range start falls back to the first item.
    pub fn open(&mut self, items: Vec<MediaItem>, start: usize, label: impl Into<String>) -> bool {
        if items.is_empty() {
            return false;
        }
        let index = if start < items.len() { start } else { 0 };
        self.state = GalleryState::Open(OpenGallery {
            items,
            label: label.into(),
            index,
            zoomed: false,
            swipe: SwipeTracker::new(self.swipe_threshold),
        });
        true
    }

    pub fn close(&mut self) {
        self.state = GalleryState::Closed;
    }

    pub fn state(&self) -> &GalleryState {
        &self.state
    }

    pub fn is_open(&self) -> bool {
        matches!(self.state, GalleryState::Open(_))
    }

    pub fn gallery(&self) -> Option<&OpenGallery> {
        match self.state {
            GalleryState::Open(ref g) => Some(g),
            GalleryState::Closed => None,
        }
    }

    fn gallery_mut(&mut self) -> Option<&mut OpenGallery> {
        match self.state {
            GalleryState::Open(ref mut g) => Some(g),
            GalleryState::Closed => None,
        }
    }

    pub fn current(&self) -> Option<&MediaItem> {
        self.gallery().map(OpenGallery::current)
    }

    pub fn index(&self) -> Option<usize> {
        self.gallery().map(OpenGallery::index)
    }

    pub fn is_zoomed(&self) -> bool {
        self.gallery().map(OpenGallery::is_zoomed).unwrap_or(false)
    }

    pub fn next(&mut self) -> GalleryEvent {
        match self.gallery_mut() {
            Some(g) => {
                let index = (g.index + 1) % g.items.len();
                g.go(index)
            }
            None => GalleryEvent::Ignored,
        }
    }

    pub fn previous(&mut self) -> GalleryEvent {
        match self.gallery_mut() {
            Some(g) => {
                let len = g.items.len();
                let index = (g.index + len - 1) % len;
                g.go(index)
            }
            None => GalleryEvent::Ignored,
        }
    }

    /// Jump straight to `index`; out-of-range indices are a no-op
    pub fn jump_to(&mut self, index: usize) -> GalleryEvent {
        match self.gallery_mut() {
            Some(g) if index < g.items.len() => g.go(index),
            _ => GalleryEvent::Ignored,
        }
    }

    pub fn first(&mut self) -> GalleryEvent {
        self.jump_to(0)
    }

    pub fn last(&mut self) -> GalleryEvent {
        let last = self.gallery().map(|g| g.len() - 1);
        match last {
            Some(index) => self.jump_to(index),
            None => GalleryEvent::Ignored,
        }
    }

    /// Flip zoom on images; videos are never zoomed
    pub fn toggle_zoom(&mut self) -> GalleryEvent {
        match self.gallery_mut() {
            Some(g) if g.current().media_type.is_zoomable() => {
                g.zoomed = !g.zoomed;
                GalleryEvent::Zoom(g.zoomed)
            }
            _ => GalleryEvent::Ignored,
        }
    }

    /// Key-press handling: arrows navigate, Esc closes, Enter/z zooms,
    /// 1-9 jump to a thumbnail, Home/End jump to the ends.
    pub fn handle_key(&mut self, code: KeyCode) -> GalleryEvent {
        if !self.is_open() {
            return GalleryEvent::Ignored;
        }
        match code {
            KeyCode::Left | KeyCode::Char('h') => self.previous(),
            KeyCode::Right | KeyCode::Char('l') => self.next(),
            KeyCode::Esc => {
                self.close();
                GalleryEvent::Closed
            }
            KeyCode::Enter | KeyCode::Char('z') => self.toggle_zoom(),
            KeyCode::Home => self.first(),
            KeyCode::End => self.last(),
            KeyCode::Char(c @ '1'..='9') => {
                let index = (c as usize) - ('1' as usize);
                self.jump_to(index)
            }
            _ => GalleryEvent::Ignored,
        }
    }

    pub fn touch_start(&mut self, x: f32) {
        if let Some(g) = self.gallery_mut() {
            g.swipe.start(x);
        }
    }

    pub fn touch_move(&mut self, x: f32) {
        if let Some(g) = self.gallery_mut() {
            g.swipe.moved(x);
        }
    }

    /// The touch in progress has not moved
    pub fn is_tap(&self) -> bool {
        self.gallery().is_some_and(|g| g.swipe.is_tap())
    }

    /// Release: a long enough horizontal drag navigates
    pub fn touch_end(&mut self) -> GalleryEvent {
        let direction = self.gallery_mut().and_then(|g| g.swipe.finish());
        match direction {
            Some(SwipeDirection::Left) => self.next(),
            Some(SwipeDirection::Right) => self.previous(),
            None => GalleryEvent::Ignored,
        }
    }
}
