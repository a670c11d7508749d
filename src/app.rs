//! App state and core application logic
//!
//! Manages the application state machine, navigation stack, edit mode and
//! the hand-off between the UI thread and background fetches: key handling
//! queues [`Action`]s, the event loop runs them as tasks, and their results
//! come back as [`AppEvent`]s applied on the UI thread.

use crossterm::event::{KeyCode, KeyEvent, KeyModifiers, MouseButton, MouseEvent, MouseEventKind};
use ratatui::layout::Rect;

use crate::access::{Capability, EditMode, ViewMode};
use crate::config::{Config, DEFAULT_CELL_WIDTH_PX};
use crate::gallery::{FetchOutcome, FetchTicket, GalleryEvent, GalleryViewer, LoadState, MediaStore};
use crate::models::*;
use crate::ui::{self, GalleryHit};

/// Screen size assumed until the terminal reports its own
const DEFAULT_VIEWPORT: Rect = Rect {
    x: 0,
    y: 0,
    width: 80,
    height: 24,
};

/// Shown when a category has no media
pub const EMPTY_CATEGORY_NOTICE: &str = "No works in this category yet";
/// Shown when a fetch failed; details go to the log
pub const LOAD_FAILED_NOTICE: &str = "Could not load works. Press r to retry.";

// =============================================================================
// App State Enum
// =============================================================================

/// Application state enum representing current screen
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum AppState {
    /// Category tiles
    #[default]
    Categories,
    /// Gallery viewer open over a category
    Gallery,
    /// Text sections (about, prices, ...)
    Sections,
}

// =============================================================================
// Input Mode
// =============================================================================

/// Current input mode for keyboard handling
#[derive(Debug, Clone, PartialEq, Default)]
pub enum InputMode {
    /// Normal navigation mode
    #[default]
    Normal,
    /// Inline text editing of a section
    Editing,
}

// =============================================================================
// Loading State
// =============================================================================

/// Loading state for list fetches
#[derive(Debug, Clone, PartialEq, Default)]
pub enum LoadingState {
    #[default]
    Idle,
    /// Loading with optional message
    Loading(Option<String>),
    Error(String),
}

impl LoadingState {
    pub fn is_loading(&self) -> bool {
        matches!(self, LoadingState::Loading(_))
    }

    pub fn is_error(&self) -> bool {
        matches!(self, LoadingState::Error(_))
    }

    pub fn message(&self) -> Option<&str> {
        match self {
            LoadingState::Loading(Some(msg)) => Some(msg),
            LoadingState::Error(msg) => Some(msg),
            _ => None,
        }
    }
}

// =============================================================================
// Selection State (per-view)
// =============================================================================

/// Selection state for list views
#[derive(Debug, Clone, Default)]
pub struct ListState {
    pub selected: usize,
    /// Scroll offset for viewport
    pub offset: usize,
    pub len: usize,
}

impl ListState {
    pub fn new(len: usize) -> Self {
        Self {
            selected: 0,
            offset: 0,
            len,
        }
    }

    pub fn up(&mut self) {
        if self.selected > 0 {
            self.selected -= 1;
            if self.selected < self.offset {
                self.offset = self.selected;
            }
        }
    }

    pub fn down(&mut self) {
        if self.len > 0 && self.selected < self.len - 1 {
            self.selected += 1;
        }
    }

    pub fn first(&mut self) {
        self.selected = 0;
        self.offset = 0;
    }

    pub fn last(&mut self) {
        if self.len > 0 {
            self.selected = self.len - 1;
        }
    }

    /// Update offset to keep selected item visible
    pub fn scroll_into_view(&mut self, visible_height: usize) {
        if self.selected < self.offset {
            self.offset = self.selected;
        } else if visible_height > 0 && self.selected >= self.offset + visible_height {
            self.offset = self.selected - visible_height + 1;
        }
    }

    /// Update length (e.g., when new results come in)
    pub fn set_len(&mut self, len: usize) {
        self.len = len;
        if len == 0 {
            self.selected = 0;
        } else if self.selected >= len {
            self.selected = len - 1;
        }
    }
}

// =============================================================================
// Text Input
// =============================================================================

/// Single-line editor; the cursor counts chars, not bytes
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TextInput {
    pub text: String,
    pub cursor: usize,
}

impl TextInput {
    pub fn new(text: impl Into<String>) -> Self {
        let text = text.into();
        let cursor = text.chars().count();
        Self { text, cursor }
    }

    fn byte_at(&self, cursor: usize) -> usize {
        self.text
            .char_indices()
            .nth(cursor)
            .map(|(i, _)| i)
            .unwrap_or(self.text.len())
    }

    fn char_len(&self) -> usize {
        self.text.chars().count()
    }

    pub fn insert(&mut self, c: char) {
        let at = self.byte_at(self.cursor);
        self.text.insert(at, c);
        self.cursor += 1;
    }

    /// Delete character before cursor
    pub fn backspace(&mut self) {
        if self.cursor > 0 {
            self.cursor -= 1;
            let at = self.byte_at(self.cursor);
            self.text.remove(at);
        }
    }

    /// Delete character at cursor
    pub fn delete(&mut self) {
        if self.cursor < self.char_len() {
            let at = self.byte_at(self.cursor);
            self.text.remove(at);
        }
    }

    pub fn cursor_left(&mut self) {
        self.cursor = self.cursor.saturating_sub(1);
    }

    pub fn cursor_right(&mut self) {
        if self.cursor < self.char_len() {
            self.cursor += 1;
        }
    }

    pub fn cursor_home(&mut self) {
        self.cursor = 0;
    }

    pub fn cursor_end(&mut self) {
        self.cursor = self.char_len();
    }
}

// =============================================================================
// View-Specific State
// =============================================================================

/// Category picker state
#[derive(Debug, Clone, Default)]
pub struct CategoriesState {
    pub items: Vec<Category>,
    pub list: ListState,
    pub loading: LoadingState,
    /// Category whose media was requested and should open the viewer on arrival
    pub pending_open: Option<String>,
}

impl CategoriesState {
    pub fn set_categories(&mut self, categories: Vec<Category>) {
        self.list.set_len(categories.len());
        self.items = categories;
        self.loading = LoadingState::Idle;
    }

    pub fn selected_category(&self) -> Option<&Category> {
        self.items.get(self.list.selected)
    }

    pub fn find(&self, id: &str) -> Option<&Category> {
        self.items.iter().find(|c| c.id == id)
    }
}

/// Section being edited inline
#[derive(Debug, Clone, PartialEq)]
pub struct SectionEdit {
    pub index: usize,
    pub locale: Locale,
    pub original: Option<String>,
    pub input: TextInput,
}

/// Sections view state
#[derive(Debug, Clone, Default)]
pub struct SectionsState {
    pub items: Vec<Section>,
    pub list: ListState,
    pub loading: LoadingState,
    pub editing: Option<SectionEdit>,
}

impl SectionsState {
    pub fn set_sections(&mut self, sections: Vec<Section>) {
        self.list.set_len(sections.len());
        self.items = sections;
        self.loading = LoadingState::Idle;
    }

    pub fn selected_section(&self) -> Option<&Section> {
        self.items.get(self.list.selected)
    }
}

/// Destructive operation waiting for a y/N answer
#[derive(Debug, Clone, PartialEq)]
pub enum PendingConfirm {
    DeleteMedia { category_id: String, media_id: String },
}

impl PendingConfirm {
    pub fn prompt(&self) -> &'static str {
        match self {
            PendingConfirm::DeleteMedia { .. } => "Delete this work? (y/N)",
        }
    }
}

// =============================================================================
// Actions & Events
// =============================================================================

/// Side effect requested by the UI, executed by the event loop
#[derive(Debug, Clone, PartialEq)]
pub enum Action {
    LoadCategories,
    LoadMedia(FetchTicket),
    LoadSections,
    SaveSection(Section),
    DeleteMedia { category_id: String, media_id: String },
    SetCover { category_id: String, image_url: String },
    OpenExternal(MediaItem),
}

/// Result of an action, applied on the UI thread
#[derive(Debug, Clone, PartialEq)]
pub enum AppEvent {
    Capability(Capability),
    Categories(Result<Vec<Category>, String>),
    Media(FetchTicket, Result<Vec<MediaItem>, String>),
    Sections(Result<Vec<Section>, String>),
    SectionSaved(Result<Section, String>),
    MediaDeleted {
        category_id: String,
        media_id: String,
        result: Result<(), String>,
    },
    CoverSet {
        category_id: String,
        result: Result<String, String>,
    },
    /// Transient status line message
    Notice(String),
}

// =============================================================================
// Main Application State
// =============================================================================

/// Main application state
#[derive(Debug)]
pub struct App {
    pub state: AppState,
    /// Navigation history stack
    pub nav_stack: Vec<AppState>,
    pub running: bool,
    pub input_mode: InputMode,
    /// Error line (cleared on next key)
    pub error: Option<String>,
    /// Informational line (cleared on next key)
    pub notice: Option<String>,
    pub locale: Locale,
    /// Capability plus the edit switch, owned here and passed to views
    pub edit: EditMode,

    pub categories: CategoriesState,
    pub store: MediaStore,
    pub gallery: GalleryViewer,
    pub sections: SectionsState,
    pub confirm: Option<PendingConfirm>,

    /// Logical px per terminal column
    pub cell_width_px: f32,
    /// Last known terminal area, used to route mouse clicks
    pub viewport: Rect,
    actions: Vec<Action>,
}

impl Default for App {
    fn default() -> Self {
        Self {
            state: AppState::Categories,
            nav_stack: Vec::new(),
            running: true,
            input_mode: InputMode::Normal,
            error: None,
            notice: None,
            locale: Locale::default(),
            edit: EditMode::default(),

            categories: CategoriesState::default(),
            store: MediaStore::new(),
            gallery: GalleryViewer::default(),
            sections: SectionsState::default(),
            confirm: None,

            cell_width_px: DEFAULT_CELL_WIDTH_PX,
            viewport: DEFAULT_VIEWPORT,
            actions: Vec::new(),
        }
    }
}

impl App {
    pub fn new() -> Self {
        Self::default()
    }

    /// App configured from the loaded config; queues the initial loads
    pub fn from_config(config: &Config) -> Self {
        let mut app = Self {
            locale: config.locale,
            gallery: GalleryViewer::new(config.swipe_threshold_px),
            cell_width_px: config.cell_width_px,
            ..Self::default()
        };
        app.reload();
        app
    }

    /// Navigate to a new state, pushing current to stack
    pub fn navigate(&mut self, state: AppState) {
        if self.state != state {
            self.nav_stack.push(self.state);
            self.state = state;
        }
        self.input_mode = InputMode::Normal;
    }

    /// Go back to previous state
    pub fn back(&mut self) -> bool {
        if let Some(prev) = self.nav_stack.pop() {
            self.state = prev;
            true
        } else {
            false
        }
    }

    pub fn quit(&mut self) {
        self.running = false;
    }

    pub fn set_error(&mut self, msg: impl Into<String>) {
        self.error = Some(msg.into());
    }

    pub fn set_viewport(&mut self, area: Rect) {
        self.viewport = area;
    }

    pub fn view_mode(&self) -> ViewMode {
        self.edit.view_mode()
    }

    /// Queued actions, oldest first
    pub fn take_actions(&mut self) -> Vec<Action> {
        std::mem::take(&mut self.actions)
    }

    fn push(&mut self, action: Action) {
        self.actions.push(action);
    }

    /// Refetch the categories and sections
    pub fn reload(&mut self) {
        self.categories.loading = LoadingState::Loading(Some("Loading categories...".into()));
        self.sections.loading = LoadingState::Loading(Some("Loading sections...".into()));
        self.push(Action::LoadCategories);
        self.push(Action::LoadSections);
    }

    /// Request a category's media; the viewer opens when it arrives
    pub fn activate_category(&mut self, category_id: &str) {
        let ticket = self.store.select(category_id);
        self.categories.pending_open = Some(category_id.to_string());
        self.push(Action::LoadMedia(ticket));
    }

    // -------------------------------------------------------------------------
    // Keyboard Event Handling
    // -------------------------------------------------------------------------

    /// Handle keyboard event, returns true if event was consumed
    pub fn handle_key(&mut self, key: KeyEvent) -> bool {
        self.error = None;
        self.notice = None;

        if key.code == KeyCode::Char('c') && key.modifiers.contains(KeyModifiers::CONTROL) {
            self.quit();
            return true;
        }

        if self.confirm.is_some() {
            return self.handle_confirm_key(key);
        }

        if self.input_mode == InputMode::Editing {
            self.handle_editing_key(key)
        } else {
            self.handle_normal_key(key)
        }
    }

    fn handle_confirm_key(&mut self, key: KeyEvent) -> bool {
        let Some(pending) = self.confirm.take() else {
            return false;
        };
        if matches!(key.code, KeyCode::Char('y') | KeyCode::Char('Y')) {
            match pending {
                PendingConfirm::DeleteMedia {
                    category_id,
                    media_id,
                } => self.push(Action::DeleteMedia {
                    category_id,
                    media_id,
                }),
            }
        } else {
            self.notice = Some("Cancelled".into());
        }
        true
    }

    /// Inline section editing
    fn handle_editing_key(&mut self, key: KeyEvent) -> bool {
        let Some(edit) = self.sections.editing.as_mut() else {
            self.input_mode = InputMode::Normal;
            return false;
        };
        match key.code {
            KeyCode::Esc => {
                self.cancel_edit();
                true
            }
            KeyCode::Enter => {
                self.commit_edit();
                true
            }
            KeyCode::Char(c) => {
                edit.input.insert(c);
                true
            }
            KeyCode::Backspace => {
                edit.input.backspace();
                true
            }
            KeyCode::Delete => {
                edit.input.delete();
                true
            }
            KeyCode::Left => {
                edit.input.cursor_left();
                true
            }
            KeyCode::Right => {
                edit.input.cursor_right();
                true
            }
            KeyCode::Home => {
                edit.input.cursor_home();
                true
            }
            KeyCode::End => {
                edit.input.cursor_end();
                true
            }
            _ => false,
        }
    }

    fn handle_normal_key(&mut self, key: KeyEvent) -> bool {
        // The viewer owns the keyboard while open
        if self.state == AppState::Gallery {
            return self.handle_gallery_key(key);
        }

        match key.code {
            KeyCode::Char('q') => {
                self.quit();
                return true;
            }
            KeyCode::Char('e') => {
                self.toggle_edit_mode();
                return true;
            }
            KeyCode::Char('L') => {
                self.locale = self.locale.other();
                return true;
            }
            KeyCode::Char('r') => {
                self.reload();
                return true;
            }
            KeyCode::Tab => {
                let target = match self.state {
                    AppState::Sections => AppState::Categories,
                    _ => AppState::Sections,
                };
                self.nav_stack.clear();
                self.state = target;
                return true;
            }
            _ => {}
        }

        match self.state {
            AppState::Categories => self.handle_categories_key(key),
            AppState::Sections => self.handle_sections_key(key),
            AppState::Gallery => false,
        }
    }

    fn toggle_edit_mode(&mut self) {
        if self.edit.toggle() {
            tracing::info!(enabled = self.edit.is_enabled(), "edit mode toggled");
            if !self.edit.is_enabled() {
                self.cancel_edit();
            }
        } else {
            self.notice = Some("Edit mode is available to admins only".into());
        }
    }

    fn handle_categories_key(&mut self, key: KeyEvent) -> bool {
        match key.code {
            KeyCode::Up | KeyCode::Char('k') => {
                self.categories.list.up();
                true
            }
            KeyCode::Down | KeyCode::Char('j') => {
                self.categories.list.down();
                true
            }
            KeyCode::Home => {
                self.categories.list.first();
                true
            }
            KeyCode::End => {
                self.categories.list.last();
                true
            }
            KeyCode::Enter => {
                let id = self.categories.selected_category().map(|c| c.id.clone());
                match id {
                    Some(id) => {
                        self.activate_category(&id);
                        true
                    }
                    None => false,
                }
            }
            KeyCode::Esc => {
                // Abandon a pending open
                self.categories.pending_open.take().is_some()
            }
            _ => false,
        }
    }

    fn handle_gallery_key(&mut self, key: KeyEvent) -> bool {
        match key.code {
            KeyCode::Char('o') => {
                if let Some(item) = self.gallery.current().cloned() {
                    self.push(Action::OpenExternal(item));
                }
                return true;
            }
            KeyCode::Char('x') if self.edit.is_enabled() => {
                if let Some(item) = self.gallery.current() {
                    self.confirm = Some(PendingConfirm::DeleteMedia {
                        category_id: item.category_id.clone(),
                        media_id: item.id.clone(),
                    });
                }
                return true;
            }
            KeyCode::Char('c') if self.edit.is_enabled() => {
                let action = self.gallery.current().map(|item| Action::SetCover {
                    category_id: item.category_id.clone(),
                    image_url: item.image_url.clone(),
                });
                if let Some(action) = action {
                    self.push(action);
                }
                return true;
            }
            KeyCode::Char('q') => {
                self.close_gallery();
                return true;
            }
            _ => {}
        }

        match self.gallery.handle_key(key.code) {
            GalleryEvent::Closed => {
                self.close_gallery();
                true
            }
            GalleryEvent::Ignored => false,
            GalleryEvent::Moved(_) | GalleryEvent::Zoom(_) => true,
        }
    }

    fn close_gallery(&mut self) {
        self.gallery.close();
        if self.state == AppState::Gallery && !self.back() {
            self.state = AppState::Categories;
        }
    }

    fn handle_sections_key(&mut self, key: KeyEvent) -> bool {
        match key.code {
            KeyCode::Up | KeyCode::Char('k') => {
                self.sections.list.up();
                true
            }
            KeyCode::Down | KeyCode::Char('j') => {
                self.sections.list.down();
                true
            }
            KeyCode::Enter if self.view_mode().is_editable() => self.begin_edit(),
            KeyCode::Esc => self.back(),
            _ => false,
        }
    }

    // -------------------------------------------------------------------------
    // Section editing
    // -------------------------------------------------------------------------

    fn begin_edit(&mut self) -> bool {
        let index = self.sections.list.selected;
        let Some(section) = self.sections.items.get(index) else {
            return false;
        };
        let original = match self.locale {
            Locale::Ru => section.description_ru.clone(),
            Locale::En => section.description_en.clone(),
        };
        self.sections.editing = Some(SectionEdit {
            index,
            locale: self.locale,
            input: TextInput::new(original.clone().unwrap_or_default()),
            original,
        });
        self.input_mode = InputMode::Editing;
        true
    }

    /// Write the edited text into the section and queue a save
    fn commit_edit(&mut self) {
        self.input_mode = InputMode::Normal;
        let Some(edit) = self.sections.editing.take() else {
            return;
        };
        if !self.edit.is_enabled() {
            return;
        }
        let Some(section) = self.sections.items.get_mut(edit.index) else {
            return;
        };
        let value = Some(edit.input.text).filter(|t| !t.trim().is_empty());
        section.set_description(edit.locale, value);
        let section = section.clone();
        self.push(Action::SaveSection(section));
    }

    /// Leave editing; the section text was never touched
    fn cancel_edit(&mut self) {
        self.input_mode = InputMode::Normal;
        self.sections.editing = None;
    }

    // -------------------------------------------------------------------------
    // Mouse (touch emulation)
    // -------------------------------------------------------------------------

    /// Left-button drags in the gallery act as touch swipes; a click
    /// without a drag zooms the card or jumps to a thumbnail
    pub fn handle_mouse(&mut self, mouse: MouseEvent) -> bool {
        if self.state != AppState::Gallery || self.confirm.is_some() {
            return false;
        }
        let x = f32::from(mouse.column) * self.cell_width_px;
        match mouse.kind {
            MouseEventKind::Down(MouseButton::Left) => {
                self.gallery.touch_start(x);
                true
            }
            MouseEventKind::Drag(MouseButton::Left) => {
                self.gallery.touch_move(x);
                true
            }
            MouseEventKind::Up(MouseButton::Left) => {
                let tap = self.gallery.is_tap();
                let event = self.gallery.touch_end();
                if tap {
                    self.handle_gallery_click(mouse.column, mouse.row)
                } else {
                    event != GalleryEvent::Ignored
                }
            }
            _ => false,
        }
    }

    fn handle_gallery_click(&mut self, column: u16, row: u16) -> bool {
        let event = match ui::gallery_hit(self, self.viewport, column, row) {
            Some(GalleryHit::Card) => self.gallery.toggle_zoom(),
            Some(GalleryHit::Thumbnail(index)) => self.gallery.jump_to(index),
            None => GalleryEvent::Ignored,
        };
        event != GalleryEvent::Ignored
    }

    // -------------------------------------------------------------------------
    // Background results
    // -------------------------------------------------------------------------

    /// Apply the result of a background task
    pub fn apply(&mut self, event: AppEvent) {
        match event {
            AppEvent::Capability(capability) => {
                self.edit.set_capability(capability);
                if !capability.is_admin() {
                    self.cancel_edit();
                }
            }
            AppEvent::Categories(Ok(categories)) => self.categories.set_categories(categories),
            AppEvent::Categories(Err(e)) => {
                tracing::error!(error = %e, "loading categories failed");
                self.categories.loading = LoadingState::Error(LOAD_FAILED_NOTICE.into());
            }
            AppEvent::Media(ticket, result) => self.apply_media(ticket, result),
            AppEvent::Sections(Ok(sections)) => self.sections.set_sections(sections),
            AppEvent::Sections(Err(e)) => {
                tracing::error!(error = %e, "loading sections failed");
                self.sections.loading = LoadingState::Error(LOAD_FAILED_NOTICE.into());
            }
            AppEvent::SectionSaved(Ok(section)) => {
                if let Some(existing) = self.sections.items.iter_mut().find(|s| s.id == section.id) {
                    *existing = section;
                }
                self.notice = Some("Saved".into());
            }
            AppEvent::SectionSaved(Err(e)) => self.set_error(format!("Save failed: {}", e)),
            AppEvent::MediaDeleted {
                category_id,
                media_id,
                result,
            } => match result {
                Ok(()) => self.apply_media_deleted(&category_id, &media_id),
                Err(e) => self.set_error(format!("Delete failed: {}", e)),
            },
            AppEvent::CoverSet {
                category_id,
                result,
            } => match result {
                Ok(url) => {
                    if let Some(cat) = self.categories.items.iter_mut().find(|c| c.id == category_id) {
                        cat.main_image_url = Some(url);
                    }
                    self.notice = Some("Cover updated".into());
                }
                Err(e) => self.set_error(format!("Cover update failed: {}", e)),
            },
            AppEvent::Notice(msg) => self.notice = Some(msg),
        }
    }

    fn apply_media(&mut self, ticket: FetchTicket, result: Result<Vec<MediaItem>, String>) {
        if self.store.complete(&ticket, result) != FetchOutcome::Applied {
            return;
        }
        if self.categories.pending_open.as_deref() != Some(ticket.category_id.as_str()) {
            return;
        }
        self.categories.pending_open = None;

        match self.store.current() {
            LoadState::Loaded(items) if !items.is_empty() => {
                let label = self
                    .categories
                    .find(&ticket.category_id)
                    .map(|c| c.name(self.locale).to_string())
                    .unwrap_or_default();
                let items = items.clone();
                if self.gallery.open(items, 0, label) {
                    self.navigate(AppState::Gallery);
                }
            }
            LoadState::Loaded(_) => self.notice = Some(EMPTY_CATEGORY_NOTICE.into()),
            LoadState::Failed(e) => {
                tracing::error!(category = %ticket.category_id, error = %e, "loading media failed");
                self.set_error(LOAD_FAILED_NOTICE);
            }
            LoadState::Idle | LoadState::Loading => {}
        }
    }

    fn apply_media_deleted(&mut self, category_id: &str, media_id: &str) {
        self.store.remove_item(category_id, media_id);
        self.notice = Some("Deleted".into());

        let Some(open) = self.gallery.gallery() else {
            return;
        };
        if open.current().category_id != category_id {
            return;
        }
        let index = open.index();
        let label = open.label().to_string();
        let remaining: Vec<MediaItem> = open
            .items()
            .iter()
            .filter(|m| m.id != media_id)
            .cloned()
            .collect();

        let start = index.min(remaining.len().saturating_sub(1));
        if !self.gallery.open(remaining, start, label) {
            self.close_gallery();
            self.notice = Some(EMPTY_CATEGORY_NOTICE.into());
        }
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
