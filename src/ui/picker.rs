//! Category picker view
//!
//! Displays the portfolio categories as a selectable list of tiles: a cover
//! marker (or the `◇` placeholder), the localized name and the slug.

use ratatui::{
    prelude::*,
    widgets::{Block, BorderType, Borders, List, ListItem, Paragraph},
};

use crate::app::{CategoriesState, LoadingState};
use crate::models::{Category, Locale};
use crate::ui::Theme;

/// Glyph shown for categories without a cover image
pub const PLACEHOLDER_GLYPH: &str = "◇";
/// Glyph shown for categories with a cover image
pub const COVER_GLYPH: &str = "◆";

/// Picker view over the app's category state
pub struct PickerView<'a> {
    state: &'a CategoriesState,
    locale: Locale,
    focused: bool,
}

impl<'a> PickerView<'a> {
    pub fn new(state: &'a CategoriesState, locale: Locale) -> Self {
        Self {
            state,
            locale,
            focused: true,
        }
    }

    pub fn focused(mut self, focused: bool) -> Self {
        self.focused = focused;
        self
    }

    fn block(&self, title: String) -> Block<'static> {
        let border_style = if self.focused {
            Theme::border_focused()
        } else {
            Theme::border()
        };
        Block::default()
            .borders(Borders::ALL)
            .border_type(BorderType::Rounded)
            .border_style(border_style)
            .title(Span::styled(title, Theme::title()))
            .title_alignment(Alignment::Left)
    }

    /// Render the picker
    pub fn render(&self, frame: &mut Frame, area: Rect) {
        match self.state.loading {
            LoadingState::Loading(_) if self.state.items.is_empty() => {
                self.render_message(frame, area, "⟳ Loading categories...", Theme::loading());
                return;
            }
            LoadingState::Error(ref msg) => {
                self.render_message(frame, area, msg, Theme::error());
                return;
            }
            _ => {}
        }

        if self.state.items.is_empty() {
            self.render_message(frame, area, "No categories yet", Theme::dimmed());
            return;
        }

        let visible_height = area.height.saturating_sub(2) as usize;
        let selected = self.state.list.selected;
        let offset = if selected >= visible_height && visible_height > 0 {
            selected + 1 - visible_height
        } else {
            0
        };

        let items: Vec<ListItem> = self
            .state
            .items
            .iter()
            .enumerate()
            .skip(offset)
            .take(visible_height)
            .map(|(i, category)| self.render_tile(category, i == selected))
            .collect();

        let title = format!(" PORTFOLIO ({}/{}) ", selected + 1, self.state.items.len());
        let list = List::new(items).block(self.block(title)).style(Theme::text());
        frame.render_widget(list, area);
    }

    fn render_tile(&self, category: &Category, is_selected: bool) -> ListItem<'static> {
        let marker = if is_selected { "▸ " } else { "  " };
        let pending = self.state.pending_open.as_deref() == Some(category.id.as_str());
        let glyph = if category.has_cover() {
            COVER_GLYPH
        } else {
            PLACEHOLDER_GLYPH
        };

        let mut spans = vec![
            Span::styled(
                marker.to_string(),
                if is_selected { Theme::accent() } else { Theme::dimmed() },
            ),
            Span::styled(format!("{} ", glyph), Theme::secondary()),
            Span::styled(
                category.name(self.locale).to_string(),
                if is_selected {
                    Theme::list_item_selected()
                } else {
                    Theme::list_item()
                },
            ),
        ];
        if !category.slug.is_empty() {
            spans.push(Span::styled(format!("  /{}", category.slug), Theme::dimmed()));
        }
        if pending {
            spans.push(Span::styled("  ⟳".to_string(), Theme::loading()));
        }

        ListItem::new(Line::from(spans))
    }

    fn render_message(&self, frame: &mut Frame, area: Rect, message: &str, style: Style) {
        let paragraph = Paragraph::new(message.to_string())
            .style(style)
            .alignment(Alignment::Center)
            .block(self.block(" PORTFOLIO ".to_string()));
        frame.render_widget(paragraph, area);
    }
}
