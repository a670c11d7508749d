//! Text sections view
//!
//! One component for both read-only and editable rendering; the
//! [`ViewMode`] decides whether the selected section shows edit affordances
//! and the inline editor.

use ratatui::{
    prelude::*,
    widgets::{Block, BorderType, Borders, List, ListItem, Paragraph, Wrap},
};

use crate::access::ViewMode;
use crate::app::{LoadingState, SectionEdit, SectionsState};
use crate::models::{Locale, Section};
use crate::ui::Theme;

pub struct SectionView<'a> {
    state: &'a SectionsState,
    locale: Locale,
    mode: ViewMode,
}

impl<'a> SectionView<'a> {
    pub fn new(state: &'a SectionsState, locale: Locale, mode: ViewMode) -> Self {
        Self {
            state,
            locale,
            mode,
        }
    }

    pub fn render(&self, frame: &mut Frame, area: Rect) {
        let chunks = Layout::default()
            .direction(Direction::Horizontal)
            .constraints([Constraint::Length(24), Constraint::Min(20)])
            .split(area);

        self.render_list(frame, chunks[0]);
        self.render_body(frame, chunks[1]);
    }

    fn render_list(&self, frame: &mut Frame, area: Rect) {
        let items: Vec<ListItem> = self
            .state
            .items
            .iter()
            .enumerate()
            .map(|(i, section)| {
                let is_selected = i == self.state.list.selected;
                let marker = if is_selected { "▸ " } else { "  " };
                ListItem::new(Line::from(vec![
                    Span::styled(marker, if is_selected { Theme::accent() } else { Theme::dimmed() }),
                    Span::styled(
                        section.display_name().to_string(),
                        if is_selected {
                            Theme::list_item_selected()
                        } else {
                            Theme::list_item()
                        },
                    ),
                ]))
            })
            .collect();

        let list = List::new(items).block(
            Block::default()
                .borders(Borders::ALL)
                .border_type(BorderType::Rounded)
                .border_style(Theme::border())
                .title(Span::styled(" SECTIONS ", Theme::title())),
        );
        frame.render_widget(list, area);
    }

    fn render_body(&self, frame: &mut Frame, area: Rect) {
        let border_style = if self.mode.is_editable() {
            Theme::accent()
        } else {
            Theme::border()
        };
        let block = Block::default()
            .borders(Borders::ALL)
            .border_type(BorderType::Rounded)
            .border_style(border_style);

        let lines = match (&self.state.loading, self.state.selected_section()) {
            (LoadingState::Loading(_), None) => {
                vec![Line::from(Span::styled("⟳ Loading sections...", Theme::loading()))]
            }
            (LoadingState::Error(msg), None) => {
                vec![Line::from(Span::styled(msg.clone(), Theme::error()))]
            }
            (_, None) => vec![Line::from(Span::styled("No sections", Theme::dimmed()))],
            (_, Some(section)) => self.section_lines(section),
        };

        let title = self
            .state
            .selected_section()
            .and_then(|s| s.title().get(self.locale).map(str::to_string))
            .unwrap_or_default();
        let body = Paragraph::new(lines)
            .wrap(Wrap { trim: false })
            .block(block.title(Span::styled(format!(" {} ", title), Theme::title())))
            .style(Theme::text());
        frame.render_widget(body, area);
    }

    fn section_lines(&self, section: &Section) -> Vec<Line<'static>> {
        let editing = self
            .state
            .editing
            .as_ref()
            .filter(|e| e.index == self.state.list.selected && self.mode.is_editable());

        let mut lines = Vec::new();
        match editing {
            Some(edit) => lines.push(editor_line(edit)),
            None => {
                let text = section
                    .description()
                    .get(self.locale)
                    .unwrap_or("")
                    .to_string();
                for paragraph in text.lines() {
                    lines.push(Line::from(Span::styled(paragraph.to_string(), Theme::text())));
                }
            }
        }

        if self.mode.is_editable() {
            lines.push(Line::from(""));
            let hint = if editing.is_some() {
                vec![
                    Span::styled(" ↵ ", Theme::keybind()),
                    Span::styled("save  ", Theme::keybind_desc()),
                    Span::styled(" ESC ", Theme::keybind()),
                    Span::styled("cancel", Theme::keybind_desc()),
                ]
            } else {
                vec![
                    Span::styled(" ↵ ", Theme::keybind()),
                    Span::styled(format!("edit ({})", self.locale), Theme::keybind_desc()),
                ]
            };
            lines.push(Line::from(hint));
        }
        lines
    }
}

/// Input text with a block cursor at the edit position
fn editor_line(edit: &SectionEdit) -> Line<'static> {
    let chars: Vec<char> = edit.input.text.chars().collect();
    let cursor = edit.input.cursor.min(chars.len());
    let before: String = chars[..cursor].iter().collect();
    let at: String = chars.get(cursor).map(|c| c.to_string()).unwrap_or_else(|| " ".into());
    let after: String = chars.iter().skip(cursor + 1).collect();

    Line::from(vec![
        Span::styled(before, Theme::input()),
        Span::styled(at, Theme::input_cursor()),
        Span::styled(after, Theme::input()),
    ])
}
