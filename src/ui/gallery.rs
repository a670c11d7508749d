//! Gallery viewer rendering
//!
//! A terminal cannot draw the artwork itself, so the viewer shows a card
//! for the current item (kind, localized title and description, URL) plus
//! a numbered thumbnail strip. Zoom drops the chrome and gives the card the
//! whole area.

use ratatui::{
    prelude::*,
    widgets::{Block, BorderType, Borders, Paragraph, Wrap},
};

use crate::gallery::OpenGallery;
use crate::models::{Locale, MediaItem, MediaKind};
use crate::ui::Theme;

/// What a click inside the gallery landed on
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GalleryHit {
    /// The item card (or the whole screen when zoomed)
    Card,
    /// A thumbnail in the strip, by item index
    Thumbnail(usize),
}

/// Renders an open gallery
pub struct GalleryView<'a> {
    gallery: &'a OpenGallery,
    locale: Locale,
}

impl<'a> GalleryView<'a> {
    pub fn new(gallery: &'a OpenGallery, locale: Locale) -> Self {
        Self { gallery, locale }
    }

    pub fn render(&self, frame: &mut Frame, area: Rect) {
        if self.gallery.is_zoomed() {
            self.render_zoomed(frame, area);
            return;
        }

        let (card, strip) = self.layout(area);
        self.render_card(frame, card);
        if let Some(strip) = strip {
            self.render_strip(frame, strip);
        }
    }

    /// Card area and, with more than one item, the strip below it
    fn layout(&self, area: Rect) -> (Rect, Option<Rect>) {
        let show_strip = self.gallery.len() > 1;
        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Min(5),
                Constraint::Length(if show_strip { 3 } else { 0 }),
            ])
            .split(area);
        (chunks[0], show_strip.then_some(chunks[1]))
    }

    /// Map a screen cell to the part of the gallery drawn there
    pub fn hit(&self, area: Rect, column: u16, row: u16) -> Option<GalleryHit> {
        let position = Position::new(column, row);
        if !area.contains(position) {
            return None;
        }
        if self.gallery.is_zoomed() {
            return Some(GalleryHit::Card);
        }

        let (card, strip) = self.layout(area);
        if card.contains(position) {
            return Some(GalleryHit::Card);
        }
        let inner = strip?.inner(Margin::new(1, 1));
        if column < inner.x {
            return None;
        }
        let mut x = inner.x;
        for (index, label) in self.visible_thumbnails(inner.width) {
            let width = Span::raw(label).width() as u16;
            if column < x + width {
                return Some(GalleryHit::Thumbnail(index));
            }
            x += width;
        }
        None
    }

    /// Thumbnail labels that fit in `width`, scrolled so the current one
    /// is always among them
    fn visible_thumbnails(&self, width: u16) -> Vec<(usize, String)> {
        let labels: Vec<(usize, String)> = self
            .gallery
            .items()
            .iter()
            .enumerate()
            .map(|(i, item)| {
                let glyph = if item.is_video() { "▶" } else { "▣" };
                (i, format!(" {}{} ", glyph, i + 1))
            })
            .collect();
        let widths: Vec<usize> = labels.iter().map(|(_, l)| Span::raw(l.as_str()).width()).collect();
        let available = usize::from(width);

        let current = self.gallery.index();
        let mut offset = 0;
        while offset < current && widths[offset..=current].iter().sum::<usize>() > available {
            offset += 1;
        }

        let mut used = 0;
        labels
            .into_iter()
            .zip(widths)
            .skip(offset)
            .take_while(|(_, w)| {
                used += w;
                used <= available
            })
            .map(|(label, _)| label)
            .collect()
    }

    fn title_line(&self) -> Line<'static> {
        Line::from(vec![
            Span::styled(format!(" {} ", self.gallery.label()), Theme::title()),
            Span::styled(format!("{} ", self.gallery.counter()), Theme::accent()),
        ])
    }

    fn card_lines(&self, item: &MediaItem) -> Vec<Line<'static>> {
        let (badge, badge_style) = match item.media_type {
            MediaKind::Image => ("▣ IMAGE", Theme::kind_image()),
            MediaKind::Video => ("▶ VIDEO", Theme::kind_video()),
        };

        let mut lines = vec![Line::from(""), Line::from(Span::styled(badge, badge_style))];

        if let Some(title) = item.title().get(self.locale) {
            lines.push(Line::from(""));
            lines.push(Line::from(Span::styled(title.to_string(), Theme::selected())));
        }
        if let Some(description) = item.description().get(self.locale) {
            lines.push(Line::from(""));
            lines.push(Line::from(Span::styled(description.to_string(), Theme::text())));
        }

        lines.push(Line::from(""));
        lines.push(Line::from(Span::styled(item.image_url.clone(), Theme::url())));
        lines
    }

    fn hint_line(&self, item: &MediaItem) -> Line<'static> {
        let mut spans = vec![
            Span::styled(" ←→ ", Theme::keybind()),
            Span::styled("browse  ", Theme::keybind_desc()),
        ];
        if item.media_type.is_zoomable() {
            let label = if self.gallery.is_zoomed() { "unzoom  " } else { "zoom  " };
            spans.push(Span::styled(" ↵ ", Theme::keybind()));
            spans.push(Span::styled(label, Theme::keybind_desc()));
        }
        let open = if item.is_video() { "play  " } else { "open  " };
        spans.push(Span::styled(" o ", Theme::keybind()));
        spans.push(Span::styled(open, Theme::keybind_desc()));
        spans.push(Span::styled(" ESC ", Theme::keybind()));
        spans.push(Span::styled("close", Theme::keybind_desc()));
        Line::from(spans)
    }

    fn render_card(&self, frame: &mut Frame, area: Rect) {
        let item = self.gallery.current();
        let mut lines = self.card_lines(item);
        lines.push(Line::from(""));
        lines.push(self.hint_line(item));

        let card = Paragraph::new(lines)
            .alignment(Alignment::Center)
            .wrap(Wrap { trim: true })
            .block(
                Block::default()
                    .borders(Borders::ALL)
                    .border_type(BorderType::Rounded)
                    .border_style(Theme::border_focused())
                    .title(self.title_line()),
            )
            .style(Theme::text());
        frame.render_widget(card, area);
    }

    fn render_zoomed(&self, frame: &mut Frame, area: Rect) {
        let item = self.gallery.current();
        let mut lines = self.card_lines(item);
        lines.push(Line::from(""));
        lines.push(self.hint_line(item));

        let card = Paragraph::new(lines)
            .alignment(Alignment::Center)
            .wrap(Wrap { trim: true })
            .block(
                Block::default()
                    .borders(Borders::ALL)
                    .border_type(BorderType::Double)
                    .border_style(Theme::accent())
                    .title(Span::styled(" ⊕ ZOOM ", Theme::accent())),
            )
            .style(Theme::text());
        frame.render_widget(card, area);
    }

    /// Numbered thumbnails; the first nine get their digit shortcut
    fn render_strip(&self, frame: &mut Frame, area: Rect) {
        let current = self.gallery.index();
        let inner_width = area.width.saturating_sub(2);
        let spans: Vec<Span> = self
            .visible_thumbnails(inner_width)
            .into_iter()
            .map(|(i, label)| {
                let style = if i == current {
                    Theme::thumb_active()
                } else {
                    Theme::thumb()
                };
                Span::styled(label, style)
            })
            .collect();

        let strip = Paragraph::new(Line::from(spans)).block(
            Block::default()
                .borders(Borders::ALL)
                .border_type(BorderType::Rounded)
                .border_style(Theme::border()),
        );
        frame.render_widget(strip, area);
    }
}
