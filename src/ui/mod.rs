//! Terminal UI components
//!
//! Built with ratatui. Keyboard-first navigation throughout; mouse drags in
//! the gallery stand in for touch swipes.

pub mod gallery;
pub mod picker;
pub mod sections;
pub mod theme;

pub use gallery::{GalleryHit, GalleryView};
pub use picker::PickerView;
pub use sections::SectionView;
pub use theme::Theme;

use ratatui::{
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::{Block, BorderType, Borders, Clear, Paragraph},
    Frame,
};

use crate::app::{App, AppState, InputMode};

/// Banner shown while edit mode is on
pub const EDIT_BANNER: &str = " ✎ EDIT MODE ";

/// Main render function - dispatches to view-specific renderers
pub fn render(frame: &mut Frame, app: &App) {
    let area = frame.area();

    frame.render_widget(Clear, area);
    frame.render_widget(Block::default().style(Style::default().bg(Theme::BACKGROUND)), area);

    // A zoomed item takes the whole screen
    if app.state == AppState::Gallery && app.gallery.is_zoomed() {
        if let Some(open) = app.gallery.gallery() {
            GalleryView::new(open, app.locale).render(frame, area);
        }
        render_overlays(frame, area, app);
        return;
    }

    let chunks = screen_layout(area);

    render_header(frame, chunks[0], app);
    render_content(frame, chunks[1], app);
    render_status_bar(frame, chunks[2], app);
    render_overlays(frame, area, app);
}

fn screen_layout(area: Rect) -> std::rc::Rc<[Rect]> {
    Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3), // Header
            Constraint::Min(1),    // Content
            Constraint::Length(1), // Status bar
        ])
        .split(area)
}

/// Which part of the open gallery is drawn at `(column, row)` on a screen
/// of size `area`
pub fn gallery_hit(app: &App, area: Rect, column: u16, row: u16) -> Option<GalleryHit> {
    if app.state != AppState::Gallery {
        return None;
    }
    let open = app.gallery.gallery()?;
    let view = GalleryView::new(open, app.locale);
    if open.is_zoomed() {
        return view.hit(area, column, row);
    }
    view.hit(screen_layout(area)[1], column, row)
}

fn render_overlays(frame: &mut Frame, area: Rect, app: &App) {
    if let Some(ref pending) = app.confirm {
        render_popup(frame, area, " CONFIRM ", pending.prompt(), Theme::warning());
    } else if let Some(ref error) = app.error {
        render_popup(frame, area, " ✗ ERROR ", error, Theme::error());
    }
}

/// Logo, current screen, locale and the edit banner
fn render_header(frame: &mut Frame, area: Rect, app: &App) {
    let screen = match app.state {
        AppState::Categories | AppState::Gallery => "PORTFOLIO",
        AppState::Sections => "ABOUT",
    };

    let mut spans = vec![
        Span::styled("ART", Style::default().fg(Theme::PRIMARY).add_modifier(Modifier::BOLD)),
        Span::styled("FOLIO", Style::default().fg(Theme::SECONDARY).add_modifier(Modifier::BOLD)),
        Span::styled(format!("  {}  ", screen), Theme::dimmed()),
        Span::styled(format!("[{}]", app.locale.code().to_uppercase()), Theme::accent()),
    ];
    if app.edit.is_enabled() {
        spans.push(Span::raw("  "));
        spans.push(Span::styled(EDIT_BANNER, Theme::edit_banner()));
    }

    let header = Paragraph::new(Line::from(spans)).alignment(Alignment::Left).block(
        Block::default()
            .borders(Borders::ALL)
            .border_type(BorderType::Rounded)
            .border_style(Theme::border()),
    );
    frame.render_widget(header, area);
}

fn render_content(frame: &mut Frame, area: Rect, app: &App) {
    match app.state {
        AppState::Categories => PickerView::new(&app.categories, app.locale).render(frame, area),
        AppState::Gallery => match app.gallery.gallery() {
            Some(open) => GalleryView::new(open, app.locale).render(frame, area),
            None => PickerView::new(&app.categories, app.locale).render(frame, area),
        },
        AppState::Sections => {
            SectionView::new(&app.sections, app.locale, app.view_mode()).render(frame, area)
        }
    }
}

/// Mode, capability, notices and key hints
fn render_status_bar(frame: &mut Frame, area: Rect, app: &App) {
    let mode_indicator = match app.input_mode {
        InputMode::Normal => Span::styled(
            " NORMAL ",
            Style::default().fg(Theme::BACKGROUND).bg(Theme::PRIMARY),
        ),
        InputMode::Editing => Span::styled(
            " INSERT ",
            Style::default().fg(Theme::BACKGROUND).bg(Theme::ACCENT),
        ),
    };

    let capability = Span::styled(
        format!(" {} ", app.edit.capability()),
        if app.edit.capability().is_admin() {
            Theme::success()
        } else {
            Theme::dimmed()
        },
    );

    let message = match app.notice {
        Some(ref notice) => Span::styled(format!(" {} ", notice), Theme::accent()),
        None => Span::styled(
            " q:quit  tab:sections  L:language  e:edit  r:reload ",
            Theme::dimmed(),
        ),
    };

    let status = Paragraph::new(Line::from(vec![
        mode_indicator,
        capability,
        Span::raw(" │ "),
        message,
    ]))
    .style(Theme::status_bar());
    frame.render_widget(status, area);
}

/// Centered popup used for errors and confirmations
fn render_popup(frame: &mut Frame, area: Rect, title: &str, message: &str, style: Style) {
    let popup_width = 60.min(area.width.saturating_sub(4));
    let popup_height = 5.min(area.height);

    let popup_area = Rect {
        x: area.x + (area.width.saturating_sub(popup_width)) / 2,
        y: area.y + (area.height.saturating_sub(popup_height)) / 2,
        width: popup_width,
        height: popup_height,
    };

    frame.render_widget(Clear, popup_area);

    let popup = Paragraph::new(vec![Line::from(""), Line::from(Span::styled(message.to_string(), style))])
        .alignment(Alignment::Center)
        .block(
            Block::default()
                .borders(Borders::ALL)
                .border_type(BorderType::Double)
                .border_style(style)
                .title(Span::styled(title.to_string(), style))
                .style(Style::default().bg(Theme::BACKGROUND)),
        );

    frame.render_widget(popup, popup_area);
}
