//! End-to-end flows
//!
//! Drives the app the way the event loop does: keys in, queued actions run
//! against a mocked backend through `tasks::perform`, resulting events
//! applied back to the app.

use crossterm::event::{KeyCode, KeyEvent, KeyModifiers, MouseButton, MouseEvent, MouseEventKind};
use mockito::{Matcher, Mock, Server};
use artfolio::access::Capability;
use artfolio::api::BackendClient;
use artfolio::app::{App, AppEvent, AppState, InputMode};
use artfolio::config::{Config, PlayerPreference};
use artfolio::tasks;

const CATEGORIES: &str = r#"[
    {"id": "c1", "name_ru": "Портреты", "name_en": "Portraits", "slug": "portraits", "order_index": 0},
    {"id": "c2", "name_ru": "Пейзажи", "name_en": "Landscapes", "slug": "landscapes", "order_index": 1}
]"#;

const SECTIONS: &str = r#"[
    {"id": "s1", "key": "about", "title_en": "About", "description_en": "Painter", "order_index": 0}
]"#;

const C1_MEDIA: &str = r#"[
    {"id": "m2", "category_id": "c1", "image_url": "https://cdn.test/2.jpg", "order_index": 1, "media_type": "image"},
    {"id": "m1", "category_id": "c1", "image_url": "https://cdn.test/1.jpg", "order_index": 0, "media_type": "image"},
    {"id": "m3", "category_id": "c1", "image_url": "https://cdn.test/3.mp4", "order_index": 2, "media_type": "video"}
]"#;

fn key(code: KeyCode) -> KeyEvent {
    KeyEvent::new(code, KeyModifiers::empty())
}

fn mouse(kind: MouseEventKind, column: u16) -> MouseEvent {
    MouseEvent {
        kind,
        column,
        row: 10,
        modifiers: KeyModifiers::empty(),
    }
}

/// Press and release the left button on one cell
fn click(app: &mut App, column: u16, row: u16) -> bool {
    let at = |kind| MouseEvent {
        kind,
        column,
        row,
        modifiers: KeyModifiers::empty(),
    };
    app.handle_mouse(at(MouseEventKind::Down(MouseButton::Left)));
    app.handle_mouse(at(MouseEventKind::Up(MouseButton::Left)))
}

/// Run every queued action and apply the results, like one loop iteration
async fn pump(app: &mut App, backend: &BackendClient) {
    loop {
        let actions = app.take_actions();
        if actions.is_empty() {
            break;
        }
        for action in actions {
            let event = tasks::perform(action, backend, PlayerPreference::Mpv).await;
            app.apply(event);
        }
    }
}

async fn mock_reads(server: &mut Server) -> Vec<Mock> {
    vec![
        server
            .mock("GET", "/rest/v1/portfolio_categories")
            .match_query(Matcher::Any)
            .with_status(200)
            .with_body(CATEGORIES)
            .create_async()
            .await,
        server
            .mock("GET", "/rest/v1/sections")
            .match_query(Matcher::Any)
            .with_status(200)
            .with_body(SECTIONS)
            .create_async()
            .await,
        server
            .mock("GET", "/rest/v1/portfolio_images")
            .match_query(Matcher::UrlEncoded("category_id".into(), "eq.c1".into()))
            .with_status(200)
            .with_body(C1_MEDIA)
            .create_async()
            .await,
        server
            .mock("GET", "/rest/v1/portfolio_images")
            .match_query(Matcher::UrlEncoded("category_id".into(), "eq.c2".into()))
            .with_status(200)
            .with_body("[]")
            .create_async()
            .await,
    ]
}

fn config_for(server: &Server) -> Config {
    Config {
        backend_url: Some(server.url()),
        anon_key: Some("anon".into()),
        ..Config::default()
    }
}

// =============================================================================
// Visitor flows
// =============================================================================

#[tokio::test]
async fn test_browse_category_and_swipe() {
    let mut server = Server::new_async().await;
    let _mocks = mock_reads(&mut server).await;
    let config = config_for(&server);
    let backend = BackendClient::from_config(&config).unwrap();

    let mut app = App::from_config(&config);
    pump(&mut app, &backend).await;
    assert_eq!(app.categories.items.len(), 2);
    assert_eq!(app.sections.items.len(), 1);

    // Viewer opens only once the media has arrived, sorted
    app.handle_key(key(KeyCode::Enter));
    assert_eq!(app.state, AppState::Categories);
    pump(&mut app, &backend).await;
    assert_eq!(app.state, AppState::Gallery);
    assert_eq!(app.gallery.current().map(|m| m.id.as_str()), Some("m1"));

    // 8px per column: 7 columns = 56px is a swipe, 6 columns = 48px is not
    app.handle_mouse(mouse(MouseEventKind::Down(MouseButton::Left), 40));
    app.handle_mouse(mouse(MouseEventKind::Drag(MouseButton::Left), 33));
    app.handle_mouse(mouse(MouseEventKind::Up(MouseButton::Left), 33));
    assert_eq!(app.gallery.index(), Some(1));

    app.handle_mouse(mouse(MouseEventKind::Down(MouseButton::Left), 40));
    app.handle_mouse(mouse(MouseEventKind::Drag(MouseButton::Left), 46));
    app.handle_mouse(mouse(MouseEventKind::Up(MouseButton::Left), 46));
    assert_eq!(app.gallery.index(), Some(1));

    // Wraps around from the last item
    app.handle_key(key(KeyCode::Right));
    app.handle_key(key(KeyCode::Right));
    assert_eq!(app.gallery.index(), Some(0));

    app.handle_key(key(KeyCode::Esc));
    assert_eq!(app.state, AppState::Categories);
    assert!(!app.gallery.is_open());
}

// 80x24 screen: the card spans rows 3-19, the strip's thumbnails sit on
// row 21 starting at column 1, four columns each for single digits.

#[tokio::test]
async fn test_click_on_card_toggles_zoom() {
    let mut server = Server::new_async().await;
    let _mocks = mock_reads(&mut server).await;
    let config = config_for(&server);
    let backend = BackendClient::from_config(&config).unwrap();

    let mut app = App::from_config(&config);
    pump(&mut app, &backend).await;
    app.handle_key(key(KeyCode::Enter));
    pump(&mut app, &backend).await;

    assert!(click(&mut app, 40, 10));
    assert!(app.gallery.is_zoomed());

    // Zoomed, the card is the whole screen
    assert!(click(&mut app, 2, 22));
    assert!(!app.gallery.is_zoomed());
    assert_eq!(app.gallery.index(), Some(0));
}

#[tokio::test]
async fn test_click_on_thumbnail_jumps() {
    let mut server = Server::new_async().await;
    let _mocks = mock_reads(&mut server).await;
    let config = config_for(&server);
    let backend = BackendClient::from_config(&config).unwrap();

    let mut app = App::from_config(&config);
    pump(&mut app, &backend).await;
    app.handle_key(key(KeyCode::Enter));
    pump(&mut app, &backend).await;

    assert!(click(&mut app, 6, 21));
    assert_eq!(app.gallery.index(), Some(1));

    // Past the last thumbnail
    assert!(!click(&mut app, 60, 21));
    assert_eq!(app.gallery.index(), Some(1));

    // The video is the third thumbnail; clicking its card does not zoom
    assert!(click(&mut app, 10, 21));
    assert_eq!(app.gallery.current().map(|m| m.id.as_str()), Some("m3"));
    assert!(!click(&mut app, 40, 10));
    assert!(!app.gallery.is_zoomed());
}

#[tokio::test]
async fn test_click_follows_viewport() {
    let mut server = Server::new_async().await;
    let _mocks = mock_reads(&mut server).await;
    let config = config_for(&server);
    let backend = BackendClient::from_config(&config).unwrap();

    let mut app = App::from_config(&config);
    pump(&mut app, &backend).await;
    app.handle_key(key(KeyCode::Enter));
    pump(&mut app, &backend).await;

    // On a 120x40 screen row 21 is inside the card and the strip is on row 37
    app.set_viewport(ratatui::layout::Rect::new(0, 0, 120, 40));
    assert!(click(&mut app, 6, 37));
    assert_eq!(app.gallery.index(), Some(1));
    assert!(click(&mut app, 6, 21));
    assert!(app.gallery.is_zoomed());
}

#[tokio::test]
async fn test_empty_category_shows_notice() {
    let mut server = Server::new_async().await;
    let _mocks = mock_reads(&mut server).await;
    let config = config_for(&server);
    let backend = BackendClient::from_config(&config).unwrap();

    let mut app = App::from_config(&config);
    pump(&mut app, &backend).await;

    app.handle_key(key(KeyCode::Down));
    app.handle_key(key(KeyCode::Enter));
    pump(&mut app, &backend).await;

    assert_eq!(app.state, AppState::Categories);
    assert!(!app.gallery.is_open());
    assert_eq!(app.notice.as_deref(), Some("No works in this category yet"));
}

#[tokio::test]
async fn test_media_failure_keeps_viewer_closed() {
    let mut server = Server::new_async().await;
    server
        .mock("GET", "/rest/v1/portfolio_images")
        .match_query(Matcher::Any)
        .with_status(500)
        .with_body(r#"{"message": "boom"}"#)
        .create_async()
        .await;
    let backend = BackendClient::new(server.url(), "anon");

    let mut app = App::new();
    app.apply(AppEvent::Categories(Ok(vec![])));
    app.activate_category("c1");
    pump(&mut app, &backend).await;

    assert!(!app.gallery.is_open());
    assert!(app.error.as_deref().is_some_and(|e| e.contains("retry")));
}

#[tokio::test]
async fn test_late_response_for_abandoned_category_is_ignored() {
    let mut server = Server::new_async().await;
    let _mocks = mock_reads(&mut server).await;
    let backend = BackendClient::new(server.url(), "anon");

    let mut app = App::new();
    app.activate_category("c1");
    let slow = app.take_actions();
    app.activate_category("c2");
    let fast = app.take_actions();

    // Both fetches in flight at once; c2 (empty) is applied first, c1 late
    let handles = fast
        .into_iter()
        .chain(slow)
        .map(|action| tasks::perform(action, &backend, PlayerPreference::Mpv));
    let events = futures::future::join_all(handles).await;
    for event in events {
        app.apply(event);
    }

    assert!(!app.gallery.is_open());
    assert_eq!(app.store.selected(), Some("c2"));
}

// =============================================================================
// Admin flows
// =============================================================================

#[tokio::test]
async fn test_admin_deletes_current_item() {
    let mut server = Server::new_async().await;
    let _mocks = mock_reads(&mut server).await;
    let delete = server
        .mock("DELETE", "/rest/v1/portfolio_images")
        .match_query(Matcher::UrlEncoded("id".into(), "eq.m1".into()))
        .match_header("authorization", "Bearer admin-token")
        .with_status(204)
        .expect(1)
        .create_async()
        .await;
    let backend = BackendClient::new(server.url(), "anon").with_access_token("admin-token");

    let mut app = App::from_config(&config_for(&server));
    app.apply(AppEvent::Capability(Capability::Admin));
    pump(&mut app, &backend).await;
    app.handle_key(key(KeyCode::Char('e')));
    assert!(app.edit.is_enabled());

    app.handle_key(key(KeyCode::Enter));
    pump(&mut app, &backend).await;
    assert_eq!(app.gallery.gallery().map(|g| g.len()), Some(3));

    // Declining sends nothing
    app.handle_key(key(KeyCode::Char('x')));
    app.handle_key(key(KeyCode::Char('n')));
    assert!(app.take_actions().is_empty());

    app.handle_key(key(KeyCode::Char('x')));
    app.handle_key(key(KeyCode::Char('y')));
    pump(&mut app, &backend).await;

    delete.assert_async().await;
    let open = app.gallery.gallery().unwrap();
    assert_eq!(open.len(), 2);
    assert!(open.items().iter().all(|m| m.id != "m1"));
    assert_eq!(app.store.current_items().len(), 2);
}

#[tokio::test]
async fn test_admin_sets_cover() {
    let mut server = Server::new_async().await;
    let _mocks = mock_reads(&mut server).await;
    let patch = server
        .mock("PATCH", "/rest/v1/portfolio_categories")
        .match_query(Matcher::UrlEncoded("id".into(), "eq.c1".into()))
        .match_body(Matcher::Regex("https://cdn.test/1.jpg".into()))
        .with_status(204)
        .expect(1)
        .create_async()
        .await;
    let backend = BackendClient::new(server.url(), "anon");

    let mut app = App::from_config(&config_for(&server));
    app.apply(AppEvent::Capability(Capability::Admin));
    pump(&mut app, &backend).await;
    app.handle_key(key(KeyCode::Char('e')));
    app.handle_key(key(KeyCode::Enter));
    pump(&mut app, &backend).await;

    app.handle_key(key(KeyCode::Char('c')));
    pump(&mut app, &backend).await;

    patch.assert_async().await;
    assert_eq!(
        app.categories.find("c1").and_then(|c| c.main_image_url.as_deref()),
        Some("https://cdn.test/1.jpg")
    );
}

#[tokio::test]
async fn test_admin_edits_section_text() {
    let mut server = Server::new_async().await;
    let _mocks = mock_reads(&mut server).await;
    let patch = server
        .mock("PATCH", "/rest/v1/sections")
        .match_query(Matcher::UrlEncoded("id".into(), "eq.s1".into()))
        .match_body(Matcher::Regex(r#""description_en":"Painter!""#.into()))
        .with_status(204)
        .expect(1)
        .create_async()
        .await;
    let backend = BackendClient::new(server.url(), "anon");

    let mut app = App::from_config(&config_for(&server));
    app.apply(AppEvent::Capability(Capability::Admin));
    pump(&mut app, &backend).await;
    app.handle_key(key(KeyCode::Char('e')));
    app.handle_key(key(KeyCode::Tab));
    app.handle_key(key(KeyCode::Enter));
    assert_eq!(app.input_mode, InputMode::Editing);

    app.handle_key(key(KeyCode::End));
    app.handle_key(key(KeyCode::Char('!')));
    app.handle_key(key(KeyCode::Enter));
    pump(&mut app, &backend).await;

    patch.assert_async().await;
    assert_eq!(app.sections.items[0].description_en.as_deref(), Some("Painter!"));
    assert_eq!(app.notice.as_deref(), Some("Saved"));
}

#[tokio::test]
async fn test_visitor_cannot_enter_edit_mode() {
    let mut app = App::new();
    app.apply(AppEvent::Capability(Capability::Visitor));
    app.handle_key(key(KeyCode::Char('e')));
    assert!(!app.edit.is_enabled());
    assert!(app.take_actions().is_empty());
}

#[tokio::test]
async fn test_capability_resolution_event() {
    let server = Server::new_async().await;
    let backend = BackendClient::new(server.url(), "anon");
    // No access token: visitor without any request
    assert_eq!(
        tasks::resolve_capability(&backend).await,
        AppEvent::Capability(Capability::Visitor)
    );
}

#[tokio::test]
async fn test_reload_key_refetches() {
    let mut server = Server::new_async().await;
    let categories = server
        .mock("GET", "/rest/v1/portfolio_categories")
        .match_query(Matcher::Any)
        .with_status(200)
        .with_body(CATEGORIES)
        .expect(2)
        .create_async()
        .await;
    server
        .mock("GET", "/rest/v1/sections")
        .match_query(Matcher::Any)
        .with_status(200)
        .with_body(SECTIONS)
        .create_async()
        .await;
    let backend = BackendClient::new(server.url(), "anon");

    let mut app = App::from_config(&config_for(&server));
    pump(&mut app, &backend).await;
    app.handle_key(key(KeyCode::Char('r')));
    assert!(app.categories.loading.is_loading());
    pump(&mut app, &backend).await;
    assert!(!app.categories.loading.is_loading());

    categories.assert_async().await;
}
