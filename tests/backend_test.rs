//! Backend and auth client tests
//!
//! Tests table reads/writes, storage upload, error mapping and capability
//! resolution against a mocked backend.

use mockito::{Matcher, Server};
use artfolio::access::Capability;
use artfolio::api::{AuthClient, AuthError, BackendClient, BackendError};
use artfolio::models::{MediaKind, NewMediaItem};

const CATEGORIES: &str = r#"[
    {"id": "c2", "name_ru": "Пейзажи", "name_en": "Landscapes", "slug": "landscapes", "main_image_url": null, "order_index": 2},
    {"id": "c1", "name_ru": "Портреты", "name_en": "Portraits", "slug": "portraits", "main_image_url": "https://cdn.test/p.jpg", "order_index": 1}
]"#;

const MEDIA: &str = r#"[
    {"id": "m3", "category_id": "c1", "image_url": "https://cdn.test/3.mp4", "order_index": 3, "media_type": "video"},
    {"id": "m1", "category_id": "c1", "image_url": "https://cdn.test/1.jpg", "title_en": "Dawn", "order_index": 1, "media_type": "image"},
    {"id": "m2", "category_id": "c1", "image_url": "https://cdn.test/2.jpg", "order_index": 2, "media_type": "image"}
]"#;

fn client(server: &Server) -> BackendClient {
    BackendClient::new(server.url(), "anon-key")
}

// =============================================================================
// Reads
// =============================================================================

#[tokio::test]
async fn test_categories_sorted_by_order_index() {
    let mut server = Server::new_async().await;
    let mock = server
        .mock("GET", "/rest/v1/portfolio_categories")
        .match_query(Matcher::UrlEncoded("order".into(), "order_index.asc".into()))
        .match_header("apikey", "anon-key")
        .match_header("authorization", "Bearer anon-key")
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(CATEGORIES)
        .create_async()
        .await;

    let categories = client(&server).categories().await.unwrap();

    mock.assert_async().await;
    assert_eq!(categories.len(), 2);
    assert_eq!(categories[0].slug, "portraits");
    assert!(categories[0].has_cover());
    assert!(!categories[1].has_cover());
}

#[tokio::test]
async fn test_media_filtered_and_sorted() {
    let mut server = Server::new_async().await;
    let mock = server
        .mock("GET", "/rest/v1/portfolio_images")
        .match_query(Matcher::AllOf(vec![
            Matcher::UrlEncoded("category_id".into(), "eq.c1".into()),
            Matcher::UrlEncoded("order".into(), "order_index.asc".into()),
        ]))
        .with_status(200)
        .with_body(MEDIA)
        .create_async()
        .await;

    let items = client(&server).media_for_category("c1").await.unwrap();

    mock.assert_async().await;
    let ids: Vec<&str> = items.iter().map(|m| m.id.as_str()).collect();
    assert_eq!(ids, ["m1", "m2", "m3"]);
    assert_eq!(items[2].media_type, MediaKind::Video);
    assert_eq!(items[0].title_en.as_deref(), Some("Dawn"));
}

#[tokio::test]
async fn test_unknown_category_yields_empty_list() {
    let mut server = Server::new_async().await;
    server
        .mock("GET", "/rest/v1/portfolio_images")
        .match_query(Matcher::Any)
        .with_status(200)
        .with_body("[]")
        .create_async()
        .await;

    let items = client(&server).media_for_category("nope").await.unwrap();
    assert!(items.is_empty());
}

#[tokio::test]
async fn test_media_item_missing_is_not_found() {
    let mut server = Server::new_async().await;
    server
        .mock("GET", "/rest/v1/portfolio_images")
        .match_query(Matcher::UrlEncoded("id".into(), "eq.m9".into()))
        .with_status(200)
        .with_body("[]")
        .create_async()
        .await;

    let err = client(&server).media_item("m9").await.unwrap_err();
    assert!(matches!(err, BackendError::NotFound));
}

#[tokio::test]
async fn test_sections_parse() {
    let mut server = Server::new_async().await;
    server
        .mock("GET", "/rest/v1/sections")
        .match_query(Matcher::Any)
        .with_status(200)
        .with_body(
            r#"[
                {"id": "s2", "key": "prices", "title_en": "Prices", "order_index": 2},
                {"id": "s1", "key": "about", "title_ru": "Обо мне", "description_ru": "Художник", "order_index": 1}
            ]"#,
        )
        .create_async()
        .await;

    let sections = client(&server).sections().await.unwrap();
    assert_eq!(sections[0].key, "about");
    assert_eq!(sections[1].key, "prices");
}

// =============================================================================
// Errors
// =============================================================================

#[tokio::test]
async fn test_server_error_maps_to_status() {
    let mut server = Server::new_async().await;
    server
        .mock("GET", "/rest/v1/portfolio_categories")
        .match_query(Matcher::Any)
        .with_status(500)
        .with_body(r#"{"message": "database unavailable"}"#)
        .create_async()
        .await;

    match client(&server).categories().await {
        Err(BackendError::Status { status, message }) => {
            assert_eq!(status, 500);
            assert_eq!(message, "database unavailable");
        }
        other => panic!("Expected status error, got {:?}", other),
    }
}

#[tokio::test]
async fn test_unauthorized_write() {
    let mut server = Server::new_async().await;
    server
        .mock("DELETE", "/rest/v1/portfolio_images")
        .match_query(Matcher::Any)
        .with_status(401)
        .create_async()
        .await;

    let err = client(&server).delete_media("m1").await.unwrap_err();
    assert!(matches!(err, BackendError::Unauthorized(401)));
}

#[tokio::test]
async fn test_invalid_json() {
    let mut server = Server::new_async().await;
    server
        .mock("GET", "/rest/v1/portfolio_categories")
        .match_query(Matcher::Any)
        .with_status(200)
        .with_body("not json")
        .create_async()
        .await;

    let err = client(&server).categories().await.unwrap_err();
    assert!(matches!(err, BackendError::InvalidResponse(_)));
}

#[tokio::test]
async fn test_network_failure() {
    let backend = BackendClient::new("http://127.0.0.1:9", "anon-key");
    let err = backend.categories().await.unwrap_err();
    assert!(err.is_network());
}

// =============================================================================
// Writes
// =============================================================================

#[tokio::test]
async fn test_insert_media_returns_row() {
    let mut server = Server::new_async().await;
    let mock = server
        .mock("POST", "/rest/v1/portfolio_images")
        .match_header("prefer", "return=representation")
        .match_header("authorization", "Bearer admin-token")
        .match_body(Matcher::AllOf(vec![
            Matcher::Regex(r#"^\[\{"#.into()),
            Matcher::Regex(r#""order_index":4"#.into()),
            Matcher::Regex(r#""media_type":"video""#.into()),
        ]))
        .with_status(201)
        .with_body(
            r#"[{"id": "m4", "category_id": "c1", "image_url": "https://cdn.test/4.mp4", "order_index": 4, "media_type": "video"}]"#,
        )
        .create_async()
        .await;

    let backend = client(&server).with_access_token("admin-token");
    let row = NewMediaItem::untitled("c1", "https://cdn.test/4.mp4", 4, MediaKind::Video);
    let item = backend.insert_media(&row).await.unwrap();

    mock.assert_async().await;
    assert_eq!(item.id, "m4");
    assert!(item.is_video());
}

#[tokio::test]
async fn test_set_category_cover_patches_row() {
    let mut server = Server::new_async().await;
    let mock = server
        .mock("PATCH", "/rest/v1/portfolio_categories")
        .match_query(Matcher::UrlEncoded("id".into(), "eq.c1".into()))
        .match_body(Matcher::Json(serde_json::json!({
            "main_image_url": "https://cdn.test/2.jpg"
        })))
        .with_status(204)
        .create_async()
        .await;

    client(&server)
        .set_category_cover("c1", "https://cdn.test/2.jpg")
        .await
        .unwrap();
    mock.assert_async().await;
}

#[tokio::test]
async fn test_delete_category_removes_its_works() {
    let mut server = Server::new_async().await;
    let works = server
        .mock("DELETE", "/rest/v1/portfolio_images")
        .match_query(Matcher::UrlEncoded("category_id".into(), "eq.c2".into()))
        .with_status(204)
        .expect(1)
        .create_async()
        .await;
    let mock = server
        .mock("DELETE", "/rest/v1/portfolio_categories")
        .match_query(Matcher::UrlEncoded("id".into(), "eq.c2".into()))
        .with_status(204)
        .expect(1)
        .create_async()
        .await;

    client(&server).delete_category("c2").await.unwrap();
    works.assert_async().await;
    mock.assert_async().await;
}

#[tokio::test]
async fn test_delete_category_keeps_row_when_works_fail() {
    let mut server = Server::new_async().await;
    server
        .mock("DELETE", "/rest/v1/portfolio_images")
        .match_query(Matcher::Any)
        .with_status(500)
        .with_body(r#"{"message": "boom"}"#)
        .create_async()
        .await;
    let category = server
        .mock("DELETE", "/rest/v1/portfolio_categories")
        .match_query(Matcher::Any)
        .expect(0)
        .create_async()
        .await;

    let err = client(&server).delete_category("c2").await.unwrap_err();
    assert!(matches!(err, BackendError::Status { status: 500, .. }));
    category.assert_async().await;
}

#[tokio::test]
async fn test_upload_object_returns_public_url() {
    let mut server = Server::new_async().await;
    let mock = server
        .mock("POST", "/storage/v1/object/portfolio/abc.jpg")
        .match_header("content-type", "image/jpeg")
        .match_body("bytes")
        .with_status(200)
        .with_body(r#"{"Key": "portfolio/abc.jpg"}"#)
        .create_async()
        .await;

    let url = client(&server)
        .with_bucket("portfolio")
        .upload_object("abc.jpg", b"bytes".to_vec(), "image/jpeg")
        .await
        .unwrap();

    mock.assert_async().await;
    assert_eq!(
        url,
        format!("{}/storage/v1/object/public/portfolio/abc.jpg", server.url())
    );
}

// =============================================================================
// Auth
// =============================================================================

async fn mock_user(server: &mut Server) -> mockito::Mock {
    server
        .mock("GET", "/auth/v1/user")
        .match_header("authorization", "Bearer token-1")
        .with_status(200)
        .with_body(r#"{"id": "u1", "email": "artist@example.com"}"#)
        .create_async()
        .await
}

#[tokio::test]
async fn test_capability_admin() {
    let mut server = Server::new_async().await;
    mock_user(&mut server).await;
    server
        .mock("GET", "/rest/v1/user_roles")
        .match_query(Matcher::AllOf(vec![
            Matcher::UrlEncoded("user_id".into(), "eq.u1".into()),
            Matcher::UrlEncoded("role".into(), "eq.admin".into()),
        ]))
        .with_status(200)
        .with_body(r#"[{"role": "admin"}]"#)
        .create_async()
        .await;

    let backend = client(&server).with_access_token("token-1");
    let capability = AuthClient::new(&backend).capability().await.unwrap();
    assert_eq!(capability, Capability::Admin);
}

#[tokio::test]
async fn test_capability_signed_in_without_role() {
    let mut server = Server::new_async().await;
    mock_user(&mut server).await;
    server
        .mock("GET", "/rest/v1/user_roles")
        .match_query(Matcher::Any)
        .with_status(200)
        .with_body("[]")
        .create_async()
        .await;

    let backend = client(&server).with_access_token("token-1");
    let capability = AuthClient::new(&backend).capability().await.unwrap();
    assert_eq!(capability, Capability::Visitor);
}

#[tokio::test]
async fn test_no_session_is_visitor_without_requests() {
    let mut server = Server::new_async().await;
    let user = server
        .mock("GET", "/auth/v1/user")
        .expect(0)
        .create_async()
        .await;

    let backend = client(&server);
    let auth = AuthClient::new(&backend);
    assert!(matches!(auth.session_user().await, Err(AuthError::NoSession)));
    assert_eq!(auth.capability().await.unwrap(), Capability::Visitor);

    user.assert_async().await;
}

#[tokio::test]
async fn test_role_lookup_failure_degrades_to_visitor() {
    let mut server = Server::new_async().await;
    mock_user(&mut server).await;
    server
        .mock("GET", "/rest/v1/user_roles")
        .match_query(Matcher::Any)
        .with_status(500)
        .create_async()
        .await;

    let backend = client(&server).with_access_token("token-1");
    let auth = AuthClient::new(&backend);
    assert!(matches!(auth.capability().await, Err(AuthError::RoleLookup(_))));
    assert_eq!(auth.capability_or_visitor().await, Capability::Visitor);
}

#[tokio::test]
async fn test_expired_session() {
    let mut server = Server::new_async().await;
    server
        .mock("GET", "/auth/v1/user")
        .with_status(401)
        .create_async()
        .await;

    let backend = client(&server).with_access_token("stale");
    let result = AuthClient::new(&backend).session_user().await;
    assert!(matches!(result, Err(AuthError::InvalidSession)));
}
