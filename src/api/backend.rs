//! Portfolio backend client
//!
//! Talks to a Supabase-compatible backend: PostgREST tables under
//! `/rest/v1` and blob storage under `/storage/v1`.

use reqwest::{Method, RequestBuilder, StatusCode};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use thiserror::Error;

use crate::models::{sort_media, Category, MediaItem, NewMediaItem, Section};

pub const CATEGORIES_TABLE: &str = "portfolio_categories";
pub const MEDIA_TABLE: &str = "portfolio_images";
pub const SECTIONS_TABLE: &str = "sections";
pub const ROLES_TABLE: &str = "user_roles";

/// Backend error types
#[derive(Error, Debug)]
pub enum BackendError {
    #[error("Not found")]
    NotFound,

    #[error("Not authorized ({0})")]
    Unauthorized(u16),

    #[error("Backend error {status}: {message}")]
    Status { status: u16, message: String },

    #[error("Invalid response: {0}")]
    InvalidResponse(String),

    #[error("Request failed: {0}")]
    RequestFailed(#[from] reqwest::Error),
}

impl BackendError {
    /// Whether the failure came from the network layer rather than the backend
    pub fn is_network(&self) -> bool {
        matches!(self, BackendError::RequestFailed(_))
    }
}

/// Equality filter on a table column (`col=eq.value`)
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Filter {
    pub column: String,
    pub value: String,
}

impl Filter {
    pub fn eq(column: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            column: column.into(),
            value: value.into(),
        }
    }

    fn to_query(&self) -> String {
        format!(
            "{}=eq.{}",
            urlencoding::encode(&self.column),
            urlencoding::encode(&self.value)
        )
    }
}

/// A table read: `{table, filter, order}`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TableQuery {
    pub table: String,
    pub filters: Vec<Filter>,
    pub order_by: Option<String>,
    pub select: String,
}

impl TableQuery {
    pub fn new(table: impl Into<String>) -> Self {
        Self {
            table: table.into(),
            filters: Vec::new(),
            order_by: None,
            select: "*".to_string(),
        }
    }

    pub fn filter(mut self, filter: Filter) -> Self {
        self.filters.push(filter);
        self
    }

    /// Ascending order on a column
    pub fn order(mut self, column: impl Into<String>) -> Self {
        self.order_by = Some(column.into());
        self
    }

    pub fn select(mut self, columns: impl Into<String>) -> Self {
        self.select = columns.into();
        self
    }

    /// Endpoint path with query string
    pub fn endpoint(&self) -> String {
        let mut parts = vec![format!("select={}", urlencoding::encode(&self.select))];
        parts.extend(self.filters.iter().map(Filter::to_query));
        if let Some(ref col) = self.order_by {
            parts.push(format!("order={}.asc", urlencoding::encode(col)));
        }
        format!("/rest/v1/{}?{}", self.table, parts.join("&"))
    }
}

/// Table and storage client
#[derive(Debug, Clone)]
pub struct BackendClient {
    base_url: String,
    anon_key: String,
    access_token: Option<String>,
    bucket: String,
    client: reqwest::Client,
}

impl BackendClient {
    /// Create a new client for the given project URL and anon key
    pub fn new(base_url: impl Into<String>, anon_key: impl Into<String>) -> Self {
        let base_url: String = base_url.into();
        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            anon_key: anon_key.into(),
            access_token: None,
            bucket: crate::config::DEFAULT_BUCKET.to_string(),
            client: reqwest::Client::builder()
                .timeout(Duration::from_secs(30))
                .build()
                .unwrap_or_default(),
        }
    }

    /// Build a client from the loaded configuration
    pub fn from_config(config: &crate::config::Config) -> anyhow::Result<Self> {
        let client = Self::new(config.require_backend_url()?, config.require_anon_key()?)
            .with_bucket(config.storage_bucket.clone());
        Ok(match config.access_token {
            Some(ref token) if !token.is_empty() => client.with_access_token(token.clone()),
            _ => client,
        })
    }

    /// Authenticate requests as a signed-in user
    pub fn with_access_token(mut self, token: impl Into<String>) -> Self {
        self.access_token = Some(token.into());
        self
    }

    pub fn with_bucket(mut self, bucket: impl Into<String>) -> Self {
        self.bucket = bucket.into();
        self
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn access_token(&self) -> Option<&str> {
        self.access_token.as_deref()
    }

    pub fn anon_key(&self) -> &str {
        &self.anon_key
    }

    pub(crate) fn http(&self) -> &reqwest::Client {
        &self.client
    }

    fn bearer(&self) -> &str {
        self.access_token.as_deref().unwrap_or(&self.anon_key)
    }

    fn request(&self, method: Method, endpoint: &str) -> RequestBuilder {
        let url = format!("{}{}", self.base_url, endpoint);
        self.client
            .request(method, url)
            .header("apikey", &self.anon_key)
            .header("Authorization", format!("Bearer {}", self.bearer()))
            .header("Accept", "application/json")
    }

    /// Send a request and map non-2xx statuses to typed errors
    async fn send(&self, builder: RequestBuilder) -> Result<String, BackendError> {
        let response = builder.send().await?;
        let status = response.status();
        let body = response.text().await?;

        if status.is_success() {
            return Ok(body);
        }

        tracing::debug!(status = status.as_u16(), body = %body, "backend request failed");
        Err(match status {
            StatusCode::NOT_FOUND => BackendError::NotFound,
            StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => {
                BackendError::Unauthorized(status.as_u16())
            }
            status => BackendError::Status {
                status: status.as_u16(),
                message: error_message(&body),
            },
        })
    }

    fn parse<T: DeserializeOwned>(body: &str) -> Result<T, BackendError> {
        serde_json::from_str(body)
            .map_err(|e| BackendError::InvalidResponse(format!("JSON parse error: {}", e)))
    }

    // -------------------------------------------------------------------------
    // Generic table operations
    // -------------------------------------------------------------------------

    /// Run a table read and return the rows
    pub async fn select<T: DeserializeOwned>(&self, query: &TableQuery) -> Result<Vec<T>, BackendError> {
        let body = self.send(self.request(Method::GET, &query.endpoint())).await?;
        Self::parse(&body)
    }

    /// Insert one row and return it as stored
    pub async fn insert<T: Serialize, R: DeserializeOwned>(
        &self,
        table: &str,
        row: &T,
    ) -> Result<R, BackendError> {
        let endpoint = format!("/rest/v1/{}", table);
        let builder = self
            .request(Method::POST, &endpoint)
            .header("Prefer", "return=representation")
            .json(&[row]);
        let body = self.send(builder).await?;
        let mut rows: Vec<R> = Self::parse(&body)?;
        if rows.is_empty() {
            return Err(BackendError::InvalidResponse("insert returned no rows".into()));
        }
        Ok(rows.remove(0))
    }

    /// Patch the row with the given id
    pub async fn update<T: Serialize>(&self, table: &str, id: &str, patch: &T) -> Result<(), BackendError> {
        let endpoint = format!("/rest/v1/{}?{}", table, Filter::eq("id", id).to_query());
        self.send(self.request(Method::PATCH, &endpoint).json(patch))
            .await?;
        Ok(())
    }

    /// Delete the row with the given id
    pub async fn delete(&self, table: &str, id: &str) -> Result<(), BackendError> {
        self.delete_where(table, &Filter::eq("id", id)).await
    }

    /// Delete every row matching `filter`; matching nothing is not an error
    pub async fn delete_where(&self, table: &str, filter: &Filter) -> Result<(), BackendError> {
        let endpoint = format!("/rest/v1/{}?{}", table, filter.to_query());
        self.send(self.request(Method::DELETE, &endpoint)).await?;
        Ok(())
    }

    // -------------------------------------------------------------------------
    // Portfolio reads
    // -------------------------------------------------------------------------

    /// All categories in display order
    pub async fn categories(&self) -> Result<Vec<Category>, BackendError> {
        let query = TableQuery::new(CATEGORIES_TABLE).order("order_index");
        let mut categories: Vec<Category> = self.select(&query).await?;
        categories.sort_by_key(|c| c.order_index);
        Ok(categories)
    }

    /// Media of one category, ascending by `order_index`.
    /// An unknown category yields an empty list.
    pub async fn media_for_category(&self, category_id: &str) -> Result<Vec<MediaItem>, BackendError> {
        let query = TableQuery::new(MEDIA_TABLE)
            .filter(Filter::eq("category_id", category_id))
            .order("order_index");
        let mut items: Vec<MediaItem> = self.select(&query).await?;
        sort_media(&mut items);
        Ok(items)
    }

    /// Single media row by id
    pub async fn media_item(&self, id: &str) -> Result<MediaItem, BackendError> {
        let query = TableQuery::new(MEDIA_TABLE).filter(Filter::eq("id", id));
        let rows: Vec<MediaItem> = self.select(&query).await?;
        rows.into_iter().next().ok_or(BackendError::NotFound)
    }

    /// All text sections in display order
    pub async fn sections(&self) -> Result<Vec<Section>, BackendError> {
        let query = TableQuery::new(SECTIONS_TABLE).order("order_index");
        let mut sections: Vec<Section> = self.select(&query).await?;
        sections.sort_by_key(|s| s.order_index);
        Ok(sections)
    }

    // -------------------------------------------------------------------------
    // Portfolio writes
    // -------------------------------------------------------------------------

    pub async fn insert_media(&self, item: &NewMediaItem) -> Result<MediaItem, BackendError> {
        self.insert(MEDIA_TABLE, item).await
    }

    pub async fn delete_media(&self, id: &str) -> Result<(), BackendError> {
        self.delete(MEDIA_TABLE, id).await
    }

    /// Delete a category and its works. Works go first so none is left
    /// pointing at a missing category.
    pub async fn delete_category(&self, id: &str) -> Result<(), BackendError> {
        self.delete_where(MEDIA_TABLE, &Filter::eq("category_id", id))
            .await?;
        self.delete(CATEGORIES_TABLE, id).await
    }

    /// Make `image_url` the cover of a category
    pub async fn set_category_cover(&self, category_id: &str, image_url: &str) -> Result<(), BackendError> {
        self.update(
            CATEGORIES_TABLE,
            category_id,
            &serde_json::json!({ "main_image_url": image_url }),
        )
        .await
    }

    /// Save the full text of a section
    pub async fn update_section(&self, section: &Section) -> Result<(), BackendError> {
        let patch = SectionPatch {
            title_ru: section.title_ru.as_deref(),
            title_en: section.title_en.as_deref(),
            description_ru: section.description_ru.as_deref(),
            description_en: section.description_en.as_deref(),
        };
        self.update(SECTIONS_TABLE, &section.id, &patch).await
    }

    // -------------------------------------------------------------------------
    // Storage
    // -------------------------------------------------------------------------

    /// Upload a blob into the configured bucket; returns its public URL
    pub async fn upload_object(
        &self,
        path: &str,
        bytes: Vec<u8>,
        content_type: &str,
    ) -> Result<String, BackendError> {
        let endpoint = format!("/storage/v1/object/{}/{}", self.bucket, path);
        let builder = self
            .request(Method::POST, &endpoint)
            .header("Content-Type", content_type)
            .body(bytes);
        self.send(builder).await?;
        Ok(self.public_url(path))
    }

    /// Publicly resolvable URL of an object in the bucket
    pub fn public_url(&self, path: &str) -> String {
        format!(
            "{}/storage/v1/object/public/{}/{}",
            self.base_url, self.bucket, path
        )
    }
}

#[derive(Debug, Serialize)]
struct SectionPatch<'a> {
    title_ru: Option<&'a str>,
    title_en: Option<&'a str>,
    description_ru: Option<&'a str>,
    description_en: Option<&'a str>,
}

/// PostgREST and storage both return `{"message": ...}` on errors
#[derive(Debug, Deserialize)]
struct ErrorBody {
    message: Option<String>,
    error: Option<String>,
}

fn error_message(body: &str) -> String {
    serde_json::from_str::<ErrorBody>(body)
        .ok()
        .and_then(|b| b.message.or(b.error))
        .unwrap_or_else(|| body.chars().take(200).collect())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_table_query_endpoint() {
        let query = TableQuery::new(MEDIA_TABLE)
            .filter(Filter::eq("category_id", "abc 1"))
            .order("order_index");
        assert_eq!(
            query.endpoint(),
            "/rest/v1/portfolio_images?select=%2A&category_id=eq.abc%201&order=order_index.asc"
        );
    }

    #[test]
    fn test_table_query_custom_select() {
        let query = TableQuery::new(ROLES_TABLE).select("role");
        assert_eq!(query.endpoint(), "/rest/v1/user_roles?select=role");
    }

    #[test]
    fn test_public_url() {
        let client = BackendClient::new("https://proj.supabase.co/", "anon");
        assert_eq!(
            client.public_url("a.jpg"),
            "https://proj.supabase.co/storage/v1/object/public/portfolio-images/a.jpg"
        );
    }

    #[test]
    fn test_bearer_prefers_access_token() {
        let client = BackendClient::new("http://x", "anon");
        assert_eq!(client.bearer(), "anon");
        let client = client.with_access_token("token");
        assert_eq!(client.bearer(), "token");
    }

    #[test]
    fn test_error_message_extraction() {
        assert_eq!(error_message(r#"{"message":"duplicate key"}"#), "duplicate key");
        assert_eq!(error_message(r#"{"error":"Bucket not found"}"#), "Bucket not found");
        assert_eq!(error_message("plain failure"), "plain failure");
    }
}
