//! Session and role lookup
//!
//! Resolves the configured access token to a user, then checks the
//! `user_roles` table for an admin row. The rest of the app only sees
//! the resulting [`Capability`].

use reqwest::StatusCode;
use serde::Deserialize;
use thiserror::Error;

use super::backend::{BackendClient, BackendError, Filter, TableQuery, ROLES_TABLE};
use crate::access::Capability;

#[derive(Error, Debug)]
pub enum AuthError {
    #[error("No session (access token missing)")]
    NoSession,

    #[error("Session expired or invalid")]
    InvalidSession,

    #[error("Role lookup failed: {0}")]
    RoleLookup(#[from] BackendError),

    #[error("Request failed: {0}")]
    RequestFailed(#[from] reqwest::Error),
}

/// Signed-in user as reported by the auth service
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, serde::Serialize)]
pub struct SessionUser {
    pub id: String,
    #[serde(default)]
    pub email: Option<String>,
}

#[derive(Debug, Deserialize)]
struct RoleRow {
    role: String,
}

/// Auth collaborator
pub struct AuthClient<'a> {
    backend: &'a BackendClient,
}

impl<'a> AuthClient<'a> {
    pub fn new(backend: &'a BackendClient) -> Self {
        Self { backend }
    }

    /// Look up the user behind the access token
    pub async fn session_user(&self) -> Result<SessionUser, AuthError> {
        let token = self.backend.access_token().ok_or(AuthError::NoSession)?;
        let url = format!("{}/auth/v1/user", self.backend.base_url());

        let response = self
            .backend
            .http()
            .get(url)
            .header("apikey", self.backend.anon_key())
            .header("Authorization", format!("Bearer {}", token))
            .send()
            .await?;

        match response.status() {
            StatusCode::OK => Ok(response.json::<SessionUser>().await?),
            StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => Err(AuthError::InvalidSession),
            status => Err(AuthError::RoleLookup(BackendError::Status {
                status: status.as_u16(),
                message: "session lookup failed".into(),
            })),
        }
    }

    /// Whether `user_id` holds the admin role
    pub async fn is_admin(&self, user_id: &str) -> Result<bool, AuthError> {
        let query = TableQuery::new(ROLES_TABLE)
            .select("role")
            .filter(Filter::eq("user_id", user_id))
            .filter(Filter::eq("role", "admin"));
        let rows: Vec<RoleRow> = self.backend.select(&query).await?;
        Ok(rows.iter().any(|r| r.role == "admin"))
    }

    /// Resolve the capability for the configured session
    pub async fn capability(&self) -> Result<Capability, AuthError> {
        let user = match self.session_user().await {
            Ok(user) => user,
            Err(AuthError::NoSession) => return Ok(Capability::Visitor),
            Err(e) => return Err(e),
        };

        if self.is_admin(&user.id).await? {
            tracing::info!(user = %user.id, "admin session");
            Ok(Capability::Admin)
        } else {
            Ok(Capability::Visitor)
        }
    }

    /// Like [`capability`](Self::capability) but any failure degrades to visitor
    pub async fn capability_or_visitor(&self) -> Capability {
        match self.capability().await {
            Ok(cap) => cap,
            Err(e) => {
                tracing::warn!(error = %e, "admin check failed, continuing as visitor");
                Capability::Visitor
            }
        }
    }
}
