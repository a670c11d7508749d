//! API clients for the portfolio backend
//!
//! - Backend: table reads/writes and blob storage
//! - Auth: session lookup and admin role check

pub mod auth;
pub mod backend;

pub use auth::{AuthClient, AuthError, SessionUser};
pub use backend::{BackendClient, BackendError, Filter, TableQuery};
