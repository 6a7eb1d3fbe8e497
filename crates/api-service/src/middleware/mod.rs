//! Request middleware.

mod auth;

pub use auth::{require_auth, AuthUser};
