//! HTTP request handlers.

pub mod auth;
pub mod groups;
pub mod meetings;
pub mod time_slots;
pub mod users;

/// Liveness probe.
pub async fn health_check() -> &'static str {
    "OK"
}
