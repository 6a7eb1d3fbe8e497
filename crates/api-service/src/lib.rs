//! Convene API Service Library
//!
//! Backend of the Convene application: users, meetings, and groups with
//! JWT authentication, invitation workflows, and per-user scheduling.
//!
//! # Modules
//!
//! - `config` - Service configuration
//! - `errors` - Error types
//! - `handlers` - HTTP request handlers
//! - `middleware` - Authentication middleware
//! - `models` - Data models
//! - `repositories` - Database access layer
//! - `routes` - Router and application state
//! - `services` - Business logic layer

pub mod config;
pub mod errors;
pub mod handlers;
pub mod middleware;
pub mod models;
pub mod repositories;
pub mod routes;
pub mod services;
