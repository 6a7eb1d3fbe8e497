//! Business logic layer.

pub mod membership_service;
pub mod registration_service;
pub mod token_service;
