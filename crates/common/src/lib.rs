//! Common utilities and types shared across Convene components.

#![warn(clippy::pedantic)]

/// Module for JWT utilities (claims, token kinds, encode/decode)
pub mod jwt;
