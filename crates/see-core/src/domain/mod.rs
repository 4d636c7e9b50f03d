//! Domain layer
//!
//! Credential protection, domain list caching and share history.

pub mod domains;
pub mod history;
pub mod security;
