//! S.EE Core Library
//!
//! This crate provides the core functionality for the S.EE integration, including:
//! - Encrypted API key storage
//! - Per-kind domain list caching (short URL, file, text)
//! - Bounded text and file share history
//! - S.EE API client (short URLs, file uploads, text shares)
//! - Request-scoped context with a memoized client
//! - Actions returning structured outcomes (settings, connection test, cleanup)

pub mod actions;
pub mod context;
pub mod domain;
pub mod remote;
pub mod settings;
pub mod storage;
pub mod config;
pub mod error;

#[cfg(test)]
mod test_support;
#[cfg(test)]
mod config_tests;

pub use error::{Error, Result};

/// Re-export commonly used types
pub mod prelude {
    pub use crate::actions::ActionOutcome;
    pub use crate::config::{Config, Environment};
    pub use crate::context::SeeContext;
    pub use crate::domain::domains::DomainKind;
    pub use crate::domain::history::HistoryKind;
    pub use crate::error::{Error, Result};
}
