//! Host storage - persisted options and TTL'd transients
//!
//! The integration never owns a database. It reads and writes through two
//! key-value seams the host provides:
//!
//! - [`OptionStore`]: durable values (encrypted API key, settings, history)
//! - [`TransientStore`]: values that expire after a TTL (domain lists)
//!
//! Both offer last-writer-wins semantics and no locking across processes.
//!
//! # Implementations
//!
//! - `memory`: in-process maps, used by tests and short-lived hosts
//! - `file`: JSON files under the data directory, used by the CLI

pub mod file;
pub mod memory;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde_json::Value;
use std::sync::Mutex;
use std::time::Duration;

use crate::error::Result;

pub use file::{FileOptionStore, FileTransientStore};
pub use memory::{InMemoryOptionStore, InMemoryTransientStore};

/// Option names persisted by the integration
pub mod keys {
    pub const API_KEY: &str = "see_api_key";
    pub const API_BASE_URL: &str = "see_api_base_url";
    pub const DEFAULT_DOMAIN: &str = "see_default_domain";
    pub const DEFAULT_FILE_DOMAIN: &str = "see_default_file_domain";
    pub const DEFAULT_TEXT_DOMAIN: &str = "see_default_text_domain";
    pub const AUTO_SHORTEN: &str = "see_auto_shorten";
    pub const AUTO_UPLOAD: &str = "see_auto_upload";
    pub const TEXT_HISTORY: &str = "see_text_history";
    pub const FILE_HISTORY: &str = "see_file_history";

    /// Every option the integration writes
    pub const ALL_OPTIONS: [&str; 9] = [
        API_KEY,
        API_BASE_URL,
        DEFAULT_DOMAIN,
        DEFAULT_TEXT_DOMAIN,
        DEFAULT_FILE_DOMAIN,
        AUTO_SHORTEN,
        AUTO_UPLOAD,
        TEXT_HISTORY,
        FILE_HISTORY,
    ];

    pub const DOMAINS_CACHE: &str = "see_domains_cache";
    pub const FILE_DOMAINS_CACHE: &str = "see_file_domains_cache";
    pub const TEXT_DOMAINS_CACHE: &str = "see_text_domains_cache";

    /// Every transient the integration writes
    pub const ALL_TRANSIENTS: [&str; 3] = [DOMAINS_CACHE, FILE_DOMAINS_CACHE, TEXT_DOMAINS_CACHE];
}

/// Durable key-value option storage
#[async_trait]
pub trait OptionStore: Send + Sync {
    /// Read an option, `None` when it was never written or was deleted
    async fn get(&self, name: &str) -> Result<Option<Value>>;

    /// Write an option, replacing any previous value
    async fn set(&self, name: &str, value: Value) -> Result<()>;

    /// Remove an option (no-op when absent)
    async fn delete(&self, name: &str) -> Result<()>;
}

/// Ephemeral key-value storage where every value carries a TTL
#[async_trait]
pub trait TransientStore: Send + Sync {
    /// Read a transient, `None` when absent or expired
    async fn get(&self, name: &str) -> Result<Option<Value>>;

    /// Write a transient that expires after `ttl`
    async fn set(&self, name: &str, value: Value, ttl: Duration) -> Result<()>;

    /// Remove a transient (no-op when absent)
    async fn delete(&self, name: &str) -> Result<()>;
}

/// Source of the current time for TTL evaluation
pub trait Clock: Send + Sync + std::fmt::Debug {
    fn now(&self) -> DateTime<Utc>;
}

/// Wall clock
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}

/// Clock that only moves when told to
///
/// Lets tests and simulations step past a TTL without sleeping.
#[derive(Debug)]
pub struct ManualClock {
    now: Mutex<DateTime<Utc>>,
}

impl Default for ManualClock {
    fn default() -> Self {
        Self::new(Utc::now())
    }
}

impl ManualClock {
    pub fn new(start: DateTime<Utc>) -> Self {
        Self {
            now: Mutex::new(start),
        }
    }

    /// Move the clock forward
    pub fn advance(&self, by: Duration) {
        let mut now = self.now.lock().unwrap_or_else(|e| e.into_inner());
        *now = expiry(*now, by);
    }
}

impl Clock for ManualClock {
    fn now(&self) -> DateTime<Utc> {
        *self.now.lock().unwrap_or_else(|e| e.into_inner())
    }
}

/// Instant at which a value written at `now` with `ttl` expires
pub(crate) fn expiry(now: DateTime<Utc>, ttl: Duration) -> DateTime<Utc> {
    chrono::Duration::from_std(ttl)
        .ok()
        .and_then(|d| now.checked_add_signed(d))
        .unwrap_or(DateTime::<Utc>::MAX_UTC)
}
