//! Domain list entities

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::{Error, Result};
use crate::storage::keys;

/// Which remote feature a domain list belongs to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DomainKind {
    ShortUrl,
    File,
    Text,
}

impl DomainKind {
    pub const ALL: [DomainKind; 3] = [Self::ShortUrl, Self::File, Self::Text];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::ShortUrl => "short_url",
            Self::File => "file",
            Self::Text => "text",
        }
    }

    /// Transient holding this kind's cached list
    pub fn transient_name(&self) -> &'static str {
        match self {
            Self::ShortUrl => keys::DOMAINS_CACHE,
            Self::File => keys::FILE_DOMAINS_CACHE,
            Self::Text => keys::TEXT_DOMAINS_CACHE,
        }
    }

    /// Option holding the administrator's default domain for this kind
    pub fn default_domain_option(&self) -> &'static str {
        match self {
            Self::ShortUrl => keys::DEFAULT_DOMAIN,
            Self::File => keys::DEFAULT_FILE_DOMAIN,
            Self::Text => keys::DEFAULT_TEXT_DOMAIN,
        }
    }
}

impl fmt::Display for DomainKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for DomainKind {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "short_url" | "short" | "shorturl" => Ok(Self::ShortUrl),
            "file" => Ok(Self::File),
            "text" => Ok(Self::Text),
            other => Err(Error::InvalidInput(format!(
                "Unknown domain kind: {}. Expected short_url, file or text.",
                other
            ))),
        }
    }
}

/// A fetched domain list as stored in the transient store
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DomainCacheEntry {
    pub kind: DomainKind,
    pub domains: Vec<String>,
    pub fetched_at: DateTime<Utc>,
    pub ttl_secs: u64,
}

impl DomainCacheEntry {
    pub fn new(kind: DomainKind, domains: Vec<String>, fetched_at: DateTime<Utc>, ttl_secs: u64) -> Self {
        Self {
            kind,
            domains,
            fetched_at,
            ttl_secs,
        }
    }

    /// Instant after which the entry counts as absent
    pub fn expires_at(&self) -> DateTime<Utc> {
        crate::storage::expiry(self.fetched_at, std::time::Duration::from_secs(self.ttl_secs))
    }

    /// Fresh (true) or stale (false) at `now`
    pub fn is_live(&self, now: DateTime<Utc>) -> bool {
        now < self.expires_at()
    }
}

/// What to drop from the domain cache
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InvalidateScope {
    Kind(DomainKind),
    All,
}

impl InvalidateScope {
    pub fn kinds(&self) -> Vec<DomainKind> {
        match self {
            Self::Kind(kind) => vec![*kind],
            Self::All => DomainKind::ALL.to_vec(),
        }
    }
}

impl From<DomainKind> for InvalidateScope {
    fn from(kind: DomainKind) -> Self {
        Self::Kind(kind)
    }
}

/// Result of an eager refresh of every domain kind
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DomainRefresh {
    pub short_url: Vec<String>,
    pub file: Vec<String>,
    pub text: Vec<String>,
    /// Kinds whose fetch failed, with the error message
    pub failures: Vec<(DomainKind, String)>,
}

impl DomainRefresh {
    pub fn domains(&self, kind: DomainKind) -> &[String] {
        match kind {
            DomainKind::ShortUrl => &self.short_url,
            DomainKind::File => &self.file,
            DomainKind::Text => &self.text,
        }
    }

    pub(crate) fn set(&mut self, kind: DomainKind, domains: Vec<String>) {
        match kind {
            DomainKind::ShortUrl => self.short_url = domains,
            DomainKind::File => self.file = domains,
            DomainKind::Text => self.text = domains,
        }
    }

    /// True when no kind returned a single domain
    pub fn is_empty(&self) -> bool {
        self.short_url.is_empty() && self.file.is_empty() && self.text.is_empty()
    }

    pub fn total(&self) -> usize {
        self.short_url.len() + self.file.len() + self.text.len()
    }
}
