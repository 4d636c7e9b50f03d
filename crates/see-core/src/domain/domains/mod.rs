//! Domain list caching
//!
//! S.EE exposes one domain list per feature (short URLs, files, text). Each
//! list is cached for 24 hours in the host's transient store and follows
//! the lifecycle `ABSENT -> FRESH -> STALE -> ABSENT`: a stale entry is
//! treated as absent until a new fetch overwrites it, and invalidation
//! drops it immediately.

pub mod entity;
pub mod service;

pub use entity::{DomainCacheEntry, DomainKind, DomainRefresh, InvalidateScope};
pub use service::{DEFAULT_DOMAIN_TTL, DomainCache};
