//! Domain list cache
//!
//! Domain lists only populate dropdowns, so a failed fetch degrades to an
//! empty list instead of an error. Lists are cached per kind in the
//! transient store and dropped whenever the API key changes.

use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, info, warn};

use super::entity::{DomainCacheEntry, DomainKind, DomainRefresh, InvalidateScope};
use crate::error::{Error, Result};
use crate::remote::RemoteClient;
use crate::storage::{Clock, TransientStore};

/// Default lifetime of a cached domain list (24 hours)
pub const DEFAULT_DOMAIN_TTL: Duration = Duration::from_secs(24 * 60 * 60);

/// TTL'd cache of the three remote domain lists
#[derive(Clone)]
pub struct DomainCache {
    transients: Arc<dyn TransientStore>,
    clock: Arc<dyn Clock>,
    ttl: Duration,
}

impl std::fmt::Debug for DomainCache {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DomainCache")
            .field("ttl", &self.ttl)
            .finish()
    }
}

impl DomainCache {
    pub fn new(transients: Arc<dyn TransientStore>, clock: Arc<dyn Clock>, ttl: Duration) -> Self {
        Self {
            transients,
            clock,
            ttl,
        }
    }

    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    /// Live entry for `kind`, without any remote call
    pub async fn entry(&self, kind: DomainKind) -> Option<DomainCacheEntry> {
        let value = match self.transients.get(kind.transient_name()).await {
            Ok(Some(value)) => value,
            Ok(None) => return None,
            Err(e) => {
                warn!(kind = %kind, error = %e, "Failed to read domain cache");
                return None;
            }
        };

        match serde_json::from_value::<DomainCacheEntry>(value) {
            Ok(entry) if entry.kind == kind && entry.is_live(self.clock.now()) => Some(entry),
            Ok(_) => None,
            Err(e) => {
                debug!(kind = %kind, error = %e, "Ignoring malformed domain cache entry");
                None
            }
        }
    }

    /// Cached domains for `kind`, without any remote call
    pub async fn cached(&self, kind: DomainKind) -> Option<Vec<String>> {
        self.entry(kind).await.map(|entry| entry.domains)
    }

    /// Domains for `kind`, from cache when live unless `force_refresh`
    ///
    /// On a miss the list is fetched through `client` and cached. A missing
    /// client or a failed fetch is logged and yields an empty list.
    pub async fn get_domains(
        &self,
        client: Option<&dyn RemoteClient>,
        kind: DomainKind,
        force_refresh: bool,
    ) -> Vec<String> {
        if !force_refresh && let Some(domains) = self.cached(kind).await {
            debug!(kind = %kind, count = domains.len(), "Domain cache hit");
            return domains;
        }

        let Some(client) = client else {
            debug!(kind = %kind, "No client configured, no domains available");
            return Vec::new();
        };

        match self.fetch(client, kind).await {
            Ok(domains) => domains,
            Err(e) => {
                warn!(kind = %kind, error = %e, "Failed to fetch domains");
                Vec::new()
            }
        }
    }

    /// Force-fetch every kind, recording failures per kind
    pub async fn refresh_all(&self, client: &dyn RemoteClient) -> DomainRefresh {
        let mut refresh = DomainRefresh::default();

        for kind in DomainKind::ALL {
            match self.fetch(client, kind).await {
                Ok(domains) => refresh.set(kind, domains),
                Err(e) => {
                    warn!(kind = %kind, error = %e, "Failed to refresh domains");
                    refresh.failures.push((kind, e.to_string()));
                }
            }
        }

        info!(
            domains = refresh.total(),
            failures = refresh.failures.len(),
            "Refreshed domain lists"
        );
        refresh
    }

    /// Drop cached lists immediately
    pub async fn invalidate(&self, scope: InvalidateScope) {
        for kind in scope.kinds() {
            if let Err(e) = self.transients.delete(kind.transient_name()).await {
                warn!(kind = %kind, error = %e, "Failed to invalidate domain cache");
            }
        }
        debug!(?scope, "Invalidated domain cache");
    }

    /// Fetch `kind` from the remote and overwrite its cache entry
    async fn fetch(&self, client: &dyn RemoteClient, kind: DomainKind) -> Result<Vec<String>> {
        let domains = match kind {
            DomainKind::ShortUrl => client.get_short_domains().await?,
            DomainKind::File => client.get_file_domains().await?,
            DomainKind::Text => client.get_text_domains().await?,
        };

        let entry = DomainCacheEntry::new(kind, domains, self.clock.now(), self.ttl.as_secs());
        if let Err(e) = self.store(&entry).await {
            warn!(kind = %kind, error = %e, "Failed to cache domains");
        }

        info!(kind = %kind, count = entry.domains.len(), "Fetched domains");
        Ok(entry.domains)
    }

    async fn store(&self, entry: &DomainCacheEntry) -> Result<()> {
        let value = serde_json::to_value(entry).map_err(Error::Serialization)?;
        self.transients
            .set(entry.kind.transient_name(), value, self.ttl)
            .await
    }
}
