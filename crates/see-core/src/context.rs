//! Request-scoped context
//!
//! A [`SeeContext`] bundles the host stores, the resolved configuration and
//! one memoized API client. Build one per inbound request (or per CLI
//! invocation) and pass it to every operation; nothing is shared between
//! contexts except what lives in the stores.

use std::sync::{Arc, Mutex};
use std::time::Duration;
use tracing::debug;

use crate::config::{Config, Environment};
use crate::domain::domains::{DomainCache, DomainKind, DomainRefresh};
use crate::domain::history::HistoryStore;
use crate::domain::security::SecretStore;
use crate::error::{Error, Result};
use crate::remote::{RemoteClient, SeeClient};
use crate::settings::Settings;
use crate::storage::{
    Clock, InMemoryOptionStore, InMemoryTransientStore, OptionStore, SystemClock,
    TransientStore,
};

/// Creates API clients for a key and endpoint
pub trait ClientFactory: Send + Sync {
    fn create(&self, api_key: &str, base_url: &str) -> Result<Arc<dyn RemoteClient>>;
}

/// Factory producing reqwest-backed [`SeeClient`]s
#[derive(Debug, Clone)]
pub struct HttpClientFactory {
    timeout_secs: u64,
}

impl HttpClientFactory {
    pub fn new(timeout_secs: u64) -> Self {
        Self { timeout_secs }
    }
}

impl Default for HttpClientFactory {
    fn default() -> Self {
        Self::new(crate::remote::client::DEFAULT_TIMEOUT_SECS)
    }
}

impl ClientFactory for HttpClientFactory {
    fn create(&self, api_key: &str, base_url: &str) -> Result<Arc<dyn RemoteClient>> {
        let client = SeeClient::builder()
            .api_key(api_key)
            .base_url(base_url)
            .timeout_secs(self.timeout_secs)
            .build()?;
        Ok(Arc::new(client))
    }
}

/// Slot for the context's memoized client
///
/// Cloned handles share the slot, so a key change seen by the
/// [`SecretStore`] drops the client every other handle would reuse.
#[derive(Clone, Default)]
pub struct ClientCell {
    inner: Arc<Mutex<Option<Arc<dyn RemoteClient>>>>,
}

impl ClientCell {
    pub fn get(&self) -> Option<Arc<dyn RemoteClient>> {
        self.inner
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .clone()
    }

    fn set(&self, client: Arc<dyn RemoteClient>) {
        *self.inner.lock().unwrap_or_else(|e| e.into_inner()) = Some(client);
    }

    /// Forget the memoized client
    pub fn reset(&self) {
        *self.inner.lock().unwrap_or_else(|e| e.into_inner()) = None;
    }

    pub fn is_set(&self) -> bool {
        self.inner
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .is_some()
    }
}

/// Everything one request needs to talk to storage and S.EE
pub struct SeeContext {
    options: Arc<dyn OptionStore>,
    transients: Arc<dyn TransientStore>,
    clock: Arc<dyn Clock>,
    environment: Environment,
    config: Config,
    client_factory: Arc<dyn ClientFactory>,
    client: ClientCell,
}

impl std::fmt::Debug for SeeContext {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SeeContext")
            .field("environment", &self.environment)
            .field("config", &self.config)
            .field("client_memoized", &self.client.is_set())
            .finish()
    }
}

/// Builder for creating a SeeContext
#[derive(Default)]
pub struct SeeContextBuilder {
    options: Option<Arc<dyn OptionStore>>,
    transients: Option<Arc<dyn TransientStore>>,
    clock: Option<Arc<dyn Clock>>,
    environment: Option<Environment>,
    config: Option<Config>,
    client_factory: Option<Arc<dyn ClientFactory>>,
}

impl SeeContextBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the persisted option store (defaults to in-memory)
    pub fn options(mut self, options: Arc<dyn OptionStore>) -> Self {
        self.options = Some(options);
        self
    }

    /// Set the transient store (defaults to in-memory on the context clock)
    pub fn transients(mut self, transients: Arc<dyn TransientStore>) -> Self {
        self.transients = Some(transients);
        self
    }

    /// Set the clock used for TTL and timestamps (defaults to the system clock)
    pub fn clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = Some(clock);
        self
    }

    /// Set host overrides and the master secret
    pub fn environment(mut self, environment: Environment) -> Self {
        self.environment = Some(environment);
        self
    }

    pub fn config(mut self, config: Config) -> Self {
        self.config = Some(config);
        self
    }

    /// Set how API clients are created (defaults to [`HttpClientFactory`])
    pub fn client_factory(mut self, factory: Arc<dyn ClientFactory>) -> Self {
        self.client_factory = Some(factory);
        self
    }

    pub fn build(self) -> SeeContext {
        let config = self.config.unwrap_or_default();
        let clock = self.clock.unwrap_or_else(|| Arc::new(SystemClock) as Arc<dyn Clock>);
        let transients = self
            .transients
            .unwrap_or_else(|| {
                Arc::new(InMemoryTransientStore::with_clock(clock.clone())) as Arc<dyn TransientStore>
            });
        let client_factory = self
            .client_factory
            .unwrap_or_else(|| {
                Arc::new(HttpClientFactory::new(config.api.timeout_secs)) as Arc<dyn ClientFactory>
            });

        SeeContext {
            options: self
                .options
                .unwrap_or_else(|| Arc::new(InMemoryOptionStore::new()) as Arc<dyn OptionStore>),
            transients,
            clock,
            environment: self.environment.unwrap_or_default(),
            config,
            client_factory,
            client: ClientCell::default(),
        }
    }
}

impl SeeContext {
    pub fn builder() -> SeeContextBuilder {
        SeeContextBuilder::new()
    }

    /// Context over fresh in-memory stores with defaults everywhere
    pub fn in_memory() -> Self {
        Self::builder().build()
    }

    pub fn options(&self) -> &Arc<dyn OptionStore> {
        &self.options
    }

    pub fn transients(&self) -> &Arc<dyn TransientStore> {
        &self.transients
    }

    pub fn clock(&self) -> &Arc<dyn Clock> {
        &self.clock
    }

    pub fn environment(&self) -> &Environment {
        &self.environment
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub(crate) fn client_cell(&self) -> &ClientCell {
        &self.client
    }

    pub fn secrets(&self) -> SecretStore {
        SecretStore::new(
            self.options.clone(),
            self.environment.clone(),
            self.domain_cache(),
            self.client.clone(),
        )
    }

    pub fn domain_cache(&self) -> DomainCache {
        DomainCache::new(
            self.transients.clone(),
            self.clock.clone(),
            Duration::from_secs(self.config.cache.domain_ttl_secs),
        )
    }

    pub fn history(&self) -> HistoryStore {
        HistoryStore::new(
            self.options.clone(),
            self.clock.clone(),
            self.config.history.max_entries,
        )
    }

    pub fn settings(&self) -> Settings {
        Settings::new(
            self.options.clone(),
            self.environment.clone(),
            self.client.clone(),
        )
    }

    /// The context's API client, created on first use
    ///
    /// Fails with [`Error::MissingApiKey`] when no key is configured.
    pub async fn client(&self) -> Result<Arc<dyn RemoteClient>> {
        if let Some(client) = self.client.get() {
            return Ok(client);
        }

        let api_key = self.secrets().get_key().await;
        if api_key.is_empty() {
            return Err(Error::MissingApiKey);
        }
        let base_url = self.settings().api_base_url().await;

        let client = self.client_factory.create(api_key.as_str(), &base_url)?;
        self.client.set(client.clone());
        debug!(%base_url, "Created S.EE client");
        Ok(client)
    }

    /// A fresh, unmemoized client for an explicit key, used to test a key
    /// before saving it
    pub async fn test_client(
        &self,
        api_key: &str,
        base_url: Option<&str>,
    ) -> Result<Arc<dyn RemoteClient>> {
        if api_key.is_empty() {
            return Err(Error::MissingApiKey);
        }
        let base_url = match base_url.filter(|u| !u.trim().is_empty()) {
            Some(url) => url.trim().to_string(),
            None => self.settings().api_base_url().await,
        };
        self.client_factory.create(api_key, &base_url)
    }

    /// Domains for `kind`, cached for the configured TTL
    ///
    /// Never fails; without a key or on a remote error the list is empty.
    pub async fn get_domains(&self, kind: DomainKind, force_refresh: bool) -> Vec<String> {
        let cache = self.domain_cache();
        if !force_refresh && let Some(domains) = cache.cached(kind).await {
            return domains;
        }

        let client = match self.client().await {
            Ok(client) => Some(client),
            Err(e) => {
                debug!(kind = %kind, error = %e, "No client for domain fetch");
                None
            }
        };
        cache.get_domains(client.as_deref(), kind, force_refresh).await
    }

    /// Force-fetch all three domain lists through the context's client
    pub async fn refresh_all(&self) -> Result<DomainRefresh> {
        let client = self.client().await?;
        Ok(self.domain_cache().refresh_all(client.as_ref()).await)
    }
}
