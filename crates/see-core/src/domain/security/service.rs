//! API key storage service
//!
//! Owns the only code path that turns the persisted, encrypted option back
//! into a usable key.

use serde_json::Value;
use std::sync::Arc;

use super::entity::{DerivedKey, EncryptedSecret, SecretValue};
use crate::config::Environment;
use crate::context::ClientCell;
use crate::domain::domains::{DomainCache, InvalidateScope};
use crate::error::Result;
use crate::storage::{OptionStore, keys};

/// Service for the encrypted S.EE API key
///
/// # Security Model
///
/// - A key pinned by the host environment wins and is never written
/// - Otherwise the key is stored AES-256-GCM encrypted under a key derived
///   from the installation's master secret
/// - The derived key is recomputed for every operation and never persisted
/// - Decrypted keys are returned as `SecretValue`, zeroized on drop
///
/// Changing the key drops every cached domain list and the memoized client,
/// since both belong to whichever key produced them.
pub struct SecretStore {
    options: Arc<dyn OptionStore>,
    environment: Environment,
    domain_cache: DomainCache,
    client: ClientCell,
}

impl SecretStore {
    pub(crate) fn new(
        options: Arc<dyn OptionStore>,
        environment: Environment,
        domain_cache: DomainCache,
        client: ClientCell,
    ) -> Self {
        Self {
            options,
            environment,
            domain_cache,
            client,
        }
    }

    /// Whether the key is pinned by the host environment
    pub fn is_overridden(&self) -> bool {
        self.environment.api_key().is_some()
    }

    /// Current API key, or an empty value when none is configured
    ///
    /// Never fails: a storage error or an undecryptable value degrades to
    /// an empty or best-effort result so the administrator can always
    /// re-enter a working key.
    pub async fn get_key(&self) -> SecretValue {
        if let Some(key) = self.environment.api_key() {
            return SecretValue::new(key);
        }

        let stored = match self.options.get(keys::API_KEY).await {
            Ok(Some(Value::String(s))) if !s.is_empty() => s,
            Ok(_) => return SecretValue::empty(),
            Err(e) => {
                tracing::warn!(error = %e, "Failed to read stored API key");
                return SecretValue::empty();
            }
        };

        self.decrypt(&EncryptedSecret::from_stored(stored))
    }

    /// Persist a new API key; an empty key clears the stored one
    pub async fn save_key(&self, plain: &str) -> Result<()> {
        if plain.is_empty() {
            self.options
                .set(keys::API_KEY, Value::String(String::new()))
                .await?;
            tracing::info!("Cleared stored API key");
        } else {
            let sealed = self.encrypt(plain);
            self.options
                .set(keys::API_KEY, Value::String(sealed.as_str().to_string()))
                .await?;
            tracing::info!("Stored encrypted API key");
        }

        self.domain_cache.invalidate(InvalidateScope::All).await;
        self.client.reset();
        Ok(())
    }

    /// Remove the stored key (same as saving an empty key)
    pub async fn clear_key(&self) -> Result<()> {
        self.save_key("").await
    }

    /// Encrypt with a freshly derived key and a fresh IV
    pub fn encrypt(&self, plain: &str) -> EncryptedSecret {
        let key = DerivedKey::derive(self.environment.master_secret());
        EncryptedSecret::seal(plain, &key)
    }

    /// Decrypt with a freshly derived key, falling back as described on
    /// [`EncryptedSecret::open`]
    pub fn decrypt(&self, stored: &EncryptedSecret) -> SecretValue {
        let key = DerivedKey::derive(self.environment.master_secret());
        stored.open(&key)
    }
}
