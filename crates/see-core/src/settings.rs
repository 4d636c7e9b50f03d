//! Administrator settings
//!
//! Everything except the API key: endpoint, default domains and the
//! automatic shorten/upload switches. Reads never fail; a missing or
//! unreadable option falls back to its default.

use serde::Serialize;
use serde_json::Value;
use std::sync::Arc;
use tracing::{info, warn};

use crate::config::{DEFAULT_API_BASE_URL, Environment};
use crate::context::ClientCell;
use crate::domain::domains::DomainKind;
use crate::error::{Error, Result};
use crate::storage::{OptionStore, keys};

/// Value shown in the API key field when a key is stored; submitting it
/// back keeps the stored key
pub const API_KEY_PLACEHOLDER: &str = "••••••••";

/// Settings backed by the option store
#[derive(Clone)]
pub struct Settings {
    options: Arc<dyn OptionStore>,
    environment: Environment,
    client: ClientCell,
}

/// Point-in-time view of every setting
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SettingsSnapshot {
    pub api_base_url: String,
    pub api_base_url_overridden: bool,
    pub default_domain: Option<String>,
    pub default_file_domain: Option<String>,
    pub default_text_domain: Option<String>,
    pub auto_shorten: bool,
    pub auto_upload: bool,
}

impl Settings {
    pub(crate) fn new(
        options: Arc<dyn OptionStore>,
        environment: Environment,
        client: ClientCell,
    ) -> Self {
        Self {
            options,
            environment,
            client,
        }
    }

    /// Endpoint in effect: host override, then the stored option, then
    /// the public S.EE API
    pub async fn api_base_url(&self) -> String {
        if let Some(url) = self.environment.api_base_url() {
            return url.to_string();
        }
        self.read_string(keys::API_BASE_URL)
            .await
            .unwrap_or_else(|| DEFAULT_API_BASE_URL.to_string())
    }

    /// Whether the base URL is pinned by the host environment
    pub fn is_base_url_overridden(&self) -> bool {
        self.environment.api_base_url().is_some()
    }

    /// Store a custom endpoint; empty restores the default
    pub async fn set_api_base_url(&self, url: &str) -> Result<()> {
        let url = url.trim();
        if url.is_empty() {
            self.options.delete(keys::API_BASE_URL).await?;
        } else {
            validate_api_base_url(url)?;
            self.options
                .set(keys::API_BASE_URL, Value::String(url.to_string()))
                .await?;
        }

        self.client.reset();
        info!(overridden = self.is_base_url_overridden(), "Updated API base URL");
        Ok(())
    }

    /// Administrator's default domain for `kind`
    pub async fn default_domain(&self, kind: DomainKind) -> Option<String> {
        self.read_string(kind.default_domain_option()).await
    }

    /// Set the default domain for `kind`; empty clears it
    pub async fn set_default_domain(&self, kind: DomainKind, domain: &str) -> Result<()> {
        self.options
            .set(
                kind.default_domain_option(),
                Value::String(domain.trim().to_string()),
            )
            .await
    }

    /// Shorten posts automatically when they are first published
    pub async fn auto_shorten(&self) -> bool {
        self.read_flag(keys::AUTO_SHORTEN).await
    }

    pub async fn set_auto_shorten(&self, enabled: bool) -> Result<()> {
        self.write_flag(keys::AUTO_SHORTEN, enabled).await
    }

    /// Upload new media to S.EE automatically
    pub async fn auto_upload(&self) -> bool {
        self.read_flag(keys::AUTO_UPLOAD).await
    }

    pub async fn set_auto_upload(&self, enabled: bool) -> Result<()> {
        self.write_flag(keys::AUTO_UPLOAD, enabled).await
    }

    pub async fn snapshot(&self) -> SettingsSnapshot {
        SettingsSnapshot {
            api_base_url: self.api_base_url().await,
            api_base_url_overridden: self.is_base_url_overridden(),
            default_domain: self.default_domain(DomainKind::ShortUrl).await,
            default_file_domain: self.default_domain(DomainKind::File).await,
            default_text_domain: self.default_domain(DomainKind::Text).await,
            auto_shorten: self.auto_shorten().await,
            auto_upload: self.auto_upload().await,
        }
    }

    async fn read(&self, name: &str) -> Option<Value> {
        match self.options.get(name).await {
            Ok(value) => value,
            Err(e) => {
                warn!(option = name, error = %e, "Failed to read option");
                None
            }
        }
    }

    /// Non-empty string option
    async fn read_string(&self, name: &str) -> Option<String> {
        match self.read(name).await {
            Some(Value::String(s)) if !s.trim().is_empty() => Some(s.trim().to_string()),
            _ => None,
        }
    }

    async fn read_flag(&self, name: &str) -> bool {
        match self.read(name).await {
            Some(Value::String(s)) => s == "1",
            Some(Value::Bool(b)) => b,
            Some(Value::Number(n)) => n.as_i64() == Some(1),
            _ => false,
        }
    }

    /// Flags are stored as "1" or "" so hosts that compare strings agree
    async fn write_flag(&self, name: &str, enabled: bool) -> Result<()> {
        let value = if enabled { "1" } else { "" };
        self.options
            .set(name, Value::String(value.to_string()))
            .await
    }
}

/// Accept only http(s) endpoints; empty means "use the default"
pub fn validate_api_base_url(url: &str) -> Result<()> {
    let url = url.trim();
    if url.is_empty() || url.starts_with("https://") || url.starts_with("http://") {
        Ok(())
    } else {
        Err(Error::InvalidInput(format!(
            "Invalid API base URL: {}. It must start with http:// or https://",
            url
        )))
    }
}
