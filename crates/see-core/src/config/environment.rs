//! Host-provided overrides
//!
//! The host may pin the API key and base URL from outside the option store,
//! and supplies the installation secret the credential key is derived from.

use std::env;

/// Master secret used when the host provides none
pub const DEFAULT_MASTER_SECRET: &str = "see-default-key";

/// Values the host environment provides to the integration
#[derive(Clone, Default)]
pub struct Environment {
    api_key: Option<String>,
    api_base_url: Option<String>,
    master_secret: Option<String>,
}

impl std::fmt::Debug for Environment {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Environment")
            .field("api_key", &self.api_key.as_ref().map(|_| "[REDACTED]"))
            .field("api_base_url", &self.api_base_url)
            .field(
                "master_secret",
                &self.master_secret.as_ref().map(|_| "[REDACTED]"),
            )
            .finish()
    }
}

impl Environment {
    /// An environment with no overrides and the default master secret
    pub fn new() -> Self {
        Self::default()
    }

    /// Read overrides from process environment variables
    ///
    /// `SEE_API_KEY` and `SEE_API_BASE_URL` pin the credential and endpoint.
    /// The master secret comes from `SEE_MASTER_SECRET`, then `AUTH_KEY`.
    pub fn from_env() -> Self {
        Self {
            api_key: non_empty(env::var("SEE_API_KEY").ok()),
            api_base_url: non_empty(env::var("SEE_API_BASE_URL").ok()),
            master_secret: non_empty(
                env::var("SEE_MASTER_SECRET")
                    .or_else(|_| env::var("AUTH_KEY"))
                    .ok(),
            ),
        }
    }

    pub fn with_api_key(mut self, key: impl Into<String>) -> Self {
        self.api_key = non_empty(Some(key.into()));
        self
    }

    pub fn with_api_base_url(mut self, url: impl Into<String>) -> Self {
        self.api_base_url = non_empty(Some(url.into()));
        self
    }

    pub fn with_master_secret(mut self, secret: impl Into<String>) -> Self {
        self.master_secret = non_empty(Some(secret.into()));
        self
    }

    /// API key pinned by the host, if any
    pub fn api_key(&self) -> Option<&str> {
        self.api_key.as_deref()
    }

    /// Base URL pinned by the host, if any
    pub fn api_base_url(&self) -> Option<&str> {
        self.api_base_url.as_deref()
    }

    /// Installation secret for key derivation
    pub fn master_secret(&self) -> &str {
        self.master_secret
            .as_deref()
            .unwrap_or(DEFAULT_MASTER_SECRET)
    }
}

fn non_empty(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_master_secret() {
        let env = Environment::new();
        assert_eq!(env.master_secret(), DEFAULT_MASTER_SECRET);
        assert!(env.api_key().is_none());
        assert!(env.api_base_url().is_none());
    }

    #[test]
    fn test_empty_overrides_are_ignored() {
        let env = Environment::new()
            .with_api_key("")
            .with_api_base_url("")
            .with_master_secret("");
        assert!(env.api_key().is_none());
        assert!(env.api_base_url().is_none());
        assert_eq!(env.master_secret(), DEFAULT_MASTER_SECRET);
    }

    #[test]
    fn test_debug_redacts_secrets() {
        let env = Environment::new()
            .with_api_key("sk-live-123")
            .with_master_secret("salt-xyz");
        let debug = format!("{:?}", env);
        assert!(debug.contains("[REDACTED]"));
        assert!(!debug.contains("sk-live-123"));
        assert!(!debug.contains("salt-xyz"));
    }
}
