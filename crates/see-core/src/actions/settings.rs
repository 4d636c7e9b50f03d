//! Saving the settings form

use serde::Serialize;
use tracing::info;

use super::ActionOutcome;
use crate::context::SeeContext;
use crate::domain::domains::DomainKind;
use crate::error::Result;
use crate::settings::{API_KEY_PLACEHOLDER, SettingsSnapshot, validate_api_base_url};

/// What happened to the stored API key
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum KeyChange {
    /// The placeholder was submitted; nothing changed
    Kept,
    Cleared,
    Updated,
}

/// Submitted settings; `None` leaves a setting as it is
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SettingsUpdate {
    pub api_key: Option<String>,
    pub api_base_url: Option<String>,
    pub default_domain: Option<String>,
    pub default_file_domain: Option<String>,
    pub default_text_domain: Option<String>,
    pub auto_shorten: Option<bool>,
    pub auto_upload: Option<bool>,
}

/// Save a submitted API key
///
/// The placeholder keeps the stored key and leaves the domain caches
/// alone. Anything else replaces it, which drops every cached domain list
/// and the memoized client.
pub async fn save_api_key(ctx: &SeeContext, input: &str) -> ActionOutcome<KeyChange> {
    match apply_api_key(ctx, input).await {
        Ok(KeyChange::Kept) => ActionOutcome::success("API key unchanged.", KeyChange::Kept),
        Ok(KeyChange::Cleared) => ActionOutcome::success("API key cleared.", KeyChange::Cleared),
        Ok(KeyChange::Updated) => ActionOutcome::success("API key saved.", KeyChange::Updated),
        Err(e) => ActionOutcome::failure(&e),
    }
}

async fn apply_api_key(ctx: &SeeContext, input: &str) -> Result<KeyChange> {
    let input = input.trim();
    if input == API_KEY_PLACEHOLDER {
        return Ok(KeyChange::Kept);
    }

    let secrets = ctx.secrets();
    if secrets.is_overridden() {
        info!("API key is set by the environment, stored key only applies once that is removed");
    }

    secrets.save_key(input).await?;
    Ok(if input.is_empty() {
        KeyChange::Cleared
    } else {
        KeyChange::Updated
    })
}

/// Save every submitted setting and return the resulting view
///
/// The base URL is validated before anything is written.
pub async fn save_settings(
    ctx: &SeeContext,
    update: &SettingsUpdate,
) -> ActionOutcome<SettingsSnapshot> {
    match apply(ctx, update).await {
        Ok(()) => ActionOutcome::success("Settings saved.", ctx.settings().snapshot().await),
        Err(e) => ActionOutcome::failure(&e),
    }
}

async fn apply(ctx: &SeeContext, update: &SettingsUpdate) -> Result<()> {
    if let Some(url) = &update.api_base_url {
        validate_api_base_url(url)?;
    }

    let settings = ctx.settings();
    if let Some(key) = &update.api_key {
        apply_api_key(ctx, key).await?;
    }
    if let Some(url) = &update.api_base_url {
        settings.set_api_base_url(url).await?;
    }

    let domains = [
        (DomainKind::ShortUrl, &update.default_domain),
        (DomainKind::File, &update.default_file_domain),
        (DomainKind::Text, &update.default_text_domain),
    ];
    for (kind, domain) in domains {
        if let Some(domain) = domain {
            settings.set_default_domain(kind, domain).await?;
        }
    }

    if let Some(enabled) = update.auto_shorten {
        settings.set_auto_shorten(enabled).await?;
    }
    if let Some(enabled) = update.auto_upload {
        settings.set_auto_upload(enabled).await?;
    }

    info!("Saved settings");
    Ok(())
}
