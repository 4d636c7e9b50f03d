//! Short URL actions

use serde::Serialize;
use tracing::info;

use super::{ActionOutcome, non_blank};
use crate::context::SeeContext;
use crate::domain::domains::DomainKind;
use crate::error::{Error, Result};
use crate::remote::ShortUrlOptions;

/// Input for creating a short URL
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CreateShortUrl {
    pub target_url: String,
    /// Domain to shorten on; falls back to the default short URL domain
    pub domain: Option<String>,
    pub custom_slug: Option<String>,
    pub title: Option<String>,
}

impl CreateShortUrl {
    pub fn new(target_url: impl Into<String>) -> Self {
        Self {
            target_url: target_url.into(),
            ..Self::default()
        }
    }
}

/// A short URL as returned to the caller
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ShortUrlCreated {
    pub short_url: String,
    pub slug: String,
    pub domain: String,
}

/// Post status change that may trigger automatic shortening
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PostTransition<'a> {
    pub old_status: &'a str,
    pub new_status: &'a str,
    pub post_type: &'a str,
}

/// Domain for a new short URL: explicit choice, then the configured
/// default, then the first available short URL domain
pub async fn resolve_short_domain(ctx: &SeeContext, explicit: Option<&str>) -> Result<String> {
    if let Some(domain) = non_blank(explicit) {
        return Ok(domain.to_string());
    }
    if let Some(domain) = ctx.settings().default_domain(DomainKind::ShortUrl).await {
        return Ok(domain);
    }
    ctx.get_domains(DomainKind::ShortUrl, false)
        .await
        .into_iter()
        .next()
        .ok_or(Error::NoDomainAvailable)
}

pub async fn create_short_url(
    ctx: &SeeContext,
    request: &CreateShortUrl,
) -> ActionOutcome<ShortUrlCreated> {
    ActionOutcome::from_result(
        try_create(ctx, request).await,
        "Short URL created successfully!",
    )
}

async fn try_create(ctx: &SeeContext, request: &CreateShortUrl) -> Result<ShortUrlCreated> {
    let target_url = request.target_url.trim();
    if target_url.is_empty() {
        return Err(Error::InvalidInput("A target URL is required.".to_string()));
    }

    let client = ctx.client().await?;
    let domain = resolve_short_domain(ctx, request.domain.as_deref()).await?;
    let options = ShortUrlOptions {
        title: non_blank(request.title.as_deref()).map(str::to_string),
        custom_slug: non_blank(request.custom_slug.as_deref()).map(str::to_string),
    };

    let short = client.create_short_url(target_url, &domain, &options).await?;
    info!(%domain, slug = %short.slug, "Created short URL");

    Ok(ShortUrlCreated {
        short_url: short.short_url,
        slug: short.slug,
        domain,
    })
}

pub async fn delete_short_url(ctx: &SeeContext, domain: &str, slug: &str) -> ActionOutcome<()> {
    ActionOutcome::from_result(
        try_delete(ctx, domain, slug).await,
        "Short URL deleted successfully!",
    )
}

async fn try_delete(ctx: &SeeContext, domain: &str, slug: &str) -> Result<()> {
    let (Some(domain), Some(slug)) = (non_blank(Some(domain)), non_blank(Some(slug))) else {
        return Err(Error::InvalidInput("Missing domain or slug.".to_string()));
    };

    let client = ctx.client().await?;
    client.delete_short_url(domain, slug).await?;
    info!(domain, slug, "Deleted short URL");
    Ok(())
}

/// Whether a status change should shorten the post automatically
///
/// Only a first transition into `publish` of a post or page qualifies,
/// only when the feature is on, and never when a short URL already exists.
pub fn should_auto_shorten(
    transition: &PostTransition<'_>,
    enabled: bool,
    existing_short_url: Option<&str>,
) -> bool {
    transition.new_status == "publish"
        && transition.old_status != "publish"
        && matches!(transition.post_type, "post" | "page")
        && enabled
        && non_blank(existing_short_url).is_none()
}

/// Shorten a post on publish when the auto-shorten rule allows it
///
/// Returns `None` when the rule does not apply.
pub async fn maybe_auto_shorten(
    ctx: &SeeContext,
    transition: &PostTransition<'_>,
    existing_short_url: Option<&str>,
    request: &CreateShortUrl,
) -> Option<ActionOutcome<ShortUrlCreated>> {
    let enabled = ctx.settings().auto_shorten().await;
    if !should_auto_shorten(transition, enabled, existing_short_url) {
        return None;
    }
    Some(create_short_url(ctx, request).await)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::{MockFactory, MockRemote};
    use std::sync::Arc;

    fn publish<'a>(old_status: &'a str, post_type: &'a str) -> PostTransition<'a> {
        PostTransition {
            old_status,
            new_status: "publish",
            post_type,
        }
    }

    async fn context(remote: MockRemote) -> (SeeContext, Arc<MockFactory>) {
        let factory = Arc::new(MockFactory::new(remote));
        let ctx = SeeContext::builder().client_factory(factory.clone()).build();
        ctx.secrets().save_key("key").await.unwrap();
        (ctx, factory)
    }

    #[tokio::test]
    async fn test_create_uses_explicit_domain() {
        let (ctx, factory) = context(MockRemote::with_domains(&["s.ee"], &[], &[])).await;
        let request = CreateShortUrl {
            domain: Some("custom.link".to_string()),
            custom_slug: Some("hello".to_string()),
            ..CreateShortUrl::new("https://example.com/post")
        };

        let outcome = create_short_url(&ctx, &request).await;
        let created = outcome.data().unwrap();
        assert_eq!(created.domain, "custom.link");
        assert_eq!(created.short_url, "https://custom.link/hello");
        assert_eq!(factory.remote.calls_to("get_short_domains"), 0);
    }

    #[tokio::test]
    async fn test_domain_resolution_order() {
        let (ctx, factory) = context(MockRemote::with_domains(&["first.example", "second.example"], &[], &[])).await;

        assert_eq!(resolve_short_domain(&ctx, None).await.unwrap(), "first.example");

        ctx.settings()
            .set_default_domain(DomainKind::ShortUrl, "default.example")
            .await
            .unwrap();
        assert_eq!(resolve_short_domain(&ctx, Some("  ")).await.unwrap(), "default.example");
        assert_eq!(factory.remote.calls_to("get_short_domains"), 1);
    }

    #[tokio::test]
    async fn test_no_domain_available() {
        let (ctx, _) = context(MockRemote::default()).await;
        let outcome = create_short_url(&ctx, &CreateShortUrl::new("https://example.com")).await;
        assert_eq!(outcome.code(), Some("E200"));
        assert_eq!(outcome.message(), "No domain available. Please configure a default domain.");
    }

    #[tokio::test]
    async fn test_create_without_key_fails_with_message() {
        let ctx = SeeContext::builder()
            .client_factory(Arc::new(MockFactory::new(MockRemote::default())))
            .build();
        let outcome = create_short_url(&ctx, &CreateShortUrl::new("https://example.com")).await;
        assert_eq!(outcome.code(), Some("E001"));
    }

    #[tokio::test]
    async fn test_create_rejects_empty_target() {
        let (ctx, factory) = context(MockRemote::with_domains(&["s.ee"], &[], &[])).await;
        let outcome = create_short_url(&ctx, &CreateShortUrl::new("  ")).await;
        assert_eq!(outcome.code(), Some("E800"));
        assert!(factory.remote.calls().is_empty());
    }

    #[tokio::test]
    async fn test_remote_failure_becomes_outcome() {
        let (ctx, _) = context(MockRemote::failing()).await;
        let request = CreateShortUrl {
            domain: Some("s.ee".to_string()),
            ..CreateShortUrl::new("https://example.com")
        };
        let outcome = create_short_url(&ctx, &request).await;
        assert_eq!(outcome.code(), Some("E101"));
        assert!(outcome.message().contains("mock failure"));
    }

    #[tokio::test]
    async fn test_delete_requires_domain_and_slug() {
        let (ctx, factory) = context(MockRemote::default()).await;

        let outcome = delete_short_url(&ctx, "s.ee", "").await;
        assert_eq!(outcome.message(), "Missing domain or slug.");

        let outcome = delete_short_url(&ctx, "s.ee", "abc").await;
        assert!(outcome.is_success());
        assert_eq!(factory.remote.calls(), vec!["delete_short_url s.ee abc"]);
    }

    #[test]
    fn test_auto_shorten_rule() {
        assert!(should_auto_shorten(&publish("draft", "post"), true, None));
        assert!(should_auto_shorten(&publish("future", "page"), true, Some("")));

        // Already published
        assert!(!should_auto_shorten(&publish("publish", "post"), true, None));
        // Not a post or page
        assert!(!should_auto_shorten(&publish("draft", "attachment"), true, None));
        // Disabled
        assert!(!should_auto_shorten(&publish("draft", "post"), false, None));
        // Already shortened
        assert!(!should_auto_shorten(&publish("draft", "post"), true, Some("https://s.ee/x")));
        // Not publishing
        let to_draft = PostTransition {
            old_status: "new",
            new_status: "draft",
            post_type: "post",
        };
        assert!(!should_auto_shorten(&to_draft, true, None));
    }

    #[tokio::test]
    async fn test_maybe_auto_shorten_respects_setting() {
        let (ctx, factory) = context(MockRemote::with_domains(&["s.ee"], &[], &[])).await;
        let request = CreateShortUrl::new("https://example.com/new-post");

        assert!(maybe_auto_shorten(&ctx, &publish("draft", "post"), None, &request).await.is_none());

        ctx.settings().set_auto_shorten(true).await.unwrap();
        let outcome = maybe_auto_shorten(&ctx, &publish("draft", "post"), None, &request)
            .await
            .unwrap();
        assert!(outcome.is_success());
        assert_eq!(factory.remote.calls_to("create_short_url"), 1);
    }
}
