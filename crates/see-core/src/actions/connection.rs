//! Connection test and domain refresh

use tracing::{info, warn};

use super::{ActionOutcome, non_blank};
use crate::context::SeeContext;
use crate::domain::domains::{DomainKind, DomainRefresh};
use crate::domain::security::SecretValue;
use crate::error::Error;
use crate::settings::API_KEY_PLACEHOLDER;

const NO_DOMAINS_MESSAGE: &str = "No domains found. Please check your API key.";

/// Try a key against the API without saving or caching anything
///
/// An empty key or the settings placeholder means "the stored key". A
/// failing short URL or file list aborts the test. The text list is
/// optional for an account, so its failure is logged and reported empty.
pub async fn test_connection(
    ctx: &SeeContext,
    api_key: Option<&str>,
    base_url: Option<&str>,
) -> ActionOutcome<DomainRefresh> {
    let api_key = match non_blank(api_key) {
        Some(key) if key != API_KEY_PLACEHOLDER => SecretValue::new(key),
        _ => ctx.secrets().get_key().await,
    };
    if api_key.is_empty() {
        return ActionOutcome::failure_with(&Error::MissingApiKey, "Please enter an API key.");
    }

    let client = match ctx.test_client(api_key.as_str(), base_url).await {
        Ok(client) => client,
        Err(e) => return ActionOutcome::failure(&e),
    };

    let mut report = DomainRefresh::default();
    for kind in DomainKind::ALL {
        let fetched = match kind {
            DomainKind::ShortUrl => client.get_short_domains().await,
            DomainKind::File => client.get_file_domains().await,
            DomainKind::Text => client.get_text_domains().await,
        };
        match fetched {
            Ok(domains) => report.set(kind, domains),
            Err(e) if kind == DomainKind::Text => {
                warn!(error = %e, "Text domains unavailable during connection test");
            }
            Err(e) => {
                return ActionOutcome::failure_with(&e, format!("Connection failed: {}", e));
            }
        }
    }

    info!(domains = report.total(), "Connection test succeeded");
    ActionOutcome::success("Connection successful!", report)
}

/// Re-fetch all three domain lists through the cache
pub async fn refresh_domains(ctx: &SeeContext) -> ActionOutcome<DomainRefresh> {
    let refresh = match ctx.refresh_all().await {
        Ok(refresh) => refresh,
        Err(e) => return ActionOutcome::failure(&e),
    };

    if refresh.is_empty() {
        return ActionOutcome::failure_with(&Error::NoDomainAvailable, NO_DOMAINS_MESSAGE);
    }
    ActionOutcome::success("Domains refreshed.", refresh)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::{MockFactory, MockRemote};
    use std::sync::Arc;

    fn remote() -> MockRemote {
        MockRemote::with_domains(&["s.ee"], &["f1.example"], &["t.example"])
    }

    fn context(remote: MockRemote) -> (SeeContext, Arc<MockFactory>) {
        let factory = Arc::new(MockFactory::new(remote));
        let ctx = SeeContext::builder().client_factory(factory.clone()).build();
        (ctx, factory)
    }

    #[tokio::test]
    async fn test_connection_with_candidate_key_caches_nothing() {
        let (ctx, factory) = context(remote());

        let outcome = test_connection(&ctx, Some("candidate"), None).await;
        let report = outcome.data().unwrap();
        assert_eq!(report.short_url, vec!["s.ee"]);
        assert_eq!(report.text, vec!["t.example"]);

        assert_eq!(factory.created()[0].0, "candidate");
        for kind in DomainKind::ALL {
            assert!(ctx.domain_cache().cached(kind).await.is_none());
        }
        // Nothing was saved either
        assert!(ctx.secrets().get_key().await.is_empty());
    }

    #[tokio::test]
    async fn test_placeholder_uses_stored_key() {
        let (ctx, factory) = context(remote());
        ctx.secrets().save_key("stored").await.unwrap();

        assert!(test_connection(&ctx, Some(API_KEY_PLACEHOLDER), None).await.is_success());
        assert!(test_connection(&ctx, None, Some("https://staging.example/api/")).await.is_success());

        let created = factory.created();
        assert_eq!(created[0].0, "stored");
        assert_eq!(created[1], ("stored".to_string(), "https://staging.example/api/".to_string()));
    }

    #[tokio::test]
    async fn test_connection_without_any_key() {
        let (ctx, factory) = context(remote());
        let outcome = test_connection(&ctx, Some(""), None).await;
        assert_eq!(outcome.message(), "Please enter an API key.");
        assert!(factory.created().is_empty());
    }

    #[tokio::test]
    async fn test_connection_failure_message() {
        let (ctx, factory) = context(MockRemote::failing());
        let outcome = test_connection(&ctx, Some("bad"), None).await;
        assert!(outcome.message().starts_with("Connection failed: "));
        assert_eq!(outcome.code(), Some("E101"));
        // Stops at the first failure
        assert_eq!(factory.remote.calls().len(), 1);
    }

    #[tokio::test]
    async fn test_connection_succeeds_without_text_domains() {
        let (ctx, factory) = context(remote().text_failing());

        let outcome = test_connection(&ctx, Some("candidate"), None).await;
        assert_eq!(outcome.message(), "Connection successful!");
        let report = outcome.data().unwrap();
        assert_eq!(report.short_url, vec!["s.ee"]);
        assert_eq!(report.file, vec!["f1.example"]);
        assert!(report.text.is_empty());
        assert_eq!(factory.remote.calls_to("get_text_domains"), 1);
    }

    #[tokio::test]
    async fn test_refresh_domains_populates_cache() {
        let (ctx, _) = context(remote());
        ctx.secrets().save_key("key").await.unwrap();

        let outcome = refresh_domains(&ctx).await;
        assert_eq!(outcome.message(), "Domains refreshed.");
        assert_eq!(
            ctx.domain_cache().cached(DomainKind::File).await,
            Some(vec!["f1.example".to_string()])
        );
    }

    #[tokio::test]
    async fn test_refresh_domains_all_empty_is_failure() {
        let (ctx, _) = context(MockRemote::default());
        ctx.secrets().save_key("key").await.unwrap();

        let outcome = refresh_domains(&ctx).await;
        assert!(!outcome.is_success());
        assert_eq!(outcome.message(), NO_DOMAINS_MESSAGE);

        let (ctx, _) = context(MockRemote::failing());
        ctx.secrets().save_key("key").await.unwrap();
        assert_eq!(refresh_domains(&ctx).await.message(), NO_DOMAINS_MESSAGE);
    }

    #[tokio::test]
    async fn test_refresh_domains_without_key() {
        let (ctx, _) = context(remote());
        assert_eq!(refresh_domains(&ctx).await.code(), Some("E001"));
    }
}
