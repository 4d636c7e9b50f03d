//! Text share actions

use serde::Serialize;
use tracing::{info, warn};

use super::{ActionOutcome, non_blank};
use crate::context::SeeContext;
use crate::domain::domains::DomainKind;
use crate::domain::history::{HistoryKind, NewHistoryEntry};
use crate::error::{Error, Result};
use crate::remote::{TextOptions, TextType};

/// Title used when none is given
pub const DEFAULT_TITLE: &str = "Untitled";

/// Input for sharing a text snippet
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ShareText {
    pub content: String,
    pub title: Option<String>,
    /// Raw type as submitted; anything unknown is shared as plain text
    pub text_type: Option<String>,
    /// Record the share in the text history (shares attached to a post
    /// are tracked by the post instead)
    pub standalone: bool,
}

impl ShareText {
    pub fn new(content: impl Into<String>) -> Self {
        Self {
            content: content.into(),
            standalone: true,
            ..Self::default()
        }
    }
}

/// A created text share
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TextShared {
    pub text_url: String,
    pub slug: String,
    pub domain: String,
    pub title: String,
    pub text_type: TextType,
    /// History entry id for standalone shares
    #[serde(skip_serializing_if = "Option::is_none")]
    pub history_id: Option<String>,
}

pub async fn share_text(ctx: &SeeContext, request: &ShareText) -> ActionOutcome<TextShared> {
    ActionOutcome::from_result(try_share(ctx, request).await, "Text shared successfully!")
}

async fn try_share(ctx: &SeeContext, request: &ShareText) -> Result<TextShared> {
    if request.content.trim().is_empty() {
        return Err(Error::InvalidInput("Content cannot be empty.".to_string()));
    }

    let text_type = TextType::parse_lenient(request.text_type.as_deref().unwrap_or_default());
    let title = non_blank(request.title.as_deref())
        .unwrap_or(DEFAULT_TITLE)
        .to_string();

    let client = ctx.client().await?;
    let options = TextOptions {
        title: title.clone(),
        text_type,
        domain: ctx.settings().default_domain(DomainKind::Text).await,
    };

    let share = client.create_text(&request.content, &options).await?;
    info!(domain = %share.domain, slug = %share.slug, %text_type, "Shared text");

    let history_id = if request.standalone && !share.short_url.is_empty() {
        let entry = NewHistoryEntry::new(share.short_url.clone())
            .field("slug", share.slug.clone())
            .field("domain", share.domain.clone())
            .field("title", title.clone())
            .field("text_type", text_type.as_str());
        match ctx.history().add(HistoryKind::Text, entry).await {
            Ok(entry) => Some(entry.id),
            Err(e) => {
                warn!(error = %e, "Failed to record text share in history");
                None
            }
        }
    } else {
        None
    };

    Ok(TextShared {
        text_url: share.short_url,
        slug: share.slug,
        domain: share.domain,
        title,
        text_type,
        history_id,
    })
}

pub async fn delete_text(ctx: &SeeContext, domain: &str, slug: &str) -> ActionOutcome<()> {
    ActionOutcome::from_result(
        try_delete(ctx, domain, slug).await,
        "Text share deleted successfully!",
    )
}

async fn try_delete(ctx: &SeeContext, domain: &str, slug: &str) -> Result<()> {
    let (Some(domain), Some(slug)) = (non_blank(Some(domain)), non_blank(Some(slug))) else {
        return Err(Error::InvalidInput("Missing domain or slug.".to_string()));
    };

    let client = ctx.client().await?;
    client.delete_text(domain, slug).await?;
    info!(domain, slug, "Deleted text share");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::{MockFactory, MockRemote};
    use std::sync::Arc;

    async fn context(remote: MockRemote) -> (SeeContext, Arc<MockFactory>) {
        let factory = Arc::new(MockFactory::new(remote));
        let ctx = SeeContext::builder().client_factory(factory.clone()).build();
        ctx.secrets().save_key("key").await.unwrap();
        (ctx, factory)
    }

    #[tokio::test]
    async fn test_share_records_standalone_history() {
        let (ctx, _) = context(MockRemote::default()).await;
        ctx.settings()
            .set_default_domain(DomainKind::Text, "t.example")
            .await
            .unwrap();

        let outcome = share_text(&ctx, &ShareText::new("hello world")).await;
        let shared = outcome.into_data().unwrap();
        assert_eq!(shared.domain, "t.example");
        assert_eq!(shared.title, DEFAULT_TITLE);
        assert_eq!(shared.text_type, TextType::PlainText);

        let history = ctx.history().list(HistoryKind::Text).await.unwrap();
        assert_eq!(history.len(), 1);
        assert_eq!(Some(history[0].id.clone()), shared.history_id);
        assert_eq!(history[0].field("title"), Some("Untitled"));
        assert_eq!(history[0].field("text_type"), Some("plain_text"));
        assert_eq!(history[0].url, "https://t.example/txt1");
    }

    #[tokio::test]
    async fn test_post_share_skips_history() {
        let (ctx, _) = context(MockRemote::default()).await;
        let request = ShareText {
            standalone: false,
            title: Some("Release notes".to_string()),
            text_type: Some("markdown".to_string()),
            ..ShareText::new("# v1.0")
        };

        let shared = share_text(&ctx, &request).await.into_data().unwrap();
        assert_eq!(shared.title, "Release notes");
        assert_eq!(shared.text_type, TextType::Markdown);
        assert!(shared.history_id.is_none());
        assert!(ctx.history().list(HistoryKind::Text).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_unknown_type_falls_back_to_plain_text() {
        let (ctx, factory) = context(MockRemote::default()).await;
        let request = ShareText {
            text_type: Some("html".to_string()),
            ..ShareText::new("<b>hi</b>")
        };

        let shared = share_text(&ctx, &request).await.into_data().unwrap();
        assert_eq!(shared.text_type, TextType::PlainText);
        assert_eq!(factory.remote.calls(), vec!["create_text s.ee plain_text"]);
    }

    #[tokio::test]
    async fn test_empty_content_rejected_without_remote_call() {
        let (ctx, factory) = context(MockRemote::default()).await;
        let outcome = share_text(&ctx, &ShareText::new("   \n")).await;
        assert_eq!(outcome.message(), "Content cannot be empty.");
        assert!(factory.remote.calls().is_empty());
    }

    #[tokio::test]
    async fn test_remote_failure_records_nothing() {
        let (ctx, _) = context(MockRemote::failing()).await;
        let outcome = share_text(&ctx, &ShareText::new("hello")).await;
        assert!(!outcome.is_success());
        assert!(ctx.history().list(HistoryKind::Text).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_delete_validation_and_call() {
        let (ctx, factory) = context(MockRemote::default()).await;
        assert_eq!(
            delete_text(&ctx, "", "txt1").await.message(),
            "Missing domain or slug."
        );
        assert!(delete_text(&ctx, "t.example", "txt1").await.is_success());
        assert_eq!(factory.remote.calls(), vec!["delete_text t.example txt1"]);
    }
}
