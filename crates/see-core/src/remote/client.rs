//! S.EE HTTP client
//!
//! Async reqwest client for the S.EE v1 API with:
//! - Raw API key in the `Authorization` header
//! - A finite request timeout (15 seconds by default)
//! - Envelope unwrapping into typed results
//! - No credentials sent to a delete URL outside the API origin
//!
//! No request is retried; a failed call surfaces as an error and the user
//! decides whether to try again.

use async_trait::async_trait;
use reqwest::{Client as HttpClient, Url};
use reqwest::header::{ACCEPT, AUTHORIZATION, HeaderMap, HeaderValue};
use reqwest::multipart::{Form, Part};
use serde::de::DeserializeOwned;
use std::path::Path;
use std::time::Duration;
use tracing::{debug, warn};

use super::RemoteClient;
use super::types::{
    ApiEnvelope, CreateShortUrlRequest, CreateTextRequest, DomainsData, ShortUrl, ShortUrlData,
    ShortUrlOptions, SlugRequest, TextData, TextOptions, TextShare, UploadData, UploadedFile,
};
use crate::config::DEFAULT_API_BASE_URL;
use crate::error::{Error, Result};

/// Default request timeout in seconds
pub const DEFAULT_TIMEOUT_SECS: u64 = 15;

/// S.EE API client
#[derive(Clone)]
pub struct SeeClient {
    http_client: HttpClient,
    /// Same settings without the `Authorization` header
    anon_client: HttpClient,
    base_url: String,
}

impl std::fmt::Debug for SeeClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SeeClient")
            .field("base_url", &self.base_url)
            .finish()
    }
}

/// Builder for creating a SeeClient
#[derive(Default)]
pub struct SeeClientBuilder {
    api_key: Option<String>,
    base_url: Option<String>,
    timeout_secs: Option<u64>,
}

impl SeeClientBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the API key
    pub fn api_key(mut self, api_key: impl Into<String>) -> Self {
        self.api_key = Some(api_key.into());
        self
    }

    /// Set the base URL (defaults to `https://s.ee/api/v1/`)
    pub fn base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = Some(url.into());
        self
    }

    /// Set the request timeout
    pub fn timeout_secs(mut self, secs: u64) -> Self {
        self.timeout_secs = Some(secs);
        self
    }

    /// Build the SeeClient
    pub fn build(self) -> Result<SeeClient> {
        let api_key = self
            .api_key
            .filter(|k| !k.is_empty())
            .ok_or(Error::MissingApiKey)?;

        let mut auth = HeaderValue::from_str(&api_key)
            .map_err(|_| Error::InvalidInput("API key contains invalid characters".to_string()))?;
        auth.set_sensitive(true);

        let mut headers = HeaderMap::new();
        headers.insert(ACCEPT, HeaderValue::from_static("application/json"));
        let timeout = Duration::from_secs(self.timeout_secs.unwrap_or(DEFAULT_TIMEOUT_SECS));

        let anon_client = HttpClient::builder()
            .default_headers(headers.clone())
            .timeout(timeout)
            .build()
            .map_err(Error::NetworkError)?;

        headers.insert(AUTHORIZATION, auth);
        let http_client = HttpClient::builder()
            .default_headers(headers)
            .timeout(timeout)
            .build()
            .map_err(Error::NetworkError)?;

        let base_url = self
            .base_url
            .filter(|u| !u.is_empty())
            .unwrap_or_else(|| DEFAULT_API_BASE_URL.to_string());

        Ok(SeeClient {
            http_client,
            anon_client,
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }
}

impl SeeClient {
    /// Create a client for `api_key` against the default endpoint
    pub fn new(api_key: impl Into<String>) -> Result<Self> {
        SeeClientBuilder::new().api_key(api_key).build()
    }

    pub fn builder() -> SeeClientBuilder {
        SeeClientBuilder::new()
    }

    /// Base URL without a trailing slash
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn url(&self, endpoint: &str) -> String {
        format!("{}/{}", self.base_url, endpoint)
    }

    /// Whether `url` shares scheme, host and port with the base URL
    fn is_api_origin(&self, url: &str) -> bool {
        match (Url::parse(url), Url::parse(&self.base_url)) {
            (Ok(target), Ok(base)) => target.origin() == base.origin(),
            _ => false,
        }
    }

    async fn get_domains(&self, endpoint: &str) -> Result<Vec<String>> {
        debug!(endpoint, "Fetching domains");
        let response = self.http_client.get(self.url(endpoint)).send().await?;
        let data: DomainsData = self.parse_data(response).await?;
        debug!(endpoint, count = data.domains.len(), "Fetched domains");
        Ok(data.domains)
    }

    /// Unwrap a response carrying a `data` payload
    async fn parse_data<T: DeserializeOwned>(&self, response: reqwest::Response) -> Result<T> {
        let status = response.status();
        if !status.is_success() {
            return self.handle_error_response(status, response).await;
        }

        let body = response.text().await?;
        let envelope: ApiEnvelope<T> = serde_json::from_str(&body)
            .map_err(|e| Error::InvalidResponse(format!("{}: {}", e, truncate(&body))))?;
        envelope.into_data()
    }

    /// Check a response whose payload is not needed
    async fn parse_unit(&self, response: reqwest::Response) -> Result<()> {
        let status = response.status();
        if !status.is_success() {
            return self.handle_error_response(status, response).await;
        }

        let body = response.text().await?;
        if body.trim().is_empty() {
            return Ok(());
        }
        let envelope: ApiEnvelope<serde_json::Value> = serde_json::from_str(&body)
            .map_err(|e| Error::InvalidResponse(format!("{}: {}", e, truncate(&body))))?;
        envelope.into_unit()
    }

    async fn handle_error_response<T>(
        &self,
        status: reqwest::StatusCode,
        response: reqwest::Response,
    ) -> Result<T> {
        let body = response.text().await.unwrap_or_default();
        let message = serde_json::from_str::<ApiEnvelope<serde_json::Value>>(&body)
            .ok()
            .and_then(|envelope| envelope.message)
            .unwrap_or_else(|| truncate(&body));

        warn!(status = status.as_u16(), %message, "S.EE API request failed");

        match status.as_u16() {
            401 => Err(Error::Unauthorized),
            code => Err(Error::ApiError {
                status: code,
                message,
            }),
        }
    }
}

/// URL that deletes a hosted file
///
/// A key that parses as an absolute http(s) URL is used as-is; otherwise
/// it is appended, percent-encoded, to `<base>/file/delete/`.
pub fn file_delete_url(base_url: &str, delete_key_or_url: &str) -> String {
    let is_url = Url::parse(delete_key_or_url)
        .is_ok_and(|url| matches!(url.scheme(), "http" | "https") && url.has_host());
    if is_url {
        delete_key_or_url.to_string()
    } else {
        format!(
            "{}/file/delete/{}",
            base_url.trim_end_matches('/'),
            urlencoding::encode(delete_key_or_url)
        )
    }
}

fn truncate(body: &str) -> String {
    const MAX: usize = 200;
    if body.chars().count() > MAX {
        let head: String = body.chars().take(MAX).collect();
        format!("{}...", head)
    } else {
        body.to_string()
    }
}

#[async_trait]
impl RemoteClient for SeeClient {
    async fn get_short_domains(&self) -> Result<Vec<String>> {
        self.get_domains("domains").await
    }

    async fn get_file_domains(&self) -> Result<Vec<String>> {
        self.get_domains("file/domains").await
    }

    async fn get_text_domains(&self) -> Result<Vec<String>> {
        self.get_domains("text/domains").await
    }

    async fn create_short_url(
        &self,
        target_url: &str,
        domain: &str,
        options: &ShortUrlOptions,
    ) -> Result<ShortUrl> {
        debug!(domain, "Creating short URL");
        let body = CreateShortUrlRequest {
            domain,
            target_url,
            custom_slug: options.custom_slug.as_deref().filter(|s| !s.is_empty()),
            title: options.title.as_deref().filter(|s| !s.is_empty()),
        };

        let response = self
            .http_client
            .post(self.url("shorten"))
            .json(&body)
            .send()
            .await?;
        let data: ShortUrlData = self.parse_data(response).await?;
        Ok(data.into())
    }

    async fn delete_short_url(&self, domain: &str, slug: &str) -> Result<()> {
        debug!(domain, slug, "Deleting short URL");
        let response = self
            .http_client
            .delete(self.url("shorten"))
            .json(&SlugRequest { domain, slug })
            .send()
            .await?;
        self.parse_unit(response).await
    }

    async fn upload_file(&self, path: &Path, filename: &str) -> Result<UploadedFile> {
        let bytes = tokio::fs::read(path).await?;
        debug!(filename, size = bytes.len(), "Uploading file");

        let part = Part::bytes(bytes).file_name(filename.to_string());
        let form = Form::new().part("file", part);

        let response = self
            .http_client
            .post(self.url("file/upload"))
            .multipart(form)
            .send()
            .await?;
        let data: UploadData = self.parse_data(response).await?;
        Ok(data.into())
    }

    async fn delete_file(&self, delete_key_or_url: &str) -> Result<()> {
        let url = file_delete_url(&self.base_url, delete_key_or_url);
        let client = if self.is_api_origin(&url) {
            &self.http_client
        } else {
            debug!("Delete URL is outside the API origin, sending without credentials");
            &self.anon_client
        };
        debug!("Deleting hosted file");
        let response = client.get(url).send().await?;
        self.parse_unit(response).await
    }

    async fn create_text(&self, content: &str, options: &TextOptions) -> Result<TextShare> {
        debug!(text_type = %options.text_type, "Creating text share");
        let body = CreateTextRequest {
            content,
            title: &options.title,
            text_type: options.text_type,
            domain: options.domain.as_deref().filter(|d| !d.is_empty()),
        };

        let response = self
            .http_client
            .post(self.url("text"))
            .json(&body)
            .send()
            .await?;
        let data: TextData = self.parse_data(response).await?;

        let domain = data
            .domain
            .filter(|d| !d.is_empty())
            .or_else(|| options.domain.clone())
            .unwrap_or_default();
        Ok(TextShare {
            short_url: data.short_url,
            slug: data.slug,
            domain,
        })
    }

    async fn delete_text(&self, domain: &str, slug: &str) -> Result<()> {
        debug!(domain, slug, "Deleting text share");
        let response = self
            .http_client
            .delete(self.url("text"))
            .json(&SlugRequest { domain, slug })
            .send()
            .await?;
        self.parse_unit(response).await
    }
}
