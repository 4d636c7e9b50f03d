//! S.EE remote API
//!
//! [`RemoteClient`] is the seam every operation talks through; [`SeeClient`]
//! is the reqwest implementation. Tests substitute their own implementation
//! or point `SeeClient` at a mock server.

pub mod client;
pub mod types;

use async_trait::async_trait;
use std::path::Path;

use crate::error::Result;

pub use client::{SeeClient, SeeClientBuilder, file_delete_url};
pub use types::{
    ShortUrl, ShortUrlOptions, TextOptions, TextShare, TextType, UploadedFile,
};

/// Operations the integration needs from the S.EE API
///
/// Every method either returns the typed result or fails with a transport,
/// authorization or response error.
#[async_trait]
pub trait RemoteClient: Send + Sync {
    /// Domains available for short URLs
    async fn get_short_domains(&self) -> Result<Vec<String>>;

    /// Domains available for hosted files
    async fn get_file_domains(&self) -> Result<Vec<String>>;

    /// Domains available for text shares
    async fn get_text_domains(&self) -> Result<Vec<String>>;

    async fn create_short_url(
        &self,
        target_url: &str,
        domain: &str,
        options: &ShortUrlOptions,
    ) -> Result<ShortUrl>;

    async fn delete_short_url(&self, domain: &str, slug: &str) -> Result<()>;

    /// Upload the file at `path` under `filename`
    async fn upload_file(&self, path: &Path, filename: &str) -> Result<UploadedFile>;

    /// Delete a hosted file by delete key, or by a full delete URL
    async fn delete_file(&self, delete_key_or_url: &str) -> Result<()>;

    async fn create_text(&self, content: &str, options: &TextOptions) -> Result<TextShare>;

    async fn delete_text(&self, domain: &str, slug: &str) -> Result<()>;
}
