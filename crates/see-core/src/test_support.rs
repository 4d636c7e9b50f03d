//! Shared fixtures for unit tests

use async_trait::async_trait;
use std::path::Path;
use std::sync::{Arc, Mutex};

use crate::context::ClientFactory;
use crate::error::{Error, Result};
use crate::remote::{
    RemoteClient, ShortUrl, ShortUrlOptions, TextOptions, TextShare, UploadedFile,
};

/// Remote client that answers from canned data and records every call
#[derive(Debug, Default)]
pub(crate) struct MockRemote {
    pub short_domains: Vec<String>,
    pub file_domains: Vec<String>,
    pub text_domains: Vec<String>,
    /// Every call fails with a 500 when set
    pub fail: bool,
    /// Only the text domain list fails when set
    pub fail_text: bool,
    calls: Mutex<Vec<String>>,
}

impl MockRemote {
    pub fn with_domains(short: &[&str], file: &[&str], text: &[&str]) -> Self {
        Self {
            short_domains: short.iter().map(|s| s.to_string()).collect(),
            file_domains: file.iter().map(|s| s.to_string()).collect(),
            text_domains: text.iter().map(|s| s.to_string()).collect(),
            ..Self::default()
        }
    }

    pub fn failing() -> Self {
        Self {
            fail: true,
            ..Self::default()
        }
    }

    /// Fail only the text domain list
    pub fn text_failing(mut self) -> Self {
        self.fail_text = true;
        self
    }

    /// Number of calls whose record starts with `prefix`
    pub fn calls_to(&self, prefix: &str) -> usize {
        self.calls().iter().filter(|c| c.starts_with(prefix)).count()
    }

    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }

    fn record(&self, call: String) -> Result<()> {
        self.calls.lock().unwrap().push(call);
        if self.fail {
            Err(Error::ApiError {
                status: 500,
                message: "mock failure".to_string(),
            })
        } else {
            Ok(())
        }
    }
}

#[async_trait]
impl RemoteClient for MockRemote {
    async fn get_short_domains(&self) -> Result<Vec<String>> {
        self.record("get_short_domains".to_string())?;
        Ok(self.short_domains.clone())
    }

    async fn get_file_domains(&self) -> Result<Vec<String>> {
        self.record("get_file_domains".to_string())?;
        Ok(self.file_domains.clone())
    }

    async fn get_text_domains(&self) -> Result<Vec<String>> {
        self.record("get_text_domains".to_string())?;
        if self.fail_text {
            return Err(Error::ApiError {
                status: 404,
                message: "text sharing not enabled".to_string(),
            });
        }
        Ok(self.text_domains.clone())
    }

    async fn create_short_url(
        &self,
        target_url: &str,
        domain: &str,
        options: &ShortUrlOptions,
    ) -> Result<ShortUrl> {
        self.record(format!("create_short_url {} {}", domain, target_url))?;
        let slug = options
            .custom_slug
            .clone()
            .unwrap_or_else(|| "abc123".to_string());
        Ok(ShortUrl {
            short_url: format!("https://{}/{}", domain, slug),
            slug,
        })
    }

    async fn delete_short_url(&self, domain: &str, slug: &str) -> Result<()> {
        self.record(format!("delete_short_url {} {}", domain, slug))
    }

    async fn upload_file(&self, _path: &Path, filename: &str) -> Result<UploadedFile> {
        self.record(format!("upload_file {}", filename))?;
        Ok(UploadedFile {
            url: format!("https://i.s.ee/{}", filename),
            delete_key: format!("del-{}", filename),
        })
    }

    async fn delete_file(&self, delete_key_or_url: &str) -> Result<()> {
        self.record(format!("delete_file {}", delete_key_or_url))
    }

    async fn create_text(&self, _content: &str, options: &TextOptions) -> Result<TextShare> {
        let domain = options.domain.clone().unwrap_or_else(|| "s.ee".to_string());
        self.record(format!("create_text {} {}", domain, options.text_type))?;
        Ok(TextShare {
            short_url: format!("https://{}/txt1", domain),
            slug: "txt1".to_string(),
            domain,
        })
    }

    async fn delete_text(&self, domain: &str, slug: &str) -> Result<()> {
        self.record(format!("delete_text {} {}", domain, slug))
    }
}

/// Factory handing out one shared [`MockRemote`] and recording the keys used
#[derive(Debug)]
pub(crate) struct MockFactory {
    pub remote: Arc<MockRemote>,
    created: Mutex<Vec<(String, String)>>,
}

impl MockFactory {
    pub fn new(remote: MockRemote) -> Self {
        Self {
            remote: Arc::new(remote),
            created: Mutex::new(Vec::new()),
        }
    }

    /// `(api_key, base_url)` of every client created so far
    pub fn created(&self) -> Vec<(String, String)> {
        self.created.lock().unwrap().clone()
    }
}

impl ClientFactory for MockFactory {
    fn create(&self, api_key: &str, base_url: &str) -> Result<Arc<dyn RemoteClient>> {
        self.created
            .lock()
            .unwrap()
            .push((api_key.to_string(), base_url.to_string()));
        Ok(self.remote.clone())
    }
}
