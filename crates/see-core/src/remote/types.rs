//! Request/response types for the S.EE API
//!
//! Every response arrives in the same envelope, `{code, message, data}`.
//! The envelope is unwrapped into a typed value or an `Error` so callers
//! never probe optional keys.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::{Error, Result};

/// Kind of text share
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TextType {
    #[default]
    PlainText,
    Markdown,
    SourceCode,
}

impl TextType {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::PlainText => "plain_text",
            Self::Markdown => "markdown",
            Self::SourceCode => "source_code",
        }
    }

    /// Parse user input, treating anything unrecognised as plain text
    pub fn parse_lenient(value: &str) -> Self {
        value.parse().unwrap_or_default()
    }
}

impl fmt::Display for TextType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for TextType {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "plain_text" => Ok(Self::PlainText),
            "markdown" => Ok(Self::Markdown),
            "source_code" => Ok(Self::SourceCode),
            other => Err(Error::InvalidInput(format!("Unknown text type: {}", other))),
        }
    }
}

/// Optional parameters for short URL creation
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ShortUrlOptions {
    pub title: Option<String>,
    pub custom_slug: Option<String>,
}

/// A created short URL
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ShortUrl {
    pub short_url: String,
    pub slug: String,
}

/// A file hosted on S.EE
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UploadedFile {
    pub url: String,
    /// Delete key (or full delete URL); empty when the service returned none
    pub delete_key: String,
}

/// Parameters for text share creation
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TextOptions {
    pub title: String,
    pub text_type: TextType,
    pub domain: Option<String>,
}

/// A created text share
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TextShare {
    pub short_url: String,
    pub slug: String,
    pub domain: String,
}

/// Response envelope shared by every endpoint
#[derive(Debug, Deserialize)]
pub(crate) struct ApiEnvelope<T> {
    #[serde(default)]
    pub code: Option<i64>,
    #[serde(default)]
    pub message: Option<String>,
    #[serde(default = "Option::default")]
    pub data: Option<T>,
}

impl<T> ApiEnvelope<T> {
    fn check(&self) -> Result<()> {
        match self.code {
            None | Some(200..=299) => Ok(()),
            Some(code) => Err(Error::ApiError {
                status: u16::try_from(code).unwrap_or(0),
                message: self
                    .message
                    .clone()
                    .unwrap_or_else(|| "request failed".to_string()),
            }),
        }
    }

    /// Unwrap the payload, failing on an error code or a missing `data`
    pub fn into_data(self) -> Result<T> {
        self.check()?;
        self.data
            .ok_or_else(|| Error::InvalidResponse("response has no data".to_string()))
    }

    /// Check the code only, for endpoints whose payload is irrelevant
    pub fn into_unit(self) -> Result<()> {
        self.check()
    }
}

#[derive(Debug, Deserialize)]
pub(crate) struct DomainsData {
    #[serde(default)]
    pub domains: Vec<String>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct ShortUrlData {
    pub short_url: String,
    #[serde(default)]
    pub slug: Option<String>,
    #[serde(default)]
    pub custom_slug: Option<String>,
}

impl From<ShortUrlData> for ShortUrl {
    fn from(data: ShortUrlData) -> Self {
        let slug = data
            .slug
            .filter(|s| !s.is_empty())
            .or(data.custom_slug)
            .unwrap_or_default();
        Self {
            short_url: data.short_url,
            slug,
        }
    }
}

#[derive(Debug, Deserialize)]
pub(crate) struct UploadData {
    pub url: String,
    #[serde(default)]
    pub delete: Option<String>,
    #[serde(default)]
    pub hash: Option<String>,
}

impl From<UploadData> for UploadedFile {
    fn from(data: UploadData) -> Self {
        let delete_key = data
            .delete
            .filter(|d| !d.is_empty())
            .or(data.hash)
            .unwrap_or_default();
        Self {
            url: data.url,
            delete_key,
        }
    }
}

#[derive(Debug, Deserialize)]
pub(crate) struct TextData {
    pub short_url: String,
    #[serde(default)]
    pub slug: String,
    #[serde(default)]
    pub domain: Option<String>,
}

#[derive(Debug, Serialize)]
pub(crate) struct CreateShortUrlRequest<'a> {
    pub domain: &'a str,
    pub target_url: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub custom_slug: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<&'a str>,
}

#[derive(Debug, Serialize)]
pub(crate) struct SlugRequest<'a> {
    pub domain: &'a str,
    pub slug: &'a str,
}

#[derive(Debug, Serialize)]
pub(crate) struct CreateTextRequest<'a> {
    pub content: &'a str,
    pub title: &'a str,
    pub text_type: TextType,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub domain: Option<&'a str>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_text_type_parsing() {
        assert_eq!("markdown".parse::<TextType>().unwrap(), TextType::Markdown);
        assert_eq!(TextType::parse_lenient("source_code"), TextType::SourceCode);
        assert_eq!(TextType::parse_lenient("html"), TextType::PlainText);
        assert_eq!(TextType::parse_lenient(""), TextType::PlainText);
        assert!("html".parse::<TextType>().is_err());
    }

    #[test]
    fn test_text_type_serializes_snake_case() {
        assert_eq!(
            serde_json::to_string(&TextType::SourceCode).unwrap(),
            "\"source_code\""
        );
        assert_eq!(TextType::PlainText.to_string(), "plain_text");
    }

    #[test]
    fn test_envelope_success() {
        let envelope: ApiEnvelope<DomainsData> = serde_json::from_str(
            r#"{"code": 200, "message": "success", "data": {"domains": ["s.ee", "t.ly"]}}"#,
        )
        .unwrap();
        assert_eq!(envelope.into_data().unwrap().domains, vec!["s.ee", "t.ly"]);
    }

    #[test]
    fn test_envelope_error_code() {
        let envelope: ApiEnvelope<DomainsData> =
            serde_json::from_str(r#"{"code": 401, "message": "invalid token"}"#).unwrap();
        match envelope.into_data() {
            Err(Error::ApiError { status, message }) => {
                assert_eq!(status, 401);
                assert_eq!(message, "invalid token");
            }
            other => panic!("unexpected: {:?}", other),
        }
    }

    #[test]
    fn test_envelope_missing_data() {
        let envelope: ApiEnvelope<DomainsData> =
            serde_json::from_str(r#"{"code": 200, "message": "ok"}"#).unwrap();
        assert!(matches!(
            envelope.into_data(),
            Err(Error::InvalidResponse(_))
        ));
    }

    #[test]
    fn test_short_url_falls_back_to_custom_slug() {
        let data: ShortUrlData = serde_json::from_str(
            r#"{"short_url": "https://s.ee/hello", "custom_slug": "hello"}"#,
        )
        .unwrap();
        let short: ShortUrl = data.into();
        assert_eq!(short.slug, "hello");
    }

    #[test]
    fn test_upload_delete_key_prefers_delete_over_hash() {
        let with_delete: UploadData = serde_json::from_str(
            r#"{"url": "https://i.s.ee/a.png", "delete": "https://s.ee/api/v1/file/delete/abc", "hash": "abc"}"#,
        )
        .unwrap();
        assert_eq!(
            UploadedFile::from(with_delete).delete_key,
            "https://s.ee/api/v1/file/delete/abc"
        );

        let hash_only: UploadData =
            serde_json::from_str(r#"{"url": "https://i.s.ee/a.png", "hash": "abc"}"#).unwrap();
        assert_eq!(UploadedFile::from(hash_only).delete_key, "abc");

        let neither: UploadData =
            serde_json::from_str(r#"{"url": "https://i.s.ee/a.png"}"#).unwrap();
        assert_eq!(UploadedFile::from(neither).delete_key, "");
    }

    #[test]
    fn test_create_short_url_request_omits_empty_options() {
        let body = CreateShortUrlRequest {
            domain: "s.ee",
            target_url: "https://example.com/post",
            custom_slug: None,
            title: Some("Post"),
        };
        let json = serde_json::to_value(&body).unwrap();
        assert_eq!(json["domain"], "s.ee");
        assert_eq!(json["title"], "Post");
        assert!(json.get("custom_slug").is_none());
    }
}
