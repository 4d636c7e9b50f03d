//! Link formats offered for copying

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::{Error, Result};

/// How a hosted file's link is rendered
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LinkFormat {
    #[default]
    Url,
    Html,
    Markdown,
    Bbcode,
}

impl LinkFormat {
    pub const ALL: [LinkFormat; 4] = [Self::Url, Self::Html, Self::Markdown, Self::Bbcode];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Url => "url",
            Self::Html => "html",
            Self::Markdown => "markdown",
            Self::Bbcode => "bbcode",
        }
    }
}

impl fmt::Display for LinkFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for LinkFormat {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_ascii_lowercase().as_str() {
            "url" => Ok(Self::Url),
            "html" => Ok(Self::Html),
            "markdown" | "md" => Ok(Self::Markdown),
            "bbcode" => Ok(Self::Bbcode),
            other => Err(Error::InvalidInput(format!(
                "Unknown link format: {}. Expected url, html, markdown or bbcode.",
                other
            ))),
        }
    }
}

/// Render `url` in `format`, using `name` as alt text where one is needed
pub fn format_link(url: &str, name: &str, format: LinkFormat) -> String {
    match format {
        LinkFormat::Url => url.to_string(),
        LinkFormat::Html => format!(
            "<img src=\"{}\" alt=\"{}\" />",
            escape_html(url),
            escape_html(name)
        ),
        LinkFormat::Markdown => format!("![{}]({})", name, url),
        LinkFormat::Bbcode => format!("[img]{}[/img]", url),
    }
}

/// Public URL of a short link
pub fn format_short_url(domain: &str, slug: &str) -> String {
    format!("https://{}/{}", domain, slug)
}

fn escape_html(value: &str) -> String {
    let mut out = String::with_capacity(value.len());
    for c in value.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#039;"),
            c => out.push(c),
        }
    }
    out
}
