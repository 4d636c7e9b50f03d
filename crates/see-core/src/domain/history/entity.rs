//! History entities

use chrono::{DateTime, NaiveDateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use crate::error::{Error, Result};
use crate::storage::keys;

/// Which history list an entry belongs to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum HistoryKind {
    Text,
    File,
}

impl HistoryKind {
    pub const ALL: [HistoryKind; 2] = [Self::Text, Self::File];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Text => "text",
            Self::File => "file",
        }
    }

    /// Option holding this list
    pub fn option_name(&self) -> &'static str {
        match self {
            Self::Text => keys::TEXT_HISTORY,
            Self::File => keys::FILE_HISTORY,
        }
    }
}

impl fmt::Display for HistoryKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for HistoryKind {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "text" | "text_history" => Ok(Self::Text),
            "file" | "file_history" => Ok(Self::File),
            other => Err(Error::InvalidInput(format!(
                "Unknown history kind: {}. Expected text or file.",
                other
            ))),
        }
    }
}

/// One recorded share or upload
///
/// Metadata such as `title`, `slug` or `filename` sits next to the fixed
/// fields in the stored object.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HistoryEntry {
    pub id: String,
    pub url: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub delete_key: Option<String>,
    #[serde(deserialize_with = "deserialize_created_at")]
    pub created_at: DateTime<Utc>,
    #[serde(flatten)]
    pub fields: BTreeMap<String, Value>,
}

impl HistoryEntry {
    /// Metadata field as a string, if present and textual
    pub fn field(&self, name: &str) -> Option<&str> {
        self.fields.get(name).and_then(Value::as_str)
    }

    /// Human-readable label: title, then filename, then the URL
    pub fn label(&self) -> &str {
        self.field("title")
            .or_else(|| self.field("filename"))
            .unwrap_or(&self.url)
    }
}

/// Keys of the stored object that metadata fields may not use
pub const RESERVED_FIELDS: [&str; 4] = ["id", "url", "delete_key", "created_at"];

/// Accepts RFC 3339 and the host's `YYYY-MM-DD HH:MM:SS` format, read as UTC
fn deserialize_created_at<'de, D>(deserializer: D) -> std::result::Result<DateTime<Utc>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = String::deserialize(deserializer)?;
    if let Ok(parsed) = DateTime::parse_from_rfc3339(&raw) {
        return Ok(parsed.with_timezone(&Utc));
    }
    NaiveDateTime::parse_from_str(&raw, "%Y-%m-%d %H:%M:%S")
        .map(|naive| naive.and_utc())
        .map_err(serde::de::Error::custom)
}

/// Fields of an entry before it is recorded
#[derive(Debug, Clone, Default, PartialEq)]
pub struct NewHistoryEntry {
    pub url: String,
    pub delete_key: Option<String>,
    pub fields: BTreeMap<String, Value>,
}

impl NewHistoryEntry {
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            ..Self::default()
        }
    }

    /// Attach a delete key; empty keys are ignored
    pub fn delete_key(mut self, key: impl Into<String>) -> Self {
        let key = key.into();
        self.delete_key = (!key.is_empty()).then_some(key);
        self
    }

    /// Attach a metadata field
    ///
    /// Names in [`RESERVED_FIELDS`] are kept here but make
    /// [`HistoryStore::add`](super::HistoryStore::add) fail.
    pub fn field(mut self, name: impl Into<String>, value: impl Into<Value>) -> Self {
        self.fields.insert(name.into(), value.into());
        self
    }

    /// Fail on a metadata field that would shadow a fixed key
    pub fn validate(&self) -> Result<()> {
        if self.url.is_empty() {
            return Err(Error::InvalidInput("A URL is required.".to_string()));
        }
        match self
            .fields
            .keys()
            .find(|name| RESERVED_FIELDS.contains(&name.as_str()))
        {
            Some(name) => Err(Error::InvalidInput(format!(
                "Field name '{}' is reserved.",
                name
            ))),
            None => Ok(()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_entry_serializes_flat() {
        let entry = HistoryEntry {
            id: "see_1".to_string(),
            url: "https://s.ee/x".to_string(),
            delete_key: None,
            created_at: Utc::now(),
            fields: BTreeMap::from([("filename".to_string(), json!("x.png"))]),
        };

        let value = serde_json::to_value(&entry).unwrap();
        assert_eq!(value["filename"], "x.png");
        assert!(value.get("delete_key").is_none());
        assert!(value.get("fields").is_none());

        let back: HistoryEntry = serde_json::from_value(value).unwrap();
        assert_eq!(back, entry);
        assert_eq!(back.label(), "x.png");
    }

    #[test]
    fn test_builder_drops_empty_delete_key() {
        let new = NewHistoryEntry::new("https://s.ee/x").delete_key("");
        assert!(new.delete_key.is_none());

        let new = NewHistoryEntry::new("https://s.ee/x")
            .delete_key("k1")
            .field("title", "Hello");
        assert_eq!(new.delete_key.as_deref(), Some("k1"));
        assert_eq!(new.fields["title"], json!("Hello"));
    }

    #[test]
    fn test_reserved_field_names_fail_validation() {
        for name in RESERVED_FIELDS {
            let new = NewHistoryEntry::new("https://s.ee/x").field(name, "spoofed");
            assert!(matches!(new.validate(), Err(Error::InvalidInput(_))), "{}", name);
        }
        assert!(NewHistoryEntry::new("https://s.ee/x")
            .field("slug", "x")
            .validate()
            .is_ok());
        assert!(NewHistoryEntry::new("").validate().is_err());
    }

    #[test]
    fn test_created_at_accepts_host_datetime_format() {
        let entry: HistoryEntry = serde_json::from_value(json!({
            "id": "see_old",
            "url": "https://s.ee/old",
            "created_at": "2024-01-01 12:00:00"
        }))
        .unwrap();
        assert_eq!(entry.created_at.to_rfc3339(), "2024-01-01T12:00:00+00:00");
        assert!(entry.fields.is_empty());

        let bad = serde_json::from_value::<HistoryEntry>(json!({
            "id": "see_bad",
            "url": "https://s.ee/bad",
            "created_at": "yesterday"
        }));
        assert!(bad.is_err());
    }

    #[test]
    fn test_kind_parsing() {
        assert_eq!("file_history".parse::<HistoryKind>().unwrap(), HistoryKind::File);
        assert_eq!(HistoryKind::Text.option_name(), "see_text_history");
        assert!("image".parse::<HistoryKind>().is_err());
    }
}
