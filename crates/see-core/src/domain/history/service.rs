//! History list persistence

use serde_json::Value;
use std::sync::Arc;
use tracing::{debug, warn};
use uuid::Uuid;

use super::entity::{HistoryEntry, HistoryKind, NewHistoryEntry};
use crate::error::{Error, Result};
use crate::storage::{Clock, OptionStore};

/// Default maximum number of entries per list
pub const DEFAULT_MAX_ENTRIES: usize = 100;

/// Bounded, newest-first history lists stored as options
#[derive(Clone)]
pub struct HistoryStore {
    options: Arc<dyn OptionStore>,
    clock: Arc<dyn Clock>,
    max_entries: usize,
}

impl HistoryStore {
    pub fn new(options: Arc<dyn OptionStore>, clock: Arc<dyn Clock>, max_entries: usize) -> Self {
        Self {
            options,
            clock,
            max_entries: max_entries.max(1),
        }
    }

    pub fn max_entries(&self) -> usize {
        self.max_entries
    }

    /// Record a new entry at the head of the list, dropping the oldest
    /// entries beyond the maximum
    ///
    /// Stored elements that no longer parse are carried over untouched.
    pub async fn add(&self, kind: HistoryKind, new: NewHistoryEntry) -> Result<HistoryEntry> {
        new.validate()?;

        let entry = HistoryEntry {
            id: format!("see_{}", Uuid::new_v4().simple()),
            url: new.url,
            delete_key: new.delete_key,
            created_at: self.clock.now(),
            fields: new.fields,
        };

        let mut raw = self.load(kind).await?;
        raw.insert(0, serde_json::to_value(&entry)?);
        raw.truncate(self.max_entries);
        self.save(kind, raw).await?;

        debug!(kind = %kind, id = %entry.id, "Recorded history entry");
        Ok(entry)
    }

    /// Readable entries newest-first; empty when none exist
    ///
    /// Elements that fail to parse are skipped, not dropped from storage.
    pub async fn list(&self, kind: HistoryKind) -> Result<Vec<HistoryEntry>> {
        let entries = self
            .load(kind)
            .await?
            .into_iter()
            .filter_map(|value| match serde_json::from_value(value) {
                Ok(entry) => Some(entry),
                Err(e) => {
                    warn!(kind = %kind, error = %e, "Skipping unreadable history entry");
                    None
                }
            })
            .collect();
        Ok(entries)
    }

    /// Entry with `id`, if recorded
    pub async fn find(&self, kind: HistoryKind, id: &str) -> Result<Option<HistoryEntry>> {
        Ok(self.list(kind).await?.into_iter().find(|e| e.id == id))
    }

    /// Remove the entry with `id`, keeping the order of the rest
    ///
    /// Returns whether anything was removed; an unknown id leaves the list
    /// untouched. The remote resource is not deleted.
    pub async fn remove(&self, kind: HistoryKind, id: &str) -> Result<bool> {
        if id.is_empty() {
            return Err(Error::InvalidInput("Invalid history ID.".to_string()));
        }

        let mut raw = self.load(kind).await?;
        let before = raw.len();
        raw.retain(|value| value.get("id").and_then(Value::as_str) != Some(id));

        if raw.len() == before {
            debug!(kind = %kind, id, "History entry not found");
            return Ok(false);
        }

        self.save(kind, raw).await?;
        debug!(kind = %kind, id, "Removed history entry");
        Ok(true)
    }

    /// Stored elements as-is; anything but an array reads as empty
    async fn load(&self, kind: HistoryKind) -> Result<Vec<Value>> {
        match self.options.get(kind.option_name()).await? {
            Some(Value::Array(values)) => Ok(values),
            Some(_) => {
                warn!(kind = %kind, "Ignoring history value that is not a list");
                Ok(Vec::new())
            }
            None => Ok(Vec::new()),
        }
    }

    async fn save(&self, kind: HistoryKind, values: Vec<Value>) -> Result<()> {
        self.options
            .set(kind.option_name(), Value::Array(values))
            .await
    }
}
