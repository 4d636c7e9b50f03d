//! JSON-file option and transient stores
//!
//! Each store is a single JSON object on disk. Writes go to a sibling
//! temporary file first and are renamed into place, so a crash mid-write
//! leaves the previous contents intact.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Mutex;

use super::{Clock, OptionStore, SystemClock, TransientStore, expiry};
use crate::error::{Error, Result};

/// File name of the option store inside the data directory
pub const OPTIONS_FILE: &str = "options.json";

/// File name of the transient store inside the data directory
pub const TRANSIENTS_FILE: &str = "transients.json";

/// Option store persisted as a JSON object
#[derive(Debug)]
pub struct FileOptionStore {
    path: PathBuf,
    lock: Mutex<()>,
}

impl FileOptionStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            lock: Mutex::new(()),
        }
    }

    /// Store at `<dir>/options.json`
    pub fn in_dir(dir: &Path) -> Self {
        Self::new(dir.join(OPTIONS_FILE))
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

#[async_trait]
impl OptionStore for FileOptionStore {
    async fn get(&self, name: &str) -> Result<Option<Value>> {
        let _guard = self.lock.lock().await;
        let values: BTreeMap<String, Value> = read_json(&self.path).await?;
        Ok(values.get(name).cloned())
    }

    async fn set(&self, name: &str, value: Value) -> Result<()> {
        let _guard = self.lock.lock().await;
        let mut values: BTreeMap<String, Value> = read_json(&self.path).await?;
        values.insert(name.to_string(), value);
        write_json(&self.path, &values).await
    }

    async fn delete(&self, name: &str) -> Result<()> {
        let _guard = self.lock.lock().await;
        let mut values: BTreeMap<String, Value> = read_json(&self.path).await?;
        if values.remove(name).is_some() {
            write_json(&self.path, &values).await?;
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
struct TransientRecord {
    value: Value,
    expires_at: DateTime<Utc>,
}

/// Transient store persisted as a JSON object of `{value, expires_at}` records
#[derive(Debug)]
pub struct FileTransientStore {
    path: PathBuf,
    clock: Arc<dyn Clock>,
    lock: Mutex<()>,
}

impl FileTransientStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self::with_clock(path, Arc::new(SystemClock))
    }

    pub fn with_clock(path: impl Into<PathBuf>, clock: Arc<dyn Clock>) -> Self {
        Self {
            path: path.into(),
            clock,
            lock: Mutex::new(()),
        }
    }

    /// Store at `<dir>/transients.json`
    pub fn in_dir(dir: &Path) -> Self {
        Self::new(dir.join(TRANSIENTS_FILE))
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

#[async_trait]
impl TransientStore for FileTransientStore {
    async fn get(&self, name: &str) -> Result<Option<Value>> {
        let _guard = self.lock.lock().await;
        let records: BTreeMap<String, TransientRecord> = read_json(&self.path).await?;
        let now = self.clock.now();

        Ok(records
            .get(name)
            .filter(|record| now < record.expires_at)
            .map(|record| record.value.clone()))
    }

    async fn set(&self, name: &str, value: Value, ttl: Duration) -> Result<()> {
        let _guard = self.lock.lock().await;
        let mut records: BTreeMap<String, TransientRecord> = read_json(&self.path).await?;
        let now = self.clock.now();

        // Expired records are swept whenever the file is rewritten
        records.retain(|_, record| now < record.expires_at);
        records.insert(
            name.to_string(),
            TransientRecord {
                value,
                expires_at: expiry(now, ttl),
            },
        );
        write_json(&self.path, &records).await
    }

    async fn delete(&self, name: &str) -> Result<()> {
        let _guard = self.lock.lock().await;
        let mut records: BTreeMap<String, TransientRecord> = read_json(&self.path).await?;
        if records.remove(name).is_some() {
            write_json(&self.path, &records).await?;
        }
        Ok(())
    }
}

async fn read_json<T: DeserializeOwned + Default>(path: &Path) -> Result<T> {
    match tokio::fs::read(path).await {
        Ok(bytes) if bytes.is_empty() => Ok(T::default()),
        Ok(bytes) => serde_json::from_slice(&bytes).map_err(|e| {
            Error::StorageError(format!("Failed to parse {}: {}", path.display(), e))
        }),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(T::default()),
        Err(e) => Err(Error::StorageError(format!(
            "Failed to read {}: {}",
            path.display(),
            e
        ))),
    }
}

async fn write_json<T: Serialize>(path: &Path, value: &T) -> Result<()> {
    if let Some(parent) = path.parent()
        && !parent.as_os_str().is_empty()
    {
        tokio::fs::create_dir_all(parent).await.map_err(|e| {
            Error::StorageError(format!("Failed to create {}: {}", parent.display(), e))
        })?;
    }

    let contents = serde_json::to_vec_pretty(value)?;
    let tmp = path.with_extension("json.tmp");

    tokio::fs::write(&tmp, contents)
        .await
        .map_err(|e| Error::StorageError(format!("Failed to write {}: {}", tmp.display(), e)))?;
    tokio::fs::rename(&tmp, path)
        .await
        .map_err(|e| Error::StorageError(format!("Failed to replace {}: {}", path.display(), e)))?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::ManualClock;
    use serde_json::json;
    use tempfile::TempDir;

    #[tokio::test]
    async fn test_file_option_store_persists_across_instances() {
        let dir = TempDir::new().unwrap();

        let store = FileOptionStore::in_dir(dir.path());
        store.set("see_auto_shorten", json!("1")).await.unwrap();
        store
            .set("see_default_domain", json!("s.ee"))
            .await
            .unwrap();

        let reopened = FileOptionStore::in_dir(dir.path());
        assert_eq!(
            reopened.get("see_auto_shorten").await.unwrap(),
            Some(json!("1"))
        );

        reopened.delete("see_auto_shorten").await.unwrap();
        assert!(store.get("see_auto_shorten").await.unwrap().is_none());
        assert_eq!(
            store.get("see_default_domain").await.unwrap(),
            Some(json!("s.ee"))
        );
    }

    #[tokio::test]
    async fn test_file_option_store_missing_file_is_empty() {
        let dir = TempDir::new().unwrap();
        let store = FileOptionStore::new(dir.path().join("nested").join("options.json"));
        assert!(store.get("anything").await.unwrap().is_none());

        // First write creates the parent directory
        store.set("anything", json!(1)).await.unwrap();
        assert!(store.path().exists());
    }

    #[tokio::test]
    async fn test_file_option_store_rejects_corrupt_file() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join(OPTIONS_FILE);
        std::fs::write(&path, "{ not json").unwrap();

        let store = FileOptionStore::new(&path);
        let err = store.get("see_api_key").await.unwrap_err();
        assert!(matches!(err, Error::StorageError(_)));
    }

    #[tokio::test]
    async fn test_file_transient_store_expiry() {
        let dir = TempDir::new().unwrap();
        let clock = Arc::new(ManualClock::default());
        let store =
            FileTransientStore::with_clock(dir.path().join(TRANSIENTS_FILE), clock.clone());

        store
            .set(
                "see_text_domains_cache",
                json!({"domains": ["t.example"]}),
                Duration::from_secs(300),
            )
            .await
            .unwrap();
        assert!(store.get("see_text_domains_cache").await.unwrap().is_some());

        clock.advance(Duration::from_secs(301));
        assert!(store.get("see_text_domains_cache").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_file_transient_store_delete() {
        let dir = TempDir::new().unwrap();
        let store = FileTransientStore::in_dir(dir.path());
        store
            .set("see_domains_cache", json!([]), Duration::from_secs(60))
            .await
            .unwrap();
        store.delete("see_domains_cache").await.unwrap();
        assert!(store.get("see_domains_cache").await.unwrap().is_none());
    }
}
