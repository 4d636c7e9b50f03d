//! In-memory option and transient stores
//!
//! These keep everything in process memory. They suit tests and hosts whose
//! lifetime spans many requests; a CLI invocation wants the file stores.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde_json::Value;
use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use super::{Clock, OptionStore, SystemClock, TransientStore, expiry};
use crate::error::Result;

/// In-memory option store
#[derive(Debug, Default)]
pub struct InMemoryOptionStore {
    values: Mutex<HashMap<String, Value>>,
}

impl InMemoryOptionStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of stored options
    pub fn len(&self) -> usize {
        self.values.lock().unwrap_or_else(|e| e.into_inner()).len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[async_trait]
impl OptionStore for InMemoryOptionStore {
    async fn get(&self, name: &str) -> Result<Option<Value>> {
        Ok(self
            .values
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .get(name)
            .cloned())
    }

    async fn set(&self, name: &str, value: Value) -> Result<()> {
        self.values
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .insert(name.to_string(), value);
        Ok(())
    }

    async fn delete(&self, name: &str) -> Result<()> {
        self.values
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .remove(name);
        Ok(())
    }
}

/// In-memory transient store
///
/// Expiry is evaluated lazily on read against the injected clock.
#[derive(Debug)]
pub struct InMemoryTransientStore {
    values: Mutex<HashMap<String, (Value, DateTime<Utc>)>>,
    clock: Arc<dyn Clock>,
}

impl Default for InMemoryTransientStore {
    fn default() -> Self {
        Self::new()
    }
}

impl InMemoryTransientStore {
    pub fn new() -> Self {
        Self::with_clock(Arc::new(SystemClock))
    }

    pub fn with_clock(clock: Arc<dyn Clock>) -> Self {
        Self {
            values: Mutex::new(HashMap::new()),
            clock,
        }
    }

    /// Whether a live (unexpired) value exists
    pub fn contains(&self, name: &str) -> bool {
        let now = self.clock.now();
        self.values
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .get(name)
            .is_some_and(|(_, expires_at)| now < *expires_at)
    }
}

#[async_trait]
impl TransientStore for InMemoryTransientStore {
    async fn get(&self, name: &str) -> Result<Option<Value>> {
        let now = self.clock.now();
        let mut values = self.values.lock().unwrap_or_else(|e| e.into_inner());

        match values.get(name) {
            Some((value, expires_at)) if now < *expires_at => Ok(Some(value.clone())),
            Some(_) => {
                values.remove(name);
                Ok(None)
            }
            None => Ok(None),
        }
    }

    async fn set(&self, name: &str, value: Value, ttl: Duration) -> Result<()> {
        let expires_at = expiry(self.clock.now(), ttl);
        self.values
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .insert(name.to_string(), (value, expires_at));
        Ok(())
    }

    async fn delete(&self, name: &str) -> Result<()> {
        self.values
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .remove(name);
        Ok(())
    }
}
