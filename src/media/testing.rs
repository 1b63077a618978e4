use std::{
    collections::HashSet,
    sync::{Mutex, PoisonError},
};

use anyhow::{Result, bail};
use async_trait::async_trait;

use super::{MediaRef, ObjectStore};

/// In-memory object store that records every call.
#[derive(Default)]
pub struct RecordingStore {
    stored: Mutex<Vec<String>>,
    deleted: Mutex<Vec<String>>,
    failing: HashSet<String>,
}

impl RecordingStore {
    pub fn failing_on(keys: &[&str]) -> Self {
        Self {
            failing: keys.iter().map(|key| key.to_string()).collect(),
            ..Self::default()
        }
    }

    pub fn stored(&self) -> Vec<String> {
        self.stored
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    pub fn deleted(&self) -> Vec<String> {
        self.deleted
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }
}

pub fn media(key: &str) -> MediaRef {
    MediaRef::new(format!("https://media.test/{key}"), key)
}

#[async_trait]
impl ObjectStore for RecordingStore {
    async fn put_object(
        &self,
        key: &str,
        _bytes: Vec<u8>,
        _content_type: &str,
    ) -> Result<MediaRef> {
        if self.failing.contains(key) {
            bail!("simulated upload failure for {key}");
        }
        self.stored
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(key.to_string());
        Ok(media(key))
    }

    async fn delete_object(&self, key: &str) -> Result<()> {
        if self.failing.contains(key) {
            bail!("simulated delete failure for {key}");
        }
        self.deleted
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(key.to_string());
        Ok(())
    }
}
