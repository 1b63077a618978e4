use futures::{StreamExt, stream};
use tracing::{error, info};

use super::{MediaRef, ObjectStore};

/// Storage deletes to attempt once the owning database mutation is settled.
///
/// Deletes are best-effort: failures are logged and never reach the caller.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct CompensatingDeletes {
    keys: Vec<String>,
}

impl CompensatingDeletes {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, key: impl Into<String>) {
        let key = key.into();
        if !key.is_empty() && !self.keys.contains(&key) {
            self.keys.push(key);
        }
    }

    pub fn extend_refs<'a>(&mut self, refs: impl IntoIterator<Item = &'a MediaRef>) {
        for media in refs {
            self.push(media.key.clone());
        }
    }

    /// Issues every pending delete. Returns how many failed.
    pub async fn run(self, store: &dyn ObjectStore, concurrency: usize, reason: &str) -> usize {
        if self.keys.is_empty() {
            return 0;
        }
        let total = self.keys.len();
        let failed = delete_objects(store, self.keys, concurrency).await;
        if failed == 0 {
            info!(deleted = total, reason, "removed stored objects");
        }
        failed
    }
}

/// Deletes the given keys with at most `concurrency` requests in flight.
pub async fn delete_objects(store: &dyn ObjectStore, keys: Vec<String>, concurrency: usize) -> usize {
    stream::iter(keys)
        .map(|key| async move {
            match store.delete_object(&key).await {
                Ok(()) => true,
                Err(err) => {
                    error!(?err, %key, "failed to delete stored object");
                    false
                }
            }
        })
        .buffer_unordered(concurrency.max(1))
        .filter(|deleted| futures::future::ready(!*deleted))
        .count()
        .await
}
