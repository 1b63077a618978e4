use serde::Deserialize;
use thiserror::Error;
use tracing::info;

use super::{MediaRef, ObjectStore, cleanup::delete_objects, keys::storage_key_for};

/// Client-declared edits to a multi-image set.
#[derive(Debug, Clone, Default)]
pub struct DetailImageChanges {
    /// URLs of existing images to retain, in the order they should appear.
    pub keep: Vec<String>,
    /// Images the client removed.
    pub remove: Vec<RemovalRequest>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct RemovalRequest {
    #[serde(default)]
    pub url: Option<String>,
    #[serde(default)]
    pub key: Option<String>,
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ReconcileError {
    #[error("At least one detail image is required")]
    EmptyMediaSet,
}

/// Result of a successful reconciliation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Reconciliation {
    /// Final image set: kept entries followed by new uploads.
    pub images: Vec<MediaRef>,
    /// Previously referenced images that are in neither the final set nor the
    /// remove list. Their objects should be deleted once the update commits.
    pub released: Vec<MediaRef>,
}

/// Merges keep/remove declarations and fresh uploads into the final set.
///
/// Objects named in the remove list are deleted immediately. When the final
/// set would be empty the freshly uploaded objects are deleted and the call
/// fails with [`ReconcileError::EmptyMediaSet`].
pub async fn reconcile_detail_images(
    store: &dyn ObjectStore,
    existing: &[MediaRef],
    changes: &DetailImageChanges,
    uploaded: &[MediaRef],
    concurrency: usize,
) -> Result<Reconciliation, ReconcileError> {
    let mut kept: Vec<MediaRef> = Vec::with_capacity(changes.keep.len());
    for url in &changes.keep {
        let Some(position) = existing.iter().position(|media| &media.url == url) else {
            continue;
        };
        if kept.iter().any(|media| &media.url == url) {
            continue;
        }
        let current = &existing[position];
        let key = storage_key_for(Some(&current.url), Some(&current.key)).unwrap_or_default();
        kept.push(MediaRef::new(current.url.clone(), key));
    }

    let removed_keys: Vec<String> = changes
        .remove
        .iter()
        .filter_map(|request| {
            request
                .key
                .as_deref()
                .map(str::trim)
                .filter(|key| !key.is_empty())
                .map(str::to_string)
                .or_else(|| {
                    let url = request.url.as_deref()?;
                    existing
                        .iter()
                        .find(|media| media.url == url)
                        .and_then(|media| storage_key_for(Some(&media.url), Some(&media.key)))
                })
        })
        .collect();

    if !removed_keys.is_empty() {
        let count = removed_keys.len();
        delete_objects(store, removed_keys.clone(), concurrency).await;
        info!(count, "deleted detail images marked for removal");
    }

    let mut images = kept;
    images.extend(uploaded.iter().cloned());

    if images.is_empty() {
        let orphaned: Vec<String> = uploaded.iter().map(|media| media.key.clone()).collect();
        delete_objects(store, orphaned, concurrency).await;
        return Err(ReconcileError::EmptyMediaSet);
    }

    let released = existing
        .iter()
        .filter(|media| !images.iter().any(|image| image.url == media.url))
        .filter(|media| {
            let key = storage_key_for(Some(&media.url), Some(&media.key));
            key.is_some_and(|key| !removed_keys.contains(&key))
        })
        .cloned()
        .collect();

    Ok(Reconciliation { images, released })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::media::testing::{RecordingStore, media};

    #[tokio::test]
    async fn empty_request_on_empty_set_fails_without_deletes() {
        let store = RecordingStore::default();
        let result =
            reconcile_detail_images(&store, &[], &DetailImageChanges::default(), &[], 4).await;

        assert_eq!(result, Err(ReconcileError::EmptyMediaSet));
        assert!(store.deleted().is_empty());
    }

    #[tokio::test]
    async fn keep_remove_and_upload_are_merged_in_order() {
        let store = RecordingStore::default();
        let existing = vec![media("details/a.png"), media("details/b.png")];
        let changes = DetailImageChanges {
            keep: vec![existing[0].url.clone()],
            remove: vec![RemovalRequest {
                url: Some(existing[1].url.clone()),
                key: Some("details/b.png".into()),
            }],
        };
        let uploaded = vec![media("details/c.png")];

        let outcome = reconcile_detail_images(&store, &existing, &changes, &uploaded, 4)
            .await
            .expect("reconciliation succeeds");

        assert_eq!(
            outcome.images,
            vec![media("details/a.png"), media("details/c.png")]
        );
        assert!(outcome.released.is_empty());
        assert_eq!(store.deleted(), vec!["details/b.png"]);
    }

    #[tokio::test]
    async fn unknown_keep_urls_are_dropped() {
        let store = RecordingStore::default();
        let existing = vec![media("details/a.png")];
        let changes = DetailImageChanges {
            keep: vec![
                "https://elsewhere.test/x.png".into(),
                existing[0].url.clone(),
                existing[0].url.clone(),
            ],
            remove: Vec::new(),
        };

        let outcome = reconcile_detail_images(&store, &existing, &changes, &[], 4)
            .await
            .expect("reconciliation succeeds");

        assert_eq!(outcome.images, vec![media("details/a.png")]);
    }

    #[tokio::test]
    async fn emptied_set_still_applies_requested_removals() {
        let store = RecordingStore::default();
        let existing = vec![media("details/a.png")];
        let changes = DetailImageChanges {
            keep: Vec::new(),
            remove: vec![RemovalRequest {
                url: None,
                key: Some("details/a.png".into()),
            }],
        };

        let result = reconcile_detail_images(&store, &existing, &changes, &[], 4).await;

        assert_eq!(result, Err(ReconcileError::EmptyMediaSet));
        assert_eq!(store.deleted(), vec!["details/a.png"]);
    }

    #[tokio::test]
    async fn dropped_images_are_released_for_later_cleanup() {
        let store = RecordingStore::default();
        let existing = vec![media("details/a.png"), media("details/b.png")];
        let changes = DetailImageChanges {
            keep: vec![existing[0].url.clone()],
            remove: Vec::new(),
        };

        let outcome = reconcile_detail_images(&store, &existing, &changes, &[], 4)
            .await
            .expect("reconciliation succeeds");

        assert_eq!(outcome.released, vec![media("details/b.png")]);
        assert!(store.deleted().is_empty());
    }

    #[tokio::test]
    async fn removal_by_url_resolves_the_persisted_key() {
        let store = RecordingStore::default();
        let existing = vec![media("details/a.png"), media("details/b.png")];
        let changes = DetailImageChanges {
            keep: vec![existing[0].url.clone()],
            remove: vec![RemovalRequest {
                url: Some(existing[1].url.clone()),
                key: None,
            }],
        };

        reconcile_detail_images(&store, &existing, &changes, &[], 4)
            .await
            .expect("reconciliation succeeds");

        assert_eq!(store.deleted(), vec!["details/b.png"]);
    }
}
