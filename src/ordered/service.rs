use serde_json::{Map, Value};
use thiserror::Error;
use tracing::{error, info, warn};
use uuid::Uuid;

use crate::media::{
    CompensatingDeletes, DetailImageChanges, MediaRef, ObjectStore, ReconcileError,
    delete_objects, reconcile_detail_images,
};

use super::{
    kind::{MediaLayout, ResourceKind},
    ordering::{
        ReorderItem, allocate_next_order, apply_reorder, renumber_after_delete, validate_reorder,
    },
    record::{NewRecord, ResourceRecord},
    repository::{ListFilter, ResourceRepository},
};

#[derive(Debug, Error)]
pub enum ResourceError {
    #[error("{message}")]
    Invalid {
        message: String,
        errors: Vec<String>,
    },

    #[error("{} not found", .0.label)]
    NotFound(&'static ResourceKind),

    #[error("{0}")]
    Conflict(String),

    #[error(transparent)]
    Media(#[from] ReconcileError),

    /// Repository failure. `context` is safe to show to clients.
    #[error("{context}")]
    Repository {
        context: String,
        #[source]
        source: anyhow::Error,
    },
}

impl ResourceError {
    pub fn invalid(message: impl Into<String>) -> Self {
        Self::Invalid {
            message: message.into(),
            errors: Vec::new(),
        }
    }

    pub fn with_errors(errors: Vec<String>) -> Self {
        Self::Invalid {
            message: "Validation errors".into(),
            errors,
        }
    }

    fn repository(kind: &ResourceKind, action: &str, source: anyhow::Error) -> Self {
        Self::Repository {
            context: format!("Failed to {action} {}", kind.label.to_lowercase()),
            source,
        }
    }
}

pub type ResourceResult<T> = Result<T, ResourceError>;

/// Validated attributes of a record to create.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Draft {
    pub category: Option<String>,
    pub fields: Map<String, Value>,
}

/// Partial update. Only present values are written.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Patch {
    pub category: Option<String>,
    pub fields: Map<String, Value>,
    pub is_active: Option<bool>,
}

/// Objects written to the store for the current request.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct UploadedMedia {
    pub primary: Option<MediaRef>,
    pub details: Vec<MediaRef>,
}

impl UploadedMedia {
    pub fn keys(&self) -> Vec<String> {
        self.primary
            .iter()
            .chain(self.details.iter())
            .map(|media| media.key.clone())
            .collect()
    }
}

/// Create/update/delete/reorder for one ordered resource, keeping stored
/// objects in step with the rows that reference them.
pub struct OrderedResources<'a> {
    repo: &'a dyn ResourceRepository,
    store: &'a dyn ObjectStore,
    concurrency: usize,
}

impl<'a> OrderedResources<'a> {
    pub fn new(
        repo: &'a dyn ResourceRepository,
        store: &'a dyn ObjectStore,
        concurrency: usize,
    ) -> Self {
        Self {
            repo,
            store,
            concurrency: concurrency.max(1),
        }
    }

    pub fn kind(&self) -> &'static ResourceKind {
        self.repo.kind()
    }

    /// Deletes this request's uploads and hands back `err`. Used when the
    /// request is rejected after intake already wrote its files.
    pub async fn abandon(&self, uploads: UploadedMedia, err: ResourceError) -> ResourceError {
        self.discard(uploads).await;
        err
    }

    /// Deletes objects written for a request that will not be persisted.
    pub async fn discard(&self, uploads: UploadedMedia) {
        let keys = uploads.keys();
        if keys.is_empty() {
            return;
        }
        let count = keys.len();
        delete_objects(self.store, keys, self.concurrency).await;
        warn!(count, resource = self.kind().label, "deleted uploads of failed request");
    }

    pub async fn get(&self, id: Uuid) -> ResourceResult<ResourceRecord> {
        self.repo
            .find(id)
            .await
            .map_err(|err| ResourceError::repository(self.kind(), "fetch", err))?
            .ok_or(ResourceError::NotFound(self.kind()))
    }

    pub async fn find_by_field(&self, field: &str, value: &str) -> ResourceResult<ResourceRecord> {
        self.repo
            .find_by_field(field, value)
            .await
            .map_err(|err| ResourceError::repository(self.kind(), "fetch", err))?
            .ok_or(ResourceError::NotFound(self.kind()))
    }

    pub async fn list(&self, filter: &ListFilter) -> ResourceResult<Vec<ResourceRecord>> {
        self.repo
            .list(filter)
            .await
            .map_err(|err| ResourceError::repository(self.kind(), "fetch", err))
    }

    pub async fn count(&self, filter: &ListFilter) -> ResourceResult<i64> {
        self.repo
            .count(filter)
            .await
            .map_err(|err| ResourceError::repository(self.kind(), "count", err))
    }

    /// Inserts a record at the end of its partition, attaching `uploads`.
    /// Uploads are deleted again when the record cannot be stored.
    pub async fn create(
        &self,
        draft: Draft,
        uploads: UploadedMedia,
    ) -> ResourceResult<ResourceRecord> {
        let kind = self.kind();

        if let Err(err) = check_required_media(kind, &uploads) {
            return Err(self.abandon(uploads, err).await);
        }

        let category = if kind.is_partitioned() {
            draft.category
        } else {
            None
        };

        let display_order = match allocate_next_order(self.repo, category.as_deref()).await {
            Ok(order) => order,
            Err(err) => {
                let err = ResourceError::repository(kind, "create", err);
                return Err(self.abandon(uploads, err).await);
            }
        };

        let record = NewRecord {
            category,
            display_order,
            is_active: true,
            image: uploads.primary.clone(),
            detail_images: uploads.details.clone(),
            fields: draft.fields,
        };

        match self.repo.insert(record).await {
            Ok(created) => {
                info!(id = %created.id, resource = kind.label, display_order, "created record");
                Ok(created)
            }
            Err(err) => {
                let err = ResourceError::repository(kind, "create", err);
                Err(self.abandon(uploads, err).await)
            }
        }
    }

    /// Applies `patch` and any replacement media to an existing record.
    ///
    /// A new primary upload replaces the old object, which is deleted after
    /// the row is written. Detail images are reconciled only when `details`
    /// is given or new detail files were uploaded. A changed partition keeps
    /// the record's order value.
    pub async fn update(
        &self,
        id: Uuid,
        patch: Patch,
        uploads: UploadedMedia,
        details: Option<DetailImageChanges>,
    ) -> ResourceResult<ResourceRecord> {
        let kind = self.kind();

        let existing = match self.repo.find(id).await {
            Ok(Some(record)) => record,
            Ok(None) => return Err(self.abandon(uploads, ResourceError::NotFound(kind)).await),
            Err(err) => {
                let err = ResourceError::repository(kind, "update", err);
                return Err(self.abandon(uploads, err).await);
            }
        };

        let mut pending = CompensatingDeletes::new();
        let mut record = existing.clone();

        let reconciles = matches!(kind.media, MediaLayout::Featured { .. })
            && (details.is_some() || !uploads.details.is_empty());
        if reconciles {
            let changes = details.unwrap_or_default();
            match reconcile_detail_images(
                self.store,
                &existing.detail_images,
                &changes,
                &uploads.details,
                self.concurrency,
            )
            .await
            {
                Ok(outcome) => {
                    record.detail_images = outcome.images;
                    pending.extend_refs(&outcome.released);
                }
                Err(err) => {
                    // Reconciliation already removed the new detail uploads.
                    let primary_only = UploadedMedia {
                        primary: uploads.primary,
                        details: Vec::new(),
                    };
                    return Err(self.abandon(primary_only, err.into()).await);
                }
            }
        }

        if matches!(kind.media, MediaLayout::Set { .. }) && !uploads.details.is_empty() {
            let previous = std::mem::replace(&mut record.detail_images, uploads.details.clone());
            pending.extend_refs(&previous);
        }

        if let Some(category) = patch.category.filter(|_| kind.is_partitioned()) {
            record.category = Some(category);
        }
        record.fields.extend(patch.fields);
        if let Some(is_active) = patch.is_active {
            record.is_active = is_active;
        }
        if let Some(replacement) = uploads.primary.clone() {
            if let Some(previous) = record.image.replace(replacement) {
                pending.push(previous.key);
            }
        }

        let saved = match self.repo.save(&record).await {
            Ok(Some(saved)) => saved,
            Ok(None) => return Err(self.abandon(uploads, ResourceError::NotFound(kind)).await),
            Err(err) => {
                let err = ResourceError::repository(kind, "update", err);
                return Err(self.abandon(uploads, err).await);
            }
        };

        pending
            .run(self.store, self.concurrency, "replaced by update")
            .await;

        Ok(saved)
    }

    /// Flips the active flag.
    pub async fn toggle_active(&self, id: Uuid) -> ResourceResult<ResourceRecord> {
        let mut record = self.get(id).await?;
        record.is_active = !record.is_active;

        self.repo
            .save(&record)
            .await
            .map_err(|err| ResourceError::repository(self.kind(), "update", err))?
            .ok_or(ResourceError::NotFound(self.kind()))
    }

    /// Removes the row, then its stored objects, then closes the order gap.
    /// Failures after the row is gone are logged only.
    pub async fn delete(&self, id: Uuid) -> ResourceResult<ResourceRecord> {
        let kind = self.kind();

        let deleted = self
            .repo
            .delete(id)
            .await
            .map_err(|err| ResourceError::repository(kind, "delete", err))?
            .ok_or(ResourceError::NotFound(kind))?;

        let mut pending = CompensatingDeletes::new();
        for key in deleted.media_keys() {
            pending.push(key);
        }
        pending
            .run(self.store, self.concurrency, "record deleted")
            .await;

        // The row is already gone; a stale order gap is repaired by the next
        // reorder.
        if let Err(err) = renumber_after_delete(self.repo, &deleted).await {
            error!(?err, %id, resource = kind.label, "failed to close display order gap");
        }

        info!(%id, resource = kind.label, "deleted record");
        Ok(deleted)
    }

    /// Validates and applies a batch of order assignments. Returns how many
    /// rows were updated.
    pub async fn reorder(&self, items: &[ReorderItem]) -> ResourceResult<usize> {
        let kind = self.kind();
        let assignments =
            validate_reorder(items, kind.min_display_order).map_err(ResourceError::with_errors)?;

        let updated = apply_reorder(self.repo, &assignments, self.concurrency)
            .await
            .map_err(|err| ResourceError::repository(kind, "reorder", err))?;

        info!(
            requested = assignments.len(),
            updated,
            resource = kind.label,
            "applied reorder"
        );
        Ok(updated)
    }
}

fn check_required_media(kind: &ResourceKind, uploads: &UploadedMedia) -> ResourceResult<()> {
    match kind.media {
        MediaLayout::Single { required: true, .. } if uploads.primary.is_none() => {
            Err(ResourceError::invalid("Image file is required"))
        }
        MediaLayout::Featured { .. } if uploads.primary.is_none() || uploads.details.is_empty() => {
            Err(ResourceError::invalid(
                "Featured image and detail images are required",
            ))
        }
        MediaLayout::Set { required: true, .. } if uploads.details.is_empty() => Err(
            ResourceError::invalid("At least one image is required"),
        ),
        _ => Ok(()),
    }
}

#[cfg(test)]
mod tests {
    use std::collections::BTreeSet;

    use serde_json::json;

    use super::*;
    use crate::{
        media::{
            RemovalRequest,
            testing::{RecordingStore, media},
        },
        ordered::{
            kind::{
                CARD_TESTIMONIALS, CAROUSELS, GALLERY_ITEMS, LEADERSHIP_MEMBERS,
                PARTNER_INSTITUTIONS,
            },
            memory::MemoryRepository,
        },
    };

    fn draft(category: Option<&str>, title: &str) -> Draft {
        let mut fields = Map::new();
        fields.insert("title".into(), json!(title));
        Draft {
            category: category.map(str::to_string),
            fields,
        }
    }

    fn single(key: &str) -> UploadedMedia {
        UploadedMedia {
            primary: Some(media(key)),
            details: Vec::new(),
        }
    }

    fn orders(repo: &MemoryRepository, category: &str) -> Vec<(String, i32)> {
        let mut rows: Vec<(String, i32)> = repo
            .snapshot()
            .into_iter()
            .filter(|record| record.category.as_deref() == Some(category))
            .map(|record| {
                (
                    record.field_str("title").unwrap_or_default().to_string(),
                    record.display_order,
                )
            })
            .collect();
        rows.sort_by_key(|(_, order)| *order);
        rows
    }

    #[tokio::test]
    async fn sequential_creations_fill_each_partition_from_one() {
        let repo = MemoryRepository::new(&LEADERSHIP_MEMBERS);
        let store = RecordingStore::default();
        let service = OrderedResources::new(&repo, &store, 4);

        for n in 0..5 {
            service
                .create(draft(Some("staff"), &format!("s{n}")), UploadedMedia::default())
                .await
                .unwrap();
        }
        for n in 0..2 {
            service
                .create(draft(Some("advisors"), &format!("a{n}")), UploadedMedia::default())
                .await
                .unwrap();
        }

        let staff: BTreeSet<i32> = orders(&repo, "staff").into_iter().map(|(_, o)| o).collect();
        let advisors: BTreeSet<i32> = orders(&repo, "advisors")
            .into_iter()
            .map(|(_, o)| o)
            .collect();
        assert_eq!(staff, (1..=5).collect());
        assert_eq!(advisors, (1..=2).collect());
    }

    #[tokio::test]
    async fn deleting_the_first_item_closes_the_gap_in_order() {
        let repo = MemoryRepository::new(&GALLERY_ITEMS);
        let store = RecordingStore::default();
        let service = OrderedResources::new(&repo, &store, 4);

        let mut first = None;
        for title in ["a", "b", "c", "d"] {
            let created = service
                .create(draft(Some("events"), title), single(&format!("gallery/{title}.png")))
                .await
                .unwrap();
            first.get_or_insert(created.id);
        }
        service
            .create(draft(Some("digital"), "other"), single("gallery/other.png"))
            .await
            .unwrap();

        service.delete(first.unwrap()).await.unwrap();

        assert_eq!(
            orders(&repo, "events"),
            vec![("b".into(), 1), ("c".into(), 2), ("d".into(), 3)]
        );
        assert_eq!(orders(&repo, "digital"), vec![("other".into(), 1)]);
    }

    #[tokio::test]
    async fn delete_succeeds_when_closing_the_gap_fails() {
        let repo = MemoryRepository::new(&CARD_TESTIMONIALS);
        let store = RecordingStore::default();
        let service = OrderedResources::new(&repo, &store, 4);

        let first = service
            .create(draft(None, "first"), single("testimonials/1-a.png"))
            .await
            .unwrap();
        service
            .create(draft(None, "second"), UploadedMedia::default())
            .await
            .unwrap();

        repo.fail_writes(true);
        let deleted = service.delete(first.id).await.unwrap();

        assert_eq!(deleted.id, first.id);
        assert_eq!(repo.snapshot().len(), 1);
        assert_eq!(repo.snapshot()[0].display_order, 2);
        assert_eq!(store.deleted(), vec!["testimonials/1-a.png"]);
    }

    #[tokio::test]
    async fn create_then_delete_removes_the_object_exactly_once() {
        let repo = MemoryRepository::new(&CARD_TESTIMONIALS);
        let store = RecordingStore::default();
        let service = OrderedResources::new(&repo, &store, 4);

        let created = service
            .create(draft(None, "quote"), single("testimonials/1-face.png"))
            .await
            .unwrap();
        service.delete(created.id).await.unwrap();

        assert!(repo.snapshot().is_empty());
        assert_eq!(store.deleted(), vec!["testimonials/1-face.png"]);
    }

    #[tokio::test]
    async fn missing_required_image_is_rejected() {
        let repo = MemoryRepository::new(&GALLERY_ITEMS);
        let store = RecordingStore::default();
        let service = OrderedResources::new(&repo, &store, 4);

        let err = service
            .create(draft(Some("events"), "a"), UploadedMedia::default())
            .await
            .unwrap_err();

        assert_eq!(err.to_string(), "Image file is required");
        assert!(repo.snapshot().is_empty());
    }

    #[tokio::test]
    async fn failed_insert_deletes_the_upload() {
        let repo = MemoryRepository::new(&GALLERY_ITEMS);
        repo.fail_writes(true);
        let store = RecordingStore::default();
        let service = OrderedResources::new(&repo, &store, 4);

        let err = service
            .create(draft(Some("events"), "a"), single("gallery/1-a.png"))
            .await
            .unwrap_err();

        assert!(matches!(err, ResourceError::Repository { .. }));
        assert_eq!(err.to_string(), "Failed to create gallery item");
        assert_eq!(store.deleted(), vec!["gallery/1-a.png"]);
    }

    #[tokio::test]
    async fn replacing_the_image_deletes_the_old_object_after_save() {
        let repo = MemoryRepository::new(&GALLERY_ITEMS);
        let store = RecordingStore::default();
        let service = OrderedResources::new(&repo, &store, 4);
        let created = service
            .create(draft(Some("events"), "a"), single("gallery/1-old.png"))
            .await
            .unwrap();

        let mut patch = Patch::default();
        patch.fields.insert("title".into(), json!("renamed"));
        let updated = service
            .update(created.id, patch, single("gallery/2-new.png"), None)
            .await
            .unwrap();

        assert_eq!(updated.image, Some(media("gallery/2-new.png")));
        assert_eq!(updated.field_str("title"), Some("renamed"));
        assert_eq!(store.deleted(), vec!["gallery/1-old.png"]);
    }

    #[tokio::test]
    async fn failed_update_keeps_old_object_and_drops_new_one() {
        let repo = MemoryRepository::new(&GALLERY_ITEMS);
        let store = RecordingStore::default();
        let service = OrderedResources::new(&repo, &store, 4);
        let created = service
            .create(draft(Some("events"), "a"), single("gallery/1-old.png"))
            .await
            .unwrap();

        repo.fail_writes(true);
        service
            .update(created.id, Patch::default(), single("gallery/2-new.png"), None)
            .await
            .unwrap_err();

        assert_eq!(store.deleted(), vec!["gallery/2-new.png"]);
    }

    #[tokio::test]
    async fn update_of_missing_record_is_not_found_and_discards_upload() {
        let repo = MemoryRepository::new(&LEADERSHIP_MEMBERS);
        let store = RecordingStore::default();
        let service = OrderedResources::new(&repo, &store, 4);

        let err = service
            .update(Uuid::new_v4(), Patch::default(), single("leadership/x.png"), None)
            .await
            .unwrap_err();

        assert_eq!(err.to_string(), "Leadership member not found");
        assert_eq!(store.deleted(), vec!["leadership/x.png"]);
    }

    #[tokio::test]
    async fn partner_update_reconciles_detail_images() {
        let repo = MemoryRepository::new(&PARTNER_INSTITUTIONS);
        let store = RecordingStore::default();
        let service = OrderedResources::new(&repo, &store, 4);
        let created = service
            .create(
                draft(None, "campus"),
                UploadedMedia {
                    primary: Some(media("partner-institutions/f.png")),
                    details: vec![
                        media("partner-institutions/details/a.png"),
                        media("partner-institutions/details/b.png"),
                        media("partner-institutions/details/z.png"),
                    ],
                },
            )
            .await
            .unwrap();

        let existing = &created.detail_images;
        let changes = DetailImageChanges {
            keep: vec![existing[0].url.clone()],
            remove: vec![RemovalRequest {
                url: Some(existing[1].url.clone()),
                key: Some(existing[1].key.clone()),
            }],
        };
        let uploads = UploadedMedia {
            primary: None,
            details: vec![media("partner-institutions/details/c.png")],
        };

        let updated = service
            .update(created.id, Patch::default(), uploads, Some(changes))
            .await
            .unwrap();

        assert_eq!(
            updated.detail_images,
            vec![
                media("partner-institutions/details/a.png"),
                media("partner-institutions/details/c.png"),
            ]
        );
        let mut deleted = store.deleted();
        deleted.sort();
        assert_eq!(
            deleted,
            vec![
                "partner-institutions/details/b.png",
                "partner-institutions/details/z.png",
            ]
        );
    }

    #[tokio::test]
    async fn emptied_partner_set_discards_every_new_upload() {
        let repo = MemoryRepository::new(&PARTNER_INSTITUTIONS);
        let store = RecordingStore::default();
        let service = OrderedResources::new(&repo, &store, 4);
        let created = service
            .create(
                draft(None, "campus"),
                UploadedMedia {
                    primary: Some(media("partner-institutions/f.png")),
                    details: vec![media("partner-institutions/details/a.png")],
                },
            )
            .await
            .unwrap();

        let err = service
            .update(
                created.id,
                Patch::default(),
                single("partner-institutions/g.png"),
                Some(DetailImageChanges::default()),
            )
            .await
            .unwrap_err();

        assert!(matches!(err, ResourceError::Media(ReconcileError::EmptyMediaSet)));
        assert_eq!(store.deleted(), vec!["partner-institutions/g.png"]);
        assert_eq!(
            repo.snapshot()[0].detail_images,
            vec![media("partner-institutions/details/a.png")]
        );
    }

    #[tokio::test]
    async fn reorder_skips_unknown_ids_and_applies_the_rest() {
        let repo = MemoryRepository::new(&CARD_TESTIMONIALS);
        let store = RecordingStore::default();
        let service = OrderedResources::new(&repo, &store, 2);
        let a = service
            .create(draft(None, "a"), UploadedMedia::default())
            .await
            .unwrap();
        let b = service
            .create(draft(None, "b"), UploadedMedia::default())
            .await
            .unwrap();

        let items = vec![
            ReorderItem {
                id: json!(a.id.to_string()),
                display_order: json!(2),
            },
            ReorderItem {
                id: json!(Uuid::new_v4().to_string()),
                display_order: json!(7),
            },
            ReorderItem {
                id: json!(b.id.to_string()),
                display_order: json!(1),
            },
        ];

        let updated = service.reorder(&items).await.unwrap();

        assert_eq!(updated, 2);
        assert_eq!(service.get(a.id).await.unwrap().display_order, 2);
        assert_eq!(service.get(b.id).await.unwrap().display_order, 1);
    }

    #[tokio::test]
    async fn reorder_below_the_resource_minimum_is_invalid() {
        let repo = MemoryRepository::new(&LEADERSHIP_MEMBERS);
        let store = RecordingStore::default();
        let service = OrderedResources::new(&repo, &store, 2);

        let err = service
            .reorder(&[ReorderItem {
                id: json!(Uuid::new_v4().to_string()),
                display_order: json!(0),
            }])
            .await
            .unwrap_err();

        match err {
            ResourceError::Invalid { errors, .. } => {
                assert_eq!(errors, vec!["Item 1: Invalid display order"])
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    fn image_set(keys: &[&str]) -> UploadedMedia {
        UploadedMedia {
            primary: None,
            details: keys.iter().map(|key| media(key)).collect(),
        }
    }

    #[tokio::test]
    async fn image_set_requires_at_least_one_file() {
        let repo = MemoryRepository::new(&CAROUSELS);
        let store = RecordingStore::default();
        let service = OrderedResources::new(&repo, &store, 2);

        let err = service
            .create(draft(None, "home"), UploadedMedia::default())
            .await
            .unwrap_err();

        assert_eq!(err.to_string(), "At least one image is required");
        assert!(repo.snapshot().is_empty());
    }

    #[tokio::test]
    async fn new_image_set_replaces_the_old_one_after_save() {
        let repo = MemoryRepository::new(&CAROUSELS);
        let store = RecordingStore::default();
        let service = OrderedResources::new(&repo, &store, 2);
        let created = service
            .create(
                draft(None, "home"),
                image_set(&["carousel/1-a.png", "carousel/2-b.png"]),
            )
            .await
            .unwrap();

        let kept = service
            .update(created.id, Patch::default(), UploadedMedia::default(), None)
            .await
            .unwrap();
        assert_eq!(kept.detail_images.len(), 2);
        assert!(store.deleted().is_empty());

        let updated = service
            .update(
                created.id,
                Patch::default(),
                image_set(&["carousel/3-c.png"]),
                None,
            )
            .await
            .unwrap();

        assert_eq!(updated.detail_images, vec![media("carousel/3-c.png")]);
        assert_eq!(updated.image, None);
        let deleted: BTreeSet<String> = store.deleted().into_iter().collect();
        assert_eq!(
            deleted,
            BTreeSet::from(["carousel/1-a.png".to_string(), "carousel/2-b.png".to_string()])
        );
    }

    #[tokio::test]
    async fn toggle_flips_the_active_flag() {
        let repo = MemoryRepository::new(&GALLERY_ITEMS);
        let store = RecordingStore::default();
        let service = OrderedResources::new(&repo, &store, 2);
        let created = service
            .create(draft(Some("events"), "a"), single("gallery/a.png"))
            .await
            .unwrap();

        assert!(!service.toggle_active(created.id).await.unwrap().is_active);
        assert!(service.toggle_active(created.id).await.unwrap().is_active);
    }
}
