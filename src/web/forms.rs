use std::collections::HashMap;

use serde::de::DeserializeOwned;
use tracing::warn;

use crate::{
    media::{DetailImageChanges, RemovalRequest},
    ordered::{ResourceKind, UploadedMedia, kind::MAX_IMAGE_BYTES},
};

use super::{
    AppState,
    error::AppResult,
    extract::Multipart,
    uploads::{FileFieldConfig, UploadOutcome, process_upload_form},
};

pub const KEEP_DETAILS_FIELD: &str = "existingDetailImages";
pub const REMOVE_DETAILS_FIELD: &str = "imagesToRemove";

/// Multipart body of an ordered resource request after its files were
/// written to the object store.
pub struct ResourceForm {
    outcome: UploadOutcome,
    uploads: UploadedMedia,
}

/// Reads the request body, storing files for the media slots of `kind`.
pub async fn read_resource_form(
    state: &AppState,
    kind: &ResourceKind,
    multipart: Multipart,
) -> AppResult<ResourceForm> {
    let outcome = process_upload_form(
        multipart.0,
        state.store(),
        &upload_fields(kind),
        state.batch_concurrency(),
    )
    .await?;

    let uploads = UploadedMedia {
        primary: kind
            .media
            .primary_field()
            .and_then(|field| outcome.first_media_for(field)),
        details: kind
            .media
            .detail_field()
            .map(|field| outcome.media_for(field))
            .unwrap_or_default(),
    };

    Ok(ResourceForm { outcome, uploads })
}

/// File fields accepted for the media slots of `kind`.
pub fn upload_fields(kind: &ResourceKind) -> Vec<FileFieldConfig> {
    kind.media
        .slots()
        .into_iter()
        .map(|slot| FileFieldConfig::image(slot.field, slot.folder, slot.max_files, MAX_IMAGE_BYTES))
        .collect()
}

/// Read access to submitted text fields.
pub trait FormFields {
    fn text(&self, name: &str) -> Option<&str>;

    /// Trimmed value, `None` when absent or blank.
    fn non_empty(&self, name: &str) -> Option<String> {
        self.text(name)
            .map(str::trim)
            .filter(|value| !value.is_empty())
            .map(str::to_string)
    }
}

impl FormFields for ResourceForm {
    fn text(&self, name: &str) -> Option<&str> {
        self.outcome.first_text(name)
    }
}

impl FormFields for HashMap<String, String> {
    fn text(&self, name: &str) -> Option<&str> {
        self.get(name).map(String::as_str)
    }
}

impl ResourceForm {
    pub fn uploads(&self) -> &UploadedMedia {
        &self.uploads
    }

    pub fn into_uploads(self) -> UploadedMedia {
        self.uploads
    }

    /// Keep/remove declarations for detail images. `None` when the client
    /// sent neither list. Unparseable lists count as empty.
    pub fn detail_changes(&self) -> Option<DetailImageChanges> {
        let keep = self.text(KEEP_DETAILS_FIELD);
        let remove = self.text(REMOVE_DETAILS_FIELD);
        if keep.is_none() && remove.is_none() {
            return None;
        }

        Some(DetailImageChanges {
            keep: keep
                .map(|raw| parse_json_list::<String>(KEEP_DETAILS_FIELD, raw))
                .unwrap_or_default(),
            remove: remove
                .map(|raw| parse_json_list::<RemovalRequest>(REMOVE_DETAILS_FIELD, raw))
                .unwrap_or_default(),
        })
    }
}

fn parse_json_list<T: DeserializeOwned>(field: &str, raw: &str) -> Vec<T> {
    match serde_json::from_str::<Vec<T>>(raw) {
        Ok(values) => values,
        Err(err) => {
            warn!(?err, field, "ignoring malformed list in form");
            Vec::new()
        }
    }
}
