use serde::Deserialize;

use crate::{
    ordered::{
        Draft, Patch, ReorderItem, ResourceKind, ResourceRecord, ResourceResult,
    },
    web::{
        AppState,
        error::{AppError, AppResult},
        forms::ResourceForm,
        validation::parse_id,
    },
};

/// Body of every reorder endpoint.
#[derive(Debug, Deserialize)]
pub struct ReorderRequest {
    #[serde(default)]
    pub items: Option<Vec<ReorderItem>>,
}

impl ReorderRequest {
    pub fn into_items(self) -> AppResult<Vec<ReorderItem>> {
        self.items
            .ok_or_else(|| AppError::invalid("Items must be an array"))
    }
}

/// Validates the submitted form with `draft` and creates the record. Uploads
/// are deleted when validation or persistence fails.
pub async fn create_from_form<F>(
    state: &AppState,
    kind: &'static ResourceKind,
    form: ResourceForm,
    draft: F,
) -> AppResult<ResourceRecord>
where
    F: FnOnce(&ResourceForm) -> ResourceResult<Draft>,
{
    let repo = state.repository(kind);
    let resources = state.resources(&repo);

    let draft = match draft(&form) {
        Ok(draft) => draft,
        Err(err) => return Err(resources.abandon(form.into_uploads(), err).await.into()),
    };

    Ok(resources.create(draft, form.into_uploads()).await?)
}

/// Applies a partial update built by `patch`, reconciling detail images when
/// the form declares changes to them.
pub async fn update_from_form<F>(
    state: &AppState,
    kind: &'static ResourceKind,
    raw_id: &str,
    form: ResourceForm,
    patch: F,
) -> AppResult<ResourceRecord>
where
    F: FnOnce(&ResourceForm) -> ResourceResult<Patch>,
{
    let repo = state.repository(kind);
    let resources = state.resources(&repo);

    let id = match parse_id(raw_id, &kind.label.to_lowercase()) {
        Ok(id) => id,
        Err(err) => {
            resources.discard(form.into_uploads()).await;
            return Err(err);
        }
    };

    let patch = match patch(&form) {
        Ok(patch) => patch,
        Err(err) => return Err(resources.abandon(form.into_uploads(), err).await.into()),
    };

    let details = form.detail_changes();
    Ok(resources
        .update(id, patch, form.into_uploads(), details)
        .await?)
}

#[cfg(test)]
pub mod testing {
    use std::collections::HashMap;

    pub fn form(pairs: &[(&str, &str)]) -> HashMap<String, String> {
        pairs
            .iter()
            .map(|(name, value)| (name.to_string(), value.to_string()))
            .collect()
    }
}
