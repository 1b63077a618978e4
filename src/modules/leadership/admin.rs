use axum::extract::State;
use axum_extra::extract::cookie::CookieJar;
use serde_json::Value;
use uuid::Uuid;

use crate::web::extract::{Json, Multipart, Path};
use crate::{
    AppState,
    modules::common::ReorderRequest,
    ordered::{LEADERSHIP_MEMBERS, ListFilter, OrderedResources, ResourceError, ResourceRecord},
    web::{
        auth::require_admin,
        error::AppResult,
        forms::read_resource_form,
        responses::ApiResponse,
        validation::parse_id,
    },
};

use super::{leadership_draft, leadership_patch};

/// Rejects a slug already used by another member.
async fn ensure_unique_slug(
    resources: &OrderedResources<'_>,
    slug: Option<&Value>,
    own_id: Option<Uuid>,
) -> Result<(), ResourceError> {
    let Some(slug) = slug.and_then(Value::as_str) else {
        return Ok(());
    };
    match resources.find_by_field("slug", slug).await {
        Ok(existing) if Some(existing.id) != own_id => Err(ResourceError::Conflict(
            "A leadership member with this name already exists".into(),
        )),
        Ok(_) | Err(ResourceError::NotFound(_)) => Ok(()),
        Err(err) => Err(err),
    }
}

pub async fn list_members(
    State(state): State<AppState>,
    jar: CookieJar,
) -> AppResult<ApiResponse<Vec<ResourceRecord>>> {
    require_admin(&state, &jar).await?;

    let repo = state.repository(&LEADERSHIP_MEMBERS);
    let members = state.resources(&repo).list(&ListFilter::default()).await?;
    let count = members.len();
    Ok(ApiResponse::ok(members).with_count(count))
}

pub async fn get_member(
    State(state): State<AppState>,
    jar: CookieJar,
    Path(raw_id): Path<String>,
) -> AppResult<ApiResponse<ResourceRecord>> {
    require_admin(&state, &jar).await?;
    let id = parse_id(&raw_id, "member")?;

    let repo = state.repository(&LEADERSHIP_MEMBERS);
    let member = state.resources(&repo).get(id).await?;
    Ok(ApiResponse::ok(member))
}

pub async fn create_member(
    State(state): State<AppState>,
    jar: CookieJar,
    multipart: Multipart,
) -> AppResult<ApiResponse<ResourceRecord>> {
    require_admin(&state, &jar).await?;
    let form = read_resource_form(&state, &LEADERSHIP_MEMBERS, multipart).await?;

    let repo = state.repository(&LEADERSHIP_MEMBERS);
    let resources = state.resources(&repo);

    let draft = match leadership_draft(&form) {
        Ok(draft) => draft,
        Err(err) => return Err(resources.abandon(form.into_uploads(), err).await.into()),
    };
    if let Err(err) = ensure_unique_slug(&resources, draft.fields.get("slug"), None).await {
        return Err(resources.abandon(form.into_uploads(), err).await.into());
    }

    let member = resources.create(draft, form.into_uploads()).await?;
    Ok(ApiResponse::created(member).with_message("Leadership member created successfully"))
}

pub async fn update_member(
    State(state): State<AppState>,
    jar: CookieJar,
    Path(raw_id): Path<String>,
    multipart: Multipart,
) -> AppResult<ApiResponse<ResourceRecord>> {
    require_admin(&state, &jar).await?;
    let form = read_resource_form(&state, &LEADERSHIP_MEMBERS, multipart).await?;

    let repo = state.repository(&LEADERSHIP_MEMBERS);
    let resources = state.resources(&repo);

    let id = match parse_id(&raw_id, "member") {
        Ok(id) => id,
        Err(err) => {
            resources.discard(form.into_uploads()).await;
            return Err(err);
        }
    };

    let has_upload = form.uploads().primary.is_some();
    let patch = match leadership_patch(&form, has_upload) {
        Ok(patch) => patch,
        Err(err) => return Err(resources.abandon(form.into_uploads(), err).await.into()),
    };
    if let Err(err) = ensure_unique_slug(&resources, patch.fields.get("slug"), Some(id)).await {
        return Err(resources.abandon(form.into_uploads(), err).await.into());
    }

    let member = resources.update(id, patch, form.into_uploads(), None).await?;
    Ok(ApiResponse::ok(member).with_message("Leadership member updated successfully"))
}

pub async fn delete_member(
    State(state): State<AppState>,
    jar: CookieJar,
    Path(raw_id): Path<String>,
) -> AppResult<ApiResponse<()>> {
    require_admin(&state, &jar).await?;
    let id = parse_id(&raw_id, "member")?;

    let repo = state.repository(&LEADERSHIP_MEMBERS);
    state.resources(&repo).delete(id).await?;
    Ok(ApiResponse::message("Leadership member deleted successfully"))
}

pub async fn reorder_members(
    State(state): State<AppState>,
    jar: CookieJar,
    Json(request): Json<ReorderRequest>,
) -> AppResult<ApiResponse<()>> {
    require_admin(&state, &jar).await?;
    let items = request.into_items()?;

    let repo = state.repository(&LEADERSHIP_MEMBERS);
    state.resources(&repo).reorder(&items).await?;
    Ok(ApiResponse::message("Leadership members reordered successfully"))
}
