use axum::extract::State;
use axum_extra::extract::cookie::CookieJar;
use serde::Deserialize;

use crate::web::extract::{Json, Multipart, Path, Query};
use crate::{
    AppState,
    modules::common::{ReorderRequest, create_from_form, update_from_form},
    ordered::{GALLERY_ITEMS, ListFilter, Page, ResourceRecord},
    web::{
        auth::require_admin,
        error::AppResult,
        forms::read_resource_form,
        responses::{ApiResponse, Pagination},
        validation::parse_id,
    },
};

use super::{gallery_draft, gallery_patch};

const DEFAULT_PAGE_SIZE: i64 = 50;

#[derive(Deserialize)]
pub struct ListQuery {
    #[serde(default)]
    pub category: Option<String>,
    #[serde(default)]
    pub page: Option<i64>,
    #[serde(default)]
    pub limit: Option<i64>,
}

pub async fn list_items(
    State(state): State<AppState>,
    jar: CookieJar,
    Query(query): Query<ListQuery>,
) -> AppResult<ApiResponse<Vec<ResourceRecord>>> {
    require_admin(&state, &jar).await?;

    let page = Page::from_query(query.page, query.limit, DEFAULT_PAGE_SIZE);
    let mut filter = ListFilter::default();
    if let Some(category) = query.category.filter(|c| !c.is_empty() && c != "all") {
        filter = filter.in_category(category);
    }

    let repo = state.repository(&GALLERY_ITEMS);
    let resources = state.resources(&repo);
    let total = resources.count(&filter).await?;
    let items = resources.list(&filter.paged(page)).await?;

    Ok(ApiResponse::ok(items).with_pagination(Pagination::new(page.number, page.size, total)))
}

pub async fn get_item(
    State(state): State<AppState>,
    jar: CookieJar,
    Path(raw_id): Path<String>,
) -> AppResult<ApiResponse<ResourceRecord>> {
    require_admin(&state, &jar).await?;
    let id = parse_id(&raw_id, "gallery item")?;

    let repo = state.repository(&GALLERY_ITEMS);
    let item = state.resources(&repo).get(id).await?;
    Ok(ApiResponse::ok(item))
}

pub async fn create_item(
    State(state): State<AppState>,
    jar: CookieJar,
    multipart: Multipart,
) -> AppResult<ApiResponse<ResourceRecord>> {
    require_admin(&state, &jar).await?;
    let form = read_resource_form(&state, &GALLERY_ITEMS, multipart).await?;

    let item = create_from_form(&state, &GALLERY_ITEMS, form, |form| gallery_draft(form)).await?;
    Ok(ApiResponse::created(item).with_message("Gallery item created successfully"))
}

pub async fn update_item(
    State(state): State<AppState>,
    jar: CookieJar,
    Path(raw_id): Path<String>,
    multipart: Multipart,
) -> AppResult<ApiResponse<ResourceRecord>> {
    require_admin(&state, &jar).await?;
    let form = read_resource_form(&state, &GALLERY_ITEMS, multipart).await?;

    let item =
        update_from_form(&state, &GALLERY_ITEMS, &raw_id, form, |form| gallery_patch(form)).await?;
    Ok(ApiResponse::ok(item).with_message("Gallery item updated successfully"))
}

pub async fn delete_item(
    State(state): State<AppState>,
    jar: CookieJar,
    Path(raw_id): Path<String>,
) -> AppResult<ApiResponse<()>> {
    require_admin(&state, &jar).await?;
    let id = parse_id(&raw_id, "gallery item")?;

    let repo = state.repository(&GALLERY_ITEMS);
    state.resources(&repo).delete(id).await?;
    Ok(ApiResponse::message("Gallery item deleted successfully"))
}

pub async fn reorder_items(
    State(state): State<AppState>,
    jar: CookieJar,
    Json(request): Json<ReorderRequest>,
) -> AppResult<ApiResponse<()>> {
    require_admin(&state, &jar).await?;
    let items = request.into_items()?;

    let repo = state.repository(&GALLERY_ITEMS);
    state.resources(&repo).reorder(&items).await?;
    Ok(ApiResponse::message("Gallery items reordered successfully"))
}

pub async fn toggle_item(
    State(state): State<AppState>,
    jar: CookieJar,
    Path(raw_id): Path<String>,
) -> AppResult<ApiResponse<ResourceRecord>> {
    require_admin(&state, &jar).await?;
    let id = parse_id(&raw_id, "gallery item")?;

    let repo = state.repository(&GALLERY_ITEMS);
    let item = state.resources(&repo).toggle_active(id).await?;
    let verb = if item.is_active {
        "activated"
    } else {
        "deactivated"
    };
    Ok(ApiResponse::ok(item).with_message(format!("Gallery item {verb} successfully")))
}
