use axum::extract::State;
use axum_extra::extract::cookie::CookieJar;
use serde::Deserialize;

use crate::web::extract::{Json, Multipart, Path};
use crate::{
    AppState,
    modules::common::{create_from_form, update_from_form},
    ordered::{
        CARD_TESTIMONIALS, ListFilter, ReorderItem, ResourceKind, ResourceRecord, UploadedMedia,
        VIDEO_TESTIMONIALS,
    },
    web::{
        auth::require_admin,
        error::{AppError, AppResult},
        forms::read_resource_form,
        responses::ApiResponse,
        validation::parse_id,
    },
};

use super::{VideoInput, card_draft, card_patch, video_draft, video_patch};

async fn list_all(
    state: &AppState,
    kind: &'static ResourceKind,
) -> AppResult<ApiResponse<Vec<ResourceRecord>>> {
    let repo = state.repository(kind);
    let records = state.resources(&repo).list(&ListFilter::default()).await?;
    let count = records.len();
    Ok(ApiResponse::ok(records).with_count(count))
}

async fn get_one(
    state: &AppState,
    kind: &'static ResourceKind,
    raw_id: &str,
) -> AppResult<ApiResponse<ResourceRecord>> {
    let id = parse_id(raw_id, "testimonial")?;
    let repo = state.repository(kind);
    Ok(ApiResponse::ok(state.resources(&repo).get(id).await?))
}

async fn delete_one(
    state: &AppState,
    kind: &'static ResourceKind,
    raw_id: &str,
) -> AppResult<ApiResponse<()>> {
    let id = parse_id(raw_id, "testimonial")?;
    let repo = state.repository(kind);
    state.resources(&repo).delete(id).await?;
    Ok(ApiResponse::message(format!("{} deleted successfully", kind.label)))
}

pub async fn list_cards(
    State(state): State<AppState>,
    jar: CookieJar,
) -> AppResult<ApiResponse<Vec<ResourceRecord>>> {
    require_admin(&state, &jar).await?;
    list_all(&state, &CARD_TESTIMONIALS).await
}

pub async fn get_card(
    State(state): State<AppState>,
    jar: CookieJar,
    Path(raw_id): Path<String>,
) -> AppResult<ApiResponse<ResourceRecord>> {
    require_admin(&state, &jar).await?;
    get_one(&state, &CARD_TESTIMONIALS, &raw_id).await
}

pub async fn create_card(
    State(state): State<AppState>,
    jar: CookieJar,
    multipart: Multipart,
) -> AppResult<ApiResponse<ResourceRecord>> {
    require_admin(&state, &jar).await?;
    let form = read_resource_form(&state, &CARD_TESTIMONIALS, multipart).await?;

    let card = create_from_form(&state, &CARD_TESTIMONIALS, form, |form| card_draft(form)).await?;
    Ok(ApiResponse::created(card).with_message("Card testimonial created successfully"))
}

pub async fn update_card(
    State(state): State<AppState>,
    jar: CookieJar,
    Path(raw_id): Path<String>,
    multipart: Multipart,
) -> AppResult<ApiResponse<ResourceRecord>> {
    require_admin(&state, &jar).await?;
    let form = read_resource_form(&state, &CARD_TESTIMONIALS, multipart).await?;

    let card =
        update_from_form(&state, &CARD_TESTIMONIALS, &raw_id, form, |form| card_patch(form))
            .await?;
    Ok(ApiResponse::ok(card).with_message("Card testimonial updated successfully"))
}

pub async fn delete_card(
    State(state): State<AppState>,
    jar: CookieJar,
    Path(raw_id): Path<String>,
) -> AppResult<ApiResponse<()>> {
    require_admin(&state, &jar).await?;
    delete_one(&state, &CARD_TESTIMONIALS, &raw_id).await
}

pub async fn list_videos(
    State(state): State<AppState>,
    jar: CookieJar,
) -> AppResult<ApiResponse<Vec<ResourceRecord>>> {
    require_admin(&state, &jar).await?;
    list_all(&state, &VIDEO_TESTIMONIALS).await
}

pub async fn get_video(
    State(state): State<AppState>,
    jar: CookieJar,
    Path(raw_id): Path<String>,
) -> AppResult<ApiResponse<ResourceRecord>> {
    require_admin(&state, &jar).await?;
    get_one(&state, &VIDEO_TESTIMONIALS, &raw_id).await
}

pub async fn create_video(
    State(state): State<AppState>,
    jar: CookieJar,
    Json(input): Json<VideoInput>,
) -> AppResult<ApiResponse<ResourceRecord>> {
    require_admin(&state, &jar).await?;
    let draft = video_draft(input)?;

    let repo = state.repository(&VIDEO_TESTIMONIALS);
    let video = state
        .resources(&repo)
        .create(draft, UploadedMedia::default())
        .await?;
    Ok(ApiResponse::created(video).with_message("Video testimonial created successfully"))
}

pub async fn update_video(
    State(state): State<AppState>,
    jar: CookieJar,
    Path(raw_id): Path<String>,
    Json(input): Json<VideoInput>,
) -> AppResult<ApiResponse<ResourceRecord>> {
    require_admin(&state, &jar).await?;
    let id = parse_id(&raw_id, "testimonial")?;
    let patch = video_patch(input)?;

    let repo = state.repository(&VIDEO_TESTIMONIALS);
    let video = state
        .resources(&repo)
        .update(id, patch, UploadedMedia::default(), None)
        .await?;
    Ok(ApiResponse::ok(video).with_message("Video testimonial updated successfully"))
}

pub async fn delete_video(
    State(state): State<AppState>,
    jar: CookieJar,
    Path(raw_id): Path<String>,
) -> AppResult<ApiResponse<()>> {
    require_admin(&state, &jar).await?;
    delete_one(&state, &VIDEO_TESTIMONIALS, &raw_id).await
}

#[derive(Debug, Deserialize)]
pub struct TestimonialReorder {
    #[serde(default, rename = "type")]
    kind: Option<String>,
    #[serde(default)]
    items: Option<Vec<ReorderItem>>,
}

impl TestimonialReorder {
    fn target(&self) -> Option<&'static ResourceKind> {
        match self.kind.as_deref()? {
            "cards" => Some(&CARD_TESTIMONIALS),
            "videos" => Some(&VIDEO_TESTIMONIALS),
            _ => None,
        }
    }
}

pub async fn reorder_testimonials(
    State(state): State<AppState>,
    jar: CookieJar,
    Json(request): Json<TestimonialReorder>,
) -> AppResult<ApiResponse<()>> {
    require_admin(&state, &jar).await?;
    let kind = request
        .target()
        .ok_or_else(|| AppError::invalid("Invalid reorder data"))?;
    let items = request
        .items
        .ok_or_else(|| AppError::invalid("Invalid reorder data"))?;

    let repo = state.repository(kind);
    state.resources(&repo).reorder(&items).await?;
    Ok(ApiResponse::message("Testimonials reordered successfully"))
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn reorder_type_selects_the_resource() {
        let request: TestimonialReorder =
            serde_json::from_value(json!({"type": "videos", "items": []})).unwrap();
        assert_eq!(request.target().map(|kind| kind.table), Some("video_testimonials"));

        let request: TestimonialReorder =
            serde_json::from_value(json!({"type": "audio", "items": []})).unwrap();
        assert!(request.target().is_none());

        let request: TestimonialReorder = serde_json::from_value(json!({"items": []})).unwrap();
        assert!(request.target().is_none());
    }
}
