use axum::extract::State;
use axum_extra::extract::cookie::CookieJar;

use crate::{
    AppState,
    modules::common::{create_from_form, update_from_form},
    ordered::{
        BULLET_POINTS, CAROUSELS, HERO_SECTIONS, ListFilter, PAGE_SECTIONS, ResourceKind,
        ResourceRecord, UploadedMedia, VIDEO_CARDS,
    },
    web::{
        auth::require_admin,
        error::AppResult,
        extract::{Json, Multipart, Path},
        forms::read_resource_form,
        responses::ApiResponse,
        validation::parse_id,
    },
};

use super::{
    BulletInput, HeroInput,
    carousel::{Saved, carousel_fields, upsert_carousel},
    section_draft, section_patch, video_card_draft, video_card_patch,
};

async fn list_all(
    state: &AppState,
    kind: &'static ResourceKind,
) -> AppResult<Vec<ResourceRecord>> {
    let repo = state.repository(kind);
    Ok(state.resources(&repo).list(&ListFilter::default()).await?)
}

fn counted(records: Vec<ResourceRecord>) -> ApiResponse<Vec<ResourceRecord>> {
    let count = records.len();
    ApiResponse::ok(records).with_count(count)
}

async fn delete_one(
    state: &AppState,
    kind: &'static ResourceKind,
    raw_id: &str,
) -> AppResult<ApiResponse<()>> {
    let id = parse_id(raw_id, &kind.label.to_lowercase())?;
    let repo = state.repository(kind);
    state.resources(&repo).delete(id).await?;
    Ok(ApiResponse::message(format!("{} deleted successfully", kind.label)))
}

pub async fn list_carousels(
    State(state): State<AppState>,
    jar: CookieJar,
) -> AppResult<ApiResponse<Vec<ResourceRecord>>> {
    require_admin(&state, &jar).await?;
    Ok(counted(list_all(&state, &CAROUSELS).await?))
}

pub async fn save_carousel(
    State(state): State<AppState>,
    jar: CookieJar,
    multipart: Multipart,
) -> AppResult<ApiResponse<ResourceRecord>> {
    require_admin(&state, &jar).await?;
    let form = read_resource_form(&state, &CAROUSELS, multipart).await?;

    let repo = state.repository(&CAROUSELS);
    let resources = state.resources(&repo);
    let fields = match carousel_fields(&form, form.uploads().details.len()) {
        Ok(fields) => fields,
        Err(err) => return Err(resources.abandon(form.into_uploads(), err).await.into()),
    };

    Ok(match upsert_carousel(&resources, fields, form.into_uploads()).await? {
        Saved::Created(carousel) => {
            ApiResponse::ok(carousel).with_message("Carousel created successfully")
        }
        Saved::Replaced(carousel) => {
            ApiResponse::ok(carousel).with_message("Carousel updated successfully")
        }
    })
}

pub async fn delete_carousel(
    State(state): State<AppState>,
    jar: CookieJar,
    Path(raw_id): Path<String>,
) -> AppResult<ApiResponse<()>> {
    require_admin(&state, &jar).await?;
    delete_one(&state, &CAROUSELS, &raw_id).await
}

pub async fn list_video_cards(
    State(state): State<AppState>,
    jar: CookieJar,
) -> AppResult<ApiResponse<Vec<ResourceRecord>>> {
    require_admin(&state, &jar).await?;
    Ok(counted(list_all(&state, &VIDEO_CARDS).await?))
}

pub async fn create_video_card(
    State(state): State<AppState>,
    jar: CookieJar,
    multipart: Multipart,
) -> AppResult<ApiResponse<ResourceRecord>> {
    require_admin(&state, &jar).await?;
    let form = read_resource_form(&state, &VIDEO_CARDS, multipart).await?;

    let card = create_from_form(&state, &VIDEO_CARDS, form, |form| video_card_draft(form)).await?;
    Ok(ApiResponse::created(card).with_message("Video card created successfully"))
}

pub async fn update_video_card(
    State(state): State<AppState>,
    jar: CookieJar,
    Path(raw_id): Path<String>,
    multipart: Multipart,
) -> AppResult<ApiResponse<ResourceRecord>> {
    require_admin(&state, &jar).await?;
    let form = read_resource_form(&state, &VIDEO_CARDS, multipart).await?;

    let card =
        update_from_form(&state, &VIDEO_CARDS, &raw_id, form, |form| video_card_patch(form))
            .await?;
    Ok(ApiResponse::ok(card).with_message("Video card updated successfully"))
}

pub async fn delete_video_card(
    State(state): State<AppState>,
    jar: CookieJar,
    Path(raw_id): Path<String>,
) -> AppResult<ApiResponse<()>> {
    require_admin(&state, &jar).await?;
    delete_one(&state, &VIDEO_CARDS, &raw_id).await
}

pub async fn list_hero_sections(
    State(state): State<AppState>,
    jar: CookieJar,
) -> AppResult<ApiResponse<Vec<ResourceRecord>>> {
    require_admin(&state, &jar).await?;
    Ok(counted(list_all(&state, &HERO_SECTIONS).await?))
}

pub async fn create_hero_section(
    State(state): State<AppState>,
    jar: CookieJar,
    Json(input): Json<HeroInput>,
) -> AppResult<ApiResponse<ResourceRecord>> {
    require_admin(&state, &jar).await?;
    let draft = input.into_draft()?;

    let repo = state.repository(&HERO_SECTIONS);
    let hero = state
        .resources(&repo)
        .create(draft, UploadedMedia::default())
        .await?;
    Ok(ApiResponse::created(hero).with_message("Hero section created successfully"))
}

pub async fn update_hero_section(
    State(state): State<AppState>,
    jar: CookieJar,
    Path(raw_id): Path<String>,
    Json(input): Json<HeroInput>,
) -> AppResult<ApiResponse<ResourceRecord>> {
    require_admin(&state, &jar).await?;
    let id = parse_id(&raw_id, "hero section")?;
    let patch = input.into_patch()?;

    let repo = state.repository(&HERO_SECTIONS);
    let hero = state
        .resources(&repo)
        .update(id, patch, UploadedMedia::default(), None)
        .await?;
    Ok(ApiResponse::ok(hero).with_message("Hero section updated successfully"))
}

pub async fn delete_hero_section(
    State(state): State<AppState>,
    jar: CookieJar,
    Path(raw_id): Path<String>,
) -> AppResult<ApiResponse<()>> {
    require_admin(&state, &jar).await?;
    delete_one(&state, &HERO_SECTIONS, &raw_id).await
}

pub async fn list_bullet_points(
    State(state): State<AppState>,
    jar: CookieJar,
) -> AppResult<ApiResponse<Vec<ResourceRecord>>> {
    require_admin(&state, &jar).await?;
    Ok(counted(list_all(&state, &BULLET_POINTS).await?))
}

pub async fn create_bullet_point(
    State(state): State<AppState>,
    jar: CookieJar,
    Json(input): Json<BulletInput>,
) -> AppResult<ApiResponse<ResourceRecord>> {
    require_admin(&state, &jar).await?;
    let draft = input.into_draft()?;

    let repo = state.repository(&BULLET_POINTS);
    let point = state
        .resources(&repo)
        .create(draft, UploadedMedia::default())
        .await?;
    Ok(ApiResponse::created(point).with_message("Bullet point created successfully"))
}

pub async fn update_bullet_point(
    State(state): State<AppState>,
    jar: CookieJar,
    Path(raw_id): Path<String>,
    Json(input): Json<BulletInput>,
) -> AppResult<ApiResponse<ResourceRecord>> {
    require_admin(&state, &jar).await?;
    let id = parse_id(&raw_id, "bullet point")?;
    let patch = input.into_patch()?;

    let repo = state.repository(&BULLET_POINTS);
    let point = state
        .resources(&repo)
        .update(id, patch, UploadedMedia::default(), None)
        .await?;
    Ok(ApiResponse::ok(point).with_message("Bullet point updated successfully"))
}

pub async fn delete_bullet_point(
    State(state): State<AppState>,
    jar: CookieJar,
    Path(raw_id): Path<String>,
) -> AppResult<ApiResponse<()>> {
    require_admin(&state, &jar).await?;
    delete_one(&state, &BULLET_POINTS, &raw_id).await
}

/// Newest first.
pub async fn list_sections(
    State(state): State<AppState>,
    jar: CookieJar,
) -> AppResult<ApiResponse<Vec<ResourceRecord>>> {
    require_admin(&state, &jar).await?;
    let mut sections = list_all(&state, &PAGE_SECTIONS).await?;
    sections.sort_by(|a, b| b.created_at.cmp(&a.created_at));
    Ok(counted(sections))
}

pub async fn get_section(
    State(state): State<AppState>,
    jar: CookieJar,
    Path(raw_id): Path<String>,
) -> AppResult<ApiResponse<ResourceRecord>> {
    require_admin(&state, &jar).await?;
    let id = parse_id(&raw_id, "section")?;
    let repo = state.repository(&PAGE_SECTIONS);
    Ok(ApiResponse::ok(state.resources(&repo).get(id).await?))
}

pub async fn create_section(
    State(state): State<AppState>,
    jar: CookieJar,
    multipart: Multipart,
) -> AppResult<ApiResponse<ResourceRecord>> {
    require_admin(&state, &jar).await?;
    let form = read_resource_form(&state, &PAGE_SECTIONS, multipart).await?;

    let section =
        create_from_form(&state, &PAGE_SECTIONS, form, |form| section_draft(form)).await?;
    Ok(ApiResponse::created(section).with_message("New section created successfully"))
}

pub async fn update_section(
    State(state): State<AppState>,
    jar: CookieJar,
    Path(raw_id): Path<String>,
    multipart: Multipart,
) -> AppResult<ApiResponse<ResourceRecord>> {
    require_admin(&state, &jar).await?;
    let form = read_resource_form(&state, &PAGE_SECTIONS, multipart).await?;

    let section =
        update_from_form(&state, &PAGE_SECTIONS, &raw_id, form, |form| section_patch(form))
            .await?;
    Ok(ApiResponse::ok(section).with_message("Section updated successfully"))
}

pub async fn delete_section(
    State(state): State<AppState>,
    jar: CookieJar,
    Path(raw_id): Path<String>,
) -> AppResult<ApiResponse<()>> {
    require_admin(&state, &jar).await?;
    delete_one(&state, &PAGE_SECTIONS, &raw_id).await
}
