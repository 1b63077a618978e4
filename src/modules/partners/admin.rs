use axum::extract::State;
use axum_extra::extract::cookie::CookieJar;

use crate::web::extract::{Json, Multipart, Path};
use crate::{
    AppState,
    modules::common::{ReorderRequest, create_from_form, update_from_form},
    ordered::{ListFilter, ResourceRecord},
    web::{
        auth::require_admin,
        error::AppResult,
        forms::read_resource_form,
        responses::ApiResponse,
        validation::parse_id,
    },
};

use super::{GLOBAL_PROFILE, INSTITUTION_PROFILE, PartnerProfile};

async fn list(profile: &PartnerProfile, state: &AppState) -> AppResult<ApiResponse<Vec<ResourceRecord>>> {
    let repo = state.repository(profile.kind);
    let partners = state.resources(&repo).list(&ListFilter::default()).await?;
    let count = partners.len();
    Ok(ApiResponse::ok(partners).with_count(count))
}

async fn get_one(
    profile: &PartnerProfile,
    state: &AppState,
    raw_id: &str,
) -> AppResult<ApiResponse<ResourceRecord>> {
    let id = parse_id(raw_id, &profile.kind.label.to_lowercase())?;
    let repo = state.repository(profile.kind);
    Ok(ApiResponse::ok(state.resources(&repo).get(id).await?))
}

async fn create(
    profile: &'static PartnerProfile,
    state: &AppState,
    multipart: Multipart,
) -> AppResult<ApiResponse<ResourceRecord>> {
    let form = read_resource_form(state, profile.kind, multipart).await?;
    let partner = create_from_form(state, profile.kind, form, |form| profile.draft(form)).await?;
    Ok(ApiResponse::created(partner)
        .with_message(format!("{} created successfully", profile.kind.label)))
}

async fn update(
    profile: &'static PartnerProfile,
    state: &AppState,
    raw_id: &str,
    multipart: Multipart,
) -> AppResult<ApiResponse<ResourceRecord>> {
    let form = read_resource_form(state, profile.kind, multipart).await?;
    let partner =
        update_from_form(state, profile.kind, raw_id, form, |form| profile.patch(form)).await?;
    Ok(ApiResponse::ok(partner).with_message(format!("{} updated successfully", profile.kind.label)))
}

async fn delete(
    profile: &PartnerProfile,
    state: &AppState,
    raw_id: &str,
) -> AppResult<ApiResponse<()>> {
    let id = parse_id(raw_id, &profile.kind.label.to_lowercase())?;
    let repo = state.repository(profile.kind);
    state.resources(&repo).delete(id).await?;
    Ok(ApiResponse::message(format!("{} deleted successfully", profile.kind.label)))
}

async fn reorder(
    profile: &PartnerProfile,
    state: &AppState,
    request: ReorderRequest,
    done: &str,
) -> AppResult<ApiResponse<()>> {
    let items = request.into_items()?;
    let repo = state.repository(profile.kind);
    state.resources(&repo).reorder(&items).await?;
    Ok(ApiResponse::message(done))
}

pub async fn list_institutions(
    State(state): State<AppState>,
    jar: CookieJar,
) -> AppResult<ApiResponse<Vec<ResourceRecord>>> {
    require_admin(&state, &jar).await?;
    list(&INSTITUTION_PROFILE, &state).await
}

pub async fn get_institution(
    State(state): State<AppState>,
    jar: CookieJar,
    Path(raw_id): Path<String>,
) -> AppResult<ApiResponse<ResourceRecord>> {
    require_admin(&state, &jar).await?;
    get_one(&INSTITUTION_PROFILE, &state, &raw_id).await
}

pub async fn create_institution(
    State(state): State<AppState>,
    jar: CookieJar,
    multipart: Multipart,
) -> AppResult<ApiResponse<ResourceRecord>> {
    require_admin(&state, &jar).await?;
    create(&INSTITUTION_PROFILE, &state, multipart).await
}

pub async fn update_institution(
    State(state): State<AppState>,
    jar: CookieJar,
    Path(raw_id): Path<String>,
    multipart: Multipart,
) -> AppResult<ApiResponse<ResourceRecord>> {
    require_admin(&state, &jar).await?;
    update(&INSTITUTION_PROFILE, &state, &raw_id, multipart).await
}

pub async fn delete_institution(
    State(state): State<AppState>,
    jar: CookieJar,
    Path(raw_id): Path<String>,
) -> AppResult<ApiResponse<()>> {
    require_admin(&state, &jar).await?;
    delete(&INSTITUTION_PROFILE, &state, &raw_id).await
}

pub async fn reorder_institutions(
    State(state): State<AppState>,
    jar: CookieJar,
    Json(request): Json<ReorderRequest>,
) -> AppResult<ApiResponse<()>> {
    require_admin(&state, &jar).await?;
    reorder(
        &INSTITUTION_PROFILE,
        &state,
        request,
        "Partner institutions reordered successfully",
    )
    .await
}

pub async fn list_global_partners(
    State(state): State<AppState>,
    jar: CookieJar,
) -> AppResult<ApiResponse<Vec<ResourceRecord>>> {
    require_admin(&state, &jar).await?;
    list(&GLOBAL_PROFILE, &state).await
}

pub async fn get_global_partner(
    State(state): State<AppState>,
    jar: CookieJar,
    Path(raw_id): Path<String>,
) -> AppResult<ApiResponse<ResourceRecord>> {
    require_admin(&state, &jar).await?;
    get_one(&GLOBAL_PROFILE, &state, &raw_id).await
}

pub async fn create_global_partner(
    State(state): State<AppState>,
    jar: CookieJar,
    multipart: Multipart,
) -> AppResult<ApiResponse<ResourceRecord>> {
    require_admin(&state, &jar).await?;
    create(&GLOBAL_PROFILE, &state, multipart).await
}

pub async fn update_global_partner(
    State(state): State<AppState>,
    jar: CookieJar,
    Path(raw_id): Path<String>,
    multipart: Multipart,
) -> AppResult<ApiResponse<ResourceRecord>> {
    require_admin(&state, &jar).await?;
    update(&GLOBAL_PROFILE, &state, &raw_id, multipart).await
}

pub async fn delete_global_partner(
    State(state): State<AppState>,
    jar: CookieJar,
    Path(raw_id): Path<String>,
) -> AppResult<ApiResponse<()>> {
    require_admin(&state, &jar).await?;
    delete(&GLOBAL_PROFILE, &state, &raw_id).await
}

pub async fn reorder_global_partners(
    State(state): State<AppState>,
    jar: CookieJar,
    Json(request): Json<ReorderRequest>,
) -> AppResult<ApiResponse<()>> {
    require_admin(&state, &jar).await?;
    reorder(
        &GLOBAL_PROFILE,
        &state,
        request,
        "Global partners reordered successfully",
    )
    .await
}
