use axum::extract::State;
use axum_extra::extract::cookie::CookieJar;
use serde::Deserialize;
use serde_json::Value;
use tracing::info;

use crate::web::extract::{Json, Path};
use crate::{
    AppState,
    web::{
        auth::require_admin,
        error::{AppError, AppResult, InternalContext},
        responses::ApiResponse,
    },
};

use super::{
    BenefitInput, PageInput, Section, assign_benefit_ids, check_contact_email, drop_job_category,
    edit_benefit, insert_job_category, presented, push_benefit, remove_benefit,
    store::{self, CareerPage},
};

async fn active_page(state: &AppState, missing: &str) -> AppResult<CareerPage> {
    store::fetch_active(state.pool_ref())
        .await
        .or_internal("Failed to fetch career page data")?
        .ok_or_else(|| AppError::NotFound(missing.to_string()))
}

async fn save_page(state: &AppState, page: &CareerPage) -> AppResult<CareerPage> {
    let saved = store::save(state.pool_ref(), page)
        .await
        .or_internal("Failed to update career page")?;
    Ok(presented(saved))
}

pub async fn get_page(
    State(state): State<AppState>,
    jar: CookieJar,
) -> AppResult<ApiResponse<CareerPage>> {
    require_admin(&state, &jar).await?;
    let page = active_page(&state, "Career page data not found").await?;
    Ok(ApiResponse::ok(presented(page)))
}

pub async fn create_page(
    State(state): State<AppState>,
    jar: CookieJar,
    Json(input): Json<PageInput>,
) -> AppResult<ApiResponse<CareerPage>> {
    require_admin(&state, &jar).await?;

    let (Some(introduction), Some(mut why_work), Some(openings), Some(closing)) = (
        input.introduction.filter(|v| !v.is_null()),
        input.why_work_section.filter(|v| !v.is_null()),
        input.openings_section.filter(|v| !v.is_null()),
        input.closing_section.filter(|v| !v.is_null()),
    ) else {
        return Err(AppError::invalid("All sections are required"));
    };
    check_contact_email(&openings)?;

    if store::any_exists(state.pool_ref())
        .await
        .or_internal("Failed to create career page")?
    {
        return Err(AppError::invalid(
            "Career page already exists. Use update endpoint instead.",
        ));
    }

    assign_benefit_ids(&mut why_work);
    let page = store::insert(state.pool_ref(), [introduction, why_work, openings, closing])
        .await
        .or_internal("Failed to create career page")?;

    info!(id = %page.id, "created career page");
    Ok(ApiResponse::created(presented(page)).with_message("Career page created successfully"))
}

pub async fn update_page(
    State(state): State<AppState>,
    jar: CookieJar,
    Json(input): Json<PageInput>,
) -> AppResult<ApiResponse<CareerPage>> {
    require_admin(&state, &jar).await?;
    if let Some(openings) = input.openings_section.as_ref() {
        check_contact_email(openings)?;
    }

    let mut page = active_page(&state, "Career page not found. Create one first.").await?;
    let sections = [
        (Section::Introduction, input.introduction),
        (Section::WhyWork, input.why_work_section),
        (Section::Openings, input.openings_section),
        (Section::Closing, input.closing_section),
    ];
    for (section, value) in sections {
        if let Some(value) = value {
            *section.slot(&mut page) = value;
        }
    }
    assign_benefit_ids(&mut page.why_work_section.0);

    let page = save_page(&state, &page).await?;
    Ok(ApiResponse::ok(page).with_message("Career page updated successfully"))
}

pub async fn update_section(
    State(state): State<AppState>,
    jar: CookieJar,
    Path(name): Path<String>,
    Json(value): Json<Value>,
) -> AppResult<ApiResponse<CareerPage>> {
    require_admin(&state, &jar).await?;
    let section =
        Section::from_name(&name).ok_or_else(|| AppError::invalid("Invalid section name"))?;
    if section == Section::Openings {
        check_contact_email(&value)?;
    }

    let mut page = active_page(&state, "Career page not found").await?;
    *section.slot(&mut page) = value;
    if section == Section::WhyWork {
        assign_benefit_ids(&mut page.why_work_section.0);
    }

    let page = save_page(&state, &page).await?;
    Ok(ApiResponse::ok(page).with_message(format!("{name} updated successfully")))
}

pub async fn add_benefit(
    State(state): State<AppState>,
    jar: CookieJar,
    Json(input): Json<BenefitInput>,
) -> AppResult<ApiResponse<CareerPage>> {
    require_admin(&state, &jar).await?;

    let mut page = active_page(&state, "Career page not found").await?;
    push_benefit(&mut page.why_work_section.0, &input)?;

    let page = save_page(&state, &page).await?;
    Ok(ApiResponse::ok(page).with_message("Benefit added successfully"))
}

pub async fn update_benefit(
    State(state): State<AppState>,
    jar: CookieJar,
    Path(benefit_id): Path<String>,
    Json(input): Json<BenefitInput>,
) -> AppResult<ApiResponse<CareerPage>> {
    require_admin(&state, &jar).await?;

    let mut page = active_page(&state, "Career page or benefit not found").await?;
    if !edit_benefit(&mut page.why_work_section.0, &benefit_id, &input) {
        return Err(AppError::NotFound("Career page or benefit not found".into()));
    }

    let page = save_page(&state, &page).await?;
    Ok(ApiResponse::ok(page).with_message("Benefit updated successfully"))
}

pub async fn delete_benefit(
    State(state): State<AppState>,
    jar: CookieJar,
    Path(benefit_id): Path<String>,
) -> AppResult<ApiResponse<CareerPage>> {
    require_admin(&state, &jar).await?;

    let mut page = active_page(&state, "Career page not found").await?;
    if !remove_benefit(&mut page.why_work_section.0, &benefit_id) {
        return Err(AppError::NotFound("Career page or benefit not found".into()));
    }

    let page = save_page(&state, &page).await?;
    Ok(ApiResponse::ok(page).with_message("Benefit deleted successfully"))
}

#[derive(Debug, Deserialize)]
pub struct JobCategoryInput {
    #[serde(default)]
    category: Option<String>,
}

pub async fn add_job_category(
    State(state): State<AppState>,
    jar: CookieJar,
    Json(input): Json<JobCategoryInput>,
) -> AppResult<ApiResponse<CareerPage>> {
    require_admin(&state, &jar).await?;
    let category = input
        .category
        .as_deref()
        .map(str::trim)
        .filter(|category| !category.is_empty())
        .ok_or_else(|| AppError::invalid("Category is required"))?;

    let mut page = active_page(&state, "Career page not found").await?;
    insert_job_category(&mut page.openings_section.0, category);

    let page = save_page(&state, &page).await?;
    Ok(ApiResponse::ok(page).with_message("Job category added successfully"))
}

pub async fn delete_job_category(
    State(state): State<AppState>,
    jar: CookieJar,
    Path(category): Path<String>,
) -> AppResult<ApiResponse<CareerPage>> {
    require_admin(&state, &jar).await?;

    let mut page = active_page(&state, "Career page not found").await?;
    drop_job_category(&mut page.openings_section.0, &category);

    let page = save_page(&state, &page).await?;
    Ok(ApiResponse::ok(page).with_message("Job category deleted successfully"))
}

pub async fn delete_page(
    State(state): State<AppState>,
    jar: CookieJar,
) -> AppResult<ApiResponse<()>> {
    require_admin(&state, &jar).await?;

    let deleted = store::delete_active(state.pool_ref())
        .await
        .or_internal("Failed to delete career page")?;
    if !deleted {
        return Err(AppError::NotFound("Career page not found".into()));
    }

    info!("deleted career page");
    Ok(ApiResponse::message("Career page deleted successfully"))
}
