//! The singleton career page and the edits the admin panel makes to its
//! sections.

use std::cmp::Ordering;

use axum::{
    Router,
    extract::State,
    routing::{delete, get, post, put},
};
use serde::Deserialize;
use serde_json::{Map, Value, json};
use uuid::Uuid;

mod admin;
mod store;

use crate::{
    AppState,
    web::{
        error::{AppError, AppResult, InternalContext},
        responses::ApiResponse,
        validation::is_valid_email,
    },
};

use store::CareerPage;

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/career-page", get(public_page))
        .route(
            "/admin/career-page",
            get(admin::get_page)
                .post(admin::create_page)
                .put(admin::update_page)
                .delete(admin::delete_page),
        )
        .route("/admin/career-page/section/:section", put(admin::update_section))
        .route("/admin/career-page/benefit", post(admin::add_benefit))
        .route(
            "/admin/career-page/benefit/:benefit_id",
            put(admin::update_benefit).delete(admin::delete_benefit),
        )
        .route("/admin/career-page/job-category", post(admin::add_job_category))
        .route(
            "/admin/career-page/job-category/:category",
            delete(admin::delete_job_category),
        )
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Section {
    Introduction,
    WhyWork,
    Openings,
    Closing,
}

impl Section {
    fn from_name(name: &str) -> Option<Self> {
        match name {
            "introduction" => Some(Self::Introduction),
            "whyWorkSection" => Some(Self::WhyWork),
            "openingsSection" => Some(Self::Openings),
            "closingSection" => Some(Self::Closing),
            _ => None,
        }
    }

    fn slot(self, page: &mut CareerPage) -> &mut Value {
        match self {
            Self::Introduction => &mut page.introduction.0,
            Self::WhyWork => &mut page.why_work_section.0,
            Self::Openings => &mut page.openings_section.0,
            Self::Closing => &mut page.closing_section.0,
        }
    }
}

/// All four sections, as sent on create and full update.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PageInput {
    introduction: Option<Value>,
    why_work_section: Option<Value>,
    openings_section: Option<Value>,
    closing_section: Option<Value>,
}

#[derive(Debug, Default, Deserialize)]
pub struct BenefitInput {
    #[serde(default)]
    icon: Option<String>,
    #[serde(default)]
    title: Option<String>,
    #[serde(default)]
    description: Option<String>,
}

fn present(value: &Option<String>) -> Option<&str> {
    value.as_deref().map(str::trim).filter(|v| !v.is_empty())
}

/// Rejects an openings section whose contact email is set but malformed.
fn check_contact_email(openings: &Value) -> AppResult<()> {
    let email = openings
        .pointer("/contactInfo/email")
        .and_then(Value::as_str)
        .filter(|email| !email.is_empty());
    match email {
        Some(email) if !is_valid_email(email) => Err(AppError::invalid(
            "Invalid email address in contact information",
        )),
        _ => Ok(()),
    }
}

/// The array stored under `name`, created when the section or the list is
/// missing or of the wrong shape.
fn list_field_mut<'a>(section: &'a mut Value, name: &str) -> &'a mut Vec<Value> {
    if !section.is_object() {
        *section = Value::Object(Map::new());
    }
    let Value::Object(fields) = section else {
        unreachable!("section was just made an object")
    };
    let list = fields.entry(name).or_insert_with(|| json!([]));
    if !list.is_array() {
        *list = json!([]);
    }
    let Value::Array(items) = list else {
        unreachable!("list was just made an array")
    };
    items
}

fn benefits_mut(why_work: &mut Value) -> &mut Vec<Value> {
    list_field_mut(why_work, "benefits")
}

fn benefit_id(benefit: &Value) -> &str {
    benefit.get("id").and_then(Value::as_str).unwrap_or_default()
}

fn benefit_order(benefit: &Value) -> i64 {
    benefit
        .get("display_order")
        .and_then(Value::as_i64)
        .unwrap_or(0)
}

/// Gives every benefit an id so it can be addressed later.
fn assign_benefit_ids(why_work: &mut Value) {
    for benefit in benefits_mut(why_work) {
        if let Some(fields) = benefit.as_object_mut() {
            if fields.get("id").and_then(Value::as_str).is_none() {
                fields.insert("id".into(), json!(Uuid::new_v4().to_string()));
            }
        }
    }
}

/// Orders benefits by `display_order`, then id.
fn sort_benefits(why_work: &mut Value) {
    if why_work.get("benefits").is_none() {
        return;
    }
    benefits_mut(why_work).sort_by(|a, b| match benefit_order(a).cmp(&benefit_order(b)) {
        Ordering::Equal => benefit_id(a).cmp(benefit_id(b)),
        other => other,
    });
}

fn push_benefit(why_work: &mut Value, input: &BenefitInput) -> AppResult<String> {
    let (Some(icon), Some(title), Some(description)) = (
        present(&input.icon),
        present(&input.title),
        present(&input.description),
    ) else {
        return Err(AppError::invalid(
            "Icon, title, and description are required",
        ));
    };

    let benefits = benefits_mut(why_work);
    let id = Uuid::new_v4().to_string();
    let display_order = benefits.len();
    benefits.push(json!({
        "id": &id,
        "icon": icon,
        "title": title,
        "description": description,
        "display_order": display_order,
    }));
    Ok(id)
}

/// Overwrites the non-blank attributes of one benefit. Returns false when no
/// benefit has `id`.
fn edit_benefit(why_work: &mut Value, id: &str, input: &BenefitInput) -> bool {
    let Some(benefit) = benefits_mut(why_work)
        .iter_mut()
        .find(|benefit| benefit_id(benefit) == id)
    else {
        return false;
    };
    let updates = [
        ("icon", present(&input.icon)),
        ("title", present(&input.title)),
        ("description", present(&input.description)),
    ];
    if let Some(fields) = benefit.as_object_mut() {
        for (name, value) in updates {
            if let Some(value) = value {
                fields.insert(name.into(), json!(value));
            }
        }
    }
    true
}

fn remove_benefit(why_work: &mut Value, id: &str) -> bool {
    let benefits = benefits_mut(why_work);
    let before = benefits.len();
    benefits.retain(|benefit| benefit_id(benefit) != id);
    benefits.len() != before
}

fn job_categories_mut(openings: &mut Value) -> &mut Vec<Value> {
    list_field_mut(openings, "jobCategories")
}

/// Adds `category` unless it is already listed.
fn insert_job_category(openings: &mut Value, category: &str) {
    let categories = job_categories_mut(openings);
    if !categories.iter().any(|existing| existing.as_str() == Some(category)) {
        categories.push(json!(category));
    }
}

fn drop_job_category(openings: &mut Value, category: &str) {
    job_categories_mut(openings).retain(|existing| existing.as_str() != Some(category));
}

fn presented(mut page: CareerPage) -> CareerPage {
    sort_benefits(&mut page.why_work_section.0);
    page
}

async fn public_page(State(state): State<AppState>) -> AppResult<ApiResponse<CareerPage>> {
    let page = store::fetch_active(state.pool_ref())
        .await
        .or_internal("Failed to fetch career page data")?
        .ok_or_else(|| AppError::NotFound("Career page data not found".into()))?;
    Ok(ApiResponse::ok(presented(page)))
}
