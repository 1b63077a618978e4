use axum::{
    Router,
    extract::State,
    routing::{get, put},
};
use serde::Deserialize;
use serde_json::{Map, Value, json};

mod admin;

use crate::web::extract::Query;
use crate::{
    AppState,
    ordered::{
        Draft, GALLERY_ITEMS, ListFilter, Patch, ResourceError, ResourceRecord, ResourceResult,
    },
    web::{
        error::AppResult,
        forms::FormFields,
        responses::ApiResponse,
        validation::{escape_html, length_within},
    },
};

const YEAR_RANGE: std::ops::RangeInclusive<i64> = 2000..=2030;

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/gallery", get(public_items))
        .route(
            "/admin/gallery",
            get(admin::list_items).post(admin::create_item),
        )
        .route("/admin/gallery/reorder", put(admin::reorder_items))
        .route(
            "/admin/gallery/:id",
            get(admin::get_item)
                .put(admin::update_item)
                .delete(admin::delete_item),
        )
        .route("/admin/gallery/:id/toggle-status", put(admin::toggle_item))
}

#[derive(Deserialize)]
struct PublicQuery {
    #[serde(default)]
    category: Option<String>,
}

async fn public_items(
    State(state): State<AppState>,
    Query(query): Query<PublicQuery>,
) -> AppResult<ApiResponse<Vec<ResourceRecord>>> {
    let repo = state.repository(&GALLERY_ITEMS);
    let mut filter = ListFilter::active();
    if let Some(category) = query.category.filter(|c| !c.is_empty() && c != "all") {
        filter = filter.in_category(category);
    }

    let items = state.resources(&repo).list(&filter).await?;
    let count = items.len();
    Ok(ApiResponse::ok(items).with_count(count))
}

fn check_category(category: &str) -> ResourceResult<()> {
    if GALLERY_ITEMS.accepts_category(category) {
        Ok(())
    } else {
        Err(ResourceError::invalid(format!(
            "Category must be one of: {}",
            GALLERY_ITEMS.categories.join(", ")
        )))
    }
}

fn parse_year(raw: &str) -> ResourceResult<i64> {
    raw.trim()
        .parse::<i64>()
        .ok()
        .filter(|year| YEAR_RANGE.contains(year))
        .ok_or_else(|| ResourceError::invalid("Year must be between 2000-2030"))
}

fn gallery_draft<F: FormFields + ?Sized>(form: &F) -> ResourceResult<Draft> {
    let title = form.text("title").unwrap_or_default();
    if !length_within(title, 1, 255) {
        return Err(ResourceError::invalid(
            "Title is required and must be between 1-255 characters",
        ));
    }

    let description = form.text("description").unwrap_or_default();
    if !length_within(description, 1, 1000) {
        return Err(ResourceError::invalid(
            "Description is required and must be between 1-1000 characters",
        ));
    }

    let category = form.non_empty("category").unwrap_or_default();
    check_category(&category)?;

    let year = parse_year(form.text("year").unwrap_or_default())?;

    let mut fields = Map::new();
    fields.insert("title".into(), json!(escape_html(title.trim())));
    fields.insert("description".into(), json!(escape_html(description.trim())));
    fields.insert("year".into(), json!(year));

    Ok(Draft {
        category: Some(category),
        fields,
    })
}

/// Blank fields are treated as not submitted.
fn gallery_patch<F: FormFields + ?Sized>(form: &F) -> ResourceResult<Patch> {
    let mut patch = Patch::default();

    if let Some(title) = form.text("title").filter(|t| !t.is_empty()) {
        if !length_within(title, 1, 255) {
            return Err(ResourceError::invalid("Title must be between 1-255 characters"));
        }
        patch
            .fields
            .insert("title".into(), Value::String(escape_html(title.trim())));
    }

    if let Some(description) = form.text("description").filter(|d| !d.is_empty()) {
        if !length_within(description, 1, 1000) {
            return Err(ResourceError::invalid(
                "Description must be between 1-1000 characters",
            ));
        }
        patch.fields.insert(
            "description".into(),
            Value::String(escape_html(description.trim())),
        );
    }

    if let Some(category) = form.non_empty("category") {
        check_category(&category)?;
        patch.category = Some(category);
    }

    if let Some(year) = form.non_empty("year") {
        patch.fields.insert("year".into(), json!(parse_year(&year)?));
    }

    Ok(patch)
}
