//! Page content blocks edited from the dashboard: per-page carousels, video
//! cards, image sections, hero sections and bullet points.

use axum::{
    Router,
    extract::State,
    routing::{delete, get, post, put},
};
use serde::Deserialize;
use serde_json::{Map, Value, json};

mod admin;
mod carousel;

use crate::{
    AppState,
    ordered::{
        BULLET_POINTS, CAROUSELS, Draft, HERO_SECTIONS, ListFilter, PAGE_SECTIONS, Patch,
        ResourceError, ResourceKind, ResourceRecord, ResourceResult, VIDEO_CARDS,
    },
    web::{
        error::AppResult,
        extract::{Path, Query},
        forms::FormFields,
        responses::ApiResponse,
    },
};

const SECTION_ORIENTATIONS: [&str; 2] = ["left", "right"];

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/carousel", get(public_carousels))
        .route("/carousel/:page", get(public_carousel))
        .route("/video-cards", get(public_video_cards))
        .route("/hero-section", get(public_hero_sections))
        .route("/bullet-points", get(public_bullet_points))
        .route("/sections", get(public_sections))
        .route(
            "/admin/carousel",
            get(admin::list_carousels).post(admin::save_carousel),
        )
        .route("/admin/carousel/:id", delete(admin::delete_carousel))
        .route(
            "/admin/video-cards",
            get(admin::list_video_cards).post(admin::create_video_card),
        )
        .route(
            "/admin/video-cards/:id",
            put(admin::update_video_card).delete(admin::delete_video_card),
        )
        .route(
            "/admin/hero-section",
            get(admin::list_hero_sections).post(admin::create_hero_section),
        )
        .route(
            "/admin/hero-section/:id",
            put(admin::update_hero_section).delete(admin::delete_hero_section),
        )
        .route(
            "/admin/bullet-points",
            get(admin::list_bullet_points).post(admin::create_bullet_point),
        )
        .route(
            "/admin/bullet-points/:id",
            put(admin::update_bullet_point).delete(admin::delete_bullet_point),
        )
        .route("/admin/sections", post(admin::create_section).get(admin::list_sections))
        .route(
            "/admin/sections/:id",
            get(admin::get_section)
                .put(admin::update_section)
                .delete(admin::delete_section),
        )
}

/// Optional `?page=` narrowing for public listings.
#[derive(Debug, Default, Deserialize)]
pub struct PageQuery {
    #[serde(default)]
    page: Option<String>,
}

impl PageQuery {
    fn filter(self) -> ListFilter {
        match self.page.map(|page| page.trim().to_string()) {
            Some(page) if !page.is_empty() => ListFilter::active().with_field("page", page),
            _ => ListFilter::active(),
        }
    }
}

async fn listed(
    state: &AppState,
    kind: &'static ResourceKind,
    filter: ListFilter,
) -> AppResult<ApiResponse<Vec<ResourceRecord>>> {
    let repo = state.repository(kind);
    let records = state.resources(&repo).list(&filter).await?;
    let count = records.len();
    Ok(ApiResponse::ok(records).with_count(count))
}

async fn public_carousels(
    State(state): State<AppState>,
) -> AppResult<ApiResponse<Vec<ResourceRecord>>> {
    listed(&state, &CAROUSELS, ListFilter::active()).await
}

async fn public_carousel(
    State(state): State<AppState>,
    Path(page): Path<String>,
) -> AppResult<ApiResponse<ResourceRecord>> {
    let repo = state.repository(&CAROUSELS);
    let carousel = state
        .resources(&repo)
        .find_by_field("page", page.trim())
        .await?;
    Ok(ApiResponse::ok(carousel))
}

async fn public_video_cards(
    State(state): State<AppState>,
) -> AppResult<ApiResponse<Vec<ResourceRecord>>> {
    listed(&state, &VIDEO_CARDS, ListFilter::active()).await
}

async fn public_hero_sections(
    State(state): State<AppState>,
    Query(query): Query<PageQuery>,
) -> AppResult<ApiResponse<Vec<ResourceRecord>>> {
    listed(&state, &HERO_SECTIONS, query.filter()).await
}

async fn public_bullet_points(
    State(state): State<AppState>,
    Query(query): Query<PageQuery>,
) -> AppResult<ApiResponse<Vec<ResourceRecord>>> {
    listed(&state, &BULLET_POINTS, query.filter()).await
}

async fn public_sections(
    State(state): State<AppState>,
    Query(query): Query<PageQuery>,
) -> AppResult<ApiResponse<Vec<ResourceRecord>>> {
    listed(&state, &PAGE_SECTIONS, query.filter()).await
}

fn trimmed_fields<F: FormFields + ?Sized>(form: &F, names: &[&str]) -> Map<String, Value> {
    names
        .iter()
        .filter_map(|name| form.text(name).map(|value| (name.to_string(), json!(value.trim()))))
        .collect()
}

fn is_blank(fields: &Map<String, Value>, name: &str) -> bool {
    fields
        .get(name)
        .and_then(Value::as_str)
        .is_none_or(str::is_empty)
}

const VIDEO_CARD_FIELDS: [&str; 3] = ["title", "description", "videoUrl"];

fn video_card_draft<F: FormFields + ?Sized>(form: &F) -> ResourceResult<Draft> {
    let fields = trimmed_fields(form, &VIDEO_CARD_FIELDS);
    if is_blank(&fields, "title") || is_blank(&fields, "videoUrl") {
        return Err(ResourceError::invalid("Title and video URL are required"));
    }
    Ok(Draft {
        category: None,
        fields,
    })
}

fn video_card_patch<F: FormFields + ?Sized>(form: &F) -> ResourceResult<Patch> {
    let fields = trimmed_fields(form, &VIDEO_CARD_FIELDS);
    for required in ["title", "videoUrl"] {
        if fields.contains_key(required) && is_blank(&fields, required) {
            return Err(ResourceError::invalid("Title and video URL cannot be empty"));
        }
    }
    Ok(Patch {
        fields,
        ..Patch::default()
    })
}

const SECTION_FIELDS: [&str; 5] = ["page", "heading", "subHeading", "body", "orientation"];

/// Sections are always submitted whole; create and update share the rules.
fn section_fields<F: FormFields + ?Sized>(form: &F) -> ResourceResult<Map<String, Value>> {
    let fields = trimmed_fields(form, &SECTION_FIELDS);
    if ["page", "heading", "body", "orientation"]
        .iter()
        .any(|name| is_blank(&fields, name))
    {
        return Err(ResourceError::invalid("All fields are required"));
    }

    let orientation = fields.get("orientation").and_then(Value::as_str);
    if !orientation.is_some_and(|value| SECTION_ORIENTATIONS.contains(&value)) {
        return Err(ResourceError::invalid(
            "Orientation must be either \"left\" or \"right\"",
        ));
    }
    Ok(fields)
}

fn section_draft<F: FormFields + ?Sized>(form: &F) -> ResourceResult<Draft> {
    Ok(Draft {
        category: None,
        fields: section_fields(form)?,
    })
}

/// Replaces every attribute; an omitted sub-heading is cleared.
fn section_patch<F: FormFields + ?Sized>(form: &F) -> ResourceResult<Patch> {
    let mut fields = section_fields(form)?;
    fields.entry("subHeading").or_insert(Value::Null);
    Ok(Patch {
        fields,
        ..Patch::default()
    })
}

/// JSON body for hero sections. Absent fields are left untouched on update.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HeroInput {
    page: Option<String>,
    heading: Option<String>,
    sub_heading: Option<String>,
    cta_text: Option<String>,
    cta_url: Option<String>,
    is_active: Option<bool>,
}

impl HeroInput {
    fn into_patch(self) -> ResourceResult<Patch> {
        let fields = text_fields([
            ("page", self.page),
            ("heading", self.heading),
            ("subHeading", self.sub_heading),
            ("ctaText", self.cta_text),
            ("ctaUrl", self.cta_url),
        ]);
        if fields.contains_key("heading") && is_blank(&fields, "heading") {
            return Err(ResourceError::invalid("Heading cannot be empty"));
        }
        Ok(Patch {
            category: None,
            fields,
            is_active: self.is_active,
        })
    }

    fn into_draft(self) -> ResourceResult<Draft> {
        let patch = self.into_patch()?;
        if is_blank(&patch.fields, "heading") {
            return Err(ResourceError::invalid("Heading is required"));
        }
        Ok(Draft {
            category: None,
            fields: patch.fields,
        })
    }
}

/// JSON body for bullet points.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BulletInput {
    page: Option<String>,
    text: Option<String>,
    is_active: Option<bool>,
}

impl BulletInput {
    fn into_patch(self) -> ResourceResult<Patch> {
        let fields = text_fields([("page", self.page), ("text", self.text)]);
        if fields.contains_key("text") && is_blank(&fields, "text") {
            return Err(ResourceError::invalid("Text cannot be empty"));
        }
        Ok(Patch {
            category: None,
            fields,
            is_active: self.is_active,
        })
    }

    fn into_draft(self) -> ResourceResult<Draft> {
        let patch = self.into_patch()?;
        if is_blank(&patch.fields, "text") {
            return Err(ResourceError::invalid("Text is required"));
        }
        Ok(Draft {
            category: None,
            fields: patch.fields,
        })
    }
}

fn text_fields<const N: usize>(values: [(&str, Option<String>); N]) -> Map<String, Value> {
    values
        .into_iter()
        .filter_map(|(name, value)| value.map(|v| (name.to_string(), json!(v.trim()))))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::modules::common::testing::form;

    #[test]
    fn section_needs_every_field_but_the_subheading() {
        let err = section_draft(&form(&[
            ("page", "about"),
            ("heading", "Our reach"),
            ("orientation", "left"),
        ]))
        .unwrap_err();
        assert_eq!(err.to_string(), "All fields are required");

        let draft = section_draft(&form(&[
            ("page", "about"),
            ("heading", " Our reach "),
            ("body", "Twelve districts"),
            ("orientation", "right"),
        ]))
        .unwrap();
        assert_eq!(draft.fields["heading"], json!("Our reach"));
        assert!(!draft.fields.contains_key("subHeading"));
    }

    #[test]
    fn section_orientation_is_left_or_right() {
        let err = section_patch(&form(&[
            ("page", "about"),
            ("heading", "Our reach"),
            ("body", "Twelve districts"),
            ("orientation", "center"),
        ]))
        .unwrap_err();
        assert_eq!(
            err.to_string(),
            "Orientation must be either \"left\" or \"right\""
        );

        let patch = section_patch(&form(&[
            ("page", "about"),
            ("heading", "Our reach"),
            ("body", "Twelve districts"),
            ("orientation", "left"),
        ]))
        .unwrap();
        assert_eq!(patch.fields["subHeading"], Value::Null);
    }

    #[test]
    fn video_card_requires_title_and_url() {
        let err = video_card_draft(&form(&[("title", "Field day")])).unwrap_err();
        assert_eq!(err.to_string(), "Title and video URL are required");

        let patch = video_card_patch(&form(&[("description", "Updated")])).unwrap();
        assert_eq!(patch.fields.len(), 1);
        assert!(video_card_patch(&form(&[("videoUrl", " ")])).is_err());
    }

    #[test]
    fn hero_input_keeps_absent_fields_untouched() {
        let input: HeroInput =
            serde_json::from_value(json!({"ctaText": "Donate", "isActive": false})).unwrap();
        let patch = input.into_patch().unwrap();
        assert_eq!(patch.fields.len(), 1);
        assert_eq!(patch.fields["ctaText"], json!("Donate"));
        assert_eq!(patch.is_active, Some(false));

        let input: HeroInput = serde_json::from_value(json!({"page": "home"})).unwrap();
        assert_eq!(input.into_draft().unwrap_err().to_string(), "Heading is required");
    }

    #[test]
    fn bullet_point_text_cannot_be_blanked() {
        let input: BulletInput = serde_json::from_value(json!({"text": "  "})).unwrap();
        assert_eq!(input.into_patch().unwrap_err().to_string(), "Text cannot be empty");

        let input: BulletInput =
            serde_json::from_value(json!({"text": " Free tutoring ", "page": "home"})).unwrap();
        let draft = input.into_draft().unwrap();
        assert_eq!(draft.fields["text"], json!("Free tutoring"));
    }

    #[test]
    fn page_query_narrows_active_records() {
        let filter = PageQuery {
            page: Some(" home ".into()),
        }
        .filter();
        assert!(filter.active_only);
        assert_eq!(filter.field, Some(("page".into(), "home".into())));

        let filter = PageQuery { page: Some(String::new()) }.filter();
        assert_eq!(filter.field, None);
    }
}
