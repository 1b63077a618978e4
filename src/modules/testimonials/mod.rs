use axum::{
    Router,
    extract::State,
    routing::{get, put},
};
use serde::Deserialize;
use serde_json::{Map, Value, json};

mod admin;

use crate::{
    AppState,
    ordered::{
        CARD_TESTIMONIALS, Draft, ListFilter, Patch, ResourceError, ResourceKind, ResourceRecord,
        ResourceResult, VIDEO_TESTIMONIALS,
    },
    web::{error::AppResult, forms::FormFields, responses::ApiResponse},
};

const CARD_FIELDS: [&str; 4] = ["name", "role", "location", "content"];

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/testimonials/cards", get(public_cards))
        .route("/testimonials/videos", get(public_videos))
        .route(
            "/admin/testimonials/cards",
            get(admin::list_cards).post(admin::create_card),
        )
        .route(
            "/admin/testimonials/cards/:id",
            get(admin::get_card)
                .put(admin::update_card)
                .delete(admin::delete_card),
        )
        .route(
            "/admin/testimonials/videos",
            get(admin::list_videos).post(admin::create_video),
        )
        .route(
            "/admin/testimonials/videos/:id",
            get(admin::get_video)
                .put(admin::update_video)
                .delete(admin::delete_video),
        )
        .route("/admin/testimonials/reorder", put(admin::reorder_testimonials))
}

async fn active_records(
    state: &AppState,
    kind: &'static ResourceKind,
) -> AppResult<ApiResponse<Vec<ResourceRecord>>> {
    let repo = state.repository(kind);
    let records = state.resources(&repo).list(&ListFilter::active()).await?;
    let count = records.len();
    Ok(ApiResponse::ok(records).with_count(count))
}

async fn public_cards(State(state): State<AppState>) -> AppResult<ApiResponse<Vec<ResourceRecord>>> {
    active_records(&state, &CARD_TESTIMONIALS).await
}

async fn public_videos(
    State(state): State<AppState>,
) -> AppResult<ApiResponse<Vec<ResourceRecord>>> {
    active_records(&state, &VIDEO_TESTIMONIALS).await
}

fn card_fields<F: FormFields + ?Sized>(form: &F) -> Map<String, Value> {
    CARD_FIELDS
        .iter()
        .filter_map(|name| form.text(name).map(|value| (name.to_string(), json!(value.trim()))))
        .collect()
}

fn card_draft<F: FormFields + ?Sized>(form: &F) -> ResourceResult<Draft> {
    if form.non_empty("name").is_none() || form.non_empty("content").is_none() {
        return Err(ResourceError::invalid("Name and content are required"));
    }
    Ok(Draft {
        category: None,
        fields: card_fields(form),
    })
}

fn card_patch<F: FormFields + ?Sized>(form: &F) -> ResourceResult<Patch> {
    let fields = card_fields(form);
    for required in ["name", "content"] {
        if fields.get(required).and_then(Value::as_str) == Some("") {
            return Err(ResourceError::invalid("Name and content cannot be empty"));
        }
    }
    Ok(Patch {
        fields,
        ..Patch::default()
    })
}

/// JSON body for video testimonials. Absent fields are left untouched on
/// update.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VideoInput {
    title: Option<String>,
    description: Option<String>,
    #[serde(rename = "type")]
    video_kind: Option<String>,
    duration: Option<String>,
    video_url: Option<String>,
    video_type: Option<String>,
    video_tag: Option<String>,
    rating: Option<f64>,
    #[serde(alias = "is_active")]
    is_active: Option<bool>,
}

impl VideoInput {
    fn into_fields(self) -> ResourceResult<Map<String, Value>> {
        if let Some(rating) = self.rating {
            if !(0.0..=5.0).contains(&rating) {
                return Err(ResourceError::invalid("Rating must be between 0 and 5"));
            }
        }

        let text = [
            ("title", self.title),
            ("description", self.description),
            ("type", self.video_kind),
            ("duration", self.duration),
            ("videoUrl", self.video_url),
            ("videoType", self.video_type),
            ("videoTag", self.video_tag),
        ];
        let mut fields: Map<String, Value> = text
            .into_iter()
            .filter_map(|(name, value)| value.map(|v| (name.to_string(), json!(v.trim()))))
            .collect();
        if let Some(rating) = self.rating {
            fields.insert("rating".into(), json!(rating));
        }
        Ok(fields)
    }
}

fn has_video_url(fields: &Map<String, Value>) -> bool {
    fields
        .get("videoUrl")
        .and_then(Value::as_str)
        .is_some_and(|url| !url.is_empty())
}

fn video_draft(input: VideoInput) -> ResourceResult<Draft> {
    let fields = input.into_fields()?;
    if !has_video_url(&fields) {
        return Err(ResourceError::invalid("Video URL is required"));
    }
    Ok(Draft {
        category: None,
        fields,
    })
}

fn video_patch(input: VideoInput) -> ResourceResult<Patch> {
    let is_active = input.is_active;
    let fields = input.into_fields()?;
    if fields.contains_key("videoUrl") && !has_video_url(&fields) {
        return Err(ResourceError::invalid("Video URL cannot be empty"));
    }
    Ok(Patch {
        category: None,
        fields,
        is_active,
    })
}
