use axum::{
    Router,
    extract::State,
    routing::{get, post},
};
use serde::Serialize;
use serde_json::{Map, Value, json};

mod admin;

use crate::web::extract::{Json, Path};
use crate::{
    AppState,
    ordered::{
        Draft, LEADERSHIP_MEMBERS, ListFilter, Page, Patch, ResourceError, ResourceRecord,
        ResourceResult,
    },
    web::{
        error::{AppError, AppResult},
        forms::FormFields,
        responses::ApiResponse,
        validation::{escape_html, length_within, parse_bool, slugify},
    },
};

const RELATED_MEMBERS: i64 = 6;
const CATEGORY_ERROR: &str = "Category must be directors, advisors, or staff";

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/leadership", get(public_members))
        .route("/leadership/bio/:slug", get(member_bio))
        .route(
            "/admin/leadership",
            get(admin::list_members).post(admin::create_member),
        )
        .route("/admin/leadership/reorder", post(admin::reorder_members))
        .route(
            "/admin/leadership/:id",
            get(admin::get_member)
                .put(admin::update_member)
                .delete(admin::delete_member),
        )
}

#[derive(Debug, Default, Serialize)]
struct LeadershipGroups {
    directors: Vec<ResourceRecord>,
    advisors: Vec<ResourceRecord>,
    staff: Vec<ResourceRecord>,
}

impl LeadershipGroups {
    fn from_records(records: Vec<ResourceRecord>) -> Self {
        let mut groups = Self::default();
        for record in records {
            match record.category.as_deref() {
                Some("directors") => groups.directors.push(record),
                Some("advisors") => groups.advisors.push(record),
                Some("staff") => groups.staff.push(record),
                _ => {}
            }
        }
        groups
    }
}

async fn public_members(State(state): State<AppState>) -> AppResult<ApiResponse<LeadershipGroups>> {
    let repo = state.repository(&LEADERSHIP_MEMBERS);
    let members = state.resources(&repo).list(&ListFilter::active()).await?;
    Ok(ApiResponse::ok(LeadershipGroups::from_records(members)))
}

#[derive(Serialize)]
struct MemberBio {
    member: ResourceRecord,
    #[serde(rename = "relatedMembers")]
    related_members: Vec<ResourceRecord>,
}

async fn member_bio(
    State(state): State<AppState>,
    Path(slug): Path<String>,
) -> AppResult<Json<MemberBio>> {
    let repo = state.repository(&LEADERSHIP_MEMBERS);
    let resources = state.resources(&repo);

    let member = match resources.find_by_field("slug", &slug).await {
        Ok(member) if member.is_active && shows_bio(&member) => member,
        Ok(_) | Err(ResourceError::NotFound(_)) => return Err(AppError::not_found("Member")),
        Err(err) => return Err(err.into()),
    };

    let mut filter = ListFilter::active().paged(Page {
        number: 1,
        size: RELATED_MEMBERS,
    });
    filter.category = member.category.clone();
    filter.exclude = Some(member.id);
    let related_members = resources.list(&filter).await?;

    Ok(Json(MemberBio {
        member,
        related_members,
    }))
}

fn shows_bio(member: &ResourceRecord) -> bool {
    member
        .fields
        .get("show_bio")
        .and_then(Value::as_bool)
        .unwrap_or(true)
}

fn escaped(value: &str) -> Value {
    Value::String(escape_html(value.trim()))
}

fn leadership_draft<F: FormFields + ?Sized>(form: &F) -> ResourceResult<Draft> {
    let mut errors = Vec::new();

    let name = form.text("name").unwrap_or_default();
    if !length_within(name.trim(), 1, 100) {
        errors.push("Name is required and must be between 1-100 characters".to_string());
    }
    let title = form.text("title").unwrap_or_default();
    if !length_within(title.trim(), 1, 100) {
        errors.push("Title is required and must be between 1-100 characters".to_string());
    }
    let description = form.text("description").unwrap_or_default();
    if !length_within(description.trim(), 1, 5000) {
        errors.push("Description is required and must be between 1-5000 characters".to_string());
    }
    let category = form.non_empty("category").unwrap_or_default();
    if !LEADERSHIP_MEMBERS.accepts_category(&category) {
        errors.push(CATEGORY_ERROR.to_string());
    }
    let full_bio = form.text("fullBio").unwrap_or_default();
    if !length_within(full_bio.trim(), 0, 2000) {
        errors.push("Full bio must not exceed 2000 characters".to_string());
    }
    let has_image = match form.non_empty("hasImage") {
        Some(raw) => parse_bool(&raw).unwrap_or_else(|| {
            errors.push("hasImage must be a boolean value".to_string());
            true
        }),
        None => true,
    };

    if !errors.is_empty() {
        return Err(ResourceError::with_errors(errors));
    }

    let mut fields = Map::new();
    fields.insert("name".into(), escaped(name));
    fields.insert("title".into(), escaped(title));
    fields.insert("description".into(), escaped(description));
    fields.insert("fullBio".into(), escaped(full_bio));
    fields.insert("hasImage".into(), json!(has_image));
    fields.insert("show_bio".into(), json!(true));
    fields.insert("slug".into(), json!(slugify(name)));

    Ok(Draft {
        category: Some(category),
        fields,
    })
}

/// `has_upload` marks a replacement image in the same request, which implies
/// `hasImage` unless the form says otherwise.
fn leadership_patch<F: FormFields + ?Sized>(form: &F, has_upload: bool) -> ResourceResult<Patch> {
    let mut errors = Vec::new();
    let mut patch = Patch::default();

    if let Some(name) = form.text("name") {
        if length_within(name.trim(), 1, 100) {
            patch.fields.insert("name".into(), escaped(name));
            patch.fields.insert("slug".into(), json!(slugify(name)));
        } else {
            errors.push("Name must be between 1-100 characters".to_string());
        }
    }
    if let Some(title) = form.text("title") {
        if length_within(title.trim(), 1, 100) {
            patch.fields.insert("title".into(), escaped(title));
        } else {
            errors.push("Title must be between 1-100 characters".to_string());
        }
    }
    if let Some(description) = form.text("description") {
        if length_within(description.trim(), 1, 5000) {
            patch.fields.insert("description".into(), escaped(description));
        } else {
            errors.push("Description must be between 1-5000 characters".to_string());
        }
    }
    if let Some(category) = form.text("category") {
        if LEADERSHIP_MEMBERS.accepts_category(category.trim()) {
            patch.category = Some(category.trim().to_string());
        } else {
            errors.push(CATEGORY_ERROR.to_string());
        }
    }
    if let Some(full_bio) = form.text("fullBio") {
        if length_within(full_bio.trim(), 0, 2000) {
            patch.fields.insert("fullBio".into(), escaped(full_bio));
        } else {
            errors.push("Full bio must not exceed 2000 characters".to_string());
        }
    }
    if let Some(raw) = form.text("is_active") {
        match parse_bool(raw) {
            Some(active) => patch.is_active = Some(active),
            None => errors.push("is_active must be a boolean value".to_string()),
        }
    }

    if has_upload {
        patch.fields.insert("hasImage".into(), json!(true));
    }
    if let Some(raw) = form.text("hasImage") {
        match parse_bool(raw) {
            Some(has_image) => {
                patch.fields.insert("hasImage".into(), json!(has_image));
            }
            None => errors.push("hasImage must be a boolean value".to_string()),
        }
    }

    if errors.is_empty() {
        Ok(patch)
    } else {
        Err(ResourceError::with_errors(errors))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::modules::common::testing::form;
    use chrono::Utc;
    use uuid::Uuid;

    #[test]
    fn draft_collects_every_error() {
        let err = leadership_draft(&form(&[("category", "interns"), ("hasImage", "perhaps")]))
            .unwrap_err();
        match err {
            ResourceError::Invalid { message, errors } => {
                assert_eq!(message, "Validation errors");
                assert_eq!(
                    errors,
                    vec![
                        "Name is required and must be between 1-100 characters",
                        "Title is required and must be between 1-100 characters",
                        "Description is required and must be between 1-5000 characters",
                        CATEGORY_ERROR,
                        "hasImage must be a boolean value",
                    ]
                );
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn draft_derives_slug_and_defaults() {
        let draft = leadership_draft(&form(&[
            ("name", " Dr. Meera Iyer "),
            ("title", "Chair"),
            ("description", "Leads <the> board"),
            ("category", "directors"),
        ]))
        .unwrap();

        assert_eq!(draft.category.as_deref(), Some("directors"));
        assert_eq!(draft.fields["slug"], json!("dr-meera-iyer"));
        assert_eq!(draft.fields["description"], json!("Leads &lt;the&gt; board"));
        assert_eq!(draft.fields["hasImage"], json!(true));
        assert_eq!(draft.fields["fullBio"], json!(""));
    }

    #[test]
    fn renaming_regenerates_slug() {
        let patch = leadership_patch(&form(&[("name", "Anil Kumar")]), false).unwrap();
        assert_eq!(patch.fields["slug"], json!("anil-kumar"));
        assert!(!patch.fields.contains_key("hasImage"));
    }

    #[test]
    fn upload_implies_has_image_unless_overridden() {
        let patch = leadership_patch(&form(&[]), true).unwrap();
        assert_eq!(patch.fields["hasImage"], json!(true));

        let patch = leadership_patch(&form(&[("hasImage", "false")]), true).unwrap();
        assert_eq!(patch.fields["hasImage"], json!(false));
    }

    #[test]
    fn patch_validates_active_flag() {
        let patch = leadership_patch(&form(&[("is_active", "false")]), false).unwrap();
        assert_eq!(patch.is_active, Some(false));

        let err = leadership_patch(&form(&[("is_active", "sometimes")]), false).unwrap_err();
        assert_eq!(err.to_string(), "Validation errors");
    }

    fn member(category: &str) -> ResourceRecord {
        ResourceRecord {
            id: Uuid::new_v4(),
            category: Some(category.into()),
            display_order: 1,
            is_active: true,
            image: None,
            detail_images: Vec::new(),
            fields: Map::new(),
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    #[test]
    fn groups_follow_category() {
        let groups = LeadershipGroups::from_records(vec![
            member("staff"),
            member("directors"),
            member("staff"),
        ]);
        assert_eq!(groups.directors.len(), 1);
        assert!(groups.advisors.is_empty());
        assert_eq!(groups.staff.len(), 2);
    }
}
