//! Partner institutions and global partners. Both carry a featured image and
//! an ordered set of detail images and share one validation shape.

use axum::{
    Router,
    extract::State,
    routing::{get, put},
};
use serde_json::{Map, Value, json};

mod admin;

use crate::web::extract::Path;
use crate::{
    AppState,
    ordered::{
        Draft, GLOBAL_PARTNERS, ListFilter, PARTNER_INSTITUTIONS, Patch, ResourceError,
        ResourceKind, ResourceRecord, ResourceResult,
    },
    web::{error::AppResult, forms::FormFields, responses::ApiResponse, validation::parse_id},
};

const REQUIRED_FIELDS_MESSAGE: &str = "Please provide all required fields";

/// Text attributes accepted for one kind of partner.
#[derive(Debug)]
pub struct PartnerProfile {
    pub kind: &'static ResourceKind,
    pub required: &'static [&'static str],
    pub optional: &'static [&'static str],
    /// Whether the form carries a `programs` list.
    pub programs: bool,
}

pub static INSTITUTION_PROFILE: PartnerProfile = PartnerProfile {
    kind: &PARTNER_INSTITUTIONS,
    required: &[
        "name",
        "shortName",
        "location",
        "shortDescription",
        "totalStudents",
        "established",
    ],
    optional: &[
        "address",
        "website",
        "facebook",
        "about",
        "foundingStory",
        "challenges",
        "neieaImpact",
        "additionalInfo",
    ],
    programs: false,
};

pub static GLOBAL_PROFILE: PartnerProfile = PartnerProfile {
    kind: &GLOBAL_PARTNERS,
    required: &["name", "shortName", "location", "shortDescription"],
    optional: &["website", "about", "collaboration", "impact"],
    programs: true,
};

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/partner-institution", get(public_institutions))
        .route("/partner-institution/:id", get(public_institution))
        .route("/global-partners-page", get(public_global_partners))
        .route("/global-partners-page/:id", get(public_global_partner))
        .route(
            "/admin/partner-institution",
            get(admin::list_institutions).post(admin::create_institution),
        )
        .route(
            "/admin/partner-institution/reorder",
            put(admin::reorder_institutions),
        )
        .route(
            "/admin/partner-institution/:id",
            get(admin::get_institution)
                .put(admin::update_institution)
                .delete(admin::delete_institution),
        )
        .route(
            "/admin/global-partners",
            get(admin::list_global_partners).post(admin::create_global_partner),
        )
        .route(
            "/admin/global-partners/reorder",
            put(admin::reorder_global_partners),
        )
        .route(
            "/admin/global-partners/:id",
            get(admin::get_global_partner)
                .put(admin::update_global_partner)
                .delete(admin::delete_global_partner),
        )
}

async fn active_partners(
    state: &AppState,
    kind: &'static ResourceKind,
) -> AppResult<ApiResponse<Vec<ResourceRecord>>> {
    let repo = state.repository(kind);
    let partners = state.resources(&repo).list(&ListFilter::active()).await?;
    let count = partners.len();
    Ok(ApiResponse::ok(partners).with_count(count))
}

async fn active_partner(
    state: &AppState,
    kind: &'static ResourceKind,
    raw_id: &str,
) -> AppResult<ApiResponse<ResourceRecord>> {
    let id = parse_id(raw_id, &kind.label.to_lowercase())?;
    let repo = state.repository(kind);
    let partner = state.resources(&repo).get(id).await?;
    if !partner.is_active {
        return Err(ResourceError::NotFound(kind).into());
    }
    Ok(ApiResponse::ok(partner))
}

async fn public_institutions(
    State(state): State<AppState>,
) -> AppResult<ApiResponse<Vec<ResourceRecord>>> {
    active_partners(&state, &PARTNER_INSTITUTIONS).await
}

async fn public_institution(
    State(state): State<AppState>,
    Path(raw_id): Path<String>,
) -> AppResult<ApiResponse<ResourceRecord>> {
    active_partner(&state, &PARTNER_INSTITUTIONS, &raw_id).await
}

async fn public_global_partners(
    State(state): State<AppState>,
) -> AppResult<ApiResponse<Vec<ResourceRecord>>> {
    active_partners(&state, &GLOBAL_PARTNERS).await
}

async fn public_global_partner(
    State(state): State<AppState>,
    Path(raw_id): Path<String>,
) -> AppResult<ApiResponse<ResourceRecord>> {
    active_partner(&state, &GLOBAL_PARTNERS, &raw_id).await
}

/// A JSON array is taken as the list. Anything else, including malformed
/// JSON, becomes a one-element list.
fn parse_programs(raw: &str) -> Vec<Value> {
    match serde_json::from_str::<Value>(raw) {
        Ok(Value::Array(programs)) => programs,
        _ => vec![json!(raw)],
    }
}

impl PartnerProfile {
    fn text_fields(&self) -> impl Iterator<Item = &'static str> + '_ {
        self.required.iter().chain(self.optional.iter()).copied()
    }

    fn collect<F: FormFields + ?Sized>(&self, form: &F) -> Map<String, Value> {
        let mut fields: Map<String, Value> = self
            .text_fields()
            .filter_map(|name| form.text(name).map(|value| (name.to_string(), json!(value.trim()))))
            .collect();
        if self.programs {
            if let Some(raw) = form.non_empty("programs") {
                fields.insert("programs".into(), Value::Array(parse_programs(&raw)));
            }
        }
        fields
    }

    fn draft<F: FormFields + ?Sized>(&self, form: &F) -> ResourceResult<Draft> {
        if self.required.iter().any(|name| form.non_empty(name).is_none()) {
            return Err(ResourceError::invalid(REQUIRED_FIELDS_MESSAGE));
        }

        let mut fields = self.collect(form);
        if self.programs && !fields.contains_key("programs") {
            fields.insert("programs".into(), json!([]));
        }
        Ok(Draft {
            category: None,
            fields,
        })
    }

    fn patch<F: FormFields + ?Sized>(&self, form: &F) -> ResourceResult<Patch> {
        let fields = self.collect(form);
        let blanks_required = self
            .required
            .iter()
            .any(|name| fields.get(*name).and_then(Value::as_str) == Some(""));
        if blanks_required {
            return Err(ResourceError::invalid(REQUIRED_FIELDS_MESSAGE));
        }
        Ok(Patch {
            fields,
            ..Patch::default()
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::modules::common::testing::form;

    #[test]
    fn programs_accept_arrays_or_plain_text() {
        assert_eq!(
            parse_programs(r#"["STEM","Arts"]"#),
            vec![json!("STEM"), json!("Arts")]
        );
        assert_eq!(parse_programs("Teacher training"), vec![json!("Teacher training")]);
        assert_eq!(parse_programs(r#"{"a":1}"#), vec![json!(r#"{"a":1}"#)]);
    }

    #[test]
    fn institution_requires_enrolment_details() {
        let err = INSTITUTION_PROFILE
            .draft(&form(&[
                ("name", "Al-Ameen"),
                ("shortName", "AA"),
                ("location", "Bengaluru"),
                ("shortDescription", "School"),
            ]))
            .unwrap_err();
        assert_eq!(err.to_string(), REQUIRED_FIELDS_MESSAGE);
    }

    #[test]
    fn global_draft_defaults_programs() {
        let draft = GLOBAL_PROFILE
            .draft(&form(&[
                ("name", "Open Learning"),
                ("shortName", "OL"),
                ("location", "London"),
                ("shortDescription", "Online courses"),
                ("facebook", "ignored"),
            ]))
            .unwrap();
        assert_eq!(draft.fields["programs"], json!([]));
        assert!(!draft.fields.contains_key("facebook"));
        assert_eq!(draft.category, None);
    }

    #[test]
    fn patch_keeps_submitted_fields_only() {
        let patch = GLOBAL_PROFILE
            .patch(&form(&[("impact", " 2k learners "), ("programs", "Mentoring")]))
            .unwrap();
        assert_eq!(patch.fields["impact"], json!("2k learners"));
        assert_eq!(patch.fields["programs"], json!(["Mentoring"]));
        assert!(!patch.fields.contains_key("name"));

        assert!(INSTITUTION_PROFILE.patch(&form(&[("name", " ")])).is_err());
    }
}
