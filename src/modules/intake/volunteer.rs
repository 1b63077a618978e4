use axum::extract::State;
use axum_extra::extract::cookie::CookieJar;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use tracing::info;
use uuid::Uuid;

use crate::web::extract::{Json, Path};
use crate::{
    AppState,
    web::{
        auth::require_admin,
        error::{AppError, AppResult, InternalContext},
        responses::ApiResponse,
        validation::{is_valid_email, parse_id},
    },
};

use super::trimmed;

/// The only volunteer field that keeps a social media handle.
const SOCIAL_MEDIA_FIELD: &str = "Social Media Management";

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VolunteerInput {
    #[serde(default)]
    full_name: Option<String>,
    #[serde(default)]
    email: Option<String>,
    #[serde(default)]
    phone: Option<String>,
    #[serde(default)]
    volunteer_field: Option<String>,
    #[serde(default)]
    social_media: Option<String>,
    #[serde(default)]
    availability: Option<String>,
    #[serde(default)]
    message: Option<String>,
}

#[derive(Debug, Clone, Serialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Volunteer {
    pub id: Uuid,
    pub full_name: String,
    pub email: String,
    pub phone: String,
    pub volunteer_field: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub social_media: Option<String>,
    pub availability: Option<String>,
    pub message: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, PartialEq)]
struct NewVolunteer {
    full_name: String,
    email: String,
    phone: String,
    volunteer_field: String,
    social_media: Option<String>,
    availability: Option<String>,
    message: Option<String>,
}

impl VolunteerInput {
    fn validate(&self) -> AppResult<NewVolunteer> {
        let full_name =
            trimmed(&self.full_name).ok_or_else(|| AppError::invalid("Full name is required"))?;
        let email = trimmed(&self.email).ok_or_else(|| AppError::invalid("Email is required"))?;
        if !is_valid_email(&email) {
            return Err(AppError::invalid("Please provide a valid email"));
        }
        let phone =
            trimmed(&self.phone).ok_or_else(|| AppError::invalid("Phone number is required"))?;
        let volunteer_field = trimmed(&self.volunteer_field)
            .ok_or_else(|| AppError::invalid("Volunteer field is required"))?;

        let social_media = if volunteer_field == SOCIAL_MEDIA_FIELD {
            trimmed(&self.social_media)
        } else {
            None
        };

        Ok(NewVolunteer {
            full_name,
            email,
            phone,
            volunteer_field,
            social_media,
            availability: trimmed(&self.availability),
            message: trimmed(&self.message),
        })
    }
}

const COLUMNS: &str = "id, full_name, email, phone, volunteer_field, social_media, availability, \
                       message, created_at, updated_at";

pub async fn create_volunteer(
    State(state): State<AppState>,
    Json(input): Json<VolunteerInput>,
) -> AppResult<ApiResponse<Volunteer>> {
    let volunteer = input.validate()?;

    let sql = format!(
        "INSERT INTO volunteers (id, full_name, email, phone, volunteer_field, social_media, \
         availability, message) VALUES ($1, $2, $3, $4, $5, $6, $7, $8) \
         ON CONFLICT (email) DO NOTHING RETURNING {COLUMNS}"
    );
    let created = sqlx::query_as::<_, Volunteer>(&sql)
        .bind(Uuid::new_v4())
        .bind(&volunteer.full_name)
        .bind(&volunteer.email)
        .bind(&volunteer.phone)
        .bind(&volunteer.volunteer_field)
        .bind(&volunteer.social_media)
        .bind(&volunteer.availability)
        .bind(&volunteer.message)
        .fetch_optional(state.pool_ref())
        .await
        .or_internal("Failed to register volunteer")?
        .ok_or_else(|| AppError::invalid("Volunteer already exist"))?;

    info!(id = %created.id, field = %created.volunteer_field, "registered volunteer");
    Ok(ApiResponse::created(created))
}

pub async fn list_volunteers(
    State(state): State<AppState>,
    jar: CookieJar,
) -> AppResult<ApiResponse<Vec<Volunteer>>> {
    require_admin(&state, &jar).await?;

    let sql = format!("SELECT {COLUMNS} FROM volunteers ORDER BY created_at DESC");
    let volunteers = sqlx::query_as::<_, Volunteer>(&sql)
        .fetch_all(state.pool_ref())
        .await
        .or_internal("Failed to fetch volunteers")?;

    let count = volunteers.len();
    Ok(ApiResponse::ok(volunteers).with_count(count))
}

pub async fn get_volunteer(
    State(state): State<AppState>,
    jar: CookieJar,
    Path(raw_id): Path<String>,
) -> AppResult<ApiResponse<Volunteer>> {
    require_admin(&state, &jar).await?;
    let id = parse_id(&raw_id, "volunteer")?;

    let sql = format!("SELECT {COLUMNS} FROM volunteers WHERE id = $1");
    let volunteer = sqlx::query_as::<_, Volunteer>(&sql)
        .bind(id)
        .fetch_optional(state.pool_ref())
        .await
        .or_internal("Failed to fetch volunteer")?
        .ok_or_else(|| AppError::not_found("Volunteer"))?;

    Ok(ApiResponse::ok(volunteer))
}
