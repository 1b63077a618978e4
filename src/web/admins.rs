use axum::extract::State;
use axum_extra::extract::cookie::CookieJar;
use serde::Deserialize;
use tracing::info;
use uuid::Uuid;

use super::extract::{Json, Path};
use super::{
    AppState,
    auth::{AdminUser, hash_password, require_admin},
    error::{AppError, AppResult, InternalContext},
    responses::ApiResponse,
    validation::{is_valid_email, parse_id},
};

const MIN_PASSWORD_LEN: usize = 8;

#[derive(Deserialize)]
pub struct CreateAdminRequest {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub password: String,
}

pub async fn create_admin(
    State(state): State<AppState>,
    jar: CookieJar,
    Json(request): Json<CreateAdminRequest>,
) -> AppResult<ApiResponse<AdminUser>> {
    require_admin(&state, &jar).await?;

    let name = request.name.trim();
    let email = request.email.trim().to_lowercase();

    let mut errors = Vec::new();
    if name.is_empty() {
        errors.push("Name is required".to_string());
    }
    if !is_valid_email(&email) {
        errors.push("A valid email is required".to_string());
    }
    if request.password.chars().count() < MIN_PASSWORD_LEN {
        errors.push(format!(
            "Password must be at least {MIN_PASSWORD_LEN} characters"
        ));
    }
    if !errors.is_empty() {
        return Err(AppError::with_errors(errors));
    }

    let exists: bool = sqlx::query_scalar("SELECT EXISTS(SELECT 1 FROM admins WHERE email = $1)")
        .bind(&email)
        .fetch_one(state.pool_ref())
        .await
        .or_internal("Failed to create admin")?;
    if exists {
        return Err(AppError::invalid("Admin already exists with this email"));
    }

    let password_hash = hash_password(&request.password)
        .map_err(|err| AppError::internal("Failed to create admin", anyhow::anyhow!("{err}")))?;

    let admin = sqlx::query_as::<_, AdminUser>(
        "INSERT INTO admins (id, name, email, password_hash) VALUES ($1, $2, $3, $4) RETURNING id, name, email, created_at",
    )
    .bind(Uuid::new_v4())
    .bind(name)
    .bind(&email)
    .bind(password_hash)
    .fetch_one(state.pool_ref())
    .await
    .or_internal("Failed to create admin")?;

    info!(admin_id = %admin.id, "created admin account");
    Ok(ApiResponse::created(admin))
}

pub async fn list_admins(
    State(state): State<AppState>,
    jar: CookieJar,
) -> AppResult<ApiResponse<Vec<AdminUser>>> {
    require_admin(&state, &jar).await?;

    let admins = sqlx::query_as::<_, AdminUser>(
        "SELECT id, name, email, created_at FROM admins ORDER BY created_at ASC",
    )
    .fetch_all(state.pool_ref())
    .await
    .or_internal("Server error while fetching admins")?;

    let count = admins.len();
    Ok(ApiResponse::ok(admins).with_count(count))
}

pub async fn current_admin(
    State(state): State<AppState>,
    jar: CookieJar,
) -> AppResult<ApiResponse<AdminUser>> {
    let admin = require_admin(&state, &jar).await?;
    Ok(ApiResponse::ok(admin))
}

/// Partial profile change. Passwords are not changed here.
#[derive(Deserialize)]
pub struct UpdateAdminRequest {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub email: Option<String>,
}

#[derive(Debug, PartialEq, Eq)]
struct AdminChanges {
    name: Option<String>,
    email: Option<String>,
}

fn admin_changes(request: UpdateAdminRequest) -> AppResult<AdminChanges> {
    let name = request.name.map(|name| name.trim().to_string());
    let email = request.email.map(|email| email.trim().to_lowercase());

    let mut errors = Vec::new();
    if name.as_deref().is_some_and(str::is_empty) {
        errors.push("Name cannot be empty".to_string());
    }
    if email.as_deref().is_some_and(|email| !is_valid_email(email)) {
        errors.push("A valid email is required".to_string());
    }
    if name.is_none() && email.is_none() {
        errors.push("Nothing to update".to_string());
    }
    if !errors.is_empty() {
        return Err(AppError::with_errors(errors));
    }

    Ok(AdminChanges { name, email })
}

pub async fn update_admin(
    State(state): State<AppState>,
    jar: CookieJar,
    Path(raw_id): Path<String>,
    Json(request): Json<UpdateAdminRequest>,
) -> AppResult<ApiResponse<AdminUser>> {
    let current = require_admin(&state, &jar).await?;
    let id = parse_id(&raw_id, "admin")?;
    let changes = admin_changes(request)?;

    if let Some(email) = changes.email.as_deref() {
        let taken: bool = sqlx::query_scalar(
            "SELECT EXISTS(SELECT 1 FROM admins WHERE email = $1 AND id <> $2)",
        )
        .bind(email)
        .bind(id)
        .fetch_one(state.pool_ref())
        .await
        .or_internal("Server error while updating admin")?;
        if taken {
            return Err(AppError::invalid("Admin already exists with this email"));
        }
    }

    let admin = sqlx::query_as::<_, AdminUser>(
        "UPDATE admins SET name = COALESCE($2, name), email = COALESCE($3, email) \
         WHERE id = $1 RETURNING id, name, email, created_at",
    )
    .bind(id)
    .bind(changes.name)
    .bind(changes.email)
    .fetch_optional(state.pool_ref())
    .await
    .or_internal("Server error while updating admin")?
    .ok_or_else(|| AppError::not_found("Admin"))?;

    info!(admin_id = %id, updated_by = %current.id, "updated admin account");
    Ok(ApiResponse::ok(admin).with_message("Admin updated successfully"))
}

pub async fn delete_admin(
    State(state): State<AppState>,
    jar: CookieJar,
    Path(raw_id): Path<String>,
) -> AppResult<ApiResponse<()>> {
    let current = require_admin(&state, &jar).await?;
    let id = parse_id(&raw_id, "admin")?;

    if id == current.id {
        return Err(AppError::invalid("You cannot delete your own account"));
    }

    let result = sqlx::query("DELETE FROM admins WHERE id = $1")
        .bind(id)
        .execute(state.pool_ref())
        .await
        .or_internal("Server error while deleting admin")?;

    if result.rows_affected() == 0 {
        return Err(AppError::not_found("Admin"));
    }

    info!(admin_id = %id, deleted_by = %current.id, "deleted admin account");
    Ok(ApiResponse::message("Admin deleted successfully"))
}
