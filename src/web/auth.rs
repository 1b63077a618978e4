use argon2::Argon2;
use argon2::password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString};
use axum::extract::State;
use axum_extra::extract::cookie::{Cookie, CookieJar, SameSite};
use chrono::{DateTime, Duration as ChronoDuration, Utc};
use cookie::time::Duration as CookieDuration;
use rand_core::OsRng;
use serde::{Deserialize, Serialize};
use sqlx::PgPool;
use tracing::{error, info};
use uuid::Uuid;

use crate::web::extract::Json;
use crate::web::{
    AppState,
    error::{AppError, AppResult, InternalContext},
    responses::ApiResponse,
};

#[derive(Clone, sqlx::FromRow)]
pub struct DbAdminAuth {
    pub id: Uuid,
    pub name: String,
    pub email: String,
    pub password_hash: String,
}

/// Admin behind the current session.
#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
pub struct AdminUser {
    pub id: Uuid,
    pub name: String,
    pub email: String,
    pub created_at: DateTime<Utc>,
}

pub const SESSION_COOKIE: &str = "admin_session";
pub const SESSION_TTL_DAYS: i64 = 7;

#[derive(Deserialize)]
pub struct LoginRequest {
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub password: String,
}

#[derive(Serialize)]
pub struct LoginPayload {
    pub admin: AdminSummary,
    pub expires_at: DateTime<Utc>,
}

#[derive(Serialize)]
pub struct AdminSummary {
    pub id: Uuid,
    pub name: String,
    pub email: String,
}

pub async fn login(
    State(state): State<AppState>,
    jar: CookieJar,
    Json(request): Json<LoginRequest>,
) -> AppResult<(CookieJar, ApiResponse<LoginPayload>)> {
    let email = request.email.trim().to_lowercase();
    if email.is_empty() || request.password.is_empty() {
        return Err(AppError::invalid("Please provide an email and password"));
    }

    let admin = fetch_admin_by_email(state.pool_ref(), &email)
        .await
        .or_internal("Server error during admin login")?
        .ok_or_else(invalid_credentials)?;

    if !verify_password(&request.password, &admin.password_hash) {
        return Err(invalid_credentials());
    }

    let session_token = Uuid::new_v4();
    let expires_at = Utc::now() + ChronoDuration::days(SESSION_TTL_DAYS);

    sqlx::query("INSERT INTO admin_sessions (id, admin_id, expires_at) VALUES ($1, $2, $3)")
        .bind(session_token)
        .bind(admin.id)
        .bind(expires_at)
        .execute(state.pool_ref())
        .await
        .or_internal("Server error during admin login")?;

    let mut cookie = Cookie::new(SESSION_COOKIE, session_token.to_string());
    cookie.set_path("/");
    cookie.set_http_only(true);
    cookie.set_same_site(SameSite::Lax);
    cookie.set_max_age(CookieDuration::days(SESSION_TTL_DAYS));

    info!(admin_id = %admin.id, "admin logged in");

    let payload = LoginPayload {
        admin: AdminSummary {
            id: admin.id,
            name: admin.name,
            email: admin.email,
        },
        expires_at,
    };
    Ok((jar.add(cookie), ApiResponse::ok(payload)))
}

pub async fn logout(
    State(state): State<AppState>,
    jar: CookieJar,
) -> (CookieJar, ApiResponse<()>) {
    if let Some(token) = session_token(&jar) {
        if let Err(err) = sqlx::query("DELETE FROM admin_sessions WHERE id = $1")
            .bind(token)
            .execute(state.pool_ref())
            .await
        {
            error!(?err, "failed to remove session during logout");
        }
    }

    let mut removal = Cookie::new(SESSION_COOKIE, "");
    removal.set_path("/");
    removal.set_http_only(true);
    removal.set_same_site(SameSite::Lax);
    removal.set_max_age(CookieDuration::seconds(0));

    (jar.remove(removal), ApiResponse::message("Logged out"))
}

/// Resolves the admin behind the session cookie or fails with 401.
pub async fn require_admin(state: &AppState, jar: &CookieJar) -> AppResult<AdminUser> {
    let token = session_token(jar)
        .ok_or_else(|| AppError::Unauthorized("Not authorized to access this route".into()))?;

    fetch_admin_by_session(state.pool_ref(), token)
        .await
        .or_internal("Failed to validate session")?
        .ok_or_else(|| AppError::Unauthorized("Session expired, please log in again".into()))
}

fn session_token(jar: &CookieJar) -> Option<Uuid> {
    let cookie = jar.get(SESSION_COOKIE)?;
    Uuid::parse_str(cookie.value()).ok()
}

pub fn hash_password(password: &str) -> Result<String, argon2::password_hash::Error> {
    let salt = SaltString::generate(&mut OsRng);
    Argon2::default()
        .hash_password(password.as_bytes(), &salt)
        .map(|hash| hash.to_string())
}

pub fn verify_password(password: &str, password_hash: &str) -> bool {
    let parsed = PasswordHash::new(password_hash);
    match parsed {
        Ok(hash) => Argon2::default()
            .verify_password(password.as_bytes(), &hash)
            .is_ok(),
        Err(_) => false,
    }
}

pub async fn fetch_admin_by_email(pool: &PgPool, email: &str) -> sqlx::Result<Option<DbAdminAuth>> {
    sqlx::query_as::<_, DbAdminAuth>(
        "SELECT id, name, email, password_hash FROM admins WHERE email = $1",
    )
    .bind(email)
    .fetch_optional(pool)
    .await
}

pub async fn fetch_admin_by_session(pool: &PgPool, token: Uuid) -> sqlx::Result<Option<AdminUser>> {
    sqlx::query_as::<_, AdminUser>(
        "SELECT admins.id, admins.name, admins.email, admins.created_at FROM admin_sessions JOIN admins ON admins.id = admin_sessions.admin_id WHERE admin_sessions.id = $1 AND admin_sessions.expires_at > NOW()",
    )
    .bind(token)
    .fetch_optional(pool)
    .await
}

fn invalid_credentials() -> AppError {
    AppError::Unauthorized("Invalid credentials".into())
}
