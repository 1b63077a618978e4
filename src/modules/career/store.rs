use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use serde::Serialize;
use serde_json::Value;
use sqlx::{FromRow, PgPool, types::Json};
use uuid::Uuid;

/// The singleton career page. Sections are free-form JSON documents.
#[derive(Debug, Clone, Serialize, FromRow)]
pub struct CareerPage {
    pub id: Uuid,
    pub is_active: bool,
    pub introduction: Json<Value>,
    #[serde(rename = "whyWorkSection")]
    pub why_work_section: Json<Value>,
    #[serde(rename = "openingsSection")]
    pub openings_section: Json<Value>,
    #[serde(rename = "closingSection")]
    pub closing_section: Json<Value>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

const COLUMNS: &str = "id, is_active, introduction, why_work_section, openings_section, \
                       closing_section, created_at, updated_at";

pub async fn fetch_active(pool: &PgPool) -> Result<Option<CareerPage>> {
    let sql = format!(
        "SELECT {COLUMNS} FROM career_pages WHERE is_active ORDER BY created_at LIMIT 1"
    );
    sqlx::query_as::<_, CareerPage>(&sql)
        .fetch_optional(pool)
        .await
        .context("failed to load career page")
}

pub async fn any_exists(pool: &PgPool) -> Result<bool> {
    sqlx::query_scalar("SELECT EXISTS(SELECT 1 FROM career_pages)")
        .fetch_one(pool)
        .await
        .context("failed to check for career page")
}

pub async fn insert(pool: &PgPool, sections: [Value; 4]) -> Result<CareerPage> {
    let [introduction, why_work, openings, closing] = sections;
    let sql = format!(
        "INSERT INTO career_pages (id, introduction, why_work_section, openings_section, closing_section) \
         VALUES ($1, $2, $3, $4, $5) RETURNING {COLUMNS}"
    );
    sqlx::query_as::<_, CareerPage>(&sql)
        .bind(Uuid::new_v4())
        .bind(Json(introduction))
        .bind(Json(why_work))
        .bind(Json(openings))
        .bind(Json(closing))
        .fetch_one(pool)
        .await
        .context("failed to insert career page")
}

pub async fn save(pool: &PgPool, page: &CareerPage) -> Result<CareerPage> {
    let sql = format!(
        "UPDATE career_pages SET introduction = $2, why_work_section = $3, openings_section = $4, \
         closing_section = $5, updated_at = NOW() WHERE id = $1 RETURNING {COLUMNS}"
    );
    sqlx::query_as::<_, CareerPage>(&sql)
        .bind(page.id)
        .bind(&page.introduction)
        .bind(&page.why_work_section)
        .bind(&page.openings_section)
        .bind(&page.closing_section)
        .fetch_one(pool)
        .await
        .with_context(|| format!("failed to save career page {}", page.id))
}

pub async fn delete_active(pool: &PgPool) -> Result<bool> {
    let result = sqlx::query(
        "DELETE FROM career_pages WHERE id = (SELECT id FROM career_pages WHERE is_active \
         ORDER BY created_at LIMIT 1)",
    )
    .execute(pool)
    .await
    .context("failed to delete career page")?;
    Ok(result.rows_affected() > 0)
}
