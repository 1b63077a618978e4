use anyhow::{Context, Result};
use async_trait::async_trait;
use chrono::Utc;
use sqlx::{PgPool, Postgres, QueryBuilder, types::Json};
use uuid::Uuid;

use super::{
    kind::ResourceKind,
    record::{NewRecord, ResourceRecord, ResourceRow, stored_media},
};

const COLUMNS: &str = "id, category, display_order, is_active, image_url, image_key, \
                       detail_images, fields, created_at, updated_at";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Page {
    /// 1-based page number.
    pub number: i64,
    pub size: i64,
}

impl Page {
    /// Largest page size a client may ask for.
    pub const MAX_SIZE: i64 = 100;

    /// Page from raw query values. Missing or non-positive values fall back
    /// to the first page and `default_size`; sizes are capped at
    /// [`Page::MAX_SIZE`].
    pub fn from_query(number: Option<i64>, size: Option<i64>, default_size: i64) -> Self {
        Self {
            number: number.filter(|n| *n > 0).unwrap_or(1),
            size: size
                .filter(|s| *s > 0)
                .unwrap_or(default_size)
                .clamp(1, Self::MAX_SIZE),
        }
    }

    pub fn offset(&self) -> i64 {
        (self.number.max(1) - 1).saturating_mul(self.size.max(0))
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ListFilter {
    pub category: Option<String>,
    pub active_only: bool,
    pub exclude: Option<Uuid>,
    /// Text attribute that must equal the given value.
    pub field: Option<(String, String)>,
    pub page: Option<Page>,
}

impl ListFilter {
    pub fn active() -> Self {
        Self {
            active_only: true,
            ..Self::default()
        }
    }

    pub fn in_category(mut self, category: impl Into<String>) -> Self {
        self.category = Some(category.into());
        self
    }

    pub fn with_field(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.field = Some((name.into(), value.into()));
        self
    }

    pub fn paged(mut self, page: Page) -> Self {
        self.page = Some(page);
        self
    }
}

/// Persistence for one ordered resource table.
///
/// `category` arguments are ignored by implementations whose kind is not
/// partitioned; ordering is then global to the table.
#[async_trait]
pub trait ResourceRepository: Send + Sync {
    fn kind(&self) -> &'static ResourceKind;

    async fn max_display_order(&self, category: Option<&str>) -> Result<Option<i32>>;

    async fn insert(&self, record: NewRecord) -> Result<ResourceRecord>;

    async fn find(&self, id: Uuid) -> Result<Option<ResourceRecord>>;

    async fn find_by_field(&self, field: &str, value: &str) -> Result<Option<ResourceRecord>>;

    /// Writes every mutable column of `record`. Returns `None` when the row
    /// no longer exists.
    async fn save(&self, record: &ResourceRecord) -> Result<Option<ResourceRecord>>;

    async fn delete(&self, id: Uuid) -> Result<Option<ResourceRecord>>;

    /// Decrements the order of every sibling placed after `after`.
    async fn close_gap(&self, category: Option<&str>, after: i32) -> Result<u64>;

    /// Returns `false` when no row has the given id.
    async fn set_display_order(&self, id: Uuid, display_order: i32) -> Result<bool>;

    async fn list(&self, filter: &ListFilter) -> Result<Vec<ResourceRecord>>;

    async fn count(&self, filter: &ListFilter) -> Result<i64>;
}

#[derive(Clone)]
pub struct PgResourceRepository {
    pool: PgPool,
    kind: &'static ResourceKind,
}

impl PgResourceRepository {
    pub fn new(pool: PgPool, kind: &'static ResourceKind) -> Self {
        Self { pool, kind }
    }

    fn push_partition<'a>(&self, builder: &mut QueryBuilder<'a, Postgres>, category: Option<&'a str>) {
        if self.kind.is_partitioned() {
            builder
                .push(" AND category IS NOT DISTINCT FROM ")
                .push_bind(category);
        }
    }

    fn push_filter<'a>(&self, builder: &mut QueryBuilder<'a, Postgres>, filter: &'a ListFilter) {
        builder.push(" WHERE TRUE");
        if let Some(category) = filter.category.as_deref() {
            builder.push(" AND category = ").push_bind(category);
        }
        if filter.active_only {
            builder.push(" AND is_active = TRUE");
        }
        if let Some(exclude) = filter.exclude {
            builder.push(" AND id <> ").push_bind(exclude);
        }
        if let Some((name, value)) = &filter.field {
            builder
                .push(" AND fields ->> ")
                .push_bind(name.as_str())
                .push(" = ")
                .push_bind(value.as_str());
        }
    }
}

#[async_trait]
impl ResourceRepository for PgResourceRepository {
    fn kind(&self) -> &'static ResourceKind {
        self.kind
    }

    async fn max_display_order(&self, category: Option<&str>) -> Result<Option<i32>> {
        let mut builder = QueryBuilder::<Postgres>::new("SELECT MAX(display_order) FROM ");
        builder.push(self.kind.table).push(" WHERE TRUE");
        self.push_partition(&mut builder, category);

        builder
            .build_query_scalar::<Option<i32>>()
            .fetch_one(&self.pool)
            .await
            .with_context(|| format!("failed to read max display order of {}", self.kind.table))
    }

    async fn insert(&self, record: NewRecord) -> Result<ResourceRecord> {
        let (image_url, image_key) = match record.image {
            Some(media) => (Some(media.url), Some(media.key)),
            None => (None, None),
        };

        let sql = format!(
            "INSERT INTO {} (id, category, display_order, is_active, image_url, image_key, detail_images, fields) \
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8) RETURNING {COLUMNS}",
            self.kind.table
        );

        let row = sqlx::query_as::<_, ResourceRow>(&sql)
            .bind(Uuid::new_v4())
            .bind(record.category)
            .bind(record.display_order)
            .bind(record.is_active)
            .bind(image_url)
            .bind(image_key)
            .bind(stored_media(&record.detail_images))
            .bind(Json(record.fields))
            .fetch_one(&self.pool)
            .await
            .with_context(|| format!("failed to insert into {}", self.kind.table))?;

        Ok(row.into())
    }

    async fn find(&self, id: Uuid) -> Result<Option<ResourceRecord>> {
        let sql = format!("SELECT {COLUMNS} FROM {} WHERE id = $1", self.kind.table);

        let row = sqlx::query_as::<_, ResourceRow>(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .with_context(|| format!("failed to load {} row {id}", self.kind.table))?;

        Ok(row.map(Into::into))
    }

    async fn find_by_field(&self, field: &str, value: &str) -> Result<Option<ResourceRecord>> {
        let sql = format!(
            "SELECT {COLUMNS} FROM {} WHERE fields ->> $1 = $2 LIMIT 1",
            self.kind.table
        );

        let row = sqlx::query_as::<_, ResourceRow>(&sql)
            .bind(field)
            .bind(value)
            .fetch_optional(&self.pool)
            .await
            .with_context(|| format!("failed to look up {} by {field}", self.kind.table))?;

        Ok(row.map(Into::into))
    }

    async fn save(&self, record: &ResourceRecord) -> Result<Option<ResourceRecord>> {
        let sql = format!(
            "UPDATE {} SET category = $2, display_order = $3, is_active = $4, image_url = $5, \
             image_key = $6, detail_images = $7, fields = $8, updated_at = $9 \
             WHERE id = $1 RETURNING {COLUMNS}",
            self.kind.table
        );

        let row = sqlx::query_as::<_, ResourceRow>(&sql)
            .bind(record.id)
            .bind(record.category.as_deref())
            .bind(record.display_order)
            .bind(record.is_active)
            .bind(record.image.as_ref().map(|media| media.url.as_str()))
            .bind(record.image.as_ref().map(|media| media.key.as_str()))
            .bind(stored_media(&record.detail_images))
            .bind(Json(&record.fields))
            .bind(Utc::now())
            .fetch_optional(&self.pool)
            .await
            .with_context(|| format!("failed to update {} row {}", self.kind.table, record.id))?;

        Ok(row.map(Into::into))
    }

    async fn delete(&self, id: Uuid) -> Result<Option<ResourceRecord>> {
        let sql = format!(
            "DELETE FROM {} WHERE id = $1 RETURNING {COLUMNS}",
            self.kind.table
        );

        let row = sqlx::query_as::<_, ResourceRow>(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .with_context(|| format!("failed to delete {} row {id}", self.kind.table))?;

        Ok(row.map(Into::into))
    }

    async fn close_gap(&self, category: Option<&str>, after: i32) -> Result<u64> {
        let mut builder = QueryBuilder::<Postgres>::new("UPDATE ");
        builder
            .push(self.kind.table)
            .push(" SET display_order = display_order - 1 WHERE display_order > ")
            .push_bind(after);
        self.push_partition(&mut builder, category);

        let result = builder
            .build()
            .execute(&self.pool)
            .await
            .with_context(|| format!("failed to renumber {}", self.kind.table))?;

        Ok(result.rows_affected())
    }

    async fn set_display_order(&self, id: Uuid, display_order: i32) -> Result<bool> {
        let sql = format!(
            "UPDATE {} SET display_order = $2, updated_at = NOW() WHERE id = $1",
            self.kind.table
        );

        let result = sqlx::query(&sql)
            .bind(id)
            .bind(display_order)
            .execute(&self.pool)
            .await
            .with_context(|| format!("failed to reorder {} row {id}", self.kind.table))?;

        Ok(result.rows_affected() > 0)
    }

    async fn list(&self, filter: &ListFilter) -> Result<Vec<ResourceRecord>> {
        let mut builder = QueryBuilder::<Postgres>::new(format!(
            "SELECT {COLUMNS} FROM {}",
            self.kind.table
        ));
        self.push_filter(&mut builder, filter);
        builder.push(" ORDER BY category NULLS FIRST, display_order ASC, created_at DESC");

        if let Some(page) = filter.page {
            builder
                .push(" LIMIT ")
                .push_bind(page.size)
                .push(" OFFSET ")
                .push_bind(page.offset());
        }

        let rows = builder
            .build_query_as::<ResourceRow>()
            .fetch_all(&self.pool)
            .await
            .with_context(|| format!("failed to list {}", self.kind.table))?;

        Ok(rows.into_iter().map(Into::into).collect())
    }

    async fn count(&self, filter: &ListFilter) -> Result<i64> {
        let mut builder =
            QueryBuilder::<Postgres>::new(format!("SELECT COUNT(*) FROM {}", self.kind.table));
        self.push_filter(&mut builder, filter);

        builder
            .build_query_scalar::<i64>()
            .fetch_one(&self.pool)
            .await
            .with_context(|| format!("failed to count {}", self.kind.table))
    }
}
