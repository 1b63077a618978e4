use std::sync::{
    Mutex, PoisonError,
    atomic::{AtomicBool, Ordering},
};

use anyhow::{Result, bail};
use async_trait::async_trait;
use chrono::{Duration, Utc};
use uuid::Uuid;

use super::{
    kind::ResourceKind,
    record::{NewRecord, ResourceRecord},
    repository::{ListFilter, ResourceRepository},
};

/// Vector-backed repository mirroring the Postgres semantics.
pub struct MemoryRepository {
    kind: &'static ResourceKind,
    rows: Mutex<Vec<ResourceRecord>>,
    fail_writes: AtomicBool,
}

impl MemoryRepository {
    pub fn new(kind: &'static ResourceKind) -> Self {
        Self {
            kind,
            rows: Mutex::new(Vec::new()),
            fail_writes: AtomicBool::new(false),
        }
    }

    /// Makes every subsequent insert, save and gap close fail.
    pub fn fail_writes(&self, fail: bool) {
        self.fail_writes.store(fail, Ordering::SeqCst);
    }

    pub fn snapshot(&self) -> Vec<ResourceRecord> {
        self.rows().clone()
    }

    fn rows(&self) -> std::sync::MutexGuard<'_, Vec<ResourceRecord>> {
        self.rows.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn same_partition(&self, record: &ResourceRecord, category: Option<&str>) -> bool {
        !self.kind.is_partitioned() || record.category.as_deref() == category
    }

    fn check_writable(&self) -> Result<()> {
        if self.fail_writes.load(Ordering::SeqCst) {
            bail!("simulated write failure on {}", self.kind.table);
        }
        Ok(())
    }

    fn matching(&self, filter: &ListFilter) -> Vec<ResourceRecord> {
        let mut rows: Vec<ResourceRecord> = self
            .rows()
            .iter()
            .filter(|record| {
                filter
                    .category
                    .as_deref()
                    .is_none_or(|category| record.category.as_deref() == Some(category))
            })
            .filter(|record| !filter.active_only || record.is_active)
            .filter(|record| filter.exclude != Some(record.id))
            .filter(|record| {
                filter
                    .field
                    .as_ref()
                    .is_none_or(|(name, value)| record.field_str(name) == Some(value.as_str()))
            })
            .cloned()
            .collect();
        rows.sort_by(|a, b| {
            a.category
                .cmp(&b.category)
                .then(a.display_order.cmp(&b.display_order))
                .then(b.created_at.cmp(&a.created_at))
        });
        rows
    }
}

#[async_trait]
impl ResourceRepository for MemoryRepository {
    fn kind(&self) -> &'static ResourceKind {
        self.kind
    }

    async fn max_display_order(&self, category: Option<&str>) -> Result<Option<i32>> {
        Ok(self
            .rows()
            .iter()
            .filter(|record| self.same_partition(record, category))
            .map(|record| record.display_order)
            .max())
    }

    async fn insert(&self, record: NewRecord) -> Result<ResourceRecord> {
        self.check_writable()?;
        let mut rows = self.rows();
        // Strictly increasing timestamps keep the created_at tie-break stable.
        let created_at = Utc::now() + Duration::milliseconds(rows.len() as i64);
        let created = ResourceRecord {
            id: Uuid::new_v4(),
            category: record.category,
            display_order: record.display_order,
            is_active: record.is_active,
            image: record.image,
            detail_images: record.detail_images,
            fields: record.fields,
            created_at,
            updated_at: created_at,
        };
        rows.push(created.clone());
        Ok(created)
    }

    async fn find(&self, id: Uuid) -> Result<Option<ResourceRecord>> {
        Ok(self.rows().iter().find(|record| record.id == id).cloned())
    }

    async fn find_by_field(&self, field: &str, value: &str) -> Result<Option<ResourceRecord>> {
        Ok(self
            .rows()
            .iter()
            .find(|record| record.field_str(field) == Some(value))
            .cloned())
    }

    async fn save(&self, record: &ResourceRecord) -> Result<Option<ResourceRecord>> {
        self.check_writable()?;
        let mut rows = self.rows();
        let Some(slot) = rows.iter_mut().find(|row| row.id == record.id) else {
            return Ok(None);
        };
        *slot = ResourceRecord {
            updated_at: Utc::now(),
            ..record.clone()
        };
        Ok(Some(slot.clone()))
    }

    async fn delete(&self, id: Uuid) -> Result<Option<ResourceRecord>> {
        let mut rows = self.rows();
        let position = rows.iter().position(|record| record.id == id);
        Ok(position.map(|index| rows.remove(index)))
    }

    async fn close_gap(&self, category: Option<&str>, after: i32) -> Result<u64> {
        self.check_writable()?;
        let mut shifted = 0;
        for record in self.rows().iter_mut() {
            if self.same_partition(record, category) && record.display_order > after {
                record.display_order -= 1;
                shifted += 1;
            }
        }
        Ok(shifted)
    }

    async fn set_display_order(&self, id: Uuid, display_order: i32) -> Result<bool> {
        let mut rows = self.rows();
        match rows.iter_mut().find(|record| record.id == id) {
            Some(record) => {
                record.display_order = display_order;
                Ok(true)
            }
            None => Ok(false),
        }
    }

    async fn list(&self, filter: &ListFilter) -> Result<Vec<ResourceRecord>> {
        let rows = self.matching(filter);
        Ok(match filter.page {
            Some(page) => rows
                .into_iter()
                .skip(page.offset() as usize)
                .take(page.size as usize)
                .collect(),
            None => rows,
        })
    }

    async fn count(&self, filter: &ListFilter) -> Result<i64> {
        Ok(self.matching(filter).len() as i64)
    }
}
