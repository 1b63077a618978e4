use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use sqlx::types::Json;
use uuid::Uuid;

use crate::media::{MediaRef, storage_key_for};

/// One row of an ordered resource table, independent of the resource type.
///
/// Resource specific attributes live in `fields` and are flattened into the
/// JSON representation next to the shared columns.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ResourceRecord {
    pub id: Uuid,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,
    pub display_order: i32,
    pub is_active: bool,
    pub image: Option<MediaRef>,
    #[serde(rename = "detailImages")]
    pub detail_images: Vec<MediaRef>,
    #[serde(flatten)]
    pub fields: Map<String, Value>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl ResourceRecord {
    pub fn field_str(&self, name: &str) -> Option<&str> {
        self.fields.get(name).and_then(Value::as_str)
    }

    /// Every storage key the record currently references.
    pub fn media_keys(&self) -> Vec<String> {
        self.image
            .iter()
            .chain(self.detail_images.iter())
            .map(|media| media.key.clone())
            .filter(|key| !key.is_empty())
            .collect()
    }
}

/// Values for a record that does not exist yet.
#[derive(Debug, Clone, PartialEq)]
pub struct NewRecord {
    pub category: Option<String>,
    pub display_order: i32,
    pub is_active: bool,
    pub image: Option<MediaRef>,
    pub detail_images: Vec<MediaRef>,
    pub fields: Map<String, Value>,
}

/// Detail image as persisted. Rows imported from the previous system may lack
/// the key.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub(crate) struct StoredMedia {
    pub url: String,
    #[serde(default)]
    pub key: Option<String>,
}

impl From<&MediaRef> for StoredMedia {
    fn from(media: &MediaRef) -> Self {
        Self {
            url: media.url.clone(),
            key: Some(media.key.clone()),
        }
    }
}

impl StoredMedia {
    fn into_media(self) -> MediaRef {
        let key = storage_key_for(Some(&self.url), self.key.as_deref()).unwrap_or_default();
        MediaRef::new(self.url, key)
    }
}

#[derive(sqlx::FromRow)]
pub(crate) struct ResourceRow {
    pub id: Uuid,
    pub category: Option<String>,
    pub display_order: i32,
    pub is_active: bool,
    pub image_url: Option<String>,
    pub image_key: Option<String>,
    pub detail_images: Json<Vec<StoredMedia>>,
    pub fields: Json<Map<String, Value>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<ResourceRow> for ResourceRecord {
    fn from(row: ResourceRow) -> Self {
        let image = row.image_url.map(|url| {
            let key = storage_key_for(Some(&url), row.image_key.as_deref()).unwrap_or_default();
            MediaRef::new(url, key)
        });

        Self {
            id: row.id,
            category: row.category,
            display_order: row.display_order,
            is_active: row.is_active,
            image,
            detail_images: row
                .detail_images
                .0
                .into_iter()
                .map(StoredMedia::into_media)
                .collect(),
            fields: row.fields.0,
            created_at: row.created_at,
            updated_at: row.updated_at,
        }
    }
}

pub(crate) fn stored_media(images: &[MediaRef]) -> Json<Vec<StoredMedia>> {
    Json(images.iter().map(StoredMedia::from).collect())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn row(image_key: Option<&str>, details: Vec<StoredMedia>) -> ResourceRow {
        let mut fields = Map::new();
        fields.insert("title".into(), json!("Annual meet"));
        ResourceRow {
            id: Uuid::nil(),
            category: Some("events".into()),
            display_order: 3,
            is_active: true,
            image_url: Some("https://bucket.s3.amazonaws.com/gallery/17-meet.png".into()),
            image_key: image_key.map(str::to_string),
            detail_images: Json(details),
            fields: Json(fields),
            created_at: DateTime::<Utc>::UNIX_EPOCH,
            updated_at: DateTime::<Utc>::UNIX_EPOCH,
        }
    }

    #[test]
    fn legacy_rows_recover_keys_from_urls() {
        let record = ResourceRecord::from(row(
            None,
            vec![StoredMedia {
                url: "https://bucket.s3.amazonaws.com/details/9-a.png".into(),
                key: None,
            }],
        ));

        assert_eq!(
            record.image.as_ref().map(|media| media.key.as_str()),
            Some("gallery/17-meet.png")
        );
        assert_eq!(record.detail_images[0].key, "details/9-a.png");
        assert_eq!(
            record.media_keys(),
            vec!["gallery/17-meet.png", "details/9-a.png"]
        );
    }

    #[test]
    fn serialized_record_flattens_fields() {
        let record = ResourceRecord::from(row(Some("gallery/17-meet.png"), Vec::new()));
        let value = serde_json::to_value(&record).unwrap();

        assert_eq!(value["title"], json!("Annual meet"));
        assert_eq!(value["category"], json!("events"));
        assert_eq!(value["image"]["key"], json!("gallery/17-meet.png"));
        assert_eq!(value["detailImages"], json!([]));
    }
}
