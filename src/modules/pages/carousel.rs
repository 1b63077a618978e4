use serde_json::{Map, Value, json};

use crate::{
    ordered::{
        Draft, OrderedResources, Patch, ResourceError, ResourceRecord, ResourceResult,
        UploadedMedia,
    },
    web::forms::FormFields,
};

/// Per-slide text lists, each a JSON array aligned with the uploaded images.
const SLIDE_LISTS: [(&str, &str); 4] = [
    ("headings", "heading"),
    ("subTexts", "subText"),
    ("ctaTexts", "ctaText"),
    ("ctaUrls", "ctaUrl"),
];

/// Outcome of [`upsert_carousel`]: whether the page already had a carousel.
#[derive(Debug)]
pub enum Saved {
    Created(ResourceRecord),
    Replaced(ResourceRecord),
}

/// Builds the `page` and `slides` attributes for a carousel with
/// `image_count` new images. Slide `n` describes image `n`; missing list
/// entries become `null`.
pub fn carousel_fields<F: FormFields + ?Sized>(
    form: &F,
    image_count: usize,
) -> ResourceResult<Map<String, Value>> {
    let Some(page) = form.non_empty("page") else {
        return Err(ResourceError::invalid("Page name is required"));
    };
    if image_count == 0 {
        return Err(ResourceError::invalid("At least one image is required"));
    }

    let mut lists = Vec::with_capacity(SLIDE_LISTS.len());
    for (list, key) in SLIDE_LISTS {
        let values = match form.text(list).map(str::trim).filter(|raw| !raw.is_empty()) {
            Some(raw) => serde_json::from_str::<Vec<Value>>(raw)
                .map_err(|_| ResourceError::invalid("Invalid JSON format in form data"))?,
            None => Vec::new(),
        };
        lists.push((key, values));
    }

    let slides: Vec<Value> = (0..image_count)
        .map(|index| {
            lists
                .iter()
                .map(|(key, values)| {
                    let value = values
                        .get(index)
                        .filter(|value| !is_empty_value(value))
                        .cloned()
                        .unwrap_or(Value::Null);
                    (key.to_string(), value)
                })
                .collect::<Map<String, Value>>()
                .into()
        })
        .collect();

    let mut fields = Map::new();
    fields.insert("page".into(), json!(page));
    fields.insert("slides".into(), Value::Array(slides));
    Ok(fields)
}

fn is_empty_value(value: &Value) -> bool {
    match value {
        Value::Null => true,
        Value::String(text) => text.is_empty(),
        _ => false,
    }
}

/// Creates the carousel for the page named in `fields` or replaces the
/// existing one's slides and images. Old images are deleted once the new
/// ones are saved.
pub async fn upsert_carousel(
    resources: &OrderedResources<'_>,
    fields: Map<String, Value>,
    uploads: UploadedMedia,
) -> ResourceResult<Saved> {
    let Some(page) = fields.get("page").and_then(Value::as_str).map(str::to_string) else {
        let err = ResourceError::invalid("Page name is required");
        return Err(resources.abandon(uploads, err).await);
    };

    let existing = match resources.find_by_field("page", &page).await {
        Ok(record) => Some(record),
        Err(ResourceError::NotFound(_)) => None,
        Err(err) => return Err(resources.abandon(uploads, err).await),
    };

    match existing {
        Some(existing) => {
            let patch = Patch {
                fields,
                ..Patch::default()
            };
            let saved = resources.update(existing.id, patch, uploads, None).await?;
            Ok(Saved::Replaced(saved))
        }
        None => {
            let draft = Draft {
                category: None,
                fields,
            };
            Ok(Saved::Created(resources.create(draft, uploads).await?))
        }
    }
}

#[cfg(test)]
mod tests {
    use std::collections::BTreeSet;

    use super::*;
    use crate::{
        media::testing::{RecordingStore, media},
        modules::common::testing::form,
        ordered::{CAROUSELS, memory::MemoryRepository},
    };

    fn images(keys: &[&str]) -> UploadedMedia {
        UploadedMedia {
            primary: None,
            details: keys.iter().map(|key| media(key)).collect(),
        }
    }

    #[test]
    fn slides_follow_image_order() {
        let fields = carousel_fields(
            &form(&[
                ("page", " home "),
                ("headings", r#"["Learn", "Grow"]"#),
                ("ctaUrls", r#"["/donate", "", "/join"]"#),
            ]),
            3,
        )
        .unwrap();

        assert_eq!(fields["page"], json!("home"));
        assert_eq!(
            fields["slides"],
            json!([
                {"heading": "Learn", "subText": null, "ctaText": null, "ctaUrl": "/donate"},
                {"heading": "Grow", "subText": null, "ctaText": null, "ctaUrl": null},
                {"heading": null, "subText": null, "ctaText": null, "ctaUrl": "/join"},
            ])
        );
    }

    #[test]
    fn page_is_checked_before_images() {
        let err = carousel_fields(&form(&[("page", "  ")]), 0).unwrap_err();
        assert_eq!(err.to_string(), "Page name is required");

        let err = carousel_fields(&form(&[("page", "home")]), 0).unwrap_err();
        assert_eq!(err.to_string(), "At least one image is required");
    }

    #[test]
    fn malformed_slide_lists_are_rejected() {
        let err = carousel_fields(&form(&[("page", "home"), ("subTexts", "[oops")]), 1)
            .unwrap_err();
        assert_eq!(err.to_string(), "Invalid JSON format in form data");
    }

    #[tokio::test]
    async fn second_save_for_a_page_replaces_the_slides() {
        let repo = MemoryRepository::new(&CAROUSELS);
        let store = RecordingStore::default();
        let resources = OrderedResources::new(&repo, &store, 2);

        let first = carousel_fields(&form(&[("page", "home")]), 2).unwrap();
        let created = upsert_carousel(
            &resources,
            first,
            images(&["carousel/1-a.png", "carousel/2-b.png"]),
        )
        .await
        .unwrap();
        let Saved::Created(created) = created else {
            panic!("first save should create");
        };

        let other = carousel_fields(&form(&[("page", "about")]), 1).unwrap();
        upsert_carousel(&resources, other, images(&["carousel/3-c.png"]))
            .await
            .unwrap();

        let second =
            carousel_fields(&form(&[("page", "home"), ("headings", r#"["New"]"#)]), 1).unwrap();
        let replaced = upsert_carousel(&resources, second, images(&["carousel/4-d.png"]))
            .await
            .unwrap();
        let Saved::Replaced(replaced) = replaced else {
            panic!("second save should replace");
        };

        assert_eq!(replaced.id, created.id);
        assert_eq!(replaced.detail_images, vec![media("carousel/4-d.png")]);
        assert_eq!(replaced.fields["slides"][0]["heading"], json!("New"));
        assert_eq!(repo.snapshot().len(), 2);
        let deleted: BTreeSet<String> = store.deleted().into_iter().collect();
        assert_eq!(
            deleted,
            BTreeSet::from(["carousel/1-a.png".to_string(), "carousel/2-b.png".to_string()])
        );
    }

    #[tokio::test]
    async fn failed_replacement_keeps_the_old_images() {
        let repo = MemoryRepository::new(&CAROUSELS);
        let store = RecordingStore::default();
        let resources = OrderedResources::new(&repo, &store, 2);
        let first = carousel_fields(&form(&[("page", "home")]), 1).unwrap();
        upsert_carousel(&resources, first, images(&["carousel/1-a.png"]))
            .await
            .unwrap();

        repo.fail_writes(true);
        let second = carousel_fields(&form(&[("page", "home")]), 1).unwrap();
        upsert_carousel(&resources, second, images(&["carousel/2-b.png"]))
            .await
            .unwrap_err();

        assert_eq!(store.deleted(), vec!["carousel/2-b.png"]);
        assert_eq!(
            repo.snapshot()[0].detail_images,
            vec![media("carousel/1-a.png")]
        );
    }
}
