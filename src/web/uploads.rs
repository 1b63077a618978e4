use std::{
    collections::{HashMap, HashSet},
    path::Path,
};

use axum::extract::Multipart;
use chrono::Utc;
use tracing::{debug, warn};

use crate::media::{MediaRef, ObjectStore, delete_objects};

use super::error::AppError;

/// Extensions accepted for every image field.
pub const IMAGE_EXTENSIONS: &[&str] = &["jpeg", "jpg", "png", "webp", "gif"];

/// Result type used by the shared upload helpers.
pub type UploadResult<T> = Result<T, UploadError>;

/// Error returned when validating or persisting uploaded files.
#[derive(Debug)]
pub struct UploadError {
    message: String,
    storage_failure: Option<anyhow::Error>,
}

impl UploadError {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            storage_failure: None,
        }
    }

    fn storage(err: anyhow::Error) -> Self {
        Self {
            message: "Failed to store uploaded file".into(),
            storage_failure: Some(err),
        }
    }

    pub fn message(&self) -> &str {
        &self.message
    }
}

impl std::fmt::Display for UploadError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.message)
    }
}

impl std::error::Error for UploadError {}

impl From<UploadError> for AppError {
    fn from(err: UploadError) -> Self {
        match err.storage_failure {
            Some(source) => AppError::internal(err.message, source),
            None => AppError::invalid(err.message),
        }
    }
}

/// Configuration describing the expectations for a single multipart file field.
#[derive(Debug, Clone, Copy)]
pub struct FileFieldConfig {
    pub field_name: &'static str,
    /// Object-store folder the field's files are written under.
    pub folder: &'static str,
    pub allowed_extensions: &'static [&'static str],
    pub max_files: usize,
    pub max_bytes: usize,
}

impl FileFieldConfig {
    pub const fn image(
        field_name: &'static str,
        folder: &'static str,
        max_files: usize,
        max_bytes: usize,
    ) -> Self {
        Self {
            field_name,
            folder,
            allowed_extensions: IMAGE_EXTENSIONS,
            max_files,
            max_bytes,
        }
    }
}

/// An uploaded file after it was written to the object store.
#[derive(Debug, Clone)]
pub struct StoredUpload {
    pub field_name: String,
    pub media: MediaRef,
}

/// Aggregated output of the shared upload processor.
#[derive(Debug, Default)]
pub struct UploadOutcome {
    pub files: Vec<StoredUpload>,
    pub text_fields: HashMap<String, Vec<String>>,
}

impl UploadOutcome {
    pub fn files_for<'a>(&'a self, field_name: &str) -> impl Iterator<Item = &'a StoredUpload> {
        self.files
            .iter()
            .filter(move |file| file.field_name == field_name)
    }

    pub fn media_for(&self, field_name: &str) -> Vec<MediaRef> {
        self.files_for(field_name)
            .map(|file| file.media.clone())
            .collect()
    }

    pub fn first_media_for(&self, field_name: &str) -> Option<MediaRef> {
        self.files_for(field_name).next().map(|file| file.media.clone())
    }

    pub fn text_values(&self, field_name: &str) -> Option<&[String]> {
        self.text_fields
            .get(field_name)
            .map(|values| values.as_slice())
    }

    pub fn first_text(&self, field_name: &str) -> Option<&str> {
        self.text_values(field_name)
            .and_then(|values| values.first().map(|s| s.as_str()))
    }

    /// Keys of every object written while processing the form.
    pub fn stored_keys(&self) -> Vec<String> {
        self.files.iter().map(|file| file.media.key.clone()).collect()
    }
}

/// Parses multipart form data, writing files to the object store according to
/// the provided configuration. Objects already written are deleted again when
/// the form turns out to be invalid part-way through.
pub async fn process_upload_form(
    mut multipart: Multipart,
    store: &dyn ObjectStore,
    field_configs: &[FileFieldConfig],
    cleanup_concurrency: usize,
) -> UploadResult<UploadOutcome> {
    let mut outcome = UploadOutcome::default();

    if let Err(err) = collect_fields(&mut multipart, store, field_configs, &mut outcome).await {
        let stored = outcome.stored_keys();
        if !stored.is_empty() {
            warn!(count = stored.len(), error = %err, "discarding uploads from rejected form");
            delete_objects(store, stored, cleanup_concurrency).await;
        }
        return Err(err);
    }

    Ok(outcome)
}

async fn collect_fields(
    multipart: &mut Multipart,
    store: &dyn ObjectStore,
    field_configs: &[FileFieldConfig],
    outcome: &mut UploadOutcome,
) -> UploadResult<()> {
    let mut counts: HashMap<&str, usize> = HashMap::new();
    let mut used_names: HashSet<String> = HashSet::new();

    while let Some(mut field) = multipart
        .next_field()
        .await
        .map_err(|err| UploadError::new(format!("Failed to parse upload form: {err}")))?
    {
        let field_name = field.name().unwrap_or("").to_string();

        if field.file_name().is_none() {
            let value = field.text().await.map_err(|err| {
                UploadError::new(format!("Failed to read field `{field_name}`: {err}"))
            })?;
            outcome
                .text_fields
                .entry(field_name)
                .or_default()
                .push(value);
            continue;
        }

        let Some(config) = field_configs
            .iter()
            .find(|config| config.field_name == field_name)
        else {
            return Err(UploadError::new(format!(
                "Unexpected file field `{field_name}`"
            )));
        };

        let count = counts.entry(config.field_name).or_default();
        if *count >= config.max_files {
            return Err(UploadError::new(format!(
                "Too many files for `{}` (at most {})",
                config.field_name, config.max_files
            )));
        }

        let file_name = field.file_name().unwrap_or("upload.bin").to_string();
        let extension = Path::new(&file_name)
            .extension()
            .and_then(|ext| ext.to_str())
            .map(|ext| ext.to_ascii_lowercase())
            .unwrap_or_default();
        let content_type = field
            .content_type()
            .unwrap_or("application/octet-stream")
            .to_string();

        if !is_allowed_type(config, &extension, &content_type) {
            return Err(UploadError::new("Error: Images Only!"));
        }

        let mut bytes: Vec<u8> = Vec::new();
        while let Some(chunk) = field
            .chunk()
            .await
            .map_err(|err| UploadError::new(format!("Failed to read upload data: {err}")))?
        {
            if bytes.len() + chunk.len() > config.max_bytes {
                return Err(UploadError::new(format!(
                    "File `{file_name}` exceeds the {} byte limit",
                    config.max_bytes
                )));
            }
            bytes.extend_from_slice(&chunk);
        }

        let mut sanitized = sanitize_filename::sanitize(&file_name);
        if sanitized.is_empty() {
            sanitized = format!("file_{}.{}", *count, extension);
        }
        let key = unique_name(
            object_key(config.folder, Utc::now().timestamp_millis(), &sanitized),
            &mut used_names,
        );

        let file_size = bytes.len();
        let media = store
            .put_object(&key, bytes, &content_type)
            .await
            .map_err(UploadError::storage)?;

        debug!(field = config.field_name, key = %media.key, bytes = file_size, "stored upload");
        outcome.files.push(StoredUpload {
            field_name: config.field_name.to_string(),
            media,
        });

        *count += 1;
    }

    Ok(())
}

fn is_allowed_type(config: &FileFieldConfig, extension: &str, content_type: &str) -> bool {
    if !config.allowed_extensions.contains(&extension) {
        return false;
    }

    match content_type.parse::<mime::Mime>() {
        Ok(parsed) => {
            parsed.type_() == mime::IMAGE
                && config
                    .allowed_extensions
                    .contains(&parsed.subtype().as_str())
        }
        Err(_) => false,
    }
}

fn object_key(folder: &str, timestamp_millis: i64, sanitized_name: &str) -> String {
    format!("{folder}/{timestamp_millis}-{sanitized_name}")
}

fn unique_name(candidate: String, used: &mut HashSet<String>) -> String {
    if used.insert(candidate.clone()) {
        return candidate;
    }

    let (stem, extension) = split_name(&candidate);
    let mut counter = 1usize;
    loop {
        let attempt = if extension.is_empty() {
            format!("{}_{}", stem, counter)
        } else {
            format!("{}_{}.{}", stem, counter, extension)
        };
        if used.insert(attempt.clone()) {
            return attempt;
        }
        counter += 1;
    }
}

fn split_name(name: &str) -> (String, String) {
    match name.rsplit_once('.') {
        Some((stem, extension)) if !stem.is_empty() && !extension.contains('/') => {
            (stem.to_string(), extension.to_string())
        }
        _ => (name.to_string(), String::new()),
    }
}
