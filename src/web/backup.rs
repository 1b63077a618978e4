use std::sync::Arc;

use axum::{
    body::Body,
    extract::State,
    http::header,
    response::{IntoResponse, Response},
};
use axum_extra::extract::cookie::CookieJar;
use chrono::Utc;
use serde::Deserialize;

use crate::backup::{CollectionSource, ExportFormat, PgCollectionSource, stream_archive};

use super::{
    AppState,
    auth::require_admin,
    error::{AppError, AppResult, InternalContext},
    extract::Query,
};

#[derive(Debug, Deserialize)]
pub struct BackupQuery {
    #[serde(default)]
    format: Option<String>,
}

pub async fn download_backup(
    State(state): State<AppState>,
    jar: CookieJar,
    Query(query): Query<BackupQuery>,
) -> AppResult<Response> {
    require_admin(&state, &jar).await?;

    let format = query
        .format
        .as_deref()
        .unwrap_or_default()
        .parse::<ExportFormat>()
        .map_err(|err| AppError::invalid(err.to_string()))?;

    let source = Arc::new(PgCollectionSource::new(state.pool()));
    let collections = source
        .list_collections()
        .await
        .or_internal("Backup failed")?;
    // Failures past this point end the body early instead of setting a status.
    let archive = stream_archive(source, collections, format);

    let disposition = format!(
        "attachment; filename=backup-{}.zip",
        Utc::now().timestamp_millis()
    );
    Ok((
        [
            (header::CONTENT_TYPE, "application/zip".to_string()),
            (header::CONTENT_DISPOSITION, disposition),
        ],
        Body::from_stream(archive),
    )
        .into_response())
}
