use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use thiserror::Error;
use tracing::error;

use crate::{media::ReconcileError, ordered::ResourceError};

use super::responses::ErrorBody;

const GENERIC_FAILURE: &str = "Something went wrong";

/// Error returned by every JSON handler.
#[derive(Debug, Error)]
pub enum AppError {
    /// Missing or malformed input. `errors` carries field-level details when
    /// a handler collects more than one problem.
    #[error("{message}")]
    Validation {
        message: String,
        errors: Vec<String>,
    },

    #[error("{0}")]
    NotFound(String),

    #[error("{0}")]
    Conflict(String),

    #[error("{0}")]
    Unauthorized(String),

    #[error("{context}")]
    Internal {
        context: String,
        #[source]
        source: anyhow::Error,
    },
}

pub type AppResult<T> = Result<T, AppError>;

impl AppError {
    pub fn invalid(message: impl Into<String>) -> Self {
        Self::Validation {
            message: message.into(),
            errors: Vec::new(),
        }
    }

    pub fn with_errors(errors: Vec<String>) -> Self {
        Self::Validation {
            message: "Validation errors".into(),
            errors,
        }
    }

    pub fn not_found(label: &str) -> Self {
        Self::NotFound(format!("{label} not found"))
    }

    pub fn internal(context: impl Into<String>, source: impl Into<anyhow::Error>) -> Self {
        Self::Internal {
            context: context.into(),
            source: source.into(),
        }
    }

    pub fn status(&self) -> StatusCode {
        match self {
            AppError::Validation { .. } => StatusCode::BAD_REQUEST,
            AppError::NotFound(_) => StatusCode::NOT_FOUND,
            AppError::Conflict(_) => StatusCode::CONFLICT,
            AppError::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            AppError::Internal { .. } => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl From<anyhow::Error> for AppError {
    fn from(source: anyhow::Error) -> Self {
        Self::internal(GENERIC_FAILURE, source)
    }
}

impl From<sqlx::Error> for AppError {
    fn from(source: sqlx::Error) -> Self {
        Self::internal(GENERIC_FAILURE, source)
    }
}

impl From<ReconcileError> for AppError {
    fn from(err: ReconcileError) -> Self {
        Self::invalid(err.to_string())
    }
}

impl From<ResourceError> for AppError {
    fn from(err: ResourceError) -> Self {
        match err {
            ResourceError::Invalid { message, errors } => Self::Validation { message, errors },
            ResourceError::NotFound(kind) => Self::not_found(kind.label),
            ResourceError::Conflict(message) => Self::Conflict(message),
            ResourceError::Media(media) => media.into(),
            ResourceError::Repository { context, source } => Self::Internal { context, source },
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status();
        let body = match self {
            AppError::Validation { message, errors } => ErrorBody::new(message).with_errors(errors),
            AppError::Internal { context, source } => {
                error!(err = ?source, %context, "request failed");
                ErrorBody::new(context)
            }
            other => ErrorBody::new(other.to_string()),
        };

        (status, Json(body)).into_response()
    }
}

/// Attaches a client-facing message to infrastructure failures.
pub trait InternalContext<T> {
    fn or_internal(self, context: &str) -> AppResult<T>;
}

impl<T, E> InternalContext<T> for Result<T, E>
where
    E: Into<anyhow::Error>,
{
    fn or_internal(self, context: &str) -> AppResult<T> {
        self.map_err(|err| AppError::internal(context, err))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn statuses_follow_taxonomy() {
        assert_eq!(AppError::invalid("x").status(), StatusCode::BAD_REQUEST);
        assert_eq!(
            AppError::not_found("Gallery item").status(),
            StatusCode::NOT_FOUND
        );
        assert_eq!(AppError::Conflict("dup".into()).status(), StatusCode::CONFLICT);
        assert_eq!(
            AppError::from(anyhow::anyhow!("db down")).status(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[test]
    fn not_found_message_names_resource() {
        assert_eq!(
            AppError::not_found("Leadership member").to_string(),
            "Leadership member not found"
        );
    }

    #[test]
    fn empty_media_set_is_a_validation_error() {
        let err = AppError::from(ReconcileError::EmptyMediaSet);
        assert!(matches!(err, AppError::Validation { .. }));
        assert_eq!(err.to_string(), "At least one detail image is required");
    }

    #[test]
    fn resource_errors_keep_their_meaning() {
        let err = AppError::from(ResourceError::NotFound(&crate::ordered::GALLERY_ITEMS));
        assert_eq!(err.status(), StatusCode::NOT_FOUND);
        assert_eq!(err.to_string(), "Gallery item not found");

        let err = AppError::from(ResourceError::with_errors(vec!["Item 1: Invalid ID".into()]));
        assert_eq!(err.status(), StatusCode::BAD_REQUEST);
    }

    #[test]
    fn or_internal_keeps_client_message() {
        let result: Result<(), anyhow::Error> = Err(anyhow::anyhow!("connection reset"));
        let err = result.or_internal("Failed to fetch gallery items").unwrap_err();
        assert_eq!(err.to_string(), "Failed to fetch gallery items");
    }
}
