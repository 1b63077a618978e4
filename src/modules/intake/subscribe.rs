use axum::{extract::State, http::StatusCode};
use serde::Deserialize;
use tracing::info;
use uuid::Uuid;

use crate::web::extract::Json;
use crate::{
    AppState,
    web::{
        error::{AppError, AppResult, InternalContext},
        responses::ApiResponse,
        validation::is_valid_email,
    },
};

use super::trimmed;

#[derive(Debug, Deserialize)]
pub struct SubscribeInput {
    #[serde(default)]
    email: Option<String>,
}

fn subscriber_email(input: &SubscribeInput) -> AppResult<String> {
    trimmed(&input.email)
        .filter(|email| is_valid_email(email))
        .ok_or_else(|| AppError::invalid("Invalid Email ID"))
}

pub async fn create_subscription(
    State(state): State<AppState>,
    Json(input): Json<SubscribeInput>,
) -> AppResult<ApiResponse<()>> {
    let email = subscriber_email(&input)?;

    let inserted = sqlx::query(
        "INSERT INTO subscribers (id, email) VALUES ($1, $2) ON CONFLICT (email) DO NOTHING",
    )
    .bind(Uuid::new_v4())
    .bind(&email)
    .execute(state.pool_ref())
    .await
    .or_internal("Failed to subscribe")?
    .rows_affected();

    if inserted == 0 {
        return Err(AppError::Conflict("You are already subscribed!".into()));
    }

    info!("new newsletter subscriber");
    Ok(ApiResponse::message("Thank you for subscribing!").with_status(StatusCode::CREATED))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn email_is_trimmed_and_checked() {
        let input = SubscribeInput {
            email: Some(" reader@example.org ".into()),
        };
        assert_eq!(subscriber_email(&input).unwrap(), "reader@example.org");

        let input = SubscribeInput {
            email: Some("reader".into()),
        };
        assert_eq!(subscriber_email(&input).unwrap_err().to_string(), "Invalid Email ID");

        let input = SubscribeInput { email: None };
        assert!(subscriber_email(&input).is_err());
    }
}
