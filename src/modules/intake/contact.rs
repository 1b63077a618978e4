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
        validation::{is_valid_email, is_valid_indian_phone},
    },
};

use super::trimmed;

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ContactInput {
    #[serde(default)]
    first_name: Option<String>,
    #[serde(default)]
    last_name: Option<String>,
    #[serde(default)]
    email: Option<String>,
    #[serde(default)]
    phone: Option<String>,
    #[serde(default)]
    state: Option<String>,
    #[serde(default)]
    subject: Option<String>,
    #[serde(default)]
    message: Option<String>,
}

#[derive(Debug, PartialEq)]
struct ContactMessage {
    first_name: String,
    last_name: String,
    email: String,
    phone: String,
    state: String,
    subject: Option<String>,
    message: String,
}

fn required(value: &Option<String>, message: &str) -> AppResult<String> {
    trimmed(value).ok_or_else(|| AppError::invalid(message))
}

impl ContactInput {
    fn validate(&self) -> AppResult<ContactMessage> {
        let first_name = required(&self.first_name, "First name is required")?;
        let last_name = required(&self.last_name, "Last name is required")?;

        let email = required(&self.email, "Email is required")?;
        if !is_valid_email(&email) {
            return Err(AppError::invalid("Please provide a valid email"));
        }

        let phone = required(&self.phone, "Phone number is required")?;
        if !is_valid_indian_phone(&phone) {
            return Err(AppError::invalid(format!(
                "{phone} is not a valid Indian phone number!"
            )));
        }

        Ok(ContactMessage {
            first_name,
            last_name,
            email,
            phone,
            state: required(&self.state, "State is required")?,
            subject: trimmed(&self.subject),
            message: required(&self.message, "Message is required")?,
        })
    }
}

pub async fn create_contact(
    State(state): State<AppState>,
    Json(input): Json<ContactInput>,
) -> AppResult<ApiResponse<()>> {
    let contact = input.validate()?;

    let id = Uuid::new_v4();
    sqlx::query(
        "INSERT INTO contacts (id, first_name, last_name, email, phone, state, subject, message) \
         VALUES ($1, $2, $3, $4, $5, $6, $7, $8)",
    )
    .bind(id)
    .bind(&contact.first_name)
    .bind(&contact.last_name)
    .bind(&contact.email)
    .bind(&contact.phone)
    .bind(&contact.state)
    .bind(&contact.subject)
    .bind(&contact.message)
    .execute(state.pool_ref())
    .await
    .or_internal("Failed to send your message")?;

    info!(%id, "stored contact message");
    Ok(ApiResponse::message("Your message has been sent successfully!")
        .with_status(StatusCode::CREATED))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn input() -> ContactInput {
        ContactInput {
            first_name: Some(" Zara ".into()),
            last_name: Some("Khan".into()),
            email: Some("zara@example.org".into()),
            phone: Some("+919876543210".into()),
            state: Some("Kerala".into()),
            subject: Some("   ".into()),
            message: Some("Hello".into()),
        }
    }

    #[test]
    fn valid_message_is_trimmed() {
        let contact = input().validate().unwrap();
        assert_eq!(contact.first_name, "Zara");
        assert_eq!(contact.subject, None);
    }

    #[test]
    fn phone_must_be_indian_mobile() {
        let mut bad = input();
        bad.phone = Some("9876543210".into());
        assert_eq!(
            bad.validate().unwrap_err().to_string(),
            "9876543210 is not a valid Indian phone number!"
        );
    }

    #[test]
    fn missing_fields_are_reported_in_order() {
        let err = ContactInput::default().validate().unwrap_err();
        assert_eq!(err.to_string(), "First name is required");

        let mut bad = input();
        bad.email = Some("zara@".into());
        assert_eq!(bad.validate().unwrap_err().to_string(), "Please provide a valid email");
    }
}
