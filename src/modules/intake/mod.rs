//! Public forms: contact messages, newsletter subscriptions and volunteer
//! sign-ups.

use axum::{
    Router,
    routing::{get, post},
};

use crate::AppState;

mod contact;
mod subscribe;
mod volunteer;

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/contact", post(contact::create_contact))
        .route("/subscribe", post(subscribe::create_subscription))
        .route("/volunteer", post(volunteer::create_volunteer))
        .route("/admin/volunteers", get(volunteer::list_volunteers))
        .route("/admin/volunteers/:id", get(volunteer::get_volunteer))
}

/// Trimmed value, `None` when absent or blank.
fn trimmed(value: &Option<String>) -> Option<String> {
    value
        .as_deref()
        .map(str::trim)
        .filter(|value| !value.is_empty())
        .map(str::to_string)
}
