use std::sync::LazyLock;

use regex::Regex;
use uuid::Uuid;

use super::error::{AppError, AppResult};

static EMAIL_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^[^\s@]+@[^\s@]+\.[^\s@]+$").expect("valid email pattern")
});

static INDIAN_PHONE_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\+91\d{10}$").expect("valid phone pattern"));

static SLUG_STRIP_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[^\w\-]+").expect("valid slug pattern"));

/// Escapes text before it is stored so it can be rendered verbatim by the
/// public site.
pub fn escape_html(input: &str) -> String {
    let mut escaped = String::with_capacity(input.len());
    for ch in input.chars() {
        match ch {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&#x27;"),
            '/' => escaped.push_str("&#x2F;"),
            '\\' => escaped.push_str("&#x5C;"),
            '`' => escaped.push_str("&#96;"),
            other => escaped.push(other),
        }
    }
    escaped
}

pub fn is_valid_email(input: &str) -> bool {
    EMAIL_RE.is_match(input.trim())
}

pub fn is_valid_indian_phone(input: &str) -> bool {
    INDIAN_PHONE_RE.is_match(input.trim())
}

/// Counts characters, not bytes.
pub fn length_within(input: &str, min: usize, max: usize) -> bool {
    let len = input.chars().count();
    len >= min && len <= max
}

/// Parses a path identifier, naming the resource in the error.
pub fn parse_id(raw: &str, label: &str) -> AppResult<Uuid> {
    Uuid::parse_str(raw.trim()).map_err(|_| AppError::invalid(format!("Invalid {label} ID")))
}

/// URL slug for a display name: lowercase, whitespace runs become `-`, dots
/// and any other non-word characters are dropped.
pub fn slugify(name: &str) -> String {
    let lowered = name.trim().to_lowercase();
    let dashed = lowered.split_whitespace().collect::<Vec<_>>().join("-");
    let without_dots = dashed.replace('.', "");
    SLUG_STRIP_RE.replace_all(&without_dots, "").into_owned()
}

/// Interprets form booleans, which arrive as text in multipart bodies.
pub fn parse_bool(input: &str) -> Option<bool> {
    match input.trim().to_ascii_lowercase().as_str() {
        "true" | "1" | "on" | "yes" => Some(true),
        "false" | "0" | "off" | "no" => Some(false),
        _ => None,
    }
}
