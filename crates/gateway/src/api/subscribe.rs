//! Email reminder subscription.
//!
//! `POST /v1/subscribe` stores the address on the caller's profile and
//! registers it with the notifier. The profile must already exist.

use axum::extract::State;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Json, Response};
use serde::Deserialize;
use sg_domain::Error;

use super::auth::UserId;
use super::api_error;
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct SubscribeRequest {
    pub email: Option<String>,
}

fn email_pattern() -> &'static regex::Regex {
    static PATTERN: std::sync::OnceLock<regex::Regex> = std::sync::OnceLock::new();
    PATTERN.get_or_init(|| {
        regex::Regex::new(r"^[a-zA-Z0-9._%+-]+@[a-zA-Z0-9.-]+\.[a-zA-Z]{2,}$")
            .expect("email pattern is a valid literal")
    })
}

fn is_valid_email(email: &str) -> bool {
    email_pattern().is_match(email)
}

pub async fn subscribe(
    State(state): State<AppState>,
    UserId(user_id): UserId,
    Json(req): Json<SubscribeRequest>,
) -> Response {
    let email = match req.email.as_deref().map(str::trim) {
        Some(e) if !e.is_empty() => e,
        _ => return api_error(StatusCode::BAD_REQUEST, "Email is required"),
    };
    if !is_valid_email(email) {
        return api_error(StatusCode::BAD_REQUEST, "Invalid email format");
    }

    match state.users.set_email(&user_id, email).await {
        Ok(()) => {}
        Err(Error::NotFound(_)) => return api_error(StatusCode::NOT_FOUND, "User not found"),
        Err(e) => {
            tracing::error!(user_id = %user_id, error = %e, "failed to store email");
            return api_error(
                StatusCode::INTERNAL_SERVER_ERROR,
                "Failed to update user profile",
            );
        }
    }

    if let Err(e) = state.notifier.subscribe_email(&user_id, email).await {
        tracing::error!(user_id = %user_id, error = %e, "subscription delivery failed");
        return api_error(
            StatusCode::INTERNAL_SERVER_ERROR,
            "Failed to create subscription",
        );
    }

    tracing::info!(user_id = %user_id, "email subscription created");
    Json(serde_json::json!({
        "message": "Subscription created successfully. Please check your email to confirm the subscription."
    }))
    .into_response()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn accepts_ordinary_addresses() {
        assert!(is_valid_email("ada@example.com"));
        assert!(is_valid_email("a.b+tag@sub.example.co"));
    }

    #[test]
    fn rejects_malformed_addresses() {
        assert!(!is_valid_email("no-at-sign"));
        assert!(!is_valid_email("@example.com"));
        assert!(!is_valid_email("a@no-tld"));
        assert!(!is_valid_email("a@example.c"));
        assert!(!is_valid_email("spaces in@example.com"));
    }
}
