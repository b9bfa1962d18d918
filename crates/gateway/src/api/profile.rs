//! User profile API.
//!
//! - `GET /v1/profile` — the caller's profile, default shape if never saved
//! - `PUT /v1/profile` — merge update; only provided fields change

use axum::extract::State;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Json, Response};
use serde::Deserialize;

use super::auth::UserId;
use super::{api_error, validation_error};
use crate::state::AppState;
use crate::store::{ProfilePatch, VALID_CONCERNS, VALID_SKIN_TYPES};

const MAX_DISPLAY_NAME_LENGTH: usize = 100;
const MAX_EMAIL_LENGTH: usize = 255;

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateProfileRequest {
    pub display_name: Option<String>,
    pub skin_type: Option<String>,
    pub concerns: Option<Vec<String>>,
    pub timezone: Option<String>,
    pub email: Option<String>,
}

/// Validate an update payload into a patch, collecting one error per
/// offending field. Duplicate concerns are dropped, order preserved.
fn validate_profile(req: &UpdateProfileRequest) -> (ProfilePatch, Vec<String>) {
    let mut errors = Vec::new();
    let mut patch = ProfilePatch::default();

    if let Some(name) = req.display_name.as_deref().map(str::trim) {
        if name.is_empty() {
            errors.push("displayName must be a non-empty string".into());
        } else if name.chars().count() > MAX_DISPLAY_NAME_LENGTH {
            errors.push(format!(
                "displayName must be {MAX_DISPLAY_NAME_LENGTH} characters or less"
            ));
        } else {
            patch.display_name = Some(name.to_string());
        }
    }

    if let Some(skin_type) = req.skin_type.as_deref() {
        if VALID_SKIN_TYPES.contains(&skin_type) {
            patch.skin_type = Some(skin_type.to_string());
        } else {
            errors.push(format!(
                "skinType must be one of: {}",
                VALID_SKIN_TYPES.join(", ")
            ));
        }
    }

    if let Some(concerns) = &req.concerns {
        let invalid: Vec<&str> = concerns
            .iter()
            .map(String::as_str)
            .filter(|c| !VALID_CONCERNS.contains(c))
            .collect();
        if invalid.is_empty() {
            let mut deduped = Vec::new();
            for c in concerns {
                if !deduped.contains(c) {
                    deduped.push(c.clone());
                }
            }
            patch.concerns = Some(deduped);
        } else {
            errors.push(format!(
                "Invalid concerns: {}. Valid options: {}",
                invalid.join(", "),
                VALID_CONCERNS.join(", ")
            ));
        }
    }

    if let Some(tz) = req.timezone.as_deref().map(str::trim) {
        if tz.is_empty() {
            errors.push("timezone must be a non-empty string".into());
        } else {
            patch.timezone = Some(tz.to_string());
        }
    }

    if let Some(email) = req.email.as_deref() {
        if !email.contains('@') {
            errors.push("email must be a valid email address".into());
        } else if email.len() > MAX_EMAIL_LENGTH {
            errors.push(format!("email must be {MAX_EMAIL_LENGTH} characters or less"));
        } else {
            patch.email = Some(email.trim().to_lowercase());
        }
    }

    (patch, errors)
}

pub async fn get_profile(State(state): State<AppState>, UserId(user_id): UserId) -> Response {
    let profile = state.users.get_or_default(&user_id).await;
    Json(profile).into_response()
}

pub async fn update_profile(
    State(state): State<AppState>,
    UserId(user_id): UserId,
    Json(req): Json<UpdateProfileRequest>,
) -> Response {
    let (patch, errors) = validate_profile(&req);
    if !errors.is_empty() {
        tracing::warn!(user_id = %user_id, ?errors, "profile validation failed");
        return validation_error(errors);
    }

    match state.users.apply_patch(&user_id, patch).await {
        Ok(profile) => Json(profile).into_response(),
        Err(e) => {
            tracing::error!(user_id = %user_id, error = %e, "failed to update profile");
            api_error(StatusCode::INTERNAL_SERVER_ERROR, "Failed to update profile")
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_patch_is_valid() {
        let (patch, errors) = validate_profile(&UpdateProfileRequest::default());
        assert!(errors.is_empty());
        assert!(patch.display_name.is_none());
        assert!(patch.concerns.is_none());
    }

    #[test]
    fn skin_type_checked_against_known_set() {
        let (_, errors) = validate_profile(&UpdateProfileRequest {
            skin_type: Some("glittery".into()),
            ..Default::default()
        });
        assert_eq!(errors.len(), 1);
        assert!(errors[0].contains("dry, oily, combination, normal, sensitive"));
    }

    #[test]
    fn concerns_deduplicated_preserving_order() {
        let (patch, errors) = validate_profile(&UpdateProfileRequest {
            concerns: Some(vec!["acne".into(), "wrinkles".into(), "acne".into()]),
            ..Default::default()
        });
        assert!(errors.is_empty());
        assert_eq!(patch.concerns, Some(vec!["acne".into(), "wrinkles".into()]));
    }

    #[test]
    fn invalid_concerns_listed_with_valid_options() {
        let (_, errors) = validate_profile(&UpdateProfileRequest {
            concerns: Some(vec!["acne".into(), "bad_vibes".into()]),
            ..Default::default()
        });
        assert!(errors[0].contains("bad_vibes"));
        assert!(errors[0].contains("Valid options"));
    }

    #[test]
    fn email_lowercased_and_validated() {
        let (patch, errors) = validate_profile(&UpdateProfileRequest {
            email: Some("Ada@Example.COM".into()),
            ..Default::default()
        });
        assert!(errors.is_empty());
        assert_eq!(patch.email.as_deref(), Some("ada@example.com"));

        let (_, errors) = validate_profile(&UpdateProfileRequest {
            email: Some("not-an-email".into()),
            ..Default::default()
        });
        assert_eq!(errors.len(), 1);
    }

    #[test]
    fn display_name_bounds() {
        let (_, errors) = validate_profile(&UpdateProfileRequest {
            display_name: Some("   ".into()),
            ..Default::default()
        });
        assert_eq!(errors.len(), 1);

        let (_, errors) = validate_profile(&UpdateProfileRequest {
            display_name: Some("x".repeat(101)),
            ..Default::default()
        });
        assert_eq!(errors.len(), 1);
    }
}
