//! AI routine recommendation.
//!
//! `POST /v1/recommend` asks the advisor model for a personalized
//! routine, stores the result as a suggestion, and returns it. When the
//! model's reply is not the requested JSON shape, a fallback suggestion
//! carrying the raw text is built instead of failing the request.

use axum::extract::State;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Json, Response};
use chrono::Utc;
use serde::Deserialize;
use sg_providers::GenerateRequest;

use super::auth::UserId;
use super::api_error;
use crate::state::AppState;
use crate::store::{Suggestion, VALID_SKIN_TYPES};

const MAX_CONCERNS: usize = 10;
const MAX_INVENTORY: usize = 20;

#[derive(Debug, Default, Deserialize)]
pub struct RecommendRequest {
    pub skin_type: Option<String>,
    #[serde(default)]
    pub concerns: Vec<String>,
    #[serde(default)]
    pub inventory: Vec<String>,
}

fn validate_request(req: &RecommendRequest) -> Result<String, String> {
    if req.concerns.len() > MAX_CONCERNS {
        return Err(format!("too many concerns (max {MAX_CONCERNS})"));
    }
    if req.inventory.len() > MAX_INVENTORY {
        return Err(format!("too many inventory items (max {MAX_INVENTORY})"));
    }
    let skin_type = req.skin_type.as_deref().unwrap_or("combination");
    if !VALID_SKIN_TYPES.contains(&skin_type) {
        return Err(format!(
            "skin_type must be one of: {}",
            VALID_SKIN_TYPES.join(", ")
        ));
    }
    Ok(skin_type.to_string())
}

fn build_prompt(skin_type: &str, concerns: &[String], inventory: &[String]) -> String {
    let concerns_text = if concerns.is_empty() {
        "general maintenance".to_string()
    } else {
        concerns.join(", ")
    };
    let inventory_text = if inventory.is_empty() {
        "recommendations needed".to_string()
    } else {
        inventory.join(", ")
    };
    format!(
        r#"You are an expert skincare consultant. Create a personalized skincare routine based on:

- Skin Type: {skin_type}
- Primary Concerns: {concerns_text}
- Available Products: {inventory_text}

Return a JSON response with this exact structure:
{{
  "summary": "Brief routine description (max 200 chars)",
  "steps": [
    {{
      "time_of_day": "AM" or "PM",
      "step_name": "Step name",
      "product": "Product name or recommendation",
      "instructions": "Detailed instructions"
    }}
  ],
  "reminders": ["08:00 AM", "08:00 PM"]
}}

Keep the routine simple with 3-6 steps total. Focus on effectiveness and user compliance."#
    )
}

fn default_reminders() -> Vec<String> {
    vec!["08:00 AM".to_string(), "08:00 PM".to_string()]
}

/// Parse the model's reply into suggestion fields. A reply that is not
/// valid JSON becomes a single-step fallback carrying the raw text.
fn parse_reply(text: &str) -> (String, serde_json::Value, Vec<String>) {
    match serde_json::from_str::<serde_json::Value>(text) {
        Ok(data) => {
            let summary = data
                .get("summary")
                .and_then(|v| v.as_str())
                .filter(|s| !s.is_empty())
                .unwrap_or("Custom skincare routine")
                .to_string();
            let steps = data.get("steps").cloned().unwrap_or_else(|| serde_json::json!([]));
            let reminders = data
                .get("reminders")
                .and_then(|v| v.as_array())
                .map(|arr| {
                    arr.iter()
                        .filter_map(|v| v.as_str().map(String::from))
                        .collect::<Vec<_>>()
                })
                .filter(|r| !r.is_empty())
                .unwrap_or_else(default_reminders);
            (summary, steps, reminders)
        }
        Err(e) => {
            tracing::warn!(error = %e, "advisor returned non-JSON reply, using fallback");
            let instructions: String = text.chars().take(200).collect();
            let steps = serde_json::json!([{
                "time_of_day": "AM",
                "step_name": "Cleanse",
                "product": "Gentle cleanser",
                "instructions": if instructions.is_empty() {
                    "Follow basic cleansing routine".to_string()
                } else {
                    instructions
                },
            }]);
            (
                "Basic skincare routine - please consult text response".to_string(),
                steps,
                default_reminders(),
            )
        }
    }
}

pub async fn recommend(
    State(state): State<AppState>,
    UserId(user_id): UserId,
    Json(req): Json<RecommendRequest>,
) -> Response {
    let skin_type = match validate_request(&req) {
        Ok(s) => s,
        Err(msg) => return api_error(StatusCode::BAD_REQUEST, msg),
    };

    let advisor = match &state.advisor {
        Some(a) => a,
        None => {
            return api_error(
                StatusCode::SERVICE_UNAVAILABLE,
                "Recommendations are not available",
            )
        }
    };

    let prompt = build_prompt(&skin_type, &req.concerns, &req.inventory);
    let reply = match advisor
        .generate(GenerateRequest {
            prompt,
            ..Default::default()
        })
        .await
    {
        Ok(r) => r,
        Err(e) => {
            tracing::error!(user_id = %user_id, error = %e, "advisor request failed");
            return api_error(StatusCode::BAD_GATEWAY, "AI service unavailable");
        }
    };

    let (summary, steps, reminders) = parse_reply(&reply.content);
    let created_at = Utc::now();
    let suggestion = Suggestion {
        suggestion_id: uuid::Uuid::new_v4().to_string(),
        user_id: user_id.clone(),
        skin_type,
        concerns: req.concerns,
        inventory: req.inventory,
        summary,
        steps,
        reminders,
        created_at,
        expires_at: Suggestion::expiry_from(created_at),
    };

    if let Err(e) = state.suggestions.insert(suggestion.clone()).await {
        tracing::error!(user_id = %user_id, error = %e, "failed to persist suggestion");
        return api_error(
            StatusCode::SERVICE_UNAVAILABLE,
            "Unable to save routine, please try again",
        );
    }

    tracing::info!(
        user_id = %user_id,
        suggestion_id = %suggestion.suggestion_id,
        "recommendation created"
    );
    (StatusCode::CREATED, Json(suggestion)).into_response()
}
