//! Stored recommendation listing and deletion.

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Json, Response};

use super::auth::UserId;
use super::api_error;
use crate::state::AppState;

pub async fn list_suggestions(
    State(state): State<AppState>,
    UserId(user_id): UserId,
) -> impl IntoResponse {
    let suggestions = state.suggestions.list_for_user(&user_id).await;
    let count = suggestions.len();
    Json(serde_json::json!({
        "suggestions": suggestions,
        "count": count,
    }))
}

pub async fn delete_suggestion(
    State(state): State<AppState>,
    UserId(user_id): UserId,
    Path(suggestion_id): Path<String>,
) -> Response {
    match state.suggestions.delete(&user_id, &suggestion_id).await {
        Ok(true) => StatusCode::NO_CONTENT.into_response(),
        Ok(false) => api_error(StatusCode::NOT_FOUND, "Suggestion not found"),
        Err(e) => {
            tracing::error!(user_id = %user_id, error = %e, "failed to delete suggestion");
            api_error(
                StatusCode::INTERNAL_SERVER_ERROR,
                "Failed to delete suggestion",
            )
        }
    }
}
