pub mod auth;
pub mod calendar;
pub mod profile;
pub mod recommend;
pub mod routines;
pub mod subscribe;
pub mod suggestions;

use axum::http::StatusCode;
use axum::middleware;
use axum::response::{IntoResponse, Json, Response};
use axum::routing::{delete, get, post, put};
use axum::Router;

use crate::state::AppState;

/// Build a standardized JSON error response: `{ "error": "<message>" }`.
pub(crate) fn api_error(status: StatusCode, message: impl Into<String>) -> Response {
    (status, Json(serde_json::json!({ "error": message.into() }))).into_response()
}

/// Validation failures carry the per-field detail list.
pub(crate) fn validation_error(details: Vec<String>) -> Response {
    (
        StatusCode::BAD_REQUEST,
        Json(serde_json::json!({
            "error": "Validation failed",
            "message": "Invalid input data",
            "details": details,
        })),
    )
        .into_response()
}

async fn health() -> impl IntoResponse {
    Json(serde_json::json!({
        "status": "healthy",
        "timestamp": chrono::Utc::now(),
        "service": "SheGlow Concierge",
        "version": env!("CARGO_PKG_VERSION"),
    }))
}

/// Build the full API router.
///
/// Routes are split into **public** (no auth required) and **protected**
/// (gated behind the `SG_API_TOKEN` bearer-token middleware).
///
/// `state` is needed to wire up the auth middleware at build time.
pub fn router(state: AppState) -> Router<AppState> {
    let public = Router::new().route("/health", get(health));

    let protected = Router::new()
        // Profile
        .route("/v1/profile", get(profile::get_profile))
        .route("/v1/profile", put(profile::update_profile))
        // Routines
        .route("/v1/routines", get(routines::list_routines))
        .route("/v1/routines", post(routines::create_routine))
        .route("/v1/routines/:id", put(routines::update_routine))
        .route("/v1/routines/:id", delete(routines::delete_routine))
        // Calendar export
        .route("/v1/calendar.ics", get(calendar::download_calendar))
        // Email reminders
        .route("/v1/subscribe", post(subscribe::subscribe))
        // AI recommendations
        .route("/v1/recommend", post(recommend::recommend))
        .route("/v1/suggestions", get(suggestions::list_suggestions))
        .route("/v1/suggestions/:id", delete(suggestions::delete_suggestion))
        .route_layer(middleware::from_fn_with_state(
            state,
            auth::require_api_token,
        ));

    public.merge(protected)
}
