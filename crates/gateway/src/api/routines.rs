//! Routine CRUD.
//!
//! Creating or rescheduling a routine registers its reminder trigger
//! BEFORE the record is persisted; if registration fails the client
//! gets an error and no half-created routine is left behind.

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Json, Response};
use chrono::Utc;

use super::auth::UserId;
use super::{api_error, validation_error};
use crate::schedule::{
    compile, trigger_name, validate_routine, ReminderPayload, RoutineInput, ScheduleSpec, TimeOfDay,
};
use crate::scheduler::TriggerSpec;
use crate::state::AppState;
use crate::store::RoutineRecord;

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// GET /v1/routines
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

pub async fn list_routines(
    State(state): State<AppState>,
    UserId(user_id): UserId,
) -> impl IntoResponse {
    let routines = state.routines.list_for_user(&user_id).await;
    let count = routines.len();
    Json(serde_json::json!({
        "routines": routines,
        "count": count,
    }))
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// POST /v1/routines
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

pub async fn create_routine(
    State(state): State<AppState>,
    UserId(user_id): UserId,
    Json(input): Json<RoutineInput>,
) -> Response {
    let (clean, errors) = validate_routine(&input, false);
    if !errors.is_empty() {
        tracing::warn!(user_id = %user_id, ?errors, "routine validation failed");
        return validation_error(errors);
    }

    let now = Utc::now();
    let routine_id = uuid::Uuid::new_v4().to_string();
    let timezone = clean
        .timezone
        .unwrap_or_else(|| state.config.scheduler.default_timezone.clone());
    let mut routine = RoutineRecord {
        routine_id: routine_id.clone(),
        user_id: user_id.clone(),
        title: clean.title.unwrap_or_else(|| "My Routine".to_string()),
        steps: clean.steps.unwrap_or_default(),
        timezone,
        when: clean.when.unwrap_or(ScheduleSpec::Daily {
            time: TimeOfDay { hour: 7, minute: 0 },
        }),
        trigger_name: None,
        created_at: now,
        updated_at: now,
    };

    // Register the trigger first.
    let expression = match compile(&routine.when, &routine.timezone) {
        Ok(e) => e,
        Err(e) => {
            tracing::error!(user_id = %user_id, error = %e, "schedule compilation failed");
            return api_error(
                StatusCode::INTERNAL_SERVER_ERROR,
                "Failed to create routine",
            );
        }
    };
    let name = trigger_name(&user_id, &routine_id);
    let spec = TriggerSpec {
        name: name.clone(),
        expression,
        payload: ReminderPayload::new(&user_id, &routine_id, &routine.title, &routine.steps),
    };
    if let Err(e) = state.scheduler.create(spec).await {
        tracing::error!(user_id = %user_id, error = %e, "trigger registration failed");
        return api_error(
            StatusCode::INTERNAL_SERVER_ERROR,
            "Failed to create reminder schedule",
        );
    }
    routine.trigger_name = Some(name.clone());

    // Then persist; if that fails, clean both the record and the
    // trigger up again.
    if let Err(e) = state.routines.insert(routine.clone()).await {
        tracing::error!(user_id = %user_id, error = %e, "failed to persist routine");
        state.routines.rollback_insert(&routine_id).await;
        if let Err(e) = state.scheduler.delete(&name).await {
            tracing::warn!(trigger = %name, error = %e, "trigger cleanup failed");
        }
        return api_error(
            StatusCode::INTERNAL_SERVER_ERROR,
            "Failed to create routine",
        );
    }

    tracing::info!(user_id = %user_id, routine_id = %routine_id, "created routine");
    (StatusCode::CREATED, Json(routine)).into_response()
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// PUT /v1/routines/:id
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

pub async fn update_routine(
    State(state): State<AppState>,
    UserId(user_id): UserId,
    Path(routine_id): Path<String>,
    Json(input): Json<RoutineInput>,
) -> Response {
    let (clean, errors) = validate_routine(&input, true);
    if !errors.is_empty() {
        tracing::warn!(user_id = %user_id, ?errors, "routine update validation failed");
        return validation_error(errors);
    }

    let current = match state.routines.get(&user_id, &routine_id).await {
        Some(r) => r,
        None => return api_error(StatusCode::NOT_FOUND, "Routine not found"),
    };

    let title = clean.title.unwrap_or(current.title);
    let steps = clean.steps.unwrap_or(current.steps);
    let timezone = clean.timezone.unwrap_or(current.timezone);

    // A changed schedule re-registers the trigger. Other field changes
    // leave the existing trigger in place.
    let mut when = current.when;
    let mut new_trigger_name = current.trigger_name.clone();
    if let Some(new_when) = clean.when {
        if let Some(old) = &current.trigger_name {
            if let Err(e) = state.scheduler.delete(old).await {
                tracing::warn!(trigger = %old, error = %e, "failed to delete old trigger");
            }
        }
        let expression = match compile(&new_when, &timezone) {
            Ok(e) => e,
            Err(e) => {
                tracing::error!(user_id = %user_id, error = %e, "schedule compilation failed");
                return api_error(
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "Failed to update routine",
                );
            }
        };
        let name = trigger_name(&user_id, &routine_id);
        let spec = TriggerSpec {
            name: name.clone(),
            expression,
            payload: ReminderPayload::new(&user_id, &routine_id, &title, &steps),
        };
        if let Err(e) = state.scheduler.create(spec).await {
            tracing::error!(user_id = %user_id, error = %e, "trigger registration failed");
            return api_error(
                StatusCode::INTERNAL_SERVER_ERROR,
                "Failed to create reminder schedule",
            );
        }
        when = new_when;
        new_trigger_name = Some(name);
    }

    let updated = state
        .routines
        .update(&routine_id, |r| {
            r.title = title;
            r.steps = steps;
            r.timezone = timezone;
            r.when = when;
            r.trigger_name = new_trigger_name;
        })
        .await;

    match updated {
        Ok(Some(routine)) => {
            tracing::info!(user_id = %user_id, routine_id = %routine_id, "updated routine");
            Json(routine).into_response()
        }
        Ok(None) => api_error(StatusCode::NOT_FOUND, "Routine not found"),
        Err(e) => {
            tracing::error!(user_id = %user_id, error = %e, "failed to persist routine update");
            api_error(
                StatusCode::INTERNAL_SERVER_ERROR,
                "Failed to update routine",
            )
        }
    }
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// DELETE /v1/routines/:id
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

/// Idempotent: deleting a missing routine still returns 204. The
/// trigger is removed best-effort before the record.
pub async fn delete_routine(
    State(state): State<AppState>,
    UserId(user_id): UserId,
    Path(routine_id): Path<String>,
) -> Response {
    if let Some(routine) = state.routines.get(&user_id, &routine_id).await {
        if let Some(name) = &routine.trigger_name {
            if let Err(e) = state.scheduler.delete(name).await {
                tracing::warn!(trigger = %name, error = %e, "trigger deletion failed");
            }
        }
        if let Err(e) = state.routines.delete(&routine_id).await {
            tracing::error!(user_id = %user_id, error = %e, "failed to delete routine");
            return api_error(
                StatusCode::INTERNAL_SERVER_ERROR,
                "Failed to delete routine",
            );
        }
        tracing::info!(user_id = %user_id, routine_id = %routine_id, "deleted routine");
    }
    StatusCode::NO_CONTENT.into_response()
}
