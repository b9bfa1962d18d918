//! ICS calendar download.
//!
//! `GET /v1/calendar.ics` renders all of the caller's routines as an
//! RFC 5545 document, served as an attachment named
//! `sheglow-routines-YYYYMMDD.ics`.

use axum::extract::State;
use axum::http::header;
use axum::response::{IntoResponse, Response};

use super::auth::UserId;
use crate::calendar::{to_ics, ExportRoutine};
use crate::state::AppState;

pub async fn download_calendar(
    State(state): State<AppState>,
    UserId(user_id): UserId,
) -> Response {
    let routines = state.routines.list_for_user(&user_id).await;
    let exports: Vec<ExportRoutine> = routines.iter().map(ExportRoutine::from).collect();
    let export = to_ics(&exports);

    tracing::info!(
        user_id = %user_id,
        emitted = export.emitted,
        skipped = export.skipped,
        "generated calendar"
    );

    let filename = format!(
        "sheglow-routines-{}.ics",
        chrono::Utc::now().format("%Y%m%d")
    );
    (
        [
            (
                header::CONTENT_TYPE,
                "text/calendar; charset=utf-8".to_string(),
            ),
            (
                header::CONTENT_DISPOSITION,
                format!("attachment; filename=\"{filename}\""),
            ),
        ],
        export.document,
    )
        .into_response()
}
