//! ICS (RFC 5545) document generation.
//!
//! The exporter is total: a routine that cannot be rendered is skipped
//! and counted, never an error for the whole document. Recurring events
//! anchor on 1970-01-05, a Monday, so weekly BYDAY rules expand from a
//! known weekday regardless of the user's timezone.

use chrono::{DateTime, Utc};
use tracing::warn;

use crate::schedule::model::{ScheduleSpec, TimeOfDay};
use crate::store::RoutineRecord;

/// Monday, so BYDAY expansion starts from a known weekday.
const ANCHOR_DATE: &str = "19700105";

const MAX_TEXT_LENGTH: usize = 500;

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// Input and output shapes
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

/// A routine flattened to the loosely-typed shape the exporter accepts.
///
/// Stored routines always carry a validated schedule, but the exporter
/// also tolerates partial or legacy data: any field may be missing, and
/// a routine whose schedule cannot be rendered is skipped rather than
/// failing the export.
#[derive(Clone, Debug, Default)]
pub struct ExportRoutine {
    pub routine_id: String,
    pub title: String,
    pub steps: Vec<String>,
    pub timezone: String,
    pub kind: Option<String>,
    pub time: Option<String>,
    pub days: Option<Vec<String>>,
}

impl From<&RoutineRecord> for ExportRoutine {
    fn from(r: &RoutineRecord) -> Self {
        let (kind, time, days) = match &r.when {
            ScheduleSpec::Daily { time } => ("daily", Some(time.to_string()), None),
            ScheduleSpec::Weekly { time, days } => {
                ("weekly", Some(time.to_string()), Some(days.clone()))
            }
            ScheduleSpec::Cron { .. } => ("cron", None, None),
        };
        Self {
            routine_id: r.routine_id.clone(),
            title: r.title.clone(),
            steps: r.steps.clone(),
            timezone: r.timezone.clone(),
            kind: Some(kind.to_string()),
            time,
            days,
        }
    }
}

/// A generated document plus how many routines made it in.
#[derive(Clone, Debug)]
pub struct IcsExport {
    pub document: String,
    pub emitted: usize,
    pub skipped: usize,
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// Text escaping
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

/// Escape free text for an ICS property value.
///
/// Backslash is escaped first so later escapes are not doubled. CRs are
/// stripped, LFs become the literal two characters `\n`. Text over 500
/// characters after escaping is cut to 497 plus `...`.
pub fn escape_text(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '\\' => out.push_str("\\\\"),
            ',' => out.push_str("\\,"),
            ';' => out.push_str("\\;"),
            '\n' => out.push_str("\\n"),
            '\r' => {}
            other => out.push(other),
        }
    }
    if out.chars().count() > MAX_TEXT_LENGTH {
        let mut cut: String = out.chars().take(MAX_TEXT_LENGTH - 3).collect();
        cut.push_str("...");
        return cut;
    }
    out
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// Event rendering
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

fn byday_code(day: &str) -> Option<&'static str> {
    match day {
        "MON" => Some("MO"),
        "TUE" => Some("TU"),
        "WED" => Some("WE"),
        "THU" => Some("TH"),
        "FRI" => Some("FR"),
        "SAT" => Some("SA"),
        "SUN" => Some("SU"),
        _ => None,
    }
}

fn description_for(steps: &[String]) -> String {
    if steps.is_empty() {
        "SheGlow routine".to_string()
    } else {
        format!("SheGlow routine steps: {}", steps.join("; "))
    }
}

/// Render one routine as VEVENT lines, or `None` when it cannot be
/// represented (bad time, no mappable weekdays, unknown schedule type).
fn render_event(routine: &ExportRoutine, dtstamp: &str) -> Option<Vec<String>> {
    let title = escape_text(&routine.title);
    let description = escape_text(&description_for(&routine.steps));
    let id = &routine.routine_id;
    let tz = &routine.timezone;

    match routine.kind.as_deref() {
        Some("daily") => {
            let raw = routine.time.as_deref().unwrap_or("07:00");
            let time: TimeOfDay = match raw.parse() {
                Ok(t) => t,
                Err(e) => {
                    warn!(routine_id = %id, error = %e, "skipping routine with invalid time");
                    return None;
                }
            };
            Some(vec![
                "BEGIN:VEVENT".to_string(),
                format!("UID:{id}@sheglow.app"),
                format!("DTSTAMP:{dtstamp}"),
                format!("SUMMARY:{title}"),
                format!("DESCRIPTION:{description}"),
                format!(
                    "DTSTART;TZID={tz}:{ANCHOR_DATE}T{:02}{:02}00",
                    time.hour, time.minute
                ),
                "RRULE:FREQ=DAILY".to_string(),
                "END:VEVENT".to_string(),
            ])
        }
        Some("weekly") => {
            let raw = routine.time.as_deref().unwrap_or("07:00");
            let time: TimeOfDay = match raw.parse() {
                Ok(t) => t,
                Err(e) => {
                    warn!(routine_id = %id, error = %e, "skipping routine with invalid time");
                    return None;
                }
            };
            let default_days = vec!["MON".to_string()];
            let days = routine.days.as_ref().unwrap_or(&default_days);
            let mut byday = Vec::new();
            for day in days {
                match byday_code(day) {
                    Some(code) => byday.push(code),
                    None => {
                        warn!(routine_id = %id, day = %day, "dropping unmappable weekday");
                    }
                }
            }
            if byday.is_empty() {
                warn!(routine_id = %id, "skipping routine with no mappable weekdays");
                return None;
            }
            Some(vec![
                "BEGIN:VEVENT".to_string(),
                format!("UID:{id}@sheglow.app"),
                format!("DTSTAMP:{dtstamp}"),
                format!("SUMMARY:{title}"),
                format!("DESCRIPTION:{description}"),
                format!(
                    "DTSTART;TZID={tz}:{ANCHOR_DATE}T{:02}{:02}00",
                    time.hour, time.minute
                ),
                format!("RRULE:FREQ=WEEKLY;BYDAY={}", byday.join(",")),
                "END:VEVENT".to_string(),
            ])
        }
        // ICS has no cron recurrence, so a cron routine exports as a
        // single placeholder event.
        Some("cron") => Some(vec![
            "BEGIN:VEVENT".to_string(),
            format!("UID:{id}@sheglow.app"),
            format!("DTSTAMP:{dtstamp}"),
            format!("SUMMARY:{title} (Custom Schedule)"),
            format!(
                "DESCRIPTION:{description} - Note: Custom cron schedule not fully supported in calendar"
            ),
            format!("DTSTART;TZID={tz}:{ANCHOR_DATE}T070000"),
            "END:VEVENT".to_string(),
        ]),
        other => {
            warn!(routine_id = %id, kind = ?other, "skipping routine with unsupported schedule type");
            None
        }
    }
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// Document assembly
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

/// Build an ICS document from routines, stamped with the current time.
pub fn to_ics(routines: &[ExportRoutine]) -> IcsExport {
    to_ics_at(routines, Utc::now())
}

/// Build an ICS document with an explicit generation time.
pub fn to_ics_at(routines: &[ExportRoutine], generated_at: DateTime<Utc>) -> IcsExport {
    let dtstamp = generated_at.format("%Y%m%dT%H%M%SZ").to_string();

    let mut lines = vec![
        "BEGIN:VCALENDAR".to_string(),
        "VERSION:2.0".to_string(),
        "PRODID:-//SheGlow//Concierge Calendar//EN".to_string(),
        "CALSCALE:GREGORIAN".to_string(),
        "METHOD:PUBLISH".to_string(),
    ];

    let mut emitted = 0;
    let mut skipped = 0;
    for routine in routines {
        match render_event(routine, &dtstamp) {
            Some(event) => {
                lines.extend(event);
                emitted += 1;
            }
            None => skipped += 1,
        }
    }

    lines.push("END:VCALENDAR".to_string());

    IcsExport {
        document: lines.join("\r\n"),
        emitted,
        skipped,
    }
}
