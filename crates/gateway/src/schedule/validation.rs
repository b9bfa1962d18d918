//! Input validation for schedule and routine submissions.
//!
//! Validation collects one error per offending field instead of stopping
//! at the first problem, so a client can fix everything in one round
//! trip. A spec/cleaned-payload is only produced when no errors were
//! recorded.

use serde::Deserialize;

use super::model::{ScheduleSpec, TimeOfDay, VALID_WEEKDAYS};

pub const MAX_TITLE_LENGTH: usize = 100;
pub const MAX_STEPS: usize = 20;
pub const MAX_STEP_LENGTH: usize = 200;

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// Untrusted input shapes
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

/// An untrusted schedule submission: `{ type, time?, days?, expression? }`.
#[derive(Clone, Debug, Default, Deserialize)]
pub struct ScheduleInput {
    #[serde(rename = "type")]
    pub kind: Option<String>,
    pub time: Option<String>,
    pub days: Option<Vec<String>>,
    pub expression: Option<String>,
}

/// An untrusted routine create/update payload.
#[derive(Clone, Debug, Default, Deserialize)]
pub struct RoutineInput {
    pub title: Option<String>,
    pub steps: Option<Vec<String>>,
    pub timezone: Option<String>,
    pub when: Option<ScheduleInput>,
}

/// The cleaned result of routine validation. In update mode, `None`
/// means "leave unchanged"; in create mode every field is populated
/// (with defaults where the payload omitted them) unless it errored.
#[derive(Clone, Debug, Default)]
pub struct CleanRoutine {
    pub title: Option<String>,
    pub steps: Option<Vec<String>>,
    pub timezone: Option<String>,
    pub when: Option<ScheduleSpec>,
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// Schedule validation
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

/// Validate a schedule submission into a canonical [`ScheduleSpec`].
///
/// An invalid or missing `type` is a single error and suppresses the
/// per-field checks (they would be meaningless without knowing the
/// schedule kind). Otherwise every offending field contributes one
/// error.
pub fn validate_schedule(input: &ScheduleInput) -> (Option<ScheduleSpec>, Vec<String>) {
    let mut errors = Vec::new();

    let kind = match input.kind.as_deref() {
        Some(k @ ("daily" | "weekly" | "cron")) => k,
        _ => {
            return (
                None,
                vec!["when.type must be 'daily', 'weekly', or 'cron'".into()],
            )
        }
    };

    let mut time = None;
    if kind == "daily" || kind == "weekly" {
        let raw = input.time.as_deref().unwrap_or("07:00");
        match raw.parse::<TimeOfDay>() {
            Ok(t) => time = Some(t),
            Err(e) => errors.push(format!("when.time: {e}")),
        }
    }

    let mut days = None;
    if kind == "weekly" {
        let supplied = input
            .days
            .clone()
            .unwrap_or_else(|| vec!["MON".to_string()]);
        if supplied.is_empty() {
            errors.push("when.days must be a non-empty array for weekly schedules".into());
        } else {
            let invalid: Vec<&str> = supplied
                .iter()
                .map(String::as_str)
                .filter(|d| !VALID_WEEKDAYS.contains(d))
                .collect();
            if invalid.is_empty() {
                days = Some(supplied);
            } else {
                errors.push(format!(
                    "Invalid days: {}. Valid options: {}",
                    invalid.join(", "),
                    VALID_WEEKDAYS.join(", ")
                ));
            }
        }
    }

    let mut expression = None;
    if kind == "cron" {
        match input.expression.as_deref().map(str::trim) {
            Some(e) if !e.is_empty() => expression = Some(e.to_string()),
            _ => errors.push("when.expression is required for cron schedules".into()),
        }
    }

    if !errors.is_empty() {
        return (None, errors);
    }

    let spec = match (kind, time, days, expression) {
        ("daily", Some(time), _, _) => ScheduleSpec::Daily { time },
        ("weekly", Some(time), Some(days), _) => ScheduleSpec::Weekly { time, days },
        ("cron", _, _, Some(expression)) => ScheduleSpec::Cron { expression },
        _ => return (None, vec!["when.type must be 'daily', 'weekly', or 'cron'".into()]),
    };
    (Some(spec), Vec::new())
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// Routine validation
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

/// Validate a routine payload.
///
/// `is_update = false` (create): `title` is required, `steps` defaults
/// to empty, `when` defaults to daily at 07:00.
/// `is_update = true`: an absent field means "leave unchanged"; a
/// present `when` is fully re-validated under the creation rules.
pub fn validate_routine(input: &RoutineInput, is_update: bool) -> (CleanRoutine, Vec<String>) {
    let mut errors = Vec::new();
    let mut clean = CleanRoutine::default();

    // Title
    match input.title.as_deref().map(str::trim) {
        Some(t) if !t.is_empty() => {
            if t.chars().count() > MAX_TITLE_LENGTH {
                errors.push(format!("title must be {MAX_TITLE_LENGTH} characters or less"));
            } else {
                clean.title = Some(t.to_string());
            }
        }
        _ if !is_update => {
            errors.push("title is required and must be a non-empty string".into());
        }
        _ => {}
    }

    // Steps
    match &input.steps {
        Some(steps) => {
            if steps.len() > MAX_STEPS {
                errors.push(format!("Maximum {MAX_STEPS} steps allowed"));
            } else {
                let mut cleaned_steps = Vec::with_capacity(steps.len());
                let mut step_errors = false;
                for (i, step) in steps.iter().enumerate() {
                    let trimmed = step.trim();
                    if trimmed.is_empty() {
                        errors.push(format!("Step {} cannot be empty", i + 1));
                        step_errors = true;
                    } else if trimmed.chars().count() > MAX_STEP_LENGTH {
                        errors.push(format!(
                            "Step {} must be {MAX_STEP_LENGTH} characters or less",
                            i + 1
                        ));
                        step_errors = true;
                    } else {
                        cleaned_steps.push(trimmed.to_string());
                    }
                }
                if !step_errors {
                    clean.steps = Some(cleaned_steps);
                }
            }
        }
        None if !is_update => clean.steps = Some(Vec::new()),
        None => {}
    }

    // Timezone
    if let Some(tz) = input.timezone.as_deref().map(str::trim) {
        if tz.is_empty() {
            errors.push("timezone must be a non-empty string".into());
        } else if tz.parse::<chrono_tz::Tz>().is_err() {
            errors.push(format!(
                "timezone: '{tz}' is not an IANA timezone — use names like 'America/New_York' or 'UTC'"
            ));
        } else {
            clean.timezone = Some(tz.to_string());
        }
    }

    // Schedule
    match &input.when {
        Some(when) => {
            let (spec, mut when_errors) = validate_schedule(when);
            if when_errors.is_empty() {
                clean.when = spec;
            } else {
                errors.append(&mut when_errors);
            }
        }
        None if !is_update => {
            clean.when = Some(ScheduleSpec::Daily {
                time: TimeOfDay { hour: 7, minute: 0 },
            });
        }
        None => {}
    }

    (clean, errors)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn weekly_input(time: Option<&str>, days: Option<Vec<&str>>) -> ScheduleInput {
        ScheduleInput {
            kind: Some("weekly".into()),
            time: time.map(String::from),
            days: days.map(|d| d.into_iter().map(String::from).collect()),
            expression: None,
        }
    }

    // ── Schedule validation ──────────────────────────────────────────

    #[test]
    fn missing_type_is_a_single_error() {
        let (spec, errors) = validate_schedule(&ScheduleInput {
            kind: None,
            time: Some("99:99".into()),
            days: Some(vec!["FUNDAY".into()]),
            expression: None,
        });
        assert!(spec.is_none());
        // Per-field checks must not run when the type itself is invalid.
        assert_eq!(errors.len(), 1);
        assert!(errors[0].contains("when.type"));
    }

    #[test]
    fn unknown_type_rejected() {
        let (spec, errors) = validate_schedule(&ScheduleInput {
            kind: Some("hourly".into()),
            ..Default::default()
        });
        assert!(spec.is_none());
        assert_eq!(errors.len(), 1);
    }

    #[test]
    fn daily_defaults_time_to_seven() {
        let (spec, errors) = validate_schedule(&ScheduleInput {
            kind: Some("daily".into()),
            ..Default::default()
        });
        assert!(errors.is_empty());
        assert_eq!(
            spec.unwrap(),
            ScheduleSpec::Daily {
                time: TimeOfDay { hour: 7, minute: 0 }
            }
        );
    }

    #[test]
    fn daily_accepts_unpadded_hour() {
        let (spec, errors) = validate_schedule(&ScheduleInput {
            kind: Some("daily".into()),
            time: Some("7:30".into()),
            ..Default::default()
        });
        assert!(errors.is_empty());
        assert_eq!(
            spec.unwrap(),
            ScheduleSpec::Daily {
                time: TimeOfDay { hour: 7, minute: 30 }
            }
        );
    }

    #[test]
    fn daily_bad_time_names_the_field() {
        let (spec, errors) = validate_schedule(&ScheduleInput {
            kind: Some("daily".into()),
            time: Some("25:00".into()),
            ..Default::default()
        });
        assert!(spec.is_none());
        assert_eq!(errors.len(), 1);
        assert!(errors[0].starts_with("when.time:"));
    }

    #[test]
    fn weekly_defaults_days_to_monday() {
        let (spec, errors) = validate_schedule(&weekly_input(Some("08:00"), None));
        assert!(errors.is_empty());
        assert_eq!(
            spec.unwrap(),
            ScheduleSpec::Weekly {
                time: TimeOfDay { hour: 8, minute: 0 },
                days: vec!["MON".to_string()],
            }
        );
    }

    #[test]
    fn weekly_rejects_empty_days() {
        let (spec, errors) = validate_schedule(&weekly_input(None, Some(vec![])));
        assert!(spec.is_none());
        assert!(errors[0].contains("non-empty"));
    }

    #[test]
    fn weekly_invalid_codes_listed_together_with_valid_set() {
        let (spec, errors) =
            validate_schedule(&weekly_input(None, Some(vec!["FUNDAY", "MON", "CATURDAY"])));
        assert!(spec.is_none());
        assert_eq!(errors.len(), 1);
        assert!(errors[0].contains("FUNDAY, CATURDAY"));
        assert!(errors[0].contains("MON, TUE, WED, THU, FRI, SAT, SUN"));
    }

    #[test]
    fn weekly_collects_time_and_day_errors_together() {
        let (spec, errors) = validate_schedule(&weekly_input(Some("bad"), Some(vec!["FUNDAY"])));
        assert!(spec.is_none());
        assert_eq!(errors.len(), 2);
    }

    #[test]
    fn weekly_preserves_day_order_and_duplicates() {
        let (spec, errors) =
            validate_schedule(&weekly_input(None, Some(vec!["FRI", "MON", "FRI"])));
        assert!(errors.is_empty());
        match spec.unwrap() {
            ScheduleSpec::Weekly { days, .. } => {
                assert_eq!(days, vec!["FRI", "MON", "FRI"]);
            }
            other => panic!("expected weekly, got {other:?}"),
        }
    }

    #[test]
    fn cron_requires_expression() {
        let (spec, errors) = validate_schedule(&ScheduleInput {
            kind: Some("cron".into()),
            ..Default::default()
        });
        assert!(spec.is_none());
        assert!(errors[0].contains("when.expression"));

        let (spec, errors) = validate_schedule(&ScheduleInput {
            kind: Some("cron".into()),
            expression: Some("   ".into()),
            ..Default::default()
        });
        assert!(spec.is_none());
        assert_eq!(errors.len(), 1);
    }

    #[test]
    fn cron_expression_is_trimmed_passthrough() {
        let (spec, errors) = validate_schedule(&ScheduleInput {
            kind: Some("cron".into()),
            expression: Some("  0 12 * * ? *  ".into()),
            ..Default::default()
        });
        assert!(errors.is_empty());
        assert_eq!(
            spec.unwrap(),
            ScheduleSpec::Cron {
                expression: "0 12 * * ? *".into()
            }
        );
    }

    // ── Routine validation ───────────────────────────────────────────

    #[test]
    fn create_requires_title_and_defaults_the_rest() {
        let (clean, errors) = validate_routine(&RoutineInput::default(), false);
        assert_eq!(errors.len(), 1);
        assert!(errors[0].contains("title"));
        assert_eq!(clean.steps, Some(vec![]));
        assert_eq!(
            clean.when,
            Some(ScheduleSpec::Daily {
                time: TimeOfDay { hour: 7, minute: 0 }
            })
        );
    }

    #[test]
    fn create_trims_title_and_steps() {
        let (clean, errors) = validate_routine(
            &RoutineInput {
                title: Some("  Morning Glow  ".into()),
                steps: Some(vec!["  cleanse ".into(), "moisturize".into()]),
                ..Default::default()
            },
            false,
        );
        assert!(errors.is_empty());
        assert_eq!(clean.title.as_deref(), Some("Morning Glow"));
        assert_eq!(
            clean.steps,
            Some(vec!["cleanse".to_string(), "moisturize".to_string()])
        );
    }

    #[test]
    fn title_over_limit_rejected() {
        let (_, errors) = validate_routine(
            &RoutineInput {
                title: Some("x".repeat(101)),
                ..Default::default()
            },
            false,
        );
        assert!(errors.iter().any(|e| e.contains("100 characters")));
    }

    #[test]
    fn too_many_steps_rejected() {
        let (_, errors) = validate_routine(
            &RoutineInput {
                title: Some("t".into()),
                steps: Some(vec!["s".into(); 21]),
                ..Default::default()
            },
            false,
        );
        assert!(errors.iter().any(|e| e.contains("Maximum 20 steps")));
    }

    #[test]
    fn empty_step_named_by_position() {
        let (_, errors) = validate_routine(
            &RoutineInput {
                title: Some("t".into()),
                steps: Some(vec!["ok".into(), "  ".into()]),
                ..Default::default()
            },
            false,
        );
        assert!(errors.iter().any(|e| e.contains("Step 2 cannot be empty")));
    }

    #[test]
    fn bad_timezone_rejected() {
        let (_, errors) = validate_routine(
            &RoutineInput {
                title: Some("t".into()),
                timezone: Some("Not/Real".into()),
                ..Default::default()
            },
            false,
        );
        assert!(errors.iter().any(|e| e.contains("IANA")));
    }

    #[test]
    fn update_leaves_absent_fields_unchanged() {
        let (clean, errors) = validate_routine(&RoutineInput::default(), true);
        assert!(errors.is_empty());
        assert!(clean.title.is_none());
        assert!(clean.steps.is_none());
        assert!(clean.timezone.is_none());
        assert!(clean.when.is_none());
    }

    #[test]
    fn update_revalidates_present_schedule() {
        let (clean, errors) = validate_routine(
            &RoutineInput {
                when: Some(ScheduleInput {
                    kind: Some("weekly".into()),
                    days: Some(vec!["FUNDAY".into()]),
                    ..Default::default()
                }),
                ..Default::default()
            },
            true,
        );
        assert!(clean.when.is_none());
        assert!(errors.iter().any(|e| e.contains("FUNDAY")));
    }
}
