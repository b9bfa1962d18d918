//! Compiles a [`ScheduleSpec`] into the scheduler's trigger expression.

use serde::{Deserialize, Serialize};
use sg_domain::{Error, Result};

use super::model::ScheduleSpec;

/// A compiled trigger: a six-field cron expression wrapped in `cron(...)`
/// plus the IANA timezone it evaluates in.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct TriggerExpression {
    pub expression: String,
    pub timezone: String,
}

/// The message delivered when a trigger fires.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReminderPayload {
    pub kind: String,
    pub user_id: String,
    pub routine_id: String,
    pub title: String,
    pub steps: Vec<String>,
}

impl ReminderPayload {
    pub fn new(user_id: &str, routine_id: &str, title: &str, steps: &[String]) -> Self {
        Self {
            kind: "routine.reminder".to_string(),
            user_id: user_id.to_string(),
            routine_id: routine_id.to_string(),
            title: title.to_string(),
            steps: steps.to_vec(),
        }
    }
}

/// Compile a validated schedule into a trigger expression.
///
/// Field order is minute, hour, day-of-month, month, day-of-week, year.
/// Daily schedules fire every day; weekly schedules name their days in
/// submission order. Compilation is pure and deterministic.
///
/// A weekly spec with no days or a cron spec with an empty expression
/// cannot come out of validation; hitting one here is a defect and
/// reports as [`Error::Internal`].
pub fn compile(spec: &ScheduleSpec, timezone: &str) -> Result<TriggerExpression> {
    let expression = match spec {
        ScheduleSpec::Daily { time } => {
            format!("cron({} {} * * ? *)", time.minute, time.hour)
        }
        ScheduleSpec::Weekly { time, days } => {
            if days.is_empty() {
                return Err(Error::Internal(
                    "weekly schedule compiled with no days".to_string(),
                ));
            }
            format!("cron({} {} ? * {} *)", time.minute, time.hour, days.join(","))
        }
        ScheduleSpec::Cron { expression } => {
            if expression.is_empty() {
                return Err(Error::Internal(
                    "cron schedule compiled with empty expression".to_string(),
                ));
            }
            expression.clone()
        }
    };
    Ok(TriggerExpression {
        expression,
        timezone: timezone.to_string(),
    })
}

/// Deterministic trigger name for a user/routine pair. Both ids are
/// shortened to their first eight characters, so the name stays within
/// scheduler limits while remaining unique per pair in practice.
pub fn trigger_name(user_id: &str, routine_id: &str) -> String {
    let short = |s: &str| s.chars().take(8).collect::<String>();
    format!("sheglow-{}-{}", short(user_id), short(routine_id))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schedule::model::TimeOfDay;

    fn at(hour: u8, minute: u8) -> TimeOfDay {
        TimeOfDay { hour, minute }
    }

    #[test]
    fn daily_compiles_to_every_day_cron() {
        let t = compile(&ScheduleSpec::Daily { time: at(7, 30) }, "America/New_York").unwrap();
        assert_eq!(t.expression, "cron(30 7 * * ? *)");
        assert_eq!(t.timezone, "America/New_York");
    }

    #[test]
    fn daily_midnight_uses_unpadded_fields() {
        let t = compile(&ScheduleSpec::Daily { time: at(0, 0) }, "UTC").unwrap();
        assert_eq!(t.expression, "cron(0 0 * * ? *)");
    }

    #[test]
    fn weekly_joins_days_in_submission_order() {
        let spec = ScheduleSpec::Weekly {
            time: at(21, 15),
            days: vec!["FRI".into(), "MON".into()],
        };
        let t = compile(&spec, "Europe/Paris").unwrap();
        assert_eq!(t.expression, "cron(15 21 ? * FRI,MON *)");
    }

    #[test]
    fn weekly_single_day() {
        let spec = ScheduleSpec::Weekly {
            time: at(8, 0),
            days: vec!["SUN".into()],
        };
        let t = compile(&spec, "UTC").unwrap();
        assert_eq!(t.expression, "cron(0 8 ? * SUN *)");
    }

    #[test]
    fn cron_passes_through_verbatim() {
        let spec = ScheduleSpec::Cron {
            expression: "cron(0 12 1 * ? *)".into(),
        };
        let t = compile(&spec, "UTC").unwrap();
        assert_eq!(t.expression, "cron(0 12 1 * ? *)");
    }

    #[test]
    fn compile_is_deterministic() {
        let spec = ScheduleSpec::Weekly {
            time: at(6, 45),
            days: vec!["TUE".into(), "THU".into()],
        };
        let a = compile(&spec, "Asia/Tokyo").unwrap();
        let b = compile(&spec, "Asia/Tokyo").unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn degenerate_specs_are_internal_errors() {
        let empty_days = ScheduleSpec::Weekly {
            time: at(7, 0),
            days: vec![],
        };
        assert!(matches!(
            compile(&empty_days, "UTC"),
            Err(sg_domain::Error::Internal(_))
        ));

        let empty_expr = ScheduleSpec::Cron {
            expression: String::new(),
        };
        assert!(matches!(
            compile(&empty_expr, "UTC"),
            Err(sg_domain::Error::Internal(_))
        ));
    }

    #[test]
    fn trigger_name_truncates_both_ids() {
        assert_eq!(
            trigger_name("1234567890abcdef", "fedcba0987654321"),
            "sheglow-12345678-fedcba09"
        );
        assert_eq!(trigger_name("u1", "r1"), "sheglow-u1-r1");
    }

    #[test]
    fn trigger_name_is_stable() {
        let a = trigger_name("user-aaaa-bbbb", "routine-cccc");
        let b = trigger_name("user-aaaa-bbbb", "routine-cccc");
        assert_eq!(a, b);
    }

    #[test]
    fn payload_serializes_camel_case() {
        let p = ReminderPayload::new("u1", "r1", "Evening", &["cleanse".into()]);
        let json = serde_json::to_value(&p).unwrap();
        assert_eq!(json["kind"], "routine.reminder");
        assert_eq!(json["userId"], "u1");
        assert_eq!(json["routineId"], "r1");
        assert_eq!(json["steps"][0], "cleanse");
    }
}
