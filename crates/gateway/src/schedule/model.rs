//! Canonical schedule model — the validated form stored on every routine.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Deserializer, Serialize, Serializer};

/// Weekday codes accepted in weekly schedules, in calendar order.
pub const VALID_WEEKDAYS: [&str; 7] = ["MON", "TUE", "WED", "THU", "FRI", "SAT", "SUN"];

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// Time of day
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

/// A wall-clock time, serialized as `"HH:MM"`.
///
/// Parsing accepts a single-digit hour (`7:00` and `07:00` both mean
/// hour 7); serialization is always zero-padded.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct TimeOfDay {
    pub hour: u8,
    pub minute: u8,
}

impl FromStr for TimeOfDay {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (h, m) = s
            .split_once(':')
            .ok_or_else(|| "Time must be in HH:MM format (00:00-23:59)".to_string())?;
        let hour_ok = matches!(h.len(), 1 | 2) && h.bytes().all(|b| b.is_ascii_digit());
        let minute_ok = m.len() == 2 && m.bytes().all(|b| b.is_ascii_digit());
        if !hour_ok || !minute_ok {
            return Err("Time must be in HH:MM format (00:00-23:59)".into());
        }
        let hour: u8 = h.parse().map_err(|_| "Time must be in HH:MM format (00:00-23:59)".to_string())?;
        let minute: u8 = m.parse().map_err(|_| "Time must be in HH:MM format (00:00-23:59)".to_string())?;
        if hour > 23 || minute > 59 {
            return Err("Time must be in HH:MM format (00:00-23:59)".into());
        }
        Ok(Self { hour, minute })
    }
}

impl fmt::Display for TimeOfDay {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:02}:{:02}", self.hour, self.minute)
    }
}

impl Serialize for TimeOfDay {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_string())
    }
}

impl<'de> Deserialize<'de> for TimeOfDay {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        s.parse().map_err(serde::de::Error::custom)
    }
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// Schedule spec
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

/// Canonical, validated recurrence description.
///
/// Exactly the fields relevant to each variant exist — a daily schedule
/// cannot carry days, a cron schedule cannot carry a time. Construction
/// goes through [`crate::schedule::validation::validate_schedule`];
/// nothing else builds these from untrusted input.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum ScheduleSpec {
    Daily {
        time: TimeOfDay,
    },
    Weekly {
        time: TimeOfDay,
        days: Vec<String>,
    },
    Cron {
        expression: String,
    },
}
