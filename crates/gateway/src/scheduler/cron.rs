//! Six-field cron evaluator (min hour dom month dow year).
//!
//! Evaluates the dialect trigger compilation emits: an optional
//! `cron(...)` wrapper, `?` as a wildcard in the day fields, and
//! weekdays as either names (`MON`) or numbers (1 = SUN through
//! 7 = SAT).

use chrono::{DateTime, Datelike, Timelike, Utc, Weekday};

/// Parse a timezone string into a `chrono_tz::Tz`, falling back to UTC.
pub fn parse_tz(tz: &str) -> chrono_tz::Tz {
    tz.parse::<chrono_tz::Tz>().unwrap_or(chrono_tz::UTC)
}

/// Strip the `cron(...)` wrapper if present.
fn inner_expression(expr: &str) -> &str {
    let trimmed = expr.trim();
    trimmed
        .strip_prefix("cron(")
        .and_then(|rest| rest.strip_suffix(')'))
        .unwrap_or(trimmed)
}

/// Parse a numeric cron field and check if a value matches.
fn field_matches(field: &str, value: u32) -> bool {
    if field == "*" || field == "?" {
        return true;
    }
    if let Some(step) = field.strip_prefix("*/") {
        if let Ok(n) = step.parse::<u32>() {
            return n > 0 && value % n == 0;
        }
    }
    for part in field.split(',') {
        if let Some((start_s, end_s)) = part.split_once('-') {
            if let (Ok(start), Ok(end)) = (start_s.parse::<u32>(), end_s.parse::<u32>()) {
                if value >= start && value <= end {
                    return true;
                }
            }
        } else if let Ok(n) = part.parse::<u32>() {
            if value == n {
                return true;
            }
        }
    }
    false
}

/// Weekday token to its number, 1 = SUN through 7 = SAT.
fn weekday_token(token: &str) -> Option<u32> {
    match token.to_ascii_uppercase().as_str() {
        "SUN" => Some(1),
        "MON" => Some(2),
        "TUE" => Some(3),
        "WED" => Some(4),
        "THU" => Some(5),
        "FRI" => Some(6),
        "SAT" => Some(7),
        other => other.parse().ok(),
    }
}

fn weekday_number(day: Weekday) -> u32 {
    day.num_days_from_sunday() + 1
}

/// Day-of-week field match, accepting names and numbers in lists and
/// ranges.
fn dow_matches(field: &str, day: Weekday) -> bool {
    if field == "*" || field == "?" {
        return true;
    }
    let value = weekday_number(day);
    for part in field.split(',') {
        if let Some((start_s, end_s)) = part.split_once('-') {
            if let (Some(start), Some(end)) = (weekday_token(start_s), weekday_token(end_s)) {
                if value >= start && value <= end {
                    return true;
                }
            }
        } else if weekday_token(part) == Some(value) {
            return true;
        }
    }
    false
}

/// Check if a **local** naive datetime matches a six-field expression.
fn matches_naive(expr: &str, dt: &chrono::NaiveDateTime) -> bool {
    let fields: Vec<&str> = inner_expression(expr).split_whitespace().collect();
    if fields.len() != 6 {
        return false;
    }
    field_matches(fields[0], dt.minute())
        && field_matches(fields[1], dt.hour())
        && field_matches(fields[2], dt.day())
        && field_matches(fields[3], dt.month())
        && dow_matches(fields[4], dt.weekday())
        && field_matches(fields[5], dt.year().unsigned_abs())
}

/// Check if a UTC instant matches the expression evaluated in `tz`.
pub fn matches_at(expr: &str, at: &DateTime<Utc>, tz: chrono_tz::Tz) -> bool {
    matches_naive(expr, &at.with_timezone(&tz).naive_local())
}
