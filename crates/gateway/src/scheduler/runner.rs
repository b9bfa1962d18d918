//! Reminder runner — ticks once a minute, evaluates every registered
//! trigger against the current minute in its own timezone, and hands
//! matches to the notifier.

use std::sync::Arc;

use chrono::{DateTime, DurationRound, Utc};

use crate::notify::{Notifier, Reminder};
use crate::scheduler::{cron, TriggerScheduler};

/// Evaluate all triggers for one minute and publish the matches.
/// Delivery failures are logged per trigger; one bad trigger never
/// blocks the rest.
pub async fn run_tick(
    scheduler: &dyn TriggerScheduler,
    notifier: &dyn Notifier,
    minute: DateTime<Utc>,
) -> usize {
    let mut fired = 0;
    for trigger in scheduler.list().await {
        let tz = cron::parse_tz(&trigger.expression.timezone);
        if !cron::matches_at(&trigger.expression.expression, &minute, tz) {
            continue;
        }
        let reminder = Reminder::for_routine(&trigger.payload);
        match notifier.publish(&reminder).await {
            Ok(()) => {
                fired += 1;
                tracing::info!(
                    trigger = %trigger.name,
                    user_id = %trigger.payload.user_id,
                    "reminder published"
                );
            }
            Err(e) => {
                tracing::warn!(trigger = %trigger.name, error = %e, "reminder delivery failed");
            }
        }
    }
    fired
}

/// Tick loop. Each trigger fires at most once per wall-clock minute
/// even when the tick interval is shorter than a minute.
pub async fn run_loop(
    scheduler: Arc<dyn TriggerScheduler>,
    notifier: Arc<dyn Notifier>,
    tick_interval_secs: u64,
) {
    let mut interval = tokio::time::interval(std::time::Duration::from_secs(tick_interval_secs));
    interval.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Skip);
    let mut last_minute: Option<DateTime<Utc>> = None;

    tracing::info!(tick_interval_secs, "reminder runner started");
    loop {
        interval.tick().await;
        let minute = match Utc::now().duration_trunc(chrono::Duration::minutes(1)) {
            Ok(m) => m,
            Err(e) => {
                tracing::warn!(error = %e, "failed to truncate tick to minute");
                continue;
            }
        };
        if last_minute == Some(minute) {
            continue;
        }
        last_minute = Some(minute);
        run_tick(scheduler.as_ref(), notifier.as_ref(), minute).await;
    }
}
