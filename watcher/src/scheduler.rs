//! Cron-driven loop running the flag check.
//!
//! Expressions use the six-field form of the `cron` crate
//! (`sec min hour dom month dow`). The daylight window lives in the hour
//! field, e.g. `15 */5 7-21 * * *`.

use crate::logging;
use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use chrono_tz::Tz;
use cron::Schedule;
use futures::FutureExt;
use std::future::Future;
use std::panic::AssertUnwindSafe;
use std::str::FromStr;

pub const DEFAULT_SCHEDULE: &str = "15 */5 7-21 * * *";
pub const DEFAULT_TIMEZONE: Tz = chrono_tz::America::New_York;

pub struct Scheduler {
    schedule: Schedule,
    timezone: Tz,
}

impl Scheduler {
    pub fn new(expr: &str, timezone: Tz) -> Result<Self> {
        let normalized = normalize_cron_expr(expr);
        let schedule = Schedule::from_str(&normalized)
            .with_context(|| format!("invalid cron expression '{expr}'"))?;
        Ok(Self { schedule, timezone })
    }

    /// Next fire time strictly after `after`.
    pub fn next_after(&self, after: DateTime<Utc>) -> Option<DateTime<Tz>> {
        let local = after.with_timezone(&self.timezone);
        self.schedule.after(&local).next()
    }

    /// Runs `job` on every fire time. Each run is awaited before the next
    /// fire time is computed, so runs never overlap.
    pub async fn run<F, Fut>(&self, mut job: F)
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = ()>,
    {
        loop {
            let now = Utc::now();
            let Some(next) = self.next_after(now) else {
                logging::Logger::new()
                    .info("scheduler.exhausted", "Schedule has no further fire times");
                return;
            };
            logging::Logger::new().debug("scheduler.next", &format!("Next check at {next}"));

            let wait = (next.with_timezone(&Utc) - now).to_std().unwrap_or_default();
            tokio::time::sleep(wait).await;
            run_guarded(job()).await;
        }
    }
}

/// Awaits one tick, turning a panic into a log line.
pub async fn run_guarded<Fut>(tick: Fut) -> bool
where
    Fut: Future<Output = ()>,
{
    match AssertUnwindSafe(tick).catch_unwind().await {
        Ok(()) => true,
        Err(panic) => {
            let reason = panic
                .downcast_ref::<&str>()
                .map(|s| s.to_string())
                .or_else(|| panic.downcast_ref::<String>().cloned())
                .unwrap_or_else(|| "unknown panic".to_string());
            logging::Logger::new()
                .error_text(reason)
                .warn("tick.panicked", "Flag check panicked, waiting for next tick");
            false
        }
    }
}

/// Standard five-field expressions get a leading `0` seconds field.
fn normalize_cron_expr(expr: &str) -> String {
    let trimmed = expr.trim();
    if trimmed.split_whitespace().count() == 5 {
        format!("0 {trimmed}")
    } else {
        trimmed.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn at(tz: Tz, y: i32, m: u32, d: u32, h: u32, min: u32, s: u32) -> DateTime<Utc> {
        tz.with_ymd_and_hms(y, m, d, h, min, s)
            .unwrap()
            .with_timezone(&Utc)
    }

    #[test]
    fn default_schedule_fires_fifteen_seconds_past_every_fifth_minute() {
        let scheduler = Scheduler::new(DEFAULT_SCHEDULE, DEFAULT_TIMEZONE).unwrap();
        let tz = DEFAULT_TIMEZONE;

        let next = scheduler.next_after(at(tz, 2021, 6, 28, 17, 3, 0)).unwrap();
        assert_eq!(next, tz.with_ymd_and_hms(2021, 6, 28, 17, 5, 15).unwrap());

        let next = scheduler.next_after(at(tz, 2021, 6, 28, 17, 5, 15)).unwrap();
        assert_eq!(next, tz.with_ymd_and_hms(2021, 6, 28, 17, 10, 15).unwrap());
    }

    #[test]
    fn default_schedule_sleeps_through_the_night() {
        let scheduler = Scheduler::new(DEFAULT_SCHEDULE, DEFAULT_TIMEZONE).unwrap();
        let tz = DEFAULT_TIMEZONE;

        let next = scheduler.next_after(at(tz, 2021, 6, 28, 21, 55, 15)).unwrap();
        assert_eq!(next, tz.with_ymd_and_hms(2021, 6, 29, 7, 0, 15).unwrap());
    }

    #[test]
    fn five_field_expressions_are_accepted() {
        assert_eq!(normalize_cron_expr(" */5 7-21 * * * "), "0 */5 7-21 * * *");
        assert_eq!(normalize_cron_expr(DEFAULT_SCHEDULE), DEFAULT_SCHEDULE);

        let scheduler = Scheduler::new("*/5 7-21 * * *", chrono_tz::UTC).unwrap();
        let next = scheduler
            .next_after(at(chrono_tz::UTC, 2021, 6, 28, 12, 1, 0))
            .unwrap();
        assert_eq!(
            next,
            chrono_tz::UTC.with_ymd_and_hms(2021, 6, 28, 12, 5, 0).unwrap()
        );
    }

    #[test]
    fn invalid_expression_is_rejected() {
        let err = Scheduler::new("every five minutes", DEFAULT_TIMEZONE)
            .err()
            .unwrap();
        assert!(err.to_string().contains("invalid cron expression"));
    }

    #[tokio::test]
    async fn run_guarded_survives_panicking_tick() {
        let survived = run_guarded(async {
            if true {
                panic!("boom");
            }
        })
        .await;
        assert!(!survived);
        assert!(run_guarded(async {}).await);
    }
}
