use crate::{flag, pushover, scheduler, weather};
use anyhow::{Context, Result, anyhow};
use chrono_tz::Tz;
use std::path::PathBuf;
use std::time::Duration;

const DEFAULT_HTTP_TIMEOUT_SECS: u64 = 10;
const DEFAULT_STATE_PATH: &str = ".flagwatch/state.json";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StateConfig {
    File(PathBuf),
    DynamoDb { table_name: String },
}

#[derive(Debug, Clone)]
pub struct Config {
    pub flag_url: String,
    pub weather_feed_url: String,
    pub pushover_api_url: String,
    pub pushover_user: String,
    pub pushover_token: String,
    pub schedule: String,
    pub timezone: Tz,
    pub http_timeout: Duration,
    pub state: StateConfig,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Builds the configuration from `lookup`; blank values count as unset.
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |name: &str| {
            lookup(name)
                .map(|value| value.trim().to_string())
                .filter(|value| !value.is_empty())
        };
        let required = |name: &str| get(name).ok_or_else(|| anyhow!("Missing env var: {name}"));

        let pushover_user = required("PUSHOVER_USER")?;
        let pushover_token = required("PUSHOVER_TOKEN")?;

        let timezone = match get("FLAG_TIMEZONE") {
            Some(name) => name
                .parse::<Tz>()
                .map_err(|err| anyhow!("Invalid FLAG_TIMEZONE '{name}': {err}"))?,
            None => scheduler::DEFAULT_TIMEZONE,
        };

        let http_timeout = match get("HTTP_TIMEOUT_SECS") {
            Some(secs) => Duration::from_secs(
                secs.parse::<u64>()
                    .with_context(|| format!("Invalid HTTP_TIMEOUT_SECS '{secs}'"))?,
            ),
            None => Duration::from_secs(DEFAULT_HTTP_TIMEOUT_SECS),
        };

        let state = match get("STATE_TABLE_NAME") {
            Some(table_name) => StateConfig::DynamoDb { table_name },
            None => StateConfig::File(PathBuf::from(
                get("STATE_PATH").unwrap_or_else(|| DEFAULT_STATE_PATH.to_string()),
            )),
        };

        Ok(Self {
            flag_url: get("FLAG_URL").unwrap_or_else(|| flag::DEFAULT_FLAG_URL.to_string()),
            weather_feed_url: get("WEATHER_FEED_URL")
                .unwrap_or_else(|| weather::DEFAULT_FEED_URL.to_string()),
            pushover_api_url: get("PUSHOVER_API_URL")
                .unwrap_or_else(|| pushover::DEFAULT_API_URL.to_string()),
            pushover_user,
            pushover_token,
            schedule: get("FLAG_SCHEDULE")
                .unwrap_or_else(|| scheduler::DEFAULT_SCHEDULE.to_string()),
            timezone,
            http_timeout,
            state,
        })
    }
}
