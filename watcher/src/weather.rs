use crate::logging;
use anyhow::{Context, Result};
use flagwatch_core::WeatherReport;
use regex::Regex;
use reqwest::Client as HTTPClient;
use rss::Channel;
use std::future::Future;
use std::sync::LazyLock;

pub const DEFAULT_FEED_URL: &str = "http://sailing.mit.edu/weather/weewx_rss.xml";
const CONDITIONS_TITLE_PREFIX: &str = "Weather Conditions";

static LINE_BREAK_TAG: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)<br\s*/?>|</(?:p|div|li|tr|h[1-6])\s*>").expect("line break regex is valid")
});
static ANY_TAG: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"<[^>]*>").expect("tag regex is valid"));
static NUMERIC_ENTITY: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"&#(?:[xX]([0-9a-fA-F]{1,6})|([0-9]{1,7}));").expect("entity regex is valid")
});

/// One feed entry reduced to its title and plain-text body.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FeedItem {
    pub title: String,
    pub text: String,
}

pub trait WeatherSource {
    /// Best-effort report: failures yield an empty report.
    fn current_weather(&self) -> impl Future<Output = WeatherReport> + Send;
}

pub struct FeedWeather {
    http_client: HTTPClient,
    url: String,
}

impl FeedWeather {
    pub fn new(http_client: HTTPClient, url: impl Into<String>) -> Self {
        Self {
            http_client,
            url: url.into(),
        }
    }
}

impl WeatherSource for FeedWeather {
    async fn current_weather(&self) -> WeatherReport {
        match fetch_feed(&self.http_client, &self.url).await {
            Ok(items) => {
                let report = extract_weather(&items);
                let summary = report
                    .iter()
                    .map(|(name, value)| format!("{name}: {value}"))
                    .collect::<Vec<_>>()
                    .join("; ");
                logging::Logger::new()
                    .url(&self.url)
                    .debug("weather.extracted", &summary);
                report
            }
            Err(err) => {
                logging::Logger::new().url(&self.url).error(
                    "weather.fetch_failed",
                    &err,
                    "Weather feed unavailable, notifying without it",
                );
                WeatherReport::new()
            }
        }
    }
}

/// Fetches and parses the RSS feed.
pub async fn fetch_feed(client: &HTTPClient, url: &str) -> Result<Vec<FeedItem>> {
    let response = client.get(url).send().await?;
    response.error_for_status_ref()?;
    let bytes = response.bytes().await?;
    let channel = Channel::read_from(&bytes[..]).context("parse weather feed")?;

    let items = channel
        .items()
        .iter()
        .map(|item| FeedItem {
            title: item.title().unwrap_or_default().to_string(),
            text: item
                .content()
                .or_else(|| item.description())
                .map(html_to_text)
                .unwrap_or_default(),
        })
        .collect();
    Ok(items)
}

/// Builds a report from the conditions item(s) of the feed.
///
/// Each `Name: Value` line becomes a field, split on the first colon. Items
/// are read in feed order so later values win.
pub fn extract_weather(items: &[FeedItem]) -> WeatherReport {
    let mut report = WeatherReport::new();
    for item in items
        .iter()
        .filter(|item| item.title.starts_with(CONDITIONS_TITLE_PREFIX))
    {
        for line in item.text.lines() {
            if let Some((name, value)) = line.split_once(':') {
                report.insert(name.trim(), value.trim());
            }
        }
    }
    report
}

/// Turns the HTML body of a feed item into plain text lines.
pub fn html_to_text(html: &str) -> String {
    let with_breaks = LINE_BREAK_TAG.replace_all(html, "\n");
    let stripped = ANY_TAG.replace_all(&with_breaks, "");
    let decoded = decode_entities(&stripped);

    decoded
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .collect::<Vec<_>>()
        .join("\n")
}

fn decode_entities(text: &str) -> String {
    let numeric = NUMERIC_ENTITY.replace_all(text, |captures: &regex::Captures<'_>| {
        let code = match (captures.get(1), captures.get(2)) {
            (Some(hex), _) => u32::from_str_radix(hex.as_str(), 16).ok(),
            (_, Some(dec)) => dec.as_str().parse::<u32>().ok(),
            _ => None,
        };
        match code.and_then(char::from_u32) {
            // Non-breaking spaces read as plain spaces in a push message.
            Some('\u{a0}') => " ".to_string(),
            Some(ch) => ch.to_string(),
            None => captures[0].to_string(),
        }
    });

    numeric
        .replace("&nbsp;", " ")
        .replace("&deg;", "°")
        .replace("&lt;", "<")
        .replace("&gt;", ">")
        .replace("&quot;", "\"")
        .replace("&apos;", "'")
        .replace("&amp;", "&")
}
