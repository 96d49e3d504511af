use crate::{logging, pushover::PushService, weather::WeatherSource};
use anyhow::{Context, Result};
use flagwatch_core::{FlagColor, Notification, WeatherReport};
use flagwatch_store::{COLOR_KEY, StateStore};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NotifyOutcome {
    /// Same color as the last delivered one, nothing sent.
    Unchanged,
    /// Delivered and stored.
    Delivered,
    /// Delivery failed, state left as is so the next tick retries.
    DeliveryFailed,
}

pub struct Notifier<S, W, P> {
    store: S,
    weather: W,
    push: P,
}

impl<S, W, P> Notifier<S, W, P>
where
    S: StateStore,
    W: WeatherSource,
    P: PushService,
{
    pub fn new(store: S, weather: W, push: P) -> Self {
        Self {
            store,
            weather,
            push,
        }
    }

    pub async fn notify(&self, color: &FlagColor) -> Result<NotifyOutcome> {
        let label = color.label();
        let previous = self
            .store
            .get(COLOR_KEY)
            .await
            .context("read last notified color")?;
        let logger = logging::Logger::new()
            .color(&label)
            .previous_color(previous.as_deref());

        if previous.as_deref() == Some(label.as_str()) {
            logger.info("notify.unchanged", "Flag color unchanged");
            return Ok(NotifyOutcome::Unchanged);
        }

        logger.info("notify.changed", "New flag color");
        let weather = self.weather.current_weather().await;
        let notification = compose_notification(color, &weather);

        if let Err(err) = self.push.send(&notification).await {
            logger.error(
                "notify.delivery_failed",
                &err,
                "Push delivery failed, retrying next tick",
            );
            return Ok(NotifyOutcome::DeliveryFailed);
        }

        self.store
            .set(COLOR_KEY, &label)
            .await
            .context("store last notified color")?;
        logger.info("notify.delivered", "Notification delivered");
        Ok(NotifyOutcome::Delivered)
    }
}

pub fn compose_notification(color: &FlagColor, weather: &WeatherReport) -> Notification {
    let mut message = format!(
        "Wind: {}; Temp: {}",
        weather.wind().unwrap_or_default(),
        weather.outside_temperature().unwrap_or_default()
    );
    if let Some(observed_at) = weather.observed_at() {
        message.push_str(&format!(" (as of {observed_at})"));
    }

    Notification {
        title: format!("Community Boating Flag: {color}"),
        message,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use anyhow::anyhow;
    use std::collections::HashMap;
    use std::sync::Mutex;
    use std::sync::atomic::{AtomicBool, Ordering};

    #[derive(Default)]
    struct MemoryStore {
        entries: Mutex<HashMap<String, String>>,
    }

    impl MemoryStore {
        fn with_color(color: &str) -> Self {
            let store = Self::default();
            store
                .entries
                .lock()
                .unwrap()
                .insert(COLOR_KEY.to_string(), color.to_string());
            store
        }

        fn color(&self) -> Option<String> {
            self.entries.lock().unwrap().get(COLOR_KEY).cloned()
        }
    }

    impl StateStore for &MemoryStore {
        async fn get(&self, key: &str) -> Result<Option<String>> {
            Ok(self.entries.lock().unwrap().get(key).cloned())
        }

        async fn set(&self, key: &str, value: &str) -> Result<()> {
            self.entries
                .lock()
                .unwrap()
                .insert(key.to_string(), value.to_string());
            Ok(())
        }
    }

    struct FixedWeather(WeatherReport);

    impl WeatherSource for FixedWeather {
        async fn current_weather(&self) -> WeatherReport {
            self.0.clone()
        }
    }

    #[derive(Default)]
    struct RecordingPush {
        sent: Mutex<Vec<Notification>>,
        failing: AtomicBool,
    }

    impl RecordingPush {
        fn sent(&self) -> Vec<Notification> {
            self.sent.lock().unwrap().clone()
        }
    }

    impl PushService for &RecordingPush {
        async fn send(&self, notification: &Notification) -> Result<()> {
            self.sent.lock().unwrap().push(notification.clone());
            if self.failing.load(Ordering::SeqCst) {
                return Err(anyhow!("push service unavailable"));
            }
            Ok(())
        }
    }

    fn current_weather() -> FixedWeather {
        let mut report = WeatherReport::new();
        report.insert("Wind", "12 mph from 225°");
        report.insert("Outside Temperature", "91.7°F");
        FixedWeather(report)
    }

    #[tokio::test]
    async fn changed_color_is_delivered_and_stored() {
        let store = MemoryStore::with_color("Yellow");
        let push = RecordingPush::default();
        let notifier = Notifier::new(&store, current_weather(), &push);

        let outcome = notifier.notify(&FlagColor::from_code("G")).await.unwrap();

        assert_eq!(outcome, NotifyOutcome::Delivered);
        let sent = push.sent();
        assert_eq!(sent.len(), 1);
        assert!(sent[0].title.contains("Green"));
        assert!(sent[0].message.contains("12 mph from 225°"));
        assert!(sent[0].message.contains("91.7°F"));
        assert_eq!(store.color(), Some("Green".to_string()));
    }

    #[tokio::test]
    async fn unchanged_color_sends_nothing() {
        let store = MemoryStore::with_color("Green");
        let push = RecordingPush::default();
        let notifier = Notifier::new(&store, current_weather(), &push);

        let outcome = notifier.notify(&FlagColor::from_code("G")).await.unwrap();

        assert_eq!(outcome, NotifyOutcome::Unchanged);
        assert!(push.sent().is_empty());
        assert_eq!(store.color(), Some("Green".to_string()));
    }

    #[tokio::test]
    async fn repeated_color_is_delivered_once() {
        let store = MemoryStore::default();
        let push = RecordingPush::default();
        let notifier = Notifier::new(&store, current_weather(), &push);

        let first = notifier.notify(&FlagColor::Red).await.unwrap();
        let second = notifier.notify(&FlagColor::Red).await.unwrap();

        assert_eq!(first, NotifyOutcome::Delivered);
        assert_eq!(second, NotifyOutcome::Unchanged);
        assert_eq!(push.sent().len(), 1);
    }

    #[tokio::test]
    async fn failed_delivery_is_retried_until_success() {
        let store = MemoryStore::with_color("Yellow");
        let push = RecordingPush::default();
        push.failing.store(true, Ordering::SeqCst);
        let notifier = Notifier::new(&store, current_weather(), &push);

        let first = notifier.notify(&FlagColor::Closed).await.unwrap();
        let second = notifier.notify(&FlagColor::Closed).await.unwrap();
        assert_eq!(first, NotifyOutcome::DeliveryFailed);
        assert_eq!(second, NotifyOutcome::DeliveryFailed);
        assert_eq!(store.color(), Some("Yellow".to_string()));

        push.failing.store(false, Ordering::SeqCst);
        let third = notifier.notify(&FlagColor::Closed).await.unwrap();
        assert_eq!(third, NotifyOutcome::Delivered);
        assert_eq!(push.sent().len(), 3);
        assert_eq!(store.color(), Some("Closed".to_string()));
    }

    #[tokio::test]
    async fn missing_weather_does_not_block_notification() {
        let store = MemoryStore::default();
        let push = RecordingPush::default();
        let notifier = Notifier::new(&store, FixedWeather(WeatherReport::new()), &push);

        let outcome = notifier
            .notify(&FlagColor::from_code("Q"))
            .await
            .unwrap();

        assert_eq!(outcome, NotifyOutcome::Delivered);
        assert_eq!(
            push.sent(),
            vec![Notification {
                title: "Community Boating Flag: ? (Q)".to_string(),
                message: "Wind: ; Temp: ".to_string(),
            }]
        );
        assert_eq!(store.color(), Some("? (Q)".to_string()));
    }

    #[test]
    fn compose_notification_appends_observation_time() {
        let mut weather = WeatherReport::new();
        weather.insert("Wind", "3 mph from 90°");
        weather.insert("Time", "28.06.2021 17:05");

        let notification = compose_notification(&FlagColor::Yellow, &weather);

        assert_eq!(notification.title, "Community Boating Flag: Yellow");
        assert_eq!(
            notification.message,
            "Wind: 3 mph from 90°; Temp:  (as of 28.06.2021 17:05)"
        );
    }
}
