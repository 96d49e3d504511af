use crate::logging;
use anyhow::{Result, anyhow};
use flagwatch_core::Notification;
use reqwest::Client as HTTPClient;
use serde::{Deserialize, Serialize};
use std::future::Future;

pub const DEFAULT_API_URL: &str = "https://api.pushover.net/1/messages.json";

pub trait PushService {
    /// Resolves once the service has accepted the message.
    fn send(&self, notification: &Notification) -> impl Future<Output = Result<()>> + Send;
}

pub struct Pushover {
    http_client: HTTPClient,
    api_url: String,
    user: String,
    token: String,
}

#[derive(Serialize)]
struct MessageRequest<'a> {
    token: &'a str,
    user: &'a str,
    title: &'a str,
    message: &'a str,
}

#[derive(Debug, Default, Deserialize)]
struct MessageResponse {
    #[serde(default)]
    status: i64,
    #[serde(default)]
    request: Option<String>,
    #[serde(default)]
    errors: Vec<String>,
}

impl Pushover {
    pub fn new(
        http_client: HTTPClient,
        api_url: impl Into<String>,
        user: impl Into<String>,
        token: impl Into<String>,
    ) -> Self {
        Self {
            http_client,
            api_url: api_url.into(),
            user: user.into(),
            token: token.into(),
        }
    }
}

impl PushService for Pushover {
    async fn send(&self, notification: &Notification) -> Result<()> {
        let form = MessageRequest {
            token: &self.token,
            user: &self.user,
            title: &notification.title,
            message: &notification.message,
        };

        let response = self
            .http_client
            .post(&self.api_url)
            .form(&form)
            .send()
            .await?;
        let status = response.status();
        let body = response.text().await.unwrap_or_default();
        let parsed: MessageResponse = serde_json::from_str(&body).unwrap_or_default();

        if !status.is_success() {
            return Err(anyhow!(
                "pushover api error: status={} errors={:?} body={}",
                status,
                parsed.errors,
                body
            ));
        }
        // A 2xx alone is not trusted: the API confirms acceptance with status 1.
        if parsed.status != 1 {
            return Err(anyhow!(
                "pushover did not confirm delivery: status_field={} body={}",
                parsed.status,
                body
            ));
        }

        logging::Logger::new().status(status.as_u16()).info(
            "push.accepted",
            &format!(
                "Pushover accepted request {}",
                parsed.request.as_deref().unwrap_or("-")
            ),
        );
        Ok(())
    }
}
