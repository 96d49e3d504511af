use tracing::{debug, error, info, warn};

pub(crate) const TARGET: &str = "flagwatch";

#[derive(Clone, Default)]
pub(crate) struct Logger {
    color: Option<String>,
    previous_color: Option<String>,
    status: Option<u16>,
    url: Option<String>,
    error_text: Option<String>,
}

impl Logger {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    pub(crate) fn color(mut self, color: impl Into<String>) -> Self {
        self.color = Some(color.into());
        self
    }

    pub(crate) fn previous_color(mut self, previous_color: Option<&str>) -> Self {
        self.previous_color = previous_color.map(str::to_string);
        self
    }

    pub(crate) fn status(mut self, status: u16) -> Self {
        self.status = Some(status);
        self
    }

    pub(crate) fn url(mut self, url: impl Into<String>) -> Self {
        self.url = Some(url.into());
        self
    }

    pub(crate) fn error_text(mut self, error_text: impl Into<String>) -> Self {
        self.error_text = Some(error_text.into());
        self
    }

    pub(crate) fn debug(&self, event: &'static str, message: &str) {
        debug!(
            target: TARGET,
            event,
            color = self.color.as_deref(),
            previous_color = self.previous_color.as_deref(),
            status = self.status,
            url = self.url.as_deref(),
            error_text = self.error_text.as_deref(),
            "{}",
            message
        );
    }

    pub(crate) fn info(&self, event: &'static str, message: &str) {
        info!(
            target: TARGET,
            event,
            color = self.color.as_deref(),
            previous_color = self.previous_color.as_deref(),
            status = self.status,
            url = self.url.as_deref(),
            error_text = self.error_text.as_deref(),
            "{}",
            message
        );
    }

    pub(crate) fn warn(&self, event: &'static str, message: &str) {
        warn!(
            target: TARGET,
            event,
            color = self.color.as_deref(),
            previous_color = self.previous_color.as_deref(),
            status = self.status,
            url = self.url.as_deref(),
            error_text = self.error_text.as_deref(),
            "{}",
            message
        );
    }

    pub(crate) fn error<E: std::fmt::Debug>(&self, event: &'static str, err: &E, message: &str) {
        error!(
            target: TARGET,
            event,
            color = self.color.as_deref(),
            previous_color = self.previous_color.as_deref(),
            status = self.status,
            url = self.url.as_deref(),
            error_text = self.error_text.as_deref(),
            error = ?err,
            "{}",
            message
        );
    }
}
