pub mod flag;
pub mod weather;

pub use flag::FlagColor;
pub use weather::WeatherReport;

/// A push message ready to be handed to the delivery service.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notification {
    pub title: String,
    pub message: String,
}
