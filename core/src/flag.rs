use std::fmt;

/// Flag color published by the boating club.
///
/// Codes outside the known set are kept verbatim in [`FlagColor::Unknown`]
/// so they can still be shown to the user.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FlagColor {
    Red,
    Yellow,
    Green,
    Closed,
    Unknown(String),
}

impl FlagColor {
    pub fn from_code(code: &str) -> Self {
        match code {
            "R" => FlagColor::Red,
            "Y" => FlagColor::Yellow,
            "G" => FlagColor::Green,
            "C" => FlagColor::Closed,
            other => FlagColor::Unknown(other.to_string()),
        }
    }

    /// Text shown in notifications and stored as the last notified color.
    pub fn label(&self) -> String {
        self.to_string()
    }
}

impl fmt::Display for FlagColor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FlagColor::Red => f.write_str("Red"),
            FlagColor::Yellow => f.write_str("Yellow"),
            FlagColor::Green => f.write_str("Green"),
            FlagColor::Closed => f.write_str("Closed"),
            FlagColor::Unknown(code) => write!(f, "? ({code})"),
        }
    }
}
