pub mod dynamodb;
pub mod file;
mod parse;
pub mod state;
pub mod utils;
pub use dynamodb::DynamoDbStateStore;
pub use file::FileStateStore;
pub use parse::parse_string_field;
pub use state::{StateBackend, StateStore};

/// Key holding the label of the last color a notification was delivered for.
pub const COLOR_KEY: &str = "color";
