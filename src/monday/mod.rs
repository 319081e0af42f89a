pub mod config;
pub mod items;

pub use config::MondayConfig;
pub use items::{CreatedItem, MondayClient, MondayError};
