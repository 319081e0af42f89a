use std::env;

pub const DEFAULT_API_URL: &str = "https://api.monday.com/v2";
pub const API_VERSION: &str = "2024-10";
pub const INTAKE_BOARD_ID: &str = "18203940561";

/// Connection settings for the board API, fixed for the life of the process.
#[derive(Debug, Clone)]
pub struct MondayConfig {
    pub api_url: String,
    pub api_version: String,
    pub board_id: String,
    pub api_key: Option<String>,
}

impl MondayConfig {
    pub fn from_env() -> Self {
        let api_url = env::var("MONDAY_API_URL")
            .ok()
            .map(|value| value.trim().to_string())
            .filter(|value| !value.is_empty())
            .unwrap_or_else(|| DEFAULT_API_URL.to_string());
        let api_key = env::var("MONDAY_API_KEY").ok();
        Self {
            api_key,
            ..Self::new(api_url)
        }
    }

    /// Production board and API version against `api_url`, with no credential.
    pub fn new(api_url: impl Into<String>) -> Self {
        Self {
            api_url: api_url.into(),
            api_version: API_VERSION.to_string(),
            board_id: INTAKE_BOARD_ID.to_string(),
            api_key: None,
        }
    }

    pub fn with_api_key(mut self, key: impl Into<String>) -> Self {
        self.api_key = Some(key.into());
        self
    }

    /// Blank keys count as missing.
    pub fn api_key(&self) -> Option<&str> {
        self.api_key
            .as_deref()
            .map(str::trim)
            .filter(|key| !key.is_empty())
    }
}
