use crate::monday::MondayConfig;
use std::env;

/// Process configuration, read once at startup.
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub port: u16,
    pub body_limit: usize,
    pub shared_secret: Option<String>,
    pub monday: MondayConfig,
}

impl AppConfig {
    pub fn from_env() -> Self {
        let port = env::var("PORT")
            .ok()
            .and_then(|value| value.parse().ok())
            .unwrap_or(8000);
        let body_limit = env::var("REQUEST_MAX_BYTES")
            .ok()
            .and_then(|v| v.parse::<usize>().ok())
            .filter(|v| *v > 0)
            .unwrap_or(256 * 1024);
        let shared_secret = env::var("INTAKE_SHARED_SECRET")
            .ok()
            .map(|value| value.trim().to_string())
            .filter(|value| !value.is_empty());
        Self {
            port,
            body_limit,
            shared_secret,
            monday: MondayConfig::from_env(),
        }
    }
}
