use reqwest::Client;
use std::time::Duration;

fn secs_from_env(key: &str) -> Option<u64> {
    std::env::var(key)
        .ok()
        .and_then(|v| v.parse::<u64>().ok())
        .filter(|v| *v > 0)
}

/// Outbound client. Only the connect phase is bounded unless `HTTP_TIMEOUT_SECS` is set.
pub fn build_client() -> Client {
    let connect = secs_from_env("HTTP_CONNECT_TIMEOUT_SECS").unwrap_or(5);
    let mut builder = Client::builder().connect_timeout(Duration::from_secs(connect));
    if let Some(total) = secs_from_env("HTTP_TIMEOUT_SECS") {
        builder = builder.timeout(Duration::from_secs(total));
    }
    builder.build().unwrap_or_else(|_| Client::new())
}
