use std::time::Duration;

use crate::infra::config::GeminiConfig;

const CONNECT_TIMEOUT: Duration = Duration::from_secs(5);

/// Build a reqwest client with connect and overall request timeouts.
pub fn make_http_client(timeout: Duration) -> Result<reqwest::Client, reqwest::Error> {
    reqwest::Client::builder()
        .connect_timeout(CONNECT_TIMEOUT)
        .timeout(timeout)
        .build()
}

pub fn make_http_client_with(cfg: &GeminiConfig) -> Result<reqwest::Client, reqwest::Error> {
    make_http_client(Duration::from_secs(cfg.timeout_secs.max(1)))
}
