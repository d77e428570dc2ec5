use std::time::Duration;

use crate::api::ClientError;
use crate::filter_bar::DEFAULT_DEBOUNCE;

/// Client configuration loaded from environment variables.
#[derive(Debug, Clone)]
pub struct ClientConfig {
    /// Base URL of the admin API, without the `/api/v1` suffix.
    pub base_url: String,
    /// Bearer token sent with every request.
    pub token: Option<String>,
    /// Per-request timeout.
    pub request_timeout: Duration,
    /// Delay before filter edits propagate.
    pub filter_debounce: Duration,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            base_url: "http://localhost:3000".to_string(),
            token: None,
            request_timeout: Duration::from_secs(30),
            filter_debounce: DEFAULT_DEBOUNCE,
        }
    }
}

impl ClientConfig {
    /// Load configuration from environment variables with defaults.
    ///
    /// | Env Var                         | Default                 |
    /// |---------------------------------|-------------------------|
    /// | `COACHDESK_API_URL`             | `http://localhost:3000` |
    /// | `COACHDESK_API_TOKEN`           | unset                   |
    /// | `COACHDESK_REQUEST_TIMEOUT_SECS`| `30`                    |
    /// | `COACHDESK_FILTER_DEBOUNCE_MS`  | `500`                   |
    pub fn from_env() -> Result<Self, ClientError> {
        let defaults = Self::default();

        let base_url = std::env::var("COACHDESK_API_URL")
            .map(|url| url.trim_end_matches('/').to_string())
            .unwrap_or(defaults.base_url);
        let token = std::env::var("COACHDESK_API_TOKEN")
            .ok()
            .filter(|t| !t.is_empty());
        let request_timeout = match std::env::var("COACHDESK_REQUEST_TIMEOUT_SECS") {
            Ok(raw) => Duration::from_secs(parse_number("COACHDESK_REQUEST_TIMEOUT_SECS", &raw)?),
            Err(_) => defaults.request_timeout,
        };
        let filter_debounce = match std::env::var("COACHDESK_FILTER_DEBOUNCE_MS") {
            Ok(raw) => Duration::from_millis(parse_number("COACHDESK_FILTER_DEBOUNCE_MS", &raw)?),
            Err(_) => defaults.filter_debounce,
        };

        Ok(Self {
            base_url,
            token,
            request_timeout,
            filter_debounce,
        })
    }
}

fn parse_number(name: &str, raw: &str) -> Result<u64, ClientError> {
    raw.trim()
        .parse()
        .map_err(|_| ClientError::Config(format!("{name} must be a non-negative integer, got '{raw}'")))
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;

    #[test]
    fn default_debounce_is_half_a_second() {
        assert_eq!(ClientConfig::default().filter_debounce, Duration::from_millis(500));
    }

    #[test]
    fn parse_number_rejects_garbage() {
        assert_eq!(parse_number("X", " 250 ").unwrap(), 250);
        assert_matches!(parse_number("X", "soon"), Err(ClientError::Config(_)));
    }
}
