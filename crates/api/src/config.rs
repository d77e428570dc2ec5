//! Server settings read from the environment at startup.

use std::str::FromStr;

use crate::auth::jwt::JwtConfig;

/// Length of the top-coaches and recent-signups lists.
const DEFAULT_OVERVIEW_LIST_SIZE: i64 = 5;

/// The admin dashboard's dev server.
const DEFAULT_CORS_ORIGINS: &str = "http://localhost:5173";

/// | Env Var                | Default                 |
/// |------------------------|-------------------------|
/// | `HOST`                 | `0.0.0.0`               |
/// | `PORT`                 | `3000`                  |
/// | `CORS_ORIGINS`         | `http://localhost:5173` |
/// | `REQUEST_TIMEOUT_SECS` | `30`                    |
/// | `OVERVIEW_LIST_SIZE`   | `5`                     |
///
/// Token settings come from [`JwtConfig::from_env`].
#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    /// Comma-separated in `CORS_ORIGINS`.
    pub cors_origins: Vec<String>,
    pub request_timeout_secs: u64,
    pub overview_list_size: i64,
    pub jwt: JwtConfig,
}

impl ServerConfig {
    /// # Panics
    ///
    /// Panics when a numeric variable does not parse, or when the JWT
    /// settings are invalid.
    pub fn from_env() -> Self {
        let overview_list_size = env_or("OVERVIEW_LIST_SIZE", DEFAULT_OVERVIEW_LIST_SIZE);
        assert!(overview_list_size > 0, "OVERVIEW_LIST_SIZE must be positive");

        Self {
            host: std::env::var("HOST").unwrap_or_else(|_| "0.0.0.0".to_string()),
            port: env_or("PORT", 3000),
            cors_origins: parse_origins(
                &std::env::var("CORS_ORIGINS").unwrap_or_else(|_| DEFAULT_CORS_ORIGINS.to_string()),
            ),
            request_timeout_secs: env_or("REQUEST_TIMEOUT_SECS", 30),
            overview_list_size,
            jwt: JwtConfig::from_env(),
        }
    }
}

/// Parse `name` when set, otherwise use `default`.
fn env_or<T>(name: &str, default: T) -> T
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    match std::env::var(name) {
        Ok(raw) => raw
            .trim()
            .parse()
            .unwrap_or_else(|err| panic!("{name} has invalid value '{raw}': {err}")),
        Err(_) => default,
    }
}

/// Split a comma-separated origin list, dropping blanks.
fn parse_origins(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(str::trim)
        .filter(|origin| !origin.is_empty())
        .map(str::to_string)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn origins_are_trimmed_and_blanks_dropped() {
        assert_eq!(
            parse_origins(" http://a.test, ,http://b.test,"),
            vec!["http://a.test".to_string(), "http://b.test".to_string()]
        );
    }

    #[test]
    fn unset_variable_falls_back_to_default() {
        let port: u16 = env_or("COACHDESK_TEST_UNSET_PORT", 4100);
        assert_eq!(port, 4100);
    }
}
