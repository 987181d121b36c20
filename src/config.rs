//! Client configuration parsed from environment variables.

pub const DEFAULT_BASE_URL: &str = "http://localhost:8080/api";
pub const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 30;
pub const DEFAULT_CONNECT_TIMEOUT_SECS: u64 = 10;
pub const DEFAULT_LOGIN_ROUTE: &str = "/login";

/// Errors produced while building a [`ClientConfig`].
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// A variable was set to a value the client cannot use.
    #[error("invalid value for {var}: {value:?}")]
    Invalid { var: &'static str, value: String },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Timeouts {
    pub request_secs: u64,
    pub connect_secs: u64,
}

impl Default for Timeouts {
    fn default() -> Self {
        Self { request_secs: DEFAULT_REQUEST_TIMEOUT_SECS, connect_secs: DEFAULT_CONNECT_TIMEOUT_SECS }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClientConfig {
    /// Backend root including the `/api` prefix, without a trailing slash.
    pub base_url: String,
    pub timeouts: Timeouts,
    /// Route the navigation observer redirects to when the session is invalidated.
    pub login_route: String,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_owned(),
            timeouts: Timeouts::default(),
            login_route: DEFAULT_LOGIN_ROUTE.to_owned(),
        }
    }
}

impl ClientConfig {
    /// Build a config for `base_url` with default timeouts.
    #[must_use]
    pub fn with_base_url(base_url: &str) -> Self {
        Self { base_url: normalize_base_url(base_url), ..Self::default() }
    }

    /// Build typed client config from environment variables.
    ///
    /// Optional:
    /// - `SWEATLO_BASE_URL`: default `http://localhost:8080/api`
    /// - `SWEATLO_REQUEST_TIMEOUT_SECS`: default 30
    /// - `SWEATLO_CONNECT_TIMEOUT_SECS`: default 10
    /// - `SWEATLO_LOGIN_ROUTE`: default `/login`
    pub fn from_env() -> Result<Self, ConfigError> {
        let base_url = std::env::var("SWEATLO_BASE_URL").unwrap_or_else(|_| DEFAULT_BASE_URL.to_owned());
        if !base_url.starts_with("http://") && !base_url.starts_with("https://") {
            return Err(ConfigError::Invalid { var: "SWEATLO_BASE_URL", value: base_url });
        }

        let login_route = std::env::var("SWEATLO_LOGIN_ROUTE").unwrap_or_else(|_| DEFAULT_LOGIN_ROUTE.to_owned());
        if !login_route.starts_with('/') {
            return Err(ConfigError::Invalid { var: "SWEATLO_LOGIN_ROUTE", value: login_route });
        }

        let timeouts = Timeouts {
            request_secs: env_parse_u64("SWEATLO_REQUEST_TIMEOUT_SECS", DEFAULT_REQUEST_TIMEOUT_SECS),
            connect_secs: env_parse_u64("SWEATLO_CONNECT_TIMEOUT_SECS", DEFAULT_CONNECT_TIMEOUT_SECS),
        };

        Ok(Self { base_url: normalize_base_url(&base_url), timeouts, login_route })
    }
}

fn normalize_base_url(raw: &str) -> String {
    raw.trim().trim_end_matches('/').to_owned()
}

fn env_parse_u64(key: &str, default: u64) -> u64 {
    std::env::var(key)
        .ok()
        .and_then(|v| v.trim().parse::<u64>().ok())
        .unwrap_or(default)
}

#[cfg(test)]
#[path = "config_test.rs"]
mod tests;
