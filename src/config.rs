//! Configuration types for the session client.
//!
//! Two structs cover everything that was hardcoded in the dashboard:
//! [`SessionConfig`] for the local session lifecycle and
//! [`BackendConfig`] for where the auth endpoints live.
//!
//! # Example
//!
//! ```rust
//! use autodig_session::config::{NetworkErrorPolicy, SessionConfig};
//! use chrono::Duration;
//!
//! let config = SessionConfig {
//!     lifetime: Duration::hours(8),
//!     network_error_policy: NetworkErrorPolicy::Retain,
//!     ..Default::default()
//! };
//! assert!(config.validate().is_ok());
//! ```

use std::time::Duration as StdDuration;

use chrono::Duration;

use crate::AuthError;

/// Upper bound on [`SessionConfig::lifetime`].
pub const MAX_SESSION_LIFETIME_DAYS: i64 = 365;

pub(crate) fn max_session_lifetime() -> Duration {
    Duration::days(MAX_SESSION_LIFETIME_DAYS)
}

/// Environment variable holding the backend base URL.
pub const BACKEND_URL_ENV: &str = "AUTODIG_BACKEND_URL";

/// Environment variable holding the request timeout in whole seconds.
pub const REQUEST_TIMEOUT_ENV: &str = "AUTODIG_REQUEST_TIMEOUT_SECS";

const DEFAULT_BACKEND_URL: &str = "http://localhost:3000";

/// What `validate_token` does when the backend cannot be reached.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum NetworkErrorPolicy {
    /// Treat an unreachable backend like a rejected token and sign out.
    #[default]
    Clear,
    /// Keep the session and keep treating it as valid until its local
    /// expiry passes. Expiry is not extended while offline.
    Retain,
}

/// Storage keys used for the primary record and its mirrors.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StorageKeys {
    /// Primary record: JSON `{token, user, expiresAt}`.
    pub session: String,
    /// Deprecated flat copy of the bearer token.
    pub token: String,
    /// Deprecated flat copy of the user record. Also the legacy fallback
    /// read by `get_current_user`.
    pub user: String,
    /// Transient user record left behind by sign-up flows.
    pub temp_user: String,
}

impl Default for StorageKeys {
    fn default() -> Self {
        Self {
            session: "autodig_session".to_owned(),
            token: "token".to_owned(),
            user: "user".to_owned(),
            temp_user: "temp_user".to_owned(),
        }
    }
}

impl StorageKeys {
    /// Every key `clear_session` removes.
    pub fn all(&self) -> [&str; 4] {
        [&self.session, &self.token, &self.user, &self.temp_user]
    }
}

/// Local session lifecycle settings.
#[derive(Debug, Clone)]
pub struct SessionConfig {
    /// How long a session stays valid after creation or refresh.
    ///
    /// Default: 24 hours
    pub lifetime: Duration,

    /// Storage key names.
    pub keys: StorageKeys,

    /// Behavior when validation fails for network reasons.
    ///
    /// Default: [`NetworkErrorPolicy::Clear`]
    pub network_error_policy: NetworkErrorPolicy,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            lifetime: Duration::hours(24),
            keys: StorageKeys::default(),
            network_error_policy: NetworkErrorPolicy::Clear,
        }
    }
}

impl SessionConfig {
    pub fn new() -> Self {
        Self::default()
    }

    /// Longer sessions that survive backend restarts during local work.
    pub fn development() -> Self {
        Self {
            lifetime: Duration::days(7),
            network_error_policy: NetworkErrorPolicy::Retain,
            ..Default::default()
        }
    }

    /// Short sessions, signed out as soon as validation cannot complete.
    pub fn strict() -> Self {
        Self {
            lifetime: Duration::hours(1),
            network_error_policy: NetworkErrorPolicy::Clear,
            ..Default::default()
        }
    }

    pub fn validate(&self) -> Result<(), AuthError> {
        if self.lifetime <= Duration::zero() {
            return Err(AuthError::InvalidConfig(
                "session lifetime must be positive".to_owned(),
            ));
        }
        if self.lifetime > max_session_lifetime() {
            return Err(AuthError::InvalidConfig(format!(
                "session lifetime must not exceed {MAX_SESSION_LIFETIME_DAYS} days"
            )));
        }

        let keys = self.keys.all();
        if keys.iter().any(|k| k.is_empty()) {
            return Err(AuthError::InvalidConfig(
                "storage keys must not be empty".to_owned(),
            ));
        }
        for (i, key) in keys.iter().enumerate() {
            if keys[i + 1..].contains(key) {
                return Err(AuthError::InvalidConfig(format!(
                    "storage key \"{key}\" is used more than once"
                )));
            }
        }

        Ok(())
    }
}

/// Location of the backend auth endpoints.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BackendConfig {
    /// Scheme, host and port, without a trailing slash.
    pub base_url: String,
    pub validate_path: String,
    pub login_path: String,
    pub signup_path: String,
    pub google_path: String,
    /// Total timeout for a single request.
    ///
    /// Default: 10 seconds
    pub request_timeout: StdDuration,
}

impl Default for BackendConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BACKEND_URL.to_owned(),
            validate_path: "/api/auth/validate".to_owned(),
            login_path: "/api/login".to_owned(),
            signup_path: "/api/signup".to_owned(),
            google_path: "/api/auth/google".to_owned(),
            request_timeout: StdDuration::from_secs(10),
        }
    }
}

impl BackendConfig {
    /// Default paths against the given base URL.
    pub fn with_base_url(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into().trim_end_matches('/').to_owned(),
            ..Default::default()
        }
    }

    /// Reads `AUTODIG_BACKEND_URL` and `AUTODIG_REQUEST_TIMEOUT_SECS`,
    /// falling back to defaults for anything unset or unparseable.
    pub fn from_env() -> Self {
        let mut config = match std::env::var(BACKEND_URL_ENV) {
            Ok(url) if !url.trim().is_empty() => Self::with_base_url(url.trim()),
            _ => Self::default(),
        };

        if let Ok(raw) = std::env::var(REQUEST_TIMEOUT_ENV) {
            match raw.trim().parse::<u64>() {
                Ok(secs) if secs > 0 => config.request_timeout = StdDuration::from_secs(secs),
                _ => log::warn!(
                    target: "autodig_session",
                    "msg=\"ignoring invalid request timeout\" value=\"{}\"",
                    raw
                ),
            }
        }

        config
    }

    /// Joins the base URL and an endpoint path.
    pub fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    pub fn validate(&self) -> Result<(), AuthError> {
        if !(self.base_url.starts_with("http://") || self.base_url.starts_with("https://")) {
            return Err(AuthError::InvalidConfig(
                "base_url must start with http:// or https://".to_owned(),
            ));
        }
        let paths = [
            &self.validate_path,
            &self.login_path,
            &self.signup_path,
            &self.google_path,
        ];
        if paths.iter().any(|p| !p.starts_with('/')) {
            return Err(AuthError::InvalidConfig(
                "endpoint paths must start with '/'".to_owned(),
            ));
        }
        if self.request_timeout.is_zero() {
            return Err(AuthError::InvalidConfig(
                "request_timeout must be non-zero".to_owned(),
            ));
        }
        Ok(())
    }
}
