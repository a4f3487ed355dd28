//! Configuration types for the EyeMove client.

use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Default base URL of the EyeMove web service.
pub const DEFAULT_BASE_URL: &str = "https://ws.eye-move.nl";

/// Default connection timeout in seconds.
pub const DEFAULT_CONNECTION_TIMEOUT: u64 = 60;

/// Client configuration.
///
/// Endpoint paths and namespaces are fixed per resource family; only the
/// host and the transport timeout are expected to vary between
/// environments.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct EyeMoveConfig {
    /// Base URL of the web service, without a trailing slash.
    pub base_url: String,

    /// Connection timeout for every transport call (seconds).
    pub connection_timeout: u64,
}

impl Default for EyeMoveConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            connection_timeout: DEFAULT_CONNECTION_TIMEOUT,
        }
    }
}

impl EyeMoveConfig {
    /// Resolve an endpoint path against the configured base URL.
    pub(crate) fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url.trim_end_matches('/'), path)
    }

    /// The connection timeout as a [`Duration`].
    pub(crate) fn timeout(&self) -> Duration {
        Duration::from_secs(self.connection_timeout)
    }
}
