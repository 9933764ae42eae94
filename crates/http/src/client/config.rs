//! Client configuration

use std::time::Duration;

use serde::{Deserialize, Serialize};

/// Default API base address
pub const DEFAULT_BASE_URL: &str = "http://localhost:3000/api";

/// Default user agent sent by the reqwest transport
pub const DEFAULT_USER_AGENT: &str = concat!("shopfront-client/", env!("CARGO_PKG_VERSION"));

/// Settings for building a [`SessionClient`](super::SessionClient)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ClientConfig {
    /// Origin plus path prefix under which every resource path is rooted
    pub base_url: String,
    /// Request timeout in seconds (0 disables the timeout)
    pub timeout_secs: u64,
    /// User agent for native transports
    pub user_agent: String,
}

impl ClientConfig {
    /// Timeout as a duration, `None` when disabled
    pub const fn timeout(&self) -> Option<Duration> {
        if self.timeout_secs == 0 {
            None
        } else {
            Some(Duration::from_secs(self.timeout_secs))
        }
    }
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            timeout_secs: 30,
            user_agent: DEFAULT_USER_AGENT.to_string(),
        }
    }
}
