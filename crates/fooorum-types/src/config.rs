//! Client configuration types.
//!
//! `ClientConfig` represents `config.toml` in the client data directory: the
//! two service base URLs and the chat timing knobs. Every field has a default
//! so an empty or missing file yields a working local setup.

use serde::{Deserialize, Serialize};

use std::time::Duration;

/// Top-level configuration for the Fooorum client.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClientConfig {
    /// Base URL of the auth service (`/auth/login`, `/auth/register`).
    #[serde(default = "default_auth_url")]
    pub auth_url: String,

    /// Base URL of the forum service (`/chat/messages`, `/chat/ws`, `/posts`).
    #[serde(default = "default_forum_url")]
    pub forum_url: String,

    /// Fixed delay between a socket close and the next connection attempt.
    #[serde(default = "default_reconnect_delay_secs")]
    pub reconnect_delay_secs: u64,

    /// Cadence of the message pruning tick.
    #[serde(default = "default_prune_interval_secs")]
    pub prune_interval_secs: u64,

    /// Trailing retention window applied at each prune tick.
    #[serde(default = "default_retention_minutes")]
    pub retention_minutes: u64,

    /// Upper bound on remembered message ids.
    #[serde(default = "default_seen_capacity")]
    pub seen_capacity: usize,

    /// How long a seen id is remembered. Never shorter than the retention window.
    #[serde(default = "default_seen_ttl_minutes")]
    pub seen_ttl_minutes: u64,

    /// Timeout for login/register requests.
    #[serde(default = "default_request_timeout_secs")]
    pub request_timeout_secs: u64,
}

fn default_auth_url() -> String {
    "http://localhost:8080".to_string()
}

fn default_forum_url() -> String {
    "http://localhost:8081".to_string()
}

fn default_reconnect_delay_secs() -> u64 {
    5
}

fn default_prune_interval_secs() -> u64 {
    60
}

fn default_retention_minutes() -> u64 {
    30
}

fn default_seen_capacity() -> usize {
    10_000
}

fn default_seen_ttl_minutes() -> u64 {
    60
}

fn default_request_timeout_secs() -> u64 {
    30
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            auth_url: default_auth_url(),
            forum_url: default_forum_url(),
            reconnect_delay_secs: default_reconnect_delay_secs(),
            prune_interval_secs: default_prune_interval_secs(),
            retention_minutes: default_retention_minutes(),
            seen_capacity: default_seen_capacity(),
            seen_ttl_minutes: default_seen_ttl_minutes(),
            request_timeout_secs: default_request_timeout_secs(),
        }
    }
}

impl ClientConfig {
    pub fn reconnect_delay(&self) -> Duration {
        Duration::from_secs(self.reconnect_delay_secs)
    }

    pub fn prune_interval(&self) -> Duration {
        Duration::from_secs(self.prune_interval_secs.max(1))
    }

    pub fn retention(&self) -> Duration {
        Duration::from_secs(self.retention_minutes * 60)
    }

    /// Seen-id lifetime, clamped so an id outlives any message it could suppress.
    pub fn seen_ttl(&self) -> Duration {
        Duration::from_secs(self.seen_ttl_minutes * 60).max(self.retention())
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }
}
