//! Notification fan-out configuration.

use serde::{Deserialize, Serialize};

/// Notification fan-out and listing configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NotificationConfig {
    /// Deadline for one fan-out when the caller supplies none, in seconds.
    #[serde(default = "default_timeout")]
    pub timeout_seconds: u64,
    /// Number of notifications returned by a list call without `limit`.
    #[serde(default = "default_list_limit")]
    pub default_list_limit: u32,
    /// Upper bound for `limit` on list calls.
    #[serde(default = "default_max_list_limit")]
    pub max_list_limit: u32,
}

impl Default for NotificationConfig {
    fn default() -> Self {
        Self {
            timeout_seconds: default_timeout(),
            default_list_limit: default_list_limit(),
            max_list_limit: default_max_list_limit(),
        }
    }
}

fn default_timeout() -> u64 {
    10
}

fn default_list_limit() -> u32 {
    50
}

fn default_max_list_limit() -> u32 {
    200
}
