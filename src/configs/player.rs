use std::time::Duration;

use serde::{Deserialize, Serialize};

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct PlayerConfig {
    /// Upper bound on a single resolution. `0` waits indefinitely.
    #[serde(default = "default_resolve_timeout_ms")]
    pub resolve_timeout_ms: u64,
    /// Consecutive transport faults after which a room gives up on its queue.
    /// `0` never gives up.
    #[serde(default = "default_max_consecutive_failures")]
    pub max_consecutive_failures: u32,
    /// Delivery attempts for a `Play` that races a session teardown.
    #[serde(default = "default_session_attempts")]
    pub session_attempts: u32,
}

impl PlayerConfig {
    pub fn resolve_timeout(&self) -> Option<Duration> {
        (self.resolve_timeout_ms > 0).then(|| Duration::from_millis(self.resolve_timeout_ms))
    }
}

impl Default for PlayerConfig {
    fn default() -> Self {
        Self {
            resolve_timeout_ms: default_resolve_timeout_ms(),
            max_consecutive_failures: default_max_consecutive_failures(),
            session_attempts: default_session_attempts(),
        }
    }
}

fn default_resolve_timeout_ms() -> u64 {
    15_000
}

fn default_max_consecutive_failures() -> u32 {
    5
}

fn default_session_attempts() -> u32 {
    3
}
