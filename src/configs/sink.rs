use serde::{Deserialize, Serialize};

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct SinkConfig {
    /// How long the simulated transport "plays" each track.
    #[serde(default = "default_track_duration_ms")]
    pub track_duration_ms: u64,
}

impl Default for SinkConfig {
    fn default() -> Self {
        Self {
            track_duration_ms: default_track_duration_ms(),
        }
    }
}

fn default_track_duration_ms() -> u64 {
    30_000
}
