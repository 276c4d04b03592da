use std::sync::Arc;

use serde::{Deserialize, Serialize};

/// A resolved, playable unit.
///
/// Tracks are immutable once resolved; cloning shares the underlying strings.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Track {
    /// Opaque stream reference handed to the audio transport (usually a URL).
    pub stream_ref: Arc<str>,
    /// Human-readable title.
    pub title: Arc<str>,
}

impl Track {
    pub fn new(stream_ref: impl Into<Arc<str>>, title: impl Into<Arc<str>>) -> Self {
        Self {
            stream_ref: stream_ref.into(),
            title: title.into(),
        }
    }
}

impl std::fmt::Display for Track {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.title)
    }
}
