use std::time::Duration;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// How bad a fault is, as reported alongside failure events.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Severity {
    /// Caused by the request itself (bad query, nothing found).
    Common,
    /// Caused by an external collaborator (resolver or transport).
    Fault,
}

/// Failure while turning a query into tracks.
#[derive(Debug, Error)]
pub enum ResolveError {
    #[error("resolution timed out after {0:?}")]
    Timeout(Duration),

    #[error("resolver process failed: {0}")]
    Process(String),

    #[error("could not parse resolver output: {0}")]
    Parse(String),

    #[error("no resolver can handle query: {0}")]
    Unsupported(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Failure reported by an audio transport.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SinkError {
    #[error("could not connect to room: {0}")]
    Connect(String),

    #[error("transport error: {0}")]
    Transport(String),

    #[error("sink is disconnected")]
    Closed,
}

/// Why a `Play` intent did not start or queue a track.
#[derive(Debug, Error)]
pub enum PlayError {
    #[error("query is empty")]
    EmptyQuery,

    #[error("no results found")]
    NoResults,

    #[error(transparent)]
    Resolve(#[from] ResolveError),

    #[error("could not join room: {0}")]
    Connect(String),

    #[error("room session kept closing while the request was delivered")]
    SessionUnavailable,
}

impl PlayError {
    pub fn severity(&self) -> Severity {
        match self {
            Self::EmptyQuery | Self::NoResults => Severity::Common,
            Self::Resolve(_) | Self::Connect(_) | Self::SessionUnavailable => Severity::Fault,
        }
    }
}

/// Failure while loading the configuration file.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("{0} is empty")]
    Empty(String),

    #[error("failed to read config: {0}")]
    Io(#[from] std::io::Error),

    #[error("invalid config: {0}")]
    Parse(#[from] toml::de::Error),
}
