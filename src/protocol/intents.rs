use serde::{Deserialize, Serialize};

use crate::{
    common::PlayError,
    playback::{SessionSnapshot, Track},
};

/// A parsed user request, independent of how it was transported.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "op", rename_all = "camelCase")]
pub enum Intent {
    Play { query: String },
    Pause,
    Resume,
    Skip,
    Stop,
    Status,
}

impl Intent {
    pub fn name(&self) -> &'static str {
        match self {
            Self::Play { .. } => "play",
            Self::Pause => "pause",
            Self::Resume => "resume",
            Self::Skip => "skip",
            Self::Stop => "stop",
            Self::Status => "status",
        }
    }
}

/// Successful result of a `Play` intent.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum PlayAck {
    /// The room was idle; the track started immediately.
    NowPlaying { track: Track },
    /// Something was already playing; the track waits at `position` (1-based).
    Queued { track: Track, position: usize },
}

impl PlayAck {
    pub fn track(&self) -> &Track {
        match self {
            Self::NowPlaying { track } | Self::Queued { track, .. } => track,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum PauseOutcome {
    Paused,
    NothingPlaying,
    NoSession,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum ResumeOutcome {
    Resumed,
    NothingPaused,
    NoSession,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum SkipOutcome {
    Skipped { track: Track },
    NothingPlaying,
    NoSession,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum StopOutcome {
    /// `discarded` counts the current track plus everything still queued.
    Stopped { discarded: usize },
    NoSession,
}

/// Final outcome of any intent, as delivered by `Dispatcher::dispatch`.
#[derive(Debug)]
pub enum IntentOutcome {
    Play(Result<PlayAck, PlayError>),
    Pause(PauseOutcome),
    Resume(ResumeOutcome),
    Skip(SkipOutcome),
    Stop(StopOutcome),
    Status(Option<SessionSnapshot>),
}
