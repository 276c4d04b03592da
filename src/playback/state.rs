use serde::Serialize;

use super::track::Track;
use crate::common::types::{RoomId, SessionId};

/// What a connected session is doing right now.
///
/// A room without a session is disconnected; that is not a state of a session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum PlaybackState {
    /// Connected, nothing playing.
    #[default]
    Idle,
    Playing,
    Paused,
}

impl PlaybackState {
    /// True when the sink holds a track (playing or paused).
    pub fn is_active(self) -> bool {
        matches!(self, Self::Playing | Self::Paused)
    }
}

/// Point-in-time view of one room's session.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionSnapshot {
    pub room_id: RoomId,
    pub session_id: SessionId,
    pub state: PlaybackState,
    pub current: Option<Track>,
    pub queue: Vec<Track>,
}
