use serde::Serialize;

use crate::{
    common::{Severity, types::RoomId},
    playback::Track,
};

/// Why a room's session went away.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum CloseReason {
    /// The last track finished and nothing was queued.
    QueueDrained,
    /// A `Stop` intent.
    Stopped,
    /// The transport could not join the room.
    ConnectFailed,
    /// Too many tracks in a row failed to stream.
    TooManyFailures,
}

/// Status changes published for the presentation layer to relay.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type")]
pub enum StatusEvent {
    #[serde(rename = "SessionOpenedEvent")]
    SessionOpened {
        #[serde(rename = "roomId")]
        room_id: RoomId,
    },

    #[serde(rename = "NowPlayingEvent")]
    NowPlaying {
        #[serde(rename = "roomId")]
        room_id: RoomId,
        track: Track,
    },

    #[serde(rename = "QueuedEvent")]
    Queued {
        #[serde(rename = "roomId")]
        room_id: RoomId,
        track: Track,
        position: usize,
    },

    #[serde(rename = "PausedEvent")]
    Paused {
        #[serde(rename = "roomId")]
        room_id: RoomId,
        track: Track,
    },

    #[serde(rename = "ResumedEvent")]
    Resumed {
        #[serde(rename = "roomId")]
        room_id: RoomId,
        track: Track,
    },

    #[serde(rename = "SkippedEvent")]
    Skipped {
        #[serde(rename = "roomId")]
        room_id: RoomId,
        track: Track,
    },

    #[serde(rename = "TrackFailedEvent")]
    TrackFailed {
        #[serde(rename = "roomId")]
        room_id: RoomId,
        track: Track,
        message: String,
        severity: Severity,
    },

    #[serde(rename = "SessionClosedEvent")]
    SessionClosed {
        #[serde(rename = "roomId")]
        room_id: RoomId,
        reason: CloseReason,
    },
}

impl StatusEvent {
    pub fn room_id(&self) -> &RoomId {
        match self {
            Self::SessionOpened { room_id }
            | Self::NowPlaying { room_id, .. }
            | Self::Queued { room_id, .. }
            | Self::Paused { room_id, .. }
            | Self::Resumed { room_id, .. }
            | Self::Skipped { room_id, .. }
            | Self::TrackFailed { room_id, .. }
            | Self::SessionClosed { room_id, .. } => room_id,
        }
    }
}
