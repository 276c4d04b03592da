use std::sync::Arc;

use tokio::sync::{mpsc, oneshot};
use tracing::{debug, info, warn};

use super::{session::PlaybackSession, state::SessionSnapshot, track::Track};
use crate::{
    audio::SinkConnector,
    common::{
        PlayError, SinkError,
        types::{RoomId, SessionId},
    },
    protocol::{
        CloseReason, PauseOutcome, PlayAck, ResumeOutcome, SkipOutcome, StatusEvent, StopOutcome,
    },
    server::SessionRegistry,
};

/// Everything a room task reacts to, in arrival order.
pub(crate) enum RoomCommand {
    Enqueue {
        track: Track,
        reply: oneshot::Sender<Result<PlayAck, PlayError>>,
    },
    Pause {
        reply: oneshot::Sender<PauseOutcome>,
    },
    Resume {
        reply: oneshot::Sender<ResumeOutcome>,
    },
    Skip {
        reply: oneshot::Sender<SkipOutcome>,
    },
    Stop {
        reply: oneshot::Sender<StopOutcome>,
    },
    Snapshot {
        reply: oneshot::Sender<SessionSnapshot>,
    },
    /// Sink completion, marshalled from whatever thread the transport used.
    TrackFinished {
        play_id: u64,
        error: Option<SinkError>,
    },
}

/// Address of a running room task.
#[derive(Clone)]
pub struct RoomHandle {
    pub session_id: SessionId,
    tx: mpsc::UnboundedSender<RoomCommand>,
}

impl RoomHandle {
    /// Fails once the room task has stopped accepting commands.
    pub(crate) fn send(&self, command: RoomCommand) -> Result<(), RoomCommand> {
        self.tx.send(command).map_err(|e| e.0)
    }

    pub fn is_closed(&self) -> bool {
        self.tx.is_closed()
    }

    /// A handle with no task behind it; the test owns the inbox.
    #[cfg(test)]
    pub(crate) fn detached(session_id: SessionId) -> (Self, mpsc::UnboundedReceiver<RoomCommand>) {
        let (tx, rx) = mpsc::unbounded_channel();
        (Self { session_id, tx }, rx)
    }
}

/// Shared collaborators handed to every room task.
#[derive(Clone)]
pub(crate) struct RoomContext {
    pub connector: Arc<dyn SinkConnector>,
    pub registry: Arc<SessionRegistry>,
    pub events: flume::Sender<StatusEvent>,
    pub max_consecutive_failures: u32,
}

/// Spawns the task that owns `room_id`'s session and returns its address.
pub(crate) fn spawn_room(room_id: RoomId, session_id: SessionId, ctx: RoomContext) -> RoomHandle {
    let (tx, inbox) = mpsc::unbounded_channel();
    let actor = RoomActor {
        room_id,
        session_id,
        inbox,
        inbox_tx: tx.clone(),
        ctx,
    };
    tokio::spawn(actor.run());
    RoomHandle { session_id, tx }
}

struct RoomActor {
    room_id: RoomId,
    session_id: SessionId,
    inbox: mpsc::UnboundedReceiver<RoomCommand>,
    inbox_tx: mpsc::UnboundedSender<RoomCommand>,
    ctx: RoomContext,
}

impl RoomActor {
    async fn run(mut self) {
        let sink = match self.ctx.connector.connect(&self.room_id).await {
            Ok(sink) => sink,
            Err(e) => {
                warn!("[{}] failed to join room: {}", self.room_id, e);
                self.retire(CloseReason::ConnectFailed);
                self.drain(Some(e.to_string()));
                return;
            }
        };

        info!("[{}] session {} opened", self.room_id, self.session_id);
        let _ = self.ctx.events.send(StatusEvent::SessionOpened {
            room_id: self.room_id.clone(),
        });

        let mut session = PlaybackSession::new(
            self.room_id.clone(),
            self.session_id,
            sink,
            self.inbox_tx.clone(),
            self.ctx.events.clone(),
            self.ctx.max_consecutive_failures,
        );

        while let Some(command) = self.inbox.recv().await {
            match command {
                RoomCommand::Enqueue { track, reply } => {
                    let _ = reply.send(Ok(session.enqueue(track)));
                }
                RoomCommand::Pause { reply } => {
                    let _ = reply.send(session.pause());
                }
                RoomCommand::Resume { reply } => {
                    let _ = reply.send(session.resume());
                }
                RoomCommand::Skip { reply } => {
                    let _ = reply.send(session.skip());
                }
                RoomCommand::Snapshot { reply } => {
                    let _ = reply.send(session.snapshot());
                }
                RoomCommand::Stop { reply } => {
                    let outcome = session.stop().await;
                    self.retire(CloseReason::Stopped);
                    let _ = reply.send(outcome);
                    break;
                }
                RoomCommand::TrackFinished { play_id, error } => {
                    if let Some(reason) = session.on_track_finished(play_id, error).await {
                        self.retire(reason);
                        break;
                    }
                }
            }
        }

        self.drain(None);
    }

    /// Unregisters this session, refuses further commands, then announces the
    /// close. Runs before any reply that reports the session gone, so a
    /// following `Play` always finds the room free and listeners never see
    /// `SessionClosed` for a room that is still registered.
    fn retire(&mut self, reason: CloseReason) {
        self.ctx
            .registry
            .remove_if_current(&self.room_id, self.session_id);
        self.inbox.close();
        let _ = self.ctx.events.send(StatusEvent::SessionClosed {
            room_id: self.room_id.clone(),
            reason,
        });
    }

    /// Answers whatever was still queued when the session ended. Dropping a
    /// reply tells the caller the session is gone; `Play` then retries on a
    /// fresh session unless the room could not be joined at all.
    fn drain(&mut self, connect_error: Option<String>) {
        let mut dropped = 0usize;
        while let Ok(command) = self.inbox.try_recv() {
            match command {
                RoomCommand::Enqueue { reply, .. } => {
                    if let Some(message) = &connect_error {
                        let _ = reply.send(Err(PlayError::Connect(message.clone())));
                    }
                }
                RoomCommand::TrackFinished { .. } => continue,
                _ => {}
            }
            dropped += 1;
        }

        if dropped > 0 {
            debug!(
                "[{}] session {} ended with {} pending commands",
                self.room_id, self.session_id, dropped
            );
        }
    }
}
