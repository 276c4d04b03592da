use std::sync::Arc;

use tokio::sync::oneshot;
use tracing::{debug, info, warn};

use super::registry::SessionRegistry;
use crate::{
    audio::SinkConnector,
    common::{PlayError, ResolveError, types::RoomId},
    configs::PlayerConfig,
    playback::{
        SessionSnapshot, Track,
        actor::{RoomCommand, RoomContext, spawn_room},
    },
    protocol::{
        Intent, IntentOutcome, PauseOutcome, PlayAck, ResumeOutcome, SkipOutcome, StatusEvent,
        StopOutcome,
    },
    sources::TrackResolver,
};

/// Routes intents to the session of the room they target.
///
/// Cheap to clone; clones share the same registry and collaborators.
#[derive(Clone)]
pub struct Dispatcher {
    inner: Arc<DispatcherInner>,
}

struct DispatcherInner {
    registry: Arc<SessionRegistry>,
    resolver: Arc<dyn TrackResolver>,
    room_ctx: RoomContext,
    config: PlayerConfig,
}

impl Dispatcher {
    /// Returns the dispatcher and the stream of status events it publishes.
    pub fn new(
        resolver: Arc<dyn TrackResolver>,
        connector: Arc<dyn SinkConnector>,
        config: PlayerConfig,
    ) -> (Self, flume::Receiver<StatusEvent>) {
        let (events_tx, events_rx) = flume::unbounded();
        let registry = Arc::new(SessionRegistry::new());

        let room_ctx = RoomContext {
            connector,
            registry: registry.clone(),
            events: events_tx,
            max_consecutive_failures: config.max_consecutive_failures,
        };

        let dispatcher = Self {
            inner: Arc::new(DispatcherInner {
                registry,
                resolver,
                room_ctx,
                config,
            }),
        };
        (dispatcher, events_rx)
    }

    pub fn registry(&self) -> &Arc<SessionRegistry> {
        &self.inner.registry
    }

    /// Acknowledges at once and delivers the outcome when it is known.
    ///
    /// Resolution runs on its own task, so a slow query never holds up other
    /// intents or other rooms.
    pub fn dispatch(&self, room_id: RoomId, intent: Intent) -> oneshot::Receiver<IntentOutcome> {
        let (tx, rx) = oneshot::channel();
        let dispatcher = self.clone();
        tokio::spawn(async move {
            let outcome = dispatcher.handle(&room_id, intent).await;
            let _ = tx.send(outcome);
        });
        rx
    }

    pub async fn handle(&self, room_id: &RoomId, intent: Intent) -> IntentOutcome {
        debug!("[{}] handling {}", room_id, intent.name());
        match intent {
            Intent::Play { query } => IntentOutcome::Play(self.play(room_id, &query).await),
            Intent::Pause => IntentOutcome::Pause(self.pause(room_id).await),
            Intent::Resume => IntentOutcome::Resume(self.resume(room_id).await),
            Intent::Skip => IntentOutcome::Skip(self.skip(room_id).await),
            Intent::Stop => IntentOutcome::Stop(self.stop(room_id).await),
            Intent::Status => IntentOutcome::Status(self.snapshot(room_id).await),
        }
    }

    /// Resolves `query` and plays or queues the best match, joining the room
    /// first when it has no session.
    pub async fn play(&self, room_id: &RoomId, query: &str) -> Result<PlayAck, PlayError> {
        let query = query.trim();
        if query.is_empty() {
            return Err(PlayError::EmptyQuery);
        }

        let track = self
            .resolve(query)
            .await?
            .into_iter()
            .next()
            .ok_or(PlayError::NoResults)?;
        debug!("[{}] '{}' resolved to '{}'", room_id, query, track.title);

        self.enqueue(room_id, track).await
    }

    pub async fn pause(&self, room_id: &RoomId) -> PauseOutcome {
        self.request(room_id, |reply| RoomCommand::Pause { reply })
            .await
            .unwrap_or(PauseOutcome::NoSession)
    }

    pub async fn resume(&self, room_id: &RoomId) -> ResumeOutcome {
        self.request(room_id, |reply| RoomCommand::Resume { reply })
            .await
            .unwrap_or(ResumeOutcome::NoSession)
    }

    pub async fn skip(&self, room_id: &RoomId) -> SkipOutcome {
        self.request(room_id, |reply| RoomCommand::Skip { reply })
            .await
            .unwrap_or(SkipOutcome::NoSession)
    }

    pub async fn stop(&self, room_id: &RoomId) -> StopOutcome {
        self.request(room_id, |reply| RoomCommand::Stop { reply })
            .await
            .unwrap_or(StopOutcome::NoSession)
    }

    pub async fn snapshot(&self, room_id: &RoomId) -> Option<SessionSnapshot> {
        self.request(room_id, |reply| RoomCommand::Snapshot { reply })
            .await
    }

    async fn resolve(&self, query: &str) -> Result<Vec<Track>, ResolveError> {
        let resolution = self.inner.resolver.resolve(query);
        match self.inner.config.resolve_timeout() {
            Some(limit) => tokio::time::timeout(limit, resolution)
                .await
                .map_err(|_| ResolveError::Timeout(limit))?,
            None => resolution.await,
        }
    }

    /// Hands `track` to the room's session. A session that closes while the
    /// request is in flight is replaced and the request delivered again.
    async fn enqueue(&self, room_id: &RoomId, track: Track) -> Result<PlayAck, PlayError> {
        let attempts = self.inner.config.session_attempts.max(1);

        for attempt in 1..=attempts {
            let (handle, created) = self.inner.registry.get_or_create(room_id, |session_id| {
                spawn_room(room_id.clone(), session_id, self.inner.room_ctx.clone())
            });
            if created {
                info!("[{}] creating session {}", room_id, handle.session_id);
            }

            let (reply_tx, reply_rx) = oneshot::channel();
            let command = RoomCommand::Enqueue {
                track: track.clone(),
                reply: reply_tx,
            };
            if handle.send(command).is_err() {
                self.inner
                    .registry
                    .remove_if_current(room_id, handle.session_id);
                continue;
            }
            drop(handle);

            match reply_rx.await {
                Ok(result) => return result,
                Err(_) => debug!(
                    "[{}] session closed before accepting '{}' (attempt {}/{})",
                    room_id, track.title, attempt, attempts
                ),
            }
        }

        warn!(
            "[{}] gave up delivering '{}' after {} attempts",
            room_id, track.title, attempts
        );
        Err(PlayError::SessionUnavailable)
    }

    /// Sends a command to an existing session. `None` when the room has no
    /// session or it closed before answering.
    async fn request<T>(
        &self,
        room_id: &RoomId,
        command: impl FnOnce(oneshot::Sender<T>) -> RoomCommand,
    ) -> Option<T> {
        let handle = self.inner.registry.get(room_id)?;
        let (reply_tx, reply_rx) = oneshot::channel();
        handle.send(command(reply_tx)).ok()?;
        drop(handle);
        reply_rx.await.ok()
    }
}
