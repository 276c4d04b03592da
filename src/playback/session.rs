use tokio::sync::mpsc;
use tracing::{debug, info, warn};

use super::{
    actor::RoomCommand,
    queue::RoomQueue,
    state::{PlaybackState, SessionSnapshot},
    track::Track,
};
use crate::{
    audio::AudioSink,
    common::{
        Severity, SinkError,
        types::{RoomId, SessionId},
    },
    protocol::{
        CloseReason, PauseOutcome, PlayAck, ResumeOutcome, SkipOutcome, StatusEvent, StopOutcome,
    },
};

/// One room's playback state machine.
///
/// Owns the room's queue and its sink. Every method must be called from the
/// room's own task; sink completions come back through the room inbox as
/// [`RoomCommand::TrackFinished`] instead of touching the session directly.
pub struct PlaybackSession {
    room_id: RoomId,
    session_id: SessionId,
    queue: RoomQueue,
    sink: Option<Box<dyn AudioSink>>,
    state: PlaybackState,
    current: Option<Track>,
    /// Id of the latest `AudioSink::play` call; completions for older ids are stale.
    play_id: u64,
    consecutive_failures: u32,
    max_consecutive_failures: u32,
    inbox: mpsc::UnboundedSender<RoomCommand>,
    events: flume::Sender<StatusEvent>,
}

impl PlaybackSession {
    pub(crate) fn new(
        room_id: RoomId,
        session_id: SessionId,
        sink: Box<dyn AudioSink>,
        inbox: mpsc::UnboundedSender<RoomCommand>,
        events: flume::Sender<StatusEvent>,
        max_consecutive_failures: u32,
    ) -> Self {
        Self {
            room_id,
            session_id,
            queue: RoomQueue::new(),
            sink: Some(sink),
            state: PlaybackState::Idle,
            current: None,
            play_id: 0,
            consecutive_failures: 0,
            max_consecutive_failures,
            inbox,
            events,
        }
    }

    pub fn state(&self) -> PlaybackState {
        self.state
    }

    pub fn current(&self) -> Option<&Track> {
        self.current.as_ref()
    }

    pub fn queue(&self) -> &RoomQueue {
        &self.queue
    }

    pub fn has_sink(&self) -> bool {
        self.sink.is_some()
    }

    pub fn snapshot(&self) -> SessionSnapshot {
        SessionSnapshot {
            room_id: self.room_id.clone(),
            session_id: self.session_id,
            state: self.state,
            current: self.current.clone(),
            queue: self.queue.iter().cloned().collect(),
        }
    }

    /// Appends `track`; starts it right away when the room is idle.
    pub fn enqueue(&mut self, track: Track) -> PlayAck {
        let position = self.queue.enqueue(track.clone());

        if self.state == PlaybackState::Idle {
            if let Some(started) = self.start_next() {
                return PlayAck::NowPlaying { track: started };
            }
        }

        debug!(
            "[{}] queued '{}' at position {}",
            self.room_id, track.title, position
        );
        self.emit(StatusEvent::Queued {
            room_id: self.room_id.clone(),
            track: track.clone(),
            position,
        });
        PlayAck::Queued { track, position }
    }

    pub fn pause(&mut self) -> PauseOutcome {
        if self.state != PlaybackState::Playing {
            return PauseOutcome::NothingPlaying;
        }
        let Some(sink) = self.sink.as_mut() else {
            return PauseOutcome::NothingPlaying;
        };

        sink.pause();
        self.state = PlaybackState::Paused;
        if let Some(track) = self.current.clone() {
            self.emit(StatusEvent::Paused {
                room_id: self.room_id.clone(),
                track,
            });
        }
        PauseOutcome::Paused
    }

    pub fn resume(&mut self) -> ResumeOutcome {
        if self.state != PlaybackState::Paused {
            return ResumeOutcome::NothingPaused;
        }
        let Some(sink) = self.sink.as_mut() else {
            return ResumeOutcome::NothingPaused;
        };

        sink.resume();
        self.state = PlaybackState::Playing;
        if let Some(track) = self.current.clone() {
            self.emit(StatusEvent::Resumed {
                room_id: self.room_id.clone(),
                track,
            });
        }
        ResumeOutcome::Resumed
    }

    /// Ends the current track early. The queue only advances once the sink's
    /// completion arrives, so there is a single path that starts tracks.
    pub fn skip(&mut self) -> SkipOutcome {
        if !self.state.is_active() {
            return SkipOutcome::NothingPlaying;
        }
        let (Some(sink), Some(track)) = (self.sink.as_mut(), self.current.clone()) else {
            return SkipOutcome::NothingPlaying;
        };

        sink.stop();
        info!("[{}] skipped '{}'", self.room_id, track.title);
        self.emit(StatusEvent::Skipped {
            room_id: self.room_id.clone(),
            track: track.clone(),
        });
        SkipOutcome::Skipped { track }
    }

    /// Drops the queue, stops the sink and leaves the room.
    pub async fn stop(&mut self) -> StopOutcome {
        let discarded = self.teardown(CloseReason::Stopped).await;
        StopOutcome::Stopped { discarded }
    }

    /// Handles a sink completion. Returns the close reason when the session
    /// has torn itself down.
    pub async fn on_track_finished(
        &mut self,
        play_id: u64,
        error: Option<SinkError>,
    ) -> Option<CloseReason> {
        if play_id != self.play_id || !self.state.is_active() {
            debug!(
                "[{}] ignoring stale completion for play {} (current {})",
                self.room_id, play_id, self.play_id
            );
            return None;
        }

        let finished = self.current.take();
        self.state = PlaybackState::Idle;

        match error {
            Some(err) => {
                self.consecutive_failures += 1;
                warn!(
                    "[{}] track failed ({} in a row): {}",
                    self.room_id, self.consecutive_failures, err
                );
                if let Some(track) = finished {
                    self.emit(StatusEvent::TrackFailed {
                        room_id: self.room_id.clone(),
                        track,
                        message: err.to_string(),
                        severity: Severity::Fault,
                    });
                }

                if self.max_consecutive_failures > 0
                    && self.consecutive_failures >= self.max_consecutive_failures
                {
                    warn!(
                        "[{}] giving up after {} failed tracks",
                        self.room_id, self.consecutive_failures
                    );
                    self.teardown(CloseReason::TooManyFailures).await;
                    return Some(CloseReason::TooManyFailures);
                }
            }
            None => self.consecutive_failures = 0,
        }

        if self.start_next().is_some() {
            return None;
        }

        self.teardown(CloseReason::QueueDrained).await;
        Some(CloseReason::QueueDrained)
    }

    /// Pops the head of the queue and hands it to the sink.
    fn start_next(&mut self) -> Option<Track> {
        let sink = self.sink.as_mut()?;
        let track = self.queue.dequeue()?;

        self.play_id += 1;
        let play_id = self.play_id;
        let inbox = self.inbox.clone();
        sink.play(
            &track,
            Box::new(move |error| {
                let _ = inbox.send(RoomCommand::TrackFinished { play_id, error });
            }),
        );

        self.state = PlaybackState::Playing;
        self.current = Some(track.clone());

        info!("[{}] now playing '{}'", self.room_id, track.title);
        self.emit(StatusEvent::NowPlaying {
            room_id: self.room_id.clone(),
            track: track.clone(),
        });
        Some(track)
    }

    /// Returns how many tracks were discarded, the current one included.
    /// `SessionClosed` is left to the room task, which publishes it once the
    /// room is unregistered.
    async fn teardown(&mut self, reason: CloseReason) -> usize {
        let mut discarded = self.queue.clear();
        if self.current.take().is_some() {
            discarded += 1;
        }

        if let Some(mut sink) = self.sink.take() {
            if self.state.is_active() {
                sink.stop();
            }
            sink.disconnect().await;
        }
        self.state = PlaybackState::Idle;

        info!(
            "[{}] session {} closed ({:?}, {} tracks discarded)",
            self.room_id, self.session_id, reason, discarded
        );
        discarded
    }

    fn emit(&self, event: StatusEvent) {
        let _ = self.events.send(event);
    }
}
