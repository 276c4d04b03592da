use std::{
    sync::{
        Arc,
        atomic::{AtomicU8, Ordering},
    },
    time::Duration,
};

use async_trait::async_trait;
use tokio::time::Instant;
use tracing::debug;

use super::sink::{AudioSink, FinishCallback, SinkConnector};
use crate::{
    common::{SinkError, types::RoomId},
    configs::SinkConfig,
    playback::Track,
};

#[derive(Clone, Copy, Debug, PartialEq)]
#[repr(u8)]
enum SinkState {
    Idle = 0,
    Playing = 1,
    Paused = 2,
}

impl SinkState {
    fn from_u8(v: u8) -> Self {
        match v {
            1 => Self::Playing,
            2 => Self::Paused,
            _ => Self::Idle,
        }
    }
}

enum SinkCommand {
    Pause,
    Resume,
    Stop,
}

/// A transport that streams nothing: each track "plays" for a fixed duration
/// on a background task, honouring pause, resume and stop.
pub struct SimulatedSink {
    room: RoomId,
    track_duration: Duration,
    state: Arc<AtomicU8>,
    command_tx: Option<flume::Sender<SinkCommand>>,
    connected: bool,
}

impl SimulatedSink {
    pub fn new(room: RoomId, track_duration: Duration) -> Self {
        Self {
            room,
            track_duration,
            state: Arc::new(AtomicU8::new(SinkState::Idle as u8)),
            command_tx: None,
            connected: true,
        }
    }

    fn state(&self) -> SinkState {
        SinkState::from_u8(self.state.load(Ordering::Acquire))
    }

    fn send(&self, command: SinkCommand) {
        if let Some(tx) = &self.command_tx {
            let _ = tx.send(command);
        }
    }
}

#[async_trait]
impl AudioSink for SimulatedSink {
    fn play(&mut self, track: &Track, on_finished: FinishCallback) {
        if !self.connected {
            on_finished(Some(SinkError::Closed));
            return;
        }

        let (tx, rx) = flume::unbounded();
        self.command_tx = Some(tx);
        self.state
            .store(SinkState::Playing as u8, Ordering::Release);

        debug!("[{}] simulated stream started: {}", self.room, track.stream_ref);
        tokio::spawn(run_track(
            self.room.clone(),
            self.track_duration,
            rx,
            self.state.clone(),
            on_finished,
        ));
    }

    fn pause(&mut self) {
        if self.state() == SinkState::Playing {
            self.state.store(SinkState::Paused as u8, Ordering::Release);
            self.send(SinkCommand::Pause);
        }
    }

    fn resume(&mut self) {
        if self.state() == SinkState::Paused {
            self.state
                .store(SinkState::Playing as u8, Ordering::Release);
            self.send(SinkCommand::Resume);
        }
    }

    fn stop(&mut self) {
        self.send(SinkCommand::Stop);
    }

    async fn disconnect(&mut self) {
        self.stop();
        self.command_tx = None;
        self.connected = false;
        debug!("[{}] simulated sink disconnected", self.room);
    }

    fn is_playing(&self) -> bool {
        self.state() == SinkState::Playing
    }

    fn is_paused(&self) -> bool {
        self.state() == SinkState::Paused
    }
}

async fn run_track(
    room: RoomId,
    duration: Duration,
    command_rx: flume::Receiver<SinkCommand>,
    state: Arc<AtomicU8>,
    on_finished: FinishCallback,
) {
    let mut remaining = duration;
    let mut resumed_at = Instant::now();
    let mut paused = false;

    loop {
        if paused {
            match command_rx.recv_async().await {
                Ok(SinkCommand::Resume) => {
                    paused = false;
                    resumed_at = Instant::now();
                }
                Ok(SinkCommand::Pause) => {}
                Ok(SinkCommand::Stop) | Err(_) => break,
            }
            continue;
        }

        tokio::select! {
            _ = tokio::time::sleep(remaining) => break,
            command = command_rx.recv_async() => match command {
                Ok(SinkCommand::Pause) => {
                    remaining = remaining.saturating_sub(resumed_at.elapsed());
                    paused = true;
                }
                Ok(SinkCommand::Resume) => {}
                Ok(SinkCommand::Stop) | Err(_) => break,
            },
        }
    }

    state.store(SinkState::Idle as u8, Ordering::Release);
    debug!("[{}] simulated stream ended", room);
    on_finished(None);
}

/// Hands out a [`SimulatedSink`] per room.
pub struct SimulatedConnector {
    track_duration: Duration,
}

impl SimulatedConnector {
    pub fn new(config: &SinkConfig) -> Self {
        Self {
            track_duration: Duration::from_millis(config.track_duration_ms),
        }
    }
}

#[async_trait]
impl SinkConnector for SimulatedConnector {
    async fn connect(&self, room: &RoomId) -> Result<Box<dyn AudioSink>, SinkError> {
        debug!("[{}] simulated sink connected", room);
        Ok(Box::new(SimulatedSink::new(room.clone(), self.track_duration)))
    }
}
