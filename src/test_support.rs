//! Scripted collaborators for exercising sessions without a real transport.

use std::{
    collections::HashMap,
    sync::{
        Arc,
        atomic::{AtomicUsize, Ordering},
    },
    time::Duration,
};

use async_trait::async_trait;
use parking_lot::Mutex;

use crate::{
    audio::{AudioSink, FinishCallback, SinkConnector},
    common::{ResolveError, SinkError, types::RoomId},
    playback::Track,
    sources::TrackResolver,
};

pub fn track(title: &str) -> Track {
    Track::new(format!("https://cdn.example/{}.opus", title.replace(' ', "-")), title)
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SinkCall {
    Play(String),
    Pause,
    Resume,
    Stop,
    Disconnect,
}

#[derive(Default)]
struct SinkInner {
    calls: Vec<SinkCall>,
    pending: Option<FinishCallback>,
    playing: bool,
    paused: bool,
}

/// Sink that records every call. `stop` completes the current track inline;
/// natural completions are fired by the test through [`SinkProbe::finish`].
pub struct RecordingSink {
    inner: Arc<Mutex<SinkInner>>,
}

/// Test-side view of a [`RecordingSink`].
#[derive(Clone)]
pub struct SinkProbe {
    inner: Arc<Mutex<SinkInner>>,
}

pub fn recording_sink() -> (RecordingSink, SinkProbe) {
    let inner = Arc::new(Mutex::new(SinkInner::default()));
    (
        RecordingSink {
            inner: inner.clone(),
        },
        SinkProbe { inner },
    )
}

fn complete(inner: &Mutex<SinkInner>, error: Option<SinkError>) -> bool {
    let callback = {
        let mut inner = inner.lock();
        inner.playing = false;
        inner.paused = false;
        inner.pending.take()
    };
    match callback {
        Some(callback) => {
            callback(error);
            true
        }
        None => false,
    }
}

#[async_trait]
impl AudioSink for RecordingSink {
    fn play(&mut self, track: &Track, on_finished: FinishCallback) {
        let mut inner = self.inner.lock();
        inner.calls.push(SinkCall::Play(track.title.to_string()));
        inner.pending = Some(on_finished);
        inner.playing = true;
        inner.paused = false;
    }

    fn pause(&mut self) {
        let mut inner = self.inner.lock();
        inner.calls.push(SinkCall::Pause);
        if inner.playing {
            inner.playing = false;
            inner.paused = true;
        }
    }

    fn resume(&mut self) {
        let mut inner = self.inner.lock();
        inner.calls.push(SinkCall::Resume);
        if inner.paused {
            inner.playing = true;
            inner.paused = false;
        }
    }

    fn stop(&mut self) {
        self.inner.lock().calls.push(SinkCall::Stop);
        complete(&self.inner, None);
    }

    async fn disconnect(&mut self) {
        self.inner.lock().calls.push(SinkCall::Disconnect);
        complete(&self.inner, Some(SinkError::Closed));
    }

    fn is_playing(&self) -> bool {
        self.inner.lock().playing
    }

    fn is_paused(&self) -> bool {
        self.inner.lock().paused
    }
}

impl SinkProbe {
    /// Completes the current track as the transport would. Returns `false`
    /// when nothing was playing.
    pub fn finish(&self, error: Option<SinkError>) -> bool {
        complete(&self.inner, error)
    }

    pub fn calls(&self) -> Vec<SinkCall> {
        self.inner.lock().calls.clone()
    }

    pub fn plays(&self) -> Vec<String> {
        self.inner
            .lock()
            .calls
            .iter()
            .filter_map(|c| match c {
                SinkCall::Play(title) => Some(title.clone()),
                _ => None,
            })
            .collect()
    }

    pub fn is_playing(&self) -> bool {
        self.inner.lock().playing
    }

    pub fn is_paused(&self) -> bool {
        self.inner.lock().paused
    }
}

/// Connector handing out [`RecordingSink`]s and keeping every probe, newest last.
#[derive(Default)]
pub struct RecordingConnector {
    probes: Mutex<HashMap<RoomId, Vec<SinkProbe>>>,
    refuse: Mutex<Option<String>>,
    connects: AtomicUsize,
}

impl RecordingConnector {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    /// Makes every following connection attempt fail with `message`.
    pub fn refuse(&self, message: &str) {
        *self.refuse.lock() = Some(message.to_string());
    }

    pub fn probe(&self, room: &str) -> Option<SinkProbe> {
        self.probes
            .lock()
            .get(&RoomId::from(room))
            .and_then(|p| p.last().cloned())
    }

    pub fn connects(&self) -> usize {
        self.connects.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl SinkConnector for RecordingConnector {
    async fn connect(&self, room: &RoomId) -> Result<Box<dyn AudioSink>, SinkError> {
        self.connects.fetch_add(1, Ordering::SeqCst);
        if let Some(message) = self.refuse.lock().clone() {
            return Err(SinkError::Connect(message));
        }

        let (sink, probe) = recording_sink();
        self.probes
            .lock()
            .entry(room.clone())
            .or_default()
            .push(probe);
        Ok(Box::new(sink))
    }
}

enum Scripted {
    Tracks(Vec<Track>),
    Fail(String),
    Hang,
}

/// Resolver answering from a table. Unknown queries resolve to one track
/// titled after the query.
#[derive(Default)]
pub struct TableResolver {
    table: Mutex<HashMap<String, Scripted>>,
    delay: Mutex<Option<Duration>>,
    calls: AtomicUsize,
}

impl TableResolver {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn nothing_for(&self, query: &str) {
        self.table
            .lock()
            .insert(query.to_string(), Scripted::Tracks(Vec::new()));
    }

    pub fn fail_for(&self, query: &str, message: &str) {
        self.table
            .lock()
            .insert(query.to_string(), Scripted::Fail(message.to_string()));
    }

    pub fn hang_for(&self, query: &str) {
        self.table.lock().insert(query.to_string(), Scripted::Hang);
    }

    pub fn many_for(&self, query: &str, titles: &[&str]) {
        self.table.lock().insert(
            query.to_string(),
            Scripted::Tracks(titles.iter().map(|t| track(t)).collect()),
        );
    }

    /// Every resolution sleeps this long first.
    pub fn delay_all(&self, delay: Duration) {
        *self.delay.lock() = Some(delay);
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl TrackResolver for TableResolver {
    fn name(&self) -> &str {
        "table"
    }

    fn can_handle(&self, _query: &str) -> bool {
        true
    }

    async fn resolve(&self, query: &str) -> Result<Vec<Track>, ResolveError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        let delay = *self.delay.lock();
        if let Some(delay) = delay {
            tokio::time::sleep(delay).await;
        }

        let scripted = match self.table.lock().get(query) {
            Some(Scripted::Tracks(tracks)) => Some(Ok(tracks.clone())),
            Some(Scripted::Fail(message)) => Some(Err(ResolveError::Process(message.clone()))),
            Some(Scripted::Hang) => None,
            None => Some(Ok(vec![track(query)])),
        };
        match scripted {
            Some(result) => result,
            None => std::future::pending().await,
        }
    }
}
