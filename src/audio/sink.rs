use async_trait::async_trait;

use crate::{
    common::{SinkError, types::RoomId},
    playback::Track,
};

/// Invoked exactly once per [`AudioSink::play`] call: `None` when the stream
/// ended (naturally or through [`AudioSink::stop`]), `Some` when the transport
/// failed. May run on any thread, including inline inside `play`.
pub type FinishCallback = Box<dyn FnOnce(Option<SinkError>) + Send + 'static>;

/// Per-room handle to the audio transport.
///
/// A sink streams at most one track at a time. Callers never start a new track
/// before the previous track's [`FinishCallback`] has fired.
#[async_trait]
pub trait AudioSink: Send {
    /// Start streaming `track`. Start-up failures are reported through
    /// `on_finished`, never by panicking or returning early without calling it.
    fn play(&mut self, track: &Track, on_finished: FinishCallback);

    /// Suspend decoding; the track stays loaded.
    fn pause(&mut self);

    fn resume(&mut self);

    /// End the current track early. Its `on_finished` fires with `None`.
    fn stop(&mut self);

    /// Leave the room. The sink is unusable afterwards.
    async fn disconnect(&mut self);

    fn is_playing(&self) -> bool;

    fn is_paused(&self) -> bool;
}

/// Opens room connections, producing one [`AudioSink`] per session.
#[async_trait]
pub trait SinkConnector: Send + Sync {
    async fn connect(&self, room: &RoomId) -> Result<Box<dyn AudioSink>, SinkError>;
}
