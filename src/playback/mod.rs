pub mod actor;
pub mod queue;
pub mod session;
pub mod state;
pub mod track;

pub use queue::RoomQueue;
pub use session::PlaybackSession;
pub use state::{PlaybackState, SessionSnapshot};
pub use track::Track;
