pub mod events;
pub mod intents;

pub use events::{CloseReason, StatusEvent};
pub use intents::*;
