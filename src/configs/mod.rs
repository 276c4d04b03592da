pub mod base;
pub mod logging;
pub mod player;
pub mod resolver;
pub mod sink;

pub use base::*;
pub use logging::*;
pub use player::*;
pub use resolver::*;
pub use sink::*;
