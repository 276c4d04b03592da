pub mod simulated;
pub mod sink;

pub use simulated::{SimulatedConnector, SimulatedSink};
pub use sink::{AudioSink, FinishCallback, SinkConnector};
