pub mod manager;
pub mod sink;

pub use manager::{CloseSummary, StreamManager, WriteOutcome};
pub use sink::{RoleSink, SinkSlot, SinkState};
