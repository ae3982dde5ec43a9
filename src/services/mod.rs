pub mod feeder;
pub mod iteration;

pub use feeder::{FeedLoop, LoopReport, LoopState, RunMode, StopReason};
pub use iteration::IterationRunner;
