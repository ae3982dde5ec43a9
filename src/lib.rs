pub mod adapters;
pub mod cli;
pub mod config;
pub mod connector;
pub mod db;
pub mod domain;
pub mod error;
pub mod generator;
pub mod ports;
pub mod services;

pub use error::{FeederError, IterationError};
pub use services::feeder::{FeedLoop, LoopReport, RunMode, StopReason};
