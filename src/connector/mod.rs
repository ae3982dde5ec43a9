pub mod client;

pub use client::{ConnectClient, ConnectorError, ConnectorRequest, Registration};
