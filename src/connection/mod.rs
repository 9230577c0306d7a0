// Connection to the sequencer

pub mod reconnect;

pub use reconnect::{ReconnectionStrategy, connect_with_retry};
