// LiveHUD - Stage display for a live sequencer timeline

pub mod command;
pub mod config;
pub mod connection;
pub mod hud;
pub mod marker;
pub mod messaging;
pub mod sequencer;
pub mod server;
pub mod timeline;

// Re-export commonly used types for convenience
pub use command::{CommandDispatcher, CommandOutcome, PanicOutcome};
pub use config::{ConfigError, HudConfig};
pub use hud::{Hud, HudError};
pub use marker::{Marker, MarkerCache, MarkerLabel, PanicMarker};
pub use messaging::{Broadcast, BroadcastGateway, HudCommand, create_command_channel};
pub use sequencer::{
    ClockTime, MusicalTime, SequencerClient, SequencerError, SequencerEvent, SimulatedSequencer,
    Tempo,
};
pub use timeline::{TimelineEngine, TimelineSnapshot};
