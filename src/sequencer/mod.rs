// Sequencer module
// Client surface of the external sequencer, beat/time conversions, and an
// in-memory sequencer used when no DAW is attached

pub mod client;
pub mod simulated;
pub mod timeline;
pub mod transport;

pub use client::{SequencerClient, SequencerError, SequencerEvent, SequencerResult};
pub use simulated::{SimCall, SimMarkerId, SimulatedSequencer};
pub use timeline::{ClockTime, MusicalTime, Tempo, beat_pulse};
pub use transport::{LoopRegion, Transport, TransportState};
