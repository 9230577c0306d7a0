// Timeline module
// Playhead interpretation: current/next segment, progress and the broadcast snapshot

pub mod engine;
pub mod snapshot;

pub use engine::{DEFAULT_MARKER_TOLERANCE, Resolution, SegmentProgress, TimelineEngine, resolve};
pub use snapshot::TimelineSnapshot;
