// Sequencer client - Surface of the external sequencer consumed by the HUD
// Property reads/writes, transport control, cue point enumeration and jumps

use tokio::sync::mpsc::UnboundedReceiver;

/// Result type for sequencer calls
pub type SequencerResult<T> = Result<T, SequencerError>;

/// Errors reported by the sequencer connection
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum SequencerError {
    #[error("Sequencer is not connected")]
    NotConnected,

    #[error("Failed to read property '{property}': {reason}")]
    PropertyRead {
        property: &'static str,
        reason: String,
    },

    #[error("Failed to write property '{property}': {reason}")]
    PropertyWrite {
        property: &'static str,
        reason: String,
    },

    #[error("Marker no longer exists in the sequencer")]
    MarkerGone,

    #[error("Sequencer call failed: {0}")]
    CallFailed(String),
}

/// Notifications pushed by the sequencer
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum SequencerEvent {
    /// Playhead moved (beats)
    Position(f64),
    /// Cue points were added, removed, renamed or moved
    MarkersChanged,
    PlayingChanged(bool),
    MetronomeChanged(bool),
}

/// Connection to the sequencer driving the show
///
/// Calls suspend while the sequencer answers. Nothing guarantees that state
/// read by one call still holds when the next call lands.
#[allow(async_fn_in_trait)]
pub trait SequencerClient {
    /// Opaque reference to a cue point, only handed back to `jump_to_marker`
    type Handle: Clone;

    async fn connect(&self) -> SequencerResult<()>;

    /// Subscribe to property-change notifications
    fn subscribe(&self) -> UnboundedReceiver<SequencerEvent>;

    async fn is_playing(&self) -> SequencerResult<bool>;

    async fn metronome(&self) -> SequencerResult<bool>;

    async fn set_metronome(&self, enabled: bool) -> SequencerResult<()>;

    async fn start_playing(&self) -> SequencerResult<()>;

    async fn stop_playing(&self) -> SequencerResult<()>;

    /// Native "jump to next cue" navigation
    async fn jump_to_next_marker(&self) -> SequencerResult<()>;

    /// Native "jump to previous cue" navigation
    async fn jump_to_prev_marker(&self) -> SequencerResult<()>;

    /// Cue points in the sequencer's own order
    async fn markers(&self) -> SequencerResult<Vec<Self::Handle>>;

    async fn marker_name(&self, marker: &Self::Handle) -> SequencerResult<String>;

    /// Cue point position in beats
    async fn marker_time(&self, marker: &Self::Handle) -> SequencerResult<f64>;

    async fn jump_to_marker(&self, marker: &Self::Handle) -> SequencerResult<()>;
}
