// Transport - Playback state and playhead of the simulated sequencer
// Position is kept in beats; an optional loop region wraps the playhead

/// Transport state (play/stop)
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum TransportState {
    #[default]
    Stopped,
    Playing,
}

impl TransportState {
    pub fn is_playing(&self) -> bool {
        matches!(self, TransportState::Playing)
    }
}

/// Loop region in beats, `end` strictly after `start`
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LoopRegion {
    pub start: f64,
    pub end: f64,
}

impl LoopRegion {
    pub fn new(start: f64, end: f64) -> Self {
        assert!(end > start, "Loop end must be after start");
        Self { start, end }
    }

    pub fn length(&self) -> f64 {
        self.end - self.start
    }
}

/// Playback state, playhead, metronome and loop
#[derive(Debug, Clone, Default)]
pub struct Transport {
    state: TransportState,
    position: f64,
    metronome: bool,
    loop_region: Option<LoopRegion>,
}

impl Transport {
    pub fn is_playing(&self) -> bool {
        self.state.is_playing()
    }

    /// Playhead in beats
    pub fn position(&self) -> f64 {
        self.position
    }

    pub fn set_position(&mut self, beats: f64) {
        self.position = beats.max(0.0);
    }

    pub fn play(&mut self) {
        self.state = TransportState::Playing;
    }

    /// Stop, keeping the playhead where it is
    pub fn stop(&mut self) {
        self.state = TransportState::Stopped;
    }

    pub fn metronome(&self) -> bool {
        self.metronome
    }

    pub fn set_metronome(&mut self, enabled: bool) {
        self.metronome = enabled;
    }

    pub fn set_loop_region(&mut self, region: Option<LoopRegion>) {
        self.loop_region = region;
    }

    /// Advance the playhead by `delta` beats
    /// Returns the new position, or None while stopped
    pub fn advance(&mut self, delta: f64) -> Option<f64> {
        if !self.is_playing() {
            return None;
        }

        let mut new_pos = self.position + delta;

        if let Some(region) = self.loop_region {
            // Only wrap when the playhead entered the loop before crossing its end
            if self.position < region.end && new_pos >= region.end && self.position >= region.start
            {
                let overflow = new_pos - region.end;
                new_pos = region.start + overflow % region.length();
            }
        }

        self.position = new_pos;
        Some(new_pos)
    }
}
