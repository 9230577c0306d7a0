// Timeline - Beat-based time representation
// Conversions from sequencer beats to wall-clock and musical display formats

use std::fmt;
use std::time::Duration;

/// Beats per second used for every wall-clock display.
///
/// The live tempo is never queried: the display assumes 120 BPM for all songs.
/// Segments played at another tempo show a skewed elapsed/remaining time.
pub const FIXED_BEATS_PER_SECOND: f64 = 2.0;

/// Bars are always counted in 4/4
pub const BEATS_PER_BAR: f64 = 4.0;

/// Subdivisions of a beat shown in musical time (sixteenth notes)
pub const SUBDIVISIONS_PER_BEAT: f64 = 4.0;

/// Tempo in BPM (Beats Per Minute)
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Tempo {
    bpm: f64,
}

impl Tempo {
    /// Accepted BPM range
    pub const MIN_BPM: f64 = 20.0;
    pub const MAX_BPM: f64 = 999.0;

    /// Creates a new tempo
    /// BPM must be in range [20.0, 999.0]
    pub fn new(bpm: f64) -> Self {
        assert!(
            (Self::MIN_BPM..=Self::MAX_BPM).contains(&bpm),
            "BPM must be between 20 and 999"
        );
        Self { bpm }
    }

    /// Get BPM value
    pub fn bpm(&self) -> f64 {
        self.bpm
    }

    /// Duration of one beat in seconds
    pub fn beat_duration_seconds(&self) -> f64 {
        60.0 / self.bpm
    }

    /// Number of beats the playhead covers during `elapsed`
    pub fn beats_in(&self, elapsed: Duration) -> f64 {
        elapsed.as_secs_f64() / self.beat_duration_seconds()
    }
}

impl Default for Tempo {
    fn default() -> Self {
        Self::new(120.0)
    }
}

impl fmt::Display for Tempo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:.1} BPM", self.bpm)
    }
}

/// Wall-clock `mm:ss` display derived from a beat count
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ClockTime {
    pub minutes: u64,
    pub seconds: u8,
}

impl ClockTime {
    pub fn zero() -> Self {
        Self::default()
    }

    /// Convert beats using `FIXED_BEATS_PER_SECOND`
    /// Negative spans (playhead slightly before a marker) show as zero
    pub fn from_beats(beats: f64) -> Self {
        let total_seconds = (beats / FIXED_BEATS_PER_SECOND).max(0.0);
        if !total_seconds.is_finite() {
            return Self::zero();
        }

        Self {
            minutes: (total_seconds / 60.0).floor() as u64,
            seconds: (total_seconds % 60.0).floor() as u8,
        }
    }
}

impl fmt::Display for ClockTime {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:02}:{:02}", self.minutes, self.seconds)
    }
}

/// Musical `bars : beat : sixteenth` display of a beat count
///
/// `bars` is a count (0-based), `beat` and `sixteenth` are positions (1-based).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct MusicalTime {
    pub bars: u64,
    pub beat: u8,
    pub sixteenth: u8,
}

impl MusicalTime {
    pub fn zero() -> Self {
        Self::new(0, 1, 1)
    }

    pub fn new(bars: u64, beat: u8, sixteenth: u8) -> Self {
        Self {
            bars,
            beat,
            sixteenth,
        }
    }

    /// Negative counts clamp to zero
    pub fn from_beats(beats: f64) -> Self {
        let beats = beats.max(0.0);
        if !beats.is_finite() {
            return Self::zero();
        }

        let bars = (beats / BEATS_PER_BAR).floor() as u64;
        let beat = (beats % BEATS_PER_BAR).floor() as u8 + 1;
        let sixteenth = ((beats % 1.0) * SUBDIVISIONS_PER_BEAT).floor() as u8 + 1;

        Self::new(bars, beat, sixteenth)
    }
}

impl Default for MusicalTime {
    fn default() -> Self {
        Self::zero()
    }
}

impl fmt::Display for MusicalTime {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} : {} : {}", self.bars, self.beat, self.sixteenth)
    }
}

/// Visual heartbeat: 1-4, cycling on every whole beat
pub fn beat_pulse(position: f64) -> u8 {
    if !position.is_finite() {
        return 1;
    }
    (position.floor().rem_euclid(BEATS_PER_BAR)) as u8 + 1
}
