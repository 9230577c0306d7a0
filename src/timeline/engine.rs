// Timeline engine - Resolves the playhead against the marker set
// Current/next marker lookup, segment progress, elapsed and remaining time

use super::snapshot::{END_LABEL, LOOP_LABEL, NO_REMAINING_MUSICAL, TimelineSnapshot};
use crate::marker::cache::Marker;
use crate::marker::parser::PanicMarker;
use crate::sequencer::timeline::{ClockTime, MusicalTime, beat_pulse};

/// Forward tolerance (beats) absorbing position jitter at a marker boundary
pub const DEFAULT_MARKER_TOLERANCE: f64 = 0.1;

/// Current and next marker for a playhead position
#[derive(Debug, PartialEq)]
pub struct Resolution<'a, H> {
    pub current: &'a Marker<H>,
    pub next: Option<&'a Marker<H>>,
}

/// Find the last marker at or before `position + tolerance`, and the one after it
///
/// Linear scan: tied or closely spaced markers resolve to the one listed last.
pub fn resolve<H>(markers: &[Marker<H>], position: f64, tolerance: f64) -> Option<Resolution<'_, H>> {
    let mut current = None;
    for (index, marker) in markers.iter().enumerate() {
        if marker.time <= position + tolerance {
            current = Some(index);
        }
    }

    current.map(|index| Resolution {
        current: &markers[index],
        next: markers.get(index + 1),
    })
}

/// Progress through a segment that has a next marker
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SegmentProgress {
    pub progress: f64,
    pub elapsed: ClockTime,
    pub remaining: ClockTime,
    pub remaining_musical: MusicalTime,
}

impl SegmentProgress {
    pub fn compute(start: f64, end: f64, position: f64) -> Self {
        let duration = end - start;
        let into_segment = position - start;
        let remaining = end - position;

        // Zero-length segments only appear with unsorted markers
        let progress = if duration > 0.0 {
            (into_segment / duration).clamp(0.0, 1.0)
        } else {
            1.0
        };

        Self {
            progress,
            elapsed: ClockTime::from_beats(into_segment),
            remaining: ClockTime::from_beats(remaining),
            remaining_musical: MusicalTime::from_beats(remaining),
        }
    }
}

/// Builds a fresh snapshot for every playhead update
#[derive(Debug, Clone, Copy)]
pub struct TimelineEngine {
    tolerance: f64,
}

impl TimelineEngine {
    pub fn new(tolerance: f64) -> Self {
        Self { tolerance }
    }

    /// Compute the snapshot for `position`
    ///
    /// Before the first marker the marker-derived fields keep their previous
    /// values and only the beat pulse moves. Flags and the marker list are
    /// carried over from `previous`.
    pub fn on_position<H>(
        &self,
        previous: &TimelineSnapshot,
        markers: &[Marker<H>],
        position: f64,
    ) -> TimelineSnapshot {
        let mut snapshot = previous.clone();
        snapshot.beat = beat_pulse(position);

        let Some(Resolution { current, next }) = resolve(markers, position, self.tolerance) else {
            return snapshot;
        };

        let label = current.label();
        snapshot.segment_order = label.order;
        snapshot.segment_title = label.title;
        snapshot.segment_feature = label.feature;

        match next {
            Some(next) => {
                let segment = SegmentProgress::compute(current.time, next.time, position);
                snapshot.next_title = next.label().title;
                snapshot.progress = segment.progress;
                snapshot.elapsed = segment.elapsed.to_string();
                snapshot.remaining = segment.remaining.to_string();
                snapshot.remaining_musical = segment.remaining_musical.to_string();
            }
            None => {
                // Elapsed keeps its last value once the final marker is reached
                snapshot.next_title = if current.panic_kind() == Some(PanicMarker::Entry) {
                    LOOP_LABEL.to_string()
                } else {
                    END_LABEL.to_string()
                };
                snapshot.remaining = ClockTime::zero().to_string();
                snapshot.remaining_musical = NO_REMAINING_MUSICAL.to_string();
                snapshot.progress = 0.0;
            }
        }

        snapshot
    }
}

impl Default for TimelineEngine {
    fn default() -> Self {
        Self::new(DEFAULT_MARKER_TOLERANCE)
    }
}
