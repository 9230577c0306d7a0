// Timeline snapshot - Complete display state broadcast to observers
// Every change produces a new value; snapshots are never mutated once published

use crate::marker::parser::MarkerLabel;
use serde::{Deserialize, Serialize};

/// Title shown until the playhead reaches the first marker
pub const WAITING_TITLE: &str = "ESPERANDO...";

/// Next title when the last marker is the silence loop entry
pub const LOOP_LABEL: &str = "LOOP SILENCIO";

/// Next title after the last marker of the set
pub const END_LABEL: &str = "FIN DEL SET";

/// Musical remaining time when there is no next marker
pub const NO_REMAINING_MUSICAL: &str = "-";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TimelineSnapshot {
    pub segment_order: String,
    pub segment_title: String,
    pub segment_feature: String,
    pub next_title: String,
    /// `mm:ss`
    pub elapsed: String,
    /// `mm:ss`
    pub remaining: String,
    /// `bars : beat : sixteenth`
    pub remaining_musical: String,
    /// 0.0 to 1.0
    pub progress: f64,
    pub is_playing: bool,
    pub metronome_on: bool,
    /// 1 to 4
    pub beat: u8,
    pub visible_marker_names: Vec<String>,
}

impl TimelineSnapshot {
    /// State shown before any marker has been resolved
    pub fn initial() -> Self {
        Self {
            segment_order: String::new(),
            segment_title: WAITING_TITLE.to_string(),
            segment_feature: String::new(),
            next_title: String::new(),
            elapsed: "00:00".to_string(),
            remaining: "00:00".to_string(),
            remaining_musical: String::new(),
            progress: 0.0,
            is_playing: false,
            metronome_on: false,
            beat: 1,
            visible_marker_names: Vec::new(),
        }
    }

    /// Label fields of the current segment
    pub fn segment(&self) -> MarkerLabel {
        MarkerLabel {
            order: self.segment_order.clone(),
            title: self.segment_title.clone(),
            feature: self.segment_feature.clone(),
        }
    }

    pub fn with_playing(&self, is_playing: bool) -> Self {
        Self {
            is_playing,
            ..self.clone()
        }
    }

    pub fn with_metronome(&self, metronome_on: bool) -> Self {
        Self {
            metronome_on,
            ..self.clone()
        }
    }

    pub fn with_visible_marker_names(&self, visible_marker_names: Vec<String>) -> Self {
        Self {
            visible_marker_names,
            ..self.clone()
        }
    }
}

impl Default for TimelineSnapshot {
    fn default() -> Self {
        Self::initial()
    }
}
