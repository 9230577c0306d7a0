// Marker cache - Snapshot of the sequencer's cue points
// Replaced wholesale on every refresh, never patched in place

use super::parser::{MarkerLabel, PanicMarker, is_panic_marker};
use crate::sequencer::client::{SequencerClient, SequencerError};
use log::debug;
use std::sync::Arc;

/// One cue point on the live timeline
///
/// `handle` is the sequencer's own reference to the cue. It is only ever
/// handed back to the sequencer to issue a jump.
#[derive(Debug, Clone, PartialEq)]
pub struct Marker<H> {
    pub name: String,
    /// Position in beats
    pub time: f64,
    pub handle: H,
}

impl<H> Marker<H> {
    pub fn new(name: impl Into<String>, time: f64, handle: H) -> Self {
        Self {
            name: name.into(),
            time,
            handle,
        }
    }

    /// Check if this marker is one of the silence-loop markers
    pub fn is_panic(&self) -> bool {
        is_panic_marker(&self.name)
    }

    pub fn panic_kind(&self) -> Option<PanicMarker> {
        PanicMarker::from_name(&self.name)
    }

    pub fn label(&self) -> MarkerLabel {
        MarkerLabel::parse(&self.name)
    }
}

/// Markers in sequencer order, panic markers excluded
pub fn visible_markers<H>(markers: &[Marker<H>]) -> impl Iterator<Item = &Marker<H>> {
    markers.iter().filter(|marker| !marker.is_panic())
}

/// Names shown in the observer's marker list
pub fn visible_names<H>(markers: &[Marker<H>]) -> Vec<String> {
    visible_markers(markers)
        .map(|marker| marker.name.clone())
        .collect()
}

/// First marker whose name matches exactly, panic markers included
pub fn find_by_name<'a, H>(markers: &'a [Marker<H>], name: &str) -> Option<&'a Marker<H>> {
    markers.iter().find(|marker| marker.name == name)
}

/// Marker at `index` in the visible list
pub fn find_visible_by_index<H>(markers: &[Marker<H>], index: usize) -> Option<&Marker<H>> {
    visible_markers(markers).nth(index)
}

/// Pull the whole cue point collection from the sequencer
///
/// Any failing read aborts the load, so callers never see a partial set.
pub async fn load_markers<S: SequencerClient>(
    client: &S,
) -> Result<Vec<Marker<S::Handle>>, SequencerError> {
    let handles = client.markers().await?;
    let mut markers = Vec::with_capacity(handles.len());

    for handle in handles {
        let name = client.marker_name(&handle).await?;
        let time = client.marker_time(&handle).await?;
        markers.push(Marker { name, time, handle });
    }

    debug!("Loaded {} markers from sequencer", markers.len());
    Ok(markers)
}

/// Cached marker set plus the visible list last handed to observers
#[derive(Debug)]
pub struct MarkerCache<H> {
    markers: Arc<[Marker<H>]>,
    visible: Vec<String>,
}

impl<H> MarkerCache<H> {
    pub fn new() -> Self {
        Self {
            markers: Arc::from(Vec::new()),
            visible: Vec::new(),
        }
    }

    /// Current marker set
    ///
    /// The returned snapshot stays valid after a later `replace`.
    pub fn markers(&self) -> Arc<[Marker<H>]> {
        Arc::clone(&self.markers)
    }

    /// Visible list as last broadcast
    pub fn visible_names(&self) -> &[String] {
        &self.visible
    }

    pub fn len(&self) -> usize {
        self.markers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.markers.is_empty()
    }

    /// Swap in a freshly loaded marker set
    ///
    /// Returns the new visible list only when it differs from the previous one,
    /// so time-only edits do not trigger a marker-list broadcast.
    pub fn replace(&mut self, markers: Vec<Marker<H>>) -> Option<Vec<String>> {
        let visible = visible_names(&markers);
        self.markers = Arc::from(markers);

        if visible == self.visible {
            return None;
        }

        self.visible = visible.clone();
        Some(visible)
    }
}

impl<H> Default for MarkerCache<H> {
    fn default() -> Self {
        Self::new()
    }
}
