// Simulated sequencer - In-memory stand-in for the live sequencer
// Drives the demo mode of the binary and the tests

use super::client::{SequencerClient, SequencerError, SequencerEvent, SequencerResult};
use super::timeline::Tempo;
use super::transport::{LoopRegion, Transport};
use crate::marker::parser::PanicMarker;
use std::cell::RefCell;
use std::rc::Rc;
use std::time::Duration;
use tokio::sync::mpsc::{self, UnboundedReceiver, UnboundedSender};

/// Gap used when looking for the next/previous cue from the playhead
const NAVIGATION_EPSILON: f64 = 1e-6;

/// Handle to a simulated cue point
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SimMarkerId(u32);

/// Transport-affecting call received by the simulated sequencer
#[derive(Debug, Clone, PartialEq)]
pub enum SimCall {
    StartPlaying,
    StopPlaying,
    SetMetronome(bool),
    NextMarker,
    PrevMarker,
    JumpToMarker(String),
}

#[derive(Debug, Clone)]
struct SimMarker {
    id: SimMarkerId,
    name: String,
    time: f64,
}

#[derive(Debug, Default)]
struct SimState {
    connected: bool,
    refused_connections: u32,
    failure: Option<SequencerError>,
    transport: Transport,
    markers: Vec<SimMarker>,
    next_id: u32,
    calls: Vec<SimCall>,
    subscribers: Vec<UnboundedSender<SequencerEvent>>,
}

impl SimState {
    fn emit(&mut self, event: SequencerEvent) {
        self.subscribers.retain(|tx| tx.send(event).is_ok());
    }

    fn check(&self) -> SequencerResult<()> {
        if let Some(err) = &self.failure {
            return Err(err.clone());
        }
        if !self.connected {
            return Err(SequencerError::NotConnected);
        }
        Ok(())
    }

    fn marker(&self, id: SimMarkerId) -> SequencerResult<&SimMarker> {
        self.markers
            .iter()
            .find(|marker| marker.id == id)
            .ok_or(SequencerError::MarkerGone)
    }

    fn sort_markers(&mut self) {
        self.markers.sort_by(|a, b| a.time.total_cmp(&b.time));
    }

    fn jump(&mut self, beats: f64) {
        self.transport.set_position(beats);
        let position = self.transport.position();
        self.emit(SequencerEvent::Position(position));
    }

    fn set_playing(&mut self, playing: bool) {
        if self.transport.is_playing() != playing {
            if playing {
                self.transport.play();
            } else {
                self.transport.stop();
            }
            self.emit(SequencerEvent::PlayingChanged(playing));
        }
    }
}

/// Single-threaded in-memory sequencer
///
/// Every client call yields once before touching state, so concurrent
/// commands interleave the way they do against a real sequencer.
#[derive(Debug, Default)]
pub struct SimulatedSequencer {
    state: RefCell<SimState>,
}

impl SimulatedSequencer {
    /// Connected sequencer with no markers
    pub fn new() -> Self {
        let sim = Self::default();
        sim.state.borrow_mut().connected = true;
        sim
    }

    /// Connected sequencer with the given `(name, beats)` cue points
    pub fn with_markers<N: Into<String>>(markers: impl IntoIterator<Item = (N, f64)>) -> Self {
        let sim = Self::new();
        {
            let mut state = sim.state.borrow_mut();
            for (name, time) in markers {
                let id = SimMarkerId(state.next_id);
                state.next_id += 1;
                state.markers.push(SimMarker {
                    id,
                    name: name.into(),
                    time,
                });
            }
            state.sort_markers();
        }
        sim
    }

    /// Start disconnected, refusing the first `attempts` connection attempts
    pub fn refuse_connections(&self, attempts: u32) {
        let mut state = self.state.borrow_mut();
        state.connected = false;
        state.refused_connections = attempts;
    }

    /// Make every following call fail with `err` (None restores normal operation)
    pub fn set_failure(&self, err: Option<SequencerError>) {
        self.state.borrow_mut().failure = err;
    }

    pub fn add_marker(&self, name: impl Into<String>, time: f64) -> SimMarkerId {
        let mut state = self.state.borrow_mut();
        let id = SimMarkerId(state.next_id);
        state.next_id += 1;
        state.markers.push(SimMarker {
            id,
            name: name.into(),
            time,
        });
        state.sort_markers();
        state.emit(SequencerEvent::MarkersChanged);
        id
    }

    pub fn remove_marker(&self, id: SimMarkerId) {
        let mut state = self.state.borrow_mut();
        state.markers.retain(|marker| marker.id != id);
        state.emit(SequencerEvent::MarkersChanged);
    }

    pub fn rename_marker(&self, id: SimMarkerId, name: impl Into<String>) {
        let mut state = self.state.borrow_mut();
        if let Some(marker) = state.markers.iter_mut().find(|marker| marker.id == id) {
            marker.name = name.into();
        }
        state.emit(SequencerEvent::MarkersChanged);
    }

    pub fn move_marker(&self, id: SimMarkerId, time: f64) {
        let mut state = self.state.borrow_mut();
        if let Some(marker) = state.markers.iter_mut().find(|marker| marker.id == id) {
            marker.time = time;
        }
        state.sort_markers();
        state.emit(SequencerEvent::MarkersChanged);
    }

    /// Id of the first marker named `name`
    pub fn marker_id(&self, name: &str) -> Option<SimMarkerId> {
        self.state
            .borrow()
            .markers
            .iter()
            .find(|marker| marker.name == name)
            .map(|marker| marker.id)
    }

    /// Loop between the panic entry and exit markers, when both exist
    pub fn loop_silence_region(&self) -> Option<LoopRegion> {
        let mut state = self.state.borrow_mut();
        let time_of = |kind: PanicMarker| {
            state
                .markers
                .iter()
                .find(|marker| marker.name == kind.name())
                .map(|marker| marker.time)
        };

        let region = match (time_of(PanicMarker::Entry), time_of(PanicMarker::Exit)) {
            (Some(start), Some(end)) if end > start => Some(LoopRegion::new(start, end)),
            _ => None,
        };
        state.transport.set_loop_region(region);
        region
    }

    /// Move the playhead and notify subscribers
    pub fn set_position(&self, beats: f64) {
        self.state.borrow_mut().jump(beats);
    }

    pub fn position(&self) -> f64 {
        self.state.borrow().transport.position()
    }

    pub fn playing(&self) -> bool {
        self.state.borrow().transport.is_playing()
    }

    pub fn metronome_enabled(&self) -> bool {
        self.state.borrow().transport.metronome()
    }

    /// Force the playing flag without recording a call
    pub fn set_playing(&self, playing: bool) {
        self.state.borrow_mut().set_playing(playing);
    }

    /// Advance the playhead by `beats` if playing
    pub fn advance(&self, beats: f64) {
        let mut state = self.state.borrow_mut();
        if let Some(position) = state.transport.advance(beats) {
            state.emit(SequencerEvent::Position(position));
        }
    }

    /// Transport calls received so far
    pub fn calls(&self) -> Vec<SimCall> {
        self.state.borrow().calls.clone()
    }

    /// Move the playhead in real time at `tempo`, one update per `tick`
    pub async fn drive_playhead(self: Rc<Self>, tempo: Tempo, tick: Duration) {
        let mut interval = tokio::time::interval(tick);
        let beats_per_tick = tempo.beats_in(tick);
        loop {
            interval.tick().await;
            self.advance(beats_per_tick);
        }
    }

    fn record(&self, call: SimCall) -> SequencerResult<()> {
        let mut state = self.state.borrow_mut();
        state.check()?;
        state.calls.push(call);
        Ok(())
    }
}

impl SequencerClient for SimulatedSequencer {
    type Handle = SimMarkerId;

    async fn connect(&self) -> SequencerResult<()> {
        tokio::task::yield_now().await;
        let mut state = self.state.borrow_mut();
        if state.refused_connections > 0 {
            state.refused_connections -= 1;
            return Err(SequencerError::CallFailed("connection refused".into()));
        }
        state.connected = true;
        Ok(())
    }

    fn subscribe(&self) -> UnboundedReceiver<SequencerEvent> {
        let (tx, rx) = mpsc::unbounded_channel();
        self.state.borrow_mut().subscribers.push(tx);
        rx
    }

    async fn is_playing(&self) -> SequencerResult<bool> {
        tokio::task::yield_now().await;
        let state = self.state.borrow();
        state.check()?;
        Ok(state.transport.is_playing())
    }

    async fn metronome(&self) -> SequencerResult<bool> {
        tokio::task::yield_now().await;
        let state = self.state.borrow();
        state.check()?;
        Ok(state.transport.metronome())
    }

    async fn set_metronome(&self, enabled: bool) -> SequencerResult<()> {
        tokio::task::yield_now().await;
        self.record(SimCall::SetMetronome(enabled))?;
        let mut state = self.state.borrow_mut();
        if state.transport.metronome() != enabled {
            state.transport.set_metronome(enabled);
            state.emit(SequencerEvent::MetronomeChanged(enabled));
        }
        Ok(())
    }

    async fn start_playing(&self) -> SequencerResult<()> {
        tokio::task::yield_now().await;
        self.record(SimCall::StartPlaying)?;
        self.state.borrow_mut().set_playing(true);
        Ok(())
    }

    async fn stop_playing(&self) -> SequencerResult<()> {
        tokio::task::yield_now().await;
        self.record(SimCall::StopPlaying)?;
        self.state.borrow_mut().set_playing(false);
        Ok(())
    }

    async fn jump_to_next_marker(&self) -> SequencerResult<()> {
        tokio::task::yield_now().await;
        self.record(SimCall::NextMarker)?;
        let mut state = self.state.borrow_mut();
        let position = state.transport.position();
        let target = state
            .markers
            .iter()
            .find(|marker| marker.time > position + NAVIGATION_EPSILON)
            .map(|marker| marker.time);
        if let Some(time) = target {
            state.jump(time);
        }
        Ok(())
    }

    async fn jump_to_prev_marker(&self) -> SequencerResult<()> {
        tokio::task::yield_now().await;
        self.record(SimCall::PrevMarker)?;
        let mut state = self.state.borrow_mut();
        let position = state.transport.position();
        let target = state
            .markers
            .iter()
            .rev()
            .find(|marker| marker.time < position - NAVIGATION_EPSILON)
            .map(|marker| marker.time);
        if let Some(time) = target {
            state.jump(time);
        }
        Ok(())
    }

    async fn markers(&self) -> SequencerResult<Vec<SimMarkerId>> {
        tokio::task::yield_now().await;
        let state = self.state.borrow();
        state.check()?;
        Ok(state.markers.iter().map(|marker| marker.id).collect())
    }

    async fn marker_name(&self, marker: &SimMarkerId) -> SequencerResult<String> {
        tokio::task::yield_now().await;
        let state = self.state.borrow();
        state.check()?;
        Ok(state.marker(*marker)?.name.clone())
    }

    async fn marker_time(&self, marker: &SimMarkerId) -> SequencerResult<f64> {
        tokio::task::yield_now().await;
        let state = self.state.borrow();
        state.check()?;
        Ok(state.marker(*marker)?.time)
    }

    async fn jump_to_marker(&self, marker: &SimMarkerId) -> SequencerResult<()> {
        tokio::task::yield_now().await;
        let (name, time) = {
            let state = self.state.borrow();
            state.check()?;
            let target = state.marker(*marker)?;
            (target.name.clone(), target.time)
        };
        self.record(SimCall::JumpToMarker(name))?;
        self.state.borrow_mut().jump(time);
        Ok(())
    }
}
