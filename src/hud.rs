// Hud - Single-threaded event loop driving the stage display
//
// Sequencer notifications and observer commands are handled one at a time on
// one thread. Work that waits on the sequencer (marker refresh, commands) runs
// as a local task so the position stream keeps flowing meanwhile.
//
// Must run inside a `tokio::task::LocalSet`.

use crate::command::dispatcher::CommandDispatcher;
use crate::config::{ConfigError, HudConfig};
use crate::connection::reconnect::{ReconnectionStrategy, connect_with_retry};
use crate::marker::cache::{Marker, MarkerCache, load_markers};
use crate::messaging::channels::{BroadcastGateway, CommandReceiver};
use crate::messaging::command::HudCommand;
use crate::sequencer::client::{SequencerClient, SequencerError, SequencerEvent};
use crate::timeline::engine::TimelineEngine;
use crate::timeline::snapshot::TimelineSnapshot;
use log::{debug, error, info};
use std::rc::Rc;
use tokio::sync::mpsc::{self, UnboundedReceiver, UnboundedSender};

/// Fatal errors of the HUD process
#[derive(Debug, thiserror::Error)]
pub enum HudError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Sequencer error: {0}")]
    Sequencer(#[from] SequencerError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Owns the marker cache and the current snapshot
///
/// The snapshot is replaced, never mutated, and every replacement is published
/// before the next event is looked at.
pub struct Hud<S: SequencerClient> {
    client: Rc<S>,
    gateway: BroadcastGateway,
    engine: TimelineEngine,
    cache: MarkerCache<S::Handle>,
    snapshot: TimelineSnapshot,
    dispatcher: Rc<CommandDispatcher<S>>,
}

impl<S> Hud<S>
where
    S: SequencerClient + 'static,
    S::Handle: 'static,
{
    pub fn new(client: Rc<S>, gateway: BroadcastGateway, config: &HudConfig) -> Self {
        Self {
            dispatcher: Rc::new(CommandDispatcher::new(Rc::clone(&client))),
            client,
            gateway,
            engine: TimelineEngine::new(config.marker_tolerance),
            cache: MarkerCache::new(),
            snapshot: TimelineSnapshot::initial(),
        }
    }

    pub fn snapshot(&self) -> &TimelineSnapshot {
        &self.snapshot
    }

    pub fn markers(&self) -> &MarkerCache<S::Handle> {
        &self.cache
    }

    /// Connect, read the initial sequencer state and publish the first snapshot
    pub async fn start(&mut self) -> Result<(), HudError> {
        connect_with_retry(self.client.as_ref(), &mut ReconnectionStrategy::new()).await?;

        match self.client.metronome().await {
            Ok(enabled) => self.snapshot = self.snapshot.with_metronome(enabled),
            Err(e) => error!("Failed to read metronome state: {}", e),
        }

        match load_markers(self.client.as_ref()).await {
            Ok(markers) => self.on_markers_loaded(markers),
            Err(e) => error!("Failed to load markers: {}", e),
        }

        self.gateway.publish_snapshot(self.snapshot.clone());
        info!("HUD started with {} markers", self.cache.len());
        Ok(())
    }

    /// Process events until the sequencer's notification stream ends
    pub async fn run(
        mut self,
        mut events: UnboundedReceiver<SequencerEvent>,
        mut commands: CommandReceiver,
    ) {
        let (loaded_tx, mut loaded_rx) = mpsc::unbounded_channel();

        loop {
            tokio::select! {
                event = events.recv() => match event {
                    Some(event) => self.on_sequencer_event(event, &loaded_tx),
                    None => {
                        info!("Sequencer notification stream closed");
                        break;
                    }
                },
                Some(markers) = loaded_rx.recv() => self.on_markers_loaded(markers),
                Some(command) = commands.recv() => self.on_command(command),
            }
        }
    }

    /// Apply one sequencer notification
    pub fn on_sequencer_event(
        &mut self,
        event: SequencerEvent,
        loaded_tx: &UnboundedSender<Vec<Marker<S::Handle>>>,
    ) {
        match event {
            SequencerEvent::Position(position) => {
                let markers = self.cache.markers();
                self.publish(self.engine.on_position(&self.snapshot, &markers, position));
            }
            SequencerEvent::PlayingChanged(playing) => {
                self.publish(self.snapshot.with_playing(playing));
            }
            SequencerEvent::MetronomeChanged(enabled) => {
                self.publish(self.snapshot.with_metronome(enabled));
            }
            SequencerEvent::MarkersChanged => self.spawn_refresh(loaded_tx.clone()),
        }
    }

    /// Swap in a freshly loaded marker set
    ///
    /// Observers only hear about it when the visible list changed.
    pub fn on_markers_loaded(&mut self, markers: Vec<Marker<S::Handle>>) {
        let count = markers.len();
        if let Some(names) = self.cache.replace(markers) {
            info!(
                "Marker list changed ({} visible), notifying {} observers",
                names.len(),
                self.gateway.observer_count()
            );
            self.snapshot = self.snapshot.with_visible_marker_names(names.clone());
            self.gateway.publish_cue_list(names);
        } else {
            debug!("Marker cache refreshed ({} markers), list unchanged", count);
        }
    }

    /// Dispatch a command against the current marker snapshot
    pub fn on_command(&self, command: HudCommand) {
        let dispatcher = Rc::clone(&self.dispatcher);
        let markers = self.cache.markers();
        tokio::task::spawn_local(async move {
            dispatcher.dispatch(command, &markers).await;
        });
    }

    fn spawn_refresh(&self, loaded_tx: UnboundedSender<Vec<Marker<S::Handle>>>) {
        let client = Rc::clone(&self.client);
        tokio::task::spawn_local(async move {
            match load_markers(client.as_ref()).await {
                Ok(markers) => {
                    let _ = loaded_tx.send(markers);
                }
                // Previous cache stays authoritative
                Err(e) => error!("Marker refresh failed: {}", e),
            }
        });
    }

    fn publish(&mut self, snapshot: TimelineSnapshot) {
        self.snapshot = snapshot;
        self.gateway.publish_snapshot(self.snapshot.clone());
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::marker::parser::PANIC_ENTRY_NAME;
    use crate::messaging::broadcast::Broadcast;
    use crate::sequencer::simulated::SimulatedSequencer;

    fn hud_with(entries: &[(&str, f64)]) -> (Rc<SimulatedSequencer>, BroadcastGateway, Hud<SimulatedSequencer>) {
        let sim = Rc::new(SimulatedSequencer::with_markers(entries.iter().copied()));
        let gateway = BroadcastGateway::new(64);
        let hud = Hud::new(Rc::clone(&sim), gateway.clone(), &HudConfig::default());
        (sim, gateway, hud)
    }

    #[tokio::test]
    async fn test_start_publishes_initial_state() {
        let (sim, gateway, mut hud) = hud_with(&[("A", 0.0), (PANIC_ENTRY_NAME, 8.0)]);
        sim.set_metronome(true).await.unwrap();

        hud.start().await.unwrap();

        assert_eq!(gateway.latest_cue_list(), vec!["A"]);
        let snapshot = gateway.latest_snapshot();
        assert!(snapshot.metronome_on);
        assert_eq!(snapshot.visible_marker_names, vec!["A"]);
        assert_eq!(hud.markers().len(), 2);
    }

    #[tokio::test]
    async fn test_position_events_publish_snapshots() {
        let (_sim, gateway, mut hud) = hud_with(&[("#1 -> Intro", 0.0), ("#2 -> Verse", 16.0)]);
        hud.start().await.unwrap();
        let mut receiver = gateway.subscribe().receiver;
        let (loaded_tx, _loaded_rx) = mpsc::unbounded_channel();

        hud.on_sequencer_event(SequencerEvent::Position(4.0), &loaded_tx);
        hud.on_sequencer_event(SequencerEvent::PlayingChanged(true), &loaded_tx);

        match receiver.try_recv().unwrap() {
            Broadcast::Update(snapshot) => {
                assert_eq!(snapshot.segment_title, "Intro");
                assert_eq!(snapshot.next_title, "Verse");
                assert_eq!(snapshot.progress, 0.25);
                assert!(!snapshot.is_playing);
            }
            other => panic!("unexpected {:?}", other),
        }
        match receiver.try_recv().unwrap() {
            Broadcast::Update(snapshot) => {
                assert!(snapshot.is_playing);
                assert_eq!(snapshot.segment_title, "Intro");
            }
            other => panic!("unexpected {:?}", other),
        }
        assert_eq!(hud.snapshot().beat, 1);
    }

    #[tokio::test]
    async fn test_unchanged_marker_list_is_not_rebroadcast() {
        let (sim, gateway, mut hud) = hud_with(&[("A", 0.0), ("B", 8.0)]);
        hud.start().await.unwrap();
        let mut receiver = gateway.subscribe().receiver;

        let id = sim.marker_id("B").unwrap();
        sim.move_marker(id, 12.0);
        hud.on_markers_loaded(load_markers(sim.as_ref()).await.unwrap());
        assert!(receiver.try_recv().is_err());
        assert_eq!(hud.markers().markers()[1].time, 12.0);

        sim.rename_marker(id, "C");
        hud.on_markers_loaded(load_markers(sim.as_ref()).await.unwrap());
        assert_eq!(
            receiver.try_recv().unwrap(),
            Broadcast::CueList(vec!["A".into(), "C".into()])
        );
    }

    #[tokio::test]
    async fn test_failed_refresh_keeps_previous_cache() {
        let (sim, gateway, mut hud) = hud_with(&[("A", 0.0), ("B", 8.0)]);
        hud.start().await.unwrap();
        let mut receiver = gateway.subscribe().receiver;

        let id = sim.marker_id("B").unwrap();
        sim.rename_marker(id, "C");
        sim.set_failure(Some(SequencerError::CallFailed("bridge down".into())));

        let (loaded_tx, mut loaded_rx) = mpsc::unbounded_channel();
        tokio::task::LocalSet::new()
            .run_until(async {
                hud.on_sequencer_event(SequencerEvent::MarkersChanged, &loaded_tx);
                drop(loaded_tx);
                // Channel closes once the refresh task has given up
                assert!(loaded_rx.recv().await.is_none());
            })
            .await;

        let names: Vec<_> = hud.markers().markers().iter().map(|m| m.name.clone()).collect();
        assert_eq!(names, vec!["A", "B"]);
        assert_eq!(hud.snapshot().visible_marker_names, vec!["A", "B"]);
        assert_eq!(gateway.latest_cue_list(), vec!["A", "B"]);
        assert!(receiver.try_recv().is_err());
    }
}
