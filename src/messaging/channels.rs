// Broadcast gateway - Fan-out of HUD messages to every connected observer
// Live stream over a broadcast channel, latest state kept for late joiners

use crate::messaging::broadcast::Broadcast;
use crate::messaging::command::HudCommand;
use crate::timeline::snapshot::TimelineSnapshot;
use log::trace;
use std::sync::Arc;
use tokio::sync::{broadcast, mpsc, watch};

pub type BroadcastReceiver = broadcast::Receiver<Broadcast>;

pub type CommandSender = mpsc::Sender<HudCommand>;
pub type CommandReceiver = mpsc::Receiver<HudCommand>;

/// Channel carrying observer commands to the HUD event loop
pub fn create_command_channel(capacity: usize) -> (CommandSender, CommandReceiver) {
    mpsc::channel(capacity)
}

/// Latest state an observer needs on connection
#[derive(Debug, Clone, Default)]
struct ObserverView {
    snapshot: TimelineSnapshot,
    cue_list: Vec<String>,
}

/// New observer: catch-up messages followed by the live stream
pub struct Subscription {
    /// Latest snapshot then latest marker list
    pub catch_up: Vec<Broadcast>,
    pub receiver: BroadcastReceiver,
}

/// Publishes snapshots and marker lists in the order they are produced
#[derive(Clone)]
pub struct BroadcastGateway {
    tx: broadcast::Sender<Broadcast>,
    latest: Arc<watch::Sender<ObserverView>>,
}

impl BroadcastGateway {
    pub fn new(capacity: usize) -> Self {
        let (tx, _) = broadcast::channel(capacity);
        let (latest, _) = watch::channel(ObserverView::default());
        Self {
            tx,
            latest: Arc::new(latest),
        }
    }

    pub fn publish_snapshot(&self, snapshot: TimelineSnapshot) {
        self.latest.send_modify(|view| view.snapshot = snapshot.clone());
        self.send(Broadcast::Update(snapshot));
    }

    pub fn publish_cue_list(&self, names: Vec<String>) {
        self.latest.send_modify(|view| view.cue_list = names.clone());
        self.send(Broadcast::CueList(names));
    }

    /// Register a new observer
    ///
    /// The receiver is created before the catch-up state is read, so nothing
    /// published in between is lost (it may arrive twice).
    pub fn subscribe(&self) -> Subscription {
        let receiver = self.tx.subscribe();
        let view = self.latest.borrow().clone();
        Subscription {
            catch_up: vec![Broadcast::Update(view.snapshot), Broadcast::CueList(view.cue_list)],
            receiver,
        }
    }

    /// Last published snapshot
    pub fn latest_snapshot(&self) -> TimelineSnapshot {
        self.latest.borrow().snapshot.clone()
    }

    /// Last published marker list
    pub fn latest_cue_list(&self) -> Vec<String> {
        self.latest.borrow().cue_list.clone()
    }

    pub fn observer_count(&self) -> usize {
        self.tx.receiver_count()
    }

    fn send(&self, message: Broadcast) {
        // No observers connected is not an error
        if self.tx.send(message).is_err() {
            trace!("No observer connected, broadcast dropped");
        }
    }
}
