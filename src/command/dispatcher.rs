// CommandDispatcher - Maps observer commands onto sequencer calls
//
// Every command runs independently: a failure is logged and dropped, never
// surfaced to observers and never stops the dispatcher.

use crate::marker::cache::{Marker, find_by_name, find_visible_by_index};
use crate::marker::parser::PANIC_ENTRY_NAME;
use crate::messaging::command::HudCommand;
use crate::sequencer::client::{SequencerClient, SequencerResult};
use log::{debug, error, warn};
use std::rc::Rc;

/// Where the panic command left the show
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PanicOutcome {
    /// Jumped to the silence loop entry with playback running
    SilenceLoop,
    /// No silence loop in the set, playback hard-stopped
    Stopped,
}

/// Result of a successfully dispatched command
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CommandOutcome {
    /// The sequencer was asked to do something
    Applied,
    /// Precondition not met or target missing, nothing was sent
    Ignored,
    Panic(PanicOutcome),
}

/// Executes observer commands against the sequencer
///
/// Checks such as "is it playing?" and the call that follows are separate
/// round trips. Another command or a notification can land in between; the
/// dispatcher accepts that race instead of locking the sequencer.
pub struct CommandDispatcher<S: SequencerClient> {
    client: Rc<S>,
}

impl<S: SequencerClient> CommandDispatcher<S> {
    pub fn new(client: Rc<S>) -> Self {
        Self { client }
    }

    /// Run a command, logging any failure
    pub async fn dispatch(&self, command: HudCommand, markers: &[Marker<S::Handle>]) {
        debug!("Dispatching {:?}", command);
        match self.execute(&command, markers).await {
            Ok(CommandOutcome::Ignored) => debug!("{:?} had no effect", command),
            Ok(_) => {}
            Err(e) => error!("Command {:?} failed: {}", command, e),
        }
    }

    /// Run a command against the given marker snapshot
    pub async fn execute(
        &self,
        command: &HudCommand,
        markers: &[Marker<S::Handle>],
    ) -> SequencerResult<CommandOutcome> {
        match command {
            HudCommand::Play => self.toggle_play().await,
            HudCommand::PlayOnly => self.play_only().await,
            HudCommand::StopOnly => {
                self.client.stop_playing().await?;
                Ok(CommandOutcome::Applied)
            }
            HudCommand::Next => {
                self.client.jump_to_next_marker().await?;
                Ok(CommandOutcome::Applied)
            }
            HudCommand::Prev => {
                self.client.jump_to_prev_marker().await?;
                Ok(CommandOutcome::Applied)
            }
            HudCommand::ToggleMetronome => {
                let enabled = self.client.metronome().await?;
                self.client.set_metronome(!enabled).await?;
                Ok(CommandOutcome::Applied)
            }
            HudCommand::Panic => self.panic(markers).await.map(CommandOutcome::Panic),
            HudCommand::JumpIndex { index } => {
                let target = usize::try_from(*index)
                    .ok()
                    .and_then(|index| find_visible_by_index(markers, index));
                self.jump(target).await
            }
            HudCommand::Jump { target } => self.jump(find_by_name(markers, target)).await,
        }
    }

    /// Jump to the silence loop and make sure it plays, or stop everything
    ///
    /// Safe to repeat: a second panic lands in the same state as the first.
    pub async fn panic(&self, markers: &[Marker<S::Handle>]) -> SequencerResult<PanicOutcome> {
        match find_by_name(markers, PANIC_ENTRY_NAME) {
            Some(entry) => {
                self.client.jump_to_marker(&entry.handle).await?;
                if !self.client.is_playing().await? {
                    self.client.start_playing().await?;
                }
                warn!("Panic: jumped to {}", PANIC_ENTRY_NAME);
                Ok(PanicOutcome::SilenceLoop)
            }
            None => {
                warn!("Panic: no {} marker, stopping playback", PANIC_ENTRY_NAME);
                self.client.stop_playing().await?;
                Ok(PanicOutcome::Stopped)
            }
        }
    }

    async fn toggle_play(&self) -> SequencerResult<CommandOutcome> {
        if self.client.is_playing().await? {
            self.client.stop_playing().await?;
        } else {
            self.client.start_playing().await?;
        }
        Ok(CommandOutcome::Applied)
    }

    async fn play_only(&self) -> SequencerResult<CommandOutcome> {
        if self.client.is_playing().await? {
            return Ok(CommandOutcome::Ignored);
        }
        self.client.start_playing().await?;
        Ok(CommandOutcome::Applied)
    }

    async fn jump(&self, target: Option<&Marker<S::Handle>>) -> SequencerResult<CommandOutcome> {
        match target {
            Some(marker) => {
                self.client.jump_to_marker(&marker.handle).await?;
                Ok(CommandOutcome::Applied)
            }
            None => Ok(CommandOutcome::Ignored),
        }
    }
}
