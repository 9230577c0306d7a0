// Command dispatch
//
// Observer commands (transport, navigation, metronome, jumps, panic) are
// resolved against the cached marker set and turned into sequencer calls.
//
// Architecture:
// - HudCommand (messaging::command): wire message from observers
// - CommandDispatcher: one independent async task per command
// - PanicOutcome: the two possible ends of the panic escape sequence

pub mod dispatcher;

pub use dispatcher::{CommandDispatcher, CommandOutcome, PanicOutcome};
