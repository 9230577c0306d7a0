// Marker module
// Cue point names, the silence-loop convention, and the cached marker set

pub mod cache;
pub mod parser;

pub use cache::{Marker, MarkerCache, load_markers};
pub use parser::{MarkerLabel, PANIC_ENTRY_NAME, PANIC_EXIT_NAME, PanicMarker};
