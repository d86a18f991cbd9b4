//! Static waveform view feature for wavescope.
//!
//! Plays a loaded sample window through the speakers while the static
//! waveform TUI tracks the playback position.

pub mod output;
pub mod ui;

pub use output::AudioPlayer;
pub use ui::{ViewCommand, ViewTui};
