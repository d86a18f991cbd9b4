//! Live microphone monitoring feature for wavescope.
//!
//! Wires the capture collaborator, the realtime ingestor, and the fading
//! waveform TUI together.

pub mod capture;
pub mod ui;

pub use capture::AudioCapture;
pub use ui::{MonitorCommand, MonitorTui, TerminalSurface};
