//! Application command handlers for wavescope.
//!
//! This module organizes command handling into separate submodules, each
//! responsible for a specific application command.
//!
//! # Commands
//! - `monitor`: Live microphone waveform with fading history (default)
//! - `view`: Static waveform of a WAV file with playback marker
//! - `config`: Open configuration file in user's preferred editor
//! - `list_devices`: List available audio input devices
//! - `logs`: Display recent log entries

pub mod config;
pub mod list_devices;
pub mod logs;
pub mod monitor;
pub mod view;

pub use config::handle_config;
pub use list_devices::handle_list_devices;
pub use logs::handle_logs;
pub use monitor::handle_monitor;
pub use view::handle_view;
