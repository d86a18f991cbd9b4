//! Application orchestration and command routing.
//!
//! Handles command-line argument parsing and delegates to appropriate command handlers.

use crate::commands;
use crate::logging;
use clap::{CommandFactory, Parser, Subcommand};
use clap_complete::{generate, Shell};
use std::io;
use std::path::PathBuf;
use std::process;

/// A terminal PCM waveform scope with live microphone monitoring
#[derive(Parser)]
#[command(name = "wavescope")]
#[command(version)]
#[command(about = "Terminal PCM waveform scope")]
#[command(
    long_about = "A terminal waveform scope for PCM audio.\n\nWatch your microphone live as a fading oscilloscope trace, or view a WAV\nfile's waveform with a moving playback marker.\n\nDEFAULT COMMAND:\n    If no command is specified, 'monitor' is used by default.\n\nEXAMPLES:\n    # Live microphone monitor\n    $ wavescope\n    $ wavescope monitor\n\n    # View and play a WAV file\n    $ wavescope view recording.wav\n\n    # List input devices for configuration\n    $ wavescope list-devices\n\n    # Edit configuration file\n    $ wavescope config"
)]
#[command(
    after_help = "CONFIGURATION:\n    Config file:        ~/.config/wavescope/wavescope.toml\n    Logs:               ~/.local/state/wavescope/wavescope.log.*"
)]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Live microphone waveform with fading history (default)
    ///
    /// Renders recent capture frames as overlaid traces, newest brightest.
    /// Press Escape or 'q' to quit; SIGUSR1 stops monitoring externally.
    #[command(visible_alias = "m")]
    Monitor,

    /// View a WAV file's waveform and play it back
    ///
    /// Renders the min/max envelope of the whole file with a playback
    /// marker. Space restarts playback, Escape/q quits.
    #[command(visible_alias = "v")]
    View {
        /// Path to a 16-bit PCM WAV file
        #[arg(value_name = "FILE")]
        file: PathBuf,
    },

    /// Open configuration file in your preferred editor
    ///
    /// Edit audio device, sample rate, and display settings.
    /// Uses $EDITOR environment variable or falls back to nano/vi.
    #[command(visible_alias = "c")]
    Config,

    /// List available audio input devices
    ///
    /// Shows device IDs, names, and configurations to help configure
    /// the correct input device in wavescope.toml.
    #[command(name = "list-devices")]
    ListDevices,

    /// Show recent log entries from the application
    ///
    /// Display the last 50 lines of the most recent log file.
    /// Useful for troubleshooting issues.
    Logs,

    /// Generate shell completion script
    ///
    /// Generate completion script for your shell. Save the output to your
    /// shell's completion directory or source it directly.
    ///
    /// Examples:
    ///   wavescope completions bash > wavescope.bash
    ///   wavescope completions zsh > _wavescope
    ///   wavescope completions fish > wavescope.fish
    Completions {
        /// The shell to generate completions for
        #[arg(value_enum)]
        shell: Shell,
    },
}

/// Runs the main application based on command-line arguments.
///
/// # Exit Codes
/// - 0: Success
/// - 1: General error
/// - 2: Usage error (invalid arguments)
///
/// # Errors
/// - If logging initialization fails
/// - If command execution fails (e.g., device setup, file loading, rendering)
pub async fn run() -> Result<(), anyhow::Error> {
    let cli = Cli::parse();

    // Handle commands that don't need logging or config setup
    match &cli.command {
        Some(Commands::Completions { shell }) => {
            generate(*shell, &mut Cli::command(), "wavescope", &mut io::stdout());
            return Ok(());
        }
        Some(Commands::ListDevices) => {
            return match commands::handle_list_devices() {
                Ok(()) => Ok(()),
                Err(e) => {
                    eprintln!("Error: {e}");
                    process::exit(1);
                }
            };
        }
        Some(Commands::Logs) => {
            return match commands::handle_logs() {
                Ok(()) => Ok(()),
                Err(e) => {
                    eprintln!("Error: {e}");
                    process::exit(1);
                }
            };
        }
        _ => {}
    }

    // Initialize logging for all other commands
    logging::init_logging()?;

    // Route to appropriate command handler
    match cli.command {
        None | Some(Commands::Monitor) => {
            commands::handle_monitor().await?;
        }
        Some(Commands::View { file }) => {
            commands::handle_view(file).await?;
        }
        Some(Commands::Config) => {
            commands::handle_config()?;
        }
        Some(Commands::Completions { .. }) | Some(Commands::ListDevices) | Some(Commands::Logs) => {
            unreachable!("These commands are handled earlier")
        }
    }

    Ok(())
}
