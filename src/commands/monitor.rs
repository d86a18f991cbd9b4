//! Live microphone waveform monitoring.
//!
//! Wires capture, ingestion, and the fading-history TUI together and runs
//! the interactive loop. Supports an external stop trigger via SIGUSR1.

use std::sync::Arc;

use crate::config;
use crate::monitor::{AudioCapture, MonitorCommand, MonitorTui};
use crate::waveform::{HistoryRing, RealtimeIngestor};

/// Runs the live monitor until the user quits or SIGUSR1 arrives.
pub async fn handle_monitor() -> Result<(), anyhow::Error> {
    tracing::info!("=== wavescope monitor started ===");

    let config_data = config::WavescopeConfig::load_or_init().map_err(|err| {
        tracing::error!("Failed to load configuration: {err}");
        anyhow::anyhow!(
            "Configuration error: {err}. Check your ~/.config/wavescope/wavescope.toml file."
        )
    })?;

    tracing::info!(
        "Configuration loaded: device={}, sample_rate={}Hz, amplitude_scale={}",
        config_data.audio.device,
        config_data.audio.sample_rate,
        config_data.display.amplitude_scale
    );

    let ring = Arc::new(HistoryRing::new());
    let mut tui = MonitorTui::new(Arc::clone(&ring))
        .map_err(|e| anyhow::anyhow!("Failed to initialize UI: {e}"))?;

    let ingestor = Arc::new(RealtimeIngestor::new(
        ring,
        tui.surface(),
        config_data.display.amplitude_scale,
    ));

    let mut capture = AudioCapture::new(
        config_data.audio.sample_rate,
        config_data.audio.device.clone(),
    );
    if let Err(e) = capture.start(ingestor) {
        tracing::error!("Failed to start capture: {}", e);
        tui.cleanup().ok();
        return Err(e);
    }

    let term = std::sync::Arc::new(std::sync::atomic::AtomicBool::new(false));
    signal_hook::flag::register(signal_hook::consts::SIGUSR1, Arc::clone(&term))
        .map_err(|e| anyhow::anyhow!("Failed to register signal handler: {e}"))?;

    tracing::debug!("Entering monitor loop. Press 'Escape'/'q' to quit.");

    loop {
        if term.load(std::sync::atomic::Ordering::Relaxed) {
            tracing::info!("Received SIGUSR1: stopping monitor via external trigger");
            break;
        }

        match tui.handle_input() {
            Ok(MonitorCommand::Continue) => {
                tui.render_pending()
                    .map_err(|e| anyhow::anyhow!("Render failed: {e}"))?;
            }
            Ok(MonitorCommand::Quit) => {
                break;
            }
            Err(e) => {
                tracing::error!("Input handling error: {}", e);
                tui.cleanup().ok();
                return Err(anyhow::anyhow!("Input handling error: {e}"));
            }
        }
    }

    capture.stop();
    tui.cleanup()
        .map_err(|e| anyhow::anyhow!("Cleanup failed: {e}"))?;

    tracing::info!("=== wavescope monitor exited successfully ===");
    Ok(())
}
