//! Static waveform view of a WAV file with playback.
//!
//! Loads a PCM16 WAV into a sample window, renders its envelope, and plays
//! it back with a moving position marker. Space restarts playback.

use anyhow::{anyhow, Result};
use std::path::{Path, PathBuf};

use crate::config;
use crate::playback::{AudioPlayer, ViewCommand, ViewTui};
use crate::waveform::{CursorState, PlaybackCursor, SampleWindow};

/// Opens the file, starts playback, and runs the view loop.
pub async fn handle_view(file: PathBuf) -> Result<()> {
    tracing::info!("=== wavescope view started: {} ===", file.display());

    let config_data = config::WavescopeConfig::load_or_init().map_err(|err| {
        tracing::error!("Failed to load configuration: {err}");
        anyhow!("Configuration error: {err}. Check your ~/.config/wavescope/wavescope.toml file.")
    })?;

    let window = load_wav(&file)?;
    tracing::info!(
        "Loaded {} samples at {}Hz ({} ms)",
        window.samples().len(),
        window.sample_rate_hz(),
        window.duration_ms()
    );

    let mut tui = ViewTui::new(config_data.display.amplitude_scale)
        .map_err(|e| anyhow!("Failed to initialize UI: {e}"))?;

    let mut cursor = PlaybackCursor::new(window.duration_ms());
    let mut player = match AudioPlayer::start(&window) {
        Ok(player) => Some(player),
        Err(e) => {
            // No output device is not fatal for viewing; the waveform still
            // renders, just without a moving marker.
            tracing::warn!("Playback unavailable: {}", e);
            None
        }
    };

    tracing::debug!("Entering view loop. Space to replay, 'Escape'/'q' to quit.");

    loop {
        match tui.handle_input() {
            Ok(ViewCommand::Continue) => {}
            Ok(ViewCommand::Restart) => {
                if let Some(p) = player.as_mut() {
                    p.stop();
                }
                cursor.reset();
                match AudioPlayer::start(&window) {
                    Ok(p) => player = Some(p),
                    Err(e) => {
                        tracing::warn!("Replay failed: {}", e);
                        player = None;
                    }
                }
            }
            Ok(ViewCommand::Quit) => {
                break;
            }
            Err(e) => {
                tracing::error!("Input handling error: {}", e);
                tui.cleanup().ok();
                return Err(anyhow!("Input handling error: {e}"));
            }
        }

        if let Some(p) = player.as_ref() {
            if p.is_complete() {
                if cursor.state() != CursorState::Completed {
                    tracing::debug!("Playback complete");
                    cursor.on_completion();
                }
            } else {
                cursor.on_progress(p.position_ms());
            }
        }

        tui.render(&window, &cursor)
            .map_err(|e| anyhow!("Render failed: {e}"))?;
    }

    if let Some(p) = player.as_mut() {
        p.stop();
    }
    tui.cleanup().map_err(|e| anyhow!("Cleanup failed: {e}"))?;

    tracing::info!("=== wavescope view exited successfully ===");
    Ok(())
}

/// Reads a PCM16 WAV file into a mono sample window.
///
/// Stereo files are mixed down by averaging channels; anything that is not
/// 16-bit integer PCM is rejected, since no decoding beyond raw PCM16
/// framing is supported.
///
/// # Errors
/// - If the file cannot be opened or is not a valid WAV
/// - If the sample format is not 16-bit integer PCM
/// - If the file has more than two channels
fn load_wav(path: &Path) -> Result<SampleWindow> {
    let reader = hound::WavReader::open(path)
        .map_err(|e| anyhow!("Failed to open {}: {e}", path.display()))?;
    let spec = reader.spec();

    if spec.sample_format != hound::SampleFormat::Int || spec.bits_per_sample != 16 {
        return Err(anyhow!(
            "Unsupported sample format: {}-bit {:?}. Only 16-bit integer PCM is supported.",
            spec.bits_per_sample,
            spec.sample_format
        ));
    }

    let samples = reader
        .into_samples::<i16>()
        .collect::<Result<Vec<i16>, _>>()
        .map_err(|e| anyhow!("Failed to read samples: {e}"))?;

    let mono = match spec.channels {
        1 => samples,
        2 => samples
            .chunks_exact(2)
            .map(|pair| ((pair[0] as i32 + pair[1] as i32) / 2) as i16)
            .collect(),
        n => return Err(anyhow!("Unsupported channel count: {n}")),
    };

    Ok(SampleWindow::new(mono, spec.sample_rate, 1))
}
