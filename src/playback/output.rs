//! Audio playback of a sample window through the default output device.
//!
//! Streams the window's samples to a cpal output stream, tracking how many
//! frames have been handed to the device. The view UI polls that head
//! position to drive the playback cursor, and observes the completion flag
//! exactly once when the buffer is exhausted.

use anyhow::{anyhow, Result};
use cpal::traits::{DeviceTrait, HostTrait, StreamTrait};
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Arc;

use crate::monitor::capture::suppress_alsa_warnings;
use crate::waveform::SampleWindow;

/// Plays a [`SampleWindow`] through the system's default output device.
pub struct AudioPlayer {
    stream: Option<cpal::Stream>,
    frames_played: Arc<AtomicUsize>,
    completed: Arc<AtomicBool>,
    sample_rate: u32,
    total_frames: usize,
}

impl AudioPlayer {
    /// Opens an output stream and starts playback immediately.
    ///
    /// Stereo windows are mixed to mono before streaming; mono is then
    /// duplicated across however many channels the device wants.
    ///
    /// # Errors
    /// - If no output device is available
    /// - If stream creation or playback start fails
    pub fn start(window: &SampleWindow) -> Result<Self> {
        let samples = mono_samples(window);
        let sample_rate = window.sample_rate_hz();
        if sample_rate == 0 {
            return Err(anyhow!("Cannot play a window with no sample rate"));
        }
        let total_frames = samples.len();

        let device = suppress_alsa_warnings(|| {
            cpal::default_host()
                .default_output_device()
                .ok_or_else(|| anyhow!("No audio output device available"))
        })?;

        let device_name = device
            .name()
            .unwrap_or_else(|_| "Unknown device".to_string());
        tracing::info!("Playback device: {}", device_name);

        let device_config = device.default_output_config()?;
        let channels = device_config.channels() as usize;

        let config = cpal::StreamConfig {
            channels: channels as u16,
            sample_rate: cpal::SampleRate(sample_rate),
            buffer_size: cpal::BufferSize::Default,
        };

        let frames_played = Arc::new(AtomicUsize::new(0));
        let completed = Arc::new(AtomicBool::new(false));

        let callback_frames = Arc::clone(&frames_played);
        let callback_completed = Arc::clone(&completed);

        let stream = device.build_output_stream(
            &config,
            move |data: &mut [f32], _: &cpal::OutputCallbackInfo| {
                let mut head = callback_frames.load(Ordering::Acquire);
                for frame in data.chunks_mut(channels) {
                    let value = if head < samples.len() {
                        let s = samples[head] as f32 / 32768.0;
                        head += 1;
                        s
                    } else {
                        0.0
                    };
                    for out in frame.iter_mut() {
                        *out = value;
                    }
                }
                callback_frames.store(head, Ordering::Release);
                if head >= samples.len() {
                    callback_completed.store(true, Ordering::Release);
                }
            },
            |err| {
                tracing::error!("Playback stream error: {}", err);
            },
            None,
        )?;

        stream.play()?;
        tracing::debug!(
            "Playback started: {} frames at {}Hz, {} output channels",
            total_frames,
            sample_rate,
            channels
        );

        Ok(Self {
            stream: Some(stream),
            frames_played,
            completed,
            sample_rate,
            total_frames,
        })
    }

    /// Current playback head position in milliseconds.
    pub fn position_ms(&self) -> u64 {
        let frames = self.frames_played.load(Ordering::Acquire) as u64;
        frames * 1000 / self.sample_rate as u64
    }

    /// Whether the buffer has been fully handed to the device.
    pub fn is_complete(&self) -> bool {
        self.completed.load(Ordering::Acquire)
    }

    /// Stops playback. The stream is dropped; no confirmation is awaited.
    pub fn stop(&mut self) {
        self.stream = None;
        tracing::debug!(
            "Playback stopped at frame {}/{}",
            self.frames_played.load(Ordering::Acquire),
            self.total_frames
        );
    }
}

/// Flattens a window to mono samples for streaming.
fn mono_samples(window: &SampleWindow) -> Arc<[i16]> {
    match window.channel_count() {
        2 => window
            .samples()
            .chunks_exact(2)
            .map(|pair| ((pair[0] as i32 + pair[1] as i32) / 2) as i16)
            .collect(),
        _ => window.samples().to_vec().into(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mono_window_passthrough() {
        let window = SampleWindow::new(vec![1, 2, 3], 44100, 1);
        assert_eq!(mono_samples(&window).as_ref(), &[1, 2, 3]);
    }

    #[test]
    fn test_stereo_window_mixed_down() {
        let window = SampleWindow::new(vec![100, 200, -50, 50], 44100, 2);
        assert_eq!(mono_samples(&window).as_ref(), &[150, 0]);
    }
}
