//! Microphone capture feeding the realtime ingestor.
//!
//! Opens a cpal input stream on the configured device at its native
//! configuration, converts each callback buffer to mono i16, and offers it to
//! the ingestor with a monotonic timestamp. Whether a buffer actually becomes
//! a frame is the ingestor's call; the capture side never waits on rendering.

use anyhow::{anyhow, Result};
use cpal::traits::{DeviceTrait, HostTrait, StreamTrait};
use std::sync::Arc;
use std::time::Instant;

use crate::waveform::RealtimeIngestor;

#[cfg(target_os = "linux")]
use std::fs::OpenOptions;
#[cfg(target_os = "linux")]
use std::os::unix::io::AsRawFd;

/// Captures audio from a specified or default input device and streams it
/// into a [`RealtimeIngestor`].
pub struct AudioCapture {
    /// Actual capture sample rate from device
    sample_rate: u32,
    /// Active audio input stream (kept alive while monitoring)
    stream: Option<cpal::Stream>,
    /// Device name or "default" to use the system default device
    device_name: String,
}

impl AudioCapture {
    /// Creates a new capture with the requested sample rate and device.
    ///
    /// Note: The actual capture sample rate may differ based on device
    /// capabilities. Call `sample_rate()` after `start()` to get the
    /// actual rate.
    pub fn new(requested_sample_rate: u32, device_name: String) -> Self {
        Self {
            sample_rate: requested_sample_rate,
            stream: None,
            device_name,
        }
    }

    /// Starts capturing from the configured input device.
    ///
    /// # Errors
    /// - If the specified device is not available
    /// - If device configuration fails
    /// - If audio stream creation fails
    pub fn start(&mut self, ingestor: Arc<RealtimeIngestor>) -> Result<()> {
        // Get device while suppressing ALSA library warnings
        let device = suppress_alsa_warnings(|| {
            let host = cpal::default_host();

            if self.device_name == "default" {
                host.default_input_device()
                    .ok_or_else(|| anyhow!("No audio input device available"))
            } else {
                find_device_by_name(&host, &self.device_name)
            }
        })?;

        let device_name = device
            .name()
            .unwrap_or_else(|_| "Unknown device".to_string());
        tracing::info!("Monitoring device: {}", device_name);

        let device_config = device.default_input_config()?;
        let device_sample_rate = device_config.sample_rate().0;
        let num_channels = device_config.channels() as usize;

        if device_sample_rate != self.sample_rate {
            tracing::warn!(
                "Requested sample rate {}Hz but device uses {}Hz. Capturing at device rate.",
                self.sample_rate,
                device_sample_rate
            );
        }

        tracing::debug!(
            "Device configuration: {}Hz, {} channels",
            device_sample_rate,
            num_channels
        );

        self.sample_rate = device_sample_rate;

        let epoch = Instant::now();
        let callback_channels = num_channels;

        let stream = device.build_input_stream(
            &device_config.into(),
            move |data: &[i16], _: &cpal::InputCallbackInfo| {
                let buffer = mix_to_mono(data, callback_channels);
                let now_nanos = epoch.elapsed().as_nanos() as u64;
                ingestor.submit(&buffer, now_nanos);
            },
            |err| {
                tracing::error!("Audio stream error: {}", err);
            },
            None,
        )?;

        stream.play()?;
        self.stream = Some(stream);

        tracing::debug!("Audio stream started");
        Ok(())
    }

    /// Stops capturing. A buffer already in the callback may still be
    /// delivered once; the ingestor drops it against the dead surface.
    pub fn stop(&mut self) {
        self.stream = None;
        tracing::debug!("Audio stream stopped");
    }

    /// Returns the actual sample rate of the capture.
    pub fn sample_rate(&self) -> u32 {
        self.sample_rate
    }
}

/// Converts an interleaved buffer to mono by averaging all channels.
fn mix_to_mono(data: &[i16], num_channels: usize) -> Vec<i16> {
    match num_channels {
        0 => Vec::new(),
        1 => data.to_vec(),
        2 => data
            .chunks_exact(2)
            .map(|chunk| {
                let left = chunk[0] as i32;
                let right = chunk[1] as i32;
                ((left + right) / 2) as i16
            })
            .collect(),
        _ => data
            .chunks_exact(num_channels)
            .map(|chunk| {
                let sum: i32 = chunk.iter().map(|&s| s as i32).sum();
                (sum / num_channels as i32) as i16
            })
            .collect(),
    }
}

/// Finds an audio input device by name or numeric index.
///
/// # Arguments
/// * `host` - The cpal audio host
/// * `device_spec` - A device name, or a numeric index (0, 1, 2, etc.)
///
/// # Errors
/// - If no device with the specified name/index is found
fn find_device_by_name(host: &cpal::Host, device_spec: &str) -> Result<cpal::Device> {
    // Try to parse as a numeric index first
    if let Ok(index) = device_spec.parse::<usize>() {
        let devices: Vec<_> = host
            .input_devices()
            .map_err(|e| anyhow!("Failed to enumerate devices: {e}"))?
            .collect();

        if index < devices.len() {
            return Ok(devices.into_iter().nth(index).unwrap());
        } else {
            return Err(anyhow!(
                "Device index {} is out of range (0-{})",
                index,
                devices.len().saturating_sub(1)
            ));
        }
    }

    let devices = host
        .input_devices()
        .map_err(|e| anyhow!("Failed to enumerate devices: {e}"))?;

    for device in devices {
        if let Ok(name) = device.name() {
            if name == device_spec {
                return Ok(device);
            }
        }
    }

    Err(anyhow!(
        "Audio input device '{device_spec}' not found. Use 'wavescope list-devices' to see available devices."
    ))
}

/// Temporarily redirects stderr to /dev/null to suppress ALSA library warnings on Linux.
/// On non-Linux platforms, this is a no-op since ALSA doesn't exist.
#[cfg(target_os = "linux")]
pub fn suppress_alsa_warnings<F, T>(f: F) -> Result<T>
where
    F: FnOnce() -> Result<T>,
{
    let dev_null = OpenOptions::new()
        .write(true)
        .open("/dev/null")
        .map_err(|e| anyhow!("Failed to open /dev/null: {e}"))?;

    let dev_null_fd = dev_null.as_raw_fd();

    let old_stderr = unsafe { libc::dup(libc::STDERR_FILENO) };
    if old_stderr == -1 {
        return Err(anyhow!("Failed to duplicate stderr"));
    }

    let redirect_result = unsafe { libc::dup2(dev_null_fd, libc::STDERR_FILENO) };
    if redirect_result == -1 {
        unsafe { libc::close(old_stderr) };
        return Err(anyhow!("Failed to redirect stderr"));
    }

    let result = f();

    unsafe {
        libc::dup2(old_stderr, libc::STDERR_FILENO);
        libc::close(old_stderr);
    }

    result
}

/// On non-Linux platforms, no stderr suppression is needed since ALSA doesn't exist.
#[cfg(not(target_os = "linux"))]
pub fn suppress_alsa_warnings<F, T>(f: F) -> Result<T>
where
    F: FnOnce() -> Result<T>,
{
    f()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mono_passthrough() {
        assert_eq!(mix_to_mono(&[1, 2, 3], 1), vec![1, 2, 3]);
    }

    #[test]
    fn test_stereo_averages_pairs() {
        assert_eq!(mix_to_mono(&[100, 200, -50, 50], 2), vec![150, 0]);
    }

    #[test]
    fn test_multichannel_averages_all() {
        assert_eq!(mix_to_mono(&[30, 60, 90, 0, 0, 3], 3), vec![60, 1]);
    }
}
