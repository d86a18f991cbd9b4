//! Immutable view over a PCM16 sample buffer with derived timing metadata.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

/// Counter for window versions, used as a cache key component.
static NEXT_VERSION: AtomicU64 = AtomicU64::new(1);

/// A read-only window over a contiguous buffer of interleaved PCM16 samples.
///
/// The buffer is never mutated after construction; producers replace the
/// whole window when new data arrives. Cloning is cheap (the sample buffer
/// is shared).
#[derive(Debug, Clone)]
pub struct SampleWindow {
    samples: Arc<[i16]>,
    sample_rate_hz: u32,
    channel_count: u16,
    version: u64,
}

impl SampleWindow {
    /// Creates a new window over the given samples.
    ///
    /// A zero sample rate or channel count does not error; the window is
    /// considered malformed and its duration reads as zero until a properly
    /// populated window replaces it.
    pub fn new(samples: Vec<i16>, sample_rate_hz: u32, channel_count: u16) -> Self {
        Self {
            samples: samples.into(),
            sample_rate_hz,
            channel_count,
            version: NEXT_VERSION.fetch_add(1, Ordering::Relaxed),
        }
    }

    /// The raw interleaved samples.
    pub fn samples(&self) -> &[i16] {
        &self.samples
    }

    pub fn sample_rate_hz(&self) -> u32 {
        self.sample_rate_hz
    }

    pub fn channel_count(&self) -> u16 {
        self.channel_count
    }

    /// Identity of this window's data, distinct for every construction.
    pub fn version(&self) -> u64 {
        self.version
    }

    /// Number of frames (samples per channel).
    pub fn frame_count(&self) -> usize {
        if self.channel_count == 0 {
            return 0;
        }
        self.samples.len() / self.channel_count as usize
    }

    /// Duration of the audio in milliseconds.
    ///
    /// `(len / channels) * 1000 / rate`. Returns zero for a malformed window
    /// (zero rate or channel count) rather than erroring.
    pub fn duration_ms(&self) -> u64 {
        if self.sample_rate_hz == 0 || self.channel_count == 0 {
            return 0;
        }
        let frames = self.samples.len() as u64 / self.channel_count as u64;
        frames * 1000 / self.sample_rate_hz as u64
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_duration_one_second_mono() {
        let window = SampleWindow::new(vec![0i16; 44100], 44100, 1);
        assert_eq!(window.duration_ms(), 1000);
    }

    #[test]
    fn test_duration_stereo_halves() {
        let window = SampleWindow::new(vec![0i16; 44100], 44100, 2);
        assert_eq!(window.duration_ms(), 500);
        assert_eq!(window.frame_count(), 22050);
    }

    #[test]
    fn test_malformed_window_reads_zero() {
        let no_rate = SampleWindow::new(vec![0i16; 1000], 0, 1);
        assert_eq!(no_rate.duration_ms(), 0);

        let no_channels = SampleWindow::new(vec![0i16; 1000], 44100, 0);
        assert_eq!(no_channels.duration_ms(), 0);
        assert_eq!(no_channels.frame_count(), 0);
    }

    #[test]
    fn test_versions_increase() {
        let a = SampleWindow::new(vec![], 44100, 1);
        let b = SampleWindow::new(vec![], 44100, 1);
        assert!(b.version() > a.version());
    }
}
