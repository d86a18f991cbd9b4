//! Single-slot cache for the statically reduced waveform geometry.

use super::reduce::{reduce_static, AmplitudeScale, EnvelopePath};
use super::window::SampleWindow;

/// Caches the last `reduce_static` result, keyed by
/// `(width, height, window version)`.
///
/// The original behavior of recomputing the waveform picture whenever the
/// dimensions or the backing data change, modeled explicitly: any key change
/// invalidates the slot and the next read recomputes lazily.
#[derive(Debug)]
pub struct StaticWaveformCache {
    scale: AmplitudeScale,
    key: Option<(u32, u32, u64)>,
    path: EnvelopePath,
}

impl StaticWaveformCache {
    pub fn new(scale: AmplitudeScale) -> Self {
        Self {
            scale,
            key: None,
            path: EnvelopePath { vertices: Vec::new() },
        }
    }

    /// Returns the envelope for the window at the given size, reducing only
    /// when the size or the window's data changed since the last call.
    pub fn get(&mut self, window: &SampleWindow, width: u32, height: u32) -> &EnvelopePath {
        let key = (width, height, window.version());
        if self.key != Some(key) {
            tracing::debug!(width, height, version = window.version(), "Reducing static waveform");
            self.path = reduce_static(window, width, height, self.scale);
            self.key = Some(key);
        }
        &self.path
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rebuilds_on_resize() {
        let window = SampleWindow::new(vec![100i16; 4410], 44100, 1);
        let mut cache = StaticWaveformCache::new(AmplitudeScale::FullScale);

        assert_eq!(cache.get(&window, 80, 40).vertices.len(), 160);
        assert_eq!(cache.get(&window, 120, 40).vertices.len(), 240);
        assert_eq!(cache.get(&window, 120, 40).vertices.len(), 240);
    }

    #[test]
    fn test_rebuilds_on_new_window() {
        let quiet = SampleWindow::new(vec![0i16; 1000], 44100, 1);
        let loud = SampleWindow::new(vec![32767i16; 1000], 44100, 1);
        let mut cache = StaticWaveformCache::new(AmplitudeScale::FullScale);

        let flat_y = cache.get(&quiet, 10, 100).vertices[0].1;
        assert_eq!(flat_y, 50.0);
        let peak_y = cache.get(&loud, 10, 100).vertices[0].1;
        assert_eq!(peak_y, 0.0);
    }

    #[test]
    fn test_same_key_reuses_slot() {
        let window = SampleWindow::new(vec![5i16; 1000], 44100, 1);
        let mut cache = StaticWaveformCache::new(AmplitudeScale::FullScale);

        let first = cache.get(&window, 40, 20).clone();
        let second = cache.get(&window, 40, 20);
        assert_eq!(&first, second);
        assert_eq!(cache.key, Some((40, 20, window.version())));
    }
}
