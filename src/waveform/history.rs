//! Bounded history of realtime waveform frames for the fade-out effect.

use std::collections::VecDeque;
use std::sync::Mutex;

use super::reduce::Polyline;

/// Number of frames kept around for the fade-out visualization.
pub const HISTORY_SIZE: usize = 6;

/// A frame paired with its rendering brightness (0-255, dimmest = oldest).
#[derive(Debug, Clone)]
pub struct FadedFrame {
    pub polyline: Polyline,
    pub brightness: u8,
}

/// Bounded FIFO of the most recent realtime frames.
///
/// The capture thread pushes while the render thread snapshots; a single
/// lock serializes both so a FIFO rotation is never observed half-done.
#[derive(Debug)]
pub struct HistoryRing {
    frames: Mutex<VecDeque<Polyline>>,
    capacity: usize,
}

impl HistoryRing {
    pub fn new() -> Self {
        Self::with_capacity(HISTORY_SIZE)
    }

    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            frames: Mutex::new(VecDeque::with_capacity(capacity)),
            capacity,
        }
    }

    /// Appends a frame, evicting the oldest when the ring is full.
    pub fn push(&self, polyline: Polyline) {
        let mut frames = self.frames.lock().unwrap();
        if frames.len() == self.capacity {
            frames.pop_front();
        }
        frames.push_back(polyline);
    }

    /// Returns the held frames oldest-first with their brightness.
    ///
    /// The alpha range splits into `capacity + 1` even steps and the k-th
    /// oldest frame (1-based) gets step k, so the newest frame never reaches
    /// full saturation even when the ring is full.
    pub fn snapshot(&self) -> Vec<FadedFrame> {
        let frames = self.frames.lock().unwrap();
        let delta = 255 / (self.capacity as u32 + 1);
        frames
            .iter()
            .enumerate()
            .map(|(k, polyline)| FadedFrame {
                polyline: polyline.clone(),
                brightness: (delta * (k as u32 + 1)) as u8,
            })
            .collect()
    }

    pub fn len(&self) -> usize {
        self.frames.lock().unwrap().len()
    }

    pub fn is_empty(&self) -> bool {
        self.frames.lock().unwrap().is_empty()
    }
}

impl Default for HistoryRing {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    fn frame(tag: f32) -> Polyline {
        Polyline { points: vec![0.0, tag, 1.0, tag] }
    }

    #[test]
    fn test_bounded_to_capacity() {
        let ring = HistoryRing::new();
        for i in 0..10 {
            ring.push(frame(i as f32));
            assert_eq!(ring.len(), (i + 1).min(HISTORY_SIZE));
        }
    }

    #[test]
    fn test_snapshot_keeps_most_recent_oldest_first() {
        let ring = HistoryRing::new();
        for i in 0..10 {
            ring.push(frame(i as f32));
        }
        let snapshot = ring.snapshot();
        assert_eq!(snapshot.len(), HISTORY_SIZE);
        // Frames 4..10 survive, oldest first.
        for (k, faded) in snapshot.iter().enumerate() {
            assert_eq!(faded.polyline.points[1], (k + 4) as f32);
        }
    }

    #[test]
    fn test_partial_ring_snapshot() {
        let ring = HistoryRing::new();
        ring.push(frame(1.0));
        ring.push(frame(2.0));
        let snapshot = ring.snapshot();
        assert_eq!(snapshot.len(), 2);
        assert_eq!(snapshot[0].polyline.points[1], 1.0);
        assert_eq!(snapshot[1].polyline.points[1], 2.0);
    }

    #[test]
    fn test_brightness_steps() {
        let ring = HistoryRing::new();
        for i in 0..HISTORY_SIZE {
            ring.push(frame(i as f32));
        }
        let snapshot = ring.snapshot();
        let delta = 255 / (HISTORY_SIZE as u32 + 1);
        for (k, faded) in snapshot.iter().enumerate() {
            assert_eq!(faded.brightness as u32, delta * (k as u32 + 1));
        }
        // The newest entry stays short of full saturation.
        assert!(snapshot.last().unwrap().brightness < 255);
    }

    #[test]
    fn test_concurrent_push_and_snapshot() {
        let ring = Arc::new(HistoryRing::new());
        let writer = {
            let ring = Arc::clone(&ring);
            std::thread::spawn(move || {
                for i in 0..1000 {
                    ring.push(frame(i as f32));
                }
            })
        };
        for _ in 0..1000 {
            let snapshot = ring.snapshot();
            assert!(snapshot.len() <= HISTORY_SIZE);
        }
        writer.join().unwrap();
        assert_eq!(ring.len(), HISTORY_SIZE);
    }
}
