//! Admission control for the realtime capture path.
//!
//! Capture buffers can arrive every 10-20 ms, faster than the display can
//! usefully redraw. The ingestor throttles reduction to a 25 fps cap and
//! guarantees at most one render pass in flight, dropping everything else
//! silently. A dropped frame is an expected outcome, not an error.

use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::{Arc, Mutex};

use super::history::HistoryRing;
use super::reduce::{reduce_realtime, AmplitudeScale};

/// Minimum interval between accepted submissions: 1000/25 ms.
pub const MIN_FRAME_INTERVAL_NANOS: u64 = 1_000_000_000 / 25;

/// Sentinel for "no submission accepted yet".
const NEVER: u64 = u64::MAX;

/// Deferred render dispatch owned by the UI layer.
///
/// The ingestor only needs "tell me the drawable size, schedule one render
/// pass, hand the completion token to it" — not a concrete threading
/// primitive. Implementations that cannot lock their surface simply drop the
/// token without drawing.
pub trait RenderScheduler: Send + Sync {
    /// Current drawable size in pixels, or `None` while the surface is
    /// unavailable.
    fn surface_size(&self) -> Option<(u32, u32)>;

    /// Schedules exactly one render pass. The pass holds the token while it
    /// runs and releases it by dropping it when done.
    fn schedule_render(&self, token: RenderToken);
}

/// Clears the ingestor's in-flight flag when dropped, so the flag is released
/// strictly after the render pass completes — on success, skip, or panic.
#[derive(Debug)]
pub struct RenderToken {
    in_flight: Arc<AtomicBool>,
}

impl Drop for RenderToken {
    fn drop(&mut self) {
        self.in_flight.store(false, Ordering::Release);
    }
}

/// Rate-limited, single-flight front of the realtime reduction pipeline.
pub struct RealtimeIngestor {
    ring: Arc<HistoryRing>,
    scheduler: Arc<dyn RenderScheduler>,
    scale: AmplitudeScale,
    last_accepted_nanos: AtomicU64,
    in_flight: Arc<AtomicBool>,
    last_size: Mutex<Option<(u32, u32)>>,
}

impl RealtimeIngestor {
    pub fn new(
        ring: Arc<HistoryRing>,
        scheduler: Arc<dyn RenderScheduler>,
        scale: AmplitudeScale,
    ) -> Self {
        Self {
            ring,
            scheduler,
            scale,
            last_accepted_nanos: AtomicU64::new(NEVER),
            in_flight: Arc::new(AtomicBool::new(false)),
            last_size: Mutex::new(None),
        }
    }

    /// Offers a freshly captured buffer. Returns whether it was accepted.
    ///
    /// Rejected (no-op) when less than 40 ms have passed since the last
    /// accepted submission, or while a previously scheduled render pass has
    /// not completed. On acceptance the buffer is reduced, pushed into the
    /// history ring, and one render pass is scheduled; the acceptance time
    /// (not the completion time) becomes the new throttle reference.
    ///
    /// Never blocks and never errors; every failure path is a silent drop.
    pub fn submit(&self, buffer: &[i16], now_nanos: u64) -> bool {
        let last = self.last_accepted_nanos.load(Ordering::Acquire);
        if last != NEVER && now_nanos.saturating_sub(last) < MIN_FRAME_INTERVAL_NANOS {
            return false;
        }
        if self.in_flight.load(Ordering::Acquire) {
            return false;
        }

        let Some((width, height)) = self.resolve_size() else {
            // Surface has never been available; nothing sensible to reduce
            // against. The next submission tries again.
            tracing::trace!("Dropping frame: no drawable surface yet");
            return false;
        };

        let polyline = reduce_realtime(buffer, width, height, self.scale);
        self.ring.push(polyline);

        self.in_flight.store(true, Ordering::Release);
        self.scheduler.schedule_render(RenderToken {
            in_flight: Arc::clone(&self.in_flight),
        });
        self.last_accepted_nanos.store(now_nanos, Ordering::Release);

        true
    }

    /// Asks the scheduler for the drawable size, falling back to the last
    /// observed size while the surface is temporarily unavailable.
    fn resolve_size(&self) -> Option<(u32, u32)> {
        let mut last_size = self.last_size.lock().unwrap();
        match self.scheduler.surface_size() {
            Some(size) => {
                *last_size = Some(size);
                Some(size)
            }
            None => *last_size,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Scheduler that records tokens instead of rendering. Held tokens keep
    /// the render pass "in flight"; dropping one completes it.
    struct FakeScheduler {
        size: Mutex<Option<(u32, u32)>>,
        tokens: Mutex<Vec<RenderToken>>,
    }

    impl FakeScheduler {
        fn new(size: Option<(u32, u32)>) -> Self {
            Self {
                size: Mutex::new(size),
                tokens: Mutex::new(Vec::new()),
            }
        }

        fn complete_render(&self) {
            self.tokens.lock().unwrap().pop();
        }

        fn scheduled(&self) -> usize {
            self.tokens.lock().unwrap().len()
        }
    }

    impl RenderScheduler for FakeScheduler {
        fn surface_size(&self) -> Option<(u32, u32)> {
            *self.size.lock().unwrap()
        }

        fn schedule_render(&self, token: RenderToken) {
            self.tokens.lock().unwrap().push(token);
        }
    }

    fn ingestor(scheduler: &Arc<FakeScheduler>) -> (RealtimeIngestor, Arc<HistoryRing>) {
        let ring = Arc::new(HistoryRing::new());
        let ingestor = RealtimeIngestor::new(
            Arc::clone(&ring),
            Arc::clone(scheduler) as Arc<dyn RenderScheduler>,
            AmplitudeScale::FullScale,
        );
        (ingestor, ring)
    }

    const MS: u64 = 1_000_000;

    #[test]
    fn test_first_submission_accepted() {
        let scheduler = Arc::new(FakeScheduler::new(Some((80, 40))));
        let (ingestor, ring) = ingestor(&scheduler);

        assert!(ingestor.submit(&[1, 2, 3, 4], 0));
        assert_eq!(ring.len(), 1);
        assert_eq!(scheduler.scheduled(), 1);
    }

    #[test]
    fn test_throttle_rejects_within_40ms() {
        let scheduler = Arc::new(FakeScheduler::new(Some((80, 40))));
        let (ingestor, ring) = ingestor(&scheduler);

        assert!(ingestor.submit(&[1, 2], 0));
        scheduler.complete_render();
        assert!(!ingestor.submit(&[3, 4], 39 * MS));
        assert_eq!(ring.len(), 1);
    }

    #[test]
    fn test_throttle_accepts_at_40ms() {
        let scheduler = Arc::new(FakeScheduler::new(Some((80, 40))));
        let (ingestor, ring) = ingestor(&scheduler);

        assert!(ingestor.submit(&[1, 2], 0));
        scheduler.complete_render();
        assert!(ingestor.submit(&[3, 4], 40 * MS));
        assert_eq!(ring.len(), 2);
    }

    #[test]
    fn test_single_flight_rejects_regardless_of_elapsed_time() {
        let scheduler = Arc::new(FakeScheduler::new(Some((80, 40))));
        let (ingestor, ring) = ingestor(&scheduler);

        assert!(ingestor.submit(&[1, 2], 0));
        // Render still in flight: even a long-overdue frame is dropped.
        assert!(!ingestor.submit(&[3, 4], 500 * MS));
        assert_eq!(ring.len(), 1);

        scheduler.complete_render();
        assert!(ingestor.submit(&[5, 6], 501 * MS));
        assert_eq!(ring.len(), 2);
    }

    #[test]
    fn test_throttle_reference_is_acceptance_time() {
        let scheduler = Arc::new(FakeScheduler::new(Some((80, 40))));
        let (ingestor, _ring) = ingestor(&scheduler);

        assert!(ingestor.submit(&[1, 2], 100 * MS));
        // Render completes much later; the throttle still counts from 100ms.
        scheduler.complete_render();
        assert!(!ingestor.submit(&[3, 4], 139 * MS));
        assert!(ingestor.submit(&[5, 6], 140 * MS));
    }

    #[test]
    fn test_no_surface_ever_drops_without_pushing() {
        let scheduler = Arc::new(FakeScheduler::new(None));
        let (ingestor, ring) = ingestor(&scheduler);

        assert!(!ingestor.submit(&[1, 2], 0));
        assert!(ring.is_empty());
        assert_eq!(scheduler.scheduled(), 0);
        // Dropping must not consume the throttle budget.
        assert!(!ingestor.submit(&[3, 4], 1 * MS));
        *scheduler.size.lock().unwrap() = Some((80, 40));
        assert!(ingestor.submit(&[5, 6], 2 * MS));
    }

    #[test]
    fn test_surface_loss_falls_back_to_last_size() {
        let scheduler = Arc::new(FakeScheduler::new(Some((80, 40))));
        let (ingestor, ring) = ingestor(&scheduler);

        assert!(ingestor.submit(&[1, 2], 0));
        scheduler.complete_render();

        // Surface goes away; frames keep reducing against the known size.
        *scheduler.size.lock().unwrap() = None;
        assert!(ingestor.submit(&[3, 4], 50 * MS));
        assert_eq!(ring.len(), 2);
    }

    #[test]
    fn test_token_drop_clears_in_flight() {
        let scheduler = Arc::new(FakeScheduler::new(Some((80, 40))));
        let (ingestor, _ring) = ingestor(&scheduler);

        assert!(ingestor.submit(&[1, 2], 0));
        assert!(ingestor.in_flight.load(Ordering::Acquire));
        scheduler.complete_render();
        assert!(!ingestor.in_flight.load(Ordering::Acquire));
    }
}
