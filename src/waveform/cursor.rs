//! Playback position tracking for the static waveform marker.

/// Where the cursor is in its lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CursorState {
    /// No progress notification received yet.
    Idle,
    /// Playback is underway.
    Progressing,
    /// Playback reached the end of the buffer.
    Completed,
}

/// Tracks elapsed playback position against a fixed total duration.
///
/// Driven by periodic progress notifications from the playback collaborator;
/// positions are taken as delivered and assumed monotonic within one run.
#[derive(Debug)]
pub struct PlaybackCursor {
    duration_ms: u64,
    position_ms: u64,
    state: CursorState,
}

impl PlaybackCursor {
    pub fn new(duration_ms: u64) -> Self {
        Self {
            duration_ms,
            position_ms: 0,
            state: CursorState::Idle,
        }
    }

    /// Records a progress notification in milliseconds.
    ///
    /// Values beyond the duration are accepted as given; a completion
    /// notification legitimately reports the endpoint. Once completed the
    /// cursor only leaves that state through `reset()`, so a stale tick
    /// still in flight when playback ends is ignored.
    pub fn on_progress(&mut self, ms: u64) {
        if self.state == CursorState::Completed {
            return;
        }
        self.position_ms = ms;
        self.state = CursorState::Progressing;
    }

    /// Records the end of playback, pinning the position to the full
    /// duration regardless of the last progress tick. Guards against
    /// rounding leaving the marker short of the end.
    pub fn on_completion(&mut self) {
        self.position_ms = self.duration_ms;
        self.state = CursorState::Completed;
    }

    /// Starts a new playback session. This is the explicit external restart;
    /// the cursor never leaves `Completed` on its own.
    pub fn reset(&mut self) {
        self.position_ms = 0;
        self.state = CursorState::Idle;
    }

    /// X coordinate of the playback marker for the given pixel width.
    ///
    /// Returns `None` once playback has reached or passed the end, so the
    /// marker disappears rather than freezing at the right edge. Also `None`
    /// for a zero-duration window, where no position is meaningful.
    pub fn marker_x(&self, width: u32) -> Option<f32> {
        if self.duration_ms == 0 || self.position_ms >= self.duration_ms {
            return None;
        }
        let x_step = width as f32 / self.duration_ms as f32;
        Some(x_step * self.position_ms as f32)
    }

    pub fn position_ms(&self) -> u64 {
        self.position_ms
    }

    pub fn duration_ms(&self) -> u64 {
        self.duration_ms
    }

    pub fn state(&self) -> CursorState {
        self.state
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_marker_position_during_playback() {
        let mut cursor = PlaybackCursor::new(1000);
        cursor.on_progress(250);
        // x_step = 200 / 1000 = 0.2 per ms
        assert_eq!(cursor.marker_x(200), Some(50.0));
    }

    #[test]
    fn test_marker_disappears_at_end() {
        let mut cursor = PlaybackCursor::new(1000);
        cursor.on_progress(999);
        assert!(cursor.marker_x(200).is_some());
        cursor.on_progress(1000);
        assert_eq!(cursor.marker_x(200), None);
        cursor.on_progress(1500);
        assert_eq!(cursor.marker_x(200), None);
    }

    #[test]
    fn test_completion_overrides_stale_progress() {
        let mut cursor = PlaybackCursor::new(1000);
        cursor.on_progress(980);
        cursor.on_completion();
        assert_eq!(cursor.position_ms(), 1000);
        assert_eq!(cursor.marker_x(200), None);
    }

    #[test]
    fn test_stale_progress_after_completion_ignored() {
        // A playback tick can still be in flight when completion lands; it
        // must not pull the cursor out of Completed or revive the marker.
        let mut cursor = PlaybackCursor::new(1000);
        cursor.on_progress(980);
        cursor.on_completion();
        cursor.on_progress(990);
        assert_eq!(cursor.state(), CursorState::Completed);
        assert_eq!(cursor.position_ms(), 1000);
        assert_eq!(cursor.marker_x(200), None);

        // Only the explicit restart re-enables progression.
        cursor.reset();
        cursor.on_progress(10);
        assert_eq!(cursor.state(), CursorState::Progressing);
    }

    #[test]
    fn test_zero_duration_has_no_marker() {
        let cursor = PlaybackCursor::new(0);
        assert_eq!(cursor.marker_x(200), None);
    }

    #[test]
    fn test_state_transitions() {
        let mut cursor = PlaybackCursor::new(1000);
        assert_eq!(cursor.state(), CursorState::Idle);

        cursor.on_progress(10);
        assert_eq!(cursor.state(), CursorState::Progressing);
        cursor.on_progress(20);
        assert_eq!(cursor.state(), CursorState::Progressing);

        cursor.on_completion();
        assert_eq!(cursor.state(), CursorState::Completed);

        cursor.reset();
        assert_eq!(cursor.state(), CursorState::Idle);
        assert_eq!(cursor.position_ms(), 0);
        cursor.on_progress(5);
        assert_eq!(cursor.state(), CursorState::Progressing);
    }
}
