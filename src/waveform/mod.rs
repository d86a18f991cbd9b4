//! Waveform core: sample-to-geometry reduction and realtime scheduling.
//!
//! Everything in here is plain data and numerics with no device or terminal
//! I/O. The platform layers (`monitor`, `playback`) feed buffers in and draw
//! the geometry that comes out.

pub mod cache;
pub mod cursor;
pub mod history;
pub mod ingest;
pub mod reduce;
pub mod window;

pub use cache::StaticWaveformCache;
pub use cursor::{CursorState, PlaybackCursor};
pub use history::{FadedFrame, HistoryRing, HISTORY_SIZE};
pub use ingest::{RealtimeIngestor, RenderScheduler, RenderToken, MIN_FRAME_INTERVAL_NANOS};
pub use reduce::{reduce_realtime, reduce_static, AmplitudeScale, EnvelopePath, Polyline};
pub use window::SampleWindow;
