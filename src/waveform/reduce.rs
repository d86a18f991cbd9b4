//! Sample-to-geometry reduction.
//!
//! Converts arbitrarily large PCM16 buffers into a bounded, screen-resolution
//! set of coordinates. Two reductions exist and are intentionally asymmetric:
//! the static path keeps the per-column min/max envelope so transient peaks
//! narrower than one pixel column stay visible, while the realtime path picks
//! one sample per column because live capture buffers are already small and
//! speed matters more than decimation quality there.
//!
//! Both functions are pure and safe to call from any thread.

use serde::{Deserialize, Serialize};

use super::window::SampleWindow;

/// Divisor for full-height amplitude mapping (true PCM16 peak).
pub const FULL_SCALE: f32 = 32767.0;

/// Divisor for the quiet-signal boost mapping. Samples beyond this magnitude
/// hard-clip at the top/bottom edge.
pub const SOFT_CLIP: f32 = 8192.0;

/// Amplitude-to-pixel scaling variant.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum AmplitudeScale {
    /// Divide by 32767: full-scale samples reach the top/bottom edge exactly.
    /// A -32768 sample lands one half-step past the edge; that asymmetry is
    /// accepted, not corrected.
    #[default]
    FullScale,
    /// Divide by 8192: boosts quiet signals, clipping anything louder to the
    /// edges.
    SoftClip,
}

impl AmplitudeScale {
    fn divisor(self) -> f32 {
        match self {
            Self::FullScale => FULL_SCALE,
            Self::SoftClip => SOFT_CLIP,
        }
    }

    /// Maps one sample to a y coordinate in `[0, height]`, 0 at the top.
    fn map(self, sample: i16, height: u32) -> f32 {
        let center_y = height as f32 / 2.0;
        let y = center_y - (sample as f32 / self.divisor()) * center_y;
        match self {
            Self::FullScale => y,
            Self::SoftClip => y.clamp(0.0, height as f32),
        }
    }
}

impl std::fmt::Display for AmplitudeScale {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::FullScale => write!(f, "fullscale"),
            Self::SoftClip => write!(f, "softclip"),
        }
    }
}

/// Closed contour tracing the waveform envelope: the per-column maxima
/// left-to-right, then the per-column minima right-to-left. Suitable for both
/// fill and stroke rendering.
#[derive(Debug, Clone, PartialEq)]
pub struct EnvelopePath {
    /// `2 * width` vertices for a non-empty reduction, empty otherwise.
    pub vertices: Vec<(f32, f32)>,
}

impl EnvelopePath {
    pub fn is_empty(&self) -> bool {
        self.vertices.is_empty()
    }
}

/// Line segments of a realtime frame as a flat coordinate list
/// `[x0, y0, x1, y1, ...]` of length `4 * (width - 1)`.
#[derive(Debug, Clone, PartialEq)]
pub struct Polyline {
    pub points: Vec<f32>,
}

impl Polyline {
    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    /// Iterates the segments as `(x0, y0, x1, y1)` tuples.
    pub fn segments(&self) -> impl Iterator<Item = (f32, f32, f32, f32)> + '_ {
        self.points
            .chunks_exact(4)
            .map(|s| (s[0], s[1], s[2], s[3]))
    }
}

/// Reduces a full sample window to its min/max envelope at the given pixel
/// width and height.
///
/// The buffer is partitioned into `width` contiguous groups of
/// `len / width` samples each; the final group absorbs the integer-division
/// remainder. Each group contributes its true maximum to the upper trace and
/// its true minimum to the lower trace.
///
/// Zero width, zero height, or an empty buffer produce an empty path.
pub fn reduce_static(
    window: &SampleWindow,
    width: u32,
    height: u32,
    scale: AmplitudeScale,
) -> EnvelopePath {
    let samples = window.samples();
    if width == 0 || height == 0 || samples.is_empty() {
        return EnvelopePath { vertices: Vec::new() };
    }

    let extremes = column_extremes(samples, width as usize);

    let mut vertices = Vec::with_capacity(2 * width as usize);
    for (x, &(max, _)) in extremes.iter().enumerate() {
        vertices.push((x as f32, scale.map(max, height)));
    }
    for (x, &(_, min)) in extremes.iter().enumerate().rev() {
        vertices.push((x as f32, scale.map(min, height)));
    }

    EnvelopePath { vertices }
}

/// Reduces a realtime capture buffer to a polyline by picking the sample
/// nearest each pixel column: `index = floor((x / width) * len)`.
///
/// Zero width, zero height, or an empty buffer produce an empty polyline.
pub fn reduce_realtime(
    buffer: &[i16],
    width: u32,
    height: u32,
    scale: AmplitudeScale,
) -> Polyline {
    if width == 0 || height == 0 || buffer.is_empty() {
        return Polyline { points: Vec::new() };
    }

    let mut points = Vec::with_capacity(4 * (width as usize).saturating_sub(1));
    let mut last: Option<(f32, f32)> = None;

    for x in 0..width {
        let index = ((x as f32 / width as f32) * buffer.len() as f32) as usize;
        let y = scale.map(buffer[index], height);

        if let Some((last_x, last_y)) = last {
            points.push(last_x);
            points.push(last_y);
            points.push(x as f32);
            points.push(y);
        }
        last = Some((x as f32, y));
    }

    Polyline { points }
}

/// Computes `(max, min)` per output column.
///
/// Groups with no samples (buffer shorter than the width) read as silence.
fn column_extremes(samples: &[i16], width: usize) -> Vec<(i16, i16)> {
    let group_size = samples.len() / width;
    let mut extremes = Vec::with_capacity(width);

    for i in 0..width {
        let start = (i * group_size).min(samples.len());
        // Last group absorbs the remainder left by integer division.
        let end = if i + 1 == width {
            samples.len()
        } else {
            ((i + 1) * group_size).min(samples.len())
        };
        let group = &samples[start..end];

        if group.is_empty() {
            extremes.push((0, 0));
            continue;
        }

        let mut min = i16::MAX;
        let mut max = i16::MIN;
        for &s in group {
            min = min.min(s);
            max = max.max(s);
        }
        extremes.push((max, min));
    }

    extremes
}

#[cfg(test)]
mod tests {
    use super::*;

    fn window(samples: Vec<i16>) -> SampleWindow {
        SampleWindow::new(samples, 44100, 1)
    }

    #[test]
    fn test_envelope_is_tight() {
        // Every column's y range must come from the true min/max of its group.
        let samples: Vec<i16> = (0..1000).map(|i| ((i * 37) % 20000) as i16 - 10000).collect();
        let width = 16usize;
        let extremes = column_extremes(&samples, width);

        let group_size = samples.len() / width;
        for (i, &(max, min)) in extremes.iter().enumerate() {
            let start = i * group_size;
            let end = if i + 1 == width { samples.len() } else { (i + 1) * group_size };
            let group = &samples[start..end];
            assert_eq!(max, *group.iter().max().unwrap(), "column {i} max");
            assert_eq!(min, *group.iter().min().unwrap(), "column {i} min");
        }
    }

    #[test]
    fn test_static_vertex_count() {
        let w = window((0..4410).map(|i| (i % 100) as i16).collect());
        let path = reduce_static(&w, 80, 40, AmplitudeScale::FullScale);
        assert_eq!(path.vertices.len(), 2 * 80);
    }

    #[test]
    fn test_static_empty_inputs() {
        let w = window(vec![1, 2, 3]);
        assert!(reduce_static(&w, 0, 40, AmplitudeScale::FullScale).is_empty());
        assert!(reduce_static(&w, 80, 0, AmplitudeScale::FullScale).is_empty());
        let empty = window(vec![]);
        assert!(reduce_static(&empty, 80, 40, AmplitudeScale::FullScale).is_empty());
    }

    #[test]
    fn test_static_known_values() {
        // [0, 32767] -> (max 32767, min 0); [-32768, 0] -> (max 0, min -32768)
        let w = window(vec![0, 32767, -32768, 0]);
        let path = reduce_static(&w, 2, 100, AmplitudeScale::FullScale);

        assert_eq!(path.vertices.len(), 4);
        // Upper trace left-to-right: maxima.
        assert_eq!(path.vertices[0], (0.0, 0.0)); // y(32767) = 0
        assert_eq!(path.vertices[1], (1.0, 50.0)); // y(0) = 50
        // Lower trace right-to-left: minima. y(-32768) slightly past the
        // bottom edge under full-scale mapping; that asymmetry is accepted.
        assert_eq!(path.vertices[2].0, 1.0);
        assert!(path.vertices[2].1 >= 100.0);
        assert_eq!(path.vertices[3], (0.0, 50.0)); // y(0) = 50
    }

    #[test]
    fn test_static_remainder_absorbed() {
        // 10 samples over 3 columns: group size 3, last group spans 4.
        // The peak hides in the remainder and must not be dropped.
        let mut samples = vec![0i16; 10];
        samples[9] = 30000;
        let extremes = column_extremes(&samples, 3);
        assert_eq!(extremes[2].0, 30000);
    }

    #[test]
    fn test_static_buffer_shorter_than_width() {
        let w = window(vec![100, -100]);
        let path = reduce_static(&w, 8, 50, AmplitudeScale::FullScale);
        // Still one vertex pair per column; empty groups sit on the center line.
        assert_eq!(path.vertices.len(), 16);
        assert_eq!(path.vertices[4], (4.0, 25.0));
    }

    #[test]
    fn test_realtime_segment_count() {
        let buffer: Vec<i16> = (0..512).map(|i| (i * 13 % 2000) as i16).collect();
        let polyline = reduce_realtime(&buffer, 80, 40, AmplitudeScale::FullScale);
        assert_eq!(polyline.points.len(), 4 * (80 - 1));
        assert_eq!(polyline.segments().count(), 79);
    }

    #[test]
    fn test_realtime_empty_inputs() {
        assert!(reduce_realtime(&[1, 2, 3], 0, 40, AmplitudeScale::FullScale).is_empty());
        assert!(reduce_realtime(&[1, 2, 3], 80, 0, AmplitudeScale::FullScale).is_empty());
        assert!(reduce_realtime(&[], 80, 40, AmplitudeScale::FullScale).is_empty());
        // A single column yields no segments.
        assert!(reduce_realtime(&[1, 2, 3], 1, 40, AmplitudeScale::FullScale).is_empty());
    }

    #[test]
    fn test_realtime_segments_are_contiguous() {
        let buffer: Vec<i16> = (0..256).map(|i| (i as i16) * 10).collect();
        let polyline = reduce_realtime(&buffer, 32, 40, AmplitudeScale::FullScale);
        let mut expected_x = 0.0;
        for (x0, _, x1, _) in polyline.segments() {
            assert_eq!(x0, expected_x);
            assert_eq!(x1, expected_x + 1.0);
            expected_x += 1.0;
        }
    }

    #[test]
    fn test_soft_clip_clamps_to_height() {
        // 20000 > 8192, so the mapped y would leave [0, height] without clamping.
        let polyline = reduce_realtime(&[20000, -20000], 2, 100, AmplitudeScale::SoftClip);
        for (_, y0, _, y1) in polyline.segments() {
            assert!((0.0..=100.0).contains(&y0));
            assert!((0.0..=100.0).contains(&y1));
        }
        assert_eq!(polyline.points[1], 0.0); // hard-clipped at the top edge
    }

    #[test]
    fn test_soft_clip_boosts_quiet_signal() {
        let quiet = 4096i16; // half of SOFT_CLIP, an eighth of full scale
        let full = reduce_realtime(&[quiet, quiet], 2, 100, AmplitudeScale::FullScale);
        let soft = reduce_realtime(&[quiet, quiet], 2, 100, AmplitudeScale::SoftClip);
        // Soft-clip pushes the trace further from the center line.
        assert!((50.0 - soft.points[1]).abs() > (50.0 - full.points[1]).abs());
        assert_eq!(soft.points[1], 25.0);
    }
}
