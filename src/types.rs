// Strong typing over raw numbers. Newtypes for timestamps, progress, and panel indices.

use serde::{Deserialize, Serialize};

/// Timestamp in microseconds. Newtype for type safety.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize, Default)]
pub struct Timestamp(u64);

impl Timestamp {
    pub fn from_micros(us: u64) -> Self {
        Timestamp(us)
    }

    /// From a `requestAnimationFrame` / `performance.now()` value.
    /// Negative and non-finite inputs map to zero.
    pub fn from_millis_f64(ms: f64) -> Self {
        if ms.is_finite() && ms > 0.0 {
            Timestamp((ms * 1000.0).round() as u64)
        } else {
            Timestamp(0)
        }
    }

    pub fn as_micros(&self) -> u64 {
        self.0
    }

    pub fn as_millis(&self) -> f64 {
        self.0 as f64 / 1000.0
    }

    /// Microseconds elapsed since `earlier`, saturating at zero.
    pub fn since(&self, earlier: Timestamp) -> u64 {
        self.0.saturating_sub(earlier.0)
    }
}

/// Position of a panel in the ordered timeline sequence.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, Default)]
pub struct PanelIndex(u32);

impl PanelIndex {
    pub fn new(index: u32) -> Self {
        PanelIndex(index)
    }

    pub fn as_u32(&self) -> u32 {
        self.0
    }

    pub fn as_usize(&self) -> usize {
        self.0 as usize
    }
}

/// Normalized scroll progress, always within [0, 1].
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd, Serialize, Deserialize, Default)]
pub struct Progress(f32);

impl Progress {
    pub const START: Progress = Progress(0.0);
    pub const END: Progress = Progress(1.0);

    /// Clamps to [0, 1]. NaN is treated as no progress.
    pub fn new(value: f32) -> Self {
        if value.is_nan() {
            Progress(0.0)
        } else {
            Progress(value.clamp(0.0, 1.0))
        }
    }

    /// `scrolled / distance`, clamped. A non-positive distance never divides.
    pub fn from_scroll(scrolled: f32, distance: f32) -> Self {
        if distance > 0.0 && distance.is_finite() {
            Progress::new(scrolled / distance)
        } else {
            Progress::START
        }
    }

    pub fn value(&self) -> f32 {
        self.0
    }

    pub fn is_complete(&self) -> bool {
        self.0 >= 1.0
    }
}

/// A 2D point in CSS pixels.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize, Default)]
pub struct Point {
    pub x: f32,
    pub y: f32,
}

impl Point {
    pub fn new(x: f32, y: f32) -> Self {
        Point { x, y }
    }

    pub fn distance_to(&self, other: Point) -> f32 {
        let dx = self.x - other.x;
        let dy = self.y - other.y;
        (dx * dx + dy * dy).sqrt()
    }
}

/// Which rendering path the timeline uses.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum LayoutMode {
    /// Pinned horizontal track driven by vertical scroll.
    Desktop,
    /// Plain vertically-stacked panels, no pinning, no horizontal translation.
    Stacked,
}

impl LayoutMode {
    /// Widths strictly below the breakpoint use the stacked layout.
    pub fn for_width(viewport_width: f32, breakpoint_px: f32) -> Self {
        if viewport_width < breakpoint_px {
            LayoutMode::Stacked
        } else {
            LayoutMode::Desktop
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn timestamp_conversions() {
        let ts = Timestamp::from_millis_f64(1500.25);
        assert_eq!(ts.as_micros(), 1_500_250);
        assert!((ts.as_millis() - 1500.25).abs() < 0.0001);
        assert_eq!(Timestamp::from_millis_f64(-3.0).as_micros(), 0);
        assert_eq!(Timestamp::from_millis_f64(f64::NAN).as_micros(), 0);
    }

    #[test]
    fn timestamp_since_saturates() {
        let early = Timestamp::from_micros(100);
        let late = Timestamp::from_micros(250);
        assert_eq!(late.since(early), 150);
        assert_eq!(early.since(late), 0);
    }

    #[test]
    fn progress_clamps() {
        assert_eq!(Progress::new(-0.5), Progress::START);
        assert_eq!(Progress::new(1.7), Progress::END);
        assert_eq!(Progress::new(f32::NAN), Progress::START);
        assert_eq!(Progress::new(0.25).value(), 0.25);
    }

    #[test]
    fn progress_from_zero_distance() {
        assert_eq!(Progress::from_scroll(120.0, 0.0), Progress::START);
        assert_eq!(Progress::from_scroll(120.0, -40.0), Progress::START);
        assert_eq!(Progress::from_scroll(50.0, 200.0).value(), 0.25);
    }

    #[test]
    fn layout_mode_breakpoint() {
        assert_eq!(LayoutMode::for_width(767.0, 768.0), LayoutMode::Stacked);
        assert_eq!(LayoutMode::for_width(768.0, 768.0), LayoutMode::Desktop);
    }
}
