// Easing curves shared by reveals, counters, and parallax fades.
// Curves are presentation tuning; only the 0 -> 0 and 1 -> 1 endpoints are load-bearing.

use serde::{Deserialize, Serialize};

/// Easing function for progress-driven transitions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub enum Easing {
    #[default]
    EaseOut,
    EaseOutExpo,
}

impl Easing {
    /// Apply the curve. `t` is clamped to [0, 1] first.
    pub fn apply(&self, t: f32) -> f32 {
        let t = if t.is_nan() { 0.0 } else { t.clamp(0.0, 1.0) };
        match self {
            Easing::EaseOut => 1.0 - (1.0 - t).powi(3),
            Easing::EaseOutExpo => {
                if t >= 1.0 {
                    1.0
                } else {
                    1.0 - 2.0_f32.powf(-10.0 * t)
                }
            }
        }
    }
}

pub fn lerp(a: f32, b: f32, t: f32) -> f32 {
    a + (b - a) * t
}

#[cfg(test)]
mod tests {
    use super::*;

    const ALL: [Easing; 2] = [Easing::EaseOut, Easing::EaseOutExpo];

    #[test]
    fn easing_endpoints() {
        for easing in ALL {
            assert_eq!(easing.apply(0.0), 0.0, "{easing:?} start");
            assert_eq!(easing.apply(1.0), 1.0, "{easing:?} end");
        }
    }

    #[test]
    fn easing_clamps_input() {
        for easing in ALL {
            assert_eq!(easing.apply(-2.0), easing.apply(0.0));
            assert_eq!(easing.apply(3.0), easing.apply(1.0));
            assert_eq!(easing.apply(f32::NAN), 0.0);
        }
    }

    #[test]
    fn ease_out_is_monotonic() {
        let mut last = 0.0;
        for step in 0..=100 {
            let value = Easing::EaseOut.apply(step as f32 / 100.0);
            assert!(value >= last);
            last = value;
        }
    }

    #[test]
    fn lerp_midpoint() {
        assert_eq!(lerp(10.0, 20.0, 0.5), 15.0);
        assert_eq!(lerp(10.0, 20.0, 0.0), 10.0);
    }
}
