// Fixed-duration stepped animations started by a one-shot visibility trigger:
// the numeric score counter and the text scramble. Both hold their final value.

use serde::{Deserialize, Serialize};

use crate::content::model::format_score;
use crate::easing::Easing;
use crate::reveal::OneShotTrigger;
use crate::types::Timestamp;

/// Elapsed-time clock for a fixed-duration animation.
#[derive(Debug, Clone, PartialEq)]
pub struct SteppedClock {
    duration_us: u64,
    started_at: Option<Timestamp>,
    /// Started without a timestamp: the first `advance` supplies it.
    start_pending: bool,
    finished: bool,
}

impl SteppedClock {
    pub fn new(duration_us: u64) -> Self {
        SteppedClock {
            duration_us: duration_us.max(1),
            started_at: None,
            start_pending: false,
            finished: false,
        }
    }

    pub fn start(&mut self, now: Timestamp) {
        if self.started_at.is_none() {
            self.started_at = Some(now);
            self.start_pending = false;
        }
    }

    /// Start at whatever time the next `advance` reports.
    pub fn start_on_next_advance(&mut self) {
        if self.started_at.is_none() {
            self.start_pending = true;
        }
    }

    /// Linear progress in [0, 1]. Latches `finished` once 1 is reached.
    pub fn advance(&mut self, now: Timestamp) -> f32 {
        if self.start_pending {
            self.start(now);
        }
        let progress = self.progress_at(now);
        if progress >= 1.0 {
            self.finished = true;
        }
        progress
    }

    pub fn progress_at(&self, now: Timestamp) -> f32 {
        if self.finished {
            return 1.0;
        }
        match self.started_at {
            None => 0.0,
            Some(started) => (now.since(started) as f64 / self.duration_us as f64).min(1.0) as f32,
        }
    }

    pub fn is_running(&self) -> bool {
        (self.started_at.is_some() || self.start_pending) && !self.finished
    }

    pub fn is_finished(&self) -> bool {
        self.finished
    }

    pub fn elapsed(&self, now: Timestamp) -> u64 {
        self.started_at.map(|s| now.since(s)).unwrap_or(0)
    }
}

/// Counter frame handed to the view layer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CounterFrame {
    pub value: f32,
    pub display: String,
    pub finished: bool,
}

/// Eased numeric ramp from 0 to a target score.
#[derive(Debug, Clone)]
pub struct ScoreCounter {
    target: f32,
    trigger: OneShotTrigger,
    clock: SteppedClock,
}

impl ScoreCounter {
    pub fn new(target: f32, threshold: f32, duration_us: u64) -> Self {
        ScoreCounter {
            target,
            trigger: OneShotTrigger::new(threshold),
            clock: SteppedClock::new(duration_us),
        }
    }

    /// Returns true when this observation starts the count.
    pub fn observe(&mut self, visible_ratio: f32, now: Timestamp) -> bool {
        if self.trigger.observe(visible_ratio) {
            self.clock.start(now);
            true
        } else {
            false
        }
    }

    /// Like `observe` for a report without a timestamp; the ramp starts at the
    /// next tick.
    pub fn observe_untimed(&mut self, visible_ratio: f32) -> bool {
        if self.trigger.observe(visible_ratio) {
            self.clock.start_on_next_advance();
            true
        } else {
            false
        }
    }

    pub fn tick(&mut self, now: Timestamp) -> CounterFrame {
        self.clock.advance(now);
        self.frame(now)
    }

    pub fn frame(&self, now: Timestamp) -> CounterFrame {
        let value = if self.clock.is_finished() {
            self.target
        } else {
            self.target * Easing::EaseOutExpo.apply(self.clock.progress_at(now))
        };
        CounterFrame {
            value,
            display: format_score(value),
            finished: self.clock.is_finished(),
        }
    }

    pub fn is_running(&self) -> bool {
        self.clock.is_running()
    }
}

const SCRAMBLE_GLYPHS: &[char] = &[
    'A', 'B', 'C', 'D', 'E', 'F', 'G', 'H', 'K', 'M', 'N', 'P', 'R', 'S', 'T', 'W', 'X', 'Z',
    '#', '%', '&', '*', '+', '=', '?', '@', '0', '1', '2', '3', '4', '5', '7', '9',
];

/// Scramble frame handed to the view layer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScrambleFrame {
    pub text: String,
    pub finished: bool,
}

/// Character-substitution animation converging left to right onto the target text.
#[derive(Debug, Clone)]
pub struct TextScramble {
    target: Vec<char>,
    seed: u32,
    step_us: u64,
    trigger: OneShotTrigger,
    clock: SteppedClock,
}

impl TextScramble {
    pub fn new(target: &str, seed: u32, threshold: f32, duration_us: u64, step_us: u64) -> Self {
        TextScramble {
            target: target.chars().collect(),
            seed,
            step_us: step_us.max(1),
            trigger: OneShotTrigger::new(threshold),
            clock: SteppedClock::new(duration_us),
        }
    }

    pub fn observe(&mut self, visible_ratio: f32, now: Timestamp) -> bool {
        if self.trigger.observe(visible_ratio) {
            self.clock.start(now);
            true
        } else {
            false
        }
    }

    pub fn observe_untimed(&mut self, visible_ratio: f32) -> bool {
        if self.trigger.observe(visible_ratio) {
            self.clock.start_on_next_advance();
            true
        } else {
            false
        }
    }

    pub fn tick(&mut self, now: Timestamp) -> ScrambleFrame {
        self.clock.advance(now);
        self.frame(now)
    }

    pub fn frame(&self, now: Timestamp) -> ScrambleFrame {
        let finished = self.clock.is_finished();
        if finished || self.target.is_empty() {
            return ScrambleFrame {
                text: self.target.iter().collect(),
                finished,
            };
        }
        if !self.clock.is_running() {
            // Not triggered yet: hold a fully scrambled line at step zero.
            return ScrambleFrame {
                text: self.scrambled(0, 0),
                finished: false,
            };
        }

        let progress = self.clock.progress_at(now);
        let settled = (progress * self.target.len() as f32).floor() as usize;
        let step = self.clock.elapsed(now) / self.step_us;
        ScrambleFrame {
            text: self.scrambled(settled, step),
            finished: false,
        }
    }

    fn scrambled(&self, settled: usize, step: u64) -> String {
        self.target
            .iter()
            .enumerate()
            .map(|(i, &c)| {
                if i < settled || c.is_whitespace() {
                    c
                } else {
                    glyph(self.seed, i as u32, step)
                }
            })
            .collect()
    }

    pub fn is_running(&self) -> bool {
        self.clock.is_running()
    }
}

/// Deterministic glyph pick for (seed, position, step).
fn glyph(seed: u32, position: u32, step: u64) -> char {
    let mut h = seed
        .wrapping_mul(0x9E37_79B9)
        .wrapping_add(position.wrapping_mul(0x85EB_CA6B))
        .wrapping_add((step as u32).wrapping_mul(0xC2B2_AE35));
    h ^= h >> 16;
    h = h.wrapping_mul(0x7FEB_352D);
    h ^= h >> 15;
    SCRAMBLE_GLYPHS[h as usize % SCRAMBLE_GLYPHS.len()]
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ts(ms: u64) -> Timestamp {
        Timestamp::from_micros(ms * 1000)
    }

    #[test]
    fn counter_waits_for_visibility() {
        let mut counter = ScoreCounter::new(9.0, 0.5, 2_000_000);
        assert!(!counter.observe(0.4, ts(0)));
        let frame = counter.tick(ts(500));
        assert_eq!(frame.value, 0.0);
        assert_eq!(frame.display, "0.0");
        assert!(!counter.is_running());
    }

    #[test]
    fn counter_ramps_and_holds_target() {
        let mut counter = ScoreCounter::new(9.0, 0.5, 2_000_000);
        assert!(counter.observe(0.6, ts(1_000)));
        assert!(counter.is_running());

        let mid = counter.tick(ts(2_000));
        assert!(mid.value > 0.0 && mid.value < 9.0);
        assert!(!mid.finished);

        let done = counter.tick(ts(3_000));
        assert_eq!(done.value, 9.0);
        assert_eq!(done.display, "9.0");
        assert!(done.finished);
        assert!(!counter.is_running());

        // Later visibility changes are ignored.
        assert!(!counter.observe(1.0, ts(10_000)));
        assert_eq!(counter.tick(ts(10_500)).value, 9.0);
    }

    #[test]
    fn untimed_trigger_starts_at_first_tick() {
        let mut counter = ScoreCounter::new(9.0, 0.5, 2_000_000);
        assert!(counter.observe_untimed(0.6));
        assert!(counter.is_running());

        // However late the first tick lands, the ramp starts there.
        let first = counter.tick(ts(10_016));
        assert_eq!(first.value, 0.0);
        assert!(!first.finished);
        let mid = counter.tick(ts(11_016));
        assert!(mid.value > 0.0 && mid.value < 9.0);
        assert!(counter.tick(ts(12_016)).finished);

        let mut scramble = TextScramble::new("Koji", 1, 0.5, 1_200_000, 40_000);
        assert!(scramble.observe_untimed(1.0));
        assert!(!scramble.tick(ts(50_000)).finished);
        assert_eq!(scramble.tick(ts(51_200)).text, "Koji");
    }

    #[test]
    fn counter_is_monotonic() {
        let mut counter = ScoreCounter::new(8.5, 0.5, 1_000_000);
        counter.observe(1.0, ts(0));
        let mut last = 0.0;
        for ms in (0..=1_100).step_by(16) {
            let value = counter.tick(ts(ms)).value;
            assert!(value >= last);
            last = value;
        }
        assert_eq!(last, 8.5);
    }

    #[test]
    fn scramble_converges_to_target() {
        let mut scramble = TextScramble::new("Pho Real", 7, 0.5, 1_200_000, 40_000);
        assert!(scramble.observe(0.75, ts(0)));

        let early = scramble.tick(ts(10));
        assert_eq!(early.text.chars().count(), 8);
        assert_eq!(early.text.chars().nth(3), Some(' '));
        assert!(!early.finished);

        let done = scramble.tick(ts(1_200));
        assert_eq!(done.text, "Pho Real");
        assert!(done.finished);

        assert!(!scramble.observe(1.0, ts(2_000)));
        assert_eq!(scramble.tick(ts(2_500)).text, "Pho Real");
    }

    #[test]
    fn scramble_settles_left_to_right() {
        let mut scramble = TextScramble::new("ABCDEFGHIJ", 3, 0.5, 1_000_000, 40_000);
        scramble.observe(1.0, ts(0));
        let halfway = scramble.tick(ts(500));
        assert!(halfway.text.starts_with("ABCDE"));
    }

    #[test]
    fn scramble_is_deterministic() {
        let a = TextScramble::new("Osteria", 11, 0.5, 1_000_000, 40_000);
        let b = TextScramble::new("Osteria", 11, 0.5, 1_000_000, 40_000);
        assert_eq!(a.frame(ts(0)), b.frame(ts(0)));
    }

    #[test]
    fn empty_scramble_is_trivially_done() {
        let scramble = TextScramble::new("", 0, 0.5, 1_000_000, 40_000);
        assert_eq!(scramble.frame(ts(0)).text, "");
    }
}
