// One-shot visibility triggers and the per-panel reveal state machine.
// Reveal is keyed off each panel's own intersection ratio, never the track progress.

use serde::{Deserialize, Serialize};

use crate::config::RevealSettings;
use crate::easing::Easing;
use crate::types::{PanelIndex, Timestamp};

/// Fires at most once, the first time an observed visibility ratio reaches the
/// threshold. Later observations are ignored until `reset`.
#[derive(Debug, Clone, PartialEq)]
pub struct OneShotTrigger {
    threshold: f32,
    fired: bool,
}

impl OneShotTrigger {
    pub fn new(threshold: f32) -> Self {
        OneShotTrigger {
            threshold,
            fired: false,
        }
    }

    /// Returns true only for the observation that fires the trigger.
    pub fn observe(&mut self, visible_ratio: f32) -> bool {
        if self.fired || !(visible_ratio >= self.threshold) {
            return false;
        }
        self.fired = true;
        true
    }

    pub fn has_fired(&self) -> bool {
        self.fired
    }

    /// Re-arms the trigger. Test support only; pages never replay a reveal.
    pub fn reset(&mut self) {
        self.fired = false;
    }
}

/// Externally observable reveal state of one panel.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum RevealState {
    Hidden,
    Revealing,
    Revealed,
}

/// Accent color cycle for panels.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PanelVariant {
    Ember,
    Saffron,
    Basil,
    Plum,
}

impl PanelVariant {
    const CYCLE: [PanelVariant; 4] = [
        PanelVariant::Ember,
        PanelVariant::Saffron,
        PanelVariant::Basil,
        PanelVariant::Plum,
    ];

    pub fn for_index(index: PanelIndex) -> Self {
        Self::CYCLE[index.as_usize() % Self::CYCLE.len()]
    }
}

/// Render-time values of a panel's entrance transition.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RevealFrame {
    pub state: RevealState,
    pub revealed: bool,
    /// Percentage of the panel hidden by an `inset(0 x% 0 0)` clip-path.
    pub clip_inset_pct: f32,
    pub translate_y: f32,
    pub opacity: f32,
}

const REVEAL_RISE_PX: f32 = 60.0;

/// Hidden -> Revealing -> Revealed, one-shot per panel.
#[derive(Debug, Clone)]
pub struct PanelReveal {
    index: PanelIndex,
    trigger: OneShotTrigger,
    started_at: Option<Timestamp>,
    delay_us: u64,
    duration_us: u64,
    state: RevealState,
}

impl PanelReveal {
    pub fn new(index: PanelIndex, settings: &RevealSettings) -> Self {
        PanelReveal {
            index,
            trigger: OneShotTrigger::new(settings.panel_threshold),
            started_at: None,
            delay_us: stagger_delay(index, settings),
            duration_us: settings.reveal_duration_us,
            state: RevealState::Hidden,
        }
    }

    pub fn index(&self) -> PanelIndex {
        self.index
    }

    pub fn variant(&self) -> PanelVariant {
        PanelVariant::for_index(self.index)
    }

    pub fn state(&self) -> RevealState {
        self.state
    }

    /// Monotonic: false until the first qualifying intersection, then true forever.
    pub fn is_revealed(&self) -> bool {
        self.state != RevealState::Hidden
    }

    /// Returns true when this observation starts the reveal.
    pub fn observe(&mut self, visible_ratio: f32, now: Timestamp) -> bool {
        if !self.trigger.observe(visible_ratio) {
            return false;
        }
        self.started_at = Some(now);
        self.state = RevealState::Revealing;
        true
    }

    /// Like `observe` for a report without a timestamp; the transition clock
    /// starts at the next tick.
    pub fn observe_untimed(&mut self, visible_ratio: f32) -> bool {
        if !self.trigger.observe(visible_ratio) {
            return false;
        }
        self.started_at = None;
        self.state = RevealState::Revealing;
        true
    }

    /// Advance the transition clock. Returns the state after advancing.
    pub fn tick(&mut self, now: Timestamp) -> RevealState {
        if self.state == RevealState::Revealing && self.started_at.is_none() {
            self.started_at = Some(now);
        }
        if let (RevealState::Revealing, Some(started)) = (self.state, self.started_at) {
            if now.since(started) >= self.delay_us + self.duration_us {
                self.state = RevealState::Revealed;
            }
        }
        self.state
    }

    /// Transition progress in [0, 1] at `now`, including the stagger delay.
    pub fn transition_progress(&self, now: Timestamp) -> f32 {
        match (self.state, self.started_at) {
            (RevealState::Hidden, _) | (_, None) => 0.0,
            (RevealState::Revealed, _) => 1.0,
            (RevealState::Revealing, Some(started)) => {
                let elapsed = now.since(started).saturating_sub(self.delay_us);
                (elapsed as f64 / self.duration_us as f64).min(1.0) as f32
            }
        }
    }

    pub fn frame(&self, now: Timestamp) -> RevealFrame {
        let eased = Easing::EaseOutExpo.apply(self.transition_progress(now));
        RevealFrame {
            state: self.state,
            revealed: self.is_revealed(),
            clip_inset_pct: (1.0 - eased) * 100.0,
            translate_y: (1.0 - eased) * REVEAL_RISE_PX,
            opacity: eased,
        }
    }

    /// Test support: return to Hidden and re-arm the trigger.
    pub fn reset(&mut self) {
        self.trigger.reset();
        self.started_at = None;
        self.state = RevealState::Hidden;
    }
}

/// Stagger grows with the panel index, capped at `max_stagger_steps`.
pub fn stagger_delay(index: PanelIndex, settings: &RevealSettings) -> u64 {
    let steps = index.as_u32().min(settings.max_stagger_steps) as u64;
    steps * settings.stagger_us
}
