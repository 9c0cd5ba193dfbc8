// Scene orchestration: one mounted timeline page. Routes batched host events
// to the controller, reveals, stepped animations and cursor, and collects the
// host commands and render frames they produce.

use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::config::EngineConfig;
use crate::cursor::{CursorFollower, CursorFrame};
use crate::host::{FrameLoop, Host, HostCommand, ListenerKind, SubscriptionId, TeardownReport};
use crate::page::TimelineEntry;
use crate::progress::{PanelFrame, TrackFrame};
use crate::reveal::{PanelReveal, PanelVariant, RevealFrame, RevealState};
use crate::stepped::{CounterFrame, ScoreCounter, ScrambleFrame, TextScramble};
use crate::timeline::{
    Measurement, ResizeOutcome, TimelineController, TimelineLayout, TimelinePhase,
};
use crate::types::{PanelIndex, Point, Timestamp};

/// Per-panel content the animations need: the counter target and scramble text.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct PanelContent {
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub score: f32,
}

impl From<&TimelineEntry> for PanelContent {
    fn from(entry: &TimelineEntry) -> Self {
        PanelContent {
            title: entry.name.clone(),
            score: entry.overall,
        }
    }
}

/// Which one-shot element a visibility report is about.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "index")]
pub enum VisibilityTarget {
    Panel(u32),
    Counter(u32),
    Scramble(u32),
}

/// Input from the host, batched per call.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum SceneEvent {
    Mount {
        viewport_width: f32,
    },
    Measure {
        #[serde(default)]
        measurement: Option<Measurement>,
    },
    Scroll {
        scroll_y: f32,
    },
    Resize {
        viewport_width: f32,
    },
    /// An animation frame fired.
    Frame {
        now_ms: f64,
    },
    Visibility {
        target: VisibilityTarget,
        ratio: f32,
        #[serde(default)]
        now_ms: Option<f64>,
    },
    PointerMove {
        x: f32,
        y: f32,
    },
    PointerHover {
        interactive: bool,
    },
    Unmount,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Indexed<T> {
    pub index: u32,
    pub frame: T,
}

/// Everything produced by one batch.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SceneOutput {
    pub commands: Vec<HostCommand>,
    pub phase: TimelinePhase,
    #[serde(default)]
    pub track: Option<TrackFrame>,
    /// Present when the layout changed in this batch.
    #[serde(default)]
    pub layout: Option<TimelineLayout>,
    #[serde(default)]
    pub resize: Option<ResizeOutcome>,
    pub reveals: Vec<Indexed<RevealFrame>>,
    pub counters: Vec<Indexed<CounterFrame>>,
    pub scrambles: Vec<Indexed<ScrambleFrame>>,
    #[serde(default)]
    pub cursor: Option<CursorFrame>,
    #[serde(default)]
    pub teardown: Option<TeardownReport>,
}

impl SceneOutput {
    fn new(phase: TimelinePhase) -> Self {
        SceneOutput {
            commands: Vec::new(),
            phase,
            track: None,
            layout: None,
            resize: None,
            reveals: Vec::new(),
            counters: Vec::new(),
            scrambles: Vec::new(),
            cursor: None,
            teardown: None,
        }
    }
}

/// Reveal plus scroll-driven visuals of one panel.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PanelState {
    pub index: u32,
    pub variant: PanelVariant,
    pub reveal: RevealFrame,
    /// `None` while the track is stacked.
    pub visual: Option<PanelFrame>,
}

pub struct TimelineScene {
    host: Host,
    controller: TimelineController,
    reveals: Vec<PanelReveal>,
    counters: Vec<ScoreCounter>,
    scrambles: Vec<TextScramble>,
    cursor: CursorFollower,
    pointer_binding: Option<SubscriptionId>,
    mounted: bool,
    now: Timestamp,
    config: EngineConfig,
    content: Vec<PanelContent>,
}

impl TimelineScene {
    pub fn new(config: EngineConfig, panels: &[PanelContent]) -> Self {
        let mut scene = TimelineScene {
            host: Host::new(),
            controller: TimelineController::new(config.timeline.clone(), panels.len()),
            reveals: Vec::new(),
            counters: Vec::new(),
            scrambles: Vec::new(),
            cursor: CursorFollower::new(config.cursor.clone()),
            pointer_binding: None,
            mounted: false,
            now: Timestamp::default(),
            content: panels.to_vec(),
            config,
        };
        scene.reset_panels();
        scene
    }

    /// Fresh per-panel state: everything hidden, every trigger armed.
    fn reset_panels(&mut self) {
        let animation = &self.config.animation;
        self.reveals = (0..self.content.len() as u32)
            .map(|i| PanelReveal::new(PanelIndex::new(i), &self.config.reveal))
            .collect();
        self.counters = self
            .content
            .iter()
            .map(|p| {
                ScoreCounter::new(
                    p.score,
                    animation.counter_threshold,
                    animation.counter_duration_us,
                )
            })
            .collect();
        self.scrambles = self
            .content
            .iter()
            .enumerate()
            .map(|(i, p)| {
                TextScramble::new(
                    &p.title,
                    i as u32,
                    animation.scramble_threshold,
                    animation.scramble_duration_us,
                    animation.scramble_step_us,
                )
            })
            .collect();
        self.cursor = CursorFollower::new(self.config.cursor.clone());
    }

    pub fn panel_count(&self) -> usize {
        self.reveals.len()
    }

    pub fn is_mounted(&self) -> bool {
        self.mounted
    }

    pub fn phase(&self) -> TimelinePhase {
        self.controller.phase()
    }

    pub fn host(&self) -> &Host {
        &self.host
    }

    pub fn controller(&self) -> &TimelineController {
        &self.controller
    }

    /// Apply a batch of events in order. Events other than `Mount` are ignored
    /// while unmounted.
    pub fn process(&mut self, events: Vec<SceneEvent>) -> SceneOutput {
        let mut out = SceneOutput::new(self.controller.phase());
        for event in events {
            if !self.mounted && !matches!(event, SceneEvent::Mount { .. }) {
                debug!(?event, "ignoring event for unmounted scene");
                continue;
            }
            self.apply(event, &mut out);
        }
        out.phase = self.controller.phase();
        out.commands = self.host.drain_commands();
        out
    }

    fn apply(&mut self, event: SceneEvent, out: &mut SceneOutput) {
        match event {
            SceneEvent::Mount { viewport_width } => {
                if self.mounted {
                    return;
                }
                self.controller.mount(viewport_width, &mut self.host);
                self.pointer_binding = Some(self.host.subscribe(ListenerKind::PointerMove));
                self.mounted = true;
                out.layout = Some(self.controller.layout());
                info!(panels = self.panel_count(), viewport_width, "scene mounted");
            }
            SceneEvent::Measure { measurement } => {
                self.controller.measure(measurement, &mut self.host);
                out.layout = Some(self.controller.layout());
            }
            SceneEvent::Scroll { scroll_y } => {
                self.controller.on_scroll(scroll_y, &mut self.host);
            }
            SceneEvent::Resize { viewport_width } => {
                let outcome = self.controller.on_resize(viewport_width, &mut self.host);
                if outcome != ResizeOutcome::Unchanged {
                    out.layout = Some(self.controller.layout());
                }
                out.resize = Some(outcome);
            }
            SceneEvent::Frame { now_ms } => {
                self.now = self.now.max(Timestamp::from_millis_f64(now_ms));
                self.run_frame(out);
            }
            SceneEvent::Visibility {
                target,
                ratio,
                now_ms,
            } => {
                let timed = now_ms.map(|ms| {
                    self.now = self.now.max(Timestamp::from_millis_f64(ms));
                    self.now
                });
                self.observe(target, ratio, timed, out);
            }
            SceneEvent::PointerMove { x, y } => {
                if self.cursor.pointer_moved(Point::new(x, y)) {
                    self.host.request_frame(FrameLoop::Cursor);
                }
                out.cursor = Some(self.cursor.frame());
            }
            SceneEvent::PointerHover { interactive } => {
                if self.cursor.set_hovering(interactive) {
                    self.host.request_frame(FrameLoop::Cursor);
                }
            }
            SceneEvent::Unmount => {
                let report = self.host.teardown();
                // Bindings are already released; these only clear local state.
                self.controller.unmount(&mut self.host);
                if let Some(id) = self.pointer_binding.take() {
                    debug!(binding = id.as_u32(), "pointer binding dropped");
                }
                // Panel state lives only as long as the mount.
                self.reset_panels();
                self.mounted = false;
                info!(
                    listeners = report.listeners_released,
                    frames = report.frames_cancelled,
                    "scene torn down"
                );
                out.teardown = Some(report);
            }
        }
    }

    /// Without a timestamp the triggered clock starts at the next frame, not at
    /// the last one seen, which may be arbitrarily old.
    fn observe(
        &mut self,
        target: VisibilityTarget,
        ratio: f32,
        now: Option<Timestamp>,
        out: &mut SceneOutput,
    ) {
        match target {
            VisibilityTarget::Panel(index) => {
                if let Some(reveal) = self.reveals.get_mut(index as usize) {
                    let fired = match now {
                        Some(now) => reveal.observe(ratio, now),
                        None => reveal.observe_untimed(ratio),
                    };
                    if fired {
                        self.host.request_frame(FrameLoop::Reveal(index));
                        out.reveals.push(Indexed {
                            index,
                            frame: reveal.frame(self.now),
                        });
                    }
                }
            }
            VisibilityTarget::Counter(index) => {
                if let Some(counter) = self.counters.get_mut(index as usize) {
                    let fired = match now {
                        Some(now) => counter.observe(ratio, now),
                        None => counter.observe_untimed(ratio),
                    };
                    if fired {
                        self.host.request_frame(FrameLoop::Counter(index));
                    }
                }
            }
            VisibilityTarget::Scramble(index) => {
                if let Some(scramble) = self.scrambles.get_mut(index as usize) {
                    let fired = match now {
                        Some(now) => scramble.observe(ratio, now),
                        None => scramble.observe_untimed(ratio),
                    };
                    if fired {
                        self.host.request_frame(FrameLoop::Scramble(index));
                    }
                }
            }
        }
    }

    /// Service every loop with a pending frame. Loops still animating ask for
    /// another frame; finished ones go idle.
    fn run_frame(&mut self, out: &mut SceneOutput) {
        let now = self.now;
        for owner in self.host.frames().pending_loops() {
            match owner {
                FrameLoop::Track => {
                    if let Some(track) = self.controller.on_frame(&mut self.host) {
                        out.track = Some(track);
                        out.layout = Some(self.controller.layout());
                    }
                }
                FrameLoop::Reveal(index) => {
                    self.host.complete_frame(owner);
                    if let Some(reveal) = self.reveals.get_mut(index as usize) {
                        reveal.tick(now);
                        out.reveals.push(Indexed {
                            index,
                            frame: reveal.frame(now),
                        });
                        if reveal.state() != RevealState::Revealed {
                            self.host.request_frame(owner);
                        }
                    }
                }
                FrameLoop::Counter(index) => {
                    self.host.complete_frame(owner);
                    if let Some(counter) = self.counters.get_mut(index as usize) {
                        out.counters.push(Indexed {
                            index,
                            frame: counter.tick(now),
                        });
                        if counter.is_running() {
                            self.host.request_frame(owner);
                        }
                    }
                }
                FrameLoop::Scramble(index) => {
                    self.host.complete_frame(owner);
                    if let Some(scramble) = self.scrambles.get_mut(index as usize) {
                        out.scrambles.push(Indexed {
                            index,
                            frame: scramble.tick(now),
                        });
                        if scramble.is_running() {
                            self.host.request_frame(owner);
                        }
                    }
                }
                FrameLoop::Cursor => {
                    self.host.complete_frame(owner);
                    out.cursor = Some(self.cursor.step());
                    if !self.cursor.is_settled() {
                        self.host.request_frame(owner);
                    }
                }
            }
        }
    }

    /// Current state of one panel, or `None` if out of range.
    pub fn panel_state(&self, index: u32) -> Option<PanelState> {
        let reveal = self.reveals.get(index as usize)?;
        let visual = match self.controller.layout() {
            TimelineLayout::Pinned { panels, .. } => panels.get(index as usize).copied(),
            TimelineLayout::Stacked { .. } => None,
        };
        Some(PanelState {
            index,
            variant: reveal.variant(),
            reveal: reveal.frame(self.now),
            visual,
        })
    }
}
