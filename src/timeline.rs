// Timeline controller: binds vertical scroll to the pinned horizontal track.
// Unmeasured -> Pinned <-> Settled, or Stacked when the layout can't pin.
// Scroll input is coalesced to one track update per animation frame.

use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::config::TimelineSettings;
use crate::host::{FrameLoop, Host, ListenerKind, SubscriptionId};
use crate::progress::{panel_frames, PanelFrame, TrackFrame, TrackGeometry};
use crate::types::{LayoutMode, Progress};

/// Controller phase.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TimelinePhase {
    /// Waiting for container and track dimensions.
    Unmeasured,
    /// Inactive: panels render as a vertical stack, no pin, no translation.
    Stacked,
    /// Bound to scroll, track translating.
    Pinned,
    /// Progress saturated at 1.
    Settled,
}

/// Layout measurement reported by the host after mount or resize.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Measurement {
    /// Document scroll offset at which the pinned region starts.
    pub pin_start: f32,
    pub track_width: f32,
    pub viewport_width: f32,
}

/// Result of a resize event.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ResizeOutcome {
    Unchanged,
    /// Desktop and stacked layouts swapped. The host must re-measure when
    /// the new mode is `Desktop`.
    ModeChanged { from: LayoutMode, to: LayoutMode },
}

/// What the view layer should render for the track right now.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "layout")]
pub enum TimelineLayout {
    /// Panels in input order, untransformed.
    Stacked { order: Vec<u32> },
    Pinned { track: TrackFrame, panels: Vec<PanelFrame> },
}

pub struct TimelineController {
    settings: TimelineSettings,
    panel_count: usize,
    mode: Option<LayoutMode>,
    phase: TimelinePhase,
    geometry: Option<TrackGeometry>,
    pin_start: f32,
    scroll_binding: Option<SubscriptionId>,
    resize_binding: Option<SubscriptionId>,
    latest_scroll: Option<f32>,
    progress: Progress,
    activations: u32,
}

impl TimelineController {
    pub fn new(settings: TimelineSettings, panel_count: usize) -> Self {
        TimelineController {
            settings,
            panel_count,
            mode: None,
            phase: TimelinePhase::Unmeasured,
            geometry: None,
            pin_start: 0.0,
            scroll_binding: None,
            resize_binding: None,
            latest_scroll: None,
            progress: Progress::START,
            activations: 0,
        }
    }

    pub fn phase(&self) -> TimelinePhase {
        self.phase
    }

    pub fn mode(&self) -> Option<LayoutMode> {
        self.mode
    }

    pub fn progress(&self) -> Progress {
        self.progress
    }

    pub fn is_bound(&self) -> bool {
        self.scroll_binding.is_some()
    }

    /// Number of scroll-pin bindings created so far.
    pub fn activations(&self) -> u32 {
        self.activations
    }

    /// Attach to the page: choose the layout mode and watch for resizes.
    pub fn mount(&mut self, viewport_width: f32, host: &mut Host) {
        if self.mode.is_some() {
            return;
        }
        let mode = LayoutMode::for_width(viewport_width, self.settings.breakpoint_px);
        self.mode = Some(mode);
        self.resize_binding = Some(host.subscribe(ListenerKind::Resize));
        self.phase = match mode {
            LayoutMode::Desktop => TimelinePhase::Unmeasured,
            LayoutMode::Stacked => TimelinePhase::Stacked,
        };
        debug!(?mode, viewport_width, "timeline mounted");
    }

    /// Apply a fresh measurement. `None` means the container vanished mid-measure;
    /// that is a no-op, not an error.
    pub fn measure(&mut self, measurement: Option<Measurement>, host: &mut Host) -> TimelinePhase {
        let Some(measurement) = measurement else {
            debug!("timeline measurement unavailable, skipping");
            return self.phase;
        };
        if self.mode != Some(LayoutMode::Desktop) {
            return self.phase;
        }

        let geometry = TrackGeometry::new(measurement.track_width, measurement.viewport_width);
        if self.panel_count == 0 || !geometry.requires_pinning() {
            self.release_binding(host);
            self.geometry = None;
            self.progress = Progress::START;
            self.phase = TimelinePhase::Stacked;
            debug!(
                track_width = measurement.track_width,
                viewport_width = measurement.viewport_width,
                "track fits viewport, using stacked layout"
            );
            return self.phase;
        }

        if self.scroll_binding.is_none() {
            self.scroll_binding = Some(host.subscribe(ListenerKind::Scroll));
            self.activations += 1;
            info!(
                distance = geometry.scroll_distance(),
                activation = self.activations,
                "timeline pinned"
            );
        }
        self.geometry = Some(geometry);
        self.pin_start = measurement.pin_start;
        if matches!(self.phase, TimelinePhase::Unmeasured | TimelinePhase::Stacked) {
            self.phase = TimelinePhase::Pinned;
        }
        // Re-apply the last known scroll position against the new geometry.
        if self.latest_scroll.is_some() {
            host.request_frame(FrameLoop::Track);
        }
        self.phase
    }

    /// Record a scroll position. Work is deferred to the next frame; only the
    /// newest position is kept. Positions seen while unbound are still kept so
    /// the next `measure` starts from the page's real offset. Returns true when
    /// a track frame was requested.
    pub fn on_scroll(&mut self, scroll_y: f32, host: &mut Host) -> bool {
        if !scroll_y.is_finite() {
            return false;
        }
        self.latest_scroll = Some(scroll_y);
        if !self.is_bound() {
            return false;
        }
        host.request_frame(FrameLoop::Track);
        true
    }

    /// Run the coalesced track update. Returns the frame to apply, if bound.
    pub fn on_frame(&mut self, host: &mut Host) -> Option<TrackFrame> {
        host.complete_frame(FrameLoop::Track);
        let geometry = self.geometry?;
        let scroll_y = self.latest_scroll?;
        if !self.is_bound() {
            return None;
        }

        self.progress =
            Progress::from_scroll(scroll_y - self.pin_start, geometry.scroll_distance());
        let next = if self.progress.is_complete() {
            TimelinePhase::Settled
        } else {
            TimelinePhase::Pinned
        };
        if next != self.phase {
            debug!(from = ?self.phase, to = ?next, "timeline phase change");
            self.phase = next;
        }
        Some(TrackFrame::at(self.progress, &geometry))
    }

    /// Re-evaluate the breakpoint. A mode flip tears the binding down exactly once.
    pub fn on_resize(&mut self, viewport_width: f32, host: &mut Host) -> ResizeOutcome {
        let Some(from) = self.mode else {
            return ResizeOutcome::Unchanged;
        };
        let to = LayoutMode::for_width(viewport_width, self.settings.breakpoint_px);
        if from == to {
            return ResizeOutcome::Unchanged;
        }

        self.release_binding(host);
        self.geometry = None;
        self.progress = Progress::START;
        self.mode = Some(to);
        self.phase = match to {
            LayoutMode::Desktop => TimelinePhase::Unmeasured,
            LayoutMode::Stacked => TimelinePhase::Stacked,
        };
        info!(?from, ?to, viewport_width, "timeline layout mode changed");
        ResizeOutcome::ModeChanged { from, to }
    }

    /// Detach from the page, releasing every listener this controller holds.
    pub fn unmount(&mut self, host: &mut Host) {
        self.release_binding(host);
        if let Some(id) = self.resize_binding.take() {
            host.unsubscribe(id);
        }
        self.mode = None;
        self.geometry = None;
        self.latest_scroll = None;
        self.phase = TimelinePhase::Unmeasured;
    }

    pub fn layout(&self) -> TimelineLayout {
        match (self.phase, self.geometry) {
            (TimelinePhase::Pinned | TimelinePhase::Settled, Some(geometry)) => {
                TimelineLayout::Pinned {
                    track: TrackFrame::at(self.progress, &geometry),
                    panels: panel_frames(
                        self.progress,
                        &geometry,
                        self.panel_count,
                        &self.settings,
                    ),
                }
            }
            _ => TimelineLayout::Stacked {
                order: (0..self.panel_count as u32).collect(),
            },
        }
    }

    fn release_binding(&mut self, host: &mut Host) {
        if let Some(id) = self.scroll_binding.take() {
            host.unsubscribe(id);
            host.cancel_frame(FrameLoop::Track);
            debug!(binding = id.as_u32(), "scroll binding released");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::host::HostCommand;
    use proptest::prelude::*;

    fn desktop() -> Measurement {
        Measurement {
            pin_start: 500.0,
            track_width: 5000.0,
            viewport_width: 1000.0,
        }
    }

    fn pinned(host: &mut Host) -> TimelineController {
        let mut controller = TimelineController::new(TimelineSettings::default(), 5);
        controller.mount(1000.0, host);
        controller.measure(Some(desktop()), host);
        controller
    }

    fn scroll_to(controller: &mut TimelineController, host: &mut Host, y: f32) -> TrackFrame {
        controller.on_scroll(y, host);
        controller.on_frame(host).expect("bound controller yields a frame")
    }

    #[test]
    fn measures_into_pinned() {
        let mut host = Host::new();
        let mut controller = TimelineController::new(TimelineSettings::default(), 5);
        controller.mount(1000.0, &mut host);
        assert_eq!(controller.phase(), TimelinePhase::Unmeasured);

        assert_eq!(controller.measure(Some(desktop()), &mut host), TimelinePhase::Pinned);
        assert!(controller.is_bound());
        assert_eq!(host.listeners().active_count(ListenerKind::Scroll), 1);
    }

    #[test]
    fn missing_measurement_is_noop() {
        let mut host = Host::new();
        let mut controller = TimelineController::new(TimelineSettings::default(), 5);
        controller.mount(1000.0, &mut host);
        assert_eq!(controller.measure(None, &mut host), TimelinePhase::Unmeasured);
        assert!(!controller.is_bound());
    }

    #[test]
    fn narrow_track_stays_stacked_on_desktop() {
        let mut host = Host::new();
        let mut controller = TimelineController::new(TimelineSettings::default(), 2);
        controller.mount(1400.0, &mut host);
        let phase = controller.measure(
            Some(Measurement {
                pin_start: 0.0,
                track_width: 1200.0,
                viewport_width: 1400.0,
            }),
            &mut host,
        );
        assert_eq!(phase, TimelinePhase::Stacked);
        assert!(!controller.is_bound());
        assert!(!controller.on_scroll(300.0, &mut host));
        assert_eq!(controller.layout(), TimelineLayout::Stacked { order: vec![0, 1] });
    }

    #[test]
    fn mobile_never_pins() {
        let mut host = Host::new();
        let mut controller = TimelineController::new(TimelineSettings::default(), 3);
        controller.mount(390.0, &mut host);
        assert_eq!(controller.mode(), Some(LayoutMode::Stacked));
        assert_eq!(controller.measure(Some(desktop()), &mut host), TimelinePhase::Stacked);
        assert!(!controller.is_bound());
        assert_eq!(controller.layout(), TimelineLayout::Stacked { order: vec![0, 1, 2] });
    }

    #[test]
    fn scroll_maps_to_translation() {
        let mut host = Host::new();
        let mut controller = pinned(&mut host);

        let frame = scroll_to(&mut controller, &mut host, 500.0 + 2000.0);
        assert_eq!(frame.progress, 0.5);
        assert_eq!(frame.translate_x, -2000.0);
        assert_eq!(frame.progress_bar_scale_x, 0.5);

        // Before the pin start.
        let frame = scroll_to(&mut controller, &mut host, 0.0);
        assert_eq!(frame.progress, 0.0);
        assert_eq!(frame.translate_x, 0.0);
    }

    #[test]
    fn settles_and_unsettles() {
        let mut host = Host::new();
        let mut controller = pinned(&mut host);

        scroll_to(&mut controller, &mut host, 500.0 + 9000.0);
        assert_eq!(controller.phase(), TimelinePhase::Settled);
        assert!(controller.progress().is_complete());

        // Backward scroll reduces progress again.
        let frame = scroll_to(&mut controller, &mut host, 500.0 + 1000.0);
        assert_eq!(controller.phase(), TimelinePhase::Pinned);
        assert_eq!(frame.progress, 0.25);
    }

    #[test]
    fn rapid_scrolls_coalesce_to_latest() {
        let mut host = Host::new();
        let mut controller = pinned(&mut host);
        host.drain_commands();

        for y in [600.0, 900.0, 1500.0, 2100.0] {
            controller.on_scroll(y, &mut host);
        }
        let requests = host
            .drain_commands()
            .into_iter()
            .filter(|c| matches!(c, HostCommand::RequestFrame { .. }))
            .count();
        assert_eq!(requests, 1);

        let frame = controller.on_frame(&mut host).expect("frame");
        assert_eq!(frame.progress, Progress::from_scroll(1600.0, 4000.0).value());
        assert!(!host.frames().is_pending(FrameLoop::Track));
    }

    #[test]
    fn mode_flip_rebuilds_binding_once() {
        let mut host = Host::new();
        let mut controller = pinned(&mut host);
        scroll_to(&mut controller, &mut host, 1500.0);
        host.drain_commands();

        let outcome = controller.on_resize(600.0, &mut host);
        assert_eq!(
            outcome,
            ResizeOutcome::ModeChanged {
                from: LayoutMode::Desktop,
                to: LayoutMode::Stacked
            }
        );
        assert_eq!(controller.phase(), TimelinePhase::Stacked);
        assert_eq!(host.listeners().active_count(ListenerKind::Scroll), 0);
        let unsubscribes = host
            .drain_commands()
            .into_iter()
            .filter(|c| matches!(c, HostCommand::Unsubscribe { .. }))
            .count();
        assert_eq!(unsubscribes, 1);

        // A second narrow resize is not a flip.
        assert_eq!(controller.on_resize(500.0, &mut host), ResizeOutcome::Unchanged);
        assert!(host.drain_commands().is_empty());

        // Back to desktop: unmeasured until the host measures again.
        controller.on_resize(1200.0, &mut host);
        assert_eq!(controller.phase(), TimelinePhase::Unmeasured);
        controller.measure(Some(desktop()), &mut host);
        assert_eq!(controller.activations(), 2);
        assert_eq!(host.listeners().active_count(ListenerKind::Scroll), 1);
    }

    #[test]
    fn scroll_before_measure_is_applied_once_pinned() {
        let mut host = Host::new();
        let mut controller = TimelineController::new(TimelineSettings::default(), 5);
        controller.mount(1000.0, &mut host);
        assert!(!controller.on_scroll(2500.0, &mut host));
        assert!(!host.frames().is_pending(FrameLoop::Track));

        controller.measure(Some(desktop()), &mut host);
        assert!(host.frames().is_pending(FrameLoop::Track));
        let frame = controller.on_frame(&mut host).expect("frame");
        assert_eq!(frame.progress, 0.5);
        assert_eq!(frame.translate_x, -2000.0);
    }

    #[test]
    fn flip_and_back_keeps_scroll_position() {
        let mut host = Host::new();
        let mut controller = pinned(&mut host);
        assert_eq!(scroll_to(&mut controller, &mut host, 2500.0).progress, 0.5);

        controller.on_resize(600.0, &mut host);
        controller.on_resize(1200.0, &mut host);
        controller.measure(Some(desktop()), &mut host);
        let frame = controller.on_frame(&mut host).expect("frame after re-measure");
        assert_eq!(frame.progress, 0.5);
        assert_eq!(controller.progress(), Progress::new(0.5));
        assert_eq!(controller.phase(), TimelinePhase::Pinned);
    }

    #[test]
    fn scroll_while_stacked_is_kept_for_later() {
        let mut host = Host::new();
        let mut controller = pinned(&mut host);
        controller.on_resize(600.0, &mut host);
        host.drain_commands();
        assert!(!controller.on_scroll(4500.0, &mut host));
        assert!(host.drain_commands().is_empty());

        controller.on_resize(1200.0, &mut host);
        controller.measure(Some(desktop()), &mut host);
        let frame = controller.on_frame(&mut host).expect("frame");
        assert_eq!(frame.progress, 1.0);
        assert_eq!(controller.phase(), TimelinePhase::Settled);
    }

    #[test]
    fn repeated_measure_does_not_double_bind() {
        let mut host = Host::new();
        let mut controller = pinned(&mut host);
        controller.measure(Some(desktop()), &mut host);
        controller.measure(Some(desktop()), &mut host);
        assert_eq!(controller.activations(), 1);
        assert_eq!(host.listeners().active_count(ListenerKind::Scroll), 1);
    }

    #[test]
    fn unmount_releases_everything() {
        let mut host = Host::new();
        let mut controller = pinned(&mut host);
        controller.on_scroll(900.0, &mut host);
        assert!(host.frames().is_pending(FrameLoop::Track));

        controller.unmount(&mut host);
        assert!(host.listeners().is_empty());
        assert_eq!(host.frames().pending_count(), 0);
        assert!(controller.on_frame(&mut host).is_none());
    }

    proptest! {
        #[test]
        fn final_frame_reflects_final_scroll(
            scrolls in prop::collection::vec(-1000.0f32..10_000.0, 1..30)
        ) {
            let mut host = Host::new();
            let mut controller = pinned(&mut host);
            for (i, y) in scrolls.iter().enumerate() {
                controller.on_scroll(*y, &mut host);
                // Frames land at arbitrary points in the event stream.
                if i % 3 == 0 {
                    controller.on_frame(&mut host);
                }
            }
            let last = *scrolls.last().unwrap();
            if host.frames().is_pending(FrameLoop::Track) {
                controller.on_frame(&mut host);
            }
            let expected = Progress::from_scroll(last - 500.0, 4000.0);
            prop_assert_eq!(controller.progress(), expected);
        }
    }
}
