// Progress model: pure mapping from scroll progress to track and panel transforms.
// No held state. Everything here is recomputed every frame.

use serde::{Deserialize, Serialize};

use crate::config::TimelineSettings;
use crate::easing::{lerp, Easing};
use crate::types::{PanelIndex, Progress};

/// Measured widths of the horizontal track and the viewport it is pinned in.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TrackGeometry {
    pub track_width: f32,
    pub viewport_width: f32,
}

impl TrackGeometry {
    pub fn new(track_width: f32, viewport_width: f32) -> Self {
        TrackGeometry {
            track_width,
            viewport_width,
        }
    }

    /// Horizontal travel of the track, never negative.
    pub fn scroll_distance(&self) -> f32 {
        let distance = self.track_width - self.viewport_width;
        if distance.is_finite() {
            distance.max(0.0)
        } else {
            0.0
        }
    }

    /// Pinning only makes sense when the track overflows the viewport.
    pub fn requires_pinning(&self) -> bool {
        self.scroll_distance() > 0.0
    }
}

/// Track-level transform for one frame.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TrackFrame {
    pub progress: f32,
    pub translate_x: f32,
    /// Progress bar `scaleX`.
    pub progress_bar_scale_x: f32,
}

impl TrackFrame {
    pub fn at(progress: Progress, geometry: &TrackGeometry) -> Self {
        TrackFrame {
            progress: progress.value(),
            translate_x: track_translate_x(progress, geometry),
            progress_bar_scale_x: progress_bar_scale_x(progress),
        }
    }
}

/// `-progress * max(track - viewport, 0)`. Applied once to the whole track.
pub fn track_translate_x(progress: Progress, geometry: &TrackGeometry) -> f32 {
    let translate = -progress.value() * geometry.scroll_distance();
    // Avoid handing `-0` to the style layer.
    if translate == 0.0 {
        0.0
    } else {
        translate
    }
}

pub fn progress_bar_scale_x(progress: Progress) -> f32 {
    progress.value()
}

/// Horizontal extent of one panel, relative to the start of the track.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PanelSpan {
    pub left: f32,
    pub width: f32,
}

impl PanelSpan {
    /// Equal-width panels laid out edge to edge.
    pub fn uniform(index: PanelIndex, panel_count: usize, track_width: f32) -> Self {
        let count = panel_count.max(1) as f32;
        let width = track_width / count;
        PanelSpan {
            left: index.as_u32() as f32 * width,
            width,
        }
    }
}

/// Local scroll-through progress of one panel: 0 as its left edge enters at the
/// viewport's right edge, 1 once its right edge leaves past the viewport's left edge.
pub fn panel_local_progress(span: &PanelSpan, translate_x: f32, viewport_width: f32) -> Progress {
    let left_in_viewport = span.left + translate_x;
    let travel = viewport_width + span.width;
    Progress::from_scroll(viewport_width - left_in_viewport, travel)
}

/// Per-panel secondary visual state derived from its local progress.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PanelFrame {
    pub local_progress: f32,
    pub translate_y: f32,
    pub opacity: f32,
    pub scale: f32,
}

pub fn panel_frame(local: Progress, settings: &TimelineSettings) -> PanelFrame {
    let t = local.value();
    let translate_y = (0.5 - t) * 2.0 * settings.parallax_range_px;

    // Fully opaque through the middle, easing down toward either edge.
    let edge = t.min(1.0 - t);
    let fade = if edge >= settings.edge_fade {
        1.0
    } else {
        Easing::EaseOut.apply(edge / settings.edge_fade)
    };

    PanelFrame {
        local_progress: t,
        translate_y,
        opacity: lerp(settings.min_opacity, 1.0, fade),
        scale: lerp(settings.min_scale, 1.0, fade),
    }
}

/// Every panel's frame for one track position, in panel order.
pub fn panel_frames(
    progress: Progress,
    geometry: &TrackGeometry,
    panel_count: usize,
    settings: &TimelineSettings,
) -> Vec<PanelFrame> {
    let translate_x = track_translate_x(progress, geometry);
    (0..panel_count)
        .map(|i| {
            let span =
                PanelSpan::uniform(PanelIndex::new(i as u32), panel_count, geometry.track_width);
            let local = panel_local_progress(&span, translate_x, geometry.viewport_width);
            panel_frame(local, settings)
        })
        .collect()
}

/// Hero section parallax, driven by plain page scroll.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct HeroFrame {
    pub progress: f32,
    pub translate_y: f32,
    pub opacity: f32,
    pub scale: f32,
}

pub fn hero_frame(scroll_y: f32, hero_height: f32) -> HeroFrame {
    let progress = Progress::from_scroll(scroll_y, hero_height).value();
    HeroFrame {
        progress,
        translate_y: progress * hero_height.max(0.0) * 0.5,
        opacity: 1.0 - progress,
        scale: lerp(1.0, 1.1, progress),
    }
}
