// Custom cursor follower. Eases a dot toward the pointer once per frame and
// grows it over interactive elements. The frame loop idles once settled.

use serde::{Deserialize, Serialize};

use crate::config::CursorSettings;
use crate::easing::lerp;
use crate::types::Point;

/// Cursor render state for one frame.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CursorFrame {
    pub x: f32,
    pub y: f32,
    pub scale: f32,
    pub hovering: bool,
    pub visible: bool,
}

pub struct CursorFollower {
    settings: CursorSettings,
    target: Option<Point>,
    position: Point,
    scale: f32,
    hovering: bool,
}

impl CursorFollower {
    pub fn new(settings: CursorSettings) -> Self {
        CursorFollower {
            settings,
            target: None,
            position: Point::default(),
            scale: 1.0,
            hovering: false,
        }
    }

    /// Record the pointer position. The first move snaps instead of sliding in
    /// from the origin. Returns true when a frame is needed.
    pub fn pointer_moved(&mut self, to: Point) -> bool {
        if self.target.is_none() {
            self.position = to;
        }
        self.target = Some(to);
        !self.is_settled()
    }

    /// Returns true when a frame is needed.
    pub fn set_hovering(&mut self, hovering: bool) -> bool {
        self.hovering = hovering;
        !self.is_settled()
    }

    fn target_scale(&self) -> f32 {
        if self.hovering {
            self.settings.hover_scale
        } else {
            1.0
        }
    }

    /// Advance one frame toward the target.
    pub fn step(&mut self) -> CursorFrame {
        if let Some(target) = self.target {
            let t = self.settings.smoothing;
            self.position = Point::new(
                lerp(self.position.x, target.x, t),
                lerp(self.position.y, target.y, t),
            );
            if self.position.distance_to(target) < self.settings.settle_epsilon_px {
                self.position = target;
            }
        }

        let target_scale = self.target_scale();
        self.scale = lerp(self.scale, target_scale, self.settings.smoothing);
        if (self.scale - target_scale).abs() < 0.01 {
            self.scale = target_scale;
        }
        self.frame()
    }

    pub fn is_settled(&self) -> bool {
        let at_target = match self.target {
            Some(target) => self.position == target,
            None => true,
        };
        at_target && self.scale == self.target_scale()
    }

    pub fn frame(&self) -> CursorFrame {
        CursorFrame {
            x: self.position.x,
            y: self.position.y,
            scale: self.scale,
            hovering: self.hovering,
            visible: self.target.is_some(),
        }
    }
}
