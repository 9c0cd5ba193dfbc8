// Engine configuration passed from JS as JSON. Every tunable has a serde default.

use serde::{Deserialize, Serialize};

use crate::error::EngineError;

/// Top-level engine configuration.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct EngineConfig {
    #[serde(default)]
    pub timeline: TimelineSettings,
    #[serde(default)]
    pub reveal: RevealSettings,
    #[serde(default)]
    pub animation: AnimationSettings,
    #[serde(default)]
    pub cursor: CursorSettings,
}

impl EngineConfig {
    pub fn from_json(json: &str) -> Result<Self, EngineError> {
        let config: EngineConfig = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), EngineError> {
        self.timeline.validate()?;
        self.reveal.validate()?;
        self.animation.validate()?;
        self.cursor.validate()
    }
}

/// Pinned track behavior.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TimelineSettings {
    /// Viewport widths below this use the stacked layout.
    #[serde(default = "default_breakpoint_px")]
    pub breakpoint_px: f32,
    /// Peak vertical parallax offset of a panel (CSS px).
    #[serde(default = "default_parallax_range_px")]
    pub parallax_range_px: f32,
    /// Fraction of a panel's local travel (from each edge) over which it fades.
    #[serde(default = "default_edge_fade")]
    pub edge_fade: f32,
    #[serde(default = "default_min_opacity")]
    pub min_opacity: f32,
    #[serde(default = "default_min_scale")]
    pub min_scale: f32,
}

fn default_breakpoint_px() -> f32 {
    768.0
}

fn default_parallax_range_px() -> f32 {
    40.0
}

fn default_edge_fade() -> f32 {
    0.35
}

fn default_min_opacity() -> f32 {
    0.4
}

fn default_min_scale() -> f32 {
    0.92
}

impl Default for TimelineSettings {
    fn default() -> Self {
        TimelineSettings {
            breakpoint_px: default_breakpoint_px(),
            parallax_range_px: default_parallax_range_px(),
            edge_fade: default_edge_fade(),
            min_opacity: default_min_opacity(),
            min_scale: default_min_scale(),
        }
    }
}

impl TimelineSettings {
    fn validate(&self) -> Result<(), EngineError> {
        if !(self.breakpoint_px >= 0.0) {
            return Err(EngineError::InvalidConfig(
                "timeline.breakpoint_px must be non-negative".to_string(),
            ));
        }
        if !(self.edge_fade > 0.0 && self.edge_fade <= 0.5) {
            return Err(EngineError::InvalidConfig(
                "timeline.edge_fade must be in (0, 0.5]".to_string(),
            ));
        }
        check_unit("timeline.min_opacity", self.min_opacity)?;
        check_unit("timeline.min_scale", self.min_scale)
    }
}

/// Panel entrance reveal.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RevealSettings {
    /// Visible fraction of a panel that triggers its reveal.
    #[serde(default = "default_panel_threshold")]
    pub panel_threshold: f32,
    #[serde(default = "default_reveal_duration")]
    pub reveal_duration_us: u64,
    /// Delay added per panel index.
    #[serde(default = "default_stagger")]
    pub stagger_us: u64,
    /// Stagger stops growing after this many steps.
    #[serde(default = "default_max_stagger_steps")]
    pub max_stagger_steps: u32,
}

fn default_panel_threshold() -> f32 {
    0.2
}

fn default_reveal_duration() -> u64 {
    900_000 // 900ms
}

fn default_stagger() -> u64 {
    120_000 // 120ms
}

fn default_max_stagger_steps() -> u32 {
    4
}

impl Default for RevealSettings {
    fn default() -> Self {
        RevealSettings {
            panel_threshold: default_panel_threshold(),
            reveal_duration_us: default_reveal_duration(),
            stagger_us: default_stagger(),
            max_stagger_steps: default_max_stagger_steps(),
        }
    }
}

impl RevealSettings {
    fn validate(&self) -> Result<(), EngineError> {
        check_threshold("reveal.panel_threshold", self.panel_threshold)?;
        check_duration("reveal.reveal_duration_us", self.reveal_duration_us)?;
        if self.stagger_us > self.reveal_duration_us {
            return Err(EngineError::InvalidConfig(format!(
                "reveal.stagger_us must not exceed reveal.reveal_duration_us ({}), got {}",
                self.reveal_duration_us, self.stagger_us
            )));
        }
        Ok(())
    }
}

/// Score counter and text scramble.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AnimationSettings {
    #[serde(default = "default_half")]
    pub counter_threshold: f32,
    #[serde(default = "default_counter_duration")]
    pub counter_duration_us: u64,
    #[serde(default = "default_half")]
    pub scramble_threshold: f32,
    #[serde(default = "default_scramble_duration")]
    pub scramble_duration_us: u64,
    /// Glyphs are re-rolled once per step.
    #[serde(default = "default_scramble_step")]
    pub scramble_step_us: u64,
}

fn default_half() -> f32 {
    0.5
}

fn default_counter_duration() -> u64 {
    2_000_000 // 2s
}

fn default_scramble_duration() -> u64 {
    1_200_000 // 1.2s
}

fn default_scramble_step() -> u64 {
    40_000 // 40ms
}

impl Default for AnimationSettings {
    fn default() -> Self {
        AnimationSettings {
            counter_threshold: default_half(),
            counter_duration_us: default_counter_duration(),
            scramble_threshold: default_half(),
            scramble_duration_us: default_scramble_duration(),
            scramble_step_us: default_scramble_step(),
        }
    }
}

impl AnimationSettings {
    fn validate(&self) -> Result<(), EngineError> {
        check_threshold("animation.counter_threshold", self.counter_threshold)?;
        check_threshold("animation.scramble_threshold", self.scramble_threshold)?;
        check_duration("animation.counter_duration_us", self.counter_duration_us)?;
        check_duration("animation.scramble_duration_us", self.scramble_duration_us)?;
        check_duration("animation.scramble_step_us", self.scramble_step_us)
    }
}

/// Custom cursor follow behavior.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CursorSettings {
    /// Fraction of the remaining distance covered each frame.
    #[serde(default = "default_smoothing")]
    pub smoothing: f32,
    #[serde(default = "default_hover_scale")]
    pub hover_scale: f32,
    /// Follow loop stops once within this distance of the pointer.
    #[serde(default = "default_settle_epsilon")]
    pub settle_epsilon_px: f32,
}

fn default_smoothing() -> f32 {
    0.18
}

fn default_hover_scale() -> f32 {
    2.5
}

fn default_settle_epsilon() -> f32 {
    0.5
}

impl Default for CursorSettings {
    fn default() -> Self {
        CursorSettings {
            smoothing: default_smoothing(),
            hover_scale: default_hover_scale(),
            settle_epsilon_px: default_settle_epsilon(),
        }
    }
}

impl CursorSettings {
    fn validate(&self) -> Result<(), EngineError> {
        check_threshold("cursor.smoothing", self.smoothing)?;
        if !(self.hover_scale.is_finite() && self.hover_scale > 0.0) {
            return Err(EngineError::InvalidConfig(format!(
                "cursor.hover_scale must be a positive number, got {}",
                self.hover_scale
            )));
        }
        if !(self.settle_epsilon_px > 0.0) {
            return Err(EngineError::InvalidConfig(
                "cursor.settle_epsilon_px must be positive".to_string(),
            ));
        }
        Ok(())
    }
}

/// Hosted document store connection.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ContentConfig {
    #[serde(default)]
    pub project_id: Option<String>,
    #[serde(default = "default_dataset")]
    pub dataset: String,
    #[serde(default = "default_api_version")]
    pub api_version: String,
    #[serde(default = "default_true")]
    pub use_cdn: bool,
}

fn default_dataset() -> String {
    "production".to_string()
}

fn default_api_version() -> String {
    "2024-01-01".to_string()
}

fn default_true() -> bool {
    true
}

impl Default for ContentConfig {
    fn default() -> Self {
        ContentConfig {
            project_id: None,
            dataset: default_dataset(),
            api_version: default_api_version(),
            use_cdn: default_true(),
        }
    }
}

impl ContentConfig {
    pub fn new(project_id: impl Into<String>, dataset: impl Into<String>) -> Self {
        ContentConfig {
            project_id: Some(project_id.into()),
            dataset: dataset.into(),
            ..Default::default()
        }
    }

    /// Project id, only when it and the dataset are both non-blank.
    pub fn project(&self) -> Option<&str> {
        match self.project_id.as_deref().map(str::trim) {
            Some(id) if !id.is_empty() && !self.dataset.trim().is_empty() => Some(id),
            _ => None,
        }
    }

    pub fn is_configured(&self) -> bool {
        self.project().is_some()
    }
}

fn check_threshold(name: &str, value: f32) -> Result<(), EngineError> {
    if value > 0.0 && value <= 1.0 {
        Ok(())
    } else {
        Err(EngineError::InvalidConfig(format!(
            "{name} must be in (0, 1], got {value}"
        )))
    }
}

fn check_unit(name: &str, value: f32) -> Result<(), EngineError> {
    if (0.0..=1.0).contains(&value) {
        Ok(())
    } else {
        Err(EngineError::InvalidConfig(format!(
            "{name} must be in [0, 1], got {value}"
        )))
    }
}

fn check_duration(name: &str, value: u64) -> Result<(), EngineError> {
    if value > 0 {
        Ok(())
    } else {
        Err(EngineError::InvalidConfig(format!("{name} must be positive")))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_json_uses_defaults() {
        let config = EngineConfig::from_json("{}").expect("defaults are valid");
        assert_eq!(config.timeline.breakpoint_px, 768.0);
        assert_eq!(config.reveal.panel_threshold, 0.2);
        assert_eq!(config.animation.counter_threshold, 0.5);
        assert_eq!(config.animation.scramble_threshold, 0.5);
    }

    #[test]
    fn partial_sections_fill_defaults() {
        let config =
            EngineConfig::from_json(r#"{"timeline":{"breakpoint_px":1024}}"#).expect("valid");
        assert_eq!(config.timeline.breakpoint_px, 1024.0);
        assert_eq!(config.timeline.parallax_range_px, 40.0);
    }

    #[test]
    fn rejects_bad_threshold() {
        let err = EngineConfig::from_json(r#"{"reveal":{"panel_threshold":0}}"#).unwrap_err();
        assert!(matches!(err, EngineError::InvalidConfig(_)));

        let err = EngineConfig::from_json(r#"{"animation":{"counter_duration_us":0}}"#)
            .unwrap_err();
        assert!(err.to_string().contains("counter_duration_us"));
    }

    #[test]
    fn rejects_non_positive_hover_scale() {
        let err = EngineConfig::from_json(r#"{"cursor":{"hover_scale":0}}"#).unwrap_err();
        assert!(err.to_string().contains("hover_scale"));

        let err = EngineConfig::from_json(r#"{"cursor":{"hover_scale":-2.5}}"#).unwrap_err();
        assert!(matches!(err, EngineError::InvalidConfig(_)));

        let ok = EngineConfig::from_json(r#"{"cursor":{"hover_scale":1.0}}"#).expect("valid");
        assert_eq!(ok.cursor.hover_scale, 1.0);
    }

    #[test]
    fn stagger_is_bounded_by_reveal_duration() {
        let err = EngineConfig::from_json(r#"{"reveal":{"stagger_us":9999999999}}"#).unwrap_err();
        assert!(err.to_string().contains("stagger_us"));

        let json = r#"{"reveal":{"reveal_duration_us":500000,"stagger_us":500000}}"#;
        let ok = EngineConfig::from_json(json).expect("equal is allowed");
        assert_eq!(ok.reveal.stagger_us, 500_000);
    }

    #[test]
    fn content_config_blank_project_is_unconfigured() {
        assert!(!ContentConfig::default().is_configured());

        let blank = ContentConfig::new("   ", "production");
        assert!(!blank.is_configured());

        let no_dataset = ContentConfig::new("abc123", "");
        assert!(!no_dataset.is_configured());

        let ok = ContentConfig::new("abc123", "production");
        assert_eq!(ok.project(), Some("abc123"));
    }
}
