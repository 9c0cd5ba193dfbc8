// review_timeline_core: Rust/WASM engine for the review timeline site.
// Scroll, reveal and content logic live here; JS only forwards events and applies frames.

mod config;
mod content;
mod cursor;
mod easing;
mod error;
mod host;
mod page;
mod progress;
mod reveal;
mod scene;
mod stepped;
mod timeline;
mod types;

use wasm_bindgen::prelude::*;

pub use config::{
    AnimationSettings, ContentConfig, CursorSettings, EngineConfig, RevealSettings,
    TimelineSettings,
};
pub use content::*;
pub use cursor::{CursorFollower, CursorFrame};
pub use easing::{lerp, Easing};
pub use error::EngineError;
pub use host::{FrameLoop, Host, HostCommand, ListenerKind, TeardownReport};
pub use page::{
    load_about, load_detail, load_home, resolve_detail, static_params, AboutPage, DetailOutcome,
    DetailView, HomePage, TimelineEntry,
};
pub use progress::{hero_frame, panel_frame, HeroFrame, PanelFrame, TrackFrame, TrackGeometry};
pub use reveal::{OneShotTrigger, PanelReveal, PanelVariant, RevealFrame, RevealState};
pub use scene::{PanelContent, PanelState, SceneEvent, SceneOutput, TimelineScene, VisibilityTarget};
pub use stepped::{CounterFrame, ScoreCounter, ScrambleFrame, TextScramble};
pub use timeline::{Measurement, ResizeOutcome, TimelineController, TimelineLayout, TimelinePhase};
pub use types::*;

/// Initialize panic hook for better error messages in browser console.
#[wasm_bindgen(start)]
pub fn init() {
    #[cfg(feature = "console_error_panic_hook")]
    console_error_panic_hook::set_once();
}

fn serialize<T: serde::Serialize>(value: &T) -> Result<String, JsValue> {
    serde_json::to_string(value)
        .map_err(|e| JsValue::from_str(&format!("Serialization error: {}", e)))
}

fn parse_config(config_json: &str) -> Result<EngineConfig, JsValue> {
    EngineConfig::from_json(config_json).map_err(|e| JsValue::from_str(&e.to_string()))
}

/// Main engine interface exposed to JavaScript.
/// Batch interface to minimize JS↔WASM crossings.
#[wasm_bindgen]
pub struct Engine {
    scene: TimelineScene,
}

#[wasm_bindgen]
impl Engine {
    /// Scene with `panel_count` panels and no counter or scramble content.
    #[wasm_bindgen(constructor)]
    pub fn new(config_json: &str, panel_count: u32) -> Result<Engine, JsValue> {
        let config = parse_config(config_json)?;
        let panels = vec![PanelContent::default(); panel_count as usize];
        Ok(Engine {
            scene: TimelineScene::new(config, &panels),
        })
    }

    /// Scene for a home page as produced by `WasmContentClient.home_page`.
    pub fn from_home(config_json: &str, home_json: &str) -> Result<Engine, JsValue> {
        let config = parse_config(config_json)?;
        let home: HomePage = serde_json::from_str(home_json)
            .map_err(|e| JsValue::from_str(&format!("Invalid home page: {}", e)))?;
        let panels: Vec<PanelContent> = home.entries.iter().map(PanelContent::from).collect();
        Ok(Engine {
            scene: TimelineScene::new(config, &panels),
        })
    }

    /// Apply a batch of host events and return the resulting commands and frames.
    /// This is the main entry point, designed as a batch call to reduce JS↔WASM overhead.
    pub fn process_events(&mut self, events_json: &str) -> Result<String, JsValue> {
        let events: Vec<SceneEvent> = serde_json::from_str(events_json)
            .map_err(|e| JsValue::from_str(&format!("Invalid events: {}", e)))?;
        serialize(&self.scene.process(events))
    }

    /// Reveal and scroll visuals of one panel. `undefined` if out of range.
    pub fn panel_state(&self, index: u32) -> Result<Option<String>, JsValue> {
        self.scene
            .panel_state(index)
            .map(|state| serialize(&state))
            .transpose()
    }

    pub fn phase(&self) -> Result<String, JsValue> {
        serialize(&self.scene.phase())
    }

    pub fn panel_count(&self) -> u32 {
        self.scene.panel_count() as u32
    }

    /// Hero parallax for the landing section.
    /// Returns JSON with { progress, translate_y, opacity, scale }.
    pub fn hero_frame(scroll_y: f32, hero_height: f32) -> Result<String, JsValue> {
        serialize(&hero_frame(scroll_y, hero_height))
    }
}
