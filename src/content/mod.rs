// Content boundary: fixed queries against the hosted document store, image
// URLs, fallback data, and the JS-facing client.

pub mod client;
pub mod fallback;
pub mod image;
pub mod model;
pub mod queries;
pub mod transport;
mod wasm;

pub use client::{ContentClient, RecordLookup};
pub use fallback::{fallback_review, fallback_settings, fallback_summaries, summaries_or_fallback};
pub use image::{AssetId, ImageOptions, ImageUrlBuilder};
pub use model::{
    format_score, format_visit_date, FullReview, ImageRef, PriceTier, ReviewSummary, Scores,
    SiteSettings,
};
pub use transport::{ContentTransport, JsFetchTransport};
pub use wasm::WasmContentClient;
