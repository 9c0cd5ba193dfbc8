// Review documents as returned by the content queries. Read-only to the engine.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::error::EngineError;

pub const MIN_SCORE: f32 = 1.0;
pub const MAX_SCORE: f32 = 10.0;

/// Stored image with an asset reference such as `image-<id>-1200x800-jpg`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ImageRef {
    pub asset: AssetRef,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub alt: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AssetRef {
    #[serde(rename = "_ref")]
    pub reference: String,
}

impl ImageRef {
    pub fn new(reference: impl Into<String>) -> Self {
        ImageRef {
            asset: AssetRef {
                reference: reference.into(),
            },
            alt: None,
        }
    }

    pub fn with_alt(mut self, alt: impl Into<String>) -> Self {
        self.alt = Some(alt.into());
        self
    }
}

/// Four ordinal price levels.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum PriceTier {
    #[serde(rename = "$")]
    Budget,
    #[serde(rename = "$$")]
    Moderate,
    #[serde(rename = "$$$")]
    Upscale,
    #[serde(rename = "$$$$")]
    Splurge,
}

impl PriceTier {
    /// 1 through 4.
    pub fn ordinal(&self) -> u8 {
        match self {
            PriceTier::Budget => 1,
            PriceTier::Moderate => 2,
            PriceTier::Upscale => 3,
            PriceTier::Splurge => 4,
        }
    }

    pub fn symbol(&self) -> &'static str {
        match self {
            PriceTier::Budget => "$",
            PriceTier::Moderate => "$$",
            PriceTier::Upscale => "$$$",
            PriceTier::Splurge => "$$$$",
        }
    }
}

/// The four core sub-scores. The overall score is derived, never stored.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Scores {
    pub taste: f32,
    pub vibe: f32,
    pub service: f32,
    pub value: f32,
}

impl Scores {
    pub fn new(taste: f32, vibe: f32, service: f32, value: f32) -> Self {
        Scores {
            taste,
            vibe,
            service,
            value,
        }
    }

    /// Exact arithmetic mean of the four sub-scores.
    pub fn overall(&self) -> f32 {
        (self.taste + self.vibe + self.service + self.value) / 4.0
    }

    pub fn iter(&self) -> impl Iterator<Item = (&'static str, f32)> {
        [
            ("taste", self.taste),
            ("vibe", self.vibe),
            ("service", self.service),
            ("value", self.value),
        ]
        .into_iter()
    }

    pub fn validate(&self) -> Result<(), String> {
        for (name, score) in self.iter() {
            check_score(name, score)?;
        }
        Ok(())
    }
}

fn check_score(name: &str, score: f32) -> Result<(), String> {
    if (MIN_SCORE..=MAX_SCORE).contains(&score) {
        Ok(())
    } else {
        Err(format!("{name} score {score} outside [{MIN_SCORE}, {MAX_SCORE}]"))
    }
}

/// Rounds to one decimal for display only, halves away from zero (8.25 -> "8.3").
pub fn format_score(score: f32) -> String {
    let rounded = (score * 10.0).round() / 10.0;
    format!("{rounded:.1}")
}

/// Lightweight record used by the timeline.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReviewSummary {
    #[serde(rename = "_id")]
    pub id: String,
    pub name: String,
    pub slug: String,
    pub cuisine: String,
    pub price_range: PriceTier,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub hero_image: Option<ImageRef>,
    #[serde(default)]
    pub summary: String,
    pub visit_date: NaiveDate,
    pub scores: Scores,
}

impl ReviewSummary {
    pub fn overall(&self) -> f32 {
        self.scores.overall()
    }

    pub fn validate(&self) -> Result<(), EngineError> {
        if !is_url_safe_slug(&self.slug) {
            return Err(EngineError::InvalidSlug(self.slug.clone()));
        }
        self.scores
            .validate()
            .map_err(|message| EngineError::InvalidRecord {
                slug: self.slug.clone(),
                message,
            })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Coordinates {
    pub lat: f64,
    pub lng: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Location {
    pub city: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub state: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub coordinates: Option<Coordinates>,
}

impl Location {
    /// "City, ST" or just "City".
    pub fn label(&self) -> String {
        match &self.state {
            Some(state) if !state.is_empty() => format!("{}, {}", self.city, state),
            _ => self.city.clone(),
        }
    }
}

/// Gallery entry. Gallery order is presentation order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GalleryImage {
    #[serde(flatten)]
    pub image: ImageRef,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub caption: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum BlockStyle {
    #[default]
    Normal,
    H2,
    H3,
    Blockquote,
}

/// One block of the long-form review body, flattened to plain text.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BodyBlock {
    #[serde(default)]
    pub style: BlockStyle,
    pub text: String,
}

/// The distinguished bonus score with its free-text note.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RickFactor {
    pub score: f32,
    pub description: String,
}

/// Everything the detail view shows.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FullReview {
    #[serde(flatten)]
    pub summary: ReviewSummary,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub location: Option<Location>,
    #[serde(default)]
    pub gallery: Vec<GalleryImage>,
    #[serde(default)]
    pub body: Vec<BodyBlock>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rick_factor: Option<RickFactor>,
}

impl FullReview {
    pub fn validate(&self) -> Result<(), EngineError> {
        self.summary.validate()?;
        if let Some(rick) = &self.rick_factor {
            check_score("rick factor", rick.score).map_err(|message| {
                EngineError::InvalidRecord {
                    slug: self.summary.slug.clone(),
                    message,
                }
            })?;
        }
        Ok(())
    }
}

/// About-page copy and site chrome.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SiteSettings {
    pub title: String,
    #[serde(default)]
    pub tagline: String,
    #[serde(default)]
    pub about: Vec<String>,
}

/// Lowercase ASCII letters, digits and single inner hyphens.
pub fn is_url_safe_slug(slug: &str) -> bool {
    !slug.is_empty()
        && !slug.starts_with('-')
        && !slug.ends_with('-')
        && !slug.contains("--")
        && slug
            .chars()
            .all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || c == '-')
}

/// "March 2024".
pub fn format_visit_date(date: NaiveDate) -> String {
    date.format("%B %Y").to_string()
}
