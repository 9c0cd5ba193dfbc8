// Page boundary: shapes content into render-ready views and decides the
// fallback and not-found outcomes. Routing and markup belong to the host.

use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::content::fallback::{
    fallback_review, fallback_settings, fallback_slugs, summaries_or_fallback,
};
use crate::content::image::{ImageOptions, ImageUrlBuilder};
use crate::content::model::{
    format_score, format_visit_date, is_url_safe_slug, BodyBlock, FullReview, ImageRef,
    ReviewSummary, SiteSettings,
};
use crate::content::{ContentClient, ContentTransport, RecordLookup};
use crate::error::EngineError;
use crate::reveal::PanelVariant;
use crate::types::PanelIndex;

const HERO_WIDTH: u32 = 1600;
const GALLERY_WIDTH: u32 = 1200;
const IMAGE_QUALITY: u8 = 80;

/// One panel of the home timeline.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TimelineEntry {
    pub index: u32,
    pub slug: String,
    pub name: String,
    pub cuisine: String,
    pub price: String,
    pub price_level: u8,
    pub summary: String,
    pub visit_label: String,
    pub overall: f32,
    pub overall_display: String,
    #[serde(default)]
    pub hero_image_url: Option<String>,
    pub variant: PanelVariant,
}

impl TimelineEntry {
    pub fn from_summary(
        index: usize,
        summary: &ReviewSummary,
        images: Option<&ImageUrlBuilder>,
    ) -> Result<Self, EngineError> {
        let overall = summary.overall();
        Ok(TimelineEntry {
            index: index as u32,
            slug: summary.slug.clone(),
            name: summary.name.clone(),
            cuisine: summary.cuisine.clone(),
            price: summary.price_range.symbol().to_string(),
            price_level: summary.price_range.ordinal(),
            summary: summary.summary.clone(),
            visit_label: format_visit_date(summary.visit_date),
            overall,
            overall_display: format_score(overall),
            hero_image_url: image_url(images, summary.hero_image.as_ref(), HERO_WIDTH)?,
            variant: PanelVariant::for_index(PanelIndex::new(index as u32)),
        })
    }
}

fn image_url(
    images: Option<&ImageUrlBuilder>,
    image: Option<&ImageRef>,
    width: u32,
) -> Result<Option<String>, EngineError> {
    match (images, image) {
        (Some(builder), Some(image)) => builder
            .build(image, ImageOptions::width(width).quality(IMAGE_QUALITY))
            .map(Some),
        _ => Ok(None),
    }
}

/// The home timeline.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HomePage {
    pub entries: Vec<TimelineEntry>,
    pub used_fallback: bool,
}

impl HomePage {
    /// Substitutes the fallback set exactly when `fetched` is empty.
    pub fn build(
        fetched: Vec<ReviewSummary>,
        images: Option<&ImageUrlBuilder>,
    ) -> Result<Self, EngineError> {
        let (summaries, used_fallback) = summaries_or_fallback(fetched);
        let entries = summaries
            .iter()
            .enumerate()
            .map(|(i, summary)| TimelineEntry::from_summary(i, summary, images))
            .collect::<Result<Vec<_>, _>>()?;
        Ok(HomePage {
            entries,
            used_fallback,
        })
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScoreLine {
    pub label: String,
    pub value: f32,
    pub display: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GalleryItem {
    pub url: Option<String>,
    pub alt: String,
    pub caption: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RickFactorView {
    pub score: f32,
    pub display: String,
    pub description: String,
}

/// Everything the detail page renders for one review.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DetailView {
    pub entry: TimelineEntry,
    pub location: Option<String>,
    pub scores: Vec<ScoreLine>,
    /// Presentation order preserved from the document.
    pub gallery: Vec<GalleryItem>,
    pub body: Vec<BodyBlock>,
    pub rick_factor: Option<RickFactorView>,
}

impl DetailView {
    pub fn build(
        review: &FullReview,
        images: Option<&ImageUrlBuilder>,
    ) -> Result<Self, EngineError> {
        let scores = review
            .summary
            .scores
            .iter()
            .map(|(label, value)| ScoreLine {
                label: label.to_string(),
                value,
                display: format_score(value),
            })
            .collect();

        let gallery = review
            .gallery
            .iter()
            .map(|item| {
                Ok(GalleryItem {
                    url: image_url(images, Some(&item.image), GALLERY_WIDTH)?,
                    alt: item
                        .image
                        .alt
                        .clone()
                        .unwrap_or_else(|| review.summary.name.clone()),
                    caption: item.caption.clone(),
                })
            })
            .collect::<Result<Vec<_>, EngineError>>()?;

        Ok(DetailView {
            entry: TimelineEntry::from_summary(0, &review.summary, images)?,
            location: review.location.as_ref().map(|l| l.label()),
            scores,
            gallery,
            body: review.body.clone(),
            rick_factor: review.rick_factor.as_ref().map(|rick| RickFactorView {
                score: rick.score,
                display: format_score(rick.score),
                description: rick.description.clone(),
            }),
        })
    }
}

/// Result of routing to `/reviews/<slug>`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "outcome", content = "view")]
pub enum DetailOutcome {
    Found(Box<DetailView>),
    NotFound,
}

/// Maps a lookup to a page outcome. Without a reachable store the fallback set
/// answers instead.
pub fn resolve_detail(
    slug: &str,
    lookup: RecordLookup,
    images: Option<&ImageUrlBuilder>,
) -> Result<DetailOutcome, EngineError> {
    let review = match lookup {
        RecordLookup::Found(review) => *review,
        RecordLookup::NotFound => return Ok(DetailOutcome::NotFound),
        RecordLookup::Unconfigured | RecordLookup::Unavailable => match fallback_review(slug) {
            Some(review) => {
                debug!(slug, "serving fallback review");
                review
            }
            None => return Ok(DetailOutcome::NotFound),
        },
    };
    Ok(DetailOutcome::Found(Box::new(DetailView::build(&review, images)?)))
}

pub async fn load_home<T: ContentTransport>(
    client: &ContentClient<T>,
) -> Result<HomePage, EngineError> {
    let fetched = client.list_timeline_summaries().await;
    HomePage::build(fetched, client.images())
}

/// Slugs that are not URL-safe can't name a stored review, so they route to
/// not-found without touching the store.
pub async fn load_detail<T: ContentTransport>(
    client: &ContentClient<T>,
    slug: &str,
) -> Result<DetailOutcome, EngineError> {
    if !is_url_safe_slug(slug) {
        info!(slug, "rejecting malformed review slug");
        return Ok(DetailOutcome::NotFound);
    }
    let lookup = client.get_full_record(slug).await?;
    resolve_detail(slug, lookup, client.images())
}

/// Slugs to pre-render. Falls back to the mock set when the store lists none.
pub async fn static_params<T: ContentTransport>(client: &ContentClient<T>) -> Vec<String> {
    let slugs = client.list_all_slugs().await;
    if slugs.is_empty() {
        fallback_slugs()
    } else {
        slugs.into_iter().collect()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AboutPage {
    pub settings: SiteSettings,
    pub used_fallback: bool,
}

pub async fn load_about<T: ContentTransport>(client: &ContentClient<T>) -> AboutPage {
    match client.get_site_settings().await {
        Some(settings) => AboutPage {
            settings,
            used_fallback: false,
        },
        None => AboutPage {
            settings: fallback_settings(),
            used_fallback: true,
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ContentConfig;
    use crate::content::client::tests::{summary_json, StubTransport};

    fn configured(transport: StubTransport) -> ContentClient<StubTransport> {
        ContentClient::new(&ContentConfig::new("abc123", "production"), transport).expect("client")
    }

    #[tokio::test]
    async fn unconfigured_home_renders_fallback() {
        let client =
            ContentClient::new(&ContentConfig::default(), StubTransport::new()).expect("client");
        let home = load_home(&client).await.expect("home");
        assert!(home.used_fallback);
        assert_eq!(home.entries.len(), 6);
        assert_eq!(home.entries[0].slug, "ember-and-ash");
        assert!(home.entries.iter().all(|e| e.hero_image_url.is_none()));
    }

    #[tokio::test]
    async fn partial_data_does_not_trigger_fallback() {
        let mut doc = summary_json("khao-lak", "2024-04-04", 10.0);
        doc["heroImage"] = serde_json::json!({ "asset": { "_ref": "image-abc-1600x900-jpg" } });
        let client = configured(
            StubTransport::new().route("order(visitDate desc)", serde_json::json!([doc])),
        );
        let home = load_home(&client).await.expect("home");
        assert!(!home.used_fallback);
        assert_eq!(home.entries.len(), 1);
        assert_eq!(home.entries[0].overall_display, "8.5");
        assert_eq!(
            home.entries[0].hero_image_url.as_deref(),
            Some(concat!(
                "https://cdn.sanity.io/images/abc123/production/abc-1600x900.jpg",
                "?w=1600&q=80&auto=format"
            ))
        );
    }

    #[tokio::test]
    async fn malformed_hero_image_propagates() {
        let mut doc = summary_json("khao-lak", "2024-04-04", 9.0);
        doc["heroImage"] = serde_json::json!({ "asset": { "_ref": "garbage" } });
        let client = configured(
            StubTransport::new().route("order(visitDate desc)", serde_json::json!([doc])),
        );
        assert!(matches!(
            load_home(&client).await,
            Err(EngineError::MalformedImageRef(_))
        ));
    }

    #[tokio::test]
    async fn unknown_slug_is_not_found() {
        let client = configured(StubTransport::new().route("$slug", serde_json::Value::Null));
        assert_eq!(
            load_detail(&client, "ghost-kitchen").await,
            Ok(DetailOutcome::NotFound)
        );
    }

    #[tokio::test]
    async fn malformed_route_slug_is_not_found() {
        let client = configured(StubTransport::new());
        assert_eq!(
            load_detail(&client, "../etc/passwd").await,
            Ok(DetailOutcome::NotFound)
        );
        assert!(client.transport().calls.borrow().is_empty());
    }

    #[tokio::test]
    async fn unconfigured_detail_uses_fallback() {
        let client =
            ContentClient::new(&ContentConfig::default(), StubTransport::new()).expect("client");
        match load_detail(&client, "osteria-lupa").await {
            Ok(DetailOutcome::Found(view)) => {
                assert_eq!(view.entry.overall_display, "9.0");
                assert_eq!(view.location.as_deref(), Some("Portland, OR"));
                assert_eq!(view.scores.len(), 4);
                assert!(view.gallery.is_empty());
                assert!(view.rick_factor.is_some());
            }
            other => panic!("expected fallback detail, got {other:?}"),
        }
        assert_eq!(
            load_detail(&client, "not-a-mock").await,
            Ok(DetailOutcome::NotFound)
        );
    }

    #[test]
    fn gallery_order_is_preserved() {
        let mut review = fallback_review("pho-real").expect("mock");
        for (i, name) in ["first", "second", "third"].iter().enumerate() {
            review.gallery.push(crate::content::model::GalleryImage {
                image: ImageRef::new(format!("image-img{i}-10x10-jpg")),
                caption: Some(name.to_string()),
            });
        }
        let builder = ImageUrlBuilder::from_config(&ContentConfig::new("p", "d"));
        let view = DetailView::build(&review, builder.as_ref()).expect("view");
        let captions: Vec<_> = view.gallery.iter().filter_map(|g| g.caption.clone()).collect();
        assert_eq!(captions, vec!["first", "second", "third"]);
        assert_eq!(view.gallery[0].alt, "Pho Real");
        assert!(view.gallery[2].url.as_deref().unwrap_or("").contains("img2-10x10.jpg"));
    }

    #[tokio::test]
    async fn static_params_and_about() {
        let client = configured(
            StubTransport::new()
                .route("].slug.current", serde_json::json!(["zeta", "alpha"]))
                .failing("siteSettings"),
        );
        assert_eq!(static_params(&client).await, vec!["alpha", "zeta"]);

        let about = load_about(&client).await;
        assert!(about.used_fallback);
        assert_eq!(about.settings, fallback_settings());

        let empty =
            ContentClient::new(&ContentConfig::default(), StubTransport::new()).expect("client");
        assert_eq!(static_params(&empty).await.len(), 6);
    }
}
