// Content source adapter. Fails soft on absence: unconfigured or unreachable
// stores yield empty values, and only adapter misuse is an error.

use std::collections::BTreeSet;

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::{debug, warn};

use crate::config::ContentConfig;
use crate::content::image::{ImageOptions, ImageUrlBuilder};
use crate::content::model::{is_url_safe_slug, FullReview, ImageRef, ReviewSummary, SiteSettings};
use crate::content::queries::{self, QueryEndpoint, QueryResponse};
use crate::content::transport::ContentTransport;
use crate::error::EngineError;

/// Outcome of a single-record lookup.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "status", content = "review")]
pub enum RecordLookup {
    Found(Box<FullReview>),
    /// The store answered and has no such slug.
    NotFound,
    /// No content source is configured.
    Unconfigured,
    /// The store could not be reached or answered with something unusable.
    Unavailable,
}

pub struct ContentClient<T> {
    endpoint: Option<QueryEndpoint>,
    images: Option<ImageUrlBuilder>,
    transport: T,
}

impl<T: ContentTransport> ContentClient<T> {
    /// Errors only if a configured endpoint cannot form a valid URL.
    pub fn new(config: &ContentConfig, transport: T) -> Result<Self, EngineError> {
        let endpoint = QueryEndpoint::from_config(config)?;
        if endpoint.is_none() {
            debug!("content source not configured, reads will return empty results");
        }
        Ok(ContentClient {
            endpoint,
            images: ImageUrlBuilder::from_config(config),
            transport,
        })
    }

    pub fn is_configured(&self) -> bool {
        self.endpoint.is_some()
    }

    pub fn images(&self) -> Option<&ImageUrlBuilder> {
        self.images.as_ref()
    }

    #[cfg(test)]
    pub(crate) fn transport(&self) -> &T {
        &self.transport
    }

    /// Timeline summaries sorted by visit date, newest first. Empty when the
    /// store is unconfigured or unreachable; invalid documents are dropped.
    pub async fn list_timeline_summaries(&self) -> Vec<ReviewSummary> {
        let docs: Vec<Value> = match self.query(&queries::timeline_summaries(), &[]).await {
            Ok(Some(docs)) => docs,
            Ok(None) => return Vec::new(),
            Err(e) => {
                warn!(error = %e, "timeline summaries unavailable");
                return Vec::new();
            }
        };

        let mut seen = BTreeSet::new();
        let mut summaries: Vec<ReviewSummary> = docs
            .into_iter()
            .filter_map(|doc| match serde_json::from_value::<ReviewSummary>(doc) {
                Ok(summary) => Some(summary),
                Err(e) => {
                    warn!(error = %e, "dropping undecodable review summary");
                    None
                }
            })
            .filter(|summary| match summary.validate() {
                Ok(()) => true,
                Err(e) => {
                    warn!(error = %e, "dropping invalid review summary");
                    false
                }
            })
            .filter(|summary| {
                let fresh = seen.insert(summary.slug.clone());
                if !fresh {
                    warn!(slug = %summary.slug, "dropping duplicate slug");
                }
                fresh
            })
            .collect();

        summaries.sort_by(|a, b| b.visit_date.cmp(&a.visit_date));
        summaries
    }

    /// Full record by slug. A slug that could never be stored is misuse.
    pub async fn get_full_record(&self, slug: &str) -> Result<RecordLookup, EngineError> {
        if !is_url_safe_slug(slug) {
            return Err(EngineError::InvalidSlug(slug.to_string()));
        }

        let result = self
            .query(&queries::review_by_slug(), &[("slug", slug)])
            .await;
        let doc: Option<Value> = match result {
            Ok(None) => return Ok(RecordLookup::Unconfigured),
            Ok(Some(doc)) => doc,
            Err(e) => {
                warn!(slug, error = %e, "review lookup unavailable");
                return Ok(RecordLookup::Unavailable);
            }
        };
        let Some(doc) = doc.filter(|d| !d.is_null()) else {
            return Ok(RecordLookup::NotFound);
        };

        let review: FullReview = match serde_json::from_value(doc) {
            Ok(review) => review,
            Err(e) => {
                warn!(slug, error = %e, "review document does not match schema");
                return Ok(RecordLookup::Unavailable);
            }
        };
        if let Err(e) = review.validate() {
            warn!(slug, error = %e, "review document failed validation");
            return Ok(RecordLookup::Unavailable);
        }
        Ok(RecordLookup::Found(Box::new(review)))
    }

    /// Every valid slug, for static generation.
    pub async fn list_all_slugs(&self) -> BTreeSet<String> {
        match self.query::<Vec<String>>(queries::ALL_SLUGS, &[]).await {
            Ok(Some(slugs)) => slugs.into_iter().filter(|s| is_url_safe_slug(s)).collect(),
            Ok(None) => BTreeSet::new(),
            Err(e) => {
                warn!(error = %e, "slug listing unavailable");
                BTreeSet::new()
            }
        }
    }

    pub async fn get_site_settings(&self) -> Option<SiteSettings> {
        match self.query::<Option<SiteSettings>>(queries::SITE_SETTINGS, &[]).await {
            Ok(settings) => settings.flatten(),
            Err(e) => {
                warn!(error = %e, "site settings unavailable");
                None
            }
        }
    }

    /// `Ok(None)` when unconfigured; malformed references are errors.
    pub fn image_url(
        &self,
        image: &ImageRef,
        options: ImageOptions,
    ) -> Result<Option<String>, EngineError> {
        match &self.images {
            Some(builder) => builder.build(image, options).map(Some),
            None => Ok(None),
        }
    }

    /// `Ok(None)` when unconfigured.
    async fn query<R: DeserializeOwned>(
        &self,
        query: &str,
        params: &[(&str, &str)],
    ) -> Result<Option<R>, EngineError> {
        let Some(endpoint) = &self.endpoint else {
            return Ok(None);
        };
        let url = endpoint.url(query, params)?;
        let body = self.transport.fetch(&url).await?;
        let response: QueryResponse<R> = serde_json::from_str(&body)?;
        Ok(Some(response.result))
    }
}
