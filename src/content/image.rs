// Derived image URLs from stored asset references.
// A malformed reference is a schema mismatch and is reported, never swallowed.

use serde::{Deserialize, Serialize};
use url::Url;

use crate::config::ContentConfig;
use crate::content::model::ImageRef;
use crate::error::EngineError;

const IMAGE_CDN: &str = "https://cdn.sanity.io/images";

/// Parsed `image-<assetId>-<W>x<H>-<format>` reference.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AssetId {
    pub id: String,
    pub width: u32,
    pub height: u32,
    pub format: String,
}

impl AssetId {
    pub fn parse(reference: &str) -> Result<Self, EngineError> {
        let malformed = || EngineError::MalformedImageRef(reference.to_string());

        let rest = reference.strip_prefix("image-").ok_or_else(malformed)?;
        let mut parts = rest.rsplitn(3, '-');
        let format = parts.next().ok_or_else(malformed)?;
        let dims = parts.next().ok_or_else(malformed)?;
        let id = parts.next().ok_or_else(malformed)?;

        let (w, h) = dims.split_once('x').ok_or_else(malformed)?;
        let width: u32 = w.parse().map_err(|_| malformed())?;
        let height: u32 = h.parse().map_err(|_| malformed())?;

        let alnum = |s: &str| !s.is_empty() && s.chars().all(|c| c.is_ascii_alphanumeric());
        if !alnum(id) || !alnum(format) || width == 0 || height == 0 {
            return Err(malformed());
        }

        Ok(AssetId {
            id: id.to_string(),
            width,
            height,
            format: format.to_string(),
        })
    }

    /// `<assetId>-<W>x<H>.<format>`
    pub fn file_name(&self) -> String {
        format!("{}-{}x{}.{}", self.id, self.width, self.height, self.format)
    }
}

/// Transform options appended as query parameters.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct ImageOptions {
    #[serde(default)]
    pub width: Option<u32>,
    #[serde(default)]
    pub height: Option<u32>,
    /// 1..=100, clamped.
    #[serde(default)]
    pub quality: Option<u8>,
}

impl ImageOptions {
    pub fn width(width: u32) -> Self {
        ImageOptions {
            width: Some(width),
            ..Default::default()
        }
    }

    pub fn quality(mut self, quality: u8) -> Self {
        self.quality = Some(quality);
        self
    }
}

/// Builds CDN URLs for one project/dataset.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImageUrlBuilder {
    project_id: String,
    dataset: String,
}

impl ImageUrlBuilder {
    /// `None` when the content source is unconfigured.
    pub fn from_config(config: &ContentConfig) -> Option<Self> {
        config.project().map(|project| ImageUrlBuilder {
            project_id: project.to_string(),
            dataset: config.dataset.trim().to_string(),
        })
    }

    pub fn build(&self, image: &ImageRef, options: ImageOptions) -> Result<String, EngineError> {
        let asset = AssetId::parse(&image.asset.reference)?;
        let base = format!(
            "{IMAGE_CDN}/{}/{}/{}",
            self.project_id,
            self.dataset,
            asset.file_name()
        );
        let mut url = Url::parse(&base)
            .map_err(|e| EngineError::InvalidConfig(format!("image base url: {e}")))?;
        {
            let mut query = url.query_pairs_mut();
            if let Some(w) = options.width.filter(|w| *w > 0) {
                query.append_pair("w", &w.to_string());
            }
            if let Some(h) = options.height.filter(|h| *h > 0) {
                query.append_pair("h", &h.to_string());
                if options.width.is_some() {
                    query.append_pair("fit", "crop");
                }
            }
            if let Some(q) = options.quality {
                query.append_pair("q", &q.clamp(1, 100).to_string());
            }
            query.append_pair("auto", "format");
        }
        Ok(url.into())
    }
}
