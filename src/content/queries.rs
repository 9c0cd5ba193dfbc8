// Fixed GROQ queries and the HTTP query URL for the hosted document store.

use serde::Deserialize;
use url::Url;

use crate::config::ContentConfig;
use crate::error::EngineError;

const SUMMARY_FIELDS: &str = concat!(
    r#"_id, name, "slug": slug.current, cuisine, priceRange, "#,
    "heroImage, summary, visitDate, scores"
);

/// Timeline summaries, newest visit first.
pub fn timeline_summaries() -> String {
    format!(
        r#"*[_type == "review" && defined(slug.current)] | order(visitDate desc) {{ {} }}"#,
        SUMMARY_FIELDS
    )
}

/// One full record, bound to `$slug`.
pub fn review_by_slug() -> String {
    format!(
        r#"*[_type == "review" && slug.current == $slug][0] {{ {SUMMARY_FIELDS}, location, gallery[]{{ asset, alt, caption }}, "body": body[]{{ "style": coalesce(style, "normal"), "text": pt::text(@) }}, rickFactor }}"#
    )
}

pub const ALL_SLUGS: &str = r#"*[_type == "review" && defined(slug.current)].slug.current"#;

pub const SITE_SETTINGS: &str = r#"*[_type == "siteSettings"][0] { title, tagline, about }"#;

/// Response envelope of the query endpoint.
#[derive(Debug, Deserialize)]
pub struct QueryResponse<T> {
    pub result: T,
}

/// Builds query URLs for one configured project.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QueryEndpoint {
    base: Url,
}

impl QueryEndpoint {
    /// `None` when the content source is unconfigured.
    pub fn from_config(config: &ContentConfig) -> Result<Option<Self>, EngineError> {
        let Some(project) = config.project() else {
            return Ok(None);
        };
        let host = if config.use_cdn { "apicdn" } else { "api" };
        let version = config.api_version.trim_start_matches('v');
        let raw = format!(
            "https://{project}.{host}.sanity.io/v{version}/data/query/{}",
            config.dataset.trim()
        );
        let base = Url::parse(&raw)
            .map_err(|e| EngineError::InvalidConfig(format!("content endpoint {raw:?}: {e}")))?;
        Ok(Some(QueryEndpoint { base }))
    }

    /// URL for `query` with string parameters. Parameter values are JSON-encoded
    /// as the API expects (`$slug="pho-real"`).
    pub fn url(&self, query: &str, params: &[(&str, &str)]) -> Result<String, EngineError> {
        let mut url = self.base.clone();
        {
            let mut pairs = url.query_pairs_mut();
            pairs.append_pair("query", query);
            for (name, value) in params {
                let encoded = serde_json::to_string(value)?;
                pairs.append_pair(&format!("${name}"), &encoded);
            }
        }
        Ok(url.into())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unconfigured_has_no_endpoint() {
        let endpoint = QueryEndpoint::from_config(&ContentConfig::default()).expect("ok");
        assert!(endpoint.is_none());
    }

    #[test]
    fn cdn_and_api_hosts() {
        let mut config = ContentConfig::new("abc123", "production");
        let endpoint = QueryEndpoint::from_config(&config).expect("ok").expect("configured");
        let url = endpoint.url(ALL_SLUGS, &[]).expect("url");
        assert!(url.starts_with(
            "https://abc123.apicdn.sanity.io/v2024-01-01/data/query/production?query="
        ));

        config.use_cdn = false;
        let endpoint = QueryEndpoint::from_config(&config).expect("ok").expect("configured");
        let url = endpoint.url(ALL_SLUGS, &[]).expect("url");
        assert!(url.starts_with("https://abc123.api.sanity.io/"));
    }

    #[test]
    fn slug_parameter_is_json_encoded() {
        let endpoint = QueryEndpoint::from_config(&ContentConfig::new("abc123", "production"))
            .expect("ok")
            .expect("configured");
        let url = endpoint.url(&review_by_slug(), &[("slug", "pho-real")]).expect("url");
        let parsed = Url::parse(&url).expect("valid url");
        let slug = parsed
            .query_pairs()
            .find(|(k, _)| k == "$slug")
            .map(|(_, v)| v.into_owned());
        assert_eq!(slug.as_deref(), Some("\"pho-real\""));
    }

    #[test]
    fn queries_project_expected_shape() {
        assert!(timeline_summaries().contains("order(visitDate desc)"));
        assert!(timeline_summaries().contains(r#""slug": slug.current"#));
        assert!(review_by_slug().contains("slug.current == $slug][0]"));
        assert!(review_by_slug().contains("rickFactor"));
    }

    #[test]
    fn decodes_envelope() {
        let response: QueryResponse<Vec<String>> =
            serde_json::from_str(r#"{"ms":3,"query":"...","result":["a","b"]}"#).expect("decodes");
        assert_eq!(response.result, vec!["a", "b"]);
    }
}
