use tracing::debug;
use zurich_model::registry::namespaces;

use super::{Adapter, QueryParams};
use crate::error::BackendError;
use crate::transport::{self, join_url};
use crate::xml::XmlElement;

/// Fixed result locale of the records service.
pub const LOCALE: &str = "de-CH";
pub const DEFAULT_START: u32 = 1;
pub const DEFAULT_MAX_RESULTS: u32 = 10;

/// A CQL search against one index of the records service.
///
/// Building the CQL expression is the caller's job; it is sent verbatim.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecordsQuery {
    pub index: String,
    pub query: String,
    /// 1-based position of the first hit.
    pub start: u32,
    pub max_results: u32,
}

impl RecordsQuery {
    #[must_use]
    pub fn new(index: impl Into<String>, query: impl Into<String>) -> Self {
        Self {
            index: index.into(),
            query: query.into(),
            start: DEFAULT_START,
            max_results: DEFAULT_MAX_RESULTS,
        }
    }

    #[must_use]
    pub const fn with_start(mut self, start: u32) -> Self {
        self.start = start;
        self
    }

    #[must_use]
    pub const fn with_max_results(mut self, max_results: u32) -> Self {
        self.max_results = max_results;
        self
    }

    #[must_use]
    pub fn query_params(&self) -> QueryParams {
        QueryParams::new()
            .with("q", &self.query)
            .with("l", LOCALE)
            .with("s", self.start)
            .with("m", self.max_results)
    }
}

/// Adapter for the XML parliamentary records service.
#[derive(Debug, Clone)]
pub struct RecordsAdapter {
    base: String,
}

impl RecordsAdapter {
    #[must_use]
    pub fn new(base: impl Into<String>) -> Self {
        Self { base: base.into() }
    }

    /// Runs a search and returns the root element of the response.
    ///
    /// # Errors
    /// Returns [`BackendError::Status`] for non-2xx responses and
    /// [`BackendError::XmlParse`] when the body is not well-formed XML.
    pub async fn search(&self, query: &RecordsQuery) -> Result<XmlElement, BackendError> {
        let client = transport::client()?;
        let url = join_url(&self.base, &format!("{}/searchdetails", query.index));
        debug!(%url, cql = %query.query, "records search");
        let params = query.query_params();
        let response = transport::send(client.get(&url).query(params.as_pairs())).await?;
        let body = response.text().await?;
        Ok(XmlElement::parse(&body)?)
    }
}

impl Adapter for RecordsAdapter {
    type Request = RecordsQuery;
    type Output = XmlElement;

    async fn fetch(&self, request: RecordsQuery) -> Result<XmlElement, BackendError> {
        self.search(&request).await
    }
}

/// Trimmed text of `element`, or `default` when the element is absent or
/// has no non-blank text.
#[must_use]
pub fn extract_text(element: Option<&XmlElement>, default: &str) -> String {
    element
        .and_then(|element| element.text.as_deref())
        .map(str::trim)
        .filter(|text| !text.is_empty())
        .unwrap_or(default)
        .to_string()
}

/// Total number of matches announced by the root's `numHits` attribute;
/// 0 when absent or not a number.
#[must_use]
pub fn hit_count(root: &XmlElement) -> u64 {
    root.attribute("numHits")
        .and_then(|hits| hits.trim().parse().ok())
        .unwrap_or(0)
}

/// `Hit` children of a search response root.
pub fn hits(root: &XmlElement) -> impl Iterator<Item = &XmlElement> {
    root.find_all(namespaces::SEARCH, "Hit")
}
