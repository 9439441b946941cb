//! HTTP client factory and backend endpoint configuration.
//!
//! Every adapter obtains its client from [`client`] and executes requests
//! through [`send`], so all backends share one timeout, one identifying
//! header, and one redirect policy.

use std::time::Duration;

use reqwest::redirect::Policy;
use reqwest::{Client, RequestBuilder, Response};
use serde::de::DeserializeOwned;
use tracing::{debug, warn};

use crate::error::BackendError;

/// Fixed timeout applied to every backend request.
pub const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);
/// Identifying `User-Agent` sent with every backend request.
pub const USER_AGENT: &str = "ZurichOpenDataMCP/0.3 (MCP Server; +https://github.com/schulamt-zurich)";
pub const MAX_REDIRECTS: usize = 10;

const CATALOG_SITE: &str = "https://data.stadt-zuerich.ch";
const CATALOG_API: &str = "https://data.stadt-zuerich.ch/api/3/action";
const GEODATA_URL: &str = "https://www.ogd.stadt-zuerich.ch/wfs/geoportal";
const RECORDS_URL: &str = "https://www.gemeinderat-zuerich.ch/api";
const TOURISM_URL: &str = "https://www.zuerich.com/en/api/v2/data";
const SPARQL_URL: &str = "https://ld.stadt-zuerich.ch/query";
const PARKING_URL: &str = "https://api.parkendd.de/Zuerich";

/// Base URLs of the six backends, injected into the control plane.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Endpoints {
    /// Catalog web root, used to build canonical dataset links.
    pub catalog_site: String,
    /// Catalog action API, `<catalog>/<action>`.
    pub catalog: String,
    pub geodata: String,
    pub records: String,
    pub tourism: String,
    pub sparql: String,
    pub parking: String,
}

impl Endpoints {
    /// Production endpoints of the City of Zurich.
    #[must_use]
    pub fn zurich() -> Self {
        Self {
            catalog_site: CATALOG_SITE.to_string(),
            catalog: CATALOG_API.to_string(),
            geodata: GEODATA_URL.to_string(),
            records: RECORDS_URL.to_string(),
            tourism: TOURISM_URL.to_string(),
            sparql: SPARQL_URL.to_string(),
            parking: PARKING_URL.to_string(),
        }
    }

    /// Places every backend under one base URL, mirroring the production
    /// path layout. Used against local mock servers.
    #[must_use]
    pub fn under(base: &str) -> Self {
        let base = base.trim_end_matches('/');
        Self {
            catalog_site: base.to_string(),
            catalog: format!("{base}/api/3/action"),
            geodata: format!("{base}/wfs/geoportal"),
            records: format!("{base}/api"),
            tourism: format!("{base}/en/api/v2/data"),
            sparql: format!("{base}/query"),
            parking: format!("{base}/Zuerich"),
        }
    }

    #[must_use]
    pub fn with_catalog_site(mut self, url: impl Into<String>) -> Self {
        self.catalog_site = url.into();
        self
    }

    #[must_use]
    pub fn with_catalog(mut self, url: impl Into<String>) -> Self {
        self.catalog = url.into();
        self
    }

    #[must_use]
    pub fn with_geodata(mut self, url: impl Into<String>) -> Self {
        self.geodata = url.into();
        self
    }

    #[must_use]
    pub fn with_records(mut self, url: impl Into<String>) -> Self {
        self.records = url.into();
        self
    }

    #[must_use]
    pub fn with_tourism(mut self, url: impl Into<String>) -> Self {
        self.tourism = url.into();
        self
    }

    #[must_use]
    pub fn with_sparql(mut self, url: impl Into<String>) -> Self {
        self.sparql = url.into();
        self
    }

    #[must_use]
    pub fn with_parking(mut self, url: impl Into<String>) -> Self {
        self.parking = url.into();
        self
    }
}

impl Default for Endpoints {
    fn default() -> Self {
        Self::zurich()
    }
}

/// Joins a base URL and a path segment with exactly one slash.
#[must_use]
pub fn join_url(base: &str, segment: &str) -> String {
    format!(
        "{}/{}",
        base.trim_end_matches('/'),
        segment.trim_start_matches('/')
    )
}

/// Builds a client with the shared timeout, `User-Agent`, and redirect policy.
///
/// A fresh client is built for each adapter call; it is dropped together
/// with the call's future.
///
/// # Errors
/// Returns [`BackendError::Transport`] if the TLS backend cannot be set up.
pub fn client() -> Result<Client, BackendError> {
    Client::builder()
        .timeout(REQUEST_TIMEOUT)
        .user_agent(USER_AGENT)
        .redirect(Policy::limited(MAX_REDIRECTS))
        .build()
        .map_err(|err| BackendError::Transport(format!("failed to create HTTP client: {err}")))
}

/// Sends a request and rejects non-2xx responses.
///
/// # Errors
/// Returns [`BackendError::Status`] for non-2xx responses, and
/// [`BackendError::Timeout`] or [`BackendError::Transport`] when no response
/// was received.
pub async fn send(request: RequestBuilder) -> Result<Response, BackendError> {
    let response = request.send().await.map_err(|err| {
        let err = BackendError::from(err);
        warn!(error = %err, "backend request failed");
        err
    })?;

    let status = response.status();
    let url = response.url().to_string();
    if !status.is_success() {
        warn!(%status, %url, "backend returned error status");
        return Err(BackendError::Status {
            status: status.as_u16(),
            url,
        });
    }
    debug!(%status, %url, "backend response received");
    Ok(response)
}

/// Reads the full body and decodes it as JSON.
///
/// # Errors
/// Returns [`BackendError::Decode`] when the body is not the expected JSON,
/// or a transport failure if the body cannot be read.
pub async fn read_json<T: DeserializeOwned>(response: Response) -> Result<T, BackendError> {
    let body = response.bytes().await?;
    Ok(serde_json::from_slice(&body)?)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn join_url_normalizes_slashes() {
        assert_eq!(join_url("https://a.ch/api/", "/package_show"), "https://a.ch/api/package_show");
        assert_eq!(join_url("https://a.ch/api", "geschaeft/searchdetails"), "https://a.ch/api/geschaeft/searchdetails");
    }

    #[test]
    fn under_mirrors_production_layout() {
        let endpoints = Endpoints::under("http://127.0.0.1:9000/");
        assert_eq!(endpoints.catalog, "http://127.0.0.1:9000/api/3/action");
        assert_eq!(endpoints.catalog_site, "http://127.0.0.1:9000");
        assert_eq!(endpoints.records, "http://127.0.0.1:9000/api");
    }

    #[test]
    fn default_endpoints_are_production() {
        let endpoints = Endpoints::default();
        assert_eq!(endpoints, Endpoints::zurich());
        assert!(endpoints.sparql.starts_with("https://ld.stadt-zuerich.ch"));
    }

    #[test]
    fn client_builds_with_shared_settings() {
        assert!(client().is_ok());
    }
}
