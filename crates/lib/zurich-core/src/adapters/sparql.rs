use reqwest::header::ACCEPT;
use tracing::debug;
use zurich_model::SparqlResultSet;

use super::Adapter;
use crate::error::BackendError;
use crate::transport;

/// Raw SPARQL query text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SparqlQuery(pub String);

/// Adapter for the linked-data SPARQL endpoint.
///
/// The adapter does not inspect the query. Restricting callers to read-only
/// queries is left to the caller.
#[derive(Debug, Clone)]
pub struct SparqlAdapter {
    endpoint: String,
}

impl SparqlAdapter {
    #[must_use]
    pub fn new(endpoint: impl Into<String>) -> Self {
        Self {
            endpoint: endpoint.into(),
        }
    }

    /// Sends `query` as the `query` GET parameter and decodes the JSON
    /// results. A result set without bindings is returned as-is.
    ///
    /// # Errors
    /// Returns [`BackendError::Status`] for non-2xx responses and
    /// [`BackendError::Decode`] when the body is not a SPARQL JSON document.
    pub async fn query(&self, query: &str) -> Result<SparqlResultSet, BackendError> {
        let client = transport::client()?;
        debug!(endpoint = %self.endpoint, "sparql query");
        let request = client
            .get(&self.endpoint)
            .query(&[("query", query)])
            .header(ACCEPT, "application/json");
        let response = transport::send(request).await?;
        transport::read_json(response).await
    }
}

impl Adapter for SparqlAdapter {
    type Request = SparqlQuery;
    type Output = SparqlResultSet;

    async fn fetch(&self, request: SparqlQuery) -> Result<SparqlResultSet, BackendError> {
        self.query(&request.0).await
    }
}
