//! Backend adapters.
//!
//! Each adapter speaks one wire protocol and binds to exactly one endpoint.
//! They share the [`Adapter`] trait so a caller can run any of them the same
//! way, while keeping a backend-specific output type.

use std::future::Future;

pub mod catalog;
pub mod geo;
pub mod json;
pub mod records;
pub mod sparql;

pub use catalog::{CatalogAdapter, CatalogRequest};
pub use geo::{FeatureRequest, GeoAdapter};
pub use json::{JsonAdapter, JsonRequest};
pub use records::{RecordsAdapter, RecordsQuery, extract_text, hit_count, hits};
pub use sparql::{SparqlAdapter, SparqlQuery};

use crate::classify::classify;
use crate::error::BackendError;

/// A single-attempt request against one backend.
pub trait Adapter {
    /// Per-call request description.
    type Request: Send;
    /// Decoded response, specific to the backend.
    type Output: Send;

    /// Executes one request. There is no retry.
    fn fetch(
        &self,
        request: Self::Request,
    ) -> impl Future<Output = Result<Self::Output, BackendError>> + Send;
}

/// Runs any adapter and turns a failure into its user-facing message.
///
/// # Errors
/// Returns the classified message for `context` when the adapter fails.
pub async fn execute<A>(adapter: &A, request: A::Request, context: &str) -> Result<A::Output, String>
where
    A: Adapter + Sync,
{
    adapter
        .fetch(request)
        .await
        .map_err(|err| classify(&err, context))
}

/// Ordered query string parameters. Values are stringified on insertion.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct QueryParams(Vec<(String, String)>);

impl QueryParams {
    #[must_use]
    pub const fn new() -> Self {
        Self(Vec::new())
    }

    #[must_use]
    pub fn with(mut self, name: impl Into<String>, value: impl ToString) -> Self {
        self.push(name, value);
        self
    }

    /// Adds the parameter only when `value` is present.
    #[must_use]
    pub fn with_opt<V: ToString>(mut self, name: impl Into<String>, value: Option<V>) -> Self {
        if let Some(value) = value {
            self.push(name, value);
        }
        self
    }

    pub fn push(&mut self, name: impl Into<String>, value: impl ToString) {
        self.0.push((name.into(), value.to_string()));
    }

    /// First value recorded for `name`.
    #[must_use]
    pub fn get(&self, name: &str) -> Option<&str> {
        self.0
            .iter()
            .find(|(key, _)| key == name)
            .map(|(_, value)| value.as_str())
    }

    #[must_use]
    pub fn as_pairs(&self) -> &[(String, String)] {
        &self.0
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl<K: Into<String>, V: ToString> FromIterator<(K, V)> for QueryParams {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut params = Self::new();
        for (name, value) in iter {
            params.push(name, value);
        }
        params
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn params_keep_insertion_order_and_stringify() {
        let params = QueryParams::new()
            .with("q", "Schule")
            .with("rows", 3)
            .with("include_datasets", true)
            .with_opt("sort", None::<&str>)
            .with_opt("fq", Some("groups:bildung"));

        let names: Vec<&str> = params.as_pairs().iter().map(|(name, _)| name.as_str()).collect();
        assert_eq!(names, ["q", "rows", "include_datasets", "fq"]);
        assert_eq!(params.get("rows"), Some("3"));
        assert_eq!(params.get("include_datasets"), Some("true"));
        assert_eq!(params.get("sort"), None);
        assert_eq!(params.len(), 4);
    }

    #[test]
    fn params_collect_from_pairs() {
        let params: QueryParams = [("id", 166)].into_iter().collect();
        assert_eq!(params.get("id"), Some("166"));
        assert!(!params.is_empty());
    }
}
