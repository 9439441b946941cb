use serde::de::DeserializeOwned;
use serde_json::Value;
use tracing::debug;
use zurich_model::CatalogEnvelope;

use super::{Adapter, QueryParams};
use crate::error::BackendError;
use crate::transport::{self, join_url};

/// A named catalog action with its query parameters.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CatalogRequest {
    pub action: String,
    pub params: QueryParams,
}

impl CatalogRequest {
    #[must_use]
    pub fn new(action: impl Into<String>, params: QueryParams) -> Self {
        Self {
            action: action.into(),
            params,
        }
    }
}

/// Adapter for the CKAN-style action API.
#[derive(Debug, Clone)]
pub struct CatalogAdapter {
    base: String,
}

impl CatalogAdapter {
    #[must_use]
    pub fn new(base: impl Into<String>) -> Self {
        Self { base: base.into() }
    }

    #[must_use]
    pub fn base(&self) -> &str {
        &self.base
    }

    /// Invokes `action` and returns the envelope's `result`, decoded as `T`.
    ///
    /// Pagination parameters such as `rows`/`start` are passed through
    /// unchanged; the adapter issues exactly one request.
    ///
    /// # Errors
    /// Returns [`BackendError::Status`] for non-2xx responses,
    /// [`BackendError::Protocol`] when the envelope reports failure or lacks
    /// a result, and [`BackendError::Decode`] when the result does not match
    /// `T`.
    pub async fn action<T: DeserializeOwned>(
        &self,
        action: &str,
        params: &QueryParams,
    ) -> Result<T, BackendError> {
        let client = transport::client()?;
        let url = join_url(&self.base, action);
        debug!(%url, action, "catalog action");
        let response = transport::send(client.get(&url).query(params.as_pairs())).await?;
        let envelope: CatalogEnvelope = transport::read_json(response).await?;
        let result = unwrap_envelope(envelope)?;
        Ok(serde_json::from_value(result)?)
    }
}

/// Returns the `result` of a successful envelope.
///
/// # Errors
/// Returns [`BackendError::Protocol`] carrying `error.message` (or
/// `Unknown error`) when `success` is false, and when a successful envelope
/// has no `result`.
pub fn unwrap_envelope(envelope: CatalogEnvelope) -> Result<Value, BackendError> {
    if !envelope.success {
        return Err(BackendError::Protocol(envelope.error_message().to_string()));
    }
    envelope.result.ok_or_else(|| {
        BackendError::Protocol("envelope reports success but carries no result".to_string())
    })
}

impl Adapter for CatalogAdapter {
    type Request = CatalogRequest;
    type Output = Value;

    async fn fetch(&self, request: CatalogRequest) -> Result<Value, BackendError> {
        self.action(&request.action, &request.params).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn envelope(value: Value) -> CatalogEnvelope {
        serde_json::from_value(value).expect("envelope")
    }

    #[test]
    fn failed_envelope_never_yields_result() {
        let err = unwrap_envelope(envelope(json!({
            "success": false,
            "result": {"count": 1},
            "error": {"message": "Not found: dataset"}
        })))
        .expect_err("failure");
        assert_eq!(err, BackendError::Protocol("Not found: dataset".to_string()));
    }

    #[test]
    fn failed_envelope_without_message_uses_default() {
        let err = unwrap_envelope(envelope(json!({"success": false}))).expect_err("failure");
        assert_eq!(err, BackendError::Protocol("Unknown error".to_string()));
    }

    #[test]
    fn success_without_result_is_protocol_violation() {
        let err = unwrap_envelope(envelope(json!({"success": true}))).expect_err("violation");
        assert_eq!(err.kind_name(), "ProtocolError");
    }

    #[test]
    fn success_returns_only_result() {
        let result = unwrap_envelope(envelope(json!({
            "help": "https://data.stadt-zuerich.ch/api/3/action/help_show?name=package_search",
            "success": true,
            "result": {"count": 120}
        })))
        .expect("result");
        assert_eq!(result, json!({"count": 120}));
    }
}
