use serde::de::DeserializeOwned;
use serde_json::Value;
use tracing::debug;

use super::{Adapter, QueryParams};
use crate::error::BackendError;
use crate::transport;

/// A plain GET of a JSON document.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct JsonRequest {
    pub url: String,
    pub params: QueryParams,
}

impl JsonRequest {
    #[must_use]
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            params: QueryParams::new(),
        }
    }

    #[must_use]
    pub fn with_params(mut self, params: QueryParams) -> Self {
        self.params = params;
        self
    }
}

/// Adapter for backends whose body is the payload itself.
#[derive(Debug, Clone, Default)]
pub struct JsonAdapter;

impl JsonAdapter {
    /// Fetches `url` and decodes the body as `T`, without envelope handling.
    ///
    /// # Errors
    /// Returns [`BackendError::Status`] for non-2xx responses and
    /// [`BackendError::Decode`] when the body does not match `T`.
    pub async fn get<T: DeserializeOwned>(
        &self,
        url: &str,
        params: &QueryParams,
    ) -> Result<T, BackendError> {
        let client = transport::client()?;
        debug!(%url, "json get");
        let response = transport::send(client.get(url).query(params.as_pairs())).await?;
        transport::read_json(response).await
    }
}

impl Adapter for JsonAdapter {
    type Request = JsonRequest;
    type Output = Value;

    async fn fetch(&self, request: JsonRequest) -> Result<Value, BackendError> {
        self.get(&request.url, &request.params).await
    }
}
