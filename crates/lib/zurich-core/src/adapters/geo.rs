use tracing::debug;
use zurich_model::FeatureCollection;

use super::{Adapter, QueryParams};
use crate::error::BackendError;
use crate::transport::{self, join_url};

pub const DEFAULT_MAX_FEATURES: u32 = 50;
pub const DEFAULT_OUTPUT_FORMAT: &str = "GeoJSON";
const WFS_VERSION: &str = "1.1.0";

/// A WFS `GetFeature` request against one geoportal service.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FeatureRequest {
    pub service: String,
    pub type_name: String,
    /// Advisory cap passed to the backend; never enforced locally.
    pub max_features: u32,
    pub output_format: String,
    /// Backend filter expression, passed through verbatim.
    pub filter: Option<String>,
}

impl FeatureRequest {
    #[must_use]
    pub fn new(service: impl Into<String>, type_name: impl Into<String>) -> Self {
        Self {
            service: service.into(),
            type_name: type_name.into(),
            max_features: DEFAULT_MAX_FEATURES,
            output_format: DEFAULT_OUTPUT_FORMAT.to_string(),
            filter: None,
        }
    }

    #[must_use]
    pub const fn with_max_features(mut self, max_features: u32) -> Self {
        self.max_features = max_features;
        self
    }

    #[must_use]
    pub fn with_output_format(mut self, output_format: impl Into<String>) -> Self {
        self.output_format = output_format.into();
        self
    }

    #[must_use]
    pub fn with_filter(mut self, filter: Option<String>) -> Self {
        self.filter = filter;
        self
    }

    /// Query parameters of the `GetFeature` call.
    #[must_use]
    pub fn query_params(&self) -> QueryParams {
        QueryParams::new()
            .with("service", "WFS")
            .with("version", WFS_VERSION)
            .with("request", "GetFeature")
            .with("typename", &self.type_name)
            .with("outputFormat", &self.output_format)
            .with("maxFeatures", self.max_features)
            .with_opt(
                "CQL_FILTER",
                self.filter.as_deref().filter(|filter| !filter.trim().is_empty()),
            )
    }
}

/// Adapter for the WFS geoportal.
#[derive(Debug, Clone)]
pub struct GeoAdapter {
    base: String,
}

impl GeoAdapter {
    #[must_use]
    pub fn new(base: impl Into<String>) -> Self {
        Self { base: base.into() }
    }

    /// Fetches features of one layer as `GeoJSON`.
    ///
    /// # Errors
    /// Returns [`BackendError::Status`] for non-2xx responses (including
    /// malformed filters rejected by the backend) and
    /// [`BackendError::Decode`] when the body is not a feature collection.
    pub async fn features(&self, request: &FeatureRequest) -> Result<FeatureCollection, BackendError> {
        let client = transport::client()?;
        let url = join_url(&self.base, &request.service);
        debug!(%url, type_name = %request.type_name, "wfs get feature");
        let params = request.query_params();
        let response = transport::send(client.get(&url).query(params.as_pairs())).await?;
        transport::read_json(response).await
    }
}

impl Adapter for GeoAdapter {
    type Request = FeatureRequest;
    type Output = FeatureCollection;

    async fn fetch(&self, request: FeatureRequest) -> Result<FeatureCollection, BackendError> {
        self.features(&request).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn request_builds_fixed_wfs_parameters() {
        let params = FeatureRequest::new("Schulanlagen", "poi_kindergarten_view")
            .with_max_features(5)
            .query_params();

        assert_eq!(params.get("service"), Some("WFS"));
        assert_eq!(params.get("version"), Some("1.1.0"));
        assert_eq!(params.get("request"), Some("GetFeature"));
        assert_eq!(params.get("typename"), Some("poi_kindergarten_view"));
        assert_eq!(params.get("outputFormat"), Some("GeoJSON"));
        assert_eq!(params.get("maxFeatures"), Some("5"));
        assert_eq!(params.get("CQL_FILTER"), None);
    }

    #[test]
    fn filter_is_passed_verbatim() {
        let filter = "kategorie = 'Kindergarten'".to_string();
        let params = FeatureRequest::new("Schulanlagen", "poi_kindergarten_view")
            .with_filter(Some(filter.clone()))
            .query_params();
        assert_eq!(params.get("CQL_FILTER"), Some(filter.as_str()));

        let blank = FeatureRequest::new("Sport", "poi_sport_view")
            .with_filter(Some("  ".to_string()))
            .query_params();
        assert_eq!(blank.get("CQL_FILTER"), None);
    }
}
