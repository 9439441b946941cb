use zurich_model::FeatureCollection;
use zurich_model::registry::{GEOPORTAL_LAYERS, GeoLayer, geo_layer, geo_layer_ids};

use super::{ControlError, OpenDataControlPlane};
use crate::adapters::FeatureRequest;

#[derive(Debug, Clone)]
pub struct GeoFeatures {
    pub layer: &'static GeoLayer,
    pub collection: FeatureCollection,
}

impl OpenDataControlPlane {
    /// Known geoportal layers, sorted by id.
    #[must_use]
    pub const fn geo_layers(&self) -> &'static [GeoLayer] {
        GEOPORTAL_LAYERS
    }

    /// Fetches features of a registered layer.
    ///
    /// # Errors
    /// Returns `ControlError::UnknownLayer` without any request when
    /// `layer_id` is not registered, and `ControlError::Backend` if the WFS
    /// request fails.
    pub async fn geo_features(
        &self,
        layer_id: &str,
        max_features: u32,
        filter: Option<String>,
    ) -> Result<GeoFeatures, ControlError> {
        let layer = geo_layer(layer_id).ok_or_else(|| ControlError::UnknownLayer {
            id: layer_id.to_string(),
            available: geo_layer_ids(),
        })?;
        let request = FeatureRequest::new(layer.service, layer.type_name)
            .with_max_features(max_features)
            .with_filter(filter);
        let collection = self.geo.features(&request).await?;
        Ok(GeoFeatures { layer, collection })
    }
}
