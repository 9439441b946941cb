use rmcp::{
    ErrorData,
    handler::server::wrapper::Parameters,
    model::CallToolResult,
    schemars,
    tool,
    tool_router,
};
use serde::{Deserialize, Serialize};
use zurich_core::control::GeoFeatures;
use zurich_model::Feature;
use zurich_model::registry::GeoLayer;

use crate::{ZurichMcp, helpers};

const LISTED_FEATURES: usize = 20;
const LISTED_PROPERTIES: usize = 20;
const HIDDEN_PROPERTIES: &[&str] = &["objectid", "geometrie_gdo"];

/// Parameters for a feature request.
#[derive(Debug, Clone, Serialize, Deserialize, schemars::JsonSchema)]
pub struct GeoFeaturesParams {
    /// Layer id from `zurich_geo_layers`, e.g. `schulanlagen`.
    pub layer_id: String,
    /// Maximum number of features, 1 to 500 (default 50).
    pub max_features: Option<u32>,
    /// CQL filter on feature properties, e.g. `name LIKE '%Wasser%'`.
    pub property_filter: Option<String>,
}

#[tool_router(router = tool_router_geo, vis = "pub")]
impl ZurichMcp {
    #[tool(description = "List the WFS layers of the city geoportal usable with zurich_geo_features.")]
    async fn zurich_geo_layers(&self) -> Result<CallToolResult, ErrorData> {
        Ok(helpers::respond(
            Ok(self.control.geo_layers()),
            "Geodaten-Layer",
            render_layers,
        ))
    }

    #[tool(description = "Fetch GeoJSON features of a geoportal layer (schools, districts, playgrounds and more).")]
    async fn zurich_geo_features(
        &self,
        Parameters(params): Parameters<GeoFeaturesParams>,
    ) -> Result<CallToolResult, ErrorData> {
        let layer_id = helpers::required(&params.layer_id, "layer_id", 1)?;
        let max_features = helpers::clamp(params.max_features, 50, 1, 500);
        let filter = helpers::optional(params.property_filter);
        let result = self
            .control
            .geo_features(layer_id, max_features, filter.clone())
            .await;
        Ok(helpers::respond(result, "Geodaten-Abfrage", |features| {
            render_features(&features, filter.as_deref())
        }))
    }
}

fn render_layers(layers: &[GeoLayer]) -> String {
    let mut lines = vec![
        "## Verfügbare Geoportal-Layer (WFS)".to_string(),
        format!("**Anzahl**: {}\n", layers.len()),
        "| Layer-ID | Beschreibung | WFS-Service |".to_string(),
        "|---|---|---|".to_string(),
    ];
    lines.extend(layers.iter().map(|layer| {
        format!(
            "| `{}` | {} | {} |",
            layer.id, layer.description, layer.service
        )
    }));
    lines.push(
        "\n*Nutze `zurich_geo_features` mit einer Layer-ID, um GeoJSON-Daten abzurufen.*"
            .to_string(),
    );
    lines.join("\n")
}

fn feature_line(index: usize, feature: &Feature) -> String {
    let mut label = match feature.first_text(&["name", "bezeichnung", "einheit"]) {
        Some(name) => format!("**{name}**"),
        None => format!("**Feature {index}**"),
    };
    if let Some(category) = feature.first_text(&["kategorie", "typ"]) {
        label.push_str(&format!(" ({category})"));
    }
    if let Some(address) = feature.first_text(&["adresse", "strasse"]) {
        label.push_str(&format!(" – {address}"));
    }
    if let Some((lon, lat)) = feature.point() {
        label.push_str(&format!(" 📍 [{lat:.5}, {lon:.5}]"));
    }
    format!("{index}. {label}")
}

fn render_features(result: &GeoFeatures, filter: Option<&str>) -> String {
    let features = &result.collection.features;
    let mut lines = vec![
        format!("## Geodaten: {}", result.layer.description),
        format!(
            "**Layer**: `{}` ({})",
            result.layer.id, result.layer.type_name
        ),
        format!("**Features**: {}\n", features.len()),
    ];
    if let Some(filter) = filter {
        lines.push(format!("**Filter**: `{filter}`\n"));
    }
    lines.extend(
        features
            .iter()
            .take(LISTED_FEATURES)
            .enumerate()
            .map(|(index, feature)| feature_line(index + 1, feature)),
    );
    if features.len() > LISTED_FEATURES {
        lines.push(format!(
            "\n*… und {} weitere Features*",
            features.len() - LISTED_FEATURES
        ));
    }
    if let Some(first) = features.first() {
        let keys: Vec<&str> = first
            .properties
            .keys()
            .map(String::as_str)
            .filter(|key| !HIDDEN_PROPERTIES.contains(key))
            .take(LISTED_PROPERTIES)
            .collect();
        lines.push(format!("\n**Verfügbare Felder**: {}", keys.join(", ")));
    }
    lines.join("\n")
}
