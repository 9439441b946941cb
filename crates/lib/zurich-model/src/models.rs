use std::collections::BTreeMap;

use serde::{Deserialize, Deserializer, Serialize};
use serde_json::{Map, Value};

/// Message used when a failed catalog envelope carries no usable error text.
pub const UNKNOWN_ERROR: &str = "Unknown error";

/// JSON object as returned by a backend, key order preserved.
pub type JsonObject = Map<String, Value>;

fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

/// Success/error envelope wrapped around every catalog action response.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CatalogEnvelope {
    #[serde(default, deserialize_with = "null_as_default")]
    pub success: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub result: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<Value>,
}

impl CatalogEnvelope {
    /// Returns the nested `error.message`, or [`UNKNOWN_ERROR`] when it is
    /// absent, empty, or not a string.
    #[must_use]
    pub fn error_message(&self) -> &str {
        self.error
            .as_ref()
            .and_then(|error| error.get("message"))
            .and_then(Value::as_str)
            .map(str::trim)
            .filter(|message| !message.is_empty())
            .unwrap_or(UNKNOWN_ERROR)
    }
}

/// `GeoJSON` feature collection returned by the WFS geoportal.
///
/// Members other than `features` (for example `crs` or `totalFeatures`) are
/// kept in `extra` so callers see the full document.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct FeatureCollection {
    #[serde(default, deserialize_with = "null_as_default")]
    pub features: Vec<Feature>,
    #[serde(flatten)]
    pub extra: JsonObject,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct Feature {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<Value>,
    #[serde(default)]
    pub geometry: Option<Geometry>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub properties: JsonObject,
    #[serde(flatten)]
    pub extra: JsonObject,
}

impl Feature {
    /// Returns the first non-empty string property among `keys`.
    #[must_use]
    pub fn first_text(&self, keys: &[&str]) -> Option<&str> {
        keys.iter()
            .filter_map(|key| self.properties.get(*key))
            .filter_map(Value::as_str)
            .find(|value| !value.is_empty())
    }

    /// Returns `(longitude, latitude)` for point geometries.
    #[must_use]
    pub fn point(&self) -> Option<(f64, f64)> {
        let geometry = self.geometry.as_ref()?;
        if geometry.kind != "Point" {
            return None;
        }
        let coordinates = geometry.coordinates.as_array()?;
        let lon = coordinates.first()?.as_f64()?;
        let lat = coordinates.get(1)?.as_f64()?;
        Some((lon, lat))
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct Geometry {
    #[serde(rename = "type", default)]
    pub kind: String,
    #[serde(default)]
    pub coordinates: Value,
    #[serde(flatten)]
    pub extra: JsonObject,
}

/// SPARQL 1.1 JSON results document.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct SparqlResultSet {
    #[serde(default)]
    pub head: SparqlHead,
    #[serde(default)]
    pub results: SparqlResults,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub boolean: Option<bool>,
}

impl SparqlResultSet {
    #[must_use]
    pub fn variables(&self) -> &[String] {
        &self.head.vars
    }

    #[must_use]
    pub fn rows(&self) -> &[BTreeMap<String, SparqlTerm>] {
        &self.results.bindings
    }

    /// True when the query succeeded but produced no rows.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.results.bindings.is_empty()
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct SparqlHead {
    #[serde(default)]
    pub vars: Vec<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct SparqlResults {
    #[serde(default)]
    pub bindings: Vec<BTreeMap<String, SparqlTerm>>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct SparqlTerm {
    #[serde(rename = "type", default)]
    pub kind: String,
    #[serde(default)]
    pub value: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub datatype: Option<String>,
    #[serde(rename = "xml:lang", default, skip_serializing_if = "Option::is_none")]
    pub lang: Option<String>,
}

/// `result` payload of `package_search`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PackageSearch {
    #[serde(default)]
    pub count: u64,
    #[serde(default, deserialize_with = "null_as_default")]
    pub results: Vec<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub search_facets: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub facets: Option<Value>,
}

/// One facet bucket of a faceted catalog search.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct FacetItem {
    #[serde(default)]
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub display_name: Option<String>,
    #[serde(default)]
    pub count: u64,
}

impl FacetItem {
    #[must_use]
    pub fn label(&self) -> &str {
        self.display_name
            .as_deref()
            .filter(|name| !name.is_empty())
            .unwrap_or(&self.name)
    }
}

/// `result` payload of `group_show`, and items of `group_list` with
/// `all_fields`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CatalogGroup {
    #[serde(default)]
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(default)]
    pub package_count: u64,
    #[serde(default, deserialize_with = "null_as_default")]
    pub packages: Vec<Value>,
}

impl CatalogGroup {
    #[must_use]
    pub fn display_title(&self) -> &str {
        self.title
            .as_deref()
            .filter(|title| !title.is_empty())
            .unwrap_or(&self.name)
    }
}

/// `result` payload of `datastore_search` and `datastore_search_sql`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct DatastoreResult {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub total: Option<u64>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub records: Vec<JsonObject>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub fields: Vec<DatastoreField>,
}

impl DatastoreResult {
    /// Fields excluding the internal `_id` column.
    pub fn visible_fields(&self) -> impl Iterator<Item = &DatastoreField> {
        self.fields.iter().filter(|field| field.id != "_id")
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct DatastoreField {
    pub id: String,
    #[serde(rename = "type", default, skip_serializing_if = "Option::is_none")]
    pub kind: Option<String>,
}

/// Real-time parking occupancy feed.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ParkingFeed {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_updated: Option<String>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub lots: Vec<ParkingLot>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ParkingLot {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub free: i64,
    #[serde(default, deserialize_with = "null_as_default")]
    pub total: i64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub state: Option<String>,
    #[serde(flatten)]
    pub extra: JsonObject,
}

impl ParkingLot {
    /// Occupied share in whole percent; 0 when the capacity is unknown.
    #[must_use]
    pub fn occupancy_percent(&self) -> i64 {
        if self.total <= 0 {
            return 0;
        }
        let occupied = (self.total - self.free).clamp(0, self.total);
        (occupied * 100 + self.total / 2) / self.total
    }

    #[must_use]
    pub fn is_open(&self) -> bool {
        self.state.as_deref() == Some("open")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn envelope_message_defaults_when_missing() {
        let envelope: CatalogEnvelope =
            serde_json::from_value(json!({"success": false})).expect("envelope");
        assert_eq!(envelope.error_message(), UNKNOWN_ERROR);

        let envelope: CatalogEnvelope = serde_json::from_value(
            json!({"success": false, "error": {"message": "  ", "__type": "Not Found Error"}}),
        )
        .expect("envelope");
        assert_eq!(envelope.error_message(), UNKNOWN_ERROR);

        let envelope: CatalogEnvelope = serde_json::from_value(
            json!({"success": false, "error": {"message": "Not found"}}),
        )
        .expect("envelope");
        assert_eq!(envelope.error_message(), "Not found");
    }

    #[test]
    fn feature_tolerates_null_properties_and_keeps_extra_members() {
        let collection: FeatureCollection = serde_json::from_value(json!({
            "type": "FeatureCollection",
            "totalFeatures": 1,
            "features": [
                {"type": "Feature", "geometry": {"type": "Point", "coordinates": [8.54, 47.37]}, "properties": null}
            ]
        }))
        .expect("collection");

        assert_eq!(collection.features.len(), 1);
        assert_eq!(collection.extra.get("totalFeatures"), Some(&json!(1)));
        let feature = &collection.features[0];
        assert!(feature.properties.is_empty());
        assert_eq!(feature.point(), Some((8.54, 47.37)));
    }

    #[test]
    fn feature_properties_keep_backend_order() {
        let feature: Feature = serde_json::from_value(json!({
            "properties": {"zeta": 1, "alpha": 2, "name": "Schulhaus Hirschengraben"}
        }))
        .expect("feature");

        let keys: Vec<&str> = feature.properties.keys().map(String::as_str).collect();
        assert_eq!(keys, ["zeta", "alpha", "name"]);
        assert_eq!(
            feature.first_text(&["bezeichnung", "name"]),
            Some("Schulhaus Hirschengraben")
        );
        assert_eq!(feature.point(), None);
    }

    #[test]
    fn parking_occupancy_handles_unknown_capacity() {
        let lot = ParkingLot {
            free: 25,
            total: 100,
            ..ParkingLot::default()
        };
        assert_eq!(lot.occupancy_percent(), 75);

        let unknown = ParkingLot::default();
        assert_eq!(unknown.occupancy_percent(), 0);
    }

    #[test]
    fn sparql_empty_bindings_are_rows_not_errors() {
        let set: SparqlResultSet = serde_json::from_value(json!({
            "head": {"vars": ["year", "pop"]},
            "results": {"bindings": []}
        }))
        .expect("result set");
        assert!(set.is_empty());
        assert_eq!(set.variables(), ["year", "pop"]);
    }
}
