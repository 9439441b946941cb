use serde_json::{Map, Value};
use zurich_model::registry::resources;
use zurich_model::{DatastoreResult, ParkingFeed};

use super::{ControlError, OpenDataControlPlane};
use crate::adapters::QueryParams;

pub const MEASUREMENT_SORT: &str = "Datum desc";
pub const WATER_SORT: &str = "timestamp_utc desc";
pub const PEDESTRIAN_SORT: &str = "timestamp desc";

/// Filter on the hourly weather and air quality measurement tables.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MeasurementQuery {
    /// Value of the `Standort` column.
    pub station: Option<String>,
    /// Value of the `Parameter` column.
    pub parameter: Option<String>,
    pub limit: u32,
}

impl MeasurementQuery {
    #[must_use]
    pub fn new(limit: u32) -> Self {
        Self {
            limit,
            ..Self::default()
        }
    }

    #[must_use]
    pub fn with_station(mut self, station: Option<String>) -> Self {
        self.station = station;
        self
    }

    #[must_use]
    pub fn with_parameter(mut self, parameter: Option<String>) -> Self {
        self.parameter = parameter;
        self
    }

    /// JSON `filters` value, or `None` when neither column is filtered.
    #[must_use]
    pub fn filters(&self) -> Option<String> {
        let mut filters = Map::new();
        if let Some(station) = &self.station {
            filters.insert("Standort".to_string(), Value::String(station.clone()));
        }
        if let Some(parameter) = &self.parameter {
            filters.insert("Parameter".to_string(), Value::String(parameter.clone()));
        }
        (!filters.is_empty()).then(|| Value::Object(filters).to_string())
    }

    fn query_params(&self, resource_id: &str) -> QueryParams {
        QueryParams::new()
            .with("resource_id", resource_id)
            .with("sort", MEASUREMENT_SORT)
            .with("limit", self.limit)
            .with_opt("filters", self.filters())
    }
}

/// Lake weather stations of the water police.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WaterStation {
    Tiefenbrunnen,
    Mythenquai,
}

impl WaterStation {
    /// Any name containing `tiefen` selects Tiefenbrunnen; everything else
    /// falls back to Mythenquai.
    #[must_use]
    pub fn from_name(name: &str) -> Self {
        if name.to_lowercase().contains("tiefen") {
            Self::Tiefenbrunnen
        } else {
            Self::Mythenquai
        }
    }

    #[must_use]
    pub const fn resource_id(self) -> &'static str {
        match self {
            Self::Tiefenbrunnen => resources::WATER_TIEFENBRUNNEN,
            Self::Mythenquai => resources::WATER_MYTHENQUAI,
        }
    }

    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::Tiefenbrunnen => "Tiefenbrunnen",
            Self::Mythenquai => "Mythenquai",
        }
    }
}

#[derive(Debug, Clone)]
pub struct WaterReadings {
    pub station: WaterStation,
    pub result: DatastoreResult,
}

impl OpenDataControlPlane {
    /// Latest hourly weather measurements, newest first.
    ///
    /// # Errors
    /// Returns `ControlError::Backend` if the catalog request fails.
    pub async fn weather(&self, query: &MeasurementQuery) -> Result<DatastoreResult, ControlError> {
        self.datastore_search(query.query_params(resources::METEO)).await
    }

    /// Latest hourly air quality measurements, newest first.
    ///
    /// # Errors
    /// Returns `ControlError::Backend` if the catalog request fails.
    pub async fn air_quality(
        &self,
        query: &MeasurementQuery,
    ) -> Result<DatastoreResult, ControlError> {
        self.datastore_search(query.query_params(resources::AIR_QUALITY))
            .await
    }

    /// Latest readings of one lake weather station.
    ///
    /// # Errors
    /// Returns `ControlError::Backend` if the catalog request fails.
    pub async fn water_weather(
        &self,
        station: &str,
        limit: u32,
    ) -> Result<WaterReadings, ControlError> {
        let station = WaterStation::from_name(station);
        let params = QueryParams::new()
            .with("resource_id", station.resource_id())
            .with("sort", WATER_SORT)
            .with("limit", limit);
        let result = self.datastore_search(params).await?;
        Ok(WaterReadings { station, result })
    }

    /// Hourly pedestrian counts, newest first.
    ///
    /// # Errors
    /// Returns `ControlError::Backend` if the catalog request fails.
    pub async fn pedestrian_traffic(&self, limit: u32) -> Result<DatastoreResult, ControlError> {
        let params = QueryParams::new()
            .with("resource_id", resources::PEDESTRIANS)
            .with("sort", PEDESTRIAN_SORT)
            .with("limit", limit);
        self.datastore_search(params).await
    }

    /// Passenger counts of the public transport operator.
    ///
    /// # Errors
    /// Returns `ControlError::Backend` if the catalog request fails.
    pub async fn vbz_passengers(
        &self,
        query: Option<&str>,
        limit: u32,
    ) -> Result<DatastoreResult, ControlError> {
        let params = QueryParams::new()
            .with("resource_id", resources::VBZ_PASSENGERS)
            .with("limit", limit)
            .with_opt("q", query);
        self.datastore_search(params).await
    }

    /// Current occupancy of the city's car parks.
    ///
    /// # Errors
    /// Returns `ControlError::Backend` if the feed cannot be fetched or
    /// decoded.
    pub async fn parking(&self) -> Result<ParkingFeed, ControlError> {
        Ok(self
            .json
            .get(&self.endpoints.parking, &QueryParams::new())
            .await?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn filters_only_include_given_columns() {
        assert_eq!(MeasurementQuery::new(20).filters(), None);

        let query = MeasurementQuery::new(20).with_parameter(Some("T".to_string()));
        assert_eq!(query.filters().as_deref(), Some(r#"{"Parameter":"T"}"#));

        let query = query.with_station(Some("Zch_Stampfenbachstrasse".to_string()));
        let filters: Value =
            serde_json::from_str(&query.filters().expect("filters")).expect("json");
        assert_eq!(filters["Standort"], "Zch_Stampfenbachstrasse");
        assert_eq!(filters["Parameter"], "T");
    }

    #[test]
    fn measurement_params_sort_newest_first() {
        let params = MeasurementQuery::new(5).query_params(resources::METEO);
        assert_eq!(params.get("resource_id"), Some(resources::METEO));
        assert_eq!(params.get("sort"), Some("Datum desc"));
        assert_eq!(params.get("limit"), Some("5"));
        assert_eq!(params.get("filters"), None);
    }

    #[test]
    fn water_station_selection() {
        assert_eq!(WaterStation::from_name("Tiefenbrunnen"), WaterStation::Tiefenbrunnen);
        assert_eq!(WaterStation::from_name("TIEFEN"), WaterStation::Tiefenbrunnen);
        assert_eq!(WaterStation::from_name("mythenquai"), WaterStation::Mythenquai);
        assert_eq!(WaterStation::from_name("anything"), WaterStation::Mythenquai);
        assert_eq!(
            WaterStation::Mythenquai.resource_id(),
            resources::WATER_MYTHENQUAI
        );
    }
}
