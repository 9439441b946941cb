use rmcp::{
    ErrorData,
    handler::server::wrapper::Parameters,
    model::CallToolResult,
    schemars,
    tool,
    tool_router,
};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use zurich_core::control::{MeasurementQuery, WaterReadings};
use zurich_model::registry::resources;
use zurich_model::{DatastoreResult, JsonObject, ParkingFeed};

use crate::markdown::{cell, field_names, json_block, truncate_chars};
use crate::{ZurichMcp, helpers};

const WEATHER_TIMESTAMPS: usize = 5;
const AIR_TIMESTAMPS: usize = 3;
const PROVISIONAL: &str = "provisorisch";

/// Parameters for the weather and air quality measurements.
#[derive(Debug, Clone, Serialize, Deserialize, schemars::JsonSchema)]
pub struct MeasurementParams {
    /// Station, e.g. `Zch_Stampfenbachstrasse`, `Zch_Schimmelstrasse`. All stations when empty.
    pub station: Option<String>,
    /// Parameter, e.g. `T`, `Hr`, `p`, `RainDur` for weather or `NO2`, `O3`, `PM10` for air quality.
    pub parameter: Option<String>,
    /// Number of measurements, 1 to 100.
    pub limit: Option<u32>,
}

/// Parameters for the lake weather stations.
#[derive(Debug, Clone, Serialize, Deserialize, schemars::JsonSchema)]
pub struct WaterWeatherParams {
    /// `tiefenbrunnen` (default) or `mythenquai`.
    pub station: Option<String>,
    /// Number of readings, 1 to 50 (default 6).
    pub limit: Option<u32>,
}

/// Parameters for the pedestrian counts.
#[derive(Debug, Clone, Serialize, Deserialize, schemars::JsonSchema)]
pub struct PedestrianParams {
    /// Number of hourly values, 1 to 168 (default 24).
    pub limit: Option<u32>,
}

/// Parameters for the passenger counts.
#[derive(Debug, Clone, Serialize, Deserialize, schemars::JsonSchema)]
pub struct VbzPassengersParams {
    /// Full-text search over all fields, e.g. `Paradeplatz`.
    pub query: Option<String>,
    /// Number of rows, 1 to 100 (default 20).
    pub limit: Option<u32>,
}

#[tool_router(router = tool_router_realtime, vis = "pub")]
impl ZurichMcp {
    #[tool(description = "Live occupancy of the car parks in Zurich (free spaces, capacity, status).")]
    async fn zurich_parking_live(&self) -> Result<CallToolResult, ErrorData> {
        let result = self.control.parking().await;
        Ok(helpers::respond(result, "Parkplatz-Daten", render_parking))
    }

    #[tool(description = "Hourly weather measurements of the municipal monitoring stations.")]
    async fn zurich_weather_live(
        &self,
        Parameters(params): Parameters<MeasurementParams>,
    ) -> Result<CallToolResult, ErrorData> {
        let query = measurement_query(params, 20);
        let result = self.control.weather(&query).await;
        Ok(helpers::respond(result, "Wetterdaten", |result| {
            render_weather(&result)
        }))
    }

    #[tool(description = "Hourly air quality measurements (NO2, O3, PM10, PM2.5 and more).")]
    async fn zurich_air_quality(
        &self,
        Parameters(params): Parameters<MeasurementParams>,
    ) -> Result<CallToolResult, ErrorData> {
        let query = measurement_query(params, 30);
        let result = self.control.air_quality(&query).await;
        Ok(helpers::respond(result, "Luftqualität", |result| {
            render_air_quality(&result)
        }))
    }

    #[tool(description = "Lake weather of the water police stations Tiefenbrunnen and Mythenquai.")]
    async fn zurich_water_weather(
        &self,
        Parameters(params): Parameters<WaterWeatherParams>,
    ) -> Result<CallToolResult, ErrorData> {
        let station = helpers::optional(params.station);
        let limit = helpers::clamp(params.limit, 6, 1, 50);
        let result = self
            .control
            .water_weather(station.as_deref().unwrap_or("tiefenbrunnen"), limit)
            .await;
        Ok(helpers::respond(result, "Wasserwetter", |readings| {
            render_water(&readings)
        }))
    }

    #[tool(description = "Hourly pedestrian counts on Bahnhofstrasse.")]
    async fn zurich_pedestrian_traffic(
        &self,
        Parameters(params): Parameters<PedestrianParams>,
    ) -> Result<CallToolResult, ErrorData> {
        let limit = helpers::clamp(params.limit, 24, 1, 168);
        let result = self.control.pedestrian_traffic(limit).await;
        Ok(helpers::respond(result, "Passantenfrequenzen", |result| {
            render_pedestrians(&result)
        }))
    }

    #[tool(description = "Yearly passenger counts of the public transport operator per line and stop.")]
    async fn zurich_vbz_passengers(
        &self,
        Parameters(params): Parameters<VbzPassengersParams>,
    ) -> Result<CallToolResult, ErrorData> {
        let query = helpers::optional(params.query);
        let limit = helpers::clamp(params.limit, 20, 1, 100);
        let result = self.control.vbz_passengers(query.as_deref(), limit).await;
        Ok(helpers::respond(result, "VBZ-Fahrgastzahlen", |result| {
            render_passengers(&result, limit)
        }))
    }
}

fn measurement_query(params: MeasurementParams, default_limit: u32) -> MeasurementQuery {
    MeasurementQuery::new(helpers::clamp(params.limit, default_limit, 1, 100))
        .with_station(helpers::optional(params.station))
        .with_parameter(helpers::optional(params.parameter))
}

fn render_parking(feed: ParkingFeed) -> String {
    let mut lots = feed.lots;
    lots.sort_by(|a, b| a.name.cmp(&b.name));
    let mut lines = vec![
        "## Parkplatzbelegung Zürich".to_string(),
        format!(
            "*Stand: {}*\n",
            feed.last_updated.as_deref().unwrap_or("unbekannt")
        ),
        "| Parkhaus | Frei | Total | Belegt % | Status |".to_string(),
        "|----------|------|-------|----------|--------|".to_string(),
    ];
    for lot in &lots {
        let icon = if lot.is_open() { "🟢" } else { "🔴" };
        lines.push(format!(
            "| {} | {} | {} | {}% | {icon} {} |",
            lot.name.as_deref().unwrap_or("?"),
            lot.free,
            lot.total,
            lot.occupancy_percent(),
            lot.state.as_deref().unwrap_or("?")
        ));
    }
    lines.push(format!("\n**Gesamt**: {} Parkhäuser", lots.len()));
    lines.join("\n")
}

/// Records grouped by the text of `key`, in order of first appearance.
fn group_by<'a>(records: &'a [JsonObject], key: &str) -> Vec<(String, Vec<&'a JsonObject>)> {
    let mut groups: Vec<(String, Vec<&JsonObject>)> = Vec::new();
    for record in records {
        let label = cell(record.get(key));
        match groups.iter_mut().find(|(existing, _)| *existing == label) {
            Some((_, members)) => members.push(record),
            None => groups.push((label, vec![record])),
        }
    }
    groups
}

fn total_label(result: &DatastoreResult) -> String {
    result
        .total
        .map_or_else(|| "?".to_string(), |total| total.to_string())
}

fn weather_parameter(code: &str) -> (&str, &str) {
    match code {
        "T" => ("🌡️ Temperatur", "°C"),
        "Hr" => ("💧 Luftfeuchte", "%"),
        "p" => ("📊 Luftdruck", "hPa"),
        "RainDur" => ("🌧️ Regendauer", "min"),
        other => (other, ""),
    }
}

fn render_weather(result: &DatastoreResult) -> String {
    if result.records.is_empty() {
        return "Keine Wetterdaten gefunden. Standort/Parameter prüfen.".to_string();
    }
    let mut lines = vec![
        "## 🌤️ Aktuelle Wetterdaten Zürich\n".to_string(),
        format!("*Quelle: UGZ Messnetz – {} Messwerte total*\n", total_label(result)),
    ];
    for (timestamp, measurements) in group_by(&result.records, "Datum")
        .into_iter()
        .take(WEATHER_TIMESTAMPS)
    {
        lines.push(format!("### {timestamp}"));
        for measurement in measurements {
            let code = cell(measurement.get("Parameter"));
            let (label, unit) = weather_parameter(&code);
            let status = match measurement.get("Status").and_then(Value::as_str) {
                Some(status) if !status.is_empty() && status != PROVISIONAL => {
                    format!(" ⚠️ {status}")
                }
                _ => String::new(),
            };
            lines.push(format!(
                "- **{}** – {label}: **{} {unit}**{status}",
                cell(measurement.get("Standort")),
                cell(measurement.get("Wert"))
            ));
        }
        lines.push(String::new());
    }
    lines.push("---".to_string());
    lines.push("*Daten: data.stadt-zuerich.ch – stündlich aktualisiert*".to_string());
    lines.join("\n")
}

fn render_air_quality(result: &DatastoreResult) -> String {
    if result.records.is_empty() {
        return "Keine Luftqualitätsdaten gefunden.".to_string();
    }
    let mut lines = vec![
        "## 🌬️ Luftqualität Zürich\n".to_string(),
        format!("*Quelle: UGZ Messnetz – {} Messwerte total*\n", total_label(result)),
    ];
    for (timestamp, measurements) in group_by(&result.records, "Datum")
        .into_iter()
        .take(AIR_TIMESTAMPS)
    {
        lines.push(format!("### {timestamp}"));
        let mut stations: Vec<(String, Vec<String>)> = Vec::new();
        for measurement in measurements {
            let station = cell(measurement.get("Standort"));
            let value = match measurement.get("Wert") {
                None | Some(Value::Null) => None,
                Some(Value::String(text)) if text.is_empty() => None,
                value => Some(format!(
                    "{}={} {}",
                    cell(measurement.get("Parameter")),
                    cell(value),
                    measurement
                        .get("Einheit")
                        .and_then(Value::as_str)
                        .unwrap_or_default()
                )),
            };
            let index = match stations.iter().position(|(name, _)| *name == station) {
                Some(index) => index,
                None => {
                    stations.push((station, Vec::new()));
                    stations.len() - 1
                }
            };
            stations[index].1.extend(value);
        }
        for (station, values) in stations {
            if !values.is_empty() {
                lines.push(format!("- **{station}**: {}", values.join(", ")));
            }
        }
        lines.push(String::new());
    }
    lines.push("---".to_string());
    lines.push(
        "*WHO-Grenzwerte (24h): PM2.5 ≤15 µg/m³, PM10 ≤45 µg/m³, NO₂ ≤25 µg/m³*".to_string(),
    );
    lines.push("*Daten: data.stadt-zuerich.ch – stündlich aktualisiert*".to_string());
    lines.join("\n")
}

fn reading(record: &JsonObject, key: &str, unit: &str) -> String {
    match record.get(key) {
        None | Some(Value::Null) => "–".to_string(),
        value => format!("{} {unit}", cell(value)).trim().to_string(),
    }
}

fn render_water(readings: &WaterReadings) -> String {
    let station = readings.station.label();
    if readings.result.records.is_empty() {
        return format!("Keine Daten für Station {station} gefunden.");
    }
    let mut lines = vec![
        format!("## 🌊 Zürichsee Wetterstation {station}\n"),
        "*Wasserschutzpolizei Zürich – alle 10 Min. aktualisiert*\n".to_string(),
    ];
    for record in &readings.result.records {
        let timestamp = record
            .get("timestamp_cet")
            .or_else(|| record.get("timestamp_utc"));
        lines.push(format!("### {}", cell(timestamp)));
        lines.push(format!(
            "- 🌊 **Wassertemperatur**: {}",
            reading(record, "water_temperature", "°C")
        ));
        lines.push(format!(
            "- 🌡️ **Lufttemperatur**: {}",
            reading(record, "air_temperature", "°C")
        ));
        lines.push(format!(
            "- 📊 **Wasserstand**: {}",
            reading(record, "water_level", "m ü.M.")
        ));
        lines.push(format!(
            "- 💨 **Wind**: {} (Böen: {})",
            reading(record, "wind_speed_avg_10min", "m/s"),
            reading(record, "wind_gust_max_10min", "m/s")
        ));
        lines.push(format!(
            "- 🧭 **Windrichtung**: {}",
            reading(record, "wind_direction", "°")
        ));
        lines.push(format!("- 💧 **Luftfeuchte**: {}", reading(record, "humidity", "%")));
        lines.push(format!(
            "- 🌧️ **Niederschlag**: {}",
            reading(record, "precipitation", "mm")
        ));
        lines.push(format!(
            "- 📏 **Luftdruck**: {}",
            reading(record, "barometric_pressure_qfe", "hPa")
        ));
        lines.push(format!("- 🌡️ **Taupunkt**: {}", reading(record, "dew_point", "°C")));
        lines.push(format!(
            "- ☀️ **Globalstrahlung**: {}",
            reading(record, "global_radiation", "W/m²")
        ));
        lines.push(String::new());
    }
    lines.push("---".to_string());
    lines.push("*Daten: data.stadt-zuerich.ch – 10-Min.-Intervall*".to_string());
    lines.join("\n")
}

fn render_pedestrians(result: &DatastoreResult) -> String {
    if result.records.is_empty() {
        return "Keine Passantenfrequenz-Daten gefunden.".to_string();
    }
    let mut lines = vec![
        "## 🚶 Passantenfrequenzen Bahnhofstrasse Zürich\n".to_string(),
        "*hystreet.com Sensoren – stündlich aktualisiert*\n".to_string(),
        "| Zeitpunkt | Standort | Passanten | Temp. | Wetter |".to_string(),
        "| --- | --- | ---: | ---: | --- |".to_string(),
    ];
    for record in &result.records {
        let timestamp = cell(record.get("timestamp"));
        lines.push(format!(
            "| {} | {} | {} | {}°C | {} |",
            truncate_chars(&timestamp, 16),
            cell(record.get("location_name")),
            cell(record.get("pedestrians_count")),
            cell(record.get("temperature")),
            cell(record.get("weather_condition"))
        ));
    }
    lines.push(String::new());
    lines.push(format!("*{} Messwerte total*", total_label(result)));
    lines.push("*Daten: data.stadt-zuerich.ch*".to_string());
    lines.join("\n")
}

fn render_passengers(result: &DatastoreResult, limit: u32) -> String {
    if result.records.is_empty() {
        return "Keine VBZ-Fahrgastzahlen gefunden.".to_string();
    }
    let mut lines = vec![
        "## 🚊 VBZ Fahrgastzahlen\n".to_string(),
        format!("*Verkehrsbetriebe Zürich – {} Einträge*\n", total_label(result)),
        format!("**Felder**: {}\n", field_names(result).join(", ")),
        json_block(&result.records),
    ];
    if let Some(total) = result.total.filter(|total| *total > u64::from(limit)) {
        lines.push(format!(
            "\n*→ {} weitere Einträge verfügbar*",
            total - u64::from(limit)
        ));
    }
    lines.push("\n---".to_string());
    lines.push(format!(
        "*Tipp: Für Haltestellendetails `zurich_datastore_query` mit Resource `{}` verwenden.*",
        resources::VBZ_STOPS
    ));
    lines.push(format!("*Für Liniendetails: Resource `{}`*", resources::VBZ_LINES));
    lines.join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use zurich_core::control::WaterStation;
    use zurich_model::ParkingLot;

    fn records(values: Value) -> Vec<JsonObject> {
        serde_json::from_value(values).expect("records")
    }

    #[test]
    fn parking_lots_are_sorted_by_name() {
        let feed = ParkingFeed {
            last_updated: Some("2026-03-01T10:00:00".to_string()),
            lots: vec![
                ParkingLot {
                    name: Some("Urania".to_string()),
                    state: Some("nodata".to_string()),
                    ..ParkingLot::default()
                },
                ParkingLot {
                    name: Some("Jelmoli".to_string()),
                    free: 50,
                    total: 200,
                    state: Some("open".to_string()),
                    ..ParkingLot::default()
                },
            ],
        };
        let text = render_parking(feed);
        let jelmoli = text.find("| Jelmoli | 50 | 200 | 75% | 🟢 open |").expect("jelmoli");
        let urania = text.find("| Urania | 0 | 0 | 0% | 🔴 nodata |").expect("urania");
        assert!(jelmoli < urania);
        assert!(text.ends_with("**Gesamt**: 2 Parkhäuser"));
    }

    #[test]
    fn weather_groups_by_timestamp() {
        let result = DatastoreResult {
            total: Some(3),
            records: records(json!([
                {"Datum": "2026-03-01T10:00", "Standort": "Zch_Kaserne", "Parameter": "T", "Wert": 4.5, "Status": "provisorisch"},
                {"Datum": "2026-03-01T10:00", "Standort": "Zch_Kaserne", "Parameter": "Hr", "Wert": 80, "Status": "bereinigt"},
                {"Datum": "2026-03-01T09:00", "Standort": "Zch_Kaserne", "Parameter": "X", "Wert": null}
            ])),
            fields: Vec::new(),
        };
        let text = render_weather(&result);
        assert!(text.contains("### 2026-03-01T10:00\n- **Zch_Kaserne** – 🌡️ Temperatur: **4.5 °C**\n- **Zch_Kaserne** – 💧 Luftfeuchte: **80 %** ⚠️ bereinigt"));
        assert!(text.contains("### 2026-03-01T09:00\n- **Zch_Kaserne** – X: **? **"));
    }

    #[test]
    fn air_quality_skips_missing_values() {
        let result = DatastoreResult {
            total: Some(2),
            records: records(json!([
                {"Datum": "t1", "Standort": "Zch_Kaserne", "Parameter": "NO2", "Wert": 21.3, "Einheit": "µg/m3"},
                {"Datum": "t1", "Standort": "Zch_Kaserne", "Parameter": "O3", "Wert": null, "Einheit": "µg/m3"},
                {"Datum": "t1", "Standort": "Zch_Heubeeribüel", "Parameter": "O3", "Wert": "", "Einheit": "µg/m3"}
            ])),
            fields: Vec::new(),
        };
        let text = render_air_quality(&result);
        assert!(text.contains("- **Zch_Kaserne**: NO2=21.3 µg/m3\n"));
        assert!(!text.contains("Heubeeribüel"));
    }

    #[test]
    fn water_readings_use_dash_for_missing() {
        let readings = WaterReadings {
            station: WaterStation::Mythenquai,
            result: DatastoreResult {
                records: records(json!([
                    {"timestamp_utc": "2026-03-01T09:50:00", "water_temperature": 6.1}
                ])),
                ..DatastoreResult::default()
            },
        };
        let text = render_water(&readings);
        assert!(text.starts_with("## 🌊 Zürichsee Wetterstation Mythenquai"));
        assert!(text.contains("### 2026-03-01T09:50:00"));
        assert!(text.contains("- 🌊 **Wassertemperatur**: 6.1 °C"));
        assert!(text.contains("- 🌡️ **Lufttemperatur**: –"));
    }

    #[test]
    fn pedestrian_timestamps_are_shortened() {
        let result = DatastoreResult {
            total: Some(1),
            records: records(json!([{
                "timestamp": "2026-03-01T10:00:00+01:00",
                "location_name": "Bahnhofstrasse (Mitte)",
                "pedestrians_count": 1432,
                "temperature": 5,
                "weather_condition": "cloudy"
            }])),
            fields: Vec::new(),
        };
        let text = render_pedestrians(&result);
        assert!(text.contains("| 2026-03-01T10:00 | Bahnhofstrasse (Mitte) | 1432 | 5°C | cloudy |"));
    }

    #[test]
    fn passengers_report_remaining_rows() {
        let result = DatastoreResult {
            total: Some(50),
            records: records(json!([{"Linie": "4"}])),
            fields: Vec::new(),
        };
        let text = render_passengers(&result, 20);
        assert!(text.contains("*→ 30 weitere Einträge verfügbar*"));
        assert!(text.contains(resources::VBZ_STOPS));
    }
}
