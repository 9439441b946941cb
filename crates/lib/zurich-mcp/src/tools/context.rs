use rmcp::{
    ErrorData,
    model::{CallToolResult, Content},
    schemars,
    tool,
    tool_router,
};
use serde::{Deserialize, Serialize};

use crate::ZurichMcp;

/// Payload listing the tools of this server grouped by backend.
#[derive(Debug, Clone, Serialize, Deserialize, schemars::JsonSchema)]
pub struct HelpCommands {
    pub catalog: Vec<String>,
    pub realtime: Vec<String>,
    pub geodata: Vec<String>,
    pub parliament: Vec<String>,
    pub tourism: Vec<String>,
    pub linked_data: Vec<String>,
}

fn entries(items: &[(&str, &str)]) -> Vec<String> {
    items
        .iter()
        .map(|(name, summary)| format!("{name} - {summary}"))
        .collect()
}

impl Default for HelpCommands {
    fn default() -> Self {
        Self {
            catalog: entries(&[
                ("zurich_search_datasets", "Full-text search over the open data catalog."),
                ("zurich_get_dataset", "Metadata, resources and download URLs of one dataset."),
                ("zurich_datastore_query", "Filtered rows of a datastore resource."),
                ("zurich_datastore_sql", "SQL SELECT over datastore resources."),
                ("zurich_list_categories", "Catalog groups, or the datasets of one group."),
                ("zurich_list_tags", "Tags matching a search term."),
                ("zurich_analyze_datasets", "Freshness and column structure of matching datasets."),
                ("zurich_catalog_stats", "Dataset count, groups and formats of the catalog."),
                ("zurich_find_school_data", "Datasets relevant to schools."),
            ]),
            realtime: entries(&[
                ("zurich_parking_live", "Live car park occupancy."),
                ("zurich_weather_live", "Hourly weather measurements."),
                ("zurich_air_quality", "Hourly air quality measurements."),
                ("zurich_water_weather", "Lake weather stations Tiefenbrunnen and Mythenquai."),
                ("zurich_pedestrian_traffic", "Hourly pedestrian counts on Bahnhofstrasse."),
                ("zurich_vbz_passengers", "Passenger counts per line and stop."),
            ]),
            geodata: entries(&[
                ("zurich_geo_layers", "Registered geoportal layers."),
                ("zurich_geo_features", "GeoJSON features of one layer with an optional CQL filter."),
            ]),
            parliament: entries(&[
                ("zurich_parliament_search", "Council business by title, year and department."),
                ("zurich_parliament_members", "Council members by name, party or commission."),
            ]),
            tourism: entries(&[
                ("zurich_tourism", "Tourism entries of one category with a text filter."),
                ("zurich_tourism_categories", "Categories of the tourism API."),
            ]),
            linked_data: entries(&[(
                "zurich_sparql",
                "SPARQL SELECT queries on the statistics endpoint.",
            )]),
        }
    }
}

#[tool_router(router = tool_router_context, vis = "pub")]
impl ZurichMcp {
    #[tool(description = "List the tools of this server grouped by data source.")]
    async fn help(&self) -> Result<CallToolResult, ErrorData> {
        Ok(CallToolResult::success(vec![Content::json(HelpCommands::default())?]))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn help_lists_every_data_tool() {
        let help = HelpCommands::default();
        let count = help.catalog.len()
            + help.realtime.len()
            + help.geodata.len()
            + help.parliament.len()
            + help.tourism.len()
            + help.linked_data.len();
        assert_eq!(count, 22);
        assert!(help.catalog[0].starts_with("zurich_search_datasets - "));
    }
}
