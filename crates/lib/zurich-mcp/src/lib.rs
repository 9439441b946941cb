//! MCP server for the open data of the City of Zurich.
//!
//! This crate wires the open data control plane into rmcp tool handlers and
//! renders every result as Markdown for the calling model.

mod helpers;
mod markdown;
mod tools;
pub mod server;

use std::sync::Arc;

use rmcp::{
    ErrorData,
    ServerHandler,
    handler::server::tool::ToolRouter,
    tool,
    tool_handler,
    tool_router,
};
use rmcp::model::{CallToolResult, Content, ServerCapabilities, ServerInfo};
use zurich_core::OpenDataControlPlane;

const SERVER_INSTRUCTIONS: &str = r"Zugriff auf die offenen Daten der Stadt Zürich.

Datenquellen:
- Open-Data-Katalog (900+ Datensätze): `zurich_search_datasets`, `zurich_get_dataset`,
  `zurich_list_categories`, `zurich_list_tags`, `zurich_catalog_stats`,
  `zurich_analyze_datasets`, `zurich_find_school_data`.
- Tabellendaten im DataStore: `zurich_datastore_query`, `zurich_datastore_sql`.
  Die `resource_id` steht in den Ressourcen von `zurich_get_dataset`.
- Echtzeit: `zurich_parking_live`, `zurich_weather_live`, `zurich_air_quality`,
  `zurich_water_weather`, `zurich_pedestrian_traffic`, `zurich_vbz_passengers`.
- Geoportal (WFS/GeoJSON): `zurich_geo_layers`, dann `zurich_geo_features`.
- Gemeinderat: `zurich_parliament_search`, `zurich_parliament_members`.
- Zürich Tourismus: `zurich_tourism_categories`, `zurich_tourism`.
- Linked Data (Statistik): `zurich_sparql`, nur SELECT-Abfragen.

Hinweise:
- Alle Antworten sind Markdown; Fehler werden als Fehlermeldung mit Kontext geliefert.
- Zahlenparameter werden auf die zulässigen Bereiche begrenzt.
- `help` listet alle Tools, `health` liefert `ok`.";

/// MCP server wrapper around the open data control plane and tool routers.
#[derive(Clone)]
pub struct ZurichMcp {
    tool_router: ToolRouter<Self>,
    control: Arc<OpenDataControlPlane>,
}

impl ZurichMcp {
    /// Creates a new server using a control plane by value.
    #[must_use]
    pub fn new(control: OpenDataControlPlane) -> Self {
        Self::with_control(Arc::new(control))
    }

    /// Creates a new server using a shared control plane handle.
    #[must_use]
    pub fn with_control(control: Arc<OpenDataControlPlane>) -> Self {
        let tool_router = Self::tool_router_core()
            + Self::tool_router_catalog()
            + Self::tool_router_realtime()
            + Self::tool_router_geo()
            + Self::tool_router_parliament()
            + Self::tool_router_tourism()
            + Self::tool_router_linked()
            + Self::tool_router_context();
        Self {
            tool_router,
            control,
        }
    }

    /// Names of all registered tools.
    #[must_use]
    pub fn tool_names(&self) -> Vec<String> {
        let mut names: Vec<String> = self
            .tool_router
            .list_all()
            .into_iter()
            .map(|tool| tool.name.to_string())
            .collect();
        names.sort();
        names
    }
}

#[tool_router(router = tool_router_core, vis = "pub")]
impl ZurichMcp {
    #[tool(description = "Health check. Returns 'ok'.")]
    async fn health(&self) -> Result<CallToolResult, ErrorData> {
        Ok(CallToolResult::success(vec![Content::text("ok")]))
    }
}

#[tool_handler]
impl ServerHandler for ZurichMcp {
    fn get_info(&self) -> ServerInfo {
        ServerInfo {
            instructions: Some(SERVER_INSTRUCTIONS.to_string()),
            capabilities: ServerCapabilities::builder()
                .enable_tools()
                .build(),
            ..Default::default()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn every_tool_is_routed() {
        let server = ZurichMcp::new(OpenDataControlPlane::default());
        let names = server.tool_names();
        assert_eq!(names.len(), 24);
        for name in ["health", "help", "zurich_sparql", "zurich_tourism_categories"] {
            assert!(names.iter().any(|known| known == name), "missing {name}");
        }
        assert!(
            names
                .iter()
                .filter(|name| !matches!(name.as_str(), "health" | "help"))
                .all(|name| name.starts_with("zurich_"))
        );
    }

    #[test]
    fn info_advertises_tools() {
        let info = ZurichMcp::new(OpenDataControlPlane::default()).get_info();
        assert!(info.capabilities.tools.is_some());
        assert!(info.instructions.is_some_and(|text| text.contains("zurich_geo_layers")));
    }
}
