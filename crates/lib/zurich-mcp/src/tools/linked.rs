use rmcp::{
    ErrorData,
    handler::server::wrapper::Parameters,
    model::CallToolResult,
    schemars,
    tool,
    tool_router,
};
use serde::{Deserialize, Serialize};
use zurich_core::format::ELLIPSIS;
use zurich_model::{SparqlResultSet, SparqlTerm};

use crate::markdown::truncate_chars;
use crate::{ZurichMcp, helpers};

const MAX_ROWS: usize = 100;
const MAX_CELL_CHARS: usize = 100;
const MAX_LOCAL_NAME_CHARS: usize = 80;

/// Parameters for a linked data query.
#[derive(Debug, Clone, Serialize, Deserialize, schemars::JsonSchema)]
pub struct SparqlParams {
    /// SPARQL SELECT query, e.g. `SELECT * WHERE { ?s ?p ?o } LIMIT 10`.
    /// Statistics live in `GRAPH <https://linked.opendata.swiss/graph/zh/statistics>`.
    pub query: String,
}

#[tool_router(router = tool_router_linked, vis = "pub")]
impl ZurichMcp {
    #[tool(description = "Run a SPARQL SELECT query on the linked data endpoint of the City of Zurich.")]
    async fn zurich_sparql(
        &self,
        Parameters(params): Parameters<SparqlParams>,
    ) -> Result<CallToolResult, ErrorData> {
        let query = helpers::required(&params.query, "query", 10)?;
        let query = helpers::at_most(query, "query", 5000)?;
        let result = self.control.sparql(query).await;
        let endpoint = &self.control.endpoints().sparql;
        Ok(helpers::respond(result, "SPARQL-Abfrage", |result| {
            render_results(&result, endpoint)
        }))
    }
}

/// Local name of URIs; long values are cut with an ellipsis.
fn term_text(term: Option<&SparqlTerm>) -> String {
    let Some(term) = term else {
        return String::new();
    };
    let mut value = term.value.as_str();
    if term.kind == "uri" {
        if let Some((_, local)) = value.rsplit_once('/') {
            if local.chars().count() < MAX_LOCAL_NAME_CHARS {
                value = local;
            }
        }
    }
    if value.chars().count() > MAX_CELL_CHARS {
        let kept = MAX_CELL_CHARS - ELLIPSIS.len();
        return format!("{}{ELLIPSIS}", truncate_chars(value, kept));
    }
    value.to_string()
}

fn render_results(result: &SparqlResultSet, endpoint: &str) -> String {
    let rows = result.rows();
    if rows.is_empty() {
        return "SPARQL-Abfrage lieferte keine Ergebnisse.".to_string();
    }
    let variables = result.variables();
    let mut lines = vec![
        "## SPARQL-Ergebnis".to_string(),
        format!(
            "**{} Zeilen**, Variablen: {}\n",
            rows.len(),
            variables.join(", ")
        ),
        format!("| {} |", variables.join(" | ")),
        format!("| {} |", vec!["---"; variables.len()].join(" | ")),
    ];
    for row in rows.iter().take(MAX_ROWS) {
        let cells: Vec<String> = variables
            .iter()
            .map(|variable| term_text(row.get(variable)))
            .collect();
        lines.push(format!("| {} |", cells.join(" | ")));
    }
    if rows.len() > MAX_ROWS {
        lines.push(format!("\n*Zeige {MAX_ROWS} von {} Zeilen*", rows.len()));
    }
    lines.push(format!("\n*Endpoint: {endpoint}*"));
    lines.join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use zurich_core::OpenDataControlPlane;

    fn term(kind: &str, value: &str) -> SparqlTerm {
        SparqlTerm {
            kind: kind.to_string(),
            value: value.to_string(),
            datatype: None,
            lang: None,
        }
    }

    #[test]
    fn uris_are_shortened_to_local_names() {
        assert_eq!(
            term_text(Some(&term("uri", "https://ld.stadt-zuerich.ch/statistics/code/R30000"))),
            "R30000"
        );
        assert_eq!(term_text(Some(&term("literal", "a/b"))), "a/b");
        assert_eq!(term_text(None), "");
    }

    #[test]
    fn long_values_are_cut() {
        let long = "x".repeat(150);
        let text = term_text(Some(&term("literal", &long)));
        assert_eq!(text.chars().count(), 100);
        assert!(text.ends_with("..."));
    }

    #[test]
    fn table_has_one_row_per_binding() {
        let result: SparqlResultSet = serde_json::from_value(json!({
            "head": {"vars": ["jahr", "wert"]},
            "results": {"bindings": [
                {"jahr": {"type": "literal", "value": "2024"}, "wert": {"type": "literal", "value": "443037"}},
                {"jahr": {"type": "literal", "value": "2023"}}
            ]}
        }))
        .expect("result");
        let text = render_results(&result, "https://ld.stadt-zuerich.ch/query");
        assert!(text.contains("**2 Zeilen**, Variablen: jahr, wert\n"));
        assert!(text.contains("| jahr | wert |\n| --- | --- |\n| 2024 | 443037 |\n| 2023 |  |"));
        assert!(text.ends_with("*Endpoint: https://ld.stadt-zuerich.ch/query*"));
    }

    #[tokio::test]
    async fn update_queries_are_rejected_by_the_tool() {
        let server = ZurichMcp::new(OpenDataControlPlane::default());
        let result = server
            .zurich_sparql(Parameters(SparqlParams {
                query: "INSERT DATA { <a> <b> <c> }".to_string(),
            }))
            .await
            .expect("tool result");
        assert_eq!(result.is_error, Some(true));
    }

    #[tokio::test]
    async fn short_queries_are_invalid_params() {
        let server = ZurichMcp::new(OpenDataControlPlane::default());
        assert!(
            server
                .zurich_sparql(Parameters(SparqlParams {
                    query: "SELECT".to_string(),
                }))
                .await
                .is_err()
        );
    }
}
