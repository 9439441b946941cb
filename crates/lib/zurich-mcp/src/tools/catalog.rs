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
use zurich_core::control::{
    CatalogStats, DatasetAnalysis, DatasetDetails, DatasetSearch, DatastoreQuery, SchoolData,
};
use zurich_core::format::summarize_dataset;
use zurich_model::registry::CATALOG_GROUPS;
use zurich_model::{CatalogGroup, DatastoreResult, FacetItem, PackageSearch};

use crate::markdown::{dataset_summary, field_names, json_block, resource_line};
use crate::{ZurichMcp, helpers};

const MAX_LISTED_FIELDS: usize = 15;
const MAX_OTHER_SCHOOL_DATASETS: usize = 15;

/// Parameters for a full-text dataset search.
#[derive(Debug, Clone, Serialize, Deserialize, schemars::JsonSchema)]
pub struct SearchDatasetsParams {
    /// Search terms, e.g. `Schule`, `Verkehr`. Solr syntax (AND, OR, NOT, `*`, `~`) is supported.
    pub query: String,
    /// Number of results, 1 to 50 (default 10).
    pub rows: Option<u32>,
    /// Offset for paging (default 0).
    pub offset: Option<u32>,
    /// Sort order, e.g. `metadata_modified desc`, `title asc`, `score desc`.
    pub sort: Option<String>,
    /// Catalog group to filter on. Groups:
    /// `arbeit-und-erwerb`, `basiskarten`, `bauen-und-wohnen`, `bevolkerung`,
    /// `bildung`, `energie`, `finanzen`, `freizeit`, `gesundheit`, `kriminalitat`,
    /// `kultur`, `mobilitat`, `politik`, `preise`, `soziales`, `tourismus`,
    /// `umwelt`, `verwaltung`, `volkswirtschaft`.
    pub filter_group: Option<String>,
}

/// Parameters for dataset details.
#[derive(Debug, Clone, Serialize, Deserialize, schemars::JsonSchema)]
pub struct GetDatasetParams {
    /// Dataset id or name, e.g. `geo_schulanlagen`.
    pub dataset_id: String,
}

/// Parameters for a datastore read.
#[derive(Debug, Clone, Serialize, Deserialize, schemars::JsonSchema)]
pub struct DatastoreQueryParams {
    /// Resource id (UUID) of a datastore-backed resource.
    pub resource_id: String,
    /// JSON object of column filters, e.g. `{"Quartier": "Wiedikon"}`.
    pub filters: Option<String>,
    /// Full-text search within the resource.
    pub query: Option<String>,
    /// Sort order, e.g. `Jahr desc`.
    pub sort: Option<String>,
    /// Number of rows, 1 to 100 (default 20).
    pub limit: Option<u32>,
    /// Offset for paging (default 0).
    pub offset: Option<u32>,
}

/// Parameters for a datastore SQL statement.
#[derive(Debug, Clone, Serialize, Deserialize, schemars::JsonSchema)]
pub struct DatastoreSqlParams {
    /// SQL with quoted table names, e.g. `SELECT * FROM "<resource-id>" LIMIT 10`.
    pub sql: String,
}

/// Parameters for listing catalog groups.
#[derive(Debug, Clone, Serialize, Deserialize, schemars::JsonSchema)]
pub struct ListCategoriesParams {
    /// Group id to show in detail, lists all groups when empty. Groups:
    /// `arbeit-und-erwerb`, `basiskarten`, `bauen-und-wohnen`, `bevolkerung`,
    /// `bildung`, `energie`, `finanzen`, `freizeit`, `gesundheit`, `kriminalitat`,
    /// `kultur`, `mobilitat`, `politik`, `preise`, `soziales`, `tourismus`,
    /// `umwelt`, `verwaltung`, `volkswirtschaft`.
    pub group_id: Option<String>,
}

/// Parameters for the tag search.
#[derive(Debug, Clone, Serialize, Deserialize, schemars::JsonSchema)]
pub struct ListTagsParams {
    /// Part of a tag name, e.g. `schul`.
    pub query: Option<String>,
    /// Maximum number of tags, 1 to 100 (default 30).
    pub limit: Option<u32>,
}

/// Parameters for the dataset analysis.
#[derive(Debug, Clone, Serialize, Deserialize, schemars::JsonSchema)]
pub struct AnalyzeDatasetsParams {
    /// Search terms, e.g. `Wohnen`.
    pub query: String,
    /// Datasets to analyze, 1 to 20 (default 5).
    pub max_datasets: Option<u32>,
    /// Include datastore columns (default true).
    pub include_structure: Option<bool>,
    /// Include modification date and update interval (default true).
    pub include_freshness: Option<bool>,
}

/// Parameters for the school data search.
#[derive(Debug, Clone, Serialize, Deserialize, schemars::JsonSchema)]
pub struct FindSchoolDataParams {
    /// Specific topic, e.g. `Musikschule`. Searches all school topics when empty.
    pub topic: Option<String>,
}

#[tool_router(router = tool_router_catalog, vis = "pub")]
impl ZurichMcp {
    #[tool(description = "Search the open data catalog of the City of Zurich (900+ datasets).")]
    async fn zurich_search_datasets(
        &self,
        Parameters(params): Parameters<SearchDatasetsParams>,
    ) -> Result<CallToolResult, ErrorData> {
        let query = helpers::required(&params.query, "query", 1)?;
        let query = helpers::at_most(query, "query", 500)?;
        let search = DatasetSearch::new(query)
            .with_rows(helpers::clamp(params.rows, 10, 1, 50))
            .with_offset(params.offset.unwrap_or(0))
            .with_sort(helpers::optional(params.sort))
            .with_group(helpers::optional(params.filter_group));
        let result = self.control.search_datasets(&search).await;
        let site = self.control.catalog_site();
        Ok(helpers::respond(result, "Datensatzsuche", |result| {
            render_search(&search, &result, site)
        }))
    }

    #[tool(description = "Fetch full metadata, resources and download URLs of one dataset.")]
    async fn zurich_get_dataset(
        &self,
        Parameters(params): Parameters<GetDatasetParams>,
    ) -> Result<CallToolResult, ErrorData> {
        let id = helpers::required(&params.dataset_id, "dataset_id", 1)?;
        let result = self.control.get_dataset(id).await;
        Ok(helpers::respond(result, "Datensatz-Details", |details| {
            render_details(&details)
        }))
    }

    #[tool(description = "Query tabular data of a datastore resource with filters, search and sorting.")]
    async fn zurich_datastore_query(
        &self,
        Parameters(params): Parameters<DatastoreQueryParams>,
    ) -> Result<CallToolResult, ErrorData> {
        let resource_id = helpers::required(&params.resource_id, "resource_id", 1)?;
        let query = DatastoreQuery::new(resource_id)
            .with_filters(helpers::optional(params.filters))
            .with_query(helpers::optional(params.query))
            .with_sort(helpers::optional(params.sort))
            .with_limit(helpers::clamp(params.limit, 20, 1, 100))
            .with_offset(params.offset.unwrap_or(0));
        let result = self.control.datastore_query(&query).await;
        Ok(helpers::respond(result, "DataStore-Abfrage", |result| {
            render_datastore(&result, query.offset)
        }))
    }

    #[tool(description = "Run a SQL SELECT statement on the datastore (joins, grouping, aggregates).")]
    async fn zurich_datastore_sql(
        &self,
        Parameters(params): Parameters<DatastoreSqlParams>,
    ) -> Result<CallToolResult, ErrorData> {
        let sql = helpers::required(&params.sql, "sql", 5)?;
        let result = self.control.datastore_sql(sql).await;
        Ok(helpers::respond(result, "SQL-Abfrage", |result| render_sql(&result)))
    }

    #[tool(description = "List the 19 thematic data categories, or show the datasets of one category.")]
    async fn zurich_list_categories(
        &self,
        Parameters(params): Parameters<ListCategoriesParams>,
    ) -> Result<CallToolResult, ErrorData> {
        Ok(match helpers::optional(params.group_id) {
            Some(id) => {
                let result = self.control.show_group(&id).await;
                helpers::respond(result, "Kategorien", |group| render_group(&group))
            }
            None => {
                let result = self.control.list_groups().await;
                helpers::respond(result, "Kategorien", |groups| render_groups(&groups))
            }
        })
    }

    #[tool(description = "Search the tags used in the catalog.")]
    async fn zurich_list_tags(
        &self,
        Parameters(params): Parameters<ListTagsParams>,
    ) -> Result<CallToolResult, ErrorData> {
        let query = helpers::optional(params.query);
        let limit = helpers::clamp(params.limit, 30, 1, 100) as usize;
        let result = self.control.list_tags(query.as_deref()).await;
        Ok(helpers::respond(result, "Tag-Suche", |tags| {
            render_tags(&tags, query.as_deref(), limit)
        }))
    }

    #[tool(description = "Analyze matching datasets: relevance, freshness and datastore structure.")]
    async fn zurich_analyze_datasets(
        &self,
        Parameters(params): Parameters<AnalyzeDatasetsParams>,
    ) -> Result<CallToolResult, ErrorData> {
        let query = helpers::required(&params.query, "query", 1)?;
        let max = helpers::clamp(params.max_datasets, 5, 1, 20);
        let include_structure = params.include_structure.unwrap_or(true);
        let include_freshness = params.include_freshness.unwrap_or(true);
        let result = self
            .control
            .analyze_datasets(query, max, include_structure)
            .await;
        Ok(helpers::respond(result, "Datensatz-Analyse", |analysis| {
            render_analysis(query, &analysis, include_freshness)
        }))
    }

    #[tool(description = "Overview of the whole catalog: dataset count, categories and formats.")]
    async fn zurich_catalog_stats(&self) -> Result<CallToolResult, ErrorData> {
        let result = self.control.catalog_stats().await;
        let site = self.control.catalog_site();
        Ok(helpers::respond(result, "Katalog-Statistiken", |stats| {
            render_stats(&stats, site)
        }))
    }

    #[tool(description = "Find datasets relevant to schools using a curated set of search terms.")]
    async fn zurich_find_school_data(
        &self,
        Parameters(params): Parameters<FindSchoolDataParams>,
    ) -> Result<CallToolResult, ErrorData> {
        let topic = helpers::optional(params.topic);
        let result = self.control.find_school_data(topic.as_deref()).await;
        let site = self.control.catalog_site();
        Ok(helpers::respond(result, "Schuldaten-Suche", |data| {
            render_school_data(&data, site)
        }))
    }
}

fn render_search(search: &DatasetSearch, result: &PackageSearch, site: &str) -> String {
    if result.results.is_empty() {
        let mut text = format!("Keine Datensätze gefunden für '{}'.", search.query);
        if let Some(group) = search
            .group
            .as_deref()
            .filter(|group| !CATALOG_GROUPS.contains(group))
        {
            text.push_str(&format!(
                "\nUnbekannte Gruppe `{group}`. Gruppen: {}",
                CATALOG_GROUPS.join(", ")
            ));
        }
        return text;
    }
    let shown = result.results.len() as u64;
    let mut lines = vec![
        format!("## Suchergebnis: {} Datensätze für '{}'", result.count, search.query),
        format!(
            "Zeige {shown} von {} (Offset: {})\n",
            result.count, search.offset
        ),
    ];
    for dataset in &result.results {
        lines.push(dataset_summary(&summarize_dataset(dataset, site)));
        lines.push(String::new());
    }
    let next = u64::from(search.offset) + shown;
    if result.count > next {
        lines.push(format!("*→ Weitere Ergebnisse mit offset={next}*"));
    }
    lines.join("\n")
}

fn render_details(details: &DatasetDetails) -> String {
    let mut lines = vec![
        dataset_summary(&details.summary),
        "\n#### Ressourcen / Downloads\n".to_string(),
    ];
    lines.extend(details.resources.iter().map(resource_line));
    if !details.extras.is_empty() {
        lines.push("\n#### Zusätzliche Metadaten".to_string());
        lines.extend(
            details
                .extras
                .iter()
                .map(|(key, value)| format!("- **{key}**: {value}")),
        );
    }
    lines.join("\n")
}

fn render_datastore(result: &DatastoreResult, offset: u32) -> String {
    if result.records.is_empty() {
        return "Keine Daten gefunden.".to_string();
    }
    let total = result.total.unwrap_or_default();
    let fields: Vec<String> = result
        .visible_fields()
        .map(|field| format!("- `{}` ({})", field.id, field.kind.as_deref().unwrap_or("?")))
        .collect();
    let mut lines = vec![
        format!("## DataStore-Abfrage: {total} Einträge"),
        format!("Zeige {} (Offset: {offset})\n", result.records.len()),
        "### Felder".to_string(),
        fields.join("\n"),
        "\n### Daten\n".to_string(),
        json_block(&result.records),
    ];
    let next = u64::from(offset) + result.records.len() as u64;
    if total > next {
        lines.push(format!("\n*→ Weitere mit offset={next}*"));
    }
    lines.join("\n")
}

fn render_sql(result: &DatastoreResult) -> String {
    if result.records.is_empty() {
        return "SQL-Abfrage lieferte keine Ergebnisse.".to_string();
    }
    [
        format!("## SQL-Ergebnis: {} Zeilen", result.records.len()),
        format!("**Spalten**: {}\n", field_names(result).join(", ")),
        json_block(&result.records),
    ]
    .join("\n")
}

fn render_group(group: &CatalogGroup) -> String {
    let mut lines = vec![
        format!("## Kategorie: {}", group.display_title()),
        format!("**Datensätze**: {}\n", group.package_count),
    ];
    lines.extend(group.packages.iter().map(|dataset| {
        format!(
            "- **{}** (`{}`)",
            text(dataset, "title", "?"),
            text(dataset, "name", "")
        )
    }));
    lines.join("\n")
}

fn render_groups(groups: &[CatalogGroup]) -> String {
    let mut lines = vec!["## Datenkategorien der Stadt Zürich\n".to_string()];
    lines.extend(groups.iter().map(|group| {
        format!(
            "- **{}** (`{}`) – {} Datensätze",
            group.display_title(),
            group.name,
            group.package_count
        )
    }));
    lines.join("\n")
}

fn render_tags(tags: &[String], query: Option<&str>, limit: usize) -> String {
    if tags.is_empty() {
        return format!("Keine Tags gefunden für '{}'.", query.unwrap_or_default());
    }
    let tags = &tags[..tags.len().min(limit)];
    let mut lines = vec![format!("## Tags ({} Ergebnisse)\n", tags.len())];
    lines.extend(tags.iter().map(|tag| format!("- `{tag}`")));
    lines.push(
        "\n*Tipp: Nutze `zurich_search_datasets` mit `filter_group` oder Solr-Query `tags:tagname`*"
            .to_string(),
    );
    lines.join("\n")
}

fn render_analysis(query: &str, analysis: &DatasetAnalysis, include_freshness: bool) -> String {
    if analysis.datasets.is_empty() {
        return format!("Keine Datensätze gefunden für '{query}'.");
    }
    let mut lines = vec![
        format!("## Analyse: '{query}'"),
        format!(
            "**{} Datensätze gefunden**, Top {} analysiert:\n",
            analysis.total,
            analysis.datasets.len()
        ),
    ];
    for (index, dataset) in analysis.datasets.iter().enumerate() {
        lines.push(format!("### {}. {}", index + 1, dataset.title));
        lines.push(format!("- **ID**: `{}`", dataset.name));
        lines.push(format!("- **Formate**: {}", dataset.formats.join(", ")));
        lines.push(format!("- **Ressourcen**: {}", dataset.resource_count));
        if include_freshness {
            lines.push(format!("- **Letzte Änderung**: {}", dataset.modified));
            lines.push(format!(
                "- **Aktualisierung**: {}",
                dataset.update_interval.join(", ")
            ));
        }
        if let Some(structure) = &dataset.structure {
            let fields: Vec<String> = structure
                .fields
                .iter()
                .map(|field| format!("`{}` ({})", field.id, field.kind.as_deref().unwrap_or("?")))
                .collect();
            lines.push(format!("- **DataStore-Einträge**: {}", structure.total));
            lines.push(format!(
                "- **Felder**: {}",
                fields
                    .iter()
                    .take(MAX_LISTED_FIELDS)
                    .cloned()
                    .collect::<Vec<_>>()
                    .join(", ")
            ));
            if fields.len() > MAX_LISTED_FIELDS {
                lines.push(format!(
                    "  *(und {} weitere)*",
                    fields.len() - MAX_LISTED_FIELDS
                ));
            }
        }
        lines.push(format!("- **URL**: {}\n", dataset.url));
    }
    lines.join("\n")
}

fn render_stats(stats: &CatalogStats, site: &str) -> String {
    let mut lines = vec![
        "## Open Data Katalog – Stadt Zürich".to_string(),
        format!("**Gesamtzahl Datensätze**: {}\n", stats.total),
        format!("**Portal**: {site}"),
        "**Lizenz**: Creative Commons CC0 (Open by Default seit 2021)\n".to_string(),
    ];
    if let Some(groups) = &stats.groups {
        lines.push("### Kategorien".to_string());
        lines.extend(groups.iter().map(facet_line));
    }
    if let Some(formats) = &stats.formats {
        lines.push("\n### Häufigste Formate".to_string());
        lines.extend(formats.iter().map(facet_line));
    }
    lines.join("\n")
}

fn facet_line(item: &FacetItem) -> String {
    format!("- **{}**: {}", item.label(), item.count)
}

fn render_school_data(data: &SchoolData, site: &str) -> String {
    let mut lines = vec![
        "## Schulrelevante Datensätze".to_string(),
        format!("**{} Treffer** (zeige {})\n", data.len(), data.len()),
    ];
    if !data.school_office.is_empty() {
        lines.push("### Vom Schulamt / SSD".to_string());
        for dataset in &data.school_office {
            lines.push(dataset_summary(&summarize_dataset(dataset, site)));
            lines.push(String::new());
        }
    }
    if !data.others.is_empty() {
        lines.push("### Weitere relevante Datensätze".to_string());
        lines.extend(
            data.others
                .iter()
                .take(MAX_OTHER_SCHOOL_DATASETS)
                .map(|dataset| {
                    format!(
                        "- **{}** (`{}`) – {}",
                        text(dataset, "title", "?"),
                        text(dataset, "name", ""),
                        text(dataset, "author", "?")
                    )
                }),
        );
    }
    lines.join("\n")
}

fn text<'a>(value: &'a Value, key: &str, default: &'a str) -> &'a str {
    value.get(key).and_then(Value::as_str).unwrap_or(default)
}
