use std::collections::{BTreeSet, HashSet};

use futures::future::{join_all, try_join_all};
use serde_json::Value;
use tracing::debug;
use zurich_model::{CatalogGroup, DatastoreField, DatastoreResult, FacetItem, PackageSearch};

use super::{ControlError, OpenDataControlPlane};
use crate::adapters::QueryParams;
use crate::format::{DatasetSummary, ResourceSummary, summarize_dataset, summarize_resource};

pub const DEFAULT_ROWS: u32 = 10;
pub const DEFAULT_DATASTORE_LIMIT: u32 = 20;
/// Buckets requested per facet in [`OpenDataControlPlane::catalog_stats`].
pub const FACET_LIMIT: u32 = 15;
pub const MAX_FORMAT_FACETS: usize = 10;
pub const SCORE_SORT: &str = "score desc";

/// Search terms used to collect school related datasets, most general
/// first.
pub const SCHOOL_TERMS: &[&str] = &[
    "Schule",
    "Volksschule",
    "Kindergarten",
    "Schulanlage",
    "Kreisschulbehörde",
    "Bildung",
    "Schulweg",
    "Musikschule",
    "Schulferien",
    "Sonderschule",
    "Kinderhort",
];
/// Terms kept next to a caller supplied topic.
pub const SCHOOL_TERMS_WITH_TOPIC: usize = 4;
pub const SCHOOL_TERM_ROWS: u32 = 15;
const SCHOOL_OFFICE_MARKERS: &[&str] = &["Schulamt", "Schul-", "Schulraumplanung"];

/// Full-text dataset search.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DatasetSearch {
    pub query: String,
    pub rows: u32,
    pub offset: u32,
    pub sort: Option<String>,
    /// Catalog group name, sent as `fq=groups:<group>`.
    pub group: Option<String>,
}

impl DatasetSearch {
    #[must_use]
    pub fn new(query: impl Into<String>) -> Self {
        Self {
            query: query.into(),
            rows: DEFAULT_ROWS,
            offset: 0,
            sort: None,
            group: None,
        }
    }

    #[must_use]
    pub const fn with_rows(mut self, rows: u32) -> Self {
        self.rows = rows;
        self
    }

    #[must_use]
    pub const fn with_offset(mut self, offset: u32) -> Self {
        self.offset = offset;
        self
    }

    #[must_use]
    pub fn with_sort(mut self, sort: Option<String>) -> Self {
        self.sort = sort;
        self
    }

    #[must_use]
    pub fn with_group(mut self, group: Option<String>) -> Self {
        self.group = group;
        self
    }

    #[must_use]
    pub fn query_params(&self) -> QueryParams {
        QueryParams::new()
            .with("q", &self.query)
            .with("rows", self.rows)
            .with("start", self.offset)
            .with_opt("sort", self.sort.as_deref())
            .with_opt("fq", self.group.as_deref().map(|group| format!("groups:{group}")))
    }
}

/// A filtered read of one datastore resource.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DatastoreQuery {
    pub resource_id: String,
    /// JSON object of column filters, passed through verbatim.
    pub filters: Option<String>,
    pub query: Option<String>,
    pub sort: Option<String>,
    pub limit: u32,
    pub offset: u32,
}

impl DatastoreQuery {
    #[must_use]
    pub fn new(resource_id: impl Into<String>) -> Self {
        Self {
            resource_id: resource_id.into(),
            filters: None,
            query: None,
            sort: None,
            limit: DEFAULT_DATASTORE_LIMIT,
            offset: 0,
        }
    }

    #[must_use]
    pub fn with_filters(mut self, filters: Option<String>) -> Self {
        self.filters = filters;
        self
    }

    #[must_use]
    pub fn with_query(mut self, query: Option<String>) -> Self {
        self.query = query;
        self
    }

    #[must_use]
    pub fn with_sort(mut self, sort: Option<String>) -> Self {
        self.sort = sort;
        self
    }

    #[must_use]
    pub const fn with_limit(mut self, limit: u32) -> Self {
        self.limit = limit;
        self
    }

    #[must_use]
    pub const fn with_offset(mut self, offset: u32) -> Self {
        self.offset = offset;
        self
    }

    #[must_use]
    pub fn query_params(&self) -> QueryParams {
        QueryParams::new()
            .with("resource_id", &self.resource_id)
            .with("limit", self.limit)
            .with("offset", self.offset)
            .with_opt("filters", self.filters.as_deref())
            .with_opt("q", self.query.as_deref())
            .with_opt("sort", self.sort.as_deref())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DatasetDetails {
    pub summary: DatasetSummary,
    pub resources: Vec<ResourceSummary>,
    /// Extra metadata without harvester bookkeeping, in catalog order.
    pub extras: Vec<(String, String)>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CatalogStats {
    pub total: u64,
    /// Group buckets, largest first. `None` when the facet is missing.
    pub groups: Option<Vec<FacetItem>>,
    /// The most common resource formats, largest first.
    pub formats: Option<Vec<FacetItem>>,
}

/// Column layout of a datastore resource, read with `limit=0`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DatastoreStructure {
    pub total: u64,
    pub fields: Vec<DatastoreField>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AnalyzedDataset {
    pub name: String,
    pub title: String,
    pub modified: String,
    pub update_interval: Vec<String>,
    /// Distinct resource formats, sorted.
    pub formats: Vec<String>,
    pub resource_count: usize,
    /// `None` when structure was not requested, no resource is in the
    /// datastore, or the probe failed.
    pub structure: Option<DatastoreStructure>,
    pub url: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DatasetAnalysis {
    pub total: u64,
    pub datasets: Vec<AnalyzedDataset>,
}

/// School related datasets, split by publisher.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SchoolData {
    pub school_office: Vec<Value>,
    pub others: Vec<Value>,
}

impl SchoolData {
    #[must_use]
    pub fn len(&self) -> usize {
        self.school_office.len() + self.others.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl OpenDataControlPlane {
    /// Runs a full-text dataset search.
    ///
    /// # Errors
    /// Returns `ControlError::Backend` if the catalog request fails.
    pub async fn search_datasets(
        &self,
        search: &DatasetSearch,
    ) -> Result<PackageSearch, ControlError> {
        Ok(self
            .catalog
            .action("package_search", &search.query_params())
            .await?)
    }

    /// Fetches one dataset with its resources and extra metadata.
    ///
    /// # Errors
    /// Returns `ControlError::Backend` if the catalog request fails.
    pub async fn get_dataset(&self, id: &str) -> Result<DatasetDetails, ControlError> {
        let dataset: Value = self
            .catalog
            .action("package_show", &QueryParams::new().with("id", id))
            .await?;
        let resources = dataset
            .get("resources")
            .and_then(Value::as_array)
            .map(|resources| resources.iter().map(summarize_resource).collect())
            .unwrap_or_default();

        Ok(DatasetDetails {
            summary: summarize_dataset(&dataset, self.catalog_site()),
            resources,
            extras: dataset_extras(&dataset),
        })
    }

    /// Reads rows of one datastore resource.
    ///
    /// # Errors
    /// Returns `ControlError::Backend` if the catalog request fails.
    pub async fn datastore_query(
        &self,
        query: &DatastoreQuery,
    ) -> Result<DatastoreResult, ControlError> {
        self.datastore_search(query.query_params()).await
    }

    /// Runs a SQL statement against the datastore.
    ///
    /// # Errors
    /// Returns `ControlError::Backend` if the catalog request fails.
    pub async fn datastore_sql(&self, sql: &str) -> Result<DatastoreResult, ControlError> {
        Ok(self
            .catalog
            .action("datastore_search_sql", &QueryParams::new().with("sql", sql))
            .await?)
    }

    pub(crate) async fn datastore_search(
        &self,
        params: QueryParams,
    ) -> Result<DatastoreResult, ControlError> {
        Ok(self.catalog.action("datastore_search", &params).await?)
    }

    /// Lists all catalog groups with their dataset counts.
    ///
    /// # Errors
    /// Returns `ControlError::Backend` if the catalog request fails.
    pub async fn list_groups(&self) -> Result<Vec<CatalogGroup>, ControlError> {
        let params = QueryParams::new()
            .with("all_fields", true)
            .with("include_dataset_count", true);
        Ok(self.catalog.action("group_list", &params).await?)
    }

    /// Fetches one group with its datasets.
    ///
    /// # Errors
    /// Returns `ControlError::Backend` if the catalog request fails.
    pub async fn show_group(&self, id: &str) -> Result<CatalogGroup, ControlError> {
        let params = QueryParams::new()
            .with("id", id)
            .with("include_datasets", true)
            .with("include_dataset_count", true);
        Ok(self.catalog.action("group_show", &params).await?)
    }

    /// Lists tag names, optionally restricted to those matching `query`.
    ///
    /// # Errors
    /// Returns `ControlError::Backend` if the catalog request fails.
    pub async fn list_tags(&self, query: Option<&str>) -> Result<Vec<String>, ControlError> {
        let params = QueryParams::new().with_opt("query", query);
        Ok(self.catalog.action("tag_list", &params).await?)
    }

    /// Counts datasets per group and resource format.
    ///
    /// # Errors
    /// Returns `ControlError::Backend` if the catalog request fails.
    pub async fn catalog_stats(&self) -> Result<CatalogStats, ControlError> {
        let params = QueryParams::new()
            .with("q", "*:*")
            .with("rows", 0)
            .with("facet.field", r#"["groups", "res_format", "tags"]"#)
            .with("facet.limit", FACET_LIMIT);
        let search: PackageSearch = self.catalog.action("package_search", &params).await?;
        let facets = search
            .search_facets
            .as_ref()
            .or(search.facets.as_ref())
            .cloned()
            .unwrap_or(Value::Null);

        Ok(CatalogStats {
            total: search.count,
            groups: facet_items(&facets, "groups"),
            formats: facet_items(&facets, "res_format").map(|mut items| {
                items.truncate(MAX_FORMAT_FACETS);
                items
            }),
        })
    }

    /// Searches by relevance and describes the top `max` datasets.
    ///
    /// With `include_structure`, the first datastore-active resource of
    /// every dataset is probed concurrently. A failed probe leaves that
    /// dataset without structure and does not fail the analysis.
    ///
    /// # Errors
    /// Returns `ControlError::Backend` if the search itself fails.
    pub async fn analyze_datasets(
        &self,
        query: &str,
        max: u32,
        include_structure: bool,
    ) -> Result<DatasetAnalysis, ControlError> {
        let params = QueryParams::new()
            .with("q", query)
            .with("rows", max)
            .with("sort", SCORE_SORT);
        let search: PackageSearch = self.catalog.action("package_search", &params).await?;

        let structures: Vec<Option<DatastoreStructure>> = if include_structure {
            join_all(search.results.iter().map(|dataset| self.probe_structure(dataset))).await
        } else {
            vec![None; search.results.len()]
        };

        let datasets = search
            .results
            .iter()
            .zip(structures)
            .map(|(dataset, structure)| self.analyzed(dataset, structure))
            .collect();

        Ok(DatasetAnalysis {
            total: search.count,
            datasets,
        })
    }

    /// Structure of the first datastore resource that answers a probe.
    async fn probe_structure(&self, dataset: &Value) -> Option<DatastoreStructure> {
        for resource_id in datastore_resources(dataset) {
            let params = QueryParams::new()
                .with("resource_id", resource_id)
                .with("limit", 0);
            match self.datastore_search(params).await {
                Ok(result) => {
                    return Some(DatastoreStructure {
                        total: result.total.unwrap_or_default(),
                        fields: result.visible_fields().cloned().collect(),
                    });
                }
                Err(err) => debug!(resource_id, error = %err, "datastore probe failed"),
            }
        }
        None
    }

    fn analyzed(&self, dataset: &Value, structure: Option<DatastoreStructure>) -> AnalyzedDataset {
        let name = dataset
            .get("name")
            .and_then(Value::as_str)
            .unwrap_or_default()
            .to_string();
        let resources = dataset
            .get("resources")
            .and_then(Value::as_array)
            .map(Vec::as_slice)
            .unwrap_or_default();
        let formats: BTreeSet<String> = resources
            .iter()
            .map(|resource| {
                resource
                    .get("format")
                    .and_then(Value::as_str)
                    .unwrap_or("?")
                    .to_string()
            })
            .collect();
        let summary = summarize_dataset(dataset, self.catalog_site());
        let modified = dataset
            .get("metadata_modified")
            .and_then(Value::as_str)
            .map_or_else(|| "?".to_string(), |_| summary.modified.clone());
        let update_interval = if summary.update_interval.is_empty() {
            vec!["unbekannt".to_string()]
        } else {
            summary.update_interval
        };

        AnalyzedDataset {
            title: dataset
                .get("title")
                .and_then(Value::as_str)
                .unwrap_or("?")
                .to_string(),
            modified,
            update_interval,
            formats: formats.into_iter().collect(),
            resource_count: resources.len(),
            structure,
            url: summary.url,
            name,
        }
    }

    /// Collects school related datasets with one search per curated term.
    ///
    /// The searches run concurrently; results are merged in term order and
    /// de-duplicated by dataset name.
    ///
    /// # Errors
    /// Returns `ControlError::Backend` if any of the searches fails.
    pub async fn find_school_data(&self, topic: Option<&str>) -> Result<SchoolData, ControlError> {
        let terms = school_search_terms(topic);
        let searches = terms.iter().map(|term| {
            let params = QueryParams::new()
                .with("q", term)
                .with("rows", SCHOOL_TERM_ROWS)
                .with("sort", SCORE_SORT);
            async move {
                self.catalog
                    .action::<PackageSearch>("package_search", &params)
                    .await
            }
        });
        let results = try_join_all(searches).await?;

        let mut seen = HashSet::new();
        let mut data = SchoolData::default();
        for dataset in results.into_iter().flat_map(|search| search.results) {
            let name = dataset
                .get("name")
                .and_then(Value::as_str)
                .unwrap_or_default()
                .to_string();
            if !seen.insert(name) {
                continue;
            }
            let author = dataset
                .get("author")
                .and_then(Value::as_str)
                .unwrap_or_default();
            if is_school_office(author) {
                data.school_office.push(dataset);
            } else {
                data.others.push(dataset);
            }
        }
        Ok(data)
    }
}

/// Curated terms, or `topic` followed by the most general ones.
#[must_use]
pub fn school_search_terms(topic: Option<&str>) -> Vec<String> {
    match topic.map(str::trim).filter(|topic| !topic.is_empty()) {
        Some(topic) => std::iter::once(topic)
            .chain(SCHOOL_TERMS.iter().copied().take(SCHOOL_TERMS_WITH_TOPIC))
            .map(str::to_string)
            .collect(),
        None => SCHOOL_TERMS.iter().map(|term| (*term).to_string()).collect(),
    }
}

#[must_use]
pub fn is_school_office(author: &str) -> bool {
    SCHOOL_OFFICE_MARKERS
        .iter()
        .any(|marker| author.contains(*marker))
}

/// Reads facet buckets stored either as `{items: [...]}` or as a bare list,
/// sorted by count, largest first.
#[must_use]
pub fn facet_items(facets: &Value, key: &str) -> Option<Vec<FacetItem>> {
    let facet = facets.get(key)?;
    let items = match facet {
        Value::Array(items) => items.as_slice(),
        Value::Object(_) => facet
            .get("items")
            .and_then(Value::as_array)
            .map(Vec::as_slice)
            .unwrap_or_default(),
        _ => &[],
    };
    let mut buckets: Vec<FacetItem> = items
        .iter()
        .filter_map(|item| serde_json::from_value(item.clone()).ok())
        .collect();
    buckets.sort_by(|a, b| b.count.cmp(&a.count));
    Some(buckets)
}

fn datastore_resources(dataset: &Value) -> impl Iterator<Item = &str> {
    dataset
        .get("resources")
        .and_then(Value::as_array)
        .map(Vec::as_slice)
        .unwrap_or_default()
        .iter()
        .filter(|resource| {
            resource
                .get("datastore_active")
                .and_then(Value::as_bool)
                .unwrap_or_default()
        })
        .filter_map(|resource| resource.get("id").and_then(Value::as_str))
}

fn dataset_extras(dataset: &Value) -> Vec<(String, String)> {
    dataset
        .get("extras")
        .and_then(Value::as_array)
        .map(|extras| {
            extras
                .iter()
                .filter_map(|extra| {
                    let key = extra.get("key")?.as_str()?;
                    if key.starts_with("harvest") {
                        return None;
                    }
                    let value = match extra.get("value") {
                        Some(Value::String(text)) => text.clone(),
                        Some(other) => other.to_string(),
                        None => String::new(),
                    };
                    Some((key.to_string(), value))
                })
                .collect()
        })
        .unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn search_params_include_optional_sort_and_group() {
        let params = DatasetSearch::new("Schule")
            .with_rows(3)
            .with_group(Some("bildung".to_string()))
            .query_params();
        assert_eq!(params.get("q"), Some("Schule"));
        assert_eq!(params.get("rows"), Some("3"));
        assert_eq!(params.get("start"), Some("0"));
        assert_eq!(params.get("sort"), None);
        assert_eq!(params.get("fq"), Some("groups:bildung"));
    }

    #[test]
    fn datastore_params_skip_absent_options() {
        let params = DatastoreQuery::new("abc")
            .with_filters(Some(r#"{"Jahr": 2024}"#.to_string()))
            .with_limit(5)
            .query_params();
        assert_eq!(params.get("resource_id"), Some("abc"));
        assert_eq!(params.get("limit"), Some("5"));
        assert_eq!(params.get("filters"), Some(r#"{"Jahr": 2024}"#));
        assert_eq!(params.get("q"), None);
    }

    #[test]
    fn school_terms_with_and_without_topic() {
        assert_eq!(school_search_terms(None).len(), SCHOOL_TERMS.len());
        assert_eq!(school_search_terms(Some("  ")).len(), SCHOOL_TERMS.len());
        assert_eq!(
            school_search_terms(Some("Ferien")),
            ["Ferien", "Schule", "Volksschule", "Kindergarten", "Schulanlage"]
        );
    }

    #[test]
    fn school_office_authors() {
        assert!(is_school_office("Schulamt der Stadt Zürich"));
        assert!(is_school_office("Schul- und Sportdepartement"));
        assert!(is_school_office("Fachstelle Schulraumplanung"));
        assert!(!is_school_office("Statistik Stadt Zürich"));
    }

    #[test]
    fn facets_accept_items_object_and_bare_list() {
        let facets = json!({
            "groups": {"items": [
                {"name": "bildung", "display_name": "Bildung", "count": 4},
                {"name": "umwelt", "count": 9}
            ]},
            "res_format": [{"name": "CSV", "count": 3}],
        });
        let groups = facet_items(&facets, "groups").expect("groups");
        assert_eq!(groups[0].name, "umwelt");
        assert_eq!(groups[1].label(), "Bildung");
        assert_eq!(facet_items(&facets, "res_format").map(|f| f.len()), Some(1));
        assert!(facet_items(&facets, "tags").is_none());
    }

    #[test]
    fn extras_skip_harvest_keys() {
        let dataset = json!({"extras": [
            {"key": "harvest_source", "value": "x"},
            {"key": "spatialRelationship", "value": "Stadt Zürich"},
            {"key": "timeRange", "value": 2024}
        ]});
        assert_eq!(
            dataset_extras(&dataset),
            [
                ("spatialRelationship".to_string(), "Stadt Zürich".to_string()),
                ("timeRange".to_string(), "2024".to_string()),
            ]
        );
    }

    #[test]
    fn datastore_resources_skip_inactive() {
        let dataset = json!({"resources": [
            {"id": "a", "datastore_active": false},
            {"id": "b"},
            {"id": "c", "datastore_active": true},
            {"id": "d", "datastore_active": true}
        ]});
        assert_eq!(datastore_resources(&dataset).collect::<Vec<_>>(), ["c", "d"]);
        assert_eq!(datastore_resources(&json!({})).count(), 0);
    }
}
