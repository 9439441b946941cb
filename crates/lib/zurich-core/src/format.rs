//! Normalized summaries of catalog records.
//!
//! The formatters accept the raw JSON of a dataset or resource and never
//! fail: absent or mistyped fields fall back to fixed defaults.

use serde::Serialize;
use serde_json::Value;

pub const UNKNOWN: &str = "Unbekannt";
pub const UNNAMED: &str = "Unbenannt";
pub const NO_URL: &str = "Keine URL";
pub const MAX_TAGS: usize = 10;
pub const MAX_DESCRIPTION_CHARS: usize = 300;
pub const ELLIPSIS: &str = "...";

#[derive(Debug, Clone, Default, Serialize, PartialEq, Eq)]
pub struct DatasetSummary {
    pub title: String,
    pub name: String,
    pub author: String,
    pub license: String,
    pub resource_count: u64,
    /// `YYYY-MM-DD` part of `metadata_modified`.
    pub modified: String,
    pub update_interval: Vec<String>,
    pub categories: Vec<String>,
    pub tags: Vec<String>,
    pub description: String,
    pub url: String,
}

#[derive(Debug, Clone, Default, Serialize, PartialEq, Eq)]
pub struct ResourceSummary {
    pub name: String,
    pub format: String,
    pub url: String,
}

fn text<'a>(record: &'a Value, key: &str) -> Option<&'a str> {
    record.get(key).and_then(Value::as_str)
}

fn text_or(record: &Value, key: &str, default: &str) -> String {
    text(record, key).unwrap_or(default).to_string()
}

fn string_list(record: &Value, key: &str) -> Vec<String> {
    match record.get(key) {
        Some(Value::Array(items)) => items
            .iter()
            .filter_map(Value::as_str)
            .map(str::to_string)
            .collect(),
        Some(Value::String(single)) if !single.is_empty() => vec![single.clone()],
        _ => Vec::new(),
    }
}

/// Labels of a list of objects, preferring `primary` and falling back to
/// `fallback`.
fn labels(record: &Value, key: &str, primary: &str, fallback: &str) -> Vec<String> {
    record
        .get(key)
        .and_then(Value::as_array)
        .map(|items| {
            items
                .iter()
                .map(|item| {
                    text(item, primary)
                        .or_else(|| text(item, fallback))
                        .unwrap_or_default()
                        .to_string()
                })
                .collect()
        })
        .unwrap_or_default()
}

fn truncate_chars(value: &str, max: usize) -> &str {
    value
        .char_indices()
        .nth(max)
        .map_or(value, |(index, _)| &value[..index])
}

/// Summarizes a catalog dataset. `site` is the catalog web root used for
/// the canonical link.
#[must_use]
pub fn summarize_dataset(dataset: &Value, site: &str) -> DatasetSummary {
    let name = text_or(dataset, "name", "");
    let notes = text(dataset, "notes").unwrap_or_default();
    let description = if notes.is_empty() {
        String::new()
    } else {
        format!("{}{ELLIPSIS}", truncate_chars(notes, MAX_DESCRIPTION_CHARS))
    };
    let mut tags = labels(dataset, "tags", "display_name", "name");
    tags.truncate(MAX_TAGS);

    DatasetSummary {
        title: text_or(dataset, "title", UNKNOWN),
        author: text_or(dataset, "author", UNKNOWN),
        license: text_or(dataset, "license_title", UNKNOWN),
        resource_count: dataset
            .get("num_resources")
            .and_then(Value::as_u64)
            .unwrap_or_default(),
        modified: truncate_chars(text(dataset, "metadata_modified").unwrap_or_default(), 10)
            .to_string(),
        update_interval: string_list(dataset, "updateInterval"),
        categories: labels(dataset, "groups", "title", "name"),
        tags,
        description,
        url: format!("{}/dataset/{name}", site.trim_end_matches('/')),
        name,
    }
}

/// Summarizes one downloadable resource of a dataset.
#[must_use]
pub fn summarize_resource(resource: &Value) -> ResourceSummary {
    ResourceSummary {
        name: text_or(resource, "name", UNNAMED),
        format: text_or(resource, "format", "?"),
        url: text_or(resource, "url", NO_URL),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    const SITE: &str = "https://data.stadt-zuerich.ch";

    #[test]
    fn identifier_only_dataset_gets_defaults() {
        let summary = summarize_dataset(&json!({"name": "ssd_schulferien"}), SITE);
        assert_eq!(
            summary,
            DatasetSummary {
                title: UNKNOWN.to_string(),
                name: "ssd_schulferien".to_string(),
                author: UNKNOWN.to_string(),
                license: UNKNOWN.to_string(),
                resource_count: 0,
                modified: String::new(),
                update_interval: Vec::new(),
                categories: Vec::new(),
                tags: Vec::new(),
                description: String::new(),
                url: "https://data.stadt-zuerich.ch/dataset/ssd_schulferien".to_string(),
            }
        );
    }

    #[test]
    fn mistyped_fields_do_not_panic() {
        let summary = summarize_dataset(
            &json!({"title": 7, "tags": "x", "groups": [1, {"name": "bildung"}], "notes": null}),
            SITE,
        );
        assert_eq!(summary.title, UNKNOWN);
        assert!(summary.tags.is_empty());
        assert_eq!(summary.categories, ["", "bildung"]);
        assert!(summary.description.is_empty());
    }

    #[test]
    fn full_dataset_is_truncated() {
        let tags: Vec<Value> = (0..14)
            .map(|i| json!({"name": format!("tag{i}"), "display_name": format!("Tag {i}")}))
            .collect();
        let dataset = json!({
            "title": "Schulferien",
            "name": "ssd_schulferien",
            "author": "Schulamt",
            "license_title": "CC0",
            "num_resources": 3,
            "metadata_modified": "2025-11-02T08:15:00.123456",
            "updateInterval": ["jaehrlich"],
            "groups": [{"title": "Bildung", "name": "bildung"}],
            "tags": tags,
            "notes": "ä".repeat(400),
        });

        let summary = summarize_dataset(&dataset, SITE);
        assert_eq!(summary.modified, "2025-11-02");
        assert_eq!(summary.tags.len(), MAX_TAGS);
        assert_eq!(summary.tags[0], "Tag 0");
        assert_eq!(summary.categories, ["Bildung"]);
        assert_eq!(summary.update_interval, ["jaehrlich"]);
        assert_eq!(
            summary.description.chars().count(),
            MAX_DESCRIPTION_CHARS + ELLIPSIS.len()
        );
        assert!(summary.description.ends_with(ELLIPSIS));
    }

    #[test]
    fn resource_defaults() {
        assert_eq!(
            summarize_resource(&json!({})),
            ResourceSummary {
                name: UNNAMED.to_string(),
                format: "?".to_string(),
                url: NO_URL.to_string(),
            }
        );
    }
}
