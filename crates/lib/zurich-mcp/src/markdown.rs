//! Markdown building blocks shared by the tool renderers.

use serde::Serialize;
use zurich_core::format::{DatasetSummary, ResourceSummary};
use zurich_model::DatastoreResult;

pub fn dataset_summary(summary: &DatasetSummary) -> String {
    let mut lines = vec![
        format!("### {}", summary.title),
        format!("- **ID**: `{}`", summary.name),
        format!("- **Autor**: {}", summary.author),
        format!("- **Lizenz**: {}", summary.license),
        format!("- **Ressourcen**: {}", summary.resource_count),
        format!("- **Letzte Änderung**: {}", summary.modified),
    ];
    if !summary.update_interval.is_empty() {
        lines.push(format!("- **Aktualisierung**: {}", summary.update_interval.join(", ")));
    }
    if !summary.categories.is_empty() {
        lines.push(format!("- **Kategorien**: {}", summary.categories.join(", ")));
    }
    if !summary.tags.is_empty() {
        lines.push(format!("- **Tags**: {}", summary.tags.join(", ")));
    }
    if !summary.description.is_empty() {
        lines.push(format!("- **Beschreibung**: {}", summary.description));
    }
    lines.push(format!("- **URL**: {}", summary.url));
    lines.join("\n")
}

pub fn resource_line(resource: &ResourceSummary) -> String {
    format!(
        "  - **{}** ({}) – {}",
        resource.name, resource.format, resource.url
    )
}

/// Pretty-printed JSON inside a fenced block.
pub fn json_block<T: Serialize + ?Sized>(value: &T) -> String {
    let json = serde_json::to_string_pretty(value).unwrap_or_default();
    format!("```json\n{json}\n```")
}

/// Names of the visible datastore columns.
pub fn field_names(result: &DatastoreResult) -> Vec<&str> {
    result
        .visible_fields()
        .map(|field| field.id.as_str())
        .collect()
}

/// Cell text of a JSON value: strings unquoted, `null` as `?`.
pub fn cell(value: Option<&serde_json::Value>) -> String {
    match value {
        None | Some(serde_json::Value::Null) => "?".to_string(),
        Some(serde_json::Value::String(text)) => text.clone(),
        Some(other) => other.to_string(),
    }
}

/// First `max` characters of `value`.
pub fn truncate_chars(value: &str, max: usize) -> &str {
    value
        .char_indices()
        .nth(max)
        .map_or(value, |(index, _)| &value[..index])
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use zurich_core::format::{summarize_dataset, summarize_resource};

    #[test]
    fn summary_omits_empty_sections() {
        let summary = summarize_dataset(&json!({"name": "x"}), "https://data.stadt-zuerich.ch");
        let text = dataset_summary(&summary);
        assert!(text.starts_with("### Unbekannt\n- **ID**: `x`"));
        assert!(!text.contains("Tags"));
        assert!(text.ends_with("- **URL**: https://data.stadt-zuerich.ch/dataset/x"));
    }

    #[test]
    fn resource_line_uses_defaults() {
        assert_eq!(
            resource_line(&summarize_resource(&json!({"format": "CSV"}))),
            "  - **Unbenannt** (CSV) – Keine URL"
        );
    }

    #[test]
    fn cells_and_truncation() {
        assert_eq!(cell(Some(&json!("Nord"))), "Nord");
        assert_eq!(cell(Some(&json!(12.5))), "12.5");
        assert_eq!(cell(Some(&json!(null))), "?");
        assert_eq!(cell(None), "?");
        assert_eq!(truncate_chars("Zürich", 2), "Zü");
        assert_eq!(truncate_chars("Zürich", 20), "Zürich");
    }
}
