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
use zurich_core::control::tourism::{category_keys, localized};
use zurich_core::control::{TourismResults, TourismSearch};
use zurich_core::format::UNNAMED;
use zurich_model::registry::TOURISM_CATEGORIES;

use crate::markdown::{cell, json_block, truncate_chars};
use crate::{ZurichMcp, helpers};

const MAX_CATEGORIES: usize = 5;
const MAX_DESCRIPTION_CHARS: usize = 250;
const LANGUAGES: &[&str] = &["de", "en", "fr", "it"];

/// Parameters for the tourism search.
#[derive(Debug, Clone, Serialize, Deserialize, schemars::JsonSchema)]
pub struct TourismParams {
    /// Category name or a numeric category id. Names: `aktivitaeten`, `events`,
    /// `familien`, `kultur`, `museen`, `nachtleben`, `natur`, `restaurants`,
    /// `shopping`, `sport`, `touren`, `uebernachten`.
    pub category: String,
    /// Text filter on name, short description and categories, e.g. `Altstadt`.
    pub search_text: Option<String>,
    /// Maximum number of results, 1 to 50 (default 10).
    pub max_results: Option<u32>,
    /// Result language: `de` (default), `en`, `fr` or `it`.
    pub language: Option<String>,
}

#[tool_router(router = tool_router_tourism, vis = "pub")]
impl ZurichMcp {
    #[tool(description = "Attractions, restaurants, hotels and events from the Zurich Tourism API.")]
    async fn zurich_tourism(
        &self,
        Parameters(params): Parameters<TourismParams>,
    ) -> Result<CallToolResult, ErrorData> {
        let category = helpers::required(&params.category, "category", 1)?;
        let language = helpers::optional(params.language)
            .map(|language| language.to_lowercase())
            .unwrap_or_else(|| "de".to_string());
        if !LANGUAGES.contains(&language.as_str()) {
            return Err(helpers::mcp_err(
                rmcp::model::ErrorCode::INVALID_PARAMS,
                format!("`language` must be one of {}", LANGUAGES.join(", ")),
            ));
        }
        let search = TourismSearch::new(
            category,
            helpers::clamp(params.max_results, 10, 1, 50) as usize,
        )
        .with_search_text(helpers::optional(params.search_text))
        .with_language(language);
        let result = self.control.tourism(&search).await;
        Ok(helpers::respond(result, "Zürich Tourismus", |results| {
            render_tourism(&search, &results)
        }))
    }

    #[tool(description = "Categories offered by the Zurich Tourism API, with the names accepted by zurich_tourism.")]
    async fn zurich_tourism_categories(&self) -> Result<CallToolResult, ErrorData> {
        let result = self.control.tourism_categories().await;
        Ok(helpers::respond(result, "Tourismus-Kategorien", |categories| {
            render_categories(&categories)
        }))
    }
}

fn item_entry(item: &Value, language: &str) -> Vec<String> {
    let name = match localized(item, "name", language) {
        "" => UNNAMED,
        name => name,
    };
    let mut lines = vec![format!("### {name}")];

    let kind = [item.get("@customType"), item.get("@type")]
        .into_iter()
        .flatten()
        .filter_map(Value::as_str)
        .find(|kind| !kind.is_empty());
    if let Some(kind) = kind {
        lines.push(format!("- **Typ**: {kind}"));
    }
    let categories = category_keys(item);
    if !categories.is_empty() {
        let shown: Vec<&str> = categories.into_iter().take(MAX_CATEGORIES).collect();
        lines.push(format!("- **Kategorien**: {}", shown.join(", ")));
    }
    let description = localized(item, "disambiguatingDescription", language);
    if !description.is_empty() {
        lines.push(format!(
            "- **Beschreibung**: {}",
            truncate_chars(description, MAX_DESCRIPTION_CHARS)
        ));
    }
    if let Some(address) = address_line(item) {
        lines.push(format!("- **Adresse**: {address}"));
    }
    if let Some(phone) = item
        .get("telephone")
        .and_then(Value::as_str)
        .filter(|phone| !phone.is_empty())
    {
        lines.push(format!("- **Telefon**: {phone}"));
    }
    let url = localized(item, "url", language);
    if !url.is_empty() {
        lines.push(format!("- **Web**: {url}"));
    }
    let geo = item.get("geo");
    let latitude = geo.and_then(|geo| geo.get("latitude"));
    let longitude = geo.and_then(|geo| geo.get("longitude"));
    if is_set(latitude) && is_set(longitude) {
        lines.push(format!(
            "- **Koordinaten**: {}, {}",
            cell(latitude),
            cell(longitude)
        ));
    }
    lines.push(String::new());
    lines
}

fn is_set(value: Option<&Value>) -> bool {
    match value {
        None | Some(Value::Null) => false,
        Some(Value::String(text)) => !text.is_empty(),
        Some(Value::Number(number)) => number.as_f64() != Some(0.0),
        Some(_) => true,
    }
}

/// `street, postal city` when a street is known.
fn address_line(item: &Value) -> Option<String> {
    let address = item.get("address")?.as_object()?;
    let part = |key: &str| address.get(key).and_then(Value::as_str).unwrap_or_default();
    let street = part("streetAddress");
    if street.is_empty() {
        return None;
    }
    let line = format!("{street}, {} {}", part("postalCode"), part("addressLocality"));
    Some(line.trim().trim_end_matches(',').trim().to_string())
}

fn render_tourism(search: &TourismSearch, results: &TourismResults) -> String {
    if results.items.is_empty() {
        let filter = search
            .search_text
            .as_deref()
            .map(|text| format!(" mit Filter '{text}'"))
            .unwrap_or_default();
        return format!(
            "Keine Tourismus-Einträge gefunden für Kategorie '{}'{filter}.",
            search.category
        );
    }
    let mut lines = vec![
        format!("## Zürich Tourismus: {}", search.category),
        format!(
            "**{} Einträge** (zeige {})\n",
            results.total,
            results.items.len()
        ),
    ];
    lines.extend(
        results
            .items
            .iter()
            .flat_map(|item| item_entry(item, &search.language)),
    );
    lines.join("\n")
}

fn render_categories(categories: &Value) -> String {
    let mut lines = vec![
        "## Zürich Tourismus Kategorien\n".to_string(),
        "| Name | ID |".to_string(),
        "|---|---|".to_string(),
    ];
    lines.extend(
        TOURISM_CATEGORIES
            .iter()
            .map(|(name, id)| format!("| `{name}` | {id} |")),
    );
    lines.push("\n### Alle Kategorien der API\n".to_string());
    lines.push(json_block(categories));
    lines.join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn item_shows_localized_fields() {
        let item = json!({
            "@type": "TouristAttraction",
            "name": {"de": "Grossmünster", "en": "Grossmünster Church"},
            "disambiguatingDescription": {"de": "Wahrzeichen der Altstadt"},
            "category": {"Kirchen": {}, "Altstadt": {}},
            "address": {"streetAddress": "Grossmünsterplatz", "postalCode": "8001", "addressLocality": "Zürich"},
            "url": {"de": "https://www.grossmuenster.ch"},
            "telephone": "+41 44 250 66 51",
            "geo": {"latitude": 47.37, "longitude": 8.544}
        });
        let text = item_entry(&item, "de").join("\n");
        assert!(text.starts_with("### Grossmünster\n- **Typ**: TouristAttraction"));
        assert!(text.contains("- **Adresse**: Grossmünsterplatz, 8001 Zürich"));
        assert!(text.contains("- **Web**: https://www.grossmuenster.ch"));
        assert!(text.contains("- **Koordinaten**: 47.37, 8.544"));
    }

    #[test]
    fn missing_translation_is_unnamed() {
        let item = json!({"name": {"de": "Zoo"}, "@customType": "Zoo"});
        let lines = item_entry(&item, "fr");
        assert_eq!(lines[0], "### Unbenannt");
        assert_eq!(lines[1], "- **Typ**: Zoo");
    }

    #[test]
    fn empty_result_mentions_filter() {
        let search = TourismSearch::new("restaurants", 10).with_search_text(Some("vegan".to_string()));
        let results = TourismResults {
            category_id: 1,
            total: 0,
            items: Vec::new(),
        };
        assert_eq!(
            render_tourism(&search, &results),
            "Keine Tourismus-Einträge gefunden für Kategorie 'restaurants' mit Filter 'vegan'."
        );
    }

    #[test]
    fn advertised_category_names_resolve() {
        let schema = serde_json::to_value(schemars::schema_for!(TourismParams)).expect("schema");
        let description = schema["properties"]["category"]["description"]
            .as_str()
            .expect("description");
        let names: Vec<&str> = description.split('`').skip(1).step_by(2).collect();
        assert_eq!(names.len(), TOURISM_CATEGORIES.len());
        for name in names {
            assert!(
                zurich_core::control::tourism::resolve_category(name).is_ok(),
                "{name} does not resolve"
            );
        }
    }

    #[test]
    fn categories_include_registry_names() {
        let text = render_categories(&json!([]));
        let (name, id) = TOURISM_CATEGORIES[0];
        assert!(text.contains(&format!("| `{name}` | {id} |")));
    }
}
