use serde_json::Value;
use zurich_model::registry::tourism_category;

use super::{ControlError, OpenDataControlPlane};
use crate::adapters::QueryParams;

pub const DEFAULT_LANGUAGE: &str = "de";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TourismSearch {
    /// Category name from the registry, or a numeric category id.
    pub category: String,
    pub search_text: Option<String>,
    pub max_results: usize,
    pub language: String,
}

impl TourismSearch {
    #[must_use]
    pub fn new(category: impl Into<String>, max_results: usize) -> Self {
        Self {
            category: category.into(),
            search_text: None,
            max_results,
            language: DEFAULT_LANGUAGE.to_string(),
        }
    }

    #[must_use]
    pub fn with_search_text(mut self, search_text: Option<String>) -> Self {
        self.search_text = search_text;
        self
    }

    #[must_use]
    pub fn with_language(mut self, language: impl Into<String>) -> Self {
        self.language = language.into();
        self
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct TourismResults {
    pub category_id: u32,
    /// Matches before truncation to `max_results`.
    pub total: usize,
    pub items: Vec<Value>,
}

/// Resolves a category given as digits or as a registry name.
///
/// # Errors
/// Returns `ControlError::UnknownCategory` when neither applies.
pub fn resolve_category(category: &str) -> Result<u32, ControlError> {
    let category = category.trim();
    let numeric = !category.is_empty() && category.bytes().all(|byte| byte.is_ascii_digit());
    numeric
        .then(|| category.parse().ok())
        .flatten()
        .or_else(|| tourism_category(category))
        .ok_or_else(|| ControlError::UnknownCategory {
            name: category.to_string(),
        })
}

/// Localized string of a `{lang: text}` object; empty when absent.
#[must_use]
pub fn localized<'a>(item: &'a Value, key: &str, language: &str) -> &'a str {
    item.get(key)
        .and_then(|value| value.get(language))
        .and_then(Value::as_str)
        .unwrap_or_default()
}

/// Keys of the item's `category` object, in document order.
#[must_use]
pub fn category_keys(item: &Value) -> Vec<&str> {
    item.get("category")
        .and_then(Value::as_object)
        .map(|categories| categories.keys().map(String::as_str).collect())
        .unwrap_or_default()
}

/// Case-insensitive match on localized name, localized short description
/// and category keys.
#[must_use]
pub fn matches_text(item: &Value, needle: &str, language: &str) -> bool {
    let needle = needle.to_lowercase();
    localized(item, "name", language).to_lowercase().contains(&needle)
        || localized(item, "disambiguatingDescription", language)
            .to_lowercase()
            .contains(&needle)
        || category_keys(item).join(" ").to_lowercase().contains(&needle)
}

impl OpenDataControlPlane {
    /// Lists the categories offered by the tourism API.
    ///
    /// # Errors
    /// Returns `ControlError::Backend` if the request fails.
    pub async fn tourism_categories(&self) -> Result<Value, ControlError> {
        Ok(self
            .json
            .get(&self.endpoints.tourism, &QueryParams::new())
            .await?)
    }

    /// Fetches one tourism category and filters it locally.
    ///
    /// # Errors
    /// Returns `ControlError::UnknownCategory` without any request when the
    /// category cannot be resolved, and `ControlError::Backend` if the
    /// request fails.
    pub async fn tourism(&self, search: &TourismSearch) -> Result<TourismResults, ControlError> {
        let category_id = resolve_category(&search.category)?;
        let params = QueryParams::new().with("id", category_id);
        let items: Vec<Value> = self.json.get(&self.endpoints.tourism, &params).await?;

        let mut items: Vec<Value> = match search
            .search_text
            .as_deref()
            .filter(|text| !text.is_empty())
        {
            Some(text) => items
                .into_iter()
                .filter(|item| matches_text(item, text, &search.language))
                .collect(),
            None => items,
        };
        let total = items.len();
        items.truncate(search.max_results);

        Ok(TourismResults {
            category_id,
            total,
            items,
        })
    }
}
