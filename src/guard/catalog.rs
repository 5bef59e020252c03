use crate::error::CatalogError;
use crate::text::MAX_TEXT_LEN;
use ahash::AHashMap;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fs;
use std::sync::Arc;

/// A named, reusable boolean check, e.g. `"on ground"` -> `"self.on_ground"`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ExpressionOption {
    pub shorthand: String,
    #[serde(alias = "lua_expression")]
    pub expression: String,
}

impl ExpressionOption {
    pub fn new(shorthand: impl Into<String>, expression: impl Into<String>) -> Self {
        Self {
            shorthand: shorthand.into(),
            expression: expression.into(),
        }
    }
}

/// The catalog of options that structured guards pick from.
///
/// The catalog belongs to the embedding application. The registry only keeps
/// a shared handle to it so that structured guards can be re-resolved by
/// shorthand when a saved graph is loaded.
#[derive(Debug, Clone, Default)]
pub struct ExpressionCatalog {
    categories: BTreeMap<String, Vec<Arc<ExpressionOption>>>,
    by_shorthand: AHashMap<String, Arc<ExpressionOption>>,
}

impl ExpressionCatalog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Parses a catalog of the form `{"Category": [{"shorthand": .., "expression": ..}]}`.
    pub fn from_json_str(json: &str) -> Result<Self, CatalogError> {
        let raw: BTreeMap<String, Vec<ExpressionOption>> = serde_json::from_str(json)?;
        let mut catalog = Self::new();
        for (category, options) in raw {
            for option in options {
                catalog.add_option(&category, option)?;
            }
        }
        Ok(catalog)
    }

    pub fn from_file(path: &str) -> Result<Self, CatalogError> {
        let json = fs::read_to_string(path).map_err(|source| CatalogError::Io {
            path: path.to_string(),
            source,
        })?;
        Self::from_json_str(&json)
    }

    /// Registers `option` under `category`. Shorthands must be non-empty and
    /// unique across the whole catalog since they are the persisted key.
    pub fn add_option(
        &mut self,
        category: &str,
        option: ExpressionOption,
    ) -> Result<Arc<ExpressionOption>, CatalogError> {
        if option.shorthand.is_empty() {
            return Err(CatalogError::EmptyShorthand {
                category: category.to_string(),
            });
        }
        if option.shorthand.len() > MAX_TEXT_LEN {
            return Err(CatalogError::ShorthandTooLong {
                category: category.to_string(),
                len: option.shorthand.len(),
                max: MAX_TEXT_LEN,
            });
        }
        if self.by_shorthand.contains_key(&option.shorthand) {
            return Err(CatalogError::DuplicateShorthand(option.shorthand));
        }

        let option = Arc::new(option);
        self.by_shorthand
            .insert(option.shorthand.clone(), Arc::clone(&option));
        self.categories
            .entry(category.to_string())
            .or_default()
            .push(Arc::clone(&option));
        Ok(option)
    }

    pub fn find_by_shorthand(&self, shorthand: &str) -> Option<Arc<ExpressionOption>> {
        self.by_shorthand.get(shorthand).cloned()
    }

    /// Categories in name order, each with its options in insertion order.
    pub fn categories(&self) -> impl Iterator<Item = (&str, &[Arc<ExpressionOption>])> {
        self.categories
            .iter()
            .map(|(name, options)| (name.as_str(), options.as_slice()))
    }

    pub fn len(&self) -> usize {
        self.by_shorthand.len()
    }

    pub fn is_empty(&self) -> bool {
        self.by_shorthand.is_empty()
    }
}
