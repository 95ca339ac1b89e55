//! Parser for the recipe catalog.
//!
//! The catalog is a single JSON document:
//!
//! ```json
//! { "foods": [ { "id": 1, "name": "Oats", "calories": 389, ... } ],
//!   "recipes": [ { "id": 1, "title": "Overnight Oats", ... } ] }
//! ```
//!
//! Parsing only decodes and normalizes; cross-references are checked by
//! `RecipeIndex::validate` once everything is indexed.

use crate::error::{DataLoadError, Result};
use crate::types::*;
use serde::Deserialize;
use std::fs;
use std::io::ErrorKind;
use std::path::Path;

/// Raw catalog contents before indexing
#[derive(Debug, Default, Deserialize)]
pub struct Catalog {
    #[serde(default)]
    pub foods: Vec<Food>,
    #[serde(default)]
    pub recipes: Vec<Recipe>,
}

/// Read and decode a catalog file
pub fn parse_catalog(path: &Path) -> Result<Catalog> {
    let content = fs::read_to_string(path).map_err(|e| match e.kind() {
        ErrorKind::NotFound => DataLoadError::FileNotFound {
            path: path.display().to_string(),
        },
        _ => DataLoadError::IoError(e),
    })?;

    let file = path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string());

    parse_catalog_str(&content, &file)
}

/// Decode catalog JSON held in memory.
///
/// `file` only labels error messages.
pub fn parse_catalog_str(content: &str, file: &str) -> Result<Catalog> {
    let mut catalog: Catalog =
        serde_json::from_str(content).map_err(|e| DataLoadError::ParseError {
            file: file.to_string(),
            line: e.line(),
            column: e.column(),
            reason: e.to_string(),
        })?;

    for food in &mut catalog.foods {
        food.name = food.name.trim().to_string();
    }
    for recipe in &mut catalog.recipes {
        normalize_recipe(recipe);
    }

    Ok(catalog)
}

/// Trim free-text fields and dedupe meal slots
pub fn normalize_recipe(recipe: &mut Recipe) {
    recipe.title = recipe.title.trim().to_string();
    for ingredient in &mut recipe.ingredients {
        ingredient.name = ingredient.name.trim().to_string();
    }
    recipe.meal_types.sort_unstable();
    recipe.meal_types.dedup();
}
