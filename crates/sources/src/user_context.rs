//! Helper functions to build a PlanningContext from a user profile
//!
//! Normalizing happens here once so sources and filters can compare
//! lowercased strings directly.

use crate::types::PlanningContext;
use anyhow::{Context, Result};
use data_loader::{PlannedMeal, RecipeId, RecipeIndex, UserId, UserProfile};
use std::collections::HashSet;
use tracing::{debug, warn};

/// Diet labels that mean "no preference"
const WILDCARD_DIETS: [&str; 4] = ["any", "none", "general", "all"];

/// Build a PlanningContext for a user
///
/// - Validates the profile
/// - Lowercases and dedupes diet labels, dropping wildcards such as "any"
/// - Lowercases allergy names into the restriction set
pub fn build_planning_context(
    index: &RecipeIndex,
    user_id: UserId,
    profile: &UserProfile,
) -> Result<PlanningContext> {
    profile
        .validate()
        .with_context(|| format!("Invalid profile for user {}", user_id))?;

    let mut context = PlanningContext::new(user_id);
    context.goal = profile.goal;
    context.diet_labels = normalize_diet_labels(&profile.diet_type);
    context.restrictions = normalize_restrictions(&profile.allergies);

    for label in &context.diet_labels {
        if index.get_recipes_by_diet(label).is_empty() {
            warn!(user_id, label = %label, "No catalog recipe carries diet label");
        }
    }

    debug!(
        user_id,
        diet_labels = ?context.diet_labels,
        restrictions = context.restrictions.len(),
        "Built planning context"
    );
    Ok(context)
}

fn normalize_diet_labels(labels: &[String]) -> Vec<String> {
    let mut seen = HashSet::new();
    labels
        .iter()
        .map(|l| l.trim().to_lowercase())
        .filter(|l| !l.is_empty() && !WILDCARD_DIETS.contains(&l.as_str()))
        .filter(|l| seen.insert(l.clone()))
        .collect()
}

fn normalize_restrictions(allergies: &[String]) -> HashSet<String> {
    allergies
        .iter()
        .map(|a| a.trim().to_lowercase())
        .filter(|a| !a.is_empty())
        .collect()
}

/// Recipe ids referenced by resolved meals
pub fn collect_recipe_ids<'a>(meals: impl IntoIterator<Item = &'a PlannedMeal>) -> HashSet<RecipeId> {
    meals.into_iter().filter_map(|m| m.recipe_id).collect()
}
