//! Filter to keep recipes suited to one meal slot.

use crate::traits::Filter;
use anyhow::Result;
use data_loader::{MealType, RecipeId, RecipeIndex};
use sources::{Candidate, PlanningContext};
use std::collections::HashSet;
use std::sync::Arc;
use tracing::debug;

/// Keeps candidates tagged for `meal_type`.
///
/// When no candidate carries the tag the input is returned unchanged, so a
/// sparse catalog still yields a meal.
pub struct MealTypeFilter {
    index: Arc<RecipeIndex>,
    meal_type: MealType,
}

impl MealTypeFilter {
    pub fn new(index: Arc<RecipeIndex>, meal_type: MealType) -> Self {
        Self { index, meal_type }
    }
}

impl Filter for MealTypeFilter {
    fn name(&self) -> &str {
        "MealTypeFilter"
    }

    fn apply(
        &self,
        candidates: Vec<Candidate>,
        _context: &PlanningContext,
    ) -> Result<Vec<Candidate>> {
        let slot: HashSet<RecipeId> = self
            .index
            .get_recipes_by_meal_type(self.meal_type)
            .iter()
            .copied()
            .collect();
        let tagged: Vec<Candidate> = candidates
            .iter()
            .filter(|candidate| slot.contains(&candidate.recipe_id))
            .cloned()
            .collect();

        if tagged.is_empty() {
            debug!("No candidates tagged {}, keeping all {}", self.meal_type, candidates.len());
            return Ok(candidates);
        }
        Ok(tagged)
    }
}
