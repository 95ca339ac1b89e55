//! Filter to keep recipes matching the user's diet labels.

use crate::traits::Filter;
use anyhow::Result;
use data_loader::RecipeIndex;
use sources::{Candidate, PlanningContext};
use std::sync::Arc;

/// Keeps candidates carrying every diet label in the context.
///
/// A context without diet labels passes everything through.
pub struct DietTypeFilter {
    index: Arc<RecipeIndex>,
}

impl DietTypeFilter {
    pub fn new(index: Arc<RecipeIndex>) -> Self {
        Self { index }
    }
}

impl Filter for DietTypeFilter {
    fn name(&self) -> &str {
        "DietTypeFilter"
    }

    fn apply(
        &self,
        candidates: Vec<Candidate>,
        context: &PlanningContext,
    ) -> Result<Vec<Candidate>> {
        if !context.has_diet_filter() {
            return Ok(candidates);
        }

        let filtered: Vec<Candidate> = candidates
            .into_iter()
            .filter(|candidate| {
                self.index
                    .get_recipe(candidate.recipe_id)
                    .is_some_and(|recipe| context.matches_diet(recipe))
            })
            .collect();
        Ok(filtered)
    }
}
