//! Filter to remove recipes containing a restricted ingredient.
//!
//! This is the one filter the matcher never relaxes.

use crate::traits::Filter;
use anyhow::Result;
use data_loader::{RecipeId, RecipeIndex};
use sources::{Candidate, PlanningContext};
use std::collections::HashSet;
use std::sync::Arc;

/// Removes candidates whose ingredient list names any restriction.
///
/// Restricted recipes are looked up through the index's ingredient table,
/// which is keyed by trimmed, lowercased ingredient name. Candidates missing
/// from the index are dropped as well, since nothing about them can be checked.
pub struct AllergenFilter {
    index: Arc<RecipeIndex>,
}

impl AllergenFilter {
    pub fn new(index: Arc<RecipeIndex>) -> Self {
        Self { index }
    }
}

impl Filter for AllergenFilter {
    fn name(&self) -> &str {
        "AllergenFilter"
    }

    fn apply(
        &self,
        candidates: Vec<Candidate>,
        context: &PlanningContext,
    ) -> Result<Vec<Candidate>> {
        let restricted: HashSet<RecipeId> = context
            .restrictions
            .iter()
            .flat_map(|name| self.index.get_recipes_with_ingredient(name))
            .copied()
            .collect();

        let filtered: Vec<Candidate> = candidates
            .into_iter()
            .filter(|candidate| {
                self.index.get_recipe(candidate.recipe_id).is_some()
                    && !restricted.contains(&candidate.recipe_id)
            })
            .collect();
        Ok(filtered)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::{candidates, create_test_index};

    #[test]
    fn test_allergen_filter() {
        let mut context = PlanningContext::new(1);
        context.restrictions.insert("peanuts".to_string());

        let filter = AllergenFilter::new(Arc::new(create_test_index()));
        let filtered = filter.apply(candidates(&[1, 4, 6, 7]), &context).unwrap();

        let ids: Vec<_> = filtered.iter().map(|c| c.recipe_id).collect();
        assert_eq!(ids, vec![1, 4]);
    }

    #[test]
    fn test_allergen_match_ignores_case_and_padding() {
        let mut context = PlanningContext::new(1);
        context.restrictions.insert("spinach".to_string());

        let filter = AllergenFilter::new(Arc::new(create_test_index()));
        // recipe 2 lists "Spinach "
        let filtered = filter.apply(candidates(&[2]), &context).unwrap();
        assert!(filtered.is_empty());
    }

    #[test]
    fn test_unknown_recipe_dropped() {
        let context = PlanningContext::new(1);
        let filter = AllergenFilter::new(Arc::new(create_test_index()));

        let filtered = filter.apply(candidates(&[1, 99]), &context).unwrap();
        assert_eq!(filtered.len(), 1);
    }
}
