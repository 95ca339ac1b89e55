//! Recipe matching with a relaxation ladder.
//!
//! ## Algorithm
//! 1. Drop restricted recipes (never relaxed)
//! 2. Try diet labels + calorie window
//! 3. If empty, drop the calorie window and retry
//! 4. If still empty, drop the diet labels too
//! 5. Sort by calories descending and cap the result
//!
//! A rung is only recorded as relaxed if it was actually active: a context
//! without a calorie target never reports a relaxed calorie window.

use crate::filter_pipeline::FilterPipeline;
use crate::filters::{AllergenFilter, CalorieWindowFilter, DietTypeFilter};
use crate::traits::Filter;
use anyhow::Result;
use data_loader::RecipeIndex;
use serde::Serialize;
use sources::{Candidate, PlanningContext};
use std::cmp::Ordering;
use std::sync::Arc;
use tracing::{info, instrument, warn};

/// A constraint the matcher had to drop to find any recipes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum Relaxation {
    CalorieWindow,
    DietType,
}

/// Candidates plus the relaxations applied to find them
#[derive(Debug, Clone, Default)]
pub struct MatchOutcome {
    pub candidates: Vec<Candidate>,
    pub relaxed: Vec<Relaxation>,
}

impl MatchOutcome {
    pub fn is_empty(&self) -> bool {
        self.candidates.is_empty()
    }
}

/// Maximum number of matches returned
const MATCH_LIMIT: usize = 200;

pub struct RecipeMatcher {
    index: Arc<RecipeIndex>,
}

impl RecipeMatcher {
    pub fn new(index: Arc<RecipeIndex>) -> Self {
        Self { index }
    }

    #[instrument(skip(self, candidates, context), fields(user_id = context.user_id))]
    pub fn find_matches(
        &self,
        candidates: Vec<Candidate>,
        context: &PlanningContext,
    ) -> Result<MatchOutcome> {
        let safe = AllergenFilter::new(self.index.clone()).apply(candidates, context)?;
        let mut relaxed = Vec::new();

        if context.calorie_target.is_some() {
            let strict = FilterPipeline::new()
                .add_filter(DietTypeFilter::new(self.index.clone()))
                .add_filter(CalorieWindowFilter::new(self.index.clone()));
            let matched = strict.apply(safe.clone(), context)?;
            if !matched.is_empty() {
                return Ok(self.finish(matched, relaxed));
            }
            warn!(
                user_id = context.user_id,
                "No recipes inside the calorie window, relaxing calorie constraint"
            );
            relaxed.push(Relaxation::CalorieWindow);
        }

        if context.has_diet_filter() {
            let diet_only = FilterPipeline::new().add_filter(DietTypeFilter::new(self.index.clone()));
            let matched = diet_only.apply(safe.clone(), context)?;
            if !matched.is_empty() {
                return Ok(self.finish(matched, relaxed));
            }
            warn!(
                user_id = context.user_id,
                diet_labels = ?context.diet_labels,
                "No recipes match diet labels, relaxing diet constraint"
            );
            relaxed.push(Relaxation::DietType);
        }

        Ok(self.finish(safe, relaxed))
    }

    fn finish(&self, mut candidates: Vec<Candidate>, relaxed: Vec<Relaxation>) -> MatchOutcome {
        let calories = |c: &Candidate| {
            self.index
                .get_recipe(c.recipe_id)
                .map(|r| r.calories)
                .unwrap_or(0.0)
        };
        candidates.sort_by(|a, b| calories(b).partial_cmp(&calories(a)).unwrap_or(Ordering::Equal));
        candidates.truncate(MATCH_LIMIT);

        info!(
            matched = candidates.len(),
            relaxed = ?relaxed,
            "Recipe matching complete"
        );
        MatchOutcome { candidates, relaxed }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::{candidates, create_test_index};

    fn all() -> Vec<Candidate> {
        candidates(&[1, 2, 3, 4, 5, 6, 7])
    }

    fn ids(outcome: &MatchOutcome) -> Vec<u32> {
        outcome.candidates.iter().map(|c| c.recipe_id).collect()
    }

    fn context(labels: &[&str], target: Option<u32>, restrictions: &[&str]) -> PlanningContext {
        let mut context = PlanningContext::new(1);
        context.diet_labels = labels.iter().map(|l| l.to_string()).collect();
        context.calorie_target = target;
        context.restrictions = restrictions.iter().map(|r| r.to_string()).collect();
        context
    }

    #[test]
    fn test_full_match_needs_no_relaxation() {
        let matcher = RecipeMatcher::new(Arc::new(create_test_index()));
        let outcome = matcher
            .find_matches(all(), &context(&["gluten-free"], Some(2100), &[]))
            .unwrap();

        assert!(outcome.relaxed.is_empty());
        assert_eq!(ids(&outcome), vec![5, 3]);
    }

    #[test]
    fn test_calorie_window_relaxed_first() {
        let matcher = RecipeMatcher::new(Arc::new(create_test_index()));
        let outcome = matcher
            .find_matches(all(), &context(&["vegetarian"], Some(2100), &["peanuts"]))
            .unwrap();

        assert_eq!(outcome.relaxed, vec![Relaxation::CalorieWindow]);
        assert_eq!(ids(&outcome), vec![4, 2, 1]);
    }

    #[test]
    fn test_diet_relaxed_keeps_restrictions() {
        let matcher = RecipeMatcher::new(Arc::new(create_test_index()));
        let outcome = matcher
            .find_matches(all(), &context(&["keto"], None, &["peanuts"]))
            .unwrap();

        assert_eq!(outcome.relaxed, vec![Relaxation::DietType]);
        assert_eq!(ids(&outcome), vec![5, 3, 4, 2, 1]);
    }

    #[test]
    fn test_both_relaxed_in_order() {
        let matcher = RecipeMatcher::new(Arc::new(create_test_index()));
        let outcome = matcher
            .find_matches(all(), &context(&["keto"], Some(9000), &[]))
            .unwrap();

        assert_eq!(outcome.relaxed, vec![Relaxation::CalorieWindow, Relaxation::DietType]);
        assert_eq!(outcome.candidates.len(), 7);
    }

    #[test]
    fn test_everything_restricted_is_empty() {
        let matcher = RecipeMatcher::new(Arc::new(create_test_index()));
        let restrictions = [
            "walnuts", "eggs", "chicken", "lentils", "salmon", "peanuts",
        ];
        let outcome = matcher
            .find_matches(all(), &context(&[], None, &restrictions))
            .unwrap();

        assert!(outcome.is_empty());
        assert!(outcome.relaxed.is_empty());
    }

    #[test]
    fn test_no_constraints_sorts_by_calories() {
        let matcher = RecipeMatcher::new(Arc::new(create_test_index()));
        let outcome = matcher.find_matches(all(), &context(&[], None, &[])).unwrap();
        assert!(outcome.relaxed.is_empty());
        assert_eq!(&ids(&outcome)[..2], &[5, 6]);
    }
}
