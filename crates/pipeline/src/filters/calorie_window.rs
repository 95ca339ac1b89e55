//! Filter to keep recipes near a per-meal calorie budget.
//!
//! The per-meal budget is the daily target split evenly over the main
//! meals. A recipe passes when its calories fall inside
//! `[budget × lower, budget × upper]`, bounds inclusive.

use crate::traits::Filter;
use anyhow::Result;
use data_loader::RecipeIndex;
use sources::{Candidate, PlanningContext};
use std::sync::Arc;

pub struct CalorieWindowFilter {
    index: Arc<RecipeIndex>,
    meals_per_day: u32,
    lower: f32,
    upper: f32,
}

impl CalorieWindowFilter {
    /// Three meals a day, window 70%–130% of the per-meal budget
    pub fn new(index: Arc<RecipeIndex>) -> Self {
        Self {
            index,
            meals_per_day: 3,
            lower: 0.7,
            upper: 1.3,
        }
    }

    pub fn with_meals_per_day(mut self, meals: u32) -> Self {
        self.meals_per_day = meals.max(1);
        self
    }

    pub fn with_bounds(mut self, lower: f32, upper: f32) -> Self {
        self.lower = lower;
        self.upper = upper;
        self
    }

    /// Inclusive calorie range for a daily target
    pub fn window(&self, daily_target: u32) -> (f32, f32) {
        let per_meal = daily_target as f32 / self.meals_per_day as f32;
        (per_meal * self.lower, per_meal * self.upper)
    }
}

impl Filter for CalorieWindowFilter {
    fn name(&self) -> &str {
        "CalorieWindowFilter"
    }

    fn apply(
        &self,
        candidates: Vec<Candidate>,
        context: &PlanningContext,
    ) -> Result<Vec<Candidate>> {
        let Some(target) = context.calorie_target else {
            return Ok(candidates);
        };
        let (min, max) = self.window(target);

        let filtered: Vec<Candidate> = candidates
            .into_iter()
            .filter(|candidate| {
                self.index
                    .get_recipe(candidate.recipe_id)
                    .is_some_and(|recipe| recipe.calories >= min && recipe.calories <= max)
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
    fn test_window_bounds() {
        let filter = CalorieWindowFilter::new(Arc::new(create_test_index()));
        let (min, max) = filter.window(2100);
        assert!((min - 490.0).abs() < 0.01);
        assert!((max - 910.0).abs() < 0.01);
    }

    #[test]
    fn test_calorie_window_filter() {
        let filter = CalorieWindowFilter::new(Arc::new(create_test_index()));
        let context = PlanningContext::new(1).with_calorie_target(2100);

        let filtered = filter.apply(candidates(&[1, 2, 3, 4, 5, 6, 7]), &context).unwrap();
        let ids: Vec<_> = filtered.iter().map(|c| c.recipe_id).collect();
        assert_eq!(ids, vec![3, 5, 6]);
    }

    #[test]
    fn test_bounds_are_inclusive() {
        let filter = CalorieWindowFilter::new(Arc::new(create_test_index()))
            .with_meals_per_day(1)
            .with_bounds(1.0, 1.0);
        let context = PlanningContext::new(1).with_calorie_target(700);

        let filtered = filter.apply(candidates(&[3, 5, 6]), &context).unwrap();
        assert_eq!(filtered.len(), 1);
        assert_eq!(filtered[0].recipe_id, 5);
    }

    #[test]
    fn test_no_target_passes_through() {
        let filter = CalorieWindowFilter::new(Arc::new(create_test_index()));
        let filtered = filter.apply(candidates(&[1, 7]), &PlanningContext::new(1)).unwrap();
        assert_eq!(filtered.len(), 2);
    }
}
