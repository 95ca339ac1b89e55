//! Meal assembly: choosing one recipe per meal slot.
//!
//! For each slot the candidate set is narrowed to recipes tagged for that
//! slot (falling back to all of them), recently served recipes are dropped
//! while enough alternatives remain, and the best fit score wins. Ties go
//! to the earliest candidate.

use crate::filter_pipeline::FilterPipeline;
use crate::filters::{MealTypeFilter, RecentlyUsedFilter};
use crate::scoring::{FitScore, FitScorer};
use anyhow::Result;
use data_loader::{MealType, PlannedMeal, RecipeIndex};
use nutrition::{MealTarget, NutritionTargets};
use sources::{Candidate, PlanningContext};
use std::sync::Arc;
use tracing::{debug, instrument, warn};

/// Title given to a slot no recipe could fill
pub const NO_RECIPE_TITLE: &str = "No suitable recipe found";

#[derive(Clone)]
pub struct MealSelector {
    index: Arc<RecipeIndex>,
    scorer: FitScorer,
    min_fresh: usize,
}

impl MealSelector {
    pub fn new(index: Arc<RecipeIndex>) -> Self {
        Self {
            scorer: FitScorer::new(index.clone()),
            index,
            min_fresh: 5,
        }
    }

    /// Fresh alternatives required before recent recipes are dropped (default: 5)
    pub fn with_min_fresh(mut self, min_fresh: usize) -> Self {
        self.min_fresh = min_fresh;
        self
    }

    /// Best candidate for one slot, or `None` if there are no candidates
    pub fn select(
        &self,
        candidates: &[Candidate],
        target: &MealTarget,
        context: &PlanningContext,
    ) -> Result<Option<FitScore>> {
        let pipeline = FilterPipeline::new()
            .add_filter(MealTypeFilter::new(self.index.clone(), target.meal_type))
            .add_filter(RecentlyUsedFilter::new(self.min_fresh));
        let eligible = pipeline.apply(candidates.to_vec(), context)?;

        let scores = self.scorer.score_candidates(&eligible, target);
        let best = scores.into_iter().fold(None, |best: Option<FitScore>, fit| match best {
            Some(current) if current.score >= fit.score => Some(current),
            _ => Some(fit),
        });

        if let Some(fit) = &best {
            debug!(
                meal_type = %target.meal_type,
                recipe_id = fit.recipe_id,
                score = fit.score,
                "Selected recipe"
            );
        }
        Ok(best)
    }

    /// One meal per slot in `meal_types`.
    ///
    /// Recipes picked earlier in the day count as recent for later slots.
    /// A slot with no candidates gets a placeholder meal.
    #[instrument(skip(self, candidates, targets, context), fields(user_id = context.user_id))]
    pub fn plan_day(
        &self,
        candidates: &[Candidate],
        targets: &NutritionTargets,
        meal_types: &[MealType],
        context: &PlanningContext,
    ) -> Result<Vec<PlannedMeal>> {
        let mut context = context.clone();
        let mut meals = Vec::with_capacity(meal_types.len());

        for &meal_type in meal_types {
            let target = MealTarget::for_meal(targets, meal_type);
            let chosen = self
                .select(candidates, &target, &context)?
                .and_then(|fit| self.index.get_recipe(fit.recipe_id));

            match chosen {
                Some(recipe) => {
                    context.recent_recipes.insert(recipe.id);
                    meals.push(PlannedMeal::from_recipe(meal_type, recipe));
                }
                None => {
                    warn!(meal_type = %meal_type, "No candidate for meal slot");
                    meals.push(PlannedMeal::placeholder(meal_type, NO_RECIPE_TITLE));
                }
            }
        }
        Ok(meals)
    }
}
