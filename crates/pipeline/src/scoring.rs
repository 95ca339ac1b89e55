//! Fit scoring: how close a recipe comes to a meal's targets.
//!
//! Each dimension scores `1 − min(|value − target| / target, 1)`, so an
//! exact hit is 1.0 and anything off by the full target or more is 0.0.
//! The overall score weights calories 0.6 and the macro average 0.4.

use data_loader::{Recipe, RecipeId, RecipeIndex};
use nutrition::MealTarget;
use rayon::prelude::*;
use sources::Candidate;
use std::sync::Arc;

/// Score of one recipe against one meal target
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FitScore {
    pub recipe_id: RecipeId,
    pub calorie_score: f32,
    pub macro_score: f32,
    pub score: f32,
}

/// Closeness of `value` to `target` in [0, 1].
///
/// A zero (or negative) target can only be hit exactly.
pub fn closeness(value: f32, target: f32) -> f32 {
    if target <= 0.0 {
        return if value == 0.0 { 1.0 } else { 0.0 };
    }
    1.0 - ((value - target).abs() / target).min(1.0)
}

/// Computes fit scores for candidates in parallel.
#[derive(Clone)]
pub struct FitScorer {
    index: Arc<RecipeIndex>,
    calorie_weight: f32,
    macro_weight: f32,
}

impl FitScorer {
    pub fn new(index: Arc<RecipeIndex>) -> Self {
        Self {
            index,
            calorie_weight: 0.6,
            macro_weight: 0.4,
        }
    }

    pub fn score_recipe(&self, recipe: &Recipe, target: &MealTarget) -> FitScore {
        let calorie_score = closeness(recipe.calories, target.calories);

        let macros = &recipe.macronutrients;
        let goal = &target.macronutrients;
        let macro_score = (closeness(macros.protein, goal.protein)
            + closeness(macros.carbs, goal.carbs)
            + closeness(macros.fats, goal.fats))
            / 3.0;

        FitScore {
            recipe_id: recipe.id,
            calorie_score,
            macro_score,
            score: calorie_score * self.calorie_weight + macro_score * self.macro_weight,
        }
    }

    /// Scores in candidate order. Candidates missing from the index are skipped.
    pub fn score_candidates(&self, candidates: &[Candidate], target: &MealTarget) -> Vec<FitScore> {
        candidates
            .par_iter()
            .filter_map(|candidate| {
                let recipe = self.index.get_recipe(candidate.recipe_id)?;
                Some(self.score_recipe(recipe, target))
            })
            .collect()
    }
}
