//! Preference Source - recipes ranked for a user
//!
//! ## Algorithm
//! 1. Drop recipes containing a restricted ingredient (never relaxed)
//! 2. Score the rest:
//!    - +2 per diet label the recipe carries
//!    - calories/100 subtracted when losing weight, added when gaining
//!    - +5 if the user liked the recipe
//! 3. Recipes matching every diet label rank ahead of the rest, which only
//!    top up the list when full matches run short
//! 4. Ties break on recipe id so results are stable

use crate::types::{Candidate, CandidateMetadata, CandidateSource, PlanningContext};
use data_loader::{Goal, Recipe, RecipeIndex};
use rayon::prelude::*;
use std::cmp::Ordering;
use std::sync::Arc;
use tracing::{debug, instrument};

/// Score per matching diet label
const DIET_WEIGHT: f32 = 2.0;

/// Bonus for liked recipes
const LIKE_BOOST: f32 = 5.0;

#[derive(Clone)]
pub struct PreferenceSource {
    index: Arc<RecipeIndex>,
}

impl PreferenceSource {
    pub fn new(index: Arc<RecipeIndex>) -> Self {
        Self { index }
    }

    #[instrument(skip(self, context), fields(user_id = context.user_id))]
    pub fn get_candidates(&self, context: &PlanningContext, limit: usize) -> Vec<Candidate> {
        let recipes = self.index.recipes();

        let mut candidates: Vec<Candidate> = recipes
            .par_iter()
            .filter(|recipe| !context.is_restricted(recipe))
            .map(|recipe| self.score(recipe, context))
            .collect();

        candidates.sort_by(|a, b| {
            b.metadata
                .full_diet_match
                .cmp(&a.metadata.full_diet_match)
                .then_with(|| b.base_score.partial_cmp(&a.base_score).unwrap_or(Ordering::Equal))
                .then_with(|| a.recipe_id.cmp(&b.recipe_id))
        });
        candidates.truncate(limit);

        debug!("Generated {} preference candidates", candidates.len());
        candidates
    }

    fn score(&self, recipe: &Recipe, context: &PlanningContext) -> Candidate {
        let diet_matches = context.diet_matches(recipe);
        let liked = context.liked_recipes.contains(&recipe.id);

        let mut score = diet_matches as f32 * DIET_WEIGHT;
        match context.goal {
            Goal::Lose => score -= recipe.calories / 100.0,
            Goal::Gain => score += recipe.calories / 100.0,
            Goal::Maintain => {}
        }
        if liked {
            score += LIKE_BOOST;
        }

        Candidate::new(recipe.id, CandidateSource::Preference, score).with_metadata(
            CandidateMetadata {
                diet_matches,
                full_diet_match: context.matches_diet(recipe),
                liked,
            },
        )
    }
}
