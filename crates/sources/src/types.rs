//! Core types shared by candidate sources and the filtering pipeline.

use data_loader::{Goal, Recipe, RecipeId, UserId};
use std::collections::HashSet;

/// Where a candidate came from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CandidateSource {
    /// Every recipe in the catalog
    Catalog,
    /// Ranked by the user's diet labels, goal and likes
    Preference,
}

/// Extra signals recorded while generating a candidate
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CandidateMetadata {
    /// How many of the user's diet labels the recipe carries
    pub diet_matches: u32,
    /// Recipe carries every diet label the user asked for
    pub full_diet_match: bool,
    /// The user liked this recipe
    pub liked: bool,
}

/// A recipe under consideration for a plan.
///
/// Candidates are lightweight handles; recipe data stays in the shared
/// `RecipeIndex`.
#[derive(Debug, Clone, PartialEq)]
pub struct Candidate {
    pub recipe_id: RecipeId,
    pub source: CandidateSource,
    pub base_score: f32,
    pub metadata: CandidateMetadata,
}

impl Candidate {
    pub fn new(recipe_id: RecipeId, source: CandidateSource, base_score: f32) -> Self {
        Self {
            recipe_id,
            source,
            base_score,
            metadata: CandidateMetadata::default(),
        }
    }

    pub fn with_metadata(mut self, metadata: CandidateMetadata) -> Self {
        self.metadata = metadata;
        self
    }
}

/// Everything planning needs to know about a user, gathered once.
///
/// Labels and restrictions are stored lowercased so every comparison
/// downstream is case-insensitive.
#[derive(Debug, Clone)]
pub struct PlanningContext {
    pub user_id: UserId,
    pub goal: Goal,
    /// Diet labels a recipe must carry; empty disables diet matching
    pub diet_labels: Vec<String>,
    /// Ingredient names that must never appear
    pub restrictions: HashSet<String>,
    /// Daily calorie target, enables the per-meal calorie window
    pub calorie_target: Option<u32>,
    pub liked_recipes: HashSet<RecipeId>,
    /// Recipes served in the last few days
    pub recent_recipes: HashSet<RecipeId>,
}

impl PlanningContext {
    pub fn new(user_id: UserId) -> Self {
        Self {
            user_id,
            goal: Goal::Maintain,
            diet_labels: Vec::new(),
            restrictions: HashSet::new(),
            calorie_target: None,
            liked_recipes: HashSet::new(),
            recent_recipes: HashSet::new(),
        }
    }

    pub fn with_calorie_target(mut self, calories: u32) -> Self {
        self.calorie_target = Some(calories);
        self
    }

    pub fn with_recent(mut self, recipes: impl IntoIterator<Item = RecipeId>) -> Self {
        self.recent_recipes.extend(recipes);
        self
    }

    pub fn with_liked(mut self, recipes: impl IntoIterator<Item = RecipeId>) -> Self {
        self.liked_recipes.extend(recipes);
        self
    }

    pub fn has_diet_filter(&self) -> bool {
        !self.diet_labels.is_empty()
    }

    /// True if the recipe lists an ingredient the user can't have
    pub fn is_restricted(&self, recipe: &Recipe) -> bool {
        !self.restrictions.is_empty()
            && recipe
                .ingredients
                .iter()
                .any(|i| self.restrictions.contains(&i.name.trim().to_lowercase()))
    }

    /// Number of the user's diet labels present on the recipe
    pub fn diet_matches(&self, recipe: &Recipe) -> u32 {
        self.diet_labels
            .iter()
            .filter(|label| has_diet_label(recipe, label))
            .count() as u32
    }

    /// True if the recipe carries every requested diet label
    pub fn matches_diet(&self, recipe: &Recipe) -> bool {
        self.diet_labels.iter().all(|label| has_diet_label(recipe, label))
    }
}

/// Case-insensitive check against a recipe's diet labels
pub fn has_diet_label(recipe: &Recipe, label: &str) -> bool {
    recipe
        .diet_type
        .iter()
        .any(|d| d.trim().eq_ignore_ascii_case(label.trim()))
}
