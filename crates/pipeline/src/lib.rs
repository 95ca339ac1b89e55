//! Pipeline for matching, filtering and selecting recipes.
//!
//! This crate provides:
//! - Filter trait and implementations for candidate filtering
//! - FilterPipeline for composing filters
//! - RecipeMatcher, the filter ladder that relaxes constraints when nothing matches
//! - FitScorer and MealSelector for picking one recipe per meal slot
//!
//! ## Architecture
//! The pipeline processes candidates in stages:
//! 1. RecipeMatcher narrows the catalog to restriction-safe recipes matching
//!    the user's diet and calorie window, relaxing the latter two if needed
//! 2. MealSelector filters the matches per slot (meal type, recent history)
//! 3. FitScorer ranks what is left against the slot's nutrition target
//!
//! ## Example Usage
//! ```ignore
//! use pipeline::{MealSelector, RecipeMatcher};
//!
//! let outcome = RecipeMatcher::new(index.clone()).find_matches(candidates, &context)?;
//! let meals = MealSelector::new(index.clone())
//!     .plan_day(&outcome.candidates, &targets, &MealType::MAIN, &context)?;
//! ```

pub mod traits;
pub mod filters;
pub mod filter_pipeline;
pub mod matcher;
pub mod scoring;
pub mod selection;

// Re-export main types
pub use traits::Filter;
pub use filter_pipeline::FilterPipeline;
pub use matcher::{MatchOutcome, RecipeMatcher, Relaxation};
pub use scoring::{closeness, FitScore, FitScorer};
pub use selection::{MealSelector, NO_RECIPE_TITLE};

#[cfg(test)]
pub(crate) mod test_support {
    use data_loader::{Ingredient, Macronutrients, MealType, Recipe, RecipeIndex};
    use sources::{Candidate, CandidateSource};

    fn recipe(
        id: u32,
        title: &str,
        calories: f32,
        macros: (f32, f32, f32),
        diet: &[&str],
        ingredients: &[&str],
        meal_types: &[MealType],
    ) -> Recipe {
        Recipe {
            id,
            title: title.to_string(),
            description: String::new(),
            image: None,
            calories,
            macronutrients: Macronutrients::new(macros.0, macros.1, macros.2),
            diet_type: diet.iter().map(|s| s.to_string()).collect(),
            ingredients: ingredients.iter().map(|&n| Ingredient::named(n)).collect(),
            tags: vec![],
            meal_types: meal_types.to_vec(),
            cooking_time: None,
            instructions: vec![],
            favorite_count: 0,
        }
    }

    pub fn create_test_index() -> RecipeIndex {
        use MealType::*;

        let mut index = RecipeIndex::new();
        let recipes = [
            recipe(1, "Greek Yogurt Bowl", 350.0, (20.0, 45.0, 9.0), &["Vegetarian"],
                &["Greek Yogurt", "Honey", "Walnuts"], &[Breakfast]),
            recipe(2, "Veggie Omelette", 420.0, (28.0, 10.0, 30.0), &["vegetarian", "Gluten-Free"],
                &["Eggs", "Spinach ", "Cheese"], &[Breakfast]),
            recipe(3, "Chicken Quinoa Bowl", 620.0, (45.0, 60.0, 18.0), &["gluten-free"],
                &["Chicken", "Quinoa", "Broccoli"], &[Lunch]),
            recipe(4, "Lentil Soup", 480.0, (24.0, 70.0, 8.0), &["vegan", "vegetarian"],
                &["Lentils", "Carrots", "Celery"], &[Lunch, Dinner]),
            recipe(5, "Salmon with Rice", 700.0, (42.0, 65.0, 24.0), &["gluten-free"],
                &["Salmon", "Rice", "Asparagus"], &[Dinner]),
            recipe(6, "Peanut Stir Fry", 650.0, (25.0, 70.0, 28.0), &["vegan", "vegetarian"],
                &["Tofu", "Peanuts", "Noodles"], &[Dinner]),
            recipe(7, "Trail Mix", 200.0, (6.0, 18.0, 13.0), &["vegan"],
                &["Peanuts", "Raisins", "Almonds"], &[Snack]),
        ];
        for r in recipes {
            index.insert_recipe(r);
        }
        index.build_secondary_indices();
        index
    }

    pub fn candidates(ids: &[u32]) -> Vec<Candidate> {
        ids.iter()
            .map(|&id| Candidate::new(id, CandidateSource::Catalog, 0.0))
            .collect()
    }
}
