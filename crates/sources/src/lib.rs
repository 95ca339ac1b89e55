//! # Sources Crate
//!
//! Candidate generation for meal planning.
//!
//! ## Components
//!
//! ### Catalog Source
//! Every recipe in the catalog. This is the input
//! the recipe matcher narrows (and, when it has to, relaxes) into a
//! candidate set.
//!
//! ### Preference Source
//! Recipes ranked for a user by diet labels, goal and likes. Backs the
//! "recommended recipes" view. Restricted ingredients are always excluded.
//!
//! ## Example Usage
//!
//! ```ignore
//! use sources::{CatalogSource, PreferenceSource, user_context::build_planning_context};
//! use data_loader::RecipeIndex;
//! use std::sync::Arc;
//!
//! let index = Arc::new(RecipeIndex::load_from_file("data/catalog.json".as_ref())?);
//! let context = build_planning_context(&index, user_id, &profile)?
//!     .with_calorie_target(2100);
//!
//! let catalog = CatalogSource::new(index.clone()).get_candidates(&context, usize::MAX);
//! let recommended = PreferenceSource::new(index.clone()).get_candidates(&context, 10);
//! ```

// Public modules
pub mod types;
pub mod user_context;
pub mod catalog;
pub mod preference;

// Re-export commonly used types
pub use types::{has_diet_label, Candidate, CandidateMetadata, CandidateSource, PlanningContext};
pub use catalog::CatalogSource;
pub use preference::PreferenceSource;

#[cfg(test)]
pub(crate) mod test_support {
    use data_loader::{Ingredient, Macronutrients, MealType, Recipe, RecipeIndex};

    fn recipe(
        id: u32,
        title: &str,
        calories: f32,
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
            macronutrients: Macronutrients::new(25.0, 40.0, 15.0),
            diet_type: diet.iter().map(|s| s.to_string()).collect(),
            ingredients: ingredients.iter().map(|&n| Ingredient::named(n)).collect(),
            tags: vec![],
            meal_types: meal_types.to_vec(),
            cooking_time: None,
            instructions: vec![],
            favorite_count: 0,
        }
    }

    /// Four recipes covering diets, allergens and meal slots
    pub fn create_test_index() -> RecipeIndex {
        let mut index = RecipeIndex::new();
        index.insert_recipe(recipe(
            1,
            "Tofu Scramble",
            400.0,
            &["Vegan", "Vegetarian"],
            &["Tofu", "Spinach"],
            &[MealType::Breakfast],
        ));
        index.insert_recipe(recipe(
            2,
            "Peanut Noodles",
            650.0,
            &["Vegan"],
            &["Noodles", "Peanuts"],
            &[MealType::Lunch, MealType::Dinner],
        ));
        index.insert_recipe(recipe(
            3,
            "Grilled Chicken Salad",
            500.0,
            &[],
            &["Chicken", "Lettuce"],
            &[MealType::Lunch],
        ));
        index.insert_recipe(recipe(
            4,
            "Beef Chili",
            800.0,
            &["Gluten-Free"],
            &["Beef", "Beans"],
            &[MealType::Dinner],
        ));
        index.build_secondary_indices();
        index
    }
}
