//! # Data Loader Crate
//!
//! This crate loads and indexes the recipe catalog and defines the domain
//! types shared by the rest of the workspace.
//!
//! ## Main Components
//!
//! - **types**: Core domain types (UserProfile, Recipe, Food, PlannedMeal, RecipeIndex)
//! - **parser**: Decode the JSON catalog into Rust structs
//! - **index**: Build secondary indices and derive recipe nutrition from foods
//! - **error**: Error types for data loading and profile validation
//!
//! ## Example Usage
//!
//! ```ignore
//! use data_loader::RecipeIndex;
//! use std::path::Path;
//!
//! let index = RecipeIndex::load_from_file(Path::new("data/catalog.json"))?;
//!
//! let recipe = index.get_recipe(1).unwrap();
//! let vegan = index.get_recipes_by_diet("vegan");
//!
//! println!("{} has {} vegan siblings", recipe.title, vegan.len());
//! ```

// Public modules
pub mod error;
pub mod types;
pub mod parser;
pub mod index;

// Re-export commonly used types for convenience
pub use error::{DataLoadError, ProfileError, Result};
pub use parser::Catalog;
pub use types::{
    // Type aliases
    FoodId,
    RecipeId,
    UserId,
    // Core types
    Food,
    Ingredient,
    Macronutrients,
    PlannedMeal,
    Recipe,
    RecipeIndex,
    UserProfile,
    // Enums
    ActivityLevel,
    Gender,
    Goal,
    MealType,
};
