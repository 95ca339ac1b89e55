//! Filter implementations for the candidate pipeline.
//!
//! This module contains all the concrete filter implementations
//! that can be composed into a FilterPipeline.

pub mod allergen;
pub mod calorie_window;
pub mod diet_type;
pub mod meal_type;
pub mod recently_used;

// Re-export for convenience
pub use allergen::AllergenFilter;
pub use calorie_window::CalorieWindowFilter;
pub use diet_type::DietTypeFilter;
pub use meal_type::MealTypeFilter;
pub use recently_used::RecentlyUsedFilter;
