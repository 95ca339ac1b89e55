//! # Nutrition Crate
//!
//! Turns a user profile into daily energy and macronutrient targets, splits
//! them across meal slots, and totals the nutrition of planned meals.
//!
//! ## Example Usage
//!
//! ```ignore
//! use nutrition::{BmrFormula, NutritionCalculator, distribute};
//! use data_loader::MealType;
//!
//! let calculator = NutritionCalculator::new().with_formula(BmrFormula::MifflinStJeor);
//! let targets = calculator.calculate(&profile);
//!
//! for meal in distribute(&targets, &MealType::ALL) {
//!     println!("{}: {} kcal", meal.meal_type, meal.calories);
//! }
//! ```

pub mod calculator;
pub mod distribution;
pub mod summary;

pub use calculator::{
    activity_multiplier, macro_grams, macro_ratio, BmrFormula, MacroRatio, NutritionCalculator,
    NutritionError, NutritionTargets,
};
pub use distribution::{distribute, meal_share, MealTarget};
pub use summary::{summarize_meals, NutrientProgress, NutritionSummary};
