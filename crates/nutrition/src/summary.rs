//! Nutrition totals for a set of planned meals.

use crate::calculator::{MacroRatio, NutritionTargets, macro_grams};
use data_loader::PlannedMeal;
use serde::{Deserialize, Serialize};

/// Consumed amount against a goal
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NutrientProgress {
    pub consumed: f32,
    pub goal: f32,
    pub unit: String,
}

impl NutrientProgress {
    fn new(consumed: f32, goal: f32, unit: &str) -> Self {
        Self {
            consumed: consumed.round(),
            goal,
            unit: unit.to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NutritionSummary {
    pub calories: NutrientProgress,
    pub protein: NutrientProgress,
    pub carbs: NutrientProgress,
    pub fat: NutrientProgress,
}

/// Plans generated without stored targets measure macros against a
/// 30/45/25 split of what the meals themselves provide.
const FALLBACK_RATIO: MacroRatio = MacroRatio {
    protein: 0.30,
    carbs: 0.45,
    fats: 0.25,
};

/// Sum the meals' nutrition and pair it with daily goals.
///
/// Placeholder meals contribute zero.
pub fn summarize_meals(meals: &[PlannedMeal], targets: Option<&NutritionTargets>) -> NutritionSummary {
    let calories: f32 = meals.iter().map(|m| m.calories).sum();
    let protein: f32 = meals.iter().map(|m| m.macronutrients.protein).sum();
    let carbs: f32 = meals.iter().map(|m| m.macronutrients.carbs).sum();
    let fat: f32 = meals.iter().map(|m| m.macronutrients.fats).sum();

    let (calorie_goal, macro_goal) = match targets {
        Some(t) => (t.calorie_target as f32, t.macronutrient_ratio),
        None => {
            let consumed = calories.round();
            (consumed, macro_grams(consumed as u32, FALLBACK_RATIO))
        }
    };

    NutritionSummary {
        calories: NutrientProgress::new(calories, calorie_goal, "kcal"),
        protein: NutrientProgress::new(protein, macro_goal.protein, "g"),
        carbs: NutrientProgress::new(carbs, macro_goal.carbs, "g"),
        fat: NutrientProgress::new(fat, macro_goal.fats, "g"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::calculator::BmrFormula;
    use data_loader::{Macronutrients, MealType};

    fn meal(meal_type: MealType, calories: f32, macros: Macronutrients) -> PlannedMeal {
        PlannedMeal {
            calories,
            macronutrients: macros,
            recipe_id: Some(1),
            has_recipe_details: true,
            ..PlannedMeal::placeholder(meal_type, "Test")
        }
    }

    #[test]
    fn test_summary_against_stored_targets() {
        let meals = vec![
            meal(MealType::Breakfast, 400.0, Macronutrients::new(20.0, 50.0, 10.0)),
            meal(MealType::Lunch, 650.5, Macronutrients::new(40.0, 60.0, 20.0)),
            PlannedMeal::placeholder(MealType::Dinner, "Not specified"),
        ];
        let targets = NutritionTargets {
            bmr: 1500.0,
            tdee: 2000.0,
            calorie_target: 2000,
            macronutrient_ratio: Macronutrients::new(150.0, 200.0, 67.0),
            formula: BmrFormula::MifflinStJeor,
        };

        let summary = summarize_meals(&meals, Some(&targets));
        assert_eq!(summary.calories.consumed, 1051.0);
        assert_eq!(summary.calories.goal, 2000.0);
        assert_eq!(summary.protein.consumed, 60.0);
        assert_eq!(summary.fat.goal, 67.0);
        assert_eq!(summary.carbs.unit, "g");
    }

    #[test]
    fn test_summary_without_targets() {
        let meals = vec![meal(MealType::Dinner, 800.0, Macronutrients::new(30.0, 90.0, 25.0))];
        let summary = summarize_meals(&meals, None);

        assert_eq!(summary.calories.goal, 800.0);
        assert_eq!(summary.protein.goal, 60.0);
        assert_eq!(summary.carbs.goal, 90.0);
        assert_eq!(summary.fat.goal, 22.0);
    }

    #[test]
    fn test_empty_summary() {
        let summary = summarize_meals(&[], None);
        assert_eq!(summary.calories.consumed, 0.0);
        assert_eq!(summary.protein.goal, 0.0);
    }
}
