//! Splitting daily targets across meal slots.

use crate::calculator::NutritionTargets;
use data_loader::{Macronutrients, MealType};
use serde::Serialize;

/// Fraction of daily calories each slot receives
pub fn meal_share(meal_type: MealType) -> f32 {
    match meal_type {
        MealType::Breakfast => 0.25,
        MealType::Lunch => 0.30,
        MealType::Dinner => 0.35,
        MealType::Snack => 0.10,
    }
}

/// Calorie and macro sub-target for one meal.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MealTarget {
    pub meal_type: MealType,
    pub calories: f32,
    pub macronutrients: Macronutrients,
}

impl MealTarget {
    /// Slot calories are `round(daily × share)`; macros scale with the
    /// same share of the day's calories.
    pub fn for_meal(targets: &NutritionTargets, meal_type: MealType) -> Self {
        let daily = targets.calorie_target as f32;
        let calories = (daily * meal_share(meal_type)).round();
        let factor = if daily > 0.0 { calories / daily } else { 0.0 };

        Self {
            meal_type,
            calories,
            macronutrients: targets.macronutrient_ratio.scale(factor).rounded(),
        }
    }
}

/// Sub-targets for each requested slot, in the order given
pub fn distribute(targets: &NutritionTargets, meal_types: &[MealType]) -> Vec<MealTarget> {
    meal_types
        .iter()
        .map(|&meal_type| MealTarget::for_meal(targets, meal_type))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::calculator::BmrFormula;

    fn targets(calories: u32) -> NutritionTargets {
        NutritionTargets {
            bmr: 0.0,
            tdee: 0.0,
            calorie_target: calories,
            macronutrient_ratio: Macronutrients::new(160.0, 200.0, 60.0),
            formula: BmrFormula::MifflinStJeor,
        }
    }

    #[test]
    fn test_shares_cover_the_day() {
        let total: f32 = MealType::ALL.iter().map(|&m| meal_share(m)).sum();
        assert!((total - 1.0).abs() < 1e-6);
    }

    #[test]
    fn test_distribute_2000() {
        let meals = distribute(&targets(2000), &MealType::ALL);
        let calories: Vec<f32> = meals.iter().map(|m| m.calories).collect();
        assert_eq!(calories, vec![500.0, 600.0, 700.0, 200.0]);

        let dinner = &meals[2];
        assert_eq!(dinner.meal_type, MealType::Dinner);
        // 160 × 0.35, 200 × 0.35, 60 × 0.35
        assert_eq!(dinner.macronutrients, Macronutrients::new(56.0, 70.0, 21.0));
    }

    #[test]
    fn test_distribute_keeps_requested_order() {
        let meals = distribute(&targets(1800), &[MealType::Snack, MealType::Breakfast]);
        assert_eq!(meals[0].meal_type, MealType::Snack);
        assert_eq!(meals[0].calories, 180.0);
        assert_eq!(meals[1].calories, 450.0);
    }

    #[test]
    fn test_zero_target() {
        let meal = MealTarget::for_meal(&targets(0), MealType::Lunch);
        assert_eq!(meal.calories, 0.0);
        assert_eq!(meal.macronutrients, Macronutrients::default());
    }
}
