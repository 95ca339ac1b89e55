//! Daily calorie and macronutrient targets.
//!
//! ## Algorithm
//! 1. BMR from weight, height, age and gender (one formula per deployment)
//! 2. TDEE = BMR × activity multiplier
//! 3. Calorie target = TDEE adjusted ±500 kcal for the goal, rounded,
//!    then clamped to a gender floor
//! 4. Macro grams from the goal's ratio at 4/4/9 kcal per gram

use data_loader::{ActivityLevel, Gender, Goal, Macronutrients, UserProfile};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;
use tracing::debug;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum NutritionError {
    #[error("Unknown BMR formula: {0} (expected mifflin-st-jeor or harris-benedict)")]
    UnknownFormula(String),
}

/// Which BMR equation to use.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum BmrFormula {
    /// `10w + 6.25h − 5a + 5` (male) / `− 161` (female)
    #[default]
    MifflinStJeor,
    /// Revised Harris-Benedict coefficients
    HarrisBenedict,
}

impl FromStr for BmrFormula {
    type Err = NutritionError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().replace('_', "-").as_str() {
            "mifflin-st-jeor" | "mifflin" => Ok(BmrFormula::MifflinStJeor),
            "harris-benedict" | "harris" => Ok(BmrFormula::HarrisBenedict),
            _ => Err(NutritionError::UnknownFormula(s.to_string())),
        }
    }
}

impl fmt::Display for BmrFormula {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BmrFormula::MifflinStJeor => f.write_str("mifflin-st-jeor"),
            BmrFormula::HarrisBenedict => f.write_str("harris-benedict"),
        }
    }
}

/// Share of calories from protein, carbs and fat.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MacroRatio {
    pub protein: f32,
    pub carbs: f32,
    pub fats: f32,
}

/// Derived daily targets for one user.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NutritionTargets {
    pub bmr: f32,
    pub tdee: f32,
    pub calorie_target: u32,
    /// Whole grams per day
    pub macronutrient_ratio: Macronutrients,
    pub formula: BmrFormula,
}

pub fn activity_multiplier(level: ActivityLevel) -> f32 {
    match level {
        ActivityLevel::Sedentary => 1.2,
        ActivityLevel::Light => 1.375,
        ActivityLevel::Moderate => 1.55,
        ActivityLevel::Active => 1.725,
        ActivityLevel::VeryActive => 1.9,
    }
}

pub fn macro_ratio(goal: Goal) -> MacroRatio {
    match goal {
        Goal::Lose => MacroRatio { protein: 0.40, carbs: 0.30, fats: 0.30 },
        Goal::Maintain => MacroRatio { protein: 0.30, carbs: 0.40, fats: 0.30 },
        Goal::Gain => MacroRatio { protein: 0.30, carbs: 0.45, fats: 0.25 },
    }
}

/// Grams per macro for a calorie budget, rounded to whole grams
pub fn macro_grams(calories: u32, ratio: MacroRatio) -> Macronutrients {
    let calories = calories as f32;
    Macronutrients {
        protein: (calories * ratio.protein / 4.0).round(),
        carbs: (calories * ratio.carbs / 4.0).round(),
        fats: (calories * ratio.fats / 9.0).round(),
    }
}

/// Computes nutrition targets from a validated profile.
///
/// The calculator never validates; profiles are checked at intake.
#[derive(Debug, Clone)]
pub struct NutritionCalculator {
    formula: BmrFormula,
    goal_adjustment: f32,
    female_floor: u32,
    default_floor: u32,
}

impl NutritionCalculator {
    pub fn new() -> Self {
        Self {
            formula: BmrFormula::default(),
            goal_adjustment: 500.0,
            female_floor: 1200,
            default_floor: 1500,
        }
    }

    /// Configure the BMR formula (default: Mifflin-St Jeor)
    pub fn with_formula(mut self, formula: BmrFormula) -> Self {
        self.formula = formula;
        self
    }

    pub fn formula(&self) -> BmrFormula {
        self.formula
    }

    pub fn bmr(&self, profile: &UserProfile) -> f32 {
        let w = profile.weight;
        let h = profile.height;
        let a = profile.age as f32;
        let female = profile.gender == Gender::Female;

        match self.formula {
            BmrFormula::MifflinStJeor => {
                let base = 10.0 * w + 6.25 * h - 5.0 * a;
                if female { base - 161.0 } else { base + 5.0 }
            }
            BmrFormula::HarrisBenedict => {
                if female {
                    655.1 + 9.563 * w + 1.850 * h - 4.676 * a
                } else {
                    66.47 + 13.75 * w + 5.003 * h - 6.755 * a
                }
            }
        }
    }

    /// Lowest calorie target allowed for a gender
    pub fn calorie_floor(&self, gender: Gender) -> u32 {
        match gender {
            Gender::Female => self.female_floor,
            Gender::Male | Gender::Other => self.default_floor,
        }
    }

    pub fn calculate(&self, profile: &UserProfile) -> NutritionTargets {
        let bmr = self.bmr(profile);
        let tdee = bmr * activity_multiplier(profile.activity_level);

        let adjusted = match profile.goal {
            Goal::Lose => tdee - self.goal_adjustment,
            Goal::Maintain => tdee,
            Goal::Gain => tdee + self.goal_adjustment,
        };

        let floor = self.calorie_floor(profile.gender);
        let calorie_target = (adjusted.round().max(0.0) as u32).max(floor);

        debug!(
            formula = %self.formula,
            bmr,
            tdee,
            calorie_target,
            "Computed nutrition targets"
        );

        NutritionTargets {
            bmr,
            tdee,
            calorie_target,
            macronutrient_ratio: macro_grams(calorie_target, macro_ratio(profile.goal)),
            formula: self.formula,
        }
    }
}

impl Default for NutritionCalculator {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn profile(gender: Gender, activity: ActivityLevel, goal: Goal) -> UserProfile {
        UserProfile {
            age: 30,
            gender,
            height: 170.0,
            weight: 70.0,
            activity_level: activity,
            goal,
            diet_type: vec![],
            allergies: vec![],
        }
    }

    #[test]
    fn test_mifflin_female_reference_profile() {
        let calc = NutritionCalculator::new();
        let p = profile(Gender::Female, ActivityLevel::Moderate, Goal::Maintain);
        let targets = calc.calculate(&p);

        // 700 + 1062.5 - 150 - 161
        assert!((targets.bmr - 1451.5).abs() < 0.01);
        assert!((targets.tdee - 2249.825).abs() < 0.01);
        assert_eq!(targets.calorie_target, 2250);
        assert_eq!(targets.macronutrient_ratio, Macronutrients::new(169.0, 225.0, 75.0));
        assert_eq!(targets.formula, BmrFormula::MifflinStJeor);
    }

    #[test]
    fn test_mifflin_male_constant() {
        let calc = NutritionCalculator::new();
        let p = profile(Gender::Male, ActivityLevel::Sedentary, Goal::Maintain);
        assert!((calc.bmr(&p) - 1617.5).abs() < 0.01);
    }

    #[test]
    fn test_harris_benedict() {
        let calc = NutritionCalculator::new().with_formula(BmrFormula::HarrisBenedict);

        let female = profile(Gender::Female, ActivityLevel::Sedentary, Goal::Maintain);
        assert!((calc.bmr(&female) - 1498.73).abs() < 0.01);

        let male = profile(Gender::Male, ActivityLevel::Sedentary, Goal::Maintain);
        // 66.47 + 962.5 + 850.51 - 202.65
        assert!((calc.bmr(&male) - 1676.83).abs() < 0.01);
    }

    #[test]
    fn test_goal_adjustment() {
        let calc = NutritionCalculator::new();
        let maintain = calc.calculate(&profile(Gender::Male, ActivityLevel::Active, Goal::Maintain));
        let lose = calc.calculate(&profile(Gender::Male, ActivityLevel::Active, Goal::Lose));
        let gain = calc.calculate(&profile(Gender::Male, ActivityLevel::Active, Goal::Gain));

        assert_eq!(maintain.calorie_target - lose.calorie_target, 500);
        assert_eq!(gain.calorie_target - maintain.calorie_target, 500);
    }

    #[test]
    fn test_calorie_floor_per_gender() {
        let calc = NutritionCalculator::new();
        let tiny = |gender| UserProfile {
            age: 90,
            height: 100.0,
            weight: 30.0,
            ..profile(gender, ActivityLevel::Sedentary, Goal::Lose)
        };

        assert_eq!(calc.calculate(&tiny(Gender::Female)).calorie_target, 1200);
        assert_eq!(calc.calculate(&tiny(Gender::Male)).calorie_target, 1500);
        assert_eq!(calc.calculate(&tiny(Gender::Other)).calorie_target, 1500);
    }

    #[test]
    fn test_macro_energy_matches_target() {
        let calc = NutritionCalculator::new();
        let levels = [
            ActivityLevel::Sedentary,
            ActivityLevel::Light,
            ActivityLevel::Moderate,
            ActivityLevel::Active,
            ActivityLevel::VeryActive,
        ];
        for level in levels {
            for goal in [Goal::Lose, Goal::Maintain, Goal::Gain] {
                let targets = calc.calculate(&profile(Gender::Female, level, goal));
                let kcal = targets.macronutrient_ratio.kcal();
                assert!(
                    (kcal - targets.calorie_target as f32).abs() <= 10.0,
                    "{level:?}/{goal:?}: {kcal} vs {}",
                    targets.calorie_target
                );
            }
        }
    }

    #[test]
    fn test_formula_parsing() {
        assert_eq!("Harris_Benedict".parse::<BmrFormula>(), Ok(BmrFormula::HarrisBenedict));
        assert_eq!("mifflin".parse::<BmrFormula>(), Ok(BmrFormula::MifflinStJeor));
        assert!("katch-mcardle".parse::<BmrFormula>().is_err());
    }
}
