//! Core domain types for the meal planner.
//!
//! This module defines the fundamental data structures used throughout the system:
//! - Type aliases for domain clarity (UserId, RecipeId, FoodId)
//! - Closed enumerations for profile fields and meal slots
//! - Recipes, foods and the meals a plan is made of
//! - `RecipeIndex`, the in-memory catalog with its secondary indices

use crate::error::ProfileError;
use serde::{Deserialize, Deserializer, Serialize};
use std::collections::HashMap;
use std::fmt;
use std::ops::Add;
use std::str::FromStr;

// =============================================================================
// Type Aliases
// =============================================================================

/// Unique identifier for a registered user
pub type UserId = u32;

/// Unique identifier for a recipe in the catalog
pub type RecipeId = u32;

/// Unique identifier for a food in the catalog
pub type FoodId = u32;

// =============================================================================
// Profile enumerations
// =============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Gender {
    #[serde(alias = "male", alias = "M")]
    Male,
    #[serde(alias = "female", alias = "F")]
    Female,
    #[serde(alias = "other")]
    Other,
}

/// Activity level used to scale BMR into TDEE.
///
/// The longer labels ("Lightly Active" ... "Extra Active") are accepted on
/// input and map onto the five levels in order. Parsing ignores case,
/// spaces, hyphens and underscores.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String")]
pub enum ActivityLevel {
    Sedentary,
    Light,
    Moderate,
    Active,
    VeryActive,
}

/// Lowercase with separators dropped: "Weight-Gain" -> "weightgain"
fn squash(label: &str) -> String {
    label
        .chars()
        .filter(|c| c.is_alphanumeric())
        .flat_map(char::to_lowercase)
        .collect()
}

impl FromStr for ActivityLevel {
    type Err = String;

    /// "Very Active" is the fourth level; only the variant spellings
    /// `VeryActive` and `very_active` reach the fifth.
    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        let trimmed = s.trim();
        if trimmed == "VeryActive" || trimmed.eq_ignore_ascii_case("very_active") {
            return Ok(ActivityLevel::VeryActive);
        }
        match squash(trimmed).as_str() {
            "sedentary" => Ok(ActivityLevel::Sedentary),
            "light" | "lightlyactive" => Ok(ActivityLevel::Light),
            "moderate" | "moderatelyactive" => Ok(ActivityLevel::Moderate),
            "active" | "veryactive" => Ok(ActivityLevel::Active),
            "extraactive" => Ok(ActivityLevel::VeryActive),
            _ => Err(format!("unknown activity level: {}", s.trim())),
        }
    }
}

impl TryFrom<String> for ActivityLevel {
    type Error = String;

    fn try_from(value: String) -> std::result::Result<Self, Self::Error> {
        value.parse()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String")]
pub enum Goal {
    Lose,
    Maintain,
    Gain,
}

impl FromStr for Goal {
    type Err = String;

    /// Accepts "Lose", "lose weight", "Weight Loss", "maintenance", "weight gain" ...
    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match squash(s).as_str() {
            "lose" | "loseweight" | "weightloss" => Ok(Goal::Lose),
            "maintain" | "maintainweight" | "maintenance" | "weightmaintenance" => Ok(Goal::Maintain),
            "gain" | "gainweight" | "weightgain" => Ok(Goal::Gain),
            _ => Err(format!("unknown goal: {}", s.trim())),
        }
    }
}

impl TryFrom<String> for Goal {
    type Error = String;

    fn try_from(value: String) -> std::result::Result<Self, Self::Error> {
        value.parse()
    }
}

impl fmt::Display for Goal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Goal::Lose => "Lose weight",
            Goal::Maintain => "Maintain weight",
            Goal::Gain => "Gain weight",
        };
        f.write_str(label)
    }
}

// =============================================================================
// Meal slots
// =============================================================================

/// The slot a meal occupies in a day.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum MealType {
    Breakfast,
    Lunch,
    Dinner,
    Snack,
}

impl MealType {
    /// Every slot, in the order meals appear in a day
    pub const ALL: [MealType; 4] = [
        MealType::Breakfast,
        MealType::Lunch,
        MealType::Dinner,
        MealType::Snack,
    ];

    /// The three slots a default daily plan fills
    pub const MAIN: [MealType; 3] = [MealType::Breakfast, MealType::Lunch, MealType::Dinner];

    pub fn as_str(&self) -> &'static str {
        match self {
            MealType::Breakfast => "Breakfast",
            MealType::Lunch => "Lunch",
            MealType::Dinner => "Dinner",
            MealType::Snack => "Snack",
        }
    }
}

impl fmt::Display for MealType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for MealType {
    type Err = String;

    /// Case-insensitive, surrounding whitespace ignored
    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "breakfast" => Ok(MealType::Breakfast),
            "lunch" => Ok(MealType::Lunch),
            "dinner" => Ok(MealType::Dinner),
            "snack" | "snacks" => Ok(MealType::Snack),
            other => Err(format!("unknown meal type: {other}")),
        }
    }
}

// =============================================================================
// Nutrition values
// =============================================================================

/// Grams of each macronutrient.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Macronutrients {
    pub protein: f32,
    pub carbs: f32,
    #[serde(alias = "fat")]
    pub fats: f32,
}

impl Macronutrients {
    pub fn new(protein: f32, carbs: f32, fats: f32) -> Self {
        Self { protein, carbs, fats }
    }

    /// Multiply every component by `factor`
    pub fn scale(&self, factor: f32) -> Self {
        Self {
            protein: self.protein * factor,
            carbs: self.carbs * factor,
            fats: self.fats * factor,
        }
    }

    /// Round every component to whole grams
    pub fn rounded(&self) -> Self {
        Self {
            protein: self.protein.round(),
            carbs: self.carbs.round(),
            fats: self.fats.round(),
        }
    }

    /// Energy content at 4/4/9 kcal per gram
    pub fn kcal(&self) -> f32 {
        self.protein * 4.0 + self.carbs * 4.0 + self.fats * 9.0
    }
}

impl Add for Macronutrients {
    type Output = Macronutrients;

    fn add(self, other: Macronutrients) -> Macronutrients {
        Macronutrients {
            protein: self.protein + other.protein,
            carbs: self.carbs + other.carbs,
            fats: self.fats + other.fats,
        }
    }
}

// =============================================================================
// User profile
// =============================================================================

/// Physical and dietary data a user registers with.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserProfile {
    pub age: u32,
    pub gender: Gender,
    /// Centimetres
    pub height: f32,
    /// Kilograms
    pub weight: f32,
    pub activity_level: ActivityLevel,
    pub goal: Goal,
    /// Diet labels the user follows, e.g. `["vegetarian"]`
    #[serde(default, deserialize_with = "comma_list")]
    pub diet_type: Vec<String>,
    #[serde(default, deserialize_with = "comma_list")]
    pub allergies: Vec<String>,
}

impl UserProfile {
    pub const AGE_RANGE: (f32, f32) = (13.0, 120.0);
    pub const HEIGHT_RANGE: (f32, f32) = (100.0, 250.0);
    pub const WEIGHT_RANGE: (f32, f32) = (30.0, 300.0);

    /// Check numeric fields against their accepted ranges.
    ///
    /// Called at intake (registration and profile updates) so the
    /// calculators downstream can assume a sane profile.
    pub fn validate(&self) -> std::result::Result<(), ProfileError> {
        check_range("age", self.age as f32, Self::AGE_RANGE)?;
        check_range("height", self.height, Self::HEIGHT_RANGE)?;
        check_range("weight", self.weight, Self::WEIGHT_RANGE)?;
        Ok(())
    }
}

fn check_range(
    field: &'static str,
    value: f32,
    (min, max): (f32, f32),
) -> std::result::Result<(), ProfileError> {
    // NaN fails both comparisons, so test for containment instead of exclusion
    if value >= min && value <= max {
        Ok(())
    } else {
        Err(ProfileError::OutOfRange { field, min, max, value })
    }
}

/// Accept either a JSON list of strings or a single comma separated string.
///
/// Blank entries are dropped and the rest trimmed.
pub fn comma_list<'de, D>(deserializer: D) -> std::result::Result<Vec<String>, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum OneOrMany {
        One(String),
        Many(Vec<String>),
    }

    let raw = match OneOrMany::deserialize(deserializer)? {
        OneOrMany::One(s) => s.split(',').map(str::to_string).collect(),
        OneOrMany::Many(v) => v,
    };
    Ok(raw
        .into_iter()
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
        .collect())
}

// =============================================================================
// Catalog entities
// =============================================================================

/// A food with nutrition values per 100 g.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Food {
    pub id: FoodId,
    pub name: String,
    #[serde(default)]
    pub category: String,
    /// kcal per 100 g
    pub calories: f32,
    /// grams per 100 g
    pub macronutrients: Macronutrients,
    #[serde(default = "default_serving_size")]
    pub serving_size: f32,
}

fn default_serving_size() -> f32 {
    100.0
}

/// One line of a recipe's ingredient list.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Ingredient {
    pub name: String,
    /// Grams
    #[serde(default)]
    pub quantity: f32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub food_id: Option<FoodId>,
}

impl Ingredient {
    pub fn named(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            quantity: 0.0,
            food_id: None,
        }
    }
}

/// A recipe in the catalog.
///
/// Recipes are read-only input to planning: a plan stores copies of the
/// fields it needs, never a handle into the catalog.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Recipe {
    pub id: RecipeId,
    pub title: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub image: Option<String>,
    /// kcal per serving
    pub calories: f32,
    pub macronutrients: Macronutrients,
    #[serde(default, deserialize_with = "comma_list")]
    pub diet_type: Vec<String>,
    pub ingredients: Vec<Ingredient>,
    #[serde(default)]
    pub tags: Vec<String>,
    /// Slots this recipe suits; empty means untagged
    #[serde(default)]
    pub meal_types: Vec<MealType>,
    #[serde(default)]
    pub cooking_time: Option<u32>,
    #[serde(default)]
    pub instructions: Vec<String>,
    #[serde(default)]
    pub favorite_count: u32,
}

impl Recipe {
    /// Names of the first `n` ingredients
    pub fn main_ingredients(&self, n: usize) -> Vec<&str> {
        self.ingredients
            .iter()
            .take(n)
            .map(|i| i.name.as_str())
            .filter(|name| !name.is_empty())
            .collect()
    }

    /// True if any ingredient name equals `name` ignoring case and padding
    pub fn has_ingredient(&self, name: &str) -> bool {
        let needle = name.trim().to_lowercase();
        self.ingredients
            .iter()
            .any(|i| i.name.trim().to_lowercase() == needle)
    }
}

// =============================================================================
// Planned meals
// =============================================================================

/// One meal inside a plan.
///
/// A meal either copies its data from a catalog recipe (`has_recipe_details`)
/// or is a placeholder carrying only a title.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlannedMeal {
    #[serde(rename = "type")]
    pub meal_type: MealType,
    pub title: String,
    pub recipe_id: Option<RecipeId>,
    #[serde(default)]
    pub image: Option<String>,
    #[serde(default)]
    pub calories: f32,
    #[serde(default)]
    pub macronutrients: Macronutrients,
    #[serde(default)]
    pub ingredients: Vec<String>,
    pub has_recipe_details: bool,
}

impl PlannedMeal {
    pub fn from_recipe(meal_type: MealType, recipe: &Recipe) -> Self {
        Self {
            meal_type,
            title: recipe.title.clone(),
            recipe_id: Some(recipe.id),
            image: recipe.image.clone(),
            calories: recipe.calories,
            macronutrients: recipe.macronutrients,
            ingredients: recipe.ingredients.iter().map(|i| i.name.clone()).collect(),
            has_recipe_details: true,
        }
    }

    pub fn placeholder(meal_type: MealType, title: impl Into<String>) -> Self {
        Self {
            meal_type,
            title: title.into(),
            recipe_id: None,
            image: None,
            calories: 0.0,
            macronutrients: Macronutrients::default(),
            ingredients: Vec::new(),
            has_recipe_details: false,
        }
    }
}

// =============================================================================
// RecipeIndex - The In-Memory Catalog
// =============================================================================

/// Holds every recipe and food plus the lookups planning needs.
///
/// Secondary indices are keyed by lowercased labels so lookups are
/// case-insensitive. They are rebuilt by `build_secondary_indices` after
/// inserts or removals.
#[derive(Debug, Clone)]
pub struct RecipeIndex {
    pub(crate) recipes: HashMap<RecipeId, Recipe>,
    pub(crate) foods: HashMap<FoodId, Food>,

    /// Recipe ids per lowercased diet label
    pub(crate) diet_index: HashMap<String, Vec<RecipeId>>,
    /// Recipe ids per meal slot
    pub(crate) meal_type_index: HashMap<MealType, Vec<RecipeId>>,
    /// Recipe ids per lowercased ingredient name
    pub(crate) ingredient_index: HashMap<String, Vec<RecipeId>>,
    /// Food id per lowercased food name
    pub(crate) food_names: HashMap<String, FoodId>,
}

impl RecipeIndex {
    pub fn new() -> Self {
        Self {
            recipes: HashMap::new(),
            foods: HashMap::new(),
            diet_index: HashMap::new(),
            meal_type_index: HashMap::new(),
            ingredient_index: HashMap::new(),
            food_names: HashMap::new(),
        }
    }

    pub fn get_recipe(&self, id: RecipeId) -> Option<&Recipe> {
        self.recipes.get(&id)
    }

    pub fn get_food(&self, id: FoodId) -> Option<&Food> {
        self.foods.get(&id)
    }

    /// Case-insensitive lookup by food name
    pub fn get_food_by_name(&self, name: &str) -> Option<&Food> {
        let id = self.food_names.get(&name.trim().to_lowercase())?;
        self.foods.get(id)
    }

    /// All recipe ids in ascending order
    pub fn get_all_recipe_ids(&self) -> Vec<RecipeId> {
        let mut ids: Vec<RecipeId> = self.recipes.keys().copied().collect();
        ids.sort_unstable();
        ids
    }

    /// All recipes ordered by id
    pub fn recipes(&self) -> Vec<&Recipe> {
        let mut recipes: Vec<&Recipe> = self.recipes.values().collect();
        recipes.sort_unstable_by_key(|r| r.id);
        recipes
    }

    /// All foods ordered by id
    pub fn foods(&self) -> Vec<&Food> {
        let mut foods: Vec<&Food> = self.foods.values().collect();
        foods.sort_unstable_by_key(|f| f.id);
        foods
    }

    pub fn get_recipes_by_diet(&self, label: &str) -> &[RecipeId] {
        self.diet_index
            .get(&label.trim().to_lowercase())
            .map(|v| v.as_slice())
            .unwrap_or(&[])
    }

    pub fn get_recipes_by_meal_type(&self, meal_type: MealType) -> &[RecipeId] {
        self.meal_type_index
            .get(&meal_type)
            .map(|v| v.as_slice())
            .unwrap_or(&[])
    }

    pub fn get_recipes_with_ingredient(&self, name: &str) -> &[RecipeId] {
        self.ingredient_index
            .get(&name.trim().to_lowercase())
            .map(|v| v.as_slice())
            .unwrap_or(&[])
    }

    /// Insert or replace a recipe. Call `build_secondary_indices` afterwards.
    pub fn insert_recipe(&mut self, recipe: Recipe) {
        self.recipes.insert(recipe.id, recipe);
    }

    pub fn remove_recipe(&mut self, id: RecipeId) -> Option<Recipe> {
        self.recipes.remove(&id)
    }

    /// Insert or replace a food, keeping the name lookup current.
    pub fn insert_food(&mut self, food: Food) {
        if let Some(previous) = self.foods.get(&food.id) {
            self.food_names.remove(&previous.name.trim().to_lowercase());
        }
        self.food_names
            .insert(food.name.trim().to_lowercase(), food.id);
        self.foods.insert(food.id, food);
    }

    pub fn remove_food(&mut self, id: FoodId) -> Option<Food> {
        let food = self.foods.remove(&id)?;
        self.food_names.remove(&food.name.trim().to_lowercase());
        Some(food)
    }

    pub fn next_recipe_id(&self) -> RecipeId {
        self.recipes.keys().max().map_or(1, |id| id + 1)
    }

    pub fn next_food_id(&self) -> FoodId {
        self.foods.keys().max().map_or(1, |id| id + 1)
    }

    /// (recipes, foods)
    pub fn counts(&self) -> (usize, usize) {
        (self.recipes.len(), self.foods.len())
    }
}

impl Default for RecipeIndex {
    fn default() -> Self {
        Self::new()
    }
}
