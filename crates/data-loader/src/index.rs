//! RecipeIndex building and indexing logic.
//!
//! - Load and validate a catalog file
//! - Build the secondary indices (diet, meal slot, ingredient)
//! - Derive recipe nutrition from the foods its ingredients reference

use crate::error::{DataLoadError, Result};
use crate::parser::{self, Catalog};
use crate::types::*;
use rayon::prelude::*;
use std::path::Path;
use tracing::{debug, info};

impl RecipeIndex {
    /// Load a catalog file into a validated index
    ///
    /// Steps:
    /// 1. Parse the JSON document
    /// 2. Insert foods and recipes, rejecting duplicates
    /// 3. Build secondary indices
    /// 4. Validate data integrity
    pub fn load_from_file(path: &Path) -> Result<Self> {
        info!("Loading recipe catalog from {:?}", path);

        let catalog = parser::parse_catalog(path)?;
        let index = Self::from_catalog(catalog)?;

        let (recipes, foods) = index.counts();
        info!("Catalog indexed: {} recipes, {} foods", recipes, foods);
        Ok(index)
    }

    /// Build a validated index from already parsed contents
    pub fn from_catalog(catalog: Catalog) -> Result<Self> {
        let mut index = RecipeIndex::new();

        for food in catalog.foods {
            if index.foods.contains_key(&food.id) {
                return Err(DataLoadError::Duplicate {
                    entity: "Food id".to_string(),
                    key: food.id.to_string(),
                });
            }
            if index.get_food_by_name(&food.name).is_some() {
                return Err(DataLoadError::Duplicate {
                    entity: "Food name".to_string(),
                    key: food.name,
                });
            }
            index.insert_food(food);
        }

        for recipe in catalog.recipes {
            if index.recipes.contains_key(&recipe.id) {
                return Err(DataLoadError::Duplicate {
                    entity: "Recipe id".to_string(),
                    key: recipe.id.to_string(),
                });
            }
            index.insert_recipe(recipe);
        }

        index.build_secondary_indices();
        index.validate()?;
        Ok(index)
    }

    /// Rebuild diet, meal slot and ingredient lookups from scratch
    ///
    /// Id lists are kept sorted so lookups return a stable order.
    pub fn build_secondary_indices(&mut self) {
        self.diet_index.clear();
        self.meal_type_index.clear();
        self.ingredient_index.clear();

        for (recipe_id, recipe) in &self.recipes {
            for label in &recipe.diet_type {
                self.diet_index
                    .entry(label.trim().to_lowercase())
                    .or_default()
                    .push(*recipe_id);
            }

            for meal_type in &recipe.meal_types {
                self.meal_type_index
                    .entry(*meal_type)
                    .or_default()
                    .push(*recipe_id);
            }

            for ingredient in &recipe.ingredients {
                let ids = self
                    .ingredient_index
                    .entry(ingredient.name.trim().to_lowercase())
                    .or_default();
                // A recipe may list the same ingredient twice
                if !ids.contains(recipe_id) {
                    ids.push(*recipe_id);
                }
            }
        }

        for ids in self
            .diet_index
            .values_mut()
            .chain(self.meal_type_index.values_mut())
            .chain(self.ingredient_index.values_mut())
        {
            ids.sort_unstable();
        }

        debug!(
            "Secondary indices built: {} diet labels, {} meal slots, {} ingredients",
            self.diet_index.len(),
            self.meal_type_index.len(),
            self.ingredient_index.len()
        );
    }

    /// Validate data integrity
    ///
    /// Check that:
    /// - Titles are present
    /// - Calories and macros are finite and non-negative
    /// - Ingredient food references exist
    pub fn validate(&self) -> Result<()> {
        self.foods.par_iter().try_for_each(|(_, food)| {
            check_nutrition("food.calories", &food.name, food.calories, &food.macronutrients)
        })?;

        self.recipes
            .par_iter()
            .try_for_each(|(_, recipe)| self.validate_recipe(recipe))
    }

    fn validate_recipe(&self, recipe: &Recipe) -> Result<()> {
        if recipe.title.is_empty() {
            return Err(DataLoadError::InvalidValue {
                field: "recipe.title".to_string(),
                value: format!("<empty> (id {})", recipe.id),
            });
        }

        check_nutrition(
            "recipe.calories",
            &recipe.title,
            recipe.calories,
            &recipe.macronutrients,
        )?;

        for ingredient in &recipe.ingredients {
            if let Some(food_id) = ingredient.food_id {
                if !self.foods.contains_key(&food_id) {
                    return Err(DataLoadError::MissingReference {
                        entity: "Food".to_string(),
                        id: food_id.to_string(),
                    });
                }
            }
        }
        Ok(())
    }

    /// Sum nutrition over an ingredient list.
    ///
    /// Each ingredient resolves to a food by `food_id`, falling back to its
    /// name. Food values are per 100 g, so each contributes
    /// `value * quantity / 100`. Totals are rounded to whole units.
    pub fn compute_nutrition(&self, ingredients: &[Ingredient]) -> Result<(f32, Macronutrients)> {
        let mut calories = 0.0;
        let mut macros = Macronutrients::default();

        for ingredient in ingredients {
            let food = ingredient
                .food_id
                .and_then(|id| self.get_food(id))
                .or_else(|| self.get_food_by_name(&ingredient.name))
                .ok_or_else(|| DataLoadError::MissingReference {
                    entity: "Food".to_string(),
                    id: ingredient
                        .food_id
                        .map(|id| id.to_string())
                        .unwrap_or_else(|| ingredient.name.clone()),
                })?;

            let factor = ingredient.quantity / 100.0;
            calories += food.calories * factor;
            macros = macros + food.macronutrients.scale(factor);
        }

        Ok((calories.round(), macros.rounded()))
    }
}

fn check_nutrition(field: &str, owner: &str, calories: f32, macros: &Macronutrients) -> Result<()> {
    let values = [
        (field, calories),
        ("protein", macros.protein),
        ("carbs", macros.carbs),
        ("fats", macros.fats),
    ];
    for (name, value) in values {
        if !value.is_finite() || value < 0.0 {
            return Err(DataLoadError::InvalidValue {
                field: name.to_string(),
                value: format!("{value} ({owner})"),
            });
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn food(id: FoodId, name: &str, calories: f32, macros: Macronutrients) -> Food {
        Food {
            id,
            name: name.to_string(),
            category: "Test".to_string(),
            calories,
            macronutrients: macros,
            serving_size: 100.0,
        }
    }

    fn recipe(id: RecipeId, title: &str, calories: f32) -> Recipe {
        Recipe {
            id,
            title: title.to_string(),
            description: String::new(),
            image: None,
            calories,
            macronutrients: Macronutrients::new(10.0, 20.0, 5.0),
            diet_type: vec!["Vegetarian".to_string()],
            ingredients: vec![Ingredient::named("Rice"), Ingredient::named("rice")],
            tags: vec![],
            meal_types: vec![MealType::Lunch],
            cooking_time: None,
            instructions: vec![],
            favorite_count: 0,
        }
    }

    #[test]
    fn test_secondary_indices_are_case_insensitive() {
        let catalog = Catalog {
            foods: vec![],
            recipes: vec![recipe(2, "Rice Bowl", 500.0), recipe(1, "Fried Rice", 650.0)],
        };
        let index = RecipeIndex::from_catalog(catalog).unwrap();

        assert_eq!(index.get_recipes_by_diet("vegetarian"), &[1, 2]);
        assert_eq!(index.get_recipes_by_meal_type(MealType::Lunch), &[1, 2]);
        // duplicated ingredient names index once per recipe
        assert_eq!(index.get_recipes_with_ingredient(" RICE "), &[1, 2]);
        assert!(index.get_recipes_by_meal_type(MealType::Breakfast).is_empty());
    }

    #[test]
    fn test_duplicate_recipe_id_rejected() {
        let catalog = Catalog {
            foods: vec![],
            recipes: vec![recipe(1, "A", 100.0), recipe(1, "B", 200.0)],
        };
        let err = RecipeIndex::from_catalog(catalog).unwrap_err();
        assert!(matches!(err, DataLoadError::Duplicate { .. }));
    }

    #[test]
    fn test_duplicate_food_name_rejected() {
        let catalog = Catalog {
            foods: vec![
                food(1, "Egg", 155.0, Macronutrients::default()),
                food(2, "egg", 155.0, Macronutrients::default()),
            ],
            recipes: vec![],
        };
        assert!(RecipeIndex::from_catalog(catalog).is_err());
    }

    #[test]
    fn test_validate_rejects_negative_calories() {
        let catalog = Catalog {
            foods: vec![],
            recipes: vec![recipe(1, "Bad", -10.0)],
        };
        let err = RecipeIndex::from_catalog(catalog).unwrap_err();
        assert!(matches!(err, DataLoadError::InvalidValue { .. }));
    }

    #[test]
    fn test_validate_rejects_unknown_food_reference() {
        let mut bad = recipe(1, "Omelette", 300.0);
        bad.ingredients = vec![Ingredient {
            name: "Egg".to_string(),
            quantity: 100.0,
            food_id: Some(42),
        }];
        let catalog = Catalog {
            foods: vec![],
            recipes: vec![bad],
        };
        let err = RecipeIndex::from_catalog(catalog).unwrap_err();
        assert!(matches!(err, DataLoadError::MissingReference { .. }));
    }

    #[test]
    fn test_compute_nutrition_scales_per_100g() {
        let mut index = RecipeIndex::new();
        index.insert_food(food(1, "Chicken Breast", 165.0, Macronutrients::new(31.0, 0.0, 3.6)));
        index.insert_food(food(2, "Rice", 130.0, Macronutrients::new(2.7, 28.0, 0.3)));

        let ingredients = vec![
            Ingredient {
                name: "Chicken Breast".to_string(),
                quantity: 200.0,
                food_id: Some(1),
            },
            Ingredient {
                name: "rice".to_string(),
                quantity: 150.0,
                food_id: None,
            },
        ];

        let (calories, macros) = index.compute_nutrition(&ingredients).unwrap();
        // 330 + 195
        assert_eq!(calories, 525.0);
        assert_eq!(macros.protein, 66.0);
        assert_eq!(macros.carbs, 42.0);
        assert_eq!(macros.fats, 8.0);
    }

    #[test]
    fn test_compute_nutrition_unknown_food() {
        let index = RecipeIndex::new();
        let err = index
            .compute_nutrition(&[Ingredient::named("Dragonfruit")])
            .unwrap_err();
        assert!(matches!(err, DataLoadError::MissingReference { .. }));
    }

    #[test]
    fn test_load_sample_catalog() {
        // Shipped sample data lives at the workspace root
        let path = Path::new("../../data/catalog.json");

        if path.exists() {
            let index = RecipeIndex::load_from_file(path).unwrap();
            let (recipes, foods) = index.counts();
            assert!(recipes > 0);
            assert!(foods > 0);
        }
    }
}
