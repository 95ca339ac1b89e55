//! Parsing the model's free-text reply back into meals.
//!
//! Only lines starting with `-` are considered. Each must look like
//! `- MealType: Title (ID: recipeId)`; anything else is ignored. An id found
//! among the candidates resolves to that recipe, any other id becomes a
//! placeholder carrying the model's title. Missing slots are then filled
//! with "Not specified" placeholders so the plan has `meals_per_day` meals.

use data_loader::{MealType, PlannedMeal, Recipe, RecipeId};
use regex::Regex;
use std::collections::HashMap;
use std::sync::LazyLock;
use tracing::{debug, warn};

/// Title given to a slot the reply did not fill
pub const NOT_SPECIFIED: &str = "Not specified";

static MEAL_LINE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)- ([^:]+):\s*([^(]+)\s*\(ID:\s*([^)]+)\)").expect("meal line pattern")
});

/// One `- Type: Title (ID: id)` line, before lookup
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MealLine {
    pub meal_type: String,
    pub title: String,
    pub recipe_id: String,
}

/// Structured lines of `reply`, in order
pub fn meal_lines(reply: &str) -> Vec<MealLine> {
    reply
        .lines()
        .map(str::trim)
        .filter(|line| line.starts_with('-'))
        .filter_map(|line| {
            let caps = MEAL_LINE.captures(line)?;
            Some(MealLine {
                meal_type: caps[1].trim().to_string(),
                title: caps[2].trim().to_string(),
                recipe_id: caps[3].trim().to_string(),
            })
        })
        .collect()
}

/// Turn a model reply into planned meals.
///
/// `candidates` are the recipes the prompt offered; ids outside them never
/// resolve, even if the catalog knows them.
pub fn parse_meal_plan(reply: &str, candidates: &[&Recipe], meals_per_day: usize) -> Vec<PlannedMeal> {
    let by_id: HashMap<RecipeId, &Recipe> = candidates.iter().map(|r| (r.id, *r)).collect();
    let mut meals = Vec::new();

    for line in meal_lines(reply) {
        let meal_type = match line.meal_type.parse::<MealType>() {
            Ok(meal_type) => meal_type,
            Err(_) => {
                warn!(label = %line.meal_type, "Skipping reply line with unknown meal type");
                continue;
            }
        };

        let recipe = line
            .recipe_id
            .parse::<RecipeId>()
            .ok()
            .and_then(|id| by_id.get(&id));

        match recipe {
            Some(recipe) => meals.push(PlannedMeal::from_recipe(meal_type, recipe)),
            None => {
                warn!(recipe_id = %line.recipe_id, "Recipe ID from reply not among candidates");
                meals.push(PlannedMeal::placeholder(meal_type, line.title));
            }
        }
    }

    for meal_type in MealType::ALL {
        if meals.len() >= meals_per_day {
            break;
        }
        if !meals.iter().any(|m| m.meal_type == meal_type) {
            meals.push(PlannedMeal::placeholder(meal_type, NOT_SPECIFIED));
        }
    }

    debug!(
        meals = meals.len(),
        resolved = meals.iter().filter(|m| m.has_recipe_details).count(),
        "Parsed meal plan reply"
    );
    meals
}
