//! Prompt construction for AI meal plans.
//!
//! The prompt lists the only recipes the model may use, each with its id,
//! and pins down the reply format the parser expects:
//! `- MealType: Title (ID: recipeId)`.

use data_loader::{Goal, Recipe, RecipeId};
use std::fmt::Write;

/// Recipes beyond this are left out of the prompt
pub const MAX_PROMPT_RECIPES: usize = 50;

pub struct MealPlanPrompt<'a> {
    calorie_target: u32,
    goal: Goal,
    diet_labels: Vec<String>,
    allergies: Vec<String>,
    previous_recipe_ids: Vec<RecipeId>,
    recipes: Vec<&'a Recipe>,
}

impl<'a> MealPlanPrompt<'a> {
    pub fn new(calorie_target: u32, goal: Goal) -> Self {
        Self {
            calorie_target,
            goal,
            diet_labels: Vec::new(),
            allergies: Vec::new(),
            previous_recipe_ids: Vec::new(),
            recipes: Vec::new(),
        }
    }

    pub fn with_diet(mut self, labels: &[String]) -> Self {
        self.diet_labels = labels.to_vec();
        self
    }

    pub fn with_allergies(mut self, allergies: &[String]) -> Self {
        self.allergies = allergies.to_vec();
        self
    }

    /// Recipe ids the user had for this date before regenerating
    pub fn with_previous(mut self, ids: impl IntoIterator<Item = RecipeId>) -> Self {
        self.previous_recipe_ids = ids.into_iter().collect();
        self.previous_recipe_ids.sort_unstable();
        self
    }

    /// Recipes the model may choose from; only the first
    /// [`MAX_PROMPT_RECIPES`] make it into the prompt
    pub fn with_recipes(mut self, recipes: impl IntoIterator<Item = &'a Recipe>) -> Self {
        self.recipes = recipes.into_iter().take(MAX_PROMPT_RECIPES).collect();
        self
    }

    /// Recipes that will appear in the prompt
    pub fn recipes(&self) -> &[&'a Recipe] {
        &self.recipes
    }

    fn diet_text(&self) -> String {
        if self.diet_labels.is_empty() {
            "general".to_string()
        } else {
            self.diet_labels.join(", ")
        }
    }

    fn previous_text(&self) -> String {
        self.previous_recipe_ids
            .iter()
            .map(|id| id.to_string())
            .collect::<Vec<_>>()
            .join(", ")
    }

    fn recipe_line(recipe: &Recipe) -> String {
        let calories = if recipe.calories > 0.0 {
            format!("{} calories", recipe.calories.round())
        } else {
            "calories not specified".to_string()
        };
        let diet = if recipe.diet_type.is_empty() {
            "Diet: general".to_string()
        } else {
            format!("Diet: {}", recipe.diet_type.join(", "))
        };
        let ingredients = recipe.main_ingredients(3);
        let ingredients = if ingredients.is_empty() {
            "Not specified".to_string()
        } else {
            ingredients.join(", ")
        };

        format!(
            "- {} (ID: {}): {}, {}. Main ingredients: {}",
            recipe.title, recipe.id, calories, diet, ingredients
        )
    }

    pub fn build(&self) -> String {
        let diet = self.diet_text();
        let mut prompt = String::new();

        // write! into a String cannot fail
        let _ = writeln!(
            prompt,
            "Create a daily meal plan for a user with a {} diet with approximately {} calories per day.",
            diet, self.calorie_target
        );
        if !self.allergies.is_empty() {
            let _ = writeln!(
                prompt,
                "The user has the following allergies or restrictions: {}.",
                self.allergies.join(", ")
            );
        }
        let _ = writeln!(prompt, "The user's health goal is: {}.", self.goal);
        prompt.push_str("The plan should include breakfast, lunch, and dinner.\n");

        if !self.previous_recipe_ids.is_empty() {
            let _ = writeln!(
                prompt,
                "IMPORTANT: The user previously had the following recipe IDs in their meal plan: {}.",
                self.previous_text()
            );
            prompt.push_str("Please choose DIFFERENT recipes for this meal plan to provide variety.\n");
        }

        prompt.push_str("\nUse ONLY the following recipes from my database when creating the meal plan:\n");
        for recipe in &self.recipes {
            prompt.push_str(&Self::recipe_line(recipe));
            prompt.push('\n');
        }

        prompt.push_str(
            "\nFormat your response exactly as follows:\n\
             - Breakfast: [Recipe Title] (ID: [Recipe ID])\n\
             - Lunch: [Recipe Title] (ID: [Recipe ID])\n\
             - Dinner: [Recipe Title] (ID: [Recipe ID])\n\n\
             IMPORTANT RULES:\n\
             1. You MUST use the exact recipe titles and IDs from the list I provided.\n\
             2. Try to balance nutrition across the day.\n\
             3. Follow this EXACT format for each meal: [Meal Type]: [Recipe Title] (ID: [Recipe ID])\n\
             4. Do not invent new recipes or IDs.\n\
             5. Try to stay within the target calories for the day.\n\
             6. Choose foods that work well together as a daily meal plan.\n",
        );
        let _ = writeln!(
            prompt,
            "7. Maintain consistency in diet types. Since the user prefers a {} diet, all three meals should follow this preference if possible.",
            diet
        );
        prompt.push_str(
            "8. MAKE SURE TO CHOOSE DIFFERENT RECIPES FROM ANY PREVIOUS MEAL PLANS.\n\
             9. When regenerate is clicked, make sure to generate different meal plan from the previous one.\n",
        );
        let _ = writeln!(
            prompt,
            "10. STRICTLY AVOID using any of these previously used recipe IDs: {}.",
            self.previous_text()
        );
        prompt.push_str(
            "11. If you must reuse a recipe, NEVER reuse more than one from the previous meal plan.\n\
             12. Prioritize variety - choose recipes with different main ingredients than previous meals.",
        );
        prompt
    }
}
