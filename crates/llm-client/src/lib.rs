//! # LLM Client Crate
//!
//! Talks to the Gemini generative text API on behalf of the meal planner.
//!
//! ## Components
//!
//! - **client**: `GeminiClient`, one `generateContent` call per plan
//! - **prompt**: `MealPlanPrompt`, the text sent to the model
//! - **parser**: turns the model's reply back into `PlannedMeal`s
//!
//! ## Example Usage
//!
//! ```ignore
//! use llm_client::{parse_meal_plan, GeminiClient, MealPlanPrompt};
//!
//! let client = GeminiClient::new(std::env::var("GEMINI_API_KEY").ok());
//! let prompt = MealPlanPrompt::new(2100, goal)
//!     .with_diet(&profile.diet_type)
//!     .with_allergies(&profile.allergies)
//!     .with_recipes(candidates.iter().copied());
//!
//! let reply = client.generate(&prompt.build()).await?;
//! let meals = parse_meal_plan(&reply, prompt.recipes(), 3);
//! ```

pub mod client;
pub mod error;
pub mod parser;
pub mod prompt;

pub use client::{GeminiClient, DEFAULT_API_URL, DEFAULT_MODEL};
pub use error::{LlmClientError, Result};
pub use parser::{meal_lines, parse_meal_plan, MealLine, NOT_SPECIFIED};
pub use prompt::{MealPlanPrompt, MAX_PROMPT_RECIPES};
