//! # Meal Plan Orchestrator
//!
//! Coordinates the planning pipeline for one user:
//! 1. Build the planning context from the profile
//! 2. Generate candidates from the catalog snapshot
//! 3. Match with relaxation (restrictions are never relaxed)
//! 4. Either select per slot by fit score, or hand the matches to the
//!    generative text API and parse its reply
//!
//! Matching and scoring are CPU-bound and run on the blocking pool. The AI
//! call is the only await on the network.

use std::collections::{BTreeMap, HashSet};
use std::sync::Arc;
use std::time::Instant;

use anyhow::Context;
use chrono::{Days, NaiveDate};
use thiserror::Error;
use tracing::{info, instrument, warn};

use data_loader::{MealType, PlannedMeal, Recipe, RecipeId, RecipeIndex, UserId, UserProfile};
use llm_client::{GeminiClient, LlmClientError, MealPlanPrompt, parse_meal_plan};
use nutrition::{NutritionCalculator, NutritionTargets};
use pipeline::{MatchOutcome, MealSelector, RecipeMatcher, Relaxation};
use sources::{CatalogSource, PlanningContext, PreferenceSource, user_context::build_planning_context};

use crate::config::Config;

/// Regeneration keeps previously used recipes out of the prompt unless
/// fewer than this many would remain
const MIN_FRESH_FOR_REGENERATION: usize = 3;

#[derive(Error, Debug)]
pub enum PlanError {
    #[error("No recipes found matching your dietary preferences. Please modify your requirements.")]
    NoCandidates,

    #[error(transparent)]
    Llm(#[from] LlmClientError),

    #[error(transparent)]
    Internal(#[from] anyhow::Error),
}

pub type Result<T> = std::result::Result<T, PlanError>;

/// Recipes served on each earlier date
pub type RecipeHistory = BTreeMap<NaiveDate, HashSet<RecipeId>>;

/// Recipes served in the `days` days before `date`
pub fn recent_within(history: &RecipeHistory, date: NaiveDate, days: u32) -> HashSet<RecipeId> {
    let start = date
        .checked_sub_days(Days::new(u64::from(days)))
        .unwrap_or(NaiveDate::MIN);
    history
        .range(start..date)
        .flat_map(|(_, ids)| ids.iter().copied())
        .collect()
}

/// Everything planning needs to know about a user
#[derive(Debug, Clone)]
pub struct PlanRequest {
    pub user_id: UserId,
    pub profile: UserProfile,
    pub targets: NutritionTargets,
    pub liked: HashSet<RecipeId>,
    /// Recipes the user had on dates before the planned one(s)
    pub history: RecipeHistory,
}

/// One day's meals and the constraints dropped to find them
#[derive(Debug, Clone)]
pub struct DayPlan {
    pub date: NaiveDate,
    pub meals: Vec<PlannedMeal>,
    pub relaxed: Vec<Relaxation>,
}

/// Main orchestrator that coordinates meal planning
#[derive(Clone)]
pub struct MealPlanOrchestrator {
    calculator: NutritionCalculator,
    gemini: GeminiClient,
    recent_days: u32,
    min_fresh: usize,
    meal_types: Vec<MealType>,
}

impl MealPlanOrchestrator {
    pub fn new(calculator: NutritionCalculator, gemini: GeminiClient) -> Self {
        Self {
            calculator,
            gemini,
            recent_days: 3,
            min_fresh: 5,
            meal_types: MealType::ALL.to_vec(),
        }
    }

    pub fn from_config(config: &Config) -> Self {
        let gemini = GeminiClient::new(config.gemini_api_key.clone())
            .with_base_url(config.gemini_api_url.clone())
            .with_model(config.gemini_model.clone())
            .with_temperature(config.gemini_temperature)
            .with_max_output_tokens(config.gemini_max_output_tokens)
            .with_timeout(config.ai_timeout);
        if !gemini.is_configured() {
            warn!("GEMINI_API_KEY not set, AI meal generation is disabled");
        }

        Self::new(NutritionCalculator::new().with_formula(config.bmr_formula), gemini)
            .with_recent_days(config.recent_days)
            .with_min_fresh(config.min_fresh_recipes)
    }

    /// Days of history that count as recent (default: 3)
    pub fn with_recent_days(mut self, days: u32) -> Self {
        self.recent_days = days;
        self
    }

    /// Fresh alternatives a slot needs before recent recipes are skipped (default: 5)
    pub fn with_min_fresh(mut self, min_fresh: usize) -> Self {
        self.min_fresh = min_fresh;
        self
    }

    /// Slots filled by scored plans (default: all four)
    pub fn with_meal_types(mut self, meal_types: &[MealType]) -> Self {
        self.meal_types = meal_types.to_vec();
        self
    }

    pub fn recent_days(&self) -> u32 {
        self.recent_days
    }

    pub fn calculate_targets(&self, profile: &UserProfile) -> NutritionTargets {
        self.calculator.calculate(profile)
    }

    /// Preference-ranked recipes for the "recommended" view
    pub fn recommend(&self, catalog: Arc<RecipeIndex>, request: &PlanRequest, limit: usize) -> anyhow::Result<Vec<RecipeId>> {
        let context = build_planning_context(&catalog, request.user_id, &request.profile)?
            .with_liked(request.liked.iter().copied());
        Ok(PreferenceSource::new(catalog)
            .get_candidates(&context, limit)
            .into_iter()
            .map(|c| c.recipe_id)
            .collect())
    }

    /// Scored plan for one date
    #[instrument(skip(self, catalog, request), fields(user_id = request.user_id))]
    pub async fn plan_day(&self, catalog: Arc<RecipeIndex>, request: &PlanRequest, date: NaiveDate) -> Result<DayPlan> {
        let start_time = Instant::now();
        let plan = tokio::task::spawn_blocking({
            let this = self.clone();
            let request = request.clone();
            move || {
                let recent = recent_within(&request.history, date, this.recent_days);
                this.plan_day_blocking(&catalog, &request, &recent, date)
            }
        })
        .await
        .context("Planning task panicked")??;

        info!(
            meals = plan.meals.len(),
            relaxed = ?plan.relaxed,
            elapsed = ?start_time.elapsed(),
            "Planned day"
        );
        Ok(plan)
    }

    /// Scored plans for 7 consecutive dates from `start`.
    ///
    /// Each day treats the `recent_days` dates before it as recent, whether
    /// they come from the user's history or from earlier days of this week.
    #[instrument(skip(self, catalog, request), fields(user_id = request.user_id))]
    pub async fn plan_week(&self, catalog: Arc<RecipeIndex>, request: &PlanRequest, start: NaiveDate) -> Result<Vec<DayPlan>> {
        let start_time = Instant::now();
        let week = tokio::task::spawn_blocking({
            let this = self.clone();
            let request = request.clone();
            move || -> Result<Vec<DayPlan>> {
                let mut history = request.history.clone();
                let mut week: Vec<DayPlan> = Vec::with_capacity(7);

                for date in start.iter_days().take(7) {
                    let recent = recent_within(&history, date, this.recent_days);
                    let day = this.plan_day_blocking(&catalog, &request, &recent, date)?;
                    history.insert(date, sources::user_context::collect_recipe_ids(&day.meals));
                    week.push(day);
                }
                Ok(week)
            }
        })
        .await
        .context("Weekly planning task panicked")??;

        info!(days = week.len(), elapsed = ?start_time.elapsed(), "Planned week");
        Ok(week)
    }

    /// AI-assisted plan for one date.
    ///
    /// `previous` holds the recipes of the plan being regenerated; they are
    /// left out of the prompt unless that would leave fewer than three.
    #[instrument(skip(self, catalog, request, previous), fields(user_id = request.user_id))]
    pub async fn generate_ai_plan(
        &self,
        catalog: Arc<RecipeIndex>,
        request: &PlanRequest,
        previous: &HashSet<RecipeId>,
        date: NaiveDate,
        meals_per_day: usize,
    ) -> Result<DayPlan> {
        let outcome = tokio::task::spawn_blocking({
            let catalog = catalog.clone();
            let request = request.clone();
            move || Self::match_recipes(&catalog, &request)
        })
        .await
        .context("Matching task panicked")??;

        if outcome.is_empty() {
            return Err(PlanError::NoCandidates);
        }

        let matched: Vec<&Recipe> = outcome
            .candidates
            .iter()
            .filter_map(|c| catalog.get_recipe(c.recipe_id))
            .collect();
        let offered = Self::exclude_previous(matched.clone(), previous);

        let prompt = MealPlanPrompt::new(request.targets.calorie_target, request.profile.goal)
            .with_diet(&request.profile.diet_type)
            .with_allergies(&request.profile.allergies)
            .with_previous(previous.iter().copied())
            .with_recipes(offered);

        info!(offered = prompt.recipes().len(), "Requesting AI meal plan");
        let reply = self.gemini.generate(&prompt.build()).await?;
        // Any matched recipe resolves, including ones left out of the prompt
        let meals = parse_meal_plan(&reply, &matched, meals_per_day.clamp(1, MealType::ALL.len()));

        Ok(DayPlan {
            date,
            meals,
            relaxed: outcome.relaxed,
        })
    }

    fn exclude_previous<'a>(matched: Vec<&'a Recipe>, previous: &HashSet<RecipeId>) -> Vec<&'a Recipe> {
        if previous.is_empty() {
            return matched;
        }
        let fresh: Vec<&Recipe> = matched
            .iter()
            .copied()
            .filter(|r| !previous.contains(&r.id))
            .collect();
        if fresh.len() < MIN_FRESH_FOR_REGENERATION {
            warn!(
                fresh = fresh.len(),
                "Not enough new recipes, offering previous ones again"
            );
            matched
        } else {
            fresh
        }
    }

    fn context_for(catalog: &RecipeIndex, request: &PlanRequest) -> anyhow::Result<PlanningContext> {
        let context = build_planning_context(catalog, request.user_id, &request.profile)
            .context("Failed to build planning context")?
            .with_calorie_target(request.targets.calorie_target)
            .with_liked(request.liked.iter().copied());
        Ok(context)
    }

    fn match_recipes(catalog: &Arc<RecipeIndex>, request: &PlanRequest) -> Result<MatchOutcome> {
        let context = Self::context_for(catalog, request)?;
        let candidates = CatalogSource::new(catalog.clone()).get_candidates(&context, usize::MAX);
        Ok(RecipeMatcher::new(catalog.clone()).find_matches(candidates, &context)?)
    }

    fn plan_day_blocking(
        &self,
        catalog: &Arc<RecipeIndex>,
        request: &PlanRequest,
        recent: &HashSet<RecipeId>,
        date: NaiveDate,
    ) -> Result<DayPlan> {
        let outcome = Self::match_recipes(catalog, request)?;
        if outcome.is_empty() {
            return Err(PlanError::NoCandidates);
        }

        let context = Self::context_for(catalog, request)?.with_recent(recent.iter().copied());
        let meals = MealSelector::new(catalog.clone()).with_min_fresh(self.min_fresh).plan_day(
            &outcome.candidates,
            &request.targets,
            &self.meal_types,
            &context,
        )?;

        Ok(DayPlan {
            date,
            meals,
            relaxed: outcome.relaxed,
        })
    }
}
