//! AI-assisted meals for the signed-in user.

use std::sync::Arc;

use axum::{
    Json, Router,
    extract::{Path, Query, State},
    http::StatusCode,
    routing::{get, post},
};
use chrono::NaiveDate;
use data_loader::{Recipe, RecipeId};
use nutrition::NutritionSummary;
use serde::Deserialize;
use tracing::{info, instrument};

use crate::auth::AuthUser;
use crate::error::{AppError, Result};
use crate::state::AppState;
use crate::store::{MealPlan, PlanSource};

use super::{plan_request, today};

const DEFAULT_MEALS_PER_DAY: usize = 3;

pub fn router() -> Router<Arc<AppState>> {
    Router::new()
        .route("/generate", post(generate_meals))
        .route("/today", get(todays_meals))
        .route("/nutrition/summary", get(nutrition_summary))
        .route("/recipe/:recipe_id", get(recipe_details))
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerateMealsRequest {
    pub date: Option<NaiveDate>,
    pub meals_per_day: Option<usize>,
}

#[derive(Debug, Deserialize)]
pub struct DateQuery {
    pub date: Option<NaiveDate>,
}

/// Ask the model for a plan and store it over whatever the date had.
///
/// The recipes of the plan being replaced are steered away from.
#[instrument(skip(state, request))]
pub async fn generate_meals(
    State(state): State<Arc<AppState>>,
    AuthUser(user_id): AuthUser,
    Json(request): Json<GenerateMealsRequest>,
) -> Result<(StatusCode, Json<MealPlan>)> {
    let date = request.date.unwrap_or_else(today);
    let meals_per_day = request.meals_per_day.unwrap_or(DEFAULT_MEALS_PER_DAY);

    let previous = state
        .store
        .plan_for(user_id, date)
        .await
        .map(|plan| plan.recipe_ids())
        .unwrap_or_default();

    let planning = plan_request(&state, user_id, date).await?;
    let catalog = state.store.catalog().await;
    let day = state
        .orchestrator
        .generate_ai_plan(catalog, &planning, &previous, date, meals_per_day)
        .await?;

    let plan = MealPlan::new(
        user_id,
        date,
        day.meals,
        Some(&planning.targets),
        day.relaxed,
        PlanSource::Ai,
    );
    let replaced = state.store.replace_plan(plan.clone()).await;

    info!(
        user_id,
        %date,
        meals = plan.meals.len(),
        replaced = replaced.is_some(),
        "Generated AI meal plan"
    );
    Ok((StatusCode::CREATED, Json(plan)))
}

pub async fn todays_meals(
    State(state): State<Arc<AppState>>,
    AuthUser(user_id): AuthUser,
) -> Result<Json<MealPlan>> {
    state
        .store
        .plan_for(user_id, today())
        .await
        .map(Json)
        .ok_or_else(|| AppError::NeedsGeneration("No meals found for today".to_string()))
}

pub async fn nutrition_summary(
    State(state): State<Arc<AppState>>,
    AuthUser(user_id): AuthUser,
    Query(DateQuery { date }): Query<DateQuery>,
) -> Result<Json<NutritionSummary>> {
    let date = date.unwrap_or_else(today);
    state
        .store
        .plan_for(user_id, date)
        .await
        .map(|plan| Json(plan.nutrition_summary))
        .ok_or_else(|| AppError::NeedsGeneration(format!("No meals found for {}", date)))
}

pub async fn recipe_details(
    State(state): State<Arc<AppState>>,
    AuthUser(_): AuthUser,
    Path(recipe_id): Path<RecipeId>,
) -> Result<Json<Recipe>> {
    let catalog = state.store.catalog().await;
    catalog
        .get_recipe(recipe_id)
        .cloned()
        .map(Json)
        .ok_or_else(|| AppError::not_found("Recipe not found"))
}
