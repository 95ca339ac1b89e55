//! Scored meal plans: daily, weekly, lookups, groceries, meal swaps.

use std::collections::BTreeMap;
use std::sync::Arc;

use axum::{
    Json, Router,
    extract::{Path, State},
    http::StatusCode,
    routing::{delete, get, post, put},
};
use chrono::NaiveDate;
use data_loader::{RecipeId, RecipeIndex};
use serde::{Deserialize, Serialize};
use serde_json::{Value, json};
use tracing::{info, instrument};
use uuid::Uuid;

use crate::auth::AuthUser;
use crate::error::{AppError, Result};
use crate::state::AppState;
use crate::store::{MealPlan, PlanSource};

use super::{plan_request, today};

pub fn router() -> Router<Arc<AppState>> {
    Router::new()
        .route("/daily", post(generate_daily))
        .route("/weekly", post(generate_weekly))
        .route("/date/:date", get(get_by_date))
        .route("/date/:date/groceries", get(grocery_list))
        .route("/meal", put(swap_meal))
        .route("/:id", delete(delete_plan))
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DailyPlanRequest {
    pub date: Option<NaiveDate>,
    /// Regenerate over an existing plan instead of failing
    #[serde(default)]
    pub replace: bool,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WeeklyPlanRequest {
    pub start_date: Option<NaiveDate>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SwapMealRequest {
    pub meal_id: Uuid,
    pub recipe_id: RecipeId,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GroceryItem {
    pub name: String,
    /// Grams, summed over every recipe that uses it
    pub quantity: f32,
    pub recipes: Vec<String>,
}

/// Ingredients of every resolved meal in `plan`, merged by name.
///
/// Placeholder meals contribute nothing. Items are sorted by name.
pub fn aggregate_groceries(plan: &MealPlan, catalog: &RecipeIndex) -> Vec<GroceryItem> {
    let mut items: BTreeMap<String, GroceryItem> = BTreeMap::new();

    let recipes = plan
        .meals
        .iter()
        .filter_map(|m| m.meal.recipe_id)
        .filter_map(|id| catalog.get_recipe(id));
    for recipe in recipes {
        for ingredient in &recipe.ingredients {
            let key = ingredient.name.trim().to_lowercase();
            let item = items.entry(key).or_insert_with(|| GroceryItem {
                name: ingredient.name.trim().to_string(),
                quantity: 0.0,
                recipes: Vec::new(),
            });
            item.quantity += ingredient.quantity;
            if !item.recipes.contains(&recipe.title) {
                item.recipes.push(recipe.title.clone());
            }
        }
    }
    items.into_values().collect()
}

#[instrument(skip(state, request))]
pub async fn generate_daily(
    State(state): State<Arc<AppState>>,
    AuthUser(user_id): AuthUser,
    Json(request): Json<DailyPlanRequest>,
) -> Result<(StatusCode, Json<MealPlan>)> {
    let date = request.date.unwrap_or_else(today);
    if !request.replace && state.store.plan_for(user_id, date).await.is_some() {
        return Err(AppError::Conflict(format!("Meal plan already exists for {}", date)));
    }

    let planning = plan_request(&state, user_id, date).await?;
    let catalog = state.store.catalog().await;
    let day = state.orchestrator.plan_day(catalog, &planning, date).await?;

    let plan = MealPlan::new(
        user_id,
        date,
        day.meals,
        Some(&planning.targets),
        day.relaxed,
        PlanSource::Scored,
    );
    let plan = if request.replace {
        state.store.replace_plan(plan.clone()).await;
        plan
    } else {
        state.store.insert_plan(plan).await?
    };

    info!(user_id, %date, plan_id = %plan.id, "Created daily meal plan");
    Ok((StatusCode::CREATED, Json(plan)))
}

/// Seven days from `startDate`, each replacing whatever the date had
#[instrument(skip(state, request))]
pub async fn generate_weekly(
    State(state): State<Arc<AppState>>,
    AuthUser(user_id): AuthUser,
    Json(request): Json<WeeklyPlanRequest>,
) -> Result<(StatusCode, Json<Vec<MealPlan>>)> {
    let start = request.start_date.unwrap_or_else(today);
    let planning = plan_request(&state, user_id, start).await?;
    let catalog = state.store.catalog().await;
    let week = state.orchestrator.plan_week(catalog, &planning, start).await?;

    let mut plans = Vec::with_capacity(week.len());
    for day in week {
        let plan = MealPlan::new(
            user_id,
            day.date,
            day.meals,
            Some(&planning.targets),
            day.relaxed,
            PlanSource::Scored,
        );
        state.store.replace_plan(plan.clone()).await;
        plans.push(plan);
    }

    info!(user_id, %start, days = plans.len(), "Created weekly meal plan");
    Ok((StatusCode::CREATED, Json(plans)))
}

pub async fn get_by_date(
    State(state): State<Arc<AppState>>,
    AuthUser(user_id): AuthUser,
    Path(date): Path<NaiveDate>,
) -> Result<Json<MealPlan>> {
    state
        .store
        .plan_for(user_id, date)
        .await
        .map(Json)
        .ok_or_else(|| AppError::not_found("Meal plan not found"))
}

pub async fn grocery_list(
    State(state): State<Arc<AppState>>,
    AuthUser(user_id): AuthUser,
    Path(date): Path<NaiveDate>,
) -> Result<Json<Vec<GroceryItem>>> {
    let plan = state
        .store
        .plan_for(user_id, date)
        .await
        .ok_or_else(|| AppError::not_found("Meal plan not found"))?;
    let catalog = state.store.catalog().await;
    Ok(Json(aggregate_groceries(&plan, &catalog)))
}

pub async fn swap_meal(
    State(state): State<Arc<AppState>>,
    AuthUser(user_id): AuthUser,
    Json(request): Json<SwapMealRequest>,
) -> Result<Json<MealPlan>> {
    let plan = state
        .store
        .swap_meal(user_id, request.meal_id, request.recipe_id)
        .await?;
    info!(user_id, meal_id = %request.meal_id, recipe_id = request.recipe_id, "Swapped meal");
    Ok(Json(plan))
}

pub async fn delete_plan(
    State(state): State<Arc<AppState>>,
    AuthUser(user_id): AuthUser,
    Path(id): Path<Uuid>,
) -> Result<Json<Value>> {
    state.store.delete_plan(user_id, id).await?;
    info!(user_id, plan_id = %id, "Deleted meal plan");
    Ok(Json(json!({ "message": "Meal plan removed" })))
}
