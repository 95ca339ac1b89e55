//! Recipe catalog: browsing, search, range filters, recommendations and
//! favourites. Recipes created here get their nutrition from the food table.

use std::sync::Arc;

use axum::{
    Json, Router,
    extract::{Path, Query, State},
    http::StatusCode,
    routing::{get, post},
};
use data_loader::{Ingredient, MealType, Recipe, RecipeId, RecipeIndex, UserId, types::comma_list};
use serde::{Deserialize, Serialize};
use serde_json::{Value, json};
use tracing::{debug, info};

use crate::auth::AuthUser;
use crate::error::{AppError, Result};
use crate::state::AppState;
use crate::store::StoreError;

use super::{plan_request, today};

const DEFAULT_RECOMMENDATIONS: usize = 10;

pub fn router() -> Router<Arc<AppState>> {
    Router::new()
        .route("/", get(list_recipes).post(create_recipe))
        .route("/search", get(search_recipes))
        .route("/filter", get(filter_recipes))
        .route("/recommended/user", get(recommended_recipes))
        .route("/:id", get(get_recipe).put(update_recipe).delete(delete_recipe))
        .route("/:id/like", post(like_recipe).delete(unlike_recipe))
}

// =============================================================================
// Requests
// =============================================================================

#[derive(Debug, Deserialize)]
pub struct SearchQuery {
    #[serde(default)]
    pub query: String,
}

/// Inclusive bounds; absent bounds are open
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RecipeFilter {
    pub min_calories: Option<f32>,
    pub max_calories: Option<f32>,
    pub min_protein: Option<f32>,
    pub max_protein: Option<f32>,
    pub min_carbs: Option<f32>,
    pub max_carbs: Option<f32>,
    pub min_fats: Option<f32>,
    pub max_fats: Option<f32>,
    /// Comma-separated; a recipe must contain every one
    pub ingredients: Option<String>,
}

fn within(value: f32, min: Option<f32>, max: Option<f32>) -> bool {
    min.is_none_or(|m| value >= m) && max.is_none_or(|m| value <= m)
}

impl RecipeFilter {
    pub fn matches(&self, recipe: &Recipe) -> bool {
        let m = &recipe.macronutrients;
        within(recipe.calories, self.min_calories, self.max_calories)
            && within(m.protein, self.min_protein, self.max_protein)
            && within(m.carbs, self.min_carbs, self.max_carbs)
            && within(m.fats, self.min_fats, self.max_fats)
            && self.ingredients.as_deref().is_none_or(|list| {
                list.split(',')
                    .map(str::trim)
                    .filter(|name| !name.is_empty())
                    .all(|name| recipe.has_ingredient(name))
            })
    }
}

#[derive(Debug, Deserialize)]
pub struct LimitQuery {
    pub limit: Option<usize>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RecipeRequest {
    pub title: String,
    #[serde(default)]
    pub description: String,
    pub image: Option<String>,
    pub ingredients: Vec<Ingredient>,
    #[serde(default, deserialize_with = "comma_list")]
    pub diet_type: Vec<String>,
    #[serde(default)]
    pub tags: Vec<String>,
    #[serde(default)]
    pub meal_types: Vec<MealType>,
    pub cooking_time: Option<u32>,
    #[serde(default)]
    pub instructions: Vec<String>,
}

impl RecipeRequest {
    /// Build the recipe with nutrition summed from the food table
    fn into_recipe(self, id: RecipeId, catalog: &RecipeIndex) -> data_loader::Result<Recipe> {
        let (calories, macronutrients) = catalog.compute_nutrition(&self.ingredients)?;
        Ok(Recipe {
            id,
            title: self.title.trim().to_string(),
            description: self.description,
            image: self.image,
            calories,
            macronutrients,
            diet_type: self.diet_type,
            ingredients: self.ingredients,
            tags: self.tags,
            meal_types: self.meal_types,
            cooking_time: self.cooking_time,
            instructions: self.instructions,
            favorite_count: 0,
        })
    }

    fn check(&self) -> Result<()> {
        if self.title.trim().is_empty() {
            return Err(AppError::bad_request("Recipe title is required"));
        }
        if self.ingredients.is_empty() {
            return Err(AppError::bad_request("A recipe needs at least one ingredient"));
        }
        if self.ingredients.iter().any(|i| i.quantity <= 0.0) {
            return Err(AppError::bad_request("Ingredient quantities must be positive"));
        }
        Ok(())
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LikeResponse {
    pub liked: bool,
    pub favorite_count: u32,
}

// =============================================================================
// Handlers
// =============================================================================

pub async fn list_recipes(State(state): State<Arc<AppState>>) -> Json<Vec<Recipe>> {
    let catalog = state.store.catalog().await;
    Json(catalog.recipes().into_iter().cloned().collect())
}

pub async fn get_recipe(State(state): State<Arc<AppState>>, Path(id): Path<RecipeId>) -> Result<Json<Recipe>> {
    let catalog = state.store.catalog().await;
    catalog
        .get_recipe(id)
        .cloned()
        .map(Json)
        .ok_or_else(|| AppError::not_found("Recipe not found"))
}

/// Title or ingredient name containing the query, ignoring case.
/// Each recipe appears once however many fields match.
pub async fn search_recipes(
    State(state): State<Arc<AppState>>,
    Query(SearchQuery { query }): Query<SearchQuery>,
) -> Result<Json<Vec<Recipe>>> {
    let needle = query.trim().to_lowercase();
    if needle.is_empty() {
        return Err(AppError::bad_request("Search query is required"));
    }

    let catalog = state.store.catalog().await;
    let found: Vec<Recipe> = catalog
        .recipes()
        .into_iter()
        .filter(|recipe| {
            recipe.title.to_lowercase().contains(&needle)
                || recipe
                    .ingredients
                    .iter()
                    .any(|i| i.name.to_lowercase().contains(&needle))
        })
        .cloned()
        .collect();

    debug!(query = %needle, found = found.len(), "Recipe search");
    Ok(Json(found))
}

pub async fn filter_recipes(
    State(state): State<Arc<AppState>>,
    Query(filter): Query<RecipeFilter>,
) -> Json<Vec<Recipe>> {
    let catalog = state.store.catalog().await;
    Json(
        catalog
            .recipes()
            .into_iter()
            .filter(|recipe| filter.matches(recipe))
            .cloned()
            .collect(),
    )
}

pub async fn recommended_recipes(
    State(state): State<Arc<AppState>>,
    AuthUser(user_id): AuthUser,
    Query(LimitQuery { limit }): Query<LimitQuery>,
) -> Result<Json<Vec<Recipe>>> {
    let request = plan_request(&state, user_id, today()).await?;
    let catalog = state.store.catalog().await;
    let limit = limit.unwrap_or(DEFAULT_RECOMMENDATIONS);

    let ids = state.orchestrator.recommend(catalog.clone(), &request, limit)?;
    Ok(Json(
        ids.into_iter()
            .filter_map(|id| catalog.get_recipe(id).cloned())
            .collect(),
    ))
}

pub async fn create_recipe(
    State(state): State<Arc<AppState>>,
    AuthUser(user_id): AuthUser,
    Json(request): Json<RecipeRequest>,
) -> Result<(StatusCode, Json<Recipe>)> {
    request.check()?;
    let recipe = state
        .store
        .update_catalog(|catalog| {
            let recipe = request.into_recipe(catalog.next_recipe_id(), catalog)?;
            catalog.insert_recipe(recipe.clone());
            Ok(recipe)
        })
        .await?;

    info!(user_id, recipe_id = recipe.id, calories = recipe.calories, "Created recipe");
    Ok((StatusCode::CREATED, Json(recipe)))
}

pub async fn update_recipe(
    State(state): State<Arc<AppState>>,
    AuthUser(user_id): AuthUser,
    Path(id): Path<RecipeId>,
    Json(request): Json<RecipeRequest>,
) -> Result<Json<Recipe>> {
    request.check()?;
    let recipe = state
        .store
        .update_catalog(|catalog| {
            let favorite_count = catalog
                .get_recipe(id)
                .map(|r| r.favorite_count)
                .ok_or(StoreError::NotFound { entity: "Recipe" })?;
            let recipe = Recipe {
                favorite_count,
                ..request.into_recipe(id, catalog)?
            };
            catalog.insert_recipe(recipe.clone());
            Ok(recipe)
        })
        .await?;

    info!(user_id, recipe_id = id, "Updated recipe");
    Ok(Json(recipe))
}

pub async fn delete_recipe(
    State(state): State<Arc<AppState>>,
    AuthUser(user_id): AuthUser,
    Path(id): Path<RecipeId>,
) -> Result<Json<Value>> {
    state
        .store
        .update_catalog(|catalog| {
            catalog
                .remove_recipe(id)
                .ok_or(StoreError::NotFound { entity: "Recipe" })
        })
        .await?;

    info!(user_id, recipe_id = id, "Deleted recipe");
    Ok(Json(json!({ "message": "Recipe removed" })))
}

async fn set_like(state: &AppState, user_id: UserId, id: RecipeId, liked: bool) -> Result<Json<LikeResponse>> {
    state.store.set_like(user_id, id, liked).await?;
    let favorite_count = state
        .store
        .catalog()
        .await
        .get_recipe(id)
        .map(|r| r.favorite_count)
        .unwrap_or_default();
    Ok(Json(LikeResponse { liked, favorite_count }))
}

pub async fn like_recipe(
    State(state): State<Arc<AppState>>,
    AuthUser(user_id): AuthUser,
    Path(id): Path<RecipeId>,
) -> Result<Json<LikeResponse>> {
    set_like(&state, user_id, id, true).await
}

pub async fn unlike_recipe(
    State(state): State<Arc<AppState>>,
    AuthUser(user_id): AuthUser,
    Path(id): Path<RecipeId>,
) -> Result<Json<LikeResponse>> {
    set_like(&state, user_id, id, false).await
}
