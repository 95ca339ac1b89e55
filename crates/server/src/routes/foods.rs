use std::sync::Arc;

use axum::{
    Json, Router,
    extract::{Path, State},
    http::StatusCode,
    routing::get,
};
use data_loader::{DataLoadError, Food, FoodId, Macronutrients};
use serde::Deserialize;
use serde_json::{Value, json};
use tracing::info;

use crate::auth::AuthUser;
use crate::error::{AppError, Result};
use crate::state::AppState;
use crate::store::StoreError;

pub fn router() -> Router<Arc<AppState>> {
    Router::new()
        .route("/", get(list_foods).post(create_food))
        .route("/:id", get(get_food).put(update_food).delete(delete_food))
}

/// Nutrition values are per 100 g
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FoodRequest {
    pub name: String,
    #[serde(default)]
    pub category: String,
    pub calories: f32,
    pub macronutrients: Macronutrients,
    pub serving_size: Option<f32>,
}

impl FoodRequest {
    /// Checked food; the id is assigned by the caller
    fn into_food(self) -> Result<Food> {
        let name = self.name.trim().to_string();
        if name.is_empty() {
            return Err(AppError::bad_request("Food name is required"));
        }
        let m = &self.macronutrients;
        if [self.calories, m.protein, m.carbs, m.fats].iter().any(|v| *v < 0.0 || !v.is_finite()) {
            return Err(AppError::bad_request("Nutrition values must be non-negative"));
        }
        Ok(Food {
            id: 0,
            name,
            category: self.category,
            calories: self.calories,
            macronutrients: self.macronutrients,
            serving_size: self.serving_size.filter(|s| *s > 0.0).unwrap_or(100.0),
        })
    }
}

fn duplicate_name(name: &str) -> StoreError {
    StoreError::Catalog(DataLoadError::Duplicate {
        entity: "food".to_string(),
        key: name.to_string(),
    })
}

pub async fn list_foods(State(state): State<Arc<AppState>>) -> Json<Vec<Food>> {
    let catalog = state.store.catalog().await;
    Json(catalog.foods().into_iter().cloned().collect())
}

pub async fn get_food(State(state): State<Arc<AppState>>, Path(id): Path<FoodId>) -> Result<Json<Food>> {
    let catalog = state.store.catalog().await;
    catalog
        .get_food(id)
        .cloned()
        .map(Json)
        .ok_or_else(|| AppError::not_found("Food not found"))
}

pub async fn create_food(
    State(state): State<Arc<AppState>>,
    AuthUser(user_id): AuthUser,
    Json(request): Json<FoodRequest>,
) -> Result<(StatusCode, Json<Food>)> {
    let food = request.into_food()?;
    let food = state
        .store
        .update_catalog(|catalog| {
            if catalog.get_food_by_name(&food.name).is_some() {
                return Err(duplicate_name(&food.name));
            }
            let food = Food { id: catalog.next_food_id(), ..food };
            catalog.insert_food(food.clone());
            Ok(food)
        })
        .await?;

    info!(user_id, food_id = food.id, "Created food");
    Ok((StatusCode::CREATED, Json(food)))
}

pub async fn update_food(
    State(state): State<Arc<AppState>>,
    AuthUser(user_id): AuthUser,
    Path(id): Path<FoodId>,
    Json(request): Json<FoodRequest>,
) -> Result<Json<Food>> {
    let food = Food { id, ..request.into_food()? };
    let food = state
        .store
        .update_catalog(|catalog| {
            if catalog.get_food(id).is_none() {
                return Err(StoreError::NotFound { entity: "Food" });
            }
            if catalog.get_food_by_name(&food.name).is_some_and(|f| f.id != id) {
                return Err(duplicate_name(&food.name));
            }
            catalog.insert_food(food.clone());
            Ok(food)
        })
        .await?;

    info!(user_id, food_id = id, "Updated food");
    Ok(Json(food))
}

pub async fn delete_food(
    State(state): State<Arc<AppState>>,
    AuthUser(user_id): AuthUser,
    Path(id): Path<FoodId>,
) -> Result<Json<Value>> {
    state
        .store
        .update_catalog(|catalog| {
            catalog
                .remove_food(id)
                .ok_or(StoreError::NotFound { entity: "Food" })
        })
        .await?;

    info!(user_id, food_id = id, "Deleted food");
    Ok(Json(json!({ "message": "Food removed" })))
}
