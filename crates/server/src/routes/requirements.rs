//! Per-user nutrition targets.

use std::sync::Arc;

use axum::{
    Json, Router,
    extract::State,
    http::StatusCode,
    routing::{get, post},
};
use data_loader::Macronutrients;
use nutrition::NutritionTargets;
use serde::Deserialize;
use tracing::info;

use crate::auth::AuthUser;
use crate::error::{AppError, Result};
use crate::state::AppState;

pub fn router() -> Router<Arc<AppState>> {
    Router::new()
        .route("/", get(get_requirements).put(override_requirements))
        .route("/generate", post(generate_requirements))
}

/// Manual override; absent fields keep their stored value
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RequirementsOverride {
    pub calorie_target: Option<u32>,
    pub macronutrient_ratio: Option<Macronutrients>,
}

pub async fn generate_requirements(
    State(state): State<Arc<AppState>>,
    AuthUser(user_id): AuthUser,
) -> Result<(StatusCode, Json<NutritionTargets>)> {
    let user = state.store.get_user(user_id).await?;
    let targets = state.orchestrator.calculate_targets(&user.profile);
    state.store.set_requirements(user_id, targets.clone()).await;

    info!(
        user_id,
        bmr = targets.bmr,
        tdee = targets.tdee,
        calorie_target = targets.calorie_target,
        "Generated nutritional requirements"
    );
    Ok((StatusCode::CREATED, Json(targets)))
}

pub async fn get_requirements(
    State(state): State<Arc<AppState>>,
    AuthUser(user_id): AuthUser,
) -> Result<Json<NutritionTargets>> {
    state
        .store
        .requirements(user_id)
        .await
        .map(Json)
        .ok_or_else(|| AppError::not_found("Nutritional requirements not found"))
}

pub async fn override_requirements(
    State(state): State<Arc<AppState>>,
    AuthUser(user_id): AuthUser,
    Json(request): Json<RequirementsOverride>,
) -> Result<Json<NutritionTargets>> {
    let mut targets = state
        .store
        .requirements(user_id)
        .await
        .ok_or_else(|| AppError::not_found("Nutritional requirements not found"))?;

    if let Some(calorie_target) = request.calorie_target {
        if calorie_target == 0 {
            return Err(AppError::bad_request("Calorie target must be positive"));
        }
        targets.calorie_target = calorie_target;
    }
    if let Some(macros) = request.macronutrient_ratio {
        if [macros.protein, macros.carbs, macros.fats].iter().any(|g| *g < 0.0) {
            return Err(AppError::bad_request("Macronutrient grams must be non-negative"));
        }
        targets.macronutrient_ratio = macros;
    }

    state.store.set_requirements(user_id, targets.clone()).await;
    info!(user_id, calorie_target = targets.calorie_target, "Overrode nutritional requirements");
    Ok(Json(targets))
}
