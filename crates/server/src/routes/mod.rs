//! REST handlers, one module per resource.

use std::sync::Arc;

use axum::{Json, Router, routing::get};
use chrono::{NaiveDate, Utc};
use data_loader::UserId;
use serde_json::{Value, json};

use crate::error::Result;
use crate::orchestrator::PlanRequest;
use crate::state::AppState;

pub mod foods;
pub mod meal_plans;
pub mod meals;
pub mod recipes;
pub mod requirements;
pub mod users;

/// Everything under `/api`
pub fn api_router() -> Router<Arc<AppState>> {
    Router::new()
        .nest("/users", users::router())
        .nest("/foods", foods::router())
        .nest("/recipes", recipes::router())
        .nest("/nutritional-requirements", requirements::router())
        .nest("/meal-plans", meal_plans::router())
        .nest("/user/meals", meals::router())
}

pub async fn health() -> Json<Value> {
    Json(json!({ "status": "ok" }))
}

pub fn health_router() -> Router<Arc<AppState>> {
    Router::new().route("/health", get(health))
}

pub(crate) fn today() -> NaiveDate {
    Utc::now().date_naive()
}

/// Gather what planning needs for `user_id` on `date`.
///
/// Stored targets are used as-is. A user without any gets them computed
/// and stored here, once.
pub(crate) async fn plan_request(state: &AppState, user_id: UserId, date: NaiveDate) -> Result<PlanRequest> {
    let user = state.store.get_user(user_id).await?;
    let targets = match state.store.requirements(user_id).await {
        Some(targets) => targets,
        None => {
            let targets = state.orchestrator.calculate_targets(&user.profile);
            state.store.set_requirements(user_id, targets.clone()).await;
            targets
        }
    };

    Ok(PlanRequest {
        user_id,
        profile: user.profile,
        targets,
        liked: state.store.liked_recipes(user_id).await,
        history: state
            .store
            .recipe_history(user_id, date, state.orchestrator.recent_days())
            .await,
    })
}
