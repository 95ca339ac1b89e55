//! Registration, login and profile.

use std::sync::Arc;

use axum::{
    Json, Router,
    extract::State,
    http::StatusCode,
    routing::{get, post},
};
use data_loader::{ActivityLevel, Gender, Goal, UserProfile, types::comma_list};
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::{Value, json};
use tracing::{info, instrument};

use crate::auth::{AuthUser, hash_password, verify_password};
use crate::error::{AppError, Result};
use crate::state::AppState;
use crate::store::UserRecord;

const MIN_PASSWORD_LEN: usize = 6;

pub fn router() -> Router<Arc<AppState>> {
    Router::new()
        .route("/register", post(register))
        .route("/login", post(login))
        .route("/logout", post(logout))
        .route("/profile", get(get_profile).put(update_profile))
}

#[derive(Debug, Deserialize)]
pub struct RegisterRequest {
    pub name: String,
    pub email: String,
    pub password: String,
    #[serde(flatten)]
    pub profile: UserProfile,
}

#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

/// Profile update; absent fields are left as they are
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateProfileRequest {
    pub name: Option<String>,
    pub email: Option<String>,
    pub password: Option<String>,
    pub age: Option<u32>,
    pub gender: Option<Gender>,
    pub height: Option<f32>,
    pub weight: Option<f32>,
    pub activity_level: Option<ActivityLevel>,
    pub goal: Option<Goal>,
    #[serde(default, deserialize_with = "some_comma_list")]
    pub diet_type: Option<Vec<String>>,
    #[serde(default, deserialize_with = "some_comma_list")]
    pub allergies: Option<Vec<String>>,
}

fn some_comma_list<'de, D>(deserializer: D) -> std::result::Result<Option<Vec<String>>, D::Error>
where
    D: Deserializer<'de>,
{
    comma_list(deserializer).map(Some)
}

#[derive(Debug, Serialize)]
pub struct AuthResponse {
    pub token: String,
    pub user: UserRecord,
}

fn check_email(email: &str) -> Result<()> {
    if !email.contains('@') {
        return Err(AppError::bad_request("A valid email is required"));
    }
    Ok(())
}

fn check_password(password: &str) -> Result<()> {
    if password.len() < MIN_PASSWORD_LEN {
        return Err(AppError::bad_request(format!(
            "Password must be at least {} characters",
            MIN_PASSWORD_LEN
        )));
    }
    Ok(())
}

#[instrument(skip_all)]
pub async fn register(
    State(state): State<Arc<AppState>>,
    Json(request): Json<RegisterRequest>,
) -> Result<(StatusCode, Json<AuthResponse>)> {
    let name = request.name.trim().to_string();
    if name.is_empty() {
        return Err(AppError::bad_request("Name is required"));
    }
    check_email(&request.email)?;
    check_password(&request.password)?;
    request.profile.validate()?;

    if state.store.find_user_by_email(&request.email).await.is_some() {
        return Err(AppError::bad_request("User already exists"));
    }

    let password_hash = hash_password(request.password, state.config.bcrypt_cost).await?;
    let user = state
        .store
        .create_user(name, request.email, password_hash, request.profile)
        .await?;

    let targets = state.orchestrator.calculate_targets(&user.profile);
    state.store.set_requirements(user.id, targets).await;

    info!(user_id = user.id, "Registered user");
    let token = state.jwt.issue(user.id)?;
    Ok((StatusCode::CREATED, Json(AuthResponse { token, user })))
}

pub async fn login(
    State(state): State<Arc<AppState>>,
    Json(request): Json<LoginRequest>,
) -> Result<Json<AuthResponse>> {
    let invalid = || AppError::unauthorized("Invalid email or password");

    let user = state
        .store
        .find_user_by_email(&request.email)
        .await
        .ok_or_else(invalid)?;
    if !verify_password(request.password, user.password_hash.clone()).await? {
        return Err(invalid());
    }

    let token = state.jwt.issue(user.id)?;
    Ok(Json(AuthResponse { token, user }))
}

pub async fn logout() -> Json<Value> {
    Json(json!({ "message": "Logged out successfully" }))
}

pub async fn get_profile(
    State(state): State<Arc<AppState>>,
    AuthUser(user_id): AuthUser,
) -> Result<Json<UserRecord>> {
    Ok(Json(state.store.get_user(user_id).await?))
}

/// Applies the update, revalidates, and recomputes the stored targets
#[instrument(skip(state, request))]
pub async fn update_profile(
    State(state): State<Arc<AppState>>,
    AuthUser(user_id): AuthUser,
    Json(request): Json<UpdateProfileRequest>,
) -> Result<Json<UserRecord>> {
    let mut user = state.store.get_user(user_id).await?;

    if let Some(name) = request.name {
        let name = name.trim().to_string();
        if name.is_empty() {
            return Err(AppError::bad_request("Name is required"));
        }
        user.name = name;
    }
    if let Some(email) = request.email {
        check_email(&email)?;
        user.email = email.trim().to_string();
    }
    if let Some(password) = request.password {
        check_password(&password)?;
        user.password_hash = hash_password(password, state.config.bcrypt_cost).await?;
    }

    let profile = &mut user.profile;
    if let Some(age) = request.age {
        profile.age = age;
    }
    if let Some(gender) = request.gender {
        profile.gender = gender;
    }
    if let Some(height) = request.height {
        profile.height = height;
    }
    if let Some(weight) = request.weight {
        profile.weight = weight;
    }
    if let Some(level) = request.activity_level {
        profile.activity_level = level;
    }
    if let Some(goal) = request.goal {
        profile.goal = goal;
    }
    if let Some(diet_type) = request.diet_type {
        profile.diet_type = diet_type;
    }
    if let Some(allergies) = request.allergies {
        profile.allergies = allergies;
    }
    profile.validate()?;

    let user = state.store.update_user(user).await?;
    let targets = state.orchestrator.calculate_targets(&user.profile);
    state.store.set_requirements(user_id, targets).await;

    info!(user_id, "Updated profile");
    Ok(Json(user))
}
