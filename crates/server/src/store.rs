//! In-memory document store.
//!
//! Everything lives behind one `tokio::sync::RwLock`. The recipe catalog is
//! held as an `Arc<RecipeIndex>` snapshot: planning works on whichever
//! snapshot it grabbed, and catalog writes build a new index and swap it in.

use chrono::{DateTime, Days, NaiveDate, Utc};
use data_loader::{DataLoadError, PlannedMeal, Recipe, RecipeId, RecipeIndex, UserId, UserProfile};
use nutrition::{NutritionSummary, NutritionTargets, summarize_meals};
use pipeline::Relaxation;
use serde::Serialize;
use std::collections::{HashMap, HashSet};
use std::sync::Arc;
use thiserror::Error;
use tokio::sync::RwLock;
use tracing::debug;
use uuid::Uuid;

use crate::orchestrator::RecipeHistory;

#[derive(Error, Debug)]
pub enum StoreError {
    #[error("{entity} not found")]
    NotFound { entity: &'static str },

    #[error("{entity} already exists: {key}")]
    Duplicate { entity: &'static str, key: String },

    #[error(transparent)]
    Catalog(#[from] DataLoadError),
}

pub type Result<T> = std::result::Result<T, StoreError>;

// =============================================================================
// Records
// =============================================================================

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UserRecord {
    pub id: UserId,
    pub name: String,
    pub email: String,
    #[serde(skip_serializing)]
    pub password_hash: String,
    #[serde(flatten)]
    pub profile: UserProfile,
    pub created_at: DateTime<Utc>,
}

/// How a plan's meals were chosen
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum PlanSource {
    Scored,
    Ai,
}

/// A planned meal with its own id inside the plan
#[derive(Debug, Clone, Serialize)]
pub struct PlanMeal {
    pub id: Uuid,
    #[serde(flatten)]
    pub meal: PlannedMeal,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MealPlan {
    pub id: Uuid,
    pub user_id: UserId,
    pub date: NaiveDate,
    pub meals: Vec<PlanMeal>,
    pub nutrition_summary: NutritionSummary,
    pub relaxed_constraints: Vec<Relaxation>,
    pub source: PlanSource,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl MealPlan {
    pub fn new(
        user_id: UserId,
        date: NaiveDate,
        meals: Vec<PlannedMeal>,
        targets: Option<&NutritionTargets>,
        relaxed_constraints: Vec<Relaxation>,
        source: PlanSource,
    ) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4(),
            user_id,
            date,
            nutrition_summary: summarize_meals(&meals, targets),
            meals: meals
                .into_iter()
                .map(|meal| PlanMeal { id: Uuid::new_v4(), meal })
                .collect(),
            relaxed_constraints,
            source,
            created_at: now,
            updated_at: now,
        }
    }

    pub fn planned_meals(&self) -> Vec<PlannedMeal> {
        self.meals.iter().map(|m| m.meal.clone()).collect()
    }

    /// Ids of the meals that resolved to a catalog recipe
    pub fn recipe_ids(&self) -> HashSet<RecipeId> {
        sources::user_context::collect_recipe_ids(self.meals.iter().map(|m| &m.meal))
    }

    fn refresh_summary(&mut self, targets: Option<&NutritionTargets>) {
        self.nutrition_summary = summarize_meals(&self.planned_meals(), targets);
        self.updated_at = Utc::now();
    }
}

// =============================================================================
// Store
// =============================================================================

struct StoreData {
    catalog: Arc<RecipeIndex>,
    users: HashMap<UserId, UserRecord>,
    emails: HashMap<String, UserId>,
    next_user_id: UserId,
    likes: HashMap<UserId, HashSet<RecipeId>>,
    requirements: HashMap<UserId, NutritionTargets>,
    plans: HashMap<(UserId, NaiveDate), MealPlan>,
}

pub struct Store {
    inner: RwLock<StoreData>,
}

fn email_key(email: &str) -> String {
    email.trim().to_lowercase()
}

impl Store {
    pub fn new(catalog: RecipeIndex) -> Self {
        Self {
            inner: RwLock::new(StoreData {
                catalog: Arc::new(catalog),
                users: HashMap::new(),
                emails: HashMap::new(),
                next_user_id: 1,
                likes: HashMap::new(),
                requirements: HashMap::new(),
                plans: HashMap::new(),
            }),
        }
    }

    // -------------------------------------------------------------------------
    // Catalog
    // -------------------------------------------------------------------------

    /// Current catalog snapshot
    pub async fn catalog(&self) -> Arc<RecipeIndex> {
        self.inner.read().await.catalog.clone()
    }

    /// Copy-on-write catalog change.
    ///
    /// `f` edits a private copy; on success its secondary indices are rebuilt
    /// and it replaces the shared snapshot. On error nothing changes.
    pub async fn update_catalog<T>(
        &self,
        f: impl FnOnce(&mut RecipeIndex) -> Result<T>,
    ) -> Result<T> {
        let mut data = self.inner.write().await;
        let mut next = (*data.catalog).clone();
        let out = f(&mut next)?;
        next.build_secondary_indices();
        data.catalog = Arc::new(next);
        Ok(out)
    }

    // -------------------------------------------------------------------------
    // Users
    // -------------------------------------------------------------------------

    pub async fn create_user(
        &self,
        name: String,
        email: String,
        password_hash: String,
        profile: UserProfile,
    ) -> Result<UserRecord> {
        let mut data = self.inner.write().await;
        let key = email_key(&email);
        if data.emails.contains_key(&key) {
            return Err(StoreError::Duplicate { entity: "User", key });
        }

        let id = data.next_user_id;
        data.next_user_id += 1;

        let user = UserRecord {
            id,
            name,
            email: email.trim().to_string(),
            password_hash,
            profile,
            created_at: Utc::now(),
        };
        data.emails.insert(key, id);
        data.users.insert(id, user.clone());
        debug!(user_id = id, "Created user");
        Ok(user)
    }

    pub async fn get_user(&self, id: UserId) -> Result<UserRecord> {
        self.inner
            .read()
            .await
            .users
            .get(&id)
            .cloned()
            .ok_or(StoreError::NotFound { entity: "User" })
    }

    pub async fn find_user_by_email(&self, email: &str) -> Option<UserRecord> {
        let data = self.inner.read().await;
        let id = data.emails.get(&email_key(email))?;
        data.users.get(id).cloned()
    }

    /// Replace a user record, keeping the email index consistent
    pub async fn update_user(&self, user: UserRecord) -> Result<UserRecord> {
        let mut data = self.inner.write().await;
        let previous = data
            .users
            .get(&user.id)
            .map(|u| email_key(&u.email))
            .ok_or(StoreError::NotFound { entity: "User" })?;

        let key = email_key(&user.email);
        if key != previous {
            if data.emails.contains_key(&key) {
                return Err(StoreError::Duplicate { entity: "User", key });
            }
            data.emails.remove(&previous);
            data.emails.insert(key, user.id);
        }

        data.users.insert(user.id, user.clone());
        Ok(user)
    }

    // -------------------------------------------------------------------------
    // Likes
    // -------------------------------------------------------------------------

    pub async fn liked_recipes(&self, user_id: UserId) -> HashSet<RecipeId> {
        self.inner
            .read()
            .await
            .likes
            .get(&user_id)
            .cloned()
            .unwrap_or_default()
    }

    /// Like or unlike a recipe. Returns false if nothing changed.
    ///
    /// The recipe's favourite count follows, via a new catalog snapshot.
    pub async fn set_like(&self, user_id: UserId, recipe_id: RecipeId, liked: bool) -> Result<bool> {
        let mut data = self.inner.write().await;
        if data.catalog.get_recipe(recipe_id).is_none() {
            return Err(StoreError::NotFound { entity: "Recipe" });
        }

        let likes = data.likes.entry(user_id).or_default();
        let changed = if liked {
            likes.insert(recipe_id)
        } else {
            likes.remove(&recipe_id)
        };
        if !changed {
            return Ok(false);
        }

        let mut next = (*data.catalog).clone();
        if let Some(recipe) = next.get_recipe(recipe_id).cloned() {
            let favorite_count = if liked {
                recipe.favorite_count + 1
            } else {
                recipe.favorite_count.saturating_sub(1)
            };
            next.insert_recipe(Recipe { favorite_count, ..recipe });
        }
        data.catalog = Arc::new(next);
        Ok(true)
    }

    // -------------------------------------------------------------------------
    // Nutritional requirements
    // -------------------------------------------------------------------------

    pub async fn requirements(&self, user_id: UserId) -> Option<NutritionTargets> {
        self.inner.read().await.requirements.get(&user_id).cloned()
    }

    pub async fn set_requirements(&self, user_id: UserId, targets: NutritionTargets) {
        self.inner.write().await.requirements.insert(user_id, targets);
    }

    // -------------------------------------------------------------------------
    // Meal plans
    // -------------------------------------------------------------------------

    pub async fn plan_for(&self, user_id: UserId, date: NaiveDate) -> Option<MealPlan> {
        self.inner.read().await.plans.get(&(user_id, date)).cloned()
    }

    /// Store a plan for a date that has none yet
    pub async fn insert_plan(&self, plan: MealPlan) -> Result<MealPlan> {
        let mut data = self.inner.write().await;
        let key = (plan.user_id, plan.date);
        if data.plans.contains_key(&key) {
            return Err(StoreError::Duplicate {
                entity: "Meal plan",
                key: plan.date.to_string(),
            });
        }
        data.plans.insert(key, plan.clone());
        Ok(plan)
    }

    /// Delete the date's plan and store `plan` in its place, atomically.
    /// Returns the plan that was replaced.
    pub async fn replace_plan(&self, plan: MealPlan) -> Option<MealPlan> {
        let mut data = self.inner.write().await;
        let key = (plan.user_id, plan.date);
        let previous = data.plans.remove(&key);
        data.plans.insert(key, plan);
        previous
    }

    pub async fn delete_plan(&self, user_id: UserId, plan_id: Uuid) -> Result<MealPlan> {
        let mut data = self.inner.write().await;
        let key = data
            .plans
            .iter()
            .find(|(_, p)| p.user_id == user_id && p.id == plan_id)
            .map(|(k, _)| *k)
            .ok_or(StoreError::NotFound { entity: "Meal plan" })?;
        data.plans
            .remove(&key)
            .ok_or(StoreError::NotFound { entity: "Meal plan" })
    }

    /// Point one meal of one of the user's plans at a different recipe.
    ///
    /// The meal keeps its id and slot; the plan's summary is recomputed.
    pub async fn swap_meal(&self, user_id: UserId, meal_id: Uuid, recipe_id: RecipeId) -> Result<MealPlan> {
        let mut data = self.inner.write().await;
        let recipe = data
            .catalog
            .get_recipe(recipe_id)
            .cloned()
            .ok_or(StoreError::NotFound { entity: "Recipe" })?;
        let targets = data.requirements.get(&user_id).cloned();

        let plan = data
            .plans
            .values_mut()
            .find(|p| p.user_id == user_id && p.meals.iter().any(|m| m.id == meal_id))
            .ok_or(StoreError::NotFound { entity: "Meal" })?;

        if let Some(slot) = plan.meals.iter_mut().find(|m| m.id == meal_id) {
            slot.meal = PlannedMeal::from_recipe(slot.meal.meal_type, &recipe);
        }
        plan.refresh_summary(targets.as_ref());
        Ok(plan.clone())
    }

    /// Recipes in the user's plans for the `days` days before `date`, by date
    pub async fn recipe_history(&self, user_id: UserId, date: NaiveDate, days: u32) -> RecipeHistory {
        let start = date
            .checked_sub_days(Days::new(u64::from(days)))
            .unwrap_or(NaiveDate::MIN);
        let data = self.inner.read().await;
        data.plans
            .values()
            .filter(|p| p.user_id == user_id && p.date >= start && p.date < date)
            .map(|p| (p.date, p.recipe_ids()))
            .collect()
    }
}
