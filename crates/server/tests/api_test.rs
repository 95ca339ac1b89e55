//! End-to-end tests of the REST API, driven through `tower::ServiceExt::oneshot`.

use axum::{
    Router,
    body::{Body, to_bytes},
    http::{Method, Request, StatusCode, header},
};
use data_loader::{Food, Ingredient, Macronutrients, MealType, Recipe, RecipeIndex};
use serde_json::{Value, json};
use server::{AppState, Config, app};
use tower::ServiceExt;

// ============================================================================
// Test Fixtures
// ============================================================================

fn recipe(id: u32, title: &str, calories: f32, diet: &[&str], ingredients: &[&str], meal: MealType) -> Recipe {
    Recipe {
        id,
        title: title.to_string(),
        description: String::new(),
        image: None,
        calories,
        macronutrients: Macronutrients::new(calories * 0.3 / 4.0, calories * 0.4 / 4.0, calories * 0.3 / 9.0),
        diet_type: diet.iter().map(|d| d.to_string()).collect(),
        ingredients: ingredients
            .iter()
            .map(|&name| Ingredient { quantity: 100.0, ..Ingredient::named(name) })
            .collect(),
        tags: vec![],
        meal_types: vec![meal],
        cooking_time: Some(20),
        instructions: vec![],
        favorite_count: 0,
    }
}

fn food(id: u32, name: &str, calories: f32, macros: Macronutrients) -> Food {
    Food {
        id,
        name: name.to_string(),
        category: "Test".to_string(),
        calories,
        macronutrients: macros,
        serving_size: 100.0,
    }
}

fn create_test_catalog() -> RecipeIndex {
    let mut index = RecipeIndex::new();
    index.insert_food(food(1, "Oats", 389.0, Macronutrients::new(16.9, 66.3, 6.9)));
    index.insert_food(food(2, "Milk", 42.0, Macronutrients::new(3.4, 5.0, 1.0)));

    let recipes = [
        recipe(1, "Berry Oatmeal", 550.0, &["vegetarian"], &["Oats", "Milk"], MealType::Breakfast),
        recipe(2, "Veggie Omelette", 600.0, &["vegetarian"], &["Eggs", "Spinach"], MealType::Breakfast),
        recipe(3, "Caprese Sandwich", 680.0, &["vegetarian"], &["Bread", "Mozzarella"], MealType::Lunch),
        recipe(4, "Falafel Wrap", 700.0, &["vegetarian", "vegan"], &["Chickpeas", "Tortilla"], MealType::Lunch),
        recipe(5, "Chickpea Curry", 750.0, &["vegetarian", "vegan"], &["Chickpeas", "Rice"], MealType::Dinner),
        recipe(6, "Mushroom Risotto", 800.0, &["vegetarian"], &["Rice", "Mushrooms"], MealType::Dinner),
        recipe(7, "Shrimp Pasta", 820.0, &[], &["Pasta", "Shrimp"], MealType::Dinner),
        recipe(8, "Trail Mix", 560.0, &["vegetarian", "vegan"], &["Peanuts", "Raisins"], MealType::Snack),
    ];
    for r in recipes {
        index.insert_recipe(r);
    }
    index.build_secondary_indices();
    index
}

fn test_app() -> Router {
    let mut config = Config::new("test-secret");
    config.bcrypt_cost = 4;
    config.gemini_api_url = "http://127.0.0.1:9".to_string();
    app(AppState::new(config, create_test_catalog()))
}

async fn send(app: &Router, method: Method, uri: &str, token: Option<&str>, body: Option<Value>) -> (StatusCode, Value) {
    let mut request = Request::builder().method(method).uri(uri);
    if let Some(token) = token {
        request = request.header(header::AUTHORIZATION, format!("Bearer {}", token));
    }
    let request = match body {
        Some(body) => request
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(body.to_string())),
        None => request.body(Body::empty()),
    }
    .unwrap();

    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let value = serde_json::from_slice(&bytes).unwrap_or(Value::Null);
    (status, value)
}

fn registration(email: &str) -> Value {
    json!({
        "name": "Ada",
        "email": email,
        "password": "secret123",
        "age": 30,
        "gender": "Female",
        "height": 170,
        "weight": 70,
        "activityLevel": "Moderately Active",
        "goal": "Maintain weight",
        "dietType": "Vegetarian",
        "allergies": ["shrimp"]
    })
}

async fn register(app: &Router, email: &str) -> String {
    let (status, body) = send(app, Method::POST, "/api/users/register", None, Some(registration(email))).await;
    assert_eq!(status, StatusCode::CREATED, "{body}");
    body["token"].as_str().unwrap().to_string()
}

// ============================================================================
// Users & auth
// ============================================================================

#[tokio::test]
async fn test_health() {
    let app = test_app();
    let (status, body) = send(&app, Method::GET, "/health", None, None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "ok");
}

#[tokio::test]
async fn test_register_login_and_profile() {
    let app = test_app();
    let token = register(&app, "ada@example.com").await;

    let (status, profile) = send(&app, Method::GET, "/api/users/profile", Some(&token), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(profile["email"], "ada@example.com");
    assert_eq!(profile["activityLevel"], "Moderate");
    assert!(profile.get("passwordHash").is_none());

    let (status, body) = send(
        &app,
        Method::POST,
        "/api/users/login",
        None,
        Some(json!({"email": "ADA@example.com", "password": "secret123"})),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert!(body["token"].is_string());

    let (status, body) = send(
        &app,
        Method::POST,
        "/api/users/login",
        None,
        Some(json!({"email": "ada@example.com", "password": "wrong-password"})),
    )
    .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["message"], "Invalid email or password");
}

#[tokio::test]
async fn test_register_rejects_bad_profile_and_duplicates() {
    let app = test_app();
    let mut bad = registration("kid@example.com");
    bad["age"] = json!(9);
    let (status, body) = send(&app, Method::POST, "/api/users/register", None, Some(bad)).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["message"].as_str().unwrap().contains("age"));

    register(&app, "ada@example.com").await;
    let (status, _) = send(
        &app,
        Method::POST,
        "/api/users/register",
        None,
        Some(registration("ada@example.com")),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_protected_routes_need_a_token() {
    let app = test_app();
    let (status, body) = send(&app, Method::GET, "/api/users/profile", None, None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["message"], "Not authorized, no token");

    let (status, _) = send(&app, Method::GET, "/api/users/profile", Some("garbage"), None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_profile_update_recomputes_requirements() {
    let app = test_app();
    let token = register(&app, "ada@example.com").await;

    let (status, targets) = send(&app, Method::GET, "/api/nutritional-requirements", Some(&token), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(targets["calorieTarget"], 2250);

    let (status, _) = send(
        &app,
        Method::PUT,
        "/api/users/profile",
        Some(&token),
        Some(json!({"goal": "Lose weight"})),
    )
    .await;
    assert_eq!(status, StatusCode::OK);

    let (_, targets) = send(&app, Method::GET, "/api/nutritional-requirements", Some(&token), None).await;
    assert_eq!(targets["calorieTarget"], 1750);

    let (status, targets) = send(
        &app,
        Method::PUT,
        "/api/nutritional-requirements",
        Some(&token),
        Some(json!({"calorieTarget": 1900})),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(targets["calorieTarget"], 1900);
}

// ============================================================================
// Catalog
// ============================================================================

#[tokio::test]
async fn test_recipe_search_and_filter() {
    let app = test_app();

    let (status, found) = send(&app, Method::GET, "/api/recipes/search?query=chickpea", None, None).await;
    assert_eq!(status, StatusCode::OK);
    let titles: Vec<_> = found.as_array().unwrap().iter().map(|r| r["title"].clone()).collect();
    assert_eq!(titles, vec![json!("Falafel Wrap"), json!("Chickpea Curry")]);

    let (status, _) = send(&app, Method::GET, "/api/recipes/search", None, None).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, filtered) = send(
        &app,
        Method::GET,
        "/api/recipes/filter?minCalories=700&maxCalories=800&ingredients=rice",
        None,
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    let ids: Vec<_> = filtered.as_array().unwrap().iter().map(|r| r["id"].clone()).collect();
    assert_eq!(ids, vec![json!(5), json!(6)]);

    let (status, _) = send(&app, Method::GET, "/api/recipes/99", None, None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_create_recipe_computes_nutrition() {
    let app = test_app();
    let token = register(&app, "chef@example.com").await;

    let (status, created) = send(
        &app,
        Method::POST,
        "/api/recipes",
        Some(&token),
        Some(json!({
            "title": "Plain Porridge",
            "ingredients": [{"name": "Oats", "quantity": 80}, {"name": "milk", "quantity": 200}],
            "dietType": "vegetarian",
            "mealTypes": ["Breakfast"]
        })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED, "{created}");
    assert_eq!(created["id"], 9);
    // 389 * 0.8 + 42 * 2
    assert_eq!(created["calories"], 395.0);

    let (status, body) = send(
        &app,
        Method::POST,
        "/api/recipes",
        Some(&token),
        Some(json!({
            "title": "Mystery Stew",
            "ingredients": [{"name": "Unobtainium", "quantity": 50}]
        })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["message"], "Some food items not found");
}

#[tokio::test]
async fn test_like_updates_favorite_count() {
    let app = test_app();
    let token = register(&app, "fan@example.com").await;

    let (status, body) = send(&app, Method::POST, "/api/recipes/5/like", Some(&token), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["favoriteCount"], 1);

    let (_, recipe) = send(&app, Method::GET, "/api/recipes/5", None, None).await;
    assert_eq!(recipe["favoriteCount"], 1);

    let (_, body) = send(&app, Method::DELETE, "/api/recipes/5/like", Some(&token), None).await;
    assert_eq!(body["favoriteCount"], 0);

    let (status, _) = send(&app, Method::POST, "/api/recipes/99/like", Some(&token), None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_recommendations_skip_allergens() {
    let app = test_app();
    let token = register(&app, "ada@example.com").await;

    let (status, recipes) = send(&app, Method::GET, "/api/recipes/recommended/user?limit=20", Some(&token), None).await;
    assert_eq!(status, StatusCode::OK);
    let recipes = recipes.as_array().unwrap();
    assert_eq!(recipes.len(), 7);
    assert!(recipes.iter().all(|r| r["title"] != "Shrimp Pasta"));
}

// ============================================================================
// Meal plans
// ============================================================================

#[tokio::test]
async fn test_daily_plan_lifecycle() {
    let app = test_app();
    let token = register(&app, "ada@example.com").await;

    let (status, plan) = send(
        &app,
        Method::POST,
        "/api/meal-plans/daily",
        Some(&token),
        Some(json!({"date": "2025-03-10"})),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED, "{plan}");
    let meals = plan["meals"].as_array().unwrap();
    assert_eq!(meals.len(), 4);
    assert_eq!(meals[0]["type"], "Breakfast");
    assert!(meals.iter().all(|m| m["hasRecipeDetails"] == true));
    assert!(meals.iter().all(|m| m["recipeId"] != 7));
    assert_eq!(plan["relaxedConstraints"], json!([]));
    assert_eq!(plan["nutritionSummary"]["calories"]["goal"], 2250.0);

    let (status, _) = send(
        &app,
        Method::POST,
        "/api/meal-plans/daily",
        Some(&token),
        Some(json!({"date": "2025-03-10"})),
    )
    .await;
    assert_eq!(status, StatusCode::CONFLICT);

    let (status, fetched) = send(&app, Method::GET, "/api/meal-plans/date/2025-03-10", Some(&token), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(fetched["id"], plan["id"]);

    // swap breakfast, keeping the meal id
    let meal_id = meals[0]["id"].clone();
    let (status, swapped) = send(
        &app,
        Method::PUT,
        "/api/meal-plans/meal",
        Some(&token),
        Some(json!({"mealId": meal_id, "recipeId": 2})),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(swapped["meals"][0]["id"], meal_id);
    assert_eq!(swapped["meals"][0]["recipeId"], 2);
    assert_eq!(swapped["meals"][0]["type"], "Breakfast");

    let (status, groceries) = send(
        &app,
        Method::GET,
        "/api/meal-plans/date/2025-03-10/groceries",
        Some(&token),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    let names: Vec<_> = groceries.as_array().unwrap().iter().map(|g| g["name"].clone()).collect();
    assert!(names.contains(&json!("Eggs")));
    assert!(names.contains(&json!("Raisins")));

    let uri = format!("/api/meal-plans/{}", plan["id"].as_str().unwrap());
    let (status, _) = send(&app, Method::DELETE, &uri, Some(&token), None).await;
    assert_eq!(status, StatusCode::OK);
    let (status, _) = send(&app, Method::GET, "/api/meal-plans/date/2025-03-10", Some(&token), None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_regenerating_daily_plan_replaces_it() {
    let app = test_app();
    let token = register(&app, "ada@example.com").await;
    let body = json!({"date": "2025-03-10"});

    let (_, first) = send(&app, Method::POST, "/api/meal-plans/daily", Some(&token), Some(body)).await;
    let (status, second) = send(
        &app,
        Method::POST,
        "/api/meal-plans/daily",
        Some(&token),
        Some(json!({"date": "2025-03-10", "replace": true})),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_ne!(first["id"], second["id"]);

    let (_, stored) = send(&app, Method::GET, "/api/meal-plans/date/2025-03-10", Some(&token), None).await;
    assert_eq!(stored["id"], second["id"]);
}

#[tokio::test]
async fn test_weekly_plan() {
    let app = test_app();
    let token = register(&app, "ada@example.com").await;

    let (status, week) = send(
        &app,
        Method::POST,
        "/api/meal-plans/weekly",
        Some(&token),
        Some(json!({"startDate": "2025-03-10"})),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    let week = week.as_array().unwrap();
    assert_eq!(week.len(), 7);
    assert_eq!(week[0]["date"], "2025-03-10");
    assert_eq!(week[6]["date"], "2025-03-16");

    let (status, _) = send(&app, Method::GET, "/api/meal-plans/date/2025-03-13", Some(&token), None).await;
    assert_eq!(status, StatusCode::OK);
}

#[tokio::test]
async fn test_todays_meals_need_generation() {
    let app = test_app();
    let token = register(&app, "ada@example.com").await;

    let (status, body) = send(&app, Method::GET, "/api/user/meals/today", Some(&token), None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["needsGeneration"], true);
}

#[tokio::test]
async fn test_ai_generation_without_key() {
    let app = test_app();
    let token = register(&app, "ada@example.com").await;

    let (status, body) = send(
        &app,
        Method::POST,
        "/api/user/meals/generate",
        Some(&token),
        Some(json!({"date": "2025-03-10"})),
    )
    .await;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(body["message"], "API key for Gemini is not configured");
    assert!(body["error"].is_string());
}

#[tokio::test]
async fn test_ai_recipe_details() {
    let app = test_app();
    let token = register(&app, "ada@example.com").await;

    let (status, recipe) = send(&app, Method::GET, "/api/user/meals/recipe/4", Some(&token), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(recipe["title"], "Falafel Wrap");
}
