use anyhow::{Context, Result, anyhow};
use chrono::{NaiveDate, Utc};
use clap::{Args, Parser, Subcommand};
use colored::Colorize;
use data_loader::{MealType, PlannedMeal, RecipeIndex, UserProfile};
use llm_client::GeminiClient;
use nutrition::{distribute, BmrFormula, NutritionCalculator, NutritionTargets};
use rand::Rng;
use server::{DayPlan, MealPlanOrchestrator, PlanRequest, RecipeHistory};
use serde_json::json;
use std::collections::HashSet;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::{Duration, Instant};

/// Meal Planner - nutrition targets and meal plans from a recipe catalog
#[derive(Parser)]
#[command(name = "meal-planner")]
#[command(about = "Compute nutrition targets and plan meals from a recipe catalog", long_about = None)]
struct Cli {
    /// Path to the catalog JSON (foods + recipes)
    #[arg(short, long, default_value = "data/catalog.json")]
    catalog: PathBuf,

    /// BMR formula: mifflin-st-jeor or harris-benedict
    #[arg(long, default_value = "mifflin-st-jeor")]
    formula: BmrFormula,

    #[command(subcommand)]
    command: Commands,
}

/// Profile fields; enumerations accept the same spellings as the API
#[derive(Args, Clone)]
struct ProfileArgs {
    #[arg(long, default_value_t = 30)]
    age: u32,

    /// Male, Female or Other
    #[arg(long, default_value = "Female")]
    gender: String,

    /// Height in cm
    #[arg(long, default_value_t = 170.0)]
    height: f32,

    /// Weight in kg
    #[arg(long, default_value_t = 70.0)]
    weight: f32,

    /// Sedentary, Light, Moderate, Active or VeryActive
    #[arg(long, default_value = "Moderate")]
    activity: String,

    /// Lose, Maintain or Gain
    #[arg(long, default_value = "Maintain")]
    goal: String,

    /// Comma-separated diet labels, e.g. "vegetarian,gluten-free"
    #[arg(long, default_value = "")]
    diet: String,

    /// Comma-separated ingredients to avoid
    #[arg(long, default_value = "")]
    allergies: String,
}

impl ProfileArgs {
    /// Goes through serde so the API's aliases work here too
    fn to_profile(&self) -> Result<UserProfile> {
        let profile: UserProfile = serde_json::from_value(json!({
            "age": self.age,
            "gender": self.gender,
            "height": self.height,
            "weight": self.weight,
            "activityLevel": self.activity,
            "goal": self.goal,
            "dietType": self.diet,
            "allergies": self.allergies,
        }))
        .context("Invalid profile")?;
        profile.validate()?;
        Ok(profile)
    }
}

#[derive(Subcommand)]
enum Commands {
    /// Show BMR, TDEE, calorie target and per-meal targets
    Targets {
        #[command(flatten)]
        profile: ProfileArgs,
    },

    /// Plan meals for a profile
    Plan {
        #[command(flatten)]
        profile: ProfileArgs,

        /// First date to plan (default: today)
        #[arg(long)]
        date: Option<NaiveDate>,

        /// Plan seven days instead of one
        #[arg(long)]
        week: bool,

        /// Ask Gemini instead of scoring (needs --gemini-api-key)
        #[arg(long)]
        ai: bool,

        #[arg(long)]
        gemini_api_key: Option<String>,
    },

    /// Search recipes by title or ingredient
    Search {
        /// Case-insensitive substring
        #[arg(long)]
        query: String,
    },

    /// Show recipes ranked for a profile
    Recommend {
        #[command(flatten)]
        profile: ProfileArgs,

        #[arg(long, default_value = "10")]
        limit: usize,
    },

    /// Run benchmark to test planning performance
    Benchmark {
        /// Number of plans to build
        #[arg(long, default_value = "100")]
        requests: usize,

        /// Number of plans built at once
        #[arg(long, default_value = "10")]
        concurrent: usize,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn")),
        )
        .init();

    let cli = Cli::parse();

    println!("Loading catalog from {}...", cli.catalog.display());
    let start = Instant::now();
    let catalog = Arc::new(
        RecipeIndex::load_from_file(&cli.catalog).context("Failed to load catalog")?,
    );
    let (recipes, foods) = catalog.counts();
    println!(
        "{} Loaded {} recipes and {} foods in {:?}",
        "✓".green(),
        recipes,
        foods,
        start.elapsed()
    );

    let calculator = NutritionCalculator::new().with_formula(cli.formula);

    match cli.command {
        Commands::Targets { profile } => handle_targets(&calculator, &profile.to_profile()?),
        Commands::Plan {
            profile,
            date,
            week,
            ai,
            gemini_api_key,
        } => {
            let orchestrator = MealPlanOrchestrator::new(calculator, GeminiClient::new(gemini_api_key));
            let date = date.unwrap_or_else(|| Utc::now().date_naive());
            handle_plan(catalog, orchestrator, &profile.to_profile()?, date, week, ai).await?
        }
        Commands::Search { query } => handle_search(&catalog, &query),
        Commands::Recommend { profile, limit } => {
            let orchestrator = MealPlanOrchestrator::new(calculator, GeminiClient::new(None));
            handle_recommend(catalog, &orchestrator, &profile.to_profile()?, limit)?
        }
        Commands::Benchmark {
            requests,
            concurrent,
        } => {
            let orchestrator = MealPlanOrchestrator::new(calculator, GeminiClient::new(None));
            handle_benchmark(catalog, orchestrator, requests, concurrent).await?
        }
    }

    Ok(())
}

fn plan_request(orchestrator: &MealPlanOrchestrator, profile: &UserProfile) -> PlanRequest {
    PlanRequest {
        user_id: 1,
        profile: profile.clone(),
        targets: orchestrator.calculate_targets(profile),
        liked: HashSet::new(),
        history: RecipeHistory::new(),
    }
}

/// Handle the 'targets' command
fn handle_targets(calculator: &NutritionCalculator, profile: &UserProfile) {
    let targets = calculator.calculate(profile);
    print_targets(&targets);

    println!("{}", "Per meal:".bold());
    for meal in distribute(&targets, &MealType::ALL) {
        let m = meal.macronutrients;
        println!(
            "  {:<10} {:>5} kcal  P {:>4.0} g  C {:>4.0} g  F {:>4.0} g",
            meal.meal_type.to_string(),
            meal.calories,
            m.protein,
            m.carbs,
            m.fats
        );
    }
}

/// Handle the 'plan' command
async fn handle_plan(
    catalog: Arc<RecipeIndex>,
    orchestrator: MealPlanOrchestrator,
    profile: &UserProfile,
    date: NaiveDate,
    week: bool,
    ai: bool,
) -> Result<()> {
    let request = plan_request(&orchestrator, profile);
    print_targets(&request.targets);

    let days = if ai {
        vec![
            orchestrator
                .generate_ai_plan(catalog, &request, &HashSet::new(), date, MealType::MAIN.len())
                .await?,
        ]
    } else if week {
        orchestrator.plan_week(catalog, &request, date).await?
    } else {
        vec![orchestrator.plan_day(catalog, &request, date).await?]
    };

    for day in &days {
        print_day(day, &request.targets);
    }
    Ok(())
}

/// Handle the 'search' command
fn handle_search(catalog: &RecipeIndex, query: &str) {
    let needle = query.to_lowercase();
    let mut matches: Vec<(u8, &data_loader::Recipe)> = catalog
        .recipes()
        .into_iter()
        .filter_map(|recipe| {
            let title = recipe.title.to_lowercase();
            if title == needle {
                Some((0, recipe))
            } else if title.contains(&needle) {
                Some((1, recipe))
            } else if recipe.ingredients.iter().any(|i| i.name.to_lowercase().contains(&needle)) {
                Some((2, recipe))
            } else {
                None
            }
        })
        .collect();
    // exact title, then title substring, then ingredient; most liked first within each
    matches.sort_by(|a, b| a.0.cmp(&b.0).then_with(|| b.1.favorite_count.cmp(&a.1.favorite_count)));

    println!("{}", format!("Search results for '{}':", query).bold().blue());
    if matches.is_empty() {
        println!("  (none)");
    }
    for (_, recipe) in matches.iter().take(20) {
        println!(
            "{}: {} [{}] {:.0} kcal ({} likes)",
            recipe.id,
            recipe.title,
            recipe.diet_type.join(", "),
            recipe.calories,
            recipe.favorite_count
        );
    }
}

/// Handle the 'recommend' command
fn handle_recommend(
    catalog: Arc<RecipeIndex>,
    orchestrator: &MealPlanOrchestrator,
    profile: &UserProfile,
    limit: usize,
) -> Result<()> {
    let request = plan_request(orchestrator, profile);
    let ids = orchestrator.recommend(catalog.clone(), &request, limit)?;

    println!("{}", "Recommended recipes:".bold().blue());
    for (rank, id) in ids.iter().enumerate() {
        let recipe = catalog
            .get_recipe(*id)
            .ok_or_else(|| anyhow!("Recipe {} missing from catalog", id))?;
        println!(
            "{}. {} [{}] - {:.0} kcal",
            (rank + 1).to_string().green(),
            recipe.title,
            recipe.diet_type.join(", "),
            recipe.calories
        );
    }
    Ok(())
}

/// Handle the 'benchmark' command
async fn handle_benchmark(
    catalog: Arc<RecipeIndex>,
    orchestrator: MealPlanOrchestrator,
    requests: usize,
    concurrent: usize,
) -> Result<()> {
    const GOALS: [&str; 3] = ["Lose", "Maintain", "Gain"];
    const ACTIVITY: [&str; 5] = ["Sedentary", "Light", "Moderate", "Active", "VeryActive"];

    // Random but valid profiles
    let mut rng = rand::rng();
    let profiles: Vec<UserProfile> = (0..requests)
        .map(|_| {
            ProfileArgs {
                age: rng.random_range(18..=70),
                gender: if rng.random_bool(0.5) { "Male" } else { "Female" }.to_string(),
                height: rng.random_range(150.0..=200.0),
                weight: rng.random_range(45.0..=120.0),
                activity: ACTIVITY[rng.random_range(0..ACTIVITY.len())].to_string(),
                goal: GOALS[rng.random_range(0..GOALS.len())].to_string(),
                diet: String::new(),
                allergies: String::new(),
            }
            .to_profile()
        })
        .collect::<Result<_>>()?;

    let date = Utc::now().date_naive();
    let semaphore = Arc::new(tokio::sync::Semaphore::new(concurrent.max(1)));
    let started = Instant::now();

    let mut handles = vec![];
    for profile in profiles {
        let orchestrator = orchestrator.clone();
        let catalog = catalog.clone();
        let semaphore = semaphore.clone();
        let handle = tokio::spawn(async move {
            let _permit = semaphore.acquire_owned().await?;
            let request = plan_request(&orchestrator, &profile);
            let start = Instant::now();
            orchestrator.plan_day(catalog, &request, date).await?;
            Ok::<_, anyhow::Error>(start.elapsed())
        });
        handles.push(handle);
    }

    let mut timings: Vec<Duration> = vec![];
    for handle in handles {
        timings.push(handle.await??);
    }
    if timings.is_empty() {
        println!("No requests made");
        return Ok(());
    }

    let total_time = started.elapsed();
    let avg_latency = timings.iter().sum::<Duration>() / timings.len() as u32;
    timings.sort();
    let percentile = |p: f32| timings[((timings.len() as f32 * p) as usize).min(timings.len() - 1)];
    let throughput = timings.len() as f32 / total_time.as_secs_f32();

    println!("{}", "Benchmark results:".bold().blue());
    println!("Total time: {:?}", total_time);
    println!("Average latency: {:?}", avg_latency);
    println!("P50 latency: {:?}", percentile(0.50));
    println!("P95 latency: {:?}", percentile(0.95));
    println!("P99 latency: {:?}", percentile(0.99));
    println!("Throughput: {:.2} plans/second", throughput);

    Ok(())
}

fn print_targets(targets: &NutritionTargets) {
    let m = targets.macronutrient_ratio;
    println!("{}", "Nutrition targets:".bold().blue());
    println!("{}BMR: {:.1} kcal ({})", "• ".green(), targets.bmr, targets.formula);
    println!("{}TDEE: {:.1} kcal", "• ".green(), targets.tdee);
    println!("{}Calorie target: {} kcal", "• ".green(), targets.calorie_target);
    println!(
        "{}Macros: protein {} g, carbs {} g, fats {} g",
        "• ".green(),
        m.protein,
        m.carbs,
        m.fats
    );
}

fn print_meal(meal: &PlannedMeal) {
    let title = if meal.has_recipe_details {
        meal.title.normal()
    } else {
        meal.title.dimmed()
    };
    let id = meal
        .recipe_id
        .map(|id| format!("#{}", id))
        .unwrap_or_else(|| "-".to_string());
    println!(
        "  {:<10} {} {} ({:.0} kcal)",
        meal.meal_type.to_string(),
        title,
        id.cyan(),
        meal.calories
    );
}

fn print_day(day: &DayPlan, targets: &NutritionTargets) {
    println!("{}", format!("Plan for {}:", day.date).bold());
    for meal in &day.meals {
        print_meal(meal);
    }
    let summary = nutrition::summarize_meals(&day.meals, Some(targets));
    println!(
        "  {} {:.0} / {:.0} kcal",
        "Total:".bold(),
        summary.calories.consumed,
        summary.calories.goal
    );
    if !day.relaxed.is_empty() {
        println!("  {} {:?}", "Relaxed:".yellow(), day.relaxed);
    }
}
