//! Runtime configuration, read once from the environment at startup.

use anyhow::{Context, Result, anyhow};
use nutrition::BmrFormula;
use std::{env, fmt::Display, path::PathBuf, str::FromStr, time::Duration};
use tracing::info;

#[derive(Debug, Clone)]
pub struct Config {
    pub port: u16,
    pub jwt_secret: String,
    pub token_ttl_days: i64,
    pub catalog_path: PathBuf,
    pub gemini_api_key: Option<String>,
    pub gemini_api_url: String,
    pub gemini_model: String,
    pub gemini_temperature: f32,
    pub gemini_max_output_tokens: u32,
    pub ai_timeout: Duration,
    pub bmr_formula: BmrFormula,
    pub recent_days: u32,
    pub min_fresh_recipes: usize,
    pub cors_origins: Vec<String>,
    pub bcrypt_cost: u32,
}

impl Config {
    /// Defaults for everything but the signing secret
    pub fn new(jwt_secret: impl Into<String>) -> Self {
        Self {
            port: 5000,
            jwt_secret: jwt_secret.into(),
            token_ttl_days: 7,
            catalog_path: PathBuf::from("data/catalog.json"),
            gemini_api_key: None,
            gemini_api_url: llm_client::DEFAULT_API_URL.to_string(),
            gemini_model: llm_client::DEFAULT_MODEL.to_string(),
            gemini_temperature: 0.9,
            gemini_max_output_tokens: 2048,
            ai_timeout: Duration::from_secs(30),
            bmr_formula: BmrFormula::default(),
            recent_days: 3,
            min_fresh_recipes: 5,
            cors_origins: vec![
                "http://localhost:3000".to_string(),
                "http://localhost:3001".to_string(),
            ],
            bcrypt_cost: 10,
        }
    }

    /// Read the environment, after loading `.env` if there is one.
    pub fn load() -> Result<Self> {
        if dotenvy::dotenv().is_ok() {
            info!("Loaded environment from .env");
        }

        let jwt_secret = env::var("JWT_SECRET")
            .ok()
            .filter(|s| !s.trim().is_empty())
            .ok_or_else(|| anyhow!("JWT_SECRET must be set"))?;

        let gemini_api_key = env::var("GEMINI_API_KEY").ok();

        let cors_origins: String =
            try_load("CORS_ORIGINS", "http://localhost:3000,http://localhost:3001")?;

        Ok(Self {
            port: try_load("PORT", "5000")?,
            jwt_secret,
            token_ttl_days: try_load("TOKEN_TTL_DAYS", "7")?,
            catalog_path: try_load("CATALOG_PATH", "data/catalog.json")?,
            gemini_api_key,
            gemini_api_url: try_load("GEMINI_API_URL", llm_client::DEFAULT_API_URL)?,
            gemini_model: try_load("GEMINI_MODEL", llm_client::DEFAULT_MODEL)?,
            gemini_temperature: try_load("GEMINI_TEMPERATURE", "0.9")?,
            gemini_max_output_tokens: try_load("GEMINI_MAX_OUTPUT_TOKENS", "2048")?,
            ai_timeout: Duration::from_secs(try_load("AI_TIMEOUT_SECS", "30")?),
            bmr_formula: try_load("BMR_FORMULA", "mifflin-st-jeor")?,
            recent_days: try_load("RECENT_DAYS", "3")?,
            min_fresh_recipes: try_load("MIN_FRESH_RECIPES", "5")?,
            cors_origins: cors_origins
                .split(',')
                .map(|o| o.trim().to_string())
                .filter(|o| !o.is_empty())
                .collect(),
            bcrypt_cost: try_load("BCRYPT_COST", "10")?,
        })
    }
}

fn try_load<T: FromStr>(key: &str, default: &str) -> Result<T>
where
    T::Err: Display,
{
    let raw = env::var(key).unwrap_or_else(|_| {
        info!("{key} not set, using default: {default}");
        default.to_string()
    });

    raw.parse()
        .map_err(|e| anyhow!("{e}"))
        .with_context(|| format!("Invalid {key} value: {raw}"))
}
