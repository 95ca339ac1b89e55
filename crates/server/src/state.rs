//! Shared application state handed to every handler.

use std::sync::Arc;

use anyhow::Context;
use data_loader::RecipeIndex;
use tracing::info;

use crate::auth::JwtKeys;
use crate::config::Config;
use crate::orchestrator::MealPlanOrchestrator;
use crate::store::Store;

pub struct AppState {
    pub config: Config,
    pub store: Store,
    pub orchestrator: MealPlanOrchestrator,
    pub jwt: JwtKeys,
}

impl AppState {
    pub fn new(config: Config, catalog: RecipeIndex) -> Arc<Self> {
        let orchestrator = MealPlanOrchestrator::from_config(&config);
        let jwt = JwtKeys::new(&config.jwt_secret, config.token_ttl_days);
        Arc::new(Self {
            store: Store::new(catalog),
            orchestrator,
            jwt,
            config,
        })
    }

    /// Load the seed catalog named in the config and build the state
    pub fn load(config: Config) -> anyhow::Result<Arc<Self>> {
        let catalog = RecipeIndex::load_from_file(&config.catalog_path)
            .with_context(|| format!("Failed to load catalog from {}", config.catalog_path.display()))?;
        let (recipes, foods) = catalog.counts();
        info!(recipes, foods, "Catalog loaded");
        Ok(Self::new(config, catalog))
    }
}
