//! Filter to avoid recipes served in the last few days.

use crate::traits::Filter;
use anyhow::Result;
use sources::{Candidate, PlanningContext};

/// Drops candidates in the context's recent set, but only while at least
/// `min_alternatives` fresh candidates remain. Otherwise the input passes
/// through untouched.
pub struct RecentlyUsedFilter {
    min_alternatives: usize,
}

impl RecentlyUsedFilter {
    pub fn new(min_alternatives: usize) -> Self {
        Self { min_alternatives }
    }
}

impl Default for RecentlyUsedFilter {
    fn default() -> Self {
        Self::new(5)
    }
}

impl Filter for RecentlyUsedFilter {
    fn name(&self) -> &str {
        "RecentlyUsedFilter"
    }

    fn apply(
        &self,
        candidates: Vec<Candidate>,
        context: &PlanningContext,
    ) -> Result<Vec<Candidate>> {
        if context.recent_recipes.is_empty() {
            return Ok(candidates);
        }

        let fresh: Vec<Candidate> = candidates
            .iter()
            .filter(|c| !context.recent_recipes.contains(&c.recipe_id))
            .cloned()
            .collect();

        if fresh.len() >= self.min_alternatives {
            Ok(fresh)
        } else {
            Ok(candidates)
        }
    }
}
