//! Catalog Source - every recipe as a candidate
//!
//! The matching ladder needs the whole catalog as its starting point so it
//! can relax filters without going back to the source.

use crate::types::{Candidate, CandidateSource, PlanningContext};
use data_loader::RecipeIndex;
use std::sync::Arc;
use tracing::{debug, instrument};

#[derive(Clone)]
pub struct CatalogSource {
    index: Arc<RecipeIndex>,
}

impl CatalogSource {
    pub fn new(index: Arc<RecipeIndex>) -> Self {
        Self { index }
    }

    /// Up to `limit` candidates in ascending recipe id order
    #[instrument(skip(self, context), fields(user_id = context.user_id))]
    pub fn get_candidates(&self, context: &PlanningContext, limit: usize) -> Vec<Candidate> {
        let candidates: Vec<Candidate> = self
            .index
            .get_all_recipe_ids()
            .into_iter()
            .take(limit)
            .map(|id| Candidate::new(id, CandidateSource::Catalog, 0.0))
            .collect();

        debug!("Generated {} catalog candidates", candidates.len());
        candidates
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::create_test_index;

    #[test]
    fn test_catalog_source_returns_all_in_order() {
        let source = CatalogSource::new(Arc::new(create_test_index()));
        let context = PlanningContext::new(1);

        let ids: Vec<_> = source
            .get_candidates(&context, usize::MAX)
            .iter()
            .map(|c| c.recipe_id)
            .collect();
        assert_eq!(ids, vec![1, 2, 3, 4]);
    }

    #[test]
    fn test_catalog_source_limits() {
        let source = CatalogSource::new(Arc::new(create_test_index()));
        let context = PlanningContext::new(1);

        let candidates = source.get_candidates(&context, 2);
        assert_eq!(candidates.len(), 2);
        assert_eq!(candidates[1].recipe_id, 2);
        assert_eq!(candidates[0].source, CandidateSource::Catalog);
    }
}
