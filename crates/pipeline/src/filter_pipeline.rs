//! The FilterPipeline orchestrates multiple filters.
//!
//! This module provides the main FilterPipeline struct that chains
//! multiple filters together using the builder pattern.

use crate::traits::Filter;
use anyhow::Result;
use sources::{Candidate, PlanningContext};
use tracing;

/// Chains multiple filters together into a processing pipeline.
///
/// ## Usage
/// ```ignore
/// let pipeline = FilterPipeline::new()
///     .add_filter(AllergenFilter::new(index.clone()))
///     .add_filter(DietTypeFilter::new(index.clone()))
///     .add_filter(CalorieWindowFilter::new(index.clone()));
///
/// let filtered = pipeline.apply(candidates, &context)?;
/// ```
pub struct FilterPipeline {
    filters: Vec<Box<dyn Filter>>,
}

impl FilterPipeline {
    /// Create a new empty FilterPipeline.
    pub fn new() -> Self {
        Self {
            filters: Vec::new(),
        }
    }

    /// Add a filter to the pipeline (builder pattern).
    pub fn add_filter(mut self, filter: impl Filter + 'static) -> Self {
        self.filters.push(Box::new(filter));
        self
    }

    /// Apply all filters in sequence to the candidates.
    ///
    /// Stops early once the set is empty; no filter can bring candidates back.
    pub fn apply(
        &self,
        candidates: Vec<Candidate>,
        context: &PlanningContext,
    ) -> Result<Vec<Candidate>> {
        let mut current = candidates;
        for filter in &self.filters {
            if current.is_empty() {
                break;
            }
            tracing::debug!(
                "Applying filter: {} (input count: {})",
                filter.name(),
                current.len()
            );
            current = filter.apply(current, context)?;
            tracing::debug!(
                "Filter applied: {} (output count: {})",
                filter.name(),
                current.len()
            );
        }
        Ok(current)
    }
}

impl Default for FilterPipeline {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::filters::RecentlyUsedFilter;
    use sources::{Candidate, CandidateSource};

    fn candidates(ids: &[u32]) -> Vec<Candidate> {
        ids.iter()
            .map(|&id| Candidate::new(id, CandidateSource::Catalog, 0.0))
            .collect()
    }

    #[test]
    fn test_empty_pipeline() {
        let pipeline = FilterPipeline::new();
        let context = PlanningContext::new(1);

        let filtered = pipeline.apply(candidates(&[1, 2]), &context).unwrap();
        assert_eq!(filtered.len(), 2);
    }

    #[test]
    fn test_single_filter() {
        let context = PlanningContext::new(1).with_recent([1]);

        let pipeline = FilterPipeline::new()
            .add_filter(RecentlyUsedFilter::new(1));

        let filtered = pipeline.apply(candidates(&[1, 2]), &context).unwrap();
        assert_eq!(filtered.len(), 1);
        assert_eq!(filtered[0].recipe_id, 2);
    }
}
