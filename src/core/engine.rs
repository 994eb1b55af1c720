use crate::core::filters::matches_criteria;
use crate::models::{FilterCriteria, FilteredResult, Profile};

/// Split profiles into (non-spa, spa) preserving relative order
pub fn partition<'a, I>(profiles: I) -> FilteredResult
where
    I: IntoIterator<Item = &'a Profile>,
{
    let (spas, profiles): (Vec<Profile>, Vec<Profile>) =
        profiles.into_iter().cloned().partition(Profile::is_spa);
    let total_count = profiles.len() + spas.len();

    FilteredResult {
        profiles,
        spas,
        total_count,
    }
}

/// Stateless filter engine
///
/// Runs every profile through the criteria predicate in a single pass and
/// partitions the survivors by category. Holds no state and never reorders.
#[derive(Debug, Clone, Copy, Default)]
pub struct FilterEngine;

impl FilterEngine {
    pub fn new() -> Self {
        Self
    }

    /// Filter the collection and partition the matches
    pub fn apply(&self, collection: &[Profile], criteria: &FilterCriteria) -> FilteredResult {
        let result = partition(
            collection
                .iter()
                .filter(|profile| matches_criteria(profile, criteria)),
        );

        tracing::debug!(
            "Filtered {} profiles down to {} ({} spas)",
            collection.len(),
            result.total_count,
            result.spas.len()
        );

        result
    }
}
