//! Ranking and selection of native candidates
//!
//! Occurrence count is the only strength-of-evidence signal available, so
//! candidates are ordered by it (descending, ties by taxon key ascending)
//! and truncated to bound the enrichment fan-out that follows.

use crate::models::{TaxonAggregate, TaxonKey};

pub fn select(aggregates: &[TaxonAggregate], limit: usize) -> Vec<TaxonKey> {
    let mut ranked: Vec<&TaxonAggregate> = aggregates.iter().collect();
    ranked.sort_by(|a, b| {
        b.total_occurrence_count
            .cmp(&a.total_occurrence_count)
            .then_with(|| a.taxon_key.cmp(&b.taxon_key))
    });

    ranked
        .into_iter()
        .take(limit)
        .map(|agg| agg.taxon_key)
        .collect()
}
