//! Occurrence aggregation
//!
//! Streams raw occurrences into per-taxon tallies, pruning non-trees as it
//! goes. The fold is commutative: input order never changes the output.

use super::taxon_classifier::TaxonClassifier;
use crate::models::{AggregateMap, EstablishmentMeans, OccurrenceRecord, TaxonAggregate};
use std::collections::hash_map::Entry;
use treefinder_common::config::NativeMode;

#[derive(Debug, Clone)]
pub struct OccurrenceAggregator {
    classifier: TaxonClassifier,
    mode: NativeMode,
}

/// Counts of what the fold skipped, for logging
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct AggregationStats {
    pub occurrences_seen: usize,
    pub missing_identity: usize,
    pub rejected_not_tree: usize,
    pub rejected_not_native_labelled: usize,
}

impl OccurrenceAggregator {
    pub fn new(classifier: TaxonClassifier, mode: NativeMode) -> Self {
        Self { classifier, mode }
    }

    pub fn aggregate(&self, occurrences: &[OccurrenceRecord]) -> AggregateMap {
        self.aggregate_with_stats(occurrences).0
    }

    pub fn aggregate_with_stats(
        &self,
        occurrences: &[OccurrenceRecord],
    ) -> (AggregateMap, AggregationStats) {
        let mut aggregates = AggregateMap::new();
        let mut stats = AggregationStats {
            occurrences_seen: occurrences.len(),
            ..Default::default()
        };

        for occurrence in occurrences {
            let (Some(taxon_key), Some(scientific_name)) = (
                occurrence.taxon_key,
                occurrence
                    .scientific_name
                    .as_deref()
                    .filter(|n| !n.trim().is_empty()),
            ) else {
                stats.missing_identity += 1;
                continue;
            };

            let family = occurrence.family.as_deref();
            let vernacular = occurrence.vernacular_name.as_deref();

            if !self
                .classifier
                .is_likely_tree(scientific_name, family, vernacular)
            {
                stats.rejected_not_tree += 1;
                continue;
            }

            let means = occurrence.establishment_means;
            if self.mode == NativeMode::StrictPerOccurrence && means != EstablishmentMeans::Native {
                stats.rejected_not_native_labelled += 1;
                continue;
            }

            match aggregates.entry(taxon_key) {
                Entry::Occupied(mut entry) => {
                    entry.get_mut().record(scientific_name, family, vernacular, means);
                }
                Entry::Vacant(entry) => {
                    entry.insert(TaxonAggregate::new(
                        taxon_key,
                        scientific_name,
                        family,
                        vernacular,
                        means,
                    ));
                }
            }
        }

        (aggregates, stats)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::TaxonKey;
    use crate::rules::RuleSet;
    use std::sync::Arc;

    fn aggregator(mode: NativeMode) -> OccurrenceAggregator {
        let rules = Arc::new(RuleSet::builtin().unwrap());
        OccurrenceAggregator::new(TaxonClassifier::new(rules), mode)
    }

    fn sample() -> Vec<OccurrenceRecord> {
        vec![
            OccurrenceRecord::new(1, "Quercus alba").with_means(EstablishmentMeans::Native),
            OccurrenceRecord::new(1, "Quercus alba L.").with_vernacular("White Oak"),
            OccurrenceRecord::new(2, "Acer rubrum").with_means(EstablishmentMeans::Introduced),
            OccurrenceRecord::new(1, "Quercus alba").with_family("Fagaceae"),
            OccurrenceRecord::new(3, "Solidago canadensis").with_vernacular("Canada Goldenrod"),
            OccurrenceRecord::new(2, "Acer rubrum").with_vernacular("Red Maple"),
            OccurrenceRecord {
                taxon_key: None,
                scientific_name: Some("Pinus strobus".into()),
                ..Default::default()
            },
            OccurrenceRecord {
                taxon_key: Some(TaxonKey(4)),
                scientific_name: None,
                ..Default::default()
            },
        ]
    }

    #[test]
    fn test_counts_and_histogram() {
        let (aggs, stats) = aggregator(NativeMode::MajorityVote).aggregate_with_stats(&sample());

        assert_eq!(aggs.len(), 2);
        let oak = &aggs[&TaxonKey(1)];
        assert_eq!(oak.total_occurrence_count, 3);
        assert_eq!(oak.native_count(), 1);
        assert_eq!(oak.count(EstablishmentMeans::Unknown), 2);
        assert_eq!(oak.histogram_total(), oak.total_occurrence_count);
        assert_eq!(oak.family.as_deref(), Some("Fagaceae"));

        let maple = &aggs[&TaxonKey(2)];
        assert_eq!(maple.total_occurrence_count, 2);
        assert_eq!(maple.introduced_count(), 1);

        assert_eq!(stats.occurrences_seen, 8);
        assert_eq!(stats.missing_identity, 2);
        assert_eq!(stats.rejected_not_tree, 1);
    }

    #[test]
    fn test_permutation_invariance() {
        let agg = aggregator(NativeMode::MajorityVote);
        let forward = sample();
        let expected = agg.aggregate(&forward);

        let mut reversed = forward.clone();
        reversed.reverse();
        assert_eq!(agg.aggregate(&reversed), expected);

        // Every rotation as well
        for shift in 1..forward.len() {
            let mut rotated = forward.clone();
            rotated.rotate_left(shift);
            assert_eq!(agg.aggregate(&rotated), expected, "rotation by {}", shift);
        }
    }

    #[test]
    fn test_empty_input() {
        assert!(aggregator(NativeMode::MajorityVote).aggregate(&[]).is_empty());
    }

    #[test]
    fn test_strict_mode_keeps_only_native_labelled() {
        let (aggs, stats) =
            aggregator(NativeMode::StrictPerOccurrence).aggregate_with_stats(&sample());

        assert_eq!(aggs.len(), 1);
        let oak = &aggs[&TaxonKey(1)];
        assert_eq!(oak.total_occurrence_count, 1);
        assert_eq!(oak.native_count(), 1);
        assert_eq!(stats.rejected_not_native_labelled, 4);
    }
}
