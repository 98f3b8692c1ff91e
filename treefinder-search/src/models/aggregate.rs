//! Per-taxon occurrence tallies
//!
//! Invariant: the establishment histogram always sums to
//! `total_occurrence_count`, and the total is at least 1.

use super::occurrence::{EstablishmentMeans, TaxonKey};
use std::collections::{BTreeMap, HashMap};

/// Aggregates keyed by taxon
pub type AggregateMap = HashMap<TaxonKey, TaxonAggregate>;

#[derive(Debug, Clone, PartialEq)]
pub struct TaxonAggregate {
    pub taxon_key: TaxonKey,
    pub scientific_name: String,
    pub family: Option<String>,
    pub vernacular_name: Option<String>,
    pub total_occurrence_count: u32,
    pub establishment_histogram: BTreeMap<EstablishmentMeans, u32>,
}

impl TaxonAggregate {
    /// Start an aggregate from its first occurrence
    pub fn new(
        taxon_key: TaxonKey,
        scientific_name: &str,
        family: Option<&str>,
        vernacular_name: Option<&str>,
        means: EstablishmentMeans,
    ) -> Self {
        let mut histogram = BTreeMap::new();
        histogram.insert(means, 1);

        Self {
            taxon_key,
            scientific_name: scientific_name.to_string(),
            family: family.map(str::to_string),
            vernacular_name: vernacular_name.map(str::to_string),
            total_occurrence_count: 1,
            establishment_histogram: histogram,
        }
    }

    /// Fold one more occurrence into the tally
    ///
    /// Descriptive fields keep the lexicographically smallest value seen so
    /// that the result does not depend on input order.
    pub fn record(
        &mut self,
        scientific_name: &str,
        family: Option<&str>,
        vernacular_name: Option<&str>,
        means: EstablishmentMeans,
    ) {
        self.total_occurrence_count += 1;
        *self.establishment_histogram.entry(means).or_insert(0) += 1;

        if scientific_name < self.scientific_name.as_str() {
            self.scientific_name = scientific_name.to_string();
        }
        keep_smallest(&mut self.family, family);
        keep_smallest(&mut self.vernacular_name, vernacular_name);
    }

    /// Occurrences carrying `means`
    pub fn count(&self, means: EstablishmentMeans) -> u32 {
        self.establishment_histogram.get(&means).copied().unwrap_or(0)
    }

    pub fn native_count(&self) -> u32 {
        self.count(EstablishmentMeans::Native)
    }

    /// INTRODUCED + INVASIVE + NATURALISED
    pub fn introduced_count(&self) -> u32 {
        self.establishment_histogram
            .iter()
            .filter(|(means, _)| means.is_introduced())
            .map(|(_, count)| *count)
            .sum()
    }

    pub fn histogram_total(&self) -> u32 {
        self.establishment_histogram.values().sum()
    }
}

fn keep_smallest(slot: &mut Option<String>, candidate: Option<&str>) {
    let Some(candidate) = candidate else {
        return;
    };
    match slot {
        Some(current) if current.as_str() <= candidate => {}
        _ => *slot = Some(candidate.to_string()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_histogram_sums_to_total() {
        let mut agg = TaxonAggregate::new(
            TaxonKey(1),
            "Quercus alba",
            Some("Fagaceae"),
            None,
            EstablishmentMeans::Native,
        );
        agg.record("Quercus alba", None, None, EstablishmentMeans::Unknown);
        agg.record("Quercus alba", None, None, EstablishmentMeans::Introduced);
        agg.record("Quercus alba", None, None, EstablishmentMeans::Native);

        assert_eq!(agg.total_occurrence_count, 4);
        assert_eq!(agg.histogram_total(), 4);
        assert_eq!(agg.native_count(), 2);
        assert_eq!(agg.introduced_count(), 1);
        assert_eq!(agg.count(EstablishmentMeans::Unknown), 1);
        assert_eq!(agg.count(EstablishmentMeans::Managed), 0);
    }

    #[test]
    fn test_missing_fields_filled_by_later_records() {
        let mut agg = TaxonAggregate::new(
            TaxonKey(1),
            "Quercus alba",
            None,
            None,
            EstablishmentMeans::Unknown,
        );
        agg.record(
            "Quercus alba",
            Some("Fagaceae"),
            Some("White Oak"),
            EstablishmentMeans::Unknown,
        );

        assert_eq!(agg.family.as_deref(), Some("Fagaceae"));
        assert_eq!(agg.vernacular_name.as_deref(), Some("White Oak"));
    }
}
