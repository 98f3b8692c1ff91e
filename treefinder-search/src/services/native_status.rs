//! Native-status evaluation over an aggregated establishment histogram
//!
//! Majority-vote rule: a taxon is kept when more than half of its
//! occurrences are labelled NATIVE, or when fewer than a fifth are labelled
//! INTRODUCED / INVASIVE / NATURALISED. Unlabelled records count toward the
//! total only, so they neither prove nor disprove native status. The
//! invasive blocklist is checked first and overrides the statistics.

use crate::models::TaxonAggregate;
use crate::rules::RuleSet;
use std::sync::Arc;
use treefinder_common::config::NativeMode;

/// Strictly more than this share of NATIVE labels passes
pub const NATIVE_SHARE_THRESHOLD: f64 = 0.5;

/// Strictly less than this share of introduced labels passes
pub const INTRODUCED_SHARE_THRESHOLD: f64 = 0.2;

#[derive(Debug, Clone)]
pub struct NativeStatusEvaluator {
    rules: Arc<RuleSet>,
    mode: NativeMode,
}

impl NativeStatusEvaluator {
    pub fn new(rules: Arc<RuleSet>, mode: NativeMode) -> Self {
        Self { rules, mode }
    }

    pub fn is_native(&self, aggregate: &TaxonAggregate, canonical_name: &str) -> bool {
        if self.rules.is_blocklisted(canonical_name) {
            tracing::debug!(
                taxon_key = %aggregate.taxon_key,
                canonical_name,
                "Blocklisted invasive, excluded regardless of labels"
            );
            return false;
        }

        let total = aggregate.total_occurrence_count;
        if total == 0 {
            return false;
        }

        match self.mode {
            NativeMode::MajorityVote => {
                let total = f64::from(total);
                let native_share = f64::from(aggregate.native_count()) / total;
                let introduced_share = f64::from(aggregate.introduced_count()) / total;

                native_share > NATIVE_SHARE_THRESHOLD || introduced_share < INTRODUCED_SHARE_THRESHOLD
            }
            NativeMode::StrictPerOccurrence => aggregate.native_count() == total,
        }
    }

    /// Evaluate using the aggregate's own scientific name
    pub fn is_native_aggregate(&self, aggregate: &TaxonAggregate) -> bool {
        self.is_native(aggregate, &canonical_name(&aggregate.scientific_name))
    }
}

/// Genus + species: the first two whitespace-delimited tokens
pub fn canonical_name(scientific_name: &str) -> String {
    scientific_name
        .split_whitespace()
        .take(2)
        .collect::<Vec<_>>()
        .join(" ")
}
