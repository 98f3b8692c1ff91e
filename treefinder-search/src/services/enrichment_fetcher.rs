//! Batched detail enrichment
//!
//! Keys are looked up in fixed-size batches. Lookups inside a batch run
//! concurrently; a fixed pause separates consecutive batches (never inside
//! one). Each lookup fills only its own slot, and a failed lookup leaves
//! that slot empty without affecting its neighbours.

use super::taxon_classifier::TaxonClassifier;
use crate::models::{DetailRecord, TaxonKey};
use crate::types::DetailSource;
use futures::future::join_all;
use std::sync::Arc;
use std::time::Duration;

pub struct EnrichmentFetcher {
    source: Arc<dyn DetailSource>,
    classifier: TaxonClassifier,
    batch_size: usize,
    batch_delay: Duration,
}

impl EnrichmentFetcher {
    pub fn new(
        source: Arc<dyn DetailSource>,
        classifier: TaxonClassifier,
        batch_size: usize,
        batch_delay: Duration,
    ) -> Self {
        Self {
            source,
            classifier,
            batch_size: batch_size.max(1),
            batch_delay,
        }
    }

    /// One slot per input key, in input order; `None` marks a failed lookup
    pub async fn fetch_details(&self, keys: &[TaxonKey]) -> Vec<Option<DetailRecord>> {
        let mut slots = Vec::with_capacity(keys.len());

        for (batch_index, batch) in keys.chunks(self.batch_size).enumerate() {
            if batch_index > 0 && !self.batch_delay.is_zero() {
                tokio::time::sleep(self.batch_delay).await;
            }

            tracing::debug!(
                batch = batch_index,
                size = batch.len(),
                source = self.source.name(),
                "Fetching detail batch"
            );

            // join_all yields results in input order regardless of completion order
            let results = join_all(batch.iter().map(|key| self.lookup(*key))).await;
            slots.extend(results);
        }

        slots
    }

    /// Fetch, drop failures, then re-check tree status against the enriched names
    pub async fn enrich(&self, keys: &[TaxonKey]) -> Vec<DetailRecord> {
        let slots = self.fetch_details(keys).await;
        let fetched = slots.iter().filter(|s| s.is_some()).count();

        let survivors: Vec<DetailRecord> = slots
            .into_iter()
            .flatten()
            .filter(|detail| {
                let tree = self.classifier.is_likely_tree(
                    &detail.scientific_name,
                    detail.family.as_deref(),
                    detail.vernacular_name.as_deref(),
                );
                if !tree {
                    tracing::debug!(
                        taxon_key = %detail.taxon_key,
                        scientific_name = %detail.scientific_name,
                        vernacular_name = ?detail.vernacular_name,
                        "Dropped on enriched tree check"
                    );
                }
                tree
            })
            .collect();

        tracing::info!(
            requested = keys.len(),
            fetched,
            survivors = survivors.len(),
            "Enrichment complete"
        );

        survivors
    }

    async fn lookup(&self, key: TaxonKey) -> Option<DetailRecord> {
        match self.source.details(key).await {
            Ok(Some(detail)) => Some(detail),
            Ok(None) => {
                tracing::warn!(taxon_key = %key, source = self.source.name(), "No detail record, taxon dropped");
                None
            }
            Err(e) => {
                tracing::warn!(
                    taxon_key = %key,
                    source = self.source.name(),
                    error = %e,
                    "Detail lookup failed, taxon dropped"
                );
                None
            }
        }
    }
}
