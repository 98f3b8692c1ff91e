//! Native tree search orchestration
//!
//! Pipeline for one (city, state):
//! 1. Well-formedness check → empty result if malformed
//! 2. Location cache lookup → return verbatim on hit
//! 3. Geocode → empty result if not found
//! 4. Occurrence search
//! 5. Aggregate (first tree check) → native-status filter → rank and truncate
//! 6. Batched enrichment (second tree check)
//! 7. Resolve against stored species and persist
//!
//! Outbound calls happen only in steps 3, 4 and 6. Zero survivors at any
//! stage is a normal empty response.

use super::enrichment_fetcher::EnrichmentFetcher;
use super::location::{is_well_formed_city, location_label, normalize_location};
use super::native_status::NativeStatusEvaluator;
use super::occurrence_aggregator::OccurrenceAggregator;
use super::ranking;
use super::species_resolver::SpeciesResolver;
use super::taxon_classifier::TaxonClassifier;
use crate::db::SpeciesStore;
use crate::error::SearchError;
use crate::models::{SearchResponse, TaxonAggregate};
use crate::rules::RuleSet;
use crate::types::{DetailSource, Geocoder, OccurrenceQuery, OccurrenceSource};
use std::sync::Arc;
use std::time::{Duration, Instant};
use treefinder_common::config::TomlConfig;

/// External collaborators the search depends on
#[derive(Clone)]
pub struct Collaborators {
    pub occurrences: Arc<dyn OccurrenceSource>,
    pub details: Arc<dyn DetailSource>,
    pub geocoder: Arc<dyn Geocoder>,
    pub store: Arc<dyn SpeciesStore>,
}

pub struct SearchService {
    occurrences: Arc<dyn OccurrenceSource>,
    geocoder: Arc<dyn Geocoder>,
    store: Arc<dyn SpeciesStore>,
    aggregator: OccurrenceAggregator,
    evaluator: NativeStatusEvaluator,
    fetcher: EnrichmentFetcher,
    resolver: SpeciesResolver,
    result_limit: usize,
    radius_km: u32,
    max_records: usize,
}

impl SearchService {
    pub fn new(collaborators: Collaborators, rules: Arc<RuleSet>, config: &TomlConfig) -> Self {
        let pipeline = &config.pipeline;
        let classifier = TaxonClassifier::new(rules.clone());

        Self {
            occurrences: collaborators.occurrences,
            geocoder: collaborators.geocoder,
            store: collaborators.store.clone(),
            aggregator: OccurrenceAggregator::new(classifier.clone(), pipeline.native_mode),
            evaluator: NativeStatusEvaluator::new(rules, pipeline.native_mode),
            fetcher: EnrichmentFetcher::new(
                collaborators.details,
                classifier,
                pipeline.enrichment_batch_size,
                Duration::from_millis(pipeline.batch_delay_ms),
            ),
            resolver: SpeciesResolver::new(collaborators.store, pipeline.description_max_chars),
            result_limit: pipeline.result_limit,
            radius_km: config.occurrence.search_radius_km,
            max_records: config.occurrence.max_records,
        }
    }

    /// Native trees observed around (city, state)
    pub async fn search_native_trees(&self, city: &str, state: &str) -> Result<SearchResponse, SearchError> {
        let (city, state) = normalize_location(city, state);
        let location = location_label(&city, &state);

        if !is_well_formed_city(&city) {
            tracing::info!(location = %location, "Malformed city, returning empty result");
            return Ok(SearchResponse::empty(location));
        }

        let cached = self.store.find_by_location(&city, &state).await?;
        if !cached.is_empty() {
            tracing::info!(location = %location, count = cached.len(), "Location cache hit");
            return Ok(SearchResponse::new(cached, location));
        }

        let started = Instant::now();

        let coordinates = match self.geocoder.geocode(&city, &state).await {
            Ok(Some(coordinates)) => coordinates,
            Ok(None) => {
                tracing::info!(location = %location, "Location not found by geocoder");
                return Ok(SearchResponse::empty(location));
            }
            Err(e) => return Err(SearchError::upstream(self.geocoder.name(), e)),
        };

        let query = OccurrenceQuery {
            city: city.clone(),
            state: state.clone(),
            coordinates,
            radius_km: self.radius_km,
            max_records: self.max_records,
        };
        let occurrences = self
            .occurrences
            .search(&query)
            .await
            .map_err(|e| SearchError::upstream(self.occurrences.name(), e))?;

        let (aggregates, stats) = self.aggregator.aggregate_with_stats(&occurrences);
        tracing::info!(
            location = %location,
            occurrences = stats.occurrences_seen,
            missing_identity = stats.missing_identity,
            not_tree = stats.rejected_not_tree,
            not_native_labelled = stats.rejected_not_native_labelled,
            taxa = aggregates.len(),
            "Occurrences aggregated"
        );

        let natives: Vec<TaxonAggregate> = aggregates
            .into_values()
            .filter(|agg| self.evaluator.is_native_aggregate(agg))
            .collect();

        let selected = ranking::select(&natives, self.result_limit);
        tracing::info!(
            location = %location,
            native_taxa = natives.len(),
            selected = selected.len(),
            "Native candidates ranked"
        );

        if selected.is_empty() {
            return Ok(SearchResponse::empty(location));
        }

        let details = self.fetcher.enrich(&selected).await;
        if details.is_empty() {
            return Ok(SearchResponse::empty(location));
        }

        let species = self.resolver.resolve_all(&city, &state, &details).await?;

        tracing::info!(
            location = %location,
            count = species.len(),
            elapsed_ms = started.elapsed().as_millis() as u64,
            "Search complete"
        );

        Ok(SearchResponse::new(species, location))
    }
}
