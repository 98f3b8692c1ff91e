//! Search pipeline services and external source clients

pub mod enrichment_fetcher;
pub mod gbif_occurrence_client;
pub mod gbif_species_client;
pub mod habitat_text;
mod http_client;
pub mod location;
pub mod native_status;
pub mod nominatim_geocoder;
pub mod occurrence_aggregator;
pub mod ranking;
pub mod search_orchestrator;
pub mod species_resolver;
pub mod taxon_classifier;

pub use enrichment_fetcher::EnrichmentFetcher;
pub use gbif_occurrence_client::GbifOccurrenceClient;
pub use gbif_species_client::GbifSpeciesClient;
pub use native_status::NativeStatusEvaluator;
pub use nominatim_geocoder::NominatimGeocoder;
pub use occurrence_aggregator::{AggregationStats, OccurrenceAggregator};
pub use search_orchestrator::{Collaborators, SearchService};
pub use species_resolver::SpeciesResolver;
pub use taxon_classifier::TaxonClassifier;
