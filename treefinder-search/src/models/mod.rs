//! Data model for the native tree search
//!
//! - `occurrence`: raw observations and establishment-means labels
//! - `aggregate`: per-taxon occurrence tallies built during one search
//! - `species`: enriched detail records and persisted species rows

pub mod aggregate;
pub mod occurrence;
pub mod species;

pub use aggregate::{AggregateMap, TaxonAggregate};
pub use occurrence::{EstablishmentMeans, OccurrenceRecord, TaxonKey};
pub use species::{DetailRecord, NewSpecies, SearchResponse, SpeciesRecord};
