//! Enriched detail records and persisted species

use super::occurrence::TaxonKey;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Descriptive detail for one taxon, as returned by the detail source
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DetailRecord {
    /// Occurrence-level key this detail was requested for
    pub taxon_key: TaxonKey,
    /// Canonical source identifier; the cross-location dedup key
    pub external_id: String,
    pub scientific_name: String,
    pub common_name: String,
    pub family: Option<String>,
    /// Vernacular name as the detail source reports it (may differ from occurrences)
    pub vernacular_name: Option<String>,
    pub image_url: Option<String>,
    pub description: Option<String>,
    pub max_height: Option<f64>,
    pub max_age: Option<f64>,
}

/// Persisted, location-scoped species
///
/// Never mutated after insert. Several rows may share an `external_id`
/// (one per location), but never the same `external_id` for the same
/// city and state.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SpeciesRecord {
    pub id: Uuid,
    /// Null only for legacy rows
    pub external_id: Option<String>,
    pub common_name: String,
    pub scientific_name: String,
    pub image_url: Option<String>,
    pub habitat_description: String,
    pub max_height: Option<f64>,
    pub max_age: Option<f64>,
    pub city: String,
    pub state: String,
}

/// Species fields awaiting insert (identity is assigned by the store)
#[derive(Debug, Clone, PartialEq)]
pub struct NewSpecies {
    pub external_id: Option<String>,
    pub common_name: String,
    pub scientific_name: String,
    pub image_url: Option<String>,
    pub habitat_description: String,
    pub max_height: Option<f64>,
    pub max_age: Option<f64>,
    pub city: String,
    pub state: String,
}

impl NewSpecies {
    /// Copy the descriptive fields of an existing row into a new location
    pub fn clone_for_location(existing: &SpeciesRecord, city: &str, state: &str) -> Self {
        Self {
            external_id: existing.external_id.clone(),
            common_name: existing.common_name.clone(),
            scientific_name: existing.scientific_name.clone(),
            image_url: existing.image_url.clone(),
            habitat_description: existing.habitat_description.clone(),
            max_height: existing.max_height,
            max_age: existing.max_age,
            city: city.to_string(),
            state: state.to_string(),
        }
    }

    pub fn into_record(self, id: Uuid) -> SpeciesRecord {
        SpeciesRecord {
            id,
            external_id: self.external_id,
            common_name: self.common_name,
            scientific_name: self.scientific_name,
            image_url: self.image_url,
            habitat_description: self.habitat_description,
            max_height: self.max_height,
            max_age: self.max_age,
            city: self.city,
            state: self.state,
        }
    }
}

/// Result of one native tree search
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SearchResponse {
    pub species: Vec<SpeciesRecord>,
    /// "<city>, <state>"
    pub location: String,
    pub count: usize,
}

impl SearchResponse {
    pub fn new(species: Vec<SpeciesRecord>, location: String) -> Self {
        let count = species.len();
        Self {
            species,
            location,
            count,
        }
    }

    pub fn empty(location: String) -> Self {
        Self::new(Vec::new(), location)
    }
}
