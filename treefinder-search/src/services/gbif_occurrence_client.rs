//! GBIF occurrence search client
//!
//! Pages through `/occurrence/search` around a geocoded point, restricted
//! to present plant records with coordinates.

use super::http_client::{build_http_client, get_json};
use crate::models::{EstablishmentMeans, OccurrenceRecord, TaxonKey};
use crate::types::{OccurrenceQuery, OccurrenceSource, SourceError};
use async_trait::async_trait;
use serde::Deserialize;
use treefinder_common::config::{OccurrenceConfig, SourcesConfig};

/// GBIF backbone key for kingdom Plantae
const PLANTAE_KINGDOM_KEY: &str = "6";

/// Largest page GBIF serves
const GBIF_MAX_PAGE: usize = 300;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct OccurrencePage {
    #[serde(default)]
    end_of_records: bool,
    #[serde(default)]
    results: Vec<GbifOccurrence>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct GbifOccurrence {
    taxon_key: Option<u64>,
    species_key: Option<u64>,
    scientific_name: Option<String>,
    family: Option<String>,
    vernacular_name: Option<String>,
    establishment_means: Option<EstablishmentLabel>,
}

/// Plain label, or a vocabulary concept object
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum EstablishmentLabel {
    Plain(String),
    Concept { concept: String },
}

impl EstablishmentLabel {
    fn as_str(&self) -> &str {
        match self {
            EstablishmentLabel::Plain(label) => label,
            EstablishmentLabel::Concept { concept } => concept,
        }
    }
}

impl From<GbifOccurrence> for OccurrenceRecord {
    fn from(occ: GbifOccurrence) -> Self {
        OccurrenceRecord {
            // Infraspecific records roll up to their species
            taxon_key: occ.species_key.or(occ.taxon_key).map(TaxonKey),
            scientific_name: occ.scientific_name,
            family: occ.family,
            vernacular_name: occ.vernacular_name,
            establishment_means: EstablishmentMeans::from_label(
                occ.establishment_means.as_ref().map(EstablishmentLabel::as_str),
            ),
        }
    }
}

pub struct GbifOccurrenceClient {
    http_client: reqwest::Client,
    base_url: String,
    page_size: usize,
}

impl GbifOccurrenceClient {
    pub fn new(sources: &SourcesConfig, occurrence: &OccurrenceConfig) -> Result<Self, SourceError> {
        Ok(Self {
            http_client: build_http_client(sources)?,
            base_url: sources.gbif_base_url.trim_end_matches('/').to_string(),
            page_size: occurrence.page_size.clamp(1, GBIF_MAX_PAGE),
        })
    }

    async fn fetch_page(
        &self,
        query: &OccurrenceQuery,
        offset: usize,
        limit: usize,
    ) -> Result<OccurrencePage, SourceError> {
        let url = format!("{}/occurrence/search", self.base_url);
        let geo_distance = format!(
            "{:.5},{:.5},{}km",
            query.coordinates.lat, query.coordinates.lon, query.radius_km
        );
        let params = [
            ("kingdomKey", PLANTAE_KINGDOM_KEY.to_string()),
            ("occurrenceStatus", "PRESENT".to_string()),
            ("hasCoordinate", "true".to_string()),
            ("geoDistance", geo_distance),
            ("limit", limit.to_string()),
            ("offset", offset.to_string()),
        ];

        get_json(&self.http_client, &url, &params, "occurrence search").await
    }
}

#[async_trait]
impl OccurrenceSource for GbifOccurrenceClient {
    fn name(&self) -> &'static str {
        "gbif-occurrence"
    }

    async fn search(&self, query: &OccurrenceQuery) -> Result<Vec<OccurrenceRecord>, SourceError> {
        let mut records = Vec::new();
        let mut offset = 0;

        while records.len() < query.max_records {
            let limit = self.page_size.min(query.max_records - records.len());
            let page = self.fetch_page(query, offset, limit).await?;
            let fetched = page.results.len();

            records.extend(page.results.into_iter().map(OccurrenceRecord::from));
            offset += fetched;

            if page.end_of_records || fetched == 0 {
                break;
            }
        }

        tracing::info!(
            city = %query.city,
            state = %query.state,
            records = records.len(),
            "Fetched occurrences from GBIF"
        );

        Ok(records)
    }
}
