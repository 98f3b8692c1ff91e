//! Collaborator traits consumed by the search pipeline
//!
//! - `OccurrenceSource`: raw occurrence search around a point
//! - `DetailSource`: descriptive detail for a single taxon
//! - `Geocoder`: city/state to coordinates
//!
//! The persistent store trait lives in `db::species`. Concrete HTTP
//! implementations are in `services::gbif_*` and `services::nominatim_geocoder`.

use crate::models::{DetailRecord, OccurrenceRecord, TaxonKey};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Failures reported by external data sources
#[derive(Debug, Clone, Error, PartialEq)]
pub enum SourceError {
    #[error("Network error: {0}")]
    Network(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Rate limit exceeded")]
    RateLimitExceeded,

    #[error("API error {0}: {1}")]
    Api(u16, String),

    #[error("Parse error: {0}")]
    Parse(String),
}

impl SourceError {
    /// Map a non-success HTTP status the same way for every client
    pub fn from_status(status: u16, body: String, what: &str) -> Self {
        match status {
            404 => SourceError::NotFound(what.to_string()),
            429 | 503 => SourceError::RateLimitExceeded,
            _ => SourceError::Api(status, body),
        }
    }
}

impl From<reqwest::Error> for SourceError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_decode() {
            SourceError::Parse(err.to_string())
        } else {
            SourceError::Network(err.to_string())
        }
    }
}

/// Geocoded point
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Coordinates {
    pub lat: f64,
    pub lon: f64,
}

/// Parameters for one occurrence search
#[derive(Debug, Clone, PartialEq)]
pub struct OccurrenceQuery {
    pub city: String,
    pub state: String,
    pub coordinates: Coordinates,
    pub radius_km: u32,
    pub max_records: usize,
}

#[async_trait]
pub trait OccurrenceSource: Send + Sync {
    /// Source name for logs and error reports
    fn name(&self) -> &'static str;

    async fn search(&self, query: &OccurrenceQuery) -> Result<Vec<OccurrenceRecord>, SourceError>;
}

#[async_trait]
pub trait DetailSource: Send + Sync {
    fn name(&self) -> &'static str;

    /// `Ok(None)` when the source has no usable record for the key
    async fn details(&self, taxon_key: TaxonKey) -> Result<Option<DetailRecord>, SourceError>;
}

#[async_trait]
pub trait Geocoder: Send + Sync {
    fn name(&self) -> &'static str;

    /// `Ok(None)` when the location cannot be resolved
    async fn geocode(&self, city: &str, state: &str) -> Result<Option<Coordinates>, SourceError>;
}
