//! Nominatim geocoder for US city/state pairs

use super::http_client::{build_http_client, get_json};
use crate::types::{Coordinates, Geocoder, SourceError};
use async_trait::async_trait;
use serde::Deserialize;
use treefinder_common::config::SourcesConfig;

/// Nominatim returns coordinates as strings
#[derive(Debug, Deserialize)]
struct NominatimPlace {
    lat: String,
    lon: String,
}

pub struct NominatimGeocoder {
    http_client: reqwest::Client,
    base_url: String,
}

impl NominatimGeocoder {
    pub fn new(sources: &SourcesConfig) -> Result<Self, SourceError> {
        Ok(Self {
            http_client: build_http_client(sources)?,
            base_url: sources.nominatim_base_url.trim_end_matches('/').to_string(),
        })
    }
}

#[async_trait]
impl Geocoder for NominatimGeocoder {
    fn name(&self) -> &'static str {
        "nominatim"
    }

    async fn geocode(&self, city: &str, state: &str) -> Result<Option<Coordinates>, SourceError> {
        let url = format!("{}/search", self.base_url);
        let params = [
            ("city", city),
            ("state", state),
            ("country", "us"),
            ("format", "json"),
            ("limit", "1"),
        ];

        let places: Vec<NominatimPlace> =
            get_json(&self.http_client, &url, &params, "geocode").await?;

        let Some(place) = places.into_iter().next() else {
            return Ok(None);
        };

        let lat = place
            .lat
            .parse::<f64>()
            .map_err(|e| SourceError::Parse(format!("lat {:?}: {}", place.lat, e)))?;
        let lon = place
            .lon
            .parse::<f64>()
            .map_err(|e| SourceError::Parse(format!("lon {:?}: {}", place.lon, e)))?;

        tracing::debug!(city = %city, state = %state, lat = lat, lon = lon, "Geocoded location");
        Ok(Some(Coordinates { lat, lon }))
    }
}
