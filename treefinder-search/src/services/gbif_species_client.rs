//! GBIF species detail client
//!
//! `/species/{key}` is authoritative. Vernacular names, media and
//! descriptions are best-effort sub-lookups: a failure there degrades the
//! record, it never drops it.

use super::http_client::{build_http_client, get_json};
use crate::models::{DetailRecord, TaxonKey};
use crate::types::{DetailSource, SourceError};
use async_trait::async_trait;
use governor::{DefaultDirectRateLimiter, Quota, RateLimiter};
use serde::Deserialize;
use std::num::NonZeroU32;
use treefinder_common::config::SourcesConfig;

const SUB_LOOKUP_LIMIT: &str = "50";

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct GbifSpecies {
    key: u64,
    /// Set when this key is a synonym
    accepted_key: Option<u64>,
    scientific_name: Option<String>,
    canonical_name: Option<String>,
    vernacular_name: Option<String>,
    family: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(bound(deserialize = "T: Deserialize<'de>"))]
struct Paged<T> {
    #[serde(default)]
    results: Vec<T>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct GbifVernacularName {
    vernacular_name: Option<String>,
    language: Option<String>,
}

#[derive(Debug, Deserialize)]
struct GbifMedia {
    #[serde(rename = "type")]
    media_type: Option<String>,
    identifier: Option<String>,
}

#[derive(Debug, Deserialize)]
struct GbifDescription {
    #[serde(rename = "type")]
    description_type: Option<String>,
    description: Option<String>,
    language: Option<String>,
}

pub struct GbifSpeciesClient {
    http_client: reqwest::Client,
    base_url: String,
    rate_limiter: DefaultDirectRateLimiter,
}

impl GbifSpeciesClient {
    pub fn new(sources: &SourcesConfig) -> Result<Self, SourceError> {
        let per_second = NonZeroU32::new(sources.requests_per_second).unwrap_or(NonZeroU32::MIN);

        Ok(Self {
            http_client: build_http_client(sources)?,
            base_url: sources.gbif_base_url.trim_end_matches('/').to_string(),
            rate_limiter: RateLimiter::direct(Quota::per_second(per_second)),
        })
    }

    async fn get<T: serde::de::DeserializeOwned>(
        &self,
        path: &str,
        query: &[(&str, &str)],
        what: &str,
    ) -> Result<T, SourceError> {
        self.rate_limiter.until_ready().await;
        let url = format!("{}{}", self.base_url, path);
        get_json(&self.http_client, &url, query, what).await
    }

    async fn species(&self, key: TaxonKey) -> Result<Option<GbifSpecies>, SourceError> {
        match self
            .get(&format!("/species/{}", key), &[], &format!("species {}", key))
            .await
        {
            Ok(species) => Ok(Some(species)),
            Err(SourceError::NotFound(_)) => Ok(None),
            Err(e) => Err(e),
        }
    }

    async fn english_vernacular(&self, key: u64) -> Option<String> {
        let page: Paged<GbifVernacularName> = self
            .sub_lookup(key, "vernacularNames")
            .await?;

        page.results
            .into_iter()
            .filter(|v| matches!(v.language.as_deref(), Some("eng") | Some("en")))
            .find_map(|v| non_empty(v.vernacular_name))
    }

    async fn still_image(&self, key: u64) -> Option<String> {
        let page: Paged<GbifMedia> = self.sub_lookup(key, "media").await?;

        page.results
            .into_iter()
            .filter(|m| m.media_type.as_deref() == Some("StillImage"))
            .find_map(|m| non_empty(m.identifier))
    }

    /// Habitat-typed English text first, then any non-empty English text
    async fn description(&self, key: u64) -> Option<String> {
        let page: Paged<GbifDescription> = self.sub_lookup(key, "descriptions").await?;

        let english: Vec<GbifDescription> = page
            .results
            .into_iter()
            .filter(|d| matches!(d.language.as_deref(), None | Some("eng") | Some("en")))
            .collect();

        let is_habitat = |d: &GbifDescription| {
            d.description_type
                .as_deref()
                .map(|t| t.to_lowercase().contains("habitat"))
                .unwrap_or(false)
        };

        english
            .iter()
            .filter(|d| is_habitat(*d))
            .chain(english.iter().filter(|d| !is_habitat(*d)))
            .find_map(|d| non_empty(d.description.clone()))
    }

    async fn sub_lookup<T: serde::de::DeserializeOwned>(&self, key: u64, resource: &str) -> Option<T> {
        let path = format!("/species/{}/{}", key, resource);
        match self
            .get(&path, &[("limit", SUB_LOOKUP_LIMIT)], resource)
            .await
        {
            Ok(page) => Some(page),
            Err(SourceError::NotFound(_)) => None,
            Err(e) => {
                tracing::debug!(key = key, resource = resource, error = %e, "Optional species lookup failed");
                None
            }
        }
    }
}

#[async_trait]
impl DetailSource for GbifSpeciesClient {
    fn name(&self) -> &'static str {
        "gbif-species"
    }

    async fn details(&self, taxon_key: TaxonKey) -> Result<Option<DetailRecord>, SourceError> {
        let Some(species) = self.species(taxon_key).await? else {
            return Ok(None);
        };
        let Some(scientific_name) = non_empty(species.scientific_name.clone()) else {
            return Ok(None);
        };

        let key = species.key;
        let (english, image_url, description) = tokio::join!(
            self.english_vernacular(key),
            self.still_image(key),
            self.description(key),
        );

        let vernacular_name = english.or_else(|| non_empty(species.vernacular_name.clone()));
        let common_name = vernacular_name
            .clone()
            .or_else(|| non_empty(species.canonical_name.clone()))
            .unwrap_or_else(|| scientific_name.clone());

        Ok(Some(DetailRecord {
            taxon_key,
            external_id: species.accepted_key.unwrap_or(key).to_string(),
            scientific_name,
            common_name,
            family: species.family,
            vernacular_name,
            image_url,
            description,
            max_height: None,
            max_age: None,
        }))
    }
}

fn non_empty(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}
