//! Test helpers: call-counting collaborators and service wiring

#![allow(dead_code)]

use async_trait::async_trait;
use std::collections::{HashMap, HashSet};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use treefinder_common::config::TomlConfig;
use treefinder_search::db::{init_memory_pool, SqliteSpeciesStore};
use treefinder_search::models::{DetailRecord, EstablishmentMeans, OccurrenceRecord, TaxonKey};
use treefinder_search::rules::RuleSet;
use treefinder_search::services::{Collaborators, SearchService};
use treefinder_search::types::{
    Coordinates, DetailSource, Geocoder, OccurrenceQuery, OccurrenceSource, SourceError,
};

pub const AUSTIN: Coordinates = Coordinates {
    lat: 30.2672,
    lon: -97.7431,
};

pub struct MockOccurrenceSource {
    result: Result<Vec<OccurrenceRecord>, SourceError>,
    calls: AtomicUsize,
}

impl MockOccurrenceSource {
    pub fn returning(records: Vec<OccurrenceRecord>) -> Arc<Self> {
        Arc::new(Self {
            result: Ok(records),
            calls: AtomicUsize::new(0),
        })
    }

    pub fn failing(error: SourceError) -> Arc<Self> {
        Arc::new(Self {
            result: Err(error),
            calls: AtomicUsize::new(0),
        })
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl OccurrenceSource for MockOccurrenceSource {
    fn name(&self) -> &'static str {
        "mock-occurrences"
    }

    async fn search(&self, _query: &OccurrenceQuery) -> Result<Vec<OccurrenceRecord>, SourceError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.result.clone()
    }
}

pub struct MockDetailSource {
    details: HashMap<TaxonKey, DetailRecord>,
    failing: HashSet<TaxonKey>,
    calls: AtomicUsize,
}

impl MockDetailSource {
    pub fn new(details: Vec<DetailRecord>) -> Self {
        Self {
            details: details.into_iter().map(|d| (d.taxon_key, d)).collect(),
            failing: HashSet::new(),
            calls: AtomicUsize::new(0),
        }
    }

    pub fn failing_for(mut self, key: u64) -> Self {
        self.failing.insert(TaxonKey(key));
        self
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl DetailSource for MockDetailSource {
    fn name(&self) -> &'static str {
        "mock-details"
    }

    async fn details(&self, taxon_key: TaxonKey) -> Result<Option<DetailRecord>, SourceError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if self.failing.contains(&taxon_key) {
            return Err(SourceError::Api(500, "detail lookup failed".to_string()));
        }
        Ok(self.details.get(&taxon_key).cloned())
    }
}

pub struct MockGeocoder {
    result: Result<Option<Coordinates>, SourceError>,
    calls: AtomicUsize,
}

impl MockGeocoder {
    pub fn at(coordinates: Coordinates) -> Arc<Self> {
        Self::with_result(Ok(Some(coordinates)))
    }

    pub fn not_found() -> Arc<Self> {
        Self::with_result(Ok(None))
    }

    pub fn failing(error: SourceError) -> Arc<Self> {
        Self::with_result(Err(error))
    }

    fn with_result(result: Result<Option<Coordinates>, SourceError>) -> Arc<Self> {
        Arc::new(Self {
            result,
            calls: AtomicUsize::new(0),
        })
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl Geocoder for MockGeocoder {
    fn name(&self) -> &'static str {
        "mock-geocoder"
    }

    async fn geocode(&self, _city: &str, _state: &str) -> Result<Option<Coordinates>, SourceError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.result.clone()
    }
}

pub async fn memory_store() -> Arc<SqliteSpeciesStore> {
    let pool = init_memory_pool()
        .await
        .expect("Failed to create in-memory database");
    Arc::new(SqliteSpeciesStore::new(pool))
}

pub fn build_service(
    occurrences: Arc<MockOccurrenceSource>,
    details: Arc<MockDetailSource>,
    geocoder: Arc<MockGeocoder>,
    store: Arc<SqliteSpeciesStore>,
) -> SearchService {
    let rules = Arc::new(RuleSet::builtin().expect("Built-in rules must parse"));
    let collaborators = Collaborators {
        occurrences,
        details,
        geocoder,
        store,
    };
    SearchService::new(collaborators, rules, &TomlConfig::default())
}

/// `count` occurrences of one taxon, all with the same establishment label
pub fn occurrences_of(
    key: u64,
    scientific_name: &str,
    family: &str,
    vernacular: &str,
    means: EstablishmentMeans,
    count: usize,
) -> Vec<OccurrenceRecord> {
    (0..count)
        .map(|_| {
            OccurrenceRecord::new(key, scientific_name)
                .with_family(family)
                .with_vernacular(vernacular)
                .with_means(means)
        })
        .collect()
}

pub fn detail(key: u64, scientific_name: &str, common_name: &str, family: &str) -> DetailRecord {
    DetailRecord {
        taxon_key: TaxonKey(key),
        external_id: key.to_string(),
        scientific_name: scientific_name.to_string(),
        common_name: common_name.to_string(),
        family: Some(family.to_string()),
        vernacular_name: Some(common_name.to_string()),
        image_url: Some(format!("https://images.example.org/{}.jpg", key)),
        description: None,
        max_height: None,
        max_age: None,
    }
}

/// Native oak-family taxon `key`, observed `count` times
pub fn native_oak(key: u64, count: usize) -> (Vec<OccurrenceRecord>, DetailRecord) {
    let scientific = format!("Quercus taxon{}", key);
    let common = format!("Oak {}", key);
    (
        occurrences_of(key, &scientific, "Fagaceae", &common, EstablishmentMeans::Native, count),
        detail(key, &scientific, &common, "Fagaceae"),
    )
}
