//! Occurrence records as delivered by the occurrence source

use serde::{Deserialize, Serialize};
use std::fmt;

/// Source taxon identifier
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TaxonKey(pub u64);

impl fmt::Display for TaxonKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<u64> for TaxonKey {
    fn from(key: u64) -> Self {
        Self(key)
    }
}

/// Establishment-means label attached to an occurrence
///
/// `Unknown` doubles as "not reported": most records carry no label.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum EstablishmentMeans {
    Native,
    Introduced,
    Invasive,
    Naturalised,
    Managed,
    Uncertain,
    #[default]
    Unknown,
}

impl EstablishmentMeans {
    /// Parse a source label case-insensitively; absent or unrecognised labels are `Unknown`
    pub fn from_label(label: Option<&str>) -> Self {
        let Some(label) = label else {
            return EstablishmentMeans::Unknown;
        };

        match label.trim().to_ascii_uppercase().as_str() {
            "NATIVE" => EstablishmentMeans::Native,
            "INTRODUCED" => EstablishmentMeans::Introduced,
            "INVASIVE" => EstablishmentMeans::Invasive,
            "NATURALISED" | "NATURALIZED" => EstablishmentMeans::Naturalised,
            "MANAGED" => EstablishmentMeans::Managed,
            "UNCERTAIN" => EstablishmentMeans::Uncertain,
            _ => EstablishmentMeans::Unknown,
        }
    }

    /// Labels that count against native status
    pub fn is_introduced(self) -> bool {
        matches!(
            self,
            EstablishmentMeans::Introduced
                | EstablishmentMeans::Invasive
                | EstablishmentMeans::Naturalised
        )
    }

    pub fn as_str(self) -> &'static str {
        match self {
            EstablishmentMeans::Native => "NATIVE",
            EstablishmentMeans::Introduced => "INTRODUCED",
            EstablishmentMeans::Invasive => "INVASIVE",
            EstablishmentMeans::Naturalised => "NATURALISED",
            EstablishmentMeans::Managed => "MANAGED",
            EstablishmentMeans::Uncertain => "UNCERTAIN",
            EstablishmentMeans::Unknown => "UNKNOWN",
        }
    }
}

impl fmt::Display for EstablishmentMeans {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One observation of a taxon at a place
///
/// Key and name are optional because upstream records routinely lack them;
/// the aggregator skips such records.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct OccurrenceRecord {
    pub taxon_key: Option<TaxonKey>,
    pub scientific_name: Option<String>,
    pub family: Option<String>,
    pub vernacular_name: Option<String>,
    pub establishment_means: EstablishmentMeans,
}

impl OccurrenceRecord {
    pub fn new(taxon_key: u64, scientific_name: impl Into<String>) -> Self {
        Self {
            taxon_key: Some(TaxonKey(taxon_key)),
            scientific_name: Some(scientific_name.into()),
            ..Default::default()
        }
    }

    pub fn with_family(mut self, family: impl Into<String>) -> Self {
        self.family = Some(family.into());
        self
    }

    pub fn with_vernacular(mut self, name: impl Into<String>) -> Self {
        self.vernacular_name = Some(name.into());
        self
    }

    pub fn with_means(mut self, means: EstablishmentMeans) -> Self {
        self.establishment_means = means;
        self
    }
}
