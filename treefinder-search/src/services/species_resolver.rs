//! Species resolution against the persistent store
//!
//! A taxon already resolved for any location is cloned into the new location
//! without re-deriving its descriptive text. Otherwise a fresh row is built
//! from the enriched detail. `external_id` is the dedup key throughout.

use super::habitat_text::{clean_description, habitat_template, truncate_description};
use crate::db::SpeciesStore;
use crate::models::{DetailRecord, NewSpecies, SpeciesRecord};
use std::collections::HashSet;
use std::sync::Arc;
use treefinder_common::{Error, Result};

pub struct SpeciesResolver {
    store: Arc<dyn SpeciesStore>,
    description_max_chars: usize,
}

impl SpeciesResolver {
    pub fn new(store: Arc<dyn SpeciesStore>, description_max_chars: usize) -> Self {
        Self {
            store,
            description_max_chars,
        }
    }

    /// Draft plus whether it was cloned from another location
    async fn prepare_draft(
        &self,
        city: &str,
        state: &str,
        detail: &DetailRecord,
    ) -> Result<(NewSpecies, bool)> {
        if let Some(existing) = self.store.find_by_external_id(&detail.external_id).await? {
            tracing::debug!(
                external_id = %detail.external_id,
                from_city = %existing.city,
                from_state = %existing.state,
                "Reusing species resolved for another location"
            );
            return Ok((NewSpecies::clone_for_location(&existing, city, state), true));
        }

        let fresh = NewSpecies {
            external_id: Some(detail.external_id.clone()),
            common_name: detail.common_name.clone(),
            scientific_name: detail.scientific_name.clone(),
            image_url: detail.image_url.clone(),
            habitat_description: self.habitat_description(detail, state),
            max_height: detail.max_height,
            max_age: detail.max_age,
            city: city.to_string(),
            state: state.to_string(),
        };
        Ok((fresh, false))
    }

    /// Resolve and persist one species
    pub async fn resolve(&self, city: &str, state: &str, detail: &DetailRecord) -> Result<SpeciesRecord> {
        let (new, _) = self.prepare_draft(city, state, detail).await?;
        if let Some(record) = self.store.insert(new).await? {
            return Ok(record);
        }

        // Already stored for this location
        self.store
            .find_by_location(city, state)
            .await?
            .into_iter()
            .find(|s| s.external_id.as_deref() == Some(detail.external_id.as_str()))
            .ok_or_else(|| {
                Error::Internal(format!(
                    "Species {} neither inserted nor found for {}, {}",
                    detail.external_id, city, state
                ))
            })
    }

    /// Resolve every detail in rank order and persist them in one transaction
    pub async fn resolve_all(
        &self,
        city: &str,
        state: &str,
        details: &[DetailRecord],
    ) -> Result<Vec<SpeciesRecord>> {
        let mut seen = HashSet::new();
        let mut drafts = Vec::with_capacity(details.len());
        let mut reused = 0usize;

        for detail in details {
            if !seen.insert(detail.external_id.as_str()) {
                tracing::debug!(external_id = %detail.external_id, "Duplicate external id in one search, skipped");
                continue;
            }
            let (draft, cloned) = self.prepare_draft(city, state, detail).await?;
            if cloned {
                reused += 1;
            }
            drafts.push(draft);
        }

        let expected = drafts.len();
        let inserted = self.store.insert_batch(drafts).await?;

        tracing::info!(
            city,
            state,
            inserted = inserted.len(),
            cloned = reused,
            "Species resolved"
        );

        if inserted.len() < expected {
            // A concurrent search for the same location got there first
            return self.store.find_by_location(city, state).await;
        }

        Ok(inserted)
    }

    fn habitat_description(&self, detail: &DetailRecord, state: &str) -> String {
        let text = detail
            .description
            .as_deref()
            .map(clean_description)
            .filter(|d| !d.is_empty())
            .unwrap_or_else(|| habitat_template(&detail.common_name, state));

        truncate_description(&text, self.description_max_chars)
    }
}
