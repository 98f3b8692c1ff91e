//! Tree classification
//!
//! Decides whether a taxon is likely a tree from its scientific name, family
//! and vernacular name. First matching rule wins:
//! 1. vernacular name has an exclusion keyword and no exception keyword → not a tree
//! 2. family is a tree family → tree
//! 3. vernacular name has a tree keyword → tree
//! 4. genus is a tree genus → tree
//! 5. otherwise → not a tree
//!
//! Applied twice per search: on occurrence metadata and again on enriched
//! detail, since the two sources disagree on vernacular names.

use crate::rules::RuleSet;
use std::sync::Arc;

#[derive(Debug, Clone)]
pub struct TaxonClassifier {
    rules: Arc<RuleSet>,
}

impl TaxonClassifier {
    pub fn new(rules: Arc<RuleSet>) -> Self {
        Self { rules }
    }

    pub fn is_likely_tree(
        &self,
        scientific_name: &str,
        family: Option<&str>,
        vernacular_name: Option<&str>,
    ) -> bool {
        let vernacular = vernacular_name
            .map(|v| v.trim().to_lowercase())
            .filter(|v| !v.is_empty());

        if let Some(name) = &vernacular {
            if self.rules.contains_exclusion_keyword(name)
                && !self.rules.contains_exception_keyword(name)
            {
                return false;
            }
        }

        if let Some(family) = family {
            if self.rules.is_tree_family(family) {
                return true;
            }
        }

        if let Some(name) = &vernacular {
            if self.rules.contains_tree_keyword(name) {
                return true;
            }
        }

        genus_of(scientific_name)
            .map(|genus| self.rules.is_tree_genus(genus))
            .unwrap_or(false)
    }
}

/// First whitespace-delimited token of a scientific name
pub fn genus_of(scientific_name: &str) -> Option<&str> {
    scientific_name.split_whitespace().next()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn classifier() -> TaxonClassifier {
        TaxonClassifier::new(Arc::new(RuleSet::builtin().unwrap()))
    }

    #[test]
    fn test_black_cherry_is_tree() {
        let c = classifier();
        assert!(c.is_likely_tree("Prunus serotina", None, Some("Black Cherry")));
        // Keyword alone is enough, whatever the genus
        assert!(c.is_likely_tree("Unknownia example", None, Some("Black Cherry")));
    }

    #[test]
    fn test_himalayan_blackberry_is_not_tree() {
        let c = classifier();
        assert!(!c.is_likely_tree("Rubus armeniacus", Some("Rosaceae"), Some("Himalayan Blackberry")));
    }

    #[test]
    fn test_exclusion_beats_tree_family() {
        // Salicaceae is a tree family, but a shrub name wins
        let c = classifier();
        assert!(!c.is_likely_tree("Salix humilis", Some("Salicaceae"), Some("Prairie Willow Shrub")));
    }

    #[test]
    fn test_exception_keyword_lets_rules_continue() {
        let c = classifier();
        assert!(c.is_likely_tree("Celtis occidentalis", Some("Cannabaceae"), Some("Common Hackberry")));
        assert!(c.is_likely_tree("Amelanchier arborea", Some("Rosaceae"), Some("Downy Serviceberry")));
    }

    #[test]
    fn test_tree_family_without_vernacular() {
        let c = classifier();
        assert!(c.is_likely_tree("Abies balsamea", Some("Pinaceae"), None));
        assert!(c.is_likely_tree("Abies balsamea", Some("PINACEAE"), None));
    }

    #[test]
    fn test_tree_keyword_in_vernacular() {
        let c = classifier();
        assert!(c.is_likely_tree("Nonsensica obscura", Some("Oleaceae"), Some("Green Ash")));
    }

    #[test]
    fn test_genus_whitelist_fallback() {
        let c = classifier();
        assert!(c.is_likely_tree("Quercus virginiana Mill.", None, None));
        assert!(c.is_likely_tree("Crataegus mollis", Some("Rosaceae"), Some("Downy Haw")));
    }

    #[test]
    fn test_nothing_matches() {
        let c = classifier();
        assert!(!c.is_likely_tree("Solidago canadensis", Some("Asteraceae"), None));
        assert!(!c.is_likely_tree("", None, None));
        assert!(!c.is_likely_tree("Taraxacum officinale", Some("Asteraceae"), Some("   ")));
    }

    #[test]
    fn test_exclusion_applies_even_for_tree_family() {
        let c = classifier();
        assert!(!c.is_likely_tree("Magnolia stellata", Some("Magnoliaceae"), Some("Star flower")));
        // "bush" is excluded, but "cherry" rescues it
        assert!(c.is_likely_tree("Prunus pumila", Some("Rosaceae"), Some("Sand Cherry Bush")));
    }

    #[test]
    fn test_genus_of() {
        assert_eq!(genus_of("Quercus alba L."), Some("Quercus"));
        assert_eq!(genus_of("  Acer  "), Some("Acer"));
        assert_eq!(genus_of(""), None);
    }
}
