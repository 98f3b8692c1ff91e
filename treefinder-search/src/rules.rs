//! Classification tables
//!
//! Keyword, family, genus and blocklist tables are data, not code: they ship
//! as `rules/tree_rules.toml`, are parsed once at start-up into lowercase
//! lookup sets and are shared read-only for the life of the process.

use serde::Deserialize;
use std::collections::{BTreeSet, HashSet};
use std::path::Path;
use treefinder_common::{Error, Result};

/// Built-in tables compiled into the binary
pub const BUILTIN_RULES: &str = include_str!("../rules/tree_rules.toml");

/// Smallest acceptable invasive blocklist
pub const MIN_BLOCKLIST_ENTRIES: usize = 10;

#[derive(Debug, Deserialize)]
struct RulesFile {
    version: u32,
    #[serde(default)]
    exclusion_keywords: Vec<String>,
    #[serde(default)]
    exception_keywords: Vec<String>,
    #[serde(default)]
    tree_families: Vec<String>,
    #[serde(default)]
    tree_keywords: Vec<String>,
    #[serde(default)]
    tree_genera: Vec<String>,
    #[serde(default)]
    invasive_blocklist: Vec<String>,
}

/// Immutable lookup tables for the classifier and native-status evaluator
#[derive(Debug, Clone)]
pub struct RuleSet {
    version: u32,
    // Substring-matched lists keep a stable iteration order
    exclusion_keywords: BTreeSet<String>,
    exception_keywords: BTreeSet<String>,
    tree_keywords: BTreeSet<String>,
    tree_families: HashSet<String>,
    tree_genera: HashSet<String>,
    invasive_blocklist: HashSet<String>,
}

impl RuleSet {
    /// Tables shipped with the crate
    pub fn builtin() -> Result<Self> {
        Self::from_toml_str(BUILTIN_RULES)
    }

    /// Load an override file, or the built-in tables when no path is given
    pub fn load(path: Option<&Path>) -> Result<Self> {
        match path {
            Some(path) => {
                let content = std::fs::read_to_string(path).map_err(|e| {
                    Error::Config(format!("Read rules file {} failed: {}", path.display(), e))
                })?;
                let rules = Self::from_toml_str(&content)?;
                tracing::info!(
                    path = %path.display(),
                    version = rules.version,
                    "Loaded classification rules"
                );
                Ok(rules)
            }
            None => {
                let rules = Self::builtin()?;
                tracing::info!(version = rules.version, "Using built-in classification rules");
                Ok(rules)
            }
        }
    }

    pub fn from_toml_str(content: &str) -> Result<Self> {
        let file: RulesFile = toml::from_str(content)
            .map_err(|e| Error::Config(format!("Parse rules failed: {}", e)))?;

        // Blocklist entries are canonical names; collapse inner whitespace too
        let invasive_blocklist: HashSet<String> = file
            .invasive_blocklist
            .iter()
            .map(|name| normalize_name(name))
            .filter(|name| !name.is_empty())
            .collect();

        if invasive_blocklist.len() < MIN_BLOCKLIST_ENTRIES {
            return Err(Error::Config(format!(
                "invasive_blocklist needs at least {} distinct entries, found {}",
                MIN_BLOCKLIST_ENTRIES,
                invasive_blocklist.len()
            )));
        }

        Ok(Self {
            version: file.version,
            exclusion_keywords: normalize(file.exclusion_keywords),
            exception_keywords: normalize(file.exception_keywords),
            tree_keywords: normalize(file.tree_keywords),
            tree_families: normalize(file.tree_families),
            tree_genera: normalize(file.tree_genera),
            invasive_blocklist,
        })
    }

    pub fn version(&self) -> u32 {
        self.version
    }

    /// `text` must already be lowercase
    pub fn contains_exclusion_keyword(&self, text: &str) -> bool {
        self.exclusion_keywords.iter().any(|k| text.contains(k.as_str()))
    }

    /// `text` must already be lowercase
    pub fn contains_exception_keyword(&self, text: &str) -> bool {
        self.exception_keywords.iter().any(|k| text.contains(k.as_str()))
    }

    /// `text` must already be lowercase
    pub fn contains_tree_keyword(&self, text: &str) -> bool {
        self.tree_keywords.iter().any(|k| text.contains(k.as_str()))
    }

    pub fn is_tree_family(&self, family: &str) -> bool {
        self.tree_families.contains(&family.trim().to_lowercase())
    }

    pub fn is_tree_genus(&self, genus: &str) -> bool {
        self.tree_genera.contains(&genus.trim().to_lowercase())
    }

    /// `canonical_name` is genus + species
    pub fn is_blocklisted(&self, canonical_name: &str) -> bool {
        self.invasive_blocklist.contains(&normalize_name(canonical_name))
    }

    pub fn blocklist_len(&self) -> usize {
        self.invasive_blocklist.len()
    }
}

fn normalize<C: FromIterator<String>>(values: Vec<String>) -> C {
    values
        .into_iter()
        .map(|v| v.trim().to_lowercase())
        .filter(|v| !v.is_empty())
        .collect()
}

fn normalize_name(name: &str) -> String {
    name.split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
        .to_lowercase()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builtin_rules_parse() {
        let rules = RuleSet::builtin().unwrap();
        assert!(rules.version() >= 1);
        assert!(rules.blocklist_len() >= MIN_BLOCKLIST_ENTRIES);
        assert!(rules.is_tree_family("Fagaceae"));
        assert!(rules.is_tree_genus("quercus"));
        assert!(rules.is_blocklisted("Ailanthus altissima"));
        assert!(rules.is_blocklisted("pyrus   CALLERYANA"));
    }

    #[test]
    fn test_keyword_tables_are_lowercased() {
        let rules = RuleSet::from_toml_str(
            r#"
            version = 1
            tree_keywords = ["  OAK "]
            invasive_blocklist = ["A a", "B b", "C c", "D d", "E e", "F f", "G g", "H h", "I i", "J j"]
            "#,
        )
        .unwrap();

        assert!(rules.contains_tree_keyword("bur oak"));
        assert!(!rules.contains_exclusion_keyword("bur oak"));
    }

    #[test]
    fn test_short_blocklist_rejected() {
        let err = RuleSet::from_toml_str(
            r#"
            version = 1
            invasive_blocklist = ["Ailanthus altissima"]
            "#,
        )
        .unwrap_err();

        assert!(matches!(err, Error::Config(_)));
    }

    #[test]
    fn test_blocklist_counts_distinct_names() {
        let err = RuleSet::from_toml_str(
            r#"
            version = 1
            invasive_blocklist = [
                "Ailanthus altissima", "Ailanthus altissima", "ailanthus  altissima",
                "", " ", "", "", "", "", "",
            ]
            "#,
        )
        .unwrap_err();

        assert!(matches!(err, Error::Config(_)));
    }

    #[test]
    fn test_missing_override_file_is_config_error() {
        let err = RuleSet::load(Some(Path::new("/nonexistent/rules.toml"))).unwrap_err();
        assert!(matches!(err, Error::Config(_)));
    }
}
