//! Configuration loading and data folder resolution

use crate::{Error, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::{info, warn};

/// Environment variable naming an explicit config file
pub const CONFIG_ENV_VAR: &str = "TREEFINDER_CONFIG";

/// Environment variable naming the data folder (holds treefinder.db)
pub const DATA_DIR_ENV_VAR: &str = "TREEFINDER_DATA_DIR";

/// Database file created inside the data folder
pub const DATABASE_FILE_NAME: &str = "treefinder.db";

pub const MIN_BATCH_SIZE: usize = 3;
pub const MAX_BATCH_SIZE: usize = 5;
pub const MIN_BATCH_DELAY_MS: u64 = 100;
pub const MAX_BATCH_DELAY_MS: u64 = 200;

/// Full TOML configuration file
///
/// Every section is optional; absent keys take compiled defaults.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TomlConfig {
    pub server: ServerConfig,
    pub database: DatabaseConfig,
    pub logging: LoggingConfig,
    pub pipeline: PipelineConfig,
    pub occurrence: OccurrenceConfig,
    pub sources: SourcesConfig,
    pub rules: RulesConfig,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    /// Socket address the HTTP surface binds to
    pub bind: String,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind: "127.0.0.1:5740".to_string(),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DatabaseConfig {
    /// Data folder override (the database file lives inside it)
    pub path: Option<PathBuf>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// EnvFilter directive, e.g. "info" or "treefinder_search=debug"
    pub level: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
        }
    }
}

/// How the native-status decision treats establishment-means labels
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NativeMode {
    /// Per-taxon vote across every occurrence; unlabelled records get the benefit of the doubt
    #[default]
    MajorityVote,
    /// Any occurrence not explicitly labelled NATIVE is discarded before aggregation
    StrictPerOccurrence,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PipelineConfig {
    /// Maximum species returned per location
    pub result_limit: usize,
    /// Detail lookups run concurrently within one batch
    pub enrichment_batch_size: usize,
    /// Pause inserted between enrichment batches
    pub batch_delay_ms: u64,
    pub native_mode: NativeMode,
    /// Stored habitat text is cut to this many characters (plus "...")
    pub description_max_chars: usize,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            result_limit: 15,
            enrichment_batch_size: 4,
            batch_delay_ms: 150,
            native_mode: NativeMode::MajorityVote,
            description_max_chars: 300,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct OccurrenceConfig {
    /// Radius around the geocoded point searched for occurrences
    pub search_radius_km: u32,
    /// Records requested per occurrence-search page
    pub page_size: usize,
    /// Upper bound on records fetched per search
    pub max_records: usize,
}

impl Default for OccurrenceConfig {
    fn default() -> Self {
        Self {
            search_radius_km: 25,
            page_size: 300,
            max_records: 900,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SourcesConfig {
    pub gbif_base_url: String,
    pub nominatim_base_url: String,
    pub user_agent: String,
    pub timeout_secs: u64,
    /// Ceiling on detail-source requests per second
    pub requests_per_second: u32,
}

impl Default for SourcesConfig {
    fn default() -> Self {
        Self {
            gbif_base_url: "https://api.gbif.org/v1".to_string(),
            nominatim_base_url: "https://nominatim.openstreetmap.org".to_string(),
            user_agent: format!("treefinder/{}", env!("CARGO_PKG_VERSION")),
            timeout_secs: 30,
            requests_per_second: 10,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RulesConfig {
    /// Replacement for the built-in classification tables
    pub path: Option<PathBuf>,
}

impl TomlConfig {
    /// Clamp tunables into their supported ranges, warning on every adjustment
    pub fn normalized(mut self) -> Self {
        let pipeline = &mut self.pipeline;

        let batch = pipeline
            .enrichment_batch_size
            .clamp(MIN_BATCH_SIZE, MAX_BATCH_SIZE);
        if batch != pipeline.enrichment_batch_size {
            warn!(
                configured = pipeline.enrichment_batch_size,
                effective = batch,
                "enrichment_batch_size out of range, clamped"
            );
            pipeline.enrichment_batch_size = batch;
        }

        let delay = pipeline
            .batch_delay_ms
            .clamp(MIN_BATCH_DELAY_MS, MAX_BATCH_DELAY_MS);
        if delay != pipeline.batch_delay_ms {
            warn!(
                configured = pipeline.batch_delay_ms,
                effective = delay,
                "batch_delay_ms out of range, clamped"
            );
            pipeline.batch_delay_ms = delay;
        }

        if pipeline.result_limit == 0 {
            warn!("result_limit of 0 would discard every species, using 15");
            pipeline.result_limit = 15;
        }

        if pipeline.description_max_chars == 0 {
            let fallback = PipelineConfig::default().description_max_chars;
            warn!(
                effective = fallback,
                "description_max_chars of 0 would blank every description, using default"
            );
            pipeline.description_max_chars = fallback;
        }

        if self.occurrence.page_size == 0 {
            self.occurrence.page_size = OccurrenceConfig::default().page_size;
        }

        if self.sources.requests_per_second == 0 {
            self.sources.requests_per_second = SourcesConfig::default().requests_per_second;
        }

        self
    }
}

/// Config file resolution, highest priority first:
/// 1. Command-line argument
/// 2. `TREEFINDER_CONFIG` environment variable
/// 3. `~/.config/treefinder/config.toml`
/// 4. `/etc/treefinder/config.toml`
///
/// Returns `None` when nothing is configured and no default file exists.
pub fn resolve_config_path(cli_arg: Option<&Path>) -> Option<PathBuf> {
    if let Some(path) = cli_arg {
        return Some(path.to_path_buf());
    }

    if let Ok(path) = std::env::var(CONFIG_ENV_VAR) {
        if !path.trim().is_empty() {
            return Some(PathBuf::from(path));
        }
    }

    let user_config = dirs::config_dir().map(|d| d.join("treefinder").join("config.toml"));
    if let Some(path) = user_config {
        if path.exists() {
            return Some(path);
        }
    }

    let system_config = PathBuf::from("/etc/treefinder/config.toml");
    if system_config.exists() {
        return Some(system_config);
    }

    None
}

/// Load the TOML config
///
/// A missing file is not fatal: warn and fall back to defaults.
/// A file that exists but does not parse is a configuration error.
pub fn load_toml_config(path: Option<&Path>) -> Result<TomlConfig> {
    let Some(path) = path else {
        info!("No config file found, using compiled defaults");
        return Ok(TomlConfig::default());
    };

    if !path.exists() {
        warn!(path = %path.display(), "Config file not found, using compiled defaults");
        return Ok(TomlConfig::default());
    }

    let content = std::fs::read_to_string(path)?;
    let config = parse_toml_config(&content)
        .map_err(|e| Error::Config(format!("{}: {}", path.display(), e)))?;

    info!(path = %path.display(), "Loaded config file");
    Ok(config)
}

/// Parse config text and clamp tunables
pub fn parse_toml_config(content: &str) -> Result<TomlConfig> {
    let config: TomlConfig =
        toml::from_str(content).map_err(|e| Error::Config(format!("Parse TOML failed: {}", e)))?;
    Ok(config.normalized())
}

/// Data folder resolution, highest priority first:
/// 1. Command-line argument
/// 2. `TREEFINDER_DATA_DIR` environment variable
/// 3. `[database] path` from the TOML config
/// 4. OS-dependent default
pub fn resolve_data_dir(cli_arg: Option<&Path>, config: &TomlConfig) -> PathBuf {
    if let Some(path) = cli_arg {
        return path.to_path_buf();
    }

    if let Ok(path) = std::env::var(DATA_DIR_ENV_VAR) {
        if !path.trim().is_empty() {
            return PathBuf::from(path);
        }
    }

    if let Some(path) = &config.database.path {
        return path.clone();
    }

    default_data_dir()
}

/// OS-dependent default data folder
pub fn default_data_dir() -> PathBuf {
    // ~/.local/share/treefinder, ~/Library/Application Support/treefinder, %LOCALAPPDATA%\treefinder
    dirs::data_local_dir()
        .map(|d| d.join("treefinder"))
        .unwrap_or_else(|| PathBuf::from("./treefinder_data"))
}

/// Create the data folder if missing and return the database file path
pub fn ensure_data_dir(data_dir: &Path) -> Result<PathBuf> {
    if !data_dir.exists() {
        std::fs::create_dir_all(data_dir)?;
        info!(path = %data_dir.display(), "Created data folder");
    }
    Ok(data_dir.join(DATABASE_FILE_NAME))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = TomlConfig::default();
        assert_eq!(config.pipeline.result_limit, 15);
        assert_eq!(config.pipeline.enrichment_batch_size, 4);
        assert_eq!(config.pipeline.batch_delay_ms, 150);
        assert_eq!(config.pipeline.native_mode, NativeMode::MajorityVote);
        assert_eq!(config.pipeline.description_max_chars, 300);
        assert_eq!(config.logging.level, "info");
        assert!(config.rules.path.is_none());
    }

    #[test]
    fn test_partial_file_keeps_other_defaults() {
        let config = parse_toml_config(
            r#"
            [pipeline]
            result_limit = 10
            native_mode = "strict_per_occurrence"
            "#,
        )
        .unwrap();

        assert_eq!(config.pipeline.result_limit, 10);
        assert_eq!(config.pipeline.native_mode, NativeMode::StrictPerOccurrence);
        assert_eq!(config.pipeline.enrichment_batch_size, 4);
        assert_eq!(config.occurrence, OccurrenceConfig::default());
    }

    #[test]
    fn test_out_of_range_tunables_are_clamped() {
        let config = parse_toml_config(
            r#"
            [pipeline]
            enrichment_batch_size = 50
            batch_delay_ms = 5
            "#,
        )
        .unwrap();

        assert_eq!(config.pipeline.enrichment_batch_size, MAX_BATCH_SIZE);
        assert_eq!(config.pipeline.batch_delay_ms, MIN_BATCH_DELAY_MS);
    }

    #[test]
    fn test_zero_description_length_falls_back_to_default() {
        let config = parse_toml_config(
            r#"
            [pipeline]
            description_max_chars = 0
            "#,
        )
        .unwrap();

        assert_eq!(config.pipeline.description_max_chars, 300);
    }

    #[test]
    fn test_invalid_toml_is_config_error() {
        let err = parse_toml_config("[pipeline\nresult_limit = ").unwrap_err();
        assert!(matches!(err, Error::Config(_)));
    }

    #[test]
    fn test_unknown_native_mode_rejected() {
        let err = parse_toml_config("[pipeline]\nnative_mode = \"coin_flip\"").unwrap_err();
        assert!(matches!(err, Error::Config(_)));
    }
}
