//! Configuration management using the prefer crate for discovery.

use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::llm::LlmConfig;
use crate::upstream::UpstreamConfig;

/// Default database filename.
pub const DEFAULT_DATABASE: &str = "alpaca.db";

/// City processed when none are configured.
pub const DEFAULT_CITY_CODE: &str = "AUS";

/// Pacing and pool sizes for the pipeline stages.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ThrottleConfig {
    /// Sleep between catalog page requests.
    #[serde(default = "default_catalog_page_delay_ms")]
    pub catalog_page_delay_ms: u64,
    /// Sleep a detail worker takes after each call before releasing its slot.
    #[serde(default = "default_detail_delay_ms")]
    pub detail_delay_ms: u64,
    #[serde(default = "default_search_concurrency")]
    pub search_concurrency: usize,
    #[serde(default = "default_ratings_concurrency")]
    pub ratings_concurrency: usize,
    /// Sleep between review sources for one hotel.
    #[serde(default = "default_review_source_delay_ms")]
    pub review_source_delay_ms: u64,
    /// Most recent review texts sent to the LLM per hotel.
    #[serde(default = "default_max_reviews")]
    pub max_reviews_per_analysis: usize,
    /// Minimum quality and quiet score for a positive verdict.
    #[serde(default = "default_recommend_threshold")]
    pub recommend_threshold: f64,
}

fn default_catalog_page_delay_ms() -> u64 {
    100
}

fn default_detail_delay_ms() -> u64 {
    200
}

fn default_search_concurrency() -> usize {
    5
}

fn default_ratings_concurrency() -> usize {
    1
}

fn default_review_source_delay_ms() -> u64 {
    1000
}

fn default_max_reviews() -> usize {
    50
}

fn default_recommend_threshold() -> f64 {
    0.7
}

impl Default for ThrottleConfig {
    fn default() -> Self {
        Self {
            catalog_page_delay_ms: default_catalog_page_delay_ms(),
            detail_delay_ms: default_detail_delay_ms(),
            search_concurrency: default_search_concurrency(),
            ratings_concurrency: default_ratings_concurrency(),
            review_source_delay_ms: default_review_source_delay_ms(),
            max_reviews_per_analysis: default_max_reviews(),
            recommend_threshold: default_recommend_threshold(),
        }
    }
}

impl ThrottleConfig {
    pub fn catalog_page_delay(&self) -> Duration {
        Duration::from_millis(self.catalog_page_delay_ms)
    }

    pub fn detail_delay(&self) -> Duration {
        Duration::from_millis(self.detail_delay_ms)
    }

    pub fn review_source_delay(&self) -> Duration {
        Duration::from_millis(self.review_source_delay_ms)
    }

    /// Pool sizes below one would stall the stage.
    pub fn search_concurrency(&self) -> usize {
        self.search_concurrency.max(1)
    }

    pub fn ratings_concurrency(&self) -> usize {
        self.ratings_concurrency.max(1)
    }

    pub fn is_default(&self) -> bool {
        *self == Self::default()
    }
}

/// Configuration file structure.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Database path; `SQLITE_DB_PATH` when unset.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub database: Option<String>,
    /// Cities whose catalog is ingested.
    #[serde(default = "default_city_codes")]
    pub city_codes: Vec<String>,
    /// Hotels the ratings stage covers; every catalog hotel when empty.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub ratings_hotel_ids: Vec<String>,
    #[serde(default)]
    pub upstream: UpstreamConfig,
    #[serde(default)]
    pub llm: LlmConfig,
    #[serde(default, skip_serializing_if = "ThrottleConfig::is_default")]
    pub throttle: ThrottleConfig,
    /// Path to the config file this was loaded from (not serialized).
    #[serde(skip)]
    pub source_path: Option<PathBuf>,
}

fn default_city_codes() -> Vec<String> {
    vec![DEFAULT_CITY_CODE.to_string()]
}

impl Default for Config {
    fn default() -> Self {
        Self {
            database: None,
            city_codes: default_city_codes(),
            ratings_hotel_ids: Vec::new(),
            upstream: UpstreamConfig::default(),
            llm: LlmConfig::default(),
            throttle: ThrottleConfig::default(),
            source_path: None,
        }
    }
}

impl Config {
    /// Load configuration using prefer for file discovery.
    /// Falls back to defaults (with env overrides) when no file is found.
    pub async fn load() -> Self {
        match prefer::load("alpaca").await {
            Ok(pref_config) => match pref_config.source_path() {
                Some(path) => Self::load_from_path(path).await.unwrap_or_else(|e| {
                    tracing::warn!("Ignoring config {}: {}", path.display(), e);
                    Self::default()
                }),
                None => Self::default(),
            },
            Err(_) => Self::default(),
        }
    }

    /// Load configuration from a specific file path.
    /// TOML, YAML, or JSON chosen by file extension.
    pub async fn load_from_path(path: &Path) -> Result<Self, String> {
        let contents = tokio::fs::read_to_string(path)
            .await
            .map_err(|e| format!("Failed to read config file: {}", e))?;

        let ext = path.extension().and_then(|e| e.to_str()).unwrap_or("json");

        let mut config: Config = match ext {
            "toml" => toml::from_str(&contents)
                .map_err(|e| format!("Failed to parse TOML config: {}", e))?,
            "yaml" | "yml" => serde_yaml::from_str(&contents)
                .map_err(|e| format!("Failed to parse YAML config: {}", e))?,
            _ => serde_json::from_str(&contents)
                .map_err(|e| format!("Failed to parse JSON config: {}", e))?,
        };

        config.source_path = Some(path.to_path_buf());
        // Environment wins over file values.
        config.upstream = config.upstream.with_env_overrides();
        config.llm = config.llm.with_env_overrides();
        Ok(config)
    }

    /// Directory relative paths are resolved against.
    pub fn base_dir(&self) -> PathBuf {
        self.source_path
            .as_ref()
            .and_then(|p| p.parent().map(|p| p.to_path_buf()))
            .unwrap_or_else(|| PathBuf::from("."))
    }

    /// Expand `~` and resolve relative paths against `base_dir`.
    pub fn resolve_path(&self, path_str: &str, base_dir: &Path) -> PathBuf {
        let expanded = shellexpand::tilde(path_str);
        let path = Path::new(expanded.as_ref());

        if path.is_absolute() {
            path.to_path_buf()
        } else {
            base_dir.join(path)
        }
    }

    /// Effective database path: config file, then `SQLITE_DB_PATH`, then the default.
    pub fn database_path(&self) -> PathBuf {
        let raw = self
            .database
            .clone()
            .or_else(|| std::env::var("SQLITE_DB_PATH").ok())
            .unwrap_or_else(|| DEFAULT_DATABASE.to_string());
        self.resolve_path(&raw, &self.base_dir())
    }
}
