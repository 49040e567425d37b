//! Configuration resolution for the search front-end.
//!
//! Every key is looked up in the runtime override mapping first (injected
//! into containers at start-up as a TOML file), then in the process
//! environment, then falls back to a hardcoded default. Resolution never
//! fails; only loading the override file can.
//!
//! The generative model key is read from the environment only and is never
//! taken from the override mapping.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use sift_search::SearchConfig;

use crate::error::{Result, SiftError};

/// Backend base URL.
pub const KEY_HOST: &str = "MEILISEARCH_HOST";
/// Backend bearer token.
pub const KEY_API_KEY: &str = "MEILISEARCH_API_KEY";
/// Index name.
pub const KEY_INDEX: &str = "MEILISEARCH_INDEX";
/// Hybrid weighting, parsed as a float.
pub const KEY_SEMANTIC_RATIO: &str = "MEILISEARCH_SEMANTIC_RATIO";
/// Embedder name.
pub const KEY_EMBEDDER: &str = "MEILISEARCH_EMBEDDER";
/// Title shown in the header.
pub const KEY_APP_TITLE: &str = "APP_TITLE";
/// Optional logo URL or path.
pub const KEY_APP_LOGO: &str = "APP_LOGO";
/// Generative model API key (environment only).
pub const KEY_GEMINI_API_KEY: &str = "GEMINI_API_KEY";
/// Location of the runtime override file.
pub const KEY_RUNTIME_CONFIG: &str = "SIFT_RUNTIME_CONFIG";

/// Prefix of the legacy key names (`VITE_MEILISEARCH_HOST`, ...), still
/// accepted for every key resolved through [`ConfigSources::lookup`].
pub const LEGACY_KEY_PREFIX: &str = "VITE_";

pub const DEFAULT_HOST: &str = "http://localhost:7700";
pub const DEFAULT_INDEX: &str = "movies";
pub const DEFAULT_APP_TITLE: &str = "Hybrid Search";
pub const DEFAULT_SEMANTIC_RATIO: f64 = 0.5;
pub const DEFAULT_EMBEDDER: &str = "default";

/// The layered key/value sources configuration is resolved from.
#[derive(Debug, Clone, Default)]
pub struct ConfigSources {
    /// Runtime-injected overrides. Highest priority.
    pub overrides: BTreeMap<String, String>,
    /// Environment captured at start-up.
    pub environment: BTreeMap<String, String>,
}

impl ConfigSources {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a runtime override.
    pub fn with_override(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.overrides.insert(key.into(), value.into());
        self
    }

    /// Add an environment value.
    pub fn with_env(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.environment.insert(key.into(), value.into());
        self
    }

    /// Capture the process environment and load the override file.
    ///
    /// The override file is `runtime_config` if given, else the path in
    /// `SIFT_RUNTIME_CONFIG`. A file that does not exist means no overrides.
    ///
    /// # Errors
    ///
    /// Returns [`SiftError::Config`] if the file exists but is not a TOML
    /// table, or [`SiftError::Io`] if it cannot be read.
    pub fn from_process(runtime_config: Option<&Path>) -> Result<Self> {
        let environment: BTreeMap<String, String> = std::env::vars().collect();

        let path = runtime_config
            .map(Path::to_path_buf)
            .or_else(|| non_empty(environment.get(KEY_RUNTIME_CONFIG)).map(PathBuf::from));

        let overrides = match path {
            Some(path) => load_overrides(&path)?,
            None => BTreeMap::new(),
        };

        Ok(Self {
            overrides,
            environment,
        })
    }

    /// Override, then environment. Empty values count as absent.
    ///
    /// Within each layer the plain key wins over its `VITE_`-prefixed
    /// legacy name.
    pub fn lookup(&self, key: &str) -> Option<&str> {
        let legacy = format!("{LEGACY_KEY_PREFIX}{key}");
        [&self.overrides, &self.environment]
            .into_iter()
            .find_map(|layer| non_empty(layer.get(key)).or_else(|| non_empty(layer.get(&legacy))))
    }

    /// Environment only, for secrets that must not come from the override file.
    pub fn env_only(&self, key: &str) -> Option<&str> {
        non_empty(self.environment.get(key))
    }
}

fn non_empty(value: Option<&String>) -> Option<&str> {
    value.map(String::as_str).filter(|v| !v.is_empty())
}

/// Load a runtime override file: a flat TOML table of scalar values.
///
/// Numbers and booleans are kept as their textual form so that
/// `MEILISEARCH_SEMANTIC_RATIO = 0.7` and `= "0.7"` behave the same.
/// Nested tables and arrays are skipped with a warning.
///
/// # Errors
///
/// Returns [`SiftError::Config`] if the file is not valid TOML.
pub fn load_overrides(path: &Path) -> Result<BTreeMap<String, String>> {
    let content = match std::fs::read_to_string(path) {
        Ok(content) => content,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
            tracing::debug!(path = %path.display(), "no runtime override file");
            return Ok(BTreeMap::new());
        }
        Err(e) => return Err(e.into()),
    };

    let table: toml::Table = toml::from_str(&content)
        .map_err(|e| SiftError::Config(format!("{}: {e}", path.display())))?;

    let mut overrides = BTreeMap::new();
    for (key, value) in table {
        let text = match value {
            toml::Value::String(s) => s,
            toml::Value::Integer(i) => i.to_string(),
            toml::Value::Float(f) => f.to_string(),
            toml::Value::Boolean(b) => b.to_string(),
            other => {
                tracing::warn!(key = %key, kind = other.type_str(), "ignoring non-scalar override");
                continue;
            }
        };
        overrides.insert(key, text);
    }

    tracing::debug!(path = %path.display(), keys = overrides.len(), "loaded runtime overrides");
    Ok(overrides)
}

/// Parse the semantic ratio. Absent, unparsable or non-finite values give
/// `0.5`.
///
/// The value is not clamped: validity is the search backend's concern.
pub fn parse_ratio(raw: Option<&str>) -> f64 {
    raw.and_then(|v| v.trim().parse::<f64>().ok())
        .filter(|v| v.is_finite())
        .unwrap_or(DEFAULT_SEMANTIC_RATIO)
}

/// Resolved application configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AppConfig {
    pub host: String,
    pub api_key: String,
    pub index_name: String,
    pub app_title: String,
    pub app_logo: Option<String>,
    pub semantic_ratio: f64,
    pub embedder: String,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self::resolve(&ConfigSources::default())
    }
}

impl AppConfig {
    /// Resolve every key. Never fails; missing keys take their defaults.
    pub fn resolve(sources: &ConfigSources) -> Self {
        let get = |key: &str, default: &str| sources.lookup(key).unwrap_or(default).to_owned();

        Self {
            host: get(KEY_HOST, DEFAULT_HOST),
            api_key: get(KEY_API_KEY, ""),
            index_name: get(KEY_INDEX, DEFAULT_INDEX),
            app_title: get(KEY_APP_TITLE, DEFAULT_APP_TITLE),
            app_logo: sources.lookup(KEY_APP_LOGO).map(str::to_owned),
            semantic_ratio: parse_ratio(sources.lookup(KEY_SEMANTIC_RATIO)),
            embedder: get(KEY_EMBEDDER, DEFAULT_EMBEDDER),
        }
    }

    /// Project into the search client's configuration.
    pub fn search_config(&self) -> SearchConfig {
        SearchConfig {
            host: self.host.clone(),
            api_key: self.api_key.clone(),
            index: self.index_name.clone(),
            semantic_ratio: self.semantic_ratio,
            embedder: self.embedder.clone(),
            ..SearchConfig::default()
        }
    }
}

/// Generative summary settings.
#[derive(Debug, Clone)]
pub struct SummaryConfig {
    /// API key. Summaries are disabled without one.
    pub api_key: Option<String>,
    /// Provider base URL.
    pub base_url: String,
    /// Model identifier.
    pub model: String,
    /// Seconds allowed to establish the connection.
    pub connect_timeout_secs: u64,
    /// Seconds allowed between two stream chunks.
    pub idle_timeout_secs: u64,
    /// Explicit switch, e.g. `--no-summary`.
    pub enabled: bool,
}

impl Default for SummaryConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            base_url: crate::summary::gemini::DEFAULT_BASE_URL.into(),
            model: crate::summary::MODEL_NAME.into(),
            connect_timeout_secs: 10,
            idle_timeout_secs: 30,
            enabled: true,
        }
    }
}

impl SummaryConfig {
    /// Build from the environment layer only.
    pub fn from_sources(sources: &ConfigSources) -> Self {
        Self {
            api_key: sources.env_only(KEY_GEMINI_API_KEY).map(str::to_owned),
            ..Self::default()
        }
    }

    /// Whether summaries should be requested at all.
    pub fn is_active(&self) -> bool {
        self.enabled && self.api_key.is_some()
    }
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used, clippy::expect_used, clippy::panic)]

    use super::*;
    use std::io::Write;

    #[test]
    fn defaults_when_nothing_is_set() {
        let config = AppConfig::resolve(&ConfigSources::new());
        assert_eq!(config.host, "http://localhost:7700");
        assert_eq!(config.api_key, "");
        assert_eq!(config.index_name, "movies");
        assert_eq!(config.app_title, "Hybrid Search");
        assert!(config.app_logo.is_none());
        assert!((config.semantic_ratio - 0.5).abs() < f64::EPSILON);
        assert_eq!(config.embedder, "default");
    }

    #[test]
    fn environment_beats_default() {
        let sources = ConfigSources::new()
            .with_env(KEY_HOST, "https://search.example.com")
            .with_env(KEY_INDEX, "docs");
        let config = AppConfig::resolve(&sources);
        assert_eq!(config.host, "https://search.example.com");
        assert_eq!(config.index_name, "docs");
    }

    #[test]
    fn override_beats_environment() {
        let sources = ConfigSources::new()
            .with_env(KEY_HOST, "https://env.example.com")
            .with_override(KEY_HOST, "https://override.example.com");
        let config = AppConfig::resolve(&sources);
        assert_eq!(config.host, "https://override.example.com");
    }

    #[test]
    fn override_missing_key_falls_back_to_environment() {
        let sources = ConfigSources::new()
            .with_env(KEY_EMBEDDER, "openai")
            .with_override(KEY_HOST, "https://override.example.com");
        let config = AppConfig::resolve(&sources);
        assert_eq!(config.embedder, "openai");
    }

    #[test]
    fn legacy_prefixed_keys_are_accepted() {
        let sources = ConfigSources::new()
            .with_env("VITE_MEILISEARCH_HOST", "https://legacy.example.com")
            .with_env("VITE_MEILISEARCH_SEMANTIC_RATIO", "0.9")
            .with_override("VITE_APP_TITLE", "Legacy Title");
        let config = AppConfig::resolve(&sources);
        assert_eq!(config.host, "https://legacy.example.com");
        assert!((config.semantic_ratio - 0.9).abs() < f64::EPSILON);
        assert_eq!(config.app_title, "Legacy Title");
    }

    #[test]
    fn plain_key_beats_legacy_key_within_a_layer() {
        let sources = ConfigSources::new()
            .with_env("VITE_MEILISEARCH_INDEX", "old")
            .with_env(KEY_INDEX, "new")
            .with_override("VITE_MEILISEARCH_EMBEDDER", "runtime")
            .with_env(KEY_EMBEDDER, "env");
        let config = AppConfig::resolve(&sources);
        assert_eq!(config.index_name, "new");
        assert_eq!(config.embedder, "runtime");
    }

    #[test]
    fn empty_values_count_as_absent() {
        let sources = ConfigSources::new()
            .with_override(KEY_INDEX, "")
            .with_env(KEY_INDEX, "")
            .with_env(KEY_APP_LOGO, "");
        let config = AppConfig::resolve(&sources);
        assert_eq!(config.index_name, "movies");
        assert!(config.app_logo.is_none());
    }

    #[test]
    fn ratio_parsing() {
        assert!((parse_ratio(Some("0.8")) - 0.8).abs() < f64::EPSILON);
        assert!((parse_ratio(Some(" 1 ")) - 1.0).abs() < f64::EPSILON);
        assert!((parse_ratio(Some("lots")) - 0.5).abs() < f64::EPSILON);
        assert!((parse_ratio(Some("NaN")) - 0.5).abs() < f64::EPSILON);
        assert!((parse_ratio(Some("inf")) - 0.5).abs() < f64::EPSILON);
        assert!((parse_ratio(Some("-infinity")) - 0.5).abs() < f64::EPSILON);
        assert!((parse_ratio(None) - 0.5).abs() < f64::EPSILON);
    }

    #[test]
    fn ratio_is_not_clamped() {
        assert!((parse_ratio(Some("1.7")) - 1.7).abs() < f64::EPSILON);
        assert!((parse_ratio(Some("-0.2")) + 0.2).abs() < f64::EPSILON);
    }

    #[test]
    fn search_config_projection() {
        let sources = ConfigSources::new()
            .with_env(KEY_SEMANTIC_RATIO, "0.8")
            .with_env(KEY_EMBEDDER, "custom")
            .with_env(KEY_API_KEY, "secret");
        let search = AppConfig::resolve(&sources).search_config();
        assert!((search.semantic_ratio - 0.8).abs() < f64::EPSILON);
        assert_eq!(search.embedder, "custom");
        assert_eq!(search.api_key, "secret");
        assert_eq!(search.limit, 20);
    }

    #[test]
    fn summary_key_ignores_overrides() {
        let sources = ConfigSources::new().with_override(KEY_GEMINI_API_KEY, "from-file");
        let summary = SummaryConfig::from_sources(&sources);
        assert!(summary.api_key.is_none());
        assert!(!summary.is_active());

        let sources = ConfigSources::new().with_env(KEY_GEMINI_API_KEY, "from-env");
        let summary = SummaryConfig::from_sources(&sources);
        assert_eq!(summary.api_key.as_deref(), Some("from-env"));
        assert!(summary.is_active());
    }

    #[test]
    fn disabled_summary_is_inactive() {
        let summary = SummaryConfig {
            api_key: Some("k".into()),
            enabled: false,
            ..Default::default()
        };
        assert!(!summary.is_active());
    }

    #[test]
    fn override_file_is_loaded() {
        let mut file = tempfile::NamedTempFile::new().expect("temp file");
        writeln!(
            file,
            "MEILISEARCH_HOST = \"https://runtime.example.com\"\n\
             MEILISEARCH_SEMANTIC_RATIO = 0.7\n\
             APP_TITLE = \"Film Finder\"\n\
             nested = {{ a = 1 }}"
        )
        .expect("write");

        let overrides = load_overrides(file.path()).expect("load");
        assert_eq!(
            overrides.get(KEY_HOST).map(String::as_str),
            Some("https://runtime.example.com")
        );
        assert_eq!(
            overrides.get(KEY_SEMANTIC_RATIO).map(String::as_str),
            Some("0.7")
        );
        assert!(!overrides.contains_key("nested"));

        let sources = ConfigSources {
            overrides,
            environment: BTreeMap::new(),
        };
        let config = AppConfig::resolve(&sources);
        assert_eq!(config.app_title, "Film Finder");
        assert!((config.semantic_ratio - 0.7).abs() < f64::EPSILON);
    }

    #[test]
    fn missing_override_file_means_no_overrides() {
        let dir = tempfile::tempdir().expect("temp dir");
        let overrides = load_overrides(&dir.path().join("absent.toml")).expect("load");
        assert!(overrides.is_empty());
    }

    #[test]
    fn malformed_override_file_is_a_config_error() {
        let mut file = tempfile::NamedTempFile::new().expect("temp file");
        writeln!(file, "this is = = not toml").expect("write");
        let err = load_overrides(file.path()).unwrap_err();
        assert!(matches!(err, SiftError::Config(_)));
    }
}
