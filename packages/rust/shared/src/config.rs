//! Application configuration for SiteGen.
//!
//! User config lives at `~/.sitegen/sitegen.toml`.
//! CLI flags override config file values, which override defaults.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::{Result, SiteGenError};

/// Default configuration file name.
const CONFIG_FILE_NAME: &str = "sitegen.toml";

/// Default config directory name under the user's home.
const CONFIG_DIR_NAME: &str = ".sitegen";

/// Site type used when classification evidence is insufficient.
pub const DEFAULT_SITE_TYPE: &str = "other";

/// Style used when classification evidence is insufficient.
pub const DEFAULT_STYLE: &str = "minimal_clean";

// ---------------------------------------------------------------------------
// Config structs (matching sitegen.toml schema)
// ---------------------------------------------------------------------------

/// Top-level application config, deserialized from TOML.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AppConfig {
    /// Global defaults.
    #[serde(default)]
    pub defaults: DefaultsConfig,

    /// Classifier strategy and fallback policy.
    #[serde(default)]
    pub classifier: ClassifierSection,

    /// Structural/lexical extraction knobs.
    #[serde(default)]
    pub extraction: ExtractionSection,

    /// HTTP fetch settings for `clone` and `scrape`.
    #[serde(default)]
    pub fetch: FetchSection,
}

/// `[defaults]` section.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DefaultsConfig {
    /// Directory generated sites are written to.
    #[serde(default = "default_output_dir")]
    pub output_dir: String,

    /// Frequency store snapshot produced by `aggregate`.
    #[serde(default = "default_store_path")]
    pub store_path: String,
}

impl Default for DefaultsConfig {
    fn default() -> Self {
        Self {
            output_dir: default_output_dir(),
            store_path: default_store_path(),
        }
    }
}

fn default_output_dir() -> String {
    "./site-out".into()
}
fn default_store_path() -> String {
    "~/.sitegen/store.json".into()
}

/// `[classifier]` section.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClassifierSection {
    /// "frequency" or "trained".
    #[serde(default = "default_strategy")]
    pub strategy: String,

    /// Weights file for the trained strategy.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub model_path: Option<String>,

    /// Below this confidence the trained strategy falls back to the default
    /// site type/style.
    #[serde(default = "default_min_evidence")]
    pub min_evidence: f64,

    /// Fallback threshold for the frequency strategy. Its confidence is a share
    /// of summed similarity, which sits near `1/k` for `k` site types, so it
    /// gets a separate and much lower bar.
    #[serde(default = "default_frequency_min_evidence")]
    pub frequency_min_evidence: f64,

    /// Confidence reported alongside the fallback category.
    #[serde(default = "default_fallback_confidence")]
    pub fallback_confidence: f64,

    #[serde(default = "default_site_type")]
    pub default_site_type: String,

    #[serde(default = "default_style")]
    pub default_style: String,
}

impl Default for ClassifierSection {
    fn default() -> Self {
        Self {
            strategy: default_strategy(),
            model_path: None,
            min_evidence: default_min_evidence(),
            frequency_min_evidence: default_frequency_min_evidence(),
            fallback_confidence: default_fallback_confidence(),
            default_site_type: default_site_type(),
            default_style: default_style(),
        }
    }
}

fn default_strategy() -> String {
    "frequency".into()
}
fn default_min_evidence() -> f64 {
    0.2
}
fn default_frequency_min_evidence() -> f64 {
    0.0
}
fn default_fallback_confidence() -> f64 {
    0.5
}
fn default_site_type() -> String {
    DEFAULT_SITE_TYPE.into()
}
fn default_style() -> String {
    DEFAULT_STYLE.into()
}

/// `[extraction]` section.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExtractionSection {
    /// Hero candidates need strictly more text than this.
    #[serde(default = "default_hero_min_chars")]
    pub hero_min_chars: usize,

    /// Hero candidates need strictly less text than this.
    #[serde(default = "default_hero_max_chars")]
    pub hero_max_chars: usize,

    /// How many leading `section`/`div` elements are scanned for a hero.
    #[serde(default = "default_hero_scan_limit")]
    pub hero_scan_limit: usize,

    /// Class-name fragments marking a features container.
    #[serde(default = "default_feature_keywords")]
    pub feature_keywords: Vec<String>,
}

impl Default for ExtractionSection {
    fn default() -> Self {
        Self {
            hero_min_chars: default_hero_min_chars(),
            hero_max_chars: default_hero_max_chars(),
            hero_scan_limit: default_hero_scan_limit(),
            feature_keywords: default_feature_keywords(),
        }
    }
}

fn default_hero_min_chars() -> usize {
    50
}
fn default_hero_max_chars() -> usize {
    500
}
fn default_hero_scan_limit() -> usize {
    5
}
fn default_feature_keywords() -> Vec<String> {
    vec!["feature".into(), "benefit".into(), "service".into()]
}

/// `[fetch]` section.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FetchSection {
    /// Per-request timeout.
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,

    /// Upper bound on URLs processed by one `scrape` run.
    #[serde(default = "default_max_pages")]
    pub max_pages: usize,
}

impl Default for FetchSection {
    fn default() -> Self {
        Self {
            timeout_secs: default_timeout_secs(),
            max_pages: default_max_pages(),
        }
    }
}

fn default_timeout_secs() -> u64 {
    10
}
fn default_max_pages() -> usize {
    150
}

// ---------------------------------------------------------------------------
// Runtime configs (merged from config + CLI flags)
// ---------------------------------------------------------------------------

/// Which classifier implementation to run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ClassifierStrategy {
    /// Exemplar similarity against the frequency store.
    Frequency,
    /// Externally trained scorer loaded from `model_path`.
    Trained { model_path: PathBuf },
}

/// Runtime classifier configuration.
#[derive(Debug, Clone)]
pub struct ClassifierConfig {
    pub strategy: ClassifierStrategy,
    pub min_evidence: f64,
    pub frequency_min_evidence: f64,
    pub fallback_confidence: f64,
    pub default_site_type: String,
    pub default_style: String,
}

impl Default for ClassifierConfig {
    fn default() -> Self {
        Self {
            strategy: ClassifierStrategy::Frequency,
            min_evidence: default_min_evidence(),
            frequency_min_evidence: default_frequency_min_evidence(),
            fallback_confidence: default_fallback_confidence(),
            default_site_type: default_site_type(),
            default_style: default_style(),
        }
    }
}

impl TryFrom<&AppConfig> for ClassifierConfig {
    type Error = SiteGenError;

    fn try_from(config: &AppConfig) -> Result<Self> {
        let section = &config.classifier;
        let strategy = match section.strategy.as_str() {
            "frequency" => ClassifierStrategy::Frequency,
            "trained" => {
                let path = section.model_path.as_deref().ok_or_else(|| {
                    SiteGenError::config("classifier.strategy = \"trained\" requires model_path")
                })?;
                ClassifierStrategy::Trained {
                    model_path: expand_home(path),
                }
            }
            other => {
                return Err(SiteGenError::config(format!(
                    "unknown classifier strategy '{other}': expected 'frequency' or 'trained'"
                )));
            }
        };

        for (key, value) in [
            ("min_evidence", section.min_evidence),
            ("frequency_min_evidence", section.frequency_min_evidence),
        ] {
            if !(0.0..=1.0).contains(&value) {
                return Err(SiteGenError::config(format!(
                    "classifier.{key} must be within [0, 1], got {value}"
                )));
            }
        }

        Ok(Self {
            strategy,
            min_evidence: section.min_evidence,
            frequency_min_evidence: section.frequency_min_evidence,
            fallback_confidence: section.fallback_confidence.clamp(0.0, 1.0),
            default_site_type: section.default_site_type.clone(),
            default_style: section.default_style.clone(),
        })
    }
}

/// Runtime extraction configuration.
#[derive(Debug, Clone)]
pub struct ExtractionConfig {
    pub hero_min_chars: usize,
    pub hero_max_chars: usize,
    pub hero_scan_limit: usize,
    pub feature_keywords: Vec<String>,
}

impl Default for ExtractionConfig {
    fn default() -> Self {
        Self::from(&AppConfig::default())
    }
}

impl From<&AppConfig> for ExtractionConfig {
    fn from(config: &AppConfig) -> Self {
        Self {
            hero_min_chars: config.extraction.hero_min_chars,
            hero_max_chars: config.extraction.hero_max_chars,
            hero_scan_limit: config.extraction.hero_scan_limit,
            feature_keywords: config
                .extraction
                .feature_keywords
                .iter()
                .map(|k| k.to_lowercase())
                .collect(),
        }
    }
}

/// Runtime fetch configuration.
#[derive(Debug, Clone)]
pub struct FetchConfig {
    pub timeout_secs: u64,
    pub max_pages: usize,
}

impl Default for FetchConfig {
    fn default() -> Self {
        Self::from(&AppConfig::default())
    }
}

impl From<&AppConfig> for FetchConfig {
    fn from(config: &AppConfig) -> Self {
        Self {
            timeout_secs: config.fetch.timeout_secs,
            max_pages: config.fetch.max_pages,
        }
    }
}

// ---------------------------------------------------------------------------
// Config loading
// ---------------------------------------------------------------------------

/// Get the path to the config directory (`~/.sitegen/`).
pub fn config_dir() -> Result<PathBuf> {
    let home = dirs::home_dir()
        .ok_or_else(|| SiteGenError::config("could not determine home directory"))?;
    Ok(home.join(CONFIG_DIR_NAME))
}

/// Get the path to the config file (`~/.sitegen/sitegen.toml`).
pub fn config_file_path() -> Result<PathBuf> {
    Ok(config_dir()?.join(CONFIG_FILE_NAME))
}

/// Load the application config from disk. Returns defaults if the file does not exist.
pub fn load_config() -> Result<AppConfig> {
    let path = config_file_path()?;

    if !path.exists() {
        tracing::debug!(?path, "config file not found, using defaults");
        return Ok(AppConfig::default());
    }

    load_config_from(&path)
}

/// Load the application config from a specific file path.
pub fn load_config_from(path: &Path) -> Result<AppConfig> {
    let content = std::fs::read_to_string(path).map_err(|e| SiteGenError::io(path, e))?;

    toml::from_str(&content)
        .map_err(|e| SiteGenError::config(format!("failed to parse {}: {e}", path.display())))
}

/// Create the config directory and write a default config file.
/// Returns the path to the created file.
pub fn init_config() -> Result<PathBuf> {
    let dir = config_dir()?;
    std::fs::create_dir_all(&dir).map_err(|e| SiteGenError::io(&dir, e))?;

    let path = dir.join(CONFIG_FILE_NAME);
    let config = AppConfig::default();
    let content =
        toml::to_string_pretty(&config).map_err(|e| SiteGenError::config(e.to_string()))?;

    std::fs::write(&path, content).map_err(|e| SiteGenError::io(&path, e))?;
    tracing::info!(?path, "created default config file");

    Ok(path)
}

/// Expand a leading `~/` to the user's home directory.
pub fn expand_home(path: &str) -> PathBuf {
    match path.strip_prefix("~/") {
        Some(rest) => dirs::home_dir()
            .map(|home| home.join(rest))
            .unwrap_or_else(|| PathBuf::from(path)),
        None => PathBuf::from(path),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_serializes() {
        let config = AppConfig::default();
        let toml_str = toml::to_string_pretty(&config).expect("serialize default config");
        assert!(toml_str.contains("store_path"));
        assert!(toml_str.contains("min_evidence"));
        assert!(toml_str.contains("minimal_clean"));
    }

    #[test]
    fn config_roundtrip() {
        let config = AppConfig::default();
        let toml_str = toml::to_string_pretty(&config).expect("serialize");
        let parsed: AppConfig = toml::from_str(&toml_str).expect("deserialize");
        assert_eq!(parsed.classifier.strategy, "frequency");
        assert_eq!(parsed.extraction.hero_scan_limit, 5);
        assert_eq!(parsed.fetch.timeout_secs, 10);
    }

    #[test]
    fn partial_config_fills_defaults() {
        let toml_str = r#"
[classifier]
default_site_type = "corporate"

[extraction]
feature_keywords = ["Feature", "perk"]
"#;
        let config: AppConfig = toml::from_str(toml_str).expect("parse");
        assert_eq!(config.classifier.default_site_type, "corporate");
        assert_eq!(config.classifier.default_style, "minimal_clean");

        let extraction = ExtractionConfig::from(&config);
        assert_eq!(extraction.feature_keywords, vec!["feature", "perk"]);
        assert_eq!(extraction.hero_max_chars, 500);
    }

    #[test]
    fn classifier_config_from_app_config() {
        let app = AppConfig::default();
        let classifier = ClassifierConfig::try_from(&app).expect("valid defaults");
        assert_eq!(classifier.strategy, ClassifierStrategy::Frequency);
        assert_eq!(classifier.min_evidence, 0.2);
        assert_eq!(classifier.frequency_min_evidence, 0.0);
        assert_eq!(classifier.fallback_confidence, 0.5);
    }

    #[test]
    fn trained_strategy_requires_model_path() {
        let mut app = AppConfig::default();
        app.classifier.strategy = "trained".into();
        let err = ClassifierConfig::try_from(&app).unwrap_err();
        assert!(err.to_string().contains("model_path"));

        app.classifier.model_path = Some("/tmp/model.json".into());
        let classifier = ClassifierConfig::try_from(&app).expect("valid");
        assert_eq!(
            classifier.strategy,
            ClassifierStrategy::Trained {
                model_path: PathBuf::from("/tmp/model.json")
            }
        );
    }

    #[test]
    fn unknown_strategy_rejected() {
        let mut app = AppConfig::default();
        app.classifier.strategy = "oracle".into();
        assert!(ClassifierConfig::try_from(&app).is_err());
    }

    #[test]
    fn expand_home_leaves_plain_paths() {
        assert_eq!(expand_home("/var/store.json"), PathBuf::from("/var/store.json"));
    }
}
