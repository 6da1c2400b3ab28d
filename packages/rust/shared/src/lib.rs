//! Shared types, error model, and configuration for SiteGen.
//!
//! This crate is the foundation depended on by all other SiteGen crates.
//! It provides:
//! - [`SiteGenError`]: the unified error type
//! - Domain types ([`FeatureRecord`], [`ClassificationResult`], [`WebsiteDsl`], [`SiteRecord`])
//! - Configuration ([`AppConfig`], [`ClassifierConfig`], [`ExtractionConfig`], config loading)

pub mod config;
pub mod error;
pub mod types;

// Re-export public API at crate root for ergonomic imports.
pub use config::{
    AppConfig, ClassifierConfig, ClassifierSection, ClassifierStrategy, DEFAULT_SITE_TYPE,
    DEFAULT_STYLE, DefaultsConfig, ExtractionConfig, ExtractionSection, FetchConfig, FetchSection,
    config_dir, config_file_path, expand_home, init_config, load_config, load_config_from,
};
pub use error::{Result, SiteGenError};
pub use types::{
    CURRENT_SCHEMA_VERSION, ClassificationResult, ComponentObservation, CustomKind, FEATURE_NAMES,
    FeatureFlags, FeatureRecord, SectionDescriptor, SectionKind, SiteRecord, WebsiteDsl,
    clamp_unit,
};
