//! Feature extraction for SiteGen.
//!
//! This crate provides:
//! - [`document`]: the [`ParsedDocument`]/[`DocumentNode`] capability traits
//!   and their `scraper` backend
//! - [`features`]: structural and lexical [`FeatureRecord`] extraction
//! - [`record`]: corpus [`SiteRecord`] extraction from scraped pages

pub mod document;
pub mod features;
pub mod record;

use scraper::Html;

use sitegen_shared::{ExtractionConfig, FeatureRecord, Result};

pub use document::{DocumentNode, ParsedDocument, collapse_whitespace};
pub use features::{PageRegions, extract_lexical, extract_structural, locate_regions};
pub use record::{
    Guess, SITE_TYPE_KEYWORDS, classify_site_type, detect_style, extract_site_record,
    observe_components,
};

/// Raw input handed to the synthesis pipeline.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RawInput {
    /// A free-text description of the desired site.
    Text(String),
    /// An existing page to clone.
    Html(String),
}

impl RawInput {
    pub fn kind(&self) -> &'static str {
        match self {
            RawInput::Text(_) => "text",
            RawInput::Html(_) => "html",
        }
    }
}

/// Extract a feature record from either input form.
pub fn extract(input: &RawInput, config: &ExtractionConfig) -> Result<FeatureRecord> {
    match input {
        RawInput::Text(text) => extract_lexical(text),
        RawInput::Html(html) => {
            let doc = Html::parse_document(html);
            extract_structural(&doc, config)
        }
    }
}

/// The text the renderer shows as the page's headline copy.
///
/// For HTML this is the `<title>`, then the first `<h1>`, then empty.
pub fn source_text(input: &RawInput) -> String {
    match input {
        RawInput::Text(text) => collapse_whitespace(text),
        RawInput::Html(html) => {
            let doc = Html::parse_document(html);
            doc.title()
                .or_else(|| {
                    doc.first_by_tag(&["h1"])
                        .map(|h1| h1.visible_text())
                        .filter(|t| !t.is_empty())
                })
                .unwrap_or_default()
        }
    }
}
