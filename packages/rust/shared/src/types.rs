//! Core domain types shared by every SiteGen crate.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::Result;

/// Current schema version for persisted snapshots and output manifests.
pub const CURRENT_SCHEMA_VERSION: u32 = 1;

// ---------------------------------------------------------------------------
// SectionKind
// ---------------------------------------------------------------------------

/// Structural role of a section within a page.
///
/// Kinds the component library does not know survive as [`SectionKind::Other`]
/// so a renderer registry can report them instead of silently losing them.
/// An `Other` never carries a known key, so every kind has exactly one
/// representation.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum SectionKind {
    Navbar,
    Hero,
    Features,
    Footer,
    Pricing,
    Testimonials,
    Contact,
    Other(CustomKind),
}

/// Key of a section kind outside [`SectionKind::KNOWN`].
///
/// Only obtainable through [`SectionKind::parse`].
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct CustomKind(String);

impl CustomKind {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl SectionKind {
    /// Every kind with a built-in meaning, in canonical page order.
    pub const KNOWN: [SectionKind; 7] = [
        SectionKind::Navbar,
        SectionKind::Hero,
        SectionKind::Features,
        SectionKind::Pricing,
        SectionKind::Testimonials,
        SectionKind::Contact,
        SectionKind::Footer,
    ];

    /// Stable string key (used in JSON and in variant rule keys).
    pub fn as_str(&self) -> &str {
        match self {
            Self::Navbar => "navbar",
            Self::Hero => "hero",
            Self::Features => "features",
            Self::Footer => "footer",
            Self::Pricing => "pricing",
            Self::Testimonials => "testimonials",
            Self::Contact => "contact",
            Self::Other(name) => name.as_str(),
        }
    }

    /// Parse a string key. Unknown keys become [`SectionKind::Other`].
    pub fn parse(key: &str) -> Self {
        match key {
            "navbar" => Self::Navbar,
            "hero" => Self::Hero,
            "features" => Self::Features,
            "footer" => Self::Footer,
            "pricing" => Self::Pricing,
            "testimonials" => Self::Testimonials,
            "contact" => Self::Contact,
            other => Self::Other(CustomKind(other.to_string())),
        }
    }
}

impl From<String> for SectionKind {
    fn from(value: String) -> Self {
        Self::parse(&value)
    }
}

impl From<&str> for SectionKind {
    fn from(value: &str) -> Self {
        Self::parse(value)
    }
}

impl From<SectionKind> for String {
    fn from(value: SectionKind) -> Self {
        match value {
            SectionKind::Other(CustomKind(name)) => name,
            known => known.as_str().to_string(),
        }
    }
}

impl fmt::Display for SectionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ---------------------------------------------------------------------------
// FeatureRecord
// ---------------------------------------------------------------------------

/// Boolean presence flags of a [`FeatureRecord`].
///
/// These are the attributes compared by the frequency-similarity classifier.
/// Absent fields deserialize to `false`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(default)]
pub struct FeatureFlags {
    pub has_navbar: bool,
    pub has_hero: bool,
    pub has_features: bool,
    pub has_footer: bool,
    pub has_pricing: bool,
    pub has_testimonials: bool,
    pub has_contact: bool,
}

impl FeatureFlags {
    /// Number of flags.
    pub const LEN: usize = 7;

    /// Flags in schema order.
    pub fn as_array(&self) -> [bool; Self::LEN] {
        [
            self.has_navbar,
            self.has_hero,
            self.has_features,
            self.has_footer,
            self.has_pricing,
            self.has_testimonials,
            self.has_contact,
        ]
    }

    /// Count of flags that agree between `self` and `other`.
    pub fn matching(&self, other: &FeatureFlags) -> u64 {
        self.as_array()
            .iter()
            .zip(other.as_array().iter())
            .filter(|(a, b)| a == b)
            .count() as u64
    }

    /// Derive flags from the section kinds observed on a page.
    pub fn from_kinds<'a>(kinds: impl IntoIterator<Item = &'a SectionKind>) -> Self {
        let mut flags = Self::default();
        for kind in kinds {
            match kind {
                SectionKind::Navbar => flags.has_navbar = true,
                SectionKind::Hero => flags.has_hero = true,
                SectionKind::Features => flags.has_features = true,
                SectionKind::Footer => flags.has_footer = true,
                SectionKind::Pricing => flags.has_pricing = true,
                SectionKind::Testimonials => flags.has_testimonials = true,
                SectionKind::Contact => flags.has_contact = true,
                SectionKind::Other(_) => {}
            }
        }
        flags
    }
}

/// Attribute names in vector order, shared by every extraction strategy and
/// by trained scorers.
pub const FEATURE_NAMES: [&str; 11] = [
    "has_navbar",
    "has_hero",
    "has_features",
    "has_footer",
    "has_pricing",
    "has_testimonials",
    "has_contact",
    "word_count",
    "char_count",
    "link_count",
    "image_count",
];

/// Fixed-shape feature record produced by the extractor.
///
/// Every attribute is always populated; a signal missing from serialized data
/// falls back to `false`/`0`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct FeatureRecord {
    #[serde(flatten)]
    pub flags: FeatureFlags,
    pub word_count: u32,
    pub char_count: u32,
    pub link_count: u32,
    pub image_count: u32,
}

impl FeatureRecord {
    /// Numeric vector in [`FEATURE_NAMES`] order.
    pub fn to_vector(&self) -> Vec<f64> {
        let mut v: Vec<f64> = self
            .flags
            .as_array()
            .iter()
            .map(|&b| if b { 1.0 } else { 0.0 })
            .collect();
        v.push(f64::from(self.word_count));
        v.push(f64::from(self.char_count));
        v.push(f64::from(self.link_count));
        v.push(f64::from(self.image_count));
        v
    }
}

// ---------------------------------------------------------------------------
// ClassificationResult
// ---------------------------------------------------------------------------

/// Categorical guess for a page: site type, visual style and confidence.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClassificationResult {
    pub site_type: String,
    pub style: String,
    /// Always within `[0, 1]`.
    pub confidence: f64,
}

impl ClassificationResult {
    /// Build a result, clamping confidence into `[0, 1]` (NaN becomes 0).
    pub fn new(site_type: impl Into<String>, style: impl Into<String>, confidence: f64) -> Self {
        Self {
            site_type: site_type.into(),
            style: style.into(),
            confidence: clamp_unit(confidence),
        }
    }
}

/// Clamp a score into `[0, 1]`.
pub fn clamp_unit(value: f64) -> f64 {
    if value.is_nan() { 0.0 } else { value.clamp(0.0, 1.0) }
}

// ---------------------------------------------------------------------------
// WebsiteDsl
// ---------------------------------------------------------------------------

/// One section of a [`WebsiteDsl`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SectionDescriptor {
    pub kind: SectionKind,
    /// Index of this descriptor within [`WebsiteDsl::sections`].
    pub position: usize,
    pub variant: String,
}

/// Canonical description of a website, sitting between classification and
/// rendering.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WebsiteDsl {
    pub site_type: String,
    pub style: String,
    pub confidence: f64,
    pub sections: Vec<SectionDescriptor>,
}

impl WebsiteDsl {
    /// Build a DSL from a classification and `(kind, variant)` pairs.
    /// Positions are the iteration index.
    pub fn new(
        classification: &ClassificationResult,
        sections: impl IntoIterator<Item = (SectionKind, String)>,
    ) -> Self {
        let sections = sections
            .into_iter()
            .enumerate()
            .map(|(position, (kind, variant))| SectionDescriptor {
                kind,
                position,
                variant,
            })
            .collect();

        Self {
            site_type: classification.site_type.clone(),
            style: classification.style.clone(),
            confidence: clamp_unit(classification.confidence),
            sections,
        }
    }

    /// Rewrite every `position` to its list index. Returns how many changed.
    pub fn normalize_positions(&mut self) -> usize {
        let mut fixed = 0;
        for (i, section) in self.sections.iter_mut().enumerate() {
            if section.position != i {
                section.position = i;
                fixed += 1;
            }
        }
        fixed
    }

    /// Section kinds in order.
    pub fn kinds(&self) -> impl Iterator<Item = &SectionKind> {
        self.sections.iter().map(|s| &s.kind)
    }

    /// Serialize as pretty JSON.
    pub fn to_json_pretty(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Parse from JSON, re-deriving positions from list order.
    pub fn from_json(json: &str) -> Result<Self> {
        let mut dsl: Self = serde_json::from_str(json)?;
        let fixed = dsl.normalize_positions();
        if fixed > 0 {
            tracing::warn!(fixed, "DSL positions did not match list order, renumbered");
        }
        dsl.confidence = clamp_unit(dsl.confidence);
        Ok(dsl)
    }
}

// ---------------------------------------------------------------------------
// Corpus records
// ---------------------------------------------------------------------------

/// A component observed on a scraped page.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ComponentObservation {
    #[serde(alias = "type")]
    pub kind: SectionKind,
    #[serde(default)]
    pub has_image: bool,
    #[serde(default)]
    pub has_cta: bool,
    /// Direct item count for feature grids, when known.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub num_items: Option<usize>,
    #[serde(default)]
    pub has_links: bool,
    #[serde(default)]
    pub has_logo: bool,
    #[serde(default)]
    pub num_links: usize,
}

impl ComponentObservation {
    /// An observation with no extra signals.
    pub fn bare(kind: SectionKind) -> Self {
        Self {
            kind,
            has_image: false,
            has_cta: false,
            num_items: None,
            has_links: false,
            has_logo: false,
            num_links: 0,
        }
    }
}

/// A previously-extracted site, the unit of input to corpus aggregation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SiteRecord {
    #[serde(default)]
    pub url: String,
    #[serde(default)]
    pub title: String,
    pub site_type: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub site_type_confidence: Option<f64>,
    pub style: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub style_confidence: Option<f64>,
    #[serde(default)]
    pub components: Vec<ComponentObservation>,
}

impl SiteRecord {
    /// Boolean feature flags implied by this record's components.
    pub fn flags(&self) -> FeatureFlags {
        FeatureFlags::from_kinds(self.components.iter().map(|c| &c.kind))
    }

    /// Ordered section kinds, as a layout template.
    pub fn layout(&self) -> Vec<SectionKind> {
        self.components.iter().map(|c| c.kind.clone()).collect()
    }
}
