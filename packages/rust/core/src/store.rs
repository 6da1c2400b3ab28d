//! The frequency store: corpus statistics the classifier and selectors read.
//!
//! Built once (by the aggregator or from a JSON snapshot) and shared as
//! `Arc<FrequencyStore>`. There is no mutation path after construction.

use std::collections::{BTreeMap, HashMap};
use std::path::Path;

use serde::{Deserialize, Serialize};
use tracing::{debug, info, instrument};

use sitegen_shared::{CURRENT_SCHEMA_VERSION, FeatureFlags, Result, SectionKind, SiteGenError};

/// Most layout templates kept per site type.
pub const MAX_LAYOUTS_PER_TYPE: usize = 3;

/// One labelled corpus site, as seen by the frequency classifier.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Exemplar {
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub num_components: usize,
    #[serde(flatten)]
    pub flags: FeatureFlags,
    pub site_type: String,
    pub style: String,
}

/// The majority variant for one `(site_type, style, component)` key.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VariantRule {
    pub site_type: String,
    pub style: String,
    pub component: SectionKind,
    pub variant: String,
}

type VariantKey = (String, String, SectionKind);

/// On-disk form of the store.
#[derive(Debug, Serialize, Deserialize)]
struct StoreSnapshot {
    schema_version: u32,
    #[serde(default)]
    exemplars: Vec<Exemplar>,
    #[serde(default)]
    layouts: BTreeMap<String, Vec<Vec<SectionKind>>>,
    #[serde(default)]
    variants: Vec<VariantRule>,
}

/// Immutable corpus statistics.
#[derive(Debug, Clone, Default)]
pub struct FrequencyStore {
    exemplars: Vec<Exemplar>,
    layouts: BTreeMap<String, Vec<Vec<SectionKind>>>,
    variants: Vec<VariantRule>,
    variant_index: HashMap<VariantKey, usize>,
}

impl FrequencyStore {
    /// Build a store. Layout lists are cut to [`MAX_LAYOUTS_PER_TYPE`] and
    /// empty templates are discarded; on duplicate variant keys the first
    /// rule wins.
    pub fn new(
        exemplars: Vec<Exemplar>,
        layouts: BTreeMap<String, Vec<Vec<SectionKind>>>,
        variants: Vec<VariantRule>,
    ) -> Self {
        let layouts = layouts
            .into_iter()
            .filter_map(|(site_type, templates)| {
                let templates: Vec<_> = templates
                    .into_iter()
                    .filter(|t| !t.is_empty())
                    .take(MAX_LAYOUTS_PER_TYPE)
                    .collect();
                (!templates.is_empty()).then_some((site_type, templates))
            })
            .collect();

        let mut variant_index = HashMap::with_capacity(variants.len());
        for (slot, rule) in variants.iter().enumerate() {
            let key = (rule.site_type.clone(), rule.style.clone(), rule.component.clone());
            variant_index.entry(key).or_insert(slot);
        }

        Self {
            exemplars,
            layouts,
            variants,
            variant_index,
        }
    }

    /// A store with no corpus data. Every lookup misses.
    pub fn empty() -> Self {
        Self::default()
    }

    /// Exemplars in corpus order.
    pub fn exemplars(&self) -> &[Exemplar] {
        &self.exemplars
    }

    /// Up to three templates for `site_type`, most frequent first.
    pub fn layouts_for(&self, site_type: &str) -> Option<&[Vec<SectionKind>]> {
        self.layouts.get(site_type).map(Vec::as_slice)
    }

    pub fn layouts(&self) -> &BTreeMap<String, Vec<Vec<SectionKind>>> {
        &self.layouts
    }

    /// The learned variant for an exact key.
    pub fn variant(&self, site_type: &str, style: &str, kind: &SectionKind) -> Option<&str> {
        let key = (site_type.to_string(), style.to_string(), kind.clone());
        self.variant_index
            .get(&key)
            .map(|&slot| self.variants[slot].variant.as_str())
    }

    pub fn variant_rules(&self) -> &[VariantRule] {
        &self.variants
    }

    pub fn is_empty(&self) -> bool {
        self.exemplars.is_empty() && self.layouts.is_empty() && self.variants.is_empty()
    }

    // -----------------------------------------------------------------------
    // Snapshot I/O
    // -----------------------------------------------------------------------

    pub fn to_json(&self) -> Result<String> {
        let snapshot = StoreSnapshot {
            schema_version: CURRENT_SCHEMA_VERSION,
            exemplars: self.exemplars.clone(),
            layouts: self.layouts.clone(),
            variants: self.variants.clone(),
        };
        Ok(serde_json::to_string_pretty(&snapshot)?)
    }

    pub fn from_json(json: &str) -> Result<Self> {
        let snapshot: StoreSnapshot = serde_json::from_str(json)?;
        if snapshot.schema_version > CURRENT_SCHEMA_VERSION {
            return Err(SiteGenError::validation(format!(
                "store schema_version {} is newer than supported version {CURRENT_SCHEMA_VERSION}",
                snapshot.schema_version
            )));
        }
        Ok(Self::new(snapshot.exemplars, snapshot.layouts, snapshot.variants))
    }

    /// Load a snapshot from disk.
    #[instrument(skip_all, fields(path = %path.display()))]
    pub fn load(path: &Path) -> Result<Self> {
        let content =
            std::fs::read_to_string(path).map_err(|e| SiteGenError::io(path, e))?;
        let store = Self::from_json(&content)?;
        info!(
            exemplars = store.exemplars.len(),
            layouts = store.layouts.len(),
            variants = store.variants.len(),
            "frequency store loaded"
        );
        Ok(store)
    }

    /// Write a snapshot to disk, replacing any existing file atomically.
    #[instrument(skip_all, fields(path = %path.display()))]
    pub fn save(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent).map_err(|e| SiteGenError::io(parent, e))?;
        }
        let json = self.to_json()?;
        crate::output::write_atomic(path, &json)?;
        debug!(bytes = json.len(), "frequency store saved");
        Ok(())
    }
}
