//! Offline corpus aggregation into a [`FrequencyStore`].
//!
//! Counting is split from ranking: [`CorpusTally`] only adds, so partial
//! tallies built over contiguous chunks can be merged in chunk order and
//! ranked once, giving exactly the sequential result.

use std::collections::BTreeMap;

use rayon::prelude::*;
use serde::Serialize;
use tracing::{debug, info, instrument};

use sitegen_shared::{ComponentObservation, SectionKind, SiteRecord};

use crate::store::{Exemplar, FrequencyStore, MAX_LAYOUTS_PER_TYPE, VariantRule};
use crate::tally::{FirstSeenMap, Tally};

/// The style whose navbars are rendered transparent.
pub const GRADIENT_STYLE: &str = "modern_gradient";

/// Assumed feature-grid size when an observation carries no item count.
const DEFAULT_FEATURE_ITEMS: usize = 3;

/// Infer the variant a scraped component was rendered with.
pub fn infer_variant(component: &ComponentObservation, style: &str) -> String {
    let variant = match component.kind {
        SectionKind::Navbar if style == GRADIENT_STYLE => "transparent",
        SectionKind::Navbar => "solid",
        SectionKind::Hero if component.has_image => "split_screen_with_image",
        SectionKind::Hero if component.has_cta => "centered_cta",
        SectionKind::Hero => "minimal_text",
        SectionKind::Features
            if component.num_items.unwrap_or(DEFAULT_FEATURE_ITEMS) >= 4 =>
        {
            "grid_4col"
        }
        SectionKind::Features => "grid_3col",
        SectionKind::Footer if component.has_links => "detailed",
        SectionKind::Footer => "minimal",
        _ => "default",
    };
    variant.to_string()
}

type VariantKey = (String, String, SectionKind);

/// Additive corpus counts. Ranking happens in [`CorpusTally::finish`].
#[derive(Debug, Clone, Default)]
pub struct CorpusTally {
    records: usize,
    exemplars: Vec<Exemplar>,
    layouts: FirstSeenMap<String, Tally<Vec<SectionKind>>>,
    variants: FirstSeenMap<VariantKey, Tally<String>>,
}

impl CorpusTally {
    pub fn new() -> Self {
        Self::default()
    }

    /// Count one record.
    pub fn add(&mut self, record: &SiteRecord) {
        self.records += 1;

        self.exemplars.push(Exemplar {
            title: record.title.clone(),
            num_components: record.components.len(),
            flags: record.flags(),
            site_type: record.site_type.clone(),
            style: record.style.clone(),
        });

        let layout = record.layout();
        if layout.is_empty() {
            debug!(url = %record.url, "record has no components, layout not counted");
        } else {
            self.layouts
                .entry_or_default(record.site_type.clone())
                .add(layout, 1);
        }

        for component in &record.components {
            let key = (
                record.site_type.clone(),
                record.style.clone(),
                component.kind.clone(),
            );
            self.variants
                .entry_or_default(key)
                .add(infer_variant(component, &record.style), 1);
        }
    }

    /// Fold a later tally into this one.
    pub fn merge(mut self, other: CorpusTally) -> Self {
        self.records += other.records;
        self.exemplars.extend(other.exemplars);
        for (site_type, tally) in other.layouts {
            self.layouts.entry_or_default(site_type).merge(tally);
        }
        for (key, tally) in other.variants {
            self.variants.entry_or_default(key).merge(tally);
        }
        self
    }

    pub fn records(&self) -> usize {
        self.records
    }

    /// Rank the counts and build the store.
    pub fn finish(self) -> FrequencyStore {
        let layouts: BTreeMap<String, Vec<Vec<SectionKind>>> = self
            .layouts
            .iter()
            .map(|(site_type, tally)| {
                let top = tally
                    .ranked()
                    .into_iter()
                    .take(MAX_LAYOUTS_PER_TYPE)
                    .map(|(layout, _)| layout.clone())
                    .collect();
                (site_type.clone(), top)
            })
            .collect();

        let variants: Vec<VariantRule> = self
            .variants
            .iter()
            .filter_map(|((site_type, style, component), tally)| {
                tally.winner().map(|(variant, _)| VariantRule {
                    site_type: site_type.clone(),
                    style: style.clone(),
                    component: component.clone(),
                    variant: variant.clone(),
                })
            })
            .collect();

        FrequencyStore::new(self.exemplars, layouts, variants)
    }
}

/// Aggregate records in a single pass.
#[instrument(skip_all, fields(records = records.len()))]
pub fn aggregate(records: &[SiteRecord]) -> FrequencyStore {
    let mut tally = CorpusTally::new();
    for record in records {
        tally.add(record);
    }
    let store = tally.finish();
    log_store(&store);
    store
}

/// Aggregate records on the rayon pool.
///
/// Chunks are tallied independently and merged in chunk order, so the result
/// equals [`aggregate`] on the same input.
#[instrument(skip_all, fields(records = records.len()))]
pub fn aggregate_parallel(records: &[SiteRecord]) -> FrequencyStore {
    let chunk_size = records
        .len()
        .div_ceil(rayon::current_num_threads().max(1))
        .max(1);

    let partials: Vec<CorpusTally> = records
        .par_chunks(chunk_size)
        .map(|chunk| {
            let mut tally = CorpusTally::new();
            for record in chunk {
                tally.add(record);
            }
            tally
        })
        .collect();

    debug!(chunks = partials.len(), chunk_size, "partial tallies built");

    let store = partials
        .into_iter()
        .fold(CorpusTally::new(), CorpusTally::merge)
        .finish();
    log_store(&store);
    store
}

fn log_store(store: &FrequencyStore) {
    info!(
        exemplars = store.exemplars().len(),
        site_types = store.layouts().len(),
        variant_rules = store.variant_rules().len(),
        "corpus aggregated"
    );
}

// ---------------------------------------------------------------------------
// Corpus statistics
// ---------------------------------------------------------------------------

/// Per-category counts over a corpus, for reporting.
#[derive(Debug, Clone, Default, Serialize)]
pub struct CorpusStats {
    pub records: usize,
    /// `(site_type, count)`, most frequent first.
    pub site_types: Vec<(String, u64)>,
    pub styles: Vec<(String, u64)>,
    /// `(component kind, count)` over all component observations.
    pub components: Vec<(String, u64)>,
}

impl CorpusStats {
    pub fn from_records(records: &[SiteRecord]) -> Self {
        let mut site_types = Tally::new();
        let mut styles = Tally::new();
        let mut components = Tally::new();

        for record in records {
            site_types.add(record.site_type.clone(), 1);
            styles.add(record.style.clone(), 1);
            for component in &record.components {
                components.add(component.kind.to_string(), 1);
            }
        }

        Self {
            records: records.len(),
            site_types: owned_ranking(&site_types),
            styles: owned_ranking(&styles),
            components: owned_ranking(&components),
        }
    }
}

fn owned_ranking(tally: &Tally<String>) -> Vec<(String, u64)> {
    tally
        .ranked()
        .into_iter()
        .map(|(k, n)| (k.clone(), n))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn obs(kind: SectionKind) -> ComponentObservation {
        ComponentObservation::bare(kind)
    }

    fn record(site_type: &str, style: &str, components: Vec<ComponentObservation>) -> SiteRecord {
        SiteRecord {
            url: format!("https://{site_type}.example"),
            title: String::new(),
            site_type: site_type.into(),
            site_type_confidence: None,
            style: style.into(),
            style_confidence: None,
            components,
        }
    }

    fn chrome(extra: Vec<ComponentObservation>) -> Vec<ComponentObservation> {
        let mut components = vec![obs(SectionKind::Navbar)];
        components.extend(extra);
        components.push(obs(SectionKind::Footer));
        components
    }

    #[test]
    fn hero_with_image_is_split_screen_regardless_of_cta() {
        for has_cta in [true, false] {
            let hero = ComponentObservation {
                has_image: true,
                has_cta,
                ..obs(SectionKind::Hero)
            };
            assert_eq!(infer_variant(&hero, "minimal_clean"), "split_screen_with_image");
        }
    }

    #[test]
    fn variant_inference_rules() {
        let nav = obs(SectionKind::Navbar);
        assert_eq!(infer_variant(&nav, "modern_gradient"), "transparent");
        assert_eq!(infer_variant(&nav, "dark_mode"), "solid");

        let cta = ComponentObservation {
            has_cta: true,
            ..obs(SectionKind::Hero)
        };
        assert_eq!(infer_variant(&cta, "x"), "centered_cta");
        assert_eq!(infer_variant(&obs(SectionKind::Hero), "x"), "minimal_text");

        let four = ComponentObservation {
            num_items: Some(4),
            ..obs(SectionKind::Features)
        };
        assert_eq!(infer_variant(&four, "x"), "grid_4col");
        // missing count is treated as three items
        assert_eq!(infer_variant(&obs(SectionKind::Features), "x"), "grid_3col");

        let linked = ComponentObservation {
            has_links: true,
            ..obs(SectionKind::Footer)
        };
        assert_eq!(infer_variant(&linked, "x"), "detailed");
        assert_eq!(infer_variant(&obs(SectionKind::Footer), "x"), "minimal");

        assert_eq!(infer_variant(&obs(SectionKind::Pricing), "x"), "default");
        assert_eq!(infer_variant(&obs(SectionKind::parse("faq")), "x"), "default");
    }

    #[test]
    fn exemplars_are_verbatim() {
        let records = vec![
            record("blog", "minimal_clean", chrome(vec![obs(SectionKind::Hero)])),
            record("shop", "bold_colorful", vec![]),
        ];
        let store = aggregate(&records);
        let exemplars = store.exemplars();
        assert_eq!(exemplars.len(), 2);
        assert!(exemplars[0].flags.has_hero);
        assert!(!exemplars[0].flags.has_features);
        assert_eq!(exemplars[0].num_components, 3);
        assert_eq!(exemplars[1].flags, Default::default());
        // a record without components contributes no layout
        assert!(store.layouts_for("shop").is_none());
    }

    #[test]
    fn layouts_ranked_by_count_then_first_seen() {
        let a = chrome(vec![obs(SectionKind::Hero)]);
        let b = chrome(vec![obs(SectionKind::Pricing)]);
        let c = chrome(vec![obs(SectionKind::Contact)]);
        let d = chrome(vec![obs(SectionKind::Features)]);

        let records: Vec<SiteRecord> = [&a, &b, &c, &d, &c, &b]
            .into_iter()
            .map(|components| record("saas_landing", "modern_gradient", components.clone()))
            .collect();
        let store = aggregate(&records);

        let layouts = store.layouts_for("saas_landing").unwrap();
        fn kinds(cs: &[ComponentObservation]) -> Vec<SectionKind> {
            cs.iter().map(|c| c.kind.clone()).collect()
        }
        // b and c tie at two, b seen first; a beats d on first-seen
        assert_eq!(layouts, &[kinds(&b), kinds(&c), kinds(&a)]);
    }

    #[test]
    fn variant_majority_with_first_seen_tie_break() {
        let hero_img = ComponentObservation {
            has_image: true,
            ..obs(SectionKind::Hero)
        };
        let hero_cta = ComponentObservation {
            has_cta: true,
            ..obs(SectionKind::Hero)
        };

        let tied = vec![
            record("portfolio", "dark_mode", vec![hero_cta.clone()]),
            record("portfolio", "dark_mode", vec![hero_img.clone()]),
        ];
        let store = aggregate(&tied);
        assert_eq!(
            store.variant("portfolio", "dark_mode", &SectionKind::Hero),
            Some("centered_cta")
        );

        let majority = vec![
            record("portfolio", "dark_mode", vec![hero_cta]),
            record("portfolio", "dark_mode", vec![hero_img.clone()]),
            record("portfolio", "dark_mode", vec![hero_img]),
        ];
        let store = aggregate(&majority);
        assert_eq!(
            store.variant("portfolio", "dark_mode", &SectionKind::Hero),
            Some("split_screen_with_image")
        );
    }

    #[test]
    fn parallel_matches_sequential() {
        let kinds = [
            SectionKind::Hero,
            SectionKind::Features,
            SectionKind::Pricing,
            SectionKind::Contact,
        ];
        let types = ["saas_landing", "portfolio", "blog"];
        let styles = ["modern_gradient", "dark_mode"];

        let records: Vec<SiteRecord> = (0..97)
            .map(|i| {
                let extra = vec![
                    ComponentObservation {
                        has_image: i % 3 == 0,
                        has_cta: i % 2 == 0,
                        num_items: Some(i % 6),
                        ..obs(kinds[i % kinds.len()].clone())
                    },
                    obs(kinds[(i / 2) % kinds.len()].clone()),
                ];
                record(types[i % types.len()], styles[(i / 3) % styles.len()], chrome(extra))
            })
            .collect();

        let sequential = aggregate(&records);
        let parallel = aggregate_parallel(&records);

        assert_eq!(sequential.exemplars(), parallel.exemplars());
        assert_eq!(sequential.layouts(), parallel.layouts());
        assert_eq!(sequential.variant_rules(), parallel.variant_rules());
    }

    #[test]
    fn empty_corpus_gives_empty_store() {
        assert!(aggregate(&[]).is_empty());
        assert!(aggregate_parallel(&[]).is_empty());
    }

    #[test]
    fn merge_counts_records() {
        let mut left = CorpusTally::new();
        left.add(&record("blog", "minimal_clean", chrome(vec![])));
        let mut right = CorpusTally::new();
        right.add(&record("blog", "minimal_clean", chrome(vec![])));
        right.add(&record("shop", "minimal_clean", chrome(vec![])));
        assert_eq!(left.merge(right).records(), 3);
    }

    #[test]
    fn stats_rank_categories() {
        let records = vec![
            record("blog", "minimal_clean", chrome(vec![])),
            record("shop", "dark_mode", chrome(vec![obs(SectionKind::Pricing)])),
            record("shop", "minimal_clean", chrome(vec![])),
        ];
        let stats = CorpusStats::from_records(&records);
        assert_eq!(stats.records, 3);
        assert_eq!(stats.site_types, vec![("shop".into(), 2), ("blog".into(), 1)]);
        assert_eq!(stats.styles[0], ("minimal_clean".into(), 2));
        assert_eq!(stats.components[0], ("navbar".into(), 3));
        assert!(stats.components.contains(&("pricing".into(), 1)));
    }
}
