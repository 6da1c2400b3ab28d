//! Layout and variant selection over the frequency store.

use std::sync::Arc;

use tracing::debug;

use sitegen_shared::SectionKind;

use crate::store::FrequencyStore;

/// Layout used when the store has no template for a site type.
pub fn default_layout() -> Vec<SectionKind> {
    vec![
        SectionKind::Navbar,
        SectionKind::Hero,
        SectionKind::Features,
        SectionKind::Footer,
    ]
}

/// Variant used when the store has no rule for a key.
pub fn default_variant(kind: &SectionKind) -> &'static str {
    match kind {
        SectionKind::Navbar => "solid",
        SectionKind::Hero => "centered_cta",
        SectionKind::Features => "grid_3col",
        SectionKind::Footer => "minimal",
        _ => "default",
    }
}

/// Picks the ordered section kinds for a site type.
#[derive(Debug, Clone)]
pub struct LayoutSelector {
    store: Arc<FrequencyStore>,
}

impl LayoutSelector {
    pub fn new(store: Arc<FrequencyStore>) -> Self {
        Self { store }
    }

    /// The most frequent template for `site_type`, else [`default_layout`].
    /// Never empty.
    pub fn select(&self, site_type: &str) -> Vec<SectionKind> {
        match self.store.layouts_for(site_type).and_then(|t| t.first()) {
            Some(layout) if !layout.is_empty() => layout.clone(),
            _ => {
                debug!(site_type, "no learned layout, using default");
                default_layout()
            }
        }
    }
}

/// Picks the variant for one section.
#[derive(Debug, Clone)]
pub struct VariantSelector {
    store: Arc<FrequencyStore>,
}

impl VariantSelector {
    pub fn new(store: Arc<FrequencyStore>) -> Self {
        Self { store }
    }

    /// Exact learned rule, else [`default_variant`]. Never empty.
    pub fn select(&self, site_type: &str, style: &str, kind: &SectionKind) -> String {
        match self.store.variant(site_type, style, kind) {
            Some(variant) if !variant.is_empty() => variant.to_string(),
            _ => default_variant(kind).to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::BTreeMap;

    use crate::store::VariantRule;

    fn learned() -> Arc<FrequencyStore> {
        let mut layouts = BTreeMap::new();
        layouts.insert(
            "portfolio".to_string(),
            vec![
                vec![SectionKind::Navbar, SectionKind::Hero, SectionKind::Contact, SectionKind::Footer],
                vec![SectionKind::Navbar, SectionKind::Footer],
            ],
        );
        let rules = vec![
            VariantRule {
                site_type: "portfolio".into(),
                style: "dark_mode".into(),
                component: SectionKind::Hero,
                variant: "split_screen_with_image".into(),
            },
            VariantRule {
                site_type: "portfolio".into(),
                style: "dark_mode".into(),
                component: SectionKind::Footer,
                variant: String::new(),
            },
        ];
        Arc::new(FrequencyStore::new(vec![], layouts, rules))
    }

    #[test]
    fn learned_layout_uses_top_template() {
        let selector = LayoutSelector::new(learned());
        assert_eq!(
            selector.select("portfolio"),
            vec![SectionKind::Navbar, SectionKind::Hero, SectionKind::Contact, SectionKind::Footer]
        );
    }

    #[test]
    fn unknown_site_type_gets_default_layout() {
        let selector = LayoutSelector::new(learned());
        assert_eq!(
            selector.select("art_gallery"),
            vec![SectionKind::Navbar, SectionKind::Hero, SectionKind::Features, SectionKind::Footer]
        );
    }

    #[test]
    fn layout_never_empty() {
        let selector = LayoutSelector::new(Arc::new(FrequencyStore::empty()));
        for site_type in ["", "saas_landing", "other", "\u{1f600}"] {
            assert!(!selector.select(site_type).is_empty());
        }
    }

    #[test]
    fn learned_variant_then_static_default() {
        let selector = VariantSelector::new(learned());
        assert_eq!(
            selector.select("portfolio", "dark_mode", &SectionKind::Hero),
            "split_screen_with_image"
        );
        assert_eq!(selector.select("portfolio", "minimal_clean", &SectionKind::Hero), "centered_cta");
        // an empty learned variant is treated as a miss
        assert_eq!(selector.select("portfolio", "dark_mode", &SectionKind::Footer), "minimal");
    }

    #[test]
    fn variant_never_empty_under_empty_table() {
        let selector = VariantSelector::new(Arc::new(FrequencyStore::empty()));
        let mut kinds = SectionKind::KNOWN.to_vec();
        kinds.push(SectionKind::parse("faq"));
        for kind in &kinds {
            for site_type in ["saas_landing", "unknown"] {
                for style in ["modern_gradient", ""] {
                    assert!(!selector.select(site_type, style, kind).is_empty());
                }
            }
        }
        assert_eq!(selector.select("x", "y", &SectionKind::Navbar), "solid");
        assert_eq!(selector.select("x", "y", &SectionKind::Features), "grid_3col");
        assert_eq!(selector.select("x", "y", &SectionKind::Pricing), "default");
    }
}
