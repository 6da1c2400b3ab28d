//! End-to-end synthesis: raw input → features → classification → DSL → page.

use std::sync::Arc;
use std::time::Instant;

use tracing::{info, instrument};

use sitegen_extract::{RawInput, extract, source_text};
use sitegen_render::{PageRenderer, RenderedPage};
use sitegen_shared::{
    AppConfig, ClassificationResult, ClassifierConfig, ExtractionConfig, FeatureRecord, Result,
    WebsiteDsl,
};

use crate::assemble::assemble;
use crate::classify::{Classifier, build_classifier};
use crate::select::{LayoutSelector, VariantSelector};
use crate::store::FrequencyStore;

/// Everything decided before rendering.
#[derive(Debug, Clone)]
pub struct Plan {
    pub features: FeatureRecord,
    pub classification: ClassificationResult,
    pub dsl: WebsiteDsl,
    /// Text the renderer builds headline and description from.
    pub source_text: String,
}

/// A plan plus its rendered page.
#[derive(Debug, Clone)]
pub struct Synthesis {
    pub plan: Plan,
    pub page: RenderedPage,
}

/// The synthesis pipeline. Holds only read-only state, so one instance can
/// serve any number of threads.
pub struct Synthesizer {
    extraction: ExtractionConfig,
    classifier: Box<dyn Classifier>,
    layouts: LayoutSelector,
    variants: VariantSelector,
    renderer: PageRenderer,
}

impl Synthesizer {
    pub fn new(
        store: Arc<FrequencyStore>,
        classifier: Box<dyn Classifier>,
        extraction: ExtractionConfig,
    ) -> Self {
        Self {
            extraction,
            classifier,
            layouts: LayoutSelector::new(store.clone()),
            variants: VariantSelector::new(store),
            renderer: PageRenderer::default(),
        }
    }

    /// Build from the application config, choosing the classifier strategy
    /// it names.
    pub fn from_config(config: &AppConfig, store: Arc<FrequencyStore>) -> Result<Self> {
        let classifier_config = ClassifierConfig::try_from(config)?;
        let classifier = build_classifier(&classifier_config, store.clone())?;
        Ok(Self::new(store, classifier, ExtractionConfig::from(config)))
    }

    /// Replace the page renderer (custom registry or themes).
    pub fn with_renderer(mut self, renderer: PageRenderer) -> Self {
        self.renderer = renderer;
        self
    }

    pub fn classifier_name(&self) -> &str {
        self.classifier.name()
    }

    /// Extract, classify and assemble, without rendering.
    ///
    /// Fails only with `MalformedInput`.
    #[instrument(skip_all, fields(input = input.kind(), classifier = self.classifier.name()))]
    pub fn plan(&self, input: &RawInput) -> Result<Plan> {
        let features = extract(input, &self.extraction)?;
        let classification = self.classifier.classify(&features);
        let dsl = assemble(&classification, &self.layouts, &self.variants);

        Ok(Plan {
            features,
            classification,
            dsl,
            source_text: source_text(input),
        })
    }

    /// Render an existing DSL.
    pub fn render(&self, dsl: &WebsiteDsl, source_text: &str) -> RenderedPage {
        self.renderer.render(dsl, source_text)
    }

    /// Run the whole pipeline.
    #[instrument(skip_all, fields(input = input.kind()))]
    pub fn synthesize(&self, input: &RawInput) -> Result<Synthesis> {
        let start = Instant::now();
        let plan = self.plan(input)?;
        let page = self.render(&plan.dsl, &plan.source_text);

        info!(
            site_type = %plan.dsl.site_type,
            style = %plan.dsl.style,
            confidence = plan.dsl.confidence,
            sections = page.rendered.len(),
            dropped = page.dropped.len(),
            elapsed_ms = start.elapsed().as_millis() as u64,
            "site synthesized"
        );

        Ok(Synthesis { plan, page })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::BTreeMap;

    use sitegen_render::ComponentRegistry;
    use sitegen_shared::{FeatureFlags, SectionKind, SiteGenError};

    use crate::classify::FrequencyClassifier;
    use crate::store::{Exemplar, VariantRule};

    fn saas_store() -> Arc<FrequencyStore> {
        let flags = FeatureFlags {
            has_navbar: true,
            has_hero: true,
            has_features: true,
            has_footer: true,
            has_pricing: true,
            ..FeatureFlags::default()
        };
        let exemplars = vec![Exemplar {
            title: "Pulse".into(),
            num_components: 5,
            flags,
            site_type: "saas_landing".into(),
            style: "modern_gradient".into(),
        }];
        let mut layouts = BTreeMap::new();
        layouts.insert(
            "saas_landing".to_string(),
            vec![vec![
                SectionKind::Navbar,
                SectionKind::Hero,
                SectionKind::Features,
                SectionKind::Pricing,
                SectionKind::Footer,
            ]],
        );
        let variants = vec![VariantRule {
            site_type: "saas_landing".into(),
            style: "modern_gradient".into(),
            component: SectionKind::Navbar,
            variant: "transparent".into(),
        }];
        Arc::new(FrequencyStore::new(exemplars, layouts, variants))
    }

    fn synthesizer(store: Arc<FrequencyStore>) -> Synthesizer {
        let classifier = FrequencyClassifier::new(store.clone(), ClassifierConfig::default());
        Synthesizer::new(store, Box::new(classifier), ExtractionConfig::default())
    }

    #[test]
    fn text_input_end_to_end() {
        let synth = synthesizer(saas_store());
        let out = synth
            .synthesize(&RawInput::Text(
                "Landing page for an analytics SaaS with features and pricing".into(),
            ))
            .unwrap();

        assert_eq!(out.plan.dsl.site_type, "saas_landing");
        assert_eq!(out.plan.dsl.style, "modern_gradient");
        assert_eq!(out.plan.dsl.sections.len(), 5);
        assert_eq!(out.plan.dsl.sections[0].variant, "transparent");
        assert_eq!(out.page.rendered.len(), 5);
        assert!(out.page.html.contains("Landing Page For An Analytics"));
    }

    #[test]
    fn empty_store_still_renders_default_page() {
        let synth = synthesizer(Arc::new(FrequencyStore::empty()));
        let out = synth.synthesize(&RawInput::Text("anything at all".into())).unwrap();

        assert_eq!(out.plan.classification.site_type, "other");
        assert_eq!(out.plan.classification.confidence, 0.0);
        assert_eq!(
            out.plan.dsl.kinds().cloned().collect::<Vec<_>>(),
            vec![SectionKind::Navbar, SectionKind::Hero, SectionKind::Features, SectionKind::Footer]
        );
        assert!(out.page.dropped.is_empty());
    }

    #[test]
    fn malformed_input_is_the_only_failure() {
        let synth = synthesizer(saas_store());
        let err = synth.synthesize(&RawInput::Text("   ".into())).unwrap_err();
        assert!(matches!(err, SiteGenError::MalformedInput { .. }));
    }

    #[test]
    fn html_input_uses_title_as_source_text() {
        let synth = synthesizer(saas_store());
        let html = "<html><head><title>Acme Metrics</title></head><body><nav><a href='/'>x</a></nav><footer>f</footer></body></html>";
        let plan = synth.plan(&RawInput::Html(html.into())).unwrap();
        assert_eq!(plan.source_text, "Acme Metrics");
        assert!(plan.features.flags.has_navbar);
    }

    #[test]
    fn unregistered_kinds_are_reported() {
        let synth = synthesizer(saas_store());
        let mut registry = ComponentRegistry::new();
        registry.unregister(&SectionKind::Pricing);
        let synth = synth.with_renderer(PageRenderer::new(registry, Default::default()));

        let out = synth
            .synthesize(&RawInput::Text("saas with features and pricing".into()))
            .unwrap();
        assert_eq!(out.page.dropped, vec![SectionKind::Pricing]);
        assert_eq!(out.page.rendered.len(), 4);
    }

    #[test]
    fn synthesis_is_deterministic() {
        let synth = synthesizer(saas_store());
        let input = RawInput::Text("portfolio with testimonials and contact".into());
        let a = synth.synthesize(&input).unwrap();
        let b = synth.synthesize(&input).unwrap();
        assert_eq!(a.page.html, b.page.html);
        assert_eq!(a.plan.dsl, b.plan.dsl);
    }

    #[test]
    fn from_config_rejects_unknown_strategy() {
        let mut config = AppConfig::default();
        config.classifier.strategy = "neural".into();
        assert!(Synthesizer::from_config(&config, Arc::new(FrequencyStore::empty())).is_err());

        let ok = Synthesizer::from_config(&AppConfig::default(), Arc::new(FrequencyStore::empty()))
            .unwrap();
        assert_eq!(ok.classifier_name(), "frequency");
    }

    #[test]
    fn synthesizer_is_shareable() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<Synthesizer>();
        assert_send_sync::<Arc<FrequencyStore>>();
    }
}
