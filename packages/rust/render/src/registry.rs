//! Section kind → renderer mapping.

use std::collections::HashMap;

use tracing::debug;

use sitegen_shared::SectionKind;

use crate::components::{SectionRenderer, builtin_renderers};

/// Holds one renderer per section kind.
pub struct ComponentRegistry {
    renderers: HashMap<SectionKind, Box<dyn SectionRenderer>>,
}

impl ComponentRegistry {
    /// A registry with the built-in renderer for every known kind.
    pub fn new() -> Self {
        let mut registry = Self::empty();
        for renderer in builtin_renderers() {
            registry.register(renderer);
        }
        registry
    }

    /// A registry with nothing registered.
    pub fn empty() -> Self {
        Self {
            renderers: HashMap::new(),
        }
    }

    /// Register `renderer` under its kind, replacing any previous one.
    pub fn register(&mut self, renderer: Box<dyn SectionRenderer>) {
        let kind = renderer.kind();
        if self.renderers.insert(kind.clone(), renderer).is_some() {
            debug!(%kind, "renderer replaced");
        }
    }

    /// Remove the renderer for `kind`, if any.
    pub fn unregister(&mut self, kind: &SectionKind) -> bool {
        self.renderers.remove(kind).is_some()
    }

    pub fn get(&self, kind: &SectionKind) -> Option<&dyn SectionRenderer> {
        self.renderers.get(kind).map(|r| r.as_ref())
    }

    pub fn contains(&self, kind: &SectionKind) -> bool {
        self.renderers.contains_key(kind)
    }

    pub fn len(&self) -> usize {
        self.renderers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.renderers.is_empty()
    }
}

impl Default for ComponentRegistry {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::components::RenderContext;

    struct Banner;

    impl SectionRenderer for Banner {
        fn kind(&self) -> SectionKind {
            SectionKind::parse("banner")
        }

        fn render(&self, _variant: &str, _ctx: &RenderContext<'_>) -> String {
            r#"<aside data-section="banner"></aside>"#.into()
        }
    }

    #[test]
    fn builtin_registry_has_seven_kinds() {
        let registry = ComponentRegistry::new();
        assert_eq!(registry.len(), 7);
        for kind in SectionKind::KNOWN {
            assert!(registry.contains(&kind));
        }
    }

    #[test]
    fn register_custom_kind() {
        let mut registry = ComponentRegistry::new();
        let banner = SectionKind::parse("banner");
        assert!(registry.get(&banner).is_none());

        registry.register(Box::new(Banner));
        assert!(registry.contains(&banner));
        assert_eq!(registry.len(), 8);
    }

    #[test]
    fn unregister_removes() {
        let mut registry = ComponentRegistry::new();
        assert!(registry.unregister(&SectionKind::Pricing));
        assert!(!registry.unregister(&SectionKind::Pricing));
        assert!(!registry.contains(&SectionKind::Pricing));
        assert!(ComponentRegistry::empty().is_empty());
    }
}
