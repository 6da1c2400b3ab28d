//! Full-page rendering.

use html_escape::{encode_double_quoted_attribute, encode_text};
use tracing::{debug, instrument, warn};

use sitegen_shared::{SectionKind, WebsiteDsl};

use crate::components::RenderContext;
use crate::registry::ComponentRegistry;
use crate::theme::ThemeTable;

const GLOBAL_STYLES: &str = "\
        * { margin: 0; padding: 0; box-sizing: border-box; }
        body { font-family: system-ui, -apple-system, sans-serif; line-height: 1.6; }
        button { transition: transform 0.2s, box-shadow 0.2s; }
        button:hover { transform: translateY(-2px); box-shadow: 0 6px 20px rgba(0,0,0,0.3); }";

/// Output of [`PageRenderer::render`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenderedPage {
    /// The complete HTML document.
    pub html: String,
    /// Kinds that produced a fragment, in page order.
    pub rendered: Vec<SectionKind>,
    /// Kinds with no registered renderer, in page order.
    pub dropped: Vec<SectionKind>,
}

/// Concatenates section fragments inside the fixed document shell.
pub struct PageRenderer {
    registry: ComponentRegistry,
    themes: ThemeTable,
}

impl PageRenderer {
    pub fn new(registry: ComponentRegistry, themes: ThemeTable) -> Self {
        Self { registry, themes }
    }

    pub fn registry(&self) -> &ComponentRegistry {
        &self.registry
    }

    /// Render `dsl` around `source_text`.
    ///
    /// Sections whose kind has no renderer are skipped and listed in
    /// [`RenderedPage::dropped`]. Identical inputs give byte-identical output.
    #[instrument(skip_all, fields(site_type = %dsl.site_type, sections = dsl.sections.len()))]
    pub fn render(&self, dsl: &WebsiteDsl, source_text: &str) -> RenderedPage {
        let colors = self.themes.lookup(&dsl.style);
        let ctx = RenderContext {
            dsl,
            source_text,
            colors,
        };

        let mut fragments = Vec::with_capacity(dsl.sections.len());
        let mut rendered = Vec::new();
        let mut dropped = Vec::new();

        for section in &dsl.sections {
            match self.registry.get(&section.kind) {
                Some(renderer) => {
                    fragments.push(renderer.render(&section.variant, &ctx));
                    rendered.push(section.kind.clone());
                }
                None => {
                    warn!(kind = %section.kind, position = section.position, "no renderer registered, section dropped");
                    dropped.push(section.kind.clone());
                }
            }
        }

        let html = format!(
            r#"<!DOCTYPE html>
<html lang="en">
<head>
    <meta charset="UTF-8">
    <meta name="viewport" content="width=device-width, initial-scale=1.0">
    <meta name="generator" content="sitegen">
    <meta name="description" content="{meta_description}">
    <title>Generated Website - {title}</title>
    <style>
{GLOBAL_STYLES}
    </style>
</head>
<body>
{body}
</body>
</html>
"#,
            meta_description = encode_double_quoted_attribute(source_text.trim()),
            title = encode_text(&dsl.site_type),
            body = fragments.join("\n"),
        );

        debug!(rendered = rendered.len(), dropped = dropped.len(), bytes = html.len(), "page rendered");

        RenderedPage {
            html,
            rendered,
            dropped,
        }
    }
}

impl Default for PageRenderer {
    fn default() -> Self {
        Self::new(ComponentRegistry::new(), ThemeTable::builtin())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use scraper::{Html, Selector};
    use sitegen_shared::ClassificationResult;

    fn dsl(kinds: &[(&str, &str)]) -> WebsiteDsl {
        WebsiteDsl::new(
            &ClassificationResult::new("saas_landing", "modern_gradient", 0.8),
            kinds.iter().map(|(k, v)| (SectionKind::parse(k), v.to_string())),
        )
    }

    fn section_markers(html: &str) -> Vec<String> {
        let doc = Html::parse_document(html);
        let sel = Selector::parse("[data-section]").unwrap();
        doc.select(&sel)
            .filter_map(|el| el.value().attr("data-section"))
            .map(str::to_string)
            .collect()
    }

    #[test]
    fn renders_sections_in_order() {
        let page = PageRenderer::default().render(
            &dsl(&[("navbar", "solid"), ("hero", "centered_cta"), ("footer", "minimal")]),
            "Team analytics",
        );
        assert_eq!(section_markers(&page.html), vec!["navbar", "hero", "footer"]);
        assert!(page.dropped.is_empty());
        assert!(page.html.starts_with("<!DOCTYPE html>"));
        assert!(page.html.contains("<title>Generated Website - saas_landing</title>"));
    }

    #[test]
    fn unregistered_kind_is_dropped_and_reported() {
        let page = PageRenderer::default().render(
            &dsl(&[("hero", "centered_cta"), ("carousel", "default"), ("footer", "detailed")]),
            "x",
        );
        assert_eq!(section_markers(&page.html), vec!["hero", "footer"]);
        assert_eq!(page.rendered, vec![SectionKind::Hero, SectionKind::Footer]);
        assert_eq!(page.dropped, vec![SectionKind::parse("carousel")]);
    }

    #[test]
    fn rendering_is_idempotent() {
        let renderer = PageRenderer::default();
        let d = dsl(&[("navbar", "transparent"), ("hero", "split_screen_with_image"), ("features", "grid_4col"), ("pricing", "default"), ("testimonials", "default"), ("contact", "default"), ("footer", "detailed")]);
        let a = renderer.render(&d, "Modern SaaS platform");
        let b = renderer.render(&d, "Modern SaaS platform");
        assert_eq!(a.html, b.html);
        assert_eq!(a.rendered.len(), 7);
    }

    #[test]
    fn empty_dsl_still_renders_shell() {
        let page = PageRenderer::default().render(&dsl(&[]), "");
        assert!(page.html.contains("<body>"));
        assert!(section_markers(&page.html).is_empty());
    }

    #[test]
    fn unknown_style_uses_fallback_colors() {
        let mut d = dsl(&[("hero", "centered_cta")]);
        d.style = "vaporwave".into();
        let page = PageRenderer::default().render(&d, "x");
        assert!(page.html.contains("linear-gradient(135deg,#667eea,#764ba2)"));
    }

    #[test]
    fn meta_description_is_attribute_escaped() {
        let page = PageRenderer::default().render(&dsl(&[]), r#"say "hi" <now>"#);
        assert!(page.html.contains(r#"content="say &quot;hi&quot; &lt;now&gt;""#));
    }

    #[test]
    fn no_external_assets() {
        let d = dsl(&[("navbar", "solid"), ("hero", "split_screen_with_image"), ("footer", "detailed")]);
        let page = PageRenderer::default().render(&d, "x");
        assert!(!page.html.contains("src="));
        assert!(!page.html.contains("<link"));
    }
}
