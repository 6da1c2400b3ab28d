//! Parsed-document capability traits and their `scraper` implementation.
//!
//! Extraction only needs element lookup by tag, lookup by class predicate,
//! text extraction and a first-N traversal. Anything offering those can be fed
//! to the extractor; [`scraper::Html`] is the built-in backend.

use std::sync::LazyLock;

use regex::Regex;
use scraper::{ElementRef, Html, Selector};

/// An element inside a [`ParsedDocument`].
pub trait DocumentNode {
    /// Visible text of the element and its descendants, whitespace-collapsed.
    fn visible_text(&self) -> String;

    /// Character count of the element's text nodes, each trimmed and joined
    /// without a separator. Used for length windows.
    fn stripped_text_len(&self) -> usize;

    /// Lowercased `class` attribute, if any.
    fn class_name(&self) -> Option<String>;

    /// Number of descendant elements whose tag is in `tags`.
    fn count_descendants(&self, tags: &[&str]) -> usize;

    /// Whether a descendant with a tag in `tags` has a class matching `pred`.
    fn has_descendant_with_class(&self, tags: &[&str], pred: &dyn Fn(&str) -> bool) -> bool;

    /// Number of direct child elements whose tag is in `tags`.
    fn count_children(&self, tags: &[&str]) -> usize;
}

/// A parsed HTML document as seen by the extractor.
pub trait ParsedDocument {
    type Node<'a>: DocumentNode
    where
        Self: 'a;

    /// All elements whose tag is in `tags`, in document order.
    fn elements_by_tag(&self, tags: &[&str]) -> Vec<Self::Node<'_>>;

    /// Visible text of `<body>`, whitespace-collapsed.
    fn body_text(&self) -> String;

    /// Text of `<title>`, if present and non-empty.
    fn title(&self) -> Option<String>;

    /// Number of elements below `<body>`.
    fn element_count(&self) -> usize;

    /// Every value of attribute `name` across the document.
    fn attribute_values(&self, name: &str) -> Vec<String>;

    /// The first `n` elements whose tag is in `tags`.
    fn first_elements(&self, tags: &[&str], n: usize) -> Vec<Self::Node<'_>> {
        let mut found = self.elements_by_tag(tags);
        found.truncate(n);
        found
    }

    /// The first element whose tag is in `tags`.
    fn first_by_tag(&self, tags: &[&str]) -> Option<Self::Node<'_>> {
        self.elements_by_tag(tags).into_iter().next()
    }

    /// Elements whose tag is in `tags` and whose lowercased class matches `pred`.
    fn elements_by_class(
        &self,
        tags: &[&str],
        pred: &dyn Fn(&str) -> bool,
    ) -> Vec<Self::Node<'_>> {
        self.elements_by_tag(tags)
            .into_iter()
            .filter(|node| node.class_name().is_some_and(|class| pred(&class)))
            .collect()
    }
}

/// Collapse runs of whitespace into single spaces and trim.
pub fn collapse_whitespace(text: &str) -> String {
    static WS_RE: LazyLock<Regex> =
        LazyLock::new(|| Regex::new(r"\s+").expect("valid regex"));

    WS_RE.replace_all(text.trim(), " ").into_owned()
}

// ---------------------------------------------------------------------------
// scraper backend
// ---------------------------------------------------------------------------

fn tag_selector(tags: &[&str]) -> Option<Selector> {
    if tags.is_empty() {
        return None;
    }
    Selector::parse(&tags.join(", ")).ok()
}

fn element_text(el: &ElementRef<'_>) -> String {
    collapse_whitespace(&el.text().collect::<Vec<_>>().join(" "))
}

impl DocumentNode for ElementRef<'_> {
    fn visible_text(&self) -> String {
        element_text(self)
    }

    fn stripped_text_len(&self) -> usize {
        self.text().map(|t| t.trim().chars().count()).sum()
    }

    fn class_name(&self) -> Option<String> {
        self.value().attr("class").map(str::to_lowercase)
    }

    fn count_descendants(&self, tags: &[&str]) -> usize {
        match tag_selector(tags) {
            Some(sel) => self.select(&sel).count(),
            None => 0,
        }
    }

    fn has_descendant_with_class(&self, tags: &[&str], pred: &dyn Fn(&str) -> bool) -> bool {
        let Some(sel) = tag_selector(tags) else {
            return false;
        };
        self.select(&sel)
            .any(|el| el.class_name().is_some_and(|class| pred(&class)))
    }

    fn count_children(&self, tags: &[&str]) -> usize {
        self.children()
            .filter_map(ElementRef::wrap)
            .filter(|child| tags.contains(&child.value().name()))
            .count()
    }
}

impl ParsedDocument for Html {
    type Node<'a> = ElementRef<'a>;

    fn elements_by_tag(&self, tags: &[&str]) -> Vec<ElementRef<'_>> {
        match tag_selector(tags) {
            Some(sel) => self.select(&sel).collect(),
            None => Vec::new(),
        }
    }

    fn body_text(&self) -> String {
        self.first_by_tag(&["body"])
            .map(|body| element_text(&body))
            .unwrap_or_default()
    }

    fn title(&self) -> Option<String> {
        self.first_by_tag(&["title"])
            .map(|el| element_text(&el))
            .filter(|t| !t.is_empty())
    }

    fn element_count(&self) -> usize {
        self.first_by_tag(&["body"])
            .map(|body| {
                body.descendants()
                    .skip(1)
                    .filter(|node| node.value().is_element())
                    .count()
            })
            .unwrap_or(0)
    }

    fn attribute_values(&self, name: &str) -> Vec<String> {
        self.tree
            .nodes()
            .filter_map(|node| node.value().as_element())
            .filter_map(|el| el.attr(name))
            .map(str::to_string)
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn doc() -> Html {
        Html::parse_document(
            r#"<html><head><title>  Acme
            Analytics </title></head><body>
            <header><a href="/">Home</a><img src="logo.png"></header>
            <div class="Feature-Grid"><div>A</div><div>B</div><article>C</article><span>x</span></div>
            <section class="cta"><button class="btn btn-primary">Go</button></section>
            <footer style="color: #000"><a href="/a">A</a><a href="/b">B</a></footer>
            </body></html>"#,
        )
    }

    #[test]
    fn collapse_whitespace_trims_and_joins() {
        assert_eq!(collapse_whitespace("  a \n\t b  c "), "a b c");
    }

    #[test]
    fn title_is_collapsed() {
        assert_eq!(doc().title(), Some("Acme Analytics".into()));
    }

    #[test]
    fn elements_by_tag_in_document_order() {
        let d = doc();
        let first = d.first_by_tag(&["nav", "header", "footer"]).expect("header");
        assert_eq!(first.value().name(), "header");
        assert_eq!(first.count_descendants(&["a"]), 1);
        assert_eq!(first.count_descendants(&["img"]), 1);
    }

    #[test]
    fn class_lookup_is_case_insensitive() {
        let d = doc();
        let features = d.elements_by_class(&["section", "div"], &|c| c.contains("feature"));
        assert_eq!(features.len(), 1);
        assert_eq!(features[0].count_children(&["div", "article"]), 3);
    }

    #[test]
    fn descendant_class_predicate() {
        let d = doc();
        let cta = d.first_by_tag(&["section"]).expect("section");
        assert!(cta.has_descendant_with_class(&["button", "a"], &|c| c.contains("btn")));
    }

    #[test]
    fn first_elements_truncates() {
        let d = doc();
        assert_eq!(d.first_elements(&["div"], 2).len(), 2);
        assert_eq!(d.first_elements(&["div"], 10).len(), 3);
    }

    #[test]
    fn attribute_values_collects_all() {
        let d = doc();
        let styles = d.attribute_values("style");
        assert_eq!(styles, vec!["color: #000".to_string()]);
        assert!(d.attribute_values("class").len() >= 3);
    }

    #[test]
    fn empty_body_has_no_elements() {
        let d = Html::parse_document("<html><body></body></html>");
        assert_eq!(d.element_count(), 0);
        assert!(d.body_text().is_empty());
    }
}
