//! Corpus record extraction from scraped pages.
//!
//! Turns a parsed page into a [`SiteRecord`]: keyword-scored site type,
//! attribute-sniffed visual style, and the component observations the corpus
//! aggregator infers variants from.

use tracing::{debug, instrument};

use sitegen_shared::{
    ComponentObservation, DEFAULT_SITE_TYPE, ExtractionConfig, Result, SectionKind, SiteGenError,
    SiteRecord, clamp_unit,
};

use crate::document::{DocumentNode, ParsedDocument};
use crate::features::{locate_regions, mentions};

/// Below this share of the keyword mass a page is filed as [`DEFAULT_SITE_TYPE`].
const MIN_KEYWORD_SHARE: f64 = 0.2;

/// Confidence attached to the fallback site type.
const FALLBACK_CONFIDENCE: f64 = 0.5;

/// Keyword lists per site type, in tie-break order.
pub const SITE_TYPE_KEYWORDS: &[(&str, &[&str])] = &[
    (
        "saas_landing",
        &["saas", "platform", "software", "analytics", "dashboard", "api", "integration"],
    ),
    (
        "portfolio",
        &["portfolio", "work", "projects", "designer", "photographer", "creative"],
    ),
    (
        "ecommerce",
        &["shop", "store", "cart", "product", "buy", "checkout", "price"],
    ),
    ("blog", &["blog", "article", "post", "read", "news", "story"]),
    (
        "restaurant",
        &["menu", "food", "dining", "restaurant", "order", "delivery"],
    ),
    (
        "corporate",
        &["about us", "company", "business", "services", "contact"],
    ),
];

const DARK_TERMS: &[&str] = &["dark", "black", "#000", "#111"];
const GLASS_TERMS: &[&str] = &["blur", "glass", "backdrop"];
const COLOR_TERMS: &[&str] = &["color", "vibrant", "bold", "bright"];

/// A label with the confidence it was assigned.
#[derive(Debug, Clone, PartialEq)]
pub struct Guess {
    pub label: String,
    pub confidence: f64,
}

impl Guess {
    fn new(label: &str, confidence: f64) -> Self {
        Self {
            label: label.to_string(),
            confidence: clamp_unit(confidence),
        }
    }
}

/// Score site types by keyword occurrences in lowercased page text.
///
/// Ties go to the earlier entry of [`SITE_TYPE_KEYWORDS`].
pub fn classify_site_type(text: &str) -> Guess {
    let lower = text.to_lowercase();

    let scores: Vec<(&str, usize)> = SITE_TYPE_KEYWORDS
        .iter()
        .map(|(label, words)| {
            let score = words.iter().map(|w| lower.matches(w).count()).sum();
            (*label, score)
        })
        .collect();

    let total = scores.iter().map(|(_, s)| *s).sum::<usize>().max(1);
    let mut best = scores[0];
    for &(label, score) in &scores[1..] {
        if score > best.1 {
            best = (label, score);
        }
    }

    let confidence = best.1 as f64 / total as f64;
    if confidence < MIN_KEYWORD_SHARE {
        return Guess::new(DEFAULT_SITE_TYPE, FALLBACK_CONFIDENCE);
    }
    Guess::new(best.0, confidence)
}

/// Guess the visual style from `class` and `style` attributes.
pub fn detect_style<D>(doc: &D) -> Guess
where
    D: ParsedDocument + ?Sized,
{
    let mut combined = doc.attribute_values("class").join(" ");
    combined.push(' ');
    combined.push_str(&doc.attribute_values("style").join(" "));
    let combined = combined.to_lowercase();

    if combined.contains("gradient") {
        Guess::new("modern_gradient", 0.8)
    } else if mentions(&combined, GLASS_TERMS) {
        Guess::new("glassmorphism", 0.75)
    } else if mentions(&combined, DARK_TERMS) {
        Guess::new("dark_mode", 0.85)
    } else if COLOR_TERMS.iter().filter(|t| combined.contains(*t)).count() > 2 {
        Guess::new("bold_colorful", 0.7)
    } else {
        Guess::new("minimal_clean", 0.6)
    }
}

/// Observe components in canonical page order.
pub fn observe_components<D>(doc: &D, config: &ExtractionConfig) -> Vec<ComponentObservation>
where
    D: ParsedDocument + ?Sized,
{
    let regions = locate_regions(doc, config);
    let mut components = Vec::new();

    if let Some(nav) = &regions.navbar {
        let num_links = nav.count_descendants(&["a"]);
        components.push(ComponentObservation {
            has_logo: nav.count_descendants(&["img"]) > 0,
            num_links,
            has_links: num_links > 0,
            ..ComponentObservation::bare(SectionKind::Navbar)
        });
    }

    if let Some(hero) = &regions.hero {
        components.push(ComponentObservation {
            has_image: hero.count_descendants(&["img"]) > 0,
            has_cta: hero.has_descendant_with_class(&["button", "a"], &|c| c.contains("btn")),
            ..ComponentObservation::bare(SectionKind::Hero)
        });
    }

    if let Some(features) = &regions.features {
        components.push(ComponentObservation {
            num_items: Some(features.count_children(&["div", "article"])),
            ..ComponentObservation::bare(SectionKind::Features)
        });
    }

    for (region, kind) in [
        (&regions.pricing, SectionKind::Pricing),
        (&regions.testimonials, SectionKind::Testimonials),
        (&regions.contact, SectionKind::Contact),
    ] {
        if region.is_some() {
            components.push(ComponentObservation::bare(kind));
        }
    }

    if let Some(footer) = &regions.footer {
        let num_links = footer.count_descendants(&["a"]);
        components.push(ComponentObservation {
            has_links: num_links > 0,
            num_links,
            ..ComponentObservation::bare(SectionKind::Footer)
        });
    }

    components
}

/// Build a corpus record for a page fetched from `url`.
#[instrument(skip(doc, config))]
pub fn extract_site_record<D>(doc: &D, url: &str, config: &ExtractionConfig) -> Result<SiteRecord>
where
    D: ParsedDocument + ?Sized,
{
    let body_text = doc.body_text();
    if doc.element_count() == 0 && body_text.is_empty() {
        return Err(SiteGenError::malformed(format!("{url}: document has an empty body")));
    }

    let title = doc.title().unwrap_or_default();
    let site_type = classify_site_type(&format!("{title} {body_text}"));
    let style = detect_style(doc);
    let components = observe_components(doc, config);

    debug!(
        site_type = %site_type.label,
        style = %style.label,
        components = components.len(),
        "site record extracted"
    );

    Ok(SiteRecord {
        url: url.to_string(),
        title,
        site_type: site_type.label,
        site_type_confidence: Some(site_type.confidence),
        style: style.label,
        style_confidence: Some(style.confidence),
        components,
    })
}
