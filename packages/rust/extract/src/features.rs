//! Feature extraction: structural (parsed document) and lexical (free text).
//!
//! Both strategies produce the same [`FeatureRecord`] shape. Nothing here
//! touches the network or the filesystem.

use tracing::{debug, instrument};

use sitegen_shared::{ExtractionConfig, FeatureFlags, FeatureRecord, Result, SiteGenError};

use crate::document::{DocumentNode, ParsedDocument};

const NAVBAR_TAGS: &[&str] = &["nav", "header"];
const BLOCK_TAGS: &[&str] = &["section", "div"];
const CONTACT_TAGS: &[&str] = &["section", "div", "form"];

const PRICING_CLASSES: &[&str] = &["pricing", "plan"];
const TESTIMONIAL_CLASSES: &[&str] = &["testimonial", "review"];
const CONTACT_CLASSES: &[&str] = &["contact"];

const HERO_WORDS: &[&str] = &["hero", "landing", "main"];
const FEATURE_WORDS: &[&str] = &["features", "services", "benefits"];
const PRICING_WORDS: &[&str] = &["pricing", "plans"];
const TESTIMONIAL_WORDS: &[&str] = &["testimonial", "reviews"];
const CONTACT_WORDS: &[&str] = &["contact"];

/// Whether `haystack` contains any of `needles`.
pub(crate) fn mentions(haystack: &str, needles: &[&str]) -> bool {
    needles.iter().any(|n| haystack.contains(n))
}

// ---------------------------------------------------------------------------
// Region location
// ---------------------------------------------------------------------------

/// The page regions the extractor recognises, each the first match in
/// document order.
pub struct PageRegions<N> {
    pub navbar: Option<N>,
    pub hero: Option<N>,
    pub features: Option<N>,
    pub pricing: Option<N>,
    pub testimonials: Option<N>,
    pub contact: Option<N>,
    pub footer: Option<N>,
}

/// Locate every known region in `doc`.
pub fn locate_regions<'d, D>(doc: &'d D, config: &ExtractionConfig) -> PageRegions<D::Node<'d>>
where
    D: ParsedDocument + ?Sized,
{
    let feature_keywords: Vec<&str> = config.feature_keywords.iter().map(String::as_str).collect();

    PageRegions {
        navbar: doc.first_by_tag(NAVBAR_TAGS),
        hero: find_hero(doc, config),
        features: first_with_class(doc, BLOCK_TAGS, &feature_keywords),
        pricing: first_with_class(doc, BLOCK_TAGS, PRICING_CLASSES),
        testimonials: first_with_class(doc, BLOCK_TAGS, TESTIMONIAL_CLASSES),
        contact: first_with_class(doc, CONTACT_TAGS, CONTACT_CLASSES),
        footer: doc.first_by_tag(&["footer"]),
    }
}

/// First of the leading block elements whose text length falls strictly
/// inside the hero window.
fn find_hero<'d, D>(doc: &'d D, config: &ExtractionConfig) -> Option<D::Node<'d>>
where
    D: ParsedDocument + ?Sized,
{
    doc.first_elements(BLOCK_TAGS, config.hero_scan_limit)
        .into_iter()
        .find(|node| {
            let len = node.stripped_text_len();
            len > config.hero_min_chars && len < config.hero_max_chars
        })
}

fn first_with_class<'d, D>(doc: &'d D, tags: &[&str], keywords: &[&str]) -> Option<D::Node<'d>>
where
    D: ParsedDocument + ?Sized,
{
    if keywords.is_empty() {
        return None;
    }
    doc.elements_by_class(tags, &|class| mentions(class, keywords))
        .into_iter()
        .next()
}

// ---------------------------------------------------------------------------
// Structural extraction
// ---------------------------------------------------------------------------

fn count_in<N: DocumentNode>(node: Option<&N>, tags: &[&str]) -> u32 {
    node.map(|n| n.count_descendants(tags) as u32).unwrap_or(0)
}

/// Build a feature record from a parsed document.
///
/// Fails with `MalformedInput` only when the body holds neither elements nor
/// text; every other missing signal resolves to `false`/`0`.
#[instrument(skip_all)]
pub fn extract_structural<D>(doc: &D, config: &ExtractionConfig) -> Result<FeatureRecord>
where
    D: ParsedDocument + ?Sized,
{
    let body_text = doc.body_text();
    if doc.element_count() == 0 && body_text.is_empty() {
        return Err(SiteGenError::malformed("document has an empty body"));
    }

    let regions = locate_regions(doc, config);

    let record = FeatureRecord {
        flags: FeatureFlags {
            has_navbar: regions.navbar.is_some(),
            has_hero: regions.hero.is_some(),
            has_features: regions.features.is_some(),
            has_footer: regions.footer.is_some(),
            has_pricing: regions.pricing.is_some(),
            has_testimonials: regions.testimonials.is_some(),
            has_contact: regions.contact.is_some(),
        },
        word_count: body_text.split_whitespace().count() as u32,
        char_count: body_text.chars().count() as u32,
        link_count: count_in(regions.navbar.as_ref(), &["a"])
            + count_in(regions.footer.as_ref(), &["a"]),
        image_count: count_in(regions.navbar.as_ref(), &["img"])
            + count_in(regions.hero.as_ref(), &["img"]),
    };

    debug!(?record, "structural features extracted");
    Ok(record)
}

// ---------------------------------------------------------------------------
// Lexical extraction
// ---------------------------------------------------------------------------

/// Build a feature record from a free-text description.
///
/// Every synthesized site gets a navbar and a footer, so those flags are
/// always set. Blank text is `MalformedInput`.
#[instrument(skip_all, fields(len = text.len()))]
pub fn extract_lexical(text: &str) -> Result<FeatureRecord> {
    if text.trim().is_empty() {
        return Err(SiteGenError::malformed("description is blank"));
    }

    let lower = text.to_lowercase();

    let record = FeatureRecord {
        flags: FeatureFlags {
            has_navbar: true,
            has_hero: mentions(&lower, HERO_WORDS),
            has_features: mentions(&lower, FEATURE_WORDS),
            has_footer: true,
            has_pricing: mentions(&lower, PRICING_WORDS),
            has_testimonials: mentions(&lower, TESTIMONIAL_WORDS),
            has_contact: mentions(&lower, CONTACT_WORDS),
        },
        word_count: text.split_whitespace().count() as u32,
        char_count: text.chars().count() as u32,
        link_count: 0,
        image_count: 0,
    };

    debug!(?record, "lexical features extracted");
    Ok(record)
}
