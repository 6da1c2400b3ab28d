//! Built-in section renderers.
//!
//! Every renderer is a pure function of `(variant, context)`. Variants a
//! renderer does not know fall back to that kind's default treatment, listed
//! on each type below. Every fragment's root element carries
//! `data-section="<kind>"`.

use html_escape::encode_text;

use sitegen_shared::{SectionKind, WebsiteDsl};

use crate::theme::ColorScheme;

/// Everything a renderer may read besides the variant name.
#[derive(Debug, Clone, Copy)]
pub struct RenderContext<'a> {
    pub dsl: &'a WebsiteDsl,
    /// Free text the page is built around. Escaped by the renderers.
    pub source_text: &'a str,
    pub colors: &'a ColorScheme,
}

impl RenderContext<'_> {
    /// Escaped headline: the first five words of the source text, title-cased.
    pub fn headline(&self) -> String {
        let words: Vec<String> = self
            .source_text
            .split_whitespace()
            .take(5)
            .map(title_case)
            .collect();
        if words.is_empty() {
            return "Welcome".to_string();
        }
        encode_text(&words.join(" ")).into_owned()
    }

    /// Escaped source text.
    pub fn description(&self) -> String {
        encode_text(self.source_text.trim()).into_owned()
    }
}

fn title_case(word: &str) -> String {
    let mut chars = word.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars.flat_map(char::to_lowercase)).collect(),
        None => String::new(),
    }
}

/// Renders one section kind into a markup fragment.
pub trait SectionRenderer: Send + Sync {
    /// The section kind this renderer handles.
    fn kind(&self) -> SectionKind;

    /// Render a fragment. Must not fail; unknown variants get the default treatment.
    fn render(&self, variant: &str, ctx: &RenderContext<'_>) -> String;
}

/// Every built-in renderer, in canonical section order.
pub fn builtin_renderers() -> Vec<Box<dyn SectionRenderer>> {
    vec![
        Box::new(NavbarRenderer),
        Box::new(HeroRenderer),
        Box::new(FeaturesRenderer),
        Box::new(PricingRenderer),
        Box::new(TestimonialsRenderer),
        Box::new(ContactRenderer),
        Box::new(FooterRenderer),
    ]
}

// ---------------------------------------------------------------------------
// Navbar
// ---------------------------------------------------------------------------

/// Variants: `transparent` (blurred translucent bar). Default: `solid`.
pub struct NavbarRenderer;

impl SectionRenderer for NavbarRenderer {
    fn kind(&self) -> SectionKind {
        SectionKind::Navbar
    }

    fn render(&self, variant: &str, ctx: &RenderContext<'_>) -> String {
        let (background, extra) = match variant {
            "transparent" => ("rgba(255,255,255,0.9)", "backdrop-filter:blur(10px);"),
            _ => ("#fff", ""),
        };

        let links: String = ["Home", "Features", "About", "Contact"]
            .iter()
            .map(|label| {
                format!(
                    r##"<a href="#{}" style="color:#333;text-decoration:none">{label}</a>"##,
                    label.to_lowercase()
                )
            })
            .collect::<Vec<_>>()
            .join("\n        ");

        format!(
            r#"<nav data-section="navbar" style="background:{background};padding:20px 40px;box-shadow:0 2px 10px rgba(0,0,0,0.1);display:flex;justify-content:space-between;align-items:center;{extra}">
    <div style="font-size:1.5rem;font-weight:bold;color:{primary}">Brand</div>
    <div style="display:flex;gap:30px">
        {links}
    </div>
</nav>"#,
            primary = ctx.colors.primary,
        )
    }
}

// ---------------------------------------------------------------------------
// Hero
// ---------------------------------------------------------------------------

/// Variants: `split_screen_with_image`, `minimal_text` (no button).
/// Default: `centered_cta`.
pub struct HeroRenderer;

impl HeroRenderer {
    fn cta(primary: &str) -> String {
        format!(
            r#"<button style="background:#fff;color:{primary};padding:15px 40px;border:none;border-radius:50px;font-size:1.1rem;font-weight:600;cursor:pointer">Get Started</button>"#
        )
    }
}

impl SectionRenderer for HeroRenderer {
    fn kind(&self) -> SectionKind {
        SectionKind::Hero
    }

    fn render(&self, variant: &str, ctx: &RenderContext<'_>) -> String {
        let ColorScheme { primary, secondary } = ctx.colors;
        let headline = ctx.headline();
        let description = ctx.description();

        match variant {
            "split_screen_with_image" => format!(
                r#"<section data-section="hero" style="display:flex;min-height:600px;align-items:center;padding:80px 40px;background:linear-gradient(135deg,{primary},{secondary})">
    <div style="flex:1;color:#fff">
        <h1 style="font-size:3rem;margin-bottom:20px">{headline}</h1>
        <p style="font-size:1.25rem;margin-bottom:30px">{description}</p>
        {cta}
    </div>
    <div style="flex:1;display:flex;justify-content:center">
        <div style="width:400px;height:400px;background:rgba(255,255,255,0.2);border-radius:20px;backdrop-filter:blur(10px)"></div>
    </div>
</section>"#,
                cta = Self::cta(primary),
            ),
            "minimal_text" => format!(
                r#"<section data-section="hero" style="padding:100px 20px;text-align:center">
    <h1 style="font-size:3rem;margin-bottom:20px;color:{primary}">{headline}</h1>
    <p style="font-size:1.25rem;max-width:600px;margin:0 auto;color:{secondary}">{description}</p>
</section>"#
            ),
            _ => format!(
                r#"<section data-section="hero" style="background:linear-gradient(135deg,{primary},{secondary});color:#fff;padding:100px 20px;text-align:center;min-height:600px;display:flex;flex-direction:column;justify-content:center">
    <h1 style="font-size:3rem;margin-bottom:20px">{headline}</h1>
    <p style="font-size:1.25rem;margin-bottom:30px;max-width:600px;margin-left:auto;margin-right:auto">{description}</p>
    <div>
        {cta}
    </div>
</section>"#,
                cta = Self::cta(primary),
            ),
        }
    }
}

// ---------------------------------------------------------------------------
// Features
// ---------------------------------------------------------------------------

const FEATURE_CARDS: [(&str, &str, &str); 4] = [
    ("\u{26a1}", "Fast", "Lightning fast performance"),
    ("\u{1f3a8}", "Beautiful", "Stunning designs"),
    ("\u{1f4f1}", "Responsive", "Works everywhere"),
    ("\u{1f512}", "Secure", "Bank-level security"),
];

/// Variants: `grid_4col`. Default: `grid_3col`.
pub struct FeaturesRenderer;

impl SectionRenderer for FeaturesRenderer {
    fn kind(&self) -> SectionKind {
        SectionKind::Features
    }

    fn render(&self, variant: &str, _ctx: &RenderContext<'_>) -> String {
        let columns = match variant {
            "grid_4col" => 4,
            _ => 3,
        };

        let cards: String = FEATURE_CARDS[..columns]
            .iter()
            .map(|(icon, title, desc)| {
                format!(
                    r#"<div style="background:#fff;padding:30px;border-radius:10px;box-shadow:0 4px 15px rgba(0,0,0,0.1);text-align:center">
            <div style="font-size:3rem;margin-bottom:15px">{icon}</div>
            <h3 style="font-size:1.5rem;margin-bottom:10px">{title}</h3>
            <p style="color:#718096">{desc}</p>
        </div>"#
                )
            })
            .collect::<Vec<_>>()
            .join("\n        ");

        format!(
            r#"<section data-section="features" style="padding:80px 20px;background:#f7fafc">
    <h2 style="text-align:center;font-size:2.5rem;margin-bottom:50px">Features</h2>
    <div style="display:grid;grid-template-columns:repeat({columns},1fr);gap:30px;max-width:1200px;margin:0 auto">
        {cards}
    </div>
</section>"#
        )
    }
}

// ---------------------------------------------------------------------------
// Pricing, testimonials, contact: single layout each
// ---------------------------------------------------------------------------

/// Three-tier plan grid. Ignores the variant.
pub struct PricingRenderer;

impl SectionRenderer for PricingRenderer {
    fn kind(&self) -> SectionKind {
        SectionKind::Pricing
    }

    fn render(&self, _variant: &str, ctx: &RenderContext<'_>) -> String {
        let primary = &ctx.colors.primary;
        let plans: String = [("Starter", "$9", false), ("Pro", "$29", true), ("Enterprise", "$99", false)]
            .iter()
            .map(|(name, price, featured)| {
                let border = if *featured { primary.as_str() } else { "#e2e8f0" };
                format!(
                    r#"<div style="border:2px solid {border};padding:40px;border-radius:10px;text-align:center">
            <h3 style="font-size:1.5rem;margin-bottom:10px">{name}</h3>
            <p style="font-size:3rem;font-weight:bold;margin:20px 0">{price}</p>
            <button style="background:{primary};color:#fff;padding:12px 30px;border:none;border-radius:8px;cursor:pointer;width:100%">Choose Plan</button>
        </div>"#
                )
            })
            .collect::<Vec<_>>()
            .join("\n        ");

        format!(
            r#"<section data-section="pricing" style="padding:80px 20px;background:#fff">
    <h2 style="text-align:center;font-size:2.5rem;margin-bottom:50px">Pricing</h2>
    <div style="display:grid;grid-template-columns:repeat(3,1fr);gap:30px;max-width:1000px;margin:0 auto">
        {plans}
    </div>
</section>"#
        )
    }
}

/// Two quote cards. Ignores the variant.
pub struct TestimonialsRenderer;

impl SectionRenderer for TestimonialsRenderer {
    fn kind(&self) -> SectionKind {
        SectionKind::Testimonials
    }

    fn render(&self, _variant: &str, _ctx: &RenderContext<'_>) -> String {
        let quotes: String = [
            ("This product changed my life!", "Happy Customer"),
            ("Best decision we ever made.", "Satisfied Client"),
        ]
        .iter()
        .map(|(quote, author)| {
            format!(
                r#"<div style="background:#fff;padding:30px;border-radius:10px;box-shadow:0 4px 15px rgba(0,0,0,0.1)">
            <p style="font-style:italic;margin-bottom:20px">&quot;{quote}&quot;</p>
            <p style="font-weight:bold">- {author}</p>
        </div>"#
            )
        })
        .collect::<Vec<_>>()
        .join("\n        ");

        format!(
            r#"<section data-section="testimonials" style="padding:80px 20px;background:#f7fafc">
    <h2 style="text-align:center;font-size:2.5rem;margin-bottom:50px">What People Say</h2>
    <div style="display:grid;grid-template-columns:repeat(2,1fr);gap:30px;max-width:1000px;margin:0 auto">
        {quotes}
    </div>
</section>"#
        )
    }
}

/// Name/email/message form. Ignores the variant.
pub struct ContactRenderer;

impl SectionRenderer for ContactRenderer {
    fn kind(&self) -> SectionKind {
        SectionKind::Contact
    }

    fn render(&self, _variant: &str, ctx: &RenderContext<'_>) -> String {
        let field = "padding:15px;border:2px solid #e2e8f0;border-radius:8px;font-size:1rem";
        format!(
            r#"<section data-section="contact" style="padding:80px 20px;background:#fff">
    <h2 style="text-align:center;font-size:2.5rem;margin-bottom:50px">Get In Touch</h2>
    <form style="max-width:600px;margin:0 auto;display:flex;flex-direction:column;gap:20px">
        <input type="text" name="name" placeholder="Name" style="{field}">
        <input type="email" name="email" placeholder="Email" style="{field}">
        <textarea name="message" placeholder="Message" rows="5" style="{field};resize:vertical"></textarea>
        <button type="submit" style="background:{primary};color:#fff;padding:15px;border:none;border-radius:8px;font-size:1.1rem;font-weight:600;cursor:pointer">Send Message</button>
    </form>
</section>"#,
            primary = ctx.colors.primary,
        )
    }
}

// ---------------------------------------------------------------------------
// Footer
// ---------------------------------------------------------------------------

const LINK_STYLE: &str = "color:#a0aec0;text-decoration:none";

fn footer_links(labels: &[&str], indent: &str) -> String {
    labels
        .iter()
        .map(|label| format!(r##"<a href="#" style="{LINK_STYLE}">{label}</a>"##))
        .collect::<Vec<_>>()
        .join(indent)
}

/// Variants: `detailed` (three link columns). Default: `minimal`.
pub struct FooterRenderer;

impl SectionRenderer for FooterRenderer {
    fn kind(&self) -> SectionKind {
        SectionKind::Footer
    }

    fn render(&self, variant: &str, _ctx: &RenderContext<'_>) -> String {
        const COPYRIGHT: &str = "&copy; Company. All rights reserved.";

        match variant {
            "detailed" => {
                let columns: String = [
                    ("Company", ["About", "Careers", "Blog"]),
                    ("Product", ["Features", "Pricing", "Security"]),
                    ("Legal", ["Privacy", "Terms", "Contact"]),
                ]
                .iter()
                .map(|(heading, labels)| {
                    format!(
                        r#"<div>
            <h4 style="margin-bottom:20px">{heading}</h4>
            <div style="display:flex;flex-direction:column;gap:10px">
                {links}
            </div>
        </div>"#,
                        links = footer_links(labels, "\n                "),
                    )
                })
                .collect::<Vec<_>>()
                .join("\n        ");

                format!(
                    r#"<footer data-section="footer" style="background:#2d3748;color:#fff;padding:60px 40px">
    <div style="display:grid;grid-template-columns:repeat(3,1fr);gap:40px;max-width:1200px;margin:0 auto 40px">
        {columns}
    </div>
    <div style="text-align:center;padding-top:40px;border-top:1px solid #4a5568">
        <p>{COPYRIGHT}</p>
    </div>
</footer>"#
                )
            }
            _ => format!(
                r#"<footer data-section="footer" style="background:#2d3748;color:#fff;padding:40px 20px;text-align:center">
    <p style="margin-bottom:10px">{COPYRIGHT}</p>
    <div style="display:flex;gap:20px;justify-content:center;margin-top:20px">
        {links}
    </div>
</footer>"#,
                links = footer_links(&["Privacy", "Terms", "Contact"], "\n        "),
            ),
        }
    }
}
