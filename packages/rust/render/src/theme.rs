//! Style → colour scheme lookup.

use std::collections::BTreeMap;

/// Primary/secondary colour pair handed to every section renderer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ColorScheme {
    pub primary: String,
    pub secondary: String,
}

impl ColorScheme {
    pub fn new(primary: impl Into<String>, secondary: impl Into<String>) -> Self {
        Self {
            primary: primary.into(),
            secondary: secondary.into(),
        }
    }
}

impl Default for ColorScheme {
    fn default() -> Self {
        Self::new("#667eea", "#764ba2")
    }
}

/// Colour schemes keyed by style. Unknown styles get [`ColorScheme::default`].
#[derive(Debug, Clone)]
pub struct ThemeTable {
    schemes: BTreeMap<String, ColorScheme>,
    fallback: ColorScheme,
}

impl ThemeTable {
    /// The built-in schemes for every style the extractor can detect.
    pub fn builtin() -> Self {
        let schemes = [
            ("modern_gradient", "#667eea", "#764ba2"),
            ("minimal_clean", "#2d3748", "#4a5568"),
            ("bold_colorful", "#f56565", "#ed8936"),
            ("dark_mode", "#1a202c", "#2d3748"),
            ("glassmorphism", "#667eea", "#764ba2"),
        ]
        .into_iter()
        .map(|(style, p, s)| (style.to_string(), ColorScheme::new(p, s)))
        .collect();

        Self {
            schemes,
            fallback: ColorScheme::default(),
        }
    }

    /// Add or replace the scheme for `style`.
    pub fn insert(&mut self, style: impl Into<String>, scheme: ColorScheme) {
        self.schemes.insert(style.into(), scheme);
    }

    pub fn lookup(&self, style: &str) -> &ColorScheme {
        self.schemes.get(style).unwrap_or(&self.fallback)
    }
}

impl Default for ThemeTable {
    fn default() -> Self {
        Self::builtin()
    }
}
