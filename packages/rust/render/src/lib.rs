//! HTML rendering of a [`WebsiteDsl`](sitegen_shared::WebsiteDsl).
//!
//! This crate provides:
//! - [`SectionRenderer`]: one markup fragment per section kind, with the
//!   built-in renderers for navbar, hero, features, pricing, testimonials,
//!   contact and footer
//! - [`ComponentRegistry`]: the kind → renderer mapping
//! - [`ThemeTable`]: style → colour scheme lookup
//! - [`PageRenderer`]: assembles fragments into a self-contained document

pub mod components;
pub mod page;
pub mod registry;
pub mod theme;

pub use components::{
    ContactRenderer, FeaturesRenderer, FooterRenderer, HeroRenderer, NavbarRenderer,
    PricingRenderer, RenderContext, SectionRenderer, TestimonialsRenderer, builtin_renderers,
};
pub use page::{PageRenderer, RenderedPage};
pub use registry::ComponentRegistry;
pub use theme::{ColorScheme, ThemeTable};
