//! Synthesis pipeline and corpus statistics for SiteGen.
//!
//! This crate ties extraction, classification, selection, assembly and
//! rendering into [`Synthesizer`], and builds the [`FrequencyStore`] those
//! stages read from a scraped corpus.

pub mod aggregate;
pub mod assemble;
pub mod classify;
pub mod output;
pub mod pipeline;
pub mod select;
pub mod store;
pub mod tally;

pub use aggregate::{CorpusStats, CorpusTally, aggregate, aggregate_parallel, infer_variant};
pub use assemble::assemble;
pub use classify::{
    AxisWeights, Classifier, FrequencyClassifier, LabelAxis, LinearScorer, Scorer,
    TrainedClassifier, build_classifier,
};
pub use output::{Provenance, SiteManifest, read_dsl, write_atomic, write_site};
pub use pipeline::{Plan, Synthesis, Synthesizer};
pub use select::{LayoutSelector, VariantSelector, default_layout, default_variant};
pub use store::{Exemplar, FrequencyStore, VariantRule};
