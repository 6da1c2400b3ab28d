//! Site-type and style classification.
//!
//! Two interchangeable strategies sit behind [`Classifier`]:
//! - [`FrequencyClassifier`] scores corpus exemplars by matching feature flags
//! - [`TrainedClassifier`] delegates to an external [`Scorer`]
//!
//! Neither fails. Insufficient evidence degrades to the configured default
//! site type and style.

use std::collections::BTreeMap;
use std::path::Path;
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tracing::{debug, instrument, warn};

use sitegen_shared::{
    ClassificationResult, ClassifierConfig, ClassifierStrategy, FEATURE_NAMES, FeatureRecord,
    Result, SiteGenError, clamp_unit,
};

use crate::store::FrequencyStore;
use crate::tally::Tally;

/// Maps a feature record to a site type, a style and a confidence.
pub trait Classifier: Send + Sync {
    fn classify(&self, features: &FeatureRecord) -> ClassificationResult;

    /// Strategy name for logs and manifests.
    fn name(&self) -> &str;
}

/// Build the classifier selected by `config`.
pub fn build_classifier(
    config: &ClassifierConfig,
    store: Arc<FrequencyStore>,
) -> Result<Box<dyn Classifier>> {
    match &config.strategy {
        ClassifierStrategy::Frequency => {
            Ok(Box::new(FrequencyClassifier::new(store, config.clone())))
        }
        ClassifierStrategy::Trained { model_path } => {
            let scorer = LinearScorer::load(model_path)?;
            Ok(Box::new(TrainedClassifier::new(scorer, config.clone())))
        }
    }
}

fn defaults(config: &ClassifierConfig, confidence: f64) -> ClassificationResult {
    ClassificationResult::new(
        config.default_site_type.clone(),
        config.default_style.clone(),
        confidence,
    )
}

// ---------------------------------------------------------------------------
// Frequency similarity
// ---------------------------------------------------------------------------

/// Exemplar-similarity classifier over a [`FrequencyStore`].
pub struct FrequencyClassifier {
    store: Arc<FrequencyStore>,
    config: ClassifierConfig,
}

impl FrequencyClassifier {
    pub fn new(store: Arc<FrequencyStore>, config: ClassifierConfig) -> Self {
        Self { store, config }
    }
}

impl Classifier for FrequencyClassifier {
    #[instrument(skip_all, fields(exemplars = self.store.exemplars().len()))]
    fn classify(&self, features: &FeatureRecord) -> ClassificationResult {
        let mut totals: Tally<&str> = Tally::new();
        for exemplar in self.store.exemplars() {
            totals.add(&exemplar.site_type, features.flags.matching(&exemplar.flags));
        }

        let sum = totals.total();
        let Some((&site_type, best)) = totals.winner().filter(|_| sum > 0) else {
            debug!("no exemplar evidence, using defaults");
            return defaults(&self.config, 0.0);
        };

        let confidence = best as f64 / sum as f64;
        if confidence < self.config.frequency_min_evidence {
            debug!(site_type, confidence, "below minimum evidence, using defaults");
            return defaults(&self.config, self.config.fallback_confidence);
        }

        let mut styles: Tally<&str> = Tally::new();
        for exemplar in self.store.exemplars() {
            if exemplar.site_type == site_type {
                styles.add(&exemplar.style, 1);
            }
        }
        let style = styles
            .winner()
            .map(|(style, _)| style.to_string())
            .unwrap_or_else(|| self.config.default_style.clone());

        let result = ClassificationResult::new(site_type, style, confidence);
        debug!(?result, "classified by exemplar similarity");
        result
    }

    fn name(&self) -> &str {
        "frequency"
    }
}

// ---------------------------------------------------------------------------
// Trained scorer
// ---------------------------------------------------------------------------

/// Which label set a scorer is asked about.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LabelAxis {
    SiteType,
    Style,
}

impl LabelAxis {
    pub fn as_str(self) -> &'static str {
        match self {
            LabelAxis::SiteType => "site_type",
            LabelAxis::Style => "style",
        }
    }
}

/// An externally trained model: feature vector in, label distribution out.
///
/// The vector follows [`FEATURE_NAMES`] order.
pub trait Scorer: Send + Sync {
    fn predict(&self, axis: LabelAxis, features: &[f64]) -> Result<Vec<(String, f64)>>;
}

/// Highest probability, first-listed label on ties. NaN counts as zero.
fn arg_max(distribution: Vec<(String, f64)>) -> Option<(String, f64)> {
    let mut best: Option<(String, f64)> = None;
    for (label, p) in distribution {
        let p = clamp_unit(p);
        if best.as_ref().is_none_or(|(_, top)| p > *top) {
            best = Some((label, p));
        }
    }
    best
}

/// Classifier backed by a [`Scorer`].
pub struct TrainedClassifier<S> {
    scorer: S,
    config: ClassifierConfig,
}

impl<S: Scorer> TrainedClassifier<S> {
    pub fn new(scorer: S, config: ClassifierConfig) -> Self {
        Self { scorer, config }
    }

    fn top(&self, axis: LabelAxis, vector: &[f64]) -> Option<(String, f64)> {
        match self.scorer.predict(axis, vector) {
            Ok(distribution) => arg_max(distribution),
            Err(e) => {
                warn!(axis = axis.as_str(), error = %e, "scorer failed");
                None
            }
        }
    }
}

impl<S: Scorer> Classifier for TrainedClassifier<S> {
    #[instrument(skip_all)]
    fn classify(&self, features: &FeatureRecord) -> ClassificationResult {
        let vector = features.to_vector();

        let Some((site_type, confidence)) = self.top(LabelAxis::SiteType, &vector) else {
            return defaults(&self.config, 0.0);
        };
        if confidence < self.config.min_evidence {
            debug!(%site_type, confidence, "below minimum evidence, using defaults");
            return defaults(&self.config, self.config.fallback_confidence);
        }

        let style = self
            .top(LabelAxis::Style, &vector)
            .map(|(style, _)| style)
            .unwrap_or_else(|| self.config.default_style.clone());

        let result = ClassificationResult::new(site_type, style, confidence);
        debug!(?result, "classified by trained scorer");
        result
    }

    fn name(&self) -> &str {
        "trained"
    }
}

// ---------------------------------------------------------------------------
// Linear scorer
// ---------------------------------------------------------------------------

/// Weights for one label axis.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AxisWeights {
    pub labels: Vec<String>,
    /// One row per label, one column per feature.
    pub weights: Vec<Vec<f64>>,
    pub bias: Vec<f64>,
}

/// Multinomial logistic model loaded from JSON:
///
/// ```json
/// {
///   "feature_names": ["has_navbar", "...", "image_count"],
///   "scale": [1.0, "...", 100.0],
///   "axes": { "site_type": { "labels": [], "weights": [[]], "bias": [] } }
/// }
/// ```
///
/// `scale` is optional; each feature is divided by its entry before scoring.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LinearScorer {
    pub feature_names: Vec<String>,
    #[serde(default)]
    pub scale: Vec<f64>,
    pub axes: BTreeMap<LabelAxis, AxisWeights>,
}

impl LinearScorer {
    pub fn from_json(json: &str) -> Result<Self> {
        let scorer: Self = serde_json::from_str(json)?;
        scorer.validate()?;
        Ok(scorer)
    }

    #[instrument(skip_all, fields(path = %path.display()))]
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path).map_err(|e| SiteGenError::io(path, e))?;
        let scorer = Self::from_json(&content)?;
        debug!(axes = scorer.axes.len(), "linear scorer loaded");
        Ok(scorer)
    }

    /// Check the model against the feature schema.
    fn validate(&self) -> Result<()> {
        if self.feature_names != FEATURE_NAMES {
            return Err(SiteGenError::validation(format!(
                "model feature_names {:?} do not match the feature schema {:?}",
                self.feature_names, FEATURE_NAMES
            )));
        }
        let width = FEATURE_NAMES.len();
        if !self.scale.is_empty() && self.scale.len() != width {
            return Err(SiteGenError::validation(format!(
                "scale has {} entries, expected {width}",
                self.scale.len()
            )));
        }
        for (axis, w) in &self.axes {
            let rows = w.labels.len();
            if w.weights.len() != rows || w.bias.len() != rows {
                return Err(SiteGenError::validation(format!(
                    "{}: {rows} labels but {} weight rows and {} biases",
                    axis.as_str(),
                    w.weights.len(),
                    w.bias.len()
                )));
            }
            if let Some(row) = w.weights.iter().find(|row| row.len() != width) {
                return Err(SiteGenError::validation(format!(
                    "{}: weight row has {} columns, expected {width}",
                    axis.as_str(),
                    row.len()
                )));
            }
        }
        Ok(())
    }
}

impl Scorer for LinearScorer {
    fn predict(&self, axis: LabelAxis, features: &[f64]) -> Result<Vec<(String, f64)>> {
        let w = self
            .axes
            .get(&axis)
            .ok_or_else(|| SiteGenError::Scorer(format!("model has no {} axis", axis.as_str())))?;
        if features.len() != self.feature_names.len() {
            return Err(SiteGenError::Scorer(format!(
                "expected {} features, got {}",
                self.feature_names.len(),
                features.len()
            )));
        }

        let scaled: Vec<f64> = features
            .iter()
            .enumerate()
            .map(|(i, x)| match self.scale.get(i) {
                Some(&s) if s != 0.0 => x / s,
                _ => *x,
            })
            .collect();

        let logits: Vec<f64> = w
            .weights
            .iter()
            .zip(&w.bias)
            .map(|(row, b)| row.iter().zip(&scaled).map(|(a, x)| a * x).sum::<f64>() + b)
            .collect();

        let max = logits.iter().copied().fold(f64::NEG_INFINITY, f64::max);
        let exps: Vec<f64> = logits.iter().map(|l| (l - max).exp()).collect();
        let denom: f64 = exps.iter().sum();

        Ok(w.labels
            .iter()
            .cloned()
            .zip(exps.into_iter().map(|e| e / denom))
            .collect())
    }
}
