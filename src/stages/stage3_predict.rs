use serde::{Deserialize, Serialize};

use crate::models::{Context, ModelSpec, NgramModel, TagSet};

use super::ModelFamily;

/// Fallback when no model answers: the corpus's most frequent act
pub const DEFAULT_TAG: &str = "Statement-non-opinion";

/// Backoff order over the full model family
pub const BACKOFF_CHAIN: [ModelSpec; 5] = [
    ModelSpec::FORWARD_TRIGRAM,
    ModelSpec::FORWARD_BIGRAM,
    ModelSpec::TRIGRAM,
    ModelSpec::BIGRAM,
    ModelSpec::UNIGRAM,
];

/// Something that picks a dialogue act for a context
pub trait Predictor {
    fn predict(&self, context: &Context) -> &str;
}

/// Model variants reported by an experiment.
///
/// Each variant uses its own model and backs off through the lower backward
/// models.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum ModelVariant {
    UniGram,
    BiGram,
    TriGram,
    ForwardBiGram,
    ForwardTriGram,
}

impl ModelVariant {
    pub const ALL: [ModelVariant; 5] = [
        ModelVariant::UniGram,
        ModelVariant::BiGram,
        ModelVariant::TriGram,
        ModelVariant::ForwardBiGram,
        ModelVariant::ForwardTriGram,
    ];

    /// The variant's own model
    pub fn spec(&self) -> ModelSpec {
        match self {
            ModelVariant::UniGram => ModelSpec::UNIGRAM,
            ModelVariant::BiGram => ModelSpec::BIGRAM,
            ModelVariant::TriGram => ModelSpec::TRIGRAM,
            ModelVariant::ForwardBiGram => ModelSpec::FORWARD_BIGRAM,
            ModelVariant::ForwardTriGram => ModelSpec::FORWARD_TRIGRAM,
        }
    }

    /// Whether a model takes part in this variant's backoff chain
    pub fn includes(&self, spec: &ModelSpec) -> bool {
        let own = self.spec();
        if *spec == own {
            return true;
        }
        if spec.forward {
            own.forward && spec.order < own.order
        } else {
            own.forward || spec.order < own.order
        }
    }

    pub fn name(&self) -> &'static str {
        self.spec().name()
    }
}

/// Majority-vote predictor with ordered backoff.
///
/// Levels are tried forward-trigram, forward-bigram, trigram, bigram,
/// unigram; the first level with a prediction wins. Forward levels answer
/// only when the context carries an uptake tag. When every level is silent
/// the default tag is returned.
#[derive(Debug, Clone)]
pub struct BackoffPredictor<'a> {
    levels: Vec<&'a NgramModel>,
    tags: &'a TagSet,
    default_tag: String,
}

impl<'a> BackoffPredictor<'a> {
    /// Predictor over every model present in the family
    pub fn new(family: &'a ModelFamily, tags: &'a TagSet, default_tag: impl Into<String>) -> Self {
        let levels = BACKOFF_CHAIN
            .iter()
            .filter_map(|spec| family.get(spec))
            .collect();
        Self {
            levels,
            tags,
            default_tag: default_tag.into(),
        }
    }

    /// Predictor restricted to one variant's chain
    pub fn for_variant(
        family: &'a ModelFamily,
        variant: ModelVariant,
        tags: &'a TagSet,
        default_tag: impl Into<String>,
    ) -> Self {
        let levels = BACKOFF_CHAIN
            .iter()
            .filter(|spec| variant.includes(spec))
            .filter_map(|spec| family.get(spec))
            .collect();
        Self {
            levels,
            tags,
            default_tag: default_tag.into(),
        }
    }

    /// Shapes of the models consulted, in order
    pub fn chain(&self) -> Vec<ModelSpec> {
        self.levels.iter().map(|m| m.spec).collect()
    }
}

impl Predictor for BackoffPredictor<'_> {
    fn predict(&self, context: &Context) -> &str {
        self.levels
            .iter()
            .find_map(|model| model.predict(context))
            .map(|tag| self.tags.name(tag))
            .unwrap_or(self.default_tag.as_str())
    }
}
