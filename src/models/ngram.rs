use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use super::{TagId, TagSet};

const FORWARD_MIN_ORDINAL: usize = 3;

/// Shape of an n-gram model: how many preceding tags, and whether the next
/// utterance's tag (the uptake) is part of the context.
///
/// Only the five standard shapes below can be built.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub struct ModelSpec {
    /// Number of preceding tags in the context (1..=3)
    pub(crate) order: usize,
    /// Whether the next utterance's tag is prepended to the context
    pub(crate) forward: bool,
}

impl ModelSpec {
    pub const UNIGRAM: Self = Self::backward(1);
    pub const BIGRAM: Self = Self::backward(2);
    pub const TRIGRAM: Self = Self::backward(3);
    pub const FORWARD_BIGRAM: Self = Self::forward(2);
    pub const FORWARD_TRIGRAM: Self = Self::forward(3);

    const fn backward(order: usize) -> Self {
        Self {
            order,
            forward: false,
        }
    }

    const fn forward(order: usize) -> Self {
        Self {
            order,
            forward: true,
        }
    }

    /// Length of a context key
    pub fn key_len(&self) -> usize {
        self.order + usize::from(self.forward)
    }

    /// Utterances below this ordinal never contribute counts.
    ///
    /// Backward models skip the first `order + 1` ordinals; forward models
    /// start at ordinal 3 whatever their order.
    pub fn min_ordinal(&self) -> usize {
        if self.forward {
            FORWARD_MIN_ORDINAL
        } else {
            self.order + 1
        }
    }

    pub fn name(&self) -> &'static str {
        match (self.forward, self.order) {
            (false, 1) => "uniGram",
            (false, 2) => "biGram",
            (false, _) => "triGram",
            (true, 2) => "forwardBiGram",
            (true, _) => "forwardTriGram",
        }
    }
}

/// Query context for prediction: preceding tags (oldest first) and the
/// uptake tag when the next utterance is known
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Context {
    /// Preceding canonical tags, oldest first; `None` for unrecognized tags
    pub history: Vec<Option<TagId>>,
    /// Tag of the following utterance
    pub uptake: Option<TagId>,
}

impl Context {
    pub fn new(history: Vec<Option<TagId>>, uptake: Option<TagId>) -> Self {
        Self { history, uptake }
    }

    /// Lookup key for a model of the given shape.
    ///
    /// Returns `None` when the history is too short, a needed tag is
    /// unrecognized, or a forward key is requested without an uptake.
    pub fn key(&self, spec: &ModelSpec) -> Option<Vec<TagId>> {
        if self.history.len() < spec.order {
            return None;
        }
        let mut key = Vec::with_capacity(spec.key_len());
        if spec.forward {
            key.push(self.uptake?);
        }
        for tag in &self.history[self.history.len() - spec.order..] {
            key.push((*tag)?);
        }
        Some(key)
    }
}

/// Counts of target tags per context.
///
/// Every (context, target) lookup is defined; unobserved pairs count 0.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FrequencyTable {
    num_tags: usize,
    counts: HashMap<Vec<TagId>, Vec<u64>>,
}

impl FrequencyTable {
    pub fn new(num_tags: usize) -> Self {
        Self {
            num_tags,
            counts: HashMap::new(),
        }
    }

    pub fn increment(&mut self, context: Vec<TagId>, target: TagId) {
        let num_tags = self.num_tags;
        self.counts
            .entry(context)
            .or_insert_with(|| vec![0; num_tags])[target.index()] += 1;
    }

    /// Count of `target` after `context`
    pub fn count(&self, context: &[TagId], target: TagId) -> u64 {
        self.counts
            .get(context)
            .and_then(|row| row.get(target.index()))
            .copied()
            .unwrap_or(0)
    }

    /// Sum of every count in the table
    pub fn total(&self) -> u64 {
        self.counts.values().flatten().sum()
    }

    /// Number of contexts with at least one observation
    pub fn context_count(&self) -> usize {
        self.counts.len()
    }

    /// Add another table's counts into this one
    pub fn merge(&mut self, other: FrequencyTable) {
        let num_tags = self.num_tags;
        for (context, row) in other.counts {
            let target = self
                .counts
                .entry(context)
                .or_insert_with(|| vec![0; num_tags]);
            for (mine, theirs) in target.iter_mut().zip(row) {
                *mine += theirs;
            }
        }
    }

    /// Majority vote per context.
    ///
    /// Targets are scanned in canonical order and only a strictly greater
    /// count replaces the current best, so the earliest tag wins ties.
    pub fn predictions(&self, tags: &TagSet) -> PredictionTable {
        let mut predictions = HashMap::with_capacity(self.counts.len());
        for (context, row) in &self.counts {
            let mut best: Option<(TagId, u64)> = None;
            for tag in tags.ids() {
                let count = row.get(tag.index()).copied().unwrap_or(0);
                if count > best.map_or(0, |(_, c)| c) {
                    best = Some((tag, count));
                }
            }
            if let Some((tag, _)) = best {
                predictions.insert(context.clone(), tag);
            }
        }
        PredictionTable { predictions }
    }
}

/// Majority-vote tag per context; absent contexts have no prediction
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PredictionTable {
    predictions: HashMap<Vec<TagId>, TagId>,
}

impl PredictionTable {
    pub fn get(&self, context: &[TagId]) -> Option<TagId> {
        self.predictions.get(context).copied()
    }

    pub fn is_empty(&self) -> bool {
        self.predictions.is_empty()
    }
}

/// Bookkeeping from a training pass
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TrainingStats {
    /// Utterances that contributed a count
    pub counted: usize,
    /// Utterances skipped for a missing neighbor or unrecognized tag
    pub errors: usize,
}

/// A trained n-gram model
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NgramModel {
    pub spec: ModelSpec,
    pub frequencies: FrequencyTable,
    pub predictions: PredictionTable,
    pub stats: TrainingStats,
}

impl NgramModel {
    /// Predicted tag for a context, or `None` when this model has no answer
    pub fn predict(&self, context: &Context) -> Option<TagId> {
        let key = context.key(&self.spec)?;
        self.predictions.get(&key)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tags() -> TagSet {
        TagSet::new(["Statement", "Question", "Backchannel"])
    }

    #[test]
    fn test_unobserved_counts_are_zero() {
        let tags = tags();
        let s = tags.id("Statement").unwrap();
        let q = tags.id("Question").unwrap();
        let mut table = FrequencyTable::new(tags.len());
        table.increment(vec![s], q);

        assert_eq!(table.count(&[s], q), 1);
        assert_eq!(table.count(&[s], s), 0);
        assert_eq!(table.count(&[q, q, q], s), 0);
        assert_eq!(table.total(), 1);
    }

    #[test]
    fn test_ties_go_to_first_canonical_tag() {
        let tags = tags();
        let s = tags.id("Statement").unwrap();
        let q = tags.id("Question").unwrap();
        let b = tags.id("Backchannel").unwrap();
        let mut table = FrequencyTable::new(tags.len());
        table.increment(vec![b], q);
        table.increment(vec![b], s);
        table.increment(vec![s], b);
        table.increment(vec![s], q);
        table.increment(vec![s], b);

        let predictions = table.predictions(&tags);
        assert_eq!(predictions.get(&[b]), Some(s));
        assert_eq!(predictions.get(&[s]), Some(b));
        assert_eq!(predictions.get(&[q]), None);
    }

    #[test]
    fn test_merge_sums_counts() {
        let tags = tags();
        let s = tags.id("Statement").unwrap();
        let q = tags.id("Question").unwrap();
        let mut left = FrequencyTable::new(tags.len());
        left.increment(vec![s], q);
        let mut right = FrequencyTable::new(tags.len());
        right.increment(vec![s], q);
        right.increment(vec![q], s);

        let mut merged_lr = left.clone();
        merged_lr.merge(right.clone());
        let mut merged_rl = right;
        merged_rl.merge(left);

        assert_eq!(merged_lr, merged_rl);
        assert_eq!(merged_lr.count(&[s], q), 2);
        assert_eq!(merged_lr.total(), 3);
        assert_eq!(merged_lr.context_count(), 2);
    }

    #[test]
    fn test_context_keys() {
        let tags = tags();
        let s = tags.id("Statement").unwrap();
        let q = tags.id("Question").unwrap();
        let b = tags.id("Backchannel").unwrap();
        let context = Context::new(vec![Some(s), Some(q), Some(b)], Some(q));

        assert_eq!(context.key(&ModelSpec::UNIGRAM), Some(vec![b]));
        assert_eq!(context.key(&ModelSpec::BIGRAM), Some(vec![q, b]));
        assert_eq!(context.key(&ModelSpec::FORWARD_TRIGRAM), Some(vec![q, s, q, b]));

        let no_uptake = Context::new(vec![None, Some(q), Some(b)], None);
        assert_eq!(no_uptake.key(&ModelSpec::FORWARD_BIGRAM), None);
        assert_eq!(no_uptake.key(&ModelSpec::TRIGRAM), None);
        assert_eq!(no_uptake.key(&ModelSpec::BIGRAM), Some(vec![q, b]));

        let short = Context::new(vec![Some(s)], None);
        assert_eq!(short.key(&ModelSpec::BIGRAM), None);
    }

    #[test]
    fn test_spec_shapes() {
        assert_eq!(ModelSpec::UNIGRAM.min_ordinal(), 2);
        assert_eq!(ModelSpec::TRIGRAM.min_ordinal(), 4);
        assert_eq!(ModelSpec::FORWARD_BIGRAM.min_ordinal(), 3);
        assert_eq!(ModelSpec::FORWARD_TRIGRAM.min_ordinal(), 3);
        assert_eq!(ModelSpec::TRIGRAM.key_len(), 3);
        assert_eq!(ModelSpec::FORWARD_TRIGRAM.key_len(), 4);
        assert_eq!(ModelSpec::FORWARD_BIGRAM.name(), "forwardBiGram");
        assert_eq!(ModelSpec::FORWARD_TRIGRAM.name(), "forwardTriGram");
    }
}
