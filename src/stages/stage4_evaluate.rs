use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::models::{Context, Conversation, Corpus, TagSet, Utterance};

use super::Predictor;

/// Configuration for evaluation
#[derive(Debug, Clone)]
pub struct EvaluationConfig {
    /// Number of preceding utterances in each query context; utterances
    /// with a lower ordinal are not scored
    pub history_len: usize,
}

impl Default for EvaluationConfig {
    fn default() -> Self {
        Self { history_len: 3 }
    }
}

/// Outcome of scoring a predictor on held-out conversations
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct EvaluationResult {
    /// Predictions equal to the annotated act
    pub correct: usize,
    /// Utterances scored
    pub total: usize,
    /// Utterances skipped for a missing neighbor
    pub errors: usize,
}

impl EvaluationResult {
    /// `correct / total`, or `None` when nothing was scored
    pub fn accuracy(&self) -> Option<f64> {
        if self.total == 0 {
            None
        } else {
            Some(self.correct as f64 / self.total as f64)
        }
    }
}

/// Score a predictor on every conversation of a corpus.
///
/// The first `history_len` ordinals and the last utterance of each
/// conversation are not scored. An utterance whose preceding or following
/// neighbor is missing counts as an error and is not part of `total`.
pub fn evaluate<P: Predictor + ?Sized>(
    corpus: &Corpus,
    predictor: &P,
    tags: &TagSet,
    config: &EvaluationConfig,
) -> EvaluationResult {
    let mut result = EvaluationResult::default();

    for conversation in corpus.iter() {
        let Some(last) = conversation.last_ordinal() else {
            continue;
        };

        for utterance in conversation.iter() {
            if utterance.ordinal < config.history_len || utterance.ordinal == last {
                continue;
            }

            let Some(context) = query_context(conversation, utterance.ordinal, tags, config.history_len)
            else {
                debug!(
                    id = conversation.id.as_deref().unwrap_or("<unnamed>"),
                    ordinal = utterance.ordinal,
                    "Missing neighbor, not scored"
                );
                result.errors += 1;
                continue;
            };

            result.total += 1;
            let predicted = predictor.predict(&context);
            if utterance.dialogue_act.as_deref() == Some(predicted) {
                result.correct += 1;
            }
        }
    }

    result
}

/// Preceding tags and uptake for the utterance at `ordinal`, or `None` when a
/// neighbor is missing
fn query_context(
    conversation: &Conversation,
    ordinal: usize,
    tags: &TagSet,
    history_len: usize,
) -> Option<Context> {
    let tag_of = |utterance: &Utterance| utterance.dialogue_act.as_deref().and_then(|a| tags.id(a));

    let mut history = Vec::with_capacity(history_len);
    for back in (1..=history_len).rev() {
        history.push(tag_of(conversation.get(ordinal.checked_sub(back)?)?));
    }
    let uptake = tag_of(conversation.get(ordinal + 1)?);

    Some(Context::new(history, uptake))
}
