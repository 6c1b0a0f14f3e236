use tracing::{debug, info};

use crate::models::{
    Conversation, Corpus, FrequencyTable, ModelSpec, NgramModel, TagId, TagSet, TrainingStats,
};

/// The five standard models, trained from one corpus
#[derive(Debug, Clone, Default)]
pub struct ModelFamily {
    pub unigram: Option<NgramModel>,
    pub bigram: Option<NgramModel>,
    pub trigram: Option<NgramModel>,
    pub forward_bigram: Option<NgramModel>,
    pub forward_trigram: Option<NgramModel>,
}

impl ModelFamily {
    /// Model trained for a given shape, if the family has one
    pub fn get(&self, spec: &ModelSpec) -> Option<&NgramModel> {
        self.models().find(|m| m.spec == *spec)
    }

    /// Trained models, lowest order first
    pub fn models(&self) -> impl Iterator<Item = &NgramModel> {
        [
            &self.unigram,
            &self.bigram,
            &self.trigram,
            &self.forward_bigram,
            &self.forward_trigram,
        ]
        .into_iter()
        .flatten()
    }
}

/// Train a single n-gram model.
///
/// Every utterance at or beyond `spec.min_ordinal()` contributes one count at
/// (context, own tag) when all of its neighbors exist and carry a canonical
/// tag; otherwise it is counted in `stats.errors`. Conversations are counted
/// separately and merged, so the result does not depend on their order.
pub fn build_model(corpus: &Corpus, spec: ModelSpec, tags: &TagSet) -> NgramModel {
    let (frequencies, stats) = corpus
        .iter()
        .map(|conversation| count_conversation(conversation, &spec, tags))
        .fold(
            (FrequencyTable::new(tags.len()), TrainingStats::default()),
            |(mut table, mut stats), (partial, partial_stats)| {
                table.merge(partial);
                stats.counted += partial_stats.counted;
                stats.errors += partial_stats.errors;
                (table, stats)
            },
        );

    let predictions = frequencies.predictions(tags);

    info!(
        "Trained {} on {} utterances ({} errors, {} contexts)",
        spec.name(),
        stats.counted,
        stats.errors,
        frequencies.context_count()
    );

    NgramModel {
        spec,
        frequencies,
        predictions,
        stats,
    }
}

/// Train the unigram, bigram, trigram and both forward models
pub fn train_family(corpus: &Corpus, tags: &TagSet) -> ModelFamily {
    ModelFamily {
        unigram: Some(build_model(corpus, ModelSpec::UNIGRAM, tags)),
        bigram: Some(build_model(corpus, ModelSpec::BIGRAM, tags)),
        trigram: Some(build_model(corpus, ModelSpec::TRIGRAM, tags)),
        forward_bigram: Some(build_model(corpus, ModelSpec::FORWARD_BIGRAM, tags)),
        forward_trigram: Some(build_model(corpus, ModelSpec::FORWARD_TRIGRAM, tags)),
    }
}

fn count_conversation(
    conversation: &Conversation,
    spec: &ModelSpec,
    tags: &TagSet,
) -> (FrequencyTable, TrainingStats) {
    let mut table = FrequencyTable::new(tags.len());
    let mut stats = TrainingStats::default();

    for utterance in conversation.iter() {
        if utterance.ordinal < spec.min_ordinal() {
            continue;
        }
        match training_example(conversation, utterance.ordinal, spec, tags) {
            Some((context, target)) => {
                table.increment(context, target);
                stats.counted += 1;
            }
            None => {
                debug!(
                    id = conversation.id.as_deref().unwrap_or("<unnamed>"),
                    ordinal = utterance.ordinal,
                    "No usable {} context",
                    spec.name()
                );
                stats.errors += 1;
            }
        }
    }

    (table, stats)
}

/// Context key and target tag for the utterance at `ordinal`
fn training_example(
    conversation: &Conversation,
    ordinal: usize,
    spec: &ModelSpec,
    tags: &TagSet,
) -> Option<(Vec<TagId>, TagId)> {
    let tag_at = |ordinal: usize| -> Option<TagId> {
        let act = conversation.get(ordinal)?.dialogue_act.as_deref()?;
        tags.id(act)
    };

    let target = tag_at(ordinal)?;
    let mut context = Vec::with_capacity(spec.key_len());
    if spec.forward {
        context.push(tag_at(ordinal + 1)?);
    }
    for back in (1..=spec.order).rev() {
        context.push(tag_at(ordinal.checked_sub(back)?)?);
    }

    Some((context, target))
}
