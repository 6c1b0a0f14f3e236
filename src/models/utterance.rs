use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use super::TagSet;

/// A single utterance record from a transcript
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Utterance {
    /// Position within the conversation
    pub ordinal: usize,
    /// Speaker label (e.g. "A" or "B")
    pub speaker: String,
    /// Turn number from the `speaker.turn` field
    pub turn_number: u32,
    /// Label as written by the annotators
    pub raw_tag: String,
    /// Canonical dialogue act, `None` when normalization failed
    pub dialogue_act: Option<String>,
    /// Adjacency pair marker (e.g. "utt1")
    pub pair_part: String,
    /// Transcribed words
    pub words: String,
}

#[cfg(test)]
impl Utterance {
    /// Utterance carrying only a dialogue act, for building synthetic conversations
    pub(crate) fn with_act(ordinal: usize, dialogue_act: Option<&str>) -> Self {
        Self {
            ordinal,
            speaker: if ordinal % 2 == 0 { "A" } else { "B" }.to_string(),
            turn_number: u32::try_from(ordinal + 1).unwrap(),
            raw_tag: dialogue_act.unwrap_or_default().to_string(),
            dialogue_act: dialogue_act.map(str::to_string),
            pair_part: String::new(),
            words: String::new(),
        }
    }
}

/// Utterances of one transcript keyed by ordinal.
///
/// Ordinals can have gaps; a missing ordinal is an absent neighbor.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Conversation {
    /// Source identifier (usually the transcript path)
    pub id: Option<String>,
    utterances: BTreeMap<usize, Utterance>,
}

impl Conversation {
    pub fn new(id: Option<String>) -> Self {
        Self {
            id,
            utterances: BTreeMap::new(),
        }
    }

    /// Build from utterances, keyed by their own ordinals
    pub fn from_utterances(id: Option<String>, utterances: impl IntoIterator<Item = Utterance>) -> Self {
        Self {
            id,
            utterances: utterances.into_iter().map(|u| (u.ordinal, u)).collect(),
        }
    }

    /// Append an utterance at the next sequential ordinal
    pub(crate) fn push(&mut self, mut utterance: Utterance) {
        let ordinal = self.next_ordinal();
        utterance.ordinal = ordinal;
        self.utterances.insert(ordinal, utterance);
    }

    fn next_ordinal(&self) -> usize {
        self.last_ordinal().map(|o| o + 1).unwrap_or(0)
    }

    /// Get an utterance by ordinal
    pub fn get(&self, ordinal: usize) -> Option<&Utterance> {
        self.utterances.get(&ordinal)
    }

    /// Highest ordinal present
    pub fn last_ordinal(&self) -> Option<usize> {
        self.utterances.keys().next_back().copied()
    }

    /// Utterances in ordinal order
    pub fn iter(&self) -> impl Iterator<Item = &Utterance> {
        self.utterances.values()
    }

    pub fn len(&self) -> usize {
        self.utterances.len()
    }

    pub fn is_empty(&self) -> bool {
        self.utterances.is_empty()
    }
}

#[cfg(test)]
impl Conversation {
    /// Build a contiguous conversation from a sequence of dialogue acts
    pub(crate) fn from_acts(id: Option<String>, acts: &[&str]) -> Self {
        Self::from_utterances(
            id,
            acts.iter()
                .enumerate()
                .map(|(ordinal, act)| Utterance::with_act(ordinal, Some(*act))),
        )
    }
}

/// All conversations of a training or testing partition
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Corpus {
    pub conversations: Vec<Conversation>,
}

impl Corpus {
    pub fn new(conversations: Vec<Conversation>) -> Self {
        Self { conversations }
    }

    pub fn iter(&self) -> impl Iterator<Item = &Conversation> {
        self.conversations.iter()
    }

    /// Total number of utterances over all conversations
    pub fn utterance_count(&self) -> usize {
        self.conversations.iter().map(Conversation::len).sum()
    }

    /// Relative frequency of every canonical tag, in canonical order.
    ///
    /// Utterances without a canonical tag are not part of the denominator.
    pub fn tag_distribution(&self, tags: &TagSet) -> Vec<(String, f64)> {
        let mut counts = vec![0u64; tags.len()];
        for utterance in self.conversations.iter().flat_map(Conversation::iter) {
            if let Some(id) = utterance.dialogue_act.as_deref().and_then(|a| tags.id(a)) {
                counts[id.index()] += 1;
            }
        }

        let total: u64 = counts.iter().sum();
        tags.names()
            .zip(counts)
            .map(|(name, count)| {
                let share = if total > 0 {
                    count as f64 / total as f64
                } else {
                    0.0
                };
                (name.to_string(), share)
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_push_assigns_sequential_ordinals() {
        let mut conversation = Conversation::new(None);
        conversation.push(Utterance::with_act(42, Some("Statement")));
        conversation.push(Utterance::with_act(7, Some("Question")));

        assert_eq!(conversation.len(), 2);
        assert_eq!(conversation.get(0).unwrap().dialogue_act.as_deref(), Some("Statement"));
        assert_eq!(conversation.get(1).unwrap().ordinal, 1);
        assert_eq!(conversation.last_ordinal(), Some(1));
        assert_eq!(conversation.get(1).unwrap().turn_number, 8);
    }

    #[test]
    fn test_gaps_are_absent() {
        let conversation = Conversation::from_utterances(
            None,
            [0, 1, 3].map(|o| Utterance::with_act(o, Some("Statement"))),
        );

        assert!(conversation.get(2).is_none());
        assert_eq!(conversation.last_ordinal(), Some(3));
        assert_eq!(conversation.len(), 3);
    }

    #[test]
    fn test_tag_distribution() {
        let tags = TagSet::new(["Statement", "Question", "Backchannel"]);
        let mut conversation = Conversation::from_acts(None, &["Statement", "Question", "Statement"]);
        conversation.push(Utterance::with_act(0, None));
        let corpus = Corpus::new(vec![conversation, Conversation::from_acts(None, &["Statement"])]);

        let distribution = corpus.tag_distribution(&tags);
        assert_eq!(distribution[0], ("Statement".to_string(), 0.75));
        assert_eq!(distribution[1], ("Question".to_string(), 0.25));
        assert_eq!(distribution[2], ("Backchannel".to_string(), 0.0));
        assert_eq!(corpus.utterance_count(), 5);
    }

    #[test]
    fn test_tag_distribution_of_empty_corpus() {
        let tags = TagSet::new(["Statement"]);
        let distribution = Corpus::default().tag_distribution(&tags);
        assert_eq!(distribution, vec![("Statement".to_string(), 0.0)]);
    }
}
