use tracing::{debug, info};

use crate::error::LineError;
use crate::models::{Conversation, Corpus, TagMap, Utterance};

use super::normalize_tag;

/// Configuration for transcript parsing
#[derive(Debug, Clone)]
pub struct ParseConfig {
    /// Substring identifying utterance record lines
    pub utterance_marker: String,
}

impl Default for ParseConfig {
    fn default() -> Self {
        Self {
            utterance_marker: " utt".to_string(),
        }
    }
}

/// Raw lines of one transcript
#[derive(Debug, Clone, Default)]
pub struct Transcript {
    /// Source identifier (usually the file path)
    pub id: Option<String>,
    pub lines: Vec<String>,
}

impl Transcript {
    pub fn new(id: Option<String>, lines: Vec<String>) -> Self {
        Self { id, lines }
    }

    /// Split text into a transcript
    pub fn from_text(id: Option<String>, text: &str) -> Self {
        Self::new(id, text.lines().map(str::to_string).collect())
    }
}

/// Fields of a well-formed utterance line, before tag normalization
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UtteranceLine<'a> {
    pub raw_tag: &'a str,
    pub speaker: &'a str,
    pub turn_number: u32,
    pub pair_part: &'a str,
    pub words: &'a str,
}

/// Split `"<raw_tag> <speaker>.<turn> <pair_part>:<words>"` into its fields
pub fn parse_utterance_line(line: &str) -> Result<UtteranceLine<'_>, LineError> {
    let separators = line.matches(':').count();
    let Some((metadata, words)) = line.split_once(':').filter(|_| separators == 1) else {
        return Err(LineError::Separator(separators));
    };

    let fields: Vec<&str> = metadata.split_whitespace().collect();
    let [raw_tag, speaker_turn, pair_part] = fields[..] else {
        return Err(LineError::FieldCount(fields.len()));
    };

    let parts: Vec<&str> = speaker_turn.split('.').collect();
    let [speaker, turn] = parts[..] else {
        return Err(LineError::SpeakerTurn(speaker_turn.to_string()));
    };
    let turn_number = turn
        .parse::<u32>()
        .map_err(|_| LineError::TurnNumber(turn.to_string()))?;

    Ok(UtteranceLine {
        raw_tag,
        speaker,
        turn_number,
        pair_part,
        words: words.trim(),
    })
}

/// Parse one transcript into a conversation.
///
/// Malformed record lines are skipped. Each raw tag is normalized with the
/// canonical tag of the previous successfully parsed utterance as context.
pub fn parse_conversation(transcript: &Transcript, tag_map: &TagMap, config: &ParseConfig) -> Conversation {
    let mut conversation = Conversation::new(transcript.id.clone());
    let mut previous: Option<String> = None;
    let mut skipped = 0usize;

    for (line_number, line) in transcript.lines.iter().enumerate() {
        if !line.contains(&config.utterance_marker) {
            continue;
        }

        let record = match parse_utterance_line(line) {
            Ok(record) => record,
            Err(err) => {
                debug!(line = line_number + 1, "Skipping malformed utterance line: {}", err);
                skipped += 1;
                continue;
            }
        };

        let dialogue_act = normalize_tag(record.raw_tag, tag_map, previous.as_deref());
        previous = dialogue_act.clone();

        conversation.push(Utterance {
            ordinal: 0,
            speaker: record.speaker.to_string(),
            turn_number: record.turn_number,
            raw_tag: record.raw_tag.to_string(),
            dialogue_act,
            pair_part: record.pair_part.to_string(),
            words: record.words.to_string(),
        });
    }

    if skipped > 0 {
        debug!(
            id = transcript.id.as_deref().unwrap_or("<unnamed>"),
            "Skipped {} malformed lines", skipped
        );
    }

    conversation
}

/// Parse every transcript into a corpus, preserving input order
pub fn load_corpus(transcripts: &[Transcript], tag_map: &TagMap, config: &ParseConfig) -> Corpus {
    let conversations: Vec<Conversation> = transcripts
        .iter()
        .map(|t| parse_conversation(t, tag_map, config))
        .collect();
    let corpus = Corpus::new(conversations);

    info!(
        "Loaded {} conversations, {} utterances",
        corpus.conversations.len(),
        corpus.utterance_count()
    );

    corpus
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tag_map() -> TagMap {
        TagMap::from_pairs([
            ("sd", "Statement-non-opinion"),
            ("qy", "Yes-No-Question"),
            ("b", "Acknowledge"),
        ])
    }

    #[test]
    fn test_parse_utterance_line() {
        let record = parse_utterance_line("qy          A.1 utt1: Do you have kids? /").unwrap();

        assert_eq!(record.raw_tag, "qy");
        assert_eq!(record.speaker, "A");
        assert_eq!(record.turn_number, 1);
        assert_eq!(record.pair_part, "utt1");
        assert_eq!(record.words, "Do you have kids? /");
    }

    #[test]
    fn test_parse_utterance_line_errors() {
        assert_eq!(
            parse_utterance_line("sd A.1 utt1 no words"),
            Err(LineError::Separator(0))
        );
        assert_eq!(
            parse_utterance_line("sd A.1 utt1: time: noon"),
            Err(LineError::Separator(2))
        );
        assert_eq!(
            parse_utterance_line("sd A.1 utt1 extra: words"),
            Err(LineError::FieldCount(4))
        );
        assert_eq!(
            parse_utterance_line("sd A1 utt1: words"),
            Err(LineError::SpeakerTurn("A1".to_string()))
        );
        assert_eq!(
            parse_utterance_line("sd A.x utt1: words"),
            Err(LineError::TurnNumber("x".to_string()))
        );
        // Turn numbers are unsigned
        assert_eq!(
            parse_utterance_line("sd A.-1 utt1: words"),
            Err(LineError::TurnNumber("-1".to_string()))
        );
    }

    #[test]
    fn test_parse_conversation() {
        let text = "\
FILENAME:\t4325_1632_1519
============================================================
sd          A.1 utt1: Okay, uh, first, um, /
+           B.2 utt1: and then - /
b           B.2 utt2: Uh-huh. /
qy          A.3 utt1: Do you have kids? /
";
        let transcript = Transcript::from_text(Some("sw_0001".to_string()), text);
        let conversation = parse_conversation(&transcript, &tag_map(), &ParseConfig::default());

        assert_eq!(conversation.id.as_deref(), Some("sw_0001"));
        assert_eq!(conversation.len(), 4);
        let acts: Vec<Option<&str>> = conversation.iter().map(|u| u.dialogue_act.as_deref()).collect();
        assert_eq!(
            acts,
            vec![
                Some("Statement-non-opinion"),
                Some("Statement-non-opinion"),
                Some("Acknowledge"),
                Some("Yes-No-Question"),
            ]
        );
        let second = conversation.get(1).unwrap();
        assert_eq!(second.speaker, "B");
        assert_eq!(second.turn_number, 2);
        assert_eq!(second.raw_tag, "+");
    }

    #[test]
    fn test_malformed_lines_are_skipped_without_gaps() {
        let text = "\
sd          A.1 utt1: Okay. /
sd          A.x utt2: broken turn /
+           B.2 utt1: continued /
";
        let transcript = Transcript::from_text(None, text);
        let conversation = parse_conversation(&transcript, &tag_map(), &ParseConfig::default());

        assert_eq!(conversation.len(), 2);
        assert_eq!(conversation.last_ordinal(), Some(1));
        // The continuation inherits from the last parsed utterance
        assert_eq!(
            conversation.get(1).unwrap().dialogue_act.as_deref(),
            Some("Statement-non-opinion")
        );
    }

    #[test]
    fn test_unrecognized_tag_is_kept_as_none() {
        let text = "\
zz          A.1 utt1: mumble /
+           B.2 utt1: and /
";
        let transcript = Transcript::from_text(None, text);
        let conversation = parse_conversation(&transcript, &tag_map(), &ParseConfig::default());

        assert_eq!(conversation.len(), 2);
        assert_eq!(conversation.get(0).unwrap().dialogue_act, None);
        assert_eq!(conversation.get(1).unwrap().dialogue_act, None);
    }

    #[test]
    fn test_load_corpus_keeps_order() {
        let transcripts = vec![
            Transcript::from_text(Some("a".to_string()), "sd A.1 utt1: one /"),
            Transcript::from_text(Some("b".to_string()), "qy A.1 utt1: two? /"),
        ];
        let corpus = load_corpus(&transcripts, &tag_map(), &ParseConfig::default());

        assert_eq!(corpus.conversations.len(), 2);
        assert_eq!(corpus.conversations[1].id.as_deref(), Some("b"));
        assert_eq!(corpus.utterance_count(), 2);
    }
}
