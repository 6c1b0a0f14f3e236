use std::path::PathBuf;

/// Errors raised while loading the raw-to-canonical tag map
#[derive(thiserror::Error, Debug)]
pub enum TagMapError {
    #[error("Failed to read tag map {path:?}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("Tag map is not valid JSON: {0}")]
    Json(#[from] serde_json::Error),
    #[error("Tag map must be a JSON object of raw tag -> canonical tag")]
    NotAnObject,
    #[error("Canonical tag for raw tag {0:?} is not a string")]
    NonStringValue(String),
    #[error("Tag map contains no entries")]
    Empty,
}

/// Reasons a transcript line is not a well-formed utterance record
#[derive(thiserror::Error, Debug, PartialEq, Eq)]
pub enum LineError {
    #[error("expected exactly one ':' between metadata and words, found {0}")]
    Separator(usize),
    #[error("expected 3 metadata fields, found {0}")]
    FieldCount(usize),
    #[error("speaker field {0:?} is not of the form speaker.turn")]
    SpeakerTurn(String),
    #[error("turn number {0:?} is not a non-negative integer")]
    TurnNumber(String),
}
