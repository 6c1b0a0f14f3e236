pub mod error;
pub mod io;
pub mod models;
pub mod stages;

pub use error::{LineError, TagMapError};
pub use io::{
    copy_split, list_transcript_files, load_corpus_from_dir, load_corpus_from_files, partition,
    read_transcript, ExperimentReport, HumanReport, Split, SplitConfig,
};
pub use models::{
    Context, Conversation, Corpus, FrequencyTable, ModelSpec, NgramModel, PredictionTable, TagId,
    TagMap, TagSet, TrainingStats, Utterance,
};
pub use stages::{
    build_model, evaluate, load_corpus, normalize_tag, parse_conversation, run_experiment,
    train_family, write_report, BackoffPredictor, EvaluationConfig, EvaluationResult,
    ExperimentConfig, ModelFamily, ModelVariant, ParseConfig, Predictor, Transcript, DEFAULT_TAG,
};
