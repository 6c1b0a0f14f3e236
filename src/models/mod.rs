pub mod ngram;
pub mod tag_map;
pub mod utterance;

pub use ngram::*;
pub use tag_map::*;
pub use utterance::*;
