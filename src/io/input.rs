use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use tracing::info;

use crate::models::{Corpus, TagMap};
use crate::stages::{load_corpus, ParseConfig, Transcript};

/// Every regular file below `dir`, sorted by path
pub fn list_transcript_files(dir: &Path) -> Result<Vec<PathBuf>> {
    let mut files = Vec::new();
    collect_files(dir, &mut files)?;
    files.sort();
    Ok(files)
}

fn collect_files(dir: &Path, files: &mut Vec<PathBuf>) -> Result<()> {
    let entries =
        std::fs::read_dir(dir).with_context(|| format!("Failed to read directory: {:?}", dir))?;
    for entry in entries {
        let path = entry
            .with_context(|| format!("Failed to read directory entry in {:?}", dir))?
            .path();
        if path.is_dir() {
            collect_files(&path, files)?;
        } else {
            files.push(path);
        }
    }
    Ok(())
}

/// Read a transcript file, using its path as the conversation id
pub fn read_transcript(path: &Path) -> Result<Transcript> {
    let content =
        std::fs::read_to_string(path).with_context(|| format!("Failed to read file: {:?}", path))?;
    Ok(Transcript::from_text(Some(path.display().to_string()), &content))
}

/// Parse every transcript below `dir` into a corpus
pub fn load_corpus_from_dir(dir: &Path, tag_map: &TagMap, config: &ParseConfig) -> Result<Corpus> {
    let files = list_transcript_files(dir)?;
    info!("Reading {} transcripts from {:?}", files.len(), dir);
    load_corpus_from_files(&files, tag_map, config)
}

/// Parse the given transcript files into a corpus, in order
pub fn load_corpus_from_files(files: &[PathBuf], tag_map: &TagMap, config: &ParseConfig) -> Result<Corpus> {
    let transcripts = files
        .iter()
        .map(|path| read_transcript(path))
        .collect::<Result<Vec<_>>>()?;
    Ok(load_corpus(&transcripts, tag_map, config))
}
