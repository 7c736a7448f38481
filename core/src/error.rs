use std::path::PathBuf;
use thiserror::Error;

/// Failures that stop an engine from being built.
///
/// Per-query problems (empty text, unknown words) are never errors; they
/// resolve to a rejected [`crate::MatchResult`] instead.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum MatchError {
    #[error("corpus contains no documents")]
    EmptyCorpus,
    #[error("every document normalizes to an empty term set; vocabulary would be empty")]
    DegenerateVocabulary,
    #[error("invalid configuration: {0}")]
    InvalidConfiguration(String),
}

/// Failures while reading question/answer pairs from disk.
#[derive(Debug, Error)]
pub enum CorpusError {
    #[error("failed to read corpus: {0}")]
    Io(#[from] std::io::Error),
    #[error("malformed JSON in {path}: {source}")]
    Json {
        path: String,
        #[source]
        source: serde_json::Error,
    },
    #[error("no .json or .jsonl input found at {}", .0.display())]
    NoInput(PathBuf),
}
