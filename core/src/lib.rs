//! TF-IDF question matching over a fixed FAQ corpus.
//!
//! Build an [`Engine`] once from `(question, answer)` pairs, then call
//! [`Engine::answer`] for each incoming question.

pub mod config;
pub mod corpus;
pub mod engine;
pub mod error;
pub mod index;
pub mod ranker;
pub mod stats;
pub mod tokenizer;
pub mod vectorizer;

pub use config::{EngineConfig, NgramRange, Threshold};
pub use engine::{Engine, Query};
pub use error::{CorpusError, MatchError};
pub use index::{DocId, Document, SparseVector, TermId, Vocabulary, WeightMatrix};
pub use ranker::{Confidence, MatchResult};
pub use stats::CorpusStats;
pub use tokenizer::{normalize, Stopwords};
