//! Engine configuration and its validation.
//!
//! Defaults match the FAQ deployment the engine was tuned on: a 1000-term
//! vocabulary of unigrams and bigrams, English stopwords and an acceptance
//! threshold of 0.1.

use crate::error::MatchError;
use crate::tokenizer::Stopwords;
use serde::{Deserialize, Serialize};

pub const DEFAULT_MAX_FEATURES: usize = 1000;
pub const DEFAULT_THRESHOLD: f32 = 0.1;

/// Inclusive window of n-gram lengths, e.g. `(1, 2)` for unigrams and bigrams.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct NgramRange {
    pub min_n: usize,
    pub max_n: usize,
}

impl NgramRange {
    pub const fn new(min_n: usize, max_n: usize) -> Self {
        Self { min_n, max_n }
    }

    pub fn validate(&self) -> Result<(), MatchError> {
        if self.min_n == 0 {
            return Err(MatchError::InvalidConfiguration("ngram_range min_n must be at least 1".into()));
        }
        if self.min_n > self.max_n {
            return Err(MatchError::InvalidConfiguration(format!(
                "ngram_range ({}, {}) is empty",
                self.min_n, self.max_n
            )));
        }
        Ok(())
    }
}

impl Default for NgramRange {
    fn default() -> Self {
        Self::new(1, 2)
    }
}

/// Acceptance threshold: a match is accepted only when its score is strictly greater.
/// Always finite and non-negative.
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd, Serialize, Deserialize)]
#[serde(try_from = "f32", into = "f32")]
pub struct Threshold(f32);

impl Threshold {
    pub fn new(value: f32) -> Result<Self, MatchError> {
        if !value.is_finite() || value < 0.0 {
            return Err(MatchError::InvalidConfiguration(format!(
                "threshold must be a non-negative finite number, got {value}"
            )));
        }
        Ok(Self(value))
    }

    pub fn value(self) -> f32 {
        self.0
    }
}

impl Default for Threshold {
    fn default() -> Self {
        Self(DEFAULT_THRESHOLD)
    }
}

impl TryFrom<f32> for Threshold {
    type Error = MatchError;
    fn try_from(value: f32) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<Threshold> for f32 {
    fn from(t: Threshold) -> Self {
        t.0
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Upper bound on vocabulary size.
    pub max_features: usize,
    pub ngram_range: NgramRange,
    pub stopwords: Stopwords,
    /// Threshold used by [`crate::Engine::answer`].
    pub threshold: Threshold,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            max_features: DEFAULT_MAX_FEATURES,
            ngram_range: NgramRange::default(),
            stopwords: Stopwords::english(),
            threshold: Threshold::default(),
        }
    }
}

impl EngineConfig {
    pub fn validate(&self) -> Result<(), MatchError> {
        if self.max_features == 0 {
            return Err(MatchError::InvalidConfiguration("max_features must be positive".into()));
        }
        self.ngram_range.validate()
    }
}
