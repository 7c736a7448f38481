use crate::config::{EngineConfig, Threshold};
use crate::error::MatchError;
use crate::index::{build, DocId, Document, SparseVector, Vocabulary, WeightMatrix};
use crate::ranker::{self, MatchResult};
use crate::stats::CorpusStats;
use crate::tokenizer::normalize;
use crate::vectorizer::vectorize;

/// A query after normalization and projection. Never stored by the engine.
#[derive(Debug, Clone, PartialEq)]
pub struct Query {
    pub raw_text: String,
    pub tokens: Vec<String>,
    pub vector: SparseVector,
}

/// A built matching engine over one corpus snapshot.
///
/// Everything is fixed at construction, so `&Engine` can be shared across
/// threads (e.g. behind an `Arc`) and queried concurrently without locks.
#[derive(Debug, Clone)]
pub struct Engine {
    config: EngineConfig,
    documents: Vec<Document>,
    vocabulary: Vocabulary,
    matrix: WeightMatrix,
}

impl Engine {
    /// Normalize the corpus and build the index. Either the whole index is
    /// built or an error is returned.
    pub fn initialize<I, Q, A>(corpus: I, config: EngineConfig) -> Result<Self, MatchError>
    where
        I: IntoIterator<Item = (Q, A)>,
        Q: Into<String>,
        A: Into<String>,
    {
        config.validate()?;
        let documents: Vec<Document> = corpus
            .into_iter()
            .enumerate()
            .map(|(i, (q, a))| {
                let question = q.into();
                let tokens = normalize(&question, &config.stopwords);
                Document { id: i as DocId, question, answer: a.into(), tokens }
            })
            .collect();
        let (vocabulary, matrix) = build(&documents, config.max_features, config.ngram_range)?;
        Ok(Self { config, documents, vocabulary, matrix })
    }

    /// Answer with the configured threshold.
    pub fn answer(&self, query: &str) -> MatchResult {
        self.answer_with_threshold(query, self.config.threshold)
    }

    pub fn answer_with_threshold(&self, query: &str, threshold: Threshold) -> MatchResult {
        self.resolve(&self.query(query), threshold)
    }

    /// Rank an already vectorized query.
    pub fn resolve(&self, q: &Query, threshold: Threshold) -> MatchResult {
        let result = ranker::resolve(&q.vector, &self.matrix, &self.documents, threshold);
        tracing::debug!(
            query = %q.raw_text,
            terms = q.vector.entries().len(),
            score = result.score,
            doc_id = ?result.matched_document_id,
            accepted = result.is_accepted(),
            "answered query"
        );
        result
    }

    /// Normalize and vectorize `text` without ranking it.
    pub fn query(&self, text: &str) -> Query {
        let tokens = normalize(text, &self.config.stopwords);
        let vector = vectorize(&tokens, &self.vocabulary);
        Query { raw_text: text.to_string(), tokens, vector }
    }

    pub fn document(&self, id: DocId) -> Option<&Document> {
        self.documents.get(id as usize)
    }

    /// Vocabulary terms the query shares with document `id`, in term id order.
    pub fn shared_terms(&self, q: &Query, id: DocId) -> Vec<&str> {
        let Some(row) = self.matrix.row(id) else {
            return Vec::new();
        };
        let in_row: Vec<_> = row.entries().iter().map(|w| w.term_id).collect();
        q.vector
            .entries()
            .iter()
            .filter(|w| in_row.binary_search(&w.term_id).is_ok())
            .filter_map(|w| self.vocabulary.term(w.term_id))
            .collect()
    }

    /// The first `n` questions in corpus order.
    pub fn sample_questions(&self, n: usize) -> impl Iterator<Item = &str> {
        self.documents.iter().take(n).map(|d| d.question.as_str())
    }

    pub fn stats(&self) -> CorpusStats {
        CorpusStats::compute(&self.documents)
    }

    pub fn vocabulary(&self) -> &Vocabulary {
        &self.vocabulary
    }

    pub fn matrix(&self) -> &WeightMatrix {
        &self.matrix
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    pub fn len(&self) -> usize {
        self.documents.len()
    }

    pub fn is_empty(&self) -> bool {
        self.documents.is_empty()
    }
}
