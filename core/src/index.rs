use crate::config::NgramRange;
use crate::error::MatchError;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap, HashSet};

pub type TermId = u32;
pub type DocId = u32;

/// One question/answer pair. `id` is the position in the corpus.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Document {
    pub id: DocId,
    pub question: String,
    pub answer: String,
    pub tokens: Vec<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Weight {
    pub term_id: TermId,
    pub weight: f32, // normalized tf-idf weight
}

/// Sparse vector over the vocabulary, entries sorted by term id.
/// An empty vector is the zero vector.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SparseVector {
    entries: Vec<Weight>,
}

impl SparseVector {
    /// Build from raw counts, weighting by idf and scaling to unit length.
    pub(crate) fn from_counts(counts: BTreeMap<TermId, u32>, vocabulary: &Vocabulary) -> Self {
        let mut entries: Vec<Weight> = counts
            .into_iter()
            .map(|(term_id, tf)| Weight { term_id, weight: tf as f32 * vocabulary.idf(term_id) })
            .collect();
        let norm = entries.iter().map(|w| w.weight * w.weight).sum::<f32>().sqrt();
        if norm > 0.0 {
            for w in entries.iter_mut() {
                w.weight /= norm;
            }
        } else {
            entries.clear();
        }
        Self { entries }
    }

    pub fn entries(&self) -> &[Weight] {
        &self.entries
    }

    pub fn is_zero(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn norm(&self) -> f32 {
        self.entries.iter().map(|w| w.weight * w.weight).sum::<f32>().sqrt()
    }

    /// Dense form of length `dims`.
    pub fn to_dense(&self, dims: usize) -> Vec<f32> {
        let mut out = vec![0.0; dims];
        for w in &self.entries {
            if let Some(slot) = out.get_mut(w.term_id as usize) {
                *slot = w.weight;
            }
        }
        out
    }

    /// Dot product by merging the two sorted entry lists.
    pub fn dot(&self, other: &SparseVector) -> f32 {
        let (a, b) = (&self.entries, &other.entries);
        let (mut i, mut j) = (0, 0);
        let mut sum = 0.0f32;
        while i < a.len() && j < b.len() {
            match a[i].term_id.cmp(&b[j].term_id) {
                std::cmp::Ordering::Less => i += 1,
                std::cmp::Ordering::Greater => j += 1,
                std::cmp::Ordering::Equal => {
                    sum += a[i].weight * b[j].weight;
                    i += 1;
                    j += 1;
                }
            }
        }
        sum
    }
}

/// Term dictionary with document frequencies and smoothed idf weights.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Vocabulary {
    pub dictionary: HashMap<String, TermId>,
    pub terms: Vec<String>,
    pub df: Vec<u32>,
    pub idf: Vec<f32>,
    pub ngram_range: NgramRange,
    pub num_docs: u32,
}

impl Vocabulary {
    pub fn get(&self, term: &str) -> Option<TermId> {
        self.dictionary.get(term).copied()
    }

    pub fn term(&self, term_id: TermId) -> Option<&str> {
        self.terms.get(term_id as usize).map(String::as_str)
    }

    pub fn idf(&self, term_id: TermId) -> f32 {
        self.idf.get(term_id as usize).copied().unwrap_or(0.0)
    }

    pub fn len(&self) -> usize {
        self.terms.len()
    }

    pub fn is_empty(&self) -> bool {
        self.terms.is_empty()
    }

    /// Count the in-vocabulary n-grams of `tokens`; unknown n-grams are dropped.
    pub(crate) fn count_terms(&self, tokens: &[String]) -> BTreeMap<TermId, u32> {
        let mut counts = BTreeMap::new();
        for gram in ngrams(tokens, self.ngram_range) {
            if let Some(tid) = self.get(&gram) {
                *counts.entry(tid).or_insert(0) += 1;
            }
        }
        counts
    }
}

/// One unit-length row per document, indexed by `DocId`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct WeightMatrix {
    pub rows: Vec<SparseVector>,
}

impl WeightMatrix {
    pub fn row(&self, doc_id: DocId) -> Option<&SparseVector> {
        self.rows.get(doc_id as usize)
    }

    pub fn num_docs(&self) -> usize {
        self.rows.len()
    }
}

/// Contiguous n-grams of every length in `range`, shortest first, joined by a space.
pub fn ngrams(tokens: &[String], range: NgramRange) -> Vec<String> {
    let mut out = Vec::new();
    for n in range.min_n..=range.max_n {
        if n == 0 || n > tokens.len() {
            continue;
        }
        out.extend(tokens.windows(n).map(|w| w.join(" ")));
    }
    out
}

/// Smoothed idf: `ln((1 + N) / (1 + df)) + 1`, always positive.
pub fn smoothed_idf(num_docs: u32, df: u32) -> f32 {
    ((1.0 + num_docs as f64) / (1.0 + df as f64)).ln() as f32 + 1.0
}

/// Build the vocabulary and the tf-idf weight matrix from normalized documents.
pub fn build(documents: &[Document], max_features: usize, ngram_range: NgramRange) -> Result<(Vocabulary, WeightMatrix), MatchError> {
    if documents.is_empty() {
        return Err(MatchError::EmptyCorpus);
    }
    if documents.iter().all(|d| d.tokens.is_empty()) {
        return Err(MatchError::DegenerateVocabulary);
    }

    // Candidate terms in first-seen order with their document frequency
    let mut candidates: Vec<(String, u32)> = Vec::new();
    let mut candidate_ids: HashMap<String, usize> = HashMap::new();
    for doc in documents {
        let mut seen_in_doc: HashSet<usize> = HashSet::new();
        for gram in ngrams(&doc.tokens, ngram_range) {
            let idx = match candidate_ids.get(&gram) {
                Some(&idx) => idx,
                None => {
                    let idx = candidates.len();
                    candidate_ids.insert(gram.clone(), idx);
                    candidates.push((gram, 0));
                    idx
                }
            };
            if seen_in_doc.insert(idx) {
                candidates[idx].1 += 1;
            }
        }
    }
    if candidates.is_empty() {
        return Err(MatchError::DegenerateVocabulary);
    }

    // Highest df first; the stable sort keeps first-seen order among equals.
    let mut ranked: Vec<usize> = (0..candidates.len()).collect();
    ranked.sort_by(|a, b| candidates[*b].1.cmp(&candidates[*a].1));
    ranked.truncate(max_features);

    let num_docs = documents.len() as u32;
    let mut dictionary = HashMap::with_capacity(ranked.len());
    let mut terms = Vec::with_capacity(ranked.len());
    let mut df = Vec::with_capacity(ranked.len());
    let mut idf = Vec::with_capacity(ranked.len());
    for (term_id, idx) in ranked.into_iter().enumerate() {
        let (term, df_t) = &candidates[idx];
        dictionary.insert(term.clone(), term_id as TermId);
        terms.push(term.clone());
        df.push(*df_t);
        idf.push(smoothed_idf(num_docs, *df_t));
    }
    let vocabulary = Vocabulary { dictionary, terms, df, idf, ngram_range, num_docs };

    let rows = documents
        .iter()
        .map(|doc| SparseVector::from_counts(vocabulary.count_terms(&doc.tokens), &vocabulary))
        .collect();
    let matrix = WeightMatrix { rows };

    tracing::info!(num_docs, num_terms = vocabulary.len(), "built tf-idf index");
    Ok((vocabulary, matrix))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn doc(id: DocId, tokens: &[&str]) -> Document {
        Document {
            id,
            question: tokens.join(" "),
            answer: format!("answer {id}"),
            tokens: tokens.iter().map(|t| t.to_string()).collect(),
        }
    }

    #[test]
    fn ngrams_cover_the_window() {
        let toks: Vec<String> = ["a", "b", "c"].iter().map(|s| s.to_string()).collect();
        assert_eq!(ngrams(&toks, NgramRange::new(1, 2)), vec!["a", "b", "c", "a b", "b c"]);
        assert_eq!(ngrams(&toks, NgramRange::new(3, 5)), vec!["a b c"]);
        assert!(ngrams(&[], NgramRange::new(1, 2)).is_empty());
    }

    #[test]
    fn idf_is_smoothed_and_positive() {
        assert!((smoothed_idf(2, 2) - 1.0).abs() < 1e-6);
        assert!((smoothed_idf(2, 1) - ((1.5f64).ln() as f32 + 1.0)).abs() < 1e-6);
        assert!(smoothed_idf(0, 0) > 0.0);
    }

    #[test]
    fn rows_are_unit_length() {
        let docs = vec![doc(0, &["return", "item"]), doc(1, &["payment", "methods", "accepted"]), doc(2, &["return", "policy"])];
        let (vocab, matrix) = build(&docs, 1000, NgramRange::new(1, 2)).unwrap();
        assert_eq!(matrix.num_docs(), 3);
        for row in &matrix.rows {
            assert!((row.norm() - 1.0).abs() < 1e-5);
        }
        // "return" is the only term found in two documents, so it ranks first
        assert_eq!(vocab.get("return"), Some(0));
        assert_eq!(vocab.df[0], 2);
        assert!(vocab.get("return item").is_some());
    }

    #[test]
    fn feature_cap_keeps_highest_df_then_first_seen() {
        let docs = vec![doc(0, &["alpha", "beta"]), doc(1, &["gamma", "beta"]), doc(2, &["delta"])];
        let (vocab, matrix) = build(&docs, 2, NgramRange::new(1, 1)).unwrap();
        assert_eq!(vocab.terms, vec!["beta", "alpha"]);
        // doc 2 shares nothing with the capped vocabulary
        assert!(matrix.rows[2].is_zero());
    }

    #[test]
    fn empty_and_degenerate_corpora_fail() {
        assert_eq!(build(&[], 10, NgramRange::new(1, 2)).unwrap_err(), MatchError::EmptyCorpus);
        let docs = vec![doc(0, &[]), doc(1, &[])];
        assert_eq!(build(&docs, 10, NgramRange::new(1, 2)).unwrap_err(), MatchError::DegenerateVocabulary);
        // tokens exist but no document is long enough for the window
        let docs = vec![doc(0, &["solo"])];
        assert_eq!(build(&docs, 10, NgramRange::new(2, 2)).unwrap_err(), MatchError::DegenerateVocabulary);
    }

    #[test]
    fn sparse_dot_matches_dense() {
        let docs = vec![doc(0, &["a", "b", "c"]), doc(1, &["b", "c", "d"])];
        let (vocab, matrix) = build(&docs, 100, NgramRange::new(1, 2)).unwrap();
        let (r0, r1) = (&matrix.rows[0], &matrix.rows[1]);
        let dense: f32 = r0.to_dense(vocab.len()).iter().zip(r1.to_dense(vocab.len())).map(|(x, y)| x * y).sum();
        assert!((r0.dot(r1) - dense).abs() < 1e-6);
    }
}
