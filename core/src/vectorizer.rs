use crate::index::{SparseVector, Vocabulary};

/// Project normalized query tokens into the vocabulary's space.
///
/// Out-of-vocabulary n-grams are skipped. The result is unit length, or the
/// zero vector when nothing in the query is known.
pub fn vectorize(tokens: &[String], vocabulary: &Vocabulary) -> SparseVector {
    SparseVector::from_counts(vocabulary.count_terms(tokens), vocabulary)
}
