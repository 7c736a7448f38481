use crate::config::Threshold;
use crate::index::{DocId, Document, SparseVector, WeightMatrix};
use serde::{Deserialize, Serialize};

/// Outcome of one query. `score` is reported even when the match is rejected.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MatchResult {
    pub answer: Option<String>,
    pub score: f32,
    pub matched_document_id: Option<DocId>,
}

impl MatchResult {
    pub fn rejected(score: f32) -> Self {
        Self { answer: None, score, matched_document_id: None }
    }

    pub fn is_accepted(&self) -> bool {
        self.answer.is_some()
    }

    pub fn confidence(&self) -> Confidence {
        Confidence::from_score(self.score)
    }
}

/// Coarse band of a score, for display.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Confidence {
    High,
    Medium,
    Low,
}

impl Confidence {
    pub fn from_score(score: f32) -> Self {
        let pct = score * 100.0;
        if pct > 70.0 {
            Confidence::High
        } else if pct > 40.0 {
            Confidence::Medium
        } else {
            Confidence::Low
        }
    }
}

impl std::fmt::Display for Confidence {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            Confidence::High => "High",
            Confidence::Medium => "Medium",
            Confidence::Low => "Low",
        };
        f.write_str(s)
    }
}

/// Best-scoring document by cosine similarity. Ties go to the lowest id.
/// `None` only for an empty matrix.
pub fn best_match(query: &SparseVector, matrix: &WeightMatrix) -> Option<(DocId, f32)> {
    let mut best: Option<(DocId, f32)> = None;
    for (doc_id, row) in matrix.rows.iter().enumerate() {
        // both sides are unit length, so the dot product is the cosine
        let score = query.dot(row).clamp(0.0, 1.0);
        match best {
            Some((_, s)) if score <= s => {}
            _ => best = Some((doc_id as DocId, score)),
        }
    }
    best
}

/// Rank `query` against every row and accept the best one when its score
/// is strictly above `threshold`.
pub fn resolve(query: &SparseVector, matrix: &WeightMatrix, documents: &[Document], threshold: Threshold) -> MatchResult {
    let Some((doc_id, score)) = best_match(query, matrix) else {
        return MatchResult::rejected(0.0);
    };
    if score > threshold.value() {
        if let Some(doc) = documents.get(doc_id as usize) {
            return MatchResult { answer: Some(doc.answer.clone()), score, matched_document_id: Some(doc.id) };
        }
    }
    MatchResult::rejected(score)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::NgramRange;
    use crate::index::build;
    use crate::vectorizer::vectorize;

    fn docs(questions: &[&str]) -> Vec<Document> {
        questions
            .iter()
            .enumerate()
            .map(|(i, q)| Document {
                id: i as DocId,
                question: q.to_string(),
                answer: format!("answer {i}"),
                tokens: q.split_whitespace().map(str::to_string).collect(),
            })
            .collect()
    }

    fn toks(s: &str) -> Vec<String> {
        s.split_whitespace().map(str::to_string).collect()
    }

    #[test]
    fn ties_go_to_lowest_id() {
        let d = docs(&["refund policy", "shipping cost", "refund policy"]);
        let (vocab, matrix) = build(&d, 100, NgramRange::new(1, 2)).unwrap();
        let q = vectorize(&toks("refund policy"), &vocab);
        let (id, score) = best_match(&q, &matrix).unwrap();
        assert_eq!(id, 0);
        assert!((score - 1.0).abs() < 1e-5);
    }

    #[test]
    fn zero_query_is_always_rejected() {
        let d = docs(&["refund policy", "shipping cost"]);
        let (_, matrix) = build(&d, 100, NgramRange::new(1, 2)).unwrap();
        let r = resolve(&SparseVector::default(), &matrix, &d, Threshold::new(0.0).unwrap());
        assert_eq!(r, MatchResult::rejected(0.0));
    }

    #[test]
    fn threshold_is_strict() {
        let d = docs(&["refund policy", "shipping cost"]);
        let (vocab, matrix) = build(&d, 100, NgramRange::new(1, 2)).unwrap();
        let q = vectorize(&toks("shipping cost"), &vocab);
        let accepted = resolve(&q, &matrix, &d, Threshold::new(0.5).unwrap());
        assert_eq!(accepted.matched_document_id, Some(1));
        assert_eq!(accepted.answer.as_deref(), Some("answer 1"));
        let rejected = resolve(&q, &matrix, &d, Threshold::new(accepted.score).unwrap());
        assert!(!rejected.is_accepted());
        assert_eq!(rejected.score, accepted.score);
    }

    #[test]
    fn confidence_bands() {
        assert_eq!(Confidence::from_score(0.95), Confidence::High);
        assert_eq!(Confidence::from_score(0.69), Confidence::Medium);
        assert_eq!(Confidence::from_score(0.41), Confidence::Medium);
        assert_eq!(Confidence::from_score(0.39), Confidence::Low);
        assert_eq!(Confidence::from_score(0.0), Confidence::Low);
    }
}
