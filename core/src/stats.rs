//! Descriptive statistics over a loaded corpus.

use crate::index::Document;
use serde::{Deserialize, Serialize};

/// Keyword groups used to bucket questions by topic. A question falls in a
/// category when its lowercased text contains any keyword as a substring.
pub const CATEGORIES: &[(&str, &[&str])] = &[
    ("Shipping", &["ship", "delivery", "shipping", "deliver"]),
    ("Returns", &["return", "refund", "exchange"]),
    ("Orders", &["order", "purchase", "buy", "cart"]),
    ("Payment", &["pay", "payment", "card", "billing"]),
    ("Account", &["account", "login", "profile", "register"]),
];

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CategoryCount {
    pub name: String,
    pub count: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CorpusStats {
    pub total_documents: usize,
    /// Mean question length in whitespace-separated words.
    pub avg_question_words: f64,
    pub avg_answer_words: f64,
    /// Non-empty categories, largest first.
    pub categories: Vec<CategoryCount>,
}

impl CorpusStats {
    pub fn compute(documents: &[Document]) -> Self {
        let total = documents.len();
        let lowered: Vec<String> = documents.iter().map(|d| d.question.to_lowercase()).collect();
        let mut categories: Vec<CategoryCount> = CATEGORIES
            .iter()
            .map(|(name, keywords)| CategoryCount {
                name: name.to_string(),
                count: lowered.iter().filter(|q| keywords.iter().any(|k| q.contains(k))).count(),
            })
            .filter(|c| c.count > 0)
            .collect();
        categories.sort_by(|a, b| b.count.cmp(&a.count));

        Self {
            total_documents: total,
            avg_question_words: mean_words(documents.iter().map(|d| d.question.as_str())),
            avg_answer_words: mean_words(documents.iter().map(|d| d.answer.as_str())),
            categories,
        }
    }
}

fn mean_words<'a>(texts: impl ExactSizeIterator<Item = &'a str>) -> f64 {
    let n = texts.len();
    if n == 0 {
        return 0.0;
    }
    let words: usize = texts.map(|t| t.split_whitespace().count()).sum();
    words as f64 / n as f64
}
