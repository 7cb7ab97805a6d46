//! Bag-of-words and TF-IDF vectorizers producing sparse feature vectors.

use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap, HashSet};

/// Sparse feature vector as `(feature index, value)` pairs sorted by index.
pub type SparseVector = Vec<(usize, f64)>;

/// How token counts are turned into feature values.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum VectorizerKind {
    /// Raw term counts.
    BagOfWords,
    /// Term counts weighted by smoothed inverse document frequency, L2 normalized.
    Tfidf,
}

impl VectorizerKind {
    pub fn label(&self) -> &'static str {
        match self {
            Self::BagOfWords => "Bag of Words",
            Self::Tfidf => "TF-IDF",
        }
    }
}

fn tokenize(doc: &str) -> impl Iterator<Item = &str> {
    doc.split_whitespace().filter(|w| w.chars().count() >= 2)
}

/// A fitted vocabulary plus the weighting scheme.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Vectorizer {
    pub kind: VectorizerKind,
    pub vocabulary: HashMap<String, usize>,
    /// Inverse document frequency per feature (all ones for bag-of-words).
    pub idf: Vec<f64>,
}

impl Vectorizer {
    /// Build the vocabulary from training documents.
    ///
    /// Keeps terms seen in at least `min_df` documents, then the `max_features`
    /// most frequent of those. Ties are broken alphabetically so the feature
    /// layout is reproducible.
    pub fn fit(
        kind: VectorizerKind,
        documents: &[&str],
        max_features: usize,
        min_df: usize,
    ) -> Self {
        let mut doc_freq: HashMap<&str, usize> = HashMap::new();
        let mut term_freq: HashMap<&str, usize> = HashMap::new();

        for doc in documents {
            let mut seen = HashSet::new();
            for token in tokenize(doc) {
                *term_freq.entry(token).or_insert(0) += 1;
                if seen.insert(token) {
                    *doc_freq.entry(token).or_insert(0) += 1;
                }
            }
        }

        let mut ranked: Vec<(&str, usize)> = term_freq
            .into_iter()
            .filter(|(term, _)| doc_freq.get(term).copied().unwrap_or(0) >= min_df)
            .collect();
        ranked.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(b.0)));
        ranked.truncate(max_features);

        let n_docs = documents.len() as f64;
        let mut vocabulary = HashMap::with_capacity(ranked.len());
        let mut idf = Vec::with_capacity(ranked.len());
        for (idx, (term, _)) in ranked.into_iter().enumerate() {
            vocabulary.insert(term.to_string(), idx);
            let weight = match kind {
                VectorizerKind::BagOfWords => 1.0,
                VectorizerKind::Tfidf => {
                    let df = doc_freq.get(term).copied().unwrap_or(0) as f64;
                    ((1.0 + n_docs) / (1.0 + df)).ln() + 1.0
                }
            };
            idf.push(weight);
        }

        Self {
            kind,
            vocabulary,
            idf,
        }
    }

    pub fn num_features(&self) -> usize {
        self.vocabulary.len()
    }

    /// Map a cleaned document into feature space. Unknown terms are ignored.
    pub fn transform(&self, doc: &str) -> SparseVector {
        let mut counts: BTreeMap<usize, f64> = BTreeMap::new();
        for token in tokenize(doc) {
            if let Some(&idx) = self.vocabulary.get(token) {
                *counts.entry(idx).or_insert(0.0) += 1.0;
            }
        }

        let mut features: SparseVector = counts
            .into_iter()
            .map(|(idx, count)| (idx, count * self.idf[idx]))
            .collect();

        if self.kind == VectorizerKind::Tfidf {
            let norm = features.iter().map(|(_, v)| v * v).sum::<f64>().sqrt();
            if norm > 0.0 {
                for (_, v) in &mut features {
                    *v /= norm;
                }
            }
        }
        features
    }
}
