//! TF-IDF index over corpus pages.
//!
//! The vocabulary is fixed when the index is built. Terms are weighted as
//! `tf * idf` with smoothed `idf = ln((1 + n) / (1 + df)) + 1`, and every page
//! vector is L2-normalized. An index is never updated in place; a changed
//! corpus means building a new one.

mod tokenizer;

pub use tokenizer::{StopwordLanguage, Tokenizer};

use crate::corpus::PageStore;
use std::collections::{BTreeMap, BTreeSet, HashMap};
use tracing::info;

/// Sparse term-weight vector, sorted by term id.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SparseVector {
    entries: Vec<(usize, f32)>,
}

impl SparseVector {
    /// Build from (term id, weight) pairs; zero weights are dropped.
    pub fn from_entries(mut entries: Vec<(usize, f32)>) -> Self {
        entries.retain(|(_, w)| *w != 0.0);
        entries.sort_by_key(|(id, _)| *id);
        Self { entries }
    }

    pub fn entries(&self) -> &[(usize, f32)] {
        &self.entries
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn norm(&self) -> f32 {
        self.entries.iter().map(|(_, w)| w * w).sum::<f32>().sqrt()
    }

    /// Scale to unit length; the zero vector stays zero.
    pub fn normalized(mut self) -> Self {
        let norm = self.norm();
        if norm > 0.0 {
            for (_, w) in &mut self.entries {
                *w /= norm;
            }
        }
        self
    }

    pub fn dot(&self, other: &SparseVector) -> f32 {
        let (mut i, mut j) = (0, 0);
        let mut sum = 0.0;
        while i < self.entries.len() && j < other.entries.len() {
            let (a_id, a_w) = self.entries[i];
            let (b_id, b_w) = other.entries[j];
            match a_id.cmp(&b_id) {
                std::cmp::Ordering::Less => i += 1,
                std::cmp::Ordering::Greater => j += 1,
                std::cmp::Ordering::Equal => {
                    sum += a_w * b_w;
                    i += 1;
                    j += 1;
                }
            }
        }
        sum
    }
}

/// Compute cosine similarity between two sparse vectors.
///
/// TF-IDF weights are non-negative, so the result lies in `[0, 1]`.
pub fn cosine_similarity(a: &SparseVector, b: &SparseVector) -> f32 {
    let norm_a = a.norm();
    let norm_b = b.norm();

    if norm_a == 0.0 || norm_b == 0.0 {
        return 0.0;
    }

    (a.dot(b) / (norm_a * norm_b)).clamp(0.0, 1.0)
}

/// Read-only TF-IDF representation of a page store snapshot.
#[derive(Debug, Clone)]
pub struct Index {
    tokenizer: Tokenizer,
    vocabulary: HashMap<String, usize>,
    idf: Vec<f32>,
    vectors: Vec<SparseVector>,
}

impl Index {
    /// Fit the vocabulary and weights on every page of the store.
    pub fn build(store: &PageStore, tokenizer: Tokenizer) -> Self {
        let page_terms: Vec<BTreeMap<String, u32>> = store
            .pages()
            .iter()
            .map(|page| {
                let mut counts = BTreeMap::new();
                for token in tokenizer.tokenize(&page.content) {
                    *counts.entry(token).or_insert(0) += 1;
                }
                counts
            })
            .collect();

        // Term ids follow sorted term order
        let terms: BTreeSet<&String> = page_terms.iter().flat_map(|c| c.keys()).collect();
        let vocabulary: HashMap<String, usize> = terms
            .into_iter()
            .enumerate()
            .map(|(id, term)| (term.clone(), id))
            .collect();

        let mut document_frequency = vec![0u32; vocabulary.len()];
        for counts in &page_terms {
            for term in counts.keys() {
                document_frequency[vocabulary[term]] += 1;
            }
        }

        let n = page_terms.len() as f32;
        let idf: Vec<f32> = document_frequency
            .iter()
            .map(|&df| ((1.0 + n) / (1.0 + df as f32)).ln() + 1.0)
            .collect();

        let vectors = page_terms
            .iter()
            .map(|counts| {
                let entries = counts
                    .iter()
                    .map(|(term, &tf)| {
                        let id = vocabulary[term];
                        (id, tf as f32 * idf[id])
                    })
                    .collect();
                SparseVector::from_entries(entries).normalized()
            })
            .collect();

        info!(
            "Built TF-IDF index: {} pages, {} terms",
            page_terms.len(),
            vocabulary.len()
        );

        Self {
            tokenizer,
            vocabulary,
            idf,
            vectors,
        }
    }

    /// Index over no pages; every search against it is empty.
    pub fn empty(tokenizer: Tokenizer) -> Self {
        Self::build(&PageStore::default(), tokenizer)
    }

    /// Number of indexed pages.
    pub fn len(&self) -> usize {
        self.vectors.len()
    }

    pub fn is_empty(&self) -> bool {
        self.vectors.is_empty()
    }

    pub fn vocabulary_size(&self) -> usize {
        self.vocabulary.len()
    }

    pub fn contains_term(&self, term: &str) -> bool {
        self.vocabulary.contains_key(term)
    }

    /// Project text into the index's vector space.
    ///
    /// Terms outside the fitted vocabulary contribute nothing.
    pub fn vectorize(&self, text: &str) -> SparseVector {
        let mut counts: HashMap<usize, u32> = HashMap::new();
        for token in self.tokenizer.tokenize(text) {
            if let Some(&id) = self.vocabulary.get(&token) {
                *counts.entry(id).or_insert(0) += 1;
            }
        }

        let entries = counts
            .into_iter()
            .map(|(id, tf)| (id, tf as f32 * self.idf[id]))
            .collect();
        SparseVector::from_entries(entries).normalized()
    }

    /// Cosine similarity of the query against every page, in corpus order.
    pub fn similarities(&self, query: &SparseVector) -> Vec<f32> {
        self.vectors
            .iter()
            .map(|page| cosine_similarity(query, page))
            .collect()
    }
}
