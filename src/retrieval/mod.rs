//! Ranking pages against a query.

use crate::corpus::{Page, PageStore};
use crate::index::Index;
use serde::Serialize;
use tracing::debug;

/// A retrieved page with its cosine similarity.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ScoredPage {
    pub page: Page,
    /// Cosine similarity in `[0, 1]`.
    pub score: f32,
}

/// Pages ranked by descending score; ties keep corpus order.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct RetrievalResult {
    pub results: Vec<ScoredPage>,
}

impl RetrievalResult {
    pub fn len(&self) -> usize {
        self.results.len()
    }

    pub fn is_empty(&self) -> bool {
        self.results.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, ScoredPage> {
        self.results.iter()
    }

    /// Highest score in the result, if any.
    pub fn best_score(&self) -> Option<f32> {
        self.results.first().map(|r| r.score)
    }
}

impl IntoIterator for RetrievalResult {
    type Item = ScoredPage;
    type IntoIter = std::vec::IntoIter<ScoredPage>;

    fn into_iter(self) -> Self::IntoIter {
        self.results.into_iter()
    }
}

/// Searches a page store through its TF-IDF index.
///
/// Holds shared references only; any number of retrievers may search the
/// same snapshot at once.
pub struct Retriever<'a> {
    pages: &'a PageStore,
    index: &'a Index,
    min_score: f32,
}

impl<'a> Retriever<'a> {
    /// Create a retriever over an index built from `pages`.
    pub fn new(pages: &'a PageStore, index: &'a Index) -> Self {
        Self {
            pages,
            index,
            min_score: 0.0,
        }
    }

    /// Set the minimum similarity score threshold.
    pub fn with_min_score(mut self, min_score: f32) -> Self {
        self.min_score = min_score;
        self
    }

    /// Return the `top_k` pages most similar to the query.
    ///
    /// A `top_k` at or above the corpus size returns every page that meets
    /// the score threshold. An empty index always yields an empty result.
    pub fn search(&self, query: &str, top_k: usize) -> RetrievalResult {
        if self.index.is_empty() || top_k == 0 {
            return RetrievalResult::default();
        }

        let query_vector = self.index.vectorize(query);
        let mut ranked: Vec<(usize, f32)> = self
            .index
            .similarities(&query_vector)
            .into_iter()
            .enumerate()
            .filter(|(_, score)| *score >= self.min_score)
            .collect();

        // sort_by is stable: equal scores stay in corpus order
        ranked.sort_by(|a, b| b.1.total_cmp(&a.1));
        ranked.truncate(top_k);

        let results: Vec<ScoredPage> = ranked
            .into_iter()
            .filter_map(|(position, score)| {
                self.pages.pages().get(position).map(|page| ScoredPage {
                    page: page.clone(),
                    score,
                })
            })
            .collect();

        debug!(
            "Retrieved {} pages for query (best score {:.3})",
            results.len(),
            results.first().map(|r| r.score).unwrap_or(0.0)
        );

        RetrievalResult { results }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::index::{StopwordLanguage, Tokenizer};

    fn corpus() -> PageStore {
        PageStore::from_pages(vec![
            Page::new("Doc1.pdf", 1, "Subsidy X applies to small firms.", "/kb/Doc1.pdf"),
            Page::new("Doc2.pdf", 1, "Subsidy X cap is €50,000.", "/kb/Doc2.pdf"),
            Page::new("Doc3.pdf", 1, "Regulatory burden for firms is reviewed yearly.", "/kb/Doc3.pdf"),
            Page::new("Doc3.pdf", 2, "The advisory board publishes a work programme.", "/kb/Doc3.pdf"),
        ])
    }

    fn english_index(store: &PageStore) -> Index {
        Index::build(store, Tokenizer::new(StopwordLanguage::English, &[], 2))
    }

    #[test]
    fn test_results_sorted_and_bounded() {
        let store = corpus();
        let index = english_index(&store);
        let retriever = Retriever::new(&store, &index);

        for query in ["subsidy cap", "small firms", "advisory board", "nothing matches"] {
            let result = retriever.search(query, 10);
            for pair in result.results.windows(2) {
                assert!(pair[0].score >= pair[1].score);
            }
            for r in result.iter() {
                assert!((0.0..=1.0).contains(&r.score));
            }
        }
    }

    #[test]
    fn test_top_k_larger_than_corpus_returns_everything() {
        let store = corpus();
        let index = english_index(&store);
        let result = Retriever::new(&store, &index).search("subsidy", 100);

        assert_eq!(result.len(), store.len());
        for page in store.pages() {
            assert!(result.iter().any(|r| &r.page == page));
        }
    }

    #[test]
    fn test_top_k_truncates() {
        let store = corpus();
        let index = english_index(&store);
        let result = Retriever::new(&store, &index).search("firms", 2);
        assert_eq!(result.len(), 2);

        assert!(Retriever::new(&store, &index).search("firms", 0).is_empty());
    }

    #[test]
    fn test_ties_keep_corpus_order() {
        let store = corpus();
        let index = english_index(&store);
        // No query term is in the vocabulary, so every score is 0
        let result = Retriever::new(&store, &index).search("zzz qqq", 4);

        let order: Vec<(&str, u32)> = result
            .iter()
            .map(|r| (r.page.source.as_str(), r.page.page_number))
            .collect();
        assert_eq!(
            order,
            vec![("Doc1.pdf", 1), ("Doc2.pdf", 1), ("Doc3.pdf", 1), ("Doc3.pdf", 2)]
        );
    }

    #[test]
    fn test_deterministic() {
        let store = corpus();
        let index = english_index(&store);
        let retriever = Retriever::new(&store, &index);

        let first = retriever.search("subsidy for small firms", 3);
        let second = retriever.search("subsidy for small firms", 3);
        assert_eq!(first, second);
    }

    #[test]
    fn test_cap_query_ranks_doc2_first() {
        let store = corpus();
        let index = english_index(&store);
        let result = Retriever::new(&store, &index).search("What is the subsidy cap?", 2);

        assert_eq!(result.results[0].page.source, "Doc2.pdf");
        assert_eq!(result.results[1].page.source, "Doc1.pdf");
        assert!(result.results[0].score > result.results[1].score);
    }

    #[test]
    fn test_min_score_filters() {
        let store = corpus();
        let index = english_index(&store);
        let result = Retriever::new(&store, &index)
            .with_min_score(0.01)
            .search("advisory board", 10);

        assert_eq!(result.len(), 1);
        assert_eq!(result.results[0].page.page_number, 2);
    }

    #[test]
    fn test_empty_corpus_never_fails() {
        let store = PageStore::default();
        let index = Index::empty(Tokenizer::default());
        let retriever = Retriever::new(&store, &index);

        assert!(retriever.search("regeldruk", 5).is_empty());
        assert!(retriever.search("", 5).is_empty());
        assert_eq!(retriever.search("x", 5).best_score(), None);
    }
}
