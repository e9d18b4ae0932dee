//! The shared, read-only knowledge base.
//!
//! A [`Snapshot`] pairs a page store with the index built from it and is
//! never mutated. Requests clone the current `Arc<Snapshot>` and work on it
//! without holding any lock. A reload builds a complete new snapshot first and
//! then swaps the pointer, so a reader sees either the old corpus or the new
//! one, never a mix.

use crate::config::{IndexSettings, Settings};
use crate::corpus::{DefaultExtractor, DocumentExtractor, DocumentInfo, Page, PageStore};
use crate::error::{KamerbronError, Result};
use crate::index::{Index, Tokenizer};
use crate::retrieval::Retriever;
use std::path::{Path, PathBuf};
use std::sync::{Arc, RwLock};
use tracing::{info, instrument};

/// A page store and its index, built together.
#[derive(Debug)]
pub struct Snapshot {
    pages: PageStore,
    index: Index,
}

impl Snapshot {
    /// Index a page store.
    pub fn build(pages: PageStore, tokenizer: Tokenizer) -> Self {
        let index = Index::build(&pages, tokenizer);
        Self { pages, index }
    }

    pub fn pages(&self) -> &PageStore {
        &self.pages
    }

    pub fn index(&self) -> &Index {
        &self.index
    }

    /// A retriever over this snapshot.
    pub fn retriever(&self) -> Retriever<'_> {
        Retriever::new(&self.pages, &self.index)
    }
}

/// Holds the current snapshot and knows how to rebuild it from disk.
pub struct KnowledgeBase {
    current: RwLock<Arc<Snapshot>>,
    corpus_dir: Option<PathBuf>,
    extractor: Arc<dyn DocumentExtractor>,
    index_settings: IndexSettings,
}

impl KnowledgeBase {
    /// Wrap an already built snapshot. Without a corpus directory,
    /// [`reload`](Self::reload) is unavailable.
    pub fn new(snapshot: Snapshot) -> Self {
        Self {
            current: RwLock::new(Arc::new(snapshot)),
            corpus_dir: None,
            extractor: Arc::new(DefaultExtractor::default()),
            index_settings: IndexSettings::default(),
        }
    }

    /// Load and index every document in a corpus directory.
    pub fn load(
        corpus_dir: &Path,
        extractor: Arc<dyn DocumentExtractor>,
        index_settings: IndexSettings,
    ) -> Result<Self> {
        let snapshot = build_snapshot(corpus_dir, extractor.as_ref(), &index_settings)?;
        Ok(Self {
            current: RwLock::new(Arc::new(snapshot)),
            corpus_dir: Some(corpus_dir.to_path_buf()),
            extractor,
            index_settings,
        })
    }

    /// Load the corpus directory named in the settings.
    pub fn from_settings(settings: &Settings) -> Result<Self> {
        Self::load(
            &settings.corpus_dir(),
            Arc::new(DefaultExtractor::default()),
            settings.index.clone(),
        )
    }

    /// The snapshot current at the time of the call.
    pub fn snapshot(&self) -> Arc<Snapshot> {
        self.current
            .read()
            .unwrap_or_else(|e| e.into_inner())
            .clone()
    }

    /// Swap in a new snapshot.
    pub fn replace(&self, snapshot: Snapshot) {
        let mut current = self.current.write().unwrap_or_else(|e| e.into_inner());
        *current = Arc::new(snapshot);
    }

    /// Re-read the corpus directory and swap in the result.
    ///
    /// On failure the current snapshot stays in place. This does blocking
    /// file I/O.
    #[instrument(skip(self))]
    pub fn reload(&self) -> Result<Arc<Snapshot>> {
        let dir = self.corpus_dir.as_deref().ok_or_else(|| {
            KamerbronError::Corpus("no corpus directory to reload from".to_string())
        })?;

        let snapshot = build_snapshot(dir, self.extractor.as_ref(), &self.index_settings)?;
        info!("Reloaded corpus: {} pages", snapshot.pages.len());
        self.replace(snapshot);
        Ok(self.snapshot())
    }

    /// Look up one page in the current snapshot.
    pub fn get_page(&self, source: &str, page_number: u32) -> Option<Page> {
        self.snapshot().pages.get_page(source, page_number).cloned()
    }

    /// Documents in the current snapshot.
    pub fn documents(&self) -> Vec<DocumentInfo> {
        self.snapshot().pages.documents()
    }
}

fn build_snapshot(
    dir: &Path,
    extractor: &dyn DocumentExtractor,
    index_settings: &IndexSettings,
) -> Result<Snapshot> {
    let pages = PageStore::load(dir, extractor)?;
    Ok(Snapshot::build(pages, Tokenizer::from_settings(index_settings)))
}
