//! Page-level document corpus.
//!
//! Loads every document in the corpus directory, splits it into pages and
//! keeps the non-blank ones. A document or page that cannot be read is skipped
//! and recorded in the [`LoadReport`]; the rest of the corpus still loads.

mod extract;

pub use extract::{DefaultExtractor, DocumentExtractor, LopdfExtractor, PageText, PlainTextExtractor};

use crate::error::{KamerbronError, Result};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap};
use std::path::{Path, PathBuf};
use tracing::{debug, info, instrument, warn};

/// A single retrievable page.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Page {
    /// Originating document (file name).
    pub source: String,
    /// 1-based page number.
    pub page_number: u32,
    /// Plain text of the page.
    pub content: String,
    /// Location of the document for re-display.
    pub file_path: PathBuf,
}

impl Page {
    pub fn new(
        source: impl Into<String>,
        page_number: u32,
        content: impl Into<String>,
        file_path: impl Into<PathBuf>,
    ) -> Self {
        Self {
            source: source.into(),
            page_number,
            content: content.into(),
            file_path: file_path.into(),
        }
    }

    /// Display title: the document name without its extension.
    pub fn title(&self) -> &str {
        document_title(&self.source)
    }

    /// Number of whitespace-separated words in the page.
    pub fn word_count(&self) -> usize {
        self.content.split_whitespace().count()
    }
}

fn document_title(source: &str) -> &str {
    Path::new(source)
        .file_stem()
        .and_then(|s| s.to_str())
        .unwrap_or(source)
}

/// A document that was skipped while loading the corpus.
#[derive(Debug, Clone, Serialize)]
pub struct SkippedDocument {
    pub path: PathBuf,
    pub reason: String,
}

/// A page that was skipped while loading the corpus.
#[derive(Debug, Clone, Serialize)]
pub struct SkippedPage {
    pub source: String,
    pub page_number: u32,
    pub reason: String,
}

/// What happened while loading the corpus.
#[derive(Debug, Clone, Default, Serialize)]
pub struct LoadReport {
    pub documents_loaded: usize,
    pub skipped_documents: Vec<SkippedDocument>,
    pub skipped_pages: Vec<SkippedPage>,
}

/// Summary of one document in the store.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DocumentInfo {
    pub source: String,
    pub title: String,
    pub file_path: PathBuf,
    pub page_count: usize,
}

/// Immutable collection of pages, in corpus order.
#[derive(Debug, Clone, Default)]
pub struct PageStore {
    pages: Vec<Page>,
    by_key: HashMap<(String, u32), usize>,
    report: LoadReport,
}

impl PageStore {
    /// Load all supported documents from a corpus directory.
    ///
    /// Files are visited in name order so the page order, and therefore
    /// ranking ties, are the same on every load.
    #[instrument(skip(extractor), fields(dir = %dir.display()))]
    pub fn load(dir: &Path, extractor: &dyn DocumentExtractor) -> Result<Self> {
        if !dir.is_dir() {
            return Err(KamerbronError::Corpus(format!(
                "corpus directory does not exist: {}",
                dir.display()
            )));
        }

        let mut files: Vec<PathBuf> = std::fs::read_dir(dir)?
            .filter_map(|entry| entry.ok().map(|e| e.path()))
            .filter(|p| p.is_file())
            .collect();
        files.sort();

        let mut pages = Vec::new();
        let mut report = LoadReport::default();

        for path in files {
            if !extractor.supports(&path) {
                debug!("Ignoring unsupported file {}", path.display());
                continue;
            }

            let source = path
                .file_name()
                .map(|n| n.to_string_lossy().to_string())
                .unwrap_or_default();

            let extracted = match extractor.extract_pages(&path) {
                Ok(extracted) => extracted,
                Err(e) => {
                    warn!("Skipping document {}: {}", path.display(), e);
                    report.skipped_documents.push(SkippedDocument {
                        path: path.clone(),
                        reason: e.to_string(),
                    });
                    continue;
                }
            };

            for page in extracted {
                match page {
                    Ok(page) => {
                        let text = page.text.trim();
                        if !text.is_empty() {
                            pages.push(Page::new(&source, page.number, text, &path));
                        }
                    }
                    Err(e) => {
                        let page_number = match &e {
                            KamerbronError::PageExtraction { page, .. } => *page,
                            _ => 0,
                        };
                        warn!("Skipping {} p.{}: {}", source, page_number, e);
                        report.skipped_pages.push(SkippedPage {
                            source: source.clone(),
                            page_number,
                            reason: e.to_string(),
                        });
                    }
                }
            }

            report.documents_loaded += 1;
        }

        let mut store = Self::from_pages(pages);
        info!(
            "Loaded {} pages from {} documents ({} skipped)",
            store.len(),
            report.documents_loaded,
            report.skipped_documents.len()
        );
        store.report = report;
        Ok(store)
    }

    /// Build a store from pages already in memory.
    ///
    /// Blank pages are dropped, and a repeated (source, page) pair keeps only
    /// its first occurrence.
    pub fn from_pages(pages: impl IntoIterator<Item = Page>) -> Self {
        let mut store = Self::default();
        for page in pages {
            if page.content.trim().is_empty() {
                continue;
            }
            let key = (page.source.clone(), page.page_number);
            if store.by_key.contains_key(&key) {
                warn!("Duplicate page {} p.{} ignored", key.0, key.1);
                continue;
            }
            store.by_key.insert(key, store.pages.len());
            store.pages.push(page);
        }
        store
    }

    /// All pages in corpus order.
    pub fn pages(&self) -> &[Page] {
        &self.pages
    }

    pub fn len(&self) -> usize {
        self.pages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pages.is_empty()
    }

    /// Look up one page by document and page number.
    pub fn get_page(&self, source: &str, page_number: u32) -> Option<&Page> {
        self.by_key
            .get(&(source.to_string(), page_number))
            .map(|&i| &self.pages[i])
    }

    /// Per-document page counts, sorted by source.
    pub fn documents(&self) -> Vec<DocumentInfo> {
        let mut docs: BTreeMap<&str, DocumentInfo> = BTreeMap::new();
        for page in &self.pages {
            docs.entry(page.source.as_str())
                .or_insert_with(|| DocumentInfo {
                    source: page.source.clone(),
                    title: page.title().to_string(),
                    file_path: page.file_path.clone(),
                    page_count: 0,
                })
                .page_count += 1;
        }
        docs.into_values().collect()
    }

    /// Skipped documents and pages from the last load.
    pub fn report(&self) -> &LoadReport {
        &self.report
    }
}
