//! Per-page plain text extraction from source documents.

use crate::error::{KamerbronError, Result};
use lopdf::Document;
use std::path::Path;

/// Plain text of a single page.
#[derive(Debug, Clone, PartialEq)]
pub struct PageText {
    /// 1-based page number.
    pub number: u32,
    /// Extracted text.
    pub text: String,
}

/// Turns a document on disk into ordered per-page text.
///
/// The outer `Result` fails when the whole document is unreadable; each inner
/// `Result` reports a single page, so one bad page never costs the document.
pub trait DocumentExtractor: Send + Sync {
    /// Whether this extractor handles the given file.
    fn supports(&self, path: &Path) -> bool;

    /// Extract the pages of a document in page order.
    fn extract_pages(&self, path: &Path) -> Result<Vec<Result<PageText>>>;
}

fn has_extension(path: &Path, extensions: &[&str]) -> bool {
    path.extension()
        .and_then(|e| e.to_str())
        .map(|e| extensions.iter().any(|x| e.eq_ignore_ascii_case(x)))
        .unwrap_or(false)
}

/// PDF extraction backed by lopdf.
#[derive(Debug, Default)]
pub struct LopdfExtractor;

impl DocumentExtractor for LopdfExtractor {
    fn supports(&self, path: &Path) -> bool {
        has_extension(path, &["pdf"])
    }

    fn extract_pages(&self, path: &Path) -> Result<Vec<Result<PageText>>> {
        let document = Document::load(path).map_err(|e| KamerbronError::DocumentLoad {
            path: path.display().to_string(),
            reason: e.to_string(),
        })?;

        // get_pages is keyed by page number, so iteration is in page order
        let pages = document
            .get_pages()
            .into_keys()
            .map(|number| {
                document
                    .extract_text(&[number])
                    .map(|text| PageText { number, text })
                    .map_err(|e| KamerbronError::PageExtraction {
                        page: number,
                        reason: e.to_string(),
                    })
            })
            .collect();

        Ok(pages)
    }
}

/// Plain text documents; form feed characters separate pages.
#[derive(Debug, Default)]
pub struct PlainTextExtractor;

impl DocumentExtractor for PlainTextExtractor {
    fn supports(&self, path: &Path) -> bool {
        has_extension(path, &["txt", "md"])
    }

    fn extract_pages(&self, path: &Path) -> Result<Vec<Result<PageText>>> {
        let content =
            std::fs::read_to_string(path).map_err(|e| KamerbronError::DocumentLoad {
                path: path.display().to_string(),
                reason: e.to_string(),
            })?;

        Ok(content
            .split('\u{000C}')
            .enumerate()
            .map(|(i, text)| {
                Ok(PageText {
                    number: i as u32 + 1,
                    text: text.to_string(),
                })
            })
            .collect())
    }
}

/// Dispatches to the PDF or plain text extractor by file extension.
#[derive(Debug, Default)]
pub struct DefaultExtractor {
    pdf: LopdfExtractor,
    text: PlainTextExtractor,
}

impl DocumentExtractor for DefaultExtractor {
    fn supports(&self, path: &Path) -> bool {
        self.pdf.supports(path) || self.text.supports(path)
    }

    fn extract_pages(&self, path: &Path) -> Result<Vec<Result<PageText>>> {
        if self.pdf.supports(path) {
            self.pdf.extract_pages(path)
        } else if self.text.supports(path) {
            self.text.extract_pages(path)
        } else {
            Err(KamerbronError::DocumentLoad {
                path: path.display().to_string(),
                reason: "unsupported file type".to_string(),
            })
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_supports_by_extension() {
        let extractor = DefaultExtractor::default();
        assert!(extractor.supports(Path::new("Werkprogramma ATR 2025.pdf")));
        assert!(extractor.supports(Path::new("notes.TXT")));
        assert!(extractor.supports(Path::new("readme.md")));
        assert!(!extractor.supports(Path::new("brief.docx")));
        assert!(!extractor.supports(Path::new("no_extension")));
    }

    #[test]
    fn test_plain_text_form_feed_pages() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("memo.txt");
        std::fs::write(&path, "first page\u{000C}second page\u{000C}third").unwrap();

        let pages: Vec<PageText> = PlainTextExtractor
            .extract_pages(&path)
            .unwrap()
            .into_iter()
            .map(|p| p.unwrap())
            .collect();

        assert_eq!(pages.len(), 3);
        assert_eq!(pages[0].number, 1);
        assert_eq!(pages[1].text, "second page");
        assert_eq!(pages[2].number, 3);
    }

    #[test]
    fn test_invalid_pdf_is_document_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("broken.pdf");
        std::fs::write(&path, b"this is not a pdf").unwrap();

        let err = LopdfExtractor.extract_pages(&path).unwrap_err();
        assert!(matches!(err, KamerbronError::DocumentLoad { .. }));
    }
}
