//! Prompt assembly with numbered, citable sources.

use crate::config::Prompts;
use crate::retrieval::{RetrievalResult, ScoredPage};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::PathBuf;
use tracing::debug;

const UNKNOWN: &str = "Onbekend";
const DEFAULT_CATEGORY: &str = "Algemeen";
const NO_CONTEXT: &str = "(No relevant sources were found in the knowledge base.)";

/// A retrieved page as presented to the model, addressable as `source-N`.
///
/// Numbering is local to one answer request.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Source {
    /// Tag used in citation markers, e.g. `source-1`.
    pub id: String,
    /// Originating document (file name).
    pub source: String,
    /// Document title.
    pub title: String,
    /// 1-based page number.
    pub page: u32,
    pub file_path: PathBuf,
    pub similarity_score: f32,
}

impl Source {
    /// Tag for the source at a 1-based position.
    pub fn tag(position: usize) -> String {
        format!("source-{}", position)
    }

    fn from_scored(position: usize, scored: &ScoredPage) -> Self {
        Self {
            id: Self::tag(position),
            source: scored.page.source.clone(),
            title: scored.page.title().to_string(),
            page: scored.page.page_number,
            file_path: scored.page.file_path.clone(),
            similarity_score: scored.score,
        }
    }
}

/// The question being answered, with who asked it.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct QuestionContext {
    pub question: String,
    pub speaker: Option<String>,
    pub party: Option<String>,
    pub category: Option<String>,
}

impl QuestionContext {
    pub fn new(question: impl Into<String>) -> Self {
        Self {
            question: question.into(),
            ..Default::default()
        }
    }

    pub fn with_speaker(mut self, speaker: impl Into<String>) -> Self {
        self.speaker = Some(speaker.into());
        self
    }

    pub fn with_party(mut self, party: impl Into<String>) -> Self {
        self.party = Some(party.into());
        self
    }

    pub fn with_category(mut self, category: impl Into<String>) -> Self {
        self.category = Some(category.into());
        self
    }
}

/// System instructions, user message and the sources they reference.
#[derive(Debug, Clone)]
pub struct AssembledPrompt {
    pub system: String,
    pub user: String,
    pub sources: Vec<Source>,
}

/// Builds the source-tagged prompt for one question.
#[derive(Debug, Clone)]
pub struct PromptAssembler {
    prompts: Prompts,
    language: String,
    max_context_words: usize,
}

impl PromptAssembler {
    pub fn new(prompts: Prompts) -> Self {
        Self {
            prompts,
            language: "Nederlands".to_string(),
            max_context_words: 50_000,
        }
    }

    /// Set the language the answer must be written in.
    pub fn with_language(mut self, language: impl Into<String>) -> Self {
        self.language = language.into();
        self
    }

    pub fn language(&self) -> &str {
        &self.language
    }

    /// Set the word budget for the context block.
    pub fn with_max_context_words(mut self, max_context_words: usize) -> Self {
        self.max_context_words = max_context_words;
        self
    }

    /// Number the retrieved pages in ranking order and render both prompts.
    ///
    /// Pages beyond the word budget are left out and get no tag. The first
    /// page is always included.
    pub fn assemble(&self, question: &QuestionContext, retrieved: &RetrievalResult) -> AssembledPrompt {
        let mut sources = Vec::new();
        let mut blocks = Vec::new();
        let mut words = 0;

        for scored in retrieved.iter() {
            let page_words = scored.page.word_count();
            if !sources.is_empty() && words + page_words > self.max_context_words {
                debug!(
                    "Context budget of {} words reached after {} sources",
                    self.max_context_words,
                    sources.len()
                );
                break;
            }
            words += page_words;

            let source = Source::from_scored(sources.len() + 1, scored);
            blocks.push(format_source_block(&source, &scored.page.content));
            sources.push(source);
        }

        let context = if blocks.is_empty() {
            NO_CONTEXT.to_string()
        } else {
            blocks.join("\n\n")
        };

        let mut vars = HashMap::new();
        vars.insert("language".to_string(), self.language.clone());
        vars.insert("question".to_string(), question.question.trim().to_string());
        vars.insert(
            "speaker".to_string(),
            question.speaker.clone().unwrap_or_else(|| UNKNOWN.to_string()),
        );
        vars.insert(
            "party".to_string(),
            question.party.clone().unwrap_or_else(|| UNKNOWN.to_string()),
        );
        vars.insert(
            "category".to_string(),
            question
                .category
                .clone()
                .unwrap_or_else(|| DEFAULT_CATEGORY.to_string()),
        );
        vars.insert("context".to_string(), context);

        AssembledPrompt {
            system: self.prompts.render_with_custom(&self.prompts.answer.system, &vars),
            user: self.prompts.render_with_custom(&self.prompts.answer.user, &vars),
            sources,
        }
    }
}

impl Default for PromptAssembler {
    fn default() -> Self {
        Self::new(Prompts::default())
    }
}

/// Format one page for the context block.
fn format_source_block(source: &Source, content: &str) -> String {
    format!(
        "---\n[{}] {} ({}, p. {})\n{}\n---",
        source.id, source.title, source.source, source.page, content
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::corpus::Page;

    fn retrieved() -> RetrievalResult {
        RetrievalResult {
            results: vec![
                ScoredPage {
                    page: Page::new("Doc2.pdf", 1, "Subsidy X cap is €50,000.", "/kb/Doc2.pdf"),
                    score: 0.67,
                },
                ScoredPage {
                    page: Page::new("Doc1.pdf", 3, "Subsidy X applies to small firms.", "/kb/Doc1.pdf"),
                    score: 0.27,
                },
            ],
        }
    }

    #[test]
    fn test_sources_numbered_in_rank_order() {
        let prompt = PromptAssembler::default()
            .assemble(&QuestionContext::new("What is the subsidy cap?"), &retrieved());

        assert_eq!(prompt.sources.len(), 2);
        assert_eq!(prompt.sources[0].id, "source-1");
        assert_eq!(prompt.sources[0].source, "Doc2.pdf");
        assert_eq!(prompt.sources[0].title, "Doc2");
        assert_eq!(prompt.sources[0].similarity_score, 0.67);
        assert_eq!(prompt.sources[1].id, "source-2");
        assert_eq!(prompt.sources[1].page, 3);
    }

    #[test]
    fn test_context_block_tags_each_page() {
        let prompt = PromptAssembler::default()
            .assemble(&QuestionContext::new("What is the subsidy cap?"), &retrieved());

        assert!(prompt.user.contains("[source-1] Doc2 (Doc2.pdf, p. 1)\nSubsidy X cap is €50,000."));
        assert!(prompt.user.contains("[source-2] Doc1 (Doc1.pdf, p. 3)\nSubsidy X applies"));
        let first = prompt.user.find("[source-1]").unwrap();
        let second = prompt.user.find("[source-2]").unwrap();
        assert!(first < second);
    }

    #[test]
    fn test_question_metadata_rendered() {
        let question = QuestionContext::new("Hoe staat het met de regeldruk?")
            .with_speaker("Jansen")
            .with_party("VVD")
            .with_category("Regeldruk");
        let prompt = PromptAssembler::default().assemble(&question, &retrieved());

        assert!(prompt.user.contains("Hoe staat het met de regeldruk?"));
        assert!(prompt.user.contains("Asked by: Jansen (VVD)"));
        assert!(prompt.user.contains("Category: Regeldruk"));
        assert!(!prompt.user.contains("{{"));
    }

    #[test]
    fn test_defaults_for_missing_metadata() {
        let prompt = PromptAssembler::default().assemble(&QuestionContext::new("Vraag?"), &retrieved());
        assert!(prompt.user.contains("Asked by: Onbekend (Onbekend)"));
        assert!(prompt.user.contains("Category: Algemeen"));
    }

    #[test]
    fn test_system_prompt_states_citation_contract() {
        let prompt = PromptAssembler::default()
            .with_language("English")
            .assemble(&QuestionContext::new("Q?"), &retrieved());

        assert!(prompt.system.contains("Write the answer in English"));
        assert!(prompt.system.contains("[source-1][source-3]"));
        assert!(!prompt.system.contains("{{language}}"));
    }

    #[test]
    fn test_word_budget_limits_sources() {
        let prompt = PromptAssembler::default()
            .with_max_context_words(6)
            .assemble(&QuestionContext::new("Q?"), &retrieved());

        assert_eq!(prompt.sources.len(), 1);
        assert!(!prompt.user.contains("[source-2]"));

        // The first page is kept even when it alone exceeds the budget
        let prompt = PromptAssembler::default()
            .with_max_context_words(1)
            .assemble(&QuestionContext::new("Q?"), &retrieved());
        assert_eq!(prompt.sources.len(), 1);
    }

    #[test]
    fn test_page_text_with_placeholders_is_kept_verbatim() {
        let retrieved = RetrievalResult {
            results: vec![ScoredPage {
                page: Page::new("Doc3.pdf", 2, "Template literal {{question}} in page", "/kb/Doc3.pdf"),
                score: 0.5,
            }],
        };

        let assembler = PromptAssembler::default();
        let first = assembler.assemble(&QuestionContext::new("VRAAG"), &retrieved);
        for _ in 0..50 {
            let prompt = assembler.assemble(&QuestionContext::new("VRAAG"), &retrieved);
            assert_eq!(prompt.user, first.user);
        }
        assert!(first.user.contains("Template literal {{question}} in page"));
        assert!(!first.user.contains("Template literal VRAAG in page"));
    }

    #[test]
    fn test_empty_retrieval_says_no_context() {
        let prompt = PromptAssembler::default()
            .assemble(&QuestionContext::new("Q?"), &RetrievalResult::default());

        assert!(prompt.sources.is_empty());
        assert!(prompt.user.contains(NO_CONTEXT));
    }
}
