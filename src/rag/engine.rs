//! Answer generation: retrieve, assemble, generate, parse.

use super::citation::{AnswerResult, CitationParser};
use super::prompt::{PromptAssembler, QuestionContext};
use crate::config::{Prompts, Settings};
use crate::error::{KamerbronError, Result};
use crate::generation::Generator;
use crate::knowledge::KnowledgeBase;
use crate::retrieval::RetrievalResult;
use std::sync::Arc;
use tracing::{debug, info, instrument};

const NO_SOURCES_ANSWER_NL: &str =
    "Er zijn geen relevante bronnen gevonden in de kennisbank om deze vraag te beantwoorden.";
const NO_SOURCES_ANSWER_EN: &str =
    "No relevant sources were found in the knowledge base to answer this question.";

/// Fixed reply for an empty retrieval, in the answer language.
///
/// English is recognised by name; anything else gets Dutch.
fn no_sources_answer(language: &str) -> &'static str {
    match language.trim().to_lowercase().as_str() {
        "english" | "engels" | "en" => NO_SOURCES_ANSWER_EN,
        _ => NO_SOURCES_ANSWER_NL,
    }
}

/// Answers questions from the knowledge base with per-sentence citations.
///
/// Every call to [`answer`](Self::answer) works on the snapshot current when
/// it starts and keeps its own source numbering, so concurrent calls share
/// nothing mutable.
pub struct AnswerEngine {
    knowledge: Arc<KnowledgeBase>,
    generator: Arc<dyn Generator>,
    assembler: PromptAssembler,
    parser: CitationParser,
    top_k: usize,
    min_score: f32,
}

impl AnswerEngine {
    pub fn new(knowledge: Arc<KnowledgeBase>, generator: Arc<dyn Generator>) -> Self {
        Self {
            knowledge,
            generator,
            assembler: PromptAssembler::default(),
            parser: CitationParser::new(),
            top_k: 5,
            min_score: 0.0,
        }
    }

    /// Create an engine configured from settings, loading custom prompts.
    pub fn from_settings(
        settings: &Settings,
        knowledge: Arc<KnowledgeBase>,
        generator: Arc<dyn Generator>,
    ) -> Result<Self> {
        let prompts = Prompts::load(
            settings.prompts.custom_dir.as_deref(),
            Some(&settings.prompts.variables),
        )?;

        let assembler = PromptAssembler::new(prompts)
            .with_language(settings.prompts.language.clone())
            .with_max_context_words(settings.prompts.max_context_words);

        Ok(Self::new(knowledge, generator)
            .with_assembler(assembler)
            .with_top_k(settings.retrieval.top_k)
            .with_min_score(settings.retrieval.min_score))
    }

    pub fn with_assembler(mut self, assembler: PromptAssembler) -> Self {
        self.assembler = assembler;
        self
    }

    /// Set the number of pages retrieved per question.
    pub fn with_top_k(mut self, top_k: usize) -> Self {
        self.top_k = top_k;
        self
    }

    /// Set the minimum similarity score threshold.
    pub fn with_min_score(mut self, min_score: f32) -> Self {
        self.min_score = min_score;
        self
    }

    pub fn top_k(&self) -> usize {
        self.top_k
    }

    pub fn knowledge(&self) -> &Arc<KnowledgeBase> {
        &self.knowledge
    }

    /// Rank pages for a query against the current snapshot.
    pub fn search(&self, query: &str, top_k: usize) -> RetrievalResult {
        self.knowledge
            .snapshot()
            .retriever()
            .with_min_score(self.min_score)
            .search(query, top_k)
    }

    /// Answer a question with the engine's default `top_k`.
    pub async fn answer(&self, question: &QuestionContext) -> Result<AnswerResult> {
        self.answer_with_top_k(question, self.top_k).await
    }

    /// Answer a question from at most `top_k` retrieved pages.
    ///
    /// Generation failures are returned as they are; nothing is retried here.
    #[instrument(skip(self, question), fields(question = %question.question))]
    pub async fn answer_with_top_k(
        &self,
        question: &QuestionContext,
        top_k: usize,
    ) -> Result<AnswerResult> {
        if question.question.trim().is_empty() {
            return Err(KamerbronError::InvalidInput("question is empty".to_string()));
        }

        info!("Answering question");

        let retrieved = self.search(&question.question, top_k);
        debug!(
            best_score = ?retrieved.best_score(),
            "Retrieved {} pages",
            retrieved.len()
        );

        if retrieved.is_empty() {
            debug!("No pages retrieved; skipping generation");
            return Ok(AnswerResult {
                answer_text: no_sources_answer(self.assembler.language()).to_string(),
                sources: Vec::new(),
                sentences: Vec::new(),
            });
        }

        let prompt = self.assembler.assemble(question, &retrieved);
        debug!(
            "Prompt assembled with {} sources using {}",
            prompt.sources.len(),
            self.generator.model()
        );

        let raw = self.generator.generate(&prompt.system, &prompt.user).await?;
        let result = self.parser.parse(&raw, &prompt.sources)?;

        info!(
            "Answer has {} cited sentences from {} sources",
            result.sentences.len(),
            prompt.sources.len()
        );

        Ok(result)
    }
}
