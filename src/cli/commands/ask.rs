//! Ask command implementation.

use super::{build_engine, load_knowledge};
use crate::cli::preflight::{self, Operation};
use crate::cli::Output;
use crate::config::Settings;
use crate::rag::{AnswerStatus, QuestionContext};
use anyhow::Result;

/// Options for a single question.
pub struct AskOptions {
    pub speaker: Option<String>,
    pub party: Option<String>,
    pub category: Option<String>,
    pub top_k: Option<usize>,
    pub model: Option<String>,
    pub json: bool,
}

/// Run the ask command.
pub async fn run_ask(question: &str, options: AskOptions, settings: Settings) -> Result<()> {
    if let Err(e) = preflight::check(Operation::Generate, &settings) {
        Output::error(&format!("{}", e));
        return Err(e.into());
    }

    let knowledge = load_knowledge(&settings)?;
    let engine = build_engine(&settings, knowledge, options.model)?;

    let context = QuestionContext {
        question: question.to_string(),
        speaker: options.speaker,
        party: options.party,
        category: options.category,
    };
    let top_k = options.top_k.unwrap_or(engine.top_k());

    let spinner = Output::spinner("Drafting answer...");
    let result = engine.answer_with_top_k(&context, top_k).await;
    spinner.finish_and_clear();

    let answer = match result {
        Ok(answer) => answer,
        Err(e) => {
            Output::error(&format!("Failed to generate answer: {}", e));
            return Err(e.into());
        }
    };

    if options.json {
        println!("{}", serde_json::to_string_pretty(&answer)?);
        return Ok(());
    }

    println!("\n{}\n", answer.answer_text);

    if answer.status() == AnswerStatus::NoCitationsFound && !answer.sources.is_empty() {
        Output::warning("The answer does not cite any source.");
    }

    if !answer.sentences.is_empty() {
        Output::header("Cited sentences");
        for sentence in &answer.sentences {
            let tags: Vec<String> = sentence
                .citations
                .iter()
                .map(|c| format!("{} p.{}", c.title, c.page))
                .collect();
            Output::cited_sentence(&sentence.text, &tags);
        }
    }

    if !answer.sources.is_empty() {
        Output::header("Sources");
        for source in &answer.sources {
            Output::source(&source.id, &source.title, source.page, source.similarity_score);
        }
    }

    Ok(())
}
