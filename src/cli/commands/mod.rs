//! CLI command implementations.

mod ask;
mod config;
mod draft;
mod list;
mod page;
mod search;
mod serve;

pub use ask::{run_ask, AskOptions};
pub use config::run_config;
pub use draft::{run_draft, DraftOptions};
pub use list::run_list;
pub use page::run_page;
pub use search::run_search;
pub use serve::run_serve;

use crate::cli::Output;
use crate::config::Settings;
use crate::generation::OpenAIGenerator;
use crate::knowledge::KnowledgeBase;
use crate::rag::AnswerEngine;
use anyhow::Result;
use std::sync::Arc;

/// Load and index the corpus, reporting skipped documents.
fn load_knowledge(settings: &Settings) -> Result<Arc<KnowledgeBase>> {
    let spinner = Output::spinner("Loading corpus...");
    let knowledge = KnowledgeBase::from_settings(settings);
    spinner.finish_and_clear();

    let knowledge = knowledge?;
    let snapshot = knowledge.snapshot();
    let report = snapshot.pages().report();
    for skipped in &report.skipped_documents {
        Output::warning(&format!("Skipped {}: {}", skipped.path.display(), skipped.reason));
    }
    if !report.skipped_pages.is_empty() {
        Output::warning(&format!("{} pages could not be read", report.skipped_pages.len()));
    }

    Ok(Arc::new(knowledge))
}

/// Build an answer engine backed by the OpenAI generator.
fn build_engine(
    settings: &Settings,
    knowledge: Arc<KnowledgeBase>,
    model: Option<String>,
) -> Result<AnswerEngine> {
    let mut generator = OpenAIGenerator::from_settings(&settings.generation)?;
    if let Some(model) = model {
        generator = generator.with_model(model);
    }
    Ok(AnswerEngine::from_settings(settings, knowledge, Arc::new(generator))?)
}
