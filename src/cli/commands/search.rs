//! Search command implementation.

use super::load_knowledge;
use crate::cli::preflight::{self, Operation};
use crate::cli::Output;
use crate::config::Settings;
use anyhow::Result;

/// Run the search command.
pub async fn run_search(query: &str, top_k: Option<usize>, settings: Settings) -> Result<()> {
    preflight::check(Operation::Search, &settings)?;

    let knowledge = load_knowledge(&settings)?;
    let top_k = top_k.unwrap_or(settings.retrieval.top_k);

    let results = knowledge
        .snapshot()
        .retriever()
        .with_min_score(settings.retrieval.min_score)
        .search(query, top_k);

    if results.is_empty() {
        Output::warning("No pages found. Is the corpus empty?");
        return Ok(());
    }

    Output::success(&format!("Found {} pages", results.len()));
    for result in results.iter() {
        Output::search_result(
            result.page.title(),
            result.page.page_number,
            result.score,
            &result.page.content,
        );
    }

    Ok(())
}
