//! List command implementation.

use super::load_knowledge;
use crate::cli::preflight::{self, Operation};
use crate::cli::Output;
use crate::config::Settings;
use anyhow::Result;

/// Run the list command.
pub async fn run_list(settings: Settings) -> Result<()> {
    preflight::check(Operation::Search, &settings)?;

    let knowledge = load_knowledge(&settings)?;
    let documents = knowledge.documents();

    if documents.is_empty() {
        Output::info(&format!(
            "No documents found. Add PDF files to {}",
            settings.corpus_dir().display()
        ));
        return Ok(());
    }

    Output::header(&format!("Documents ({})", documents.len()));
    println!();

    for doc in &documents {
        Output::document_info(&doc.title, &doc.source, doc.page_count);
    }

    let total_pages: usize = documents.iter().map(|d| d.page_count).sum();
    println!();
    Output::kv("Total documents", &documents.len().to_string());
    Output::kv("Total pages", &total_pages.to_string());

    Ok(())
}
