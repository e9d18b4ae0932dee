//! Draft command implementation.

use super::{build_engine, load_knowledge};
use crate::cli::preflight::{self, Operation};
use crate::cli::Output;
use crate::config::Settings;
use crate::questions::{draft_all, load_questions, save_questions, DraftAnswer};
use anyhow::{Context, Result};
use std::path::PathBuf;

/// Options for a drafting run.
pub struct DraftOptions {
    pub output: Option<String>,
    pub ids: Vec<String>,
    pub concurrency: usize,
    pub model: Option<String>,
}

/// Run the draft command.
pub async fn run_draft(questions_file: &str, options: DraftOptions, settings: Settings) -> Result<()> {
    if let Err(e) = preflight::check(Operation::Generate, &settings) {
        Output::error(&format!("{}", e));
        return Err(e.into());
    }

    let input = Settings::expand_path(questions_file);
    let output = options
        .output
        .as_deref()
        .map(Settings::expand_path)
        .unwrap_or_else(|| PathBuf::from(&input));

    let mut questions = load_questions(&input)
        .with_context(|| format!("Failed to read questions from {}", input.display()))?;
    Output::info(&format!("Loaded {} questions", questions.len()));

    let knowledge = load_knowledge(&settings)?;
    let engine = build_engine(&settings, knowledge, options.model)?;

    let selected = if options.ids.is_empty() {
        questions.len()
    } else {
        questions.iter().filter(|q| options.ids.contains(&q.id)).count()
    };
    let progress = Output::progress_bar(selected as u64, "Drafting answers");

    let summary = draft_all(&engine, &mut questions, &options.ids, options.concurrency, |q| {
        progress.inc(1);
        if let Some(error) = &q.draft_error {
            progress.println(format!("  {} failed: {}", q.id, error));
        } else if let Some(answer) = q.draft_answer.as_ref().and_then(DraftAnswer::as_cited) {
            if answer.cited_source_ids().is_empty() {
                progress.println(format!("  {} has no citations", q.id));
            }
        }
    })
    .await;
    progress.finish_and_clear();

    save_questions(&output, &questions)
        .with_context(|| format!("Failed to write questions to {}", output.display()))?;

    Output::success(&format!(
        "Drafted {} answers ({} failed) -> {}",
        summary.drafted,
        summary.failed,
        output.display()
    ));
    if summary.skipped > 0 {
        Output::kv("Not selected", &summary.skipped.to_string());
    }

    Ok(())
}
