//! Page command implementation.

use super::load_knowledge;
use crate::cli::preflight::{self, Operation};
use crate::cli::Output;
use crate::config::Settings;
use crate::error::KamerbronError;
use anyhow::Result;

/// Print the stored text of one page.
pub async fn run_page(source: &str, page: u32, settings: Settings) -> Result<()> {
    preflight::check(Operation::Search, &settings)?;

    let knowledge = load_knowledge(&settings)?;

    match knowledge.get_page(source, page) {
        Some(found) => {
            Output::header(&format!("{} p.{}", found.title(), found.page_number));
            Output::kv("File", &found.file_path.display().to_string());
            println!("\n{}", found.content);
            Ok(())
        }
        None => {
            let e = KamerbronError::PageNotFound {
                document: source.to_string(),
                page,
            };
            Output::error(&e.to_string());
            Err(e.into())
        }
    }
}
