//! Pre-flight checks before expensive operations.
//!
//! Validates that configuration is in place before starting work that would
//! otherwise fail after the corpus has been loaded.

use crate::config::Settings;
use crate::error::{KamerbronError, Result};

/// Requirements for different operations.
#[derive(Debug, Clone, Copy)]
pub enum Operation {
    /// Generating answers requires an API key and a corpus.
    Generate,
    /// Searching and page lookup require a corpus.
    Search,
}

/// Run pre-flight checks for the given operation.
pub fn check(operation: Operation, settings: &Settings) -> Result<()> {
    check_corpus_dir(settings)?;
    if let Operation::Generate = operation {
        check_api_key(settings)?;
    }
    Ok(())
}

/// Check that the corpus directory exists.
fn check_corpus_dir(settings: &Settings) -> Result<()> {
    let dir = settings.corpus_dir();
    if dir.is_dir() {
        Ok(())
    } else {
        Err(KamerbronError::Config(format!(
            "Corpus directory {} does not exist. Create it and add PDF documents, or pass --corpus <dir>.",
            dir.display()
        )))
    }
}

/// Check if OpenAI API key is configured.
///
/// A custom `base_url` may point at a server that needs no key.
fn check_api_key(settings: &Settings) -> Result<()> {
    if settings.generation.base_url.is_some() {
        return Ok(());
    }
    match std::env::var("OPENAI_API_KEY") {
        Ok(key) if !key.is_empty() => Ok(()),
        Ok(_) => Err(KamerbronError::Config(
            "OPENAI_API_KEY is empty. Set it with: export OPENAI_API_KEY='sk-...'".to_string(),
        )),
        Err(_) => Err(KamerbronError::Config(
            "OPENAI_API_KEY not set. Set it with: export OPENAI_API_KEY='sk-...'".to_string(),
        )),
    }
}
