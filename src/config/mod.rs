//! Configuration module for Kamerbron.
//!
//! Handles loading and managing application settings and prompt templates.

mod prompts;
mod settings;

pub use prompts::{AnswerPrompts, Prompts};
pub use settings::{
    CorpusSettings, GeneralSettings, GenerationSettings, IndexSettings, PromptSettings,
    RetrievalSettings, Settings,
};
