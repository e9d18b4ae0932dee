//! Kamerbron - cited draft answers to parliamentary questions
//!
//! Kamerbron ("chamber source") drafts answers to parliamentary questions from
//! a folder of policy documents, and ties every sentence of the draft to the
//! document page it is based on.
//!
//! # Overview
//!
//! - Documents are split into pages and indexed with TF-IDF
//! - A question retrieves the most similar pages, which are numbered
//!   `source-1`, `source-2`, ... in the prompt
//! - The model answers with `[source-N]` markers after each sentence
//! - The reply is parsed into sentences with resolved page citations
//!
//! # Architecture
//!
//! - `config` - Settings and prompt templates
//! - `corpus` - Page extraction and the page store
//! - `index` - Tokenizer and TF-IDF index
//! - `retrieval` - Ranking pages against a query
//! - `knowledge` - Shared snapshot of pages and index
//! - `rag` - Prompt assembly, citation parsing and the answer engine
//! - `generation` - Text generation backends
//! - `questions` - Question files and batch drafting
//!
//! # Example
//!
//! ```rust,no_run
//! use kamerbron::config::Settings;
//! use kamerbron::generation::OpenAIGenerator;
//! use kamerbron::knowledge::KnowledgeBase;
//! use kamerbron::rag::{AnswerEngine, QuestionContext};
//! use std::sync::Arc;
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let settings = Settings::load()?;
//!     let knowledge = Arc::new(KnowledgeBase::from_settings(&settings)?);
//!     let generator = Arc::new(OpenAIGenerator::from_settings(&settings.generation)?);
//!     let engine = AnswerEngine::from_settings(&settings, knowledge, generator)?;
//!
//!     let answer = engine
//!         .answer(&QuestionContext::new("Hoe ontwikkelt de regeldruk zich?").with_party("VVD"))
//!         .await?;
//!     println!("{}", answer.format_for_display());
//!
//!     Ok(())
//! }
//! ```

pub mod cli;
pub mod config;
pub mod corpus;
pub mod error;
pub mod generation;
pub mod index;
pub mod knowledge;
pub mod openai;
pub mod questions;
pub mod rag;
pub mod retrieval;

pub use error::{KamerbronError, Result};
