//! Cited question answering over the knowledge base.
//!
//! Retrieved pages are numbered as `source-N` in the prompt, the model is
//! asked to cite them per sentence, and the reply is parsed back into a
//! sentence-to-source map.

mod citation;
mod engine;
mod prompt;

pub use citation::{AnswerResult, AnswerStatus, CitationParser, CitationRef, Sentence, Token};
pub use engine::AnswerEngine;
pub use prompt::{AssembledPrompt, PromptAssembler, QuestionContext, Source};
