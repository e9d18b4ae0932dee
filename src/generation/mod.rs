//! Text generation behind a narrow `(system, user) -> text` seam.

mod openai;

pub use openai::OpenAIGenerator;

use crate::error::Result;
use async_trait::async_trait;

/// Trait for answer text generation.
///
/// Implementations report failures as errors and never retry on their own.
#[async_trait]
pub trait Generator: Send + Sync {
    /// Generate text for a system instruction and a user message.
    async fn generate(&self, system: &str, user: &str) -> Result<String>;

    /// Model identifier, for logging.
    fn model(&self) -> &str;
}
