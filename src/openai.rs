//! OpenAI client configuration.

use crate::config::GenerationSettings;
use crate::error::{KamerbronError, Result};
use async_openai::{config::OpenAIConfig, Client};
use std::time::Duration;

/// Create an OpenAI client from generation settings.
///
/// `base_url` points the client at any OpenAI-compatible endpoint.
pub fn create_client(settings: &GenerationSettings) -> Result<Client<OpenAIConfig>> {
    create_client_with_timeout(
        Duration::from_secs(settings.timeout_secs),
        settings.base_url.as_deref(),
    )
}

/// Create an OpenAI client with a custom timeout.
pub fn create_client_with_timeout(
    timeout: Duration,
    base_url: Option<&str>,
) -> Result<Client<OpenAIConfig>> {
    let http_client = reqwest::Client::builder()
        .timeout(timeout)
        .build()
        .map_err(|e| KamerbronError::Config(format!("Failed to create HTTP client: {}", e)))?;

    let mut config = OpenAIConfig::default();
    if let Some(url) = base_url {
        config = config.with_api_base(url);
    }

    Ok(Client::with_config(config).with_http_client(http_client))
}
