//! Configuration settings for Kamerbron.

use crate::index::StopwordLanguage;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Root configuration structure.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
#[derive(Default)]
pub struct Settings {
    pub general: GeneralSettings,
    pub corpus: CorpusSettings,
    pub index: IndexSettings,
    pub retrieval: RetrievalSettings,
    pub generation: GenerationSettings,
    pub prompts: PromptSettings,
}

/// General application settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GeneralSettings {
    /// Directory for storing application data.
    pub data_dir: String,
    /// Log level (trace, debug, info, warn, error).
    pub log_level: String,
}

impl Default for GeneralSettings {
    fn default() -> Self {
        Self {
            data_dir: "~/.kamerbron".to_string(),
            log_level: "warn".to_string(),
        }
    }
}

/// Knowledge base corpus settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct CorpusSettings {
    /// Directory holding the source documents (one logical document per file).
    pub dir: String,
}

impl Default for CorpusSettings {
    fn default() -> Self {
        Self {
            dir: "~/.kamerbron/knowledge".to_string(),
        }
    }
}

/// TF-IDF index settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct IndexSettings {
    /// Built-in stopword list (dutch, english, none).
    pub stopwords: StopwordLanguage,
    /// Additional stopwords on top of the built-in list.
    pub extra_stopwords: Vec<String>,
    /// Minimum token length in characters.
    pub min_token_len: usize,
}

impl Default for IndexSettings {
    fn default() -> Self {
        Self {
            stopwords: StopwordLanguage::Dutch,
            extra_stopwords: Vec::new(),
            min_token_len: 2,
        }
    }
}

/// Retrieval settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RetrievalSettings {
    /// Number of pages handed to the model.
    pub top_k: usize,
    /// Minimum cosine similarity for a page to be retrieved.
    pub min_score: f32,
}

impl Default for RetrievalSettings {
    fn default() -> Self {
        Self {
            top_k: 5,
            min_score: 0.0,
        }
    }
}

/// Text generation settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GenerationSettings {
    /// Chat model used for drafting answers.
    pub model: String,
    /// Sampling temperature.
    pub temperature: f32,
    /// Maximum tokens in the generated answer.
    pub max_tokens: u32,
    /// Request timeout in seconds.
    pub timeout_secs: u64,
    /// OpenAI-compatible endpoint (defaults to the OpenAI API).
    pub base_url: Option<String>,
}

impl Default for GenerationSettings {
    fn default() -> Self {
        Self {
            model: "gpt-4o".to_string(),
            temperature: 0.0,
            max_tokens: 4000,
            timeout_secs: 300,
            base_url: None,
        }
    }
}

/// Prompt customization settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PromptSettings {
    /// Directory for custom prompts (overrides defaults).
    pub custom_dir: Option<String>,
    /// Custom variables available in all prompts as {{variable_name}}.
    pub variables: std::collections::HashMap<String, String>,
    /// Language the answer must be written in.
    pub language: String,
    /// Word budget for the context block.
    pub max_context_words: usize,
}

impl Default for PromptSettings {
    fn default() -> Self {
        Self {
            custom_dir: None,
            variables: std::collections::HashMap::new(),
            language: "Nederlands".to_string(),
            max_context_words: 50_000,
        }
    }
}

impl Settings {
    /// Load settings from the default configuration file.
    pub fn load() -> crate::error::Result<Self> {
        Self::load_from(None)
    }

    /// Load settings from a specific path, or default location if None.
    pub fn load_from(path: Option<&PathBuf>) -> crate::error::Result<Self> {
        let config_path = match path {
            Some(p) => p.clone(),
            None => Self::default_config_path(),
        };

        if config_path.exists() {
            let content = std::fs::read_to_string(&config_path)?;
            let settings: Settings = toml::from_str(&content)?;
            Ok(settings)
        } else {
            Ok(Settings::default())
        }
    }

    /// Save settings to the default configuration file.
    pub fn save(&self) -> crate::error::Result<()> {
        self.save_to(&Self::default_config_path())
    }

    /// Save settings to a specific path.
    pub fn save_to(&self, path: &PathBuf) -> crate::error::Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let content = toml::to_string_pretty(self)
            .map_err(|e| crate::error::KamerbronError::Config(e.to_string()))?;
        std::fs::write(path, content)?;
        Ok(())
    }

    /// Get the default configuration file path.
    pub fn default_config_path() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("kamerbron")
            .join("config.toml")
    }

    /// Expand shell variables in paths (e.g., ~).
    pub fn expand_path(path: &str) -> PathBuf {
        PathBuf::from(shellexpand::tilde(path).to_string())
    }

    /// Get the expanded data directory path.
    pub fn data_dir(&self) -> PathBuf {
        Self::expand_path(&self.general.data_dir)
    }

    /// Get the expanded corpus directory path.
    pub fn corpus_dir(&self) -> PathBuf {
        Self::expand_path(&self.corpus.dir)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_partial_config_uses_defaults() {
        let settings: Settings = toml::from_str(
            r#"
            [retrieval]
            top_k = 8

            [index]
            stopwords = "english"
            extra_stopwords = ["minister"]
            "#,
        )
        .unwrap();

        assert_eq!(settings.retrieval.top_k, 8);
        assert_eq!(settings.retrieval.min_score, 0.0);
        assert_eq!(settings.index.stopwords, StopwordLanguage::English);
        assert_eq!(settings.index.extra_stopwords, vec!["minister".to_string()]);
        assert_eq!(settings.index.min_token_len, 2);
        assert_eq!(settings.prompts.language, "Nederlands");
    }

    #[test]
    fn test_save_and_reload() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("config.toml");

        let mut settings = Settings::default();
        settings.corpus.dir = "/srv/kennisbank".to_string();
        settings.generation.model = "gpt-4.1".to_string();
        settings.save_to(&path).unwrap();

        let loaded = Settings::load_from(Some(&path)).unwrap();
        assert_eq!(loaded.corpus_dir(), PathBuf::from("/srv/kennisbank"));
        assert_eq!(loaded.generation.model, "gpt-4.1");
    }

    #[test]
    fn test_missing_config_file_gives_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let settings = Settings::load_from(Some(&dir.path().join("absent.toml"))).unwrap();
        assert_eq!(settings.retrieval.top_k, 5);
        assert_eq!(settings.index.stopwords, StopwordLanguage::Dutch);
    }
}
