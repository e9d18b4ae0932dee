//! Prompt templates for Kamerbron.
//!
//! Prompts can be customized by placing TOML files in the custom prompts directory.

use regex::{Captures, Regex};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::sync::OnceLock;

/// Collection of all prompt templates.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
#[derive(Default)]
pub struct Prompts {
    pub answer: AnswerPrompts,
    /// Custom variables from config, available in all prompts.
    #[serde(skip)]
    pub variables: std::collections::HashMap<String, String>,
}

/// Prompts for drafting a cited answer to a parliamentary question.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AnswerPrompts {
    pub system: String,
    pub user: String,
}

impl Default for AnswerPrompts {
    fn default() -> Self {
        Self {
            system: r#"You are a civil servant at the Dutch Ministry of Economic Affairs preparing draft answers to parliamentary questions. The Minister will use your draft to answer in the House of Representatives.

Requirements:
1. Write the answer in {{language}}, in a formal tone, as if the Minister is speaking in the first person.
2. Use ONLY information from the numbered sources in the context. Never add facts that are not in the sources.
3. End EVERY sentence with one or more citation markers that refer to the source tags, for example:
   "Statement. [source-1]"
   "Statement supported by two sources. [source-1][source-3]"
4. Place the markers after the final punctuation of the sentence. Never write a sentence without a marker.
5. If the context contains no relevant information, say explicitly that no sources are available instead of inventing an answer, and cite the source you consulted.
6. Be concise but complete and factual (roughly 100-300 words).
7. Start directly with the answer, without a header and without repeating the question."#
                .to_string(),

            user: r#"Parliamentary question:
{{question}}

Asked by: {{speaker}} ({{party}})
Category: {{category}}

Sources from the knowledge base (most relevant first):

{{context}}

Write the draft answer now, following the citation requirements."#
                .to_string(),
        }
    }
}

impl Prompts {
    /// Load prompts from the default location, with optional custom directory and variables.
    pub fn load(
        custom_dir: Option<&str>,
        custom_variables: Option<&std::collections::HashMap<String, String>>,
    ) -> crate::error::Result<Self> {
        let mut prompts = Prompts::default();

        if let Some(vars) = custom_variables {
            prompts.variables = vars.clone();
        }

        if let Some(dir) = custom_dir {
            let custom_path = PathBuf::from(shellexpand::tilde(dir).to_string());

            let answer_path = custom_path.join("answer.toml");
            if answer_path.exists() {
                let content = std::fs::read_to_string(&answer_path)?;
                prompts.answer = toml::from_str(&content)?;
            }
        }

        Ok(prompts)
    }

    /// Render a prompt template with the given variables.
    ///
    /// Placeholders are substituted in one pass, so substituted values are
    /// never scanned again. Unknown placeholders are left as they are.
    pub fn render(template: &str, vars: &std::collections::HashMap<String, String>) -> String {
        static PLACEHOLDER: OnceLock<Regex> = OnceLock::new();
        let placeholder =
            PLACEHOLDER.get_or_init(|| Regex::new(r"\{\{(\w+)\}\}").expect("Invalid regex"));

        placeholder
            .replace_all(template, |caps: &Captures| match vars.get(&caps[1]) {
                Some(value) => value.clone(),
                None => caps[0].to_string(),
            })
            .into_owned()
    }

    /// Render a prompt template with both provided variables and custom config variables.
    /// Provided variables take precedence over custom config variables.
    pub fn render_with_custom(
        &self,
        template: &str,
        vars: &std::collections::HashMap<String, String>,
    ) -> String {
        let mut merged = self.variables.clone();
        for (key, value) in vars {
            merged.insert(key.clone(), value.clone());
        }
        Self::render(template, &merged)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    #[test]
    fn test_default_prompts() {
        let prompts = Prompts::default();
        assert!(prompts.answer.system.contains("[source-1]"));
        assert!(prompts.answer.system.contains("{{language}}"));
        assert!(prompts.answer.user.contains("{{context}}"));
    }

    #[test]
    fn test_render_template() {
        let template = "Hello {{name}}, you have {{count}} messages.";
        let mut vars = HashMap::new();
        vars.insert("name".to_string(), "Alice".to_string());
        vars.insert("count".to_string(), "5".to_string());

        let result = Prompts::render(template, &vars);
        assert_eq!(result, "Hello Alice, you have 5 messages.");
    }

    #[test]
    fn test_render_does_not_rescan_values() {
        let template = "{{context}} / {{question}}";
        let mut vars = HashMap::new();
        vars.insert("context".to_string(), "literal {{question}} and {{missing}}".to_string());
        vars.insert("question".to_string(), "VRAAG".to_string());

        for _ in 0..50 {
            let result = Prompts::render(template, &vars);
            assert_eq!(result, "literal {{question}} and {{missing}} / VRAAG");
        }
    }

    #[test]
    fn test_render_keeps_unknown_placeholders() {
        let result = Prompts::render("Hello {{name}}", &HashMap::new());
        assert_eq!(result, "Hello {{name}}");
    }

    #[test]
    fn test_provided_vars_override_custom() {
        let mut custom = HashMap::new();
        custom.insert("ministry".to_string(), "EZ".to_string());
        custom.insert("language".to_string(), "English".to_string());
        let prompts = Prompts::load(None, Some(&custom)).unwrap();

        let mut vars = HashMap::new();
        vars.insert("language".to_string(), "Nederlands".to_string());

        let result = prompts.render_with_custom("{{ministry}} / {{language}}", &vars);
        assert_eq!(result, "EZ / Nederlands");
    }

    #[test]
    fn test_custom_answer_prompt_file() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(
            dir.path().join("answer.toml"),
            "system = \"Custom system\"\nuser = \"Q: {{question}}\"\n",
        )
        .unwrap();

        let prompts = Prompts::load(dir.path().to_str(), None).unwrap();
        assert_eq!(prompts.answer.system, "Custom system");
        assert_eq!(prompts.answer.user, "Q: {{question}}");
    }
}
