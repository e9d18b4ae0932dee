//! CLI module for Kamerbron.

pub mod commands;
mod output;
pub mod preflight;

pub use output::Output;

use clap::{Parser, Subcommand};

/// Kamerbron - cited draft answers to parliamentary questions
///
/// Searches a folder of policy documents page by page and drafts answers in
/// which every sentence points at the page it came from.
#[derive(Parser, Debug)]
#[command(name = "kamerbron")]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Increase verbosity (-v for info, -vv for debug, -vvv for trace)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Path to configuration file
    #[arg(short, long, global = true, env = "KAMERBRON_CONFIG")]
    pub config: Option<String>,

    /// Corpus directory (overrides the configured one)
    #[arg(long, global = true, env = "KAMERBRON_CORPUS")]
    pub corpus: Option<String>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Rank corpus pages against a query
    Search {
        /// Search query
        query: String,

        /// Maximum number of results
        #[arg(short = 'k', long)]
        top_k: Option<usize>,
    },

    /// Draft a cited answer to a single question
    Ask {
        /// The question to answer
        question: String,

        /// Member of parliament who asked the question
        #[arg(long)]
        speaker: Option<String>,

        /// Party of the member
        #[arg(long)]
        party: Option<String>,

        /// Question category
        #[arg(long)]
        category: Option<String>,

        /// Number of pages to retrieve as sources
        #[arg(short = 'k', long)]
        top_k: Option<usize>,

        /// LLM model to use for answer generation
        #[arg(short, long)]
        model: Option<String>,

        /// Print the structured answer as JSON
        #[arg(long)]
        json: bool,
    },

    /// Draft answers for every question in a question file
    Draft {
        /// JSON file with questions
        #[arg(short, long)]
        questions: String,

        /// Where to write the updated questions (defaults to the input file)
        #[arg(short, long)]
        output: Option<String>,

        /// Only draft these question ids (repeatable)
        #[arg(long = "id")]
        ids: Vec<String>,

        /// Number of questions drafted at the same time
        #[arg(long, default_value = "2")]
        concurrency: usize,

        /// LLM model to use for answer generation
        #[arg(short, long)]
        model: Option<String>,
    },

    /// Show the stored text of one page
    Page {
        /// Document file name, e.g. "Werkprogramma ATR 2025.pdf"
        source: String,

        /// 1-based page number
        page: u32,
    },

    /// List documents in the corpus
    List,

    /// Start HTTP API server
    Serve {
        /// Host to bind to
        #[arg(long, default_value = "127.0.0.1")]
        host: String,

        /// Port to bind to
        #[arg(short, long, default_value = "3000")]
        port: u16,
    },

    /// Manage configuration
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },
}

#[derive(Subcommand, Debug)]
pub enum ConfigAction {
    /// Show current configuration
    Show,

    /// Open configuration file in editor
    Edit,

    /// Show configuration file path
    Path,
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_parse_ask() {
        let cli = Cli::try_parse_from([
            "kamerbron", "ask", "Hoe staat het met de regeldruk?", "--speaker", "Jansen", "-k", "3",
        ])
        .unwrap();

        match cli.command {
            Commands::Ask { question, speaker, top_k, party, .. } => {
                assert_eq!(question, "Hoe staat het met de regeldruk?");
                assert_eq!(speaker.as_deref(), Some("Jansen"));
                assert_eq!(party, None);
                assert_eq!(top_k, Some(3));
            }
            other => panic!("unexpected command: {:?}", other),
        }
    }

    #[test]
    fn test_parse_draft_ids() {
        let cli = Cli::try_parse_from([
            "kamerbron", "draft", "-q", "questions.json", "--id", "q1", "--id", "q2",
        ])
        .unwrap();

        match cli.command {
            Commands::Draft { questions, ids, concurrency, output, .. } => {
                assert_eq!(questions, "questions.json");
                assert_eq!(ids, vec!["q1", "q2"]);
                assert_eq!(concurrency, 2);
                assert_eq!(output, None);
            }
            other => panic!("unexpected command: {:?}", other),
        }
    }
}
