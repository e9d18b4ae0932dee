//! Kamerbron CLI entry point.

use anyhow::Result;
use clap::Parser;
use kamerbron::cli::commands::{self, AskOptions, DraftOptions};
use kamerbron::cli::{Cli, Commands};
use kamerbron::config::Settings;
use std::path::PathBuf;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Load configuration
    let config_path = cli.config.as_deref().map(PathBuf::from);
    let mut settings = Settings::load_from(config_path.as_ref())?;
    if let Some(dir) = &cli.corpus {
        settings.corpus.dir = dir.clone();
    }

    // Initialize logging
    let log_level = match cli.verbose {
        0 => settings.general.log_level.clone(),
        1 => "info".to_string(),
        2 => "debug".to_string(),
        _ => "trace".to_string(),
    };

    tracing_subscriber::registry()
        .with(EnvFilter::new(
            std::env::var("RUST_LOG").unwrap_or_else(|_| format!("kamerbron={}", log_level)),
        ))
        .with(tracing_subscriber::fmt::layer().with_target(false))
        .init();

    std::fs::create_dir_all(settings.data_dir())?;

    // Execute command
    match cli.command {
        Commands::Search { query, top_k } => {
            commands::run_search(&query, top_k, settings).await?;
        }

        Commands::Ask {
            question,
            speaker,
            party,
            category,
            top_k,
            model,
            json,
        } => {
            let options = AskOptions {
                speaker,
                party,
                category,
                top_k,
                model,
                json,
            };
            commands::run_ask(&question, options, settings).await?;
        }

        Commands::Draft {
            questions,
            output,
            ids,
            concurrency,
            model,
        } => {
            let options = DraftOptions {
                output,
                ids,
                concurrency,
                model,
            };
            commands::run_draft(&questions, options, settings).await?;
        }

        Commands::Page { source, page } => {
            commands::run_page(&source, page, settings).await?;
        }

        Commands::List => {
            commands::run_list(settings).await?;
        }

        Commands::Serve { host, port } => {
            commands::run_serve(&host, port, settings).await?;
        }

        Commands::Config { action } => {
            commands::run_config(&action, config_path, settings)?;
        }
    }

    Ok(())
}
