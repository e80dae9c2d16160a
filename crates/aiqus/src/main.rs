// SPDX-FileCopyrightText: 2026 Aiqus Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! aiqus - streaming chat completions in the terminal.
//!
//! This is the binary entry point.

mod ask;
mod history;
mod printer;
mod shell;

use std::path::PathBuf;

use aiqus_config::AiqusConfig;
use clap::{Parser, Subcommand};
use colored::Colorize;

/// aiqus - streaming chat completions in the terminal.
#[derive(Parser, Debug)]
#[command(name = "aiqus", version, about, long_about = None)]
struct Cli {
    /// Read configuration from this file instead of the standard locations.
    #[arg(long, global = true, value_name = "PATH")]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Ask one question and stream the answer to stdout.
    Ask {
        /// The question.
        query: String,
        /// Continue an existing conversation.
        #[arg(long, short = 'c', value_name = "ID")]
        conversation: Option<String>,
        /// Model identifier (defaults to the catalog default).
        #[arg(long, short = 'm')]
        model: Option<String>,
        #[arg(long)]
        temperature: Option<f32>,
        #[arg(long)]
        max_tokens: Option<u32>,
        #[arg(long)]
        top_p: Option<f32>,
        /// Do not record the exchange in history.
        #[arg(long)]
        no_save: bool,
    },
    /// Chat interactively, one conversation at a time.
    Shell {
        /// Continue an existing conversation.
        #[arg(long, short = 'c', value_name = "ID")]
        conversation: Option<String>,
        #[arg(long, short = 'm')]
        model: Option<String>,
    },
    /// List the configured models.
    Models,
    /// List conversations, or show one conversation.
    History {
        #[arg(long, short = 'c', value_name = "ID")]
        conversation: Option<String>,
    },
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    let loaded = match &cli.config {
        Some(path) => aiqus_config::load_and_validate_path(path),
        None => aiqus_config::load_and_validate(),
    };
    let config = match loaded {
        Ok(config) => config,
        Err(errors) => {
            aiqus_config::render_errors(&errors);
            std::process::exit(1);
        }
    };

    init_tracing(&config.app.log_level);

    if let Err(e) = run(cli.command, &config).await {
        eprintln!("{}: {e}", "error".red());
        std::process::exit(1);
    }
}

async fn run(command: Option<Commands>, config: &AiqusConfig) -> Result<(), aiqus_core::AiqusError> {
    match command {
        Some(Commands::Ask {
            query,
            conversation,
            model,
            temperature,
            max_tokens,
            top_p,
            no_save,
        }) => {
            let args = ask::AskArgs {
                query,
                conversation,
                model,
                temperature,
                max_tokens,
                top_p,
                save: !no_save,
            };
            if !ask::run_ask(config, args).await? {
                std::process::exit(1);
            }
        }
        Some(Commands::Shell {
            conversation,
            model,
        }) => shell::run_shell(config, conversation, model).await?,
        Some(Commands::Models) => history::run_models(config),
        Some(Commands::History { conversation }) => {
            history::run_history(config, conversation.as_deref()).await?
        }
        None => {
            println!("aiqus: use --help for available commands");
        }
    }
    Ok(())
}

/// Installs the stderr log subscriber. `RUST_LOG` wins over `log_level`.
fn init_tracing(log_level: &str) {
    use tracing_subscriber::EnvFilter;

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(format!("aiqus={log_level},warn")));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(true)
        .with_thread_names(false)
        .init();
}
