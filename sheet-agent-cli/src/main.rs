// ABOUTME: Interactive spreadsheet agent - type a command, the model runs the tools.
// ABOUTME: Also runs a single command non-interactively with --command.

use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::Parser;
use rustyline::DefaultEditor;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use sheet_agent::prelude::*;

/// Move and filter data in Excel workbooks and Google Sheets with plain-language commands.
#[derive(Debug, Parser)]
#[command(name = "sheet-agent", version)]
struct Args {
    /// Chat model to use (overrides SHEET_AGENT_MODEL).
    #[arg(long)]
    model: Option<String>,

    /// Google service-account credentials file (overrides GOOGLE_CREDENTIALS_PATH).
    #[arg(long)]
    credentials: Option<PathBuf>,

    /// Run one command and exit instead of starting the prompt.
    #[arg(long, short)]
    command: Option<String>,
}

/// Run one command, printing the answer or the failure.
async fn run_command(dispatcher: &Dispatcher, command: &str) -> bool {
    println!("Working...");
    match dispatcher.run(command).await {
        Ok(outcome) => {
            println!("Done!");
            if !outcome.content.is_empty() {
                println!("\n{}\n", outcome.content);
            }
            true
        }
        Err(e) => {
            println!("{} {}\n", sheet_agent::tool::FAILURE_MARKER, e);
            false
        }
    }
}

async fn run_repl(dispatcher: &Dispatcher) -> Result<()> {
    let mut rl = DefaultEditor::new()?;

    println!("Spreadsheet Agent - Type 'quit' to exit.\n");

    loop {
        let line = match rl.readline("> ") {
            Ok(line) => line,
            Err(_) => break,
        };

        let line = line.trim();
        if line.is_empty() {
            continue;
        }
        if line == "quit" || line == "exit" {
            break;
        }

        let _ = rl.add_history_entry(line);
        run_command(dispatcher, line).await;
    }

    Ok(())
}

#[tokio::main]
async fn main() -> Result<ExitCode> {
    // Load .env file if present
    let _ = dotenvy::dotenv();

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "sheet_agent=info".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let args = Args::parse();

    let mut config = Config::from_env().context("Failed to load configuration")?;
    if let Some(model) = args.model {
        config.model = model;
    }
    if let Some(credentials) = args.credentials {
        config.credentials_path = credentials;
    }
    tracing::debug!(?config, "configuration loaded");

    let remote = RemoteSheets::from_credentials_file(&config.credentials_path)
        .context("Failed to load Google credentials")?;
    let registry = spreadsheet_registry(remote).await;

    let dispatcher = Dispatcher::new(
        Arc::new(config.openai_client()),
        registry.clone(),
        &config.model,
    )
    .max_iterations(config.max_iterations);

    match args.command {
        Some(command) => {
            let ok = run_command(&dispatcher, &command).await;
            Ok(if ok { ExitCode::SUCCESS } else { ExitCode::FAILURE })
        }
        None => {
            println!("Tools: {}\n", registry.list().await.join(", "));
            run_repl(&dispatcher).await?;
            Ok(ExitCode::SUCCESS)
        }
    }
}
