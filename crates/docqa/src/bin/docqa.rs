//! docqa command-line interface
//!
//! Run with: cargo run -p docqa -- [OPTIONS] [INPUTS]...
//!
//! Without inputs the tool prompts for a folder or link repeatedly; with
//! inputs it processes each one and exits.

use anyhow::{Context, Result};
use clap::Parser;
use console::{style, Term};
use docqa::config::{AppConfig, Transport};
use docqa::processing::resolve_input;
use docqa::{providers, Processor, RunSummary};
use std::io::BufRead;
use std::path::PathBuf;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Parser)]
#[command(name = "docqa")]
#[command(about = "Ask a local Ollama model fixed questions about PDF/PPTX/DOCX files or web pages")]
#[command(version)]
struct Cli {
    /// Folders or http(s) links to process; prompts interactively when omitted
    inputs: Vec<String>,

    /// Path to a TOML config file
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Output folder for JSON results
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Model name passed to the runtime
    #[arg(short, long)]
    model: Option<String>,

    /// Per-question timeout in seconds
    #[arg(long)]
    timeout: Option<u64>,

    /// Talk to the runtime over its HTTP API instead of spawning it
    #[arg(long)]
    http: bool,

    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,
}

impl Cli {
    fn apply_overrides(&self, config: &mut AppConfig) {
        if let Some(output) = &self.output {
            config.output_dir = output.clone();
        }
        if let Some(model) = &self.model {
            config.model.model = model.clone();
        }
        if let Some(timeout) = self.timeout {
            config.model.timeout_secs = timeout;
        }
        if self.http {
            config.model.transport = Transport::Http;
        }
    }
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let default_filter = if cli.verbose { "docqa=debug" } else { "docqa=info" };
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| default_filter.into()),
        )
        .with(tracing_subscriber::fmt::layer().with_target(false))
        .init();

    let mut config = AppConfig::load(cli.config.as_deref())
        .with_context(|| format!("loading configuration from {:?}", cli.config))?;
    cli.apply_overrides(&mut config);
    config.validate()?;

    tracing::info!("Configuration loaded");
    tracing::info!("  - Model: {} via {:?}", config.model.model, config.model.transport);
    tracing::info!("  - Timeout: {}s", config.model.timeout_secs);
    tracing::info!("  - Output: {}", config.output_dir.display());

    let client = providers::from_config(&config.model)?;
    match client.check_available().await {
        Ok(version) => tracing::info!("Model runtime available: {}", version),
        Err(e) => {
            eprintln!(
                "{} {}: {}",
                style("✗").red().bold(),
                config.model.unavailable_hint(),
                e
            );
            anyhow::bail!("model runtime unavailable");
        }
    }

    let processor = Processor::from_config(&config, client)
        .with_context(|| format!("preparing output folder {}", config.output_dir.display()))?;

    if cli.inputs.is_empty() {
        run_interactive(&processor).await?;
    } else {
        for input in &cli.inputs {
            run_input(&processor, input).await;
        }
    }

    Ok(())
}

/// Resolve and process one folder or link, reporting problems to the operator.
///
/// Returns false when the input itself was unusable.
async fn run_input(processor: &Processor, input: &str) -> bool {
    let sources = match resolve_input(input) {
        Ok(sources) => sources,
        Err(e) => {
            eprintln!("{} {}", style("✗").red().bold(), e);
            return false;
        }
    };

    if sources.len() > 1 || matches!(sources.first(), Some(docqa::Source::File(_))) {
        println!("Found {} file(s) to process", sources.len());
    }

    let summary = processor.process_all(&sources).await;
    print_summary(&summary);
    true
}

fn print_summary(summary: &RunSummary) {
    for path in &summary.saved {
        println!("  {} {}", style("✓").green(), path.display());
    }
    println!(
        "{} saved, {} skipped, {} failed",
        style(summary.saved.len()).green().bold(),
        style(summary.skipped).yellow(),
        style(summary.failed).red()
    );
}

/// Write a prompt and read one trimmed line; `None` at end of input
fn prompt(term: &Term, message: &str) -> std::io::Result<Option<String>> {
    term.write_str(message)?;
    term.flush()?;

    let mut line = String::new();
    let read = std::io::stdin().lock().read_line(&mut line)?;
    if read == 0 {
        return Ok(None);
    }
    Ok(Some(line.trim().to_string()))
}

async fn run_interactive(processor: &Processor) -> Result<()> {
    let term = Term::stdout();

    loop {
        let Some(input) = prompt(&term, "\nEnter a folder path (for files) or a link (http/https): ")? else {
            break;
        };

        if !run_input(processor, &input).await {
            continue;
        }

        match prompt(&term, "\nDo you want to process another folder/link? (y/n): ")? {
            Some(answer) if answer.eq_ignore_ascii_case("y") => {}
            _ => break,
        }
    }

    println!("Exiting. Goodbye!");
    Ok(())
}
