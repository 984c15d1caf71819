//! CLI binary for topic-harvest.
//!
//! Runs an acquisition session against a replay fixture and prints the
//! report on stdout. Tracing output goes to stderr so stdout stays a clean
//! JSON or Markdown document.

use std::path::PathBuf;

use anyhow::Context as _;
use clap::{Parser, Subcommand, ValueEnum};
use topic_harvest::{report, FixtureBackend, HarvestConfig, SearchCoordinator, SessionContext};
use tracing_subscriber::EnvFilter;

/// Round-based topic content acquisition.
#[derive(Parser)]
#[command(name = "topic-harvest", version, about)]
struct Cli {
    /// Path to TOML configuration file.
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Run one session against a JSON fixture of recorded batches.
    Run {
        /// Fixture document mapping queries to result batches.
        #[arg(long)]
        fixture: PathBuf,

        /// Base query of the session.
        #[arg(short, long)]
        query: String,

        /// Context attribute as `key=value` (repeatable).
        #[arg(long = "context", value_parser = parse_key_value)]
        context: Vec<(String, String)>,

        /// Session identifier. A random UUID is used when omitted.
        #[arg(long)]
        session: Option<String>,

        /// Report format.
        #[arg(long, value_enum, default_value_t = Format::Text)]
        format: Format,

        /// Write the report to this file instead of stdout.
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Print the effective configuration as TOML.
    Config,
}

#[derive(Clone, Copy, ValueEnum)]
enum Format {
    Json,
    Text,
}

fn parse_key_value(raw: &str) -> Result<(String, String), String> {
    let (key, value) = raw
        .split_once('=')
        .ok_or_else(|| format!("expected key=value, got '{raw}'"))?;
    let key = key.trim();
    if key.is_empty() {
        return Err(format!("empty key in '{raw}'"));
    }
    Ok((key.to_owned(), value.trim().to_owned()))
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("topic_harvest=info")),
        )
        .init();

    let cli = Cli::parse();

    let config = match cli.config {
        Some(ref path) => HarvestConfig::from_file(path)
            .with_context(|| format!("loading config from {}", path.display()))?,
        None => {
            let default_path = HarvestConfig::default_config_path();
            if default_path.exists() {
                HarvestConfig::from_file(&default_path)?
            } else {
                HarvestConfig::default()
            }
        }
    };

    match cli.command {
        Command::Config => {
            config.validate()?;
            print!("{}", toml::to_string_pretty(&config)?);
            Ok(())
        }
        Command::Run {
            fixture,
            query,
            context,
            session,
            format,
            output,
        } => {
            let backend = FixtureBackend::from_file(&fixture)
                .with_context(|| format!("loading fixture {}", fixture.display()))?;

            let mut ctx = match session {
                Some(id) => SessionContext::new(id, query),
                None => SessionContext::with_generated_id(query),
            };
            for (key, value) in context {
                ctx = ctx.with_attribute(key, value);
            }

            let coordinator = SearchCoordinator::new(backend, &config)?;
            let cancel = coordinator.cancel_token();
            tokio::spawn(async move {
                if tokio::signal::ctrl_c().await.is_ok() {
                    tracing::warn!("interrupt received, stopping after the current round");
                    cancel.cancel();
                }
            });

            let outcome = coordinator.run(&ctx).await.into_result()?;
            let rendered = match format {
                Format::Json => report::to_json(&outcome)?,
                Format::Text => report::render_text(&outcome),
            };

            match output {
                Some(path) => {
                    std::fs::write(&path, rendered)
                        .with_context(|| format!("writing report to {}", path.display()))?;
                    tracing::info!(path = %path.display(), "report written");
                }
                None => println!("{rendered}"),
            }
            Ok(())
        }
    }
}
