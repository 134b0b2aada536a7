//! hellostack: hello service and deployment description.
//!
//! This is the application entry point. It loads configuration, initializes
//! tracing, then either serves the hello endpoint (`serve`, the default) or
//! resolves the deployment context and prints the deployment description as
//! JSON (`synth`).

use std::io::Write;
use std::path::PathBuf;

use clap::{Parser, Subcommand};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use hellostack::config::{AppConfig, DEFAULT_LOG_FILTER};
use hellostack::deploy::{synth, DeploymentContext};
use hellostack::http::start_server;
use hellostack::routes::create_router;
use hellostack::Result;

/// hellostack: A hello HTTP service and its Fargate deployment
#[derive(Parser, Debug)]
#[command(name = "hellostack", version, about)]
struct Args {
    /// Path to configuration file (default: config/default.toml when present)
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Log level filter (e.g., "hellostack=debug,tower_http=info")
    #[arg(short, long, global = true)]
    log_level: Option<String>,

    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Serve the hello endpoint (default)
    Serve,
    /// Print the deployment description as JSON
    Synth {
        /// Context value override, KEY=VALUE (repeatable)
        #[arg(long = "context", value_name = "KEY=VALUE")]
        context: Vec<String>,

        /// Write the description to a file instead of stdout
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    let config = AppConfig::load_or_default(args.config.as_ref())?;

    // Initialize tracing with priority: CLI > env > default
    let log_filter = args
        .log_level
        .or_else(|| std::env::var("RUST_LOG").ok())
        .unwrap_or_else(|| DEFAULT_LOG_FILTER.to_string());

    let registry =
        tracing_subscriber::registry().with(tracing_subscriber::EnvFilter::new(&log_filter));
    // Logs go to stderr so synth output on stdout stays valid JSON
    if config.logging.is_json() {
        registry
            .with(
                tracing_subscriber::fmt::layer()
                    .json()
                    .with_writer(std::io::stderr),
            )
            .init();
    } else {
        registry
            .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
            .init();
    }

    tracing::debug!(context_entries = config.context.len(), "Loaded configuration");

    match args.command.unwrap_or(Command::Serve) {
        Command::Serve => serve(config).await,
        Command::Synth { context, output } => run_synth(config, &context, output),
    }
}

async fn serve(config: AppConfig) -> Result<()> {
    let app = create_router();
    start_server(app, &config.http).await?;
    Ok(())
}

fn run_synth(mut config: AppConfig, overrides: &[String], output: Option<PathBuf>) -> Result<()> {
    for raw in overrides {
        config.context.apply_override(raw)?;
    }

    let context = DeploymentContext::from_lookup(&config.context)?;
    let assembly = synth(&config, &context);
    let json = serde_json::to_string_pretty(&assembly)?;

    match output {
        Some(path) => {
            std::fs::write(&path, json + "\n")?;
            tracing::info!(path = %path.display(), "Wrote deployment description");
        }
        None => {
            let mut stdout = std::io::stdout().lock();
            writeln!(stdout, "{}", json)?;
        }
    }

    Ok(())
}
