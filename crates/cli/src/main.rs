use anyhow::Result;
use clap::{Parser, Subcommand};
use incr_list_engine::EngineConfig;
use std::path::{Path, PathBuf};
use tracing_subscriber::EnvFilter;

mod commands;
mod job;

#[derive(Parser)]
#[command(name = "incr-list")]
#[command(about = "Windowed, generation-safe paging over a job listing", long_about = None)]
struct Cli {
    /// JSON engine config (defaults to the user config dir, then INCR_LIST_* env vars)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run one query generation and print the windowed rows as JSON
    Simulate(commands::simulate::SimulateArgs),
    /// Print the window computed for a scroll position
    Window {
        #[arg(short, long)]
        count: usize,
        #[arg(short, long, default_value = "0")]
        scroll: f64,
        #[arg(short = 'H', long)]
        height: f64,
        #[arg(long)]
        row_height: Option<f64>,
        #[arg(long)]
        overscan: Option<usize>,
    },
    /// Sanitize markup read from stdin
    Sanitize {
        /// Use the allowlist sanitizer instead of the element/attribute denylist
        #[arg(long)]
        allowlist: bool,
        /// Print a plain-text preview of at most N chars instead of markup
        #[arg(short, long)]
        truncate: Option<usize>,
    },
}

fn default_config_path() -> PathBuf {
    dirs::config_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("incr-list")
        .join("config.json")
}

fn load_config(explicit: Option<&Path>) -> Result<EngineConfig> {
    if let Some(path) = explicit {
        return Ok(EngineConfig::from_json_file(path)?);
    }
    let path = default_config_path();
    if path.is_file() {
        tracing::debug!(path = %path.display(), "loading config");
        return Ok(EngineConfig::from_json_file(&path)?);
    }
    Ok(EngineConfig::from_env())
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env().add_directive("info".parse()?))
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let config = load_config(cli.config.as_deref())?;

    match cli.command {
        Commands::Simulate(args) => commands::simulate::run_simulate(args, &config).await?,
        Commands::Window { count, scroll, height, row_height, overscan } => {
            commands::window::run_window(
                count,
                scroll,
                height,
                row_height.unwrap_or(config.row_height),
                overscan.unwrap_or(config.overscan),
            )?;
        },
        Commands::Sanitize { allowlist, truncate } => {
            commands::sanitize::run_sanitize(allowlist, truncate)?;
        },
    }

    Ok(())
}
