use anyhow::Result;
use clap::{Parser, Subcommand};
use recoverydash::config::{DashboardConfig, LoggingConfig};
use std::path::PathBuf;

#[derive(Parser)]
#[command(
    name = "recoverydash",
    about = "Alarm recovery-time statistics for incident exports",
    version,
    long_about = None
)]
struct Cli {
    /// TOML config file (default: $RECOVERYDASH_CONFIG, then ./recoverydash.toml)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Compute the report and print it
    Report {
        /// Incident export (.csv or .json)
        #[arg(long)]
        input: PathBuf,

        /// JSON output for machine parsing
        #[arg(long)]
        json: bool,
    },

    /// Compute the report and serve it over HTTP
    Serve {
        /// Incident export (.csv or .json)
        #[arg(long)]
        input: PathBuf,

        /// Bind address (overrides the config file)
        #[arg(long)]
        bind: Option<String>,
    },
}

fn init_tracing(logging: &LoggingConfig) {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(&logging.level));

    // stdout is reserved for report output
    if logging.json {
        tracing_subscriber::fmt()
            .json()
            .with_env_filter(filter)
            .with_writer(std::io::stderr)
            .init();
    } else {
        tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_writer(std::io::stderr)
            .init();
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    let resolved = DashboardConfig::resolve(cli.config.as_deref())?;
    init_tracing(&resolved.config.logging);
    resolved.log();
    let config = resolved.config;

    match cli.command {
        Commands::Report { input, json } => {
            tracing::info!(input = %input.display(), "Computing recovery report");
            let report = recoverydash::analyze(&input, &config)?;
            if json {
                let json_output = serde_json::to_string_pretty(&report)?;
                println!("{}", json_output);
            } else {
                print!("{}", recoverydash::report::format_summary(&report));
            }
        }
        Commands::Serve { input, bind } => {
            let bind = bind.unwrap_or_else(|| config.server.bind.clone());
            tracing::info!(%bind, input = %input.display(), "Starting recoverydash server");
            recoverydash::serve(&bind, &input, &config).await?;
        }
    }

    Ok(())
}
