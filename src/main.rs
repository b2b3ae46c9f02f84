//! Stock tracker - main entry point
//!
//! This binary provides three subcommands:
//! - api: Serve the line protocol over stdin/stdout
//! - demo: Run the built-in RELIANCE/TCS/INFY walkthrough
//! - replay: Feed a CSV of ticks through the store and print the analysis

use anyhow::Result;
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

mod commands;

#[derive(Parser, Debug)]
#[command(name = "stock-tracker")]
#[command(about = "In-memory stock tracker with sliding-window SMA/RSI and risk clustering", long_about = None)]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Verbose output
    #[arg(short, long, global = true)]
    verbose: bool,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Answer line-protocol commands read from stdin
    Api {
        /// Path to configuration file
        #[arg(short, long)]
        config: Option<PathBuf>,
    },

    /// Run the automated walkthrough
    Demo,

    /// Replay ticks from a CSV file (symbol,price,quantity)
    Replay {
        /// CSV file to replay
        #[arg(short, long)]
        file: PathBuf,

        /// Path to configuration file
        #[arg(short, long)]
        config: Option<PathBuf>,
    },
}

fn setup_logging(verbose: bool, command_name: &str) -> Result<()> {
    std::fs::create_dir_all("logs")?;

    // {command}_{date}.log
    let log_filename = format!(
        "{}_{}.log",
        command_name,
        chrono::Local::now().format("%Y-%m-%d_%H-%M-%S")
    );
    let log_path = PathBuf::from("logs").join(&log_filename);

    let level = if verbose { "debug" } else { "info" };
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));

    let file_appender = tracing_appender::rolling::never("logs", &log_filename);

    // stdout carries protocol responses and reports, so the console goes to stderr
    let console_layer = tracing_subscriber::fmt::layer()
        .with_writer(std::io::stderr)
        .with_target(true)
        .with_line_number(true)
        .with_file(true)
        .with_ansi(true);

    let file_layer = tracing_subscriber::fmt::layer()
        .with_writer(file_appender)
        .with_target(true)
        .with_line_number(true)
        .with_file(true)
        .with_ansi(false);

    tracing_subscriber::registry()
        .with(env_filter)
        .with(console_layer)
        .with(file_layer)
        .init();

    info!("Logging initialized");
    info!("Log file: {}", log_path.display());

    Ok(())
}

fn main() -> Result<()> {
    dotenv::dotenv().ok();
    let cli = Cli::parse();

    let command_name = match &cli.command {
        Commands::Api { .. } => "api",
        Commands::Demo => "demo",
        Commands::Replay { .. } => "replay",
    };

    setup_logging(cli.verbose, command_name)?;

    match cli.command {
        Commands::Api { config } => commands::api::run(config),
        Commands::Demo => commands::demo::run(),
        Commands::Replay { file, config } => commands::replay::run(file, config),
    }
}
