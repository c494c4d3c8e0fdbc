use anyhow::Result;
use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

mod commands;

use commands::{CheckConfigCommand, GenerateCommand};

#[derive(Parser)]
#[command(
    name = "trustgen",
    about = "Generate IAM trust policies for IRSA and cross-account roles",
    version = env!("CARGO_PKG_VERSION")
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Log level (trace, debug, info, warn, error), overrides the config file
    #[arg(long, global = true)]
    log_level: Option<String>,

    /// Log in JSON format
    #[arg(long, global = true)]
    log_json: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Generate the trust policy for an Iamrole manifest
    Generate(GenerateCommand),
    /// Validate the operator configuration
    CheckConfig(CheckConfigCommand),
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let config = match &cli.command {
        Commands::Generate(cmd) => cmd.config.load()?,
        Commands::CheckConfig(cmd) => cmd.config.load()?,
    };

    // Initialize logging
    let log_level = if cli.verbose {
        "debug"
    } else {
        cli.log_level.as_deref().unwrap_or(&config.logging.level)
    };
    init_logging(log_level, cli.log_json || config.logging.json_format);

    match &cli.command {
        Commands::Generate(cmd) => cmd.run(&config)?,
        Commands::CheckConfig(cmd) => cmd.run(&config)?,
    }

    Ok(())
}

// Logs go to stderr so stdout only carries the policy document
fn init_logging(level: &str, json: bool) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));
    let subscriber = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr);

    if json {
        subscriber.json().init();
    } else {
        subscriber.init();
    }
}
