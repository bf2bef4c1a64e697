mod commands;
mod render;

use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "artcat", about = "Technical artwork critique by Maestro Michi")]
struct Cli {
    /// Show diagnostic trace output on stderr
    #[arg(long, short, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Create ~/.artcat/ and a default config
    Init,
    /// Analyze one image and print the dashboard
    Analyze {
        /// Image file (png, jpg, webp, ...)
        image: PathBuf,
        /// Print the raw analysis as JSON instead of the dashboard
        #[arg(long)]
        json: bool,
        /// Override the configured model
        #[arg(long)]
        model: Option<String>,
    },
    /// Interactive session: drop image paths in, reset, repeat
    Studio {
        /// Override the configured model
        #[arg(long)]
        model: Option<String>,
    },
}

fn init_tracing(verbose: bool) {
    let default = if verbose { "artcat=debug,artcat_core=debug" } else { "warn" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

fn main() {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let result = match cli.command {
        Commands::Init => commands::init::run(cli.verbose),
        Commands::Analyze { image, json, model } => commands::analyze::run(&image, json, model),
        Commands::Studio { model } => commands::studio::run(model),
    };

    if let Err(e) = result {
        eprintln!("error: {e:#}");
        std::process::exit(1);
    }
}
