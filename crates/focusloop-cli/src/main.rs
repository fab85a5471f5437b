use std::path::PathBuf;

use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

mod commands;

#[derive(Parser)]
#[command(name = "focusloop", version, about = "Focus timer with randomized micro-breaks")]
struct Cli {
    /// Config file (default: ~/.config/focusloop/config.toml)
    #[arg(long, global = true, value_name = "PATH")]
    config: Option<PathBuf>,
    /// Directory relative sound files are resolved against
    #[arg(long, global = true, value_name = "DIR")]
    resources: Option<PathBuf>,
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run focus cycles in the terminal
    Run(commands::run::RunArgs),
    /// Configuration management
    Config {
        #[command(subcommand)]
        action: commands::config::ConfigAction,
    },
    /// Alert sound checks
    Sound {
        #[command(subcommand)]
        action: commands::sound::SoundAction,
    },
}

fn init_logging() {
    let filter =
        EnvFilter::try_from_env("FOCUSLOOP_LOG").unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

fn main() {
    init_logging();
    let cli = Cli::parse();
    let ctx = commands::Context::new(cli.config, cli.resources);
    let result = match cli.command {
        Commands::Run(args) => commands::run::run(&ctx, args),
        Commands::Config { action } => commands::config::run(&ctx, action),
        Commands::Sound { action } => commands::sound::run(&ctx, action),
    };

    if let Err(e) = result {
        eprintln!("error: {e}");
        std::process::exit(1);
    }
}
