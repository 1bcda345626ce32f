mod config;
mod convert_cmd;
mod diff_cmd;
mod input;
mod restore_cmd;
mod stats_cmd;
mod validate_cmd;

use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "tabtree", about = "Validate, convert, diff and restore persisted tab trees")]
struct Cli {
    /// Path to a tabtree.toml (default: ./tabtree.toml when present)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Log at debug level
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Check a full-tree hierarchy or a legacy operations log
    Validate(validate_cmd::ValidateArgs),

    /// Convert between the full-tree and operations-log forms
    Convert(convert_cmd::ConvertArgs),

    /// Run one diff pass over a tree and print the new knots and entries
    Diff(diff_cmd::DiffArgs),

    /// Rebuild a full tree from a knot/entry snapshot
    Restore(restore_cmd::RestoreArgs),

    /// Count nodes per type
    Stats(stats_cmd::StatsArgs),
}

fn main() {
    let cli = Cli::parse();

    let level = if cli.verbose {
        tracing::Level::DEBUG
    } else {
        tracing::Level::WARN
    };
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env().add_directive(level.into()))
        .init();

    let result = config::load_config(cli.config.as_deref()).and_then(|config| match cli.command {
        Commands::Validate(args) => validate_cmd::run(args),
        Commands::Convert(args) => convert_cmd::run(args),
        Commands::Diff(args) => diff_cmd::run(args, &config),
        Commands::Restore(args) => restore_cmd::run(args, &config),
        Commands::Stats(args) => stats_cmd::run(args),
    });

    if let Err(e) = result {
        eprintln!("Error: {:#}", e);
        std::process::exit(1);
    }
}
