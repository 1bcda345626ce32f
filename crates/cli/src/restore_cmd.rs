use crate::input::emit;
use anyhow::{Context, Result};
use clap::Args;
use std::path::PathBuf;
use tabtree_core::config::TreeConfig;
use tabtree_core::diff::DiffSnapshot;

#[derive(Debug, Clone, Args)]
pub struct RestoreArgs {
    /// Snapshot JSON: `{"root": .., "knots": {..}, "entries": {..}}`.
    pub snapshot: PathBuf,
    /// Optional output file path (default stdout).
    #[arg(long)]
    pub out: Option<PathBuf>,
}

pub fn run(args: RestoreArgs, config: &TreeConfig) -> Result<()> {
    let text = std::fs::read_to_string(&args.snapshot)
        .with_context(|| format!("failed to read {}", args.snapshot.display()))?;
    let snapshot: DiffSnapshot = serde_json::from_str(&text)
        .with_context(|| format!("invalid snapshot in {}", args.snapshot.display()))?;
    let tree = snapshot.resolve(&config.restore);
    let text = serde_json::to_string_pretty(&tree).context("serialize hierarchy")?;
    emit(&text, args.out.as_deref())
}
