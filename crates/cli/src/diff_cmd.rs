use crate::input::{emit, TreeFile};
use anyhow::{Context, Result};
use clap::Args;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tabtree_core::config::TreeConfig;
use tabtree_core::diff::{serialize_diff, DiffSnapshot, DiffState};
use tabtree_core::tree::TreeModel;

#[derive(Debug, Clone, Args)]
pub struct DiffArgs {
    /// Tree file in either form.
    pub file: PathBuf,
    /// JSON file holding the id counter between runs; created when missing.
    #[arg(long)]
    pub state: Option<PathBuf>,
    /// Optional output file path (default stdout).
    #[arg(long)]
    pub out: Option<PathBuf>,
}

#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct StateFile {
    next_id: u64,
}

pub fn run(args: DiffArgs, config: &TreeConfig) -> Result<()> {
    let tree = TreeFile::load(&args.file)?.into_hierarchy()?;
    let next_id = match &args.state {
        Some(path) => read_state(path)?.next_id,
        None => 1,
    };

    let snapshot = diff_tree(&mut TreeModel::from_hierarchy(&tree), next_id, config);
    tracing::debug!(
        knots = snapshot.knots.len(),
        entries = snapshot.entries.len(),
        "diff of {}",
        args.file.display()
    );

    if let Some(path) = &args.state {
        let state = StateFile {
            next_id: snapshot.next_id,
        };
        let text = serde_json::to_string(&state).context("serialize diff state")?;
        std::fs::write(path, text).with_context(|| format!("write {}", path.display()))?;
    }
    let text = serde_json::to_string_pretty(&snapshot).context("serialize diff snapshot")?;
    emit(&text, args.out.as_deref())
}

fn diff_tree(model: &mut TreeModel, next_id: u64, config: &TreeConfig) -> DiffSnapshot {
    let mut state = DiffState::resume(next_id);
    state.prime(model);
    serialize_diff(model, &mut state, &config.diff)
}

fn read_state(path: &Path) -> Result<StateFile> {
    if !path.exists() {
        return Ok(StateFile { next_id: 1 });
    }
    let text = std::fs::read_to_string(path).with_context(|| format!("failed to read {}", path.display()))?;
    serde_json::from_str(&text).with_context(|| format!("invalid diff state in {}", path.display()))
}
