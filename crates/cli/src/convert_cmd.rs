use crate::input::{emit, TreeFile};
use anyhow::{Context, Result};
use clap::{Args, ValueEnum};
use std::path::PathBuf;
use tabtree_core::operations::{hierarchy_to_operations, operations_to_string};

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum ConvertTarget {
    /// Full-tree hierarchy JSON
    Tree,
    /// Legacy operations log JSON
    Ops,
}

#[derive(Debug, Clone, Args)]
pub struct ConvertArgs {
    /// Input file in either form.
    pub file: PathBuf,
    /// Output form.
    #[arg(long, value_enum)]
    pub to: ConvertTarget,
    /// Optional output file path (default stdout).
    #[arg(long)]
    pub out: Option<PathBuf>,
}

pub fn run(args: ConvertArgs) -> Result<()> {
    let tree = TreeFile::load(&args.file)?.into_hierarchy()?;
    let text = match args.to {
        ConvertTarget::Tree => {
            serde_json::to_string_pretty(&tree).context("serialize hierarchy")?
        }
        ConvertTarget::Ops => operations_to_string(&hierarchy_to_operations(&tree))
            .context("serialize operations log")?,
    };
    emit(&text, args.out.as_deref())
}
