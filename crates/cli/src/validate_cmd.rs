use crate::input::TreeFile;
use anyhow::Result;
use clap::Args;
use std::path::PathBuf;
use tabtree_core::operations::operations_to_hierarchy;

#[derive(Debug, Clone, Args)]
pub struct ValidateArgs {
    /// Hierarchy (`{"n":..,"s":[..]}`) or operations log (`[..]`) file.
    pub file: PathBuf,
}

pub fn run(args: ValidateArgs) -> Result<()> {
    println!("{}", describe(TreeFile::load(&args.file)?)?);
    Ok(())
}

fn describe(tree: TreeFile) -> Result<String> {
    Ok(match tree {
        TreeFile::Hierarchy(tree) => format!("valid hierarchy: {} nodes", tree.node_count()),
        TreeFile::Operations(ops) => {
            let nodes = operations_to_hierarchy(&ops)?.node_count();
            format!("valid operations log: {} records, {nodes} nodes", ops.len())
        }
    })
}
