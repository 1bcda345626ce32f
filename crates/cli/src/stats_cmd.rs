use crate::input::TreeFile;
use anyhow::Result;
use clap::Args;
use serde::Serialize;
use std::collections::BTreeMap;
use std::path::PathBuf;
use tabtree_core::hierarchy::HierarchyNode;
use tabtree_core::node::NodeType;

#[derive(Debug, Clone, Args)]
pub struct StatsArgs {
    /// Tree file in either form.
    pub file: PathBuf,
    /// Print JSON instead of text.
    #[arg(long)]
    pub json: bool,
}

#[derive(Debug, Default, PartialEq, Serialize)]
struct TreeStats {
    total: usize,
    collapsed: usize,
    marked: usize,
    by_type: BTreeMap<&'static str, usize>,
}

pub fn run(args: StatsArgs) -> Result<()> {
    let tree = TreeFile::load(&args.file)?.into_hierarchy()?;
    let stats = collect(&tree);
    if args.json {
        println!("{}", serde_json::to_string_pretty(&stats)?);
        return Ok(());
    }
    println!("{} nodes ({} collapsed, {} marked)", stats.total, stats.collapsed, stats.marked);
    // Type-table order.
    for node_type in NodeType::ALL {
        if let Some(count) = stats.by_type.get(node_type.as_str()) {
            println!("  {:<18} {count}", node_type.as_str());
        }
    }
    Ok(())
}

fn collect(tree: &HierarchyNode) -> TreeStats {
    let mut stats = TreeStats::default();
    tree.visit(&mut |payload| {
        stats.total += 1;
        if payload.colapsed {
            stats.collapsed += 1;
        }
        if payload.marks.as_ref().is_some_and(|m| !m.is_empty()) {
            stats.marked += 1;
        }
        *stats.by_type.entry(payload.node_type.as_str()).or_insert(0) += 1;
    });
    stats
}
