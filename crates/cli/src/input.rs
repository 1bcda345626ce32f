use anyhow::{Context, Result};
use serde_json::Value;
use std::path::Path;
use tabtree_core::hierarchy::{hierarchy_from_value, HierarchyNode};
use tabtree_core::operations::{operations_from_values, operations_to_hierarchy, Operation};

/// A tree file in either persisted form.
pub enum TreeFile {
    Hierarchy(HierarchyNode),
    Operations(Vec<Operation>),
}

impl TreeFile {
    /// A JSON array is read as an operations log, anything else as a
    /// hierarchy.
    pub fn load(path: &Path) -> Result<Self> {
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read {}", path.display()))?;
        let value: Value = serde_json::from_str(&text)
            .with_context(|| format!("{} is not valid JSON", path.display()))?;
        Self::from_value(&value).with_context(|| format!("invalid tree in {}", path.display()))
    }

    pub fn from_value(value: &Value) -> Result<Self> {
        match value {
            Value::Array(records) => Ok(TreeFile::Operations(operations_from_values(records))),
            other => Ok(TreeFile::Hierarchy(hierarchy_from_value(other)?)),
        }
    }

    pub fn into_hierarchy(self) -> Result<HierarchyNode> {
        match self {
            TreeFile::Hierarchy(tree) => Ok(tree),
            TreeFile::Operations(ops) => Ok(operations_to_hierarchy(&ops)?),
        }
    }
}

/// Write `text` to `out`, or print it.
pub fn emit(text: &str, out: Option<&Path>) -> Result<()> {
    match out {
        Some(path) => {
            std::fs::write(path, text).with_context(|| format!("write {}", path.display()))
        }
        None => {
            println!("{text}");
            Ok(())
        }
    }
}
