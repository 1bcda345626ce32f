pub mod base36;
pub mod config;
pub mod diff;
pub mod entry;
pub mod hierarchy;
pub mod host;
pub mod knot;
pub mod node;
pub mod operations;
pub mod resolve;
pub mod tree;

pub use config::{ConfigError, DiffSettings, RestoreSettings, TreeConfig};
pub use diff::{serialize_diff, DiffSnapshot, DiffState};
pub use hierarchy::{parse_hierarchy, HierarchyError, HierarchyNode};
pub use node::{Marks, NodeAction, NodeContent, NodePayload, NodeType};
pub use operations::{Operation, OperationsError};
pub use tree::{MoveTarget, MvcId, TreeError, TreeModel, TreeMutationResult};

#[cfg(any(test, feature = "testing"))]
pub mod testing;
