//! Legacy operations log: an append-only list of records that rebuilds a
//! full tree.
//!
//! ```json
//! [
//!   {"type": 2000, "node": {"type": "session"}},
//!   [2001, {"type": "win", "data": {"id": 1}}, [0]],
//!   [2001, {"data": {"url": "https://a.example"}}, [0, 0]],
//!   {"type": 11111, "time": 1700000000000}
//! ]
//! ```
//!
//! The first record creates the root and the last one ends the log. Each
//! insert carries a child-index path: every element but the last walks down
//! existing children, and the last is the splice position.
//!
//! Only the framing can reject a log. A record that cannot be read is kept
//! as [`Operation::Unreadable`] and skipped on replay.

use crate::hierarchy::HierarchyNode;
use crate::node::{NodePayload, NodeType};
use serde_json::{json, Value};
use std::io::Write;

pub const OP_NEW_ROOT: i64 = 2000;
pub const OP_INSERT: i64 = 2001;
pub const OP_MOVE: i64 = 2002;
pub const OP_REPLACE: i64 = 2003;
pub const OP_DELETE: i64 = 2004;
pub const OP_EOF: i64 = 11111;

/// One record of the log.
#[derive(Debug, Clone, PartialEq)]
#[non_exhaustive]
pub enum Operation {
    NewRoot { node: NodePayload },
    Insert { node: NodePayload, path: Vec<usize> },
    /// Move, replace and delete codes. Accepted in a log but never applied.
    Reserved { code: i64, record: Value },
    Eof { time: i64 },
    /// A record with an unknown code, a path that is not a list of indices,
    /// or a node payload that does not decode.
    Unreadable { record: Value },
}

impl Operation {
    /// Record code. Unreadable records report whatever integer they carry,
    /// or 0.
    pub fn code(&self) -> i64 {
        match self {
            Operation::NewRoot { .. } => OP_NEW_ROOT,
            Operation::Insert { .. } => OP_INSERT,
            Operation::Reserved { code, .. } => *code,
            Operation::Eof { .. } => OP_EOF,
            Operation::Unreadable { record } => record_code(record).unwrap_or(0),
        }
    }

    /// Wire form of this record.
    pub fn to_value(&self) -> Value {
        match self {
            Operation::NewRoot { node } => json!({"type": OP_NEW_ROOT, "node": node}),
            Operation::Insert { node, path } => json!([OP_INSERT, node, path]),
            Operation::Reserved { record, .. } | Operation::Unreadable { record } => record.clone(),
            Operation::Eof { time } => json!({"type": OP_EOF, "time": time}),
        }
    }

    /// Read one record. Never fails: anything that cannot be understood
    /// comes back as [`Operation::Unreadable`].
    pub fn from_value(value: &Value) -> Operation {
        Self::decode(value).unwrap_or_else(|| Operation::Unreadable {
            record: value.clone(),
        })
    }

    fn decode(value: &Value) -> Option<Operation> {
        let code = record_code(value)?;
        let (node, extra) = match value {
            Value::Object(map) => (map.get("node"), map.get("path").or_else(|| map.get("time"))),
            Value::Array(items) => (items.get(1), items.get(2)),
            _ => return None,
        };
        let payload = || node.and_then(|n| serde_json::from_value::<NodePayload>(n.clone()).ok());
        match code {
            OP_NEW_ROOT => Some(Operation::NewRoot {
                node: payload().unwrap_or_else(|| {
                    tracing::warn!("root marker payload is unreadable, using an empty session");
                    NodePayload {
                        node_type: NodeType::Session,
                        ..NodePayload::default()
                    }
                }),
            }),
            OP_INSERT => {
                let path = extra?
                    .as_array()?
                    .iter()
                    .map(|i| i.as_u64().and_then(|i| usize::try_from(i).ok()))
                    .collect::<Option<Vec<usize>>>()?;
                Some(Operation::Insert {
                    node: payload()?,
                    path,
                })
            }
            OP_MOVE | OP_REPLACE | OP_DELETE => Some(Operation::Reserved {
                code,
                record: value.clone(),
            }),
            OP_EOF => Some(Operation::Eof {
                time: extra.and_then(Value::as_i64).unwrap_or(0),
            }),
            _ => None,
        }
    }
}

fn record_code(value: &Value) -> Option<i64> {
    match value {
        Value::Object(map) => map.get("type")?.as_i64(),
        Value::Array(items) => items.first()?.as_i64(),
        _ => None,
    }
}

#[derive(Debug, thiserror::Error)]
#[non_exhaustive]
pub enum OperationsError {
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("operations log is empty")]
    Empty,
    #[error("first record is not a root marker")]
    MissingRoot,
    #[error("last record is not an end marker")]
    MissingEnd,
}

/// Parse wire text into records. Shape checks come separately, from
/// [`validate_operations`].
pub fn parse_operations(text: &str) -> Result<Vec<Operation>, OperationsError> {
    let records: Vec<Value> = serde_json::from_str(text)?;
    Ok(operations_from_values(&records))
}

pub fn operations_from_values(records: &[Value]) -> Vec<Operation> {
    records.iter().map(Operation::from_value).collect()
}

/// A log must start with a root marker and end with an end marker.
pub fn validate_operations(ops: &[Operation]) -> Result<(), OperationsError> {
    let (Some(first), Some(last)) = (ops.first(), ops.last()) else {
        return Err(OperationsError::Empty);
    };
    if !matches!(first, Operation::NewRoot { .. }) {
        return Err(OperationsError::MissingRoot);
    }
    if !matches!(last, Operation::Eof { .. }) {
        return Err(OperationsError::MissingEnd);
    }
    Ok(())
}

/// Replay a validated log into a tree. Inserts whose path does not lead to
/// an existing node are skipped, as are unreadable records.
pub fn operations_to_hierarchy(ops: &[Operation]) -> Result<HierarchyNode, OperationsError> {
    validate_operations(ops)?;
    let mut root = match &ops[0] {
        Operation::NewRoot { node } => HierarchyNode::leaf(node.clone()),
        _ => return Err(OperationsError::MissingRoot),
    };

    for (index, op) in ops.iter().enumerate().skip(1) {
        match op {
            Operation::Insert { node, path } => {
                if !splice(&mut root, path, node) {
                    tracing::debug!("skipping insert record {index}: path {path:?} does not resolve");
                }
            }
            Operation::Reserved { code, .. } => {
                tracing::warn!("skipping record {index}: operation {code} is not supported");
            }
            Operation::NewRoot { .. } => {
                tracing::warn!("skipping record {index}: root marker after the first record");
            }
            Operation::Unreadable { .. } => {
                tracing::debug!("skipping unreadable record {index}");
            }
            Operation::Eof { .. } => {}
        }
    }
    Ok(root)
}

fn splice(root: &mut HierarchyNode, path: &[usize], node: &NodePayload) -> bool {
    let Some((position, walk)) = path.split_last() else {
        return false;
    };
    let mut target = root;
    for step in walk {
        match target.s.get_mut(*step) {
            Some(child) => target = child,
            None => return false,
        }
    }
    let at = (*position).min(target.s.len());
    target.s.insert(at, HierarchyNode::leaf(node.clone()));
    true
}

/// Pre-order log of a tree, stamped with the current time.
pub fn hierarchy_to_operations(tree: &HierarchyNode) -> Vec<Operation> {
    hierarchy_to_operations_at(tree, chrono::Utc::now().timestamp_millis())
}

pub fn hierarchy_to_operations_at(tree: &HierarchyNode, time: i64) -> Vec<Operation> {
    let mut ops = Vec::with_capacity(tree.node_count() + 1);
    ops.push(Operation::NewRoot {
        node: tree.n.content_only(),
    });
    let mut path = Vec::new();
    push_children(tree, &mut path, &mut ops);
    ops.push(Operation::Eof { time });
    ops
}

fn push_children(parent: &HierarchyNode, path: &mut Vec<usize>, ops: &mut Vec<Operation>) {
    for (i, child) in parent.s.iter().enumerate() {
        path.push(i);
        ops.push(Operation::Insert {
            node: child.n.content_only(),
            path: path.clone(),
        });
        push_children(child, path, ops);
        path.pop();
    }
}

/// Write records as a JSON array.
pub fn write_operations<W: Write>(ops: &[Operation], writer: W) -> Result<(), OperationsError> {
    let records: Vec<Value> = ops.iter().map(Operation::to_value).collect();
    serde_json::to_writer(writer, &records)?;
    Ok(())
}

pub fn operations_to_string(ops: &[Operation]) -> Result<String, OperationsError> {
    let records: Vec<Value> = ops.iter().map(Operation::to_value).collect();
    Ok(serde_json::to_string(&records)?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::node::NodeContent;
    use crate::testing;

    fn note(text: &str) -> Value {
        serde_json::to_value(NodePayload::new(&NodeContent::note(text))).unwrap()
    }

    fn log(records: Vec<Value>) -> Vec<Operation> {
        operations_from_values(&records)
    }

    fn notes(tree: &HierarchyNode) -> Vec<&str> {
        tree.s.iter().map(|c| c.n.data["note"].as_str().unwrap_or_default()).collect()
    }

    #[test]
    fn test_parse_wire_records() {
        let text = r#"[
            {"type": 2000, "node": {"type": "session"}},
            [2001, {"type": "win", "data": {"id": 1}}, [0]],
            [2001, {"data": {"url": "https://a.example"}}, [0, 0]],
            {"type": 11111, "time": 1700000000000}
        ]"#;
        let ops = parse_operations(text).unwrap();
        assert_eq!(ops.len(), 4);
        assert_eq!(ops[3], Operation::Eof { time: 1700000000000 });
        let tree = operations_to_hierarchy(&ops).unwrap();
        assert_eq!(tree.n.node_type, NodeType::Session);
        assert_eq!(tree.s[0].n.node_type, NodeType::Window);
        assert_eq!(tree.s[0].s[0].n.node_type, NodeType::SavedTab);
    }

    #[test]
    fn test_validation_rejects_bad_framing() {
        assert!(matches!(validate_operations(&[]), Err(OperationsError::Empty)));
        let root = json!({"type": 2000, "node": {"type": "session"}});
        let end = json!({"type": 11111, "time": 0});
        let insert = json!([2001, note("a"), [0]]);

        let ops = log(vec![insert.clone(), end.clone()]);
        assert!(matches!(validate_operations(&ops), Err(OperationsError::MissingRoot)));
        let ops = log(vec![root.clone(), insert.clone()]);
        assert!(matches!(operations_to_hierarchy(&ops), Err(OperationsError::MissingEnd)));
        let ops = log(vec![root, insert, end]);
        validate_operations(&ops).unwrap();
    }

    #[test]
    fn test_unreadable_records_are_kept_in_place() {
        let records = vec![
            json!({"type": 2000, "node": {}}),
            json!([2001, note("a")]),
            json!("garbage"),
            json!([77, {}]),
            json!({"type": 11111}),
        ];
        let ops = operations_from_values(&records);
        assert_eq!(ops.len(), 5);
        assert!(matches!(ops[1], Operation::Unreadable { .. }));
        assert!(matches!(ops[2], Operation::Unreadable { .. }));
        assert_eq!(ops[3].code(), 77);
        assert_eq!(ops[3].to_value(), json!([77, {}]));
        assert_eq!(ops[4], Operation::Eof { time: 0 });
        assert_eq!(operations_to_hierarchy(&ops).unwrap().node_count(), 1);
        assert!(matches!(parse_operations("{}"), Err(OperationsError::Json(_))));
    }

    #[test]
    fn test_unreadable_root_payload_reads_as_session() {
        let ops = log(vec![
            json!({"type": 2000, "node": {"type": "futurekind"}}),
            json!([2001, note("a"), [0]]),
            json!({"type": 11111, "time": 0}),
        ]);
        let tree = operations_to_hierarchy(&ops).unwrap();
        assert_eq!(tree.n.node_type, NodeType::Session);
        assert_eq!(notes(&tree), vec!["a"]);
    }

    #[test]
    fn test_negative_path_index_skips_only_that_record() {
        let ops = log(vec![
            json!({"type": 2000, "node": {"type": "session"}}),
            json!([2001, note("a"), [0]]),
            json!([2001, note("bad"), [-1, 0]]),
            json!([2001, note("half"), [0.5]]),
            json!([2001, note("text"), "0"]),
            json!({"type": 11111, "time": 0}),
        ]);
        validate_operations(&ops).unwrap();
        let tree = operations_to_hierarchy(&ops).unwrap();
        assert_eq!(tree.n.node_type, NodeType::Session);
        assert_eq!(notes(&tree), vec!["a"]);
        assert!(tree.s[0].s.is_empty());
    }

    #[test]
    fn test_unknown_node_type_skips_only_that_record() {
        let ops = log(vec![
            json!({"type": 2000, "node": {"type": "session"}}),
            json!([2001, note("a"), [0]]),
            json!([2001, {"type": "futurekind"}, [1]]),
            json!({"type": 11111, "time": 0}),
        ]);
        assert!(matches!(ops[2], Operation::Unreadable { .. }));
        let tree = operations_to_hierarchy(&ops).unwrap();
        assert_eq!(tree.node_count(), 2);
        assert_eq!(notes(&tree), vec!["a"]);
    }

    #[test]
    fn test_bad_paths_are_skipped() {
        let ops = log(vec![
            json!({"type": 2000, "node": {"type": "session"}}),
            json!([2001, note("a"), [0]]),
            json!([2001, note("lost"), [5, 0]]),
            json!([2001, note("empty"), []]),
            json!([2001, note("clamped"), [99]]),
            json!([2001, note("front"), [0]]),
            json!([2001, note("inner"), [1, 0]]),
            json!({"type": 11111, "time": 0}),
        ]);
        let tree = operations_to_hierarchy(&ops).unwrap();
        assert_eq!(notes(&tree), vec!["front", "a", "clamped"]);
        assert_eq!(notes(&tree.s[1]), vec!["inner"]);
    }

    #[test]
    fn test_reserved_codes_pass_validation_and_are_skipped() {
        let ops = log(vec![
            json!({"type": 2000, "node": {"type": "session"}}),
            json!([2001, note("a"), [0]]),
            json!([2002, [0], [1]]),
            json!([2004, [0]]),
            json!({"type": 11111, "time": 0}),
        ]);
        assert_eq!(ops[2].code(), OP_MOVE);
        let tree = operations_to_hierarchy(&ops).unwrap();
        assert_eq!(notes(&tree), vec!["a"]);
    }

    #[test]
    fn test_hierarchy_round_trip() {
        let tree = testing::all_types_hierarchy();
        let ops = hierarchy_to_operations_at(&tree, 42);
        assert_eq!(ops.len(), tree.node_count() + 1);
        assert_eq!(ops.last(), Some(&Operation::Eof { time: 42 }));

        let text = operations_to_string(&ops).unwrap();
        let rebuilt = operations_to_hierarchy(&parse_operations(&text).unwrap()).unwrap();

        // The log carries content only.
        let mut expected = tree.clone();
        strip_ids(&mut expected);
        assert_eq!(rebuilt, expected);
    }

    fn strip_ids(tree: &mut HierarchyNode) {
        tree.n = tree.n.content_only();
        tree.s.iter_mut().for_each(strip_ids);
    }

    #[test]
    fn test_preorder_paths() {
        let tree = testing::clean_hierarchy();
        let paths: Vec<Vec<usize>> = hierarchy_to_operations(&tree)
            .into_iter()
            .filter_map(|op| match op {
                Operation::Insert { path, .. } => Some(path),
                _ => None,
            })
            .collect();
        assert_eq!(paths, vec![vec![0], vec![0, 0], vec![1]]);
    }

    #[test]
    fn test_write_operations() {
        let ops = hierarchy_to_operations_at(&testing::clean_hierarchy(), 7);
        let mut buf = Vec::new();
        write_operations(&ops, &mut buf).unwrap();
        let value: Value = serde_json::from_slice(&buf).unwrap();
        assert_eq!(value[0]["type"], json!(OP_NEW_ROOT));
        assert_eq!(value[1][0], json!(OP_INSERT));
        assert_eq!(value[4], json!({"type": OP_EOF, "time": 7}));
    }
}
