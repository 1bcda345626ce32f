//! Full-tree hierarchy format: validation and mark field normalization.
//!
//! A hierarchy is the recursive record `{"n": payload, "s": [children...]}`.
//! Input may come from any past release, so marks are normalized while
//! reading: old minified builds wrote mark fields under mangled names.

use crate::node::{NodePayload, NodeType};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HierarchyNode {
    pub n: NodePayload,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub s: Vec<HierarchyNode>,
}

impl HierarchyNode {
    pub fn leaf(n: NodePayload) -> Self {
        Self { n, s: Vec::new() }
    }

    pub fn with_children(n: NodePayload, s: Vec<HierarchyNode>) -> Self {
        Self { n, s }
    }

    /// Number of nodes in this subtree, itself included.
    pub fn node_count(&self) -> usize {
        1 + self.s.iter().map(HierarchyNode::node_count).sum::<usize>()
    }

    /// Pre-order visit of every payload.
    pub fn visit<'a>(&'a self, f: &mut impl FnMut(&'a NodePayload)) {
        f(&self.n);
        for child in &self.s {
            child.visit(f);
        }
    }
}

#[derive(Debug, Error, PartialEq)]
#[non_exhaustive]
pub enum ShapeError {
    #[error("{path}: node is not an object")]
    NotAnObject { path: String },
    #[error("{path}: missing node payload")]
    MissingPayload { path: String },
    #[error("{path}: unknown node type {found}")]
    UnknownType { path: String, found: String },
    #[error("{path}: children must be an array")]
    InvalidChildren { path: String },
}

#[derive(Debug, Error)]
#[non_exhaustive]
pub enum HierarchyError {
    #[error("invalid JSON: {0}")]
    Json(#[from] serde_json::Error),
    #[error("invalid hierarchy ({} problem(s)): {}", .0.len(), first_problem(.0))]
    Invalid(Vec<ShapeError>),
}

fn first_problem(errors: &[ShapeError]) -> String {
    errors.first().map(ToString::to_string).unwrap_or_default()
}

/// Parse and validate wire text into a hierarchy.
pub fn parse_hierarchy(text: &str) -> Result<HierarchyNode, HierarchyError> {
    let value: Value = serde_json::from_str(text)?;
    hierarchy_from_value(&value)
}

/// Validate an already-parsed value and convert it. Marks are normalized.
pub fn hierarchy_from_value(value: &Value) -> Result<HierarchyNode, HierarchyError> {
    validate_hierarchy(value).map_err(HierarchyError::Invalid)?;
    Ok(HierarchyNode::deserialize(value)?)
}

/// Check the shape of every node: an object with an object payload, a type
/// drawn from the type table, and an array of well-formed children.
pub fn validate_hierarchy(value: &Value) -> Result<(), Vec<ShapeError>> {
    let mut errors = Vec::new();
    validate_node(value, "", &mut errors);
    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

fn validate_node(value: &Value, path: &str, errors: &mut Vec<ShapeError>) {
    let display_path = if path.is_empty() { "/" } else { path };
    let Some(node) = value.as_object() else {
        errors.push(ShapeError::NotAnObject {
            path: display_path.to_string(),
        });
        return;
    };

    match node.get("n") {
        Some(Value::Object(payload)) => {
            if let Some(raw_type) = payload.get("type") {
                let known = raw_type
                    .as_str()
                    .and_then(NodeType::from_name)
                    .is_some();
                if !known {
                    errors.push(ShapeError::UnknownType {
                        path: display_path.to_string(),
                        found: raw_type.to_string(),
                    });
                }
            }
        }
        _ => errors.push(ShapeError::MissingPayload {
            path: display_path.to_string(),
        }),
    }

    match node.get("s") {
        None => {}
        Some(Value::Array(children)) => {
            for (i, child) in children.iter().enumerate() {
                validate_node(child, &format!("{path}/s/{i}"), errors);
            }
        }
        Some(_) => errors.push(ShapeError::InvalidChildren {
            path: display_path.to_string(),
        }),
    }
}

/// Mangled field names written by minified releases, per canonical field:
/// `(canonical, 0.5 name, 0.4 name)`. The canonical name wins over both,
/// and the 0.5 name wins over the 0.4 name.
const MANGLED_MARK_FIELDS: [(&str, &str, &str); 5] = [
    ("customTitle", "Pa", "J"),
    ("customFavicon", "Qa", "u"),
    ("customColorActive", "Ra", "K"),
    ("customColorSaved", "Sa", "L"),
    ("relicons", "Ta", "Y"),
];

fn is_mangled(key: &str) -> bool {
    MANGLED_MARK_FIELDS
        .iter()
        .any(|(_, newer, older)| key == *newer || key == *older)
}

/// Canonical form of a raw marks value. Never mutates the input, and
/// applying it to its own output returns the output unchanged.
///
/// The result always carries `relicons` as a freshly built array; any
/// non-array value there is replaced by an empty one.
pub fn normalize_marks(raw: &Value) -> Value {
    let empty = Map::new();
    let source = raw.as_object().unwrap_or(&empty);

    let mut out: Map<String, Value> = source
        .iter()
        .filter(|(key, _)| !is_mangled(key))
        .map(|(key, value)| (key.clone(), value.clone()))
        .collect();

    for (canonical, newer, older) in MANGLED_MARK_FIELDS {
        if out.contains_key(canonical) {
            continue;
        }
        if let Some(value) = source.get(newer).or_else(|| source.get(older)) {
            out.insert(canonical.to_string(), value.clone());
        }
    }

    let relicons = match out.remove("relicons") {
        Some(Value::Array(items)) => items,
        _ => Vec::new(),
    };
    out.insert("relicons".to_string(), Value::Array(relicons));

    Value::Object(out)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::node::Marks;
    use serde_json::json;

    #[test]
    fn test_valid_hierarchy() {
        let value = json!({
            "n": {"type": "session"},
            "s": [
                {"n": {"type": "win", "data": {"id": 1}}, "s": [{"n": {"data": {"url": "u"}}}]},
                {"n": {"type": "textnote", "data": {"note": "hi"}}}
            ]
        });
        let tree = hierarchy_from_value(&value).unwrap();
        assert_eq!(tree.node_count(), 4);
        assert_eq!(tree.s[0].s[0].n.node_type, NodeType::SavedTab);
    }

    #[test]
    fn test_not_an_object() {
        let errs = validate_hierarchy(&json!([1])).unwrap_err();
        assert_eq!(
            errs,
            vec![ShapeError::NotAnObject {
                path: "/".to_string()
            }]
        );
    }

    #[test]
    fn test_missing_payload_and_bad_children() {
        let errs = validate_hierarchy(&json!({"s": {"n": {}}})).unwrap_err();
        assert!(errs.iter().any(|e| matches!(e, ShapeError::MissingPayload { .. })));
        assert!(errs.iter().any(|e| matches!(e, ShapeError::InvalidChildren { .. })));
    }

    #[test]
    fn test_unknown_type_reports_nested_path() {
        let value = json!({
            "n": {"type": "session"},
            "s": [{"n": {}}, {"n": {"type": "tabz"}}]
        });
        let errs = validate_hierarchy(&value).unwrap_err();
        assert_eq!(
            errs,
            vec![ShapeError::UnknownType {
                path: "/s/1".to_string(),
                found: "\"tabz\"".to_string()
            }]
        );
    }

    #[test]
    fn test_numeric_type_is_rejected() {
        let errs = validate_hierarchy(&json!({"n": {"type": 4}})).unwrap_err();
        assert!(matches!(errs[0], ShapeError::UnknownType { .. }));
    }

    #[test]
    fn test_parse_hierarchy_invalid_json() {
        let err = parse_hierarchy("{not json").unwrap_err();
        assert!(matches!(err, HierarchyError::Json(_)));
        let err = parse_hierarchy("[]").unwrap_err();
        assert!(matches!(err, HierarchyError::Invalid(_)));
    }

    #[test]
    fn test_normalize_legacy_names() {
        let raw = json!({"J": "old title", "u": "fav.png", "Y": [{"src": "a"}]});
        assert_eq!(
            normalize_marks(&raw),
            json!({"customTitle": "old title", "customFavicon": "fav.png", "relicons": [{"src": "a"}]})
        );
    }

    #[test]
    fn test_normalize_precedence() {
        let raw = json!({"J": "v04", "Pa": "v05"});
        assert_eq!(normalize_marks(&raw)["customTitle"], json!("v05"));
        let raw = json!({"J": "v04", "Pa": "v05", "customTitle": "canonical"});
        assert_eq!(normalize_marks(&raw)["customTitle"], json!("canonical"));
    }

    #[test]
    fn test_normalize_relicons_always_array() {
        assert_eq!(normalize_marks(&json!({"relicons": "x"}))["relicons"], json!([]));
        assert_eq!(normalize_marks(&json!(null)), json!({"relicons": []}));
        assert_eq!(normalize_marks(&json!({"Ta": 5}))["relicons"], json!([]));
    }

    #[test]
    fn test_normalize_is_idempotent_and_pure() {
        let inputs = [
            json!({"J": "a", "K": "#fff", "Ta": [1, 2]}),
            json!({"customTitle": "b", "Pa": "c", "relicons": {}}),
            json!({"customColorSaved": "#000", "extra": true}),
            json!("garbage"),
        ];
        for raw in inputs {
            let before = raw.clone();
            let once = normalize_marks(&raw);
            assert_eq!(raw, before);
            assert_eq!(normalize_marks(&once), once);
        }
    }

    #[test]
    fn test_marks_deserialize_through_normalizer() {
        let marks: Marks = serde_json::from_value(json!({"Pa": "t", "L": "#123"})).unwrap();
        assert_eq!(marks.custom_title.as_deref(), Some("t"));
        assert_eq!(marks.custom_color_saved.as_deref(), Some("#123"));
        assert_eq!(
            serde_json::to_value(&marks).unwrap(),
            json!({"customTitle": "t", "customColorSaved": "#123"})
        );
    }

    #[test]
    fn test_marks_serialize_relicons_only_when_present() {
        let marks: Marks = serde_json::from_value(json!({"customTitle": "x"})).unwrap();
        assert!(marks.relicons.is_empty());
        assert_eq!(serde_json::to_value(&marks).unwrap(), json!({"customTitle": "x"}));

        let marks: Marks = serde_json::from_value(json!({"Y": [{"src": "r.png"}]})).unwrap();
        assert_eq!(serde_json::to_value(&marks).unwrap(), json!({"relicons": [{"src": "r.png"}]}));
    }
}
