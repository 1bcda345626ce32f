//! Rebuild a full hierarchy from flat knot and entry dictionaries.
//!
//! Restores never fail on corrupt data. A knot or entry that cannot be
//! found, and a child id that was already visited, each become a text note
//! saying so. A chain of base references that loops back on itself is cut,
//! and the unresolved remainder reads as an empty list. Nothing below
//! [`RestoreSettings::max_depth`] is resolved.

use crate::base36;
use crate::config::RestoreSettings;
use crate::entry::{decode_entry, Entry};
use crate::hierarchy::HierarchyNode;
use crate::knot::{restore_subnodes_list, Knot};
use crate::node::{NodeContent, NodePayload, NodeType};
use serde_json::Value;
use std::collections::{BTreeMap, HashSet};

/// Resolve the tree rooted at knot `root`. The root is always read as a
/// session, whatever its entry says.
pub fn resolve_tree(
    root: &str,
    knots: &BTreeMap<String, String>,
    entries: &BTreeMap<String, Entry>,
    settings: &RestoreSettings,
) -> HierarchyNode {
    let mut resolver = KnotResolver {
        knots,
        entries,
        settings,
        visited: HashSet::new(),
    };
    let mut tree = resolver.node(root, 0);
    if tree.n.node_type != NodeType::Session {
        tracing::warn!("root knot {root} is a {}, reading it as a session", tree.n.node_type);
        tree.n.node_type = NodeType::Session;
        tree.n.data = Value::Null;
    }
    tree
}

struct KnotResolver<'a> {
    knots: &'a BTreeMap<String, String>,
    entries: &'a BTreeMap<String, Entry>,
    settings: &'a RestoreSettings,
    visited: HashSet<String>,
}

impl KnotResolver<'_> {
    fn node(&mut self, d_id: &str, depth: usize) -> HierarchyNode {
        if depth > self.settings.max_depth {
            tracing::warn!("knot {d_id} is deeper than {} levels, cutting it", self.settings.max_depth);
            return placeholder(&self.settings.depth_note, &format!("knot {d_id}"));
        }
        if !self.visited.insert(d_id.to_string()) {
            tracing::warn!("knot {d_id} appears twice in the tree, cutting the cycle");
            return placeholder(&self.settings.cycle_note, &format!("knot {d_id}"));
        }
        let Some(text) = self.knots.get(d_id) else {
            tracing::warn!("knot {d_id} is missing");
            return placeholder(&self.settings.missing_note, &format!("knot {d_id}"));
        };
        let knot = Knot::parse(text);
        let Some(entry) = self.entries.get(knot.cd_id()) else {
            tracing::warn!("entry {} for knot {d_id} is missing", knot.cd_id());
            return placeholder(&self.settings.missing_note, &format!("entry {}", knot.cd_id()));
        };

        let mut payload = decode_entry(entry);
        let subnode_ids = self.subnode_ids(d_id, &knot);
        let children: Vec<HierarchyNode> = subnode_ids.iter().map(|id| self.node(id, depth + 1)).collect();

        // A node stays clean only if its id parses and every child is clean;
        // otherwise the next diff pass must rewrite it.
        let d_id_value = base36::decode(d_id).unwrap_or(0);
        let children_clean = children.iter().all(|c| c.n.d_id != 0);
        if d_id_value != 0 && children_clean {
            payload.d_id = d_id_value;
            payload.cd_id = base36::decode(knot.cd_id()).unwrap_or(0);
            payload.sd_id = if children.is_empty() { 0 } else { d_id_value };
            payload.sd_id_knot = Some(text.clone());
        }

        HierarchyNode::with_children(payload, children)
    }

    /// Follow base references down to a bare or inline knot, then replay
    /// the deltas met on the way back up.
    fn subnode_ids(&self, d_id: &str, knot: &Knot) -> Vec<String> {
        let mut seen_bases = HashSet::from([d_id.to_string()]);
        let mut deltas: Vec<String> = Vec::new();
        let mut current = knot.clone();
        let mut list = loop {
            let base = match current {
                Knot::Bare { .. } => break Vec::new(),
                Knot::Inline { subnodes, .. } => break subnodes,
                Knot::Reference { base, .. } => base,
                Knot::Delta { base, ops, .. } => {
                    deltas.push(ops);
                    base
                }
            };
            if !seen_bases.insert(base.clone()) {
                tracing::warn!("knot base chain loops at {base}, reading it as empty");
                break Vec::new();
            }
            match self.knots.get(&base) {
                Some(text) => current = Knot::parse(text),
                None => {
                    tracing::warn!("base knot {base} is missing, reading it as empty");
                    break Vec::new();
                }
            }
        };
        for ops in deltas.iter().rev() {
            list = restore_subnodes_list(&list, ops);
        }
        list
    }
}

fn placeholder(prefix: &str, what: &str) -> HierarchyNode {
    HierarchyNode::leaf(NodePayload::new(&NodeContent::note(format!("{prefix} {what}"))))
}
