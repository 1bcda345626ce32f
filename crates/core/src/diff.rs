//! Incremental diff pass: turn the dirty parts of a tree into new knots and
//! entries.
//!
//! Clean subtrees keep their ids and emit nothing. A dirty node gets a new
//! `dId`, reuses its `cdId` when its encoded entry is unchanged, and emits a
//! knot in the shortest available form. Reference and delta forms use the
//! node's previously emitted knot as their base.

use crate::base36;
use crate::config::{DiffSettings, RestoreSettings};
use crate::entry::{encode_entry, Entry};
use crate::hierarchy::HierarchyNode;
use crate::knot::{serialize_cur_subnodes, Knot};
use crate::resolve::resolve_tree;
use crate::tree::{DiffIds, MvcId, TreeModel};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap};

/// Knot and entry additions from one pass, plus the id to resume from.
/// Merged over older snapshots it forms the full persisted dictionaries.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DiffSnapshot {
    pub root: String,
    #[serde(default)]
    pub knots: BTreeMap<String, String>,
    #[serde(default)]
    pub entries: BTreeMap<String, Entry>,
    #[serde(default)]
    pub next_id: u64,
}

impl DiffSnapshot {
    /// Fold a newer pass into this one.
    pub fn merge(&mut self, newer: DiffSnapshot) {
        self.root = newer.root;
        self.next_id = self.next_id.max(newer.next_id);
        self.knots.extend(newer.knots);
        self.entries.extend(newer.entries);
    }

    pub fn resolve(&self, settings: &RestoreSettings) -> HierarchyNode {
        resolve_tree(&self.root, &self.knots, &self.entries, settings)
    }
}

/// What a node last emitted, kept as the base for its next knot.
#[derive(Debug, Clone)]
struct EmittedKnot {
    d_id: u64,
    cd_id: u64,
    subnodes: Vec<String>,
    entry: Entry,
    /// Base references between this knot and an inline one.
    /// `usize::MAX` when unknown.
    chain: usize,
}

/// Id allocator and per-node memo carried between passes.
#[derive(Debug, Clone)]
pub struct DiffState {
    next_id: u64,
    memo: HashMap<MvcId, EmittedKnot>,
}

impl Default for DiffState {
    fn default() -> Self {
        Self::resume(1)
    }
}

impl DiffState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Continue numbering from a persisted `next_id`.
    pub fn resume(next_id: u64) -> Self {
        Self {
            next_id: next_id.max(1),
            memo: HashMap::new(),
        }
    }

    pub fn next_id(&self) -> u64 {
        self.next_id
    }

    fn allocate(&mut self) -> u64 {
        let id = self.next_id;
        self.next_id += 1;
        id
    }

    /// Rebuild the memo from a restored model's clean nodes, and move
    /// `next_id` past every id already in use.
    pub fn prime(&mut self, model: &TreeModel) {
        for id in model.preorder() {
            let Some(node) = model.node(id) else {
                continue;
            };
            let diff = node.diff_ids();
            self.next_id = self
                .next_id
                .max(diff.d_id.saturating_add(1))
                .max(diff.cd_id.saturating_add(1));
            if !diff.is_clean() {
                continue;
            }
            let subnodes: Option<Vec<String>> = node
                .subnodes()
                .iter()
                .map(|child| {
                    model
                        .node(*child)
                        .map(|c| c.diff_ids().d_id)
                        .filter(|d| *d != 0)
                        .map(base36::encode)
                })
                .collect();
            let Some(subnodes) = subnodes else {
                continue;
            };
            let chain = match diff.sd_id_knot.as_deref().map(Knot::parse) {
                Some(knot) if knot.base().is_some() => usize::MAX,
                _ => 0,
            };
            self.memo.insert(
                id,
                EmittedKnot {
                    d_id: diff.d_id,
                    cd_id: diff.cd_id,
                    subnodes,
                    entry: encode_entry(&node.payload().content_only()),
                    chain,
                },
            );
        }
    }
}

/// Run one diff pass over `model`, marking every visited node clean.
pub fn serialize_diff(model: &mut TreeModel, state: &mut DiffState, settings: &DiffSettings) -> DiffSnapshot {
    let mut out = DiffSnapshot::default();
    let root = model.root();
    let root_d_id = visit(model, state, settings, root, &mut out);
    out.root = base36::encode(root_d_id);
    out.next_id = state.next_id;
    state.memo.retain(|id, _| model.node(*id).is_some());
    tracing::debug!(
        knots = out.knots.len(),
        entries = out.entries.len(),
        root = %out.root,
        "diff pass complete"
    );
    out
}

/// Post-order walk over the dirty part of the tree. Clean subtrees are
/// not entered; their stored `dId` is reused.
fn visit(
    model: &mut TreeModel,
    state: &mut DiffState,
    settings: &DiffSettings,
    root: MvcId,
    out: &mut DiffSnapshot,
) -> u64 {
    let mut emitted: HashMap<MvcId, u64> = HashMap::new();
    let mut stack = vec![(root, false)];
    while let Some((id, expanded)) = stack.pop() {
        let Some(node) = model.node(id) else {
            emitted.insert(id, 0);
            continue;
        };
        if node.diff_ids().is_clean() {
            emitted.insert(id, node.diff_ids().d_id);
            continue;
        }
        if !expanded {
            stack.push((id, true));
            stack.extend(node.subnodes().iter().rev().map(|child| (*child, false)));
            continue;
        }
        let d_id = emit_knot(model, state, settings, id, &emitted, out);
        emitted.insert(id, d_id);
    }
    emitted.get(&root).copied().unwrap_or(0)
}

/// Write the entry and knot of a dirty node whose children are all done.
fn emit_knot(
    model: &mut TreeModel,
    state: &mut DiffState,
    settings: &DiffSettings,
    id: MvcId,
    emitted: &HashMap<MvcId, u64>,
    out: &mut DiffSnapshot,
) -> u64 {
    let Some(node) = model.node(id) else {
        return 0;
    };
    let entry = encode_entry(&node.payload().content_only());
    let previous = node.previous_id();
    let subnodes: Vec<String> = node
        .subnodes()
        .iter()
        .map(|child| base36::encode(emitted.get(child).copied().unwrap_or(0)))
        .collect();

    let memo = state
        .memo
        .get(&id)
        .or_else(|| previous.and_then(|p| state.memo.get(&p)))
        .cloned();

    let cd_id = match &memo {
        Some(m) if m.entry == entry => m.cd_id,
        _ => {
            let cd_id = state.allocate();
            out.entries.insert(base36::encode(cd_id), entry.clone());
            cd_id
        }
    };
    let (knot, chain) = choose_knot(cd_id, &subnodes, memo.as_ref(), settings);
    let knot_text = knot.to_string();
    let d_id = state.allocate();
    out.knots.insert(base36::encode(d_id), knot_text.clone());

    if let Some(node) = model.node_mut(id) {
        node.diff = DiffIds {
            d_id,
            cd_id,
            sd_id: if subnodes.is_empty() { 0 } else { d_id },
            sd_id_knot: Some(knot_text),
        };
    }
    state.memo.insert(
        id,
        EmittedKnot {
            d_id,
            cd_id,
            subnodes,
            entry,
            chain,
        },
    );
    d_id
}

fn choose_knot(cd_id: u64, subnodes: &[String], memo: Option<&EmittedKnot>, settings: &DiffSettings) -> (Knot, usize) {
    let cd = base36::encode(cd_id);
    if subnodes.is_empty() {
        return (Knot::Bare { cd_id: cd }, 0);
    }
    let inline = Knot::Inline {
        cd_id: cd.clone(),
        subnodes: subnodes.to_vec(),
    };
    let Some(base) = memo.filter(|m| {
        settings.prefer_delta && !m.subnodes.is_empty() && m.chain < settings.max_base_chain
    }) else {
        return (inline, 0);
    };

    let chain = base.chain + 1;
    if base.subnodes == subnodes {
        let reference = Knot::Reference {
            cd_id: cd,
            base: base36::encode(base.d_id),
        };
        return (reference, chain);
    }
    let delta = Knot::Delta {
        cd_id: cd,
        base: base36::encode(base.d_id),
        ops: serialize_cur_subnodes(subnodes, base.subnodes.as_slice()),
    };
    if delta.to_string().len() < inline.to_string().len() {
        (delta, chain)
    } else {
        (inline, 0)
    }
}
