//! Tree model: the node arena, its indices, and the mutation API.
//!
//! Nodes live in one map keyed by communication id, which doubles as the
//! communication-id index. Children own their position through the
//! parent's `subnodes` list; `parent` is a plain back-reference by id.
//!
//! Every structural edit clears the diff ids of the touched node and all of
//! its ancestors, so the next diff pass re-emits exactly the dirty paths.

use crate::hierarchy::HierarchyNode;
use crate::node::{Marks, NodeAction, NodeContent, NodePayload, NodeType, SessionData};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap};
use std::fmt;
use thiserror::Error;

/// Process-local node identity used for UI/session message correlation.
/// Never persisted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct MvcId(pub u64);

impl fmt::Display for MvcId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "idmvc{}", self.0)
    }
}

/// Source of fresh communication ids. Owned by a model; tests swap in a
/// fresh one instead of resetting global state.
#[derive(Debug, Clone)]
pub struct MvcIdGenerator {
    next: u64,
}

impl Default for MvcIdGenerator {
    fn default() -> Self {
        Self { next: 1 }
    }
}

impl MvcIdGenerator {
    pub fn starting_at(next: u64) -> Self {
        Self { next: next.max(1) }
    }

    pub fn next_id(&mut self) -> MvcId {
        let id = MvcId(self.next);
        self.next += 1;
        id
    }
}

/// Diff-tracking ids of one node. All zero/absent means "dirty".
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DiffIds {
    pub d_id: u64,
    pub cd_id: u64,
    pub sd_id: u64,
    pub sd_id_knot: Option<String>,
}

impl DiffIds {
    pub fn is_clean(&self) -> bool {
        self.d_id != 0
    }

    fn from_payload(payload: &NodePayload) -> Self {
        Self {
            d_id: payload.d_id,
            cd_id: payload.cd_id,
            sd_id: payload.sd_id,
            sd_id_knot: payload.sd_id_knot.clone(),
        }
    }
}

#[derive(Debug, Clone)]
pub struct TreeNode {
    id: MvcId,
    previous_id: Option<MvcId>,
    content: NodeContent,
    colapsed: bool,
    marks: Marks,
    parent: Option<MvcId>,
    subnodes: Vec<MvcId>,
    pub(crate) diff: DiffIds,
}

impl TreeNode {
    pub fn id(&self) -> MvcId {
        self.id
    }

    pub fn previous_id(&self) -> Option<MvcId> {
        self.previous_id
    }

    pub fn content(&self) -> &NodeContent {
        &self.content
    }

    pub fn node_type(&self) -> NodeType {
        self.content.node_type()
    }

    pub fn is_collapsed(&self) -> bool {
        self.colapsed
    }

    pub fn marks(&self) -> &Marks {
        &self.marks
    }

    pub fn parent(&self) -> Option<MvcId> {
        self.parent
    }

    pub fn subnodes(&self) -> &[MvcId] {
        &self.subnodes
    }

    pub fn diff_ids(&self) -> &DiffIds {
        &self.diff
    }

    pub fn custom_title(&self) -> Option<&str> {
        self.marks.custom_title.as_deref()
    }

    /// Display text; a custom title overrides the content's own text.
    pub fn text(&self) -> String {
        match self.custom_title() {
            Some(title) => title.to_string(),
            None => self.content.text(),
        }
    }

    pub fn icon(&self) -> &str {
        self.marks
            .custom_favicon
            .as_deref()
            .unwrap_or_else(|| self.content.icon())
    }

    /// Persistable payload, diff ids included when set.
    pub fn payload(&self) -> NodePayload {
        NodePayload {
            node_type: self.content.node_type(),
            data: self.content.to_data(),
            marks: (!self.marks.is_empty()).then(|| self.marks.clone()),
            colapsed: self.colapsed,
            d_id: self.diff.d_id,
            cd_id: self.diff.cd_id,
            sd_id: self.diff.sd_id,
            sd_id_knot: self.diff.sd_id_knot.clone(),
        }
    }

    /// True for an unmarked, childless live tab: the only kind of child
    /// that lets its parent disappear silently.
    fn is_disposable_child(&self) -> bool {
        self.content.is_an_open_tab() && self.marks.is_empty() && self.subnodes.is_empty()
    }
}

#[derive(Debug, Error, PartialEq)]
#[non_exhaustive]
pub enum TreeError {
    #[error("unknown node {0}")]
    UnknownNode(MvcId),
    #[error("the root node cannot be {0}")]
    RootMutation(&'static str),
    #[error("cannot move {node} into its own subtree")]
    MoveIntoOwnSubtree { node: MvcId },
    #[error("host object has no browser id")]
    MissingHostId,
    #[error("action {action:?} is not available on {node}")]
    ActionNotAvailable { node: MvcId, action: NodeAction },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MutationKind {
    Insert,
    Remove,
    Move,
    Collapse,
    Marks,
    Replace,
    Update,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SubtreeStats {
    pub nodes_count: usize,
    pub active_tabs_count: usize,
    pub active_windows_count: usize,
}

/// Row state of one ancestor, enough for an observer to patch it in place.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ParentUpdate {
    pub has_children: bool,
    pub colapsed: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub stats: Option<SubtreeStats>,
    pub protected: bool,
    pub css_classes: Vec<String>,
    pub is_selected_tab: bool,
    pub is_focused_window: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TreeMutationResult {
    #[serde(rename = "type")]
    pub kind: MutationKind,
    pub affected_node_id: MvcId,
    pub parent_updates: BTreeMap<MvcId, ParentUpdate>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub deleted_node_ids: Option<Vec<MvcId>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cursor_suggestion: Option<MvcId>,
}

/// Read-only view of a node for the rendering layer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NodeSnapshot {
    pub id_mvc: MvcId,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub previous_id_mvc: Option<MvcId>,
    #[serde(rename = "type")]
    pub node_type: NodeType,
    pub text: String,
    pub tooltip: String,
    pub icon: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub href: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub custom_title: Option<String>,
    pub colapsed: bool,
    pub subnodes: Vec<MvcId>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub stats: Option<SubtreeStats>,
    pub protected: bool,
    pub css_classes: Vec<String>,
    pub is_selected_tab: bool,
    pub is_focused_window: bool,
    pub actions: Vec<NodeAction>,
}

/// Destination of a move: `container` of `None` means the root, and a
/// `position` of `None` or past the end appends.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct MoveTarget {
    pub container: Option<MvcId>,
    pub position: Option<usize>,
}

impl From<NodeContent> for HierarchyNode {
    fn from(content: NodeContent) -> Self {
        HierarchyNode::leaf(NodePayload::new(&content))
    }
}

#[derive(Debug, Clone)]
pub struct TreeModel {
    ids: MvcIdGenerator,
    root: MvcId,
    nodes: HashMap<MvcId, TreeNode>,
    tabs: HashMap<i64, MvcId>,
    windows: HashMap<i64, MvcId>,
}

impl Default for TreeModel {
    fn default() -> Self {
        Self::new()
    }
}

impl TreeModel {
    /// Empty tree with a fresh session root.
    pub fn new() -> Self {
        Self::with_id_generator(MvcIdGenerator::default())
    }

    pub fn with_id_generator(ids: MvcIdGenerator) -> Self {
        let session = NodeContent::Session(SessionData {
            tree_id: Some(uuid::Uuid::new_v4().to_string()),
            created: Some(chrono::Utc::now().timestamp_millis()),
        });
        let mut model = Self {
            ids,
            root: MvcId(0),
            nodes: HashMap::new(),
            tabs: HashMap::new(),
            windows: HashMap::new(),
        };
        model.root = model.materialize(&HierarchyNode::from(session), None, false);
        model
    }

    /// Rebuild a model from a full-tree hierarchy. Diff ids are kept, so a
    /// restored tree is clean. A non-session root is read as a session with
    /// no data; its marks and collapsed flag stay.
    pub fn from_hierarchy(hierarchy: &HierarchyNode) -> Self {
        Self::from_hierarchy_with(hierarchy, MvcIdGenerator::default())
    }

    pub fn from_hierarchy_with(hierarchy: &HierarchyNode, ids: MvcIdGenerator) -> Self {
        let mut model = Self {
            ids,
            root: MvcId(0),
            nodes: HashMap::new(),
            tabs: HashMap::new(),
            windows: HashMap::new(),
        };
        let root = model.materialize(hierarchy, None, true);
        model.root = root;
        if hierarchy.n.node_type != NodeType::Session {
            tracing::warn!("hierarchy root is {}, restoring it as a session", hierarchy.n.node_type);
            model.unindex_node(root);
            if let Some(node) = model.nodes.get_mut(&root) {
                node.content = NodeContent::Session(SessionData::default());
            }
        }
        model
    }

    pub fn to_hierarchy(&self) -> HierarchyNode {
        self.subtree_hierarchy(self.root)
    }

    /// Children are built before their parents, in reverse pre-order.
    fn subtree_hierarchy(&self, id: MvcId) -> HierarchyNode {
        let order = self.subtree_ids(id);
        let mut built: HashMap<MvcId, HierarchyNode> = HashMap::with_capacity(order.len());
        for current in order.iter().rev() {
            let node = &self.nodes[current];
            let children = node.subnodes.iter().filter_map(|child| built.remove(child)).collect();
            built.insert(*current, HierarchyNode::with_children(node.payload(), children));
        }
        built
            .remove(&id)
            .unwrap_or_else(|| HierarchyNode::leaf(NodePayload::default()))
    }

    pub fn root(&self) -> MvcId {
        self.root
    }

    pub fn node(&self, id: MvcId) -> Option<&TreeNode> {
        self.nodes.get(&id)
    }

    fn get(&self, id: MvcId) -> Result<&TreeNode, TreeError> {
        self.nodes.get(&id).ok_or(TreeError::UnknownNode(id))
    }

    pub(crate) fn node_mut(&mut self, id: MvcId) -> Option<&mut TreeNode> {
        self.nodes.get_mut(&id)
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn find_by_tab_id(&self, tab_id: i64) -> Option<MvcId> {
        self.tabs.get(&tab_id).copied()
    }

    pub fn find_by_window_id(&self, window_id: i64) -> Option<MvcId> {
        self.windows.get(&window_id).copied()
    }

    /// Ids of the subtree rooted at `id`, in pre-order.
    pub fn subtree_ids(&self, id: MvcId) -> Vec<MvcId> {
        let mut out = Vec::new();
        let mut stack = vec![id];
        while let Some(current) = stack.pop() {
            let Some(node) = self.nodes.get(&current) else {
                continue;
            };
            out.push(current);
            stack.extend(node.subnodes.iter().rev().copied());
        }
        out
    }

    /// All ids in the tree, in pre-order.
    pub fn preorder(&self) -> Vec<MvcId> {
        self.subtree_ids(self.root)
    }

    /// `id` followed by each ancestor up to the root.
    pub fn path_to_root(&self, id: MvcId) -> Vec<MvcId> {
        let mut out = Vec::new();
        let mut current = Some(id);
        while let Some(node_id) = current {
            let Some(node) = self.nodes.get(&node_id) else {
                break;
            };
            out.push(node_id);
            current = node.parent;
        }
        out
    }

    /// Whether this node must survive its browser counterpart closing:
    /// it carries marks, or some direct child is more than an unmarked,
    /// childless live tab.
    pub fn is_protected_from_disappearing(&self, id: MvcId) -> bool {
        let Some(node) = self.nodes.get(&id) else {
            return false;
        };
        !node.marks.is_empty()
            || node
                .subnodes
                .iter()
                .filter_map(|child| self.nodes.get(child))
                .any(|child| !child.is_disposable_child())
    }

    pub fn subtree_stats(&self, id: MvcId) -> SubtreeStats {
        let mut stats = SubtreeStats::default();
        for descendant in self.subtree_ids(id).into_iter().skip(1) {
            let content = &self.nodes[&descendant].content;
            stats.nodes_count += 1;
            if content.is_an_open_tab() {
                stats.active_tabs_count += 1;
            }
            if content.is_an_open_window() {
                stats.active_windows_count += 1;
            }
        }
        stats
    }

    fn css_classes(&self, node: &TreeNode) -> Vec<String> {
        let mut classes = vec![node.content.css_class().to_string()];
        if node.content.is_selected_tab() {
            classes.push("selectedtab".to_string());
        }
        if node.content.is_focused_window() {
            classes.push("focusedwindow".to_string());
        }
        if node.colapsed {
            classes.push("collapsed".to_string());
        }
        if !node.marks.is_empty() {
            classes.push("marked".to_string());
        }
        classes
    }

    fn parent_update(&self, id: MvcId) -> Option<ParentUpdate> {
        let node = self.nodes.get(&id)?;
        Some(ParentUpdate {
            has_children: !node.subnodes.is_empty(),
            colapsed: node.colapsed,
            stats: node.colapsed.then(|| self.subtree_stats(id)),
            protected: self.is_protected_from_disappearing(id),
            css_classes: self.css_classes(node),
            is_selected_tab: node.content.is_selected_tab(),
            is_focused_window: node.content.is_focused_window(),
        })
    }

    pub fn snapshot(&self, id: MvcId) -> Option<NodeSnapshot> {
        let node = self.nodes.get(&id)?;
        Some(NodeSnapshot {
            id_mvc: node.id,
            previous_id_mvc: node.previous_id,
            node_type: node.node_type(),
            text: node.text(),
            tooltip: node.content.tooltip(),
            icon: node.icon().to_string(),
            href: node.content.href().map(str::to_string),
            custom_title: node.custom_title().map(str::to_string),
            colapsed: node.colapsed,
            subnodes: node.subnodes.clone(),
            stats: node.colapsed.then(|| self.subtree_stats(id)),
            protected: self.is_protected_from_disappearing(id),
            css_classes: self.css_classes(node),
            is_selected_tab: node.content.is_selected_tab(),
            is_focused_window: node.content.is_focused_window(),
            actions: node.content.actions(),
        })
    }

    /// Verify that every index matches a full walk of the tree.
    pub fn check_indices(&self) -> Result<(), String> {
        let walked = self.preorder();
        if walked.len() != self.nodes.len() {
            return Err(format!(
                "{} nodes indexed, {} reachable from root",
                self.nodes.len(),
                walked.len()
            ));
        }
        let mut tabs = HashMap::new();
        let mut windows = HashMap::new();
        for id in &walked {
            let node = &self.nodes[id];
            for child in &node.subnodes {
                if self.nodes.get(child).and_then(|c| c.parent) != Some(*id) {
                    return Err(format!("{child} does not point back to parent {id}"));
                }
            }
            if let Some(tab_id) = node.content.tab_id() {
                tabs.insert(tab_id, *id);
            }
            if let Some(window_id) = node.content.window_id() {
                windows.insert(window_id, *id);
            }
        }
        if tabs != self.tabs {
            return Err("tab index out of sync".to_string());
        }
        if windows != self.windows {
            return Err("window index out of sync".to_string());
        }
        Ok(())
    }

    // ----- internal structure helpers -----

    /// Create nodes for `source` under `parent` (not linked into the
    /// parent's list) and index them. Returns the new subtree root.
    fn materialize(&mut self, source: &HierarchyNode, parent: Option<MvcId>, keep_diff_ids: bool) -> MvcId {
        let top = self.create_node(&source.n, parent, keep_diff_ids);
        let mut stack: Vec<(&HierarchyNode, MvcId)> = source.s.iter().rev().map(|child| (child, top)).collect();
        while let Some((current, parent)) = stack.pop() {
            let id = self.create_node(&current.n, Some(parent), keep_diff_ids);
            if let Some(node) = self.nodes.get_mut(&parent) {
                node.subnodes.push(id);
            }
            stack.extend(current.s.iter().rev().map(|child| (child, id)));
        }
        top
    }

    fn create_node(&mut self, payload: &NodePayload, parent: Option<MvcId>, keep_diff_ids: bool) -> MvcId {
        let id = self.ids.next_id();
        let node = TreeNode {
            id,
            previous_id: None,
            content: NodeContent::from_data(payload.node_type, &payload.data),
            colapsed: payload.colapsed,
            marks: payload.marks.clone().unwrap_or_default(),
            parent,
            subnodes: Vec::new(),
            diff: if keep_diff_ids {
                DiffIds::from_payload(payload)
            } else {
                DiffIds::default()
            },
        };
        self.index_node(&node);
        self.nodes.insert(id, node);
        id
    }

    fn index_node(&mut self, node: &TreeNode) {
        if let Some(tab_id) = node.content.tab_id() {
            self.tabs.insert(tab_id, node.id);
        }
        if let Some(window_id) = node.content.window_id() {
            self.windows.insert(window_id, node.id);
        }
    }

    fn unindex_node(&mut self, id: MvcId) {
        let Some(node) = self.nodes.get(&id) else {
            return;
        };
        if let Some(tab_id) = node.content.tab_id() {
            if self.tabs.get(&tab_id) == Some(&id) {
                self.tabs.remove(&tab_id);
            }
        }
        if let Some(window_id) = node.content.window_id() {
            if self.windows.get(&window_id) == Some(&id) {
                self.windows.remove(&window_id);
            }
        }
    }

    /// Clear diff ids on `id` and every ancestor.
    fn invalidate_to_root(&mut self, id: MvcId) {
        let mut current = Some(id);
        while let Some(node_id) = current {
            let Some(node) = self.nodes.get_mut(&node_id) else {
                break;
            };
            node.diff = DiffIds::default();
            current = node.parent;
        }
    }

    fn invalidate_subtree(&mut self, id: MvcId) {
        for node_id in self.subtree_ids(id) {
            if let Some(node) = self.nodes.get_mut(&node_id) {
                node.diff = DiffIds::default();
            }
        }
    }

    fn detach(&mut self, id: MvcId) -> Option<(MvcId, usize)> {
        let parent = self.nodes.get(&id)?.parent?;
        let siblings = &mut self.nodes.get_mut(&parent)?.subnodes;
        let position = siblings.iter().position(|s| *s == id)?;
        siblings.remove(position);
        if let Some(node) = self.nodes.get_mut(&id) {
            node.parent = None;
        }
        Some((parent, position))
    }

    fn attach(&mut self, parent: MvcId, position: Option<usize>, id: MvcId) {
        if let Some(parent_node) = self.nodes.get_mut(&parent) {
            let len = parent_node.subnodes.len();
            let at = position.filter(|p| *p <= len).unwrap_or(len);
            parent_node.subnodes.insert(at, id);
        }
        if let Some(node) = self.nodes.get_mut(&id) {
            node.parent = Some(parent);
        }
    }

    fn parent_updates_from(&self, anchors: &[MvcId]) -> BTreeMap<MvcId, ParentUpdate> {
        let mut updates = BTreeMap::new();
        for anchor in anchors {
            for id in self.path_to_root(*anchor) {
                if updates.contains_key(&id) {
                    continue;
                }
                if let Some(update) = self.parent_update(id) {
                    updates.insert(id, update);
                }
            }
        }
        updates
    }

    fn result(&self, kind: MutationKind, affected: MvcId, anchors: &[MvcId]) -> TreeMutationResult {
        TreeMutationResult {
            kind,
            affected_node_id: affected,
            parent_updates: self.parent_updates_from(anchors),
            deleted_node_ids: None,
            cursor_suggestion: None,
        }
    }

    // ----- mutation API -----

    /// Insert a new subtree under `parent` at `index` (`None` or past the
    /// end appends). The inserted nodes start dirty.
    pub fn insert_subnode(
        &mut self,
        parent: MvcId,
        index: Option<usize>,
        subtree: impl Into<HierarchyNode>,
    ) -> Result<TreeMutationResult, TreeError> {
        self.get(parent)?;
        let subtree = subtree.into();
        let id = self.materialize(&subtree, Some(parent), false);
        self.attach(parent, index, id);
        self.invalidate_to_root(parent);
        Ok(self.result(MutationKind::Insert, id, &[parent]))
    }

    /// Remove `id` and its whole subtree. The cursor suggestion is the next
    /// sibling, else the previous sibling, else the parent.
    pub fn remove_subtree(&mut self, id: MvcId) -> Result<TreeMutationResult, TreeError> {
        let node = self.get(id)?;
        let Some(parent) = node.parent else {
            return Err(TreeError::RootMutation("removed"));
        };

        let siblings = &self.get(parent)?.subnodes;
        let position = siblings.iter().position(|s| *s == id).unwrap_or(0);
        let cursor = siblings
            .get(position + 1)
            .or_else(|| position.checked_sub(1).and_then(|p| siblings.get(p)))
            .copied()
            .unwrap_or(parent);

        let deleted = self.subtree_ids(id);
        self.detach(id);
        for node_id in &deleted {
            self.unindex_node(*node_id);
        }
        for node_id in &deleted {
            self.nodes.remove(node_id);
        }
        self.invalidate_to_root(parent);

        let mut result = self.result(MutationKind::Remove, id, &[parent]);
        result.deleted_node_ids = Some(deleted);
        result.cursor_suggestion = Some(cursor);
        Ok(result)
    }

    /// Move `source` (with its subtree) under `target`. The position is
    /// applied after `source` has been detached.
    pub fn move_node(&mut self, source: MvcId, target: MoveTarget) -> Result<TreeMutationResult, TreeError> {
        let node = self.get(source)?;
        let Some(old_parent) = node.parent else {
            return Err(TreeError::RootMutation("moved"));
        };
        let container = target.container.unwrap_or(self.root);
        self.get(container)?;
        if self.path_to_root(container).contains(&source) {
            return Err(TreeError::MoveIntoOwnSubtree { node: source });
        }

        self.invalidate_to_root(old_parent);
        self.detach(source);
        self.attach(container, target.position, source);
        self.invalidate_subtree(source);
        self.invalidate_to_root(container);

        Ok(self.result(MutationKind::Move, source, &[old_parent, container]))
    }

    /// Collapse or expand. Collapsing a childless node is refused and leaves
    /// the node expanded.
    pub fn set_collapsed(&mut self, id: MvcId, value: bool) -> Result<TreeMutationResult, TreeError> {
        let node = self.get(id)?;
        let effective = value && !node.subnodes.is_empty();
        if node.colapsed != effective {
            if let Some(node) = self.nodes.get_mut(&id) {
                node.colapsed = effective;
            }
            self.invalidate_to_root(id);
        }
        Ok(self.result(MutationKind::Collapse, id, &[id]))
    }

    /// Replace the node's marks as a whole.
    pub fn set_marks(&mut self, id: MvcId, marks: Marks) -> Result<TreeMutationResult, TreeError> {
        self.get(id)?;
        if let Some(node) = self.nodes.get_mut(&id) {
            node.marks = marks;
        }
        self.invalidate_to_root(id);
        Ok(self.result(MutationKind::Marks, id, &[id]))
    }

    /// Swap a node for a new one with `content`, keeping its children,
    /// marks and collapsed state. The new node records the old id as its
    /// `previous_id`.
    pub fn replace_node(&mut self, id: MvcId, content: NodeContent) -> Result<TreeMutationResult, TreeError> {
        let old = self.get(id)?;
        let Some(parent) = old.parent else {
            return Err(TreeError::RootMutation("replaced"));
        };
        let (colapsed, marks, subnodes) = (old.colapsed, old.marks.clone(), old.subnodes.clone());
        let new_id = self.ids.next_id();
        let replacement = TreeNode {
            id: new_id,
            previous_id: Some(id),
            content,
            colapsed,
            marks,
            parent: Some(parent),
            subnodes,
            diff: DiffIds::default(),
        };

        self.unindex_node(id);
        self.nodes.remove(&id);
        for child in &replacement.subnodes {
            if let Some(child) = self.nodes.get_mut(child) {
                child.parent = Some(new_id);
            }
        }
        if let Some(parent_node) = self.nodes.get_mut(&parent) {
            for slot in parent_node.subnodes.iter_mut().filter(|s| **s == id) {
                *slot = new_id;
            }
        }
        self.index_node(&replacement);
        self.nodes.insert(new_id, replacement);
        self.invalidate_to_root(new_id);

        let mut result = self.result(MutationKind::Replace, new_id, &[parent]);
        result.deleted_node_ids = Some(vec![id]);
        Ok(result)
    }

    /// Replace a node with its saved counterpart.
    pub fn convert_to_saved(&mut self, id: MvcId) -> Result<TreeMutationResult, TreeError> {
        let saved = self.get(id)?.content.clone_as_saved();
        self.replace_node(id, saved)
    }

    /// Update a node's content in place, keeping its identity. Identical
    /// content leaves the diff ids alone.
    pub fn update_content(&mut self, id: MvcId, content: NodeContent) -> Result<TreeMutationResult, TreeError> {
        if self.get(id)?.content == content {
            return Ok(self.result(MutationKind::Update, id, &[id]));
        }
        self.unindex_node(id);
        if let Some(node) = self.nodes.get_mut(&id) {
            node.content = content;
        }
        if let Some(node) = self.nodes.get(&id).cloned() {
            self.index_node(&node);
        }
        self.invalidate_to_root(id);
        Ok(self.result(MutationKind::Update, id, &[id]))
    }
}
