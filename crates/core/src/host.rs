//! Bridge to the host browser: live tab/window events coming in, commands
//! going out.

use crate::node::{NodeAction, NodeContent, TabData, WindowData};
use crate::tree::{MvcId, TreeError, TreeModel, TreeMutationResult};

/// Commands the tree can send to the host. Fire-and-forget: the host
/// reports the outcome later as ordinary tab/window events.
pub trait HostCommands {
    fn activate_tab(&mut self, tab_id: i64, window_id: Option<i64>);
    fn close_tab(&mut self, tab_id: i64);
    fn focus_window(&mut self, window_id: i64);
    fn close_window(&mut self, window_id: i64);
}

/// A user action on one node.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ActionRequest {
    Delete,
    SetCursor,
    /// New custom title; empty clears it.
    EditTitle(String),
    Close,
    /// Bring a live tab or window to the front.
    Activate,
}

impl ActionRequest {
    fn menu_action(&self) -> Option<NodeAction> {
        match self {
            ActionRequest::Delete => Some(NodeAction::Delete),
            ActionRequest::SetCursor => Some(NodeAction::SetCursor),
            ActionRequest::EditTitle(_) => Some(NodeAction::EditTitle),
            ActionRequest::Close => Some(NodeAction::Close),
            ActionRequest::Activate => None,
        }
    }
}

/// Dispatch a user action. Returns the mutation result when the tree
/// changed; commands forwarded to the host change nothing until the host
/// answers with events.
pub fn apply_action(
    model: &mut TreeModel,
    id: MvcId,
    request: ActionRequest,
    host: &mut dyn HostCommands,
) -> Result<Option<TreeMutationResult>, TreeError> {
    let content = model
        .node(id)
        .ok_or(TreeError::UnknownNode(id))?
        .content()
        .clone();
    if let Some(action) = request.menu_action() {
        if !content.actions().contains(&action) {
            return Err(TreeError::ActionNotAvailable { node: id, action });
        }
    }

    match request {
        ActionRequest::Delete => model.remove_subtree(id).map(Some),
        ActionRequest::SetCursor => Ok(None),
        ActionRequest::EditTitle(title) => {
            let mut marks = model
                .node(id)
                .map(|node| node.marks().clone())
                .unwrap_or_default();
            marks.custom_title = (!title.is_empty()).then_some(title);
            model.set_marks(id, marks).map(Some)
        }
        ActionRequest::Close => {
            match content {
                NodeContent::Tab(tab) => host.close_tab(tab.id.ok_or(TreeError::MissingHostId)?),
                NodeContent::Window(window) => {
                    host.close_window(window.id.ok_or(TreeError::MissingHostId)?)
                }
                _ => {}
            }
            Ok(None)
        }
        ActionRequest::Activate => {
            match content {
                NodeContent::Tab(tab) | NodeContent::AttachWaitingTab(tab) => {
                    host.activate_tab(tab.id.ok_or(TreeError::MissingHostId)?, tab.window_id)
                }
                NodeContent::Window(window) => {
                    host.focus_window(window.id.ok_or(TreeError::MissingHostId)?)
                }
                _ => {
                    tracing::debug!("{id} has no live counterpart to activate");
                }
            }
            Ok(None)
        }
    }
}

/// Record a live tab. A known tab is updated in place; a new one is
/// appended to its window, or to the root when the window is unknown.
pub fn upsert_tab(model: &mut TreeModel, tab: TabData) -> Result<TreeMutationResult, TreeError> {
    let tab_id = tab.id.ok_or(TreeError::MissingHostId)?;
    if let Some(existing) = model.find_by_tab_id(tab_id) {
        return model.update_content(existing, NodeContent::Tab(tab));
    }
    let parent = tab
        .window_id
        .and_then(|window_id| model.find_by_window_id(window_id))
        .unwrap_or_else(|| model.root());
    model.insert_subnode(parent, None, NodeContent::Tab(tab))
}

/// Record a live window. New windows are appended to the root.
pub fn upsert_window(model: &mut TreeModel, window: WindowData) -> Result<TreeMutationResult, TreeError> {
    let window_id = window.id.ok_or(TreeError::MissingHostId)?;
    if let Some(existing) = model.find_by_window_id(window_id) {
        return model.update_content(existing, NodeContent::Window(window));
    }
    let root = model.root();
    model.insert_subnode(root, None, NodeContent::Window(window))
}

/// The host closed a tab. A protected tab becomes a saved tab; any other
/// disappears. Unknown ids are ignored.
pub fn on_tab_closed(model: &mut TreeModel, tab_id: i64) -> Result<Option<TreeMutationResult>, TreeError> {
    let Some(id) = model.find_by_tab_id(tab_id) else {
        tracing::debug!("close event for unknown tab {tab_id}");
        return Ok(None);
    };
    close_live_node(model, id).map(Some)
}

/// The host closed a window. A protected window is kept as a saved window
/// with all of its live tabs saved; any other is removed with its tabs.
pub fn on_window_closed(model: &mut TreeModel, window_id: i64) -> Result<Option<TreeMutationResult>, TreeError> {
    let Some(id) = model.find_by_window_id(window_id) else {
        tracing::debug!("close event for unknown window {window_id}");
        return Ok(None);
    };
    if model.is_protected_from_disappearing(id) {
        let open_tabs: Vec<MvcId> = model
            .subtree_ids(id)
            .into_iter()
            .filter(|node| {
                model
                    .node(*node)
                    .is_some_and(|n| n.content().is_an_open_tab())
            })
            .collect();
        for tab in open_tabs {
            model.convert_to_saved(tab)?;
        }
        model.convert_to_saved(id).map(Some)
    } else {
        model.remove_subtree(id).map(Some)
    }
}

fn close_live_node(model: &mut TreeModel, id: MvcId) -> Result<TreeMutationResult, TreeError> {
    if model.is_protected_from_disappearing(id) {
        model.convert_to_saved(id)
    } else {
        model.remove_subtree(id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::node::{Marks, NodeType};
    use crate::testing;
    use crate::tree::MutationKind;

    #[derive(Default)]
    struct RecordingHost {
        commands: Vec<String>,
    }

    impl HostCommands for RecordingHost {
        fn activate_tab(&mut self, tab_id: i64, window_id: Option<i64>) {
            self.commands.push(format!("activate {tab_id} in {window_id:?}"));
        }
        fn close_tab(&mut self, tab_id: i64) {
            self.commands.push(format!("close tab {tab_id}"));
        }
        fn focus_window(&mut self, window_id: i64) {
            self.commands.push(format!("focus {window_id}"));
        }
        fn close_window(&mut self, window_id: i64) {
            self.commands.push(format!("close window {window_id}"));
        }
    }

    fn tab(id: i64, window_id: i64, url: &str) -> TabData {
        match testing::live_tab(id, window_id, url) {
            NodeContent::Tab(data) => data,
            _ => unreachable!(),
        }
    }

    fn window(id: i64) -> WindowData {
        WindowData {
            id: Some(id),
            ..WindowData::default()
        }
    }

    fn live_model() -> (TreeModel, MvcId, MvcId) {
        let mut model = TreeModel::new();
        let win = upsert_window(&mut model, window(1)).unwrap().affected_node_id;
        let t = upsert_tab(&mut model, tab(10, 1, "https://a.example"))
            .unwrap()
            .affected_node_id;
        (model, win, t)
    }

    #[test]
    fn test_upsert_places_tabs_under_their_window() {
        let (mut model, win, t) = live_model();
        assert_eq!(model.node(t).unwrap().parent(), Some(win));

        let orphan = upsert_tab(&mut model, tab(11, 99, "https://b.example"))
            .unwrap()
            .affected_node_id;
        assert_eq!(model.node(orphan).unwrap().parent(), Some(model.root()));

        let updated = upsert_tab(&mut model, tab(10, 1, "https://moved.example")).unwrap();
        assert_eq!(updated.kind, MutationKind::Update);
        assert_eq!(updated.affected_node_id, t);
        assert_eq!(model.node(t).unwrap().content().href(), Some("https://moved.example"));
        model.check_indices().unwrap();
    }

    #[test]
    fn test_upsert_requires_host_id() {
        let mut model = TreeModel::new();
        assert_eq!(
            upsert_tab(&mut model, TabData::default()).unwrap_err(),
            TreeError::MissingHostId
        );
        assert_eq!(
            upsert_window(&mut model, WindowData::default()).unwrap_err(),
            TreeError::MissingHostId
        );
    }

    #[test]
    fn test_unprotected_tab_close_removes_it() {
        let (mut model, win, t) = live_model();
        let result = on_tab_closed(&mut model, 10).unwrap().unwrap();
        assert_eq!(result.kind, MutationKind::Remove);
        assert!(model.node(t).is_none());
        assert!(model.node(win).unwrap().subnodes().is_empty());
        assert!(on_tab_closed(&mut model, 10).unwrap().is_none());
    }

    #[test]
    fn test_marked_tab_close_keeps_saved_copy() {
        let (mut model, win, t) = live_model();
        model.set_marks(t, Marks::titled("keep")).unwrap();
        let result = on_tab_closed(&mut model, 10).unwrap().unwrap();
        assert_eq!(result.kind, MutationKind::Replace);
        let saved = model.node(result.affected_node_id).unwrap();
        assert_eq!(saved.node_type(), NodeType::SavedTab);
        assert_eq!(saved.custom_title(), Some("keep"));
        assert_eq!(saved.parent(), Some(win));
        assert_eq!(model.find_by_tab_id(10), None);
    }

    #[test]
    fn test_window_close() {
        let (mut model, win, _) = live_model();
        on_window_closed(&mut model, 1).unwrap().unwrap();
        assert!(model.node(win).is_none());
        assert_eq!(model.len(), 1);

        let (mut model, win, _) = live_model();
        model.insert_subnode(win, None, NodeContent::note("plan")).unwrap();
        let result = on_window_closed(&mut model, 1).unwrap().unwrap();
        let saved = model.node(result.affected_node_id).unwrap();
        assert_eq!(saved.node_type(), NodeType::SavedWindow);
        let kinds: Vec<NodeType> = saved
            .subnodes()
            .iter()
            .map(|c| model.node(*c).unwrap().node_type())
            .collect();
        assert_eq!(kinds, vec![NodeType::SavedTab, NodeType::TextNote]);
        assert_eq!(model.find_by_tab_id(10), None);
        model.check_indices().unwrap();
    }

    #[test]
    fn test_close_and_activate_forward_to_host() {
        let (mut model, win, t) = live_model();
        let mut host = RecordingHost::default();
        assert!(apply_action(&mut model, t, ActionRequest::Close, &mut host).unwrap().is_none());
        apply_action(&mut model, t, ActionRequest::Activate, &mut host).unwrap();
        apply_action(&mut model, win, ActionRequest::Activate, &mut host).unwrap();
        apply_action(&mut model, win, ActionRequest::Close, &mut host).unwrap();
        assert_eq!(
            host.commands,
            vec!["close tab 10", "activate 10 in Some(1)", "focus 1", "close window 1"]
        );
        // Nothing changes until the host reports back.
        assert!(model.node(t).is_some());
    }

    #[test]
    fn test_menu_actions_are_checked() {
        let mut model = TreeModel::new();
        let root = model.root();
        let note = model
            .insert_subnode(root, None, NodeContent::note("n"))
            .unwrap()
            .affected_node_id;
        let mut host = RecordingHost::default();
        assert_eq!(
            apply_action(&mut model, note, ActionRequest::Close, &mut host).unwrap_err(),
            TreeError::ActionNotAvailable {
                node: note,
                action: NodeAction::Close
            }
        );
        assert!(matches!(
            apply_action(&mut model, root, ActionRequest::Delete, &mut host),
            Err(TreeError::ActionNotAvailable { .. })
        ));
        assert!(apply_action(&mut model, note, ActionRequest::SetCursor, &mut host)
            .unwrap()
            .is_none());
        apply_action(&mut model, note, ActionRequest::Delete, &mut host).unwrap();
        assert!(model.node(note).is_none());
        assert!(host.commands.is_empty());
    }

    #[test]
    fn test_edit_title_sets_and_clears_marks() {
        let (mut model, _, t) = live_model();
        let mut host = RecordingHost::default();
        model
            .set_marks(
                t,
                Marks {
                    custom_color_active: Some("#f00".to_string()),
                    ..Marks::default()
                },
            )
            .unwrap();
        apply_action(&mut model, t, ActionRequest::EditTitle("Mine".to_string()), &mut host).unwrap();
        let node = model.node(t).unwrap();
        assert_eq!(node.text(), "Mine");
        assert_eq!(node.marks().custom_color_active.as_deref(), Some("#f00"));

        apply_action(&mut model, t, ActionRequest::EditTitle(String::new()), &mut host).unwrap();
        assert_eq!(model.node(t).unwrap().custom_title(), None);
    }

    #[test]
    fn test_unchanged_upsert_keeps_ids_clean() {
        let mut model = TreeModel::from_hierarchy(&testing::clean_hierarchy());
        let before = model.to_hierarchy();
        let root = model.root();
        let note = model.node(model.node(root).unwrap().subnodes()[0]).unwrap().subnodes()[0];
        model.update_content(note, NodeContent::note("n")).unwrap();
        assert_eq!(model.to_hierarchy(), before);
    }
}
