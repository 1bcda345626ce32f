//! Node variants: the eleven kinds of tree node and their wire payloads.

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Node kind tag.
///
/// The `savedtab` kind is the wire default: a payload without `type` is a
/// saved tab, since saved tabs dominate persisted trees.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default, Serialize, Deserialize)]
pub enum NodeType {
    #[serde(rename = "session")]
    Session,
    #[serde(rename = "tab")]
    Tab,
    #[default]
    #[serde(rename = "savedtab")]
    SavedTab,
    #[serde(rename = "waitingtab")]
    WaitingTab,
    #[serde(rename = "attachwaitingtab")]
    AttachWaitingTab,
    #[serde(rename = "win")]
    Window,
    #[serde(rename = "savedwin")]
    SavedWindow,
    #[serde(rename = "waitingwin")]
    WaitingWindow,
    #[serde(rename = "group")]
    Group,
    #[serde(rename = "textnote")]
    TextNote,
    #[serde(rename = "separatorline")]
    Separator,
}

/// Entry type-code table. The slot order is a permanent wire contract;
/// slot 0 is reserved and never valid.
pub const TYPE_TABLE: [Option<NodeType>; 12] = [
    None,
    Some(NodeType::Session),
    Some(NodeType::TextNote),
    Some(NodeType::Separator),
    Some(NodeType::Tab),
    Some(NodeType::SavedTab),
    Some(NodeType::Group),
    Some(NodeType::Window),
    Some(NodeType::SavedWindow),
    Some(NodeType::AttachWaitingTab),
    Some(NodeType::WaitingWindow),
    Some(NodeType::WaitingTab),
];

impl NodeType {
    pub const ALL: [NodeType; 11] = [
        NodeType::Session,
        NodeType::Tab,
        NodeType::SavedTab,
        NodeType::WaitingTab,
        NodeType::AttachWaitingTab,
        NodeType::Window,
        NodeType::SavedWindow,
        NodeType::WaitingWindow,
        NodeType::Group,
        NodeType::TextNote,
        NodeType::Separator,
    ];

    /// Slot of this kind in [`TYPE_TABLE`] (always 1..=11).
    pub fn slot(self) -> usize {
        match self {
            NodeType::Session => 1,
            NodeType::TextNote => 2,
            NodeType::Separator => 3,
            NodeType::Tab => 4,
            NodeType::SavedTab => 5,
            NodeType::Group => 6,
            NodeType::Window => 7,
            NodeType::SavedWindow => 8,
            NodeType::AttachWaitingTab => 9,
            NodeType::WaitingWindow => 10,
            NodeType::WaitingTab => 11,
        }
    }

    pub fn from_slot(slot: usize) -> Option<NodeType> {
        TYPE_TABLE.get(slot).copied().flatten()
    }

    pub fn as_str(self) -> &'static str {
        match self {
            NodeType::Session => "session",
            NodeType::Tab => "tab",
            NodeType::SavedTab => "savedtab",
            NodeType::WaitingTab => "waitingtab",
            NodeType::AttachWaitingTab => "attachwaitingtab",
            NodeType::Window => "win",
            NodeType::SavedWindow => "savedwin",
            NodeType::WaitingWindow => "waitingwin",
            NodeType::Group => "group",
            NodeType::TextNote => "textnote",
            NodeType::Separator => "separatorline",
        }
    }

    pub fn from_name(name: &str) -> Option<NodeType> {
        Self::ALL.into_iter().find(|t| t.as_str() == name)
    }

    pub fn is_default(&self) -> bool {
        *self == NodeType::SavedTab
    }
}

impl std::fmt::Display for NodeType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

fn is_false(value: &bool) -> bool {
    !*value
}

fn is_zero(value: &u64) -> bool {
    *value == 0
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct SessionData {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tree_id: Option<String>,
    /// Epoch milliseconds of tree creation.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub created: Option<i64>,
}

/// Tab fields shared by live, saved and waiting tabs.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct TabData {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub window_id: Option<i64>,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub url: String,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub title: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub fav_icon_url: Option<String>,
    /// Browser load status, e.g. "loading" or "complete".
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<String>,
    #[serde(skip_serializing_if = "is_false")]
    pub active: bool,
    #[serde(skip_serializing_if = "is_false")]
    pub pinned: bool,
}

impl TabData {
    /// Drop everything that only has meaning while the browser tab exists.
    fn without_runtime_fields(&self) -> TabData {
        TabData {
            id: None,
            window_id: None,
            status: None,
            active: false,
            ..self.clone()
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct WindowRect {
    pub left: i32,
    pub top: i32,
    pub width: i32,
    pub height: i32,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct WindowData {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<i64>,
    /// Browser window type ("normal", "popup", ...).
    #[serde(rename = "type", skip_serializing_if = "Option::is_none")]
    pub window_type: Option<String>,
    #[serde(skip_serializing_if = "is_false")]
    pub focused: bool,
    #[serde(skip_serializing_if = "is_false")]
    pub incognito: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub rect: Option<WindowRect>,
}

impl WindowData {
    fn without_runtime_fields(&self) -> WindowData {
        WindowData {
            id: None,
            focused: false,
            ..self.clone()
        }
    }
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct NoteData {
    pub note: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct SeparatorData {
    #[serde(rename = "separatorIndx")]
    pub style: u8,
}

/// User customization attached to a node. Always replaced as a whole.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(from = "Value")]
pub struct Marks {
    #[serde(rename = "customTitle", skip_serializing_if = "Option::is_none")]
    pub custom_title: Option<String>,
    #[serde(rename = "customFavicon", skip_serializing_if = "Option::is_none")]
    pub custom_favicon: Option<String>,
    #[serde(rename = "customColorActive", skip_serializing_if = "Option::is_none")]
    pub custom_color_active: Option<String>,
    #[serde(rename = "customColorSaved", skip_serializing_if = "Option::is_none")]
    pub custom_color_saved: Option<String>,
    /// Always present after normalization, omitted from output when empty.
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub relicons: Vec<Value>,
}

impl Marks {
    pub fn titled(title: impl Into<String>) -> Self {
        Self {
            custom_title: Some(title.into()),
            ..Self::default()
        }
    }

    pub fn is_empty(&self) -> bool {
        self.custom_title.is_none()
            && self.custom_favicon.is_none()
            && self.custom_color_active.is_none()
            && self.custom_color_saved.is_none()
            && self.relicons.is_empty()
    }
}

impl From<Value> for Marks {
    fn from(raw: Value) -> Self {
        let canonical = crate::hierarchy::normalize_marks(&raw);
        let text = |key: &str| {
            canonical
                .get(key)
                .and_then(Value::as_str)
                .map(str::to_string)
        };
        Marks {
            custom_title: text("customTitle"),
            custom_favicon: text("customFavicon"),
            custom_color_active: text("customColorActive"),
            custom_color_saved: text("customColorSaved"),
            relicons: canonical
                .get("relicons")
                .and_then(Value::as_array)
                .cloned()
                .unwrap_or_default(),
        }
    }
}

/// Wire payload of one node (`n` in the full-tree format).
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct NodePayload {
    #[serde(rename = "type", default, skip_serializing_if = "NodeType::is_default")]
    pub node_type: NodeType,
    #[serde(default, skip_serializing_if = "Value::is_null")]
    pub data: Value,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub marks: Option<Marks>,
    #[serde(default, skip_serializing_if = "is_false")]
    pub colapsed: bool,
    #[serde(rename = "dId", default, skip_serializing_if = "is_zero")]
    pub d_id: u64,
    #[serde(rename = "cdId", default, skip_serializing_if = "is_zero")]
    pub cd_id: u64,
    #[serde(rename = "sdId", default, skip_serializing_if = "is_zero")]
    pub sd_id: u64,
    #[serde(rename = "sdIdKnot", default, skip_serializing_if = "Option::is_none")]
    pub sd_id_knot: Option<String>,
}

impl NodePayload {
    pub fn new(content: &NodeContent) -> Self {
        Self {
            node_type: content.node_type(),
            data: content.to_data(),
            ..Self::default()
        }
    }

    /// Copy without the diff-tracking ids.
    pub fn content_only(&self) -> NodePayload {
        NodePayload {
            node_type: self.node_type,
            data: self.data.clone(),
            marks: self.marks.clone(),
            colapsed: self.colapsed,
            ..NodePayload::default()
        }
    }
}

/// Action ids offered by a node's context menu.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NodeAction {
    Delete,
    SetCursor,
    EditTitle,
    Close,
}

const DEFAULT_FAVICON: &str = "img/favicon-default.png";
const SEPARATOR_LINES: [&str; 3] = [
    "------------------------------------",
    "====================================",
    "- - - - - - - - - - - - - - - - - -",
];

/// Content of a node, one variant per kind.
#[derive(Debug, Clone, PartialEq)]
pub enum NodeContent {
    Session(SessionData),
    Tab(TabData),
    SavedTab(TabData),
    WaitingTab(TabData),
    AttachWaitingTab(TabData),
    Window(WindowData),
    SavedWindow(WindowData),
    WaitingWindow(WindowData),
    Group,
    TextNote(NoteData),
    Separator(SeparatorData),
}

impl NodeContent {
    pub fn note(text: impl Into<String>) -> Self {
        NodeContent::TextNote(NoteData { note: text.into() })
    }

    pub fn saved_tab(url: impl Into<String>, title: impl Into<String>) -> Self {
        NodeContent::SavedTab(TabData {
            url: url.into(),
            title: title.into(),
            ..TabData::default()
        })
    }

    pub fn node_type(&self) -> NodeType {
        match self {
            NodeContent::Session(_) => NodeType::Session,
            NodeContent::Tab(_) => NodeType::Tab,
            NodeContent::SavedTab(_) => NodeType::SavedTab,
            NodeContent::WaitingTab(_) => NodeType::WaitingTab,
            NodeContent::AttachWaitingTab(_) => NodeType::AttachWaitingTab,
            NodeContent::Window(_) => NodeType::Window,
            NodeContent::SavedWindow(_) => NodeType::SavedWindow,
            NodeContent::WaitingWindow(_) => NodeType::WaitingWindow,
            NodeContent::Group => NodeType::Group,
            NodeContent::TextNote(_) => NodeType::TextNote,
            NodeContent::Separator(_) => NodeType::Separator,
        }
    }

    /// Build content from a wire `data` value. Malformed data degrades to
    /// the kind's defaults.
    pub fn from_data(node_type: NodeType, data: &Value) -> Self {
        fn parse<T: serde::de::DeserializeOwned + Default>(node_type: NodeType, data: &Value) -> T {
            if data.is_null() {
                return T::default();
            }
            serde_json::from_value(data.clone()).unwrap_or_else(|e| {
                tracing::warn!("unreadable {node_type} data, using defaults: {e}");
                T::default()
            })
        }
        match node_type {
            NodeType::Session => NodeContent::Session(parse(node_type, data)),
            NodeType::Tab => NodeContent::Tab(parse(node_type, data)),
            NodeType::SavedTab => NodeContent::SavedTab(parse(node_type, data)),
            NodeType::WaitingTab => NodeContent::WaitingTab(parse(node_type, data)),
            NodeType::AttachWaitingTab => NodeContent::AttachWaitingTab(parse(node_type, data)),
            NodeType::Window => NodeContent::Window(parse(node_type, data)),
            NodeType::SavedWindow => NodeContent::SavedWindow(parse(node_type, data)),
            NodeType::WaitingWindow => NodeContent::WaitingWindow(parse(node_type, data)),
            NodeType::Group => NodeContent::Group,
            NodeType::TextNote => NodeContent::TextNote(parse(node_type, data)),
            NodeType::Separator => NodeContent::Separator(parse(node_type, data)),
        }
    }

    /// Minimal persisted `data` value. Empty objects collapse to `null`.
    pub fn to_data(&self) -> Value {
        let value = match self {
            NodeContent::Session(d) => serde_json::to_value(d),
            NodeContent::Tab(d) => serde_json::to_value(d),
            NodeContent::AttachWaitingTab(d) => serde_json::to_value(TabData {
                status: None,
                ..d.clone()
            }),
            NodeContent::SavedTab(d) | NodeContent::WaitingTab(d) => {
                serde_json::to_value(d.without_runtime_fields())
            }
            NodeContent::Window(d) => serde_json::to_value(d),
            NodeContent::SavedWindow(d) | NodeContent::WaitingWindow(d) => {
                serde_json::to_value(d.without_runtime_fields())
            }
            NodeContent::Group => return Value::Null,
            NodeContent::TextNote(d) => serde_json::to_value(d),
            NodeContent::Separator(d) => serde_json::to_value(d),
        };
        match value {
            Ok(Value::Object(map)) if map.is_empty() => Value::Null,
            Ok(value) => value,
            Err(_) => Value::Null,
        }
    }

    /// Saved counterpart used when a live node outlives its browser object.
    /// The session clones as a group; non-live kinds clone as themselves.
    pub fn clone_as_saved(&self) -> NodeContent {
        match self {
            NodeContent::Session(_) => NodeContent::Group,
            NodeContent::Tab(d)
            | NodeContent::SavedTab(d)
            | NodeContent::WaitingTab(d)
            | NodeContent::AttachWaitingTab(d) => NodeContent::SavedTab(d.without_runtime_fields()),
            NodeContent::Window(d) | NodeContent::SavedWindow(d) | NodeContent::WaitingWindow(d) => {
                NodeContent::SavedWindow(d.without_runtime_fields())
            }
            other => other.clone(),
        }
    }

    /// Browser tab id for the tab index (live tab-like kinds only).
    pub fn tab_id(&self) -> Option<i64> {
        match self {
            NodeContent::Tab(d) | NodeContent::AttachWaitingTab(d) => d.id,
            _ => None,
        }
    }

    /// Browser window id for the window index (live windows only).
    pub fn window_id(&self) -> Option<i64> {
        match self {
            NodeContent::Window(d) => d.id,
            _ => None,
        }
    }

    pub fn is_an_open_tab(&self) -> bool {
        matches!(self, NodeContent::Tab(_) | NodeContent::AttachWaitingTab(_))
    }

    pub fn is_an_open_window(&self) -> bool {
        matches!(self, NodeContent::Window(_))
    }

    pub fn is_selected_tab(&self) -> bool {
        matches!(self, NodeContent::Tab(d) if d.active)
    }

    pub fn is_focused_window(&self) -> bool {
        matches!(self, NodeContent::Window(d) if d.focused)
    }

    pub fn icon(&self) -> &str {
        match self {
            NodeContent::Session(_) => "img/session.png",
            NodeContent::Tab(d)
            | NodeContent::SavedTab(d)
            | NodeContent::WaitingTab(d)
            | NodeContent::AttachWaitingTab(d) => d
                .fav_icon_url
                .as_deref()
                .filter(|url| !url.is_empty())
                .unwrap_or(DEFAULT_FAVICON),
            NodeContent::Window(_) => "img/window-live.png",
            NodeContent::SavedWindow(_) | NodeContent::WaitingWindow(_) => "img/window-saved.png",
            NodeContent::Group => "img/group.png",
            NodeContent::TextNote(_) => "img/note.png",
            NodeContent::Separator(_) => "",
        }
    }

    pub fn text(&self) -> String {
        match self {
            NodeContent::Session(_) => "Current Session".to_string(),
            NodeContent::Tab(d)
            | NodeContent::SavedTab(d)
            | NodeContent::WaitingTab(d)
            | NodeContent::AttachWaitingTab(d) => {
                if d.title.is_empty() {
                    d.url.clone()
                } else {
                    d.title.clone()
                }
            }
            NodeContent::Window(d) => match d.window_type.as_deref() {
                Some("popup") => "Popup Window".to_string(),
                _ => "Window".to_string(),
            },
            NodeContent::SavedWindow(_) => "Saved Window".to_string(),
            NodeContent::WaitingWindow(_) => "Opening Window".to_string(),
            NodeContent::Group => "Group".to_string(),
            NodeContent::TextNote(d) => d.note.clone(),
            NodeContent::Separator(d) => SEPARATOR_LINES[usize::from(d.style) % SEPARATOR_LINES.len()]
                .to_string(),
        }
    }

    pub fn tooltip(&self) -> String {
        match self {
            NodeContent::Tab(d)
            | NodeContent::SavedTab(d)
            | NodeContent::WaitingTab(d)
            | NodeContent::AttachWaitingTab(d) => {
                if d.title.is_empty() {
                    d.url.clone()
                } else {
                    format!("{}\n{}", d.title, d.url)
                }
            }
            NodeContent::Window(d) | NodeContent::SavedWindow(d) | NodeContent::WaitingWindow(d)
                if d.incognito =>
            {
                format!("{} (incognito)", self.text())
            }
            NodeContent::Separator(_) => String::new(),
            _ => self.text(),
        }
    }

    pub fn href(&self) -> Option<&str> {
        match self {
            NodeContent::Tab(d)
            | NodeContent::SavedTab(d)
            | NodeContent::WaitingTab(d)
            | NodeContent::AttachWaitingTab(d)
                if !d.url.is_empty() =>
            {
                Some(d.url.as_str())
            }
            _ => None,
        }
    }

    /// Context-menu actions. The root session cannot be deleted; separators
    /// have no title; only live tabs and windows can be closed.
    pub fn actions(&self) -> Vec<NodeAction> {
        let mut actions = match self {
            NodeContent::Session(_) => vec![NodeAction::SetCursor],
            _ => vec![NodeAction::Delete, NodeAction::SetCursor],
        };
        if !matches!(self, NodeContent::Separator(_)) {
            actions.push(NodeAction::EditTitle);
        }
        if matches!(self, NodeContent::Tab(_) | NodeContent::Window(_)) {
            actions.push(NodeAction::Close);
        }
        actions
    }

    /// CSS class naming the kind in the view layer.
    pub fn css_class(&self) -> &'static str {
        match self.node_type() {
            NodeType::Session => "session",
            NodeType::Tab => "tab",
            NodeType::SavedTab => "savedtab",
            NodeType::WaitingTab => "waitingtab",
            NodeType::AttachWaitingTab => "attachwaitingtab",
            NodeType::Window => "win",
            NodeType::SavedWindow => "savedwin",
            NodeType::WaitingWindow => "waitingwin",
            NodeType::Group => "group",
            NodeType::TextNote => "textnote",
            NodeType::Separator => "separatorline",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_type_table_slots_match() {
        for node_type in NodeType::ALL {
            assert_eq!(NodeType::from_slot(node_type.slot()), Some(node_type));
        }
        assert_eq!(NodeType::from_slot(0), None);
        assert_eq!(NodeType::from_slot(12), None);
    }

    #[test]
    fn test_type_names_round_trip() {
        for node_type in NodeType::ALL {
            let encoded = serde_json::to_value(node_type).unwrap();
            assert_eq!(encoded, json!(node_type.as_str()));
            assert_eq!(NodeType::from_name(node_type.as_str()), Some(node_type));
        }
        assert_eq!(NodeType::from_name("tabs"), None);
    }

    #[test]
    fn test_saved_tab_strips_runtime_fields() {
        let content = NodeContent::SavedTab(TabData {
            id: Some(4),
            window_id: Some(9),
            url: "https://a.example".into(),
            title: "A".into(),
            status: Some("loading".into()),
            active: true,
            ..TabData::default()
        });
        assert_eq!(
            content.to_data(),
            json!({"url": "https://a.example", "title": "A"})
        );
    }

    #[test]
    fn test_live_tab_keeps_runtime_fields() {
        let content = NodeContent::Tab(TabData {
            id: Some(4),
            window_id: Some(9),
            url: "https://a.example".into(),
            active: true,
            ..TabData::default()
        });
        assert_eq!(
            content.to_data(),
            json!({"id": 4, "windowId": 9, "url": "https://a.example", "active": true})
        );
    }

    #[test]
    fn test_clone_as_saved() {
        let tab = NodeContent::Tab(TabData {
            id: Some(1),
            url: "u".into(),
            ..TabData::default()
        });
        assert_eq!(tab.clone_as_saved(), NodeContent::saved_tab("u", ""));

        let window = NodeContent::Window(WindowData {
            id: Some(3),
            focused: true,
            incognito: true,
            ..WindowData::default()
        });
        assert_eq!(
            window.clone_as_saved(),
            NodeContent::SavedWindow(WindowData {
                incognito: true,
                ..WindowData::default()
            })
        );

        let session = NodeContent::Session(SessionData::default());
        assert_eq!(session.clone_as_saved(), NodeContent::Group);
        assert_eq!(NodeContent::note("x").clone_as_saved(), NodeContent::note("x"));
    }

    #[test]
    fn test_from_data_degrades_on_garbage() {
        let content = NodeContent::from_data(NodeType::TextNote, &json!([1, 2]));
        assert_eq!(content, NodeContent::note(""));
        assert_eq!(
            NodeContent::from_data(NodeType::Group, &json!({"x": 1})),
            NodeContent::Group
        );
    }

    #[test]
    fn test_actions() {
        let tab = NodeContent::Tab(TabData::default());
        assert_eq!(
            tab.actions(),
            vec![
                NodeAction::Delete,
                NodeAction::SetCursor,
                NodeAction::EditTitle,
                NodeAction::Close
            ]
        );
        let sep = NodeContent::Separator(SeparatorData::default());
        assert_eq!(sep.actions(), vec![NodeAction::Delete, NodeAction::SetCursor]);
        let session = NodeContent::Session(SessionData::default());
        assert!(!session.actions().contains(&NodeAction::Delete));
    }

    #[test]
    fn test_display_fallbacks() {
        let tab = NodeContent::saved_tab("https://b.example", "");
        assert_eq!(tab.text(), "https://b.example");
        assert_eq!(tab.icon(), DEFAULT_FAVICON);
        assert_eq!(tab.href(), Some("https://b.example"));
        let sep = NodeContent::Separator(SeparatorData { style: 4 });
        assert_eq!(sep.text(), SEPARATOR_LINES[1]);
    }

    #[test]
    fn test_payload_omits_defaults() {
        let payload = NodePayload::new(&NodeContent::saved_tab("u", "t"));
        assert_eq!(
            serde_json::to_value(&payload).unwrap(),
            json!({"data": {"url": "u", "title": "t"}})
        );
        let group = NodePayload::new(&NodeContent::Group);
        assert_eq!(serde_json::to_value(&group).unwrap(), json!({"type": "group"}));
    }

    #[test]
    fn test_marks_is_empty() {
        assert!(Marks::default().is_empty());
        assert!(!Marks::titled("x").is_empty());
        let marks = Marks {
            relicons: vec![json!({"src": "r.png"})],
            ..Marks::default()
        };
        assert!(!marks.is_empty());
    }
}
