use crate::hierarchy::HierarchyNode;
use crate::node::{NodeContent, TabData, WindowData};
use serde_json::json;

/// Live tab with a browser id and url.
pub fn live_tab(id: i64, window_id: i64, url: &str) -> NodeContent {
    NodeContent::Tab(TabData {
        id: Some(id),
        window_id: Some(window_id),
        url: url.to_string(),
        ..TabData::default()
    })
}

/// Live, unfocused normal window.
pub fn live_window(id: i64) -> NodeContent {
    NodeContent::Window(WindowData {
        id: Some(id),
        window_type: Some("normal".to_string()),
        ..WindowData::default()
    })
}

fn hierarchy(value: serde_json::Value) -> HierarchyNode {
    crate::hierarchy::hierarchy_from_value(&value).expect("fixture hierarchy is valid")
}

/// Session → [group → [note], saved tab], with consistent diff ids as left
/// behind by a previous diff pass.
pub fn clean_hierarchy() -> HierarchyNode {
    hierarchy(json!({
        "n": {"type": "session", "data": {"treeId": "fixture"}, "dId": 8, "cdId": 7, "sdId": 8, "sdIdKnot": "7@4&6"},
        "s": [
            {
                "n": {"type": "group", "dId": 4, "cdId": 3, "sdId": 4, "sdIdKnot": "3@2"},
                "s": [{"n": {"type": "textnote", "data": {"note": "n"}, "dId": 2, "cdId": 1, "sdIdKnot": "1"}}]
            },
            {"n": {"data": {"url": "https://saved.example", "title": "Saved"}, "dId": 6, "cdId": 5, "sdIdKnot": "5"}}
        ]
    }))
}

/// One node of each of the eleven kinds, with nested collapsed and marked
/// nodes, in canonical wire form.
pub fn all_types_hierarchy() -> HierarchyNode {
    hierarchy(json!({
        "n": {"type": "session", "data": {"treeId": "all-types", "created": 1700000000000i64}},
        "s": [
            {
                "n": {
                    "type": "win",
                    "data": {"id": 1, "type": "normal", "focused": true},
                    "marks": {"customTitle": "Work", "relicons": []}
                },
                "s": [
                    {"n": {"type": "tab", "data": {"id": 10, "windowId": 1, "url": "https://a.example", "title": "A", "active": true}}},
                    {"n": {"type": "attachwaitingtab", "data": {"id": 11, "windowId": 1, "url": "https://b.example"}}}
                ]
            },
            {
                "n": {"type": "savedwin", "data": {"type": "normal", "incognito": true}, "colapsed": true},
                "s": [
                    {"n": {"data": {"url": "https://c.example", "title": "C", "pinned": true}}},
                    {"n": {"type": "waitingtab", "data": {"url": "https://d.example"}}}
                ]
            },
            {"n": {"type": "waitingwin", "data": {"type": "popup", "rect": {"left": 0, "top": 10, "width": 800, "height": 600}}}},
            {
                "n": {
                    "type": "group",
                    "marks": {"customColorActive": "#f00", "relicons": [{"src": "img/r.png"}]},
                    "colapsed": true
                },
                "s": [
                    {"n": {"type": "textnote", "data": {"note": "remember"}, "dId": 3, "cdId": 2, "sdIdKnot": "2"}}
                ]
            },
            {"n": {"type": "separatorline", "data": {"separatorIndx": 2}}}
        ]
    }))
}
