//! Entry codec: one node's content as `[signedTypeCode, data, marks?]`.
//!
//! The magnitude of the type code is a slot in [`TYPE_TABLE`]; a negative
//! code marks the node collapsed.
//!
//! [`TYPE_TABLE`]: crate::node::TYPE_TABLE

use crate::node::{Marks, NodePayload, NodeType};
use serde::de::{self, Deserializer};
use serde::ser::{SerializeSeq, Serializer};
use serde::{Deserialize, Serialize};
use serde_json::Value;

#[derive(Debug, Clone, PartialEq)]
pub struct Entry {
    pub code: i64,
    pub data: Value,
    pub marks: Option<Marks>,
}

impl Serialize for Entry {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let len = if self.marks.is_some() { 3 } else { 2 };
        let mut seq = serializer.serialize_seq(Some(len))?;
        seq.serialize_element(&self.code)?;
        seq.serialize_element(&self.data)?;
        if let Some(marks) = &self.marks {
            seq.serialize_element(marks)?;
        }
        seq.end()
    }
}

impl<'de> Deserialize<'de> for Entry {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let Value::Array(items) = Value::deserialize(deserializer)? else {
            return Err(de::Error::custom("entry must be an array"));
        };
        let mut items = items.into_iter();
        let code = items.next().and_then(|v| v.as_i64()).unwrap_or(0);
        let data = items.next().unwrap_or(Value::Null);
        let marks = items.next().filter(|v| !v.is_null()).map(Marks::from);
        Ok(Entry { code, data, marks })
    }
}

/// Encode a payload. Empty marks are left out.
pub fn encode_entry(payload: &NodePayload) -> Entry {
    let slot = payload.node_type.slot() as i64;
    Entry {
        code: if payload.colapsed { -slot } else { slot },
        data: payload.data.clone(),
        marks: payload.marks.clone().filter(|m| !m.is_empty()),
    }
}

/// Decode an entry. Out-of-table slots fall back to the saved-tab slot.
pub fn decode_entry(entry: &Entry) -> NodePayload {
    let slot = usize::try_from(entry.code.unsigned_abs()).unwrap_or(0);
    let node_type = NodeType::from_slot(slot).unwrap_or_else(|| {
        tracing::debug!("entry type slot {slot} out of range, reading as saved tab");
        NodeType::SavedTab
    });
    NodePayload {
        node_type,
        data: entry.data.clone(),
        marks: entry.marks.clone(),
        colapsed: entry.code < 0,
        ..NodePayload::default()
    }
}
