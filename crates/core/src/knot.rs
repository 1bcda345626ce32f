//! Knot codec: one node's subnode id list, optionally as a delta against
//! another knot's list.
//!
//! Grammar: `cd` | `cd@id&id&id` | `cd#base` | `cd#base#ops`, where `ops`
//! is a `|`-separated list of `*N` (take the next N base ids), `-N` (skip
//! N base ids, then take one) and literal ids. All numbers are base-36.

use crate::base36;
use std::fmt;

pub const INLINE_MARK: char = '@';
pub const INLINE_SEPARATOR: char = '&';
pub const REFERENCE_MARK: char = '#';
pub const DELTA_SEPARATOR: char = '|';

const USE_OP: char = '*';
const SKIP_OP: char = '-';

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Knot {
    /// Node without subnodes.
    Bare { cd_id: String },
    /// Subnode ids listed in full.
    Inline { cd_id: String, subnodes: Vec<String> },
    /// Same subnodes as the `base` knot.
    Reference { cd_id: String, base: String },
    /// The `base` knot's subnodes with `ops` applied.
    Delta {
        cd_id: String,
        base: String,
        ops: String,
    },
}

impl Knot {
    pub fn parse(text: &str) -> Knot {
        if let Some((cd_id, list)) = text.split_once(INLINE_MARK) {
            return Knot::Inline {
                cd_id: cd_id.to_string(),
                subnodes: list
                    .split(INLINE_SEPARATOR)
                    .filter(|id| !id.is_empty())
                    .map(str::to_string)
                    .collect(),
            };
        }
        let mut parts = text.splitn(3, REFERENCE_MARK);
        let cd_id = parts.next().unwrap_or_default().to_string();
        match (parts.next(), parts.next()) {
            (None, _) => Knot::Bare { cd_id },
            (Some(base), None) => Knot::Reference {
                cd_id,
                base: base.to_string(),
            },
            (Some(base), Some(ops)) => Knot::Delta {
                cd_id,
                base: base.to_string(),
                ops: ops.to_string(),
            },
        }
    }

    pub fn cd_id(&self) -> &str {
        match self {
            Knot::Bare { cd_id }
            | Knot::Inline { cd_id, .. }
            | Knot::Reference { cd_id, .. }
            | Knot::Delta { cd_id, .. } => cd_id,
        }
    }

    /// Knot key this one builds on, if any.
    pub fn base(&self) -> Option<&str> {
        match self {
            Knot::Reference { base, .. } | Knot::Delta { base, .. } => Some(base),
            _ => None,
        }
    }
}

impl fmt::Display for Knot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Knot::Bare { cd_id } => f.write_str(cd_id),
            Knot::Inline { cd_id, subnodes } => {
                write!(f, "{cd_id}{INLINE_MARK}")?;
                for (i, id) in subnodes.iter().enumerate() {
                    if i > 0 {
                        write!(f, "{INLINE_SEPARATOR}")?;
                    }
                    f.write_str(id)?;
                }
                Ok(())
            }
            Knot::Reference { cd_id, base } => write!(f, "{cd_id}{REFERENCE_MARK}{base}"),
            Knot::Delta { cd_id, base, ops } => {
                write!(f, "{cd_id}{REFERENCE_MARK}{base}{REFERENCE_MARK}{ops}")
            }
        }
    }
}

enum DeltaOp<'a> {
    Use(usize),
    Skip(usize),
    Literal(&'a str),
}

/// Encode `current` as ops against `base`.
///
/// Matching is order-preserving: each id is looked up in `base` only after
/// the previous match, so a later base element is never matched before an
/// earlier one.
pub fn serialize_cur_subnodes<S: AsRef<str>>(current: &[S], base: &[S]) -> String {
    let mut ops: Vec<DeltaOp<'_>> = Vec::new();
    let mut next = 0usize;

    for id in current {
        let id = id.as_ref();
        let found = base
            .get(next..)
            .and_then(|rest| rest.iter().position(|b| b.as_ref() == id))
            .map(|offset| next + offset);
        match found {
            Some(pos) if pos == next => match ops.last_mut() {
                Some(DeltaOp::Use(run)) => *run += 1,
                _ => ops.push(DeltaOp::Use(1)),
            },
            Some(pos) => ops.push(DeltaOp::Skip(pos - next)),
            None => ops.push(DeltaOp::Literal(id)),
        }
        if let Some(pos) = found {
            next = pos + 1;
        }
    }

    let mut out = String::new();
    for (i, op) in ops.iter().enumerate() {
        if i > 0 {
            out.push(DELTA_SEPARATOR);
        }
        match op {
            DeltaOp::Use(n) => {
                out.push(USE_OP);
                out.push_str(&base36::encode(*n as u64));
            }
            DeltaOp::Skip(n) => {
                out.push(SKIP_OP);
                out.push_str(&base36::encode(*n as u64));
            }
            DeltaOp::Literal(id) => out.push_str(id),
        }
    }
    out
}

/// Replay `ops` against `base`. Counts reaching past the end of `base`
/// are clamped; unparsable counts read as 1.
pub fn restore_subnodes_list<S: AsRef<str>>(base: &[S], ops: &str) -> Vec<String> {
    let mut out = Vec::new();
    let mut cursor = 0usize;

    for op in ops.split(DELTA_SEPARATOR).filter(|op| !op.is_empty()) {
        if let Some(count) = op.strip_prefix(USE_OP) {
            let n = base36::decode_count(count);
            let start = cursor.min(base.len());
            let end = cursor.saturating_add(n).min(base.len());
            out.extend(base[start..end].iter().map(|id| id.as_ref().to_string()));
            cursor = cursor.saturating_add(n);
        } else if let Some(count) = op.strip_prefix(SKIP_OP) {
            cursor = cursor.saturating_add(base36::decode_count(count));
            if let Some(id) = base.get(cursor) {
                out.push(id.as_ref().to_string());
                cursor += 1;
            }
        } else {
            out.push(op.to_string());
        }
    }
    out
}
