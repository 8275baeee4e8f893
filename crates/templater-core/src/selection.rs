//! Selection validation
//!
//! Turns a raw user selection (an anchor and a focus point, each inside
//! some rendered segment) into a normalized interval, or a rejection.
//! Rejections are ordinary outcomes: an empty mouse-up is a no-op, not a
//! failure.

use std::cmp::Ordering;
use std::fmt;

use serde::Serialize;

use crate::document::{char_len, char_slice};
use crate::models::{Highlight, Interval};

/// The rendered segment a selection point lies in
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct NodeRef {
    /// Position of the segment in document order
    pub order: usize,
    /// Document offset at which the segment starts
    pub base: usize,
}

/// One end of a raw selection
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SelectionPoint {
    /// `None` when the point is outside the annotatable text
    pub node: Option<NodeRef>,
    /// Offset within the node
    pub offset: usize,
}

impl SelectionPoint {
    pub fn new(order: usize, base: usize, offset: usize) -> Self {
        Self {
            node: Some(NodeRef { order, base }),
            offset,
        }
    }

    /// A point that landed outside the annotatable container
    pub fn outside(offset: usize) -> Self {
        Self { node: None, offset }
    }

    /// Document offset this point refers to
    pub fn resolve(&self) -> Option<usize> {
        self.node.and_then(|node| node.base.checked_add(self.offset))
    }
}

/// A selection as reported by the user interface
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RawSelection {
    /// Where the selection started
    pub anchor: SelectionPoint,
    /// Where the selection ended
    pub focus: SelectionPoint,
}

impl RawSelection {
    pub fn new(anchor: SelectionPoint, focus: SelectionPoint) -> Self {
        Self { anchor, focus }
    }

    /// A selection inside a single node starting at `base`
    pub fn within_node(base: usize, anchor_offset: usize, focus_offset: usize) -> Self {
        Self {
            anchor: SelectionPoint::new(0, base, anchor_offset),
            focus: SelectionPoint::new(0, base, focus_offset),
        }
    }

    /// Selection over plain document offsets, as if the text were one node
    pub fn from_offsets(anchor: usize, focus: usize) -> Self {
        Self::within_node(0, anchor, focus)
    }

    /// Anchor and focus are the same point
    pub fn is_empty(&self) -> bool {
        self.anchor.node == self.focus.node && self.anchor.offset == self.focus.offset
    }

    /// Focus precedes anchor in document order
    pub fn is_backwards(&self) -> bool {
        if self.is_empty() {
            return false;
        }

        match (self.anchor.node, self.focus.node) {
            (Some(anchor), Some(focus)) => match focus.order.cmp(&anchor.order) {
                Ordering::Less => true,
                Ordering::Equal => self.anchor.offset > self.focus.offset,
                Ordering::Greater => false,
            },
            _ => false,
        }
    }
}

/// Why a selection was not accepted
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "reason", rename_all = "snake_case")]
pub enum Rejection {
    /// Nothing selected
    Empty,
    /// The selection reaches outside the document
    OutOfRange,
    /// The selection collides with an existing highlight
    Overlaps { existing: Interval },
}

impl fmt::Display for Rejection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Rejection::Empty => write!(f, "selection is empty"),
            Rejection::OutOfRange => write!(f, "selection is outside the document"),
            Rejection::Overlaps { existing } => {
                write!(f, "selection overlaps the parameter at {}", existing)
            }
        }
    }
}

/// An accepted, normalized selection
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Selection {
    pub interval: Interval,
    /// The literal selected text
    pub text: String,
}

/// Whether `candidate` may not coexist with `existing`
///
/// Each rule is checked on its own. Intervals that merely touch
/// (`candidate.end == existing.start` or the reverse) do not overlap.
pub fn overlaps(candidate: Interval, existing: Interval) -> bool {
    let (start, end) = (candidate.start, candidate.end);

    // An endpoint falls strictly inside the existing highlight
    if (start < existing.end && start > existing.start)
        || (end > existing.start && end < existing.end)
    {
        return true;
    }

    // The selection wraps across an existing boundary
    if (start < existing.end && end > existing.end)
        || (start < existing.start && end > existing.start)
    {
        return true;
    }

    start == existing.start && end == existing.end
}

/// First highlight that `candidate` collides with
pub fn find_overlap(candidate: Interval, highlights: &[Highlight]) -> Option<&Highlight> {
    highlights
        .iter()
        .find(|highlight| overlaps(candidate, highlight.interval()))
}

/// Validate a raw selection against the document text and its highlights
pub fn validate_selection(
    raw: &RawSelection,
    text: &str,
    highlights: &[Highlight],
) -> Result<Selection, Rejection> {
    if raw.is_empty() {
        return Err(Rejection::Empty);
    }

    let (mut start, mut end) = match (raw.anchor.resolve(), raw.focus.resolve()) {
        (Some(anchor), Some(focus)) => (anchor, focus),
        _ => return Err(Rejection::OutOfRange),
    };

    if raw.is_backwards() {
        std::mem::swap(&mut start, &mut end);
    }

    if start > end || end > char_len(text) {
        return Err(Rejection::OutOfRange);
    }

    // Distinct points can still resolve to one offset across a node boundary
    if start == end {
        return Err(Rejection::Empty);
    }

    let interval = Interval::new(start, end);
    if let Some(existing) = find_overlap(interval, highlights) {
        return Err(Rejection::Overlaps {
            existing: existing.interval(),
        });
    }

    Ok(Selection {
        interval,
        text: char_slice(text, start, end).to_string(),
    })
}
