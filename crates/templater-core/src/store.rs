//! Per-document annotation store
//!
//! Holds the highlights of one document in insertion order and implements
//! the edit, move and delete operations plus the parameter name
//! uniqueness check.
//!
//! Callers validate selections before calling `add`; the store itself does
//! not re-check overlap.

use thiserror::Error;
use tracing::debug;

use crate::document::{Document, DocumentMode};
use crate::models::{Annotation, Highlight, Interval, SavedParameters};
use crate::selection::Selection;

/// Errors from store operations
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum StoreError {
    #[error("No parameter found at {0}")]
    NotFound(Interval),

    #[error("A move is already in progress for the parameter at {0}")]
    MoveInProgress(Interval),
}

/// A highlight lifted out of the store while it is being moved
///
/// Holding the original lets a cancelled move put it back exactly.
#[derive(Debug, Clone, PartialEq)]
pub struct MoveSnapshot {
    original: Highlight,
}

impl MoveSnapshot {
    pub fn original(&self) -> &Highlight {
        &self.original
    }

    pub fn annotation(&self) -> &Annotation {
        &self.original.annotation
    }
}

/// Ordered collection of highlights for one document
#[derive(Debug, Clone, Default, PartialEq)]
pub struct AnnotationStore {
    highlights: Vec<Highlight>,
}

impl AnnotationStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a store from previously saved highlights
    pub fn from_highlights(highlights: Vec<Highlight>) -> Self {
        Self { highlights }
    }

    pub fn highlights(&self) -> &[Highlight] {
        &self.highlights
    }

    pub fn len(&self) -> usize {
        self.highlights.len()
    }

    pub fn is_empty(&self) -> bool {
        self.highlights.is_empty()
    }

    /// Get the highlight at exactly `interval`
    pub fn get(&self, interval: Interval) -> Option<&Highlight> {
        self.highlights.iter().find(|h| h.interval() == interval)
    }

    fn position(&self, interval: Interval) -> Result<usize, StoreError> {
        self.highlights
            .iter()
            .position(|h| h.interval() == interval)
            .ok_or(StoreError::NotFound(interval))
    }

    /// Append a highlight
    pub fn add(&mut self, highlight: Highlight) {
        debug!("Adding parameter '{}' at {}", highlight.name(), highlight.interval());
        self.highlights.push(highlight);
    }

    /// Add a highlight, replacing any existing one at the same interval
    pub fn upsert(&mut self, highlight: Highlight) {
        let interval = highlight.interval();
        self.highlights.retain(|h| h.interval() != interval);
        self.add(highlight);
    }

    /// Replace the annotation of the highlight at `interval`
    pub fn edit(&mut self, interval: Interval, annotation: Annotation) -> Result<(), StoreError> {
        let index = self.position(interval)?;
        debug!("Editing parameter at {}", interval);
        self.highlights[index].annotation = annotation;
        Ok(())
    }

    /// Remove the highlight at `interval`
    pub fn delete(&mut self, interval: Interval) -> Result<Highlight, StoreError> {
        let index = self.position(interval)?;
        debug!("Deleting parameter at {}", interval);
        Ok(self.highlights.remove(index))
    }

    /// Remove the highlight at `interval`, keeping a snapshot for `restore`
    pub fn take_for_move(&mut self, interval: Interval) -> Result<MoveSnapshot, StoreError> {
        let original = self.delete(interval)?;
        Ok(MoveSnapshot { original })
    }

    /// Put a moved highlight back exactly as it was
    pub fn restore(&mut self, snapshot: MoveSnapshot) {
        debug!("Restoring parameter at {}", snapshot.original.interval());
        self.highlights.push(snapshot.original);
    }

    /// Finish a move by placing the snapshot's annotation at `selection`
    pub fn complete_move(&mut self, snapshot: MoveSnapshot, selection: Selection) -> &Highlight {
        let highlight = Highlight::new(
            selection.interval,
            selection.text,
            snapshot.original.annotation,
        );
        self.add(highlight);
        let last = self.highlights.len() - 1;
        &self.highlights[last]
    }

    /// Move the highlight at `old` to `selection` in one step
    pub fn move_highlight(
        &mut self,
        old: Interval,
        selection: Selection,
        annotation: Annotation,
    ) -> Result<(), StoreError> {
        let mut snapshot = self.take_for_move(old)?;
        snapshot.original.annotation = annotation;
        self.complete_move(snapshot, selection);
        Ok(())
    }

    /// Check that `name` is not already used by another parameter
    ///
    /// Returns `false` to reject the name. `saved` holds the persisted
    /// parameters of every document of the current document's kind,
    /// possibly including the current document itself. A highlight with the
    /// same name at exactly `candidate` is the one being edited and does not
    /// count as a duplicate.
    ///
    /// While moving, saved entries of the current document are skipped: the
    /// moved highlight is no longer in this store, and the remaining local
    /// highlights are checked below. When editing a directive, names from
    /// other (older) directives are ignored.
    pub fn check_name_unique(
        &self,
        name: &str,
        candidate: Interval,
        document: &Document,
        saved: &[SavedParameters],
        is_moving: bool,
    ) -> bool {
        let saved_conflict = saved
            .iter()
            .filter(|item| item.mode == document.mode())
            .find_map(|item| {
                let same_document = item.is_for(document);

                if is_moving && same_document {
                    return None;
                }
                if document.mode() == DocumentMode::Directive && !same_document {
                    return None;
                }

                item.parameters.iter().find(|param| {
                    let same_name = param.annotation.name == name;
                    let different_position = param.interval() != candidate;
                    same_name && (!same_document || different_position)
                })
            });

        if let Some(param) = saved_conflict {
            debug!("Name '{}' already saved at {}", name, param.interval());
            return false;
        }

        let local_conflict = self
            .highlights
            .iter()
            .find(|param| param.annotation.name == name && param.interval() != candidate);

        if let Some(param) = local_conflict {
            debug!("Name '{}' already used at {}", name, param.interval());
            return false;
        }

        true
    }
}
