//! Annotation session
//!
//! The interaction state for one open document: the committed highlights,
//! an optional provisional highlight awaiting its form submission, and an
//! optional in-progress move. Every path out of an interaction either
//! commits through `submit` or leaves the store as it was before the
//! interaction began.
//!
//! ## Flow
//!
//! ```text
//! select(raw)           -> pending highlight (form opens)
//! submit(annotation)    -> validated, uniqueness-checked, committed
//! cancel()              -> pending highlight dropped
//!
//! begin_move(interval)  -> highlight lifted out, awaiting a new selection
//! select(raw)           -> pending highlight carrying the moved annotation
//! submit(annotation)    -> committed at the new interval
//! revert_move()         -> original highlight restored exactly
//! ```

use std::time::{Duration, Instant};

use thiserror::Error;
use tracing::{debug, info};

use crate::debounce::{Debouncer, DEFAULT_DEBOUNCE};
use crate::document::{Document, DocumentMode};
use crate::guess::{guess_param_name, guess_param_type};
use crate::models::{Annotation, FieldError, Highlight, Interval, SavedParameters};
use crate::segment::{segment, Segment, Span};
use crate::selection::{validate_selection, RawSelection, Rejection, Selection};
use crate::store::{AnnotationStore, MoveSnapshot, StoreError};

/// Reasons a form submission is refused
#[derive(Error, Debug, Clone, PartialEq)]
pub enum SubmitError {
    #[error("No text is selected")]
    NoSelection,

    #[error("Invalid parameter: {}", format_field_errors(.0))]
    Invalid(Vec<FieldError>),

    #[error(
        "{name} is used in this or another {namespace}. Please provide a unique parameter name."
    )]
    DuplicateName { name: String, namespace: &'static str },
}

fn format_field_errors(errors: &[FieldError]) -> String {
    errors
        .iter()
        .map(|e| e.to_string())
        .collect::<Vec<_>>()
        .join("; ")
}

/// A highlight that has been selected but not yet submitted
#[derive(Debug, Clone, PartialEq)]
struct Pending {
    selection: Selection,
    /// Present when editing an existing highlight or placing a moved one
    annotation: Option<Annotation>,
    /// Submitting places the highlight being moved
    placement: bool,
}

/// What the segmenter sees: committed highlights plus the pending one
enum Mark<'a> {
    Committed(&'a Highlight),
    Pending(Interval),
}

impl Span for Mark<'_> {
    fn interval(&self) -> Interval {
        match self {
            Mark::Committed(highlight) => highlight.interval(),
            Mark::Pending(interval) => *interval,
        }
    }

    fn annotation(&self) -> Option<&Annotation> {
        match self {
            Mark::Committed(highlight) => Some(&highlight.annotation),
            Mark::Pending(_) => None,
        }
    }
}

/// Interaction state for one document
#[derive(Debug)]
pub struct AnnotationSession {
    document: Document,
    store: AnnotationStore,
    /// Highlights as loaded, for change detection
    loaded: Vec<Highlight>,
    pending: Option<Pending>,
    moving: Option<MoveSnapshot>,
    selection_changes: Debouncer<RawSelection>,
}

impl AnnotationSession {
    /// Open a session on `document` with its previously saved highlights
    pub fn new(document: Document, highlights: Vec<Highlight>) -> Self {
        Self {
            document,
            store: AnnotationStore::from_highlights(highlights.clone()),
            loaded: highlights,
            pending: None,
            moving: None,
            selection_changes: Debouncer::new(DEFAULT_DEBOUNCE),
        }
    }

    /// Use a custom debounce delay for `selection_changed`
    pub fn with_debounce(mut self, delay: Duration) -> Self {
        self.selection_changes = Debouncer::new(delay);
        self
    }

    pub fn document(&self) -> &Document {
        &self.document
    }

    pub fn store(&self) -> &AnnotationStore {
        &self.store
    }

    /// Committed highlights
    pub fn highlights(&self) -> &[Highlight] {
        self.store.highlights()
    }

    /// The pending selection, if the form is open
    pub fn pending_selection(&self) -> Option<&Selection> {
        self.pending.as_ref().map(|p| &p.selection)
    }

    pub fn is_moving(&self) -> bool {
        self.moving.is_some()
    }

    /// The highlight currently being moved
    pub fn moving(&self) -> Option<&Highlight> {
        self.moving.as_ref().map(MoveSnapshot::original)
    }

    /// Committed highlights differ from what the session was opened with
    pub fn is_dirty(&self) -> bool {
        let current = self.parameters();
        current.len() != self.loaded.len() || current.iter().any(|h| !self.loaded.contains(h))
    }

    /// The highlights to persist
    ///
    /// A highlight lifted out for a move that has not been placed yet is
    /// included at its original position, so saving mid-move never drops a
    /// parameter.
    pub fn parameters(&self) -> Vec<Highlight> {
        let mut parameters = self.store.highlights().to_vec();
        if let Some(snapshot) = &self.moving {
            parameters.push(snapshot.original().clone());
        }
        parameters
    }

    /// Segments for display, including the pending highlight
    pub fn segments(&self) -> Vec<Segment> {
        let mut marks: Vec<Mark<'_>> = self.store.highlights().iter().map(Mark::Committed).collect();
        if let Some(pending) = &self.pending {
            if self.store.get(pending.selection.interval).is_none() {
                marks.push(Mark::Pending(pending.selection.interval));
            }
        }
        segment(self.document.content(), &marks)
    }

    /// Record a selection change, to be evaluated once changes settle
    pub fn selection_changed(&mut self, raw: RawSelection, now: Instant) {
        self.selection_changes.schedule(raw, now);
    }

    /// Evaluate the last selection change if its delay has elapsed
    pub fn poll_selection(&mut self, now: Instant) -> Option<Result<Selection, Rejection>> {
        let raw = self.selection_changes.poll(now)?;
        Some(self.select(raw))
    }

    /// Validate a selection and open the form for it
    ///
    /// A previous unsubmitted selection is discarded. While moving, the new
    /// pending highlight carries the moved annotation.
    pub fn select(&mut self, raw: RawSelection) -> Result<Selection, Rejection> {
        self.selection_changes.cancel();

        let selection = match validate_selection(&raw, self.document.content(), self.highlights())
        {
            Ok(selection) => selection,
            Err(rejection) => {
                debug!("Selection rejected: {}", rejection);
                return Err(rejection);
            }
        };

        debug!("Selected {} {:?}", selection.interval, selection.text);
        self.pending = Some(Pending {
            selection: selection.clone(),
            annotation: self.moving.as_ref().map(|m| m.annotation().clone()),
            placement: self.moving.is_some(),
        });
        Ok(selection)
    }

    /// Select plain document offsets
    pub fn select_range(&mut self, anchor: usize, focus: usize) -> Result<Selection, Rejection> {
        self.select(RawSelection::from_offsets(anchor, focus))
    }

    /// Open the form on an existing highlight
    ///
    /// Refused while a move is waiting to be placed.
    pub fn begin_edit(&mut self, interval: Interval) -> Result<&Highlight, StoreError> {
        if let Some(snapshot) = &self.moving {
            return Err(StoreError::MoveInProgress(snapshot.original().interval()));
        }

        let highlight = self
            .store
            .get(interval)
            .ok_or(StoreError::NotFound(interval))?;

        self.pending = Some(Pending {
            selection: Selection {
                interval,
                text: highlight.text.clone(),
            },
            annotation: Some(highlight.annotation.clone()),
            placement: false,
        });
        Ok(highlight)
    }

    /// Lift a highlight out so it can be placed on a new selection
    pub fn begin_move(&mut self, interval: Interval) -> Result<(), StoreError> {
        if let Some(snapshot) = &self.moving {
            return Err(StoreError::MoveInProgress(snapshot.original().interval()));
        }

        let snapshot = self.store.take_for_move(interval)?;
        info!("Moving parameter '{}' from {}", snapshot.annotation().name, interval);
        self.pending = None;
        self.moving = Some(snapshot);
        Ok(())
    }

    /// Abandon a move, restoring the original highlight
    ///
    /// Returns `false` when no move was in progress.
    pub fn revert_move(&mut self) -> bool {
        match self.moving.take() {
            Some(snapshot) => {
                info!("Reverting move of parameter '{}'", snapshot.annotation().name);
                self.pending = None;
                self.store.restore(snapshot);
                true
            }
            None => false,
        }
    }

    /// Initial values for the annotation form
    ///
    /// The existing annotation when editing or moving; otherwise blank
    /// values seeded from the selected text.
    pub fn form_values(&self) -> Option<Annotation> {
        let pending = self.pending.as_ref()?;
        if let Some(annotation) = &pending.annotation {
            return Some(annotation.clone());
        }

        let text = &pending.selection.text;
        let mut values = Annotation::blank(text.clone());
        values.param_type = Some(guess_param_type(text));
        if self.document.mode() == DocumentMode::Directive {
            let prefix = self.document.line_prefix(pending.selection.interval.start);
            if let Some(name) = guess_param_name(prefix) {
                values.name = name;
            }
        }
        Some(values)
    }

    /// Submit the form for the pending highlight
    ///
    /// `saved` is every saved parameter set of this document's kind. On
    /// failure nothing changes and the form stays open.
    pub fn submit(
        &mut self,
        mut annotation: Annotation,
        saved: &[SavedParameters],
    ) -> Result<Highlight, SubmitError> {
        let pending = self.pending.as_ref().ok_or(SubmitError::NoSelection)?;
        let interval = pending.selection.interval;
        let placement = pending.placement;

        annotation.normalize();
        let errors = annotation.validate();
        if !errors.is_empty() {
            debug!("Annotation rejected with {} field error(s)", errors.len());
            return Err(SubmitError::Invalid(errors));
        }

        if !self.store.check_name_unique(
            &annotation.name,
            interval,
            &self.document,
            saved,
            placement,
        ) {
            return Err(SubmitError::DuplicateName {
                name: annotation.name,
                namespace: match self.document.mode() {
                    DocumentMode::Config => "configuration file",
                    DocumentMode::Directive => "directive",
                },
            });
        }

        let text = self
            .store
            .get(interval)
            .map(|existing| existing.text.clone())
            .unwrap_or_else(|| pending.selection.text.clone());
        let highlight = Highlight::new(interval, text, annotation);

        self.store.upsert(highlight.clone());
        self.pending = None;
        if placement {
            self.moving = None;
        }
        info!("Saved parameter '{}' at {}", highlight.name(), interval);
        Ok(highlight)
    }

    /// Close the form without submitting
    ///
    /// A move stays in progress, waiting for another selection.
    pub fn cancel(&mut self) {
        self.selection_changes.cancel();
        self.pending = None;
    }

    /// Delete a committed highlight
    pub fn delete(&mut self, interval: Interval) -> Result<Highlight, StoreError> {
        let removed = self.store.delete(interval)?;
        if self.pending_selection().map(|s| s.interval) == Some(interval) {
            self.pending = None;
        }
        info!("Deleted parameter '{}' at {}", removed.name(), interval);
        Ok(removed)
    }
}
