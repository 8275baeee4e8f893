//! Storage layer
//!
//! Saved parameters are kept per document. Two traits separate the
//! concerns:
//!
//! - [`ParameterStore`] persists and loads the highlights of one document
//! - [`ParameterLookup`] lists every saved document of a kind, for the
//!   name uniqueness check
//!
//! [`FileParameterStore`] implements both on top of one JSON record per
//! document.

pub mod error;
pub mod files;

pub use error::{StorageError, StorageResult};
pub use files::FileParameterStore;

use serde::Serialize;

use crate::document::{Document, DocumentMode};
use crate::models::{Highlight, SavedParameters};

/// Result of a save request
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "status", rename_all = "lowercase")]
pub enum SaveOutcome {
    /// Record written with `count` parameters
    Saved { count: usize },
    /// Nothing to save and nothing previously saved
    Skipped,
}

/// Persists the committed highlights of a document
pub trait ParameterStore {
    /// Save `highlights` as the parameters of `document`
    fn save(&self, document: &Document, highlights: &[Highlight]) -> StorageResult<SaveOutcome>;

    /// Load the saved parameters of `document`, if any
    fn load(&self, document: &Document) -> StorageResult<Option<SavedParameters>>;

    /// Remove the saved parameters of `document`
    ///
    /// Returns `false` when nothing was saved.
    fn remove(&self, document: &Document) -> StorageResult<bool>;
}

/// Read-only listing of saved documents
pub trait ParameterLookup {
    /// Every saved document of `mode`
    fn saved_documents(&self, mode: DocumentMode) -> StorageResult<Vec<SavedParameters>>;
}
