//! Templater Core Library
//!
//! This crate provides the core of the parameter templater: marking spans
//! of a model configuration file or run command as named, typed parameters
//! so the document can later be rendered as a template.
//!
//! # Architecture
//!
//! - **Segmenter**: splits document text into plain and highlighted runs
//! - **Selection validator**: turns raw UI selections into safe offsets
//! - **Annotation store**: the highlights of one document, with edit, move
//!   and delete plus the cross-document name uniqueness check
//! - **Storage**: saved parameters, one JSON record per document
//!
//! # Quick Start
//!
//! ```text
//! let config = Config::load()?;
//! let storage = FileParameterStore::new(&config);
//!
//! let document = Document::config("model/config.yaml", text);
//! let saved = storage.load(&document)?.map(|r| r.parameters).unwrap_or_default();
//! let mut session = AnnotationSession::new(document, saved);
//!
//! session.select_range(6, 9)?;
//! let others = storage.saved_documents(DocumentMode::Config)?;
//! session.submit(annotation, &others)?;
//! storage.save(session.document(), &session.parameters())?;
//! ```
//!
//! # Modules
//!
//! - `session`: interaction state for one document (main entry point)
//! - `segment`: offset segmenter
//! - `selection`: selection validation and the overlap rules
//! - `store`: per-document highlight store
//! - `models`: highlights, annotations and saved records
//! - `document`: documents and character offset helpers
//! - `storage`: parameter persistence
//! - `config`: application configuration

pub mod config;
pub mod debounce;
pub mod document;
pub mod guess;
pub mod models;
pub mod segment;
pub mod selection;
pub mod session;
pub mod storage;
pub mod store;
pub mod template;

pub use config::Config;
pub use debounce::Debouncer;
pub use document::{Document, DocumentMode};
pub use models::{
    Annotation, DataType, FieldError, Highlight, Interval, ParamType, SavedParameters,
};
pub use segment::{segment, Segment, Span};
pub use selection::{validate_selection, RawSelection, Rejection, Selection, SelectionPoint};
pub use session::{AnnotationSession, SubmitError};
pub use storage::{
    FileParameterStore, ParameterLookup, ParameterStore, SaveOutcome, StorageError, StorageResult,
};
pub use store::{AnnotationStore, MoveSnapshot, StoreError};
pub use template::render_template;
