//! Command handlers

pub mod annotate;
pub mod config;
pub mod document;

use anyhow::{Context, Result};
use tracing::{debug, warn};

use templater_core::{
    AnnotationSession, Config, FileParameterStore, ParameterStore, SaveOutcome, StorageError,
};

use crate::args::DocumentArgs;
use crate::output::Output;

/// Load a document and its saved parameters into a session
pub(crate) fn open_session(
    storage: &FileParameterStore,
    document: &DocumentArgs,
    config: &Config,
    output: &Output,
) -> Result<AnnotationSession> {
    let document = document.load()?;
    let saved = storage
        .load(&document)
        .with_context(|| format!("Failed to load saved parameters for {}", document.id()))?;

    let highlights = match saved {
        Some(record) => {
            if record.content_changed(&document) {
                warn!("Content hash mismatch for {}", document.id());
                output.warning(&format!(
                    "{} changed since its parameters were saved on {}. Check their positions.",
                    document.id(),
                    record.saved_at.format("%Y-%m-%d %H:%M")
                ));
            }
            record.parameters
        }
        None => Vec::new(),
    };

    Ok(AnnotationSession::new(document, highlights).with_debounce(config.debounce()))
}

/// Persist the session's parameters
pub(crate) fn save_session(
    storage: &FileParameterStore,
    session: &AnnotationSession,
) -> Result<SaveOutcome> {
    let document = session.document();
    storage
        .save(document, &session.parameters())
        .with_context(|| format!("Failed to save parameters for {}", document.id()))
}

/// Recovery advice for a failure caused by a parameter record
pub(crate) fn storage_hint(error: &anyhow::Error) -> Option<String> {
    let storage_error = error
        .chain()
        .find_map(|cause| cause.downcast_ref::<StorageError>())?;
    if let Some(path) = storage_error.path() {
        debug!("Storage failure on {:?}", path);
    }
    storage_error.recovery_suggestion()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::output::OutputFormat;
    use std::path::PathBuf;
    use tempfile::TempDir;
    use templater_core::Document;

    #[test]
    fn test_storage_hint_through_context() {
        let error = anyhow::Error::new(StorageError::CorruptRecord {
            path: PathBuf::from("/data/configs/abc.json"),
            details: "EOF while parsing".to_string(),
        })
        .context("Failed to load saved parameters for config.yaml");

        let hint = storage_hint(&error).unwrap();
        assert!(hint.contains("/data/configs/abc.json"));
    }

    #[test]
    fn test_storage_hint_ignores_other_errors() {
        let error = anyhow::anyhow!("No parameter found at 6..9");
        assert!(storage_hint(&error).is_none());
    }

    #[test]
    fn test_corrupt_record_surfaces_hint() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("config.yaml");
        std::fs::write(&path, "rate: 0.5\n").unwrap();
        let config = Config {
            data_dir: temp_dir.path().join("data"),
            ..Config::default()
        };
        let storage = FileParameterStore::new(&config);
        let document = DocumentArgs {
            file: Some(path.clone()),
            directive: None,
            cwd: None,
        };

        // Plant an unparseable record where this document's record belongs
        let loaded: Document = document.load().unwrap();
        let record = storage.record_path(&loaded);
        std::fs::create_dir_all(record.parent().unwrap()).unwrap();
        std::fs::write(&record, "{not json").unwrap();

        let output = Output::new(OutputFormat::Quiet);
        let error = open_session(&storage, &document, &config, &output)
            .err()
            .unwrap();
        let hint = storage_hint(&error).unwrap();
        assert!(hint.contains(&record.display().to_string()));
    }
}
