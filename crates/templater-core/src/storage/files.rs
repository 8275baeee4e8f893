//! File-backed parameter storage
//!
//! One JSON record per annotated document:
//!
//! ```text
//! <data_dir>/configs/<sha256(path)>.json
//! <data_dir>/directives/<sha256(command)>.json
//! ```
//!
//! Records are written atomically (write to temp file, sync, then rename)
//! so a crash never leaves a half-written record behind.

use std::fs::{self, File};
use std::io::{ErrorKind, Write};
use std::path::{Path, PathBuf};

use tracing::{debug, info, warn};

use super::error::{StorageError, StorageResult};
use super::{ParameterLookup, ParameterStore, SaveOutcome};
use crate::config::Config;
use crate::document::{hash_hex, Document, DocumentMode};
use crate::models::{Highlight, SavedParameters};

const RECORD_EXTENSION: &str = "json";

/// Stores saved parameters as JSON files under a data directory
#[derive(Debug, Clone)]
pub struct FileParameterStore {
    root: PathBuf,
}

impl FileParameterStore {
    /// Create a store rooted at the configured data directory
    pub fn new(config: &Config) -> Self {
        Self::with_root(config.data_dir.clone())
    }

    pub fn with_root(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    fn records_dir(&self, mode: DocumentMode) -> PathBuf {
        Config::records_dir_in(&self.root, mode)
    }

    /// Path of the record for `document`
    pub fn record_path(&self, document: &Document) -> PathBuf {
        self.records_dir(document.mode())
            .join(format!("{}.{}", hash_hex(document.id()), RECORD_EXTENSION))
    }

    fn read_record(path: &Path) -> StorageResult<SavedParameters> {
        let content = fs::read_to_string(path)
            .map_err(|e| StorageError::from_read(e, path.to_path_buf()))?;
        serde_json::from_str(&content).map_err(|e| StorageError::CorruptRecord {
            path: path.to_path_buf(),
            details: e.to_string(),
        })
    }
}

impl ParameterStore for FileParameterStore {
    fn save(&self, document: &Document, highlights: &[Highlight]) -> StorageResult<SaveOutcome> {
        let path = self.record_path(document);

        // An unannotated config that was never saved leaves no record behind
        if document.mode() == DocumentMode::Config && highlights.is_empty() && !path.exists() {
            debug!("Nothing to save for {}", document.id());
            return Ok(SaveOutcome::Skipped);
        }

        let record = SavedParameters::new(document, highlights.to_vec());
        let json = serde_json::to_vec_pretty(&record)?;
        atomic_write(&path, &json)?;

        info!(
            "Saved {} parameter(s) for {} {}",
            highlights.len(),
            document.mode(),
            document.id()
        );
        Ok(SaveOutcome::Saved {
            count: highlights.len(),
        })
    }

    fn load(&self, document: &Document) -> StorageResult<Option<SavedParameters>> {
        let path = self.record_path(document);
        if !path.exists() {
            return Ok(None);
        }

        let record = Self::read_record(&path)?;
        if !record.is_for(document) {
            warn!(
                "Record {:?} belongs to {} {}, not {}",
                path,
                record.mode,
                record.id,
                document.id()
            );
            return Ok(None);
        }
        Ok(Some(record))
    }

    fn remove(&self, document: &Document) -> StorageResult<bool> {
        let path = self.record_path(document);
        match fs::remove_file(&path) {
            Ok(()) => {
                info!("Removed saved parameters for {}", document.id());
                Ok(true)
            }
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(false),
            Err(e) => Err(StorageError::from_io(e, path)),
        }
    }
}

impl ParameterLookup for FileParameterStore {
    fn saved_documents(&self, mode: DocumentMode) -> StorageResult<Vec<SavedParameters>> {
        let dir = self.records_dir(mode);
        let entries = match fs::read_dir(&dir) {
            Ok(entries) => entries,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(Vec::new()),
            Err(e) => return Err(StorageError::from_read(e, dir)),
        };

        let mut records = Vec::new();
        for entry in entries {
            let path = entry.map_err(|e| StorageError::from_read(e, dir.clone()))?.path();
            if path.extension().and_then(|ext| ext.to_str()) != Some(RECORD_EXTENSION) {
                continue;
            }

            // One bad record must not block every other document
            match Self::read_record(&path) {
                Ok(record) if record.mode == mode => records.push(record),
                Ok(record) => warn!("Skipping {} record in {:?}", record.mode, dir),
                Err(e) => warn!("Skipping unreadable record: {}", e),
            }
        }

        records.sort_by(|a, b| a.id.cmp(&b.id));
        debug!("Found {} saved {} record(s)", records.len(), mode);
        Ok(records)
    }
}

/// Write data to a file atomically
///
/// Writes to a temporary file first, syncs it, then renames it over the
/// target.
fn atomic_write(path: &Path, data: &[u8]) -> StorageResult<()> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).map_err(|source| StorageError::CreateDirectory {
            path: parent.to_path_buf(),
            source,
        })?;
    }

    let temp_path = path.with_extension("tmp");

    let mut file =
        File::create(&temp_path).map_err(|e| StorageError::from_io(e, temp_path.clone()))?;
    file.write_all(data)
        .map_err(|e| StorageError::from_io(e, temp_path.clone()))?;
    file.sync_all()
        .map_err(|e| StorageError::from_io(e, temp_path.clone()))?;

    fs::rename(&temp_path, path).map_err(|source| StorageError::AtomicWriteFailed {
        from: temp_path.clone(),
        to: path.to_path_buf(),
        source,
    })?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Annotation, DataType, Interval, ParamType};
    use tempfile::TempDir;

    const CONFIG: &str = "rate: 0.5\nsteps: 100\n";

    fn test_store(temp_dir: &TempDir) -> FileParameterStore {
        let config = Config {
            data_dir: temp_dir.path().to_path_buf(),
            ..Config::default()
        };
        FileParameterStore::new(&config)
    }

    fn highlight(start: usize, end: usize, text: &str, name: &str) -> Highlight {
        Highlight::new(
            Interval::new(start, end),
            text,
            Annotation {
                name: name.to_string(),
                description: format!("The {}", name),
                param_type: Some(ParamType::Float),
                data_type: Some(DataType::Numerical),
                ..Annotation::default()
            },
        )
    }

    #[test]
    fn test_save_and_load() {
        let temp_dir = TempDir::new().unwrap();
        let store = test_store(&temp_dir);
        let doc = Document::config("/models/a/config.yaml", CONFIG);

        let outcome = store
            .save(&doc, &[highlight(6, 9, "0.5", "rate")])
            .unwrap();
        assert_eq!(outcome, SaveOutcome::Saved { count: 1 });
        assert!(store.record_path(&doc).starts_with(temp_dir.path().join("configs")));

        let loaded = store.load(&doc).unwrap().unwrap();
        assert_eq!(loaded.id, "/models/a/config.yaml");
        assert_eq!(loaded.parameters, vec![highlight(6, 9, "0.5", "rate")]);
        assert!(!loaded.content_changed(&doc));
    }

    #[test]
    fn test_load_missing() {
        let temp_dir = TempDir::new().unwrap();
        let store = test_store(&temp_dir);
        let doc = Document::config("never-saved.yaml", CONFIG);
        assert!(store.load(&doc).unwrap().is_none());
    }

    #[test]
    fn test_empty_config_never_saved_is_skipped() {
        let temp_dir = TempDir::new().unwrap();
        let store = test_store(&temp_dir);
        let doc = Document::config("a.yaml", CONFIG);

        assert_eq!(store.save(&doc, &[]).unwrap(), SaveOutcome::Skipped);
        assert!(!store.record_path(&doc).exists());
    }

    #[test]
    fn test_empty_config_previously_saved_is_cleared() {
        let temp_dir = TempDir::new().unwrap();
        let store = test_store(&temp_dir);
        let doc = Document::config("a.yaml", CONFIG);

        store.save(&doc, &[highlight(6, 9, "0.5", "rate")]).unwrap();
        assert_eq!(
            store.save(&doc, &[]).unwrap(),
            SaveOutcome::Saved { count: 0 }
        );
        assert!(store.load(&doc).unwrap().unwrap().parameters.is_empty());
    }

    #[test]
    fn test_empty_directive_is_saved() {
        let temp_dir = TempDir::new().unwrap();
        let store = test_store(&temp_dir);
        let doc = Document::directive("python run.py", Some("/work".to_string()));

        assert_eq!(
            store.save(&doc, &[]).unwrap(),
            SaveOutcome::Saved { count: 0 }
        );
        let loaded = store.load(&doc).unwrap().unwrap();
        assert_eq!(loaded.cwd.as_deref(), Some("/work"));
        assert!(store.record_path(&doc).starts_with(temp_dir.path().join("directives")));
    }

    #[test]
    fn test_content_changed_detected() {
        let temp_dir = TempDir::new().unwrap();
        let store = test_store(&temp_dir);
        let doc = Document::config("a.yaml", CONFIG);
        store.save(&doc, &[highlight(6, 9, "0.5", "rate")]).unwrap();

        let edited = Document::config("a.yaml", "rate: 0.75\nsteps: 100\n");
        let loaded = store.load(&edited).unwrap().unwrap();
        assert!(loaded.content_changed(&edited));
    }

    #[test]
    fn test_saved_documents_by_mode() {
        let temp_dir = TempDir::new().unwrap();
        let store = test_store(&temp_dir);

        store
            .save(&Document::config("b.yaml", CONFIG), &[highlight(6, 9, "0.5", "rate")])
            .unwrap();
        store
            .save(&Document::config("a.yaml", CONFIG), &[highlight(17, 20, "100", "steps")])
            .unwrap();
        store
            .save(&Document::directive("run.sh --rate 1", None), &[])
            .unwrap();

        let configs = store.saved_documents(DocumentMode::Config).unwrap();
        let ids: Vec<_> = configs.iter().map(|r| r.id.as_str()).collect();
        assert_eq!(ids, vec!["a.yaml", "b.yaml"]);

        let directives = store.saved_documents(DocumentMode::Directive).unwrap();
        assert_eq!(directives.len(), 1);
        assert_eq!(directives[0].mode, DocumentMode::Directive);
    }

    #[test]
    fn test_records_follow_config_layout() {
        let temp_dir = TempDir::new().unwrap();
        let config = Config {
            data_dir: temp_dir.path().to_path_buf(),
            ..Config::default()
        };
        let store = FileParameterStore::new(&config);

        let yaml = Document::config("a.yaml", CONFIG);
        let command = Document::directive("python run.py --rate 0.5", None);
        assert!(store.record_path(&yaml).starts_with(config.configs_dir()));
        assert!(store.record_path(&command).starts_with(config.directives_dir()));
    }

    #[test]
    fn test_saved_documents_without_data_dir() {
        let temp_dir = TempDir::new().unwrap();
        let store = FileParameterStore::with_root(temp_dir.path().join("missing"));
        assert!(store.saved_documents(DocumentMode::Config).unwrap().is_empty());
    }

    #[test]
    fn test_corrupt_record_skipped_in_listing() {
        let temp_dir = TempDir::new().unwrap();
        let store = test_store(&temp_dir);
        let doc = Document::config("a.yaml", CONFIG);
        store.save(&doc, &[highlight(6, 9, "0.5", "rate")]).unwrap();

        let configs_dir = temp_dir.path().join("configs");
        fs::write(configs_dir.join("broken.json"), "{ not json").unwrap();
        fs::write(configs_dir.join("notes.txt"), "ignored").unwrap();

        let configs = store.saved_documents(DocumentMode::Config).unwrap();
        assert_eq!(configs.len(), 1);
    }

    #[test]
    fn test_corrupt_record_load_fails() {
        let temp_dir = TempDir::new().unwrap();
        let store = test_store(&temp_dir);
        let doc = Document::config("a.yaml", CONFIG);
        let path = store.record_path(&doc);
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(&path, "[]").unwrap();

        let err = store.load(&doc).unwrap_err();
        assert!(matches!(err, StorageError::CorruptRecord { .. }));
    }

    #[test]
    fn test_remove() {
        let temp_dir = TempDir::new().unwrap();
        let store = test_store(&temp_dir);
        let doc = Document::config("a.yaml", CONFIG);
        store.save(&doc, &[highlight(6, 9, "0.5", "rate")]).unwrap();

        assert!(store.remove(&doc).unwrap());
        assert!(!store.remove(&doc).unwrap());
        assert!(store.load(&doc).unwrap().is_none());
    }

    #[test]
    fn test_atomic_write_leaves_no_temp_file() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("nested").join("record.json");

        atomic_write(&path, b"{}").unwrap();
        assert_eq!(fs::read_to_string(&path).unwrap(), "{}");
        assert!(!path.with_extension("tmp").exists());
    }
}
