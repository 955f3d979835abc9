//! Task document persistence
//!
//! The document is read whole and written whole. Writes go to a sibling
//! temp file under an exclusive lock and are renamed over the target, so a
//! reader never sees a partial document.

use std::ffi::OsString;
use std::fs::{self, OpenOptions};
use std::io::{self, BufWriter, Write};
use std::path::{Path, PathBuf};

use fs2::FileExt;
use thiserror::Error;
use tracing::debug;

use crate::domain::TaskDocument;

#[derive(Debug, Error)]
pub enum StorageError {
    #[error("Failed to read task document {}: {source}", path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("Failed to write task document {}: {source}", path.display())]
    Write {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}

/// Store for a single task document
#[derive(Debug, Clone)]
pub struct DocumentStore {
    path: PathBuf,
}

impl DocumentStore {
    /// Creates a store for the document at the given path
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Returns the path to the document
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Reads the raw document text
    pub fn read_text(&self) -> Result<String, StorageError> {
        let text = fs::read_to_string(&self.path).map_err(|source| StorageError::Read {
            path: self.path.clone(),
            source,
        })?;
        debug!(path = %self.path.display(), bytes = text.len(), "read task document");
        Ok(text)
    }

    /// Reads and parses the document
    pub fn read(&self) -> Result<TaskDocument, StorageError> {
        Ok(TaskDocument::parse(&self.read_text()?))
    }

    /// Writes the document back
    pub fn write(&self, doc: &TaskDocument) -> Result<(), StorageError> {
        self.write_text(&doc.render())
    }

    /// Replaces the document text atomically
    pub fn write_text(&self, text: &str) -> Result<(), StorageError> {
        let write_err = |source| StorageError::Write {
            path: self.path.clone(),
            source,
        };

        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent).map_err(write_err)?;
        }

        let temp_path = self.temp_path();
        let result = (|| {
            let file = OpenOptions::new()
                .write(true)
                .create(true)
                .truncate(true)
                .open(&temp_path)?;

            file.lock_exclusive()?;

            let mut writer = BufWriter::new(&file);
            writer.write_all(text.as_bytes())?;
            writer.flush()?;
            drop(writer);
            file.sync_all()?;

            fs::rename(&temp_path, &self.path)
        })();

        if let Err(source) = result {
            let _ = fs::remove_file(&temp_path);
            return Err(write_err(source));
        }

        debug!(path = %self.path.display(), bytes = text.len(), "wrote task document");
        Ok(())
    }

    /// `tasks.md` -> `tasks.md.tmp`, next to the document
    fn temp_path(&self) -> PathBuf {
        let mut name = self
            .path
            .file_name()
            .map(OsString::from)
            .unwrap_or_else(|| OsString::from("tasks"));
        name.push(".tmp");
        self.path.with_file_name(name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    const DOC: &str = "# Plan\n\n- [ ] T001 First (phase: setup)\r\n- [ ] T002 Second (depends: T001)";

    #[test]
    fn missing_document_is_read_error() {
        let dir = TempDir::new().unwrap();
        let store = DocumentStore::new(dir.path().join("tasks.md"));

        let err = store.read().unwrap_err();
        assert!(matches!(err, StorageError::Read { .. }));
        assert!(err.to_string().contains("tasks.md"));
    }

    #[test]
    fn write_then_read_is_byte_identical() {
        let dir = TempDir::new().unwrap();
        let store = DocumentStore::new(dir.path().join("tasks.md"));

        store.write_text(DOC).unwrap();
        assert_eq!(store.read_text().unwrap(), DOC);

        let doc = store.read().unwrap();
        store.write(&doc).unwrap();
        assert_eq!(fs::read(store.path()).unwrap(), DOC.as_bytes());
    }

    #[test]
    fn creates_parent_directories() {
        let dir = TempDir::new().unwrap();
        let store = DocumentStore::new(dir.path().join("plan").join("tasks.md"));

        store.write_text(DOC).unwrap();
        assert!(store.path().exists());
    }

    #[test]
    fn atomic_write_leaves_no_temp_file() {
        let dir = TempDir::new().unwrap();
        let store = DocumentStore::new(dir.path().join("tasks.md"));

        store.write_text("- [ ] T001 One\n").unwrap();
        store.write_text("- [x] T001 One\n").unwrap();

        assert!(!dir.path().join("tasks.md.tmp").exists());
        assert_eq!(store.read_text().unwrap(), "- [x] T001 One\n");
    }
}
