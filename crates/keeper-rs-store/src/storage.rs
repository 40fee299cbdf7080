//! Snapshot persistence for record stores.
//!
//! A store is flushed as one JSON document that replaces the previous file in
//! full. There is no journal and no partial write: the document is written to
//! a sibling temp file and renamed over the target.

use crate::error::StoreError;
use log::debug;
use std::fmt::Debug;
use std::fs::{self, OpenOptions};
use std::io::{ErrorKind, Write};
use std::path::{Path, PathBuf};

/// Backing storage used by record stores.
pub trait SnapshotStorage: Send + Sync + Debug {
    /// Read the snapshot at `path`, returning `None` when it does not exist.
    fn read(&self, path: &Path) -> Result<Option<String>, StoreError>;

    /// Replace the snapshot at `path` with `contents`.
    fn write(&self, path: &Path, contents: &str) -> Result<(), StoreError>;

    /// Create `path` and its parents if missing.
    fn ensure_dir(&self, path: &Path) -> Result<(), StoreError>;

    /// Whether the directory at `path` exists.
    fn dir_exists(&self, path: &Path) -> bool;
}

/// Local filesystem storage.
#[derive(Debug, Default, Clone, Copy)]
pub struct FsStorage;

impl FsStorage {
    /// Path to the temporary file used while replacing `path`.
    fn temp_path(path: &Path) -> PathBuf {
        let mut name = path
            .file_name()
            .map(|name| name.to_os_string())
            .unwrap_or_default();
        name.push(".tmp");
        path.with_file_name(name)
    }
}

impl SnapshotStorage for FsStorage {
    fn read(&self, path: &Path) -> Result<Option<String>, StoreError> {
        match fs::read_to_string(path) {
            Ok(contents) => Ok(Some(contents)),
            Err(err) if err.kind() == ErrorKind::NotFound => Ok(None),
            Err(err) => Err(StoreError::Io(err)),
        }
    }

    fn write(&self, path: &Path, contents: &str) -> Result<(), StoreError> {
        let temp_path = Self::temp_path(path);
        {
            let mut file = OpenOptions::new()
                .create(true)
                .truncate(true)
                .write(true)
                .open(&temp_path)?;
            file.write_all(contents.as_bytes())?;
            file.flush()?;
        }
        if path.exists() {
            fs::remove_file(path)?;
        }
        fs::rename(&temp_path, path)?;
        debug!(
            "snapshot written (path={}, bytes={})",
            path.display(),
            contents.len()
        );
        Ok(())
    }

    fn ensure_dir(&self, path: &Path) -> Result<(), StoreError> {
        fs::create_dir_all(path)?;
        Ok(())
    }

    fn dir_exists(&self, path: &Path) -> bool {
        path.is_dir()
    }
}
