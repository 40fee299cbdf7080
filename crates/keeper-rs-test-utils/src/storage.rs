use keeper_rs_store::{SnapshotStorage, StoreError};
use parking_lot::Mutex;
use std::collections::{HashMap, HashSet};
use std::io;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};

/// In-memory snapshot storage with switchable write failures.
#[derive(Debug, Default)]
pub struct MemoryStorage {
    files: Mutex<HashMap<PathBuf, String>>,
    dirs: Mutex<HashSet<PathBuf>>,
    fail_writes: AtomicBool,
    writes: AtomicUsize,
}

impl MemoryStorage {
    pub fn new() -> Self {
        Self::default()
    }

    /// Place a snapshot at `path` and mark its parent directory as existing.
    pub fn seed(&self, path: impl AsRef<Path>, contents: impl Into<String>) {
        let path = path.as_ref();
        if let Some(parent) = path.parent() {
            self.dirs.lock().insert(parent.to_path_buf());
        }
        self.files
            .lock()
            .insert(path.to_path_buf(), contents.into());
    }

    pub fn contents(&self, path: impl AsRef<Path>) -> Option<String> {
        self.files.lock().get(path.as_ref()).cloned()
    }

    /// Make subsequent writes fail with an IO error.
    pub fn fail_writes(&self, fail: bool) {
        self.fail_writes.store(fail, Ordering::SeqCst);
    }

    /// Number of successful writes so far.
    pub fn write_count(&self) -> usize {
        self.writes.load(Ordering::SeqCst)
    }
}

impl SnapshotStorage for MemoryStorage {
    fn read(&self, path: &Path) -> Result<Option<String>, StoreError> {
        Ok(self.contents(path))
    }

    fn write(&self, path: &Path, contents: &str) -> Result<(), StoreError> {
        if self.fail_writes.load(Ordering::SeqCst) {
            return Err(StoreError::Io(io::Error::other("write refused")));
        }
        self.files
            .lock()
            .insert(path.to_path_buf(), contents.to_string());
        self.writes.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }

    fn ensure_dir(&self, path: &Path) -> Result<(), StoreError> {
        self.dirs.lock().insert(path.to_path_buf());
        Ok(())
    }

    fn dir_exists(&self, path: &Path) -> bool {
        self.dirs.lock().contains(path)
    }
}
