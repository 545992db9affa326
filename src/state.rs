//! Per-output-path locking shared by all tool calls.

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use crate::error::Result;

/// Thread-safe table of output path locks.
///
/// Tool calls may be served concurrently. Two calls writing the same output
/// file are serialized; calls on different files proceed in parallel. Slots
/// are created on demand and dropped once no call holds or waits on them.
#[derive(Clone, Default)]
pub struct OutputLocks {
    inner: Arc<Mutex<OutputLocksInner>>,
}

#[derive(Default)]
struct OutputLocksInner {
    slots: HashMap<PathBuf, Arc<Mutex<()>>>,
}

impl OutputLocks {
    /// Create an empty lock table.
    pub fn new() -> Self {
        Self::default()
    }

    // The table and the slots guard no data a panic could leave half-updated,
    // so a poisoned lock is taken over as is.
    fn lock_inner(&self) -> MutexGuard<'_, OutputLocksInner> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Run `f` while holding the lock for `path`.
    ///
    /// The slot is released when `f` returns or panics.
    pub fn with_output<F, T>(&self, path: &Path, f: F) -> Result<T>
    where
        F: FnOnce() -> Result<T>,
    {
        let key = lock_key(path);
        let release = {
            let mut inner = self.lock_inner();
            let slot = Arc::clone(inner.slots.entry(key.clone()).or_default());
            SlotRelease {
                locks: self,
                key,
                slot,
            }
        };

        let _guard = release.slot.lock().unwrap_or_else(PoisonError::into_inner);
        f()
    }

    /// Number of paths currently locked or waited on.
    pub fn len(&self) -> Result<usize> {
        Ok(self.lock_inner().slots.len())
    }

    /// Check if no path is locked.
    pub fn is_empty(&self) -> Result<bool> {
        Ok(self.len()? == 0)
    }
}

/// Drops a slot from the table once its last user is done with it.
struct SlotRelease<'a> {
    locks: &'a OutputLocks,
    key: PathBuf,
    slot: Arc<Mutex<()>>,
}

impl Drop for SlotRelease<'_> {
    fn drop(&mut self) {
        let mut inner = self.locks.lock_inner();
        // Only the table and this call still reference the slot.
        if Arc::strong_count(&self.slot) == 2 {
            inner.slots.remove(&self.key);
        }
    }
}

/// Resolve `path` so that different spellings of one file share a lock.
///
/// The file itself may not exist yet, so only the parent directory is
/// canonicalized.
fn lock_key(path: &Path) -> PathBuf {
    let absolute = if path.is_absolute() {
        path.to_path_buf()
    } else {
        match std::env::current_dir() {
            Ok(cwd) => cwd.join(path),
            Err(_) => path.to_path_buf(),
        }
    };

    let parent = absolute.parent().filter(|p| !p.as_os_str().is_empty());
    match (parent, absolute.file_name()) {
        (Some(parent), Some(name)) => match std::fs::canonicalize(parent) {
            Ok(dir) => dir.join(name),
            Err(_) => absolute,
        },
        _ => absolute,
    }
}
