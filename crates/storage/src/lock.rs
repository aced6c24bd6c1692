//! Path locks
//!
//! Process-local registry of one mutex per backing file, so every `Store`
//! opened on the same path in this process serializes its read-modify-write
//! cycles. Other processes are not covered.
//!
//! Keys canonicalize the parent directory only. A symlink to the file itself
//! and its target get different keys, and so different locks; stores opened
//! through both spellings are not serialized against each other. A symlinked
//! directory is resolved.

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex, MutexGuard, OnceLock, PoisonError, Weak};
use tracing::debug;

/// Shared lock for one backing file
pub type PathLock = Arc<Mutex<()>>;

fn registry() -> &'static Mutex<HashMap<PathBuf, Weak<Mutex<()>>>> {
    static LOCKS: OnceLock<Mutex<HashMap<PathBuf, Weak<Mutex<()>>>>> = OnceLock::new();
    LOCKS.get_or_init(|| Mutex::new(HashMap::new()))
}

/// Resolve `path` to a stable key. The file itself may not exist yet, so the
/// parent directory is canonicalized and the file name appended unresolved.
pub fn lock_key(path: &Path) -> PathBuf {
    let parent = match path.parent() {
        Some(p) if !p.as_os_str().is_empty() => p,
        _ => Path::new("."),
    };
    match (parent.canonicalize(), path.file_name()) {
        (Ok(dir), Some(name)) => dir.join(name),
        _ => path.to_path_buf(),
    }
}

/// Get the lock for `path`, creating it if no live `Store` holds one.
pub fn lock_for(path: &Path) -> PathLock {
    let key = lock_key(path);
    let mut locks = registry().lock().unwrap_or_else(PoisonError::into_inner);

    if let Some(lock) = locks.get(&key).and_then(Weak::upgrade) {
        return lock;
    }

    locks.retain(|_, weak| weak.strong_count() > 0);
    let lock = Arc::new(Mutex::new(()));
    locks.insert(key.clone(), Arc::downgrade(&lock));
    debug!("Registered path lock: {:?}", key);
    lock
}

/// Acquire a path lock. The guarded data is `()`, so a poisoned lock is
/// still safe to reuse.
pub fn acquire(lock: &PathLock) -> MutexGuard<'_, ()> {
    lock.lock().unwrap_or_else(PoisonError::into_inner)
}
