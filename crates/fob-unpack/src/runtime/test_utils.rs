//! In-memory runtime for tests.

use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicUsize, Ordering};

use dashmap::{DashMap, DashSet};

use super::{Runtime, RuntimeError, RuntimeResult};

/// A file tree held in memory.
///
/// Counts writes so tests can assert that a second emission is a no-op.
#[derive(Debug, Default)]
pub struct MemoryRuntime {
    files: DashMap<PathBuf, Vec<u8>>,
    dirs: DashSet<PathBuf>,
    writes: AtomicUsize,
    fail_writes: bool,
}

impl MemoryRuntime {
    pub fn new() -> Self {
        Self::default()
    }

    /// A runtime whose writes always fail.
    pub fn failing() -> Self {
        Self {
            fail_writes: true,
            ..Self::default()
        }
    }

    pub fn write_count(&self) -> usize {
        self.writes.load(Ordering::SeqCst)
    }

    /// Content of `path` as UTF-8, if the file exists.
    pub fn read_string(&self, path: impl AsRef<Path>) -> Option<String> {
        self.files
            .get(path.as_ref())
            .map(|content| String::from_utf8_lossy(content.value()).into_owned())
    }

    /// All file paths, sorted.
    pub fn paths(&self) -> Vec<PathBuf> {
        let mut paths: Vec<PathBuf> = self.files.iter().map(|e| e.key().clone()).collect();
        paths.sort();
        paths
    }

    /// Snapshot of the whole tree, sorted by path.
    pub fn snapshot(&self) -> Vec<(PathBuf, String)> {
        self.paths()
            .into_iter()
            .filter_map(|path| self.read_string(&path).map(|content| (path, content)))
            .collect()
    }
}

impl Runtime for MemoryRuntime {
    fn read_file(&self, path: &Path) -> RuntimeResult<Vec<u8>> {
        self.files
            .get(path)
            .map(|content| content.value().clone())
            .ok_or_else(|| RuntimeError::FileNotFound(path.to_path_buf()))
    }

    fn write_file(&self, path: &Path, content: &[u8]) -> RuntimeResult<()> {
        if self.fail_writes {
            return Err(RuntimeError::Io {
                path: path.to_path_buf(),
                message: "write refused".to_string(),
            });
        }
        if let Some(parent) = path.parent()
            && !parent.as_os_str().is_empty()
            && !self.dirs.contains(parent)
        {
            return Err(RuntimeError::FileNotFound(parent.to_path_buf()));
        }
        self.writes.fetch_add(1, Ordering::SeqCst);
        self.files.insert(path.to_path_buf(), content.to_vec());
        Ok(())
    }

    fn create_dir_all(&self, path: &Path) -> RuntimeResult<()> {
        for ancestor in path.ancestors() {
            if ancestor.as_os_str().is_empty() {
                break;
            }
            self.dirs.insert(ancestor.to_path_buf());
        }
        Ok(())
    }

    fn exists(&self, path: &Path) -> bool {
        self.files.contains_key(path) || self.dirs.contains(path)
    }

    fn remove_dir_all(&self, path: &Path) -> RuntimeResult<()> {
        if !self.dirs.contains(path) {
            return Err(RuntimeError::FileNotFound(path.to_path_buf()));
        }
        self.files.retain(|file, _| !file.starts_with(path));
        self.dirs.retain(|dir| !dir.starts_with(path));
        Ok(())
    }
}
