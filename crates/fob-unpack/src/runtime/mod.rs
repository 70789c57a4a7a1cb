//! Output file-system abstraction.
//!
//! The emitter never touches `std::fs` directly. It writes through the
//! [`Runtime`] trait so the same pipeline can target the real disk
//! ([`NativeRuntime`]) or an in-memory tree in tests
//! ([`test_utils::MemoryRuntime`]).
//!
//! Implementations are shared across the rayon pool during parallel emission,
//! hence the `Send + Sync` bound.

mod native;

// Test utilities (available in test builds)
#[cfg(any(test, feature = "test-utils"))]
pub mod test_utils;

pub use native::NativeRuntime;

use std::path::{Path, PathBuf};

/// Result type for runtime operations
pub type RuntimeResult<T> = Result<T, RuntimeError>;

/// Errors that can occur during runtime operations
#[derive(Debug, thiserror::Error)]
pub enum RuntimeError {
    /// File not found
    #[error("File not found: {}", .0.display())]
    FileNotFound(PathBuf),

    /// I/O error
    #[error("I/O error on {}: {message}", .path.display())]
    Io { path: PathBuf, message: String },
}

impl RuntimeError {
    pub(crate) fn io(path: &Path, err: std::io::Error) -> Self {
        if err.kind() == std::io::ErrorKind::NotFound {
            RuntimeError::FileNotFound(path.to_path_buf())
        } else {
            RuntimeError::Io {
                path: path.to_path_buf(),
                message: err.to_string(),
            }
        }
    }
}

/// Platform runtime trait
pub trait Runtime: Send + Sync + std::fmt::Debug {
    /// Read a file
    fn read_file(&self, path: &Path) -> RuntimeResult<Vec<u8>>;

    /// Write a file, replacing any previous content
    fn write_file(&self, path: &Path, content: &[u8]) -> RuntimeResult<()>;

    /// Create a directory and all missing parents. Succeeds if it exists.
    fn create_dir_all(&self, path: &Path) -> RuntimeResult<()>;

    /// Check if a path exists
    fn exists(&self, path: &Path) -> bool;

    /// Remove a directory tree
    fn remove_dir_all(&self, path: &Path) -> RuntimeResult<()>;
}
