//! `Runtime` over the OS file system.

// the one place that calls std::fs on behalf of the Runtime trait
#![allow(clippy::disallowed_methods)]

use std::path::Path;

use super::{Runtime, RuntimeError, RuntimeResult};

/// Native filesystem Runtime implementation using `std::fs`.
#[derive(Debug, Clone, Copy, Default)]
pub struct NativeRuntime;

impl NativeRuntime {
    pub fn new() -> Self {
        Self
    }
}

impl Runtime for NativeRuntime {
    fn read_file(&self, path: &Path) -> RuntimeResult<Vec<u8>> {
        std::fs::read(path).map_err(|e| RuntimeError::io(path, e))
    }

    fn write_file(&self, path: &Path, content: &[u8]) -> RuntimeResult<()> {
        std::fs::write(path, content).map_err(|e| RuntimeError::io(path, e))
    }

    fn create_dir_all(&self, path: &Path) -> RuntimeResult<()> {
        // create_dir_all tolerates concurrent creation of the same directory
        std::fs::create_dir_all(path).map_err(|e| RuntimeError::io(path, e))
    }

    fn exists(&self, path: &Path) -> bool {
        path.exists()
    }

    fn remove_dir_all(&self, path: &Path) -> RuntimeResult<()> {
        std::fs::remove_dir_all(path).map_err(|e| RuntimeError::io(path, e))
    }
}
