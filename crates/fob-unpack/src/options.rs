//! Tunable limits and naming conventions for an unpack run.

use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use crate::sandbox::SandboxLimits;
use crate::traversal::DEFAULT_MAX_NODES;

/// Canonical path of the root module inside the virtual root.
pub const DEFAULT_ROOT_PATH: &str = "/ROOT_APP_MODULE.js";

/// Extension appended to emitted files whose path has no known extension.
pub const DEFAULT_EXTENSION: &str = "js";

/// Options for one unpack run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct UnpackOptions {
    /// Upper bound on syntax nodes visited while locating the module table.
    pub max_nodes: usize,

    /// Path given to the root module, rooted at `/`.
    pub root_path: PathBuf,

    /// Extension (without dot) for files with no known extension.
    pub default_extension: String,

    /// Pretty-print extracted code.
    pub format: bool,

    /// Write files on the rayon pool.
    pub parallel: bool,

    /// Bounds for JSON module evaluation.
    pub sandbox: SandboxLimits,
}

impl Default for UnpackOptions {
    fn default() -> Self {
        Self {
            max_nodes: DEFAULT_MAX_NODES,
            root_path: PathBuf::from(DEFAULT_ROOT_PATH),
            default_extension: DEFAULT_EXTENSION.to_string(),
            format: true,
            parallel: true,
            sandbox: SandboxLimits::default(),
        }
    }
}

impl UnpackOptions {
    pub fn with_max_nodes(mut self, max_nodes: usize) -> Self {
        self.max_nodes = max_nodes;
        self
    }

    pub fn with_root_path(mut self, root_path: impl Into<PathBuf>) -> Self {
        self.root_path = root_path.into();
        self
    }

    pub fn with_format(mut self, format: bool) -> Self {
        self.format = format;
        self
    }

    pub fn with_parallel(mut self, parallel: bool) -> Self {
        self.parallel = parallel;
        self
    }

    /// Root path made absolute under the virtual root.
    ///
    /// `app.js` and `/app.js` name the same file.
    pub fn normalized_root_path(&self) -> PathBuf {
        if self.root_path.has_root() {
            self.root_path.clone()
        } else {
            PathBuf::from("/").join(&self.root_path)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let options = UnpackOptions::default();
        assert_eq!(options.max_nodes, 10_000_000);
        assert_eq!(options.root_path, PathBuf::from("/ROOT_APP_MODULE.js"));
        assert!(options.format);
        assert!(options.parallel);
    }

    #[test]
    fn test_partial_json_keeps_defaults() {
        let options: UnpackOptions =
            serde_json::from_str(r#"{"maxNodes": 50, "parallel": false}"#).unwrap();
        assert_eq!(options.max_nodes, 50);
        assert!(!options.parallel);
        assert_eq!(options.default_extension, "js");
    }

    #[test]
    fn test_relative_root_path_is_rooted() {
        let options = UnpackOptions::default().with_root_path("main.js");
        assert_eq!(options.normalized_root_path(), PathBuf::from("/main.js"));
    }
}
