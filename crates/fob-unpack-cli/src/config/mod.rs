//! Configuration for the `fob-unpack` command line.
//!
//! Merges settings from command-line flags, `FOB_UNPACK_*` environment
//! variables and `fob-unpack.config.json`.
//! Priority: CLI > Environment > File > Defaults

mod loading;

use std::path::PathBuf;

use fob_unpack::UnpackOptions;
use fob_unpack::sandbox::SandboxLimits;
use serde::{Deserialize, Serialize};

use crate::error::{ConfigError, Result};

pub use loading::DEFAULT_CONFIG_FILE;

/// Settings for one `fob-unpack` invocation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default, deny_unknown_fields)]
pub struct UnpackConfig {
    /// Output root; each bundle gets `<outDir>/<bundle file name>`.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub out_dir: Option<PathBuf>,

    /// Remove an existing per-bundle output directory first.
    pub clean: bool,

    /// Pretty-print extracted code.
    pub format: bool,

    /// Write files on the rayon pool.
    pub parallel: bool,

    /// Traversal node bound for the module-table search.
    pub max_nodes: usize,

    /// Path of the entry module.
    pub root_path: PathBuf,

    /// Extension for modules whose path has none.
    pub default_extension: String,

    /// Bounds for JSON module evaluation.
    pub sandbox: SandboxLimits,
}

impl Default for UnpackConfig {
    fn default() -> Self {
        Self::from_options(UnpackOptions::default())
    }
}

impl UnpackConfig {
    fn from_options(options: UnpackOptions) -> Self {
        Self {
            out_dir: None,
            clean: false,
            format: options.format,
            parallel: options.parallel,
            max_nodes: options.max_nodes,
            root_path: options.root_path,
            default_extension: options.default_extension,
            sandbox: options.sandbox,
        }
    }

    /// Options handed to the core pipeline.
    pub fn to_options(&self) -> UnpackOptions {
        UnpackOptions {
            max_nodes: self.max_nodes,
            root_path: self.root_path.clone(),
            default_extension: self.default_extension.clone(),
            format: self.format,
            parallel: self.parallel,
            sandbox: self.sandbox,
        }
    }

    /// Reject values the pipeline cannot work with.
    pub fn validate(&self) -> Result<()> {
        if self.max_nodes == 0 {
            return Err(invalid(
                "maxNodes",
                "0",
                "Use a positive node bound; the default is 10000000",
            ));
        }

        if self.root_path.file_name().is_none() {
            return Err(invalid(
                "rootPath",
                &self.root_path.display().to_string(),
                "Give the entry module a file name, e.g. src/main.js",
            ));
        }

        let ext = &self.default_extension;
        if ext.is_empty() || ext.contains('.') || ext.contains('/') {
            return Err(invalid(
                "defaultExtension",
                ext,
                "Use a bare extension such as \"js\" (no leading dot)",
            ));
        }

        Ok(())
    }
}

fn invalid(field: &str, value: &str, hint: &str) -> crate::error::CliError {
    ConfigError::InvalidValue {
        field: field.to_string(),
        value: value.to_string(),
        hint: hint.to_string(),
    }
    .into()
}
