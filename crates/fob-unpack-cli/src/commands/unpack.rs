//! Batch driver: unpack every bundle named on the command line.
//!
//! A bundle that fails is reported and counted; the remaining bundles are
//! still unpacked. The run fails at the end if anything did.

use std::path::{Path, PathBuf};
use std::time::Instant;

use fob_unpack::{NativeRuntime, Runtime, UnpackOptions, UnpackReport};
use serde::Serialize;
use tracing::{debug, error};

use crate::cli::Cli;
use crate::config::UnpackConfig;
use crate::error::{CliError, Result, ResultExt};
use crate::ui;

/// Directory created next to a bundle when no `--out-dir` is given.
pub const DEFAULT_OUT_DIR: &str = "unpacked";

/// Result for one bundle, as printed by `--json`.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BundleOutcome {
    pub bundle: PathBuf,
    pub out_dir: PathBuf,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub report: Option<UnpackReport>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

/// Execute the unpack command.
pub fn execute(args: &Cli) -> Result<()> {
    let config = UnpackConfig::load(args)?;
    let options = config.to_options();
    let runtime = NativeRuntime::new();

    let total = args.files.len();
    let mut outcomes = Vec::with_capacity(total);
    let mut failures = Vec::new();

    for bundle in &args.files {
        let out_dir = output_dir_for(bundle, config.out_dir.as_deref());
        let started = Instant::now();

        match unpack_bundle(bundle, &out_dir, config.clean, &options, &runtime) {
            Ok(report) => {
                let elapsed = started.elapsed();
                debug!(
                    bundle = %bundle.display(),
                    out_dir = %out_dir.display(),
                    modules = report.module_count,
                    elapsed_ms = elapsed.as_millis() as u64,
                    "bundle done"
                );
                if !args.quiet {
                    ui::print_unpack_summary(bundle, &out_dir, &report, elapsed);
                }
                outcomes.push(BundleOutcome {
                    bundle: bundle.clone(),
                    out_dir,
                    report: Some(report),
                    error: None,
                });
            }
            Err(err) => {
                error!(bundle = %bundle.display(), "unpack failed: {err}");
                outcomes.push(BundleOutcome {
                    bundle: bundle.clone(),
                    out_dir,
                    report: None,
                    error: Some(err.to_string()),
                });
                failures.push((bundle.clone(), err));
            }
        }
    }

    if args.json {
        println!("{}", serde_json::to_string_pretty(&outcomes)?);
    }

    finish(failures, total)
}

/// A lone failing bundle surfaces its own error; a batch reports each failure
/// and then a count.
fn finish(mut failures: Vec<(PathBuf, CliError)>, total: usize) -> Result<()> {
    if failures.is_empty() {
        return Ok(());
    }

    if total == 1 {
        if let Some((_, err)) = failures.pop() {
            return Err(err);
        }
    }

    for (bundle, err) in &failures {
        ui::error(&format!("{}: {err}", bundle.display()));
    }

    Err(CliError::Batch {
        failed: failures.len(),
        total,
    })
}

/// Read, prepare the output directory and unpack one bundle.
pub fn unpack_bundle(
    bundle: &Path,
    out_dir: &Path,
    clean: bool,
    options: &UnpackOptions,
    runtime: &dyn Runtime,
) -> Result<UnpackReport> {
    let bytes = runtime.read_file(bundle).with_path(bundle)?;
    let source = String::from_utf8(bytes).map_err(|e| {
        CliError::Custom(format!(
            "{} is not valid UTF-8: {e}\n\nHint: Browserify bundles are UTF-8 JavaScript",
            bundle.display()
        ))
    })?;
    prepare_out_dir(runtime, out_dir, clean)?;
    Ok(fob_unpack::unpack(&source, out_dir, runtime, options.clone())?)
}

/// Create `out_dir`, removing what is already there when `clean` is set.
pub fn prepare_out_dir(runtime: &dyn Runtime, out_dir: &Path, clean: bool) -> Result<()> {
    if clean && runtime.exists(out_dir) {
        debug!(out_dir = %out_dir.display(), "removing previous output");
        runtime.remove_dir_all(out_dir)?;
    }
    runtime.create_dir_all(out_dir)?;
    Ok(())
}

/// `<out_root>/<bundle name>`, or `<bundle dir>/unpacked/<bundle name>`.
pub fn output_dir_for(bundle: &Path, out_root: Option<&Path>) -> PathBuf {
    let name = bundle
        .file_name()
        .map(PathBuf::from)
        .unwrap_or_else(|| PathBuf::from("bundle"));

    match out_root {
        Some(root) => root.join(name),
        None => bundle
            .parent()
            .unwrap_or_else(|| Path::new(""))
            .join(DEFAULT_OUT_DIR)
            .join(name),
    }
}
