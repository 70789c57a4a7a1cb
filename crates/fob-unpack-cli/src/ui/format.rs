//! Human-readable rendering of unpack results.

use std::path::Path;
use std::time::Duration;

use fob_unpack::UnpackReport;

use super::{debug, info, success, warning};

/// Format a duration for display.
///
/// ```
/// use fob_unpack_cli::ui::format_duration;
/// use std::time::Duration;
///
/// assert_eq!(format_duration(Duration::from_millis(42)), "42ms");
/// assert_eq!(format_duration(Duration::from_millis(1500)), "1.50s");
/// assert_eq!(format_duration(Duration::from_secs(125)), "2m 5s");
/// ```
pub fn format_duration(duration: Duration) -> String {
    let total_ms = duration.as_millis();

    if total_ms < 1000 {
        format!("{total_ms}ms")
    } else if total_ms < 60_000 {
        format!("{:.2}s", duration.as_secs_f64())
    } else {
        let secs = duration.as_secs();
        format!("{}m {}s", secs / 60, secs % 60)
    }
}

/// `count` followed by `noun`, pluralised with a trailing `s`.
///
/// ```
/// use fob_unpack_cli::ui::plural;
///
/// assert_eq!(plural(1, "file"), "1 file");
/// assert_eq!(plural(3, "file"), "3 files");
/// ```
pub fn plural(count: usize, noun: &str) -> String {
    if count == 1 {
        format!("{count} {noun}")
    } else {
        format!("{count} {noun}s")
    }
}

/// One-line summary of an unpacked bundle.
pub fn summary_line(bundle: &Path, out_dir: &Path, report: &UnpackReport, elapsed: Duration) -> String {
    format!(
        "{} -> {} ({}, {}) in {}",
        bundle.display(),
        out_dir.display(),
        plural(report.module_count, "module"),
        plural(report.written.len(), "file"),
        format_duration(elapsed)
    )
}

/// Print the summary, external packages and warning count for one bundle.
pub fn print_unpack_summary(bundle: &Path, out_dir: &Path, report: &UnpackReport, elapsed: Duration) {
    success(&summary_line(bundle, out_dir, report, elapsed));

    if !report.externals.is_empty() {
        info(&format!(
            "{}: {}",
            plural(report.externals.len(), "external package"),
            report.externals.join(", ")
        ));
    }

    let warnings = report.warnings().count();
    if warnings > 0 {
        warning(&format!(
            "{} while unpacking {}",
            plural(warnings, "warning"),
            bundle.display()
        ));
    }

    for file in &report.written {
        debug(&format!("module {} -> {}", file.module, file.path.display()));
    }
}
