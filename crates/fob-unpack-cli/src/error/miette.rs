//! Conversion from CLI errors to miette reports.

use miette::Report;

use crate::error::CliError;

/// Convert a [`CliError`] into a miette [`Report`].
///
/// Unpack errors keep their diagnostic code and help text.
pub fn cli_error_to_miette(err: CliError) -> Report {
    match err {
        CliError::Unpack(e) => Report::new(e),
        _ => miette::miette!("{}", err),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use fob_unpack::UnpackError;

    #[test]
    fn unpack_errors_keep_their_code() {
        let report = cli_error_to_miette(CliError::Unpack(UnpackError::NoModuleTableFound));
        let code = report.code().map(|c| c.to_string());
        assert_eq!(code.as_deref(), Some("fob::unpack::no_module_table"));
    }

    #[test]
    fn other_errors_keep_their_message() {
        let report = cli_error_to_miette(CliError::Batch { failed: 2, total: 2 });
        assert_eq!(report.to_string(), "2 of 2 bundles failed to unpack");
    }
}
