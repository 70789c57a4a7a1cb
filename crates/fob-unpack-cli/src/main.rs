//! fob-unpack - split browserify bundles back into their module trees.
//!
//! Parses arguments, sets up logging and colours, then hands the batch of
//! bundles to the unpack command.

use clap::Parser;
use fob_unpack_cli::{cli, commands, error, logger, ui};
use miette::Result;

fn main() -> Result<()> {
    let args = cli::Cli::parse();

    logger::init_logger(args.verbose, args.quiet, args.no_color);
    ui::init_colors(args.no_color);

    let result = commands::unpack_execute(&args);

    // Convert CLI errors to miette diagnostics for reporting
    result.map_err(error::cli_error_to_miette)
}
