//! Command-line interface definition for `fob-unpack`.
//!
//! One command, many bundles: every positional argument is a bundle file
//! unpacked into its own directory.


use std::path::PathBuf;

use clap::Parser;

/// fob-unpack - reconstruct module trees from browserify bundles
#[derive(Parser, Debug, Clone)]
#[command(
    name = "fob-unpack",
    version,
    about = "Reconstruct the original module tree of a browserify bundle",
    long_about = "fob-unpack finds the module table inside a browserify bundle, infers a\n\
                  path for every module from its relative require() specifiers and writes\n\
                  one file per module. Named packages are listed, not written."
)]
pub struct Cli {
    /// Bundle files to unpack
    #[arg(required = true, value_name = "FILE")]
    pub files: Vec<PathBuf>,

    /// Output root directory
    ///
    /// Each bundle is written to `<DIR>/<bundle file name>`. Without this flag
    /// bundles go to `unpacked/<bundle file name>` next to the bundle.
    #[arg(short, long, value_name = "DIR")]
    pub out_dir: Option<PathBuf>,

    /// Configuration file
    ///
    /// Defaults to `fob-unpack.config.json` in the working directory when it
    /// exists.
    #[arg(short, long, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Remove an existing output directory before unpacking
    #[arg(long)]
    pub clean: bool,

    /// Write extracted code without pretty-printing
    #[arg(long)]
    pub no_format: bool,

    /// Write output files on a single thread
    #[arg(long)]
    pub sequential: bool,

    /// Upper bound on syntax nodes visited while searching for the module table
    #[arg(long, value_name = "N")]
    pub max_nodes: Option<usize>,

    /// Path given to the entry module, e.g. `src/main.js`
    #[arg(long, value_name = "PATH")]
    pub root_name: Option<String>,

    /// Print the unpack reports as JSON on stdout
    #[arg(long)]
    pub json: bool,

    /// Enable verbose logging (debug level)
    #[arg(short, long)]
    pub verbose: bool,

    /// Suppress all output except errors
    #[arg(short, long, conflicts_with = "verbose")]
    pub quiet: bool,

    /// Disable colored output
    #[arg(long)]
    pub no_color: bool,
}
