//! Command-line front end for `fob-unpack`.
//!
//! The core crate turns one bundle into a module tree. This crate adds the
//! parts a user touches: argument parsing, layered configuration, logging,
//! output-directory policy and a batch driver that keeps going past a broken
//! bundle.
//!
//! # Architecture
//!
//! - [`cli`] - clap argument definitions
//! - [`config`] - figment-backed configuration (file, environment, flags)
//! - [`error`] - CLI error types with hints, converted to `miette` reports
//! - [`logger`] - tracing subscriber setup
//! - [`ui`] - status lines and the per-bundle summary
//! - [`commands`] - the unpack batch driver
//!
//! # Example
//!
//! ```rust
//! use fob_unpack_cli::{error::Result, logger};
//!
//! fn main() -> Result<()> {
//!     logger::init_logger(false, false, false);
//!     Ok(())
//! }
//! ```

pub mod cli;
pub mod commands;
pub mod config;
pub mod error;
pub mod logger;
pub mod ui;

pub use error::{CliError, ConfigError, Result, ResultExt};
