//! Command implementations.

pub mod unpack;

pub use unpack::execute as unpack_execute;
