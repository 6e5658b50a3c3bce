//! Command implementations for the cfmd CLI.

mod convert;

pub use convert::convert_azure;
